use anyhow::Context;
use clap::Parser;
use healthy_lunch::adapters::{build_notifiers, StdoutNotifier};
use healthy_lunch::core::{ConfigProvider, Notifier};
use healthy_lunch::utils::error::ErrorSeverity;
use healthy_lunch::utils::{logger, validation::Validate};
use healthy_lunch::{
    CliConfig, ConcurrentRanker, LunchEngine, MenuScraper, NutritionFetcher, TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 檔案不存在時直接使用環境變數
    let dotenv_result = dotenvy::dotenv();

    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting healthy-lunch");
    if let Err(e) = dotenv_result {
        tracing::debug!("No .env file loaded: {}", e);
    }

    let exit_code = match &cli.config {
        Some(path) => {
            let file_config = TomlConfig::from_file(path)
                .with_context(|| format!("failed to load config file {}", path.display()))?;
            run(&file_config, cli.dry_run).await
        }
        None => run(&cli, cli.dry_run).await,
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

async fn run<C: ConfigProvider + Validate>(config: &C, dry_run: bool) -> i32 {
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        return 1;
    }

    let ranking = config.ranking();
    tracing::debug!("Ranking config: {:?}", ranking);

    // 共用連線池
    let client = reqwest::Client::new();
    let notifiers: Vec<Box<dyn Notifier>> = if dry_run {
        vec![Box::new(StdoutNotifier)]
    } else {
        match build_notifiers(config, &client) {
            Ok(notifiers) => notifiers,
            Err(e) => {
                tracing::error!("❌ Notification setup failed: {}", e);
                eprintln!("❌ {}", e.user_friendly_message());
                return 1;
            }
        }
    };
    if notifiers.is_empty() {
        tracing::warn!("No notification channel configured; results will only be logged");
    }

    let menu = MenuScraper::with_client(client.clone(), config.menu_url());
    let fetcher = NutritionFetcher::with_client(
        client,
        config.nutrition_endpoint(),
        ranking.fetch_timeout,
    );
    let engine =
        LunchEngine::new(menu, ConcurrentRanker::new(fetcher, ranking)).with_notifiers(notifiers);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!(
                "📊 {} menu items, {} picks, delivered via {:?}",
                summary.menu_items,
                summary.result.len(),
                summary.delivered
            );
            for (rank, pick) in summary.result.picks.iter().enumerate() {
                tracing::info!(
                    "#{} {} (score {:.2})",
                    rank + 1,
                    pick.record.name,
                    pick.score
                );
            }
            if summary.failed.is_empty() {
                0
            } else {
                tracing::warn!("⚠️ Failed channels: {:?}", summary.failed);
                2
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Lunch job failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            }
        }
    }
}
