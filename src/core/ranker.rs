use crate::config::RankingConfig;
use crate::core::{
    filter, normalizer, scorer, MenuItem, NutritionRecord, NutritionSource, RankStats,
    RankedPick, RankedResult,
};
use crate::utils::error::LunchError;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// What one worker reports for one menu item.
#[derive(Debug)]
enum TaskOutcome {
    Accepted(NutritionRecord),
    FilteredOut { id: String },
    FetchFailed(LunchError),
    NormalizeFailed(LunchError),
}

/// Fans nutrition lookups out over a fixed worker pool and ranks what comes
/// back.
pub struct ConcurrentRanker<S: NutritionSource> {
    source: Arc<S>,
    config: RankingConfig,
}

impl<S: NutritionSource> ConcurrentRanker<S> {
    pub fn new(source: S, config: RankingConfig) -> Self {
        Self::from_shared(Arc::new(source), config)
    }

    pub fn from_shared(source: Arc<S>, config: RankingConfig) -> Self {
        Self { source, config }
    }

    /// Fetches, normalizes and filters every item, then returns the top picks.
    ///
    /// Items that fail to fetch or normalize are dropped. Returns only after
    /// every item has been processed; an empty input yields an empty result.
    pub async fn rank(&self, items: &[MenuItem]) -> RankedResult {
        let mut stats = RankStats {
            dispatched: items.len(),
            ..RankStats::default()
        };
        if items.is_empty() {
            return RankedResult {
                picks: Vec::new(),
                stats,
            };
        }

        let worker_count = self.config.max_concurrency.clamp(1, items.len());
        tracing::info!(
            "🔎 Fetching nutrition for {} items with {} workers",
            items.len(),
            worker_count
        );

        let queue = Arc::new(Mutex::new(items.iter().cloned().collect::<VecDeque<_>>()));
        let (result_tx, mut result_rx) = mpsc::unbounded_channel();

        let mut workers = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let queue = Arc::clone(&queue);
            let source = Arc::clone(&self.source);
            let result_tx = result_tx.clone();
            let thresholds = self.config.thresholds;

            workers.push(tokio::spawn(async move {
                loop {
                    let next = queue.lock().await.pop_front();
                    let Some(item) = next else { break };
                    let outcome = process_item(source.as_ref(), &item, &thresholds).await;
                    if result_tx.send(outcome).is_err() {
                        break;
                    }
                }
            }));
        }
        // Workers hold the only remaining senders; the channel closes when the last one exits.
        drop(result_tx);

        let mut accepted = Vec::new();
        while let Some(outcome) = result_rx.recv().await {
            match outcome {
                TaskOutcome::Accepted(record) => accepted.push(record),
                TaskOutcome::FilteredOut { id } => {
                    tracing::debug!("Item {} did not meet the dietary thresholds", id);
                    stats.filtered_out += 1;
                }
                TaskOutcome::FetchFailed(e) => {
                    tracing::warn!("⚠️ Dropping item: {}", e);
                    stats.fetch_failures += 1;
                }
                TaskOutcome::NormalizeFailed(e) => {
                    tracing::warn!("⚠️ Dropping item: {}", e);
                    stats.normalization_failures += 1;
                }
            }
        }

        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!("Nutrition worker terminated abnormally: {}", e);
            }
        }

        let mut picks = Vec::with_capacity(accepted.len());
        for record in accepted {
            match scorer::score(&record) {
                Some(score) => picks.push(RankedPick { record, score }),
                None => {
                    tracing::debug!(
                        "Item {} ({}) lacks the data needed for scoring",
                        record.id,
                        record.name
                    );
                    stats.unscorable += 1;
                }
            }
        }
        stats.survivors = picks.len();

        if stats.accounted() != stats.dispatched {
            tracing::error!(
                "Only {} of {} dispatched items reported an outcome",
                stats.accounted(),
                stats.dispatched
            );
        }

        let picks = select_top(picks, self.config.top_n);
        tracing::info!(
            "🏁 {} of {} items survived filtering ({} fetch failures, {} unusable payloads); returning {}",
            stats.survivors,
            stats.dispatched,
            stats.fetch_failures,
            stats.normalization_failures,
            picks.len()
        );

        RankedResult { picks, stats }
    }
}

async fn process_item<S: NutritionSource + ?Sized>(
    source: &S,
    item: &MenuItem,
    thresholds: &filter::DietaryThresholds,
) -> TaskOutcome {
    let raw = match source.fetch(&item.id, &item.nonce).await {
        Ok(raw) => raw,
        Err(e) => return TaskOutcome::FetchFailed(e),
    };
    let record = match normalizer::normalize(&raw, &item.name, &item.id) {
        Ok(record) => record,
        Err(e) => return TaskOutcome::NormalizeFailed(e),
    };
    if filter::passes(&record, thresholds) {
        TaskOutcome::Accepted(record)
    } else {
        TaskOutcome::FilteredOut { id: record.id }
    }
}

/// Stable sort by descending score, then truncate. Equal scores keep their
/// incoming order.
pub fn select_top(mut picks: Vec<RankedPick>, top_n: usize) -> Vec<RankedPick> {
    picks.sort_by(|a, b| b.score.total_cmp(&a.score));
    picks.truncate(top_n);
    picks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::DietaryThresholds;
    use crate::core::RawNutritionPayload;
    use crate::utils::error::Result;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Clone)]
    enum Canned {
        Payload(serde_json::Value, Duration),
        Failure,
    }

    #[derive(Default)]
    struct CannedSource {
        responses: HashMap<String, Canned>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
        calls: AtomicUsize,
    }

    impl CannedSource {
        fn with_item(
            mut self,
            id: &str,
            calories: &str,
            protein: &str,
            serving: &str,
            delay_ms: u64,
        ) -> Self {
            let body = serde_json::json!({
                "items": {
                    id: {
                        "nutrition_details": {
                            "calories": {"value": calories, "unit": "kcal"},
                            "proteinContent": {"value": protein, "unit": "g"},
                            "servingSize": {"value": serving, "unit": "g"}
                        },
                        "ingredient_details": "Rice, Chicken"
                    }
                }
            });
            self.responses.insert(
                id.to_string(),
                Canned::Payload(body, Duration::from_millis(delay_ms)),
            );
            self
        }

        fn with_raw(mut self, id: &str, body: serde_json::Value) -> Self {
            self.responses
                .insert(id.to_string(), Canned::Payload(body, Duration::ZERO));
            self
        }

        fn with_failure(mut self, id: &str) -> Self {
            self.responses.insert(id.to_string(), Canned::Failure);
            self
        }
    }

    #[async_trait]
    impl NutritionSource for CannedSource {
        async fn fetch(&self, id: &str, _nonce: &str) -> Result<RawNutritionPayload> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

            let response = self.responses.get(id).cloned();
            let result = match response {
                Some(Canned::Payload(body, delay)) => {
                    tokio::time::sleep(delay).await;
                    Ok(serde_json::from_value(body)?)
                }
                Some(Canned::Failure) | None => Err(LunchError::FetchError {
                    id: id.to_string(),
                    cause: "HTTP status 500 Internal Server Error".to_string(),
                }),
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    fn config(max_concurrency: usize, top_n: usize) -> RankingConfig {
        RankingConfig {
            thresholds: DietaryThresholds {
                max_calories: 850,
                min_protein_grams: 25,
            },
            max_concurrency,
            top_n,
            fetch_timeout: Duration::from_secs(10),
        }
    }

    fn items(ids: &[&str]) -> Vec<MenuItem> {
        ids.iter()
            .map(|id| MenuItem::new(*id, format!("nonce-{}", id), format!("Dish {}", id)))
            .collect()
    }

    fn ids(result: &RankedResult) -> Vec<&str> {
        result.records().map(|r| r.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_empty_items_array_counts_as_normalization_failure() {
        let source = CannedSource::default()
            .with_item("A", "500", "40", "300", 0)
            .with_raw("E", serde_json::json!({"items": []}));
        let ranker = ConcurrentRanker::new(source, config(4, 5));

        let result = ranker.rank(&items(&["A", "E"])).await;

        assert_eq!(ids(&result), vec!["A"]);
        assert_eq!(result.stats.normalization_failures, 1);
        assert_eq!(result.stats.fetch_failures, 0);
    }

    #[tokio::test]
    async fn test_calorie_cap_and_fetch_failure_scenario() {
        let source = CannedSource::default()
            .with_item("A", "500", "40", "300", 0)
            .with_item("B", "900", "60", "400", 0)
            .with_failure("C");
        let ranker = ConcurrentRanker::new(source, config(10, 5));

        let result = ranker.rank(&items(&["A", "B", "C"])).await;

        assert_eq!(ids(&result), vec!["A"]);
        assert_eq!(result.stats.dispatched, 3);
        assert_eq!(result.stats.filtered_out, 1);
        assert_eq!(result.stats.fetch_failures, 1);
        assert_eq!(result.stats.survivors, 1);
    }

    #[tokio::test]
    async fn test_all_fetches_fail_yields_empty_result() {
        let source = CannedSource::default()
            .with_failure("1")
            .with_failure("2")
            .with_failure("3");
        let ranker = ConcurrentRanker::new(source, config(2, 5));

        let result = ranker.rank(&items(&["1", "2", "3"])).await;

        assert!(result.is_empty());
        assert_eq!(result.stats.fetch_failures, 3);
        assert_eq!(result.stats.accounted(), 3);
    }

    #[tokio::test]
    async fn test_empty_input_yields_empty_result() {
        let source = CannedSource::default();
        let ranker = ConcurrentRanker::new(source, config(4, 5));

        let result = ranker.rank(&[]).await;

        assert!(result.is_empty());
        assert_eq!(result.stats, RankStats::default());
    }

    #[tokio::test]
    async fn test_results_sorted_and_truncated() {
        // scores: s1 = 0.8*60 = 48, s2 = 0.5*50 = 25, s3 = 1.0*100 = 100, s4 = 0.625*62.5 ≈ 39
        let source = CannedSource::default()
            .with_item("s1", "500", "40", "300", 5)
            .with_item("s2", "600", "30", "300", 0)
            .with_item("s3", "300", "30", "300", 10)
            .with_item("s4", "400", "25", "250", 0);
        let ranker = ConcurrentRanker::new(source, config(3, 3));

        let result = ranker.rank(&items(&["s1", "s2", "s3", "s4"])).await;

        assert_eq!(ids(&result), vec!["s3", "s1", "s4"]);
        let scores: Vec<f64> = result.picks.iter().map(|p| p.score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(result.stats.survivors, 4);
    }

    #[tokio::test]
    async fn test_ties_keep_completion_order() {
        let source = CannedSource::default()
            .with_item("slow", "500", "40", "300", 150)
            .with_item("fast", "500", "40", "300", 0);
        let ranker = ConcurrentRanker::new(source, config(2, 5));

        let result = ranker.rank(&items(&["slow", "fast"])).await;

        assert_eq!(ids(&result), vec!["fast", "slow"]);
    }

    #[tokio::test]
    async fn test_ranking_is_deterministic_for_fixed_responses() {
        let source = CannedSource::default()
            .with_item("a", "500", "40", "300", 3)
            .with_item("b", "700", "45", "420", 1)
            .with_item("c", "350", "26", "200", 2)
            .with_failure("d");
        let ranker = ConcurrentRanker::new(source, config(4, 5));
        let menu = items(&["a", "b", "c", "d"]);

        let first = ranker.rank(&menu).await;
        let second = ranker.rank(&menu).await;

        assert_eq!(ids(&first), ids(&second));
        assert_eq!(first.stats, second.stats);
    }

    #[tokio::test]
    async fn test_worker_pool_bounds_in_flight_fetches() {
        let mut source = CannedSource::default();
        let names: Vec<String> = (0..12).map(|i| format!("item{}", i)).collect();
        for name in &names {
            source = source.with_item(name, "500", "30", "300", 20);
        }
        let source = Arc::new(source);
        let ranker = ConcurrentRanker::from_shared(Arc::clone(&source), config(3, 5));
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();

        let result = ranker.rank(&items(&refs)).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 12);
        assert!(source.peak_in_flight.load(Ordering::SeqCst) <= 3);
        assert_eq!(result.len(), 5);
        assert_eq!(result.stats.survivors, 12);
    }

    #[tokio::test]
    async fn test_unusable_payloads_are_dropped() {
        let source = CannedSource::default()
            .with_item("ok", "500", "40", "300", 0)
            .with_raw("missing", serde_json::json!({"items": {}}))
            .with_raw(
                "no-serving",
                serde_json::json!({"items": {"no-serving": {"nutrition_details": {
                    "calories": {"value": "400"},
                    "proteinContent": {"value": "35"}
                }}}}),
            );
        let ranker = ConcurrentRanker::new(source, config(3, 5));

        let result = ranker.rank(&items(&["ok", "missing", "no-serving"])).await;

        assert_eq!(ids(&result), vec!["ok"]);
        assert_eq!(result.stats.normalization_failures, 2);
    }

    #[tokio::test]
    async fn test_zero_calories_and_missing_serving_are_unscorable() {
        let source = CannedSource::default()
            .with_item("zero", "0", "30", "300", 0)
            .with_item("blank-serving", "500", "40", "", 0)
            .with_item("good", "500", "40", "300", 0);
        let ranker = ConcurrentRanker::new(source, config(3, 5));

        let result = ranker.rank(&items(&["zero", "blank-serving", "good"])).await;

        assert_eq!(ids(&result), vec!["good"]);
        assert_eq!(result.stats.unscorable, 2);
        assert_eq!(result.stats.accounted(), 3);
    }

    #[tokio::test]
    async fn test_every_output_record_meets_thresholds() {
        let source = CannedSource::default()
            .with_item("1", "850", "25", "300", 0)
            .with_item("2", "851", "90", "300", 0)
            .with_item("3", "400", "24", "300", 0)
            .with_item("4", "600", "", "300", 0)
            .with_item("5", "", "50", "300", 0)
            .with_item("6", "200", "26", "100", 0);
        let cfg = config(6, 10);
        let ranker = ConcurrentRanker::new(source, cfg);

        let result = ranker.rank(&items(&["1", "2", "3", "4", "5", "6"])).await;

        assert_eq!(result.len(), 2);
        for record in result.records() {
            assert!(record.calories.unwrap() <= f64::from(cfg.thresholds.max_calories));
            assert!(record.protein_g.unwrap() >= f64::from(cfg.thresholds.min_protein_grams));
        }
    }

    #[test]
    fn test_select_top_is_stable() {
        let pick = |id: &str, score: f64| RankedPick {
            record: NutritionRecord {
                id: id.to_string(),
                name: id.to_string(),
                calories: Some(500.0),
                protein_g: Some(30.0),
                fat_g: None,
                carbs_g: None,
                serving_size: Some(300.0),
                serving_size_unit: None,
                ingredients_lowercased: String::new(),
                dairy_free: true,
            },
            score,
        };
        let picks = vec![pick("x", 1.0), pick("y", 2.0), pick("z", 1.0), pick("w", 2.0)];

        let top = select_top(picks, 3);

        let order: Vec<&str> = top.iter().map(|p| p.record.id.as_str()).collect();
        assert_eq!(order, vec!["y", "w", "x"]);
    }
}
