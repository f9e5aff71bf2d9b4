use crate::adapters::html::{parse_elements, text_content, Element};
use crate::core::{MenuItem, MenuSource};
use crate::utils::error::{LunchError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const LUNCH_SECTION_ID: &str = "lunch";
const ACTIVE_TAB_CLASS: &str = "c-tab__content--active";
const MENU_PAGE_TIMEOUT: Duration = Duration::from_secs(15);

/// Downloads the cafe menu page and pulls today's lunch items out of it.
#[derive(Debug, Clone)]
pub struct MenuScraper {
    client: Client,
    menu_url: String,
    timeout: Duration,
}

impl MenuScraper {
    pub fn new(menu_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), menu_url)
    }

    pub fn with_client(client: Client, menu_url: impl Into<String>) -> Self {
        Self {
            client,
            menu_url: menu_url.into(),
            timeout: MENU_PAGE_TIMEOUT,
        }
    }

    pub async fn fetch_menu_page(&self) -> Result<String> {
        tracing::debug!("Fetching menu page: {}", self.menu_url);
        let response = self
            .client
            .get(&self.menu_url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl MenuSource for MenuScraper {
    async fn lunch_items(&self) -> Result<Vec<MenuItem>> {
        let html = self.fetch_menu_page().await?;
        extract_lunch_items(&html)
    }
}

/// Items carrying `data-id` and `data-nonce` inside the active tab of the
/// `#lunch` section. The name comes from the item's first `<button>`; items
/// without one are skipped.
pub fn extract_lunch_items(html: &str) -> Result<Vec<MenuItem>> {
    let elements = parse_elements(html);

    let sections: Vec<&Element> = elements
        .iter()
        .filter(|e| e.name == "section" && e.attr("id") == Some(LUNCH_SECTION_ID))
        .collect();
    if sections.is_empty() {
        return Err(LunchError::MenuParseError {
            message: format!("no <section id=\"{}\"> on the menu page", LUNCH_SECTION_ID),
        });
    }

    let active_tabs: Vec<&Element> = elements
        .iter()
        .filter(|e| e.has_class(ACTIVE_TAB_CLASS) && sections.iter().any(|s| s.contains(e)))
        .collect();

    let mut items = Vec::new();
    for (index, candidate) in elements.iter().enumerate() {
        if !candidate.has_attr("data-id") || !candidate.has_attr("data-nonce") {
            continue;
        }
        if !active_tabs.iter().any(|tab| tab.contains(candidate)) {
            continue;
        }

        let Some(button) = elements[index + 1..]
            .iter()
            .take_while(|e| candidate.contains(e))
            .find(|e| e.name == "button")
        else {
            tracing::debug!("Skipping menu entry without a button");
            continue;
        };

        items.push(MenuItem {
            id: candidate.attr("data-id").unwrap_or_default().to_string(),
            nonce: candidate.attr("data-nonce").unwrap_or_default().to_string(),
            name: text_content(&html[button.content_start..button.content_end]),
        });
    }

    if items.is_empty() {
        return Err(LunchError::EmptyMenu);
    }

    tracing::info!("Found {} items", items.len());
    Ok(items)
}
