use crate::core::{NutritionSource, RawNutritionPayload};
use crate::utils::error::{LunchError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const MENU_ITEMS_ACTION: &str = "get_cm_menu_items";

/// Calls the cafe's nutrition endpoint, one request per menu item.
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct NutritionFetcher {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl NutritionFetcher {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(Client::new(), endpoint, timeout)
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub async fn fetch_item(&self, id: &str, nonce: &str) -> Result<RawNutritionPayload> {
        let fetch_error = |cause: String| LunchError::FetchError {
            id: id.to_string(),
            cause,
        };

        tracing::debug!("Fetching nutrition for item {}", id);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("action", MENU_ITEMS_ACTION), ("item", id), ("nonce", nonce)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    fetch_error(format!("timed out after {:?}", self.timeout))
                } else {
                    fetch_error(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP status {}", status)));
        }

        response
            .json::<RawNutritionPayload>()
            .await
            .map_err(|e| fetch_error(format!("invalid response body: {}", e)))
    }
}

#[async_trait]
impl NutritionSource for NutritionFetcher {
    async fn fetch(&self, id: &str, nonce: &str) -> Result<RawNutritionPayload> {
        self.fetch_item(id, nonce).await
    }
}
