use std::sync::Arc;
use std::time::Duration;

use jen_core::QueueItem;
use jen_logging::{jen_debug, jen_error};

use crate::client::HttpClient;
use crate::endpoints::queue_item_url;
use crate::retry::linear_backoff;
use crate::EngineError;

#[derive(Debug, Clone)]
pub struct QueueSettings {
    /// Retries after the initial fetch.
    pub max_retries: u32,
    pub retry_delay_base: Duration,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_base: Duration::from_millis(1000),
        }
    }
}

/// Turns a queue item number into the build the server started for it.
pub struct QueueResolver {
    client: Arc<dyn HttpClient>,
    base_url: String,
    settings: QueueSettings,
}

impl QueueResolver {
    pub fn new(client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            settings: QueueSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: QueueSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Fetches the queue item. With `retry_until_found`, keeps polling with
    /// linear backoff until the item has a build or is cancelled.
    ///
    /// A request failure ends the resolution immediately; it does not count
    /// against the retry budget.
    pub async fn resolve(
        &self,
        item_number: &str,
        retry_until_found: bool,
    ) -> Result<QueueItem, EngineError> {
        let item_number = item_number.trim();
        if item_number.is_empty() {
            return Err(EngineError::InvalidArgument(
                "Invalid queue item number".to_string(),
            ));
        }

        let url = queue_item_url(&self.base_url, item_number);
        let mut item = self.fetch(&url).await?;
        if !retry_until_found {
            return Ok(item);
        }

        let mut attempt = 0;
        while !item.is_settled() {
            if attempt >= self.settings.max_retries {
                jen_error!(
                    "Queue item {} has no build after {} fetches",
                    item_number,
                    attempt + 1
                );
                return Err(EngineError::MaxRetriesExceeded {
                    attempts: attempt + 1,
                });
            }

            attempt += 1;
            let wait = linear_backoff(self.settings.retry_delay_base, attempt);
            jen_debug!(
                "Queue item {} has not started a build yet. Re-fetching after {}ms",
                item_number,
                wait.as_millis()
            );
            tokio::time::sleep(wait).await;
            item = self.fetch(&url).await?;
        }

        Ok(item)
    }

    async fn fetch(&self, url: &str) -> Result<QueueItem, EngineError> {
        let response = self.client.get(url).await?;
        Ok(response.json()?)
    }
}
