use crate::config::RetryPolicy;
use crate::retry::with_retry;
use crate::traits::ArticleProvider;
use crate::types::{CandidateArticle, HarvestError, Result};
use crate::utils::time;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Tries each provider in priority order and returns the first non-empty result.
pub struct ArticleCollector {
    providers: Vec<Box<dyn ArticleProvider>>,
    retry: RetryPolicy,
}

impl ArticleCollector {
    pub fn new(providers: Vec<Box<dyn ArticleProvider>>, retry: RetryPolicy) -> Self {
        Self { providers, retry }
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.provider_name()).collect()
    }

    /// Collect articles for `source`. The window defaults to the 24 hours before `end`,
    /// and `end` to now.
    ///
    /// Later providers are only consulted when an earlier one failed after retries
    /// or came back empty. Results are never merged across providers.
    pub async fn collect(
        &self,
        source: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<CandidateArticle>> {
        let (start, end) = time::default_window(start, end, Utc::now());
        let mut last_error: Option<HarvestError> = None;

        for provider in &self.providers {
            let provider: &dyn ArticleProvider = provider.as_ref();
            let name = provider.provider_name();

            match with_retry(&self.retry, &name, move || provider.fetch(source, start, end)).await {
                Ok(articles) if !articles.is_empty() => {
                    info!("Successfully retrieved {} articles from {}", articles.len(), name);
                    return Ok(articles);
                }
                Ok(_) => {
                    warn!("{} returned no articles for {} between {} and {}", name, source, start, end);
                }
                Err(e) => {
                    warn!("{} failed: {}", name, e.describe());
                    last_error = Some(e);
                }
            }
        }

        let last = last_error
            .as_ref()
            .map(|e| e.describe())
            .unwrap_or_else(|| "none".to_string());
        let message = format!(
            "No articles found for {} between {} and {}. Last error: {}",
            source, start, end, last
        );

        Err(match last_error {
            Some(e) => HarvestError::collection_with(message, e),
            None => HarvestError::collection(message),
        })
    }
}
