use crate::types::{CandidateArticle, PersistedArticle, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Trait for pulling articles from an external news provider
#[async_trait]
pub trait ArticleProvider: Send + Sync {
    /// Human-readable name for this provider, used in logs and error messages
    fn provider_name(&self) -> String;

    /// Fetch articles published by `source` (a bare domain) between `start` and `end`.
    ///
    /// A malformed individual article is skipped. A provider-level failure is a
    /// `HarvestError::Collection` carrying the underlying cause.
    async fn fetch(
        &self,
        source: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CandidateArticle>>;
}

/// Reporting collaborator. Errors it returns are `HarvestError::ReportGeneration`
/// and travel through the pipeline untouched.
pub trait ReportGenerator: Send + Sync {
    fn generate(&self, articles: &[PersistedArticle], topic: &str) -> Result<PathBuf>;
}
