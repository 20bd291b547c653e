use crate::article_store::ArticleStore;
use crate::collector::ArticleCollector;
use crate::config::HarvestConfig;
use crate::filter::RelevanceFilter;
use crate::llm_adapter::{LlmAdapter, OpenAiAdapter};
use crate::sources::build_provider;
use crate::traits::{ArticleProvider, ReportGenerator};
use crate::types::{ArticleQuery, HarvestError, PersistedArticle, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Collector → relevance filter → store, one run per call.
///
/// Step failures come back as the step's own `HarvestError` kind, unwrapped.
pub struct HarvestPipeline {
    collector: ArticleCollector,
    filter: RelevanceFilter,
    store: Arc<ArticleStore>,
    report_generator: Option<Box<dyn ReportGenerator>>,
}

impl HarvestPipeline {
    pub fn new(collector: ArticleCollector, filter: RelevanceFilter, store: Arc<ArticleStore>) -> Self {
        Self {
            collector,
            filter,
            store,
            report_generator: None,
        }
    }

    /// Wire up every configured provider, the OpenAI adapter and the SQLite store.
    ///
    /// A provider that cannot be initialised (usually a missing API key) is
    /// left out with a warning; having none left is a collection error.
    pub async fn from_config(config: &HarvestConfig) -> Result<Self> {
        let mut providers: Vec<Box<dyn ArticleProvider>> = Vec::new();
        for kind in &config.providers {
            match build_provider(*kind, config) {
                Ok(provider) => {
                    info!("Enabled provider {}", provider.provider_name());
                    providers.push(provider);
                }
                Err(e) => warn!("Skipping provider {:?}: {}", kind, e.describe()),
            }
        }
        if providers.is_empty() {
            return Err(HarvestError::collection("No news provider could be initialised"));
        }

        let llm: Arc<dyn LlmAdapter> = Arc::new(OpenAiAdapter::new(&config.llm)?);
        let store = Arc::new(ArticleStore::connect(&config.database_url).await?);

        Ok(Self::new(
            ArticleCollector::new(providers, config.retry.clone()),
            RelevanceFilter::new(llm, config.filter.clone()),
            store,
        ))
    }

    pub fn with_report_generator(mut self, generator: Box<dyn ReportGenerator>) -> Self {
        self.report_generator = Some(generator);
        self
    }

    /// Collect articles from `source`, keep those relevant to `topic` and
    /// persist them. Returns the stored record for every relevant article,
    /// whether it was new or already present.
    pub async fn collect_and_filter(
        &self,
        source: &str,
        topic: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<PersistedArticle>> {
        info!("Harvesting {} for topic '{}'", source, topic);

        let articles = self
            .collector
            .collect(source, start, end)
            .await
            .inspect_err(|e| error!(kind = e.kind(), "Collection failed: {}", e.describe()))?;

        let relevant_articles = self
            .filter
            .filter(articles, topic)
            .await
            .inspect_err(|e| error!(kind = e.kind(), "Filtering failed: {}", e.describe()))?;

        if relevant_articles.is_empty() {
            info!("No articles from {} are relevant to '{}'", source, topic);
            return Ok(Vec::new());
        }

        let saved_articles = self
            .store
            .merge(&relevant_articles)
            .await
            .inspect_err(|e| error!(kind = e.kind(), "Saving articles failed: {}", e.describe()))?;

        info!("Harvest of {} finished with {} saved articles", source, saved_articles.len());
        Ok(saved_articles)
    }

    pub async fn saved_articles(&self, query: &ArticleQuery) -> Result<Vec<PersistedArticle>> {
        self.store.query(query).await
    }

    /// Hand `articles` to the attached report generator and return the path it wrote.
    pub fn generate_report(&self, articles: &[PersistedArticle], topic: &str) -> Result<PathBuf> {
        let generator = self
            .report_generator
            .as_ref()
            .ok_or_else(|| HarvestError::report_generation("No report generator attached"))?;
        generator.generate(articles, topic)
    }
}
