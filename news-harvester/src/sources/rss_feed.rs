use crate::config::RssConfig;
use crate::fetcher::Fetcher;
use crate::parser::FeedParser;
use crate::traits::ArticleProvider;
use crate::types::{CandidateArticle, HarvestError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use url::Url;

const PROVIDER: &str = "RSS";

/// Reads the site's own RSS/Atom feed.
///
/// Feeds have no server-side date window, so entries outside `[start, end]`
/// are dropped after parsing.
pub struct RssFeedSource {
    base_url_template: String,
    feed_paths: Vec<String>,
    fetcher: Fetcher,
}

impl RssFeedSource {
    pub fn new(config: &RssConfig) -> Result<Self> {
        if config.feed_paths.is_empty() {
            return Err(HarvestError::collection("RSS initialization failed: no feed paths configured"));
        }
        Ok(Self {
            base_url_template: config.base_url_template.clone(),
            feed_paths: config.feed_paths.clone(),
            fetcher: Fetcher::new(PROVIDER, &config.fetch)?,
        })
    }

    fn feed_urls(&self, source: &str) -> Result<Vec<Url>> {
        let base = self.base_url_template.replace("{source}", source);
        let base = Url::parse(&base)
            .map_err(|e| HarvestError::collection_with(format!("Invalid feed base URL '{}'", base), e))?;

        self.feed_paths
            .iter()
            .map(|path| {
                base.join(path)
                    .map_err(|e| HarvestError::collection_with(format!("Invalid feed path '{}'", path), e))
            })
            .collect()
    }

    async fn fetch_feed(&self, url: Url, source: &str) -> Result<Vec<CandidateArticle>> {
        let content = self.fetcher.get_text(url).await?;
        if !FeedParser::is_valid_feed_content(&content) {
            return Err(HarvestError::collection("Response is not an RSS or Atom document"));
        }
        FeedParser::parse_articles(&content, source)
    }
}

#[async_trait]
impl ArticleProvider for RssFeedSource {
    fn provider_name(&self) -> String {
        PROVIDER.to_string()
    }

    async fn fetch(
        &self,
        source: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CandidateArticle>> {
        let mut last_error = None;

        for url in self.feed_urls(source)? {
            debug!("Trying feed {} for {}", url.path(), source);
            match self.fetch_feed(url.clone(), source).await {
                Ok(articles) => {
                    let total = articles.len();
                    let in_window: Vec<CandidateArticle> = articles
                        .into_iter()
                        .filter(|a| a.publication_date >= start && a.publication_date <= end)
                        .collect();
                    info!(
                        "Successfully collected {} articles from RSS feed {} ({} outside the window)",
                        in_window.len(),
                        url.path(),
                        total - in_window.len()
                    );
                    return Ok(in_window);
                }
                Err(e) => {
                    warn!("No usable feed at {} for {}: {}", url.path(), source, e);
                    last_error = Some(e);
                }
            }
        }

        let message = format!("No RSS feed found for {}", source);
        Err(match last_error {
            Some(e) => HarvestError::collection_with(message, e),
            None => HarvestError::collection(message),
        })
    }
}
