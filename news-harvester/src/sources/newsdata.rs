use crate::config::NewsDataConfig;
use crate::fetcher::Fetcher;
use crate::traits::ArticleProvider;
use crate::types::{CandidateArticle, HarvestError, Result};
use crate::utils::{text, time, url as url_utils};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

const PROVIDER: &str = "NewsData";

/// NewsData.io archive adapter.
///
/// The archive endpoint only takes day-granular bounds, so the whole first and
/// last day of the window are requested. `pubDate` comes without a zone and is
/// read as UTC.
pub struct NewsDataSource {
    api_key: String,
    endpoint: Url,
    fetcher: Fetcher,
}

impl NewsDataSource {
    pub fn new(config: &NewsDataConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(HarvestError::collection("NewsData initialization failed: no API key configured"));
        }
        let endpoint = Url::parse(&config.base_url)
            .and_then(|base| base.join("/api/1/archive"))
            .map_err(|e| HarvestError::collection_with("NewsData initialization failed: invalid base URL", e))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            endpoint,
            fetcher: Fetcher::new(PROVIDER, &config.fetch)?,
        })
    }

    fn request_url(&self, source: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("apikey", &self.api_key)
            .append_pair("domainurl", source)
            .append_pair("from_date", &time::format_day(&start))
            .append_pair("to_date", &time::format_day(&end))
            .append_pair("language", "en");
        url
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    results: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    title: Option<String>,
    link: Option<String>,
    pub_date: Option<String>,
    description: Option<String>,
}

fn convert_article(raw: serde_json::Value, source: &str) -> std::result::Result<CandidateArticle, String> {
    let raw: RawArticle = serde_json::from_value(raw).map_err(|e| format!("unexpected shape: {}", e))?;

    let title = text::non_empty(raw.title.as_deref()).ok_or("missing title")?;
    let link = raw.link.as_deref().ok_or("missing link")?;
    let url = url_utils::normalize_article_url(link).ok_or_else(|| format!("invalid link '{}'", link))?;
    let published = raw.pub_date.as_deref().ok_or("missing pubDate")?;
    let publication_date = time::parse_provider_timestamp(published)
        .ok_or_else(|| format!("unparsable pubDate '{}'", published))?;

    Ok(CandidateArticle::new(
        title,
        url,
        publication_date,
        source,
        raw.description.unwrap_or_default(),
    ))
}

fn error_message(results: &serde_json::Value) -> String {
    results
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown error")
        .to_string()
}

#[async_trait]
impl ArticleProvider for NewsDataSource {
    fn provider_name(&self) -> String {
        PROVIDER.to_string()
    }

    async fn fetch(
        &self,
        source: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CandidateArticle>> {
        let url = self.request_url(source, start, end);
        let body = self.fetcher.get_json(url, &[]).await?;

        let envelope: Envelope = serde_json::from_value(body)
            .map_err(|e| HarvestError::collection_with("NewsData response has an unexpected shape", e))?;

        if envelope.status != "success" {
            return Err(HarvestError::collection(format!(
                "NewsData error: {}",
                error_message(&envelope.results)
            )));
        }

        let raw_articles = match envelope.results {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Null => Vec::new(),
            other => {
                return Err(HarvestError::collection(format!(
                    "NewsData results is not a list: {}",
                    text::prefix_chars(&other.to_string(), 200)
                )))
            }
        };

        let mut articles = Vec::with_capacity(raw_articles.len());
        for raw in raw_articles {
            match convert_article(raw, source) {
                Ok(article) => articles.push(article),
                Err(reason) => warn!("Skipping NewsData article for {}: {}", source, reason),
            }
        }

        info!("Successfully collected {} articles from NewsData for {}", articles.len(), source);
        Ok(articles)
    }
}
