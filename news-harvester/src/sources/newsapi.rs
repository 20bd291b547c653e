use crate::config::NewsApiConfig;
use crate::fetcher::Fetcher;
use crate::traits::ArticleProvider;
use crate::types::{CandidateArticle, HarvestError, Result};
use crate::utils::{text, time, url as url_utils};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

const PROVIDER: &str = "NewsAPI";

/// NewsAPI `/v2/everything` adapter
pub struct NewsApiSource {
    api_key: String,
    endpoint: Url,
    fetcher: Fetcher,
}

impl NewsApiSource {
    pub fn new(config: &NewsApiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(HarvestError::collection("NewsAPI initialization failed: no API key configured"));
        }
        let endpoint = Url::parse(&config.base_url)
            .and_then(|base| base.join("/v2/everything"))
            .map_err(|e| HarvestError::collection_with("NewsAPI initialization failed: invalid base URL", e))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            endpoint,
            fetcher: Fetcher::new(PROVIDER, &config.fetch)?,
        })
    }

    fn request_url(&self, source: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("domains", source)
            .append_pair("from", &time::format_second_precision(&start))
            .append_pair("to", &time::format_second_precision(&end))
            .append_pair("language", "en")
            .append_pair("sortBy", "publishedAt")
            .append_pair("pageSize", "100");
        url
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    title: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    content: Option<String>,
    description: Option<String>,
}

fn convert_article(raw: serde_json::Value, source: &str) -> std::result::Result<CandidateArticle, String> {
    let raw: RawArticle = serde_json::from_value(raw).map_err(|e| format!("unexpected shape: {}", e))?;

    let title = text::non_empty(raw.title.as_deref()).ok_or("missing title")?;
    let link = raw.url.as_deref().ok_or("missing url")?;
    let url = url_utils::normalize_article_url(link).ok_or_else(|| format!("invalid url '{}'", link))?;
    let published = raw.published_at.as_deref().ok_or("missing publishedAt")?;
    let publication_date = time::parse_provider_timestamp(published)
        .ok_or_else(|| format!("unparsable publishedAt '{}'", published))?;
    let content = raw.content.or(raw.description).unwrap_or_default();

    Ok(CandidateArticle::new(title, url, publication_date, source, content))
}

#[async_trait]
impl ArticleProvider for NewsApiSource {
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
        let body = self.fetcher.get_json(url, &[("X-Api-Key", self.api_key.as_str())]).await?;

        let envelope: Envelope = serde_json::from_value(body)
            .map_err(|e| HarvestError::collection_with("NewsAPI response has an unexpected shape", e))?;

        if envelope.status != "ok" {
            return Err(HarvestError::collection(format!(
                "NewsAPI error ({}): {}",
                envelope.code.as_deref().unwrap_or("unknown"),
                envelope.message.as_deref().unwrap_or("Unknown error")
            )));
        }

        let mut articles = Vec::with_capacity(envelope.articles.len());
        for raw in envelope.articles {
            match convert_article(raw, source) {
                Ok(article) => articles.push(article),
                Err(reason) => warn!("Skipping NewsAPI article for {}: {}", source, reason),
            }
        }

        info!("Successfully collected {} articles from NewsAPI for {}", articles.len(), source);
        Ok(articles)
    }
}
