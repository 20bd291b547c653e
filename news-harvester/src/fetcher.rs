use crate::config::FetchConfig;
use crate::types::{HarvestError, Result};
use reqwest::{Client, Response};
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

/// Thin HTTP client shared by the provider adapters. Every failure it reports
/// is a `HarvestError::Collection` naming the provider.
pub struct Fetcher {
    client: Client,
    provider: String,
}

impl Fetcher {
    pub fn new(provider: impl Into<String>, config: &FetchConfig) -> Result<Self> {
        let provider = provider.into();
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| {
                HarvestError::collection_with(format!("{} HTTP client could not be created", provider), e)
            })?;

        Ok(Self { client, provider })
    }

    pub async fn get_json(&self, url: Url, headers: &[(&str, &str)]) -> Result<serde_json::Value> {
        let response = self.send(url, headers).await?;
        response.json::<serde_json::Value>().await.map_err(|e| {
            HarvestError::collection_with(format!("{} returned an unreadable JSON body", self.provider), e)
        })
    }

    pub async fn get_text(&self, url: Url) -> Result<String> {
        let response = self.send(url, &[]).await?;
        response.text().await.map_err(|e| {
            HarvestError::collection_with(format!("{} response body could not be read", self.provider), e)
        })
    }

    async fn send(&self, url: Url, headers: &[(&str, &str)]) -> Result<Response> {
        let start_time = Instant::now();
        debug!("{} request: {}://{}{}", self.provider, url.scheme(), url.host_str().unwrap_or(""), url.path());

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|e| {
            HarvestError::collection_with(format!("{} request failed", self.provider), e)
        })?;

        let status = response.status();
        debug!(
            "{} responded {} in {}ms",
            self.provider,
            status,
            start_time.elapsed().as_millis()
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HarvestError::collection_with(
                format!("{} returned HTTP {}", self.provider, status),
                body_excerpt(&body),
            ));
        }

        Ok(response)
    }
}

fn body_excerpt(body: &str) -> String {
    let excerpt = crate::utils::text::prefix_chars(body.trim(), 300);
    if excerpt.is_empty() {
        "empty response body".to_string()
    } else {
        excerpt.to_string()
    }
}
