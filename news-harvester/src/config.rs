use crate::types::{HarvestError, Result};
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Which external source a provider slot refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    NewsApi,
    NewsData,
    Rss,
}

impl FromStr for ProviderKind {
    type Err = HarvestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "newsapi" => Ok(ProviderKind::NewsApi),
            "newsdata" => Ok(ProviderKind::NewsData),
            "rss" => Ok(ProviderKind::Rss),
            other => Err(HarvestError::config(format!("unknown provider '{}'", other))),
        }
    }
}

/// Bounded retry: fixed attempt count, exponentially growing wait between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// No waiting between attempts. Mostly useful in tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            multiplier: 2.0,
            max_delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(32),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "News-Harvester/1.0".to_string(),
            timeout_seconds: 10,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewsApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub fetch: FetchConfig,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://newsapi.org".to_string(),
            fetch: FetchConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewsDataConfig {
    pub api_key: String,
    pub base_url: String,
    pub fetch: FetchConfig,
}

impl Default for NewsDataConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://newsdata.io".to_string(),
            fetch: FetchConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RssConfig {
    /// Scheme and host prefix for the queried domain. Tests point this at a mock server.
    pub base_url_template: String,
    pub feed_paths: Vec<String>,
    pub fetch: FetchConfig,
}

impl Default for RssConfig {
    fn default() -> Self {
        Self {
            base_url_template: "https://{source}".to_string(),
            feed_paths: vec!["/rss".to_string(), "/feed".to_string(), "/rss.xml".to_string()],
            fetch: FetchConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.3,
            max_tokens: 100,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub retry: RetryPolicy,
    /// Classification calls in flight at once. 1 means strictly sequential.
    pub max_concurrency: usize,
    pub content_prefix_chars: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            max_concurrency: 1,
            content_prefix_chars: 1000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub database_url: String,
    pub providers: Vec<ProviderKind>,
    pub retry: RetryPolicy,
    pub newsapi: NewsApiConfig,
    pub newsdata: NewsDataConfig,
    pub rss: RssConfig,
    pub llm: LlmConfig,
    pub filter: FilterConfig,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://news_harvester.db".to_string(),
            providers: vec![ProviderKind::NewsApi, ProviderKind::NewsData],
            retry: RetryPolicy::default(),
            newsapi: NewsApiConfig::default(),
            newsdata: NewsDataConfig::default(),
            rss: RssConfig::default(),
            llm: LlmConfig::default(),
            filter: FilterConfig::default(),
        }
    }
}

impl HarvestConfig {
    /// Reads settings from the process environment and `./.env`, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_env_file(".env")
    }

    /// Process environment first, then the dotenv file at `path` if it exists.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_vars = if path.is_file() {
            read_env_file(path)?
        } else {
            HashMap::new()
        };
        Self::from_lookup(|key| env::var(key).ok().or_else(|| file_vars.get(key).cloned()))
    }

    /// Same as [`HarvestConfig::from_env`] but with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = HarvestConfig::default();

        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(key) = lookup("NEWS_API_KEY") {
            config.newsapi.api_key = key;
        }
        if let Some(key) = lookup("NEWS_DATA_API_KEY") {
            config.newsdata.api_key = key;
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            config.llm.api_key = key;
        }
        if let Some(base_url) = lookup("OPENAI_BASE_URL") {
            config.llm.base_url = base_url;
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            config.llm.model = model;
        }
        if let Some(timeout) = parse_var(&lookup, "OPENAI_TIMEOUT")? {
            config.llm.timeout_seconds = timeout;
        }
        if let Some(temperature) = parse_var(&lookup, "LLM_TEMPERATURE")? {
            config.llm.temperature = temperature;
        }
        if let Some(max_tokens) = parse_var(&lookup, "LLM_MAX_TOKENS")? {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(timeout) = parse_var::<u64, _>(&lookup, "NEWS_API_TIMEOUT")? {
            config.newsapi.fetch.timeout_seconds = timeout;
            config.newsdata.fetch.timeout_seconds = timeout;
            config.rss.fetch.timeout_seconds = timeout;
        }
        if let Some(max_attempts) = parse_var::<u32, _>(&lookup, "MAX_RETRIES")? {
            if max_attempts == 0 {
                return Err(HarvestError::config("MAX_RETRIES must be at least 1"));
            }
            config.retry.max_attempts = max_attempts;
            config.filter.retry.max_attempts = max_attempts;
        }
        if let Some(delay) = parse_var::<u64, _>(&lookup, "RETRY_DELAY")? {
            config.retry.initial_delay = Duration::from_secs(delay);
            config.filter.retry.initial_delay = Duration::from_secs(delay);
        }
        if let Some(concurrency) = parse_var(&lookup, "FILTER_CONCURRENCY")? {
            config.filter.max_concurrency = concurrency;
        }
        if let Some(providers) = lookup("HARVEST_PROVIDERS") {
            config.providers = providers
                .split(',')
                .filter(|name| !name.trim().is_empty())
                .map(ProviderKind::from_str)
                .collect::<Result<Vec<_>>>()?;
            if config.providers.is_empty() {
                return Err(HarvestError::config("HARVEST_PROVIDERS names no provider"));
            }
        }

        Ok(config)
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let entries = dotenv::from_path_iter(path)
        .map_err(|e| HarvestError::config(format!("cannot read {}: {}", path.display(), e)))?;

    entries
        .map(|entry| entry.map_err(|e| HarvestError::config(format!("{}: {}", path.display(), e))))
        .collect()
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| HarvestError::config(format!("{} = '{}': {}", key, raw, e))),
        None => Ok(None),
    }
}
