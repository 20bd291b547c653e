#![allow(dead_code)]

// Shared helpers for the news-harvester integration tests
pub use news_harvester::{
    ArticleCollector, ArticleProvider, ArticleStore, CandidateArticle, ChatRequest, FilterConfig, HarvestError,
    LlmAdapter, RelevanceFilter, Result, RetryPolicy,
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// Install a test subscriber once per test binary
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
}

/// `Story {n}` at `https://{source}/news/{n}`, published `n` hours after the base time
pub fn sample_article(n: usize, source: &str) -> CandidateArticle {
    CandidateArticle::new(
        format!("Story {}", n),
        format!("https://{}/news/{}", source, n),
        base_time() + Duration::hours(n as i64),
        source,
        format!("Body of story {}", n),
    )
}

pub fn sample_articles(count: usize, source: &str) -> Vec<CandidateArticle> {
    (1..=count).map(|n| sample_article(n, source)).collect()
}

/// What a scripted provider does on every call
#[derive(Clone)]
pub enum Script {
    Articles(Vec<CandidateArticle>),
    Empty,
    Fail(&'static str),
}

pub struct ScriptedProvider {
    name: String,
    script: Script,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    /// Returns the provider and a handle on its call counter
    pub fn new(name: &str, script: Script) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Self {
            name: name.to_string(),
            script,
            calls: calls.clone(),
        };
        (provider, calls)
    }
}

#[async_trait]
impl ArticleProvider for ScriptedProvider {
    fn provider_name(&self) -> String {
        self.name.clone()
    }

    async fn fetch(&self, _source: &str, _start: DateTime<Utc>, _end: DateTime<Utc>) -> Result<Vec<CandidateArticle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Articles(articles) => Ok(articles.clone()),
            Script::Empty => Ok(Vec::new()),
            Script::Fail(reason) => Err(HarvestError::collection(format!("{} failed: {}", self.name, reason))),
        }
    }
}

type Responder = dyn Fn(&ChatRequest, usize) -> Result<String> + Send + Sync;

/// LLM double answering through a closure; the closure also sees the call number (0-based)
pub struct ScriptedLlm {
    responder: Box<Responder>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedLlm {
    pub fn new<F>(responder: F) -> (Arc<Self>, Arc<AtomicUsize>)
    where
        F: Fn(&ChatRequest, usize) -> Result<String> + Send + Sync + 'static,
    {
        let calls = Arc::new(AtomicUsize::new(0));
        let llm = Arc::new(Self {
            responder: Box::new(responder),
            calls: calls.clone(),
        });
        (llm, calls)
    }

    /// Says "yes" exactly for the listed `Story {n}` titles
    pub fn relevant_titles(numbers: &[usize]) -> (Arc<Self>, Arc<AtomicUsize>) {
        let titles: Vec<String> = numbers.iter().map(|n| format!("Article Title: Story {}\n", n)).collect();
        Self::new(move |request, _| {
            if titles.iter().any(|t| request.user.contains(t)) {
                Ok("yes".to_string())
            } else {
                Ok("no".to_string())
            }
        })
    }
}

#[async_trait]
impl LlmAdapter for ScriptedLlm {
    fn adapter_name(&self) -> String {
        "scripted".to_string()
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        (self.responder)(request, call)
    }
}

pub fn filter_config(max_attempts: u32) -> FilterConfig {
    FilterConfig {
        retry: RetryPolicy::immediate(max_attempts),
        ..FilterConfig::default()
    }
}

pub async fn memory_store() -> Result<Arc<ArticleStore>> {
    Ok(Arc::new(ArticleStore::in_memory().await?))
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
