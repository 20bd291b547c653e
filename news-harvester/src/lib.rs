pub mod types;
pub mod config;
pub mod retry;
pub mod traits;
pub mod utils;
pub mod fetcher;
pub mod parser;
pub mod sources;
pub mod collector;
pub mod llm_adapter;
pub mod filter;
pub mod article_store;
pub mod pipeline;

pub use types::*;
pub use config::{FetchConfig, FilterConfig, HarvestConfig, LlmConfig, ProviderKind, RetryPolicy};
pub use traits::{ArticleProvider, ReportGenerator};
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use sources::{NewsApiSource, NewsDataSource, RssFeedSource};
pub use collector::ArticleCollector;
pub use llm_adapter::{ChatRequest, LlmAdapter, OpenAiAdapter};
pub use filter::RelevanceFilter;
pub use article_store::ArticleStore;
pub use pipeline::HarvestPipeline;
