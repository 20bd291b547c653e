pub mod newsapi;
pub mod newsdata;
pub mod rss_feed;

pub use newsapi::NewsApiSource;
pub use newsdata::NewsDataSource;
pub use rss_feed::RssFeedSource;

use crate::config::{HarvestConfig, ProviderKind};
use crate::traits::ArticleProvider;
use crate::types::Result;

/// Builds the adapter for one configured provider slot
pub fn build_provider(kind: ProviderKind, config: &HarvestConfig) -> Result<Box<dyn ArticleProvider>> {
    Ok(match kind {
        ProviderKind::NewsApi => Box::new(NewsApiSource::new(&config.newsapi)?),
        ProviderKind::NewsData => Box::new(NewsDataSource::new(&config.newsdata)?),
        ProviderKind::Rss => Box::new(RssFeedSource::new(&config.rss)?),
    })
}
