use crate::types::{CandidateArticle, HarvestError, Result};
use crate::utils::{text, url as url_utils};
use chrono::Utc;
use feed_rs::parser;
use tracing::{debug, info};

/// Turns RSS/Atom documents into candidate articles.
pub struct FeedParser;

impl FeedParser {
    pub fn parse_articles(content: &str, source: &str) -> Result<Vec<CandidateArticle>> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| HarvestError::collection_with("Failed to parse feed", e))?;

        let total = feed.entries.len();
        let mut articles = Vec::with_capacity(total);
        for entry in feed.entries {
            match Self::convert_entry(entry, source) {
                Ok(article) => articles.push(article),
                Err(reason) => debug!("Skipping feed entry for {}: {}", source, reason),
            }
        }

        info!("Parsed feed with {} usable entries out of {}", articles.len(), total);
        Ok(articles)
    }

    fn convert_entry(entry: feed_rs::model::Entry, source: &str) -> std::result::Result<CandidateArticle, String> {
        let title = text::non_empty(entry.title.as_ref().map(|t| t.content.as_str())).ok_or("missing title")?;

        let link = entry.links.first().map(|l| l.href.as_str()).ok_or("missing link")?;
        let url = url_utils::normalize_article_url(link).ok_or_else(|| format!("invalid link '{}'", link))?;

        // Prefer the publication date; fall back to the last update
        let publication_date = entry
            .published
            .or(entry.updated)
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or("missing publication date")?;

        // Summary first, full body when the feed has no summary
        let content = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .unwrap_or_default();

        Ok(CandidateArticle::new(title, url, publication_date, source, content))
    }

    /// Basic check that a body looks like RSS or Atom before handing it to the parser
    pub fn is_valid_feed_content(content: &str) -> bool {
        let content_lower = content.to_lowercase();
        content_lower.contains("<rss") || content_lower.contains("<feed") || content_lower.contains("<rdf:rdf")
    }
}
