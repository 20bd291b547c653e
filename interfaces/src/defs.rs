use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An article as returned by a provider, before relevance judgment or storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateArticle {
    pub title: String,
    /// Absolute URL, used as the dedup key once persisted.
    pub url: String,
    pub publication_date: DateTime<Utc>,
    /// The domain that was queried, e.g. `bbc.com`.
    pub source: String,
    pub content: String,
    pub topic: Option<String>,
}

impl CandidateArticle {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        publication_date: DateTime<Utc>,
        source: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            publication_date,
            source: source.into(),
            content: content.into(),
            topic: None,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }
}

/// A stored article. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedArticle {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub publication_date: DateTime<Utc>,
    pub source: String,
    pub content: String,
    pub topic: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PersistedArticle {
    /// Builds the record that will be written for a first-seen article.
    pub fn from_candidate(article: &CandidateArticle, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: article.title.clone(),
            url: article.url.clone(),
            publication_date: article.publication_date,
            source: article.source.clone(),
            content: article.content.clone(),
            topic: article.topic.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Read-only selection over stored articles. Bounds are inclusive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleQuery {
    pub topic: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ArticleQuery {
    pub fn for_topic(topic: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
            ..Default::default()
        }
    }

    pub fn between(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.start = start;
        self.end = end;
        self
    }
}

// Object style note:
// These records are plain data shared between the harvesting pipeline and
// its collaborators (reporting, presentation). Behavior lives in the
// news-harvester crate; keep this module free of I/O.
