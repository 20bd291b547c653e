use crate::types::{ArticleQuery, CandidateArticle, HarvestError, PersistedArticle, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info, warn};
use uuid::Uuid;

const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        url TEXT NOT NULL UNIQUE,
        publication_date TEXT NOT NULL,
        source TEXT NOT NULL,
        content TEXT NOT NULL,
        topic TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_articles_topic ON articles (topic)",
    "CREATE INDEX IF NOT EXISTS idx_articles_publication_date ON articles (publication_date)",
    "CREATE INDEX IF NOT EXISTS idx_articles_source ON articles (source)",
];

const ARTICLE_COLUMNS: &str =
    "id, title, url, publication_date, source, content, topic, created_at, updated_at";

/// Durable article storage keyed by URL.
pub struct ArticleStore {
    db: SqlitePool,
}

enum MergeOutcome {
    Inserted(PersistedArticle),
    Existing(PersistedArticle),
}

impl ArticleStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| HarvestError::persistence_with(format!("Invalid database URL {}", database_url), e))?
            .create_if_missing(true);

        if is_in_memory_url(database_url) {
            return Self::open_in_memory(options).await;
        }

        let db = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| HarvestError::persistence_with("Failed to connect to the article database", e))?;

        let store = Self { db };
        store.setup_schema().await?;
        Ok(store)
    }

    /// Private in-memory database, gone when the store is dropped.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| HarvestError::persistence_with("Invalid in-memory database URL", e))?;
        Self::open_in_memory(options).await
    }

    async fn open_in_memory(options: SqliteConnectOptions) -> Result<Self> {
        // Each SQLite connection owns its own memory database, so keep exactly one alive
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| HarvestError::persistence_with("Failed to open in-memory article database", e))?;

        let store = Self { db };
        store.setup_schema().await?;
        Ok(store)
    }

    pub async fn setup_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.db)
                .await
                .map_err(|e| HarvestError::persistence_with("Failed to create article tables", e))?;
        }
        debug!("Article schema ready");
        Ok(())
    }

    pub async fn find_by_url(&self, url: &str) -> Result<Option<PersistedArticle>> {
        self.lookup(url)
            .await
            .map_err(|e| HarvestError::persistence_with(format!("Failed to look up article {}", url), e))
    }

    /// Merge filtered articles into the store.
    ///
    /// An article whose URL is already stored resolves to the stored record
    /// unchanged. The result follows input order; articles that could not be
    /// saved are logged and left out. When no article at all could be saved,
    /// the store itself is failing and the last error escalates.
    pub async fn merge(&self, articles: &[CandidateArticle]) -> Result<Vec<PersistedArticle>> {
        let conn = self
            .db
            .acquire()
            .await
            .map_err(|e| HarvestError::persistence_with("Article database unavailable", e))?;
        drop(conn);

        let mut saved_articles = Vec::with_capacity(articles.len());
        let mut inserted = 0;
        let mut last_error: Option<sqlx::Error> = None;

        for article in articles {
            match self.merge_one(article).await {
                Ok(MergeOutcome::Inserted(record)) => {
                    inserted += 1;
                    saved_articles.push(record);
                }
                Ok(MergeOutcome::Existing(record)) => {
                    debug!("Article with URL {} already exists. Skipping insert.", record.url);
                    saved_articles.push(record);
                }
                Err(e) => {
                    warn!("Failed to save article {}: {}", article.url, e);
                    last_error = Some(e);
                }
            }
        }

        if saved_articles.is_empty() {
            if let Some(e) = last_error {
                return Err(HarvestError::persistence_with(
                    format!("Could not save any of {} articles", articles.len()),
                    e,
                ));
            }
        }

        info!(
            "Stored {} new articles, {} already present, {} failed",
            inserted,
            saved_articles.len() - inserted,
            articles.len() - saved_articles.len()
        );
        Ok(saved_articles)
    }

    async fn merge_one(&self, article: &CandidateArticle) -> std::result::Result<MergeOutcome, sqlx::Error> {
        if let Some(existing) = self.lookup(&article.url).await? {
            return Ok(MergeOutcome::Existing(existing));
        }

        let record = PersistedArticle::from_candidate(article, Utc::now());
        match self.insert(&record).await {
            Ok(()) => Ok(MergeOutcome::Inserted(record)),
            // Lost a race with another writer for the same URL
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                debug!("Concurrent insert detected for {}", article.url);
                self.lookup(&article.url)
                    .await?
                    .map(MergeOutcome::Existing)
                    .ok_or(sqlx::Error::RowNotFound)
            }
            Err(e) => Err(e),
        }
    }

    async fn lookup(&self, url: &str) -> std::result::Result<Option<PersistedArticle>, sqlx::Error> {
        let sql = format!("SELECT {} FROM articles WHERE url = ?", ARTICLE_COLUMNS);
        let row = sqlx::query(&sql).bind(url).fetch_optional(&self.db).await?;
        row.as_ref().map(row_to_article).transpose()
    }

    async fn insert(&self, record: &PersistedArticle) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO articles (id, title, url, publication_date, source, content, topic, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.title)
        .bind(&record.url)
        .bind(record.publication_date)
        .bind(&record.source)
        .bind(&record.content)
        .bind(&record.topic)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    /// Stored articles matching `query`, newest publication first.
    pub async fn query(&self, query: &ArticleQuery) -> Result<Vec<PersistedArticle>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM articles WHERE 1 = 1", ARTICLE_COLUMNS));
        if let Some(topic) = &query.topic {
            // Topics are stamped trimmed
            builder.push(" AND topic = ").push_bind(topic.trim().to_string());
        }
        if let Some(start) = query.start {
            builder.push(" AND publication_date >= ").push_bind(start);
        }
        if let Some(end) = query.end {
            builder.push(" AND publication_date <= ").push_bind(end);
        }
        builder.push(" ORDER BY publication_date DESC");

        let rows = builder
            .build()
            .fetch_all(&self.db)
            .await
            .map_err(|e| HarvestError::persistence_with("Failed to query database", e))?;

        rows.iter()
            .map(row_to_article)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| HarvestError::persistence_with("Stored article could not be decoded", e))
    }

    pub async fn article_count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.db)
            .await
            .map_err(|e| HarvestError::persistence_with("Failed to count articles", e))
    }
}

fn is_in_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn row_to_article(row: &SqliteRow) -> std::result::Result<PersistedArticle, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(PersistedArticle {
        id,
        title: row.try_get("title")?,
        url: row.try_get("url")?,
        publication_date: row.try_get::<DateTime<Utc>, _>("publication_date")?,
        source: row.try_get("source")?,
        content: row.try_get("content")?,
        topic: row.try_get("topic")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}
