use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use news_harvester::utils::time::parse_provider_timestamp;
use news_harvester::{ArticleQuery, ArticleStore, HarvestConfig, HarvestPipeline, PersistedArticle};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "news-harvester", version, about = "Collect, filter and store news articles by topic")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch articles from a source domain and keep the ones relevant to a topic
    Collect {
        /// Source domain, e.g. bbc.com
        #[arg(long)]
        source: String,
        #[arg(long)]
        topic: String,
        /// RFC 3339 or YYYY-MM-DD; defaults to 24 hours before --end
        #[arg(long, value_parser = parse_date)]
        start: Option<DateTime<Utc>>,
        /// RFC 3339 or YYYY-MM-DD; defaults to now
        #[arg(long, value_parser = parse_date)]
        end: Option<DateTime<Utc>>,
    },
    /// Show stored articles, newest first
    List {
        #[arg(long)]
        topic: Option<String>,
        #[arg(long, value_parser = parse_date)]
        start: Option<DateTime<Utc>>,
        #[arg(long, value_parser = parse_date)]
        end: Option<DateTime<Utc>>,
    },
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_provider_timestamp(raw).ok_or_else(|| format!("'{}' is not an RFC 3339 timestamp or YYYY-MM-DD date", raw))
}

fn print_articles(articles: &[PersistedArticle]) {
    for article in articles {
        println!(
            "{}  [{}]  {}  {}",
            article.publication_date.format("%Y-%m-%d %H:%M"),
            article.topic.as_deref().unwrap_or("-"),
            article.title,
            article.url
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = HarvestConfig::from_env().context("Failed to load configuration")?;

    match cli.command {
        Command::Collect { source, topic, start, end } => {
            let pipeline = HarvestPipeline::from_config(&config)
                .await
                .map_err(|e| anyhow::anyhow!(e.describe()))
                .context("Failed to start the harvesting pipeline")?;
            let articles = pipeline
                .collect_and_filter(&source, &topic, start, end)
                .await
                .map_err(|e| anyhow::anyhow!(e.describe()))?;
            info!("{} articles about '{}' from {}", articles.len(), topic, source);
            print_articles(&articles);
        }
        Command::List { topic, start, end } => {
            // Listing only needs the store, not provider or model credentials
            let store = ArticleStore::connect(&config.database_url)
                .await
                .map_err(|e| anyhow::anyhow!(e.describe()))?;
            let query = ArticleQuery { topic, start, end };
            let articles = store
                .query(&query)
                .await
                .map_err(|e| anyhow::anyhow!(e.describe()))?;
            info!("{} stored articles match", articles.len());
            print_articles(&articles);
        }
    }

    Ok(())
}
