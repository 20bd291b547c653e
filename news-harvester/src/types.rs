use std::error::Error as StdError;

// Use the interfaces crate for the shared article records
pub use interfaces::defs::{ArticleQuery, CandidateArticle, PersistedArticle};

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("{message}")]
    Collection {
        message: String,
        #[source]
        cause: Option<BoxError>,
    },

    #[error("{message}")]
    Filter {
        message: String,
        #[source]
        cause: Option<BoxError>,
    },

    #[error("{message}")]
    Persistence {
        message: String,
        #[source]
        cause: Option<BoxError>,
    },

    #[error("{message}")]
    ReportGeneration {
        message: String,
        #[source]
        cause: Option<BoxError>,
    },

    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

impl HarvestError {
    pub fn collection(message: impl Into<String>) -> Self {
        Self::Collection { message: message.into(), cause: None }
    }

    pub fn collection_with(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::Collection { message: message.into(), cause: Some(cause.into()) }
    }

    pub fn filter(message: impl Into<String>) -> Self {
        Self::Filter { message: message.into(), cause: None }
    }

    pub fn filter_with(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::Filter { message: message.into(), cause: Some(cause.into()) }
    }

    pub fn persistence_with(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::Persistence { message: message.into(), cause: Some(cause.into()) }
    }

    pub fn report_generation(message: impl Into<String>) -> Self {
        Self::ReportGeneration { message: message.into(), cause: None }
    }

    pub fn report_generation_with(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::ReportGeneration { message: message.into(), cause: Some(cause.into()) }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Short name of the error kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            HarvestError::Collection { .. } => "collection",
            HarvestError::Filter { .. } => "filter",
            HarvestError::Persistence { .. } => "persistence",
            HarvestError::ReportGeneration { .. } => "report_generation",
            HarvestError::Config { .. } => "config",
        }
    }

    /// Renders the message followed by every cause in the chain.
    pub fn describe(&self) -> String {
        let mut rendered = self.to_string();
        let mut current = StdError::source(self);
        while let Some(cause) = current {
            rendered.push_str(": ");
            rendered.push_str(&cause.to_string());
            current = cause.source();
        }
        rendered
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
