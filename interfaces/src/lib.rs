pub mod defs;

pub use defs::{ArticleQuery, CandidateArticle, PersistedArticle};
