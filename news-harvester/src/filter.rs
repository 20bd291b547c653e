use crate::config::FilterConfig;
use crate::llm_adapter::{ChatRequest, LlmAdapter};
use crate::retry::with_retry;
use crate::types::{CandidateArticle, HarvestError, Result};
use crate::utils::text;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

const SYSTEM_DIRECTIVE: &str = "You are a precise article classifier that responds only with 'yes' or 'no'.";

/// Keeps the articles a language model judges relevant to a topic.
pub struct RelevanceFilter {
    llm: Arc<dyn LlmAdapter>,
    config: FilterConfig,
}

impl RelevanceFilter {
    pub fn new(llm: Arc<dyn LlmAdapter>, config: FilterConfig) -> Self {
        Self { llm, config }
    }

    fn build_prompt(&self, article: &CandidateArticle, topic: &str) -> String {
        format!(
            "Analyze if the following article is related to the topic: {}\n\n\
             Article Title: {}\n\
             Article Content: {}\n\n\
             Respond with only 'yes' if the article is related to the topic, or 'no' if it's not.",
            topic,
            article.title,
            text::prefix_chars(&article.content, self.config.content_prefix_chars)
        )
    }

    /// One classification call, retried on failure. Anything but a plain "yes" is a no.
    async fn is_relevant(&self, article: &CandidateArticle, topic: &str) -> Result<bool> {
        let request = ChatRequest {
            system: SYSTEM_DIRECTIVE.to_string(),
            user: self.build_prompt(article, topic),
            temperature: None,
            max_tokens: None,
        };
        let label = format!("relevance check for '{}'", article.title);

        let llm = self.llm.as_ref();
        let request = &request;
        let answer = with_retry(&self.config.retry, &label, move || llm.complete(request)).await?;
        Ok(is_affirmative(&answer))
    }

    /// Returns the relevant subset of `articles` in their original order, each
    /// stamped with `topic`. A classification that keeps failing drops only
    /// that article.
    pub async fn filter(&self, articles: Vec<CandidateArticle>, topic: &str) -> Result<Vec<CandidateArticle>> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(HarvestError::filter("Cannot filter articles against an empty topic"));
        }

        let total = articles.len();
        debug!(
            "Classifying {} articles against '{}' with {}",
            total,
            topic,
            self.llm.adapter_name()
        );

        // `buffered` yields in submission order, whatever order the calls finish in
        let verdicts: Vec<(CandidateArticle, Result<bool>)> = stream::iter(articles)
            .map(|article| async move {
                let verdict = self.is_relevant(&article, topic).await;
                (article, verdict)
            })
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let mut relevant_articles = Vec::new();
        for (article, verdict) in verdicts {
            match verdict {
                Ok(true) => relevant_articles.push(article.with_topic(topic)),
                Ok(false) => {}
                Err(e) => warn!("Failed to filter article '{}': {}", article.title, e.describe()),
            }
        }

        info!("Filtered {} relevant articles out of {}", relevant_articles.len(), total);
        Ok(relevant_articles)
    }
}

fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}
