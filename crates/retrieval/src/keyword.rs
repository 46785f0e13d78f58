//! Keyword index — dependency-free term-occurrence retrieval.
//!
//! Scores each passage by occurrences of the query terms, normalized by
//! passage length so short passages are not drowned out by long ones.
//! Useful for tests and local corpora where no embedding endpoint is
//! available.

use async_trait::async_trait;
use delphi_core::error::RetrievalError;
use delphi_core::retrieval::Retriever;
use delphi_core::snippet::Snippet;
use tokio::sync::RwLock;
use tracing::debug;

/// Terms shorter than this are ignored; they match everywhere.
const MIN_TERM_LEN: usize = 3;

/// An in-process keyword index over a passage corpus.
pub struct KeywordIndex {
    passages: RwLock<Vec<Snippet>>,
}

impl KeywordIndex {
    pub fn new() -> Self {
        Self {
            passages: RwLock::new(Vec::new()),
        }
    }

    pub fn from_passages(passages: Vec<Snippet>) -> Self {
        Self {
            passages: RwLock::new(passages),
        }
    }

    /// Add a passage to the index.
    pub async fn add(&self, passage: Snippet) {
        self.passages.write().await.push(passage);
    }

    pub async fn len(&self) -> usize {
        self.passages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.passages.read().await.is_empty()
    }

    /// Term occurrences over title + body, per 100 characters of passage.
    fn score(passage: &Snippet, terms: &[String]) -> f32 {
        let haystack = format!("{}\n{}", passage.title, passage.body).to_lowercase();
        let occurrences: usize = terms
            .iter()
            .map(|term| haystack.matches(term.as_str()).count())
            .sum();
        occurrences as f32 / (haystack.len() as f32 / 100.0).max(1.0)
    }
}

impl Default for KeywordIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Retriever for KeywordIndex {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> std::result::Result<Vec<Snippet>, RetrievalError> {
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .filter(|t| t.len() >= MIN_TERM_LEN)
            .map(str::to_string)
            .collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let passages = self.passages.read().await;
        let mut scored: Vec<(f32, Snippet)> = passages
            .iter()
            .filter_map(|p| {
                let score = Self::score(p, &terms);
                (score > 0.0).then(|| (score, p.clone()))
            })
            .collect();

        // Stable sort: ties keep insertion order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        debug!(
            terms = terms.len(),
            results = scored.len(),
            "Keyword search complete"
        );
        Ok(scored.into_iter().map(|(_, p)| p).collect())
    }
}
