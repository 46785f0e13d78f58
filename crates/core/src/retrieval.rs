//! Retriever trait — the abstraction over snippet search backends.
//!
//! A Retriever answers a query with candidate snippets ordered by
//! descending relevance. Implementations: keyword index, vector index.

use async_trait::async_trait;

use crate::error::RetrievalError;
use crate::snippet::Snippet;

/// The retrieval port.
///
/// The snippet window calls `search` once per conversational turn without
/// knowing which backend is behind it.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// A human-readable name for this retriever (e.g., "keyword", "vector").
    fn name(&self) -> &str;

    /// Search for snippets relevant to `query`.
    ///
    /// Returns at most `limit` candidates, most relevant first. Failures
    /// (index unavailable, embedding error) must surface as errors, never
    /// as an empty result set — an empty result means "nothing relevant",
    /// not "the index broke".
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> std::result::Result<Vec<Snippet>, RetrievalError>;
}
