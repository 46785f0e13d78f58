//! Vector index — embedding-backed retrieval over provider embeddings.
//!
//! Passages are embedded through the provider port when indexed; each
//! search embeds the query and ranks by cosine similarity. Embedding
//! failures surface as retrieval errors, never as empty results.

use std::sync::Arc;

use async_trait::async_trait;
use delphi_core::error::{ProviderError, RetrievalError};
use delphi_core::provider::{EmbeddingRequest, Provider};
use delphi_core::retrieval::Retriever;
use delphi_core::snippet::Snippet;
use tokio::sync::RwLock;
use tracing::debug;

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 =
/// opposite. Returns 0.0 if the vectors differ in length or are empty.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

struct EmbeddedPassage {
    snippet: Snippet,
    embedding: Vec<f32>,
}

/// An in-process vector index.
pub struct VectorIndex {
    embedder: Arc<dyn Provider>,
    model: String,
    entries: RwLock<Vec<EmbeddedPassage>>,
}

impl VectorIndex {
    pub fn new(embedder: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            embedder,
            model: model.into(),
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Embed and index a batch of passages.
    pub async fn index(&self, passages: Vec<Snippet>) -> Result<(), RetrievalError> {
        if passages.is_empty() {
            return Ok(());
        }

        let inputs: Vec<String> = passages.iter().map(|p| p.body.clone()).collect();
        let response = self
            .embedder
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                inputs,
            })
            .await
            .map_err(embed_error)?;

        if response.embeddings.len() != passages.len() {
            return Err(RetrievalError::EmbeddingFailed(format!(
                "expected {} embeddings, got {}",
                passages.len(),
                response.embeddings.len()
            )));
        }

        let mut entries = self.entries.write().await;
        for (snippet, embedding) in passages.into_iter().zip(response.embeddings) {
            entries.push(EmbeddedPassage { snippet, embedding });
        }
        debug!(indexed = entries.len(), "Vector index updated");
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

fn embed_error(e: ProviderError) -> RetrievalError {
    RetrievalError::EmbeddingFailed(e.to_string())
}

#[async_trait]
impl Retriever for VectorIndex {
    fn name(&self) -> &str {
        "vector"
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> std::result::Result<Vec<Snippet>, RetrievalError> {
        let response = self
            .embedder
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                inputs: vec![query.to_string()],
            })
            .await
            .map_err(embed_error)?;

        let query_embedding = response.embeddings.into_iter().next().ok_or_else(|| {
            RetrievalError::EmbeddingFailed("no embedding returned for query".into())
        })?;

        let entries = self.entries.read().await;
        let mut scored: Vec<(f32, Snippet)> = entries
            .iter()
            .map(|e| {
                (
                    cosine_similarity(&e.embedding, &query_embedding),
                    e.snippet.clone(),
                )
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        debug!(results = scored.len(), "Vector search complete");
        Ok(scored.into_iter().map(|(_, s)| s).collect())
    }
}
