//! Snippet window — bounded, deduplicating, recency-ordered buffer of
//! retrieved reference blocks.
//!
//! On every update the window asks its retriever for candidates, formats
//! them into blocks, and merges them so that the newest batch outranks
//! everything already held while pruning drops the oldest entries first.
//! The merge runs on the reversed sequence: with the oldest entries at the
//! insertion end, "append if unseen" plus "truncate the tail" implements
//! "prepend new results, evict from the oldest end".

use std::sync::Arc;

use delphi_core::error::RetrievalError;
use delphi_core::memory::PromptMemory;
use delphi_core::prompt::SNIPPETS_KEY;
use delphi_core::retrieval::Retriever;
use delphi_core::snippet::Snippet;
use delphi_core::{Error, Result};
use tracing::debug;

/// Candidate count requested from the retriever per update.
/// Independent of the window capacity.
pub const DEFAULT_FETCH_LIMIT: usize = 4;

/// A bounded buffer of `(page, block)` pairs, most relevant first.
///
/// Invariants: never more than `k` entries; no two entries share a block;
/// order reflects the merge policy, not raw retrieval order.
pub struct SnippetWindow {
    k: usize,
    fetch_limit: usize,
    retriever: Arc<dyn Retriever>,
    held: Vec<(usize, String)>,
}

impl SnippetWindow {
    /// Create a window holding at most `k` snippet blocks.
    pub fn new(k: usize, retriever: Arc<dyn Retriever>) -> Result<Self> {
        if k == 0 {
            return Err(Error::Config {
                message: "snippet window size must be positive".into(),
            });
        }
        Ok(Self {
            k,
            fetch_limit: DEFAULT_FETCH_LIMIT,
            retriever,
            held: Vec::new(),
        })
    }

    /// Override the candidate count requested per update.
    pub fn with_fetch_limit(mut self, limit: usize) -> Self {
        self.fetch_limit = limit;
        self
    }

    /// Fetch candidates for `query`, merge them into the window, and
    /// return the rendered snippet block.
    ///
    /// Retrieval failures propagate and leave the window untouched. An
    /// empty candidate set also leaves the window unchanged — it is not
    /// cleared.
    pub async fn update(&mut self, query: &str) -> std::result::Result<String, RetrievalError> {
        let candidates = self.retriever.search(query, self.fetch_limit).await?;
        debug!(
            retriever = self.retriever.name(),
            candidates = candidates.len(),
            held = self.held.len(),
            "Merging retrieved snippets"
        );
        self.absorb(&candidates);
        Ok(self.render())
    }

    /// Merge a batch of candidates (most relevant first) into the window.
    ///
    /// The held sequence is reversed in place so its oldest entries sit at
    /// the insertion end; each candidate whose block is not already held
    /// is appended, walking the batch from its least relevant end so the
    /// final reversal restores retrieval order within the batch; the
    /// sequence is reversed back and truncated to `k`. The newest batch
    /// therefore lands at the front, most relevant first, and pruning
    /// always drops from the oldest end.
    ///
    /// A block that is already held is skipped without moving the existing
    /// entry: re-retrieval does not refresh a snippet's position, so its
    /// ranking stays stable across updates and it can still age out.
    pub fn absorb(&mut self, candidates: &[Snippet]) {
        self.held.reverse();
        for snippet in candidates.iter().rev() {
            let block = snippet.render_block();
            if !self.held.iter().any(|(_, held)| *held == block) {
                self.held.push((snippet.page, block));
            }
        }
        self.held.reverse();
        self.held.truncate(self.k);
    }

    /// Concatenation of the held blocks, most relevant first.
    ///
    /// Blocks carry their own trailing newlines; no separator is added.
    pub fn render(&self) -> String {
        self.held.iter().map(|(_, block)| block.as_str()).collect()
    }

    /// Pages of the held blocks, in held order.
    pub fn pages(&self) -> Vec<usize> {
        self.held.iter().map(|(page, _)| *page).collect()
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    /// The configured capacity `k`.
    pub fn capacity(&self) -> usize {
        self.k
    }
}

impl PromptMemory for SnippetWindow {
    fn key(&self) -> &str {
        SNIPPETS_KEY
    }

    fn render(&self) -> String {
        SnippetWindow::render(self)
    }
}
