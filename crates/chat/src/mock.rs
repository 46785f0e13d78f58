//! Scripted mock collaborators for tests.
//!
//! Deterministic stand-ins for the retrieval and provider ports. Used by
//! this crate's tests and available to downstream crates' test suites.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use delphi_core::error::{ProviderError, RetrievalError};
use delphi_core::provider::{CompletionRequest, CompletionResponse, Provider, Usage};
use delphi_core::retrieval::Retriever;
use delphi_core::snippet::Snippet;

/// Shorthand for building test snippets.
pub fn snippet(body: &str, source_id: &str, title: &str, page: usize) -> Snippet {
    Snippet::new(body, source_id, title, page)
}

/// A provider that returns a sequence of scripted replies.
///
/// Each call to `complete` returns the next reply in the queue and records
/// the prompt it was sent. Panics if more calls are made than replies
/// provided.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(str::to_string).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A provider that returns a single reply.
    pub fn single(reply: &str) -> Self {
        Self::new(vec![reply])
    }

    /// The prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// How many completion calls were made.
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        self.prompts.lock().unwrap().push(request.prompt);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("ScriptedProvider: no more replies"));
        Ok(CompletionResponse {
            text: reply,
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "mock-model".into(),
        })
    }
}

/// A provider whose every call fails with a 500.
pub struct FailingProvider;

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        Err(ProviderError::ApiError {
            status_code: 500,
            message: "scripted provider failure".into(),
        })
    }
}

/// A retriever that returns scripted candidate batches in order, then
/// empty batches. Records the queries it was asked.
pub struct ScriptedRetriever {
    batches: Mutex<VecDeque<Vec<Snippet>>>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedRetriever {
    pub fn new(batches: Vec<Vec<Snippet>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// The queries received so far, in call order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for ScriptedRetriever {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn search(
        &self,
        query: &str,
        _limit: usize,
    ) -> std::result::Result<Vec<Snippet>, RetrievalError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self
            .batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}

/// A retriever whose every call fails.
pub struct FailingRetriever;

#[async_trait]
impl Retriever for FailingRetriever {
    fn name(&self) -> &str {
        "failing"
    }

    async fn search(
        &self,
        _query: &str,
        _limit: usize,
    ) -> std::result::Result<Vec<Snippet>, RetrievalError> {
        Err(RetrievalError::IndexUnavailable(
            "scripted retriever failure".into(),
        ))
    }
}
