//! Provider trait — the abstraction over LLM backends.
//!
//! A Provider knows how to turn a fully rendered prompt into a reply, and
//! optionally how to embed texts for vector retrieval.
//!
//! Implementations: OpenAI-compatible endpoints (OpenAI, OpenRouter,
//! Ollama, vLLM), scripted mocks for tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A completion request: one rendered prompt, one reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model to use (e.g., "gpt-4o-mini").
    pub model: String,

    /// The fully rendered prompt text.
    pub prompt: String,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The reply text.
    pub text: String,

    /// Token usage statistics.
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested).
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// An embedding request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// The model to use for embeddings (e.g., "text-embedding-3-small").
    pub model: String,

    /// The texts to embed.
    pub inputs: Vec<String>,
}

/// An embedding response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    /// The embedding vectors, one per input text.
    pub embeddings: Vec<Vec<f32>>,

    /// Which model was used.
    pub model: String,

    /// Token usage.
    pub usage: Option<Usage>,
}

/// The core Provider trait.
///
/// The assembler calls `complete()` once per turn without knowing which
/// backend is being used. The call is blocking from the assembler's point
/// of view: the turn does not finish until the reply arrives. Rate-limit,
/// timeout, and malformed-prompt conditions surface as [`ProviderError`]s.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Send a rendered prompt and get the reply.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError>;

    /// Generate embeddings for the given texts.
    ///
    /// Default implementation returns an error indicating embeddings
    /// aren't supported.
    async fn embed(
        &self,
        _request: EmbeddingRequest,
    ) -> std::result::Result<EmbeddingResponse, ProviderError> {
        Err(ProviderError::NotConfigured(format!(
            "Provider '{}' does not support embeddings",
            self.name()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_request_defaults() {
        let req = CompletionRequest {
            model: "gpt-4o-mini".into(),
            prompt: "Hello".into(),
            temperature: default_temperature(),
            max_tokens: None,
        };
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert!(req.max_tokens.is_none());
    }

    #[test]
    fn completion_request_serialization() {
        let req = CompletionRequest {
            model: "gpt-4o-mini".into(),
            prompt: "What is Rust?".into(),
            temperature: 0.3,
            max_tokens: Some(512),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("What is Rust?"));
        assert!(json.contains("512"));
    }

    #[test]
    fn embedding_request_types() {
        let req = EmbeddingRequest {
            model: "text-embedding-3-small".into(),
            inputs: vec!["hello world".into(), "how are you".into()],
        };
        assert_eq!(req.inputs.len(), 2);
        assert_eq!(req.model, "text-embedding-3-small");
    }
}
