//! Context assembly and turn orchestration.
//!
//! Per turn: query the retriever with the full accumulated user-message
//! history, merge the results into the snippet window, render the prompt
//! from both windows plus the literal input, and invoke the model. The
//! turn is fully synchronous end to end — no sub-operation is reordered,
//! and nothing proceeds past retrieval until it returns.
//!
//! `handle_turn` takes `&mut self`: the idle / awaiting-reply state pair
//! is encoded in the borrow, so a second turn cannot start on the same
//! conversation while one is in flight. Independent conversations run
//! concurrently by owning their own assembler.

use std::sync::Arc;

use delphi_core::Result;
use delphi_core::dialogue::DialogueTurn;
use delphi_core::memory::PromptMemory;
use delphi_core::prompt::PromptTemplate;
use delphi_core::provider::{CompletionRequest, Provider};
use delphi_memory::{DialogueWindow, SnippetWindow};
use tracing::{debug, info};
use uuid::Uuid;

/// Unique identifier for a conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Drives one conversation. Created when the conversation begins,
/// dropped when it ends; nothing is persisted across sessions.
pub struct ContextAssembler {
    session_id: SessionId,
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    template: PromptTemplate,
    dialogue: DialogueWindow,
    snippets: SnippetWindow,
    /// Every user message of the conversation, in order. Grows for the
    /// session's lifetime — distinct from the bounded dialogue window —
    /// and feeds the retrieval query.
    user_messages: Vec<String>,
}

impl ContextAssembler {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        template: PromptTemplate,
        dialogue: DialogueWindow,
        snippets: SnippetWindow,
    ) -> Self {
        Self {
            session_id: SessionId::new(),
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            template,
            dialogue,
            snippets,
            user_messages: Vec::new(),
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Cap the tokens generated per reply.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn dialogue(&self) -> &DialogueWindow {
        &self.dialogue
    }

    pub fn snippets(&self) -> &SnippetWindow {
        &self.snippets
    }

    /// User messages accumulated so far (including failed turns' inputs).
    pub fn user_message_count(&self) -> usize {
        self.user_messages.len()
    }

    /// Run one conversational turn and return the model's reply.
    ///
    /// Retrieval and provider failures propagate unchanged — no retries,
    /// no fallback to an empty snippet set. On a provider failure the
    /// snippet merge from this turn is kept but the turn is not recorded
    /// in the dialogue window; the next successful turn proceeds from
    /// that state.
    pub async fn handle_turn(&mut self, user_input: &str) -> Result<String> {
        self.user_messages.push(user_input.to_string());
        let query = self.user_messages.join("\n");

        let merged = self.snippets.update(&query).await?;
        debug!(
            session = %self.session_id,
            held = self.snippets.len(),
            snippet_chars = merged.len(),
            "Snippet window updated"
        );

        let prompt = self.template.render(
            &[&self.dialogue as &dyn PromptMemory, &self.snippets],
            user_input,
        );

        let request = CompletionRequest {
            model: self.model.clone(),
            prompt,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let response = self.provider.complete(request).await?;
        let reply = response.text;

        self.dialogue
            .append(DialogueTurn::new(user_input, reply.clone()));
        info!(
            session = %self.session_id,
            turns = self.dialogue.len(),
            reply_len = reply.len(),
            "Turn complete"
        );
        Ok(reply)
    }
}
