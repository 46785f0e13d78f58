//! Bounded context windows for Delphi.
//!
//! Two independent memories feed the prompt each turn:
//!
//! - [`SnippetWindow`] — a bounded, deduplicating, recency-ordered buffer
//!   of retrieved reference blocks, refreshed from the retrieval port
//! - [`DialogueWindow`] — a bounded FIFO of the most recent turns
//!
//! Both implement `delphi_core::PromptMemory` and fill one named slot of
//! the prompt template each.

pub mod dialogue_window;
pub mod snippet_window;

pub use dialogue_window::DialogueWindow;
pub use snippet_window::{DEFAULT_FETCH_LIMIT, SnippetWindow};
