//! PromptMemory — the capability shared by both context windows.
//!
//! A memory supplies one named slot of the prompt template. Combining the
//! dialogue and snippet windows is composition over this interface, not
//! inheritance: the assembler walks its memories and substitutes each
//! one's slot.

/// A bounded memory that can render itself into a prompt slot.
pub trait PromptMemory {
    /// The template slot this memory fills (e.g., "snippets", "history").
    fn key(&self) -> &str;

    /// The current slot content.
    fn render(&self) -> String;
}
