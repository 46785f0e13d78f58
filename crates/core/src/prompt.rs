//! Prompt template with named substitution slots.
//!
//! The template text is configuration, not contract: the core only
//! requires that the `{snippets}`, `{history}`, and `{input}` slots exist
//! and makes no assumption about the wording around them.

use crate::error::Error;
use crate::memory::PromptMemory;

/// Slot filled by the snippet window.
pub const SNIPPETS_KEY: &str = "snippets";

/// Slot filled by the dialogue window.
pub const HISTORY_KEY: &str = "history";

/// Slot filled by the literal current user input.
pub const INPUT_KEY: &str = "input";

/// An immutable prompt template, validated at construction.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Create a template, checking that all three slots are present.
    ///
    /// A missing slot would silently drop context at render time, so it is
    /// rejected here as a configuration error.
    pub fn new(template: impl Into<String>) -> Result<Self, Error> {
        let template = template.into();
        for key in [SNIPPETS_KEY, HISTORY_KEY, INPUT_KEY] {
            if !template.contains(&Self::slot(key)) {
                return Err(Error::Config {
                    message: format!("Prompt template is missing the {{{key}}} slot"),
                });
            }
        }
        Ok(Self { template })
    }

    fn slot(key: &str) -> String {
        format!("{{{key}}}")
    }

    /// Render the template by substituting each memory's slot and the
    /// literal current input.
    pub fn render(&self, memories: &[&dyn PromptMemory], input: &str) -> String {
        let mut out = self.template.clone();
        for memory in memories {
            out = out.replace(&Self::slot(memory.key()), &memory.render());
        }
        out.replace(&Self::slot(INPUT_KEY), input)
    }

    /// The raw template text.
    pub fn text(&self) -> &str {
        &self.template
    }
}
