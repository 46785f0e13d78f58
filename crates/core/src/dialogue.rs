//! Dialogue turn value type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user input paired with one model reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueTurn {
    /// What the user said.
    pub input: String,

    /// What the model replied.
    pub output: String,

    /// When the turn completed.
    pub timestamp: DateTime<Utc>,
}

impl DialogueTurn {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_turn() {
        let turn = DialogueTurn::new("hello", "hi there");
        assert_eq!(turn.input, "hello");
        assert_eq!(turn.output, "hi there");
    }

    #[test]
    fn serialization_roundtrip() {
        let turn = DialogueTurn::new("q", "a");
        let json = serde_json::to_string(&turn).unwrap();
        let back: DialogueTurn = serde_json::from_str(&json).unwrap();
        assert_eq!(back.input, "q");
        assert_eq!(back.output, "a");
    }
}
