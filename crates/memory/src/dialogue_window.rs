//! Dialogue window — bounded FIFO of recent turns.
//!
//! Keeps the last `k` turns of a conversation. No deduplication and no
//! failure modes: every turn is accepted, and appending beyond capacity
//! evicts the oldest turn.

use std::collections::VecDeque;

use delphi_core::dialogue::DialogueTurn;
use delphi_core::memory::PromptMemory;
use delphi_core::prompt::HISTORY_KEY;
use delphi_core::{Error, Result};

pub struct DialogueWindow {
    k: usize,
    turns: VecDeque<DialogueTurn>,
}

impl DialogueWindow {
    /// Create a window holding at most `k` turns.
    pub fn new(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(Error::Config {
                message: "dialogue window size must be positive".into(),
            });
        }
        Ok(Self {
            k,
            turns: VecDeque::with_capacity(k),
        })
    }

    /// Append a turn, evicting the oldest when the window is full.
    pub fn append(&mut self, turn: DialogueTurn) {
        if self.turns.len() == self.k {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    /// Role-tagged line pairs in chronological order (oldest first).
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.turns.len() * 2);
        for turn in &self.turns {
            lines.push(format!("Human: {}", turn.input));
            lines.push(format!("AI: {}", turn.output));
        }
        lines.join("\n")
    }

    /// The held turns, oldest first.
    pub fn turns(&self) -> impl Iterator<Item = &DialogueTurn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The configured capacity `k`.
    pub fn capacity(&self) -> usize {
        self.k
    }
}

impl PromptMemory for DialogueWindow {
    fn key(&self) -> &str {
        HISTORY_KEY
    }

    fn render(&self) -> String {
        DialogueWindow::render(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(n: usize) -> DialogueTurn {
        DialogueTurn::new(format!("question {n}"), format!("answer {n}"))
    }

    #[test]
    fn appends_in_order() {
        let mut window = DialogueWindow::new(3).unwrap();
        window.append(turn(1));
        window.append(turn(2));
        assert_eq!(window.len(), 2);

        let inputs: Vec<&str> = window.turns().map(|t| t.input.as_str()).collect();
        assert_eq!(inputs, vec!["question 1", "question 2"]);
    }

    #[test]
    fn oldest_turn_evicted_beyond_capacity() {
        let mut window = DialogueWindow::new(3).unwrap();
        for n in 1..=4 {
            window.append(turn(n));
        }

        assert_eq!(window.len(), 3);
        let rendered = window.render();
        assert!(!rendered.contains("question 1"));
        assert!(rendered.contains("question 2"));
        assert!(rendered.contains("question 3"));
        assert!(rendered.contains("question 4"));

        // Chronological order: 2 before 3 before 4.
        let p2 = rendered.find("question 2").unwrap();
        let p3 = rendered.find("question 3").unwrap();
        let p4 = rendered.find("question 4").unwrap();
        assert!(p2 < p3 && p3 < p4);
    }

    #[test]
    fn render_uses_role_tags() {
        let mut window = DialogueWindow::new(2).unwrap();
        window.append(DialogueTurn::new("hello", "hi there"));
        assert_eq!(window.render(), "Human: hello\nAI: hi there");
    }

    #[test]
    fn empty_window_renders_empty() {
        let window = DialogueWindow::new(2).unwrap();
        assert_eq!(window.render(), "");
        assert!(window.is_empty());
    }

    #[test]
    fn duplicate_turns_accepted() {
        let mut window = DialogueWindow::new(3).unwrap();
        window.append(DialogueTurn::new("same", "same"));
        window.append(DialogueTurn::new("same", "same"));
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn zero_capacity_rejected() {
        assert!(matches!(
            DialogueWindow::new(0),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn fills_the_history_slot() {
        let window = DialogueWindow::new(2).unwrap();
        assert_eq!(PromptMemory::key(&window), "history");
    }
}
