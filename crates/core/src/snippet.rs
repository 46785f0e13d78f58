//! Snippet value type and its rendered block form.
//!
//! A snippet is a retrieved reference passage with source/title/page
//! metadata. Its rendered block is deterministic and doubles as the
//! deduplication key in the snippet window: two snippets are "the same"
//! iff their rendered blocks are character-identical.

use serde::{Deserialize, Serialize};

/// A retrieved reference passage.
///
/// Produced by a [`Retriever`](crate::retrieval::Retriever); never mutated
/// after retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// The passage text.
    pub body: String,

    /// Source document identifier (path, URL, etc.).
    pub source_id: String,

    /// Human-readable title.
    pub title: String,

    /// Zero-based page / locator number within the source.
    pub page: usize,
}

impl Snippet {
    pub fn new(
        body: impl Into<String>,
        source_id: impl Into<String>,
        title: impl Into<String>,
        page: usize,
    ) -> Self {
        Self {
            body: body.into(),
            source_id: source_id.into(),
            title: title.into(),
            page,
        }
    }

    /// Render the snippet as a formatted block.
    ///
    /// The header line is the bare `source_id` when the title adds nothing
    /// over it, otherwise a `[title](source_id)` link. The body is wrapped
    /// in page-tagged start/end markers; pages are shown one-based. Every
    /// piece is newline-terminated, so blocks concatenate cleanly.
    pub fn render_block(&self) -> String {
        let mut block = String::new();
        if self.title == self.source_id {
            block.push_str(&format!("{}\n", self.source_id));
        } else {
            block.push_str(&format!("[{}]({})\n", self.title, self.source_id));
        }
        block.push_str(&format!("<START_SNIPPET_PAGE_{}>\n", self.page + 1));
        block.push_str(&format!("{}\n", self.body));
        block.push_str(&format!("<END_SNIPPET_PAGE_{}>\n", self.page + 1));
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_bare_source_when_title_matches() {
        let snippet = Snippet::new("body text", "manual.pdf", "manual.pdf", 0);
        let block = snippet.render_block();
        let header = block.lines().next().unwrap();
        assert_eq!(header, "manual.pdf");
        assert!(!header.contains('['));
    }

    #[test]
    fn header_is_link_when_title_differs() {
        let snippet = Snippet::new("body text", "manual.pdf", "User Manual", 0);
        let header = snippet.render_block().lines().next().unwrap().to_string();
        assert_eq!(header, "[User Manual](manual.pdf)");
    }

    #[test]
    fn markers_use_one_based_page() {
        let snippet = Snippet::new("content", "doc", "doc", 4);
        let block = snippet.render_block();
        assert!(block.contains("<START_SNIPPET_PAGE_5>"));
        assert!(block.contains("<END_SNIPPET_PAGE_5>"));
    }

    #[test]
    fn block_layout_is_exact() {
        let snippet = Snippet::new("the answer", "doc", "doc", 0);
        assert_eq!(
            snippet.render_block(),
            "doc\n<START_SNIPPET_PAGE_1>\nthe answer\n<END_SNIPPET_PAGE_1>\n"
        );
    }

    #[test]
    fn identical_snippets_share_a_block() {
        let a = Snippet::new("same", "src", "title", 2);
        let b = Snippet::new("same", "src", "title", 2);
        assert_eq!(a.render_block(), b.render_block());
    }

    #[test]
    fn serialization_roundtrip() {
        let snippet = Snippet::new("body", "src", "title", 7);
        let json = serde_json::to_string(&snippet).unwrap();
        let back: Snippet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snippet);
    }
}
