//! End-to-end conversation tests over scripted collaborators.
//!
//! These drive whole conversations through `ContextAssembler` and assert
//! on the observable contract: what the retriever is asked, what the
//! provider is sent, and how the two windows evolve across turns.

use std::sync::Arc;

use delphi_chat::ContextAssembler;
use delphi_chat::mock::{FailingRetriever, ScriptedProvider, ScriptedRetriever, snippet};
use delphi_core::prompt::PromptTemplate;
use delphi_core::{Error, PromptMemory, Snippet};
use delphi_memory::{DialogueWindow, SnippetWindow};

fn template() -> PromptTemplate {
    PromptTemplate::new(
        "Answer from these reference snippets:\n{snippets}\n\
         Conversation so far:\n{history}\nHuman: {input}\nAI:",
    )
    .unwrap()
}

fn build(
    provider: Arc<ScriptedProvider>,
    retriever: Arc<ScriptedRetriever>,
    k_dialogue: usize,
    k_snippets: usize,
) -> ContextAssembler {
    let dialogue = DialogueWindow::new(k_dialogue).unwrap();
    let snippets = SnippetWindow::new(k_snippets, retriever).unwrap();
    ContextAssembler::new(provider, "mock-model", template(), dialogue, snippets)
        .with_temperature(0.3)
        .with_max_tokens(512)
}

fn doc(body: &str, page: usize) -> Snippet {
    snippet(body, "reference.md", "reference.md", page)
}

#[tokio::test]
async fn snippet_window_prefers_fresh_results_across_turns() {
    // Turn 1 retrieves [A, B]; turn 2 retrieves [C]. With k_snippets = 2
    // the window must end as [C, A]: the new result takes the front and
    // the oldest held entry is evicted.
    let provider = Arc::new(ScriptedProvider::new(vec!["reply one", "reply two"]));
    let retriever = Arc::new(ScriptedRetriever::new(vec![
        vec![doc("snippet A", 0), doc("snippet B", 1)],
        vec![doc("snippet C", 2)],
    ]));
    let mut asm = build(provider.clone(), retriever, 3, 2);

    asm.handle_turn("first").await.unwrap();
    assert_eq!(asm.snippets().pages(), vec![0, 1]);

    asm.handle_turn("second").await.unwrap();
    assert_eq!(asm.snippets().pages(), vec![2, 0]);

    let final_prompt = &provider.prompts()[1];
    assert!(final_prompt.contains("snippet C"));
    assert!(final_prompt.contains("snippet A"));
    assert!(!final_prompt.contains("snippet B"));
}

#[tokio::test]
async fn re_retrieved_snippet_is_not_promoted() {
    // Held [A, B]; a later turn retrieves [B, C]. B is already held, so it
    // keeps its old position and falls to truncation: the window ends as
    // [C, A].
    let provider = Arc::new(ScriptedProvider::new(vec!["r1", "r2"]));
    let retriever = Arc::new(ScriptedRetriever::new(vec![
        vec![doc("snippet A", 0), doc("snippet B", 1)],
        vec![doc("snippet B", 1), doc("snippet C", 2)],
    ]));
    let mut asm = build(provider, retriever, 3, 2);

    asm.handle_turn("first").await.unwrap();
    asm.handle_turn("second").await.unwrap();
    assert_eq!(asm.snippets().pages(), vec![2, 0]);
}

#[tokio::test]
async fn identical_retrievals_leave_the_window_stable() {
    let batch = vec![doc("alpha", 0), doc("beta", 1)];
    let provider = Arc::new(ScriptedProvider::new(vec!["r1", "r2"]));
    let retriever = Arc::new(ScriptedRetriever::new(vec![batch.clone(), batch]));
    let mut asm = build(provider, retriever, 3, 3);

    asm.handle_turn("ask once").await.unwrap();
    let after_first = PromptMemory::render(asm.snippets());
    asm.handle_turn("ask again").await.unwrap();
    assert_eq!(PromptMemory::render(asm.snippets()), after_first);
}

#[tokio::test]
async fn capacity_holds_over_many_turns() {
    let batches: Vec<Vec<Snippet>> = (0..8)
        .map(|round| {
            (0..3)
                .map(|i| doc(&format!("round {round} snippet {i}"), round * 3 + i))
                .collect()
        })
        .collect();
    let replies: Vec<String> = (0..8).map(|n| format!("reply {n}")).collect();
    let provider = Arc::new(ScriptedProvider::new(
        replies.iter().map(String::as_str).collect(),
    ));
    let retriever = Arc::new(ScriptedRetriever::new(batches));
    let mut asm = build(provider, retriever, 2, 3);

    for n in 0..8 {
        asm.handle_turn(&format!("question {n}")).await.unwrap();
        assert!(asm.snippets().len() <= 3);
        assert!(asm.dialogue().len() <= 2);
    }
}

#[tokio::test]
async fn history_window_drops_turn_one_after_four_turns() {
    let provider = Arc::new(ScriptedProvider::new(vec!["r1", "r2", "r3", "r4", "r5"]));
    let retriever = Arc::new(ScriptedRetriever::new(vec![]));
    let mut asm = build(provider.clone(), retriever, 3, 2);

    for n in 1..=5 {
        asm.handle_turn(&format!("question {n}")).await.unwrap();
    }

    // The fifth prompt sees turns 2..=4 in its history slot, oldest first.
    let fifth_prompt = &provider.prompts()[4];
    assert!(!fifth_prompt.contains("Human: question 1\n"));
    let p2 = fifth_prompt.find("Human: question 2").unwrap();
    let p3 = fifth_prompt.find("Human: question 3").unwrap();
    let p4 = fifth_prompt.find("Human: question 4").unwrap();
    assert!(p2 < p3 && p3 < p4);
}

#[tokio::test]
async fn retrieval_queries_grow_with_the_conversation() {
    let provider = Arc::new(ScriptedProvider::new(vec!["r1", "r2"]));
    let retriever = Arc::new(ScriptedRetriever::new(vec![]));
    let mut asm = build(provider, retriever.clone(), 3, 2);

    asm.handle_turn("where is delphi?").await.unwrap();
    asm.handle_turn("who spoke there?").await.unwrap();

    let queries = retriever.queries();
    assert_eq!(queries[0], "where is delphi?");
    assert_eq!(queries[1], "where is delphi?\nwho spoke there?");
}

#[tokio::test]
async fn failed_retrieval_leaves_no_partial_turn() {
    let provider = Arc::new(ScriptedProvider::single("unused"));
    let dialogue = DialogueWindow::new(3).unwrap();
    let snippets = SnippetWindow::new(2, Arc::new(FailingRetriever)).unwrap();
    let mut asm = ContextAssembler::new(
        provider.clone(),
        "mock-model",
        template(),
        dialogue,
        snippets,
    );

    let err = asm.handle_turn("doomed question").await.unwrap_err();
    assert!(matches!(err, Error::Retrieval(_)));
    assert_eq!(provider.calls(), 0);
    assert!(asm.dialogue().is_empty());
    assert!(asm.snippets().is_empty());
}

#[tokio::test]
async fn linked_titles_render_in_the_prompt() {
    let provider = Arc::new(ScriptedProvider::single("reply"));
    let retriever = Arc::new(ScriptedRetriever::new(vec![vec![snippet(
        "temple ruins",
        "greece/delphi.md",
        "Temple of Apollo",
        11,
    )]]));
    let mut asm = build(provider.clone(), retriever, 3, 2);

    asm.handle_turn("describe the temple").await.unwrap();
    let prompt = &provider.prompts()[0];
    assert!(prompt.contains("[Temple of Apollo](greece/delphi.md)"));
    assert!(prompt.contains("<START_SNIPPET_PAGE_12>"));
    assert!(prompt.contains("temple ruins"));
    assert!(prompt.contains("<END_SNIPPET_PAGE_12>"));
}
