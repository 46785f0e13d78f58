//! `delphi chat` — wire the windows, retriever, and provider together and
//! run the turn loop.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use delphi_chat::ContextAssembler;
use delphi_config::AppConfig;
use delphi_core::provider::Provider;
use delphi_core::retrieval::Retriever;
use delphi_core::snippet::Snippet;
use delphi_memory::{DialogueWindow, SnippetWindow};
use delphi_providers::OpenAiCompatProvider;
use delphi_retrieval::{KeywordIndex, VectorIndex};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

pub async fn run(
    config_path: Option<&Path>,
    file: Option<&Path>,
    message: Option<String>,
    vector: bool,
) -> anyhow::Result<()> {
    let config = AppConfig::load(config_path)?;

    let api_key = config.api_key.clone().unwrap_or_default();
    if api_key.is_empty() {
        bail!("No API key configured; set DELPHI_API_KEY or run `delphi onboard`");
    }

    let provider: Arc<dyn Provider> =
        Arc::new(OpenAiCompatProvider::new("openai", &config.base_url, &api_key)?);

    let passages = match file {
        Some(path) => load_passages(path)?,
        None => Vec::new(),
    };
    info!(passages = passages.len(), vector, "Reference corpus loaded");

    let retriever: Arc<dyn Retriever> = if vector {
        let index = VectorIndex::new(provider.clone(), &config.embedding_model);
        index.index(passages).await?;
        Arc::new(index)
    } else {
        Arc::new(KeywordIndex::from_passages(passages))
    };

    let dialogue = DialogueWindow::new(config.memory.dialogue_turns)?;
    let snippets = SnippetWindow::new(config.memory.snippet_window, retriever)?
        .with_fetch_limit(config.memory.fetch_limit);
    let template = config.prompt_template()?;

    let mut assembler =
        ContextAssembler::new(provider, &config.model, template, dialogue, snippets)
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens);

    if let Some(message) = message {
        let reply = assembler.handle_turn(&message).await?;
        println!("{reply}");
        return Ok(());
    }

    println!("delphi chat — session {} (type 'exit' to quit)", assembler.session_id());
    let stdin = io::stdin();
    let reader = BufReader::new(stdin);
    let mut lines = reader.lines();
    let mut stdout = io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break; // EOF (Ctrl+D)
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q") {
            break;
        }

        match assembler.handle_turn(line).await {
            Ok(reply) => println!("{reply}"),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    Ok(())
}

/// Split a UTF-8 text file into passages on blank lines. Each passage
/// becomes a snippet with the file path as source and title and its
/// ordinal as the page number.
fn load_passages(path: &Path) -> anyhow::Result<Vec<Snippet>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let source = path.display().to_string();

    Ok(raw
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .enumerate()
        .map(|(i, body)| Snippet::new(body, &source, &source, i))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn splits_passages_on_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "first passage\nstill the first\n\nsecond passage\n\n\nthird"
        )
        .unwrap();

        let passages = load_passages(file.path()).unwrap();
        assert_eq!(passages.len(), 3);
        assert_eq!(passages[0].body, "first passage\nstill the first");
        assert_eq!(passages[1].body, "second passage");
        assert_eq!(passages[2].page, 2);
        assert_eq!(passages[0].source_id, passages[0].title);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_passages(Path::new("/does/not/exist.txt")).unwrap_err();
        assert!(err.to_string().contains("exist.txt"));
    }
}
