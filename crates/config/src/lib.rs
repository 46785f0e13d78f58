//! Configuration loading, validation, and defaults for Delphi.
//!
//! Loads configuration from `~/.delphi/config.toml` (or an explicit path)
//! with environment variable overrides, and validates the settings the
//! memory core depends on at startup.

use std::path::{Path, PathBuf};

use delphi_core::prompt::PromptTemplate;
use delphi_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Built-in prompt template. The wording is configuration, not contract;
/// only the three slots matter to the core.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "\
You are a careful reference assistant. Use the reference snippets and the \
conversation so far to answer. If the snippets do not contain the answer, \
say so instead of guessing, and name the document title and page your \
answer came from when applicable.

Reference snippets:
{snippets}
Conversation so far:
{history}
Human: {input}
AI:";

/// The root configuration structure.
///
/// Maps directly to `~/.delphi/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the model endpoint. `DELPHI_API_KEY` or
    /// `OPENAI_API_KEY` override this at load time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat model.
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding model (used by the vector index).
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per model reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Window sizes.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Prompt template overrides.
    #[serde(default)]
    pub prompt: PromptConfig,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    3500
}

/// Window sizing. Both windows must be positive; too many snippets risks
/// the prompt outgrowing the model's context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Dialogue turns retained in the history window.
    #[serde(default = "default_dialogue_turns")]
    pub dialogue_turns: usize,

    /// Snippet blocks retained in the snippet window.
    #[serde(default = "default_snippet_window")]
    pub snippet_window: usize,

    /// Candidates requested from the retriever per turn.
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,
}

fn default_dialogue_turns() -> usize {
    3
}
fn default_snippet_window() -> usize {
    3
}
fn default_fetch_limit() -> usize {
    4
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            dialogue_turns: default_dialogue_turns(),
            snippet_window: default_snippet_window(),
            fetch_limit: default_fetch_limit(),
        }
    }
}

/// Prompt template source: inline string wins over file, file over the
/// built-in default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            embedding_model: default_embedding_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            memory: MemoryConfig::default(),
            prompt: PromptConfig::default(),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("memory", &self.memory)
            .field("prompt", &self.prompt)
            .finish()
    }
}

impl AppConfig {
    /// The default config path: `~/.delphi/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".delphi").join("config.toml"))
    }

    /// Load from `path` (or the default path), falling back to built-in
    /// defaults when no file exists, then apply env overrides and
    /// validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let resolved = path.map(Path::to_path_buf).or_else(Self::default_path);
        let mut config = match &resolved {
            Some(p) if p.exists() => Self::from_file(p)?,
            _ => Self::default(),
        };

        if let Some(key) = std::env::var("DELPHI_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|k| !k.is_empty())
        {
            config.api_key = Some(key);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        toml::from_str(&raw).map_err(|e| Error::Config {
            message: format!("Invalid config {}: {e}", path.display()),
        })
    }

    /// Validate the settings the memory core depends on.
    pub fn validate(&self) -> Result<()> {
        if self.memory.dialogue_turns == 0 {
            return Err(Error::Config {
                message: "memory.dialogue_turns must be positive".into(),
            });
        }
        if self.memory.snippet_window == 0 {
            return Err(Error::Config {
                message: "memory.snippet_window must be positive".into(),
            });
        }
        if self.memory.fetch_limit == 0 {
            return Err(Error::Config {
                message: "memory.fetch_limit must be positive".into(),
            });
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::Config {
                message: format!("temperature {} out of range [0, 2]", self.temperature),
            });
        }
        // The template must carry all three slots.
        self.prompt_template()?;
        Ok(())
    }

    /// Resolve the prompt template: inline override, then file, then the
    /// built-in default.
    pub fn prompt_template(&self) -> Result<PromptTemplate> {
        if let Some(inline) = &self.prompt.template {
            return PromptTemplate::new(inline.clone());
        }
        if let Some(file) = &self.prompt.template_file {
            let raw = std::fs::read_to_string(file).map_err(|e| Error::Config {
                message: format!("Failed to read template {}: {e}", file.display()),
            })?;
            return PromptTemplate::new(raw);
        }
        PromptTemplate::new(DEFAULT_PROMPT_TEMPLATE)
    }

    /// Serialize a starter config (api_key left unset).
    pub fn starter_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).map_err(|e| Error::Config {
            message: format!("Failed to serialize starter config: {e}"),
        })
    }
}
