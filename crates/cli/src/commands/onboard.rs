//! `delphi onboard` — write a starter config file.

use std::path::Path;

use anyhow::{Context, bail};
use delphi_config::AppConfig;

pub fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => AppConfig::default_path().context("Could not determine home directory")?,
    };

    if path.exists() {
        bail!("Config already exists at {}", path.display());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    std::fs::write(&path, AppConfig::starter_toml()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Wrote starter config to {}", path.display());
    println!("Set your API key via DELPHI_API_KEY, OPENAI_API_KEY, or the api_key field.");
    Ok(())
}
