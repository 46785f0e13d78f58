//! LLM provider implementations for Delphi.
//!
//! All providers implement the `delphi_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
