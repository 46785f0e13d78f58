//! Retriever implementations for Delphi.
//!
//! Both indexes hold passages in process. [`KeywordIndex`] scores by term
//! occurrences and needs no external service; [`VectorIndex`] embeds
//! passages and queries through the provider port and ranks by cosine
//! similarity.

pub mod keyword;
pub mod vector;

pub use keyword::KeywordIndex;
pub use vector::{VectorIndex, cosine_similarity};
