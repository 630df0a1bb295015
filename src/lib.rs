//! Bookmind: categorize bookmarks and search them with an LLM, tolerating
//! truncated or malformed generator output.

pub mod ai_client;
pub mod analyzer;
pub mod category_set;
pub mod document;
pub mod error;
pub mod import;
pub mod models;
pub mod prompt;
pub mod reconcile;
pub mod relevance;
pub mod repair;
pub mod settings;
pub mod utils;
pub mod working_set;

#[cfg(test)]
mod test_support;

pub use analyzer::BookmarkAnalyzer;
pub use error::{BookmindError, Result};
pub use models::{AnalysisResult, Bookmark, CategorizedBookmark};
pub use settings::Settings;
