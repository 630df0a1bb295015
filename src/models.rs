//! Request-scoped data model: bookmarks in, categorized bookmarks out.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BookmindError, Result};
use crate::utils::is_web_url;

/// Fallback category for bookmarks the generator never assigned.
pub const OTHER_CATEGORY: &str = "Other";

/// Category for assignments the generator declared without a label.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A single bookmark as produced by the importer or sent by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub title: String,
    pub url: String,
    /// Epoch milliseconds
    #[serde(default)]
    pub add_date: i64,
}

/// A bookmark with the category the pipeline assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedBookmark {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub add_date: i64,
    pub category: String,
}

impl CategorizedBookmark {
    pub fn new(bookmark: &Bookmark, category: impl Into<String>) -> Self {
        Self {
            title: bookmark.title.clone(),
            url: bookmark.url.clone(),
            add_date: bookmark.add_date,
            category: category.into(),
        }
    }
}

/// Shape sent to the generator. `id` is the position in the working set
/// and means nothing outside one request/response pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedBookmark {
    pub id: usize,
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Output of the categorization pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Unique, insertion-ordered, always contains [`OTHER_CATEGORY`]
    pub categories: Vec<String>,
    /// One entry per working-set bookmark
    pub bookmarks: Vec<CategorizedBookmark>,
}

impl AnalysisResult {
    /// Result for an empty input: no bookmarks, only the fallback category.
    pub fn empty() -> Self {
        Self {
            categories: vec![OTHER_CATEGORY.to_string()],
            bookmarks: Vec::new(),
        }
    }
}

/// Validate a caller-supplied bookmark list.
pub fn bookmarks_from_value(value: &Value) -> Result<Vec<Bookmark>> {
    let items = value
        .as_array()
        .ok_or_else(|| BookmindError::Validation("bookmarks must be a list".to_string()))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let bookmark: Bookmark = serde_json::from_value(item.clone())
                .map_err(|e| BookmindError::Validation(format!("bookmark {}: {}", i, e)))?;
            check_url(i, &bookmark.url)?;
            Ok(bookmark)
        })
        .collect()
}

/// Validate a caller-supplied list of already-categorized bookmarks.
pub fn categorized_from_value(value: &Value) -> Result<Vec<CategorizedBookmark>> {
    let items = value
        .as_array()
        .ok_or_else(|| BookmindError::Validation("bookmarks must be a list".to_string()))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let bookmark: CategorizedBookmark = serde_json::from_value(item.clone())
                .map_err(|e| BookmindError::Validation(format!("bookmark {}: {}", i, e)))?;
            check_url(i, &bookmark.url)?;
            Ok(bookmark)
        })
        .collect()
}

fn check_url(index: usize, url: &str) -> Result<()> {
    if is_web_url(url) {
        Ok(())
    } else {
        Err(BookmindError::Validation(format!(
            "bookmark {}: '{}' is not an absolute http(s) URL",
            index, url
        )))
    }
}
