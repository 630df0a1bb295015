//! Import pipeline for bookmark files.
//!
//! Reads the Netscape bookmark format every browser exports, plus JSON lists
//! produced by this tool.

use scraper::{Html, Selector};
use serde_json::Value;

use crate::error::{BookmindError, Result};
use crate::models::{bookmarks_from_value, categorized_from_value, Bookmark, CategorizedBookmark};
use crate::utils::is_web_url;

/// Import result summary
#[derive(Debug)]
pub struct ImportResult {
    pub bookmarks: Vec<Bookmark>,
    /// Links without an absolute http(s) URL
    pub skipped: usize,
}

/// Parse `ADD_DATE` (Unix seconds) into milliseconds
fn parse_add_date(raw: Option<&str>) -> Option<i64> {
    raw?.trim().parse::<i64>().ok()?.checked_mul(1000)
}

/// Parse a Netscape bookmark export. Every `<a>` becomes a bookmark; links
/// that are not absolute http(s) URLs are skipped.
pub fn parse_bookmarks_html(html: &str) -> ImportResult {
    let mut result = ImportResult {
        bookmarks: Vec::new(),
        skipped: 0,
    };

    let Ok(selector) = Selector::parse("a") else {
        return result;
    };
    let document = Html::parse_document(html);
    let now = chrono::Utc::now().timestamp_millis();

    for link in document.select(&selector) {
        let url = link.value().attr("href").unwrap_or("").trim();
        if !is_web_url(url) {
            result.skipped += 1;
            continue;
        }

        let text: String = link.text().collect();
        let title = match text.trim() {
            "" => "Untitled".to_string(),
            t => t.to_string(),
        };

        result.bookmarks.push(Bookmark {
            title,
            url: url.to_string(),
            add_date: parse_add_date(link.value().attr("add_date")).unwrap_or(now),
        });
    }

    result
}

/// Bookmarks from a file's content: an HTML export, a JSON list, or a JSON
/// object with a `bookmarks` list.
pub fn parse_bookmark_file(content: &str) -> Result<Vec<Bookmark>> {
    match json_bookmark_list(content)? {
        Some(list) => bookmarks_from_value(&list),
        None => Ok(parse_bookmarks_html(content).bookmarks),
    }
}

/// Categorized bookmarks from a JSON list or a saved analysis result
pub fn parse_categorized_file(content: &str) -> Result<Vec<CategorizedBookmark>> {
    match json_bookmark_list(content)? {
        Some(list) => categorized_from_value(&list),
        None => Err(BookmindError::Validation(
            "expected a JSON list of categorized bookmarks or an analysis result".to_string(),
        )),
    }
}

/// `Some(list)` when the content is JSON, `None` when it looks like HTML
fn json_bookmark_list(content: &str) -> Result<Option<Value>> {
    let trimmed = content.trim_start();
    if !trimmed.starts_with('[') && !trimmed.starts_with('{') {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| BookmindError::Validation(format!("Failed to parse bookmarks JSON: {}", e)))?;

    match value {
        Value::Array(_) => Ok(Some(value)),
        Value::Object(mut obj) => obj
            .remove("bookmarks")
            .map(Some)
            .ok_or_else(|| BookmindError::Validation("JSON object has no \"bookmarks\" field".to_string())),
        _ => Err(BookmindError::Validation("expected a JSON list or object".to_string())),
    }
}
