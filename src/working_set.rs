//! Truncates and positionally indexes bookmarks before they reach the generator.

use crate::models::{Bookmark, CategorizedBookmark, IndexedBookmark};

/// Working set plus how many input entries fell beyond the limit.
#[derive(Debug, Clone)]
pub struct WorkingSet {
    pub entries: Vec<IndexedBookmark>,
    pub dropped: usize,
}

impl WorkingSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// First `limit` bookmarks, `id` = position.
pub fn index_bookmarks(bookmarks: &[Bookmark], limit: usize) -> WorkingSet {
    let entries = bookmarks
        .iter()
        .take(limit)
        .enumerate()
        .map(|(id, b)| IndexedBookmark {
            id,
            title: b.title.clone(),
            url: b.url.clone(),
            category: None,
        })
        .collect();

    WorkingSet {
        entries,
        dropped: bookmarks.len().saturating_sub(limit),
    }
}

/// Same as [`index_bookmarks`] but keeps the category for query prompts.
pub fn index_categorized(bookmarks: &[CategorizedBookmark], limit: usize) -> WorkingSet {
    let entries = bookmarks
        .iter()
        .take(limit)
        .enumerate()
        .map(|(id, b)| IndexedBookmark {
            id,
            title: b.title.clone(),
            url: b.url.clone(),
            category: Some(b.category.clone()),
        })
        .collect();

    WorkingSet {
        entries,
        dropped: bookmarks.len().saturating_sub(limit),
    }
}
