//! Reconciliation of a categorization reply against the working set
//!
//! Guarantees the result is total: every working-set bookmark appears exactly
//! once, whatever the generator omitted, duplicated or invented.

use crate::category_set::CategorySet;
use crate::document::CategorizationDoc;
use crate::models::{AnalysisResult, Bookmark, CategorizedBookmark, OTHER_CATEGORY, UNCATEGORIZED};

/// Counts for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileStats {
    /// Generator entries mapped onto a bookmark
    pub accepted: usize,
    /// Generator entries ignored (bad id, out of range, repeated)
    pub discarded: usize,
    /// Bookmarks the generator skipped, filed under "Other"
    pub repaired: usize,
}

#[derive(Debug, Clone)]
pub struct Reconciled {
    pub result: AnalysisResult,
    pub stats: ReconcileStats,
}

/// Map declared assignments back onto `working_set` (the bookmarks that were
/// sent, in the order they were indexed).
pub fn reconcile(working_set: &[Bookmark], doc: &CategorizationDoc) -> Reconciled {
    let mut stats = ReconcileStats {
        discarded: doc.discarded,
        ..ReconcileStats::default()
    };
    let mut covered = vec![false; working_set.len()];
    let mut bookmarks = Vec::with_capacity(working_set.len());

    for assignment in &doc.assignments {
        let index = match usize::try_from(assignment.id) {
            Ok(i) if i < working_set.len() => i,
            _ => {
                stats.discarded += 1;
                continue;
            }
        };
        if covered[index] {
            stats.discarded += 1;
            continue;
        }
        covered[index] = true;

        let category = assignment
            .category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(UNCATEGORIZED);
        bookmarks.push(CategorizedBookmark::new(&working_set[index], category));
        stats.accepted += 1;
    }

    // Totality repair
    for (bookmark, _) in working_set.iter().zip(&covered).filter(|(_, seen)| !**seen) {
        bookmarks.push(CategorizedBookmark::new(bookmark, OTHER_CATEGORY));
        stats.repaired += 1;
    }

    let mut categories = CategorySet::new();
    categories.extend(doc.categories.iter().map(String::as_str));
    categories.insert(OTHER_CATEGORY);

    Reconciled {
        result: AnalysisResult {
            categories: categories.into_vec(),
            bookmarks,
        },
        stats,
    }
}
