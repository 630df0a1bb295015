//! Maps a ranked id list from the generator onto categorized bookmarks.

use std::collections::HashSet;

use crate::document::QueryDoc;
use crate::models::CategorizedBookmark;

/// Bookmarks for the in-range ids of `doc`, in the generator's ranking.
///
/// `working_set` is the slice that was indexed and sent. Out-of-range ids are
/// ignored; a repeated id keeps its first (highest) rank.
pub fn filter_relevant(working_set: &[CategorizedBookmark], doc: &QueryDoc) -> Vec<CategorizedBookmark> {
    let mut seen = HashSet::new();

    doc.relevant_ids
        .iter()
        .filter_map(|&id| usize::try_from(id).ok())
        .filter(|&i| i < working_set.len())
        .filter(|&i| seen.insert(i))
        .map(|i| working_set[i].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bookmark;

    fn working_set(n: usize) -> Vec<CategorizedBookmark> {
        (0..n)
            .map(|i| {
                let b = Bookmark {
                    title: format!("B{}", i),
                    url: format!("https://example.com/{}", i),
                    add_date: 0,
                };
                CategorizedBookmark::new(&b, "Docs")
            })
            .collect()
    }

    fn doc(ids: &[u64]) -> QueryDoc {
        QueryDoc { relevant_ids: ids.to_vec(), discarded: 0 }
    }

    #[test]
    fn test_preserves_declared_ranking() {
        let set = working_set(5);
        let titles: Vec<String> = filter_relevant(&set, &doc(&[4, 0, 2]))
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["B4", "B0", "B2"]);
    }

    #[test]
    fn test_out_of_range_ids_are_ignored() {
        let set = working_set(3);
        let result = filter_relevant(&set, &doc(&[3, 1, 200, u64::MAX]));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "B1");
    }

    #[test]
    fn test_repeated_ids_keep_first_rank() {
        let set = working_set(3);
        let result = filter_relevant(&set, &doc(&[2, 1, 2]));
        let titles: Vec<&str> = result.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["B2", "B1"]);
    }

    #[test]
    fn test_empty_ids_yield_empty_result() {
        assert!(filter_relevant(&working_set(3), &doc(&[])).is_empty());
    }
}
