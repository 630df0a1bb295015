//! Insertion-ordered, case-sensitive set of category names.

use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct CategorySet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl CategorySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name` unless already present. Returns true if it was added.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.seen.contains(name) {
            return false;
        }
        self.seen.insert(name.to_string());
        self.order.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

impl<'a> Extend<&'a str> for CategorySet {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_first_seen_order() {
        let mut set = CategorySet::new();
        set.extend(["News", "Docs", "News", "Tools", "Docs"]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.into_vec(), vec!["News", "Docs", "Tools"]);
    }

    #[test]
    fn test_case_sensitive() {
        let mut set = CategorySet::new();
        assert!(set.insert("docs"));
        assert!(set.insert("Docs"));
        assert!(!set.insert("Docs"));
        assert!(set.contains("docs"));
        assert_eq!(set.len(), 2);
    }
}
