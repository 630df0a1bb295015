//! Typed view over a decoded generator reply
//!
//! Nothing on the wire is trusted: every field is checked for type before it
//! is used, and entries that fail the check are dropped and counted.

use serde_json::Value;

/// An assignment the generator declared. The id is not yet bounds-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredAssignment {
    pub id: u64,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategorizationDoc {
    /// Declared category names, non-empty strings only, in declared order
    pub categories: Vec<String>,
    pub assignments: Vec<DeclaredAssignment>,
    /// Entries dropped for a missing or non-integer id
    pub discarded: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryDoc {
    /// Ranked ids, most relevant first. Not yet bounds-checked.
    pub relevant_ids: Vec<u64>,
    pub discarded: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorDocument {
    Categorization(CategorizationDoc),
    Query(QueryDoc),
    Malformed(String),
}

impl GeneratorDocument {
    /// Validate a categorization reply
    pub fn categorization(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return GeneratorDocument::Malformed(format!(
                "expected a JSON object, got {}",
                type_name(value)
            ));
        };

        let categories = obj
            .get("categories")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .filter(|s| !s.trim().is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let mut doc = CategorizationDoc {
            categories,
            ..CategorizationDoc::default()
        };

        for entry in obj.get("bookmarks").and_then(Value::as_array).into_iter().flatten() {
            match entry.get("id").and_then(Value::as_u64) {
                Some(id) => doc.assignments.push(DeclaredAssignment {
                    id,
                    category: entry.get("category").and_then(Value::as_str).map(String::from),
                }),
                None => doc.discarded += 1,
            }
        }

        GeneratorDocument::Categorization(doc)
    }

    /// Validate a relevance-query reply
    pub fn query(value: &Value) -> Self {
        let Some(ids) = value.get("relevantIds").and_then(Value::as_array) else {
            return GeneratorDocument::Malformed("missing \"relevantIds\" array".to_string());
        };

        let mut doc = QueryDoc::default();
        for id in ids {
            match id.as_u64() {
                Some(id) => doc.relevant_ids.push(id),
                None => doc.discarded += 1,
            }
        }

        GeneratorDocument::Query(doc)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
