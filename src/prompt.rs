//! Instruction text and response schema sent with every generator call.
//!
//! The schema is advisory: the generator is free to ignore it, so nothing
//! downstream assumes the reply follows it.

use serde::Serialize;

use crate::error::{BookmindError, Result};
use crate::settings::Settings;
use crate::working_set::WorkingSet;

/// Smallest and largest category count requested from the generator
pub const MIN_CATEGORIES: usize = 3;
pub const MAX_CATEGORIES: usize = 6;

/// One completion exchange, independent of the endpoint it is sent to.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

fn categorize_instructions() -> String {
    format!(
        r#"You are a bookmark organizer.
You will receive a JSON list of bookmarks. Each has an "id", a "title" and a "url".

YOUR TASK:
Group the bookmarks into {min} to {max} specific categories based on their titles and URLs.

Return ONLY a raw JSON object with exactly this structure:
{{
  "categories": ["Category A", "Category B"],
  "bookmarks": [
    {{ "id": 0, "category": "Category A" }}
  ]
}}

RULES:
- Include one entry in "bookmarks" for EVERY id you were given.
- Every "category" must be one of the names listed in "categories".
- No markdown, no code fences, no commentary. Reply with the JSON object only."#,
        min = MIN_CATEGORIES,
        max = MAX_CATEGORIES,
    )
}

const QUERY_INSTRUCTIONS: &str = r#"You are a bookmark search assistant.
You will receive a JSON object with a "query" and a list of "bookmarks". Each bookmark has an "id", "title", "url" and "category".

YOUR TASK:
Return the ids of the bookmarks that are highly relevant to the query, most relevant first.

Return ONLY a raw JSON object with exactly this structure:
{
  "relevantIds": [0, 5, 12]
}

RULES:
- If nothing matches, return {"relevantIds": []}.
- No markdown, no code fences, no commentary. Reply with the JSON object only."#;

/// Categorization request: the user message is the JSON-encoded working set
pub fn categorize_request(working_set: &WorkingSet, settings: &Settings) -> Result<CompletionRequest> {
    let user = serde_json::to_string(&working_set.entries)
        .map_err(|e| BookmindError::Validation(format!("Failed to encode bookmarks: {}", e)))?;

    Ok(CompletionRequest {
        system: categorize_instructions(),
        user,
        temperature: settings.categorize_temperature,
        max_tokens: settings.categorize_max_tokens,
    })
}

/// Query request: the user message carries the query and the working set
pub fn query_request(query: &str, working_set: &WorkingSet, settings: &Settings) -> Result<CompletionRequest> {
    #[derive(Serialize)]
    struct QueryPayload<'a> {
        query: &'a str,
        bookmarks: &'a [crate::models::IndexedBookmark],
    }

    let user = serde_json::to_string(&QueryPayload {
        query,
        bookmarks: &working_set.entries,
    })
    .map_err(|e| BookmindError::Validation(format!("Failed to encode query: {}", e)))?;

    Ok(CompletionRequest {
        system: QUERY_INSTRUCTIONS.to_string(),
        user,
        temperature: settings.query_temperature,
        max_tokens: settings.query_max_tokens,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bookmark, CategorizedBookmark};
    use crate::working_set::{index_bookmarks, index_categorized};

    fn sample() -> Vec<Bookmark> {
        vec![
            Bookmark { title: "A".to_string(), url: "http://a".to_string(), add_date: 1 },
            Bookmark { title: "B".to_string(), url: "http://b".to_string(), add_date: 2 },
        ]
    }

    #[test]
    fn test_categorize_request_carries_working_set() {
        let settings = Settings::default();
        let request = categorize_request(&index_bookmarks(&sample(), 100), &settings).unwrap();

        let user: serde_json::Value = serde_json::from_str(&request.user).unwrap();
        assert_eq!(user[1]["id"], 1);
        assert_eq!(user[1]["url"], "http://b");
        assert!(user[0].get("addDate").is_none());
        assert!(request.system.contains("\"categories\""));
        assert!(request.system.contains("3 to 6"));
        assert_eq!(request.max_tokens, 4000);
        assert!((request.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_query_request_shape() {
        let settings = Settings::default();
        let categorized: Vec<CategorizedBookmark> =
            sample().iter().map(|b| CategorizedBookmark::new(b, "Docs")).collect();
        let request = query_request("rust docs", &index_categorized(&categorized, 200), &settings).unwrap();

        let user: serde_json::Value = serde_json::from_str(&request.user).unwrap();
        assert_eq!(user["query"], "rust docs");
        assert_eq!(user["bookmarks"][0]["category"], "Docs");
        assert!(request.system.contains("relevantIds"));
        assert_eq!(request.max_tokens, 1000);
    }
}
