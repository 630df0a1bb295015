//! Tolerant JSON decoding for generator output
//!
//! The generator is token-limited and gets cut off mid-document. Rather than
//! failing the whole request, recover the longest usable prefix:
//!
//! 1. strict parse
//! 2. close whatever string/array/object is still open
//! 3. cut back to the last complete object and close around it
//!
//! Each strategy runs only when the previous one failed, so a valid document
//! always decodes exactly as a strict parse would.

use serde_json::Value;
use thiserror::Error;

use crate::error::BookmindError;

/// Which strategy produced the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Strict,
    ClosedBrackets,
    TruncatedToLastObject,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Strict => "strict",
            Strategy::ClosedBrackets => "closed_brackets",
            Strategy::TruncatedToLastObject => "truncated_to_last_object",
        }
    }
}

/// Every strategy failed
#[derive(Debug, Clone, Error)]
#[error("all repair strategies failed: {reason}")]
pub struct ParseFailure {
    /// Error from the strict parse
    pub reason: String,
}

impl From<ParseFailure> for BookmindError {
    fn from(e: ParseFailure) -> Self {
        BookmindError::ResponseFormat(e.to_string())
    }
}

/// Decode generator text, repairing truncation when needed
pub fn repair(text: &str) -> Result<Value, ParseFailure> {
    repair_with_strategy(text).map(|(value, _)| value)
}

/// Same as [`repair`], also reporting the strategy that succeeded
pub fn repair_with_strategy(text: &str) -> Result<(Value, Strategy), ParseFailure> {
    let text = extract_document(text);

    let strict_error = match serde_json::from_str::<Value>(&text) {
        Ok(value) => return Ok((value, Strategy::Strict)),
        Err(e) => e.to_string(),
    };

    if let Some(value) = close_brackets(&text).and_then(|fixed| serde_json::from_str(&fixed).ok()) {
        return Ok((value, Strategy::ClosedBrackets));
    }

    if let Some(value) = truncate_to_last_object(&text) {
        return Ok((value, Strategy::TruncatedToLastObject));
    }

    Err(ParseFailure { reason: strict_error })
}

/// Trim, unwrap a markdown code fence, and skip prose before the first `{`
fn extract_document(text: &str) -> String {
    let trimmed = text.trim();

    // Remove markdown wrapping if present
    let unfenced = if trimmed.starts_with("```") {
        let body = trimmed
            .lines()
            .skip(1)
            .take_while(|l| !l.starts_with("```"))
            .collect::<Vec<_>>()
            .join("\n");
        if body.trim().is_empty() {
            // Fence and document on one line
            trimmed.trim_matches('`').to_string()
        } else {
            body
        }
    } else {
        trimmed.to_string()
    };

    let unfenced = unfenced.trim();
    if unfenced.starts_with('{') || unfenced.starts_with('[') {
        return unfenced.to_string();
    }
    match unfenced.find('{') {
        Some(start) => unfenced[start..].to_string(),
        None => unfenced.to_string(),
    }
}

/// Structural state at the end of a (possibly truncated) document
#[derive(Debug, Default)]
struct Scan {
    /// Open containers, `b'{'` or `b'['`, outermost first
    stack: Vec<u8>,
    in_string: bool,
    /// Last byte inside the open string was an unconsumed backslash
    escaped: bool,
    /// Byte offset of every `}` outside strings, with the stack left after it
    object_ends: Vec<(usize, Vec<u8>)>,
}

fn scan(text: &str) -> Scan {
    let mut state = Scan::default();

    // Structural characters are ASCII, so walking bytes is UTF-8 safe
    for (i, &b) in text.as_bytes().iter().enumerate() {
        if state.in_string {
            if state.escaped {
                state.escaped = false;
            } else if b == b'\\' {
                state.escaped = true;
            } else if b == b'"' {
                state.in_string = false;
            }
            continue;
        }

        match b {
            b'"' => state.in_string = true,
            b'{' | b'[' => state.stack.push(b),
            b'}' => {
                state.stack.pop();
                state.object_ends.push((i, state.stack.clone()));
            }
            b']' => {
                state.stack.pop();
            }
            _ => {}
        }
    }

    state
}

fn closing_sequence(stack: &[u8]) -> String {
    stack
        .iter()
        .rev()
        .map(|&open| if open == b'[' { ']' } else { '}' })
        .collect()
}

/// Strategy 2: terminate an open string, then close open containers
fn close_brackets(text: &str) -> Option<String> {
    let state = scan(text);
    if state.stack.is_empty() && !state.in_string {
        return None;
    }

    let mut fixed = text.to_string();
    if state.in_string {
        if state.escaped {
            fixed.pop();
        }
        fixed.push('"');
    } else {
        let kept = fixed.trim_end().trim_end_matches(',').len();
        fixed.truncate(kept);
    }

    fixed.push_str(&closing_sequence(&state.stack));
    Some(fixed)
}

/// Strategy 3: cut after the latest `}` that yields a valid document
fn truncate_to_last_object(text: &str) -> Option<Value> {
    let state = scan(text);

    state.object_ends.iter().rev().find_map(|(end, open)| {
        let mut candidate = text[..=*end].to_string();
        candidate.push_str(&closing_sequence(open));
        serde_json::from_str(&candidate).ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_document_is_strict() {
        let text = r#"{"categories":["Docs"],"bookmarks":[{"id":0,"category":"Docs"}]}"#;
        let (value, strategy) = repair_with_strategy(text).unwrap();
        assert_eq!(strategy, Strategy::Strict);
        assert_eq!(value, serde_json::from_str::<Value>(text).unwrap());
    }

    #[test]
    fn test_code_fence_is_stripped() {
        let text = "```json\n{\"relevantIds\": [2, 0]}\n```";
        let (value, strategy) = repair_with_strategy(text).unwrap();
        assert_eq!(strategy, Strategy::Strict);
        assert_eq!(value, json!({"relevantIds": [2, 0]}));
    }

    #[test]
    fn test_single_line_code_fence() {
        let (value, strategy) = repair_with_strategy("```json{\"relevantIds\":[1]}```").unwrap();
        assert_eq!(strategy, Strategy::Strict);
        assert_eq!(value, json!({"relevantIds": [1]}));

        let (value, _) = repair_with_strategy("```{\"relevantIds\":[3]}```").unwrap();
        assert_eq!(value, json!({"relevantIds": [3]}));
    }

    #[test]
    fn test_leading_prose_is_skipped() {
        let (value, strategy) = repair_with_strategy("Sure! Here you go: {\"relevantIds\": []}").unwrap();
        assert_eq!(strategy, Strategy::Strict);
        assert_eq!(value, json!({"relevantIds": []}));
    }

    #[test]
    fn test_truncated_inside_string() {
        let text = r#"{"categories":["Docs"],"bookmarks":[{"id":0,"category":"Do"#;
        let (value, strategy) = repair_with_strategy(text).unwrap();
        assert_eq!(strategy, Strategy::ClosedBrackets);
        assert_eq!(value["categories"], json!(["Docs"]));
        assert_eq!(value["bookmarks"][0]["id"], 0);
        assert_eq!(value["bookmarks"][0]["category"], "Do");
    }

    #[test]
    fn test_truncated_mid_array() {
        let (value, strategy) = repair_with_strategy(r#"{"relevantIds":[4, 1"#).unwrap();
        assert_eq!(strategy, Strategy::ClosedBrackets);
        assert_eq!(value, json!({"relevantIds": [4, 1]}));
    }

    #[test]
    fn test_truncated_after_closed_array() {
        let (value, strategy) = repair_with_strategy(r#"{"categories":["A","B"]"#).unwrap();
        assert_eq!(strategy, Strategy::ClosedBrackets);
        assert_eq!(value, json!({"categories": ["A", "B"]}));
    }

    #[test]
    fn test_trailing_comma_before_cutoff() {
        let (value, _) = repair_with_strategy(r#"{"categories":["A","B","#).unwrap();
        assert_eq!(value, json!({"categories": ["A", "B"]}));
    }

    #[test]
    fn test_dangling_escape_is_dropped() {
        let (value, strategy) = repair_with_strategy(r#"{"categories":["say \"hi\" \"#).unwrap();
        assert_eq!(strategy, Strategy::ClosedBrackets);
        assert_eq!(value["categories"][0], "say \"hi\" ");
    }

    #[test]
    fn test_truncated_inside_key_falls_back_to_last_object() {
        let text = r#"{"categories":["A"],"bookmarks":[{"id":0,"category":"A"},{"id":1,"cat"#;
        let (value, strategy) = repair_with_strategy(text).unwrap();
        assert_eq!(strategy, Strategy::TruncatedToLastObject);
        assert_eq!(
            value,
            json!({"categories": ["A"], "bookmarks": [{"id": 0, "category": "A"}]})
        );
    }

    #[test]
    fn test_truncated_after_colon_falls_back_to_last_object() {
        let text = r#"{"bookmarks":[{"id":0,"category":"A"},{"id":1,"category":"B"},{"id":2,"category":"#;
        let (value, strategy) = repair_with_strategy(text).unwrap();
        assert_eq!(strategy, Strategy::TruncatedToLastObject);
        assert_eq!(value["bookmarks"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_trailing_prose_after_document() {
        let (value, strategy) = repair_with_strategy("{\"relevantIds\":[1]}\nHope this helps!").unwrap();
        assert_eq!(strategy, Strategy::TruncatedToLastObject);
        assert_eq!(value, json!({"relevantIds": [1]}));
    }

    #[test]
    fn test_braces_inside_strings_are_not_structure() {
        let text = r#"{"categories":["{curly}"],"bookmarks":[{"id":0,"category":"a}b"#;
        let (value, _) = repair_with_strategy(text).unwrap();
        assert_eq!(value["categories"][0], "{curly}");
        assert_eq!(value["bookmarks"][0]["category"], "a}b");
    }

    #[test]
    fn test_non_ascii_content_survives() {
        let (value, _) = repair_with_strategy(r#"{"categories":["Café ☕"#).unwrap();
        assert_eq!(value["categories"][0], "Café ☕");
    }

    #[test]
    fn test_unrecoverable_text_fails() {
        let err = repair("I could not categorize these bookmarks.").unwrap_err();
        assert!(err.to_string().contains("all repair strategies failed"));
        assert!(repair("").is_err());
        assert!(repair(r#"{"id":"#).is_err());
    }

    #[test]
    fn test_parse_failure_converts_to_response_format() {
        let err: BookmindError = repair("nope").unwrap_err().into();
        assert!(matches!(err, BookmindError::ResponseFormat(_)));
    }
}
