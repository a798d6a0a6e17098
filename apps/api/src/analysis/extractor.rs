//! Structured-output extraction. Digs the JSON analysis object out of
//! free-form model text.
//!
//! Local models decorate their JSON with reasoning, markdown, or apologies.
//! The primary strategy slices from the first `{` to the last `}` and parses
//! strictly. A slice that does not parse fails extraction immediately; a
//! sloppier retry would mask truncated output as a smaller valid object.

use serde_json::{Map, Value};
use thiserror::Error;

/// Longest excerpt of raw model output carried in an extraction error.
const MAX_EXCERPT_CHARS: usize = 1000;

/// Extraction failure. `raw_excerpt` carries the head of the offending
/// model output for diagnostics and for the stored failure record.
#[derive(Debug, Error)]
#[error("could not extract a JSON object from model output")]
pub struct ExtractionError {
    pub raw_excerpt: String,
}

/// Extracts a single JSON object from raw model output.
///
/// Fallback (only when no `{` ... `}` pair in order exists): collect lines
/// from the first line containing `{` through the first line containing `}`
/// seen while collecting, then strict-parse the joined block.
pub fn extract_json(raw: &str) -> Result<Map<String, Value>, ExtractionError> {
    if let Some(span) = brace_span(raw) {
        return parse_object(span).ok_or_else(|| failure(raw));
    }

    let collected = collect_braced_lines(raw);
    parse_object(&collected).ok_or_else(|| failure(raw))
}

/// The inclusive slice from the first `{` to the last `}`, when the first
/// precedes the last.
fn brace_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

/// Strict parse accepting only a top-level object. Arrays and scalars are
/// extraction failures even when they are valid JSON.
fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn collect_braced_lines(raw: &str) -> String {
    let mut collecting = false;
    let mut lines = Vec::new();

    for line in raw.lines() {
        if line.contains('{') {
            collecting = true;
        }
        if collecting {
            lines.push(line);
        }
        if collecting && line.contains('}') {
            break;
        }
    }

    lines.join("\n")
}

fn failure(raw: &str) -> ExtractionError {
    ExtractionError {
        raw_excerpt: excerpt(raw),
    }
}

fn excerpt(raw: &str) -> String {
    if raw.chars().count() <= MAX_EXCERPT_CHARS {
        return raw.to_string();
    }
    let mut head: String = raw.chars().take(MAX_EXCERPT_CHARS).collect();
    head.push_str("...");
    head
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_object_wrapped_in_prose() {
        let raw = r#"Here is my analysis: {"overall_ats_score": 82} hope that helps!"#;
        let map = extract_json(raw).unwrap();
        assert_eq!(map["overall_ats_score"], 82);
    }

    #[test]
    fn test_extracts_multiline_object_after_reasoning() {
        let raw = "Let me think about this.\nThe resume is strong.\n{\n  \"overall_ats_score\": 74,\n  \"strengths\": [\"clear formatting\"]\n}\nDone.";
        let map = extract_json(raw).unwrap();
        assert_eq!(map["overall_ats_score"], 74);
        assert_eq!(map["strengths"][0], "clear formatting");
    }

    #[test]
    fn test_extracts_object_inside_markdown_fences() {
        let raw = "```json\n{\"overall_match_score\": 61}\n```";
        let map = extract_json(raw).unwrap();
        assert_eq!(map["overall_match_score"], 61);
    }

    #[test]
    fn test_no_braces_fails_with_excerpt() {
        let raw = "no braces here";
        let err = extract_json(raw).unwrap_err();
        assert_eq!(err.raw_excerpt, "no braces here");
        assert!(!err.raw_excerpt.is_empty());
    }

    #[test]
    fn test_long_garbage_truncates_excerpt() {
        let raw = "x".repeat(2000);
        let err = extract_json(&raw).unwrap_err();
        assert_eq!(err.raw_excerpt.chars().count(), 1003);
        assert!(err.raw_excerpt.ends_with("..."));
    }

    #[test]
    fn test_unparseable_span_does_not_retry_line_scan() {
        // The outer span is garbage; line-scanning could see the clean inner
        // line, but the contract is to give up after the primary parse.
        let raw = "{oops not json\n{\"overall_ats_score\": 90}";
        let err = extract_json(raw).unwrap_err();
        assert!(err.raw_excerpt.starts_with("{oops"));
    }

    #[test]
    fn test_array_output_is_a_failure() {
        // Valid JSON, but not an object; no brace pair to slice either.
        let raw = r#"niceties then ["not", "an", "object"] trailing"#;
        assert!(extract_json(raw).is_err());
    }

    #[test]
    fn test_scalar_json_is_a_failure() {
        assert!(extract_json("42").is_err());
    }

    #[test]
    fn test_reversed_braces_take_line_scan_path_and_fail() {
        // Last `}` precedes the first `{`, so the primary strategy never
        // fires; the line scan collects from the `{` line but finds no close.
        let raw = "trailing noise}\nthen {\"started\": true";
        let err = extract_json(raw).unwrap_err();
        assert_eq!(err.raw_excerpt, raw);
    }

    #[test]
    fn test_excerpt_is_char_aware() {
        let raw = format!("ü{}", "y".repeat(1999));
        let err = extract_json(&raw).unwrap_err();
        assert!(err.raw_excerpt.starts_with('ü'));
        assert_eq!(err.raw_excerpt.chars().count(), 1003);
    }

    #[test]
    fn test_whitespace_padded_object_parses() {
        let raw = "   \n\t {\"ok\": true} \n  ";
        let map = extract_json(raw).unwrap();
        assert_eq!(map["ok"], true);
    }
}
