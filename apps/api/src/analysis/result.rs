//! Analysis result envelope shared by the ATS and job-match pipelines.
//!
//! The model's structured output is schemaless from the service's point of
//! view (the schema lives in the prompt contract), so the payload is a raw
//! JSON object. The envelope adds the two signals renderers key off:
//! `fallback_mode` for demo payloads and `error` for failed runs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The two analysis flavors the service produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Ats,
    JobMatch,
}

/// Envelope around one analysis run.
///
/// Exactly one side is populated: analysis fields in `fields` (genuine or
/// demo), or `error` plus a `raw_response` excerpt when the run failed.
/// Constructors below are the only way results are built, which keeps that
/// invariant out of callers' hands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub fallback_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl AnalysisResult {
    /// Genuine model output that parsed cleanly.
    pub fn parsed(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            fallback_mode: false,
            error: None,
            raw_response: None,
        }
    }

    /// Hand-authored demo payload served when the model is unreachable.
    pub fn demo(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            fallback_mode: true,
            error: None,
            raw_response: None,
        }
    }

    /// Terminal failure with no model text to show, such as a classified
    /// transport or HTTP error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            fields: Map::new(),
            fallback_mode: false,
            error: Some(message.into()),
            raw_response: None,
        }
    }

    /// Terminal extraction failure: the model answered, but no analysis
    /// object could be dug out. Carries an excerpt of the raw output.
    pub fn extraction_failed(message: impl Into<String>, raw_excerpt: impl Into<String>) -> Self {
        Self {
            fields: Map::new(),
            fallback_mode: false,
            error: Some(message.into()),
            raw_response: Some(raw_excerpt.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Walks a `/a/b/c` style pointer through the payload object.
    fn lookup(&self, pointer: &str) -> Option<&Value> {
        let mut parts = pointer.split('/').filter(|p| !p.is_empty());
        let mut current = self.fields.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// First numeric value found under any of the given pointers, rounded to
    /// an integer score. Genuine payloads nest scores (for example
    /// `/section_analysis/skills/score`) while demo payloads keep them flat,
    /// so callers pass both spellings. Missing everywhere yields 0.
    pub fn score_any(&self, pointers: &[&str]) -> i32 {
        pointers
            .iter()
            .find_map(|p| self.lookup(p).and_then(Value::as_f64))
            .map(|v| v.round() as i32)
            .unwrap_or(0)
    }

    /// First value found under any of the given pointers, cloned.
    pub fn value_any(&self, pointers: &[&str]) -> Option<Value> {
        pointers.iter().find_map(|p| self.lookup(p)).cloned()
    }
}
