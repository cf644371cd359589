//! Extraction of the lesson plan JSON from a free-form model reply.
//!
//! Models often wrap the requested object in prose or code fences. The
//! extractor tries each `{` in order and runs a streaming JSON parse from
//! it; the first position that yields a complete object wins. Stray braces
//! in prose fail to parse and are skipped. An object that is opened but
//! never closed ends the scan as malformed, so a truncated reply never
//! yields one of its nested objects. When no position parses, the whole
//! reply is tried as JSON.

use serde_json::{Deserializer, Value};
use thiserror::Error;

use crate::plan::LessonPlan;

/// The reply did not contain a parseable JSON object.
#[derive(Debug, Clone, Error)]
#[error("model reply does not contain a JSON object: {reason}")]
pub struct MalformedResponseError {
    /// Why extraction failed.
    pub reason: String,
    /// The full reply, kept for server-side diagnostics.
    pub raw: String,
}

/// Extract a [`LessonPlan`] from the model's raw reply.
pub fn extract_plan(raw: &str) -> Result<LessonPlan, MalformedResponseError> {
    let malformed = |reason: String| MalformedResponseError {
        reason,
        raw: raw.to_string(),
    };

    match first_object(raw) {
        Scan::Found(plan) => return Ok(plan),
        Scan::Truncated(e) => return Err(malformed(format!("JSON object is never closed: {e}"))),
        Scan::NotFound => {}
    }

    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value) => LessonPlan::from_value(value)
            .ok_or_else(|| malformed("top-level JSON value is not an object".to_string())),
        Err(e) => Err(malformed(e.to_string())),
    }
}

enum Scan {
    Found(LessonPlan),
    /// A candidate ran into end of input before closing.
    Truncated(serde_json::Error),
    NotFound,
}

/// Find the first structurally complete JSON object in `text`.
fn first_object(text: &str) -> Scan {
    for (start, _) in text.match_indices('{') {
        let mut stream = Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value)) => {
                if let Some(plan) = LessonPlan::from_value(value) {
                    return Scan::Found(plan);
                }
            }
            Some(Err(e)) if e.is_eof() => return Scan::Truncated(e),
            _ => {}
        }
    }
    Scan::NotFound
}
