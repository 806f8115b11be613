//! Model response normalization
//!
//! Models wrap JSON in markdown fences or chat around it. Everything that
//! parses a model response goes through [`normalize_json_response`] first;
//! everything that compares UN numbers goes through
//! [`normalize_un_number`]. Both are the single implementation for their
//! concern.

use crate::error::{HazCheckError, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FENCE_RE: Regex =
        Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").expect("fence regex");
}

/// Strip markdown fences and surrounding prose, returning the JSON body.
///
/// Tries a fenced block first, then falls back to the outermost brace
/// pair. Anything else is a malformed response.
pub fn normalize_json_response(raw: &str) -> Result<String> {
    let raw = raw.trim();

    if let Some(captures) = FENCE_RE.captures(raw) {
        return Ok(captures[1].trim().to_string());
    }

    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if start < end {
            return Ok(raw[start..=end].to_string());
        }
    }

    Err(HazCheckError::MalformedResponse(format!(
        "no JSON object in model response: {}",
        truncate_for_log(raw)
    )))
}

/// Canonicalize a UN number to the `UN` prefix plus digits form.
/// Idempotent; bare digits gain the prefix, lowercase prefixes are
/// uppercased, surrounding whitespace is dropped. Values that are not a
/// numeric identifier ("N/A", a shipping name, prose from a form read)
/// pass through trimmed but otherwise untouched.
pub fn normalize_un_number(raw: &str) -> String {
    let trimmed = raw.trim();
    let upper = trimmed.to_ascii_uppercase();
    let body = upper
        .strip_prefix("UN")
        .map(str::trim_start)
        .unwrap_or(&upper);
    if !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()) {
        format!("UN{body}")
    } else {
        trimmed.to_string()
    }
}

fn truncate_for_log(raw: &str) -> String {
    const MAX: usize = 200;
    if raw.chars().count() <= MAX {
        raw.to_string()
    } else {
        let head: String = raw.chars().take(MAX).collect();
        format!("{head}...")
    }
}
