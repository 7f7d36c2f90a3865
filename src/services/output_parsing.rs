use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{AppError, AppResult};

static ARRAY_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\[.*\]").expect("array span pattern is valid"));

/// Extract the first JSON array found in free-form model output.
///
/// Model replies are not guaranteed to be well-formed or single-block, so the
/// attempts cascade: strip an enclosing code fence, try the greedy outermost
/// `[...]` span, fall back to a bracket-depth scan (handles multiple
/// array-looking substrings), and finally try the whole cleaned text. Only
/// array-of-JSON-values decoding is enforced here; record shape is validated
/// by the caller.
pub fn extract_json_array(raw_text: &str) -> AppResult<Vec<serde_json::Value>> {
    let cleaned = strip_code_fence(raw_text);

    if let Some(matched) = ARRAY_SPAN.find(&cleaned) {
        if let Ok(records) = serde_json::from_str(matched.as_str()) {
            return Ok(records);
        }
    }

    if let Some(span) = first_balanced_span(&cleaned) {
        if let Ok(records) = serde_json::from_str(span) {
            return Ok(records);
        }
    }

    if let Ok(records) = serde_json::from_str(cleaned.trim()) {
        return Ok(records);
    }

    log::error!("Failed to extract a JSON array from model output");
    Err(AppError::UnparseableOutput {
        raw: raw_text.to_string(),
    })
}

/// Remove an enclosing code fence, including an optional language tag on the
/// line after the opening fence. Text that does not start with a fence is
/// returned trimmed.
fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let inner = trimmed.trim_matches(|c: char| c == '`' || c.is_whitespace());
    let inner = match inner.split_once('\n') {
        Some((tag, rest)) if !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric()) => {
            rest
        }
        _ => inner,
    };

    inner
        .trim_matches(|c: char| c == '`' || c.is_whitespace())
        .to_string()
}

/// First substring whose bracket depth returns to zero after having opened.
fn first_balanced_span(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut start = None;

    for (position, ch) in text.char_indices() {
        match ch {
            '[' => {
                if depth == 0 {
                    start = Some(position);
                }
                depth += 1;
            }
            ']' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(open) = start {
                            return Some(&text[open..=position]);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    None
}
