//! Loose JSON recovery from free-form model text.
//!
//! Models wrap their JSON in prose or code fences. These helpers take the
//! widest brace- or bracket-delimited span (first opener to last closer) and
//! try to parse it. They return `None` instead of failing so callers can
//! fall back to a default.

use serde::de::DeserializeOwned;

fn delimited_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// First `{` .. last `}` span, parsed into `T`.
pub fn extract_json_object<T: DeserializeOwned>(text: &str) -> Option<T> {
    parse_span(delimited_span(text, '{', '}')?)
}

/// First `[` .. last `]` span, parsed into `T`.
pub fn extract_json_array<T: DeserializeOwned>(text: &str) -> Option<T> {
    parse_span(delimited_span(text, '[', ']')?)
}

fn parse_span<T: DeserializeOwned>(span: &str) -> Option<T> {
    match serde_json::from_str(span) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Discarding unparseable JSON from model output: {}", e);
            None
        }
    }
}
