//! Normalization of free-form model output into a structured mapping.
//!
//! Models asked for JSON routinely wrap it in prose or markdown fences. This
//! module is total: for any input text it returns a JSON object, never an
//! error. Downstream decoding treats missing fields as defaults, so a
//! malformed response degrades to a plain conversational reply instead of
//! failing the turn.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Key set on the fallback mapping when no JSON could be recovered.
pub const PARSE_ERROR_KEY: &str = "error";
/// Value of [`PARSE_ERROR_KEY`] on the fallback mapping.
pub const PARSE_FAILED: &str = "parse_failed";

static JSON_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").unwrap());
static BARE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```\s*(.*?)\s*```").unwrap());

/// Recover a JSON object from raw model output.
///
/// Strategies, first success wins:
/// 1. parse the whole text;
/// 2. parse the interior of a ```json fenced block;
/// 3. parse the interior of an unlabelled fenced block;
/// 4. parse the span from the first `{` to the last `}`.
///
/// If all fail, returns `{"reply": <original text>, "error": "parse_failed"}`.
pub fn normalize(text: &str) -> Map<String, Value> {
    if let Some(map) = parse_object(text) {
        return map;
    }

    for re in [&JSON_FENCE_RE, &BARE_FENCE_RE] {
        if let Some(caps) = re.captures(text)
            && let Some(map) = parse_object(caps.get(1).map_or("", |m| m.as_str()))
        {
            return map;
        }
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}'))
        && start < end
        && let Some(map) = parse_object(&text[start..=end])
    {
        return map;
    }

    tracing::warn!(
        head = text.chars().take(120).collect::<String>(),
        "failed to recover structured output from model response"
    );
    let mut fallback = Map::new();
    fallback.insert("reply".to_string(), Value::String(text.to_string()));
    fallback.insert(
        PARSE_ERROR_KEY.to_string(),
        Value::String(PARSE_FAILED.to_string()),
    );
    fallback
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
