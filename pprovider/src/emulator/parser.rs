//! Recovers tool invocations from unconstrained model text.
//!
//! Models regularly ignore the "bare JSON only" instruction and wrap their
//! answer in prose or markdown fences. Extraction therefore degrades through
//! strategies from strict to permissive instead of failing outright; the
//! final fallback is "the whole text is natural language".

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::{MessageContent, ToolCall};

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```(?:json)?\s*(\{[\s\S]*?\}|\[[\s\S]*?\])\s*```").expect("valid fence pattern")
});

// These balance exactly one level of nesting. Deeper structures are expected
// to be caught by the whole-text or fenced-block strategies first.
static BRACE_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}").expect("valid object pattern"));

static BRACKET_ARRAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[[^\[\]]*(?:\[[^\[\]]*\][^\[\]]*)*\]").expect("valid array pattern")
});

/// Tries, in priority order: the whole trimmed text, the first fenced code
/// block, the first brace-balanced substring, the first bracket-balanced
/// substring. Returns `None` when no strategy yields valid JSON.
pub fn extract_structured(text: &str) -> Option<Value> {
    let trimmed = text.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    if let Some(captures) = FENCED_BLOCK.captures(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(&captures[1]) {
            return Some(value);
        }
    }

    if let Some(found) = BRACE_OBJECT.find(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(found.as_str()) {
            return Some(value);
        }
    }

    if let Some(found) = BRACKET_ARRAY.find(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(found.as_str()) {
            return Some(value);
        }
    }

    None
}

/// Normalizes an extracted JSON value into a tool-call list.
///
/// A lone object is a one-element candidate list; an array contributes each
/// element. Candidates that are not objects or lack a `name` field are
/// dropped individually. Synthesized ids use the candidate's position in the
/// original list, so ids stay stable even when neighbors are skipped.
pub fn to_tool_calls(value: &Value) -> Vec<ToolCall> {
    let candidates: &[Value] = match value {
        Value::Object(_) => std::slice::from_ref(value),
        Value::Array(items) => items.as_slice(),
        _ => return Vec::new(),
    };

    let mut tool_calls = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        let Some(fields) = candidate.as_object() else {
            continue;
        };

        let Some(name) = fields.get("name") else {
            continue;
        };

        let id = match fields.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(other) => other.to_string(),
            None => format!("call_{index}"),
        };

        let arguments = fields
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        let arguments = serde_json::to_string(&arguments)
            .unwrap_or_else(|_| String::from("{}"));

        tool_calls.push(ToolCall::new(id, stringify(name), arguments));
    }

    tool_calls
}

/// Splits model output into recognized tool calls and leftover prose.
///
/// When at least one call is recognized, surrounding prose is discarded so
/// the caller never sees contradictory "text plus call" state. When
/// structured JSON is found but yields no usable call, the original text is
/// returned untouched, making the no-call result a fixed point.
pub fn parse_output(content: &MessageContent) -> (Vec<ToolCall>, Option<String>) {
    let text = content.text_concat();

    let Some(value) = extract_structured(&text) else {
        return (Vec::new(), Some(text));
    };

    let tool_calls = to_tool_calls(&value);
    if tool_calls.is_empty() {
        return (Vec::new(), Some(text));
    }

    (tool_calls, None)
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
