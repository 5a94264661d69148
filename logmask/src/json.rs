//! Masking for payloads that arrive as JSON text or as header maps.
//!
//! These helpers classify object keys and header names directly, independent
//! of any [`crate::MaskingMode`]: JSON text has no tags to consult.

use std::collections::HashMap;

use serde_json::{Map, Value as JsonValue};

use crate::{
    classify::classify,
    obscure::{obscure, MASK_TOKEN},
};

/// Nesting depth at which `serde_json` gives up parsing.
const PARSER_DEPTH_LIMIT: usize = 128;

/// Masks sensitive values inside JSON text.
///
/// Empty input stays empty. Input that does not parse as JSON is returned
/// unchanged; the caller cannot tell it apart from JSON that had nothing to
/// mask. The exception is input nested too deeply for the parser: it may be
/// valid JSON that was never inspected, so the whole payload becomes
/// [`MASK_TOKEN`].
///
/// ```
/// let deep = format!("{}{}", "[".repeat(200), "]".repeat(200));
/// assert_eq!(logmask::mask_json_str(&deep), logmask::MASK_TOKEN);
/// ```
pub fn mask_json_str(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let Ok(parsed) = serde_json::from_str::<JsonValue>(input) else {
        if nesting_depth(input.as_bytes()) >= PARSER_DEPTH_LIMIT {
            return MASK_TOKEN.to_owned();
        }
        return input.to_owned();
    };
    serde_json::to_string(&mask_json_value(&parsed)).unwrap_or_else(|_| input.to_owned())
}

/// Deepest bracket nesting in `input`, ignoring brackets inside strings.
fn nesting_depth(input: &[u8]) -> usize {
    let (mut depth, mut deepest) = (0usize, 0usize);
    let mut in_string = false;
    let mut bytes = input.iter();
    while let Some(&byte) = bytes.next() {
        match (in_string, byte) {
            (true, b'\\') => {
                bytes.next();
            }
            (_, b'"') => in_string = !in_string,
            (false, b'{' | b'[') => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            (false, b'}' | b']') => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// Byte-oriented [`mask_json_str`]. Invalid UTF-8 is replaced lossily first.
pub fn mask_json_bytes(input: &[u8]) -> String {
    mask_json_str(&String::from_utf8_lossy(input))
}

/// Masks an already-parsed JSON tree and returns a new one.
///
/// Object keys are classified; string values under classified keys are
/// obscured. Nested objects and arrays are always walked, whatever their key.
/// Numbers, booleans and null are never changed.
pub fn mask_json_value(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(object) => JsonValue::Object(mask_object(object)),
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(mask_json_value).collect()),
        other => other.clone(),
    }
}

fn mask_object(object: &Map<String, JsonValue>) -> Map<String, JsonValue> {
    let mut masked = Map::with_capacity(object.len());
    for (key, value) in object {
        let value = match (value, classify(key)) {
            (JsonValue::String(text), strategy) if strategy.is_masking() => {
                JsonValue::String(obscure(text, strategy))
            }
            (nested, _) => mask_json_value(nested),
        };
        masked.insert(key.clone(), value);
    }
    masked
}

/// Masks HTTP headers or query parameters by name.
///
/// Every value under a classified name is obscured independently. The input is
/// left untouched.
pub fn mask_headers<S>(headers: &HashMap<String, Vec<String>, S>) -> HashMap<String, Vec<String>> {
    headers
        .iter()
        .map(|(name, values)| {
            let strategy = classify(name);
            let values = if strategy.is_masking() {
                values.iter().map(|value| obscure(value, strategy)).collect()
            } else {
                values.clone()
            };
            (name.clone(), values)
        })
        .collect()
}
