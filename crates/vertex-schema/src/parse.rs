//! Textual value parsing shared by defaults and request binding.

use crate::descriptor::{Kind, Value};

/// Parses a boolean. Accepts `true`, `1`, `false` and `0`, case-insensitive.
#[must_use]
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Splits a comma-delimited string into trimmed parts.
#[must_use]
pub fn parse_list(s: &str) -> Vec<String> {
    s.split(',').map(|part| part.trim().to_string()).collect()
}

/// Parses `raw` as a value of `kind`.
///
/// Returns `None` when the text does not parse. Custom kinds keep the raw
/// string for the handler to decode.
#[must_use]
pub fn parse_value(raw: &str, kind: Kind) -> Option<Value> {
    match kind {
        Kind::String | Kind::Custom => Some(Value::String(raw.to_string())),
        Kind::Int => raw.trim().parse().ok().map(Value::Int),
        Kind::Float => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Float),
        Kind::Bool => parse_bool(raw).map(Value::Bool),
        Kind::StringList => Some(Value::List(parse_list(raw))),
    }
}

/// Parses a declared default. An empty declaration means no default.
#[must_use]
pub fn parse_default(raw: &str, kind: Kind) -> Option<Value> {
    if raw.is_empty() {
        return None;
    }
    parse_value(raw, kind)
}
