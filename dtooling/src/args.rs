//! Lenient argument decoding for model-issued tool calls.
//!
//! Malformed argument JSON never fails a call: it degrades to an empty map and
//! each handler falls back to its defaults. A key that is present with the
//! wrong JSON type is still rejected.
//!
//! ```rust
//! use dtooling::{integer_arg, parse_arguments_lenient, string_arg};
//!
//! let args = parse_arguments_lenient(r#"{"slide_index": 2}"#);
//! assert_eq!(integer_arg(&args, "slide_index", 0).expect("integer should decode"), 2);
//! assert_eq!(string_arg(&args, "html", "").expect("default should apply"), "");
//!
//! assert!(parse_arguments_lenient("{\"slide_index\": ").is_empty());
//! ```

use serde_json::{Map, Value};
use tracing::warn;

use crate::{ToolArgs, ToolError};

pub fn parse_arguments_lenient(raw: &str) -> ToolArgs {
    if raw.trim().is_empty() {
        return ToolArgs::new();
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(args)) => args,
        Ok(other) => {
            warn!(
                arguments = raw,
                value_type = json_type_name(&other),
                "tool arguments were not a JSON object"
            );
            ToolArgs::new()
        }
        Err(error) => {
            warn!(arguments = raw, %error, "failed to parse tool arguments");
            ToolArgs::new()
        }
    }
}

/// Missing and `null` keys yield `None`.
pub fn optional_string(args: &ToolArgs, key: &str) -> Result<Option<String>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => Err(type_mismatch(key, "a string", other)),
    }
}

pub fn string_arg(args: &ToolArgs, key: &str, default: &str) -> Result<String, ToolError> {
    Ok(optional_string(args, key)?.unwrap_or_else(|| default.to_string()))
}

/// Accepts integers and integral floats such as `2.0`.
pub fn optional_integer(args: &ToolArgs, key: &str) -> Result<Option<i64>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => {
            if let Some(value) = number.as_i64() {
                return Ok(Some(value));
            }
            match number.as_f64() {
                Some(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
                    Ok(Some(value as i64))
                }
                _ => Err(ToolError::invalid_arguments(format!(
                    "argument '{key}' must be an integer, got {number}"
                ))),
            }
        }
        Some(other) => Err(type_mismatch(key, "an integer", other)),
    }
}

pub fn integer_arg(args: &ToolArgs, key: &str, default: i64) -> Result<i64, ToolError> {
    Ok(optional_integer(args, key)?.unwrap_or(default))
}

pub fn object_arg(args: &ToolArgs, key: &str) -> Result<Map<String, Value>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(value)) => Ok(value.clone()),
        Some(other) => Err(type_mismatch(key, "an object", other)),
    }
}

fn type_mismatch(key: &str, expected: &str, actual: &Value) -> ToolError {
    ToolError::invalid_arguments(format!(
        "argument '{key}' must be {expected}, got {}",
        json_type_name(actual)
    ))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
