use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use regex::Regex;
use serde_json::{Map, Value};

/// Shape mismatches found while reading typed options out of a raw workflow config.
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    #[error("option '{key}' must be {expected}, got {found}")]
    Mismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("option '{key}' is not a valid regular expression: {source}")]
    InvalidPattern {
        key: String,
        #[source]
        source: regex::Error,
    },
    #[error("option '{key}' could not be decoded: {message}")]
    Decode { key: String, message: String },
}

impl From<ShapeError> for AppError {
    fn from(err: ShapeError) -> Self {
        let code = match &err {
            ShapeError::InvalidPattern { .. } => "CFG-REGEX-001",
            ShapeError::Mismatch { .. } | ShapeError::Decode { .. } => "CFG-SHAPE-001",
        };
        AppError::new(ErrorCategory::ConfigurationError, err.to_string()).with_code(code)
    }
}

/// Human readable name of a JSON value's shape, used in diagnostics.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

pub fn expect_string(key: &str, value: &Value) -> Result<String, ShapeError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        other => Err(mismatch(key, "a string", other)),
    }
}

pub fn expect_bool(key: &str, value: &Value) -> Result<bool, ShapeError> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        other => Err(mismatch(key, "a boolean", other)),
    }
}

pub fn expect_mapping(key: &str, value: &Value) -> Result<Map<String, Value>, ShapeError> {
    match value {
        Value::Object(map) => Ok(map.clone()),
        other => Err(mismatch(key, "a mapping", other)),
    }
}

pub fn expect_string_list(key: &str, value: &Value) -> Result<Vec<String>, ShapeError> {
    let Value::Array(items) = value else {
        return Err(mismatch(key, "a list of strings", value));
    };
    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::String(text) => Ok(text.clone()),
            other => Err(mismatch(&format!("{}[{}]", key, index), "a string", other)),
        })
        .collect()
}

/// Compile a pattern once so malformed expressions fail while the config is parsed.
pub fn expect_pattern(key: &str, pattern: &str) -> Result<(), ShapeError> {
    Regex::new(pattern)
        .map(|_| ())
        .map_err(|source| ShapeError::InvalidPattern {
            key: key.to_string(),
            source,
        })
}

fn mismatch(key: &str, expected: &'static str, found: &Value) -> ShapeError {
    ShapeError::Mismatch {
        key: key.to_string(),
        expected,
        found: value_kind(found),
    }
}
