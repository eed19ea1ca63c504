use super::validation::{self, ShapeError};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Read-only option bag handed to a workflow builder.
///
/// Absent keys and keys bound to `null` are treated the same: both fall back to
/// the caller's default. Unknown keys are carried but never inspected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowConfig(Map<String, Value>);

impl WorkflowConfig {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap a raw JSON value. `null` yields an empty config; anything other than a
    /// mapping is rejected.
    pub fn from_value(value: Value) -> Result<Self, AppError> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(map) => Ok(Self(map)),
            other => Err(AppError::new(
                ErrorCategory::ConfigurationError,
                format!(
                    "workflow config must be a mapping, got {}",
                    validation::value_kind(&other)
                ),
            )
            .with_code("CFG-SHAPE-001")),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Value bound to `key`, treating `null` as absent.
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| !value.is_null())
    }

    /// Value bound to `key`, or `default` when the key is missing or null.
    pub fn get<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.get_value(key).unwrap_or(default)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get_value(key).is_some()
    }

    pub fn get_str(&self, key: &str, default: &str) -> Result<String, AppError> {
        match self.get_value(key) {
            Some(value) => Ok(validation::expect_string(key, value)?),
            None => Ok(default.to_string()),
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool, AppError> {
        match self.get_value(key) {
            Some(value) => Ok(validation::expect_bool(key, value)?),
            None => Ok(default),
        }
    }

    /// List of column names; missing or null yields an empty list.
    pub fn get_string_list(&self, key: &str) -> Result<Vec<String>, AppError> {
        match self.get_value(key) {
            Some(value) => Ok(validation::expect_string_list(key, value)?),
            None => Ok(Vec::new()),
        }
    }

    /// Nested mapping; missing or null yields `None`.
    pub fn get_mapping(&self, key: &str) -> Result<Option<Map<String, Value>>, AppError> {
        self.get_value(key)
            .map(|value| validation::expect_mapping(key, value))
            .transpose()
            .map_err(AppError::from)
    }

    /// Decode an arbitrary typed option, falling back to `default`.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, AppError> {
        match self.get_value(key) {
            Some(value) => serde_json::from_value(value.clone()).map_err(|err| {
                AppError::from(ShapeError::Decode {
                    key: key.to_string(),
                    message: err.to_string(),
                })
            }),
            None => Ok(default),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for WorkflowConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
