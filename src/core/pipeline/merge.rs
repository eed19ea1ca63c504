//! Deep merge of caller overrides onto built-in argument defaults.
//!
//! Mappings merge key by key and recurse on shared keys. Any other pairing
//! (scalar, list, or mismatched shapes) lets the override replace the default
//! wholesale. A `null` override keeps the default.

use serde_json::{Map, Value};

/// Merge `user` over `default`.
pub fn resolve(user: Option<&Value>, default: &Value) -> Value {
    match (user, default) {
        (None, _) | (Some(Value::Null), _) => default.clone(),
        (Some(Value::Object(user)), Value::Object(default)) => {
            Value::Object(resolve_object(Some(user), default))
        }
        (Some(other), _) => other.clone(),
    }
}

/// Mapping form of [`resolve`], convenient for step argument tables.
pub fn resolve_object(
    user: Option<&Map<String, Value>>,
    default: &Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = default.clone();
    let Some(user) = user else {
        return merged;
    };
    for (key, user_value) in user {
        let value = match default.get(key) {
            Some(default_value) => resolve(Some(user_value), default_value),
            None => user_value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}
