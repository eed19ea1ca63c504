use crate::core::types::ErrorCategory;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Error raised while reading configuration, building step lists or planning.
///
/// `code` is a stable identifier (`CFG-SHAPE-001`, `REG-UNKNOWN-001`, ...) that
/// callers can match on; errors created without one get a unique `SW-` code.
#[derive(Debug)]
pub struct AppError {
    pub category: ErrorCategory,
    pub code: String,
    pub message: String,
    /// Where the error happened (`workflow`, `location`, ...).
    pub context: BTreeMap<String, String>,
    pub occurred_at: DateTime<Utc>,
    pub source: Option<anyhow::Error>,
}

impl AppError {
    pub fn new<T: Into<String>>(category: ErrorCategory, message: T) -> Self {
        AppError {
            category,
            code: format!("SW-{}", uuid::Uuid::new_v4()),
            message: message.into(),
            context: BTreeMap::new(),
            occurred_at: Utc::now(),
            source: None,
        }
    }

    pub fn with_code<T: Into<String>>(mut self, code: T) -> Self {
        self.code = code.into();
        self
    }

    /// Attach the underlying cause; it is reported by `Display` and `Error::source`.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn add_context(&mut self, key: &str, value: &str) {
        self.context.insert(key.to_string(), value.to_string());
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.category, self.message)?;
        if !self.context.is_empty() {
            let rendered: Vec<String> = self
                .context
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            write!(f, " ({})", rendered.join(", "))?;
        }
        if let Some(source) = &self.source {
            write!(f, "\nCaused by: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| &**source as &(dyn std::error::Error + 'static))
    }
}
