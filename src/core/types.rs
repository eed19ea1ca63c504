use serde::{Deserialize, Serialize};

/// Broad classification of an [`AppError`](crate::core::error::AppError).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    ValidationError,
    ConfigurationError,
    RegistryError,
    SerializationError,
    IoError,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
