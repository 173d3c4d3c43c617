// src/error/types.rs
use crate::domain::ValidationErrors;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Caller-facing classification of an [`AppError`].
///
/// `NotFound` and `ValidationFailed` are expected outcomes the caller
/// handles; `StoreUnavailable` is a collaborator failure passed through
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    ValidationFailed,
    StoreUnavailable,
    Internal,
}

impl AppError {
    pub fn gallery_not_found(id: i64) -> Self {
        AppError::NotFound(format!("Gallery ({}) not found", id))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::ValidationFailed(_) => ErrorKind::ValidationFailed,
            AppError::Database(_) | AppError::Pool(_) | AppError::Io(_) => {
                ErrorKind::StoreUnavailable
            }
            AppError::Serialization(_) | AppError::Config(_) | AppError::Other(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Field errors carried by a rejected write, if this is one
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            AppError::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::ValidationFailed(errors)
    }
}

impl From<chrono::ParseError> for AppError {
    fn from(err: chrono::ParseError) -> Self {
        AppError::Other(format!("Date parse error: {}", err))
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        AppError::Pool(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gallery_not_found_message() {
        let err = AppError::gallery_not_found(42);
        assert_eq!(err.to_string(), "Gallery (42) not found");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_store_failures_classify_as_unavailable() {
        let err = AppError::Pool("timed out".to_string());
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);

        let err = AppError::Database(rusqlite::Error::InvalidQuery);
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
    }

    #[test]
    fn test_validation_errors_are_exposed() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "This value should not be blank.");
        let err = AppError::from(errors);

        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert!(err.validation_errors().unwrap().has_field("name"));
    }
}
