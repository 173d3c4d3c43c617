// src/application/error_handling.rs
//
// Maps AppError into the response shape handed back to callers.
//
// NotFound and validation failures pass their message through; store
// and internal failures are logged here and reported generically.

use serde::{Deserialize, Serialize};

use crate::domain::FieldError;
use crate::error::{AppError, ErrorKind};

/// Standard error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub message: String,
    pub details: Option<String>,

    /// Per-field problems of a rejected write or query
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Id does not resolve (404)
    NotFound,

    /// Rejected input (400)
    Validation,

    /// Database or pool failure (503)
    StoreUnavailable,

    /// Anything else (500)
    Internal,
}

impl ErrorResponse {
    pub fn from_app_error(error: AppError) -> Self {
        match error.kind() {
            ErrorKind::NotFound => Self {
                success: false,
                error_type: ErrorType::NotFound,
                message: error.to_string(),
                details: None,
                errors: Vec::new(),
            },

            ErrorKind::ValidationFailed => {
                let errors: Vec<FieldError> = error
                    .validation_errors()
                    .map(|e| e.iter().cloned().collect())
                    .unwrap_or_default();

                Self {
                    success: false,
                    error_type: ErrorType::Validation,
                    message: "Validation failed".to_string(),
                    details: Some(format!("{} invalid field(s)", errors.len())),
                    errors,
                }
            }

            ErrorKind::StoreUnavailable => {
                log::error!("store error: {:?}", error);

                Self {
                    success: false,
                    error_type: ErrorType::StoreUnavailable,
                    message: "Database operation failed".to_string(),
                    details: Some("Check logs for details".to_string()),
                    errors: Vec::new(),
                }
            }

            ErrorKind::Internal => {
                log::error!("internal error: {:?}", error);

                Self {
                    success: false,
                    error_type: ErrorType::Internal,
                    message: error.to_string(),
                    details: None,
                    errors: Vec::new(),
                }
            }
        }
    }

    /// Validation failure raised at the boundary, before reaching a service
    pub fn validation(field: &str, message: &str) -> Self {
        Self {
            success: false,
            error_type: ErrorType::Validation,
            message: "Validation failed".to_string(),
            details: None,
            errors: vec![FieldError {
                field: field.to_string(),
                message: message.to_string(),
            }],
        }
    }
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self::from_app_error(error)
    }
}
