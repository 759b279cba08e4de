//! Error types for carledger-core
//!
//! Every core failure carries a stable code, a severity and can be turned
//! into an `ErrorDetails` payload with suggestions for API responses.

use thiserror::Error;
use serde::{Deserialize, Serialize};
use std::io;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No car stored under the key
    CarNotFound,
    /// Legacy path payload or JSON body could not be decoded
    InvalidPayload,
    /// Snapshot or seed file could not be read or written
    IoError,
    /// Snapshot or seed file is not valid JSON
    SerializationError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::CarNotFound => write!(f, "CAR_NOT_FOUND"),
            ErrorCode::InvalidPayload => write!(f, "INVALID_PAYLOAD"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
            ErrorCode::SerializationError => write!(f, "SERIALIZATION_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - the request was rejected
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - ledger state may be out of sync with its snapshot
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for carledger-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Car not found: {id}")]
    CarNotFound { id: String },

    #[error("Invalid payload: {message}")]
    InvalidPayload { message: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Serialization error: {message}")]
    SerializationError { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::CarNotFound { .. } => ErrorCode::CarNotFound,
            CoreError::InvalidPayload { .. } => ErrorCode::InvalidPayload,
            CoreError::IoError { .. } => ErrorCode::IoError,
            CoreError::SerializationError { .. } => ErrorCode::SerializationError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::CarNotFound { .. } => ErrorSeverity::Info,
            CoreError::InvalidPayload { .. } => ErrorSeverity::Warning,
            CoreError::IoError { .. } => ErrorSeverity::Critical,
            CoreError::SerializationError { .. } => ErrorSeverity::Error,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::CarNotFound { id } => {
                details = details.with_detail(serde_json::json!({ "id": id }));
                details = details.with_suggestion(
                    "Use the /api/cars endpoint to list all cars.".to_string()
                );
            }
            CoreError::InvalidPayload { .. } => {
                details = details.with_suggestion(
                    "Legacy car payloads look like id-model-make-owner-color.".to_string()
                );
                details = details.with_suggestion(
                    "Legacy holder payloads look like id-name.".to_string()
                );
            }
            CoreError::IoError { .. } => {
                details = details.with_suggestion(
                    "Check that the ledger snapshot directory is writable.".to_string()
                );
            }
            CoreError::SerializationError { .. } => {
                details = details.with_suggestion(
                    "Seed files hold a JSON array of cars.".to_string()
                );
            }
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<io::Error> for CoreError {
    fn from(error: io::Error) -> Self {
        CoreError::IoError { message: error.to_string() }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(error: serde_json::Error) -> Self {
        CoreError::SerializationError { message: error.to_string() }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            data: serde_json::json!({}),
        }
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Debug, Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Info => log::info!(
                target: "carledger::error",
                "[{}] {} - Operation: {} - Data: {}",
                error.code(), error, context.operation, context.data
            ),
            ErrorSeverity::Warning => log::warn!(
                target: "carledger::error",
                "[{}] {} - Operation: {} - Data: {}",
                error.code(), error, context.operation, context.data
            ),
            ErrorSeverity::Error | ErrorSeverity::Critical => log::error!(
                target: "carledger::error",
                "[{}] {} - Operation: {} - Data: {}",
                error.code(), error.to_details(), context.operation, context.data
            ),
        }
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "carledger::error",
            "{} - Operation: {} - Data: {}",
            message,
            context.operation,
            context.data
        );
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::CarNotFound.to_string(), "CAR_NOT_FOUND");
        assert_eq!(ErrorCode::InvalidPayload.to_string(), "INVALID_PAYLOAD");
        assert_eq!(ErrorCode::SerializationError.to_string(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_core_error_severity() {
        assert_eq!(CoreError::CarNotFound { id: "1".into() }.severity(), ErrorSeverity::Info);
        assert_eq!(CoreError::InvalidPayload { message: "x".into() }.severity(), ErrorSeverity::Warning);
        assert_eq!(CoreError::IoError { message: "x".into() }.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_error_details_car_not_found() {
        let details = CoreError::CarNotFound { id: "42".to_string() }.to_details();

        assert_eq!(details.code, ErrorCode::CarNotFound);
        assert!(details.message.contains("42"));
        assert_eq!(details.details, Some(serde_json::json!({ "id": "42" })));
        assert!(!details.suggestions.is_empty());
    }

    #[test]
    fn test_error_details_serialize_code() {
        let details = CoreError::InvalidPayload { message: "too few fields".into() }.to_details();
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["code"], "INVALID_PAYLOAD");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_io_error_conversion() {
        let err: CoreError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.code(), ErrorCode::IoError);
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("change_holder")
            .with_data("id", serde_json::json!("7"));

        assert_eq!(context.operation, "change_holder");
        assert_eq!(context.data["id"], "7");
    }
}
