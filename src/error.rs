//! # Client Error Types
//!
//! Unified error handling for task submission, status polling, configuration
//! and citation aggregation.

use thiserror::Error;

/// Client operation result type
pub type ClientResult<T> = Result<T, ClientError>;

/// Comprehensive error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Transport error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Transport error: HTTP {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response: {field} - {reason}")]
    InvalidResponse { field: String, reason: String },

    #[error("Timed out waiting for task {task_id} after {polls} polls ({waited_ms}ms)")]
    Timeout {
        task_id: String,
        polls: u32,
        waited_ms: u64,
    },

    #[error("Task {task_id} failed: {reason}")]
    TaskFailed { task_id: String, reason: String },

    #[error("Wait for task {task_id} cancelled after {polls} polls")]
    Cancelled { task_id: String, polls: u32 },

    #[error("Malformed fragment at index {index}: missing {field}")]
    MalformedFragment { index: usize, field: &'static str },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ClientError {
    /// Create an API error from HTTP response
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid response error for protocol violations
    ///
    /// Use this when the generation service answers with a body that is
    /// missing required fields or carries an unexpected shape. The client
    /// never substitutes a default for such a field.
    pub fn invalid_response(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for network failures and non-success HTTP statuses
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::HttpError(_) | ClientError::ApiError { .. })
    }

    /// Check if error is recoverable (worth retrying by the caller)
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            ClientError::HttpError(e) => e.is_timeout() || e.is_connect(),
            ClientError::ApiError { status, .. } => *status >= 500,
            ClientError::Timeout { .. } => true,
            // Protocol violations are not recoverable - the server is broken
            ClientError::InvalidResponse { .. } => false,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_is_transport() {
        let err = ClientError::api_error(503, "unavailable");
        assert!(err.is_transport());
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Transport error: HTTP 503 - unavailable"
        );
    }

    #[test]
    fn test_client_errors_are_not_recoverable() {
        assert!(!ClientError::api_error(404, "missing").is_recoverable());
        assert!(!ClientError::invalid_response("task_id", "missing").is_recoverable());
        assert!(!ClientError::invalid_input("empty prompt").is_transport());
    }

    #[test]
    fn test_malformed_fragment_message() {
        let err = ClientError::MalformedFragment {
            index: 2,
            field: "page",
        };
        assert_eq!(err.to_string(), "Malformed fragment at index 2: missing page");
    }

    #[test]
    fn test_timeout_message_names_task() {
        let err = ClientError::Timeout {
            task_id: "abc".to_string(),
            polls: 2,
            waited_ms: 4000,
        };
        assert!(err.to_string().contains("abc"));
        assert!(err.is_recoverable());
    }
}
