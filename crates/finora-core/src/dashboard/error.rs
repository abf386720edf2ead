use thiserror::Error;

use crate::api::{ApiError, ErrorKind};

/// Shown when the household has not been created yet.
pub const NOT_FOUND_MESSAGE: &str = "Household not found.";

/// Default message for failed dashboard loads.
pub const DASHBOARD_ERROR_MESSAGE: &str = "Failed to load dashboard.";

/// Default message for failed monthly finance loads.
pub const MONTHLY_ERROR_MESSAGE: &str = "Failed to load monthly data.";

/// A failed fetch, classified for display.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{message}")]
    NotFound {
        message: String,
        #[source]
        source: ApiError,
    },

    #[error("{message}")]
    Generic {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl FetchError {
    /// Classify an API failure. Generic failures use the server's message
    /// when it sent one, `default_message` otherwise.
    pub fn classify(source: ApiError, default_message: &str) -> Self {
        match source.kind() {
            ErrorKind::NotFound => FetchError::NotFound {
                message: NOT_FOUND_MESSAGE.to_string(),
                source,
            },
            ErrorKind::Generic => FetchError::Generic {
                message: source
                    .server_message()
                    .unwrap_or_else(|| default_message.to_string()),
                source,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::NotFound { .. } => ErrorKind::NotFound,
            FetchError::Generic { .. } => ErrorKind::Generic,
        }
    }

    /// Display message recorded in the observable error field.
    pub fn message(&self) -> &str {
        match self {
            FetchError::NotFound { message, .. } | FetchError::Generic { message, .. } => message,
        }
    }

    /// A missing household will not appear by retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Generic { .. })
    }

    pub fn api_error(&self) -> &ApiError {
        match self {
            FetchError::NotFound { source, .. } | FetchError::Generic { source, .. } => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_not_found_uses_fixed_message() {
        let err = FetchError::classify(
            ApiError::from_status(StatusCode::NOT_FOUND, r#"{"message":"no household"}"#),
            DASHBOARD_ERROR_MESSAGE,
        );
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), NOT_FOUND_MESSAGE);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_generic_prefers_server_message() {
        let err = FetchError::classify(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, r#"{"message":"db down"}"#),
            DASHBOARD_ERROR_MESSAGE,
        );
        assert_eq!(err.kind(), ErrorKind::Generic);
        assert_eq!(err.message(), "db down");
        assert_eq!(err.to_string(), "db down");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_generic_falls_back_to_default() {
        let err = FetchError::classify(ApiError::Unauthorized, MONTHLY_ERROR_MESSAGE);
        assert_eq!(err.message(), MONTHLY_ERROR_MESSAGE);
        assert!(matches!(err.api_error(), ApiError::Unauthorized));
    }

    #[test]
    fn test_long_error_body_keeps_server_message() {
        let body = format!(
            r#"{{"message":"Period is closed","detail":"{}"}}"#,
            "x".repeat(600)
        );
        let err = FetchError::classify(
            ApiError::from_status(StatusCode::CONFLICT, &body),
            DASHBOARD_ERROR_MESSAGE,
        );
        assert_eq!(err.message(), "Period is closed");
    }
}
