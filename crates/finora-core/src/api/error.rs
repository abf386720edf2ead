use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(ErrorBody),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(ErrorBody),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(ErrorBody),

    #[error("Request rejected with status {status}: {body}")]
    Rejected { status: u16, body: ErrorBody },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// The two failure classes callers distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The household (or record) does not exist yet.
    NotFound,
    /// Anything else, network failures included.
    Generic,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Body of a non-success response.
///
/// `text` is cut to `MAX_ERROR_BODY_LENGTH` for logs and display; `message`
/// is read from the complete body before the cut.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBody {
    pub text: String,
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(body: &str) -> Self {
        Self {
            text: truncate_body(body),
            message: extract_message(body),
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Truncate a response body to avoid logging excessive data
fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        body.to_string()
    } else {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }
}

/// Human-readable message in a JSON error body.
///
/// Looks at `message` first, then a validation `errors` map
/// (`{"errors": {"Amount": ["must be positive"]}}`). serde_json keeps map
/// keys sorted, so with several fields in error the alphabetically first
/// one is reported.
fn extract_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    if let Some(message) = json.get("message").and_then(|m| m.as_str()) {
        if !message.is_empty() {
            return Some(message.to_string());
        }
    }

    let first = json.get("errors")?.as_object()?.values().next()?;
    match first {
        serde_json::Value::Array(items) => items.first()?.as_str().map(str::to_string),
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl ApiError {
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(ErrorBody::new(body)),
            404 => ApiError::NotFound(ErrorBody::new(body)),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(ErrorBody::new(body)),
            code => ApiError::Rejected {
                status: code,
                body: ErrorBody::new(body),
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Generic,
        }
    }

    /// Message the server put in its error body, if any.
    pub fn server_message(&self) -> Option<String> {
        match self {
            ApiError::AccessDenied(body)
            | ApiError::NotFound(body)
            | ApiError::ServerError(body)
            | ApiError::Rejected { body, .. } => body.message.clone(),
            _ => None,
        }
    }
}
