use reqwest::StatusCode;
use thiserror::Error;

use crate::models::ErrorEnvelope;

/// Fallback code when the service omits one from the error envelope
const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";

/// Maximum length for error response bodies quoted in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Structured error returned by the service: machine-readable code,
    /// human-readable message, HTTP status.
    #[error("{message} ({code})")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
    },

    /// The refresh protocol failed; the session has been cleared and the
    /// caller should force navigation to the sign-in entry point.
    #[error("Session expired - please sign in again")]
    SessionExpired,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Token storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Build a structured error from a non-success response body. Bodies
    /// that are not the documented error envelope fall back to
    /// `InvalidResponse` with a truncated quote.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => {
                let code = if envelope.error_code.is_empty() {
                    UNKNOWN_ERROR_CODE.to_string()
                } else {
                    envelope.error_code
                };
                let message = if envelope.error.is_empty() {
                    "An unexpected error occurred".to_string()
                } else {
                    envelope.error
                };
                ApiError::Api {
                    status,
                    code,
                    message,
                }
            }
            Err(_) => ApiError::InvalidResponse(format!(
                "Status {}: {}",
                status,
                Self::truncate_body(body)
            )),
        }
    }

    /// The machine-readable error code, when the service supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// The HTTP status, when the error came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Truncate a response body to avoid quoting excessive data. The cut
    /// point backs off to a char boundary so multibyte bodies never panic.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..end],
                body.len()
            )
        }
    }
}
