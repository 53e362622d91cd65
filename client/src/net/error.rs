//! Normalized request errors.
//!
//! ERROR HANDLING
//! ==============
//! Every failure leaving the network layer is one of these tagged variants,
//! decoded exactly once from the response status and body. UI-facing code
//! never sees raw transport errors or duck-typed response shapes, and none
//! of these are retried automatically.

use std::collections::BTreeMap;

use reqwest::StatusCode;

/// Field name -> list of problems, as the server's 422 body carries them.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Client-correctable input problem. Never fatal, never retried.
    #[error("validation failed")]
    Validation { errors: FieldErrors },
    /// Single generic message; the server does not say which field was wrong.
    #[error("{message}")]
    InvalidCredentials { message: String },
    /// Safe response is to re-prime the CSRF cookie and let the user resubmit.
    #[error("{message}")]
    CsrfMismatch { message: String },
    /// The session behind the cookie is gone or anonymous.
    #[error("{message}")]
    SessionExpired { message: String },
    /// Server-side failure; detail is whatever the server chose to reveal.
    #[error("{message}")]
    Internal { message: String },
    /// The request never produced a response.
    #[error("request failed: {message}")]
    Transport { message: String },
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(default)]
    errors: FieldErrors,
}

fn message_or(body: &ErrorBody, fallback: &str) -> String {
    body.message.clone().unwrap_or_else(|| fallback.to_owned())
}

/// Decode a non-success response into its tagged error.
///
/// A missing or unreadable body falls back to a generic message per class;
/// the status alone is enough to classify.
pub(crate) fn decode_error(status: StatusCode, body: &[u8]) -> ApiError {
    let body: ErrorBody = serde_json::from_slice(body).unwrap_or(ErrorBody { message: None, errors: FieldErrors::new() });

    match status {
        StatusCode::UNPROCESSABLE_ENTITY => ApiError::Validation { errors: body.errors },
        StatusCode::FORBIDDEN => ApiError::CsrfMismatch {
            message: message_or(&body, "Request could not be verified, please retry"),
        },
        StatusCode::UNAUTHORIZED => ApiError::SessionExpired {
            message: message_or(&body, "Unauthenticated"),
        },
        _ => ApiError::Internal {
            message: message_or(&body, "Something went wrong"),
        },
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
