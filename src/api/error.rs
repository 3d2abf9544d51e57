//! Client-side error taxonomy for backend calls.
//!
//! Every failed request ends up as a [`ClientError`]. Pages turn it into one
//! of three user-facing effects: go to the login page, show inline field
//! errors, or show a banner with the server's message.

use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;

/// Banner text when the server gives no usable message.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No token, or the backend rejected it (401/403). The session has
    /// already been cleared when this is returned.
    #[error("authentication required")]
    Unauthenticated,

    /// Non-success response carrying the server's message, if any.
    #[error("server returned {status}: {message}")]
    Server { status: StatusCode, message: String },

    #[error("request timed out")]
    Timeout,

    #[error("could not reach server: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    /// The request could not be built (bad header value, bad URL).
    #[error("invalid request: {0}")]
    Request(String),
}

impl ClientError {
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ClientError::Unauthenticated)
    }

    /// Message for a page-level banner.
    pub fn banner(&self) -> String {
        match self {
            ClientError::Server { message, .. } if !message.is_empty() => message.clone(),
            ClientError::Unauthenticated => "Please log in to continue.".to_string(),
            ClientError::Timeout => "The server took too long to respond.".to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }

    /// Build a server error from a non-success response body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        ClientError::Server {
            status,
            message: server_message(body).unwrap_or_default(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if err.is_builder() {
            ClientError::Request(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Error bodies seen from the backend: `{"message": ..}`, `{"error": ..}`,
/// `{"msg": ..}` or `{"error": {"message": ..}}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error: Option<ErrorField>,
    errors: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Text(String),
    Nested { message: String },
}

/// Extract the human-readable message from an error response body.
pub fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed: ErrorBody = match serde_json::from_str(trimmed) {
        Ok(parsed) => parsed,
        // Plain-text bodies are shown as-is unless they look like an HTML page
        Err(_) if trimmed.starts_with('<') => return None,
        Err(_) => return Some(trimmed.to_string()),
    };

    let message = parsed
        .message
        .or(parsed.msg)
        .or(parsed.error.map(|e| match e {
            ErrorField::Text(text) => text,
            ErrorField::Nested { message } => message,
        }))
        .or_else(|| {
            parsed.errors.and_then(|errors| {
                let mut fields: Vec<_> = errors.into_iter().collect();
                fields.sort_by(|a, b| a.0.cmp(&b.0));
                fields
                    .into_iter()
                    .find_map(|(_, v)| v.as_str().map(str::to_string))
            })
        })?;

    if message.trim().is_empty() {
        None
    } else {
        Some(message)
    }
}
