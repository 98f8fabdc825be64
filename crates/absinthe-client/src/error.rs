//! Client error types.

use reqwest::StatusCode;
use thiserror::Error;

/// Campaign/key/user API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response carrying a server-provided message.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Non-success response without a usable body.
    #[error("API error ({status}): {reason}")]
    Status { status: u16, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that may carry a message worth showing to the operator verbatim.
pub trait UserMessage {
    /// The message the server sent with the failure, if any.
    fn server_message(&self) -> Option<String>;
}

impl UserMessage for ApiError {
    fn server_message(&self) -> Option<String> {
        match self {
            Self::Api { message, .. } => Some(message.clone()),
            _ => None,
        }
    }
}

/// Build the error for a non-success response from its status and raw body.
pub(crate) fn error_from_response(status: StatusCode, body: &str) -> ApiError {
    match extract_message(body) {
        Some(message) => ApiError::Api {
            status: status.as_u16(),
            message,
        },
        None => ApiError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").into(),
        },
    }
}

/// Pull `message` out of an error body. Validation failures send an array of
/// messages, which are joined.
pub(crate) fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("message")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(serde_json::Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn string_message_is_extracted() {
        let body = r#"{"statusCode":404,"message":"Campaign not found","error":"Not Found"}"#;
        assert_eq!(extract_message(body).as_deref(), Some("Campaign not found"));
    }

    #[test]
    fn array_message_is_joined() {
        let body = r#"{"message":["name should not be empty","userId must be a UUID"]}"#;
        assert_eq!(
            extract_message(body).as_deref(),
            Some("name should not be empty; userId must be a UUID")
        );
    }

    #[test]
    fn non_json_body_has_no_message() {
        assert!(extract_message("<html>Bad Gateway</html>").is_none());
        assert!(extract_message(r#"{"message":""}"#).is_none());
    }

    #[test]
    fn response_without_message_uses_reason() {
        let err = error_from_response(StatusCode::BAD_GATEWAY, "");
        assert!(err.server_message().is_none());
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[test]
    fn response_with_message_exposes_it() {
        let err = error_from_response(StatusCode::BAD_REQUEST, r#"{"message":"nope"}"#);
        assert_eq!(err.server_message().as_deref(), Some("nope"));
    }
}
