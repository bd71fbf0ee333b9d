// Request error types
use serde_json::Value;
use thiserror::Error;

/// Failure of a single request against the REST API.
///
/// Every variant is scoped to the call that produced it: nothing here is
/// fatal to the process, and the caller decides how to present it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// Server answered with a non-2xx status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Connection, DNS or TLS failure before a status was received
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Private read attempted without a session token; no call was made
    #[error("Request not executed: no session token")]
    Disabled,
}

impl RequestError {
    /// Build a status error from a response body, preferring the server's message
    pub fn from_response(status: u16, body: &Value) -> Self {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| body.as_str().filter(|s| !s.is_empty()).map(str::to_string))
            .unwrap_or_else(|| default_reason(status).to_string());

        RequestError::Status { status, message }
    }

    /// HTTP status code, when the server produced one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 409 conventionally signals a duplicate name on "add" endpoints
    pub fn is_conflict(&self) -> bool {
        self.status_code() == Some(409)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }

    /// Client-facing message
    pub fn message(&self) -> &str {
        match self {
            RequestError::Status { message, .. } => message,
            RequestError::Network(msg) => msg,
            RequestError::Decode(msg) => msg,
            RequestError::Disabled => "no session token",
        }
    }

    /// Stable error code for JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::Status { status, .. } => match status {
                400 => "BAD_REQUEST",
                401 => "UNAUTHORIZED",
                403 => "FORBIDDEN",
                404 => "NOT_FOUND",
                409 => "CONFLICT",
                422 => "UNPROCESSABLE_ENTITY",
                429 => "TOO_MANY_REQUESTS",
                500..=599 => "SERVER_ERROR",
                _ => "HTTP_ERROR",
            },
            RequestError::Network(_) => "NETWORK_ERROR",
            RequestError::Decode(_) => "INVALID_RESPONSE",
            RequestError::Disabled => "NO_SESSION",
        }
    }
}

fn default_reason(status: u16) -> &'static str {
    match status {
        400 => "Bad request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not found",
        409 => "Conflict",
        422 => "Unprocessable entity",
        429 => "Too many requests",
        500 => "Internal server error",
        502 => "Bad gateway",
        503 => "Service unavailable",
        _ => "Request failed",
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => RequestError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None if err.is_decode() => RequestError::Decode(err.to_string()),
            None => RequestError::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        RequestError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_error_prefers_server_message() {
        let err = RequestError::from_response(409, &json!({ "message": "Category already exists" }));
        assert!(err.is_conflict());
        assert_eq!(err.message(), "Category already exists");
        assert_eq!(err.error_code(), "CONFLICT");
    }

    #[test]
    fn status_error_falls_back_to_reason() {
        let err = RequestError::from_response(500, &Value::Null);
        assert!(!err.is_conflict());
        assert_eq!(err.message(), "Internal server error");
        assert_eq!(err.status_code(), Some(500));
    }

    #[test]
    fn network_errors_have_no_status() {
        let err = RequestError::Network("connection refused".into());
        assert_eq!(err.status_code(), None);
        assert!(!err.is_conflict());
    }
}
