//! Client error types.
//!
//! All errors implement `std::error::Error` via `thiserror`. The generation
//! and chat paths propagate these to the caller; the availability and pull
//! checks log them and collapse to `false` instead.

use thiserror::Error;

/// Errors that can occur while talking to the Ollama service.
#[derive(Debug, Error)]
pub enum OllamaError {
    /// TCP/HTTP connection to the service failed.
    #[error("connection failed to {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    /// Non-2xx HTTP response from the service.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be decoded, or a required field is missing.
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    /// Read or decode failure in the middle of a streaming body.
    #[error("stream error: {reason}")]
    StreamError { reason: String },

    /// Construction-time configuration validation failure.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },
}

impl OllamaError {
    /// Extract the error body text, if this is an `HttpError`.
    pub fn error_body(&self) -> Option<&str> {
        match self {
            OllamaError::HttpError { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_http_error() {
        let err = OllamaError::HttpError {
            status: 500,
            body: "model runner has unexpectedly stopped".to_string(),
        };
        assert_eq!(err.error_body(), Some("model runner has unexpectedly stopped"));
    }

    #[test]
    fn test_error_body_non_http() {
        let err = OllamaError::StreamError {
            reason: "truncated line".to_string(),
        };
        assert!(err.error_body().is_none());
    }

    #[test]
    fn test_display_includes_endpoint() {
        let err = OllamaError::ConnectionFailed {
            endpoint: "http://localhost:11434/api/chat".to_string(),
            reason: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("http://localhost:11434/api/chat"));
        assert!(msg.contains("connection refused"));
    }
}
