//! Error types for motionEye client operations

use thiserror::Error;

/// Result type alias for motionEye client operations
pub type Result<T> = std::result::Result<T, MotionEyeClientError>;

/// Errors that can occur during motionEye client operations
#[derive(Error, Debug)]
pub enum MotionEyeClientError {
    /// The server could not be reached, or the client was already closed
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The server rejected the credentials
    #[error("Authentication failed (HTTP {status}): {message}")]
    InvalidAuth { status: u16, message: String },

    /// Non-success response or a body that is not the expected JSON
    #[error("Request failed: {message}")]
    Request {
        status: Option<u16>,
        message: String,
    },

    /// A media URL could not be assembled
    #[error("Unable to parse URL: {0}")]
    UrlParse(String),

    /// Unusable path component (media path, camera id or action name)
    #[error("Invalid path: {0}")]
    Path(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl MotionEyeClientError {
    /// Create a request error for an HTTP status
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Request {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Create a request error that has no associated HTTP status
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            status: None,
            message: message.into(),
        }
    }

    /// Classify a transport error.
    ///
    /// Failures to establish a connection (DNS, refused, timeout) become
    /// [`MotionEyeClientError::Connection`]; everything else is a request
    /// failure.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::Connection(err.to_string())
        } else {
            Self::Request {
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = MotionEyeClientError::status(500, "HTTP 500 Internal Server Error");
        assert_eq!(
            err.to_string(),
            "Request failed: HTTP 500 Internal Server Error"
        );
        assert!(matches!(
            err,
            MotionEyeClientError::Request {
                status: Some(500),
                ..
            }
        ));
    }

    #[test]
    fn test_request_error_without_status() {
        let err = MotionEyeClientError::request("bad body");
        assert!(matches!(
            err,
            MotionEyeClientError::Request { status: None, .. }
        ));
    }
}
