//! Error Types
//!
//! Errors for the API client, session store, and the crate as a whole.

use thiserror::Error;

/// Errors from talking to the ECG backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused, reset, aborted)
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// The body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// The request was cancelled before it resolved
    #[error("Request aborted")]
    Aborted,
}

impl ApiError {
    pub fn is_aborted(&self) -> bool {
        matches!(self, ApiError::Aborted)
    }
}

#[cfg(feature = "native")]
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

/// Errors from persisting the session identifier
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session file: {0}")]
    Corrupt(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Corrupt(err.to_string())
    }
}

/// Top-level error for the crate
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[cfg(feature = "native")]
    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Result type alias for crate operations
pub type MonitorResult<T> = Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::Status {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error 500: boom");
        assert_eq!(ApiError::Aborted.to_string(), "Request aborted");
        assert!(ApiError::Aborted.is_aborted());
        assert!(!ApiError::Network("reset".to_string()).is_aborted());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SessionError = io_err.into();
        assert!(matches!(err, SessionError::Io(_)));

        let err: MonitorError = err.into();
        assert!(matches!(err, MonitorError::Session(_)));
    }
}
