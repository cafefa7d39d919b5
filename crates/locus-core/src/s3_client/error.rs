//! Error raised for failures inside the S3 client that are not a plain "not found".

use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Internal S3 client failure: authentication, connection or malformed response.
///
/// A missing bucket or object is never reported through this type; the client
/// answers `Ok(None)` / `Ok(false)` for those.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct S3ClientServiceError {
    message: String,
    #[source]
    cause: Option<BoxError>,
}

impl S3ClientServiceError {
    /// Error with a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Error with a message and the upstream error that caused it.
    pub fn with_cause(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    /// Error wrapping an upstream error; the message is the cause's own.
    pub fn from_cause(cause: impl Into<BoxError>) -> Self {
        let cause = cause.into();
        Self {
            message: cause.to_string(),
            cause: Some(cause),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
