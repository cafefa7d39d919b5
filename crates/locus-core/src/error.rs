//! Error types for `Location` operations.

use std::io;

use crate::http_probe::HttpProbeError;
use crate::s3_client::S3ClientServiceError;

/// Result alias for fallible `Location` operations.
pub type Result<T> = std::result::Result<T, LocationError>;

/// Failure of a `Location` operation.
///
/// A resource that simply does not exist is never an error; queries answer
/// `false` or `None` for it.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    /// Input that cannot be interpreted as any kind of location.
    #[error("malformed location {spec:?}: {reason}")]
    Malformed { spec: String, reason: &'static str },

    /// Mutation attempted on a remote (HTTP or S3) location.
    #[error("{0} is read-only")]
    ReadOnly(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The S3 service could not answer (auth, connection, bad response).
    #[error("S3 client error: {0}")]
    S3(#[from] S3ClientServiceError),

    /// The HTTP server could not be reached.
    #[error("HTTP probe error: {0}")]
    Http(#[from] HttpProbeError),
}

/// Failure of `Location::to_url`.
#[derive(Debug, thiserror::Error)]
pub enum UrlConversionError {
    /// S3 URIs (`s3://`, `s3+http://`) have no standard URL form.
    #[error("{location} has no URL representation")]
    UnsupportedScheme { location: String },

    #[error("{location} is not a valid URL: {source}")]
    InvalidUrl {
        location: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{location} cannot be expressed as a file URL")]
    InvalidFilePath { location: String },
}
