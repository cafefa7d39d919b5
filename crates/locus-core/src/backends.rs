//! Remote collaborators carried by every `Location`.

use std::sync::Arc;

use crate::config::LocusConfig;
use crate::http_probe::{CurlHttpProbe, HttpProbe};
use crate::s3_client::{AwsS3Client, S3Client};

/// The HTTP probe and S3 client a `Location` delegates remote queries to.
///
/// Cloning is cheap; children and parents of a location share its backends.
#[derive(Debug, Clone)]
pub struct Backends {
    pub http: Arc<dyn HttpProbe>,
    pub s3: Arc<dyn S3Client>,
}

impl Backends {
    pub fn new(http: Arc<dyn HttpProbe>, s3: Arc<dyn S3Client>) -> Self {
        Self { http, s3 }
    }

    /// libcurl HTTP probe and AWS SDK S3 client, configured from `cfg`.
    pub fn from_config(cfg: &LocusConfig) -> Self {
        Self {
            http: Arc::new(CurlHttpProbe::new(cfg.http.clone())),
            s3: Arc::new(AwsS3Client::new(cfg.s3.clone())),
        }
    }
}

impl Default for Backends {
    fn default() -> Self {
        Self::from_config(&LocusConfig::default())
    }
}
