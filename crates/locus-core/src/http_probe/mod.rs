//! HTTP existence probing.
//!
//! `Location` asks an [`HttpProbe`] for the status of a URL. The default
//! [`CurlHttpProbe`] sends a HEAD request through libcurl and falls back to a
//! one-byte ranged GET when the server refuses HEAD.

mod parse;

pub use parse::parse_http_date;

use chrono::{DateTime, Utc};
use std::fmt;
use std::str;

use crate::config::HttpConfig;

/// Outcome of probing a URL: final status plus the headers `Location` reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// Status of the final response (after redirects, if followed).
    pub status: u32,
    /// Size of the resource, if the server reported it.
    pub content_length: Option<u64>,
    /// Raw `Last-Modified` value.
    pub last_modified: Option<String>,
    pub content_type: Option<String>,
}

impl ProbeResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn last_modified_time(&self) -> Option<DateTime<Utc>> {
        self.last_modified.as_deref().and_then(parse_http_date)
    }
}

/// Transport failure while probing. HTTP error statuses are not errors; they
/// come back as a [`ProbeResult`] with that status.
#[derive(Debug, thiserror::Error)]
pub enum HttpProbeError {
    #[error("malformed URL: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Curl(#[from] curl::Error),
}

/// HTTP collaborator consumed by `Location`.
pub trait HttpProbe: Send + Sync + fmt::Debug {
    fn probe(&self, url: &str) -> Result<ProbeResult, HttpProbeError>;
}

/// Probe backed by a fresh libcurl easy handle per request.
#[derive(Debug, Clone, Default)]
pub struct CurlHttpProbe {
    config: HttpConfig,
}

impl CurlHttpProbe {
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Runs one request and returns the final status with its headers.
    /// `ranged` switches from HEAD to `GET` with `Range: bytes=0-0`.
    fn request(&self, url: &str, ranged: bool) -> Result<ProbeResult, HttpProbeError> {
        let mut headers: Vec<String> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        if ranged {
            easy.get(true)?;
            easy.range("0-0")?;
        } else {
            easy.nobody(true)?; // HEAD request
        }
        easy.follow_location(self.config.follow_redirects)?;
        easy.connect_timeout(self.config.connect_timeout())?;
        easy.timeout(self.config.timeout())?;
        if let Some(ua) = &self.config.user_agent {
            easy.useragent(ua)?;
        }

        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })?;
            // Stop after the first body chunk; servers ignoring Range would
            // otherwise stream the whole resource.
            transfer.write_function(|_| Ok(0))?;
            transfer.perform()
        };

        if let Err(e) = performed {
            if e.is_url_malformed() {
                return Err(HttpProbeError::InvalidUrl(url.to_string()));
            }
            if !e.is_write_error() {
                return Err(e.into());
            }
        }

        let status = easy.response_code()?;
        tracing::debug!(
            url,
            status,
            method = if ranged { "GET" } else { "HEAD" },
            "http probe"
        );
        Ok(parse::parse_headers(status, &headers))
    }
}

impl HttpProbe for CurlHttpProbe {
    fn probe(&self, url: &str) -> Result<ProbeResult, HttpProbeError> {
        let head = self.request(url, false)?;
        if head.status == 405 || head.status == 501 {
            tracing::debug!(url, status = head.status, "HEAD refused, retrying as ranged GET");
            return self.request(url, true);
        }
        Ok(head)
    }
}
