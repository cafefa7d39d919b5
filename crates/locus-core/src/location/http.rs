//! HTTP(S) queries. URLs have no directories; existence is a status probe.

use super::parse::HttpUrl;
use crate::http_probe::{HttpProbe, HttpProbeError, ProbeResult};

pub(super) fn name(url: &HttpUrl) -> String {
    url.path()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Parent URL string; `None` at the host root.
pub(super) fn parent(url: &HttpUrl) -> Option<String> {
    let path = url.path().trim_end_matches('/');
    if path.is_empty() {
        return None;
    }
    let cut = path.rfind('/').unwrap_or(0);
    Some(format!("{}{}", url.origin(), &path[..cut]))
}

/// Child URL; the parent's query and fragment do not carry over.
pub(super) fn join(url: &HttpUrl, child: &str) -> String {
    format!(
        "{}{}/{}",
        url.origin(),
        url.path().trim_end_matches('/'),
        child.trim_start_matches('/')
    )
}

pub(super) fn probe(url: &HttpUrl, http: &dyn HttpProbe) -> Result<ProbeResult, HttpProbeError> {
    http.probe(&url.url)
}
