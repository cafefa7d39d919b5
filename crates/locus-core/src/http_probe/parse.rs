//! Parse HTTP response header lines into ProbeResult.

use chrono::{DateTime, Utc};

use super::ProbeResult;

/// Parse collected header lines into ProbeResult.
///
/// With redirects, curl reports the headers of every hop; only the block after
/// the last status line describes the final resource.
pub(crate) fn parse_headers(status: u32, lines: &[String]) -> ProbeResult {
    let mut content_length = None;
    let mut content_range_total = None;
    let mut last_modified = None;
    let mut content_type = None;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            content_length = None;
            content_range_total = None;
            last_modified = None;
            content_type = None;
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.parse::<u64>() {
                    content_length = Some(n);
                }
            }
            if name.eq_ignore_ascii_case("content-range") {
                // bytes 0-0/12345
                content_range_total = value
                    .rsplit_once('/')
                    .and_then(|(_, total)| total.trim().parse::<u64>().ok());
            }
            if name.eq_ignore_ascii_case("last-modified") {
                last_modified = Some(value.to_string());
            }
            if name.eq_ignore_ascii_case("content-type") {
                content_type = Some(value.to_string());
            }
        }
    }

    // A ranged GET reports the one-byte slice in Content-Length; the full size
    // is in Content-Range.
    let content_length = if status == 206 {
        content_range_total
    } else {
        content_length
    };

    ProbeResult {
        status,
        content_length,
        last_modified,
        content_type,
    }
}

/// Parse an HTTP-date (`Wed, 21 Oct 2015 07:28:00 GMT`).
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}
