//! Classify an input string into a local path, HTTP(S) URL or S3 URI.

use std::path::{Path, PathBuf};

use crate::error::{LocationError, Result};
use crate::s3_client::{Credentials, S3Endpoint, Transport};

/// Parsed form of a location; one variant per resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Target {
    Local(LocalPath),
    Http(HttpUrl),
    S3(S3Uri),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct LocalPath {
    /// Absolute, lexically normalized path.
    pub absolute: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct HttpUrl {
    pub secure: bool,
    /// The URL as given, surrounding whitespace removed.
    pub url: String,
    /// Byte offset where the path starts (end of `scheme://authority`).
    pub path_start: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct S3Uri {
    /// Scheme as written, lowercased: `s3`, `s3+http` or `s3+https`.
    pub scheme: &'static str,
    pub endpoint: S3Endpoint,
    /// Empty for the endpoint root.
    pub bucket: String,
    /// Empty for a bucket root. Keeps a trailing `/` if one was given.
    pub key: String,
}

const S3_PREFIXES: [(&str, &str, Transport); 3] = [
    ("s3+http://", "s3+http", Transport::Http),
    ("s3+https://", "s3+https", Transport::Https),
    ("s3://", "s3", Transport::Https),
];

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// Classifies `spec`: S3 prefix first, then HTTP(S), then a local path.
pub(crate) fn parse(spec: &str) -> Result<Target> {
    let trimmed = spec.trim();
    for (prefix, scheme, transport) in S3_PREFIXES {
        if let Some(rest) = strip_prefix_ignore_case(trimmed, prefix) {
            return parse_s3(spec, scheme, transport, rest).map(Target::S3);
        }
    }
    for (prefix, secure) in [("http://", false), ("https://", true)] {
        if let Some(rest) = strip_prefix_ignore_case(trimmed, prefix) {
            return parse_http(spec, trimmed, prefix.len(), rest, secure).map(Target::Http);
        }
    }
    local(Path::new(spec)).map(Target::Local)
}

/// Makes `path` absolute against the working directory without touching the
/// filesystem; `.` components and trailing separators are dropped.
pub(crate) fn local(path: &Path) -> Result<LocalPath> {
    let absolute = if path.as_os_str().is_empty() {
        std::env::current_dir()?
    } else {
        std::path::absolute(path)?
    };
    Ok(LocalPath {
        absolute: absolute.components().collect(),
    })
}

fn authority_len(rest: &str) -> usize {
    rest.find(['/', '?', '#']).unwrap_or(rest.len())
}

fn parse_http(
    spec: &str,
    trimmed: &str,
    prefix_len: usize,
    rest: &str,
    secure: bool,
) -> Result<HttpUrl> {
    let authority = &rest[..authority_len(rest)];
    if authority.is_empty() {
        return Err(LocationError::Malformed {
            spec: spec.to_string(),
            reason: "URL has no host",
        });
    }
    Ok(HttpUrl {
        secure,
        url: trimmed.to_string(),
        path_start: prefix_len + authority.len(),
    })
}

fn parse_s3(spec: &str, scheme: &'static str, transport: Transport, rest: &str) -> Result<S3Uri> {
    let (authority, path) = rest.split_at(authority_len(rest));
    let (credentials, host) = match authority.rsplit_once('@') {
        Some((userinfo, host)) => {
            let (access, secret) = userinfo.split_once(':').unwrap_or((userinfo, ""));
            let credentials = Credentials {
                access_key: access.to_string(),
                secret_key: secret.to_string(),
            };
            (Some(credentials), host)
        }
        None => (None, authority),
    };
    if host.is_empty() {
        return Err(LocationError::Malformed {
            spec: spec.to_string(),
            reason: "S3 URI has no host",
        });
    }

    let endpoint = S3Endpoint {
        transport,
        authority: host.to_string(),
        credentials,
    };
    let (bucket, key) = split_bucket_key(path);
    Ok(S3Uri {
        scheme,
        endpoint,
        bucket,
        key,
    })
}

/// Splits `/bucket/some/key` into `("bucket", "some/key")`.
pub(crate) fn split_bucket_key(path: &str) -> (String, String) {
    let path = path.trim_start_matches('/');
    match path.split_once('/') {
        Some((bucket, key)) => (bucket.to_string(), key.to_string()),
        None => (path.to_string(), String::new()),
    }
}

impl S3Uri {
    /// `scheme://host[:port][/bucket[/key]]`, credentials included only when asked.
    pub fn to_uri_string(&self, with_credentials: bool) -> String {
        let mut out = format!("{}://", self.scheme);
        if with_credentials {
            if let Some(c) = &self.endpoint.credentials {
                out.push_str(&c.access_key);
                out.push(':');
                out.push_str(&c.secret_key);
                out.push('@');
            }
        }
        out.push_str(&self.endpoint.authority);
        if !self.bucket.is_empty() {
            out.push('/');
            out.push_str(&self.bucket);
            if !self.key.is_empty() {
                out.push('/');
                out.push_str(&self.key);
            }
        }
        out
    }

    /// Same endpoint, different `bucket/key` path.
    pub fn with_path(&self, path: &str) -> S3Uri {
        let (bucket, key) = split_bucket_key(path);
        S3Uri {
            scheme: self.scheme,
            endpoint: self.endpoint.clone(),
            bucket,
            key,
        }
    }

    /// `bucket/key` without surrounding separators.
    pub fn path(&self) -> String {
        let key = self.key.trim_end_matches('/');
        if key.is_empty() {
            self.bucket.clone()
        } else {
            format!("{}/{}", self.bucket, key)
        }
    }
}

impl HttpUrl {
    /// Path part, without query or fragment.
    pub fn path(&self) -> &str {
        let path = &self.url[self.path_start..];
        let end = path.find(['?', '#']).unwrap_or(path.len());
        &path[..end]
    }

    /// `scheme://authority`.
    pub fn origin(&self) -> &str {
        &self.url[..self.path_start]
    }
}
