//! S3 queries, delegated to the injected [`S3Client`].
//!
//! Three shapes of URI: the endpoint root (no bucket), a bucket root (no key)
//! and an object key or key prefix.

use super::parse::S3Uri;
use crate::s3_client::{directory_prefix, ObjectStat, S3Client, S3ClientServiceError};

type Result<T> = std::result::Result<T, S3ClientServiceError>;

pub(super) fn name(uri: &S3Uri) -> String {
    let key = uri.key.trim_end_matches('/');
    if key.is_empty() {
        uri.bucket.clone()
    } else {
        key.rsplit('/').next().unwrap_or_default().to_string()
    }
}

/// A key's parent is the enclosing prefix, a bucket's parent is the endpoint
/// root, and the endpoint root has none.
pub(super) fn parent(uri: &S3Uri) -> Option<S3Uri> {
    if uri.bucket.is_empty() {
        return None;
    }
    let path = uri.path();
    let parent_path = match path.rsplit_once('/') {
        Some((parent, _)) => parent,
        None => "",
    };
    Some(uri.with_path(parent_path))
}

pub(super) fn join(uri: &S3Uri, child: &str) -> S3Uri {
    let child = child.trim_matches('/');
    let path = uri.path();
    if path.is_empty() {
        uri.with_path(child)
    } else {
        uri.with_path(&format!("{path}/{child}"))
    }
}

pub(super) fn exists(uri: &S3Uri, client: &dyn S3Client) -> Result<bool> {
    let ep = &uri.endpoint;
    if uri.bucket.is_empty() {
        return Ok(!client.list_buckets(ep)?.is_empty());
    }
    if uri.key.is_empty() {
        return client.exists(ep, &uri.bucket, "");
    }
    if !uri.key.ends_with('/') && client.exists(ep, &uri.bucket, &uri.key)? {
        return Ok(true);
    }
    client.is_directory_prefix(ep, &uri.bucket, &uri.key)
}

pub(super) fn is_directory(uri: &S3Uri, client: &dyn S3Client) -> Result<bool> {
    let ep = &uri.endpoint;
    if uri.bucket.is_empty() {
        return Ok(!client.list_buckets(ep)?.is_empty());
    }
    if uri.key.is_empty() {
        return client.exists(ep, &uri.bucket, "");
    }
    client.is_directory_prefix(ep, &uri.bucket, &uri.key)
}

/// Immediate child names: bucket names at the endpoint root, otherwise the
/// next key segment below this prefix.
pub(super) fn list(uri: &S3Uri, client: &dyn S3Client) -> Result<Vec<String>> {
    let ep = &uri.endpoint;
    if uri.bucket.is_empty() {
        return client.list_buckets(ep);
    }
    let prefix = directory_prefix(&uri.key);
    let names = client
        .list(ep, &uri.bucket, &prefix)?
        .into_iter()
        .filter_map(|entry| {
            let child = entry.strip_prefix(prefix.as_str())?.trim_end_matches('/');
            (!child.is_empty()).then(|| child.to_string())
        })
        .collect();
    Ok(names)
}

pub(super) fn stat(uri: &S3Uri, client: &dyn S3Client) -> Result<Option<ObjectStat>> {
    if uri.bucket.is_empty() || uri.key.is_empty() || uri.key.ends_with('/') {
        return Ok(None);
    }
    client.stat(&uri.endpoint, &uri.bucket, &uri.key)
}
