//! Tiny path-style S3 service: HEAD bucket/object, ListObjectsV2, ListBuckets.
//!
//! Buckets are public or private. Requests are authorized when their
//! `Authorization` header names the `accesskey` access key; signatures are
//! not verified. Anonymous requests to private buckets get 403.

use std::collections::BTreeMap;

use super::server::{self, percent_decode, Request, Response};

pub const ACCESS_KEY: &str = "accesskey";

#[derive(Debug, Clone, Default)]
pub struct Bucket {
    pub public: bool,
    /// key -> object size
    pub objects: BTreeMap<String, usize>,
}

/// Starts the service and returns its authority (`127.0.0.1:port`).
pub fn start(buckets: BTreeMap<String, Bucket>) -> String {
    server::start(move |req: &Request| respond(req, &buckets))
}

/// The buckets the Location tests expect.
pub fn fixture_buckets() -> BTreeMap<String, Bucket> {
    let mut public = Bucket {
        public: true,
        ..Bucket::default()
    };
    public
        .objects
        .insert("single-channel.ome.tiff".to_string(), 4096);
    public.objects.insert("plates/a/1.tiff".to_string(), 10);
    public.objects.insert("plates/b.tiff".to_string(), 20);
    public.objects.insert("plates/c d.tiff".to_string(), 30);

    let mut private = Bucket::default();
    private
        .objects
        .insert("single-channel.ome.tiff".to_string(), 2048);

    let mut buckets = BTreeMap::new();
    buckets.insert("bioformats.test.public".to_string(), public);
    buckets.insert("bioformats.test.private".to_string(), private);
    buckets
}

enum Caller {
    Anonymous,
    Authorized,
    Rejected,
}

fn caller(req: &Request) -> Caller {
    match req.header("authorization") {
        None => Caller::Anonymous,
        Some(a) if a.contains(&format!("Credential={ACCESS_KEY}/")) => Caller::Authorized,
        Some(_) => Caller::Rejected,
    }
}

fn error(status: &'static str, code: &str) -> Response {
    Response::new(status)
        .header("Content-Type: application/xml")
        .body(format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Error><Code>{code}</Code><Message>{code}</Message></Error>"
        ))
}

fn respond(req: &Request, buckets: &BTreeMap<String, Bucket>) -> Response {
    let who = caller(req);
    if let Caller::Rejected = who {
        return error("403 Forbidden", "InvalidAccessKeyId");
    }
    let authorized = matches!(who, Caller::Authorized);

    let path = req.path.trim_start_matches('/');
    let (bucket_name, key) = match path.split_once('/') {
        Some((b, k)) => (percent_decode(b), percent_decode(k)),
        None => (percent_decode(path), String::new()),
    };

    if bucket_name.is_empty() {
        if !authorized {
            return error("403 Forbidden", "AccessDenied");
        }
        let mut xml = String::from("<ListAllMyBucketsResult><Buckets>");
        for name in buckets.keys() {
            xml.push_str(&format!("<Bucket><Name>{name}</Name></Bucket>"));
        }
        xml.push_str("</Buckets></ListAllMyBucketsResult>");
        return Response::new("200 OK").body(xml);
    }

    let Some(bucket) = buckets.get(&bucket_name) else {
        return error("404 Not Found", "NoSuchBucket");
    };
    if !bucket.public && !authorized {
        return error("403 Forbidden", "AccessDenied");
    }

    if key.is_empty() {
        if req.method == "GET" && req.query("list-type") == Some("2") {
            return list_objects(req, bucket);
        }
        return Response::new("200 OK");
    }

    match bucket.objects.get(&key) {
        Some(size) => Response::new("200 OK")
            .header("Last-Modified: Wed, 21 Oct 2015 07:28:00 GMT")
            .body(vec![0u8; *size]),
        None => error("404 Not Found", "NoSuchKey"),
    }
}

fn list_objects(req: &Request, bucket: &Bucket) -> Response {
    let prefix = req.query("prefix").unwrap_or("");
    let delimited = req.query("delimiter") == Some("/");
    let max_keys: usize = req
        .query("max-keys")
        .and_then(|m| m.parse().ok())
        .unwrap_or(1000);
    let start: usize = req
        .query("continuation-token")
        .and_then(|t| t.parse().ok())
        .unwrap_or(0);

    // (entry, is_common_prefix), in key order
    let mut entries: Vec<(String, bool)> = Vec::new();
    for key in bucket.objects.keys() {
        let Some(rest) = key.strip_prefix(prefix) else {
            continue;
        };
        let entry = match rest.split_once('/') {
            Some((dir, _)) if delimited => (format!("{prefix}{dir}/"), true),
            _ => (key.clone(), false),
        };
        if !entries.contains(&entry) {
            entries.push(entry);
        }
    }

    let end = (start + max_keys).min(entries.len());
    let page = &entries[start.min(end)..end];
    let truncated = end < entries.len();

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<ListBucketResult>");
    xml.push_str(&format!("<Prefix>{prefix}</Prefix>"));
    xml.push_str(&format!("<IsTruncated>{truncated}</IsTruncated>"));
    if truncated {
        xml.push_str(&format!("<NextContinuationToken>{end}</NextContinuationToken>"));
    }
    for (entry, is_prefix) in page {
        if *is_prefix {
            xml.push_str(&format!(
                "<CommonPrefixes><Prefix>{entry}</Prefix></CommonPrefixes>"
            ));
        } else {
            xml.push_str(&format!("<Contents><Key>{entry}</Key></Contents>"));
        }
    }
    xml.push_str("</ListBucketResult>");
    Response::new("200 OK")
        .header("Content-Type: application/xml")
        .body(xml)
}
