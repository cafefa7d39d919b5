//! [`S3Client`] over the AWS SDK, driven from a private tokio runtime.
//!
//! One SDK client is built per endpoint (authority plus credentials) and kept
//! for the lifetime of the [`AwsS3Client`]. Requests are path-style so that
//! `s3+http://host:port` endpoints work against S3-compatible servers.

use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials as SdkCredentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Error;
use aws_sdk_s3::primitives::DateTime as SdkDateTime;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::{Mutex, OnceLock, PoisonError};
use tokio::runtime::Runtime;

use super::{directory_prefix, ObjectStat, S3Client, S3ClientServiceError, S3Endpoint};
use crate::config::S3Config;

/// What a failed request means to `Location`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Absent,
    Error,
}

/// 404, and 403 on an unsigned request, read as "not there".
fn classify(status: Option<u16>, anonymous: bool) -> Failure {
    match status {
        Some(404) => Failure::Absent,
        Some(403) if anonymous => Failure::Absent,
        _ => Failure::Error,
    }
}

fn to_chrono(t: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(t.secs(), t.subsec_nanos())
}

/// Default [`S3Client`]: `aws-sdk-s3` with the endpoint override taken from
/// the location, signed when the location carries credentials and anonymous
/// otherwise.
///
/// Calls block on an internal current-thread runtime, so they must not be
/// made from inside another tokio runtime.
#[derive(Debug, Default)]
pub struct AwsS3Client {
    config: S3Config,
    runtime: OnceLock<Runtime>,
    clients: Mutex<HashMap<S3Endpoint, aws_sdk_s3::Client>>,
}

impl AwsS3Client {
    pub fn new(config: S3Config) -> Self {
        Self {
            config,
            runtime: OnceLock::new(),
            clients: Mutex::new(HashMap::new()),
        }
    }

    fn runtime(&self) -> Result<&Runtime, S3ClientServiceError> {
        if let Some(rt) = self.runtime.get() {
            return Ok(rt);
        }
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| S3ClientServiceError::with_cause("cannot start S3 client runtime", e))?;
        Ok(self.runtime.get_or_init(|| rt))
    }

    /// Runtime plus the SDK client for `endpoint`, built on first use.
    fn session(
        &self,
        endpoint: &S3Endpoint,
    ) -> Result<(&Runtime, aws_sdk_s3::Client), S3ClientServiceError> {
        let rt = self.runtime()?;
        let _enter = rt.enter();
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        let client = clients
            .entry(endpoint.clone())
            .or_insert_with(|| build_client(&self.config, endpoint))
            .clone();
        Ok((rt, client))
    }

    /// Sorts a failed request into "absent" (`Ok(())`) or a service error.
    fn absent_or_error<E>(
        &self,
        endpoint: &S3Endpoint,
        what: &str,
        err: SdkError<E, HttpResponse>,
    ) -> Result<(), S3ClientServiceError>
    where
        E: ProvideErrorMetadata + StdError + Send + Sync + 'static,
    {
        let status = err.raw_response().map(|r| r.status().as_u16());
        match classify(status, endpoint.is_anonymous()) {
            Failure::Absent => {
                tracing::debug!(what, ?status, "s3 resource absent");
                Ok(())
            }
            Failure::Error => {
                let status = status
                    .map(|s| format!("HTTP {s}"))
                    .unwrap_or_else(|| "no response".to_string());
                let code = err.code().map(|c| format!(" {c}")).unwrap_or_default();
                tracing::debug!(what, error = %DisplayErrorContext(&err), "s3 request failed");
                Err(S3ClientServiceError::with_cause(
                    format!("{what} on {} failed: {status}{code}", endpoint.base_url()),
                    err,
                ))
            }
        }
    }

    /// Object keys and common prefixes directly under `prefix`, or `None` if
    /// the bucket is absent. `first_page_only` stops after one page.
    fn list_prefix(
        &self,
        endpoint: &S3Endpoint,
        bucket: &str,
        prefix: &str,
        page_size: u32,
        first_page_only: bool,
    ) -> Result<Option<Vec<String>>, S3ClientServiceError> {
        let (rt, client) = self.session(endpoint)?;
        let page_size = i32::try_from(page_size).unwrap_or(i32::MAX);
        let listing = rt.block_on(async {
            let mut pages = client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .delimiter("/")
                .max_keys(page_size)
                .into_paginator()
                .send();
            let mut entries = Vec::new();
            while let Some(page) = pages.next().await {
                let page = page?;
                entries.extend(page.contents().iter().filter_map(|o| o.key()).map(str::to_string));
                entries.extend(
                    page.common_prefixes()
                        .iter()
                        .filter_map(|p| p.prefix())
                        .map(str::to_string),
                );
                if first_page_only {
                    break;
                }
            }
            Ok::<_, SdkError<ListObjectsV2Error, HttpResponse>>(entries)
        });
        match listing {
            Ok(entries) => {
                tracing::debug!(bucket, prefix, entries = entries.len(), "s3 listing");
                Ok(Some(entries))
            }
            Err(e) => self
                .absent_or_error(endpoint, &format!("listing {bucket}/{prefix}"), e)
                .map(|()| None),
        }
    }
}

fn build_client(config: &S3Config, endpoint: &S3Endpoint) -> aws_sdk_s3::Client {
    let timeouts = TimeoutConfig::builder()
        .connect_timeout(config.connect_timeout())
        .operation_timeout(config.timeout())
        .build();
    let mut builder = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .endpoint_url(endpoint.base_url())
        .force_path_style(true)
        .retry_config(RetryConfig::standard().with_max_attempts(config.max_attempts.max(1)))
        .timeout_config(timeouts);
    if let Some(c) = &endpoint.credentials {
        builder = builder.credentials_provider(SdkCredentials::new(
            &c.access_key,
            &c.secret_key,
            None,
            None,
            "location-uri",
        ));
    }
    aws_sdk_s3::Client::from_conf(builder.build())
}

impl S3Client for AwsS3Client {
    fn stat(
        &self,
        endpoint: &S3Endpoint,
        bucket: &str,
        key: &str,
    ) -> Result<Option<ObjectStat>, S3ClientServiceError> {
        let (rt, client) = self.session(endpoint)?;
        if key.is_empty() {
            return match rt.block_on(client.head_bucket().bucket(bucket).send()) {
                Ok(_) => Ok(Some(ObjectStat::default())),
                Err(e) => self
                    .absent_or_error(endpoint, &format!("stat {bucket}"), e)
                    .map(|()| None),
            };
        }
        match rt.block_on(client.head_object().bucket(bucket).key(key).send()) {
            Ok(head) => Ok(Some(ObjectStat {
                size: head.content_length().and_then(|n| u64::try_from(n).ok()),
                last_modified: head.last_modified().and_then(to_chrono),
            })),
            Err(e) => self
                .absent_or_error(endpoint, &format!("stat {bucket}/{key}"), e)
                .map(|()| None),
        }
    }

    fn is_directory_prefix(
        &self,
        endpoint: &S3Endpoint,
        bucket: &str,
        key: &str,
    ) -> Result<bool, S3ClientServiceError> {
        let prefix = directory_prefix(key);
        Ok(self
            .list_prefix(endpoint, bucket, &prefix, 1, true)?
            .is_some_and(|entries| !entries.is_empty()))
    }

    fn list(
        &self,
        endpoint: &S3Endpoint,
        bucket: &str,
        key_prefix: &str,
    ) -> Result<Vec<String>, S3ClientServiceError> {
        let Some(mut entries) =
            self.list_prefix(endpoint, bucket, key_prefix, self.config.max_keys, false)?
        else {
            return Ok(Vec::new());
        };
        // Directory marker objects list themselves.
        entries.retain(|k| k != key_prefix);
        entries.sort();
        entries.dedup();
        Ok(entries)
    }

    fn list_buckets(&self, endpoint: &S3Endpoint) -> Result<Vec<String>, S3ClientServiceError> {
        let (rt, client) = self.session(endpoint)?;
        match rt.block_on(client.list_buckets().send()) {
            Ok(out) => Ok(out
                .buckets()
                .iter()
                .filter_map(|b| b.name())
                .map(str::to_string)
                .collect()),
            Err(e) => self
                .absent_or_error(endpoint, "listing buckets", e)
                .map(|()| Vec::new()),
        }
    }
}
