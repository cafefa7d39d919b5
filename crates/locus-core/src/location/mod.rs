//! `Location`: one file-like handle for local paths, HTTP(S) URLs and S3 objects.
//!
//! A location is parsed once, at construction, into a closed set of targets
//! (local path, HTTP URL, S3 URI). Every query dispatches on that target and
//! is computed fresh: local queries hit the filesystem, remote ones go through
//! the [`Backends`] the location carries. Nothing is cached.
//!
//! Remote queries never fail because a resource is absent or unreachable;
//! they answer `false`/`None` and log the underlying error. Use
//! [`Location::try_exists`] to tell the two apart.

mod http;
mod local;
mod parse;
mod s3;

use chrono::{DateTime, Utc};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

use crate::backends::Backends;
use crate::error::{LocationError, Result, UrlConversionError};
use parse::{LocalPath, Target};

/// Kind of resource a location refers to, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Local,
    Http,
    Https,
    S3,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Scheme::Local => "local",
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::S3 => "s3",
        };
        f.write_str(s)
    }
}

/// A local file, HTTP(S) resource or S3 object/bucket.
///
/// Equality and hashing look at the parsed location only, not at the backends.
#[derive(Debug, Clone)]
pub struct Location {
    /// Input as given (or composed by `join`).
    raw: String,
    target: Target,
    backends: Backends,
}

impl Location {
    /// Parses `spec` as an S3 URI (`s3://`, `s3+http://`, `s3+https://`), an
    /// HTTP(S) URL, or else a local path.
    ///
    /// Fails only when nothing can be made of the input: a remote prefix with
    /// no host, or a relative path when the working directory is unavailable.
    pub fn new(spec: &str) -> Result<Self> {
        let target = parse::parse(spec)?;
        let raw = match &target {
            Target::S3(u) if u.endpoint.credentials.is_some() => u.to_uri_string(false),
            _ => spec.to_string(),
        };
        Ok(Self {
            raw,
            target,
            backends: Backends::default(),
        })
    }

    /// Wraps a native path; always a local location.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Ok(Self {
            raw: path.to_string_lossy().into_owned(),
            target: Target::Local(parse::local(path)?),
            backends: Backends::default(),
        })
    }

    /// Same location, answering remote queries through `backends`.
    pub fn with_backends(mut self, backends: Backends) -> Self {
        self.backends = backends;
        self
    }

    pub fn backends(&self) -> &Backends {
        &self.backends
    }

    /// Child named `child` under this location. Scheme, credentials and
    /// backends carry over.
    pub fn join(&self, child: &str) -> Location {
        let target = match &self.target {
            Target::Local(p) => Target::Local(LocalPath {
                absolute: local::join(&p.absolute, child),
            }),
            Target::Http(u) => {
                let joined = http::join(u, child);
                let path_start = u.path_start;
                Target::Http(parse::HttpUrl {
                    secure: u.secure,
                    url: joined,
                    path_start,
                })
            }
            Target::S3(u) => Target::S3(s3::join(u, child)),
        };
        self.derive(target)
    }

    fn derive(&self, target: Target) -> Location {
        let mut loc = Location {
            raw: String::new(),
            target,
            backends: self.backends.clone(),
        };
        loc.raw = loc.absolute_path();
        loc
    }

    pub fn scheme(&self) -> Scheme {
        match &self.target {
            Target::Local(_) => Scheme::Local,
            Target::Http(u) if u.secure => Scheme::Https,
            Target::Http(_) => Scheme::Http,
            Target::S3(_) => Scheme::S3,
        }
    }

    pub fn is_remote(&self) -> bool {
        self.scheme() != Scheme::Local
    }

    /// The input this location was built from, minus any S3 credentials.
    pub fn path(&self) -> &str {
        &self.raw
    }

    /// Native path of a local location.
    pub fn as_local_path(&self) -> Option<&Path> {
        match &self.target {
            Target::Local(p) => Some(&p.absolute),
            _ => None,
        }
    }

    /// Last path or key segment; a bucket root is named after its bucket.
    /// Empty for a filesystem, host or endpoint root.
    pub fn name(&self) -> String {
        match &self.target {
            Target::Local(p) => local::name(&p.absolute),
            Target::Http(u) => http::name(u),
            Target::S3(u) => s3::name(u),
        }
    }

    /// Absolute form. S3 credentials are never included.
    pub fn absolute_path(&self) -> String {
        match &self.target {
            Target::Local(p) => p.absolute.to_string_lossy().into_owned(),
            Target::Http(u) => u.url.clone(),
            Target::S3(u) => u.to_uri_string(false),
        }
    }

    /// Like [`absolute_path`](Self::absolute_path), but an S3 URI keeps its
    /// embedded `access:secret@` credentials.
    pub fn absolute_path_with_credentials(&self) -> String {
        match &self.target {
            Target::S3(u) => u.to_uri_string(true),
            _ => self.absolute_path(),
        }
    }

    pub fn absolute_location(&self) -> Location {
        self.derive(self.target.clone())
    }

    /// Local: symlinks and `..` resolved (missing trailing components are
    /// resolved lexically). Remote: the absolute form.
    pub fn canonical_path(&self) -> Result<String> {
        Ok(self.canonical_location()?.absolute_path())
    }

    pub fn canonical_location(&self) -> Result<Location> {
        match &self.target {
            Target::Local(p) => {
                let absolute = local::canonicalize(&p.absolute)?;
                Ok(self.derive(Target::Local(LocalPath { absolute })))
            }
            _ => Ok(self.absolute_location()),
        }
    }

    /// Parent path string, or `None` for a root.
    pub fn parent(&self) -> Option<String> {
        self.parent_location().map(|p| p.absolute_path())
    }

    pub fn parent_location(&self) -> Option<Location> {
        let target = match &self.target {
            Target::Local(p) => Target::Local(LocalPath {
                absolute: p.absolute.parent()?.to_path_buf(),
            }),
            Target::Http(u) => {
                let parent = http::parent(u)?;
                let path_start = u.path_start;
                Target::Http(parse::HttpUrl {
                    secure: u.secure,
                    url: parent,
                    path_start,
                })
            }
            Target::S3(u) => Target::S3(s3::parent(u)?),
        };
        Some(self.derive(target))
    }

    pub fn is_root(&self) -> bool {
        self.parent_location().is_none()
    }

    /// Whether the resource exists. Remote failures are logged and reported as `false`.
    pub fn exists(&self) -> bool {
        self.try_exists().unwrap_or_else(|e| {
            tracing::warn!(location = %self, error = %e, "existence check failed");
            false
        })
    }

    /// Whether the resource exists, surfacing remote failures as errors so
    /// "absent" and "unreachable" can be told apart.
    pub fn try_exists(&self) -> Result<bool> {
        match &self.target {
            Target::Local(p) => Ok(p.absolute.try_exists()?),
            Target::Http(u) => Ok(http::probe(u, self.backends.http.as_ref())?.is_success()),
            Target::S3(u) => Ok(s3::exists(u, self.backends.s3.as_ref())?),
        }
    }

    /// Local: permission check. HTTP: always. S3: whenever the resource exists.
    pub fn can_read(&self) -> bool {
        match &self.target {
            Target::Local(p) => local::can_read(&p.absolute),
            Target::Http(_) => true,
            Target::S3(_) => self.exists(),
        }
    }

    /// Only local locations can ever be writable.
    pub fn can_write(&self) -> bool {
        match &self.target {
            Target::Local(p) => local::can_write(&p.absolute),
            Target::Http(_) | Target::S3(_) => false,
        }
    }

    pub fn is_directory(&self) -> bool {
        match &self.target {
            Target::Local(p) => p.absolute.is_dir(),
            Target::Http(_) => false,
            Target::S3(u) => s3::is_directory(u, self.backends.s3.as_ref()).unwrap_or_else(|e| {
                tracing::warn!(location = %self, error = %e, "directory check failed");
                false
            }),
        }
    }

    pub fn is_file(&self) -> bool {
        self.exists() && !self.is_directory()
    }

    /// Dotfile convention locally (the hidden attribute on Windows); remote
    /// locations are never hidden.
    pub fn is_hidden(&self) -> bool {
        match &self.target {
            Target::Local(p) => local::is_hidden(&p.absolute),
            Target::Http(_) | Target::S3(_) => false,
        }
    }

    /// Names of the immediate children, or `None` if this is not a directory.
    pub fn list(&self) -> Option<Vec<String>> {
        self.list_filtered(false)
    }

    /// As [`list`](Self::list), optionally leaving out hidden children.
    pub fn list_filtered(&self, skip_hidden: bool) -> Option<Vec<String>> {
        if !self.is_directory() {
            return None;
        }
        let names = match &self.target {
            Target::Local(p) => local::list(&p.absolute).map_err(LocationError::from),
            Target::Http(_) => return None,
            Target::S3(u) => s3::list(u, self.backends.s3.as_ref()).map_err(LocationError::from),
        };
        let names = match names {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(location = %self, error = %e, "listing failed");
                return None;
            }
        };
        if !skip_hidden {
            return Some(names);
        }
        Some(
            names
                .into_iter()
                .filter(|n| !self.join(n).is_hidden())
                .collect(),
        )
    }

    /// Children as locations, in the same order as [`list`](Self::list).
    pub fn list_files(&self) -> Option<Vec<Location>> {
        self.list_files_filtered(false)
    }

    pub fn list_files_filtered(&self, skip_hidden: bool) -> Option<Vec<Location>> {
        let names = self.list_filtered(skip_hidden)?;
        Some(names.iter().map(|n| self.join(n)).collect())
    }

    /// Size in bytes of a file or object; `None` for directories and when unknown.
    pub fn length(&self) -> Option<u64> {
        match &self.target {
            Target::Local(p) => local::length(&p.absolute),
            Target::Http(u) => http::probe(u, self.backends.http.as_ref())
                .ok()
                .filter(|r| r.is_success())
                .and_then(|r| r.content_length),
            Target::S3(u) => s3::stat(u, self.backends.s3.as_ref())
                .ok()
                .flatten()
                .and_then(|s| s.size),
        }
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        match &self.target {
            Target::Local(p) => local::last_modified(&p.absolute),
            Target::Http(u) => http::probe(u, self.backends.http.as_ref())
                .ok()
                .filter(|r| r.is_success())
                .and_then(|r| r.last_modified_time()),
            Target::S3(u) => s3::stat(u, self.backends.s3.as_ref())
                .ok()
                .flatten()
                .and_then(|s| s.last_modified),
        }
    }

    /// `file://` URL for local paths (ending in `/` for directories), the URL
    /// itself for HTTP(S). S3 URIs have no URL form.
    pub fn to_url(&self) -> std::result::Result<Url, UrlConversionError> {
        match &self.target {
            Target::Local(p) => {
                let url = if p.absolute.is_dir() {
                    Url::from_directory_path(&p.absolute)
                } else {
                    Url::from_file_path(&p.absolute)
                };
                url.map_err(|()| UrlConversionError::InvalidFilePath {
                    location: self.absolute_path(),
                })
            }
            Target::Http(u) => {
                Url::parse(&u.url).map_err(|source| UrlConversionError::InvalidUrl {
                    location: self.absolute_path(),
                    source,
                })
            }
            Target::S3(_) => Err(UrlConversionError::UnsupportedScheme {
                location: self.absolute_path(),
            }),
        }
    }

    fn local_path_for_write(&self) -> Result<&PathBuf> {
        match &self.target {
            Target::Local(p) => Ok(&p.absolute),
            _ => Err(LocationError::ReadOnly(self.absolute_path())),
        }
    }

    /// Creates an empty file if none exists. `Ok(false)` if it already did.
    pub fn create_new_file(&self) -> Result<bool> {
        Ok(local::create_new_file(self.local_path_for_write()?)?)
    }

    pub fn mkdir(&self) -> Result<()> {
        Ok(std::fs::create_dir(self.local_path_for_write()?)?)
    }

    /// Creates the directory and any missing parents.
    pub fn mkdirs(&self) -> Result<()> {
        Ok(std::fs::create_dir_all(self.local_path_for_write()?)?)
    }

    /// Removes a file or an empty directory.
    pub fn delete(&self) -> Result<()> {
        Ok(local::delete(self.local_path_for_write()?)?)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.absolute_path())
    }
}

impl FromStr for Location {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self> {
        Location::new(s)
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
    }
}
