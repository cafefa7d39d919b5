//! One `Location` type for local paths, HTTP(S) URLs and S3 objects.
//!
//! ```no_run
//! use locus_core::Location;
//!
//! let loc = Location::new("s3+http://localhost:31836/bioformats.test.public")?;
//! if loc.is_directory() {
//!     for child in loc.list_files().unwrap_or_default() {
//!         println!("{} {}", child, child.length().unwrap_or(0));
//!     }
//! }
//! # Ok::<(), locus_core::LocationError>(())
//! ```
//!
//! Embedders typically start with [`logging::init_logging`] (falling back to
//! [`logging::init_logging_stderr`]) and build remote collaborators from the
//! user's config file:
//!
//! ```no_run
//! use locus_core::{config, logging, Backends, Location};
//!
//! if logging::init_logging().is_err() {
//!     logging::init_logging_stderr();
//! }
//! let cfg = config::load_or_init()?;
//! let loc = Location::new("https://www.openmicroscopy.org/")?
//!     .with_backends(Backends::from_config(&cfg));
//! println!("{} exists: {}", loc, loc.exists());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod logging;

pub mod backends;
pub mod error;
pub mod http_probe;
pub mod location;
pub mod s3_client;

pub use backends::Backends;
pub use error::{LocationError, UrlConversionError};
pub use location::{Location, Scheme};
pub use s3_client::S3ClientServiceError;
