//! Integration test: HTTP locations against a loopback server.
//!
//! Covers HEAD probing, the ranged-GET fallback for servers that refuse HEAD,
//! redirects, and the metadata reported from response headers.

mod common;

use std::collections::HashMap;

use common::http_server::{self, HttpServerOptions};
use locus_core::config::{HttpConfig, LocusConfig};
use locus_core::{Backends, Location, Scheme};

fn pages() -> HashMap<String, Vec<u8>> {
    let mut pages = HashMap::new();
    pages.insert("/".to_string(), b"<html>index</html>".to_vec());
    pages.insert("/images/plate.tiff".to_string(), vec![7u8; 1234]);
    pages
}

#[test]
fn existing_page_exists_and_reports_metadata() {
    let base = http_server::start(pages(), HttpServerOptions::default());
    let loc = Location::new(&format!("{base}/images/plate.tiff")).unwrap();

    assert_eq!(loc.scheme(), Scheme::Http);
    assert!(loc.exists());
    assert!(loc.is_file());
    assert!(!loc.is_directory());
    assert!(loc.can_read());
    assert!(!loc.can_write());
    assert_eq!(loc.length(), Some(1234));
    let modified = loc.last_modified().expect("last-modified header");
    assert_eq!(modified.to_rfc3339(), "2015-10-21T07:28:00+00:00");
}

#[test]
fn missing_page_is_absent_but_not_an_error() {
    let base = http_server::start(pages(), HttpServerOptions::default());
    let loc = Location::new(&format!("{base}/nope.tiff")).unwrap();

    assert!(!loc.exists());
    assert!(!loc.try_exists().unwrap());
    assert!(!loc.is_file());
    assert_eq!(loc.length(), None);
    assert_eq!(loc.last_modified(), None);
}

#[test]
fn head_refused_falls_back_to_ranged_get() {
    let base = http_server::start(pages(), HttpServerOptions { head_allowed: false });
    let loc = Location::new(&format!("{base}/images/plate.tiff")).unwrap();

    assert!(loc.exists());
    assert_eq!(loc.length(), Some(1234));

    let missing = Location::new(&format!("{base}/gone")).unwrap();
    assert!(!missing.exists());
}

#[test]
fn redirects_are_followed_by_default() {
    let base = http_server::start(pages(), HttpServerOptions::default());
    let loc = Location::new(&format!("{base}/moved")).unwrap();
    assert!(loc.exists());
}

#[test]
fn redirects_can_be_left_unfollowed() {
    let base = http_server::start(pages(), HttpServerOptions::default());
    let cfg = LocusConfig {
        http: HttpConfig {
            follow_redirects: false,
            ..HttpConfig::default()
        },
        ..LocusConfig::default()
    };
    let loc = Location::new(&format!("{base}/moved"))
        .unwrap()
        .with_backends(Backends::from_config(&cfg));
    assert!(!loc.exists());
}

#[test]
fn unreachable_host_reports_an_error_from_try_exists() {
    // Port 9 (discard) is not served on loopback in the test environment.
    let loc = Location::new("http://127.0.0.1:9/file.tiff").unwrap();
    assert!(!loc.exists());
    assert!(loc.try_exists().is_err());
}

#[test]
fn navigation_stays_on_the_server() {
    let base = http_server::start(pages(), HttpServerOptions::default());
    let dir = Location::new(&format!("{base}/images/")).unwrap();
    let file = dir.join("plate.tiff");

    assert_eq!(file.absolute_path(), format!("{base}/images/plate.tiff"));
    assert!(file.exists());
    assert_eq!(file.name(), "plate.tiff");
    assert_eq!(file.parent().as_deref(), Some(format!("{base}/images").as_str()));
    assert!(dir.list().is_none());

    let url = file.to_url().unwrap();
    assert_eq!(url.path(), "/images/plate.tiff");
}
