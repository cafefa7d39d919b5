//! Static-page HTTP server. Supports HEAD and `Range: bytes=0-0` GET.

use std::collections::HashMap;

use super::server::{self, Request, Response};

#[derive(Debug, Clone, Copy)]
pub struct HttpServerOptions {
    /// If false, HEAD returns 405 (simulates servers that block HEAD).
    pub head_allowed: bool,
}

impl Default for HttpServerOptions {
    fn default() -> Self {
        Self { head_allowed: true }
    }
}

/// Serves `pages` (path -> body); everything else is 404. `/moved` redirects
/// to `/`. Returns the base URL without a trailing slash.
pub fn start(pages: HashMap<String, Vec<u8>>, opts: HttpServerOptions) -> String {
    let authority = server::start(move |req: &Request| respond(req, &pages, opts));
    format!("http://{}", authority)
}

fn respond(req: &Request, pages: &HashMap<String, Vec<u8>>, opts: HttpServerOptions) -> Response {
    if req.method == "HEAD" && !opts.head_allowed {
        return Response::new("405 Method Not Allowed");
    }
    if req.path == "/moved" {
        return Response::new("301 Moved Permanently").header("Location: /");
    }
    let Some(body) = pages.get(&req.path) else {
        return Response::new("404 Not Found");
    };
    let last_modified = "Last-Modified: Wed, 21 Oct 2015 07:28:00 GMT";
    if req.method == "GET" && req.header("range").is_some() && !body.is_empty() {
        return Response::new("206 Partial Content")
            .header(format!("Content-Range: bytes 0-0/{}", body.len()))
            .header(last_modified)
            .body(body[..1].to_vec());
    }
    Response::new("200 OK")
        .header("Content-Type: text/html")
        .header(last_modified)
        .body(body.clone())
}
