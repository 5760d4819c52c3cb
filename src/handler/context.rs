//! Per-request context
//!
//! Everything the dispatcher and the file server need from the request,
//! extracted once so the body type of the incoming request does not leak
//! into the rest of the handler.

use hyper::header::{self, HeaderMap};
use hyper::{Method, Request};

use crate::http::{compress, normalize_path};

/// Request information used for classification and file serving
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    /// Normalized path, always starting with `/`
    pub path: String,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub range: Option<String>,
    pub accepts_gzip: bool,
}

impl RequestContext {
    /// Context without any conditional, range or encoding headers
    pub fn new(method: Method, raw_path: &str) -> Self {
        Self {
            is_head: method == Method::HEAD,
            method,
            path: normalize_path(raw_path),
            if_none_match: None,
            if_modified_since: None,
            range: None,
            accepts_gzip: false,
        }
    }

    /// Extract the context from an incoming request
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let headers = req.headers();
        Self {
            if_none_match: header_string(headers, &header::IF_NONE_MATCH),
            if_modified_since: header_string(headers, &header::IF_MODIFIED_SINCE),
            range: header_string(headers, &header::RANGE),
            accepts_gzip: headers
                .get(header::ACCEPT_ENCODING)
                .and_then(|v| v.to_str().ok())
                .is_some_and(compress::accepts_gzip),
            ..Self::new(req.method().clone(), req.uri().path())
        }
    }
}

fn header_string(headers: &HeaderMap, name: &header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
