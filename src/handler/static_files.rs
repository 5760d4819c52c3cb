//! Static file serving module
//!
//! [`FileServer`] is the collaborator the dispatcher delegates to; [`FsFileServer`]
//! serves from a directory on disk with conditional requests, ranges and gzip.
//! Entity tags are left to the dispatcher.

use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::header::{self, HeaderValue};

use crate::handler::RequestContext;
use crate::http::{compress, etag, mime, ByteRange, FileResponse};

/// Serves files below a root directory
#[async_trait]
pub trait FileServer: Send + Sync {
    /// Directory requests are resolved against
    fn root(&self) -> &Path;

    /// Serve the file named by the request path
    async fn serve(&self, ctx: &RequestContext) -> FileResponse;

    /// Serve one specific file, regardless of the request path
    async fn send_file(&self, path: &Path, ctx: &RequestContext) -> FileResponse;
}

/// Filesystem-backed [`FileServer`]
#[derive(Debug, Clone)]
pub struct FsFileServer {
    root: PathBuf,
    index_names: Vec<String>,
    compress: bool,
}

impl FsFileServer {
    pub fn new(root: impl Into<PathBuf>, index_names: Vec<String>, compress: bool) -> Self {
        Self {
            root: root.into(),
            index_names,
            compress,
        }
    }

    /// Map a request path to a location under the root
    ///
    /// Returns None for paths that would leave the root.
    fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let relative = Path::new(request_path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return None;
        }
        Some(self.root.join(relative))
    }

    /// First configured index file present in `dir`
    async fn find_index(&self, dir: &Path) -> Option<PathBuf> {
        for name in &self.index_names {
            let candidate = dir.join(name);
            if let Ok(metadata) = tokio::fs::metadata(&candidate).await {
                if metadata.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

#[async_trait]
impl FileServer for FsFileServer {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn serve(&self, ctx: &RequestContext) -> FileResponse {
        let Some(target) = self.resolve(&ctx.path) else {
            return FileResponse::not_found();
        };

        let metadata = match tokio::fs::metadata(&target).await {
            Ok(m) => m,
            Err(e) => return error_response(&e),
        };

        if metadata.is_dir() {
            return match self.find_index(&target).await {
                Some(index) => self.send_file(&index, ctx).await,
                None => FileResponse::forbidden(),
            };
        }

        self.send_file(&target, ctx).await
    }

    async fn send_file(&self, path: &Path, ctx: &RequestContext) -> FileResponse {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(e) => return error_response(&e),
        };
        if metadata.is_dir() {
            return FileResponse::forbidden();
        }

        let content = match tokio::fs::read(path).await {
            Ok(c) => c,
            Err(e) => return error_response(&e),
        };

        let content_type = mime::get_content_type(path.extension().and_then(|e| e.to_str()));
        let compressible = self.compress && mime::is_compressible(content_type);
        let encoded = if compressible && ctx.accepts_gzip && ctx.range.is_none() {
            compress::gzip(&content).ok()
        } else {
            None
        };

        let headers = FileHeaders {
            last_modified: metadata.modified().ok(),
            gzip: encoded.is_some(),
            vary: compressible,
        };
        let body = Bytes::from(encoded.unwrap_or(content));

        if is_not_modified(ctx, &body, headers.last_modified) {
            return headers.apply(FileResponse::not_modified());
        }

        // Ranges only apply to the identity encoding
        if !headers.gzip {
            match ByteRange::resolve(ctx.range.as_deref(), body.len()) {
                ByteRange::Partial(range) => {
                    return headers.apply(FileResponse::partial(&body, content_type, range));
                }
                ByteRange::Unsatisfiable => {
                    return FileResponse::range_not_satisfiable(body.len());
                }
                ByteRange::Full => {}
            }
        }

        headers.apply(FileResponse::ok(body, content_type))
    }
}

/// Representation headers shared by 200, 206 and 304
struct FileHeaders {
    last_modified: Option<SystemTime>,
    gzip: bool,
    vary: bool,
}

impl FileHeaders {
    fn apply(&self, mut response: FileResponse) -> FileResponse {
        if let Some(modified) = self.last_modified {
            if let Ok(value) = HeaderValue::try_from(httpdate::fmt_http_date(modified)) {
                response.headers.insert(header::LAST_MODIFIED, value);
            }
        }
        if self.gzip {
            response
                .headers
                .insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        }
        if self.vary {
            response
                .headers
                .insert(header::VARY, HeaderValue::from_static("accept-encoding"));
        }
        response
    }
}

/// Evaluate conditional request headers
///
/// `If-None-Match` takes precedence; `If-Modified-Since` is only consulted
/// when it is absent.
fn is_not_modified(ctx: &RequestContext, body: &[u8], last_modified: Option<SystemTime>) -> bool {
    if let Some(if_none_match) = ctx.if_none_match.as_deref() {
        return etag::matches(if_none_match, &etag::generate(body, false));
    }

    let (Some(since), Some(modified)) = (ctx.if_modified_since.as_deref(), last_modified) else {
        return false;
    };
    let Ok(since) = httpdate::parse_http_date(since) else {
        return false;
    };
    // HTTP dates have whole second precision
    unix_secs(modified) <= unix_secs(since)
}

fn unix_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn error_response(error: &io::Error) -> FileResponse {
    match error.kind() {
        ErrorKind::NotFound | ErrorKind::NotADirectory => FileResponse::not_found(),
        ErrorKind::PermissionDenied => FileResponse::forbidden(),
        _ => FileResponse::internal_error(),
    }
}
