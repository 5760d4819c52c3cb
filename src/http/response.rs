//! HTTP response building module
//!
//! [`FileResponse`] is what the file-serving layer produces: status, headers and
//! the complete body. The dispatcher inspects and decorates it before it is
//! turned into a hyper response.

use std::ops::RangeInclusive;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{self, HeaderMap, HeaderName, HeaderValue};
use hyper::{Response, StatusCode};

/// A fully buffered response
#[derive(Debug, Clone)]
pub struct FileResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl FileResponse {
    /// Empty response with the given status
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Plain text response, used for error statuses
    pub fn text(status: StatusCode, message: &'static str) -> Self {
        Self::new(status)
            .with_header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            )
            .with_body(Bytes::from_static(message.as_bytes()))
    }

    /// 200 with the whole file
    pub fn ok(body: Bytes, content_type: &'static str) -> Self {
        Self::new(StatusCode::OK)
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static(content_type))
            .with_header(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"))
            .with_body(body)
    }

    /// 206 with the `range` slice of `body`
    ///
    /// `range` must lie inside `body`, as produced by [`ByteRange::resolve`].
    ///
    /// [`ByteRange::resolve`]: crate::http::range::ByteRange::resolve
    pub fn partial(body: &Bytes, content_type: &'static str, range: RangeInclusive<usize>) -> Self {
        let content_range = format!("bytes {}-{}/{}", range.start(), range.end(), body.len());
        let mut response = Self::new(StatusCode::PARTIAL_CONTENT)
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static(content_type))
            .with_header(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"))
            .with_body(body.slice(range));
        if let Ok(value) = HeaderValue::try_from(content_range) {
            response.headers.insert(header::CONTENT_RANGE, value);
        }
        response
    }

    pub fn not_modified() -> Self {
        Self::new(StatusCode::NOT_MODIFIED)
    }

    pub fn forbidden() -> Self {
        Self::text(StatusCode::FORBIDDEN, "403 Forbidden")
    }

    pub fn not_found() -> Self {
        Self::text(StatusCode::NOT_FOUND, "404 Not Found")
    }

    pub fn internal_error() -> Self {
        Self::text(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error")
    }

    /// 416 Range Not Satisfiable
    pub fn range_not_satisfiable(total_size: usize) -> Self {
        let mut response = Self::text(StatusCode::RANGE_NOT_SATISFIABLE, "Range Not Satisfiable");
        if let Ok(value) = HeaderValue::try_from(format!("bytes */{total_size}")) {
            response.headers.insert(header::CONTENT_RANGE, value);
        }
        response
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    /// Convert into a hyper response
    ///
    /// `Content-Length` always reflects the full body; for HEAD the body itself
    /// is dropped afterwards.
    pub fn into_response(self, is_head: bool) -> Response<Full<Bytes>> {
        let Self {
            status,
            mut headers,
            body,
        } = self;

        if status != StatusCode::NOT_MODIFIED {
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
        }
        let body = if is_head { Bytes::new() } else { body };

        let mut response = Response::new(Full::new(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_ok_headers() {
        let response = FileResponse::ok(Bytes::from_static(b"abc"), "text/css; charset=utf-8");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.headers[header::CONTENT_TYPE],
            "text/css; charset=utf-8"
        );
        assert_eq!(response.headers[header::ACCEPT_RANGES], "bytes");
    }

    #[test]
    fn test_partial_content_range() {
        let body = Bytes::from_static(b"abcdefghij");
        let response = FileResponse::partial(&body, "text/plain", 1..=3);
        assert_eq!(response.status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(&response.body[..], b"bcd");
        assert_eq!(response.headers[header::CONTENT_RANGE], "bytes 1-3/10");
    }

    #[test]
    fn test_range_not_satisfiable() {
        let response = FileResponse::range_not_satisfiable(10);
        assert_eq!(response.status, StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers[header::CONTENT_RANGE], "bytes */10");
    }

    #[tokio::test]
    async fn test_into_response_get() {
        let response = FileResponse::ok(Bytes::from_static(b"hello"), "text/plain")
            .into_response(false);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "5");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"hello");
    }

    #[tokio::test]
    async fn test_into_response_head_keeps_length() {
        let response = FileResponse::ok(Bytes::from_static(b"hello"), "text/plain")
            .into_response(true);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "5");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[test]
    fn test_not_modified_has_no_length() {
        let response = FileResponse::not_modified().into_response(false);
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert!(response.headers().get(header::CONTENT_LENGTH).is_none());
    }
}
