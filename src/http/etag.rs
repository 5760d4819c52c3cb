//! Entity tag module
//!
//! Provides `ETag` generation and `If-None-Match` evaluation.

use sha2::{Digest, Sha256};

/// Generate an `ETag` for a response body
///
/// The tag is the SHA-256 digest of the body as lowercase hex, quoted.
/// Weak tags carry the `W/` prefix.
///
/// # Examples
/// ```
/// use spahost::http::etag::generate;
/// let strong = generate(b"body", false);
/// assert!(strong.starts_with('"') && strong.ends_with('"'));
/// assert_eq!(generate(b"body", true), format!("W/{strong}"));
/// ```
pub fn generate(body: &[u8], weak: bool) -> String {
    let digest = Sha256::digest(body);
    let prefix = if weak { "W/" } else { "" };
    format!("{prefix}\"{digest:x}\"")
}

/// Check if the client's `If-None-Match` header matches the server's `ETag`
///
/// Uses weak comparison: `W/"a"` and `"a"` are equal.
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", "def456"`
/// - Wildcard: `*`
pub fn matches(if_none_match: &str, etag: &str) -> bool {
    let etag = opaque_tag(etag);
    if_none_match
        .split(',')
        .map(str::trim)
        .any(|candidate| candidate == "*" || opaque_tag(candidate) == etag)
}

fn opaque_tag(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}
