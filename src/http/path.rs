//! Request path normalization
//!
//! Turns the raw URI path into the form used for classification and file lookup:
//! percent-decoded, absolute, with `.`/`..` segments and repeated slashes removed.
//! `..` never climbs above the root. A trailing slash is kept so directory
//! requests stay recognizable.

use percent_encoding::percent_decode_str;

/// Normalize a raw request path
///
/// # Examples
/// ```
/// use spahost::http::path::normalize_path;
/// assert_eq!(normalize_path("/a/./b/../c.js"), "/a/c.js");
/// assert_eq!(normalize_path("/../../etc/passwd"), "/etc/passwd");
/// assert_eq!(normalize_path("/docs/"), "/docs/");
/// ```
pub fn normalize_path(raw: &str) -> String {
    let decoded = percent_decode_str(raw).decode_utf8_lossy();
    let trailing_slash = decoded.len() > 1 && decoded.ends_with('/');

    let mut stack: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            // NUL can never name a file
            s if s.contains('\0') => {}
            s => stack.push(s),
        }
    }

    let mut normalized = String::with_capacity(decoded.len() + 1);
    normalized.push('/');
    normalized.push_str(&stack.join("/"));
    if trailing_slash && !stack.is_empty() {
        normalized.push('/');
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_and_empty() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("//"), "/");
    }

    #[test]
    fn test_plain_paths_unchanged() {
        assert_eq!(normalize_path("/test.js"), "/test.js");
        assert_eq!(normalize_path("/assets/app.css"), "/assets/app.css");
        assert_eq!(normalize_path("/users/42/profile"), "/users/42/profile");
    }

    #[test]
    fn test_dot_segments() {
        assert_eq!(normalize_path("/a/./b"), "/a/b");
        assert_eq!(normalize_path("/a/b/../c"), "/a/c");
        assert_eq!(normalize_path("/a//b///c"), "/a/b/c");
    }

    #[test]
    fn test_traversal_clamped_at_root() {
        assert_eq!(normalize_path("/.."), "/");
        assert_eq!(normalize_path("/../../secret.txt"), "/secret.txt");
        assert_eq!(normalize_path("/%2e%2e/%2e%2e/secret.txt"), "/secret.txt");
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(normalize_path("/my%20file.txt"), "/my file.txt");
        assert_eq!(normalize_path("/a.js%3Fx"), "/a.js?x");
    }

    #[test]
    fn test_trailing_slash_kept() {
        assert_eq!(normalize_path("/docs/"), "/docs/");
        assert_eq!(normalize_path("/docs/sub/../"), "/docs/");
        assert_eq!(normalize_path("/docs/.."), "/");
    }

    #[test]
    fn test_nul_segments_dropped() {
        assert_eq!(normalize_path("/a/%00/b.js"), "/a/b.js");
    }
}
