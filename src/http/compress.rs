//! Gzip response compression

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;

/// Quality value of an `Accept-Encoding` element (`gzip;q=0.5` -> 0.5)
fn parse_quality(part: &str) -> f32 {
    part.split(';')
        .nth(1)
        .and_then(|s| s.trim().strip_prefix("q="))
        .and_then(|s| s.parse::<f32>().ok())
        .unwrap_or(1.0)
}

/// Check if the `Accept-Encoding` header admits gzip
///
/// `q=0` means the encoding is refused.
///
/// # Examples
/// ```
/// use spahost::http::compress::accepts_gzip;
/// assert!(accepts_gzip("gzip, deflate, br"));
/// assert!(!accepts_gzip("gzip;q=0"));
/// assert!(!accepts_gzip("identity"));
/// ```
pub fn accepts_gzip(accept_encoding: &str) -> bool {
    accept_encoding.split(',').any(|part| {
        let encoding = part.split(';').next().unwrap_or_default().trim();
        (encoding.eq_ignore_ascii_case("gzip") || encoding == "*") && parse_quality(part) > 0.0
    })
}

/// Compress data using gzip
pub fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(data)?;
    encoder.finish()
}
