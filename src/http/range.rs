//! Byte ranges over a buffered body
//!
//! A single `bytes=` range is honored. It is resolved against the body that is
//! about to be sent, which is always the identity encoding; gzip responses
//! ignore `Range` altogether. Anything that is not a single well-formed byte
//! range is ignored and the whole body goes out.

use std::ops::RangeInclusive;

/// What a `Range` header asks of a body of known length
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteRange {
    /// No usable range, send the whole body
    Full,
    /// Send these bytes as 206
    Partial(RangeInclusive<usize>),
    /// Answer 416
    Unsatisfiable,
}

impl ByteRange {
    /// Resolve `header` against a body of `len` bytes
    ///
    /// # Examples
    /// ```
    /// use spahost::http::range::ByteRange;
    ///
    /// assert_eq!(ByteRange::resolve(Some("bytes=0-3"), 10), ByteRange::Partial(0..=3));
    /// assert_eq!(ByteRange::resolve(Some("bytes=-4"), 10), ByteRange::Partial(6..=9));
    /// assert_eq!(ByteRange::resolve(Some("bytes=10-"), 10), ByteRange::Unsatisfiable);
    /// assert_eq!(ByteRange::resolve(None, 10), ByteRange::Full);
    /// ```
    pub fn resolve(header: Option<&str>, len: usize) -> Self {
        header
            .and_then(Selector::parse)
            .map_or(Self::Full, |selector| selector.resolve(len))
    }
}

/// The three shapes of a single byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selector {
    /// `first-`
    From(usize),
    /// `first-last`, both inclusive
    Between(usize, usize),
    /// `-count`, the final bytes
    Last(usize),
}

impl Selector {
    fn parse(header: &str) -> Option<Self> {
        let set = header.trim().strip_prefix("bytes=")?;
        // multipart/byteranges is not produced
        if set.contains(',') {
            return None;
        }
        let (first, last) = set.split_once('-')?;
        match (first.trim(), last.trim()) {
            ("", "") => None,
            ("", count) => count.parse().ok().map(Self::Last),
            (first, "") => first.parse().ok().map(Self::From),
            (first, last) => Some(Self::Between(first.parse().ok()?, last.parse().ok()?)),
        }
    }

    fn resolve(self, len: usize) -> ByteRange {
        let Some(last_byte) = len.checked_sub(1) else {
            return ByteRange::Unsatisfiable;
        };
        match self {
            Self::From(first) if first <= last_byte => ByteRange::Partial(first..=last_byte),
            Self::Between(first, last) if first <= last && first <= last_byte => {
                ByteRange::Partial(first..=last.min(last_byte))
            }
            Self::Last(count) if count > 0 => {
                ByteRange::Partial(len.saturating_sub(count)..=last_byte)
            }
            _ => ByteRange::Unsatisfiable,
        }
    }
}
