//! Request path handling.
//!
//! - Internal representation: always decoded, no leading/trailing `/`
//! - Browser boundary: decode on input, encode on output

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters left untouched when encoding a path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Decoded request path relative to the site root.
///
/// Invariants:
/// - Always decoded (no percent-encoding)
/// - Never starts or ends with `/`
/// - Empty for the site root
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RequestPath(String);

impl RequestPath {
    /// Create from a browser path (decode percent-encoding, strip query
    /// string and fragment).
    pub fn from_browser(encoded: &str) -> Self {
        let path = encoded.split(['?', '#']).next().unwrap_or(encoded);
        let decoded = percent_decode_str(path)
            .decode_utf8()
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| path.to_string());
        Self::from_decoded(&decoded)
    }

    /// Create from an already decoded path. Collapses repeated slashes.
    pub fn from_decoded(decoded: &str) -> Self {
        let normalized = decoded
            .trim()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        Self(normalized)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the site root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First segment, if any.
    fn first_segment(&self) -> Option<&str> {
        self.0.split('/').next().filter(|s| !s.is_empty())
    }

    /// Split off a leading locale segment when `is_locale` accepts it.
    ///
    /// `en/about-us` → `(Some("en"), "about-us")`; an unknown first segment
    /// leaves the whole path as the slug.
    pub fn split_locale(&self, is_locale: impl Fn(&str) -> bool) -> (Option<&str>, &str) {
        match self.first_segment() {
            Some(first) if is_locale(first) => {
                let rest = self.0[first.len()..].trim_start_matches('/');
                (Some(first), rest)
            }
            _ => (None, self.0.as_str()),
        }
    }

    /// Encode for browser with a leading `/`.
    pub fn to_encoded(&self) -> String {
        encode_path(&self.0)
    }
}

/// Percent-encode every segment of `path` and prefix it with `/`.
fn encode_path(path: &str) -> String {
    let encoded = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{encoded}")
}

impl fmt::Display for RequestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl From<&str> for RequestPath {
    fn from(s: &str) -> Self {
        Self::from_browser(s)
    }
}
