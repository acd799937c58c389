//! HTTP cache validation module
//!
//! Provides `ETag` / `Last-Modified` generation from file metadata and
//! conditional request evaluation.

use chrono::{DateTime, Utc};
use hyper::header::{HeaderMap, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use std::fs::Metadata;
use std::io;
use std::time::{SystemTime, UNIX_EPOCH};

/// Size and modification time of a file, re-read on every request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub size: u64,
    pub modified: SystemTime,
}

impl ResourceDescriptor {
    pub const fn new(size: u64, modified: SystemTime) -> Self {
        Self { size, modified }
    }

    pub fn from_metadata(metadata: &Metadata) -> io::Result<Self> {
        Ok(Self::new(metadata.len(), metadata.modified()?))
    }

    /// `ETag` as `<size-hex>-<mtime-millis-hex>`
    ///
    /// # Examples
    /// ```
    /// use spa_serve::http::cache::ResourceDescriptor;
    /// use std::time::{Duration, UNIX_EPOCH};
    ///
    /// let d = ResourceDescriptor::new(255, UNIX_EPOCH + Duration::from_millis(4096));
    /// assert_eq!(d.etag(), "ff-1000");
    /// ```
    pub fn etag(&self) -> String {
        let mtime = self
            .modified
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis());
        format!("{:x}-{mtime:x}", self.size)
    }

    /// `Last-Modified` value in IMF-fixdate form
    pub fn last_modified(&self) -> String {
        let time: DateTime<Utc> = self.modified.into();
        time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }
}

/// Decide whether the client's cached copy is still current.
///
/// Both validators are compared as exact strings against the headers already
/// set on the response. A request without any validator is never fresh.
pub fn is_fresh(request: &HeaderMap, response: &HeaderMap) -> bool {
    let if_none_match = request.get(IF_NONE_MATCH);
    let if_modified_since = request.get(IF_MODIFIED_SINCE);

    if if_none_match.is_none() && if_modified_since.is_none() {
        return false;
    }

    if let Some(client) = if_none_match {
        if response.get(ETAG) != Some(client) {
            return false;
        }
    }

    if let Some(client) = if_modified_since {
        if response.get(LAST_MODIFIED) != Some(client) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;
    use std::time::Duration;

    fn descriptor(size: u64, millis: u64) -> ResourceDescriptor {
        ResourceDescriptor::new(size, UNIX_EPOCH + Duration::from_millis(millis))
    }

    fn response_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ETAG, HeaderValue::from_static("X"));
        headers.insert(LAST_MODIFIED, HeaderValue::from_static("Y"));
        headers
    }

    #[test]
    fn test_etag_format() {
        assert_eq!(descriptor(1000, 1_700_000_000_000).etag(), "3e8-18bcfe56800");
    }

    #[test]
    fn test_etag_consistency() {
        assert_eq!(descriptor(42, 5000).etag(), descriptor(42, 5000).etag());
    }

    #[test]
    fn test_etag_difference() {
        let base = descriptor(42, 5000).etag();
        assert_ne!(base, descriptor(43, 5000).etag());
        assert_ne!(base, descriptor(42, 5001).etag());
    }

    #[test]
    fn test_last_modified_format() {
        let d = descriptor(0, 784_111_777_000);
        assert_eq!(d.last_modified(), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_fresh_on_matching_etag() {
        let mut request = HeaderMap::new();
        request.insert(IF_NONE_MATCH, HeaderValue::from_static("X"));
        assert!(is_fresh(&request, &response_headers()));
    }

    #[test]
    fn test_stale_on_different_etag() {
        let mut request = HeaderMap::new();
        request.insert(IF_NONE_MATCH, HeaderValue::from_static("Z"));
        assert!(!is_fresh(&request, &response_headers()));
    }

    #[test]
    fn test_stale_without_validators() {
        assert!(!is_fresh(&HeaderMap::new(), &response_headers()));
    }

    #[test]
    fn test_if_modified_since_is_string_equality() {
        let mut request = HeaderMap::new();
        request.insert(IF_MODIFIED_SINCE, HeaderValue::from_static("Y"));
        assert!(is_fresh(&request, &response_headers()));

        request.insert(IF_MODIFIED_SINCE, HeaderValue::from_static("y"));
        assert!(!is_fresh(&request, &response_headers()));
    }

    #[test]
    fn test_both_validators_must_match() {
        let mut request = HeaderMap::new();
        request.insert(IF_NONE_MATCH, HeaderValue::from_static("X"));
        request.insert(IF_MODIFIED_SINCE, HeaderValue::from_static("other"));
        assert!(!is_fresh(&request, &response_headers()));
    }
}
