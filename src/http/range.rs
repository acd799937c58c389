//! HTTP Range request parsing module
//!
//! Single byte-range parsing for media seeking and resumable playback.

use std::fmt;

/// A satisfiable byte range, both ends inclusive.
///
/// Only [`parse_range`] constructs one, so `start <= end < size` always holds
/// for the size it was parsed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    start: u64,
    end: u64,
}

impl ByteRange {
    /// First byte offset
    #[inline]
    pub const fn start(&self) -> u64 {
        self.start
    }

    /// Last byte offset (inclusive)
    #[inline]
    pub const fn end(&self) -> u64 {
        self.end
    }

    /// Number of bytes covered by the range
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value, e.g. `bytes 0-99/1000`
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{size}", self.start, self.end)
    }
}

/// Why a range header could not be turned into a [`ByteRange`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// The request carried no `Range` header at all
    Missing,
    /// Start or end is not a non-negative integer
    Malformed(String),
    /// Well-formed, but outside the resource
    Unsatisfiable { start: u64, end: u64, size: u64 },
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "range required for media type"),
            Self::Malformed(value) => write!(f, "malformed range header: {value:?}"),
            Self::Unsatisfiable { start, end, size } => {
                write!(f, "range {start}-{end} not satisfiable for {size} bytes")
            }
        }
    }
}

impl std::error::Error for RangeError {}

/// Parse the `Range` header of a media request against the resource size.
///
/// Absent headers are reported as [`RangeError::Missing`] so callers can tell
/// them apart from broken ones; both are rejected.
pub fn parse_range_header(
    range_header: Option<&str>,
    size: u64,
) -> Result<ByteRange, RangeError> {
    range_header.map_or(Err(RangeError::Missing), |value| parse_range(value, size))
}

/// Parse a single byte range (bytes unit optional)
///
/// Supported formats:
/// - `bytes=start-end` or `start-end` - Specific range
/// - `bytes=start-` or `start-` - From start to end of file
/// - `bytes=-suffix` or `-suffix` - Last suffix bytes
///
/// An end exactly equal to `size` is accepted and clamped to the last byte.
/// Multi-range values are not supported and fail as malformed.
///
/// # Examples
/// ```
/// use spa_serve::http::range::parse_range;
///
/// let range = parse_range("bytes=0-99", 1000).unwrap();
/// assert_eq!((range.start(), range.end()), (0, 99));
///
/// assert!(parse_range("bytes=900-1001", 1000).is_err());
/// ```
pub fn parse_range(value: &str, size: u64) -> Result<ByteRange, RangeError> {
    let malformed = || RangeError::Malformed(value.to_string());

    let ranges = match value.strip_prefix("bytes") {
        Some(rest) => rest.strip_prefix('=').ok_or_else(malformed)?,
        None => value,
    };

    let (start_str, end_str) = ranges.split_once('-').ok_or_else(malformed)?;
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    let (start, end) = match (start_str.is_empty(), end_str.is_empty()) {
        // "-": neither bound
        (true, true) => return Err(malformed()),
        // Suffix range: "-500" means last 500 bytes
        (true, false) => {
            let suffix = parse_offset(end_str).ok_or_else(malformed)?;
            let start = size.checked_sub(suffix).ok_or(RangeError::Unsatisfiable {
                start: 0,
                end: suffix,
                size,
            })?;
            (start, last_offset(start, size)?)
        }
        // Open-ended range: "200-"
        (false, true) => {
            let start = parse_offset(start_str).ok_or_else(malformed)?;
            (start, last_offset(start, size)?)
        }
        (false, false) => (
            parse_offset(start_str).ok_or_else(malformed)?,
            parse_offset(end_str).ok_or_else(malformed)?,
        ),
    };

    if start > end || end > size {
        return Err(RangeError::Unsatisfiable { start, end, size });
    }

    // end == size passes the bound above; keep the range inside the resource
    let end = end.min(last_offset(start, size)?);
    if start > end {
        return Err(RangeError::Unsatisfiable { start, end, size });
    }

    Ok(ByteRange { start, end })
}

/// Strict decimal offset: digits only, no sign
fn parse_offset(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Offset of the last byte; an empty resource has none
fn last_offset(start: u64, size: u64) -> Result<u64, RangeError> {
    size.checked_sub(1).ok_or(RangeError::Unsatisfiable {
        start,
        end: 0,
        size,
    })
}
