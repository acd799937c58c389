//! HTTP protocol layer module
//!
//! Range parsing, cache validators, MIME lookup, content-encoding and response
//! builders, decoupled from the request handlers that compose them.

pub mod cache;
pub mod encoding;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use cache::{is_fresh, ResourceDescriptor};
pub use encoding::{CompressStream, ContentEncoding};
pub use range::{parse_range, parse_range_header, ByteRange, RangeError};
pub use response::{build_405_response, build_full_response, build_status_response, ResponseBody};
