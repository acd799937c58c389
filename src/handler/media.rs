//! Media serving module
//!
//! Video files are only ever sent as partial content: every response is a 206
//! for a single byte range, streamed straight from disk without compression.

use crate::handler::path;
use crate::handler::router::RequestContext;
use crate::http::response::{header_value, stream_body};
use crate::http::{self, ResponseBody};
use crate::logger::ServerEvents;
use hyper::header::{HeaderValue, ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use std::io::{self, SeekFrom};
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

/// Serve the requested byte range of a media file.
///
/// Stat failures, including a missing file, are returned as errors. A missing
/// or unusable `Range` header is answered with 500 and reported through
/// `events`.
pub async fn serve_range(
    ctx: &RequestContext<'_>,
    static_root: &Path,
    events: &dyn ServerEvents,
) -> io::Result<Response<ResponseBody>> {
    let file_path = path::resolve(static_root, ctx.path);
    let metadata = fs::metadata(&file_path).await?;
    if !metadata.is_file() {
        return Err(io::Error::other(format!(
            "{} is not a regular file",
            file_path.display()
        )));
    }
    let size = metadata.len();

    let mut response = http::build_status_response(StatusCode::PARTIAL_CONTENT);
    response
        .headers_mut()
        .insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));

    let range = match http::parse_range_header(ctx.range(), size) {
        Ok(range) => range,
        Err(e) => {
            events.range_rejected(ctx.path, &e);
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            return Ok(response);
        }
    };

    let mut file = File::open(&file_path).await?;
    file.seek(SeekFrom::Start(range.start())).await?;

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(ctx.content_type));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(range.len()));
    if let Some(v) = header_value(&range.content_range(size)) {
        headers.insert(CONTENT_RANGE, v);
    }

    *response.body_mut() = stream_body(ReaderStream::new(file.take(range.len())));
    Ok(response)
}
