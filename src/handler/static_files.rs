//! Static asset serving module
//!
//! Serves stylesheets, scripts and images from the static root with cache
//! validators, conditional 304 responses and on-the-fly compression.

use crate::handler::path;
use crate::handler::router::RequestContext;
use crate::http::response::{header_value, stream_body};
use crate::http::{self, CompressStream, ContentEncoding, ResourceDescriptor, ResponseBody};
use hyper::header::{
    HeaderValue, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, ETAG, LAST_MODIFIED, VARY,
};
use hyper::{Response, StatusCode};
use std::io;
use std::path::Path;
use tokio::fs::{self, File};
use tokio_util::io::ReaderStream;

/// Serve one static asset.
///
/// A missing file or a directory is a 404. Any other stat or open failure is
/// returned to the caller.
pub async fn serve_asset(
    ctx: &RequestContext<'_>,
    static_root: &Path,
) -> io::Result<Response<ResponseBody>> {
    let file_path = path::resolve(static_root, ctx.path);

    let metadata = match fs::metadata(&file_path).await {
        Ok(m) if m.is_file() => m,
        Ok(_) => return Ok(http::build_status_response(StatusCode::NOT_FOUND)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(http::build_status_response(StatusCode::NOT_FOUND));
        }
        Err(e) => return Err(e),
    };
    let descriptor = ResourceDescriptor::from_metadata(&metadata)?;

    // Validators and Vary go on first so a 304 carries them too
    let mut response = http::build_status_response(StatusCode::OK);
    let headers = response.headers_mut();
    if let Some(v) = header_value(&descriptor.etag()) {
        headers.insert(ETAG, v);
    }
    if let Some(v) = header_value(&descriptor.last_modified()) {
        headers.insert(LAST_MODIFIED, v);
    }
    headers.insert(VARY, HeaderValue::from_static("Accept-Encoding"));

    if http::is_fresh(ctx.headers, headers) {
        *response.status_mut() = StatusCode::NOT_MODIFIED;
        return Ok(response);
    }

    let file = File::open(&file_path).await?;
    let encoding = ContentEncoding::negotiate(ctx.accept_encoding());

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(ctx.content_type));
    match encoding.header_value() {
        Some(coding) => {
            headers.insert(CONTENT_ENCODING, HeaderValue::from_static(coding));
        }
        None => {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(descriptor.size));
        }
    }

    let stream = CompressStream::new(ReaderStream::new(file), encoding);
    *response.body_mut() = stream_body(stream);
    Ok(response)
}
