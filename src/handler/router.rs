//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, classification
//! of the path into one of the response strategies, and dispatch.

use crate::config::AppState;
use crate::handler::{media, shell, static_files};
use crate::http::{self, mime, ResponseBody};
use crate::logger::AccessLogEntry;
use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, RANGE, REFERER,
    USER_AGENT,
};
use hyper::{Method, Request, Response, StatusCode};
use std::io;
use std::net::SocketAddr;
use std::time::Instant;

/// Path that always answers 404, whatever is on disk
pub const FAVICON_PATH: &str = "/favicon.ico";

/// Extensions served as static assets (exact, case-sensitive match)
pub const STATIC_ASSET_EXTENSIONS: &[&str] = &["css", "js", "jpeg", "gif", "jpg", "png"];

/// Extensions served with byte ranges
pub const MEDIA_EXTENSIONS: &[&str] = &["mp4"];

/// Response strategy for a request, resolved once from its path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    Favicon,
    StaticAsset,
    Media,
    Shell,
}

impl RequestClass {
    pub fn from_path(path: &str) -> Self {
        if path == FAVICON_PATH {
            return Self::Favicon;
        }
        match extension(path) {
            Some(ext) if STATIC_ASSET_EXTENSIONS.contains(&ext) => Self::StaticAsset,
            Some(ext) if MEDIA_EXTENSIONS.contains(&ext) => Self::Media,
            _ => Self::Shell,
        }
    }
}

/// Extension of the last path segment, without the dot
pub fn extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next().unwrap_or(path);
    segment.rsplit_once('.').map(|(_, ext)| ext)
}

/// Content-Type for a request path
///
/// Mapped extensions use the table, unmapped ones fall back to `text/plain`.
/// `/` and extension-less routes are the HTML shell.
pub fn content_type(path: &str) -> &'static str {
    if path == "/" {
        return mime::HTML_CONTENT_TYPE;
    }
    extension(path).map_or(mime::HTML_CONTENT_TYPE, |ext| {
        mime::content_type_for(ext).unwrap_or(mime::DEFAULT_CONTENT_TYPE)
    })
}

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub class: RequestClass,
    pub content_type: &'static str,
    pub headers: &'a HeaderMap,
}

impl RequestContext<'_> {
    fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn range(&self) -> Option<&str> {
        self.header(&RANGE)
    }

    pub fn accept_encoding(&self) -> Option<&str> {
        self.header(&ACCEPT_ENCODING)
    }
}

/// Main entry point for HTTP request handling
///
/// Only the head of the request is consulted. Stat and stream failures come
/// back as `Err` so the connection is aborted instead of answered.
pub async fn handle_request<B>(
    req: Request<B>,
    state: &AppState,
    remote_addr: SocketAddr,
) -> io::Result<Response<ResponseBody>> {
    let started = Instant::now();
    let path = req.uri().path();

    let result = match check_http_method(req.method()) {
        Some(resp) => Ok(resp),
        None => {
            let ctx = RequestContext {
                path,
                class: RequestClass::from_path(path),
                content_type: content_type(path),
                headers: req.headers(),
            };
            route_request(&ctx, state).await
        }
    };

    match &result {
        Ok(response) => {
            let entry = access_log_entry(&req, response, remote_addr, started);
            state.events.request_completed(&entry);
        }
        Err(e) => state.events.request_failed(path, e),
    }
    result
}

/// Only GET and HEAD are served
fn check_http_method(method: &Method) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        _ => Some(http::build_405_response()),
    }
}

/// Dispatch on the request class
async fn route_request(
    ctx: &RequestContext<'_>,
    state: &AppState,
) -> io::Result<Response<ResponseBody>> {
    let paths = &state.config.paths;
    match ctx.class {
        RequestClass::Favicon => Ok(favicon_response(ctx.content_type)),
        RequestClass::StaticAsset => static_files::serve_asset(ctx, &paths.static_root).await,
        RequestClass::Media => {
            media::serve_range(ctx, &paths.static_root, state.events.as_ref()).await
        }
        RequestClass::Shell => Ok(shell::serve_shell(ctx, paths, state.events.as_ref()).await),
    }
}

fn favicon_response(content_type: &'static str) -> Response<ResponseBody> {
    let mut response = http::build_status_response(StatusCode::NOT_FOUND);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn access_log_entry<B>(
    req: &Request<B>,
    response: &Response<ResponseBody>,
    remote_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version()).trim_start_matches("HTTP/").to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}
