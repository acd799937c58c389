//! Application shell
//!
//! Every route that is neither an asset nor media gets the same HTML document;
//! client-side routing takes it from there.

use crate::config::PathsConfig;
use crate::handler::router::RequestContext;
use crate::http::{self, ResponseBody};
use crate::logger::ServerEvents;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use tokio::fs;

/// Read the shell fresh from disk and send it whole.
///
/// No validators are attached. A read failure becomes a bare 500.
pub async fn serve_shell(
    ctx: &RequestContext<'_>,
    paths: &PathsConfig,
    events: &dyn ServerEvents,
) -> Response<ResponseBody> {
    let shell_path = paths.shell_path();
    match fs::read(&shell_path).await {
        Ok(content) => http::build_full_response(Bytes::from(content), ctx.content_type),
        Err(e) => {
            events.shell_unreadable(&shell_path.display().to_string(), &e);
            http::build_status_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
