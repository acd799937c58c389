//! Server lifecycle and request events
//!
//! A server is built with an `Arc<dyn ServerEvents>` and reports everything
//! through it; nothing listens on global hooks. Every callback defaults to a
//! no-op so observers only implement what they care about.

use std::io;
use std::net::SocketAddr;

use super::AccessLogEntry;
use crate::config::LoggingConfig;
use crate::http::RangeError;

pub trait ServerEvents: Send + Sync {
    /// Listener bound and about to accept
    fn listening(&self, _addr: SocketAddr) {}

    fn connection_accepted(&self, _peer: SocketAddr) {}

    /// Dropped because `max_connections` was reached
    fn connection_rejected(&self, _peer: SocketAddr, _active: usize, _max: u64) {}

    /// Transport-level failure: malformed request, timeout, reset
    fn connection_error(&self, _error: &str) {}

    /// Response head produced
    fn request_completed(&self, _entry: &AccessLogEntry) {}

    /// Stat or stream failure that aborts the connection
    fn request_failed(&self, _path: &str, _error: &io::Error) {}

    /// The shell document could not be read; the client got a 500
    fn shell_unreadable(&self, _path: &str, _error: &io::Error) {}

    /// A media request without a usable range; the client got a 500
    fn range_rejected(&self, _path: &str, _error: &RangeError) {}

    fn shutting_down(&self) {}
}

/// Routes every event to the log writer
pub struct LogEvents {
    access_log: bool,
    access_log_format: String,
}

impl LogEvents {
    pub fn new(logging: &LoggingConfig) -> Self {
        Self {
            access_log: logging.access_log,
            access_log_format: logging.access_log_format.clone(),
        }
    }
}

impl ServerEvents for LogEvents {
    fn listening(&self, addr: SocketAddr) {
        super::log_info(&format!("[Server] Listening on port {}", addr.port()));
    }

    fn connection_accepted(&self, peer: SocketAddr) {
        if self.access_log {
            super::log_connection_accepted(&peer);
        }
    }

    fn connection_rejected(&self, peer: SocketAddr, active: usize, max: u64) {
        super::log_warning(&format!(
            "Max connections reached: {active}/{max}. Connection from {peer} rejected."
        ));
    }

    fn connection_error(&self, error: &str) {
        super::log_connection_error(error);
    }

    fn request_completed(&self, entry: &AccessLogEntry) {
        if self.access_log {
            super::log_access(entry, &self.access_log_format);
        }
    }

    fn request_failed(&self, path: &str, error: &io::Error) {
        super::log_error(&format!("Request for {path} failed: {error}"));
    }

    fn shell_unreadable(&self, path: &str, error: &io::Error) {
        super::log_error(&format!("Failed to read shell document '{path}': {error}"));
    }

    fn range_rejected(&self, path: &str, error: &RangeError) {
        super::log_warning(&format!("Rejected range for {path}: {error}"));
    }

    fn shutting_down(&self) {
        super::log_info("[Server] Shutting down");
    }
}
