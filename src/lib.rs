//! Static server for a single-page application.
//!
//! Unmatched routes get the HTML shell, stylesheets/scripts/images are served
//! with cache validators and compression, and mp4 media is served as byte
//! ranges.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::Config;
pub use server::Server;
