//! Request handler module
//!
//! Classifies each request and hands it to one of the responders: static
//! assets, ranged media, or the application shell.

pub mod media;
pub mod path;
pub mod router;
pub mod shell;
pub mod static_files;

// Re-export main entry point
pub use router::{handle_request, RequestClass};
