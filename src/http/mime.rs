//! MIME type detection module
//!
//! Returns the corresponding Content-Type based on file extension.

/// Content-Type used when an extension is not in the table
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Content-Type for the application shell
pub const HTML_CONTENT_TYPE: &str = "text/html";

/// Get MIME Content-Type based on file extension
///
/// Matching is case-sensitive, like the request classification.
///
/// # Examples
/// ```
/// use spa_serve::http::mime::content_type_for;
/// assert_eq!(content_type_for("css"), Some("text/css"));
/// assert_eq!(content_type_for("mp4"), Some("video/mp4"));
/// assert_eq!(content_type_for("unknown"), None);
/// ```
pub fn content_type_for(extension: &str) -> Option<&'static str> {
    let content_type = match extension {
        // Text
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "txt" | "md" => "text/plain",
        "xml" => "application/xml",

        // JavaScript/WASM
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",

        // Video
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogg" | "ogv" => "video/ogg",

        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        // Documents
        "pdf" => "application/pdf",
        "zip" => "application/zip",

        _ => return None,
    };
    Some(content_type)
}
