//! Request path resolution
//!
//! Maps a URL path onto a file below a document root.

use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};

/// Resolve `url_path` below `root`.
///
/// The path is percent-decoded and only normal components are kept, so `..`,
/// root and prefix components can never climb out of `root`.
pub fn resolve(root: &Path, url_path: &str) -> PathBuf {
    let decoded = percent_decode_str(url_path).decode_utf8_lossy();

    let relative: PathBuf = Path::new(decoded.as_ref())
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();

    root.join(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path() {
        assert_eq!(
            resolve(Path::new("/srv/res"), "/css/style.css"),
            PathBuf::from("/srv/res/css/style.css")
        );
    }

    #[test]
    fn test_parent_components_dropped() {
        assert_eq!(
            resolve(Path::new("/srv/res"), "/../../etc/passwd.css"),
            PathBuf::from("/srv/res/etc/passwd.css")
        );
        assert_eq!(
            resolve(Path::new("/srv/res"), "/img/%2e%2e/%2e%2e/secret.png"),
            PathBuf::from("/srv/res/img/secret.png")
        );
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(
            resolve(Path::new("res"), "/my%20photo.jpg"),
            PathBuf::from("res/my photo.jpg")
        );
    }
}
