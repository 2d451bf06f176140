//! Path to URL conversion for the engine's load and save entry points.

use std::path::Path;

/// Percent-encodes each segment of `path`, keeping the `/` separators.
///
/// Unreserved characters (`A-Z a-z 0-9 - . _ ~`) pass through; every other
/// byte becomes `%XX`. Relative paths stay relative, which the engine resolves
/// against the working directory.
pub fn encode_path(path: &Path) -> String {
    path.as_os_str()
        .as_encoded_bytes()
        .split(|b| *b == b'/')
        .map(urlencoding::encode_binary)
        .collect::<Vec<_>>()
        .join("/")
}

/// Best-effort check for inputs that were meant to be passed with `--url`.
pub fn looks_like_url(s: &str) -> bool {
    let s = s.to_ascii_lowercase();
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("file://")
}
