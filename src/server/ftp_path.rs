//! Virtual FTP path handling.
//!
//! Clients see a POSIX-style tree rooted at "/" regardless of the host; the
//! functions here normalize client-supplied paths and translate them to local
//! paths under the logged-in user's root. Normalization clamps ".." at the
//! root, so no client input can name anything outside the root.

use std::path::{Path, PathBuf};

/// Resolves a client-supplied path against the current working directory and
/// normalizes it: segments are "/"-separated (on Windows backslashes are
/// accepted too), "." and empty segments vanish, ".." pops. A ".." that would ascend
/// past "/" marks the whole input as an escape attempt, which collapses to
/// "/" — clients get the root, never an error and never anything outside it.
/// The result is absolute with no trailing slash (except "/" itself).
pub fn to_absolute_ftp(cwd: &str, input: &str) -> String {
    // Where the host separator is the backslash, clients send either one.
    let input = if cfg!(windows) { input.replace('\\', "/") } else { input.to_string() };
    let mut segments: Vec<&str> = Vec::new();
    let start = if input.starts_with('/') { "" } else { cwd };
    for segment in start.split('/').chain(input.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return "/".to_string();
                }
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Translates a normalized absolute FTP path to a local path under `root`.
/// "/" maps to the root itself. Roots with or without a trailing separator
/// yield the same result, and ".." segments are ignored outright (a
/// normalized path no longer has any).
pub fn to_local(root: &Path, ftp_path: &str) -> PathBuf {
    let mut local = root.to_path_buf();
    for segment in ftp_path.split('/') {
        match segment {
            "" | "." | ".." => {}
            other => local.push(other),
        }
    }
    local
}

/// Quotes a path for a 257 reply as RFC 959 requires: wrapped in double
/// quotes, with embedded quotes doubled.
pub fn quote_ftp_path(path: &str) -> String {
    format!("\"{}\"", path.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn absolute_input_ignores_cwd() {
        assert_eq!(to_absolute_ftp("/somewhere/else", "/a/b"), "/a/b");
    }

    #[test]
    fn relative_input_joins_cwd() {
        assert_eq!(to_absolute_ftp("/a", "b/c"), "/a/b/c");
        assert_eq!(to_absolute_ftp("/", "b"), "/b");
    }

    #[test]
    fn normalization_drops_dot_and_empty_segments() {
        assert_eq!(to_absolute_ftp("/", "/a//b/./c/"), "/a/b/c");
        assert_eq!(to_absolute_ftp("/", "/a/b/../c/./"), "/a/c");
    }

    #[test]
    fn escape_attempts_collapse_to_root() {
        assert_eq!(to_absolute_ftp("/", "/../../etc"), "/");
        assert_eq!(to_absolute_ftp("/a", "../../.."), "/");
        assert_eq!(to_absolute_ftp("/", ".."), "/");
        // Within-root ".." still resolves normally.
        assert_eq!(to_absolute_ftp("/a/b", ".."), "/a");
    }

    #[cfg(windows)]
    #[test]
    fn backslashes_are_separators() {
        assert_eq!(to_absolute_ftp("/", "a\\b"), "/a/b");
        assert_eq!(to_absolute_ftp("/", "\\a\\..\\b"), "/b");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = to_absolute_ftp("/x/y", "../z/./w/..");
        assert_eq!(to_absolute_ftp("/", &once), once);
    }

    #[test]
    fn local_mapping_stays_under_root() {
        let root = Path::new("/srv/pub");
        assert_eq!(to_local(root, "/"), PathBuf::from("/srv/pub"));
        assert_eq!(to_local(root, "/a/b"), PathBuf::from("/srv/pub/a/b"));
        // Normalized input never contains "..", but stray ones must not escape.
        assert_eq!(to_local(root, "/../a"), PathBuf::from("/srv/pub/a"));
    }

    #[test]
    fn local_mapping_tolerates_trailing_separator_on_root() {
        let with = to_local(Path::new("/srv/pub/"), "/a");
        let without = to_local(Path::new("/srv/pub"), "/a");
        assert_eq!(with, without);
    }

    #[test]
    fn quoting_doubles_embedded_quotes() {
        assert_eq!(quote_ftp_path("/"), "\"/\"");
        assert_eq!(quote_ftp_path("/a \"b\""), "\"/a \"\"b\"\"\"");
    }
}
