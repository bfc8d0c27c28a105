//! Lexical path helpers.
//!
//! These operate on path *strings* without touching the file system, because
//! override keys and targets from manifests must be normalized and absolutized
//! even when they point at files that do not exist.

use std::path::{Path, PathBuf, MAIN_SEPARATOR, MAIN_SEPARATOR_STR};

/// Split a path string into segments using the platform's separators.
///
/// Windows accepts both `/` and `\`; elsewhere only `/` separates.
fn segments(path: &str) -> impl Iterator<Item = &str> {
    const WINDOWS_SEPARATORS: &[char] = &['/', '\\'];
    const UNIX_SEPARATORS: &[char] = &['/'];

    let pattern = if cfg!(windows) {
        WINDOWS_SEPARATORS
    } else {
        UNIX_SEPARATORS
    };
    path.split(pattern)
}

/// Check whether a specifier string denotes an absolute path.
///
/// Recognizes Unix roots, Windows drive letters (`C:\` or `C:/`), and UNC
/// prefixes (`\\server\share`).
#[must_use]
pub fn is_absolute_specifier(spec: &str) -> bool {
    if spec.starts_with('/') {
        return true;
    }

    let bytes = spec.as_bytes();
    if bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
    {
        return true;
    }

    spec.starts_with("\\\\")
}

/// Lexically normalize a path string.
///
/// Collapses repeated separators, resolves `.` and `..` segments without
/// consulting the file system, rewrites separators to the platform's canonical
/// one, and drops any `./` prefix. An empty result becomes `.`.
#[must_use]
pub fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/') || (cfg!(windows) && path.starts_with('\\'));

    let mut out: Vec<&str> = Vec::new();
    for seg in segments(path) {
        match seg {
            "" | "." => {}
            ".." => {
                // Leading `..` segments survive on relative paths; on absolute
                // paths they cannot climb past the root.
                if matches!(out.last(), Some(&"..")) || (out.is_empty() && !absolute) {
                    out.push("..");
                } else {
                    out.pop();
                }
            }
            seg => out.push(seg),
        }
    }

    let mut joined = out.join(MAIN_SEPARATOR_STR);
    if absolute {
        joined.insert(0, MAIN_SEPARATOR);
    }
    if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Resolve `target` against `base`, normalizing the result lexically.
///
/// An already-absolute target is normalized in place; anything else is joined
/// onto `base` first. Mirrors `path.resolve` semantics without filesystem
/// access.
#[must_use]
pub fn absolutize(base: &Path, target: &str) -> PathBuf {
    if is_absolute_specifier(target) {
        return PathBuf::from(normalize(target));
    }

    let joined = format!("{}{}{}", base.display(), MAIN_SEPARATOR, target);
    PathBuf::from(normalize(&joined))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_dot_prefix() {
        assert_eq!(normalize("./alt.js"), "alt.js");
        assert_eq!(normalize("./lib/./main.js"), "lib/main.js");
    }

    #[test]
    fn test_normalize_collapses_separators() {
        assert_eq!(normalize("a//b///c"), "a/b/c");
    }

    #[test]
    fn test_normalize_resolves_parent_segments() {
        assert_eq!(normalize("/a/../b"), "/b");
        assert_eq!(normalize("a/b/../c"), "a/c");
        assert_eq!(normalize("../x"), "../x");
        assert_eq!(normalize("/.."), "/");
    }

    #[test]
    fn test_normalize_empty_is_dot() {
        assert_eq!(normalize(""), ".");
        assert_eq!(normalize("."), ".");
    }

    #[test]
    fn test_is_absolute_specifier() {
        assert!(is_absolute_specifier("/usr/lib"));
        assert!(is_absolute_specifier("C:\\projects"));
        assert!(is_absolute_specifier("c:/projects"));
        assert!(is_absolute_specifier("\\\\server\\share"));
        assert!(!is_absolute_specifier("./rel"));
        assert!(!is_absolute_specifier("lodash"));
    }

    #[test]
    fn test_absolutize_relative_target() {
        let base = Path::new("/pkg/root");
        assert_eq!(absolutize(base, "./alt.js"), PathBuf::from("/pkg/root/alt.js"));
        assert_eq!(absolutize(base, "../up.js"), PathBuf::from("/pkg/up.js"));
    }

    #[test]
    fn test_absolutize_absolute_target_untouched_by_base() {
        let base = Path::new("/pkg/root");
        assert_eq!(absolutize(base, "/etc//hosts"), PathBuf::from("/etc/hosts"));
    }
}
