use std::path::{Path, PathBuf, MAIN_SEPARATOR, MAIN_SEPARATOR_STR};

/// Split a directory string into its segments using the platform separators.
fn segments(raw: &str) -> Vec<&str> {
    const WINDOWS_SEPARATORS: &[char] = &['/', '\\'];
    const UNIX_SEPARATORS: &[char] = &['/'];

    let pattern = if cfg!(windows) {
        WINDOWS_SEPARATORS
    } else {
        UNIX_SEPARATORS
    };
    raw.split(pattern).filter(|s| !s.is_empty()).collect()
}

/// Does the leading segment already root the path, Windows-drive style?
fn is_drive_segment(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Enumerate candidate `node_modules` directories for a starting directory.
///
/// One candidate per ancestor segment, nearest ancestor first, ending with the
/// filesystem-root candidate. Segments literally named `node_modules` emit no
/// candidate of their own. When the leading segment is not a drive letter,
/// every result is re-prefixed with the root separator so it comes out
/// absolute. Pure string work; nothing here touches the filesystem.
///
/// An empty start directory yields no candidates.
#[must_use]
pub fn node_modules_paths(start: &Path) -> Vec<PathBuf> {
    let raw = start.to_string_lossy();
    if raw.is_empty() {
        return Vec::new();
    }

    let parts = segments(&raw);
    let rooted_by_drive = parts.first().is_some_and(|p| is_drive_segment(p));

    let mut dirs = Vec::new();
    for i in (0..parts.len()).rev() {
        if parts[i] == "node_modules" {
            continue;
        }

        let mut dir = parts[..=i].join(MAIN_SEPARATOR_STR);
        dir.push(MAIN_SEPARATOR);
        dir.push_str("node_modules");
        if !rooted_by_drive {
            dir.insert(0, MAIN_SEPARATOR);
        }
        dirs.push(PathBuf::from(dir));
    }

    if !rooted_by_drive {
        dirs.push(PathBuf::from(format!("{MAIN_SEPARATOR}node_modules")));
    }

    dirs
}
