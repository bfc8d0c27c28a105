//! Shim loading: find the nearest ancestor manifest and build its override map.

use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;

use serde_json::Value;

use crate::error::Error;
use crate::manifest::{self, Manifest, OverrideMap};

/// Contents of the built-in no-op module.
const EMPTY_MODULE_SOURCE: &[u8] = b"// stands in for modules disabled by an override\n";

/// Walk `search_dirs` in order and build the override map from the first
/// manifest found.
///
/// Directories without a `package.json` are skipped. The first directory that
/// has one terminates the walk: either its override fields normalize into a
/// map, or the absence of both fields is a definitive "no overrides" — a
/// farther ancestor's declarations must not leak past a nearer manifest.
/// An exhausted list yields an empty map.
///
/// # Errors
/// A manifest that exists but cannot be read or parsed fails the whole load;
/// parse failures carry the offending file's path.
pub async fn load_shims(search_dirs: &[PathBuf]) -> Result<OverrideMap, Error> {
    for dir in search_dirs {
        let manifest_path = dir.join("package.json");

        let raw = match tokio::fs::read_to_string(&manifest_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(source) => {
                return Err(Error::ManifestRead {
                    path: manifest_path,
                    source,
                })
            }
        };

        let data: Value = serde_json::from_str(&raw).map_err(|source| Error::ManifestParse {
            path: manifest_path.clone(),
            source,
        })?;

        let found = Manifest::new(manifest_path, data);
        return Ok(manifest::override_map(&found).unwrap_or_default());
    }

    Ok(OverrideMap::default())
}

/// Absolute path of the built-in empty module, materialized on first use.
///
/// Override targets of `false` resolve here, so the consuming bundler gets a
/// real file to read. Lives under the platform cache directory; written
/// atomically so concurrent resolutions never observe a partial file.
pub fn empty_module_path() -> io::Result<PathBuf> {
    static PATH: OnceLock<PathBuf> = OnceLock::new();
    if let Some(path) = PATH.get() {
        return Ok(path.clone());
    }

    let base = dirs_next::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("shimres");
    std::fs::create_dir_all(&base)?;

    let path = base.join("empty.js");
    if !path.is_file() {
        shimres_util::atomic_write(&path, EMPTY_MODULE_SOURCE)?;
    }

    Ok(PATH.get_or_init(|| path).clone())
}
