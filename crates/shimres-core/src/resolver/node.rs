//! Built-in node-style path resolution.
//!
//! Relative, absolute, and bare specifiers with extension probing and
//! directory resolution through package.json `main`. Every manifest read here
//! passes through the request's rewrite hook before `main` is consulted, so
//! overrides apply to packages discovered mid-resolution too.

use std::path::{Path, PathBuf};

use serde_json::Value;
use shimres_util::is_absolute_specifier;

use super::{LocateRequest, ModuleLocator, Resolved};
use crate::error::Error;
use crate::manifest::Manifest;
use crate::paths::node_modules_paths;

/// Default locator: probes the filesystem the way node's require does.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeLocator;

impl ModuleLocator for NodeLocator {
    fn locate(&self, specifier: &str, request: &LocateRequest<'_>) -> Result<Resolved, Error> {
        let hit = if is_relative(specifier) {
            locate_in(&request.basedir.join(specifier), request)?
        } else if is_absolute_specifier(specifier) {
            locate_in(Path::new(specifier), request)?
        } else {
            locate_bare(specifier, request)?
        };

        hit.ok_or_else(|| Error::NotFound {
            specifier: specifier.to_string(),
            base: request.basedir.to_path_buf(),
        })
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// File first, then directory resolution.
fn locate_in(base: &Path, request: &LocateRequest<'_>) -> Result<Option<Resolved>, Error> {
    if let Some(path) = probe_file(base, request.extensions) {
        return Ok(Some(Resolved {
            path,
            package: request.package.cloned(),
        }));
    }
    locate_directory(base, request)
}

/// Exact path, then extension-appending probes.
fn probe_file(base: &Path, extensions: &[String]) -> Option<PathBuf> {
    if base.is_file() {
        return Some(finish(base));
    }

    for ext in extensions {
        let candidate = PathBuf::from(format!("{}{ext}", base.display()));
        if candidate.is_file() {
            return Some(finish(&candidate));
        }
    }

    None
}

fn probe_index(dir: &Path, extensions: &[String]) -> Option<PathBuf> {
    for ext in extensions {
        let index = dir.join(format!("index{ext}"));
        if index.is_file() {
            return Some(finish(&index));
        }
    }
    None
}

fn finish(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Directory resolution: filtered package.json `main`, then `index.*`.
fn locate_directory(dir: &Path, request: &LocateRequest<'_>) -> Result<Option<Resolved>, Error> {
    let manifest_path = dir.join("package.json");
    let mut owner = request.package.cloned();

    if manifest_path.is_file() {
        let raw = std::fs::read_to_string(&manifest_path).map_err(|source| Error::ManifestRead {
            path: manifest_path.clone(),
            source,
        })?;
        let data: Value = serde_json::from_str(&raw).map_err(|source| Error::ManifestParse {
            path: manifest_path.clone(),
            source,
        })?;

        let data = (request.manifest_filter)(data, dir);
        let found = Manifest::new(manifest_path, data);

        if let Some(main) = found.main().map(str::to_string) {
            let main_path = dir.join(&main);
            if let Some(path) = probe_file(&main_path, request.extensions) {
                return Ok(Some(Resolved {
                    path,
                    package: Some(found),
                }));
            }
            // A main pointing at a directory resolves through its index.
            if let Some(path) = probe_index(&main_path, request.extensions) {
                return Ok(Some(Resolved {
                    path,
                    package: Some(found),
                }));
            }
        }

        owner = Some(found);
    }

    Ok(probe_index(dir, request.extensions).map(|path| Resolved {
        path,
        package: owner,
    }))
}

/// Bare specifiers: walk the `node_modules` candidates, extra roots appended.
fn locate_bare(specifier: &str, request: &LocateRequest<'_>) -> Result<Option<Resolved>, Error> {
    let mut dirs = node_modules_paths(request.basedir);
    dirs.extend(request.extra_paths.iter().cloned());

    for dir in dirs {
        if !dir.is_dir() {
            continue;
        }
        if let Some(hit) = locate_in(&dir.join(specifier), request)? {
            return Ok(Some(hit));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn identity(data: Value, _dir: &Path) -> Value {
        data
    }

    static IDENTITY_FILTER: fn(Value, &Path) -> Value = identity;

    fn extensions() -> Vec<String> {
        vec![".js".to_string(), ".json".to_string()]
    }

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn request<'a>(basedir: &'a Path, extensions: &'a [String]) -> LocateRequest<'a> {
        LocateRequest {
            basedir,
            extra_paths: &[],
            extensions,
            package: None,
            manifest_filter: &IDENTITY_FILTER,
        }
    }

    #[test]
    fn test_relative_exact_file() {
        let dir = tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        write(&root.join("dep.js"), "module.exports = 1;");

        let exts = extensions();
        let hit = NodeLocator.locate("./dep.js", &request(&root, &exts)).unwrap();
        assert_eq!(hit.path, root.join("dep.js"));
    }

    #[test]
    fn test_relative_extension_appending() {
        let dir = tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        // Extension probes append rather than replace, so a dotted stem
        // still finds its .js sibling.
        write(&root.join("dep.min.js"), "module.exports = 1;");

        let exts = extensions();
        let hit = NodeLocator.locate("./dep.min", &request(&root, &exts)).unwrap();
        assert_eq!(hit.path, root.join("dep.min.js"));
    }

    #[test]
    fn test_directory_index_fallback() {
        let dir = tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        write(&root.join("utils/index.js"), "module.exports = 1;");

        let exts = extensions();
        let hit = NodeLocator.locate("./utils", &request(&root, &exts)).unwrap();
        assert_eq!(hit.path, root.join("utils/index.js"));
    }

    #[test]
    fn test_bare_specifier_through_node_modules() {
        let dir = tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        write(
            &root.join("node_modules/dep/package.json"),
            r#"{"name": "dep", "main": "./entry.js"}"#,
        );
        write(&root.join("node_modules/dep/entry.js"), "module.exports = 1;");

        let exts = extensions();
        let hit = NodeLocator.locate("dep", &request(&root, &exts)).unwrap();
        assert_eq!(hit.path, root.join("node_modules/dep/entry.js"));
        assert_eq!(hit.package.as_ref().and_then(Manifest::name), Some("dep"));
    }

    #[test]
    fn test_bare_subpath_specifier() {
        let dir = tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        write(&root.join("node_modules/dep/lib/util.js"), "module.exports = 1;");

        let exts = extensions();
        let hit = NodeLocator
            .locate("dep/lib/util", &request(&root, &exts))
            .unwrap();
        assert_eq!(hit.path, root.join("node_modules/dep/lib/util.js"));
    }

    #[test]
    fn test_manifest_filter_sees_every_candidate_manifest() {
        let dir = tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        write(
            &root.join("node_modules/dep/package.json"),
            r#"{"name": "dep", "main": "./a.js"}"#,
        );
        write(&root.join("node_modules/dep/b.js"), "module.exports = 'b';");

        let rewrite = |mut data: Value, _dir: &Path| {
            if let Value::Object(map) = &mut data {
                map.insert("main".to_string(), Value::String("./b.js".to_string()));
            }
            data
        };
        let exts = extensions();
        let req = LocateRequest {
            basedir: &root,
            extra_paths: &[],
            extensions: &exts,
            package: None,
            manifest_filter: &rewrite,
        };
        let hit = NodeLocator.locate("dep", &req).unwrap();
        assert_eq!(hit.path, root.join("node_modules/dep/b.js"));
    }

    #[test]
    fn test_missing_module_is_not_found() {
        let dir = tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();

        let exts = extensions();
        let err = NodeLocator.locate("ghost", &request(&root, &exts)).unwrap_err();
        match err {
            Error::NotFound { specifier, base } => {
                assert_eq!(specifier, "ghost");
                assert_eq!(base, root);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
