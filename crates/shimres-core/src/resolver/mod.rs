//! Resolution orchestration.
//!
//! Ties the pieces together: compute the search roots, load the nearest
//! ancestor's shims, apply identifier- and path-keyed overrides, and delegate
//! the actual file probing to a [`ModuleLocator`] armed with the main-entry
//! rewrite hook.

mod node;

pub use node::NodeLocator;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::error::Error;
use crate::manifest::{self, Manifest, ShimTarget};
use crate::paths::node_modules_paths;
use crate::shims;

/// Extensions probed by the built-in locator when none are supplied.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".js", ".json"];

/// Caller-supplied manifest rewrite hook, applied before the built-in
/// main-entry rewrite.
pub type PackageFilter = Arc<dyn Fn(Value, &Path) -> Value + Send + Sync>;

/// Options for a single resolution request.
#[derive(Clone, Default)]
pub struct ResolveOptions {
    /// Absolute path of the requesting file. Required.
    pub filename: PathBuf,
    /// Extra search roots, appended after the ancestor walk (lowest
    /// precedence).
    pub paths: Vec<PathBuf>,
    /// Explicit identifier-to-path overrides, checked after manifest shims
    /// but before any filesystem search.
    pub modules: HashMap<String, PathBuf>,
    /// Extensions to probe; empty means [`DEFAULT_EXTENSIONS`].
    pub extensions: Vec<String>,
    /// Pre-known owning package, passed through on shim hits.
    pub package: Option<Manifest>,
    /// Caller manifest-rewrite hook, composed with the built-in main rewrite.
    pub package_filter: Option<PackageFilter>,
}

/// Outcome of a resolution: the file to load and its owning manifest.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Resolved absolute file path.
    pub path: PathBuf,
    /// Manifest of the package that owns the file, when one was involved.
    pub package: Option<Manifest>,
}

/// File-probing resolution service consumed by the orchestrator.
///
/// Behind a trait so tests can script outcomes and so a bundler can bring its
/// own path resolution.
pub trait ModuleLocator {
    /// Locate the file for a (possibly shim-rewritten) specifier.
    ///
    /// # Errors
    /// [`Error::NotFound`] when nothing matches the specifier.
    fn locate(&self, specifier: &str, request: &LocateRequest<'_>) -> Result<Resolved, Error>;
}

/// Inputs handed to a [`ModuleLocator`].
pub struct LocateRequest<'a> {
    /// Directory of the requesting file.
    pub basedir: &'a Path,
    /// Extra search roots, lowest precedence.
    pub extra_paths: &'a [PathBuf],
    /// Extensions to probe, in order.
    pub extensions: &'a [String],
    /// Pre-known owning package.
    pub package: Option<&'a Manifest>,
    /// Rewrite applied to every candidate manifest before its main entry is
    /// consulted.
    pub manifest_filter: &'a dyn Fn(Value, &Path) -> Value,
}

/// Resolve `id` from the file in `options.filename`, honoring manifest shims.
///
/// # Errors
/// Fails on unreadable or malformed manifests and when nothing matches the
/// (possibly rewritten) identifier. Failures are terminal for this call only.
pub async fn resolve(id: &str, options: &ResolveOptions) -> Result<Resolved, Error> {
    resolve_with(&NodeLocator, id, options).await
}

/// Resolve with a caller-chosen locator.
///
/// # Errors
/// Same contract as [`resolve`].
pub async fn resolve_with<L: ModuleLocator>(
    locator: &L,
    id: &str,
    options: &ResolveOptions,
) -> Result<Resolved, Error> {
    let base = options
        .filename
        .parent()
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let mut candidates = node_modules_paths(&base);
    candidates.extend(options.paths.iter().cloned());

    // Shims are read from the node_modules-free roots, which is also what the
    // locator wants as search dirs.
    let search_dirs: Vec<PathBuf> = candidates
        .iter()
        .map(|p| p.parent().map_or_else(|| p.clone(), Path::to_path_buf))
        .collect();

    // Always loaded, even when `id` itself has no shim: an override may target
    // a module only reached through the locator below.
    let shims = shims::load_shims(&search_dirs).await?;

    let mut id = id.to_string();
    match shims.get(&id) {
        Some(ShimTarget::Empty) => {
            return Ok(Resolved {
                path: shims::empty_module_path()?,
                package: options.package.clone(),
            });
        }
        Some(ShimTarget::Path(path)) => {
            // Already fully resolved during normalization.
            return Ok(Resolved {
                path: path.clone(),
                package: options.package.clone(),
            });
        }
        Some(ShimTarget::Module(next)) => {
            // Module-to-module re-route; the rewritten identifier gets no
            // second shim lookup within this call.
            id = next.clone();
        }
        None => {}
    }

    if let Some(path) = options.modules.get(&id) {
        return Ok(Resolved {
            path: path.clone(),
            package: None,
        });
    }

    let caller_filter = options.package_filter.clone();
    let filter = move |data: Value, pkg_dir: &Path| {
        let data = match &caller_filter {
            Some(f) => f(data, pkg_dir),
            None => data,
        };
        manifest::rewrite_main(data, pkg_dir)
    };

    let default_extensions: Vec<String>;
    let extensions: &[String] = if options.extensions.is_empty() {
        default_extensions = DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect();
        &default_extensions
    } else {
        &options.extensions
    };

    let request = LocateRequest {
        basedir: &base,
        extra_paths: &options.paths,
        extensions,
        package: options.package.as_ref(),
        manifest_filter: &filter,
    };
    let located = locator.locate(&id, &request)?;

    // Second, path-keyed check: a shim can disable or redirect a file that
    // only became known after full resolution (e.g. a package's entry file).
    if let Some(target) = shims.get_path(&located.path) {
        let path = match target {
            ShimTarget::Empty => shims::empty_module_path()?,
            ShimTarget::Path(path) => path.clone(),
            // Substituted verbatim, never re-resolved.
            ShimTarget::Module(name) => PathBuf::from(name),
        };
        return Ok(Resolved {
            path,
            package: located.package,
        });
    }

    Ok(located)
}
