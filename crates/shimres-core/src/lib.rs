#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod manifest;
pub mod paths;
pub mod resolver;
pub mod shims;

pub use error::Error;
pub use manifest::{Manifest, OverrideMap, ShimTarget};
pub use paths::node_modules_paths;
pub use resolver::{
    resolve, resolve_with, LocateRequest, ModuleLocator, NodeLocator, PackageFilter, Resolved,
    ResolveOptions, DEFAULT_EXTENSIONS,
};
pub use shims::{empty_module_path, load_shims};
