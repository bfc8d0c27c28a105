#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod fs;
pub mod paths;

pub use fs::atomic_write;
pub use paths::{absolutize, is_absolute_specifier, normalize};
