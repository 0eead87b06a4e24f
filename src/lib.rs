//! Multi-entry-point bundler library for deployable handler archives
//!
//! This library turns a set of independent source modules into one zip
//! archive per module:
//! - Resolves the module set (explicit list, index exports, or directory scan)
//! - Bundles every module concurrently with esbuild, failing fast
//! - Packages each bundle and its source map as `<module>.zip`
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
