//! Configuration structures for pipeline runs.
//!
//! This module provides the immutable [`Settings`] consumed by every pipeline
//! stage, the [`SettingsBuilder`] that validates and assembles them, the
//! bundler [`BuildOptions`] with their per-module overrides, and the typed
//! [`PathTemplate`] used to derive entry and output paths from module names.

mod builder;
mod core;
mod options;
mod template;
mod variant;

// Re-export all public types
pub use builder::{
    DEFAULT_ARCHIVE_DIRECTORY, DEFAULT_ENTRY_TEMPLATE, DEFAULT_OUTPUT_TEMPLATE, SettingsBuilder,
};
pub use self::core::Settings;
pub use options::{BuildOptions, BuildOverrides, Platform};
pub use template::{MODULE_PLACEHOLDER, PathTemplate};
pub use variant::{ArchiveBackend, PipelineVariant};
