//! Pipeline variants: source maps, dependency externalization, archive backend.

use std::fmt;

/// Library used to write archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveBackend {
    /// Blocking `zip` writer run on the blocking thread pool.
    #[default]
    Zip,
    /// Streaming `async_zip` writer on the tokio runtime.
    AsyncZip,
}

impl fmt::Display for ArchiveBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zip => f.write_str("zip"),
            Self::AsyncZip => f.write_str("async-zip"),
        }
    }
}

/// Switches that distinguish the supported build flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineVariant {
    /// Emit and archive `.js.map` companions.
    pub include_source_maps: bool,
    /// Exclude declared runtime dependencies from bundles.
    pub externalize_dependencies: bool,
    /// Archive writer.
    pub archive_backend: ArchiveBackend,
}

impl Default for PipelineVariant {
    fn default() -> Self {
        Self {
            include_source_maps: true,
            externalize_dependencies: false,
            archive_backend: ArchiveBackend::Zip,
        }
    }
}
