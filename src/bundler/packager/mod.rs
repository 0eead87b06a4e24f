//! Per-module archive creation.
//!
//! Each [`BuildResult`] becomes one `<module>.zip` holding the bundle as
//! `<module>.js` and, when the build produced one, the map as
//! `<module>.js.map`. Internal names never depend on where the bundler wrote
//! its output, so archive contents are stable across build configurations.
//!
//! Archives are written to a uniquely named `.partial` file first and renamed
//! into place only after the writer has finalized, flushed and synced. A file
//! at `<module>.zip` is therefore always a complete archive.

mod async_zip_backend;
mod checksum;
mod zip_backend;

pub use checksum::calculate_sha256;

use crate::bundler::{
    ArchiveBackend, BuildResult, Context, Error, ErrorExt, Result, Settings, error::not_found,
};
use std::path::{Path, PathBuf};

/// Deflate level used for every entry.
pub const MAX_COMPRESSION_LEVEL: i64 = 9;

/// Permission bits recorded for archived files.
pub const UNIX_FILE_MODE: u32 = 0o644;

/// File extension of produced archives.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// One file appended to an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// File on disk.
    pub source: PathBuf,
    /// Name inside the archive.
    pub name: String,
}

/// Everything needed to write one module's archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveJob {
    /// Module the archive belongs to.
    pub module_name: String,
    /// Entries in append order: bundle first, then map.
    pub entries: Vec<ArchiveEntry>,
    /// Final archive path.
    pub destination: PathBuf,
}

impl ArchiveJob {
    /// Derives the job for `result`, placing the archive in `archive_directory`.
    pub fn from_result(result: &BuildResult, archive_directory: &Path) -> Self {
        let name = &result.module_name;
        let mut entries = vec![ArchiveEntry {
            source: result.output_path.clone(),
            name: format!("{name}.js"),
        }];
        if let Some(map) = &result.map_path {
            entries.push(ArchiveEntry {
                source: map.clone(),
                name: format!("{name}.js.map"),
            });
        }

        Self {
            module_name: name.clone(),
            entries,
            destination: archive_directory.join(format!("{name}.{ARCHIVE_EXTENSION}")),
        }
    }
}

/// A finalized archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedArchive {
    /// Module the archive belongs to.
    pub module_name: String,
    /// Archive path.
    pub path: PathBuf,
    /// Archive size in bytes.
    pub size: u64,
    /// Hex-encoded SHA-256 of the archive.
    pub checksum: String,
    /// Internal entry names in order.
    pub entries: Vec<String>,
}

/// Writes module archives with the configured backend.
#[derive(Debug, Clone)]
pub struct Packager {
    backend: ArchiveBackend,
    archive_directory: PathBuf,
}

impl Packager {
    /// Creates a packager writing into `archive_directory`.
    pub fn new(backend: ArchiveBackend, archive_directory: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            archive_directory: archive_directory.into(),
        }
    }

    /// Creates a packager from pipeline settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.archive_backend(), settings.archive_directory())
    }

    /// Directory archives are written to.
    pub fn archive_directory(&self) -> &Path {
        &self.archive_directory
    }

    /// Packages one build result.
    ///
    /// # Errors
    ///
    /// [`Error::Packaging`] naming the module when an artifact is missing or
    /// unreadable, or the archive cannot be written.
    pub async fn package(&self, result: &BuildResult) -> Result<PackagedArchive> {
        let job = ArchiveJob::from_result(result, &self.archive_directory);
        self.package_job(&job)
            .await
            .map_err(|source| Error::Packaging {
                module: result.module_name.clone(),
                source: Box::new(source),
            })
    }

    async fn package_job(&self, job: &ArchiveJob) -> Result<PackagedArchive> {
        for entry in &job.entries {
            let metadata = tokio::fs::metadata(&entry.source)
                .await
                .fs_context("reading artifact metadata", &entry.source)?;
            if !metadata.is_file() {
                return Err(not_found("artifact is not a regular file", &entry.source));
            }
        }

        tokio::fs::create_dir_all(&self.archive_directory)
            .await
            .fs_context("creating archive directory", &self.archive_directory)?;

        let partial = partial_path(&job.destination);
        log::debug!(
            "Writing {} with {} backend",
            job.destination.display(),
            self.backend
        );

        let written = match self.backend {
            ArchiveBackend::Zip => zip_backend::write_archive(&job.entries, &partial).await,
            ArchiveBackend::AsyncZip => {
                async_zip_backend::write_archive(&job.entries, &partial).await
            }
        };
        let finalized = match written {
            Ok(()) => finalize(&partial, &job.destination).await,
            Err(e) => Err(e),
        };
        let (size, checksum) = match finalized {
            Ok(summary) => summary,
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    log::debug!("Could not remove {}: {}", partial.display(), cleanup);
                }
                return Err(e);
            }
        };

        log::info!(
            "Packaged {} ({} bytes, sha256 {})",
            job.destination.display(),
            size,
            checksum
        );

        Ok(PackagedArchive {
            module_name: job.module_name.clone(),
            path: job.destination.clone(),
            size,
            checksum,
            entries: job.entries.iter().map(|e| e.name.clone()).collect(),
        })
    }
}

/// Measures and hashes a written `partial` archive, then renames it to
/// `destination`. Nothing appears at `destination` unless both succeeded.
async fn finalize(partial: &Path, destination: &Path) -> Result<(u64, String)> {
    let size = tokio::fs::metadata(partial)
        .await
        .fs_context("reading archive metadata", partial)?
        .len();
    let checksum = calculate_sha256(partial)
        .await
        .context("computing archive checksum")?;
    tokio::fs::rename(partial, destination)
        .await
        .fs_context("moving archive into place", destination)?;
    Ok((size, checksum))
}

/// Unique sibling path used while an archive is being written.
fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.partial", uuid::Uuid::new_v4()));
    destination.with_file_name(name)
}
