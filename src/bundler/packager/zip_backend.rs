//! Archive writer backed by the blocking `zip` crate.

use super::{ArchiveEntry, MAX_COMPRESSION_LEVEL, UNIX_FILE_MODE};
use crate::bundler::{Error, ErrorExt, Result};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// Writes `entries` into a new archive at `destination`.
///
/// The blocking writer runs on tokio's blocking pool; this future resolves
/// only after the central directory is written and the file is synced.
pub(super) async fn write_archive(entries: &[ArchiveEntry], destination: &Path) -> Result<()> {
    let entries = entries.to_vec();
    let destination = destination.to_path_buf();

    tokio::task::spawn_blocking(move || write_blocking(&entries, &destination))
        .await
        .map_err(|e| Error::GenericError(format!("archive task panicked: {e}")))?
}

fn write_blocking(entries: &[ArchiveEntry], destination: &Path) -> Result<()> {
    let file = File::create(destination).fs_context("creating archive", destination)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));

    // Fixed timestamp keeps archives byte-identical across runs.
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(MAX_COMPRESSION_LEVEL))
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(UNIX_FILE_MODE);

    for entry in entries {
        let mut source = File::open(&entry.source).fs_context("opening artifact", &entry.source)?;
        zip.start_file(entry.name.as_str(), options)?;
        std::io::copy(&mut source, &mut zip).fs_context("streaming artifact", &entry.source)?;
        log::trace!("Appended {} as {}", entry.source.display(), entry.name);
    }

    let mut writer = zip.finish()?;
    writer.flush().fs_context("flushing archive", destination)?;
    let file = writer
        .into_inner()
        .map_err(|e| e.into_error())
        .fs_context("flushing archive", destination)?;
    file.sync_all().fs_context("syncing archive", destination)?;
    Ok(())
}
