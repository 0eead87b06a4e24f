//! Archive writer backed by `async_zip`, streaming on the tokio runtime.

use super::{ArchiveEntry, UNIX_FILE_MODE};
use crate::bundler::{ErrorExt, Result};
use async_zip::{Compression, DeflateOption, ZipEntryBuilder, tokio::write::ZipFileWriter};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tokio_util::compat::TokioAsyncReadCompatExt;

/// Streams `entries` into a new archive at `destination`.
///
/// Each artifact is copied chunk by chunk into its entry; the future resolves
/// after the central directory is written and the file is flushed and synced.
pub(super) async fn write_archive(entries: &[ArchiveEntry], destination: &Path) -> Result<()> {
    let file = tokio::fs::File::create(destination)
        .await
        .fs_context("creating archive", destination)?;
    let mut writer = ZipFileWriter::with_tokio(file);

    for entry in entries {
        let source = tokio::fs::File::open(&entry.source)
            .await
            .fs_context("opening artifact", &entry.source)?;
        let builder = ZipEntryBuilder::new(entry.name.clone().into(), Compression::Deflate)
            .deflate_option(DeflateOption::Maximum)
            .unix_permissions(UNIX_FILE_MODE as u16);

        let mut entry_writer = writer.write_entry_stream(builder).await?;
        futures_lite::io::copy(&mut source.compat(), &mut entry_writer)
            .await
            .fs_context("streaming artifact", &entry.source)?;
        entry_writer.close().await?;
        log::trace!("Appended {} as {}", entry.source.display(), entry.name);
    }

    let mut file = writer.close().await?.into_inner();
    file.flush().await.fs_context("flushing archive", destination)?;
    file.sync_all().await.fs_context("syncing archive", destination)?;
    Ok(())
}
