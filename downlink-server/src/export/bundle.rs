use std::io::{Cursor, Write};

use anyhow::Context;
use downlink_model::Artifact;
use tracing::debug;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// Stage the matched artifacts on disk and bundle them into one zip
/// archive.
///
/// The staging directory is a scoped temporary resource: it is removed when
/// the guard drops, on success and on every failure path alike.
pub fn zip_artifacts(artifacts: &[Artifact]) -> anyhow::Result<Vec<u8>> {
    let staging = tempfile::tempdir().context("failed to create staging directory")?;

    for artifact in artifacts {
        let path = staging.path().join(&artifact.filename);
        std::fs::write(&path, &artifact.data)
            .with_context(|| format!("failed to stage {}", artifact.filename))?;
    }

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = ZipWriter::new(&mut cursor);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for artifact in artifacts {
        let staged = std::fs::read(staging.path().join(&artifact.filename))
            .with_context(|| format!("failed to read staged {}", artifact.filename))?;
        writer
            .start_file(artifact.filename.as_str(), options)
            .with_context(|| format!("failed to add {} to archive", artifact.filename))?;
        writer
            .write_all(&staged)
            .with_context(|| format!("failed to write {} to archive", artifact.filename))?;
    }

    writer.finish().context("failed to finalize archive")?;
    drop(staging);

    let bytes = cursor.into_inner();
    debug!(files = artifacts.len(), bytes = bytes.len(), "export bundle assembled");
    Ok(bytes)
}
