//! File-backed trace storage.
//!
//! Exports are fully encoded in memory, staged in a hidden sibling file and
//! renamed into place, so readers never observe a partially written trace.
mod codec;

use std::{
    io,
    path::{Path, PathBuf},
};

use tempo_model::{PathTemplate, RoundIndex, Sample, TraceFormat, WorkerIndex};
use tracing::{debug, instrument};

use crate::error::TraceError;

/// Reads and writes trace files relative to a root directory.
#[derive(Debug, Clone)]
pub struct TraceStore {
    root: PathBuf,
}

impl TraceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Trace location of one worker in one round.
    ///
    /// Relative templates are anchored at the store root; absolute ones are used as is.
    pub fn resolve_path(
        &self,
        template: &PathTemplate,
        worker: WorkerIndex,
        round: RoundIndex,
    ) -> PathBuf {
        self.root.join(template.resolve(worker, round))
    }

    /// Write `samples` to `path`, replacing any previous trace.
    ///
    /// Missing parent directories are created.
    #[instrument(
        level = "debug",
        skip_all,
        fields(path = %path.display(), format = %format, samples = samples.len())
    )]
    pub async fn export(
        &self,
        path: &Path,
        samples: &[Sample],
        format: TraceFormat,
    ) -> Result<(), TraceError> {
        let bytes = codec::encode(path, samples, format)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(TraceError::io(parent))?;
        }

        let staging = staging_path(path)?;
        tokio::fs::write(&staging, &bytes)
            .await
            .map_err(TraceError::io(&staging))?;
        if let Err(e) = tokio::fs::rename(&staging, path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(TraceError::io(path)(e));
        }

        debug!(bytes = bytes.len(), "trace exported");
        Ok(())
    }

    /// Read a whole trace from `path`.
    ///
    /// Blocking: replay controllers load their trace once, while being built.
    #[instrument(level = "debug", skip_all, fields(path = %path.display(), format = %format))]
    pub fn import(&self, path: &Path, format: TraceFormat) -> Result<Vec<Sample>, TraceError> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TraceError::NotFound {
                path: path.to_path_buf(),
            },
            _ => TraceError::io(path)(e),
        })?;

        let samples = codec::decode(path, &bytes, format)?;
        debug!(samples = samples.len(), "trace imported");
        Ok(samples)
    }
}

fn staging_path(path: &Path) -> Result<PathBuf, TraceError> {
    let name = path.file_name().ok_or_else(|| {
        TraceError::io(path)(io::Error::new(
            io::ErrorKind::InvalidInput,
            "trace path has no file name",
        ))
    })?;
    let mut staged = std::ffi::OsString::from(".");
    staged.push(name);
    staged.push(".tmp");
    Ok(path.with_file_name(staged))
}
