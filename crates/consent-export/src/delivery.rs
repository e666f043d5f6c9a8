//! Artifact delivery.

use crate::{ExportError, ExportResult};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// Where a delivered artifact ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredArtifact {
    pub filename: String,
    pub location: String,
    pub bytes: usize,
}

#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn deliver(&self, filename: &str, bytes: &[u8]) -> ExportResult<DeliveredArtifact>;
}

/// `{title}.png`, with path separators and control characters replaced.
pub fn artifact_filename(title: &str) -> String {
    format!("{}.png", file_stem(title))
}

/// Longest stem in bytes. Leaves room for an extension under the usual
/// 255-byte file name limit.
pub const MAX_STEM_BYTES: usize = 200;

/// `title` made safe as a file name, without extension, cut at a char
/// boundary to at most [`MAX_STEM_BYTES`].
pub fn file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = stem.trim_start_matches('.');
    let mut end = stem.len().min(MAX_STEM_BYTES);
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    let stem = stem[..end].trim_end();
    if stem.is_empty() {
        "consent".to_string()
    } else {
        stem.to_string()
    }
}

/// Writes artifacts into a directory, creating it on first use. Each file is
/// written beside its target and renamed into place, so a failed write
/// never leaves a truncated artifact under the final name.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn deliver(&self, filename: &str, bytes: &[u8]) -> ExportResult<DeliveredArtifact> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ExportError::Delivery(format!("{}: {}", self.dir.display(), e)))?;
        let path = self.dir.join(filename);
        let (dir, target, data) = (self.dir.clone(), path.clone(), bytes.to_vec());
        tokio::task::spawn_blocking(move || write_atomic(&dir, &target, &data))
            .await
            .map_err(|e| ExportError::Delivery(e.to_string()))?
            .map_err(|e| ExportError::Delivery(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), bytes = bytes.len(), "artifact written");
        Ok(DeliveredArtifact {
            filename: filename.to_string(),
            location: path.display().to_string(),
            bytes: bytes.len(),
        })
    }
}

/// Write through a temp file in `dir`, then rename over `target`.
pub(crate) fn write_atomic(dir: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// Keeps delivered artifacts in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> Vec<(String, Vec<u8>)> {
        self.artifacts
            .lock()
            .map(|a| a.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    async fn deliver(&self, filename: &str, bytes: &[u8]) -> ExportResult<DeliveredArtifact> {
        let mut artifacts = self
            .artifacts
            .lock()
            .map_err(|e| ExportError::Delivery(format!("lock poisoned: {}", e)))?;
        artifacts.push((filename.to_string(), bytes.to_vec()));
        Ok(DeliveredArtifact {
            filename: filename.to_string(),
            location: format!("memory:{}", filename),
            bytes: bytes.len(),
        })
    }
}
