use std::path::{Path, PathBuf};

use anyhow::Context as _;
use tracing::info;

use crate::encode::png::EncodedStrip;
use crate::foundation::error::BoothResult;

/// Consumer of finished strips (download, share, print...).
pub trait ExportSink {
    /// Hand over one encoded strip.
    fn export(&mut self, strip: &EncodedStrip) -> BoothResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryExport {
    strips: Vec<EncodedStrip>,
}

impl InMemoryExport {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Strips exported so far, oldest first.
    pub fn strips(&self) -> &[EncodedStrip] {
        &self.strips
    }
}

impl ExportSink for InMemoryExport {
    fn export(&mut self, strip: &EncodedStrip) -> BoothResult<()> {
        self.strips.push(strip.clone());
        Ok(())
    }
}

/// Writes strips into a directory under their own file name, replacing older downloads.
#[derive(Debug)]
pub struct FileExport {
    dir: PathBuf,
    last: Option<PathBuf>,
}

impl FileExport {
    /// Export into `dir`, created on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last: None,
        }
    }

    /// Path of the most recent write.
    pub fn last_path(&self) -> Option<&Path> {
        self.last.as_deref()
    }
}

impl ExportSink for FileExport {
    fn export(&mut self, strip: &EncodedStrip) -> BoothResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        let path = self.dir.join(strip.file_name());
        std::fs::write(&path, strip.bytes())
            .with_context(|| format!("write png '{}'", path.display()))?;
        info!(path = %path.display(), "strip exported");
        self.last = Some(path);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
