use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::ReportPayload;

/// Destination for encoded reports (a download, a directory, a test buffer)
pub trait ReportSink: Send + Sync {
    fn save(&self, payload: &ReportPayload) -> Result<()>;
}

/// Writes each payload into a directory under its report file name
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, payload: &ReportPayload) -> PathBuf {
        self.dir.join(&payload.file_name)
    }
}

impl ReportSink for DirectorySink {
    fn save(&self, payload: &ReportPayload) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.path_for(payload);
        fs::write(&path, &payload.bytes).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
