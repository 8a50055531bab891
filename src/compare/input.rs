use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::error::HashProofError;

/// A file offered for comparison.
///
/// Attributes are cheap accessors; the contents are only read when a hash
/// task (or a metadata extractor) opens the source.
pub trait FileSource: Send + Sync {
    fn name(&self) -> &str;

    /// Size in bytes
    fn size(&self) -> u64;

    /// MIME type, empty when unknown
    fn media_type(&self) -> &str;

    fn last_modified(&self) -> DateTime<Utc>;

    /// Open a reader over the full contents
    fn open(&self) -> Result<Box<dyn Read + Send>>;

    /// Read the full contents into memory
    fn read_all(&self) -> Result<Vec<u8>> {
        let mut reader = self.open()?;
        let mut data = Vec::with_capacity(self.size() as usize);
        reader.read_to_end(&mut data)?;
        Ok(data)
    }
}

/// File held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    media_type: String,
    last_modified: DateTime<Utc>,
    data: Arc<[u8]>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            media_type: String::new(),
            last_modified: Utc::now(),
            data: Arc::from(data.into()),
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = last_modified;
        self
    }
}

impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    fn open(&self) -> Result<Box<dyn Read + Send>> {
        Ok(Box::new(Cursor::new(Arc::clone(&self.data))))
    }
}

/// File on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
    size: u64,
    media_type: String,
    last_modified: DateTime<Utc>,
}

impl LocalFile {
    /// Stat a file and capture its attributes
    pub async fn open_path(path: impl AsRef<Path>) -> Result<Self, HashProofError> {
        let path = path.as_ref().to_path_buf();
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| HashProofError::from_io_error(e, "reading metadata of", Some(path.clone())))?;

        if !metadata.is_file() {
            return Err(HashProofError::IoError {
                path: Some(path),
                operation: "opening".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let last_modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(Self {
            media_type: guess_media_type(&path).to_string(),
            path,
            name,
            size: metadata.len(),
            last_modified,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileSource for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    fn open(&self) -> Result<Box<dyn Read + Send>> {
        let file = File::open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        Ok(Box::new(file))
    }
}

/// Best-effort MIME type from a file extension
pub fn guess_media_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "webp" => "image/webp",
        "txt" | "log" => "text/plain",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "iso" => "application/x-iso9660-image",
        _ => "application/octet-stream",
    }
}
