use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;

use super::input::FileSource;

/// Embedded metadata tags, tag name to human readable value.
pub type ExifData = BTreeMap<String, String>;

/// Media types that commonly carry EXIF blocks
const EXIF_MEDIA_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/tiff", "image/heic", "image/heif"];

/// Extracts optional metadata from a file.
///
/// Failures are not fatal to a comparison: the session logs them and
/// carries on without metadata for that file.
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    async fn extract(&self, file: &dyn FileSource) -> Result<Option<ExifData>>;
}

/// Extractor that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

#[async_trait]
impl MetadataExtractor for NoMetadata {
    async fn extract(&self, _file: &dyn FileSource) -> Result<Option<ExifData>> {
        Ok(None)
    }
}

/// Only forwards image types that can hold EXIF data to the inner extractor
/// and cleans up what it returns.
pub struct ImageMetadataGate<E> {
    inner: E,
}

impl<E: MetadataExtractor> ImageMetadataGate<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<E: MetadataExtractor> MetadataExtractor for ImageMetadataGate<E> {
    async fn extract(&self, file: &dyn FileSource) -> Result<Option<ExifData>> {
        if !carries_exif(file.media_type()) {
            return Ok(None);
        }
        let tags = self.inner.extract(file).await?;
        Ok(tags.and_then(clean_tags))
    }
}

/// Whether a media type is worth handing to an EXIF reader
pub fn carries_exif(media_type: &str) -> bool {
    let media_type = media_type.trim().to_ascii_lowercase();
    EXIF_MEDIA_TYPES.iter().any(|t| media_type.starts_with(t))
}

/// Drop the thumbnail blob and empty values; nothing left means no metadata
pub fn clean_tags(mut tags: ExifData) -> Option<ExifData> {
    tags.remove("Thumbnail");
    tags.retain(|_, value| !value.trim().is_empty());
    if tags.is_empty() {
        None
    } else {
        Some(tags)
    }
}
