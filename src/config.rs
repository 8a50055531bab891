//! Tunables for comparisons and exports.
//!
//! Nothing is read from disk or the environment; a host application embeds
//! these structs in its own settings (they derive serde for that purpose).

use serde::{Deserialize, Serialize};

/// Title a report carries unless the export overrides it.
pub const DEFAULT_REPORT_TITLE: &str = "File Hash Comparison Report";

/// Comparison configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Read buffer size used when streaming files through a hasher.
    pub buffer_size: usize,
    /// Title stored on every new report.
    pub default_title: String,
    /// Run the metadata extractor alongside the digests.
    pub extract_metadata: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1024 * 1024,
            default_title: DEFAULT_REPORT_TITLE.to_string(),
            extract_metadata: true,
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Scale factor handed to the document rasterizer for PDF output.
    pub raster_scale: f32,
    /// Background colour painted behind the rasterized document.
    pub raster_background: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            raster_scale: 2.0,
            raster_background: "#1e293b".to_string(),
        }
    }
}
