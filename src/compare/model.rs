// Report data model
// File details, the immutable comparison report and the builder that assembles it

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::input::FileSource;
use super::metadata::ExifData;
use crate::config::DEFAULT_REPORT_TITLE;
use crate::hash::HashAlgorithm;

pub const MATCH_LABEL: &str = "✅ Match";
pub const MISMATCH_LABEL: &str = "❌ Mismatch";
pub const EXPECTED_HASH_IDENTIFIER: &str = "Expected Hash";

/// Attributes of one compared file, captured at comparison time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileDetails {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub media_type: String,
    #[serde(rename = "lastModified", with = "chrono::serde::ts_milliseconds")]
    pub last_modified: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exif: Option<ExifData>,
}

impl FileDetails {
    pub fn from_source(file: &dyn FileSource, exif: Option<ExifData>) -> Self {
        Self {
            name: file.name().to_string(),
            size: file.size(),
            media_type: file.media_type().to_string(),
            last_modified: file.last_modified(),
            exif,
        }
    }

    /// Size rendered for people, e.g. `1.5 KB`
    pub fn format_size(&self) -> String {
        format_file_size(self.size)
    }

    pub fn format_last_modified(&self) -> String {
        self.last_modified.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

/// What the source file is compared against
#[derive(Debug, Clone)]
pub enum ComparisonTarget {
    /// A second file and its computed digest
    File { details: FileDetails, digest: String },
    /// A user supplied digest, as typed
    ExpectedHash(String),
}

/// Immutable record of one comparison outcome
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    id: Uuid,
    generated: DateTime<Utc>,
    title: String,
    algorithm: HashAlgorithm,
    source_file: FileDetails,
    target_file: Option<FileDetails>,
    source_hash: String,
    target_hash: String,
    target_identifier: String,
    result: String,
    matched: bool,
}

impl Report {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn generated(&self) -> DateTime<Utc> {
        self.generated
    }

    /// Generation time as ISO-8601 UTC with millisecond precision
    pub fn generated_iso(&self) -> String {
        self.generated.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn source_file(&self) -> &FileDetails {
        &self.source_file
    }

    /// Absent when comparing against an expected hash
    pub fn target_file(&self) -> Option<&FileDetails> {
        self.target_file.as_ref()
    }

    pub fn source_hash(&self) -> &str {
        &self.source_hash
    }

    pub fn target_hash(&self) -> &str {
        &self.target_hash
    }

    /// Comparison file name, or `Expected Hash`
    pub fn target_identifier(&self) -> &str {
        &self.target_identifier
    }

    /// `✅ Match` or `❌ Mismatch`
    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn is_match(&self) -> bool {
        self.matched
    }
}

/// Accumulates the parts of a report and produces it in one step.
///
/// Digests are normalized here so the match flag can never disagree with the
/// stored hashes.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    algorithm: HashAlgorithm,
    source_file: FileDetails,
    source_hash: String,
    target: ComparisonTarget,
    title: Option<String>,
    id: Option<Uuid>,
    generated: Option<DateTime<Utc>>,
}

impl ReportBuilder {
    pub fn new(
        algorithm: HashAlgorithm,
        source_file: FileDetails,
        source_hash: impl Into<String>,
        target: ComparisonTarget,
    ) -> Self {
        Self {
            algorithm,
            source_file,
            source_hash: source_hash.into(),
            target,
            title: None,
            id: None,
            generated: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Pin the identifier instead of drawing a random one
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Pin the generation time instead of using the current time
    pub fn generated_at(mut self, generated: DateTime<Utc>) -> Self {
        self.generated = Some(generated);
        self
    }

    pub fn build(self) -> Report {
        let source_hash = self.source_hash.to_lowercase();

        let (target_file, target_hash, target_identifier) = match self.target {
            ComparisonTarget::File { details, digest } => {
                let identifier = details.name.clone();
                (Some(details), digest.to_lowercase(), identifier)
            }
            // Pasted hashes often carry stray whitespace
            ComparisonTarget::ExpectedHash(expected) => (
                None,
                expected.trim().to_lowercase(),
                EXPECTED_HASH_IDENTIFIER.to_string(),
            ),
        };

        let matched = source_hash == target_hash;

        Report {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            generated: self.generated.unwrap_or_else(Utc::now),
            title: self.title.unwrap_or_else(|| DEFAULT_REPORT_TITLE.to_string()),
            algorithm: self.algorithm,
            source_file: self.source_file,
            target_file,
            source_hash,
            target_hash,
            target_identifier,
            result: if matched { MATCH_LABEL } else { MISMATCH_LABEL }.to_string(),
            matched,
        }
    }
}

const SIZE_UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Format a byte count with base-1024 units and at most two decimals
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    // Round to two decimals, then drop trailing zeros
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}
