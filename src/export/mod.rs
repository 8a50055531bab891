// Report export
// Encoder registry turning a report into downloadable payloads, one per format

pub mod csv;
pub mod html;
pub mod json;
pub mod pdf;
pub mod sink;
pub mod text;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::compare::model::{FileDetails, Report};
use crate::config::ExportConfig;
use crate::error::HashProofError;

pub use csv::CsvEncoder;
pub use html::HtmlEncoder;
pub use json::JsonEncoder;
pub use pdf::{DocumentBuilder, DocumentRasterizer, LopdfBuilder, PdfEncoder, RasterImage};
pub use sink::{DirectorySink, ReportSink};
pub use text::TextEncoder;

/// Prefix of every exported file name
pub const REPORT_FILE_PREFIX: &str = "file-hash-report";

/// Output formats a report can be exported in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportFormat {
    Pdf,
    Html,
    Txt,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn all() -> [ReportFormat; 5] {
        [
            ReportFormat::Pdf,
            ReportFormat::Html,
            ReportFormat::Txt,
            ReportFormat::Json,
            ReportFormat::Csv,
        ]
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Html => "html",
            ReportFormat::Txt => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "application/pdf",
            ReportFormat::Html => "text/html;charset=utf-8",
            ReportFormat::Txt => "text/plain;charset=utf-8",
            ReportFormat::Json => "application/json",
            ReportFormat::Csv => "text/csv;charset=utf-8",
        }
    }

    /// `file-hash-report-<id>.<ext>`
    pub fn file_name(&self, report: &Report) -> String {
        format!("{}-{}.{}", REPORT_FILE_PREFIX, report.id(), self.extension())
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ReportFormat::Pdf => "PDF",
            ReportFormat::Html => "HTML",
            ReportFormat::Txt => "TXT",
            ReportFormat::Json => "JSON",
            ReportFormat::Csv => "CSV",
        })
    }
}

impl FromStr for ReportFormat {
    type Err = HashProofError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ReportFormat::Pdf),
            "html" | "htm" => Ok(ReportFormat::Html),
            "txt" | "text" => Ok(ReportFormat::Txt),
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(HashProofError::SerializationFailed {
                format: other.to_string(),
                reason: "unknown report format".to_string(),
            }),
        }
    }
}

/// Formats to produce plus display overrides applied only while encoding.
///
/// Always holds at least one format: both [`ReportOptions::new`] and
/// deserialization reject an empty selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawReportOptions")]
pub struct ReportOptions {
    formats: Vec<ReportFormat>,
    pub report_title: Option<String>,
    pub purpose_notes: Option<String>,
    pub verified_by: Option<String>,
    pub organization: Option<String>,
}

impl ReportOptions {
    /// Requested formats in order, duplicates removed; at least one required
    pub fn new(formats: impl IntoIterator<Item = ReportFormat>) -> Result<Self, HashProofError> {
        let mut unique: Vec<ReportFormat> = Vec::new();
        for format in formats {
            if !unique.contains(&format) {
                unique.push(format);
            }
        }
        if unique.is_empty() {
            return Err(HashProofError::NoFormatsSelected);
        }
        Ok(Self {
            formats: unique,
            report_title: None,
            purpose_notes: None,
            verified_by: None,
            organization: None,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.report_title = Some(title.into());
        self
    }

    pub fn with_purpose_notes(mut self, notes: impl Into<String>) -> Self {
        self.purpose_notes = Some(notes.into());
        self
    }

    pub fn with_verified_by(mut self, verifier: impl Into<String>) -> Self {
        self.verified_by = Some(verifier.into());
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn formats(&self) -> &[ReportFormat] {
        &self.formats
    }

    /// Override title if set and non-empty, else the report's own
    pub fn title<'a>(&'a self, report: &'a Report) -> &'a str {
        non_empty(&self.report_title).unwrap_or_else(|| report.title())
    }

    pub fn purpose_notes(&self) -> Option<&str> {
        non_empty(&self.purpose_notes)
    }

    pub fn verified_by(&self) -> Option<&str> {
        non_empty(&self.verified_by)
    }

    pub fn organization(&self) -> Option<&str> {
        non_empty(&self.organization)
    }
}

// Unchecked wire form, validated through `ReportOptions::new`
#[derive(Deserialize)]
struct RawReportOptions {
    #[serde(default)]
    formats: Vec<ReportFormat>,
    #[serde(default)]
    report_title: Option<String>,
    #[serde(default)]
    purpose_notes: Option<String>,
    #[serde(default)]
    verified_by: Option<String>,
    #[serde(default)]
    organization: Option<String>,
}

impl TryFrom<RawReportOptions> for ReportOptions {
    type Error = HashProofError;

    fn try_from(raw: RawReportOptions) -> Result<Self, Self::Error> {
        let mut options = ReportOptions::new(raw.formats)?;
        options.report_title = raw.report_title;
        options.purpose_notes = raw.purpose_notes;
        options.verified_by = raw.verified_by;
        options.organization = raw.organization;
        Ok(options)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// One encoded report, ready to save
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPayload {
    pub format: ReportFormat,
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Result of exporting one format
#[derive(Debug)]
pub struct ExportOutcome {
    pub format: ReportFormat,
    pub result: Result<ReportPayload, HashProofError>,
}

impl ExportOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn payload(&self) -> Option<&ReportPayload> {
        self.result.as_ref().ok()
    }

    /// Hand a successful payload to the sink; a failed delivery replaces the
    /// payload with the error
    pub fn deliver(self, sink: &dyn ReportSink) -> ExportOutcome {
        let format = self.format;
        let result = match self.result {
            Ok(payload) => match sink.save(&payload) {
                Ok(()) => {
                    debug!(file = %payload.file_name, "report delivered");
                    Ok(payload)
                }
                Err(e) => {
                    warn!(%format, error = %e, "report delivery failed");
                    Err(HashProofError::SerializationFailed {
                        format: format.to_string(),
                        reason: e.to_string(),
                    })
                }
            },
            Err(e) => Err(e),
        };
        ExportOutcome { format, result }
    }
}

/// Turns a report into the bytes of one format
pub trait ReportEncoder: Send + Sync {
    fn format(&self) -> ReportFormat;

    fn encode(&self, report: &Report, options: &ReportOptions) -> Result<Vec<u8>, HashProofError>;
}

/// Maps each format to its encoder
pub struct EncoderRegistry {
    encoders: HashMap<ReportFormat, Box<dyn ReportEncoder>>,
}

impl EncoderRegistry {
    /// Registry without any encoders
    pub fn empty() -> Self {
        Self {
            encoders: HashMap::new(),
        }
    }

    /// Text, JSON, CSV and HTML; PDF needs collaborators, see [`Self::with_pdf`]
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(TextEncoder);
        registry.register(JsonEncoder);
        registry.register(CsvEncoder);
        registry.register(HtmlEncoder);
        registry
    }

    pub fn with_pdf(
        mut self,
        rasterizer: impl DocumentRasterizer + 'static,
        builder: impl DocumentBuilder + 'static,
        config: ExportConfig,
    ) -> Self {
        self.register(PdfEncoder::new(rasterizer, builder, config));
        self
    }

    /// Add or replace the encoder for its format
    pub fn register(&mut self, encoder: impl ReportEncoder + 'static) {
        self.encoders.insert(encoder.format(), Box::new(encoder));
    }

    pub fn supports(&self, format: ReportFormat) -> bool {
        self.encoders.contains_key(&format)
    }

    pub fn encode(
        &self,
        report: &Report,
        options: &ReportOptions,
        format: ReportFormat,
    ) -> Result<ReportPayload, HashProofError> {
        let encoder = self
            .encoders
            .get(&format)
            .ok_or_else(|| HashProofError::SerializationFailed {
                format: format.to_string(),
                reason: "no encoder registered for this format".to_string(),
            })?;

        let bytes = encoder.encode(report, options)?;
        Ok(ReportPayload {
            format,
            file_name: format.file_name(report),
            mime_type: format.mime_type(),
            bytes,
        })
    }

    /// Encode every requested format independently; one failure does not
    /// stop the others
    pub fn export(
        &self,
        report: &Report,
        options: &ReportOptions,
    ) -> Result<Vec<ExportOutcome>, HashProofError> {
        if options.formats().is_empty() {
            return Err(HashProofError::NoFormatsSelected);
        }

        let outcomes = options
            .formats()
            .iter()
            .map(|&format| {
                let result = self.encode(report, options, format);
                if let Err(e) = &result {
                    warn!(%format, report_id = %report.id(), "{}", e.user_message());
                }
                ExportOutcome { format, result }
            })
            .collect();
        Ok(outcomes)
    }
}

impl Default for EncoderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Ordered label/value pairs shared by the text and HTML renderings
pub(crate) fn summary_fields(report: &Report, options: &ReportOptions) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("Report ID", report.id().to_string()),
        ("Generated", report.generated_iso()),
        ("Title", options.title(report).to_string()),
    ];
    if let Some(notes) = options.purpose_notes() {
        fields.push(("Purpose/Notes", notes.to_string()));
    }
    if let Some(verifier) = options.verified_by() {
        fields.push(("Verified By", verifier.to_string()));
    }
    if let Some(organization) = options.organization() {
        fields.push(("Organization", organization.to_string()));
    }
    fields.push(("Algorithm", report.algorithm().name().to_string()));
    fields.push(("Source File", file_details_text(report.source_file())));
    if let Some(target) = report.target_file() {
        fields.push(("Comparison File", file_details_text(target)));
    }
    fields.push(("Source Hash", report.source_hash().to_string()));
    fields.push(("Comparison Hash", report.target_hash().to_string()));
    fields.push(("Result", report.result().to_string()));
    fields
}

/// Multi-line description of a file, EXIF tags last
pub(crate) fn file_details_text(details: &FileDetails) -> String {
    let mut text = format!(
        "Name: {}\nSize: {}\nType: {}\nLast Modified: {}",
        details.name,
        details.format_size(),
        details.media_type,
        details.format_last_modified()
    );
    if let Some(exif) = &details.exif {
        text.push_str("\nEXIF Data:");
        for (key, value) in exif {
            text.push_str(&format!("\n  - {}: {}", key, value));
        }
    }
    text
}
