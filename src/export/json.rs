use serde::Serialize;

use super::{ReportEncoder, ReportFormat, ReportOptions};
use crate::compare::model::{FileDetails, Report};
use crate::error::HashProofError;

/// Pretty-printed JSON in four parts: metadata, comparison, source file and
/// (when present) comparison file
pub struct JsonEncoder;

#[derive(Serialize)]
struct JsonOutput<'a> {
    #[serde(rename = "reportMetadata")]
    report_metadata: Metadata<'a>,
    #[serde(rename = "comparisonDetails")]
    comparison_details: ComparisonDetails<'a>,
    #[serde(rename = "sourceFile")]
    source_file: &'a FileDetails,
    #[serde(rename = "comparisonFile", skip_serializing_if = "Option::is_none")]
    comparison_file: Option<&'a FileDetails>,
}

#[derive(Serialize)]
struct Metadata<'a> {
    #[serde(rename = "Report ID")]
    report_id: String,
    #[serde(rename = "Generated")]
    generated: String,
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Purpose/Notes", skip_serializing_if = "Option::is_none")]
    purpose_notes: Option<&'a str>,
    #[serde(rename = "Verified By", skip_serializing_if = "Option::is_none")]
    verified_by: Option<&'a str>,
    #[serde(rename = "Organization", skip_serializing_if = "Option::is_none")]
    organization: Option<&'a str>,
}

#[derive(Serialize)]
struct ComparisonDetails<'a> {
    #[serde(rename = "Algorithm")]
    algorithm: &'static str,
    #[serde(rename = "Source Hash")]
    source_hash: &'a str,
    #[serde(rename = "Comparison Hash")]
    comparison_hash: &'a str,
    #[serde(rename = "Result")]
    result: &'a str,
    #[serde(rename = "Match")]
    matched: bool,
}

impl JsonEncoder {
    pub fn render(report: &Report, options: &ReportOptions) -> Result<String, serde_json::Error> {
        let output = JsonOutput {
            report_metadata: Metadata {
                report_id: report.id().to_string(),
                generated: report.generated_iso(),
                title: options.title(report),
                purpose_notes: options.purpose_notes(),
                verified_by: options.verified_by(),
                organization: options.organization(),
            },
            comparison_details: ComparisonDetails {
                algorithm: report.algorithm().name(),
                source_hash: report.source_hash(),
                comparison_hash: report.target_hash(),
                result: report.result(),
                matched: report.is_match(),
            },
            source_file: report.source_file(),
            comparison_file: report.target_file(),
        };

        serde_json::to_string_pretty(&output)
    }
}

impl ReportEncoder for JsonEncoder {
    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }

    fn encode(&self, report: &Report, options: &ReportOptions) -> Result<Vec<u8>, HashProofError> {
        Self::render(report, options)
            .map(String::into_bytes)
            .map_err(|e| HashProofError::SerializationFailed {
                format: self.format().to_string(),
                reason: e.to_string(),
            })
    }
}
