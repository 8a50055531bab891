use super::{ReportEncoder, ReportFormat, ReportOptions};
use crate::compare::model::Report;
use crate::error::HashProofError;

/// Column order of the single-row CSV export
pub const CSV_HEADERS: [&str; 17] = [
    "Report ID",
    "Generated",
    "Title",
    "Purpose/Notes",
    "Verified By",
    "Organization",
    "Algorithm",
    "Result",
    "Source File Name",
    "Source File Size",
    "Source File Type",
    "Source Hash",
    "Comparison Identifier",
    "Comparison File Name",
    "Comparison File Size",
    "Comparison File Type",
    "Comparison Hash",
];

const NOT_APPLICABLE: &str = "N/A";

/// One header row and one data row, `\n` separated, no trailing newline
pub struct CsvEncoder;

impl CsvEncoder {
    pub fn render(report: &Report, options: &ReportOptions) -> String {
        let source = report.source_file();
        let target = report.target_file();

        let row: [String; 17] = [
            report.id().to_string(),
            report.generated_iso(),
            options.title(report).to_string(),
            options.purpose_notes().unwrap_or_default().to_string(),
            options.verified_by().unwrap_or_default().to_string(),
            options.organization().unwrap_or_default().to_string(),
            report.algorithm().name().to_string(),
            report.result().to_string(),
            source.name.clone(),
            source.size.to_string(),
            source.media_type.clone(),
            report.source_hash().to_string(),
            report.target_identifier().to_string(),
            target.map_or_else(|| NOT_APPLICABLE.to_string(), |t| t.name.clone()),
            target.map_or_else(|| NOT_APPLICABLE.to_string(), |t| t.size.to_string()),
            target.map_or_else(|| NOT_APPLICABLE.to_string(), |t| t.media_type.clone()),
            report.target_hash().to_string(),
        ];

        let header = CSV_HEADERS.map(escape_cell).join(",");
        let data = row.iter().map(|cell| escape_cell(cell)).collect::<Vec<_>>().join(",");
        format!("{}\n{}", header, data)
    }
}

impl ReportEncoder for CsvEncoder {
    fn format(&self) -> ReportFormat {
        ReportFormat::Csv
    }

    fn encode(&self, report: &Report, options: &ReportOptions) -> Result<Vec<u8>, HashProofError> {
        Ok(Self::render(report, options).into_bytes())
    }
}

/// Quote a cell holding a comma, quote or newline; double embedded quotes
pub fn escape_cell(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
