use super::{summary_fields, ReportEncoder, ReportFormat, ReportOptions};
use crate::compare::model::Report;
use crate::error::HashProofError;

/// Plain text: a `Label:` line per field, value lines indented two spaces,
/// blocks separated by a blank line
pub struct TextEncoder;

impl TextEncoder {
    pub fn render(report: &Report, options: &ReportOptions) -> String {
        summary_fields(report, options)
            .into_iter()
            .map(|(label, value)| {
                let body: Vec<String> = value.split('\n').map(|line| format!("  {}", line)).collect();
                format!("{}:\n{}", label, body.join("\n"))
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl ReportEncoder for TextEncoder {
    fn format(&self) -> ReportFormat {
        ReportFormat::Txt
    }

    fn encode(&self, report: &Report, options: &ReportOptions) -> Result<Vec<u8>, HashProofError> {
        Ok(Self::render(report, options).into_bytes())
    }
}
