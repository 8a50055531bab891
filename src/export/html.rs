//! Self-contained styled HTML report.
//!
//! The document carries its own stylesheet and an inline logo so it renders
//! the same offline; it is also the source the PDF export rasterizes. All
//! user-controlled text is HTML-escaped.

use super::{summary_fields, ReportEncoder, ReportFormat, ReportOptions};
use crate::compare::model::{FileDetails, Report};
use crate::error::HashProofError;

/// Element id of the container the rasterizer captures
pub const REPORT_CONTENT_ID: &str = "report-content";

/// 48x48 PNG shield with a check mark, embedded as the header logo
const LOGO_DATA_URI: &str = concat!(
    "data:image/png;base64,",
    "iVBORw0KGgoAAAANSUhEUgAAADAAAAAwCAIAAADYYG7QAAAA8UlEQVR42u3YsQ3CMBAF0GxASUdBByuw",
    "AVOxIz0jMAOpIhRZvn//fmxHOenq3HMky/p/utweQ82UoAQdA3R9fxtMguSg0/m+0SQoQfsHPT+vUUAz",
    "ZZnhQIupG6io6QZaaTqDKpoOoLqmNcjUyEDFTxMaDcjcUb9WYhB4blCj/0PFfSB6Q9D/SpeGAblMQo0R",
    "g0CTUGPnMq8pqIGCIm6Ka9DkSlw6TuOI0qZJovFle+49cWncZYP30fVqSBBoqkdmWR0DmjgN2Q+ZJlrD",
    "F1YVU0QTatCKpqAmWumtTHGNoGMEa6impadQI2thVZrsqRMkmB+W/iJNJSAEKQAAAABJRU5ErkJggg==",
);

const STYLESHEET: &str = "\
body { font-family: 'Courier New', Courier, monospace; background-color: #0f172a; color: #cbd5e1; margin: 0; padding: 2rem; }
.container { max-width: 800px; margin: auto; border: 1px solid #334155; padding: 2rem; border-radius: 8px; background-color: #1e293b; }
.header { display: flex; align-items: center; border-bottom: 1px solid #334155; padding-bottom: 1rem; margin-bottom: 1rem; }
.header img { width: 80px; height: 80px; margin-right: 1.5rem; }
.header h1 { color: #22d3ee; margin: 0; font-size: 2em; }
h2, h3 { color: #22d3ee; border-bottom: 1px solid #475569; padding-bottom: 0.5rem; margin-top: 2rem; }
p { margin: 0.5rem 0; }
strong { color: #94a3b8; }
.hash { word-break: break-all; font-size: 0.9em; background-color: #334155; padding: 0.5rem; border-radius: 4px; }
.result { font-weight: bold; font-size: 1.2em; }
.result.match { color: #4ade80; }
.result.mismatch { color: #f87171; }
.section { margin-bottom: 1.5rem; }
.exif-data { padding-left: 1rem; border-left: 2px solid #334155; margin-top: 1rem; }
";

// Fields rendered in their own sections rather than under "Report Details"
const SECTION_FIELDS: [&str; 6] = [
    "Title",
    "Source File",
    "Comparison File",
    "Source Hash",
    "Comparison Hash",
    "Result",
];

pub struct HtmlEncoder;

impl HtmlEncoder {
    pub fn render(report: &Report, options: &ReportOptions) -> String {
        let title = escape_html(options.title(report));

        let details: String = summary_fields(report, options)
            .into_iter()
            .filter(|(label, _)| !SECTION_FIELDS.contains(label))
            .map(|(label, value)| field(label, &value))
            .collect();

        let comparison_section = report
            .target_file()
            .map(|target| section("Comparison File", &file_details_html(target)))
            .unwrap_or_default();

        let result_class = if report.is_match() { "match" } else { "mismatch" };
        let results = format!(
            "<p><strong>Source Hash:</strong></p><div class=\"hash\">{}</div>\
             <p><strong>Comparison Hash:</strong></p><div class=\"hash\">{}</div>\
             <p><strong>Result:</strong> <span class=\"result {}\">{}</span></p>",
            escape_html(report.source_hash()),
            escape_html(report.target_hash()),
            result_class,
            escape_html(report.result()),
        );

        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
             <style>\n{style}</style>\n</head>\n<body>\n\
             <div class=\"container\" id=\"{id}\">\n\
             <div class=\"header\"><img src=\"{logo}\" alt=\"Logo\"><h1>{title}</h1></div>\n\
             {details}\n{source}\n{comparison}\n{results}\n\
             </div>\n</body>\n</html>\n",
            title = title,
            style = STYLESHEET,
            id = REPORT_CONTENT_ID,
            logo = LOGO_DATA_URI,
            details = section("Report Details", &details),
            source = section("Source File", &file_details_html(report.source_file())),
            comparison = comparison_section,
            results = section("Comparison Results", &results),
        )
    }
}

impl ReportEncoder for HtmlEncoder {
    fn format(&self) -> ReportFormat {
        ReportFormat::Html
    }

    fn encode(&self, report: &Report, options: &ReportOptions) -> Result<Vec<u8>, HashProofError> {
        Ok(Self::render(report, options).into_bytes())
    }
}

fn section(heading: &str, body: &str) -> String {
    format!("<div class=\"section\"><h2>{}</h2>{}</div>", heading, body)
}

fn field(label: &str, value: &str) -> String {
    format!("<p><strong>{}:</strong> {}</p>", escape_html(label), escape_html(value))
}

fn file_details_html(details: &FileDetails) -> String {
    let mut html = String::new();
    html.push_str(&field("Name", &details.name));
    html.push_str(&field("Size", &details.format_size()));
    html.push_str(&field("Type", &details.media_type));
    html.push_str(&field("Last Modified", &details.format_last_modified()));

    if let Some(exif) = &details.exif {
        html.push_str("<h4>EXIF Data</h4><div class=\"exif-data\">");
        for (key, value) in exif {
            html.push_str(&field(key, value));
        }
        html.push_str("</div>");
    }
    html
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
