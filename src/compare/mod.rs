// Comparison pipeline
// Inputs, metadata enrichment, the report model and the session that ties them together

pub mod input;
pub mod metadata;
pub mod model;
pub mod session;

pub use input::{guess_media_type, FileSource, LocalFile, MemoryFile};
pub use metadata::{ExifData, ImageMetadataGate, MetadataExtractor, NoMetadata};
pub use model::{format_file_size, ComparisonTarget, FileDetails, Report, ReportBuilder};
pub use session::{ComparisonMode, ComparisonRequest, ComparisonSession, SessionHandle, SessionState};
