// Library module for hashproof
// File integrity checks: digest two files (or a file and a known hash) and export the report

pub mod compare;
pub mod config;
pub mod error;
pub mod export;
pub mod hash;

pub use compare::{ComparisonRequest, ComparisonSession, FileDetails, Report};
pub use config::{CompareConfig, ExportConfig};
pub use error::{ErrorKind, HashProofError};
pub use export::{EncoderRegistry, ReportFormat, ReportOptions};
pub use hash::{DigestEngine, HashAlgorithm};
