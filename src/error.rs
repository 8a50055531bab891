// Centralized error handling module
// One error type for digesting, comparing and exporting, with context for each failure

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Broad category of a failure, used by callers to decide how to react
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required input missing; needs user correction
    Validation,
    /// Algorithm outside the supported set
    UnsupportedAlgorithm,
    /// Reading or hashing a file failed
    DigestComputation,
    /// Metadata could not be extracted (never aborts a comparison)
    MetadataExtraction,
    /// One export format failed to encode or deliver
    Serialization,
    /// File system access failed
    Io,
    /// Another comparison is still running
    Busy,
}

/// Main error type for hashproof
#[derive(Debug)]
pub enum HashProofError {
    /// Validation errors
    MissingSourceFile,
    MissingComparisonFile,
    MissingExpectedHash,
    NoFormatsSelected,

    /// Hash computation errors
    UnsupportedAlgorithm { algorithm: String },
    DigestComputationFailed {
        name: String,
        algorithm: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Enrichment errors
    MetadataExtractionFailed { name: String, reason: String },

    /// Export errors
    SerializationFailed { format: String, reason: String },
    NoReport,

    /// Session errors
    ComparisonInProgress,

    /// File system errors with context
    FileNotFound { path: PathBuf },
    PermissionDenied { path: PathBuf, operation: String },
    IoError { path: Option<PathBuf>, operation: String, source: io::Error },
}

impl fmt::Display for HashProofError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HashProofError::MissingSourceFile => {
                writeln!(f, "Please select a source file.")?;
                write!(f, "Suggestion: Choose the file whose integrity you want to check")
            }
            HashProofError::MissingComparisonFile => {
                writeln!(f, "Please select a comparison file.")?;
                write!(f, "Suggestion: Choose a second file, or switch to comparing against a known hash")
            }
            HashProofError::MissingExpectedHash => {
                writeln!(f, "Please enter the expected hash value.")?;
                write!(f, "Suggestion: Paste the published checksum for the file")
            }
            HashProofError::NoFormatsSelected => {
                writeln!(f, "No report format selected")?;
                write!(f, "Suggestion: Pick at least one of PDF, HTML, TXT, JSON or CSV")
            }
            HashProofError::UnsupportedAlgorithm { algorithm } => {
                writeln!(f, "Unsupported hash algorithm: {}", algorithm)?;
                write!(f, "Suggestion: Use one of MD5, SHA-1, SHA-256, SHA-384, SHA-512")
            }
            HashProofError::DigestComputationFailed { name, algorithm, source } => {
                writeln!(f, "Failed to compute {} hash for {}: {}", algorithm, name, source)?;
                write!(f, "Suggestion: Check that the file is readable and try the comparison again")
            }
            HashProofError::MetadataExtractionFailed { name, reason } => {
                writeln!(f, "Could not extract metadata from {}: {}", name, reason)?;
                write!(f, "Suggestion: The comparison is unaffected; the report omits metadata for this file")
            }
            HashProofError::SerializationFailed { format, reason } => {
                writeln!(f, "Failed to generate {} report: {}", format, reason)?;
                write!(f, "Suggestion: Other formats are still available; retry this one separately")
            }
            HashProofError::NoReport => {
                writeln!(f, "No report available")?;
                write!(f, "Suggestion: Run a comparison before exporting")
            }
            HashProofError::ComparisonInProgress => {
                writeln!(f, "A comparison is already running")?;
                write!(f, "Suggestion: Wait for the current comparison to finish")
            }
            HashProofError::FileNotFound { path } => {
                writeln!(f, "File not found: {}", path.display())?;
                write!(f, "Suggestion: Check that the file path is correct and the file exists")
            }
            HashProofError::PermissionDenied { path, operation } => {
                writeln!(f, "Permission denied while {} file: {}", operation, path.display())?;
                write!(f, "Suggestion: Check file permissions or run with appropriate privileges")
            }
            HashProofError::IoError { path, operation, source } => {
                if let Some(p) = path {
                    writeln!(f, "I/O error while {} file {}: {}", operation, p.display(), source)?;
                } else {
                    writeln!(f, "I/O error while {}: {}", operation, source)?;
                }
                write!(f, "Suggestion: Check file permissions and disk space")
            }
        }
    }
}

impl std::error::Error for HashProofError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HashProofError::IoError { source, .. } => Some(source),
            HashProofError::DigestComputationFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl HashProofError {
    /// Create an IoError with context about the operation and optional path
    pub fn from_io_error(err: io::Error, operation: &str, path: Option<PathBuf>) -> Self {
        match (err.kind(), path) {
            (io::ErrorKind::NotFound, Some(p)) => HashProofError::FileNotFound { path: p },
            (io::ErrorKind::PermissionDenied, Some(p)) => HashProofError::PermissionDenied {
                path: p,
                operation: operation.to_string(),
            },
            (_, path) => HashProofError::IoError {
                path,
                operation: operation.to_string(),
                source: err,
            },
        }
    }

    /// Wrap any failure raised while hashing a named file
    pub fn digest_failed(
        name: &str,
        algorithm: &str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        HashProofError::DigestComputationFailed {
            name: name.to_string(),
            algorithm: algorithm.to_string(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            HashProofError::MissingSourceFile
            | HashProofError::MissingComparisonFile
            | HashProofError::MissingExpectedHash
            | HashProofError::NoFormatsSelected
            | HashProofError::NoReport => ErrorKind::Validation,
            HashProofError::UnsupportedAlgorithm { .. } => ErrorKind::UnsupportedAlgorithm,
            HashProofError::DigestComputationFailed { .. } => ErrorKind::DigestComputation,
            HashProofError::MetadataExtractionFailed { .. } => ErrorKind::MetadataExtraction,
            HashProofError::SerializationFailed { .. } => ErrorKind::Serialization,
            HashProofError::ComparisonInProgress => ErrorKind::Busy,
            HashProofError::FileNotFound { .. }
            | HashProofError::PermissionDenied { .. }
            | HashProofError::IoError { .. } => ErrorKind::Io,
        }
    }

    /// Whether re-running the same request, unchanged, can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::DigestComputation | ErrorKind::Io | ErrorKind::Busy
        )
    }

    /// The single-line message shown to the user (without the suggestion)
    pub fn user_message(&self) -> String {
        let full = self.to_string();
        full.lines().next().unwrap_or_default().to_string()
    }
}

impl From<io::Error> for HashProofError {
    fn from(err: io::Error) -> Self {
        HashProofError::from_io_error(err, "unknown operation", None)
    }
}
