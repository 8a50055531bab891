//! Comparison orchestration.
//!
//! A [`ComparisonSession`] owns the lifecycle of one comparison at a time:
//! `Idle -> Validating -> Computing -> Comparing -> Reported`, with `Error`
//! reachable from validation and computation. Starting a new request or
//! resetting discards the previous report.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};

use super::input::FileSource;
use super::metadata::{ExifData, MetadataExtractor, NoMetadata};
use super::model::{ComparisonTarget, FileDetails, Report, ReportBuilder};
use crate::config::CompareConfig;
use crate::error::HashProofError;
use crate::export::{EncoderRegistry, ExportOutcome, ReportOptions, ReportSink};
use crate::hash::{DigestEngine, HashAlgorithm, HashTask};

/// How the source file is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonMode {
    #[default]
    FileVsFile,
    FileVsHash,
}

/// Inputs of one comparison, as collected from the user
#[derive(Clone)]
pub struct ComparisonRequest {
    pub mode: ComparisonMode,
    pub algorithm: HashAlgorithm,
    pub source: Option<Arc<dyn FileSource>>,
    pub comparison_file: Option<Arc<dyn FileSource>>,
    pub expected_hash: String,
}

impl ComparisonRequest {
    pub fn file_vs_file(algorithm: HashAlgorithm) -> Self {
        Self {
            mode: ComparisonMode::FileVsFile,
            algorithm,
            source: None,
            comparison_file: None,
            expected_hash: String::new(),
        }
    }

    pub fn file_vs_hash(algorithm: HashAlgorithm) -> Self {
        Self {
            mode: ComparisonMode::FileVsHash,
            ..Self::file_vs_file(algorithm)
        }
    }

    pub fn source(mut self, file: impl FileSource + 'static) -> Self {
        self.source = Some(Arc::new(file));
        self
    }

    pub fn comparison_file(mut self, file: impl FileSource + 'static) -> Self {
        self.comparison_file = Some(Arc::new(file));
        self
    }

    pub fn expected_hash(mut self, hash: impl Into<String>) -> Self {
        self.expected_hash = hash.into();
        self
    }
}

impl fmt::Debug for ComparisonRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComparisonRequest")
            .field("mode", &self.mode)
            .field("algorithm", &self.algorithm)
            .field("source", &self.source.as_ref().map(|s| s.name().to_string()))
            .field("comparison_file", &self.comparison_file.as_ref().map(|s| s.name().to_string()))
            .field("expected_hash", &self.expected_hash)
            .finish()
    }
}

/// Where a session is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Validating,
    Computing,
    Comparing,
    Reported,
    Error { message: String },
}

impl SessionState {
    pub fn display(&self) -> String {
        match self {
            Self::Idle => "Ready".to_string(),
            Self::Validating => "Checking inputs...".to_string(),
            Self::Computing => "Computing hashes...".to_string(),
            Self::Comparing => "Comparing...".to_string(),
            Self::Reported => "Report ready".to_string(),
            Self::Error { message } => format!("An error occurred: {}", message),
        }
    }
}

/// Validated inputs, ready to hash
enum Plan {
    Files {
        source: Arc<dyn FileSource>,
        comparison: Arc<dyn FileSource>,
    },
    Expected {
        source: Arc<dyn FileSource>,
        expected: String,
    },
}

/// Runs comparisons and holds the most recent report
pub struct ComparisonSession {
    config: CompareConfig,
    engine: DigestEngine,
    extractor: Arc<dyn MetadataExtractor>,
    state: SessionState,
    status: watch::Sender<SessionState>,
    report: Option<Report>,
    published: watch::Sender<Option<Report>>,
}

impl ComparisonSession {
    pub fn new(config: CompareConfig) -> Self {
        Self {
            engine: DigestEngine::with_buffer_size(config.buffer_size),
            config,
            extractor: Arc::new(NoMetadata),
            state: SessionState::Idle,
            status: watch::channel(SessionState::Idle).0,
            report: None,
            published: watch::channel(None).0,
        }
    }

    pub fn with_extractor(mut self, extractor: impl MetadataExtractor + 'static) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// Receiver that sees every state transition as it happens
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.status.subscribe()
    }

    /// Receiver holding a copy of the current report; updated before the
    /// session moves to `Reported`
    pub fn subscribe_report(&self) -> watch::Receiver<Option<Report>> {
        self.published.subscribe()
    }

    /// Back to `Idle`, dropping the report
    pub fn reset(&mut self) {
        self.set_report(None);
        self.set_state(SessionState::Idle);
    }

    /// Drop the report after an input changed
    pub fn discard_report(&mut self) {
        let had_report = self.report.is_some();
        self.set_report(None);
        if had_report || matches!(self.state, SessionState::Error { .. }) {
            self.set_state(SessionState::Idle);
        }
    }

    /// Validate, hash and compare; the new report replaces any previous one.
    ///
    /// Taking `&mut self` means a session never has two comparisons in
    /// flight. If the returned future is dropped mid-way, the spawned hash
    /// tasks finish on their own and their results are discarded.
    #[instrument(skip(self, request), fields(mode = ?request.mode, algorithm = %request.algorithm))]
    pub async fn compare(&mut self, request: &ComparisonRequest) -> Result<&Report, HashProofError> {
        self.set_report(None);
        self.set_state(SessionState::Validating);

        let plan = match validate(request) {
            Ok(plan) => plan,
            Err(e) => return Err(self.fail(e)),
        };
        debug!("request validated");

        self.set_state(SessionState::Computing);
        let algorithm = request.algorithm;

        let target = match plan {
            Plan::Files { source, comparison } => {
                let digests = futures::future::try_join(
                    self.digest(&source, algorithm),
                    self.digest(&comparison, algorithm),
                );
                let metadata = futures::future::join(
                    self.metadata(source.as_ref()),
                    self.metadata(comparison.as_ref()),
                );
                let (digests, (source_exif, comparison_exif)) = tokio::join!(digests, metadata);

                match digests {
                    Ok((source_hash, comparison_hash)) => (
                        FileDetails::from_source(source.as_ref(), source_exif),
                        source_hash,
                        ComparisonTarget::File {
                            details: FileDetails::from_source(comparison.as_ref(), comparison_exif),
                            digest: comparison_hash,
                        },
                    ),
                    Err(e) => return Err(self.fail(e)),
                }
            }
            Plan::Expected { source, expected } => {
                let (digest, source_exif) =
                    tokio::join!(self.digest(&source, algorithm), self.metadata(source.as_ref()));

                match digest {
                    Ok(source_hash) => (
                        FileDetails::from_source(source.as_ref(), source_exif),
                        source_hash,
                        ComparisonTarget::ExpectedHash(expected),
                    ),
                    Err(e) => return Err(self.fail(e)),
                }
            }
        };

        self.set_state(SessionState::Comparing);
        let (source_details, source_hash, target) = target;
        let report = ReportBuilder::new(algorithm, source_details, source_hash, target)
            .title(self.config.default_title.clone())
            .build();

        info!(
            report_id = %report.id(),
            matched = report.is_match(),
            "comparison report created"
        );

        self.set_report(Some(report));
        self.set_state(SessionState::Reported);
        self.report.as_ref().ok_or(HashProofError::NoReport)
    }

    /// Encode the current report in every requested format
    pub fn export(
        &self,
        registry: &EncoderRegistry,
        options: &ReportOptions,
    ) -> Result<Vec<ExportOutcome>, HashProofError> {
        let report = self.report.as_ref().ok_or(HashProofError::NoReport)?;
        registry.export(report, options)
    }

    /// Encode the current report and hand each payload to the sink.
    ///
    /// Delivery failures are recorded against their format; the rest still
    /// go out.
    pub fn export_to(
        &self,
        registry: &EncoderRegistry,
        options: &ReportOptions,
        sink: &dyn ReportSink,
    ) -> Result<Vec<ExportOutcome>, HashProofError> {
        let outcomes = self.export(registry, options)?;
        Ok(outcomes.into_iter().map(|outcome| outcome.deliver(sink)).collect())
    }

    fn set_report(&mut self, report: Option<Report>) {
        self.published.send_replace(report.clone());
        self.report = report;
    }

    fn set_state(&mut self, state: SessionState) {
        self.status.send_replace(state.clone());
        self.state = state;
    }

    fn fail(&mut self, error: HashProofError) -> HashProofError {
        self.set_state(SessionState::Error {
            message: error.user_message(),
        });
        error
    }

    async fn digest(
        &self,
        file: &Arc<dyn FileSource>,
        algorithm: HashAlgorithm,
    ) -> Result<String, HashProofError> {
        HashTask::spawn(Arc::clone(file), algorithm, self.engine).join().await
    }

    async fn metadata(&self, file: &dyn FileSource) -> Option<ExifData> {
        if !self.config.extract_metadata {
            return None;
        }
        match self.extractor.extract(file).await {
            Ok(tags) => tags.filter(|t| !t.is_empty()),
            Err(e) => {
                let error = HashProofError::MetadataExtractionFailed {
                    name: file.name().to_string(),
                    reason: e.to_string(),
                };
                warn!("{}", error.user_message());
                None
            }
        }
    }
}

impl Default for ComparisonSession {
    fn default() -> Self {
        Self::new(CompareConfig::default())
    }
}

fn validate(request: &ComparisonRequest) -> Result<Plan, HashProofError> {
    let source = request.source.clone().ok_or(HashProofError::MissingSourceFile)?;

    match request.mode {
        ComparisonMode::FileVsFile => {
            let comparison = request
                .comparison_file
                .clone()
                .ok_or(HashProofError::MissingComparisonFile)?;
            Ok(Plan::Files { source, comparison })
        }
        ComparisonMode::FileVsHash => {
            if request.expected_hash.trim().is_empty() {
                return Err(HashProofError::MissingExpectedHash);
            }
            Ok(Plan::Expected {
                source,
                expected: request.expected_hash.clone(),
            })
        }
    }
}

/// Shared handle to a session that refuses overlapping comparisons.
///
/// State and report are published as snapshots, so reading them never waits
/// on a comparison in flight.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<ComparisonSession>>,
    in_flight: Arc<AtomicBool>,
    state: watch::Receiver<SessionState>,
    report: watch::Receiver<Option<Report>>,
}

// Clears the in-flight flag when a comparison ends or its future is dropped
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SessionHandle {
    pub fn new(session: ComparisonSession) -> Self {
        let state = session.subscribe();
        let report = session.subscribe_report();
        Self {
            inner: Arc::new(Mutex::new(session)),
            in_flight: Arc::new(AtomicBool::new(false)),
            state,
            report,
        }
    }

    /// Run a comparison, or fail with `ComparisonInProgress` if one is
    /// already running on this session
    pub async fn compare(&self, request: &ComparisonRequest) -> Result<Report, HashProofError> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(HashProofError::ComparisonInProgress);
        }
        let _in_flight = InFlight(&self.in_flight);

        let mut session = self.inner.lock().await;
        session.compare(request).await.cloned()
    }

    pub fn is_comparing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Waits for a running comparison to finish, then resets
    pub async fn reset(&self) {
        self.inner.lock().await.reset();
    }

    pub fn report(&self) -> Option<Report> {
        self.report.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that sees every state transition as it happens
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    pub fn export(
        &self,
        registry: &EncoderRegistry,
        options: &ReportOptions,
    ) -> Result<Vec<ExportOutcome>, HashProofError> {
        let report = self.report().ok_or(HashProofError::NoReport)?;
        registry.export(&report, options)
    }
}
