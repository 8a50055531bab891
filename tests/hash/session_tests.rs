// Tests for the comparison session lifecycle

use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hashproof::compare::{
    ComparisonRequest, ComparisonSession, ExifData, FileSource, ImageMetadataGate, LocalFile,
    MemoryFile, MetadataExtractor, SessionHandle, SessionState,
};
use hashproof::hash::{DigestEngine, HashAlgorithm};
use hashproof::{CompareConfig, ErrorKind, HashProofError};

use crate::{fixed_time, sample_bytes, BrokenFile};

fn memory(name: &str, data: &[u8]) -> MemoryFile {
    MemoryFile::new(name, data.to_vec()).with_last_modified(fixed_time())
}

/// Extractor that fails for every file
struct FailingExtractor;

#[async_trait]
impl MetadataExtractor for FailingExtractor {
    async fn extract(&self, _file: &dyn FileSource) -> Result<Option<ExifData>> {
        Err(anyhow!("corrupt EXIF block"))
    }
}

/// Extractor returning fixed tags and counting its calls
struct CannedExtractor {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl MetadataExtractor for CannedExtractor {
    async fn extract(&self, _file: &dyn FileSource) -> Result<Option<ExifData>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut tags = ExifData::new();
        tags.insert("Make".to_string(), "Canon".to_string());
        tags.insert("Thumbnail".to_string(), "<binary>".to_string());
        tags.insert("Artist".to_string(), "  ".to_string());
        Ok(Some(tags))
    }
}

/// File source whose reader stalls before producing its bytes
struct SlowFile {
    delay: Duration,
}

struct SlowReader {
    delay: Option<Duration>,
    inner: Cursor<Vec<u8>>,
}

impl Read for SlowReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if let Some(delay) = self.delay.take() {
            std::thread::sleep(delay);
        }
        self.inner.read(buf)
    }
}

impl FileSource for SlowFile {
    fn name(&self) -> &str {
        "slow.bin"
    }

    fn size(&self) -> u64 {
        4
    }

    fn media_type(&self) -> &str {
        ""
    }

    fn last_modified(&self) -> DateTime<Utc> {
        fixed_time()
    }

    fn open(&self) -> Result<Box<dyn Read + Send>> {
        Ok(Box::new(SlowReader {
            delay: Some(self.delay),
            inner: Cursor::new(b"slow".to_vec()),
        }))
    }
}

#[tokio::test]
async fn test_identical_files_match() {
    let data = sample_bytes(64 * 1024, 21);
    let request = ComparisonRequest::file_vs_file(HashAlgorithm::Sha256)
        .source(memory("a.bin", &data))
        .comparison_file(memory("b.bin", &data));

    let mut session = ComparisonSession::default();
    let report = session.compare(&request).await.unwrap();

    assert!(report.is_match());
    assert_eq!(report.result(), "✅ Match");
    assert_eq!(report.source_hash(), report.target_hash());
    assert_eq!(report.source_hash(), DigestEngine::new().digest(&data, HashAlgorithm::Sha256));
    assert_eq!(report.target_identifier(), "b.bin");
    assert_eq!(report.title(), "File Hash Comparison Report");
    assert_eq!(report.target_file().unwrap().name, "b.bin");
    assert_eq!(session.state(), &SessionState::Reported);
    assert!(session.report().is_some());
}

#[tokio::test]
async fn test_different_files_mismatch() {
    let request = ComparisonRequest::file_vs_file(HashAlgorithm::Md5)
        .source(memory("a.txt", b"hello"))
        .comparison_file(memory("b.txt", b"hellp"));

    let mut session = ComparisonSession::default();
    let report = session.compare(&request).await.unwrap();

    assert!(!report.is_match());
    assert_eq!(report.result(), "❌ Mismatch");
    assert_ne!(report.source_hash(), report.target_hash());
}

#[tokio::test]
async fn test_expected_hash_is_normalized() {
    let expected = format!(" {} \n", "900150983CD24FB0D6963F7D28E17F72");
    let request = ComparisonRequest::file_vs_hash(HashAlgorithm::Md5)
        .source(memory("abc.txt", b"abc"))
        .expected_hash(expected);

    let mut session = ComparisonSession::default();
    let report = session.compare(&request).await.unwrap();

    assert!(report.is_match());
    assert_eq!(report.target_hash(), "900150983cd24fb0d6963f7d28e17f72");
    assert_eq!(report.target_identifier(), "Expected Hash");
    assert!(report.target_file().is_none());
}

#[tokio::test]
async fn test_wrong_expected_hash() {
    let request = ComparisonRequest::file_vs_hash(HashAlgorithm::Sha1)
        .source(memory("abc.txt", b"abc"))
        .expected_hash("0000");

    let mut session = ComparisonSession::default();
    let report = session.compare(&request).await.unwrap();
    assert!(!report.is_match());
    assert_eq!(report.target_hash(), "0000");
}

#[tokio::test]
async fn test_report_ids_are_unique() {
    let request = ComparisonRequest::file_vs_hash(HashAlgorithm::Md5)
        .source(memory("abc.txt", b"abc"))
        .expected_hash("900150983cd24fb0d6963f7d28e17f72");

    let mut session = ComparisonSession::default();
    let first = session.compare(&request).await.unwrap().id();
    let second = session.compare(&request).await.unwrap().id();
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_validation_failures() {
    let mut session = ComparisonSession::default();

    let err = session
        .compare(&ComparisonRequest::file_vs_file(HashAlgorithm::Md5))
        .await
        .unwrap_err();
    assert!(matches!(err, HashProofError::MissingSourceFile));
    assert_eq!(
        session.state(),
        &SessionState::Error {
            message: "Please select a source file.".to_string()
        }
    );

    let request = ComparisonRequest::file_vs_file(HashAlgorithm::Md5).source(memory("a", b"a"));
    let err = session.compare(&request).await.unwrap_err();
    assert!(matches!(err, HashProofError::MissingComparisonFile));

    let request = ComparisonRequest::file_vs_hash(HashAlgorithm::Md5)
        .source(memory("a", b"a"))
        .expected_hash("   ");
    let err = session.compare(&request).await.unwrap_err();
    assert!(matches!(err, HashProofError::MissingExpectedHash));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(session.report().is_none());
}

#[tokio::test]
async fn test_failed_comparison_drops_previous_report() {
    let mut session = ComparisonSession::default();
    let good = ComparisonRequest::file_vs_hash(HashAlgorithm::Md5)
        .source(memory("abc.txt", b"abc"))
        .expected_hash("900150983cd24fb0d6963f7d28e17f72");
    session.compare(&good).await.unwrap();
    assert!(session.report().is_some());

    let bad = ComparisonRequest::file_vs_file(HashAlgorithm::Md5).source(memory("abc.txt", b"abc"));
    assert!(session.compare(&bad).await.is_err());
    assert!(session.report().is_none());
}

#[tokio::test]
async fn test_digest_failure_sets_error_state() {
    let request = ComparisonRequest::file_vs_file(HashAlgorithm::Sha256)
        .source(memory("good.bin", b"fine"))
        .comparison_file(BrokenFile {
            name: "broken.bin".to_string(),
        });

    let mut session = ComparisonSession::default();
    let err = session.compare(&request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DigestComputation);
    match session.state() {
        SessionState::Error { message } => {
            assert!(message.contains("broken.bin"));
            assert!(message.contains("SHA-256"));
        }
        other => panic!("Expected error state, got {:?}", other),
    }
    assert!(session.report().is_none());
}

#[tokio::test]
async fn test_metadata_failure_does_not_abort() {
    let request = ComparisonRequest::file_vs_file(HashAlgorithm::Md5)
        .source(memory("photo.jpg", b"jpeg").with_media_type("image/jpeg"))
        .comparison_file(memory("copy.jpg", b"jpeg").with_media_type("image/jpeg"));

    let mut session = ComparisonSession::default().with_extractor(FailingExtractor);
    let report = session.compare(&request).await.unwrap();

    assert!(report.is_match());
    assert!(report.source_file().exif.is_none());
    assert!(report.target_file().unwrap().exif.is_none());
}

#[tokio::test]
async fn test_image_metadata_is_gated_and_cleaned() {
    let calls = Arc::new(AtomicUsize::new(0));
    let extractor = ImageMetadataGate::new(CannedExtractor {
        calls: Arc::clone(&calls),
    });
    let request = ComparisonRequest::file_vs_file(HashAlgorithm::Md5)
        .source(memory("photo.jpg", b"jpeg").with_media_type("image/jpeg"))
        .comparison_file(memory("notes.txt", b"text").with_media_type("text/plain"));

    let mut session = ComparisonSession::default().with_extractor(extractor);
    let report = session.compare(&request).await.unwrap();

    let exif = report.source_file().exif.as_ref().unwrap();
    assert_eq!(exif.get("Make").map(String::as_str), Some("Canon"));
    assert!(!exif.contains_key("Thumbnail"));
    assert!(!exif.contains_key("Artist"));
    assert!(report.target_file().unwrap().exif.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_metadata_can_be_disabled() {
    let calls = Arc::new(AtomicUsize::new(0));
    let config = CompareConfig {
        extract_metadata: false,
        ..CompareConfig::default()
    };
    let request = ComparisonRequest::file_vs_hash(HashAlgorithm::Md5)
        .source(memory("photo.jpg", b"jpeg").with_media_type("image/jpeg"))
        .expected_hash("abc");

    let mut session = ComparisonSession::new(config).with_extractor(CannedExtractor {
        calls: Arc::clone(&calls),
    });
    let report = session.compare(&request).await.unwrap();
    assert!(report.source_file().exif.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_reset_and_discard() {
    let request = ComparisonRequest::file_vs_hash(HashAlgorithm::Md5)
        .source(memory("abc.txt", b"abc"))
        .expected_hash("900150983cd24fb0d6963f7d28e17f72");

    let mut session = ComparisonSession::default();
    session.compare(&request).await.unwrap();
    session.reset();
    assert_eq!(session.state(), &SessionState::Idle);
    assert!(session.report().is_none());

    session.compare(&request).await.unwrap();
    session.discard_report();
    assert_eq!(session.state(), &SessionState::Idle);
    assert!(session.report().is_none());
}

#[tokio::test]
async fn test_local_files_compare() {
    let dir = tempfile::tempdir().unwrap();
    let data = sample_bytes(200_000, 42);
    let first = dir.path().join("first.bin");
    let second = dir.path().join("second.bin");
    std::fs::write(&first, &data).unwrap();
    std::fs::write(&second, &data).unwrap();

    let request = ComparisonRequest::file_vs_file(HashAlgorithm::Sha512)
        .source(LocalFile::open_path(&first).await.unwrap())
        .comparison_file(LocalFile::open_path(&second).await.unwrap());

    let config = CompareConfig {
        buffer_size: 8192,
        ..CompareConfig::default()
    };
    let mut session = ComparisonSession::new(config);
    let report = session.compare(&request).await.unwrap();

    assert!(report.is_match());
    assert_eq!(report.source_file().size, 200_000);
    assert_eq!(report.source_file().format_size(), "195.31 KB");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_handle_rejects_overlapping_comparison() {
    let handle = SessionHandle::new(ComparisonSession::default());
    let slow = ComparisonRequest::file_vs_hash(HashAlgorithm::Md5)
        .source(SlowFile {
            delay: Duration::from_millis(500),
        })
        .expected_hash("abc");

    let running = {
        let handle = handle.clone();
        tokio::spawn(async move { handle.compare(&slow).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let quick = ComparisonRequest::file_vs_hash(HashAlgorithm::Md5)
        .source(memory("abc.txt", b"abc"))
        .expected_hash("abc");
    let err = handle.compare(&quick).await.unwrap_err();
    assert!(matches!(err, HashProofError::ComparisonInProgress));
    assert_eq!(err.kind(), ErrorKind::Busy);

    let report = running.await.unwrap().unwrap();
    assert_eq!(report.source_file().name, "slow.bin");
    assert_eq!(handle.report().map(|r| r.id()), Some(report.id()));
    assert_eq!(handle.state(), SessionState::Reported);
    assert!(!handle.is_comparing());

    handle.reset().await;
    assert!(handle.report().is_none());
    assert_eq!(handle.state(), SessionState::Idle);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_handle_shows_computing_while_hashing() {
    let handle = SessionHandle::new(ComparisonSession::default());
    let mut transitions = handle.subscribe();
    let slow = ComparisonRequest::file_vs_hash(HashAlgorithm::Md5)
        .source(SlowFile {
            delay: Duration::from_millis(800),
        })
        .expected_hash("abc");

    let running = {
        let handle = handle.clone();
        tokio::spawn(async move { handle.compare(&slow).await })
    };

    tokio::time::timeout(
        Duration::from_millis(300),
        transitions.wait_for(|state| *state == SessionState::Computing),
    )
    .await
    .expect("state transitions should be visible mid-comparison")
    .unwrap();

    assert_eq!(handle.state(), SessionState::Computing);
    assert!(handle.is_comparing());
    assert!(handle.report().is_none());

    let report = running.await.unwrap().unwrap();
    assert_eq!(handle.state(), SessionState::Reported);
    assert_eq!(handle.report().map(|r| r.id()), Some(report.id()));
}

#[tokio::test]
async fn test_handle_reads_do_not_block_a_new_comparison() {
    let handle = SessionHandle::new(ComparisonSession::default());
    let request = ComparisonRequest::file_vs_hash(HashAlgorithm::Md5)
        .source(memory("abc.txt", b"abc"))
        .expected_hash("900150983cd24fb0d6963f7d28e17f72");

    let observer = handle.clone();
    assert_eq!(observer.state(), SessionState::Idle);
    let report = handle.compare(&request).await.unwrap();
    assert!(report.is_match());

    let options = hashproof::ReportOptions::new([hashproof::ReportFormat::Txt]).unwrap();
    let outcomes = observer
        .export(&hashproof::EncoderRegistry::with_defaults(), &options)
        .unwrap();
    assert!(outcomes[0].is_ok());
}

#[tokio::test]
async fn test_report_snapshot_follows_session() {
    let mut session = ComparisonSession::default();
    let reports = session.subscribe_report();
    let request = ComparisonRequest::file_vs_hash(HashAlgorithm::Md5)
        .source(memory("abc.txt", b"abc"))
        .expected_hash("900150983cd24fb0d6963f7d28e17f72");

    let id = session.compare(&request).await.unwrap().id();
    assert_eq!(reports.borrow().as_ref().map(|r| r.id()), Some(id));

    session.discard_report();
    assert!(reports.borrow().is_none());
}
