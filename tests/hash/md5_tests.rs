// Tests for the hand-written MD5
// Cross-checked against the md-5 crate

use hashproof::hash::{DigestEngine, HashAlgorithm, Md5};
use md5::{Digest as _, Md5 as ReferenceMd5};

use crate::sample_bytes;

fn reference_hex(data: &[u8]) -> String {
    format!("{:x}", ReferenceMd5::digest(data))
}

#[test]
fn test_md5_empty_and_abc() {
    let engine = DigestEngine::new();
    assert_eq!(engine.digest(b"", HashAlgorithm::Md5), "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(engine.digest(b"abc", HashAlgorithm::Md5), "900150983cd24fb0d6963f7d28e17f72");
}

#[test]
fn test_md5_matches_reference_for_all_small_lengths() {
    let engine = DigestEngine::new();
    for len in 0..300 {
        let data = sample_bytes(len, len as u32);
        assert_eq!(
            engine.digest(&data, HashAlgorithm::Md5),
            reference_hex(&data),
            "length {}",
            len
        );
    }
}

#[test]
fn test_md5_large_buffer() {
    let data = sample_bytes(3 * 1024 * 1024 + 17, 7);
    let engine = DigestEngine::new();
    assert_eq!(engine.digest(&data, HashAlgorithm::Md5), reference_hex(&data));
}

#[test]
fn test_md5_streaming_with_small_buffer() {
    // A 7-byte read buffer forces every block boundary case through update()
    let data = sample_bytes(10_000, 3);
    let engine = DigestEngine::with_buffer_size(7);
    let digest = engine.digest_reader(&data[..], HashAlgorithm::Md5, "sample").unwrap();
    assert_eq!(digest, reference_hex(&data));
}

#[test]
fn test_md5_output_format() {
    let digest = Md5::digest(b"The quick brown fox jumps over the lazy dog");
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    assert_eq!(hex, "9e107d9d372bb6826bd81d3542a419d6");
}
