// Test entry point for hashproof
// Digest engine, comparison session and export tests, one file per concern

mod md5_tests;
mod session_tests;

use std::io::{self, Read};

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use hashproof::compare::FileSource;

/// Fixed timestamp so fixtures are reproducible
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap()
}

/// Deterministic pseudo-random bytes
pub fn sample_bytes(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (state >> 16) as u8
        })
        .collect()
}

/// File source whose reads always fail
pub struct BrokenFile {
    pub name: String,
}

impl FileSource for BrokenFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        1024
    }

    fn media_type(&self) -> &str {
        "application/octet-stream"
    }

    fn last_modified(&self) -> DateTime<Utc> {
        fixed_time()
    }

    fn open(&self) -> Result<Box<dyn Read + Send>> {
        Ok(Box::new(FailingReader))
    }
}

pub struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "stream fault"))
    }
}
