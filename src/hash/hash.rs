// Hash computation module
// Provides the algorithm set, hasher registry and the digest engine

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::md5::Md5;
use crate::error::HashProofError;

/// Trait for hash algorithm implementations
pub trait Hasher: Send {
    /// Update the hasher with new data
    fn update(&mut self, data: &[u8]);

    /// Finalize the hash and return the result
    fn finalize(self: Box<Self>) -> Vec<u8>;

    /// Get the output size in bytes
    fn output_size(&self) -> usize;
}

/// Digest algorithms a comparison can be run with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[serde(rename = "MD5")]
    Md5,
    #[serde(rename = "SHA-1")]
    Sha1,
    #[serde(rename = "SHA-256")]
    Sha256,
    #[serde(rename = "SHA-384")]
    Sha384,
    #[serde(rename = "SHA-512")]
    Sha512,
}

impl HashAlgorithm {
    pub fn all() -> [HashAlgorithm; 5] {
        [
            HashAlgorithm::Md5,
            HashAlgorithm::Sha1,
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha384,
            HashAlgorithm::Sha512,
        ]
    }

    /// Display name, as shown in reports
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Sha1 => "SHA-1",
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha384 => "SHA-384",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }

    pub fn output_bits(&self) -> usize {
        match self {
            HashAlgorithm::Md5 => 128,
            HashAlgorithm::Sha1 => 160,
            HashAlgorithm::Sha256 => 256,
            HashAlgorithm::Sha384 => 384,
            HashAlgorithm::Sha512 => 512,
        }
    }

    /// Length of the lowercase hex digest
    pub fn hex_len(&self) -> usize {
        self.output_bits() / 4
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = HashProofError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(HashProofError::UnsupportedAlgorithm {
                algorithm: s.to_string(),
            }),
        }
    }
}

// Wrapper types for hash algorithms
use sha1::{Digest as Sha1Digest, Sha1};
use sha2::{Digest as Sha2Digest, Sha256, Sha384, Sha512};

// MD5 wrapper around the in-crate implementation
pub struct Md5Wrapper(Md5);

impl Hasher for Md5Wrapper {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().to_vec()
    }

    fn output_size(&self) -> usize {
        16 // 128 bits
    }
}

// SHA1 wrapper
pub struct Sha1Wrapper(Sha1);

impl Hasher for Sha1Wrapper {
    fn update(&mut self, data: &[u8]) {
        Sha1Digest::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        Sha1Digest::finalize(self.0).to_vec()
    }

    fn output_size(&self) -> usize {
        20 // 160 bits
    }
}

// SHA-256 wrapper
pub struct Sha256Wrapper(Sha256);

impl Hasher for Sha256Wrapper {
    fn update(&mut self, data: &[u8]) {
        Sha2Digest::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        Sha2Digest::finalize(self.0).to_vec()
    }

    fn output_size(&self) -> usize {
        32 // 256 bits
    }
}

// SHA-384 wrapper
pub struct Sha384Wrapper(Sha384);

impl Hasher for Sha384Wrapper {
    fn update(&mut self, data: &[u8]) {
        Sha2Digest::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        Sha2Digest::finalize(self.0).to_vec()
    }

    fn output_size(&self) -> usize {
        48 // 384 bits
    }
}

// SHA-512 wrapper
pub struct Sha512Wrapper(Sha512);

impl Hasher for Sha512Wrapper {
    fn update(&mut self, data: &[u8]) {
        Sha2Digest::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        Sha2Digest::finalize(self.0).to_vec()
    }

    fn output_size(&self) -> usize {
        64 // 512 bits
    }
}

/// Registry of available hash algorithms
pub struct HashRegistry;

impl HashRegistry {
    /// Get a fresh hasher for the given algorithm
    pub fn get_hasher(algorithm: HashAlgorithm) -> Box<dyn Hasher> {
        match algorithm {
            HashAlgorithm::Md5 => Box::new(Md5Wrapper(Md5::new())),
            HashAlgorithm::Sha1 => Box::new(Sha1Wrapper(Sha1Digest::new())),
            HashAlgorithm::Sha256 => Box::new(Sha256Wrapper(Sha2Digest::new())),
            HashAlgorithm::Sha384 => Box::new(Sha384Wrapper(Sha2Digest::new())),
            HashAlgorithm::Sha512 => Box::new(Sha512Wrapper(Sha2Digest::new())),
        }
    }

    /// Look up a hasher by algorithm name
    pub fn get_hasher_by_name(algorithm: &str) -> Result<Box<dyn Hasher>, HashProofError> {
        let algorithm: HashAlgorithm = algorithm.parse()?;
        Ok(Self::get_hasher(algorithm))
    }
}

/// Computes lowercase hex digests of buffers and readers
#[derive(Debug, Clone, Copy)]
pub struct DigestEngine {
    buffer_size: usize,
}

impl DigestEngine {
    /// Create a new DigestEngine with default buffer size (1MB)
    pub fn new() -> Self {
        Self {
            buffer_size: 1024 * 1024,
        }
    }

    /// Create a new DigestEngine with custom read buffer size
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Digest a complete in-memory buffer
    pub fn digest(&self, buffer: &[u8], algorithm: HashAlgorithm) -> String {
        let mut hasher = HashRegistry::get_hasher(algorithm);
        hasher.update(buffer);
        bytes_to_hex(&hasher.finalize())
    }

    /// Digest a buffer with the algorithm given by name
    pub fn digest_named(&self, buffer: &[u8], algorithm: &str) -> Result<String, HashProofError> {
        let algorithm: HashAlgorithm = algorithm.parse()?;
        Ok(self.digest(buffer, algorithm))
    }

    /// Digest everything a reader yields, streaming it through in chunks
    pub fn digest_reader<R: Read>(
        &self,
        mut reader: R,
        algorithm: HashAlgorithm,
        name: &str,
    ) -> Result<String, HashProofError> {
        let mut hasher = HashRegistry::get_hasher(algorithm);
        let mut buffer = vec![0u8; self.buffer_size];
        let mut total = 0u64;

        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashProofError::digest_failed(name, algorithm.name(), e)),
            };
            hasher.update(&buffer[..bytes_read]);
            total += bytes_read as u64;
        }

        debug!(name, algorithm = algorithm.name(), bytes = total, "digest computed");
        Ok(bytes_to_hex(&hasher.finalize()))
    }
}

impl Default for DigestEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert bytes to hexadecimal string
pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
