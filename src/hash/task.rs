//! One-shot digest tasks.
//!
//! Each request hashes on tokio's blocking pool so that large inputs never
//! stall the async executor driving the comparison. A task is consumed by
//! [`HashTask::join`], so it yields exactly one result and cannot be reused.

use std::io::Cursor;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use super::hash::{DigestEngine, HashAlgorithm};
use crate::compare::input::FileSource;
use crate::error::HashProofError;

/// A single in-flight digest computation.
#[derive(Debug)]
pub struct HashTask {
    name: String,
    algorithm: HashAlgorithm,
    handle: JoinHandle<Result<String, HashProofError>>,
}

impl HashTask {
    /// Start hashing the full contents of a file source.
    pub fn spawn(file: Arc<dyn FileSource>, algorithm: HashAlgorithm, engine: DigestEngine) -> Self {
        let name = file.name().to_string();
        let task_name = name.clone();
        debug!(name = %name, algorithm = algorithm.name(), "spawning hash task");

        let handle = tokio::task::spawn_blocking(move || {
            let reader = file
                .open()
                .map_err(|e| HashProofError::digest_failed(&task_name, algorithm.name(), e))?;
            engine.digest_reader(reader, algorithm, &task_name)
        });

        Self { name, algorithm, handle }
    }

    /// Start hashing a buffer the task takes ownership of.
    pub fn from_buffer(
        name: impl Into<String>,
        buffer: Vec<u8>,
        algorithm: HashAlgorithm,
        engine: DigestEngine,
    ) -> Self {
        let name = name.into();
        let task_name = name.clone();

        let handle = tokio::task::spawn_blocking(move || {
            engine.digest_reader(Cursor::new(buffer), algorithm, &task_name)
        });

        Self { name, algorithm, handle }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Wait for the digest. A panicked or cancelled task is reported as a
    /// digest failure for this file.
    pub async fn join(self) -> Result<String, HashProofError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(HashProofError::digest_failed(&self.name, self.algorithm.name(), e)),
        }
    }
}
