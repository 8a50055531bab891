// Digest engine
// Hand-written MD5, SHA family wrappers and one-shot hashing tasks

pub mod hash;
pub mod md5;
pub mod task;

pub use hash::{DigestEngine, HashAlgorithm, HashRegistry, Hasher};
pub use md5::Md5;
pub use task::HashTask;
