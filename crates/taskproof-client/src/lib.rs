//! Task backend client for TaskProof.
//!
//! Provides the REST client for the task backend and the seams the
//! attestation flow writes through.

pub mod error;
pub mod http;
pub mod memory;
pub mod sink;

pub use error::ClientError;
pub use http::{AttestationPatch, HttpClient};
pub use memory::MemoryBackend;
pub use sink::{AttestationSink, TaskSource};
