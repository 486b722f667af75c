//! Storage Port (Driven Port)
//!
//! Per-security message sinks. Writes are ordered by the caller; sinks only
//! persist.

use crate::domain::messages::Message;
use crate::domain::shared::SecurityId;

/// Storage error.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O failure on a sink target.
    #[error("storage I/O error on {target}: {source}")]
    Io {
        /// Sink target (file path or name).
        target: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Message encoding failed.
    #[error("message encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// The sink refused the batch.
    #[error("storage rejected batch: {0}")]
    Rejected(String),
}

/// Destination for one security's messages.
pub trait MessageSink {
    /// Persist a batch, already sorted by server time.
    fn save(&mut self, messages: &[Message]) -> Result<(), StorageError>;
}

/// Factory of message sinks.
pub trait StoragePort: Send + Sync {
    /// Sink for a security, or the default sink for messages without one.
    fn sink(&self, security: Option<&SecurityId>) -> Result<Box<dyn MessageSink + '_>, StorageError>;
}
