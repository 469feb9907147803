//! Error types for the store crate.

use crate::types::{OutboxId, ThreadId};
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a message store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The thread does not exist.
    #[error("thread {0:?} not found")]
    ThreadNotFound(ThreadId),

    /// The outbox entry does not exist.
    #[error("outbox entry {0:?} not found")]
    OutboxEntryNotFound(OutboxId),

    /// The transaction was rolled back.
    #[error("transaction aborted: {reason}")]
    TransactionAborted {
        /// Why the transaction was aborted.
        reason: String,
    },
}

impl StoreError {
    /// Create a transaction aborted error.
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::TransactionAborted {
            reason: reason.into(),
        }
    }
}
