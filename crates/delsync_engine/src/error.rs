//! Error types for the sync engine.

use delsync_codec::CodecError;
use delsync_protocol::ProtocolError;
use delsync_store::StoreError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while building or applying delete syncs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The intent set could not be encoded; no envelope was created.
    #[error("failed to encode sync payload: {0}")]
    Encode(CodecError),

    /// A stored record was malformed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The message store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Returns true if the failure came from the store rather than the payload.
    pub fn is_store_error(&self) -> bool {
        matches!(self, EngineError::Store(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delsync_store::ThreadId;

    #[test]
    fn error_display() {
        let err = EngineError::Encode(CodecError::encoding_failed("duplicate key"));
        assert!(err.to_string().contains("duplicate key"));

        let err: EngineError = StoreError::ThreadNotFound(ThreadId(3)).into();
        assert!(err.is_store_error());
        assert!(err.to_string().contains("store error"));
    }
}
