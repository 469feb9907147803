//! Error types for the protocol crate.

use delsync_codec::CodecError;
use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while building or decoding delete-for-me payloads.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// The durable bytes are not valid canonical CBOR.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// A required field is absent.
    #[error("{record}: missing field `{field}`")]
    MissingField {
        /// Record being decoded.
        record: &'static str,
        /// Name of the absent field.
        field: &'static str,
    },

    /// A field is present but has the wrong shape.
    #[error("{record}: invalid field `{field}`: {reason}")]
    InvalidField {
        /// Record being decoded.
        record: &'static str,
        /// Name of the offending field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// Not a service-id UUID.
    #[error("invalid account id: {0}")]
    InvalidAccountId(String),

    /// Not an E.164 phone number.
    #[error("invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    /// Empty group identifier.
    #[error("group id must not be empty")]
    EmptyGroupId,

    /// The protobuf wire bytes could not be parsed.
    #[error("wire decode error: {0}")]
    Wire(String),
}

impl ProtocolError {
    /// Create an invalid field error.
    pub fn invalid_field(
        record: &'static str,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            record,
            field,
            reason: reason.into(),
        }
    }
}

impl From<prost::DecodeError> for ProtocolError {
    fn from(err: prost::DecodeError) -> Self {
        Self::Wire(err.to_string())
    }
}
