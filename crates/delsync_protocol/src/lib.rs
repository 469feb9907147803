//! # delsync Protocol
//!
//! Payload types and codecs for "delete for me" sync between a user's
//! linked devices.
//!
//! This crate provides:
//! - Cross-device identifiers (`ConversationIdentifier`, `AddressableMessage`)
//! - The delete intent set (`Contents`) and its three kinds of deletion
//! - A versioned durable encoding on top of canonical CBOR
//! - The protobuf wire schema and the lowering/raising between the two
//!
//! The durable and wire forms are deliberately separate: payloads sit in
//! storage in the durable form and are lowered to protobuf only when the
//! send pipeline asks for them, so either schema can evolve on its own.
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod contents;
mod error;
mod identifier;
mod lowering;
mod record;
pub mod wire;

pub use contents::{
    Contents, ConversationDelete, LocalOnlyConversationDelete, MessageDeletes, CONTENTS_VERSION,
};
pub use delsync_codec::{Decode, Encode};
pub use error::{ProtocolError, ProtocolResult};
pub use identifier::{
    AccountId, AddressableMessage, Author, ConversationIdentifier, GroupId, PhoneNumber,
    UnknownVariant,
};
pub use lowering::{Lowered, Raised};
