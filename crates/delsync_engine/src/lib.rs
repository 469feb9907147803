//! # delsync Engine
//!
//! Delete-for-me sync between a user's linked devices.
//!
//! This crate provides:
//! - Resolution of local threads and messages to cross-device identifiers
//! - `DeleteForMeSender`: applies a deletion locally and enqueues its sync
//! - `OutgoingSyncMessage` and `Outbox`: durable envelopes, lowered to the
//!   wire form only when the send pipeline pulls them
//! - `Reconciler`: applies received deletions to local storage
//!
//! ## Flow
//!
//! ```text
//! user action ──► DeleteForMeSender ──► Outbox ──► send pipeline
//!                                                      │
//! local store ◄── Reconciler ◄── linked device ◄───────┘
//! ```
//!
//! The engine performs no I/O of its own. Every operation runs against a
//! caller-supplied [`delsync_store::MessageStore`] or transaction.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod outgoing;
mod reconcile;
mod resolve;
mod sender;

pub use config::{
    DeleteSyncConfig, DEFAULT_MAX_ADDRESSABLE_MESSAGES_PER_SYNC, DEFAULT_MAX_ANCHOR_MESSAGES,
};
pub use error::{EngineError, EngineResult};
pub use outgoing::{Outbox, OutgoingSyncMessage};
pub use reconcile::{Pass, ReconcileReport, Reconciler};
pub use resolve::{addressable_message, conversation_identifier};
pub use sender::{DeleteForMeSender, SendOutcome};
