//! # delsync Store
//!
//! Storage and identity boundaries that delete-for-me sync runs against.
//!
//! This crate provides:
//! - `MessageStore` / `StoreTransaction` traits for transactional access to
//!   threads, messages and the outgoing sync queue
//! - `IdentityDirectory` for mapping local recipients to account ids and
//!   phone numbers
//! - `InMemoryStore` for tests and tooling
//!
//! ## Transactions
//!
//! Every mutation goes through [`MessageStore::write`]. The closure receives a
//! transaction and its changes are committed only if it returns `Ok`:
//!
//! ```rust
//! use delsync_store::{HistoryBound, InMemoryStore, MessageOrigin, MessageStore, StoreTransaction};
//!
//! let store = InMemoryStore::new();
//! let thread = store.add_unaddressable_thread();
//! store.insert_message(thread, 10, MessageOrigin::Outgoing);
//!
//! let removed = store
//!     .write(|txn| txn.delete_thread_history(thread, HistoryBound::Full))
//!     .unwrap();
//! assert_eq!(removed, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod memory;
mod types;

pub use backend::{IdentityDirectory, MessageStore, StoreTransaction};
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryStore, MemoryState};
pub use types::{
    HistoryBound, LocalIdentifiers, LocalMessage, LocalThread, MessageOrigin, MessageRowId,
    OutboxEntry, OutboxId, RecipientAddress, RecipientId, ThreadId, ThreadKind,
};
