//! Storage and identity boundary traits.

use crate::error::{StoreError, StoreResult};
use crate::types::{
    HistoryBound, LocalIdentifiers, LocalMessage, LocalThread, MessageOrigin, MessageRowId,
    OutboxEntry, OutboxId, RecipientAddress, RecipientId, ThreadId,
};
use delsync_protocol::{Author, ConversationIdentifier};

/// Maps local recipients to their cross-device identity.
pub trait IdentityDirectory {
    /// Known identifiers for a recipient, or `None` for an unknown row.
    fn address(&self, recipient: RecipientId) -> Option<RecipientAddress>;

    /// Identifiers of the local user, once registered.
    fn local_identifiers(&self) -> Option<LocalIdentifiers>;

    /// The address a message was authored by.
    ///
    /// Local info messages have no author.
    fn author_address(&self, origin: MessageOrigin) -> Option<RecipientAddress> {
        match origin {
            MessageOrigin::Incoming { author } => self.address(author),
            MessageOrigin::Outgoing => self.local_identifiers().map(|ids| ids.address()),
            MessageOrigin::Local => None,
        }
    }
}

/// A read/write scope over thread, message and outbox storage.
///
/// All mutations made through one transaction become visible together when
/// the owning [`MessageStore`] commits it.
pub trait StoreTransaction: IdentityDirectory {
    /// Looks up a thread by row id.
    fn thread(&self, id: ThreadId) -> StoreResult<Option<LocalThread>>;

    /// Looks up the local thread a conversation identifier refers to.
    fn find_thread(&self, conversation: &ConversationIdentifier)
        -> StoreResult<Option<LocalThread>>;

    /// All messages in a thread, oldest first.
    fn messages_in_thread(&self, thread: ThreadId) -> StoreResult<Vec<LocalMessage>>;

    /// Messages in a thread sent by `author` at `sent_timestamp`.
    ///
    /// More than one row can match when timestamps collide.
    fn find_messages(
        &self,
        thread: ThreadId,
        author: &Author,
        sent_timestamp: u64,
    ) -> StoreResult<Vec<LocalMessage>> {
        Ok(self
            .messages_in_thread(thread)?
            .into_iter()
            .filter(|m| m.timestamp == sent_timestamp)
            .filter(|m| {
                self.author_address(m.origin)
                    .is_some_and(|address| address.matches(author))
            })
            .collect())
    }

    /// Deletes message rows; returns how many existed.
    fn delete_messages(&mut self, rows: &[MessageRowId]) -> StoreResult<usize>;

    /// Deletes a thread's history within `bound`; returns how many rows went.
    fn delete_thread_history(&mut self, thread: ThreadId, bound: HistoryBound)
        -> StoreResult<usize>;

    /// Persists an outgoing sync record.
    fn enqueue_outgoing(&mut self, record: Vec<u8>) -> StoreResult<OutboxId>;

    /// Pending outgoing records in enqueue order.
    fn outgoing(&self) -> StoreResult<Vec<OutboxEntry>>;

    /// Removes an outgoing record once the send pipeline is done with it.
    fn retire_outgoing(&mut self, id: OutboxId) -> StoreResult<()>;
}

/// Transactional access to a message store.
///
/// # Invariants
///
/// - A `write` closure that returns `Err` leaves the store unchanged
/// - Readers never observe a partially applied `write`
pub trait MessageStore: Send + Sync {
    /// The transaction type handed to closures.
    type Transaction: StoreTransaction;

    /// Runs `f` against a read-only view.
    fn read<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Self::Transaction) -> StoreResult<T>;

    /// Runs `f` in a write transaction, committing on `Ok`.
    ///
    /// The closure may use any error type a [`StoreError`] converts into, so
    /// callers can abort with their own errors.
    fn write<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut Self::Transaction) -> Result<T, E>;
}
