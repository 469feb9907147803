//! In-memory message store for testing.

use crate::backend::{IdentityDirectory, MessageStore, StoreTransaction};
use crate::error::{StoreError, StoreResult};
use crate::types::{
    HistoryBound, LocalIdentifiers, LocalMessage, LocalThread, MessageOrigin, MessageRowId,
    OutboxEntry, OutboxId, RecipientAddress, RecipientId, ThreadId, ThreadKind,
};
use delsync_protocol::{ConversationIdentifier, GroupId};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Full contents of an [`InMemoryStore`].
///
/// Doubles as the transaction type: a write transaction works on a private
/// copy that replaces the committed state only when the closure succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryState {
    recipients: BTreeMap<RecipientId, RecipientAddress>,
    local: Option<LocalIdentifiers>,
    threads: BTreeMap<ThreadId, ThreadKind>,
    messages: BTreeMap<MessageRowId, LocalMessage>,
    outbox: BTreeMap<OutboxId, Vec<u8>>,
    next_id: u64,
}

impl MemoryState {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Every message row, in row id order.
    pub fn all_messages(&self) -> Vec<LocalMessage> {
        self.messages.values().cloned().collect()
    }

    fn contact_thread(&self, matches: impl Fn(&RecipientAddress) -> bool) -> Option<LocalThread> {
        self.threads.iter().find_map(|(id, kind)| match kind {
            ThreadKind::Contact(recipient) => self
                .recipients
                .get(recipient)
                .filter(|address| matches(address))
                .map(|_| LocalThread {
                    id: *id,
                    kind: kind.clone(),
                }),
            ThreadKind::Group(_) => None,
        })
    }

    fn group_thread(&self, group: &GroupId) -> Option<LocalThread> {
        self.threads.iter().find_map(|(id, kind)| match kind {
            ThreadKind::Group(g) if g == group => Some(LocalThread {
                id: *id,
                kind: kind.clone(),
            }),
            _ => None,
        })
    }
}

impl IdentityDirectory for MemoryState {
    fn address(&self, recipient: RecipientId) -> Option<RecipientAddress> {
        self.recipients.get(&recipient).cloned()
    }

    fn local_identifiers(&self) -> Option<LocalIdentifiers> {
        self.local.clone()
    }
}

impl StoreTransaction for MemoryState {
    fn thread(&self, id: ThreadId) -> StoreResult<Option<LocalThread>> {
        Ok(self.threads.get(&id).map(|kind| LocalThread {
            id,
            kind: kind.clone(),
        }))
    }

    fn find_thread(
        &self,
        conversation: &ConversationIdentifier,
    ) -> StoreResult<Option<LocalThread>> {
        Ok(match conversation {
            ConversationIdentifier::AccountId(aci) => {
                self.contact_thread(|a| a.account_id.as_ref() == Some(aci))
            }
            ConversationIdentifier::PhoneNumber(e164) => {
                self.contact_thread(|a| a.phone_number.as_ref() == Some(e164))
            }
            ConversationIdentifier::GroupId(group) => self.group_thread(group),
            ConversationIdentifier::Unknown(_) => None,
        })
    }

    fn messages_in_thread(&self, thread: ThreadId) -> StoreResult<Vec<LocalMessage>> {
        let mut messages: Vec<LocalMessage> = self
            .messages
            .values()
            .filter(|m| m.thread_id == thread)
            .cloned()
            .collect();
        messages.sort_by_key(|m| (m.timestamp, m.row_id));
        Ok(messages)
    }

    fn delete_messages(&mut self, rows: &[MessageRowId]) -> StoreResult<usize> {
        Ok(rows
            .iter()
            .filter(|row| self.messages.remove(*row).is_some())
            .count())
    }

    fn delete_thread_history(
        &mut self,
        thread: ThreadId,
        bound: HistoryBound,
    ) -> StoreResult<usize> {
        if !self.threads.contains_key(&thread) {
            return Err(StoreError::ThreadNotFound(thread));
        }
        let before = self.messages.len();
        self.messages
            .retain(|_, m| m.thread_id != thread || !bound.covers(m.timestamp));
        Ok(before - self.messages.len())
    }

    fn enqueue_outgoing(&mut self, record: Vec<u8>) -> StoreResult<OutboxId> {
        let id = OutboxId(self.allocate());
        self.outbox.insert(id, record);
        Ok(id)
    }

    fn outgoing(&self) -> StoreResult<Vec<OutboxEntry>> {
        Ok(self
            .outbox
            .iter()
            .map(|(id, record)| OutboxEntry {
                id: *id,
                record: record.clone(),
            })
            .collect())
    }

    fn retire_outgoing(&mut self, id: OutboxId) -> StoreResult<()> {
        self.outbox
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::OutboxEntryNotFound(id))
    }
}

/// An in-memory message store.
///
/// Suitable for unit and integration tests. Writers are serialized by the
/// lock; a failed write leaves the committed state untouched.
///
/// # Example
///
/// ```rust
/// use delsync_store::{InMemoryStore, MessageOrigin, MessageStore, StoreTransaction};
///
/// let store = InMemoryStore::new();
/// let thread = store.add_unaddressable_thread();
/// store.insert_message(thread, 1000, MessageOrigin::Local);
///
/// let count = store.read(|txn| Ok(txn.messages_in_thread(thread)?.len())).unwrap();
/// assert_eq!(count, 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding a copy of `state`.
    #[must_use]
    pub fn with_state(state: MemoryState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Returns a copy of the committed state.
    #[must_use]
    pub fn snapshot(&self) -> MemoryState {
        self.state.read().clone()
    }

    /// Creates an independent store with the same committed state.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self::with_state(self.snapshot())
    }

    /// Registers the local user.
    pub fn set_local_identifiers(&self, local: LocalIdentifiers) {
        self.state.write().local = Some(local);
    }

    /// Adds a recipient to the directory.
    pub fn add_recipient(&self, address: RecipientAddress) -> RecipientId {
        let mut state = self.state.write();
        let id = RecipientId(state.allocate());
        state.recipients.insert(id, address);
        id
    }

    /// Adds a direct thread with `recipient`.
    pub fn add_contact_thread(&self, recipient: RecipientId) -> ThreadId {
        self.add_thread(ThreadKind::Contact(recipient))
    }

    /// Adds a group thread.
    pub fn add_group_thread(&self, group: GroupId) -> ThreadId {
        self.add_thread(ThreadKind::Group(group))
    }

    /// Adds a thread whose peer has no identifiers at all.
    pub fn add_unaddressable_thread(&self) -> ThreadId {
        let recipient = self.add_recipient(RecipientAddress::default());
        self.add_contact_thread(recipient)
    }

    fn add_thread(&self, kind: ThreadKind) -> ThreadId {
        let mut state = self.state.write();
        let id = ThreadId(state.allocate());
        state.threads.insert(id, kind);
        id
    }

    /// Inserts a message row.
    pub fn insert_message(
        &self,
        thread: ThreadId,
        timestamp: u64,
        origin: MessageOrigin,
    ) -> MessageRowId {
        let mut state = self.state.write();
        let row_id = MessageRowId(state.allocate());
        state.messages.insert(
            row_id,
            LocalMessage {
                row_id,
                thread_id: thread,
                timestamp,
                origin,
            },
        );
        row_id
    }

    /// Timestamps of a thread's messages, oldest first.
    pub fn timestamps(&self, thread: ThreadId) -> StoreResult<Vec<u64>> {
        self.read(|txn| {
            Ok(txn
                .messages_in_thread(thread)?
                .into_iter()
                .map(|m| m.timestamp)
                .collect())
        })
    }

    /// Number of pending outbox entries.
    pub fn outbox_len(&self) -> usize {
        self.state.read().outbox.len()
    }
}

impl MessageStore for InMemoryStore {
    type Transaction = MemoryState;

    fn read<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Self::Transaction) -> StoreResult<T>,
    {
        let state = self.state.read();
        f(&state)
    }

    fn write<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut Self::Transaction) -> Result<T, E>,
    {
        let mut state = self.state.write();
        let mut txn = state.clone();
        let result = f(&mut txn)?;
        *state = txn;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delsync_protocol::{AccountId, Author, PhoneNumber};

    fn aci(n: u8) -> AccountId {
        AccountId::parse(&format!("00000000-0000-4000-8000-0000000000{n:02x}")).unwrap()
    }

    #[test]
    fn find_thread_by_account_id_and_phone() {
        let store = InMemoryStore::new();
        let phone = PhoneNumber::parse("+15550100").unwrap();
        let bob = store.add_recipient(RecipientAddress {
            account_id: Some(aci(1)),
            phone_number: Some(phone.clone()),
        });
        let thread = store.add_contact_thread(bob);

        store
            .read(|txn| {
                let by_aci = txn.find_thread(&ConversationIdentifier::AccountId(aci(1)))?;
                let by_phone = txn.find_thread(&ConversationIdentifier::PhoneNumber(phone.clone()))?;
                let miss = txn.find_thread(&ConversationIdentifier::AccountId(aci(2)))?;
                assert_eq!(by_aci.map(|t| t.id), Some(thread));
                assert_eq!(by_phone.map(|t| t.id), Some(thread));
                assert!(miss.is_none());
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn find_group_thread() {
        let store = InMemoryStore::new();
        let group = GroupId::new(vec![7u8; 32]).unwrap();
        let thread = store.add_group_thread(group.clone());

        let found = store
            .read(|txn| txn.find_thread(&ConversationIdentifier::GroupId(group.clone())))
            .unwrap();
        assert_eq!(found.map(|t| t.id), Some(thread));
    }

    #[test]
    fn messages_are_returned_oldest_first() {
        let store = InMemoryStore::new();
        let thread = store.add_unaddressable_thread();
        store.insert_message(thread, 300, MessageOrigin::Outgoing);
        store.insert_message(thread, 100, MessageOrigin::Outgoing);
        store.insert_message(thread, 200, MessageOrigin::Outgoing);

        assert_eq!(store.timestamps(thread).unwrap(), vec![100, 200, 300]);
    }

    #[test]
    fn find_messages_matches_author_and_timestamp() {
        let store = InMemoryStore::new();
        let alice = store.add_recipient(RecipientAddress::from_account_id(aci(1)));
        store.set_local_identifiers(LocalIdentifiers {
            account_id: aci(9),
            phone_number: None,
        });
        let thread = store.add_contact_thread(alice);
        let a = store.insert_message(thread, 1000, MessageOrigin::Incoming { author: alice });
        let b = store.insert_message(thread, 1000, MessageOrigin::Incoming { author: alice });
        store.insert_message(thread, 1000, MessageOrigin::Outgoing);
        store.insert_message(thread, 1000, MessageOrigin::Local);

        let rows = store
            .read(|txn| txn.find_messages(thread, &Author::AccountId(aci(1)), 1000))
            .unwrap();
        let ids: Vec<_> = rows.into_iter().map(|m| m.row_id).collect();
        assert_eq!(ids, vec![a, b]);

        let mine = store
            .read(|txn| txn.find_messages(thread, &Author::AccountId(aci(9)), 1000))
            .unwrap();
        assert_eq!(mine.len(), 1);
    }

    #[test]
    fn delete_thread_history_respects_bound() {
        let store = InMemoryStore::new();
        let thread = store.add_unaddressable_thread();
        let other = store.add_unaddressable_thread();
        for ts in [100, 200, 300, 400] {
            store.insert_message(thread, ts, MessageOrigin::Outgoing);
        }
        store.insert_message(other, 100, MessageOrigin::Outgoing);

        let removed = store
            .write(|txn| txn.delete_thread_history(thread, HistoryBound::AtOrBefore(200)))
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.timestamps(thread).unwrap(), vec![300, 400]);
        assert_eq!(store.timestamps(other).unwrap(), vec![100]);

        store
            .write(|txn| txn.delete_thread_history(thread, HistoryBound::Full))
            .unwrap();
        assert!(store.timestamps(thread).unwrap().is_empty());
    }

    #[test]
    fn failed_write_leaves_state_unchanged() {
        let store = InMemoryStore::new();
        let thread = store.add_unaddressable_thread();
        store.insert_message(thread, 100, MessageOrigin::Outgoing);
        let before = store.snapshot();

        let result: StoreResult<()> = store.write(|txn| {
            txn.delete_thread_history(thread, HistoryBound::Full)?;
            txn.enqueue_outgoing(vec![1, 2, 3])?;
            Err(StoreError::aborted("test"))
        });

        assert!(result.is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn outbox_enqueue_and_retire() {
        let store = InMemoryStore::new();
        let first = store.write(|txn| txn.enqueue_outgoing(vec![1])).unwrap();
        let second = store.write(|txn| txn.enqueue_outgoing(vec![2])).unwrap();

        let pending = store.read(|txn| txn.outgoing()).unwrap();
        assert_eq!(pending.iter().map(|e| e.id).collect::<Vec<_>>(), vec![first, second]);

        store.write(|txn| txn.retire_outgoing(first)).unwrap();
        assert_eq!(store.outbox_len(), 1);
        assert_eq!(
            store.write(|txn| txn.retire_outgoing(first)),
            Err(StoreError::OutboxEntryNotFound(first))
        );
    }

    #[test]
    fn deleting_missing_thread_history_is_an_error() {
        let store = InMemoryStore::new();
        let result = store.write(|txn| txn.delete_thread_history(ThreadId(42), HistoryBound::Full));
        assert_eq!(result, Err(StoreError::ThreadNotFound(ThreadId(42))));
    }
}
