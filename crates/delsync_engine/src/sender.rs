//! Sending side: apply a user's deletion locally, then enqueue its sync.

use crate::config::DeleteSyncConfig;
use crate::error::EngineResult;
use crate::outgoing::OutgoingSyncMessage;
use crate::resolve::{addressable_message, conversation_identifier};
use delsync_protocol::{
    AddressableMessage, Contents, ConversationDelete, LocalOnlyConversationDelete, MessageDeletes,
};
use delsync_store::{
    HistoryBound, LocalMessage, LocalThread, MessageRowId, StoreError, StoreTransaction, ThreadId,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// What a local deletion produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOutcome {
    /// Local rows removed.
    pub deleted: usize,
    /// Messages that could not be addressed and were left out of the sync.
    pub unaddressable: usize,
    /// Envelopes enqueued, one per chunk.
    pub envelopes: Vec<OutgoingSyncMessage>,
}

/// Builds and enqueues delete-for-me syncs for local deletions.
///
/// Every operation runs inside the caller's write transaction: the local
/// deletion and the outgoing envelopes commit together or not at all.
#[derive(Debug, Clone, Default)]
pub struct DeleteForMeSender {
    config: DeleteSyncConfig,
}

impl DeleteForMeSender {
    /// Creates a sender with the given limits.
    pub fn new(config: DeleteSyncConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DeleteSyncConfig {
        &self.config
    }

    /// Deletes `rows` from `thread` and syncs the deletion.
    ///
    /// Rows that are not in the thread are ignored. Messages without an
    /// address are still deleted locally but are not synced.
    pub fn delete_messages<T>(
        &self,
        txn: &mut T,
        thread: ThreadId,
        rows: &[MessageRowId],
    ) -> EngineResult<SendOutcome>
    where
        T: StoreTransaction + ?Sized,
    {
        let local_thread = require_thread(txn, thread)?;
        let by_row: HashMap<MessageRowId, LocalMessage> = txn
            .messages_in_thread(thread)?
            .into_iter()
            .map(|m| (m.row_id, m))
            .collect();

        let targets: Vec<&LocalMessage> = rows.iter().filter_map(|row| by_row.get(row)).collect();
        let addressed: Vec<AddressableMessage> = targets
            .iter()
            .filter_map(|m| addressable_message(&*txn, m))
            .collect();
        let mut outcome = SendOutcome {
            unaddressable: targets.len() - addressed.len(),
            ..SendOutcome::default()
        };

        let target_rows: Vec<MessageRowId> = targets.iter().map(|m| m.row_id).collect();
        outcome.deleted = txn.delete_messages(&target_rows)?;
        if outcome.unaddressable > 0 {
            debug!(
                thread_id = thread.0,
                count = outcome.unaddressable,
                "messages without an address left out of sync"
            );
        }

        let Some(conversation) = conversation_identifier(&*txn, &local_thread) else {
            info!(thread_id = thread.0, "thread has no cross-device identifier, not syncing");
            return Ok(outcome);
        };
        if addressed.is_empty() {
            return Ok(outcome);
        }

        let contents = Contents::new(
            vec![MessageDeletes {
                conversation,
                messages: addressed,
            }],
            vec![],
            vec![],
        );
        outcome.envelopes = self.enqueue(txn, contents, thread)?;
        Ok(outcome)
    }

    /// Clears the history of every thread in `threads` and syncs it.
    ///
    /// Each thread contributes a conversation delete anchored on its most
    /// recent addressable messages, or a local-only delete when it has none.
    pub fn delete_conversations<T>(
        &self,
        txn: &mut T,
        threads: &[ThreadId],
        is_full_delete: bool,
    ) -> EngineResult<SendOutcome>
    where
        T: StoreTransaction + ?Sized,
    {
        let mut outcome = SendOutcome::default();
        let mut conversation_deletes = Vec::new();
        let mut local_only_conversation_deletes = Vec::new();

        // A thread listed twice is cleared and synced once.
        let mut seen = HashSet::new();
        for &thread in threads.iter().filter(|&&thread| seen.insert(thread)) {
            let local_thread = require_thread(txn, thread)?;
            let anchors: Vec<AddressableMessage> = txn
                .messages_in_thread(thread)?
                .iter()
                .rev()
                .filter_map(|m| addressable_message(&*txn, m))
                .take(self.config.max_anchor_messages)
                .collect();
            let conversation = conversation_identifier(&*txn, &local_thread);

            outcome.deleted += txn.delete_thread_history(thread, HistoryBound::Full)?;

            let Some(conversation) = conversation else {
                info!(thread_id = thread.0, "thread has no cross-device identifier, not syncing");
                continue;
            };
            if anchors.is_empty() {
                local_only_conversation_deletes.push(LocalOnlyConversationDelete { conversation });
            } else {
                conversation_deletes.push(ConversationDelete {
                    conversation,
                    most_recent_messages: anchors,
                    is_full_delete,
                });
            }
        }

        let contents = Contents::new(vec![], conversation_deletes, local_only_conversation_deletes);
        if let Some(&first) = threads.first() {
            outcome.envelopes = self.enqueue(txn, contents, first)?;
        }
        Ok(outcome)
    }

    fn enqueue<T>(
        &self,
        txn: &mut T,
        contents: Contents,
        thread: ThreadId,
    ) -> EngineResult<Vec<OutgoingSyncMessage>>
    where
        T: StoreTransaction + ?Sized,
    {
        if contents.is_empty() {
            return Ok(Vec::new());
        }
        let chunks = contents.split(self.config.max_addressable_messages_per_sync);
        if chunks.len() > 1 {
            debug!(chunks = chunks.len(), "split delete-for-me sync");
        }
        chunks
            .iter()
            .map(|chunk| OutgoingSyncMessage::new(chunk, thread, &mut *txn))
            .collect()
    }
}

fn require_thread<T>(txn: &T, thread: ThreadId) -> EngineResult<LocalThread>
where
    T: StoreTransaction + ?Sized,
{
    txn.thread(thread)?
        .ok_or_else(|| StoreError::ThreadNotFound(thread).into())
}
