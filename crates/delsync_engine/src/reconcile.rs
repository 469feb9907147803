//! Receiving side: apply a delete intent set to local storage.
//!
//! Reconciliation runs in three passes (message deletes, conversation
//! deletes, local-only deletes). Each pass is idempotent and the final state
//! does not depend on the order the passes run in.
//!
//! A conversation delete applies once at least one of its anchors matches a
//! local message. Its bound is then the oldest anchor, so replaying the
//! delete cannot move the bound. Bounds are resolved against the state
//! before any pass runs, so a message pass that removes an anchor cannot
//! move a bound either.
//!
//! Misses (unknown thread, unmatched message) are expected and only counted.
//! Nothing here enqueues outgoing syncs.

use crate::error::EngineResult;
use delsync_protocol::wire::sync_message::DeleteForMe;
use delsync_protocol::{AddressableMessage, Contents, ConversationDelete};
use delsync_store::{
    HistoryBound, MessageStore, StoreError, StoreResult, StoreTransaction, ThreadId,
};
use tracing::{debug, info};

/// One reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    /// Delete specific messages.
    MessageDeletes,
    /// Clear conversation history up to the anchor bound.
    ConversationDeletes,
    /// Clear conversations deleted locally on the sender.
    LocalOnlyConversationDeletes,
}

impl Pass {
    /// All passes in the default order.
    pub const ALL: [Pass; 3] = [
        Pass::MessageDeletes,
        Pass::ConversationDeletes,
        Pass::LocalOnlyConversationDeletes,
    ];
}

/// Counters describing what a reconciliation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Message rows removed across all passes.
    pub messages_deleted: usize,
    /// Threads whose history was cleared (fully or up to a bound).
    pub threads_cleared: usize,
    /// Entries whose conversation has no local thread.
    pub conversation_misses: usize,
    /// Addressable messages that matched no local row.
    pub message_misses: usize,
    /// Non-full conversation deletes skipped because no anchor matched.
    pub unanchored_conversation_deletes: usize,
    /// Wire entries dropped as unaddressable before reconciling.
    pub dropped_on_receive: usize,
}

/// Where a conversation delete lands, decided before any pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConversationPlan {
    Miss,
    Unanchored,
    Clear(ThreadId, HistoryBound),
}

/// Applies received delete intent sets to a message store.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler;

impl Reconciler {
    /// Creates a reconciler.
    pub fn new() -> Self {
        Self
    }

    /// Applies all three passes in the default order.
    pub fn apply<S: MessageStore>(
        &self,
        store: &S,
        contents: &Contents,
    ) -> EngineResult<ReconcileReport> {
        self.apply_in_order(store, contents, &Pass::ALL)
    }

    /// Applies the given passes in the given order.
    pub fn apply_in_order<S: MessageStore>(
        &self,
        store: &S,
        contents: &Contents,
        order: &[Pass],
    ) -> EngineResult<ReconcileReport> {
        let plans = store.read(|txn| {
            contents
                .conversation_deletes
                .iter()
                .map(|delete| plan_conversation_delete(txn, delete))
                .collect::<Result<Vec<_>, _>>()
        })?;

        let mut report = ReconcileReport::default();
        for pass in order {
            match pass {
                Pass::MessageDeletes => self.message_pass(store, contents, &mut report)?,
                Pass::ConversationDeletes => self.conversation_pass(store, &plans, &mut report)?,
                Pass::LocalOnlyConversationDeletes => {
                    self.local_only_pass(store, contents, &mut report)?
                }
            }
        }

        info!(
            messages_deleted = report.messages_deleted,
            threads_cleared = report.threads_cleared,
            conversation_misses = report.conversation_misses,
            message_misses = report.message_misses,
            "reconciled delete-for-me sync"
        );
        Ok(report)
    }

    /// Raises a received wire message and applies it.
    pub fn apply_wire<S: MessageStore>(
        &self,
        store: &S,
        message: &DeleteForMe,
    ) -> EngineResult<ReconcileReport> {
        let raised = Contents::from_wire(message);
        if raised.dropped > 0 {
            debug!(dropped = raised.dropped, "dropped unaddressable wire entries");
        }
        let mut report = self.apply(store, &raised.contents)?;
        report.dropped_on_receive = raised.dropped;
        Ok(report)
    }

    fn message_pass<S: MessageStore>(
        &self,
        store: &S,
        contents: &Contents,
        report: &mut ReconcileReport,
    ) -> EngineResult<()> {
        // Group by local thread so each thread is touched by one transaction.
        let mut groups: Vec<(ThreadId, Vec<&AddressableMessage>)> = Vec::new();
        store.read(|txn| {
            for delete in &contents.message_deletes {
                let Some(thread) = txn.find_thread(&delete.conversation)? else {
                    debug!(messages = delete.messages.len(), "message delete for unknown thread");
                    report.conversation_misses += 1;
                    continue;
                };
                match groups.iter_mut().find(|(id, _)| *id == thread.id) {
                    Some((_, messages)) => messages.extend(&delete.messages),
                    None => groups.push((thread.id, delete.messages.iter().collect())),
                }
            }
            Ok(())
        })?;

        for (thread, messages) in groups {
            let (deleted, misses) = store.write(|txn| {
                let mut rows = Vec::new();
                let mut misses = 0usize;
                for message in &messages {
                    let matched =
                        txn.find_messages(thread, &message.author, message.sent_timestamp)?;
                    if matched.is_empty() {
                        misses += 1;
                    }
                    // Colliding timestamps delete every match.
                    rows.extend(matched.into_iter().map(|m| m.row_id));
                }
                rows.sort_unstable();
                rows.dedup();
                Ok::<_, StoreError>((txn.delete_messages(&rows)?, misses))
            })?;
            if misses > 0 {
                debug!(thread_id = thread.0, misses, "addressed messages not found locally");
            }
            report.messages_deleted += deleted;
            report.message_misses += misses;
        }
        Ok(())
    }

    fn conversation_pass<S: MessageStore>(
        &self,
        store: &S,
        plans: &[ConversationPlan],
        report: &mut ReconcileReport,
    ) -> EngineResult<()> {
        let mut clears: Vec<(ThreadId, HistoryBound)> = Vec::new();
        for plan in plans {
            match *plan {
                ConversationPlan::Miss => report.conversation_misses += 1,
                ConversationPlan::Unanchored => report.unanchored_conversation_deletes += 1,
                ConversationPlan::Clear(thread, bound) => {
                    match clears.iter_mut().find(|(id, _)| *id == thread) {
                        Some((_, existing)) => *existing = widest(*existing, bound),
                        None => clears.push((thread, bound)),
                    }
                }
            }
        }

        for (thread, bound) in clears {
            report.messages_deleted += clear_thread(store, thread, bound)?;
            report.threads_cleared += 1;
        }
        Ok(())
    }

    fn local_only_pass<S: MessageStore>(
        &self,
        store: &S,
        contents: &Contents,
        report: &mut ReconcileReport,
    ) -> EngineResult<()> {
        for delete in &contents.local_only_conversation_deletes {
            let thread = store.read(|txn| txn.find_thread(&delete.conversation))?;
            let Some(thread) = thread else {
                debug!("local-only delete for unknown thread");
                report.conversation_misses += 1;
                continue;
            };
            report.messages_deleted += clear_thread(store, thread.id, HistoryBound::Full)?;
            report.threads_cleared += 1;
        }
        Ok(())
    }
}

fn plan_conversation_delete<T>(txn: &T, delete: &ConversationDelete) -> StoreResult<ConversationPlan>
where
    T: StoreTransaction + ?Sized,
{
    let Some(thread) = txn.find_thread(&delete.conversation)? else {
        debug!("conversation delete for unknown thread");
        return Ok(ConversationPlan::Miss);
    };
    if delete.is_full_delete {
        return Ok(ConversationPlan::Clear(thread.id, HistoryBound::Full));
    }

    // Any local match confirms the anchors; the bound is then the oldest
    // anchor overall, so a replay after the clear lands on the same bound.
    let mut matched = false;
    for anchor in &delete.most_recent_messages {
        if !txn
            .find_messages(thread.id, &anchor.author, anchor.sent_timestamp)?
            .is_empty()
        {
            matched = true;
            break;
        }
    }
    let oldest = delete
        .most_recent_messages
        .iter()
        .map(|anchor| anchor.sent_timestamp)
        .min();

    Ok(match oldest {
        Some(bound) if matched => {
            ConversationPlan::Clear(thread.id, HistoryBound::AtOrBefore(bound))
        }
        _ => {
            debug!(thread_id = thread.id.0, "no conversation delete anchor matched locally");
            ConversationPlan::Unanchored
        }
    })
}

fn widest(a: HistoryBound, b: HistoryBound) -> HistoryBound {
    match (a, b) {
        (HistoryBound::AtOrBefore(x), HistoryBound::AtOrBefore(y)) => {
            HistoryBound::AtOrBefore(x.max(y))
        }
        _ => HistoryBound::Full,
    }
}

fn clear_thread<S: MessageStore>(
    store: &S,
    thread: ThreadId,
    bound: HistoryBound,
) -> EngineResult<usize> {
    store.write(|txn| {
        if txn.thread(thread)?.is_none() {
            return Ok(0);
        }
        Ok(txn.delete_thread_history(thread, bound)?)
    })
}
