//! The outgoing sync envelope and the outbox it is persisted in.
//!
//! An envelope stores its intent set in the durable encoding. It is lowered
//! to the wire form only when the send pipeline pulls it, so the durable and
//! wire schemas can change independently.

use crate::error::{EngineError, EngineResult};
use delsync_codec::{from_cbor, to_canonical_cbor, Value};
use delsync_protocol::wire::SyncMessage;
use delsync_protocol::{Contents, Decode, Encode, ProtocolError};
use delsync_store::{MessageStore, OutboxEntry, OutboxId, StoreTransaction, ThreadId};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

const THREAD_ID: &str = "thread_id";
const TIMESTAMP: &str = "timestamp";
const CONTENTS: &str = "contents";
const RECORD: &str = "outgoing_sync_message";

/// A persisted delete-for-me sync waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingSyncMessage {
    id: OutboxId,
    thread_id: ThreadId,
    timestamp: u64,
    payload: Vec<u8>,
}

impl OutgoingSyncMessage {
    /// Encodes `contents` and persists the envelope in `txn`.
    ///
    /// Fails with [`EngineError::Encode`] if the payload cannot be encoded,
    /// in which case nothing is persisted.
    pub fn new<T>(contents: &Contents, thread_id: ThreadId, txn: &mut T) -> EngineResult<Self>
    where
        T: StoreTransaction + ?Sized,
    {
        let payload = contents.encode().map_err(EngineError::Encode)?;
        let timestamp = now_millis();
        let record = Value::record([
            (THREAD_ID, Value::from(thread_id.0)),
            (TIMESTAMP, Value::from(timestamp)),
            (CONTENTS, Value::from(payload.clone())),
        ]);
        let record = to_canonical_cbor(&record).map_err(EngineError::Encode)?;
        let id = txn.enqueue_outgoing(record)?;
        debug!(
            outbox_id = id.0,
            thread_id = thread_id.0,
            addressable_messages = contents.addressable_message_count(),
            "enqueued delete-for-me sync"
        );

        Ok(Self {
            id,
            thread_id,
            timestamp,
            payload,
        })
    }

    /// Reads an envelope back from its outbox record.
    pub fn from_entry(entry: &OutboxEntry) -> EngineResult<Self> {
        let value = from_cbor(&entry.record).map_err(ProtocolError::from)?;
        let field = |name: &'static str| {
            value.get(name).ok_or(ProtocolError::MissingField {
                record: RECORD,
                field: name,
            })
        };
        let invalid =
            |name: &'static str, reason: &str| ProtocolError::invalid_field(RECORD, name, reason);

        let thread_id = field(THREAD_ID)?
            .as_u64()
            .ok_or_else(|| invalid(THREAD_ID, "expected unsigned integer"))?;
        let timestamp = field(TIMESTAMP)?
            .as_u64()
            .ok_or_else(|| invalid(TIMESTAMP, "expected unsigned integer"))?;
        let payload = field(CONTENTS)?
            .as_bytes()
            .ok_or_else(|| invalid(CONTENTS, "expected bytes"))?
            .to_vec();

        Ok(Self {
            id: entry.id,
            thread_id: ThreadId(thread_id),
            timestamp,
            payload,
        })
    }

    /// Outbox row holding this envelope.
    pub fn id(&self) -> OutboxId {
        self.id
    }

    /// Thread the deletion was performed in.
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Creation time in epoch milliseconds.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Durable payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Deletions are delivered at ordinary priority.
    pub fn is_urgent(&self) -> bool {
        false
    }

    /// Decodes the stored payload and lowers it to the wire message.
    ///
    /// Returns `None` if the payload no longer decodes, or if nothing in it
    /// has a wire representation. Such an envelope can never be sent and
    /// must not be retried.
    pub fn build_wire_message(&self) -> Option<SyncMessage> {
        let contents = match Contents::decode(&self.payload) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(outbox_id = self.id.0, error = %err, "undecodable delete-for-me payload");
                return None;
            }
        };
        let lowered = contents.to_wire();
        if lowered.omitted > 0 {
            debug!(
                outbox_id = self.id.0,
                omitted = lowered.omitted,
                "omitted entries with no wire representation"
            );
        }
        let message = &lowered.delete_for_me;
        if message.message_deletes.is_empty()
            && message.conversation_deletes.is_empty()
            && message.local_only_conversation_deletes.is_empty()
        {
            debug!(outbox_id = self.id.0, "nothing left to send after lowering");
            return None;
        }
        Some(SyncMessage::delete_for_me(lowered.delete_for_me))
    }
}

/// Pull-based access to pending envelopes for the send pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct Outbox;

impl Outbox {
    /// Pending envelopes in enqueue order, each with its wire message.
    ///
    /// An entry whose record or payload fails to decode is reported with
    /// `None`; the pipeline should retire it without sending.
    pub fn pending<T>(txn: &T) -> EngineResult<Vec<(OutboxId, Option<SyncMessage>)>>
    where
        T: StoreTransaction + ?Sized,
    {
        Ok(txn
            .outgoing()?
            .iter()
            .map(|entry| {
                let message = match OutgoingSyncMessage::from_entry(entry) {
                    Ok(envelope) => envelope.build_wire_message(),
                    Err(err) => {
                        warn!(outbox_id = entry.id.0, error = %err, "corrupt outbox record");
                        None
                    }
                };
                (entry.id, message)
            })
            .collect())
    }

    /// Removes an envelope once the pipeline is done with it.
    pub fn retire<S: MessageStore>(store: &S, id: OutboxId) -> EngineResult<()> {
        store.write(|txn| {
            txn.retire_outgoing(id)?;
            Ok(())
        })
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}
