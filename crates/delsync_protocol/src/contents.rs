//! The delete intent set and its durable encoding.

use crate::error::{ProtocolError, ProtocolResult};
use crate::identifier::{AddressableMessage, ConversationIdentifier};
use crate::record::Record;
use delsync_codec::{Decode, Encode, Value};

/// Current durable format version.
pub const CONTENTS_VERSION: u64 = 1;

const VERSION: &str = "version";
const CONVERSATION: &str = "conversation";
const MESSAGES: &str = "messages";
const MOST_RECENT_MESSAGES: &str = "most_recent_messages";
const IS_FULL_DELETE: &str = "is_full_delete";
const MESSAGE_DELETES: &str = "message_deletes";
const CONVERSATION_DELETES: &str = "conversation_deletes";
const LOCAL_ONLY_CONVERSATION_DELETES: &str = "local_only_conversation_deletes";

/// Deletion of specific messages within one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDeletes {
    /// Conversation holding the messages.
    pub conversation: ConversationIdentifier,
    /// Messages to delete, in the order the user selected them.
    pub messages: Vec<AddressableMessage>,
}

/// Deletion of a conversation's whole message history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationDelete {
    /// Conversation being cleared.
    pub conversation: ConversationIdentifier,
    /// Anchor set, most recent first. Once any anchor matches locally,
    /// receivers delete everything at or older than the oldest anchor.
    pub most_recent_messages: Vec<AddressableMessage>,
    /// Clear all local history regardless of anchors.
    pub is_full_delete: bool,
}

/// Mirror of a conversation cleared on the originating device where no
/// addressable messages existed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalOnlyConversationDelete {
    /// Conversation being cleared.
    pub conversation: ConversationIdentifier,
}

/// One outgoing sync event's worth of deletions.
///
/// Built once from a user action and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contents {
    /// Message-level deletes.
    pub message_deletes: Vec<MessageDeletes>,
    /// Conversation-level deletes.
    pub conversation_deletes: Vec<ConversationDelete>,
    /// Local-only conversation deletes.
    pub local_only_conversation_deletes: Vec<LocalOnlyConversationDelete>,
}

impl Contents {
    /// Creates an intent set from its three kinds of deletion.
    pub fn new(
        message_deletes: Vec<MessageDeletes>,
        conversation_deletes: Vec<ConversationDelete>,
        local_only_conversation_deletes: Vec<LocalOnlyConversationDelete>,
    ) -> Self {
        Self {
            message_deletes,
            conversation_deletes,
            local_only_conversation_deletes,
        }
    }

    /// Returns true if there is nothing to sync.
    pub fn is_empty(&self) -> bool {
        self.message_deletes.is_empty()
            && self.conversation_deletes.is_empty()
            && self.local_only_conversation_deletes.is_empty()
    }

    /// Number of addressable messages carried, anchors included.
    pub fn addressable_message_count(&self) -> usize {
        self.message_deletes
            .iter()
            .map(|d| d.messages.len())
            .chain(
                self.conversation_deletes
                    .iter()
                    .map(|d| d.most_recent_messages.len()),
            )
            .sum()
    }

    /// Splits into intent sets that each carry at most `max_weight` units,
    /// where a unit is one addressable message, or one conversation entry
    /// with no messages.
    ///
    /// Order within each kind is preserved. A `MessageDeletes` larger than
    /// the budget is split across several sets; a `ConversationDelete` is
    /// never split since its anchors only make sense together.
    pub fn split(self, max_weight: usize) -> Vec<Contents> {
        let max_weight = max_weight.max(1);
        let mut chunks = Vec::new();
        let mut current = Contents::default();
        let mut weight = 0usize;

        let mut flush = |current: &mut Contents, weight: &mut usize| {
            if !current.is_empty() {
                chunks.push(std::mem::take(current));
            }
            *weight = 0;
        };

        for delete in self.message_deletes {
            let mut messages = delete.messages.into_iter().peekable();
            if messages.peek().is_none() {
                if weight + 1 > max_weight {
                    flush(&mut current, &mut weight);
                }
                current.message_deletes.push(MessageDeletes {
                    conversation: delete.conversation,
                    messages: Vec::new(),
                });
                weight += 1;
                continue;
            }
            while messages.peek().is_some() {
                if weight == max_weight {
                    flush(&mut current, &mut weight);
                }
                let room = max_weight - weight;
                let piece: Vec<_> = messages.by_ref().take(room).collect();
                weight += piece.len();
                current.message_deletes.push(MessageDeletes {
                    conversation: delete.conversation.clone(),
                    messages: piece,
                });
            }
        }

        for delete in self.conversation_deletes {
            let cost = delete.most_recent_messages.len().max(1);
            if weight > 0 && weight + cost > max_weight {
                flush(&mut current, &mut weight);
            }
            weight += cost;
            current.conversation_deletes.push(delete);
        }

        for delete in self.local_only_conversation_deletes {
            if weight + 1 > max_weight {
                flush(&mut current, &mut weight);
            }
            weight += 1;
            current.local_only_conversation_deletes.push(delete);
        }

        flush(&mut current, &mut weight);
        chunks
    }
}

impl Encode for MessageDeletes {
    fn to_value(&self) -> Value {
        Value::record([
            (CONVERSATION, self.conversation.to_value()),
            (
                MESSAGES,
                Value::Array(self.messages.iter().map(Encode::to_value).collect()),
            ),
        ])
    }
}

impl Decode for MessageDeletes {
    type Error = ProtocolError;

    fn from_value(value: &Value) -> ProtocolResult<Self> {
        let record = Record::new("message_deletes", value)?;
        Ok(Self {
            conversation: ConversationIdentifier::from_value(record.required(CONVERSATION)?)?,
            messages: decode_list(record.list(MESSAGES)?)?,
        })
    }
}

impl Encode for ConversationDelete {
    fn to_value(&self) -> Value {
        Value::record([
            (CONVERSATION, self.conversation.to_value()),
            (
                MOST_RECENT_MESSAGES,
                Value::Array(
                    self.most_recent_messages
                        .iter()
                        .map(Encode::to_value)
                        .collect(),
                ),
            ),
            (IS_FULL_DELETE, Value::Bool(self.is_full_delete)),
        ])
    }
}

impl Decode for ConversationDelete {
    type Error = ProtocolError;

    fn from_value(value: &Value) -> ProtocolResult<Self> {
        let record = Record::new("conversation_delete", value)?;
        Ok(Self {
            conversation: ConversationIdentifier::from_value(record.required(CONVERSATION)?)?,
            most_recent_messages: decode_list(record.list(MOST_RECENT_MESSAGES)?)?,
            is_full_delete: record.bool(IS_FULL_DELETE)?,
        })
    }
}

impl Encode for LocalOnlyConversationDelete {
    fn to_value(&self) -> Value {
        Value::record([(CONVERSATION, self.conversation.to_value())])
    }
}

impl Decode for LocalOnlyConversationDelete {
    type Error = ProtocolError;

    fn from_value(value: &Value) -> ProtocolResult<Self> {
        let record = Record::new("local_only_conversation_delete", value)?;
        Ok(Self {
            conversation: ConversationIdentifier::from_value(record.required(CONVERSATION)?)?,
        })
    }
}

impl Encode for Contents {
    fn to_value(&self) -> Value {
        fn list<T: Encode>(items: &[T]) -> Value {
            Value::Array(items.iter().map(Encode::to_value).collect())
        }

        Value::record([
            (VERSION, Value::from(CONTENTS_VERSION)),
            (MESSAGE_DELETES, list(&self.message_deletes)),
            (CONVERSATION_DELETES, list(&self.conversation_deletes)),
            (
                LOCAL_ONLY_CONVERSATION_DELETES,
                list(&self.local_only_conversation_deletes),
            ),
        ])
    }
}

impl Decode for Contents {
    type Error = ProtocolError;

    fn from_value(value: &Value) -> ProtocolResult<Self> {
        let record = Record::new("contents", value)?;
        // Newer versions are read best-effort; only the field is required.
        let version = record.u64(VERSION)?;
        if version == 0 {
            return Err(ProtocolError::invalid_field(
                "contents",
                VERSION,
                "version 0 is not a valid format",
            ));
        }

        Ok(Self {
            message_deletes: decode_list(record.list(MESSAGE_DELETES)?)?,
            conversation_deletes: decode_list(record.list(CONVERSATION_DELETES)?)?,
            local_only_conversation_deletes: decode_list(
                record.list(LOCAL_ONLY_CONVERSATION_DELETES)?,
            )?,
        })
    }
}

fn decode_list<T>(values: &[Value]) -> ProtocolResult<Vec<T>>
where
    T: Decode<Error = ProtocolError>,
{
    values.iter().map(T::from_value).collect()
}
