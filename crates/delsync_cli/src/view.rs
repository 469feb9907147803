//! JSON view of a delete intent set.
//!
//! Identifiers are rendered as strings: account ids in service-id form,
//! phone numbers in E.164 and group ids in hex.

use delsync_protocol::{
    AccountId, AddressableMessage, Author, Contents, ConversationDelete, ConversationIdentifier,
    GroupId, LocalOnlyConversationDelete, MessageDeletes, PhoneNumber, ProtocolError,
    ProtocolResult, CONTENTS_VERSION,
};
use serde::{Deserialize, Serialize};

/// A conversation identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationView {
    /// Direct thread by account id.
    AccountId {
        /// Service-id string.
        account_id: String,
    },
    /// Direct thread by phone number.
    PhoneNumber {
        /// E.164 number.
        e164: String,
    },
    /// Group thread.
    GroupId {
        /// Hex-encoded group id.
        group_id: String,
    },
    /// A variant this version does not understand.
    Unknown {
        /// The variant's type tag.
        kind: String,
    },
}

/// A message author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthorView {
    /// Author by account id.
    AccountId {
        /// Service-id string.
        account_id: String,
    },
    /// Author by phone number.
    PhoneNumber {
        /// E.164 number.
        e164: String,
    },
    /// A variant this version does not understand.
    Unknown {
        /// The variant's type tag.
        kind: String,
    },
}

/// An addressable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    /// The sender.
    pub author: AuthorView,
    /// Sender-assigned epoch milliseconds.
    pub sent_timestamp: u64,
}

/// Deletion of specific messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDeletesView {
    /// Conversation holding the messages.
    pub conversation: ConversationView,
    /// Messages to delete.
    #[serde(default)]
    pub messages: Vec<MessageView>,
}

/// Deletion of a conversation's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationDeleteView {
    /// Conversation being cleared.
    pub conversation: ConversationView,
    /// Anchors, most recent first.
    #[serde(default)]
    pub most_recent_messages: Vec<MessageView>,
    /// Clear everything regardless of anchors.
    #[serde(default)]
    pub is_full_delete: bool,
}

/// A whole intent set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentsView {
    /// Durable format version.
    #[serde(default = "current_version")]
    pub version: u64,
    /// Message-level deletes.
    #[serde(default)]
    pub message_deletes: Vec<MessageDeletesView>,
    /// Conversation-level deletes.
    #[serde(default)]
    pub conversation_deletes: Vec<ConversationDeleteView>,
    /// Conversations cleared locally on the sender.
    #[serde(default)]
    pub local_only_conversation_deletes: Vec<ConversationView>,
}

fn current_version() -> u64 {
    CONTENTS_VERSION
}

impl From<&ConversationIdentifier> for ConversationView {
    fn from(id: &ConversationIdentifier) -> Self {
        match id {
            ConversationIdentifier::AccountId(aci) => Self::AccountId {
                account_id: aci.service_id_string(),
            },
            ConversationIdentifier::PhoneNumber(e164) => Self::PhoneNumber {
                e164: e164.as_str().to_string(),
            },
            ConversationIdentifier::GroupId(group) => Self::GroupId {
                group_id: hex::encode(group.as_bytes()),
            },
            ConversationIdentifier::Unknown(unknown) => Self::Unknown {
                kind: unknown.kind().to_string(),
            },
        }
    }
}

impl From<&Author> for AuthorView {
    fn from(author: &Author) -> Self {
        match author {
            Author::AccountId(aci) => Self::AccountId {
                account_id: aci.service_id_string(),
            },
            Author::PhoneNumber(e164) => Self::PhoneNumber {
                e164: e164.as_str().to_string(),
            },
            Author::Unknown(unknown) => Self::Unknown {
                kind: unknown.kind().to_string(),
            },
        }
    }
}

impl From<&AddressableMessage> for MessageView {
    fn from(message: &AddressableMessage) -> Self {
        Self {
            author: (&message.author).into(),
            sent_timestamp: message.sent_timestamp,
        }
    }
}

impl From<&Contents> for ContentsView {
    fn from(contents: &Contents) -> Self {
        let messages = |m: &[AddressableMessage]| m.iter().map(MessageView::from).collect();
        Self {
            version: CONTENTS_VERSION,
            message_deletes: contents
                .message_deletes
                .iter()
                .map(|d| MessageDeletesView {
                    conversation: (&d.conversation).into(),
                    messages: messages(&d.messages),
                })
                .collect(),
            conversation_deletes: contents
                .conversation_deletes
                .iter()
                .map(|d| ConversationDeleteView {
                    conversation: (&d.conversation).into(),
                    most_recent_messages: messages(&d.most_recent_messages),
                    is_full_delete: d.is_full_delete,
                })
                .collect(),
            local_only_conversation_deletes: contents
                .local_only_conversation_deletes
                .iter()
                .map(|d| (&d.conversation).into())
                .collect(),
        }
    }
}

impl ConversationView {
    fn to_identifier(&self) -> ProtocolResult<ConversationIdentifier> {
        Ok(match self {
            Self::AccountId { account_id } => {
                ConversationIdentifier::AccountId(AccountId::parse(account_id)?)
            }
            Self::PhoneNumber { e164 } => {
                ConversationIdentifier::PhoneNumber(PhoneNumber::parse(e164)?)
            }
            Self::GroupId { group_id } => {
                let bytes = hex::decode(group_id).map_err(|e| {
                    ProtocolError::invalid_field("conversation", "group_id", e.to_string())
                })?;
                ConversationIdentifier::GroupId(GroupId::new(bytes)?)
            }
            Self::Unknown { kind } => return Err(unknown_variant("conversation", kind)),
        })
    }
}

impl AuthorView {
    fn to_author(&self) -> ProtocolResult<Author> {
        Ok(match self {
            Self::AccountId { account_id } => Author::AccountId(AccountId::parse(account_id)?),
            Self::PhoneNumber { e164 } => Author::PhoneNumber(PhoneNumber::parse(e164)?),
            Self::Unknown { kind } => return Err(unknown_variant("author", kind)),
        })
    }
}

impl MessageView {
    fn to_message(&self) -> ProtocolResult<AddressableMessage> {
        Ok(AddressableMessage::new(self.author.to_author()?, self.sent_timestamp))
    }
}

impl ContentsView {
    /// Builds the intent set this view describes.
    ///
    /// Unknown variants are rejected: the view does not keep their payload.
    pub fn to_contents(&self) -> ProtocolResult<Contents> {
        if self.version != CONTENTS_VERSION {
            return Err(ProtocolError::invalid_field(
                "contents",
                "version",
                format!("only version {CONTENTS_VERSION} can be written"),
            ));
        }
        let messages = |m: &[MessageView]| {
            m.iter()
                .map(MessageView::to_message)
                .collect::<ProtocolResult<Vec<_>>>()
        };

        let message_deletes = self
            .message_deletes
            .iter()
            .map(|d| {
                Ok(MessageDeletes {
                    conversation: d.conversation.to_identifier()?,
                    messages: messages(&d.messages)?,
                })
            })
            .collect::<ProtocolResult<Vec<_>>>()?;
        let conversation_deletes = self
            .conversation_deletes
            .iter()
            .map(|d| {
                Ok(ConversationDelete {
                    conversation: d.conversation.to_identifier()?,
                    most_recent_messages: messages(&d.most_recent_messages)?,
                    is_full_delete: d.is_full_delete,
                })
            })
            .collect::<ProtocolResult<Vec<_>>>()?;
        let local_only_conversation_deletes = self
            .local_only_conversation_deletes
            .iter()
            .map(|c| {
                Ok(LocalOnlyConversationDelete {
                    conversation: c.to_identifier()?,
                })
            })
            .collect::<ProtocolResult<Vec<_>>>()?;

        Ok(Contents::new(
            message_deletes,
            conversation_deletes,
            local_only_conversation_deletes,
        ))
    }
}

fn unknown_variant(record: &'static str, kind: &str) -> ProtocolError {
    ProtocolError::invalid_field(record, "type", format!("cannot write unknown variant `{kind}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACI: &str = "0D8C6F55-3F4B-4A7E-9E0B-5A1F2C3D4E5F";

    #[test]
    fn view_roundtrips_through_contents() {
        let json = format!(
            r#"{{
                "message_deletes": [{{
                    "conversation": {{"type": "account_id", "account_id": "{ACI}"}},
                    "messages": [{{
                        "author": {{"type": "phone_number", "e164": "+15550100"}},
                        "sent_timestamp": 42
                    }}]
                }}],
                "conversation_deletes": [{{
                    "conversation": {{"type": "group_id", "group_id": "0101"}},
                    "is_full_delete": true
                }}]
            }}"#
        );
        let view: ContentsView = serde_json::from_str(&json).unwrap();
        let contents = view.to_contents().unwrap();

        assert_eq!(contents.message_deletes[0].messages[0].sent_timestamp, 42);
        assert!(contents.conversation_deletes[0].most_recent_messages.is_empty());
        assert_eq!(ContentsView::from(&contents), view);
    }

    #[test]
    fn unknown_variants_cannot_be_written() {
        let view = ContentsView {
            version: CONTENTS_VERSION,
            message_deletes: vec![],
            conversation_deletes: vec![],
            local_only_conversation_deletes: vec![ConversationView::Unknown {
                kind: "username".into(),
            }],
        };
        assert!(view.to_contents().is_err());
    }

    #[test]
    fn bad_group_hex_is_rejected() {
        let view = ConversationView::GroupId {
            group_id: "zz".into(),
        };
        assert!(matches!(
            view.to_identifier(),
            Err(ProtocolError::InvalidField { field: "group_id", .. })
        ));
    }
}
