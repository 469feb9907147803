//! Mapping between the durable intent set and the wire message.
//!
//! Lowering and raising are pure and order-preserving. Variants that have
//! no wire shape are counted and omitted rather than failing the batch.

use crate::contents::{Contents, ConversationDelete, LocalOnlyConversationDelete, MessageDeletes};
use crate::error::ProtocolResult;
use crate::identifier::{
    AccountId, AddressableMessage, Author, ConversationIdentifier, GroupId, PhoneNumber,
};
use crate::wire::sync_message::delete_for_me::{
    self as proto, addressable_message, conversation_identifier,
};
use crate::wire::sync_message::DeleteForMe;
use crate::wire::SyncMessage;
use prost::Message;

/// Result of lowering an intent set to its wire form.
#[derive(Debug, Clone, PartialEq)]
pub struct Lowered {
    /// The wire message.
    pub delete_for_me: DeleteForMe,
    /// Entries and messages left out because they carry unknown variants.
    pub omitted: usize,
}

/// Result of raising a received wire message.
#[derive(Debug, Clone, PartialEq)]
pub struct Raised {
    /// The reconstructed intent set.
    pub contents: Contents,
    /// Entries and messages dropped because they were unaddressable.
    pub dropped: usize,
}

impl Contents {
    /// Lowers this intent set to the protobuf message.
    pub fn to_wire(&self) -> Lowered {
        let mut omitted = 0usize;

        let message_deletes = self
            .message_deletes
            .iter()
            .filter_map(|d| {
                let Some(conversation) = lower_conversation(&d.conversation) else {
                    omitted += 1;
                    return None;
                };
                Some(proto::MessageDeletes {
                    conversation: Some(conversation),
                    messages: lower_messages(&d.messages, &mut omitted),
                })
            })
            .collect();

        let conversation_deletes = self
            .conversation_deletes
            .iter()
            .filter_map(|d| {
                let Some(conversation) = lower_conversation(&d.conversation) else {
                    omitted += 1;
                    return None;
                };
                Some(proto::ConversationDelete {
                    conversation: Some(conversation),
                    most_recent_messages: lower_messages(&d.most_recent_messages, &mut omitted),
                    is_full_delete: Some(d.is_full_delete),
                })
            })
            .collect();

        let local_only_conversation_deletes = self
            .local_only_conversation_deletes
            .iter()
            .filter_map(|d| {
                let Some(conversation) = lower_conversation(&d.conversation) else {
                    omitted += 1;
                    return None;
                };
                Some(proto::LocalOnlyConversationDelete {
                    conversation: Some(conversation),
                })
            })
            .collect();

        Lowered {
            delete_for_me: DeleteForMe {
                message_deletes,
                conversation_deletes,
                local_only_conversation_deletes,
            },
            omitted,
        }
    }

    /// Raises a received protobuf message into an intent set.
    pub fn from_wire(message: &DeleteForMe) -> Raised {
        let mut dropped = 0usize;

        let message_deletes = message
            .message_deletes
            .iter()
            .filter_map(|d| {
                let Some(conversation) = raise_conversation(d.conversation.as_ref()) else {
                    dropped += 1;
                    return None;
                };
                Some(MessageDeletes {
                    conversation,
                    messages: raise_messages(&d.messages, &mut dropped),
                })
            })
            .collect();

        let conversation_deletes = message
            .conversation_deletes
            .iter()
            .filter_map(|d| {
                let Some(conversation) = raise_conversation(d.conversation.as_ref()) else {
                    dropped += 1;
                    return None;
                };
                Some(ConversationDelete {
                    conversation,
                    most_recent_messages: raise_messages(&d.most_recent_messages, &mut dropped),
                    is_full_delete: d.is_full_delete.unwrap_or(false),
                })
            })
            .collect();

        let local_only_conversation_deletes = message
            .local_only_conversation_deletes
            .iter()
            .filter_map(|d| {
                let Some(conversation) = raise_conversation(d.conversation.as_ref()) else {
                    dropped += 1;
                    return None;
                };
                Some(LocalOnlyConversationDelete { conversation })
            })
            .collect();

        Raised {
            contents: Contents::new(
                message_deletes,
                conversation_deletes,
                local_only_conversation_deletes,
            ),
            dropped,
        }
    }
}

impl SyncMessage {
    /// Wraps a delete-for-me payload.
    pub fn delete_for_me(delete_for_me: DeleteForMe) -> Self {
        Self {
            delete_for_me: Some(delete_for_me),
        }
    }

    /// Serializes to protobuf bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    /// Parses protobuf bytes.
    pub fn from_bytes(bytes: &[u8]) -> ProtocolResult<Self> {
        Ok(Self::decode(bytes)?)
    }
}

fn lower_conversation(id: &ConversationIdentifier) -> Option<proto::ConversationIdentifier> {
    let identifier = match id {
        ConversationIdentifier::AccountId(aci) => {
            conversation_identifier::Identifier::ThreadServiceId(aci.service_id_string())
        }
        ConversationIdentifier::PhoneNumber(e164) => {
            conversation_identifier::Identifier::ThreadE164(e164.as_str().to_string())
        }
        ConversationIdentifier::GroupId(group) => {
            conversation_identifier::Identifier::ThreadGroupId(group.as_bytes().to_vec())
        }
        ConversationIdentifier::Unknown(_) => return None,
    };
    Some(proto::ConversationIdentifier {
        identifier: Some(identifier),
    })
}

fn lower_messages(messages: &[AddressableMessage], omitted: &mut usize) -> Vec<proto::AddressableMessage> {
    messages
        .iter()
        .filter_map(|m| {
            let author = match &m.author {
                Author::AccountId(aci) => {
                    addressable_message::Author::AuthorServiceId(aci.service_id_string())
                }
                Author::PhoneNumber(e164) => {
                    addressable_message::Author::AuthorE164(e164.as_str().to_string())
                }
                Author::Unknown(_) => {
                    *omitted += 1;
                    return None;
                }
            };
            Some(proto::AddressableMessage {
                author: Some(author),
                sent_timestamp: Some(m.sent_timestamp),
            })
        })
        .collect()
}

fn raise_conversation(id: Option<&proto::ConversationIdentifier>) -> Option<ConversationIdentifier> {
    match id?.identifier.as_ref()? {
        conversation_identifier::Identifier::ThreadServiceId(s) => {
            AccountId::parse(s).ok().map(ConversationIdentifier::AccountId)
        }
        conversation_identifier::Identifier::ThreadE164(s) => {
            PhoneNumber::parse(s).ok().map(ConversationIdentifier::PhoneNumber)
        }
        conversation_identifier::Identifier::ThreadGroupId(bytes) => {
            GroupId::new(bytes.clone()).ok().map(ConversationIdentifier::GroupId)
        }
    }
}

fn raise_messages(messages: &[proto::AddressableMessage], dropped: &mut usize) -> Vec<AddressableMessage> {
    messages
        .iter()
        .filter_map(|m| {
            let author = m.author.as_ref().and_then(|a| match a {
                addressable_message::Author::AuthorServiceId(s) => {
                    AccountId::parse(s).ok().map(Author::AccountId)
                }
                addressable_message::Author::AuthorE164(s) => {
                    PhoneNumber::parse(s).ok().map(Author::PhoneNumber)
                }
            });
            match (author, m.sent_timestamp) {
                (Some(author), Some(ts)) => Some(AddressableMessage::new(author, ts)),
                _ => {
                    *dropped += 1;
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use delsync_codec::Value;

    fn aci() -> AccountId {
        AccountId::parse("0d8c6f55-3f4b-4a7e-9e0b-5a1f2c3d4e5f").unwrap()
    }

    fn unknown_conversation() -> ConversationIdentifier {
        use delsync_codec::Decode;
        ConversationIdentifier::from_value(&Value::record([
            ("type", Value::from("username")),
            ("username", Value::from("bob.42")),
        ]))
        .unwrap()
    }

    #[test]
    fn lowering_uses_only_chosen_variant() {
        let contents = Contents::new(
            vec![MessageDeletes {
                conversation: ConversationIdentifier::PhoneNumber(
                    PhoneNumber::parse("+15550123").unwrap(),
                ),
                messages: vec![AddressableMessage::new(Author::AccountId(aci()), 1000)],
            }],
            vec![],
            vec![],
        );

        let lowered = contents.to_wire();
        assert_eq!(lowered.omitted, 0);
        let delete = &lowered.delete_for_me.message_deletes[0];
        assert_eq!(
            delete.conversation.as_ref().unwrap().identifier,
            Some(conversation_identifier::Identifier::ThreadE164(
                "+15550123".into()
            ))
        );
        assert_eq!(
            delete.messages[0].author,
            Some(addressable_message::Author::AuthorServiceId(
                aci().service_id_string()
            ))
        );
        assert_eq!(delete.messages[0].sent_timestamp, Some(1000));
    }

    #[test]
    fn anchor_order_survives_wire_roundtrip() {
        let anchors: Vec<_> = [500u64, 300, 900]
            .into_iter()
            .map(|ts| AddressableMessage::new(Author::AccountId(aci()), ts))
            .collect();
        let contents = Contents::new(
            vec![],
            vec![ConversationDelete {
                conversation: ConversationIdentifier::AccountId(aci()),
                most_recent_messages: anchors,
                is_full_delete: false,
            }],
            vec![],
        );

        let bytes = SyncMessage::delete_for_me(contents.to_wire().delete_for_me).to_bytes();
        let parsed = SyncMessage::from_bytes(&bytes).unwrap();
        let raised = Contents::from_wire(parsed.delete_for_me.as_ref().unwrap());

        assert_eq!(raised.dropped, 0);
        assert_eq!(raised.contents, contents);
    }

    #[test]
    fn unknown_variants_are_omitted() {
        let contents = Contents::new(
            vec![MessageDeletes {
                conversation: ConversationIdentifier::AccountId(aci()),
                messages: vec![AddressableMessage::new(
                    Author::AccountId(aci()),
                    10,
                )],
            }],
            vec![],
            vec![LocalOnlyConversationDelete {
                conversation: unknown_conversation(),
            }],
        );

        let lowered = contents.to_wire();
        assert_eq!(lowered.omitted, 1);
        assert_eq!(lowered.delete_for_me.message_deletes.len(), 1);
        assert!(lowered
            .delete_for_me
            .local_only_conversation_deletes
            .is_empty());
    }

    #[test]
    fn raising_drops_unaddressable_entries() {
        let message = DeleteForMe {
            message_deletes: vec![
                proto::MessageDeletes {
                    conversation: None,
                    messages: vec![],
                },
                proto::MessageDeletes {
                    conversation: Some(proto::ConversationIdentifier {
                        identifier: Some(conversation_identifier::Identifier::ThreadGroupId(
                            vec![1; 32],
                        )),
                    }),
                    messages: vec![
                        proto::AddressableMessage {
                            author: None,
                            sent_timestamp: Some(5),
                        },
                        proto::AddressableMessage {
                            author: Some(addressable_message::Author::AuthorE164(
                                "+15550100".into(),
                            )),
                            sent_timestamp: None,
                        },
                        proto::AddressableMessage {
                            author: Some(addressable_message::Author::AuthorE164(
                                "+15550100".into(),
                            )),
                            sent_timestamp: Some(7),
                        },
                    ],
                },
            ],
            conversation_deletes: vec![],
            local_only_conversation_deletes: vec![],
        };

        let raised = Contents::from_wire(&message);
        assert_eq!(raised.dropped, 3);
        assert_eq!(raised.contents.message_deletes.len(), 1);
        assert_eq!(raised.contents.message_deletes[0].messages.len(), 1);
        assert_eq!(raised.contents.message_deletes[0].messages[0].sent_timestamp, 7);
    }

    #[test]
    fn malformed_wire_bytes_are_an_error() {
        assert!(SyncMessage::from_bytes(&[0xff, 0xff, 0xff]).is_err());
    }
}
