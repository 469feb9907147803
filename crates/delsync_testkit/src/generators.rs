//! Property-based test generators using proptest.
//!
//! Strategies produce values that satisfy the protocol's construction
//! invariants (non-empty group ids, well-formed phone numbers).

use crate::fixtures::{
    Scenario, ScenarioConversationDelete, Sender, SCENARIO_PEERS, SCENARIO_THREADS,
};
use delsync_codec::Value;
use delsync_protocol::{
    AccountId, AddressableMessage, Author, Contents, ConversationDelete, ConversationIdentifier,
    Decode, GroupId, LocalOnlyConversationDelete, MessageDeletes, PhoneNumber,
};
use proptest::prelude::*;
use uuid::Uuid;

/// Strategy for account ids.
pub fn account_id_strategy() -> impl Strategy<Value = AccountId> {
    any::<[u8; 16]>().prop_map(|bytes| AccountId::new(Uuid::from_bytes(bytes)))
}

/// Strategy for E.164 phone numbers.
pub fn phone_number_strategy() -> impl Strategy<Value = PhoneNumber> {
    prop::string::string_regex("\\+[1-9][0-9]{6,14}")
        .expect("Invalid regex")
        .prop_map(|s| PhoneNumber::parse(&s).expect("generated number is valid"))
}

/// Strategy for group ids.
pub fn group_id_strategy() -> impl Strategy<Value = GroupId> {
    prop::collection::vec(any::<u8>(), 1..=32)
        .prop_map(|bytes| GroupId::new(bytes).expect("non-empty group id"))
}

/// Strategy for a record written by a newer client: a `type` this version
/// does not know plus an arbitrary text payload.
fn unknown_record_strategy() -> impl Strategy<Value = Value> {
    (
        prop::string::string_regex("[a-z]{3,10}").expect("Invalid regex"),
        prop::string::string_regex("[a-z0-9.]{0,16}").expect("Invalid regex"),
    )
        .prop_filter("type must be unknown", |(kind, _)| {
            !matches!(kind.as_str(), "account_id" | "phone_number" | "group_id")
        })
        .prop_map(|(kind, payload)| {
            Value::record([("type", Value::from(kind)), ("payload", Value::from(payload))])
        })
}

/// Strategy for conversation identifiers, including unknown variants.
pub fn conversation_identifier_strategy() -> impl Strategy<Value = ConversationIdentifier> {
    prop_oneof![
        4 => account_id_strategy().prop_map(ConversationIdentifier::AccountId),
        2 => phone_number_strategy().prop_map(ConversationIdentifier::PhoneNumber),
        2 => group_id_strategy().prop_map(ConversationIdentifier::GroupId),
        1 => unknown_record_strategy().prop_map(|raw| {
            ConversationIdentifier::from_value(&raw).expect("unknown type decodes")
        }),
    ]
}

/// Strategy for message authors, including unknown variants.
pub fn author_strategy() -> impl Strategy<Value = Author> {
    prop_oneof![
        4 => account_id_strategy().prop_map(Author::AccountId),
        2 => phone_number_strategy().prop_map(Author::PhoneNumber),
        1 => unknown_record_strategy()
            .prop_map(|raw| Author::from_value(&raw).expect("unknown type decodes")),
    ]
}

/// Strategy for addressable messages over the full `u64` timestamp range.
pub fn addressable_message_strategy() -> impl Strategy<Value = AddressableMessage> {
    (author_strategy(), any::<u64>()).prop_map(|(author, ts)| AddressableMessage::new(author, ts))
}

/// Strategy for delete intent sets.
pub fn contents_strategy() -> impl Strategy<Value = Contents> {
    let messages = || prop::collection::vec(addressable_message_strategy(), 0..6);
    (
        prop::collection::vec(
            (conversation_identifier_strategy(), messages())
                .prop_map(|(conversation, messages)| MessageDeletes {
                    conversation,
                    messages,
                }),
            0..4,
        ),
        prop::collection::vec(
            (conversation_identifier_strategy(), messages(), any::<bool>()).prop_map(
                |(conversation, most_recent_messages, is_full_delete)| ConversationDelete {
                    conversation,
                    most_recent_messages,
                    is_full_delete,
                },
            ),
            0..4,
        ),
        prop::collection::vec(
            conversation_identifier_strategy()
                .prop_map(|conversation| LocalOnlyConversationDelete { conversation }),
            0..4,
        ),
    )
        .prop_map(|(message_deletes, conversation_deletes, local_only)| {
            Contents::new(message_deletes, conversation_deletes, local_only)
        })
}

fn sender_strategy() -> impl Strategy<Value = Sender> {
    prop_oneof![
        6 => (0..SCENARIO_PEERS).prop_map(Sender::Peer),
        3 => Just(Sender::Me),
        1 => Just(Sender::Info),
    ]
}

/// Timestamps come from a narrow range so collisions are common.
fn target_strategy() -> impl Strategy<Value = (Sender, u64)> {
    (sender_strategy(), 1u64..40)
}

/// Strategy for a device history plus an intent set aimed at it.
pub fn scenario_strategy() -> impl Strategy<Value = Scenario> {
    let thread = || 0..SCENARIO_THREADS;
    (
        prop::collection::vec((thread(), sender_strategy(), 1u64..40), 0..40),
        prop::collection::vec(
            (thread(), prop::collection::vec(target_strategy(), 0..6)),
            0..4,
        ),
        prop::collection::vec(
            (
                thread(),
                prop::collection::vec(target_strategy(), 0..5),
                prop::bool::weighted(0.3),
            )
                .prop_map(|(thread, mut anchors, is_full_delete)| {
                    anchors.sort_by(|a, b| b.1.cmp(&a.1));
                    ScenarioConversationDelete {
                        thread,
                        anchors,
                        is_full_delete,
                    }
                }),
            0..3,
        ),
        prop::collection::vec(thread(), 0..2),
    )
        .prop_map(
            |(history, message_deletes, conversation_deletes, local_only)| Scenario {
                history,
                message_deletes,
                conversation_deletes,
                local_only,
            },
        )
}
