//! Reconciliation against a populated device, and sender-to-receiver flows.

use delsync_engine::{DeleteForMeSender, DeleteSyncConfig, Outbox, Pass, Reconciler};
use delsync_protocol::wire::sync_message::delete_for_me as proto;
use delsync_protocol::wire::sync_message::DeleteForMe;
use delsync_protocol::{
    AddressableMessage, Author, Contents, ConversationDelete, ConversationIdentifier,
    LocalOnlyConversationDelete, MessageDeletes,
};
use delsync_store::{
    InMemoryStore, MessageStore, RecipientAddress, RecipientId, StoreTransaction, ThreadId,
};
use delsync_testkit::{account_id, group_id, Device};

/// A device whose user is `account_id(0)`, with a direct thread to
/// `account_id(1)`.
fn device() -> (Device, RecipientId, ThreadId) {
    let device = Device::new(account_id(0));
    let (peer, thread) = device.contact(RecipientAddress::from_account_id(account_id(1)));
    (device, peer, thread)
}

fn peer_conversation() -> ConversationIdentifier {
    ConversationIdentifier::AccountId(account_id(1))
}

fn from_peer(ts: u64) -> AddressableMessage {
    AddressableMessage::new(Author::AccountId(account_id(1)), ts)
}

fn conversation_delete(anchors: &[u64], is_full_delete: bool) -> Contents {
    Contents::new(
        vec![],
        vec![ConversationDelete {
            conversation: peer_conversation(),
            most_recent_messages: anchors.iter().map(|&ts| from_peer(ts)).collect(),
            is_full_delete,
        }],
        vec![],
    )
}

#[test]
fn anchored_delete_clears_up_to_oldest_anchor() {
    let (device, peer, thread) = device();
    for ts in [100, 300, 400, 500, 600] {
        device.incoming(thread, peer, ts);
    }

    let report = Reconciler::new()
        .apply(&*device, &conversation_delete(&[500, 300], false))
        .unwrap();

    assert_eq!(device.timestamps(thread), vec![400, 500, 600]);
    assert_eq!(report.messages_deleted, 2);
    assert_eq!(report.threads_cleared, 1);
}

#[test]
fn bound_is_oldest_anchor_even_when_it_is_missing_locally() {
    let (device, peer, thread) = device();
    for ts in [100, 200, 400] {
        device.incoming(thread, peer, ts);
    }

    // 300 does not exist here; 400 matching is enough to apply the delete.
    Reconciler::new()
        .apply(&*device, &conversation_delete(&[400, 300], false))
        .unwrap();

    assert_eq!(device.timestamps(thread), vec![400]);
}

#[test]
fn replaying_anchored_delete_is_a_no_op() {
    let (device, peer, thread) = device();
    for ts in [100, 300, 400, 500, 600] {
        device.incoming(thread, peer, ts);
    }
    let contents = conversation_delete(&[500, 300], false);

    let reconciler = Reconciler::new();
    reconciler.apply(&*device, &contents).unwrap();
    let after_first = device.snapshot();
    let second = reconciler.apply(&*device, &contents).unwrap();

    assert_eq!(device.snapshot(), after_first);
    assert_eq!(device.timestamps(thread), vec![400, 500, 600]);
    assert_eq!(second.messages_deleted, 0);
}

#[test]
fn full_delete_with_no_anchors_clears_thread() {
    let (device, peer, thread) = device();
    device.incoming(thread, peer, 10);
    device.outgoing(thread, 20);
    device.info(thread, 30);

    let report = Reconciler::new()
        .apply(&*device, &conversation_delete(&[], true))
        .unwrap();

    assert!(device.timestamps(thread).is_empty());
    assert_eq!(report.messages_deleted, 3);
}

#[test]
fn non_full_delete_without_matches_changes_nothing() {
    let (device, peer, thread) = device();
    device.incoming(thread, peer, 10);

    let report = Reconciler::new()
        .apply(&*device, &conversation_delete(&[99], false))
        .unwrap();

    assert_eq!(device.timestamps(thread), vec![10]);
    assert_eq!(report.unanchored_conversation_deletes, 1);
    assert_eq!(report.threads_cleared, 0);
}

#[test]
fn colliding_timestamps_delete_every_match() {
    let (device, peer, thread) = device();
    device.incoming(thread, peer, 100);
    device.incoming(thread, peer, 100);
    device.incoming(thread, peer, 200);

    let contents = Contents::new(
        vec![MessageDeletes {
            conversation: peer_conversation(),
            messages: vec![from_peer(100)],
        }],
        vec![],
        vec![],
    );
    let report = Reconciler::new().apply(&*device, &contents).unwrap();

    assert_eq!(device.timestamps(thread), vec![200]);
    assert_eq!(report.messages_deleted, 2);
}

#[test]
fn message_deletes_match_on_author_and_timestamp() {
    let (device, peer, thread) = device();
    device.incoming(thread, peer, 100);
    device.outgoing(thread, 100);

    let contents = Contents::new(
        vec![MessageDeletes {
            conversation: peer_conversation(),
            messages: vec![
                AddressableMessage::new(Author::AccountId(account_id(0)), 100),
                from_peer(555),
            ],
        }],
        vec![],
        vec![],
    );
    let report = Reconciler::new().apply(&*device, &contents).unwrap();

    // Only the outgoing copy goes; the peer's message at 100 stays.
    assert_eq!(device.timestamps(thread), vec![100]);
    assert_eq!(report.messages_deleted, 1);
    assert_eq!(report.message_misses, 1);
}

#[test]
fn replaying_message_deletes_is_a_no_op() {
    let (device, peer, thread) = device();
    for ts in [1, 2, 3] {
        device.incoming(thread, peer, ts);
    }
    let contents = Contents::new(
        vec![MessageDeletes {
            conversation: peer_conversation(),
            messages: vec![from_peer(1), from_peer(3)],
        }],
        vec![],
        vec![],
    );

    let reconciler = Reconciler::new();
    reconciler.apply(&*device, &contents).unwrap();
    let after_first = device.snapshot();
    let second = reconciler.apply(&*device, &contents).unwrap();

    assert_eq!(device.snapshot(), after_first);
    assert_eq!(second.messages_deleted, 0);
    assert_eq!(second.message_misses, 2);
}

#[test]
fn message_pass_cannot_move_a_conversation_bound() {
    let (device, peer, thread) = device();
    for ts in [100, 200, 300, 400] {
        device.incoming(thread, peer, ts);
    }
    // The message pass removes anchor 200; the bound stays at 200.
    let contents = Contents::new(
        vec![MessageDeletes {
            conversation: peer_conversation(),
            messages: vec![from_peer(200)],
        }],
        vec![ConversationDelete {
            conversation: peer_conversation(),
            most_recent_messages: vec![from_peer(300), from_peer(200)],
            is_full_delete: false,
        }],
        vec![],
    );

    let reconciler = Reconciler::new();
    let first = device.fork();
    let second = device.fork();
    reconciler
        .apply_in_order(&first, &contents, &Pass::ALL)
        .unwrap();
    reconciler
        .apply_in_order(
            &second,
            &contents,
            &[
                Pass::ConversationDeletes,
                Pass::LocalOnlyConversationDeletes,
                Pass::MessageDeletes,
            ],
        )
        .unwrap();

    assert_eq!(first.snapshot(), second.snapshot());
    assert_eq!(first.timestamps(thread).unwrap(), vec![300, 400]);
}

#[test]
fn local_only_delete_clears_thread_without_enqueueing() {
    let (device, peer, thread) = device();
    device.incoming(thread, peer, 5);
    device.info(thread, 6);

    let contents = Contents::new(
        vec![],
        vec![],
        vec![LocalOnlyConversationDelete {
            conversation: peer_conversation(),
        }],
    );
    let report = Reconciler::new().apply(&*device, &contents).unwrap();

    assert!(device.timestamps(thread).is_empty());
    assert_eq!(report.threads_cleared, 1);
    assert_eq!(device.outbox_len(), 0);
}

#[test]
fn unknown_conversations_are_counted_as_misses() {
    let (device, peer, thread) = device();
    device.incoming(thread, peer, 5);

    let contents = Contents::new(
        vec![MessageDeletes {
            conversation: ConversationIdentifier::AccountId(account_id(77)),
            messages: vec![from_peer(5)],
        }],
        vec![ConversationDelete {
            conversation: ConversationIdentifier::GroupId(group_id(9)),
            most_recent_messages: vec![],
            is_full_delete: true,
        }],
        vec![],
    );
    let report = Reconciler::new().apply(&*device, &contents).unwrap();

    assert_eq!(device.timestamps(thread), vec![5]);
    assert_eq!(report.conversation_misses, 2);
}

#[test]
fn group_thread_matches_messages_from_members() {
    let device = Device::new(account_id(0));
    let alice = device.member(RecipientAddress::from_account_id(account_id(1)));
    let bob = device.member(RecipientAddress::from_account_id(account_id(2)));
    let group = device.group(group_id(3));
    device.incoming(group, alice, 10);
    device.incoming(group, bob, 10);

    let contents = Contents::new(
        vec![MessageDeletes {
            conversation: ConversationIdentifier::GroupId(group_id(3)),
            messages: vec![AddressableMessage::new(Author::AccountId(account_id(2)), 10)],
        }],
        vec![],
        vec![],
    );
    Reconciler::new().apply(&*device, &contents).unwrap();

    assert_eq!(device.timestamps(group), vec![10]);
}

#[test]
fn wire_entries_without_conversation_are_dropped() {
    let (device, peer, thread) = device();
    device.incoming(thread, peer, 5);

    let message = DeleteForMe {
        message_deletes: vec![proto::MessageDeletes {
            conversation: None,
            messages: vec![],
        }],
        conversation_deletes: vec![],
        local_only_conversation_deletes: vec![],
    };
    let report = Reconciler::new().apply_wire(&*device, &message).unwrap();

    assert_eq!(report.dropped_on_receive, 1);
    assert_eq!(device.timestamps(thread), vec![5]);
}

/// Two linked devices of `account_id(0)`, each with a thread to
/// `account_id(1)` holding the same history.
fn linked_pair() -> ((Device, ThreadId), (Device, ThreadId)) {
    let build = || {
        let (device, peer, thread) = device();
        for ts in [100, 200, 300] {
            device.incoming(thread, peer, ts);
            device.outgoing(thread, ts + 50);
        }
        (device, thread)
    };
    (build(), build())
}

fn deliver(from: &InMemoryStore, to: &InMemoryStore) -> usize {
    let pending = from.read(|txn| Ok(Outbox::pending(txn))).unwrap().unwrap();
    let count = pending.len();
    for (id, message) in pending {
        let delete_for_me = message
            .and_then(|m| m.delete_for_me)
            .expect("well-formed envelope");
        Reconciler::new().apply_wire(to, &delete_for_me).unwrap();
        Outbox::retire(from, id).unwrap();
    }
    count
}

#[test]
fn message_deletion_propagates_to_linked_device() {
    let ((sender_device, sender_thread), (receiver, receiver_thread)) = linked_pair();
    let rows: Vec<_> = sender_device
        .read(|txn| txn.messages_in_thread(sender_thread))
        .unwrap()
        .into_iter()
        .filter(|m| m.timestamp == 200 || m.timestamp == 350)
        .map(|m| m.row_id)
        .collect();

    let sender = DeleteForMeSender::default();
    sender_device
        .write(|txn| sender.delete_messages(txn, sender_thread, &rows))
        .unwrap();
    assert_eq!(deliver(&sender_device, &receiver), 1);

    assert_eq!(receiver.timestamps(receiver_thread), vec![100, 150, 250, 300]);
    assert_eq!(
        receiver.timestamps(receiver_thread),
        sender_device.timestamps(sender_thread)
    );
    assert_eq!(sender_device.outbox_len(), 0);
    assert_eq!(receiver.outbox_len(), 0);
}

#[test]
fn conversation_deletion_propagates_to_linked_device() {
    let ((sender_device, sender_thread), (receiver, receiver_thread)) = linked_pair();
    // A message that reached only the receiver, newer than every anchor.
    receiver.outgoing(receiver_thread, 900);

    // A single anchor: the newest message the sender saw.
    let sender = DeleteForMeSender::new(DeleteSyncConfig::new().with_max_anchor_messages(1));
    sender_device
        .write(|txn| sender.delete_conversations(txn, &[sender_thread], false))
        .unwrap();
    deliver(&sender_device, &receiver);

    assert!(sender_device.timestamps(sender_thread).is_empty());
    assert_eq!(receiver.timestamps(receiver_thread), vec![900]);
}

#[test]
fn sync_failure_rolls_back_local_deletion() {
    let ((sender_device, sender_thread), _) = linked_pair();
    let before = sender_device.snapshot();

    let sender = DeleteForMeSender::default();
    let result = sender_device
        .write(|txn| sender.delete_conversations(txn, &[sender_thread, ThreadId(404)], true));

    assert!(result.unwrap_err().is_store_error());
    assert_eq!(sender_device.snapshot(), before);
    assert_eq!(sender_device.outbox_len(), 0);
}
