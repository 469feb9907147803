//! Resolution of local rows to cross-device identifiers.

use delsync_protocol::{AddressableMessage, Author, ConversationIdentifier};
use delsync_store::{IdentityDirectory, LocalMessage, LocalThread, MessageOrigin, ThreadKind};

/// Resolves a thread to the identifier linked devices know it by.
///
/// Direct threads prefer the peer's account id over the phone number. Returns
/// `None` when the peer has neither.
pub fn conversation_identifier<D>(directory: &D, thread: &LocalThread) -> Option<ConversationIdentifier>
where
    D: IdentityDirectory + ?Sized,
{
    match &thread.kind {
        ThreadKind::Contact(recipient) => {
            let address = directory.address(*recipient)?;
            match (address.account_id, address.phone_number) {
                (Some(aci), _) => Some(ConversationIdentifier::AccountId(aci)),
                (None, Some(e164)) => Some(ConversationIdentifier::PhoneNumber(e164)),
                (None, None) => None,
            }
        }
        ThreadKind::Group(group) => Some(ConversationIdentifier::GroupId(group.clone())),
    }
}

/// Resolves a message to its (author, sent timestamp) address.
///
/// Outgoing messages are always attributed to the local account id. Returns
/// `None` for local info messages and for senders with no known identifiers.
pub fn addressable_message<D>(directory: &D, message: &LocalMessage) -> Option<AddressableMessage>
where
    D: IdentityDirectory + ?Sized,
{
    let author = match message.origin {
        MessageOrigin::Incoming { author } => {
            let address = directory.address(author)?;
            Author::from_parts(address.account_id, address.phone_number)?
        }
        MessageOrigin::Outgoing => Author::AccountId(directory.local_identifiers()?.account_id),
        MessageOrigin::Local => return None,
    };
    Some(AddressableMessage::new(author, message.timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use delsync_protocol::{AccountId, GroupId, PhoneNumber};
    use delsync_store::{
        InMemoryStore, LocalIdentifiers, MessageStore, RecipientAddress, StoreTransaction,
    };

    fn aci(n: u8) -> AccountId {
        AccountId::parse(&format!("00000000-0000-4000-8000-0000000000{n:02x}")).unwrap()
    }

    fn phone() -> PhoneNumber {
        PhoneNumber::parse("+15550100").unwrap()
    }

    #[test]
    fn account_id_is_preferred_for_conversations() {
        let store = InMemoryStore::new();
        let both = store.add_recipient(RecipientAddress {
            account_id: Some(aci(1)),
            phone_number: Some(phone()),
        });
        let phone_only = store.add_recipient(RecipientAddress::from_phone_number(phone()));
        let t1 = store.add_contact_thread(both);
        let t2 = store.add_contact_thread(phone_only);
        let t3 = store.add_unaddressable_thread();

        store
            .read(|txn| {
                let thread = txn.thread(t1)?.unwrap();
                assert_eq!(
                    conversation_identifier(txn, &thread),
                    Some(ConversationIdentifier::AccountId(aci(1)))
                );
                let thread = txn.thread(t2)?.unwrap();
                assert_eq!(
                    conversation_identifier(txn, &thread),
                    Some(ConversationIdentifier::PhoneNumber(phone()))
                );
                let thread = txn.thread(t3)?.unwrap();
                assert_eq!(conversation_identifier(txn, &thread), None);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn group_threads_carry_group_bytes() {
        let store = InMemoryStore::new();
        let group = GroupId::new(vec![9u8; 32]).unwrap();
        let thread = store.add_group_thread(group.clone());

        let resolved = store
            .read(|txn| Ok(txn.thread(thread)?.and_then(|t| conversation_identifier(txn, &t))))
            .unwrap();
        assert_eq!(resolved, Some(ConversationIdentifier::GroupId(group)));
    }

    #[test]
    fn outgoing_messages_use_local_account_id() {
        let store = InMemoryStore::new();
        store.set_local_identifiers(LocalIdentifiers {
            account_id: aci(7),
            phone_number: Some(phone()),
        });
        let thread = store.add_unaddressable_thread();
        store.insert_message(thread, 42, MessageOrigin::Outgoing);

        let resolved = store
            .read(|txn| {
                let message = txn.messages_in_thread(thread)?.remove(0);
                Ok(addressable_message(txn, &message))
            })
            .unwrap();
        assert_eq!(
            resolved,
            Some(AddressableMessage::new(Author::AccountId(aci(7)), 42))
        );
    }

    #[test]
    fn unknown_senders_and_info_messages_are_unaddressable() {
        let store = InMemoryStore::new();
        let nobody = store.add_recipient(RecipientAddress::default());
        let thread = store.add_contact_thread(nobody);
        store.insert_message(thread, 1, MessageOrigin::Incoming { author: nobody });
        store.insert_message(thread, 2, MessageOrigin::Local);

        let resolved = store
            .read(|txn| {
                Ok(txn
                    .messages_in_thread(thread)?
                    .iter()
                    .map(|m| addressable_message(txn, m))
                    .collect::<Vec<_>>())
            })
            .unwrap();
        assert_eq!(resolved, vec![None, None]);
    }

    #[test]
    fn incoming_phone_only_sender() {
        let store = InMemoryStore::new();
        let sender = store.add_recipient(RecipientAddress::from_phone_number(phone()));
        let thread = store.add_contact_thread(sender);
        store.insert_message(thread, 5, MessageOrigin::Incoming { author: sender });

        let resolved = store
            .read(|txn| {
                let message = txn.messages_in_thread(thread)?.remove(0);
                Ok(addressable_message(txn, &message))
            })
            .unwrap();
        assert_eq!(
            resolved,
            Some(AddressableMessage::new(Author::PhoneNumber(phone()), 5))
        );
    }
}
