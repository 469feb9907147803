//! Test fixtures: identifiers and a populated device store.

use delsync_protocol::{
    AccountId, AddressableMessage, Author, Contents, ConversationDelete, ConversationIdentifier,
    GroupId, LocalOnlyConversationDelete, MessageDeletes, PhoneNumber,
};
use delsync_store::{
    InMemoryStore, LocalIdentifiers, MessageOrigin, MessageRowId, RecipientAddress, RecipientId,
    ThreadId,
};
use uuid::Uuid;

/// A deterministic account id.
pub fn account_id(n: u8) -> AccountId {
    let mut bytes = [0u8; 16];
    bytes[0] = 0xA0;
    bytes[6] = 0x40;
    bytes[8] = 0x80;
    bytes[15] = n;
    AccountId::new(Uuid::from_bytes(bytes))
}

/// A deterministic phone number.
pub fn phone_number(n: u16) -> PhoneNumber {
    PhoneNumber::parse(&format!("+1555010{n:04}")).expect("valid phone number")
}

/// A deterministic 32-byte group id.
pub fn group_id(n: u8) -> GroupId {
    GroupId::new(vec![n; 32]).expect("non-empty group id")
}

/// One linked device with an in-memory store.
///
/// Derefs to the [`InMemoryStore`] so it can be handed to the engine
/// directly.
#[derive(Debug)]
pub struct Device {
    /// The device's message store.
    pub store: InMemoryStore,
    /// The local user's account id.
    pub local: AccountId,
}

impl Device {
    /// Creates a device registered as `local`.
    pub fn new(local: AccountId) -> Self {
        let store = InMemoryStore::new();
        store.set_local_identifiers(LocalIdentifiers {
            account_id: local,
            phone_number: None,
        });
        Self { store, local }
    }

    /// Adds a contact and a direct thread with them.
    pub fn contact(&self, address: RecipientAddress) -> (RecipientId, ThreadId) {
        let recipient = self.store.add_recipient(address);
        (recipient, self.store.add_contact_thread(recipient))
    }

    /// Adds a group thread.
    pub fn group(&self, group: GroupId) -> ThreadId {
        self.store.add_group_thread(group)
    }

    /// Adds a recipient that is not in any thread of its own.
    pub fn member(&self, address: RecipientAddress) -> RecipientId {
        self.store.add_recipient(address)
    }

    /// Inserts a message received from `author`.
    pub fn incoming(&self, thread: ThreadId, author: RecipientId, timestamp: u64) -> MessageRowId {
        self.store
            .insert_message(thread, timestamp, MessageOrigin::Incoming { author })
    }

    /// Inserts a message sent by the local user.
    pub fn outgoing(&self, thread: ThreadId, timestamp: u64) -> MessageRowId {
        self.store
            .insert_message(thread, timestamp, MessageOrigin::Outgoing)
    }

    /// Inserts a device-local info message.
    pub fn info(&self, thread: ThreadId, timestamp: u64) -> MessageRowId {
        self.store
            .insert_message(thread, timestamp, MessageOrigin::Local)
    }

    /// Remaining timestamps in a thread, oldest first.
    pub fn timestamps(&self, thread: ThreadId) -> Vec<u64> {
        self.store
            .timestamps(thread)
            .expect("in-memory read cannot fail")
    }
}

impl std::ops::Deref for Device {
    type Target = InMemoryStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Who wrote a message in a [`Scenario`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// One of the scenario's peers, by index.
    Peer(usize),
    /// The local user.
    Me,
    /// A device-local info message.
    Info,
}

/// A conversation delete in a [`Scenario`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioConversationDelete {
    /// Thread index.
    pub thread: usize,
    /// Anchors, most recent first.
    pub anchors: Vec<(Sender, u64)>,
    /// Full-delete flag.
    pub is_full_delete: bool,
}

/// A randomized device history and a delete intent set aimed at it.
///
/// The scenario has three peers and three threads: a direct thread with peer
/// 0 (known by account id), a direct thread with peer 1 (known only by phone
/// number) and a group thread that every peer posts in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Messages as `(thread, sender, timestamp)`.
    pub history: Vec<(usize, Sender, u64)>,
    /// Message deletes as `(thread, [(sender, timestamp)])`.
    pub message_deletes: Vec<(usize, Vec<(Sender, u64)>)>,
    /// Conversation deletes.
    pub conversation_deletes: Vec<ScenarioConversationDelete>,
    /// Threads cleared locally on the sender.
    pub local_only: Vec<usize>,
}

/// Number of threads in a [`Scenario`].
pub const SCENARIO_THREADS: usize = 3;

/// Number of peers in a [`Scenario`].
pub const SCENARIO_PEERS: usize = 3;

/// A built [`Scenario`].
#[derive(Debug)]
pub struct ScenarioDevice {
    /// The receiving device.
    pub device: Device,
    /// Local thread per scenario thread index.
    pub threads: Vec<ThreadId>,
}

impl Scenario {
    fn local() -> AccountId {
        account_id(0)
    }

    fn peer_address(peer: usize) -> RecipientAddress {
        match peer {
            0 => RecipientAddress::from_account_id(account_id(1)),
            1 => RecipientAddress::from_phone_number(phone_number(1)),
            n => RecipientAddress {
                account_id: Some(account_id(n as u8 + 1)),
                phone_number: Some(phone_number(n as u16 + 1)),
            },
        }
    }

    fn author(sender: Sender) -> Author {
        match sender {
            Sender::Me => Author::AccountId(Self::local()),
            Sender::Peer(1) => Author::PhoneNumber(phone_number(1)),
            Sender::Peer(peer) => Author::AccountId(account_id(peer as u8 + 1)),
            // No recipient has this number.
            Sender::Info => Author::PhoneNumber(phone_number(9999)),
        }
    }

    fn conversation(thread: usize) -> ConversationIdentifier {
        match thread {
            0 => ConversationIdentifier::AccountId(account_id(1)),
            1 => ConversationIdentifier::PhoneNumber(phone_number(1)),
            _ => ConversationIdentifier::GroupId(group_id(1)),
        }
    }

    fn addresses(targets: &[(Sender, u64)]) -> Vec<AddressableMessage> {
        targets
            .iter()
            .map(|&(sender, ts)| AddressableMessage::new(Self::author(sender), ts))
            .collect()
    }

    /// Builds the receiving device with the scenario's history.
    pub fn device(&self) -> ScenarioDevice {
        let device = Device::new(Self::local());
        let peers: Vec<RecipientId> = (0..SCENARIO_PEERS)
            .map(|peer| device.member(Self::peer_address(peer)))
            .collect();
        let threads = vec![
            device.store.add_contact_thread(peers[0]),
            device.store.add_contact_thread(peers[1]),
            device.group(group_id(1)),
        ];

        for &(thread, sender, ts) in &self.history {
            let thread = threads[thread % SCENARIO_THREADS];
            match sender {
                Sender::Peer(peer) => {
                    device.incoming(thread, peers[peer % SCENARIO_PEERS], ts);
                }
                Sender::Me => {
                    device.outgoing(thread, ts);
                }
                Sender::Info => {
                    device.info(thread, ts);
                }
            }
        }

        ScenarioDevice { device, threads }
    }

    /// The intent set the scenario delivers.
    pub fn contents(&self) -> Contents {
        Contents::new(
            self.message_deletes
                .iter()
                .map(|(thread, targets)| MessageDeletes {
                    conversation: Self::conversation(*thread),
                    messages: Self::addresses(targets),
                })
                .collect(),
            self.conversation_deletes
                .iter()
                .map(|delete| ConversationDelete {
                    conversation: Self::conversation(delete.thread),
                    most_recent_messages: Self::addresses(&delete.anchors),
                    is_full_delete: delete.is_full_delete,
                })
                .collect(),
            self.local_only
                .iter()
                .map(|&thread| LocalOnlyConversationDelete {
                    conversation: Self::conversation(thread),
                })
                .collect(),
        )
    }
}
