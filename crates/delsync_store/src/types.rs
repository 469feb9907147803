//! Local row types.
//!
//! Row ids are meaningful only on the device that assigned them; they never
//! appear in a sync payload.

use delsync_protocol::{AccountId, Author, GroupId, PhoneNumber};

/// Local thread row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(pub u64);

/// Local message row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageRowId(pub u64);

/// Local recipient row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecipientId(pub u64);

/// Outbox row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutboxId(pub u64);

/// What the directory knows about a recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientAddress {
    /// Stable account identifier, when known.
    pub account_id: Option<AccountId>,
    /// Phone number, when known.
    pub phone_number: Option<PhoneNumber>,
}

impl RecipientAddress {
    /// Address with only an account id.
    pub fn from_account_id(account_id: AccountId) -> Self {
        Self {
            account_id: Some(account_id),
            phone_number: None,
        }
    }

    /// Address with only a phone number.
    pub fn from_phone_number(phone_number: PhoneNumber) -> Self {
        Self {
            account_id: None,
            phone_number: Some(phone_number),
        }
    }

    /// Returns true if `author` identifies this recipient.
    pub fn matches(&self, author: &Author) -> bool {
        match author {
            Author::AccountId(aci) => self.account_id.as_ref() == Some(aci),
            Author::PhoneNumber(e164) => self.phone_number.as_ref() == Some(e164),
            Author::Unknown(_) => false,
        }
    }
}

/// Identifiers of the user who owns this device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalIdentifiers {
    /// The local account id; always known.
    pub account_id: AccountId,
    /// The local phone number, if registered with one.
    pub phone_number: Option<PhoneNumber>,
}

impl LocalIdentifiers {
    /// The local user as a recipient address.
    pub fn address(&self) -> RecipientAddress {
        RecipientAddress {
            account_id: Some(self.account_id),
            phone_number: self.phone_number.clone(),
        }
    }
}

/// What a thread is a conversation with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadKind {
    /// Direct conversation.
    Contact(RecipientId),
    /// Group conversation.
    Group(GroupId),
}

/// A local thread row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalThread {
    /// Row id.
    pub id: ThreadId,
    /// Peer or group.
    pub kind: ThreadKind,
}

/// Who produced a local message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOrigin {
    /// Received from `author`.
    Incoming {
        /// Sender recipient row.
        author: RecipientId,
    },
    /// Sent by the local user.
    Outgoing,
    /// Device-local info message; never addressable.
    Local,
}

/// A local message row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMessage {
    /// Row id.
    pub row_id: MessageRowId,
    /// Owning thread.
    pub thread_id: ThreadId,
    /// Sender-assigned epoch milliseconds.
    pub timestamp: u64,
    /// Who produced it.
    pub origin: MessageOrigin,
}

/// How much of a thread's history to delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryBound {
    /// Every message.
    Full,
    /// Messages with a timestamp at or before this value.
    AtOrBefore(u64),
}

impl HistoryBound {
    /// Returns true if a message with `timestamp` falls inside the bound.
    pub fn covers(&self, timestamp: u64) -> bool {
        match self {
            HistoryBound::Full => true,
            HistoryBound::AtOrBefore(bound) => timestamp <= *bound,
        }
    }
}

/// A persisted outgoing sync record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxEntry {
    /// Row id.
    pub id: OutboxId,
    /// Opaque record bytes owned by the envelope.
    pub record: Vec<u8>,
}
