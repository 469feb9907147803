//! Cross-device identifiers.
//!
//! Devices never share row ids, so a conversation is addressed by its peer
//! or group identity and a message by `(author, sent timestamp)`.

use crate::error::{ProtocolError, ProtocolResult};
use crate::record::Record;
use delsync_codec::{Decode, Encode, Value};
use std::fmt;
use uuid::Uuid;

const TYPE: &str = "type";
const ACCOUNT_ID: &str = "account_id";
const PHONE_NUMBER: &str = "phone_number";
const GROUP_ID: &str = "group_id";
const E164: &str = "e164";
const AUTHOR: &str = "author";
const SENT_TIMESTAMP: &str = "sent_timestamp";

/// A stable account identifier (service id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Wraps a UUID.
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses a service id string; case-insensitive.
    pub fn parse(s: &str) -> ProtocolResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ProtocolError::InvalidAccountId(s.to_string()))
    }

    /// Returns the underlying UUID.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// The uppercase hyphenated form used on the wire and on disk.
    pub fn service_id_string(&self) -> String {
        let mut buf = Uuid::encode_buffer();
        self.0.hyphenated().encode_upper(&mut buf).to_string()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.service_id_string())
    }
}

/// A phone number in E.164 form, e.g. `+15550100`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validates `+` followed by 1 to 15 digits, the first non-zero.
    pub fn parse(s: &str) -> ProtocolResult<Self> {
        let digits = s
            .strip_prefix('+')
            .ok_or_else(|| ProtocolError::InvalidPhoneNumber(s.to_string()))?;
        let valid = (1..=15).contains(&digits.len())
            && digits.bytes().all(|b| b.is_ascii_digit())
            && !digits.starts_with('0');
        if !valid {
            return Err(ProtocolError::InvalidPhoneNumber(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Returns the number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw binary group identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(Vec<u8>);

impl GroupId {
    /// Wraps group id bytes; empty ids are rejected.
    pub fn new(bytes: impl Into<Vec<u8>>) -> ProtocolResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ProtocolError::EmptyGroupId);
        }
        Ok(Self(bytes))
    }

    /// Returns the id bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A variant written by a newer client that this build does not know.
///
/// The raw record is kept so re-encoding is lossless.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnknownVariant {
    kind: String,
    raw: Value,
}

impl UnknownVariant {
    /// The unrecognized `type` tag.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The full record as it was decoded.
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

/// Cross-device key for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConversationIdentifier {
    /// Direct thread keyed by the peer's account id.
    AccountId(AccountId),
    /// Direct thread keyed by phone number, when no account id is known.
    PhoneNumber(PhoneNumber),
    /// Group thread.
    GroupId(GroupId),
    /// Written by a newer client; never matches a local thread.
    Unknown(UnknownVariant),
}

impl Encode for ConversationIdentifier {
    fn to_value(&self) -> Value {
        match self {
            Self::AccountId(id) => Value::record([
                (TYPE, Value::from(ACCOUNT_ID)),
                (ACCOUNT_ID, Value::from(id.service_id_string())),
            ]),
            Self::PhoneNumber(e164) => Value::record([
                (TYPE, Value::from(PHONE_NUMBER)),
                (E164, Value::from(e164.as_str())),
            ]),
            Self::GroupId(group) => Value::record([
                (TYPE, Value::from(GROUP_ID)),
                (GROUP_ID, Value::from(group.as_bytes())),
            ]),
            Self::Unknown(unknown) => unknown.raw.clone(),
        }
    }
}

impl Decode for ConversationIdentifier {
    type Error = ProtocolError;

    fn from_value(value: &Value) -> ProtocolResult<Self> {
        const NAME: &str = "conversation";
        let record = Record::new(NAME, value)?;
        match record.text(TYPE)? {
            ACCOUNT_ID => Ok(Self::AccountId(AccountId::parse(record.text(ACCOUNT_ID)?)?)),
            PHONE_NUMBER => Ok(Self::PhoneNumber(PhoneNumber::parse(record.text(E164)?)?)),
            GROUP_ID => Ok(Self::GroupId(GroupId::new(record.bytes(GROUP_ID)?)?)),
            other => Ok(Self::Unknown(UnknownVariant {
                kind: other.to_string(),
                raw: record.value().clone(),
            })),
        }
    }
}

/// The sender of an addressable message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Author {
    /// Sender known by account id.
    AccountId(AccountId),
    /// Sender known only by phone number.
    PhoneNumber(PhoneNumber),
    /// Written by a newer client; never matches a local message.
    Unknown(UnknownVariant),
}

impl Author {
    /// Picks the account id when known, else the phone number.
    ///
    /// Returns `None` when neither is available.
    pub fn from_parts(account_id: Option<AccountId>, phone_number: Option<PhoneNumber>) -> Option<Self> {
        match (account_id, phone_number) {
            (Some(aci), _) => Some(Self::AccountId(aci)),
            (None, Some(e164)) => Some(Self::PhoneNumber(e164)),
            (None, None) => None,
        }
    }
}

impl Encode for Author {
    fn to_value(&self) -> Value {
        match self {
            Self::AccountId(id) => Value::record([
                (TYPE, Value::from(ACCOUNT_ID)),
                (ACCOUNT_ID, Value::from(id.service_id_string())),
            ]),
            Self::PhoneNumber(e164) => Value::record([
                (TYPE, Value::from(PHONE_NUMBER)),
                (E164, Value::from(e164.as_str())),
            ]),
            Self::Unknown(unknown) => unknown.raw.clone(),
        }
    }
}

impl Decode for Author {
    type Error = ProtocolError;

    fn from_value(value: &Value) -> ProtocolResult<Self> {
        let record = Record::new(AUTHOR, value)?;
        match record.text(TYPE)? {
            ACCOUNT_ID => Ok(Self::AccountId(AccountId::parse(record.text(ACCOUNT_ID)?)?)),
            PHONE_NUMBER => Ok(Self::PhoneNumber(PhoneNumber::parse(record.text(E164)?)?)),
            other => Ok(Self::Unknown(UnknownVariant {
                kind: other.to_string(),
                raw: record.value().clone(),
            })),
        }
    }
}

/// A message addressed by `(author, sent timestamp)`.
///
/// The timestamp is unique enough per author and conversation in practice
/// but is not globally unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressableMessage {
    /// The message's sender.
    pub author: Author,
    /// Sender-assigned epoch milliseconds.
    pub sent_timestamp: u64,
}

impl AddressableMessage {
    /// Creates an addressable message for a known author.
    pub fn new(author: Author, sent_timestamp: u64) -> Self {
        Self {
            author,
            sent_timestamp,
        }
    }

    /// Creates an addressable message from whatever author attributes are
    /// known; `None` when there are none.
    pub fn from_parts(
        account_id: Option<AccountId>,
        phone_number: Option<PhoneNumber>,
        sent_timestamp: u64,
    ) -> Option<Self> {
        Author::from_parts(account_id, phone_number).map(|author| Self::new(author, sent_timestamp))
    }
}

impl Encode for AddressableMessage {
    fn to_value(&self) -> Value {
        Value::record([
            (AUTHOR, self.author.to_value()),
            (SENT_TIMESTAMP, Value::from(self.sent_timestamp)),
        ])
    }
}

impl Decode for AddressableMessage {
    type Error = ProtocolError;

    fn from_value(value: &Value) -> ProtocolResult<Self> {
        let record = Record::new("addressable_message", value)?;
        Ok(Self {
            author: Author::from_value(record.required(AUTHOR)?)?,
            sent_timestamp: record.u64(SENT_TIMESTAMP)?,
        })
    }
}
