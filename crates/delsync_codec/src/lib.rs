//! # delsync Codec
//!
//! Canonical CBOR encoding/decoding for delsync durable payloads.
//!
//! Delete intent sets are stored on disk in this self-describing,
//! field-tagged form until the send pipeline picks them up. The encoding
//! is deterministic:
//!
//! - Maps are sorted by key (bytewise comparison of encoded keys)
//! - Integers use shortest encoding and span the full CBOR range
//! - No floats, no indefinite-length items
//! - Exactly one top-level item, no trailing bytes
//!
//! ## Usage
//!
//! ```
//! use delsync_codec::{to_canonical_cbor, from_cbor, Value};
//!
//! let value = Value::record([("sent_timestamp", Value::from(1_700_000_000_000u64))]);
//! let bytes = to_canonical_cbor(&value).unwrap();
//! assert_eq!(from_cbor(&bytes).unwrap(), value);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod value;

pub use decoder::{from_cbor, CanonicalDecoder};
pub use encoder::{to_canonical_cbor, CanonicalEncoder};
pub use error::{CodecError, CodecResult};
pub use value::{Value, MAX_CBOR_INTEGER, MIN_CBOR_INTEGER};

/// Types with a durable CBOR representation.
pub trait Encode {
    /// Lower this value into the dynamic CBOR model.
    fn to_value(&self) -> Value;

    /// Encode this value to canonical CBOR bytes.
    fn encode(&self) -> CodecResult<Vec<u8>> {
        to_canonical_cbor(&self.to_value())
    }
}

/// Types that can be rebuilt from their durable CBOR representation.
pub trait Decode: Sized {
    /// Error produced when the value does not have the expected shape.
    type Error: From<CodecError>;

    /// Rebuild from the dynamic CBOR model.
    fn from_value(value: &Value) -> Result<Self, Self::Error>;

    /// Decode from canonical CBOR bytes.
    fn decode(bytes: &[u8]) -> Result<Self, Self::Error> {
        let value = from_cbor(bytes)?;
        Self::from_value(&value)
    }
}

impl Encode for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl Decode for Value {
    type Error = CodecError;

    fn from_value(value: &Value) -> CodecResult<Self> {
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn value_strategy() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<u64>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            prop::collection::vec(any::<u8>(), 0..32).prop_map(Value::Bytes),
            "[a-z_]{0,12}".prop_map(Value::Text),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::btree_map("[a-z_]{1,12}", inner, 0..8).prop_map(|m| {
                    Value::map(m.into_iter().map(|(k, v)| (Value::Text(k), v)).collect())
                }),
            ]
        })
    }

    proptest! {
        #[test]
        fn canonical_roundtrip(value in value_strategy()) {
            let bytes = to_canonical_cbor(&value).unwrap();
            let decoded = from_cbor(&bytes).unwrap();
            prop_assert_eq!(&decoded, &value);
            // Decoding then re-encoding is byte-stable.
            prop_assert_eq!(to_canonical_cbor(&decoded).unwrap(), bytes);
        }
    }

    #[test]
    fn encode_trait_uses_canonical_form() {
        let value = Value::record([("b", Value::from(2u64)), ("a", Value::from(1u64))]);
        assert_eq!(value.encode().unwrap(), to_canonical_cbor(&value).unwrap());
        assert_eq!(Value::decode(&value.encode().unwrap()).unwrap(), value);
    }
}
