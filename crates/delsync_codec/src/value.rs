//! Dynamic CBOR value type.

use std::cmp::Ordering;

/// Largest integer representable by CBOR major type 0.
pub const MAX_CBOR_INTEGER: i128 = u64::MAX as i128;

/// Smallest integer representable by CBOR major type 1.
pub const MIN_CBOR_INTEGER: i128 = -1 - (u64::MAX as i128);

/// A dynamic CBOR value.
///
/// Integers are held as `i128` so that the whole CBOR integer range
/// (`-2^64 ..= 2^64 - 1`) is representable, which matters for `u64`
/// timestamps. Floats are not supported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer in the CBOR range.
    Integer(i128),
    /// Byte string.
    Bytes(Vec<u8>),
    /// Text string (UTF-8).
    Text(String),
    /// Array of values.
    Array(Vec<Value>),
    /// Map of key-value pairs (keys are sorted for canonical encoding).
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Create a map value with sorted keys.
    ///
    /// Keys are sorted by their canonical CBOR encoding (bytewise comparison).
    pub fn map(mut pairs: Vec<(Value, Value)>) -> Self {
        pairs.sort_by(|a, b| a.0.cmp_canonical(&b.0));
        Value::Map(pairs)
    }

    /// Create a map keyed by text fields.
    ///
    /// This is the shape every durable record uses.
    pub fn record<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::map(
            fields
                .into_iter()
                .map(|(k, v)| (Value::Text(k.into()), v))
                .collect(),
        )
    }

    /// Compare two values for canonical ordering.
    ///
    /// This matches the bytewise comparison of canonical CBOR encodings,
    /// which is required for map key sorting.
    #[allow(clippy::match_same_arms)]
    pub fn cmp_canonical(&self, other: &Self) -> Ordering {
        let self_type = self.major_type();
        let other_type = other.major_type();

        if self_type != other_type {
            return self_type.cmp(&other_type);
        }

        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => {
                // Same major type here, so both share a sign. Compare the
                // encoded argument: n for non-negative, -1 - n for negative.
                Self::cmp_unsigned_canonical(Self::cbor_argument(*a), Self::cbor_argument(*b))
            }
            (Value::Bytes(a), Value::Bytes(b)) => match a.len().cmp(&b.len()) {
                Ordering::Equal => a.cmp(b),
                ord => ord,
            },
            (Value::Text(a), Value::Text(b)) => match a.len().cmp(&b.len()) {
                Ordering::Equal => a.cmp(b),
                ord => ord,
            },
            (Value::Array(a), Value::Array(b)) => match a.len().cmp(&b.len()) {
                Ordering::Equal => {
                    for (av, bv) in a.iter().zip(b.iter()) {
                        let ord = av.cmp_canonical(bv);
                        if ord != Ordering::Equal {
                            return ord;
                        }
                    }
                    Ordering::Equal
                }
                ord => ord,
            },
            (Value::Map(a), Value::Map(b)) => match a.len().cmp(&b.len()) {
                Ordering::Equal => {
                    for ((ak, av), (bk, bv)) in a.iter().zip(b.iter()) {
                        let key_ord = ak.cmp_canonical(bk);
                        if key_ord != Ordering::Equal {
                            return key_ord;
                        }
                        let val_ord = av.cmp_canonical(bv);
                        if val_ord != Ordering::Equal {
                            return val_ord;
                        }
                    }
                    Ordering::Equal
                }
                ord => ord,
            },
            _ => Ordering::Equal,
        }
    }

    /// The unsigned argument CBOR encodes for an in-range integer.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn cbor_argument(n: i128) -> u64 {
        if n >= 0 {
            n.min(MAX_CBOR_INTEGER) as u64
        } else {
            (-1 - n.max(MIN_CBOR_INTEGER)) as u64
        }
    }

    /// Compare two unsigned integers by their canonical CBOR encoding:
    /// length first, then numeric (equal to lexicographic for big-endian).
    fn cmp_unsigned_canonical(a: u64, b: u64) -> Ordering {
        let len_a = Self::cbor_uint_encoded_len(a);
        let len_b = Self::cbor_uint_encoded_len(b);

        match len_a.cmp(&len_b) {
            Ordering::Equal => a.cmp(&b),
            ord => ord,
        }
    }

    /// Returns the encoded length (in bytes) of an unsigned integer in CBOR.
    fn cbor_uint_encoded_len(n: u64) -> usize {
        if n <= 23 {
            1
        } else if n <= 0xFF {
            2
        } else if n <= 0xFFFF {
            3
        } else if n <= 0xFFFF_FFFF {
            5
        } else {
            9
        }
    }

    fn major_type(&self) -> u8 {
        match self {
            Value::Integer(n) if *n >= 0 => 0,
            Value::Integer(_) => 1,
            Value::Bytes(_) => 2,
            Value::Text(_) => 3,
            Value::Array(_) => 4,
            Value::Map(_) => 5,
            Value::Bool(_) | Value::Null => 7,
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get this value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a `u64`, if it is a non-negative integer that fits.
    pub fn as_u64(&self) -> Option<u64> {
        self.as_integer().and_then(|n| u64::try_from(n).ok())
    }

    /// Get this value as bytes, if it is a byte string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Get this value as a string, if it is a text string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as an array, if it is one.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get this value as a map, if it is one.
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a text key in this map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(pairs) => pairs
                .iter()
                .find(|(k, _)| k.as_text() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(i128::from(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Integer(i128::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(i128::from(n))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keys_are_sorted() {
        let record = Value::record([
            ("sent_timestamp", Value::from(1u64)),
            ("author", Value::Null),
            ("type", Value::from("x")),
        ]);

        let keys: Vec<_> = record
            .as_map()
            .unwrap()
            .iter()
            .map(|(k, _)| k.as_text().unwrap().to_string())
            .collect();
        // Length first, then bytewise.
        assert_eq!(keys, vec!["type", "author", "sent_timestamp"]);
    }

    #[test]
    fn integer_ordering_spans_u64() {
        let mut values = vec![
            Value::Integer(-1),
            Value::Integer(i128::from(u64::MAX)),
            Value::Integer(0),
            Value::Integer(24),
        ];
        values.sort_by(Value::cmp_canonical);

        assert_eq!(values[0], Value::Integer(0));
        assert_eq!(values[1], Value::Integer(24));
        assert_eq!(values[2], Value::Integer(i128::from(u64::MAX)));
        assert_eq!(values[3], Value::Integer(-1));
    }

    #[test]
    fn as_u64_rejects_negative_and_oversized() {
        assert_eq!(Value::from(u64::MAX).as_u64(), Some(u64::MAX));
        assert_eq!(Value::Integer(-5).as_u64(), None);
        assert_eq!(Value::Integer(MAX_CBOR_INTEGER + 1).as_u64(), None);
        assert_eq!(Value::from("5").as_u64(), None);
    }

    #[test]
    fn get_finds_text_keys_only() {
        let map = Value::map(vec![
            (Value::from("e164"), Value::from("+15550100")),
            (Value::Integer(1), Value::from("ignored")),
        ]);

        assert_eq!(map.get("e164"), Some(&Value::from("+15550100")));
        assert_eq!(map.get("1"), None);
        assert_eq!(Value::Null.get("e164"), None);
    }
}
