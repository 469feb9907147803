//! Canonical CBOR encoder.

use crate::error::{CodecError, CodecResult};
use crate::value::{Value, MAX_CBOR_INTEGER, MIN_CBOR_INTEGER};

/// Encode a value to canonical CBOR bytes.
///
/// Output is deterministic (RFC 8949 Section 4.2.1):
/// - Map keys are sorted by their encoded form (length-first, then bytewise)
/// - Integers use the shortest possible encoding
/// - No indefinite-length encoding
///
/// # Errors
///
/// Returns an error if an integer falls outside the CBOR range.
pub fn to_canonical_cbor(value: &Value) -> CodecResult<Vec<u8>> {
    let mut encoder = CanonicalEncoder::new();
    encoder.encode(value)?;
    Ok(encoder.into_bytes())
}

/// A canonical CBOR encoder.
pub struct CanonicalEncoder {
    buffer: Vec<u8>,
}

impl CanonicalEncoder {
    /// Create a new encoder.
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Create a new encoder with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Encode a value.
    pub fn encode(&mut self, value: &Value) -> CodecResult<()> {
        match value {
            Value::Null => {
                self.buffer.push(0xf6);
                Ok(())
            }
            Value::Bool(b) => {
                self.buffer.push(if *b { 0xf5 } else { 0xf4 });
                Ok(())
            }
            Value::Integer(n) => self.encode_integer(*n),
            Value::Bytes(b) => {
                self.encode_unsigned(2, b.len() as u64);
                self.buffer.extend_from_slice(b);
                Ok(())
            }
            Value::Text(s) => {
                self.encode_unsigned(3, s.len() as u64);
                self.buffer.extend_from_slice(s.as_bytes());
                Ok(())
            }
            Value::Array(arr) => self.encode_array(arr),
            Value::Map(pairs) => self.encode_map(pairs),
        }
    }

    /// Consume this encoder and return the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Get a reference to the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn encode_integer(&mut self, n: i128) -> CodecResult<()> {
        if !(MIN_CBOR_INTEGER..=MAX_CBOR_INTEGER).contains(&n) {
            return Err(CodecError::encoding_failed(format!(
                "integer {n} outside CBOR range"
            )));
        }
        if n >= 0 {
            self.encode_unsigned(0, n as u64);
        } else {
            // Major type 1 carries -1 - n.
            self.encode_unsigned(1, (-1 - n) as u64);
        }
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn encode_unsigned(&mut self, major_type: u8, value: u64) {
        let mt = major_type << 5;

        if value < 24 {
            self.buffer.push(mt | (value as u8));
        } else if u8::try_from(value).is_ok() {
            self.buffer.push(mt | 24);
            self.buffer.push(value as u8);
        } else if u16::try_from(value).is_ok() {
            self.buffer.push(mt | 25);
            self.buffer.extend_from_slice(&(value as u16).to_be_bytes());
        } else if u32::try_from(value).is_ok() {
            self.buffer.push(mt | 26);
            self.buffer.extend_from_slice(&(value as u32).to_be_bytes());
        } else {
            self.buffer.push(mt | 27);
            self.buffer.extend_from_slice(&value.to_be_bytes());
        }
    }

    fn encode_array(&mut self, arr: &[Value]) -> CodecResult<()> {
        self.encode_unsigned(4, arr.len() as u64);
        for item in arr {
            self.encode(item)?;
        }
        Ok(())
    }

    fn encode_map(&mut self, pairs: &[(Value, Value)]) -> CodecResult<()> {
        let mut encoded_pairs: Vec<(Vec<u8>, &Value)> = Vec::with_capacity(pairs.len());

        for (key, value) in pairs {
            let mut key_encoder = CanonicalEncoder::new();
            key_encoder.encode(key)?;
            encoded_pairs.push((key_encoder.into_bytes(), value));
        }

        encoded_pairs.sort_by(|a, b| match a.0.len().cmp(&b.0.len()) {
            std::cmp::Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });

        for window in encoded_pairs.windows(2) {
            if window[0].0 == window[1].0 {
                return Err(CodecError::encoding_failed("duplicate map key"));
            }
        }

        self.encode_unsigned(5, pairs.len() as u64);
        for (encoded_key, value) in encoded_pairs {
            self.buffer.extend_from_slice(&encoded_key);
            self.encode(value)?;
        }

        Ok(())
    }
}

impl Default for CanonicalEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_simple_values() {
        assert_eq!(to_canonical_cbor(&Value::Null).unwrap(), vec![0xf6]);
        assert_eq!(to_canonical_cbor(&Value::Bool(false)).unwrap(), vec![0xf4]);
        assert_eq!(to_canonical_cbor(&Value::Bool(true)).unwrap(), vec![0xf5]);
    }

    #[test]
    fn encode_integers_shortest_form() {
        assert_eq!(to_canonical_cbor(&Value::Integer(23)).unwrap(), vec![0x17]);
        assert_eq!(
            to_canonical_cbor(&Value::Integer(24)).unwrap(),
            vec![0x18, 24]
        );
        assert_eq!(
            to_canonical_cbor(&Value::Integer(256)).unwrap(),
            vec![0x19, 0x01, 0x00]
        );
        assert_eq!(
            to_canonical_cbor(&Value::Integer(65536)).unwrap(),
            vec![0x1a, 0x00, 0x01, 0x00, 0x00]
        );
        assert_eq!(to_canonical_cbor(&Value::Integer(-1)).unwrap(), vec![0x20]);
        assert_eq!(
            to_canonical_cbor(&Value::Integer(-100)).unwrap(),
            vec![0x38, 99]
        );
    }

    #[test]
    fn encode_full_u64_timestamp() {
        let bytes = to_canonical_cbor(&Value::from(u64::MAX)).unwrap();
        assert_eq!(bytes, vec![0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn reject_out_of_range_integer() {
        assert!(matches!(
            to_canonical_cbor(&Value::Integer(MAX_CBOR_INTEGER + 1)),
            Err(CodecError::EncodingFailed { .. })
        ));
        assert!(matches!(
            to_canonical_cbor(&Value::Integer(MIN_CBOR_INTEGER - 1)),
            Err(CodecError::EncodingFailed { .. })
        ));
    }

    #[test]
    fn encode_bytes_and_text() {
        assert_eq!(
            to_canonical_cbor(&Value::Bytes(vec![1, 2, 3])).unwrap(),
            vec![0x43, 1, 2, 3]
        );
        assert_eq!(
            to_canonical_cbor(&Value::from("a")).unwrap(),
            vec![0x61, b'a']
        );
    }

    #[test]
    fn encode_map_sorted() {
        let map = Value::Map(vec![
            (Value::from("bb"), Value::Integer(2)),
            (Value::from("a"), Value::Integer(1)),
        ]);
        let bytes = to_canonical_cbor(&map).unwrap();

        assert_eq!(bytes, vec![0xa2, 0x61, b'a', 0x01, 0x62, b'b', b'b', 0x02]);
    }

    #[test]
    fn reject_duplicate_keys() {
        let map = Value::Map(vec![
            (Value::from("a"), Value::Integer(1)),
            (Value::from("a"), Value::Integer(2)),
        ]);
        assert!(to_canonical_cbor(&map).is_err());
    }

    #[test]
    fn insertion_order_does_not_change_bytes() {
        let map1 = Value::Map(vec![
            (Value::from("z"), Value::Integer(1)),
            (Value::from("a"), Value::Integer(2)),
        ]);
        let map2 = Value::Map(vec![
            (Value::from("a"), Value::Integer(2)),
            (Value::from("z"), Value::Integer(1)),
        ]);

        assert_eq!(
            to_canonical_cbor(&map1).unwrap(),
            to_canonical_cbor(&map2).unwrap()
        );
    }
}
