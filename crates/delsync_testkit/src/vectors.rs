//! Durable and wire encoding test vectors.
//!
//! These vectors pin the byte layout of both encodings so other clients can
//! check themselves against this implementation.

use serde::{Deserialize, Serialize};

/// A payload vector: durable bytes and, if valid, the wire bytes they lower to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Durable canonical CBOR (hex-encoded).
    pub durable_hex: String,
    /// Protobuf `SyncMessage` bytes (hex-encoded), absent if decoding fails.
    pub wire_hex: Option<String>,
}

impl PayloadVector {
    /// Decoded durable bytes.
    pub fn durable(&self) -> Vec<u8> {
        hex::decode(&self.durable_hex).expect("vector hex is valid")
    }

    /// Decoded wire bytes.
    pub fn wire(&self) -> Option<Vec<u8>> {
        self.wire_hex
            .as_ref()
            .map(|h| hex::decode(h).expect("vector hex is valid"))
    }
}

/// Payload vectors covering each kind of delete.
pub fn payload_vectors() -> Vec<PayloadVector> {
    vec![
        PayloadVector {
            id: "empty".into(),
            description: "Intent set with no deletes".into(),
            durable_hex: concat!(
                "a46776657273696f6e016f6d6573736167655f64656c657465738074636f6e76",
                "6572736174696f6e5f64656c6574657380781f6c6f63616c5f6f6e6c795f636f",
                "6e766572736174696f6e5f64656c6574657380",
            )
            .into(),
            wire_hex: Some("aa0100".into()),
        },
        PayloadVector {
            id: "local_only_phone".into(),
            description: "Local-only delete of a thread keyed by phone number".into(),
            durable_hex: concat!(
                "a46776657273696f6e016f6d6573736167655f64656c657465738074636f6e76",
                "6572736174696f6e5f64656c6574657380781f6c6f63616c5f6f6e6c795f636f",
                "6e766572736174696f6e5f64656c6574657381a16c636f6e766572736174696f",
                "6ea26465313634692b313535353031303064747970656c70686f6e655f6e756d",
                "626572",
            )
            .into(),
            wire_hex: Some("aa010f1a0d0a0b1a092b3135353530313030".into()),
        },
        PayloadVector {
            id: "message_delete_account_id".into(),
            description: "One message delete in a thread keyed by account id".into(),
            durable_hex: concat!(
                "a46776657273696f6e016f6d6573736167655f64656c6574657381a2686d6573",
                "736167657381a266617574686f72a264747970656a6163636f756e745f69646a",
                "6163636f756e745f6964782430443843364635352d334634422d344137452d39",
                "4530422d3541314632433344344535466e73656e745f74696d657374616d701b",
                "0000018bcfe568006c636f6e766572736174696f6ea264747970656a6163636f",
                "756e745f69646a6163636f756e745f6964782430443843364635352d33463442",
                "2d344137452d394530422d35413146324333443445354674636f6e7665727361",
                "74696f6e5f64656c6574657380781f6c6f63616c5f6f6e6c795f636f6e766572",
                "736174696f6e5f64656c6574657380",
            )
            .into(),
            wire_hex: Some(
                concat!(
                    "aa01590a570a260a2430443843364635352d334634422d344137452d39453042",
                    "2d354131463243334434453546122d0a2430443843364635352d334634422d34",
                    "4137452d394530422d3541314632433344344535461880d095ffbc31",
                )
                .into(),
            ),
        },
        PayloadVector {
            id: "conversation_delete_group".into(),
            description: "Anchored conversation delete in a group, anchors [500, 300]".into(),
            durable_hex: concat!(
                "a46776657273696f6e016f6d6573736167655f64656c657465738074636f6e76",
                "6572736174696f6e5f64656c6574657381a36c636f6e766572736174696f6ea2",
                "64747970656867726f75705f69646867726f75705f696444010101016e69735f",
                "66756c6c5f64656c657465f4746d6f73745f726563656e745f6d657373616765",
                "7382a266617574686f72a26465313634692b313535353031303064747970656c",
                "70686f6e655f6e756d6265726e73656e745f74696d657374616d701901f4a266",
                "617574686f72a26465313634692b313535353031303064747970656c70686f6e",
                "655f6e756d6265726e73656e745f74696d657374616d7019012c781f6c6f6361",
                "6c5f6f6e6c795f636f6e766572736174696f6e5f64656c6574657380",
            )
            .into(),
            wire_hex: Some(
                concat!(
                    "aa012c122a0a06120401010101120e12092b313535353031303018f403120e12",
                    "092b313535353031303018ac021800",
                )
                .into(),
            ),
        },
        PayloadVector {
            id: "missing_version".into(),
            description: "Record without the required version field".into(),
            durable_hex: "a16f6d6573736167655f64656c6574657380".into(),
            wire_hex: None,
        },
        PayloadVector {
            id: "truncated".into(),
            description: "Map header promising more entries than present".into(),
            durable_hex: "a46776657273696f6e01".into(),
            wire_hex: None,
        },
    ]
}
