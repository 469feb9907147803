//! Field access for durable records.

use crate::error::{ProtocolError, ProtocolResult};
use delsync_codec::Value;

/// A CBOR map viewed as a named record with text keys.
///
/// Unknown keys are ignored so that newer writers can add fields.
pub(crate) struct Record<'v> {
    name: &'static str,
    value: &'v Value,
}

impl<'v> Record<'v> {
    pub(crate) fn new(name: &'static str, value: &'v Value) -> ProtocolResult<Self> {
        if value.as_map().is_none() {
            return Err(ProtocolError::invalid_field(name, "<root>", "expected map"));
        }
        Ok(Self { name, value })
    }

    pub(crate) fn value(&self) -> &'v Value {
        self.value
    }

    pub(crate) fn required(&self, field: &'static str) -> ProtocolResult<&'v Value> {
        self.value.get(field).ok_or(ProtocolError::MissingField {
            record: self.name,
            field,
        })
    }

    pub(crate) fn text(&self, field: &'static str) -> ProtocolResult<&'v str> {
        self.required(field)?
            .as_text()
            .ok_or_else(|| ProtocolError::invalid_field(self.name, field, "expected text"))
    }

    pub(crate) fn bytes(&self, field: &'static str) -> ProtocolResult<&'v [u8]> {
        self.required(field)?
            .as_bytes()
            .ok_or_else(|| ProtocolError::invalid_field(self.name, field, "expected bytes"))
    }

    pub(crate) fn u64(&self, field: &'static str) -> ProtocolResult<u64> {
        self.required(field)?.as_u64().ok_or_else(|| {
            ProtocolError::invalid_field(self.name, field, "expected unsigned 64-bit integer")
        })
    }

    pub(crate) fn bool(&self, field: &'static str) -> ProtocolResult<bool> {
        self.required(field)?
            .as_bool()
            .ok_or_else(|| ProtocolError::invalid_field(self.name, field, "expected bool"))
    }

    /// A list field; absent lists read as empty.
    pub(crate) fn list(&self, field: &'static str) -> ProtocolResult<&'v [Value]> {
        match self.value.get(field) {
            None => Ok(&[]),
            Some(v) => v
                .as_array()
                .ok_or_else(|| ProtocolError::invalid_field(self.name, field, "expected array")),
        }
    }
}
