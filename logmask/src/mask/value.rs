//! `slog` and `serde` adapters for masked payloads.
//!
//! A [`MaskedValue`] is what the logger attaches under the `data` key. The
//! logged representation is always derived from [`Masker::mask`], never from
//! the original value, and emitting it never fails.

use serde::{Serialize, Serializer as SerdeSerializer};
use serde_json::Value as JsonValue;
use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use super::Masker;
use crate::inspect::Inspect;

/// An owned, already-masked payload.
///
/// Masking happens once, in [`MaskedValue::new`]; serializing the value any
/// number of times afterwards only clones JSON.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskedValue {
    value: Option<JsonValue>,
}

impl MaskedValue {
    pub fn new(value: &dyn Inspect, masker: &Masker) -> Self {
        Self {
            value: masker.mask(value),
        }
    }

    /// `true` when the payload was null and should not be logged at all.
    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        self.value.as_ref()
    }

    pub fn into_json(self) -> Option<JsonValue> {
        self.value
    }
}

impl Serialize for MaskedValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: SerdeSerializer,
    {
        match &self.value {
            Some(value) => value.serialize(serializer),
            None => serializer.serialize_unit(),
        }
    }
}

impl SlogValue for MaskedValue {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        match &self.value {
            Some(value) => {
                let nested = slog::Serde(value.clone());
                SlogValue::serialize(&nested, record, key, serializer)
            }
            None => serializer.emit_none(key),
        }
    }
}
