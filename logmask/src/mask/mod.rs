//! Masking policies and the recursive value masker.
//!
//! The layers mirror the rest of the crate:
//!
//! - **`classify`** / **`obscure`**: what a name means, how a string is hidden.
//! - **[`MaskPolicy`]**: which strategy a struct field or map key gets under a
//!   given [`MaskingMode`].
//! - **[`Masker`]**: walks a [`Shape`] tree depth-first and builds a fresh
//!   `serde_json::Value`. The input value is only borrowed, never changed.
//!
//! Self-referential structures are not supported; the walk has no cycle
//! detection.

mod value;

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as JsonValue};

pub use value::MaskedValue;

use crate::{
    classify::{classify, MaskStrategy},
    drain::encode_time,
    inspect::{FieldDescriptor, Inspect, MetadataCache, Shape, Structured},
    json::{mask_json_bytes, mask_json_str},
    obscure::{obscure, obscure_email},
};

/// Which source of truth decides field strategies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskingMode {
    /// Only `#[masked(...)]` tags mask struct fields. Map keys are never
    /// classified.
    #[default]
    TagDriven,
    /// Field names and map keys are classified with [`classify`]. Tags are
    /// ignored.
    HeuristicDriven,
    /// Tags where present, name classification everywhere else.
    Both,
}

impl MaskingMode {
    /// The policy object implementing this mode.
    pub fn policy(self) -> &'static dyn MaskPolicy {
        match self {
            MaskingMode::TagDriven => &TagPolicy,
            MaskingMode::HeuristicDriven => &HeuristicPolicy,
            MaskingMode::Both => &CombinedPolicy,
        }
    }
}

/// Decides the strategy for a struct field or a map key.
pub trait MaskPolicy: Send + Sync + fmt::Debug {
    fn field_strategy(&self, field: &FieldDescriptor) -> MaskStrategy;

    fn key_strategy(&self, key: &str) -> MaskStrategy;
}

/// Policy for [`MaskingMode::TagDriven`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TagPolicy;

impl MaskPolicy for TagPolicy {
    fn field_strategy(&self, field: &FieldDescriptor) -> MaskStrategy {
        field.strategy()
    }

    fn key_strategy(&self, _key: &str) -> MaskStrategy {
        MaskStrategy::None
    }
}

/// Policy for [`MaskingMode::HeuristicDriven`].
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicPolicy;

impl MaskPolicy for HeuristicPolicy {
    fn field_strategy(&self, field: &FieldDescriptor) -> MaskStrategy {
        field.inferred()
    }

    fn key_strategy(&self, key: &str) -> MaskStrategy {
        classify(key)
    }
}

/// Policy for [`MaskingMode::Both`]: an explicit tag always wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct CombinedPolicy;

impl MaskPolicy for CombinedPolicy {
    fn field_strategy(&self, field: &FieldDescriptor) -> MaskStrategy {
        field.tagged().unwrap_or_else(|| field.inferred())
    }

    fn key_strategy(&self, key: &str) -> MaskStrategy {
        classify(key)
    }
}

/// Turns inspected values into masked JSON.
#[derive(Clone, Debug)]
pub struct Masker {
    enabled: bool,
    mode: MaskingMode,
    email_aware: bool,
    cache: Arc<MetadataCache>,
}

impl Default for Masker {
    fn default() -> Self {
        Self::new(MaskingMode::default())
    }
}

impl Masker {
    /// A masker for `mode` backed by the process-wide metadata cache.
    pub fn new(mode: MaskingMode) -> Self {
        Self {
            enabled: true,
            mode,
            email_aware: false,
            cache: MetadataCache::shared(),
        }
    }

    /// A masker that converts values without masking anything.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<MetadataCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Routes partial masks through [`obscure_email`].
    #[must_use]
    pub fn with_email_aware(mut self, email_aware: bool) -> Self {
        self.email_aware = email_aware;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn mode(&self) -> MaskingMode {
        self.mode
    }

    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    /// Masks a top-level payload.
    ///
    /// Returns `None` for null payloads (`None`, `()`), which callers should
    /// omit entirely. Strings and [`crate::JsonBytes`] are treated as JSON
    /// text; everything else is walked.
    pub fn mask(&self, value: &dyn Inspect) -> Option<JsonValue> {
        let masked = match value.shape() {
            Shape::Null => return None,
            Shape::Str(text) if self.enabled => JsonValue::String(mask_json_str(text)),
            Shape::Bytes(bytes) if self.enabled => JsonValue::String(mask_json_bytes(bytes)),
            shape => self.walk(shape, MaskStrategy::None),
        };
        Some(masked)
    }

    fn walk(&self, shape: Shape<'_>, strategy: MaskStrategy) -> JsonValue {
        match shape {
            Shape::Null => JsonValue::Null,
            Shape::Str(text) => JsonValue::String(self.obscure(text, strategy)),
            Shape::Text(text) => JsonValue::String(self.obscure(&text, strategy)),
            Shape::Bytes(bytes) => {
                JsonValue::String(self.obscure(&String::from_utf8_lossy(bytes), strategy))
            }
            Shape::Bool(value) => JsonValue::Bool(value),
            Shape::I64(value) => JsonValue::Number(value.into()),
            Shape::U64(value) => JsonValue::Number(value.into()),
            Shape::F64(value) => Number::from_f64(value).map_or(JsonValue::Null, JsonValue::Number),
            Shape::Time(time) => JsonValue::String(encode_time(&time)),
            Shape::Struct(value) => self.walk_struct(value),
            // Collections of primitives are not classified; only structs and
            // maps inside them are.
            Shape::Seq(items) => JsonValue::Array(
                items
                    .into_iter()
                    .map(|item| self.walk(item.shape(), MaskStrategy::None))
                    .collect(),
            ),
            Shape::Map(entries) => {
                let mut object = Map::with_capacity(entries.len());
                for (key, value) in entries {
                    let strategy = self.key_strategy(&key);
                    object.insert(key.into_owned(), self.walk(value.shape(), strategy));
                }
                JsonValue::Object(object)
            }
            Shape::Other(value @ (JsonValue::Object(_) | JsonValue::Array(_))) => {
                self.walk(value.shape(), MaskStrategy::None)
            }
            Shape::Other(value) => value,
        }
    }

    fn walk_struct(&self, value: &dyn Structured) -> JsonValue {
        let metadata = value.metadata(&self.cache);
        let mut object = Map::with_capacity(metadata.fields().len());
        for field in metadata.fields() {
            let Some(shape) = value.field(field.index()) else {
                continue;
            };
            let strategy = self.field_strategy(field);
            object.insert(field.name().to_owned(), self.walk(shape, strategy));
        }
        JsonValue::Object(object)
    }

    fn field_strategy(&self, field: &FieldDescriptor) -> MaskStrategy {
        if self.enabled {
            self.mode.policy().field_strategy(field)
        } else {
            MaskStrategy::None
        }
    }

    fn key_strategy(&self, key: &str) -> MaskStrategy {
        if self.enabled {
            self.mode.policy().key_strategy(key)
        } else {
            MaskStrategy::None
        }
    }

    fn obscure(&self, text: &str, strategy: MaskStrategy) -> String {
        match strategy {
            MaskStrategy::Partial if self.email_aware => obscure_email(text),
            _ => obscure(text, strategy),
        }
    }
}

/// Masks `value` with a default masker for `mode`.
///
/// See [`Masker::mask`].
pub fn mask_value(value: &dyn Inspect, mode: MaskingMode) -> Option<JsonValue> {
    Masker::new(mode).mask(value)
}
