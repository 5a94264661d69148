//! Per-type field metadata and the process-wide cache that memoizes it.
//!
//! `#[derive(Masked)]` knows a struct's fields at compile time, but classifying
//! field names, resolving display keys and recording kinds happens when
//! [`Structured::describe`] runs. The cache makes that a once-per-type cost.

use std::{
    any::TypeId,
    sync::{Arc, OnceLock},
};

use dashmap::DashMap;

use super::{Kind, Structured};
use crate::classify::{classify, MaskStrategy};

/// Cached metadata about one struct field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: &'static str,
    kind: Kind,
    tagged: Option<MaskStrategy>,
    inferred: MaskStrategy,
    index: usize,
}

impl FieldDescriptor {
    /// Describes a field.
    ///
    /// `tagged` is the explicit `#[masked(...)]` strategy, if any. The
    /// name-based strategy is computed here, once.
    pub fn new(
        name: &'static str,
        kind: Kind,
        tagged: Option<MaskStrategy>,
        index: usize,
    ) -> Self {
        Self {
            name,
            kind,
            tagged,
            inferred: classify(name),
            index,
        }
    }

    /// Display key (serde-rename aware).
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The explicit tag strategy, or [`MaskStrategy::None`] when untagged.
    pub fn strategy(&self) -> MaskStrategy {
        self.tagged.unwrap_or_default()
    }

    /// The explicit tag strategy, if the field carries one.
    pub fn tagged(&self) -> Option<MaskStrategy> {
        self.tagged
    }

    /// The strategy the field name alone would get.
    pub fn inferred(&self) -> MaskStrategy {
        self.inferred
    }

    pub fn is_time(&self) -> bool {
        self.kind == Kind::Time
    }

    /// Declaration position, used for [`Structured::field`].
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Ordered field descriptors for one type. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeMetadata {
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl TypeMetadata {
    pub fn new(type_name: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        Self { type_name, fields }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks a field up by display key.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Concurrent cache of [`TypeMetadata`] keyed by [`TypeId`].
///
/// Readers never block each other. A miss builds the metadata outside the map
/// and publishes it with a single insert; if two threads race on the same type,
/// the first insert wins and both get the same `Arc`. Entries are never removed.
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: DashMap<TypeId, Arc<TypeMetadata>>,
}

static SHARED: OnceLock<Arc<MetadataCache>> = OnceLock::new();

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used when a logger is not given its own.
    pub fn shared() -> Arc<MetadataCache> {
        Arc::clone(SHARED.get_or_init(|| Arc::new(MetadataCache::new())))
    }

    /// Returns the metadata for `T`, describing it on first sight.
    pub fn metadata<T>(&self) -> Arc<TypeMetadata>
    where
        T: Structured + 'static,
    {
        let id = TypeId::of::<T>();
        if let Some(found) = self.entries.get(&id) {
            return Arc::clone(found.value());
        }

        let built = Arc::new(T::describe());
        let entry = self.entries.entry(id).or_insert(built);
        Arc::clone(entry.value())
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
