//! Runtime introspection of arbitrary values.
//!
//! Rust has no reflection, so every loggable type answers two questions itself:
//!
//! - [`Inspect::kind`]: what category of type is this (known per type)?
//! - [`Inspect::shape`]: what does this particular value look like right now?
//!
//! [`Shape`] is a small closed set of variants, and it is all that
//! [`Masker`](crate::Masker) ever matches on.
//!
//! Structs opt in with `#[derive(Masked)]`, which implements both [`Inspect`]
//! and [`Structured`]. Standard containers, primitives, addresses, paths,
//! durations, `serde_json::Value` and `chrono` timestamps are covered here.
//! Any other `Serialize` type can be logged through [`Serialized`], or as a
//! field marked `#[masked(serde)]`.

mod metadata;

use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    fmt::Display,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6},
    path::{Path, PathBuf},
    rc::Rc,
    sync::Arc,
    time::{Duration, SystemTime},
};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub use metadata::{FieldDescriptor, MetadataCache, TypeMetadata};

use crate::drain::SERIALIZE_FAILED;

/// Static category of a type, recorded in [`FieldDescriptor`]s.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    String,
    Struct,
    /// `Option`, references and smart pointers. May be null.
    Pointer,
    Sequence,
    Map,
    /// Numbers, booleans and characters.
    Scalar,
    /// Timestamps, encoded as RFC 3339 text.
    Time,
    /// Anything whose shape is only known at runtime (e.g. `serde_json::Value`).
    Other,
}

/// What a value looks like, borrowed from the value itself.
#[derive(Clone)]
pub enum Shape<'a> {
    /// `None`, `()`, JSON `null`.
    Null,
    Str(&'a str),
    /// Text rendered from a non-string value. Field strategies apply to it
    /// like they do to [`Shape::Str`].
    Text(String),
    /// Raw bytes that are expected to hold JSON text.
    Bytes(&'a [u8]),
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Time(DateTime<Utc>),
    Struct(&'a dyn Structured),
    Seq(Vec<&'a dyn Inspect>),
    Map(Vec<(Cow<'a, str>, &'a dyn Inspect)>),
    /// An owned JSON value. Objects and arrays are walked like maps and
    /// sequences.
    Other(JsonValue),
}

impl Shape<'static> {
    /// Converts any `Serialize` value through `serde_json`.
    ///
    /// A value that fails to serialize becomes a placeholder string, so one
    /// bad field never keeps the rest of a record from being logged.
    pub fn serialized<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(JsonValue::Null) => Shape::Null,
            Ok(JsonValue::String(text)) => Shape::Text(text),
            Ok(other) => Shape::Other(other),
            Err(_) => Shape::Text(SERIALIZE_FAILED.to_owned()),
        }
    }
}

/// Introspection entry point implemented by every loggable type.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be inspected for logging",
    label = "this type does not implement `Inspect`",
    note = "add `#[derive(Masked)]` to the type definition",
    note = "for a `Serialize` type, mark the field `#[masked(serde)]` or wrap the value in `Serialized`"
)]
pub trait Inspect {
    /// The static kind of this type.
    fn kind() -> Kind
    where
        Self: Sized,
    {
        Kind::Other
    }

    /// Describes this value.
    fn shape(&self) -> Shape<'_>;
}

/// A struct with named (or positional) fields and cached metadata.
///
/// Implemented by `#[derive(Masked)]`. Implementing it by hand is possible;
/// `field(i)` must return the field whose descriptor has index `i`.
pub trait Structured {
    /// Builds the metadata for this type. Called once per type by
    /// [`MetadataCache::metadata`].
    fn describe() -> TypeMetadata
    where
        Self: Sized;

    /// Returns this type's metadata through `cache`.
    fn metadata(&self, cache: &MetadataCache) -> Arc<TypeMetadata>;

    /// The shape of the field at structural index `index`.
    fn field(&self, index: usize) -> Option<Shape<'_>>;
}

/// Logs any `Serialize` value through its JSON form.
///
/// ```
/// use logmask::{mask_value, MaskingMode, Serialized};
///
/// #[derive(serde::Serialize)]
/// #[serde(rename_all = "lowercase")]
/// enum Status {
///     Active,
/// }
///
/// let masked = mask_value(&Serialized(Status::Active), MaskingMode::TagDriven);
/// assert_eq!(masked, Some(serde_json::json!("active")));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Serialized<T>(pub T);

impl<T: Serialize> Inspect for Serialized<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::serialized(&self.0)
    }
}

/// Raw JSON payload bytes, routed to the JSON text masker when logged.
#[derive(Clone, Copy, Debug)]
pub struct JsonBytes<'a>(pub &'a [u8]);

impl Inspect for JsonBytes<'_> {
    fn kind() -> Kind {
        Kind::String
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Bytes(self.0)
    }
}

// =============================================================================
// Strings
// =============================================================================

impl Inspect for str {
    fn shape(&self) -> Shape<'_> {
        Shape::Str(self)
    }
}

impl Inspect for String {
    fn kind() -> Kind {
        Kind::String
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Str(self.as_str())
    }
}

impl Inspect for Cow<'_, str> {
    fn kind() -> Kind {
        Kind::String
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Str(self.as_ref())
    }
}

// =============================================================================
// Scalars
// =============================================================================

macro_rules! impl_inspect_scalar {
    ($variant:ident as $target:ty: $($ty:ty),+) => {
        $(
            impl Inspect for $ty {
                fn kind() -> Kind {
                    Kind::Scalar
                }

                fn shape(&self) -> Shape<'_> {
                    Shape::$variant(<$target>::from(*self))
                }
            }
        )+
    };
}

impl_inspect_scalar!(I64 as i64: i8, i16, i32, i64);
impl_inspect_scalar!(U64 as u64: u8, u16, u32, u64);
impl_inspect_scalar!(F64 as f64: f32, f64);
impl_inspect_scalar!(Bool as bool: bool);

macro_rules! impl_inspect_wide_scalar {
    ($($ty:ty),+) => {
        $(
            impl Inspect for $ty {
                fn kind() -> Kind {
                    Kind::Scalar
                }

                fn shape(&self) -> Shape<'_> {
                    Shape::Other(JsonValue::from(*self))
                }
            }
        )+
    };
}

// Pointer-sized integers go through serde_json's own conversions.
impl_inspect_wide_scalar!(isize, usize);

impl Inspect for i128 {
    fn kind() -> Kind {
        Kind::Scalar
    }

    fn shape(&self) -> Shape<'_> {
        i64::try_from(*self).map_or_else(
            |_| Shape::Other(JsonValue::String(self.to_string())),
            Shape::I64,
        )
    }
}

impl Inspect for u128 {
    fn kind() -> Kind {
        Kind::Scalar
    }

    fn shape(&self) -> Shape<'_> {
        u64::try_from(*self).map_or_else(
            |_| Shape::Other(JsonValue::String(self.to_string())),
            Shape::U64,
        )
    }
}

impl Inspect for char {
    fn kind() -> Kind {
        Kind::Scalar
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Other(JsonValue::String(self.to_string()))
    }
}

impl Inspect for () {
    fn kind() -> Kind {
        Kind::Other
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Null
    }
}

// =============================================================================
// Time
// =============================================================================

impl<Tz: TimeZone> Inspect for DateTime<Tz> {
    fn kind() -> Kind {
        Kind::Time
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Time(self.with_timezone(&Utc))
    }
}

impl Inspect for SystemTime {
    fn kind() -> Kind {
        Kind::Time
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Time(DateTime::<Utc>::from(*self))
    }
}

impl Inspect for Duration {
    fn kind() -> Kind {
        Kind::Other
    }

    // `1.5s`, `250ms`
    fn shape(&self) -> Shape<'_> {
        Shape::Text(format!("{self:?}"))
    }
}

// =============================================================================
// Addresses and paths
// =============================================================================

macro_rules! impl_inspect_display {
    ($($ty:ty),+) => {
        $(
            impl Inspect for $ty {
                fn kind() -> Kind {
                    Kind::String
                }

                fn shape(&self) -> Shape<'_> {
                    Shape::Text(self.to_string())
                }
            }
        )+
    };
}

impl_inspect_display!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6);

impl Inspect for Path {
    fn shape(&self) -> Shape<'_> {
        Shape::Text(self.to_string_lossy().into_owned())
    }
}

impl Inspect for PathBuf {
    fn kind() -> Kind {
        Kind::String
    }

    fn shape(&self) -> Shape<'_> {
        self.as_path().shape()
    }
}

// =============================================================================
// Pointers
// =============================================================================

impl<T: Inspect> Inspect for Option<T> {
    fn kind() -> Kind {
        Kind::Pointer
    }

    fn shape(&self) -> Shape<'_> {
        self.as_ref().map_or(Shape::Null, Inspect::shape)
    }
}

macro_rules! impl_inspect_pointer {
    ($($ptr:ident),+) => {
        $(
            impl<T: Inspect + ?Sized> Inspect for $ptr<T> {
                fn kind() -> Kind {
                    Kind::Pointer
                }

                fn shape(&self) -> Shape<'_> {
                    (**self).shape()
                }
            }
        )+
    };
}

impl_inspect_pointer!(Box, Arc, Rc);

impl<T: Inspect + ?Sized> Inspect for &T {
    fn kind() -> Kind {
        Kind::Pointer
    }

    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

// =============================================================================
// Sequences
// =============================================================================

fn seq<'a, T, I>(items: I) -> Shape<'a>
where
    T: Inspect + 'a,
    I: IntoIterator<Item = &'a T>,
{
    Shape::Seq(items.into_iter().map(|item| item as &dyn Inspect).collect())
}

impl<T: Inspect> Inspect for [T] {
    fn shape(&self) -> Shape<'_> {
        seq(self)
    }
}

impl<T: Inspect, const N: usize> Inspect for [T; N] {
    fn kind() -> Kind {
        Kind::Sequence
    }

    fn shape(&self) -> Shape<'_> {
        seq(self)
    }
}

impl<T: Inspect> Inspect for Vec<T> {
    fn kind() -> Kind {
        Kind::Sequence
    }

    fn shape(&self) -> Shape<'_> {
        seq(self)
    }
}

impl<T: Inspect> Inspect for VecDeque<T> {
    fn kind() -> Kind {
        Kind::Sequence
    }

    fn shape(&self) -> Shape<'_> {
        seq(self)
    }
}

impl<T: Inspect, S> Inspect for HashSet<T, S> {
    fn kind() -> Kind {
        Kind::Sequence
    }

    fn shape(&self) -> Shape<'_> {
        seq(self)
    }
}

impl<T: Inspect> Inspect for BTreeSet<T> {
    fn kind() -> Kind {
        Kind::Sequence
    }

    fn shape(&self) -> Shape<'_> {
        seq(self)
    }
}

// =============================================================================
// Maps
// =============================================================================

// Keys of any `Display` type degrade to their string form.
fn map<'a, K, V, I>(entries: I) -> Shape<'a>
where
    K: Display + 'a,
    V: Inspect + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    Shape::Map(
        entries
            .into_iter()
            .map(|(key, value)| (Cow::Owned(key.to_string()), value as &dyn Inspect))
            .collect(),
    )
}

impl<K: Display, V: Inspect, S> Inspect for HashMap<K, V, S> {
    fn kind() -> Kind {
        Kind::Map
    }

    fn shape(&self) -> Shape<'_> {
        map(self)
    }
}

impl<K: Display, V: Inspect> Inspect for BTreeMap<K, V> {
    fn kind() -> Kind {
        Kind::Map
    }

    fn shape(&self) -> Shape<'_> {
        map(self)
    }
}

// =============================================================================
// serde_json
// =============================================================================

impl Inspect for JsonValue {
    fn shape(&self) -> Shape<'_> {
        match self {
            JsonValue::Null => Shape::Null,
            JsonValue::Bool(value) => Shape::Bool(*value),
            JsonValue::Number(number) => number
                .as_i64()
                .map(Shape::I64)
                .or_else(|| number.as_u64().map(Shape::U64))
                .or_else(|| number.as_f64().map(Shape::F64))
                .unwrap_or_else(|| Shape::Other(JsonValue::Number(number.clone()))),
            JsonValue::String(text) => Shape::Str(text),
            JsonValue::Array(items) => seq(items),
            JsonValue::Object(entries) => Shape::Map(
                entries
                    .iter()
                    .map(|(key, value)| (Cow::Borrowed(key.as_str()), value as &dyn Inspect))
                    .collect(),
            ),
        }
    }
}
