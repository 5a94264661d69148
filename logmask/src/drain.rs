//! A `slog` drain that writes one JSON object per record.
//!
//! Member order is fixed: `level`, `time`, `source`, `msg`, the logger's own
//! key/values (such as `application_name`), then the record's key/values.
//! Nested values arrive through `slog`'s `nested-values` support and are
//! embedded as JSON, not as strings.

use std::{
    cell::RefCell,
    fmt::Arguments,
    io::{self, Write},
};

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value as JsonValue};
use slog::{Drain, Key, Level, OwnedKVList, Record, Serializer, KV};

/// Placeholder emitted when a nested value cannot be turned into JSON.
pub const SERIALIZE_FAILED: &str = "Failed to serialize masked value";

/// Encodes a timestamp the way log lines carry it: RFC 3339, UTC, whole
/// seconds (`2024-05-06T07:08:09Z`).
pub fn encode_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Wire name of a `slog` level.
pub fn level_name(level: Level) -> &'static str {
    match level {
        Level::Critical => "fatal",
        Level::Error => "error",
        Level::Warning => "warn",
        Level::Info => "info",
        Level::Debug => "debug",
        Level::Trace => "trace",
    }
}

/// `dir/file.rs:line` from a full source path.
pub fn short_source(file: &str, line: u32) -> String {
    let mut cut = file.len();
    for _ in 0..2 {
        match file[..cut].rfind(|c| c == '/' || c == '\\') {
            Some(at) => cut = at,
            None => return format!("{file}:{line}"),
        }
    }
    format!("{}:{line}", &file[cut + 1..])
}

/// Serializes records as JSON lines into `W`.
///
/// The drain is not `Sync`; share it behind a `Mutex`, which `slog` accepts as
/// a drain on its own.
#[derive(Debug)]
pub struct JsonDrain<W: Write> {
    writer: RefCell<W>,
    line: RefCell<Vec<u8>>,
}

impl<W: Write> JsonDrain<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: RefCell::new(writer),
            line: RefCell::new(Vec::with_capacity(512)),
        }
    }

    /// Flushes the underlying writer.
    pub fn flush(&self) -> io::Result<()> {
        self.writer.borrow_mut().flush()
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn render(&self, record: &Record<'_>, values: &OwnedKVList) -> Map<String, JsonValue> {
        let mut object = Map::new();
        object.insert("level".into(), level_name(record.level()).into());
        object.insert("time".into(), encode_time(&Utc::now()).into());
        object.insert(
            "source".into(),
            short_source(record.file(), record.line()).into(),
        );
        object.insert("msg".into(), record.msg().to_string().into());

        let mut serializer = RecordSerializer {
            object: &mut object,
        };
        // Both serializers are infallible.
        let _ = values.serialize(record, &mut serializer);
        let _ = record.kv().serialize(record, &mut serializer);
        object
    }
}

impl<W: Write> Drain for JsonDrain<W> {
    type Ok = ();
    type Err = io::Error;

    fn log(&self, record: &Record<'_>, values: &OwnedKVList) -> Result<(), io::Error> {
        let object = self.render(record, values);

        let mut line = self.line.borrow_mut();
        line.clear();
        serde_json::to_writer(&mut *line, &object)?;
        line.push(b'\n');
        self.writer.borrow_mut().write_all(&line)
    }
}

struct RecordSerializer<'a> {
    object: &'a mut Map<String, JsonValue>,
}

impl RecordSerializer<'_> {
    fn put(&mut self, key: Key, value: JsonValue) -> slog::Result {
        self.object.insert(key.into(), value);
        Ok(())
    }
}

macro_rules! emit_as_json {
    ($($method:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method(&mut self, key: Key, val: $ty) -> slog::Result {
                self.put(key, JsonValue::from(val))
            }
        )*
    };
}

impl Serializer for RecordSerializer<'_> {
    fn emit_arguments(&mut self, key: Key, val: &Arguments<'_>) -> slog::Result {
        self.put(key, JsonValue::String(val.to_string()))
    }

    fn emit_str(&mut self, key: Key, val: &str) -> slog::Result {
        self.put(key, JsonValue::String(val.into()))
    }

    fn emit_char(&mut self, key: Key, val: char) -> slog::Result {
        self.put(key, JsonValue::String(val.to_string()))
    }

    fn emit_unit(&mut self, key: Key) -> slog::Result {
        self.put(key, JsonValue::Null)
    }

    fn emit_none(&mut self, key: Key) -> slog::Result {
        self.put(key, JsonValue::Null)
    }

    emit_as_json!(
        emit_bool: bool,
        emit_u8: u8,
        emit_i8: i8,
        emit_u16: u16,
        emit_i16: i16,
        emit_u32: u32,
        emit_i32: i32,
        emit_u64: u64,
        emit_i64: i64,
        emit_usize: usize,
        emit_isize: isize,
        emit_f32: f32,
        emit_f64: f64,
    );

    fn emit_serde(&mut self, key: Key, val: &dyn slog::SerdeValue) -> slog::Result {
        let json = serde_json::to_value(val.as_serde())
            .unwrap_or_else(|_| JsonValue::String(SERIALIZE_FAILED.into()));
        self.put(key, json)
    }
}
