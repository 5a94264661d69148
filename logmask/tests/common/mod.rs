//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

use logmask::{Logger, LoggerBuilder};
use serde_json::Value as JsonValue;

/// An in-memory sink that can be inspected after the logger wrote to it.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    /// Every written line, parsed as JSON.
    pub fn records(&self) -> Vec<JsonValue> {
        self.text()
            .lines()
            .map(|line| serde_json::from_str(line).expect("every line should be JSON"))
            .collect()
    }

    pub fn single(&self) -> JsonValue {
        let mut records = self.records();
        assert_eq!(records.len(), 1, "expected exactly one record");
        records.remove(0)
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Builds a logger writing into a fresh [`Capture`].
pub fn capture(builder: LoggerBuilder) -> (Logger, Capture) {
    let sink = Capture::default();
    let logger = builder.output(sink.clone()).build().unwrap();
    (logger, sink)
}

/// Member names of a record, in written order.
pub fn keys(record: &JsonValue) -> Vec<&str> {
    record
        .as_object()
        .expect("record should be an object")
        .keys()
        .map(String::as_str)
        .collect()
}
