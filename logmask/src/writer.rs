//! Output decorator that compacts multi-line stack traces.
//!
//! [`StackTraceWriter`] looks for a `"stack_trace":"..."` member in each
//! encoded line and rewrites its value from
//!
//! ```text
//! "frame\n\tat src/main.rs:10\nframe"
//! ```
//!
//! into a single bracketed line:
//!
//! ```text
//! "[frame | at src/main.rs:10 | frame]"
//! ```
//!
//! The rewrite is byte-level surgery on the finished line. Lines without the
//! member are forwarded untouched, which is the common case.

use std::{
    io::{self, Write},
    ops::Range,
};

const MARKER: &[u8] = br#""stack_trace":""#;

const SEPARATOR: &[u8] = b" | ";

/// Wraps a sink and reformats `stack_trace` values on the way through.
///
/// Every call to [`Write::write`] is expected to carry whole lines, which is
/// what [`crate::JsonDrain`] produces. A rewritten line is handed to the inner
/// sink with one `write_all`.
#[derive(Debug)]
pub struct StackTraceWriter<W> {
    inner: W,
    line: Vec<u8>,
}

impl<W: Write> StackTraceWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            line: Vec::new(),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for StackTraceWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Some(value) = locate_value(buf) else {
            self.inner.write_all(buf)?;
            return Ok(buf.len());
        };

        self.line.clear();
        self.line.extend_from_slice(&buf[..value.start]);
        bracket_escaped_into(&buf[value.clone()], &mut self.line);
        self.line.extend_from_slice(&buf[value.end..]);
        self.inner.write_all(&self.line)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Byte range of the escaped `stack_trace` value, without its quotes.
///
/// The drain writes its own member last, so the last occurrence is the one
/// taken. Returns `None` when the member is absent or its value is not
/// terminated inside `buf`.
fn locate_value(buf: &[u8]) -> Option<Range<usize>> {
    let start = buf
        .windows(MARKER.len())
        .rposition(|window| window == MARKER)?
        + MARKER.len();

    let mut at = start;
    while at < buf.len() {
        match buf[at] {
            b'\\' => at += 2,
            b'"' => return Some(start..at),
            _ => at += 1,
        }
    }
    None
}

/// Compacts an escaped `stack_trace` value without decoding it.
///
/// Each escaped newline, with an escaped tab right after it if present,
/// becomes `" | "`. Every other escape pair is copied as is, so the value
/// stays valid JSON string content.
pub(crate) fn bracket_escaped_into(escaped: &[u8], out: &mut Vec<u8>) {
    out.reserve(escaped.len() + 2);
    out.push(b'[');
    let mut at = 0;
    while at < escaped.len() {
        match (escaped[at], escaped.get(at + 1)) {
            (b'\\', Some(b'n')) => {
                out.extend_from_slice(SEPARATOR);
                at += 2;
                if escaped[at..].starts_with(br"\t") {
                    at += 2;
                }
            }
            (b'\\', Some(&next)) => {
                out.extend_from_slice(&[b'\\', next]);
                at += 2;
            }
            (byte, _) => {
                out.push(byte);
                at += 1;
            }
        }
    }
    out.push(b']');
}

/// Writes `[text]` with every newline (and a tab right after it) turned into
/// `" | "`.
///
/// The result lands inside a JSON string, so quotes, backslashes and control
/// characters are escaped again.
pub(crate) fn bracket_into(text: &[u8], out: &mut Vec<u8>) {
    out.push(b'[');
    let mut bytes = text.iter().copied().peekable();
    while let Some(byte) = bytes.next() {
        match byte {
            b'\n' => {
                bytes.next_if_eq(&b'\t');
                out.extend_from_slice(SEPARATOR);
            }
            b'"' => out.extend_from_slice(br#"\""#),
            b'\\' => out.extend_from_slice(br"\\"),
            b'\t' => out.extend_from_slice(br"\t"),
            b'\r' => out.extend_from_slice(br"\r"),
            control if control < 0x20 => {
                out.extend_from_slice(format!("\\u{control:04x}").as_bytes());
            }
            other => out.push(other),
        }
    }
    out.push(b']');
}

/// Compacts a raw multi-line trace into its bracketed single-line form.
///
/// ```
/// assert_eq!(
///     logmask::format_stack_trace("a\nb\n\tc"),
///     "[a | b | c]"
/// );
/// ```
pub fn format_stack_trace(trace: &str) -> String {
    let mut out = Vec::with_capacity(trace.len() + 2);
    bracket_into(trace.as_bytes(), &mut out);
    String::from_utf8_lossy(&out).into_owned()
}
