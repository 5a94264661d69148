//! The logging façade.
//!
//! A [`Logger`] owns a `slog` root logger writing through
//! [`StackTraceWriter`] into a [`JsonDrain`], plus the [`Masker`] that turns
//! payloads into masked JSON before they reach the record.
//!
//! Every method is `#[track_caller]`, so the `source` member names the line
//! that called the logger rather than a frame inside this crate.

use std::{
    backtrace::Backtrace,
    error::Error as StdError,
    fmt,
    io::{self, Write},
    panic::Location,
    process,
    sync::{Arc, Mutex, PoisonError},
};

use slog::{o, BorrowedKV, Drain, Key, Level, Record, RecordLocation, RecordStatic, Serializer, KV};

use crate::{
    config::{parse_level, Config},
    drain::JsonDrain,
    error::Result,
    inspect::{Inspect, MetadataCache},
    mask::{MaskedValue, Masker, MaskingMode},
    pool::Pool,
    record::{MsgType, Severity},
    writer::StackTraceWriter,
};

/// Pass as `data` when a record has no payload.
pub const NO_DATA: &dyn Inspect = &();

const ERROR_MSG: &str = "error occurred";

const FATAL_MSG: &str = "fatal error occurred";

type Sink = StackTraceWriter<Box<dyn Write + Send>>;

type SharedDrain = Arc<Mutex<JsonDrain<Sink>>>;

type Field = (&'static str, FieldValue);

static FIELD_LISTS: Pool<Vec<Field>> = Pool::new(32);

enum FieldValue {
    Static(&'static str),
    Owned(String),
    Data(MaskedValue),
}

impl slog::Value for FieldValue {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> slog::Result {
        match self {
            FieldValue::Static(value) => serializer.emit_str(key, value),
            FieldValue::Owned(value) => serializer.emit_str(key, value),
            FieldValue::Data(value) => slog::Value::serialize(value, record, key, serializer),
        }
    }
}

struct Fields<'a>(&'a [Field]);

impl KV for Fields<'_> {
    fn serialize(&self, record: &Record<'_>, serializer: &mut dyn Serializer) -> slog::Result {
        for (key, value) in self.0 {
            slog::Value::serialize(value, record, *key, serializer)?;
        }
        Ok(())
    }
}

/// A configured logger.
///
/// Cloning is cheap; clones share the output and the metadata cache.
#[derive(Clone)]
pub struct Logger {
    inner: slog::Logger,
    drain: SharedDrain,
    masker: Masker,
    level: Level,
    stacktrace_level: Level,
    service_name: Arc<str>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("service_name", &self.service_name)
            .field("level", &self.level)
            .field("stacktrace_level", &self.stacktrace_level)
            .field("masker", &self.masker)
            .finish_non_exhaustive()
    }
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// A logger with default configuration writing to stdout. Never fails.
    pub fn fallback() -> Self {
        Self::assemble(
            &Config::default(),
            Level::Info,
            Level::Error,
            Box::new(io::stdout()),
            MetadataCache::shared(),
        )
    }

    fn assemble(
        config: &Config,
        level: Level,
        stacktrace_level: Level,
        output: Box<dyn Write + Send>,
        cache: Arc<MetadataCache>,
    ) -> Self {
        let drain: SharedDrain = Arc::new(Mutex::new(JsonDrain::new(StackTraceWriter::new(output))));
        let service_name: Arc<str> = Arc::from(config.service_name.as_str());
        let inner = slog::Logger::root(
            Arc::clone(&drain).filter_level(level).ignore_res(),
            o!("application_name" => config.service_name.clone()),
        );

        let masker = if config.masking.enabled {
            Masker::new(config.masking.mode)
        } else {
            Masker::disabled()
        }
        .with_cache(cache)
        .with_email_aware(config.masking.email_aware);

        Self {
            inner,
            drain,
            masker,
            level,
            stacktrace_level,
            service_name,
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn masker(&self) -> &Masker {
        &self.masker
    }

    /// The underlying `slog` logger, for callers that want plain records.
    pub fn slog(&self) -> &slog::Logger {
        &self.inner
    }

    /// Returns `true` if a record at `level` would be written.
    pub fn is_enabled(&self, level: Level) -> bool {
        level.is_at_least(self.level)
    }

    #[track_caller]
    pub fn debug(
        &self,
        trace_id: &str,
        module: &str,
        msg_type: MsgType,
        msg: &str,
        data: &dyn Inspect,
    ) {
        self.event(Level::Debug, trace_id, module, Some(msg_type), msg, data);
    }

    #[track_caller]
    pub fn info(
        &self,
        trace_id: &str,
        module: &str,
        msg_type: MsgType,
        msg: &str,
        data: &dyn Inspect,
    ) {
        self.event(Level::Info, trace_id, module, Some(msg_type), msg, data);
    }

    #[track_caller]
    pub fn warning(&self, trace_id: &str, module: &str, msg: &str, data: &dyn Inspect) {
        self.event(Level::Warning, trace_id, module, None, msg, data);
    }

    /// Logs `err` with the message `"error occurred"`.
    #[track_caller]
    pub fn error(&self, trace_id: &str, module: &str, err: &dyn StdError) {
        self.failure(Level::Error, trace_id, module, ERROR_MSG, err);
    }

    /// Logs `err` at CRITICAL severity, flushes, and exits the process with
    /// status 1.
    #[track_caller]
    pub fn fatal(&self, trace_id: &str, module: &str, err: &dyn StdError) -> ! {
        self.failure(Level::Critical, trace_id, module, FATAL_MSG, err);
        let _ = self.sync();
        process::exit(1)
    }

    /// Flushes buffered output.
    pub fn sync(&self) -> io::Result<()> {
        self.drain
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }

    #[track_caller]
    fn event(
        &self,
        level: Level,
        trace_id: &str,
        module: &str,
        msg_type: Option<MsgType>,
        msg: &str,
        data: &dyn Inspect,
    ) {
        if !self.is_enabled(level) {
            return;
        }

        let mut fields = FIELD_LISTS.acquire();
        fields.push(("trace_id", FieldValue::Owned(trace_id.to_owned())));
        fields.push(("module", FieldValue::Owned(module.to_owned())));
        if let Some(msg_type) = msg_type {
            fields.push(("msg_type", FieldValue::Static(msg_type.as_str())));
        }
        fields.push(("severity", FieldValue::Static(Severity::from(level).as_str())));

        let data = MaskedValue::new(data, &self.masker);
        if !data.is_absent() {
            fields.push(("data", FieldValue::Data(data)));
        }
        self.submit(level, msg, &mut fields);
    }

    #[track_caller]
    fn failure(&self, level: Level, trace_id: &str, module: &str, msg: &str, err: &dyn StdError) {
        if !self.is_enabled(level) {
            return;
        }

        let mut fields = FIELD_LISTS.acquire();
        fields.push(("trace_id", FieldValue::Owned(trace_id.to_owned())));
        fields.push(("module", FieldValue::Owned(module.to_owned())));
        fields.push(("error", FieldValue::Owned(err.to_string())));
        fields.push(("severity", FieldValue::Static(Severity::from(level).as_str())));
        self.submit(level, msg, &mut fields);
    }

    #[track_caller]
    fn submit(&self, level: Level, msg: &str, fields: &mut Vec<Field>) {
        if level.is_at_least(self.stacktrace_level) {
            fields.push(("stack_trace", FieldValue::Owned(capture_stack_trace())));
        }

        let caller = Location::caller();
        let location = RecordLocation {
            file: caller.file(),
            line: caller.line(),
            column: caller.column(),
            function: "",
            module: module_path!(),
        };
        let statics = RecordStatic {
            location: &location,
            tag: "",
            level,
        };
        self.inner.log(&Record::new(
            &statics,
            &format_args!("{msg}"),
            BorrowedKV(&Fields(fields)),
        ));
    }
}

/// Captures the current stack as `symbol\n\tat file:line` lines, the shape
/// [`StackTraceWriter`] compacts.
fn capture_stack_trace() -> String {
    normalize_backtrace(&Backtrace::force_capture().to_string())
}

fn normalize_backtrace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(location) = line.strip_prefix("at ") {
            out.push_str("\n\tat ");
            out.push_str(location);
            continue;
        }

        let symbol = match line.split_once(": ") {
            Some((index, symbol)) if index.bytes().all(|b| b.is_ascii_digit()) => symbol,
            _ => line,
        };
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(symbol);
    }
    out
}

/// Builds a [`Logger`].
///
/// ```
/// use logmask::{Logger, MaskingMode};
///
/// let logger = Logger::builder()
///     .service_name("billing")
///     .level("debug")
///     .masking_mode(MaskingMode::Both)
///     .output(std::io::sink())
///     .build()
///     .unwrap();
/// assert_eq!(logger.service_name(), "billing");
/// ```
pub struct LoggerBuilder {
    config: Config,
    output: Option<Box<dyn Write + Send>>,
    cache: Option<Arc<MetadataCache>>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("config", &self.config)
            .field("output", &self.output.as_ref().map(|_| "custom"))
            .finish_non_exhaustive()
    }
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self::from_config(Config::default())
    }

    /// Starts from [`Config::from_env`].
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_config(Config::from_env()?))
    }

    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            output: None,
            cache: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.config.service_name = name.into();
        self
    }

    /// Minimum level, by name. Checked in [`LoggerBuilder::build`].
    #[must_use]
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.config.level = level.into();
        self
    }

    /// Shorthand for `level("debug")` or `level("info")`.
    #[must_use]
    pub fn debug(self, enabled: bool) -> Self {
        self.level(if enabled { "debug" } else { "info" })
    }

    /// Where lines go. Defaults to stdout.
    #[must_use]
    pub fn output(mut self, output: impl Write + Send + 'static) -> Self {
        self.output = Some(Box::new(output));
        self
    }

    #[must_use]
    pub fn masking(mut self, enabled: bool) -> Self {
        self.config.masking.enabled = enabled;
        self
    }

    #[must_use]
    pub fn masking_mode(mut self, mode: MaskingMode) -> Self {
        self.config.masking.mode = mode;
        self
    }

    #[must_use]
    pub fn email_aware(mut self, enabled: bool) -> Self {
        self.config.masking.email_aware = enabled;
        self
    }

    #[must_use]
    pub fn stacktrace_level(mut self, level: impl Into<String>) -> Self {
        self.config.stacktrace_level = level.into();
        self
    }

    /// Uses a dedicated metadata cache instead of the process-wide one.
    #[must_use]
    pub fn metadata_cache(mut self, cache: Arc<MetadataCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> Result<Logger> {
        let level = parse_level(&self.config.level)?;
        let stacktrace_level = parse_level(&self.config.stacktrace_level)?;
        let output = self
            .output
            .unwrap_or_else(|| Box::new(io::stdout()) as Box<dyn Write + Send>);
        let cache = self.cache.unwrap_or_else(MetadataCache::shared);
        Ok(Logger::assemble(
            &self.config,
            level,
            stacktrace_level,
            output,
            cache,
        ))
    }
}
