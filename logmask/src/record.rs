//! Standard classification fields attached to every record.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use slog::Level;

/// Direction or nature of the event being logged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MsgType {
    In,
    Out,
    Request,
    Response,
    Event,
}

impl MsgType {
    /// Wire value: `IN`, `OUT`, `REQUEST`, `RESPONSE` or `EVENT`.
    pub fn as_str(self) -> &'static str {
        match self {
            MsgType::In => "IN",
            MsgType::Out => "OUT",
            MsgType::Request => "REQUEST",
            MsgType::Response => "RESPONSE",
            MsgType::Event => "EVENT",
        }
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MsgType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "IN" => Ok(MsgType::In),
            "OUT" => Ok(MsgType::Out),
            "REQUEST" => Ok(MsgType::Request),
            "RESPONSE" => Ok(MsgType::Response),
            "EVENT" => Ok(MsgType::Event),
            _ => Err(format!("unknown message type `{value}`")),
        }
    }
}

/// The `severity` member, for collectors that key on it instead of `level`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Default,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Default => "DEFAULT",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        match level {
            Level::Critical => Severity::Critical,
            Level::Error => Severity::Error,
            Level::Warning => Severity::Warning,
            Level::Info => Severity::Info,
            Level::Debug => Severity::Debug,
            Level::Trace => Severity::Default,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
