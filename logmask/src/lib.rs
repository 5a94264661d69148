//! Structured JSON logging with field masking and compact stack traces.
//!
//! Every record is one JSON line carrying the same correlation members:
//! `trace_id`, `module`, `msg_type` and a Cloud-Logging style `severity`.
//! Payloads pass through a masker before they reach the record:
//!
//! - **Classification**: which field names look sensitive ([`classify`]).
//! - **Obscuring**: how a sensitive string is rewritten ([`obscure`]).
//! - **Masking**: walking a payload and applying both ([`Masker`]).
//!
//! Structs opt in with `#[derive(Masked)]`, which records their field list
//! once per type in a [`MetadataCache`]. Field tags
//! (`#[masked(full)]`, `#[masked(partial)]`) or name inference decide what is
//! obscured, depending on the [`MaskingMode`]. String and byte payloads are
//! treated as JSON text and masked by key.
//!
//! Multi-line stack traces are compacted on the wire by [`StackTraceWriter`]
//! into a single bracketed line.
//!
//! What this crate does not do:
//! - mutate the values you log
//! - detect secrets by content; only keys and tags are consulted
//!
//! ```
//! use logmask::{Logger, Masked, MsgType};
//!
//! #[derive(Masked)]
//! struct Login {
//!     username: String,
//!     #[masked(full)]
//!     password: String,
//! }
//!
//! let logger = Logger::builder()
//!     .service_name("auth")
//!     .output(std::io::sink())
//!     .build()
//!     .unwrap();
//! let login = Login { username: "alice".into(), password: "hunter2".into() };
//! logger.info("trace-1", "auth", MsgType::Request, "login attempt", &login);
//! ```

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::needless_ifs,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::future_not_send,
    clippy::option_if_let_else,
    clippy::from_over_into,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[cfg(feature = "derive")]
pub use logmask_derive::Masked;

#[allow(unused_extern_crates)]
extern crate self as logmask;

// Module declarations
mod classify;
mod config;
mod drain;
#[cfg(feature = "derive")]
mod dto;
mod error;
mod global;
mod inspect;
mod json;
mod logger;
mod mask;
mod obscure;
mod pool;
mod record;
mod writer;

// Re-exports
pub use classify::{classify, MaskStrategy, FULL_PATTERNS, PARTIAL_PATTERNS};
pub use config::{parse_level, Config, MaskingConfig, ENV_PREFIX};
pub use drain::{encode_time, level_name, short_source, JsonDrain, SERIALIZE_FAILED};
#[cfg(feature = "derive")]
pub use dto::{DbData, GenericData, HttpData, MqData};
pub use error::{Error, Result};
pub use global::{debug, error, fatal, global, info, init, sync, warning};
pub use inspect::{
    FieldDescriptor, Inspect, JsonBytes, Kind, MetadataCache, Serialized, Shape, Structured,
    TypeMetadata,
};
pub use json::{mask_headers, mask_json_bytes, mask_json_str, mask_json_value};
pub use logger::{Logger, LoggerBuilder, NO_DATA};
pub use mask::{mask_value, MaskPolicy, MaskedValue, Masker, MaskingMode};
pub use obscure::{obscure, obscure_email, MASK_CHAR, MASK_TOKEN};
pub use record::{MsgType, Severity};
pub use writer::{format_stack_trace, StackTraceWriter};

// Used by `#[derive(Masked)]` output. Not public API.
#[doc(hidden)]
pub mod __private {
    pub use serde::Serialize;
}
