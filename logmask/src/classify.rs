//! Name-based classification: "how sensitive is a field called this?"
//!
//! Classification is a pure function of the field (or header, or JSON key) name.
//! It never looks at the value. Matching is case-insensitive substring
//! containment against two ordered pattern lists, full patterns first.

use serde::{Deserialize, Serialize};

/// How a string value is obscured before it reaches a log line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskStrategy {
    /// Leave the value untouched.
    #[default]
    None,
    /// Keep the two leading and two trailing characters, hide the interior.
    Partial,
    /// Replace the whole value with a fixed token.
    Full,
}

impl MaskStrategy {
    /// Returns `true` unless the strategy is [`MaskStrategy::None`].
    pub fn is_masking(self) -> bool {
        !matches!(self, MaskStrategy::None)
    }
}

/// Patterns that classify a name as [`MaskStrategy::Full`].
///
/// Checked before [`PARTIAL_PATTERNS`].
pub const FULL_PATTERNS: &[&str] = &[
    "password",
    "passwd",
    "pwd",
    "secret",
    "secret_key",
    "token",
    "auth",
    "authorization",
    "bearer",
    "credential",
    "private_key",
    "api_secret",
];

/// Patterns that classify a name as [`MaskStrategy::Partial`].
pub const PARTIAL_PATTERNS: &[&str] = &[
    "username",
    "user_name",
    "email",
    "phone",
    "mobile",
    "access_key",
    "api_key",
    "client_id",
    "user_id",
];

/// Classifies a field name.
///
/// The name is lowercased and `-` is replaced with `_`, so `X-API-Key` and
/// `x_api_key` classify the same way. Because matching is by substring, names
/// that merely contain a pattern are caught too (`user_id_hash` is partial,
/// `oauth_state` is full). That trade-off favours recall over precision.
pub fn classify(name: &str) -> MaskStrategy {
    let normalized = name.to_lowercase().replace('-', "_");

    if FULL_PATTERNS
        .iter()
        .any(|pattern| normalized.contains(pattern))
    {
        return MaskStrategy::Full;
    }

    if PARTIAL_PATTERNS
        .iter()
        .any(|pattern| normalized.contains(pattern))
    {
        return MaskStrategy::Partial;
    }

    MaskStrategy::None
}
