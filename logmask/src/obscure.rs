//! String obscuring for classified values.
//!
//! These are pure string transformations. They do not decide *whether* a value
//! is sensitive; that is the job of [`classify`](crate::classify()) and of field tags.
//!
//! Lengths are counted in Unicode scalar values, never bytes, so multi-byte
//! text is never split inside a character.

use crate::classify::MaskStrategy;

/// Character used to build masks.
pub const MASK_CHAR: char = '*';

/// Fixed token emitted for full masks and for partial masks of short values.
///
/// Its length does not depend on the input, so it leaks nothing about it.
pub const MASK_TOKEN: &str = "****";

/// Values up to this many characters are too short to reveal any boundary.
const MIN_PARTIAL_LEN: usize = 4;

/// Characters kept visible on each side by a partial mask.
const VISIBLE_EDGE: usize = 2;

/// Obscures `value` according to `strategy`.
///
/// - [`MaskStrategy::Full`] always yields [`MASK_TOKEN`].
/// - [`MaskStrategy::Partial`] keeps the first and last two characters around
///   [`MASK_TOKEN`] (`"johndoe123"` becomes `"jo****23"`). Values of four
///   characters or fewer collapse to [`MASK_TOKEN`].
/// - [`MaskStrategy::None`] returns the value unchanged.
#[must_use]
pub fn obscure(value: &str, strategy: MaskStrategy) -> String {
    match strategy {
        MaskStrategy::None => value.to_owned(),
        MaskStrategy::Full => MASK_TOKEN.to_owned(),
        MaskStrategy::Partial => keep_edges(value),
    }
}

fn keep_edges(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let total = chars.len();
    if total <= MIN_PARTIAL_LEN {
        return MASK_TOKEN.to_owned();
    }

    let mut masked = String::with_capacity(value.len());
    masked.extend(&chars[..VISIBLE_EDGE]);
    masked.push_str(MASK_TOKEN);
    masked.extend(&chars[total - VISIBLE_EDGE..]);
    masked
}

/// Email-aware variant of the partial mask.
///
/// When `value` contains exactly one `@`, only the local part is obscured: its
/// first two characters stay visible, the rest become [`MASK_CHAR`], and the
/// domain is kept verbatim (`"john.doe@example.com"` becomes
/// `"jo******@example.com"`). A local part of two characters or fewer is masked
/// entirely.
///
/// Anything else is not treated as an email and every character is replaced by
/// [`MASK_CHAR`]. Unlike [`obscure`], this variant preserves the input length.
#[must_use]
pub fn obscure_email(value: &str) -> String {
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return mask_all(value);
    };

    let local_len = local.chars().count();
    let mut masked = String::with_capacity(value.len());
    if local_len <= VISIBLE_EDGE {
        masked.push_str(&mask_all(local));
    } else {
        masked.extend(local.chars().take(VISIBLE_EDGE));
        masked.extend(std::iter::repeat(MASK_CHAR).take(local_len - VISIBLE_EDGE));
    }
    masked.push('@');
    masked.push_str(domain);
    masked
}

fn mask_all(value: &str) -> String {
    value.chars().map(|_| MASK_CHAR).collect()
}
