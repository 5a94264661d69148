//! Parsing of `#[masked(...)]` and `#[serde(rename = ...)]` field attributes.
//!
//! This module maps attribute syntax to per-field options and produces
//! structured errors for invalid forms.

use proc_macro2::Span;
use syn::{spanned::Spanned, Attribute, LitStr, Meta, Result, Token};

/// Explicit masking strategy from `#[masked(...)]`.
///
/// | Attribute | Strategy |
/// |-----------|----------|
/// | `#[masked(full)]` | `Full` |
/// | `#[masked(partial)]` | `Partial` |
/// | `#[masked(none)]` | `None` |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Strategy {
    None,
    Partial,
    Full,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct FieldOptions {
    /// `None` when the field carries no strategy tag.
    pub(crate) strategy: Option<Strategy>,
    pub(crate) skip: bool,
    /// `#[masked(serde)]`: log the field through its `Serialize` impl.
    pub(crate) serde: bool,
    /// `#[masked(rename = "...")]`, which wins over serde.
    pub(crate) rename: Option<String>,
    /// `#[serde(rename = "...")]` or `#[serde(rename(serialize = "..."))]`.
    pub(crate) serde_rename: Option<String>,
}

impl FieldOptions {
    /// The key to log under, if an attribute overrides the field name.
    pub(crate) fn display_name(&self) -> Option<&str> {
        self.rename.as_deref().or(self.serde_rename.as_deref())
    }
}

fn set_strategy(target: &mut Option<Strategy>, next: Strategy, span: Span) -> Result<()> {
    if target.is_some() {
        return Err(syn::Error::new(
            span,
            "multiple masking strategies specified on the same field",
        ));
    }
    *target = Some(next);
    Ok(())
}

pub(crate) fn parse_field_options(attrs: &[Attribute]) -> Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in attrs {
        if attr.path().is_ident("masked") {
            parse_masked(attr, &mut options)?;
        } else if attr.path().is_ident("serde") {
            if let Some(name) = parse_serde_rename(attr) {
                options.serde_rename = Some(name);
            }
        }
    }
    Ok(options)
}

fn parse_masked(attr: &Attribute, options: &mut FieldOptions) -> Result<()> {
    match &attr.meta {
        Meta::List(_) => {}
        Meta::Path(_) => {
            return Err(syn::Error::new(
                attr.span(),
                "expected a strategy, e.g. #[masked(full)] or #[masked(partial)]",
            ));
        }
        Meta::NameValue(_) => {
            return Err(syn::Error::new(
                attr.span(),
                "name-value syntax is not supported for #[masked]",
            ));
        }
    }

    attr.parse_nested_meta(|meta| {
        let span = meta.path.span();
        if meta.path.is_ident("full") {
            set_strategy(&mut options.strategy, Strategy::Full, span)
        } else if meta.path.is_ident("partial") {
            set_strategy(&mut options.strategy, Strategy::Partial, span)
        } else if meta.path.is_ident("none") {
            set_strategy(&mut options.strategy, Strategy::None, span)
        } else if meta.path.is_ident("skip") {
            options.skip = true;
            Ok(())
        } else if meta.path.is_ident("serde") {
            options.serde = true;
            Ok(())
        } else if meta.path.is_ident("rename") {
            let name: LitStr = meta.value()?.parse()?;
            options.rename = Some(name.value());
            Ok(())
        } else {
            Err(meta.error("unknown #[masked] option; expected one of: full, partial, none, skip, serde, rename"))
        }
    })
}

/// Reads the serialized name from a `#[serde(...)]` attribute.
///
/// Anything serde accepts but that does not rename is ignored; serde reports
/// its own errors.
fn parse_serde_rename(attr: &Attribute) -> Option<String> {
    let mut rename = None;
    let parsed = attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("rename") {
            if meta.input.peek(Token![=]) {
                let name: LitStr = meta.value()?.parse()?;
                rename = Some(name.value());
            } else {
                meta.parse_nested_meta(|inner| {
                    let name: LitStr = inner.value()?.parse()?;
                    if inner.path.is_ident("serialize") {
                        rename = Some(name.value());
                    }
                    Ok(())
                })?;
            }
        } else if meta.input.peek(Token![=]) {
            let _: syn::Lit = meta.value()?.parse()?;
        } else if meta.input.peek(syn::token::Paren) {
            meta.parse_nested_meta(|inner| {
                if inner.input.peek(Token![=]) {
                    let _: syn::Lit = inner.value()?.parse()?;
                }
                Ok(())
            })?;
        }
        Ok(())
    });
    parsed.ok().and(rename)
}
