//! Derive macro for `logmask`.
//!
//! `#[derive(Masked)]` generates the compile-time half of struct introspection:
//! - reads `#[masked(...)]` and `#[serde(rename = ...)]` field attributes
//! - emits `logmask::Structured`, describing every field once per type
//! - emits `logmask::Inspect`, so the struct can be logged and nested
//!
//! It does **not** decide whether or how a value is masked. The masking mode
//! is chosen at runtime by the logger.

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
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[allow(unused_extern_crates)]
extern crate proc_macro;

use proc_macro2::TokenStream;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, Data, DeriveInput, Result};

mod derive_struct;
mod generics;
mod strategy;
mod types;
use derive_struct::derive_struct;
use generics::{add_static_bounds, add_trait_bounds};

/// Derives `logmask::Structured` and `logmask::Inspect` for structs.
///
/// # Field Attributes
///
/// - **No annotation**: no explicit strategy. Whether the field is masked
///   depends on the logger's masking mode (name-based inference may still
///   apply).
/// - `#[masked(full)]`: replace string content with a fixed token.
/// - `#[masked(partial)]`: keep the two leading and trailing characters.
/// - `#[masked(none)]`: explicitly never mask, even if the name looks
///   sensitive.
/// - `#[masked(skip)]`: leave the field out of logged output entirely.
/// - `#[masked(rename = "key")]`: log the field under `key`.
/// - `#[masked(serde)]`: log the field through its `serde::Serialize` impl,
///   for types such as enums that do not implement `Inspect`. String results
///   still honour the field's strategy.
///
/// Options can be combined: `#[masked(full, rename = "pw")]`.
///
/// The logged key follows `#[serde(rename = "...")]` or
/// `#[serde(rename(serialize = "..."))]` when present, so log output matches
/// the type's JSON form. `#[serde(skip)]` does not hide a field from logs; use
/// `#[masked(skip)]` for that.
///
/// `PhantomData` fields are ignored. Tuple structs are keyed by position.
///
/// Enums, unions and types with lifetime parameters are rejected at compile
/// time. Every type parameter gets a `'static` bound, since metadata is cached
/// by `TypeId`.
#[proc_macro_derive(Masked, attributes(masked, serde))]
pub fn derive_masked(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Returns the token stream to reference the logmask crate root.
///
/// Handles crate renaming (e.g., `my_log = { package = "logmask", ... }`).
/// Inside logmask itself the crate aliases itself as `logmask`, so the same
/// absolute path works there and in its doctests.
fn crate_root() -> TokenStream {
    match crate_name("logmask") {
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Ok(FoundCrate::Itself) | Err(_) => quote! { ::logmask },
    }
}

fn expand(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        ..
    } = input;

    if let Some(lifetime) = generics.lifetimes().next() {
        return Err(syn::Error::new(
            lifetime.span(),
            "`Masked` cannot be derived for types with lifetime parameters",
        ));
    }

    let data = match data {
        Data::Struct(data) => data,
        Data::Enum(data) => {
            return Err(syn::Error::new(
                data.enum_token.span(),
                "`Masked` can only be derived for structs",
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span(),
                "`Masked` cannot be derived for unions",
            ));
        }
    };

    let root = crate_root();
    let output = derive_struct(data, &generics, &root)?;

    let bounded = add_static_bounds(generics.clone());
    let bounded = add_trait_bounds(bounded, &output.used_generics, &quote! { #root::Inspect });
    let bounded = add_trait_bounds(
        bounded,
        &output.serialized_generics,
        &quote! { #root::__private::Serialize },
    );
    let (impl_generics, ty_generics, where_clause) = bounded.split_for_impl();

    let descriptors = &output.descriptors;
    let field_arms = &output.field_arms;

    Ok(quote! {
        impl #impl_generics #root::Structured for #ident #ty_generics #where_clause {
            fn describe() -> #root::TypeMetadata {
                #root::TypeMetadata::new(
                    ::core::any::type_name::<Self>(),
                    ::std::vec![#(#descriptors),*],
                )
            }

            fn metadata(
                &self,
                cache: &#root::MetadataCache,
            ) -> ::std::sync::Arc<#root::TypeMetadata> {
                cache.metadata::<Self>()
            }

            #[allow(unused_variables)]
            fn field(&self, index: usize) -> ::core::option::Option<#root::Shape<'_>> {
                match index {
                    #(#field_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl #impl_generics #root::Inspect for #ident #ty_generics #where_clause {
            fn kind() -> #root::Kind {
                #root::Kind::Struct
            }

            fn shape(&self) -> #root::Shape<'_> {
                #root::Shape::Struct(self)
            }
        }
    })
}
