//! Generic type parameter handling and trait bound management.
//!
//! Every type parameter gets `'static`, because metadata is cached by
//! `TypeId`. Only parameters that appear in logged fields also get `Inspect`,
//! or `Serialize` for fields marked `#[masked(serde)]`.
//!
//! ## PhantomData Handling
//!
//! `PhantomData<T>` fields are never logged, so they add no bound:
//!
//! ```ignore
//! struct TypedId<T> {
//!     id: String,
//!     _marker: PhantomData<T>,  // T should NOT require Inspect
//! }
//! ```

use proc_macro2::TokenStream;
use syn::{parse_quote, Ident};

use crate::types::is_phantom_data;

pub(crate) fn collect_generics_from_type(
    ty: &syn::Type,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
) {
    match ty {
        syn::Type::Path(path) => {
            if is_phantom_data(ty) {
                return;
            }
            let Some(segment) = path.path.segments.last() else {
                return;
            };

            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                for arg in &args.args {
                    if let syn::GenericArgument::Type(inner_ty) = arg {
                        collect_generics_from_type(inner_ty, generics, result);
                    }
                }
            }

            for param in generics.type_params() {
                if segment.ident == param.ident && !result.iter().any(|g| g == &param.ident) {
                    result.push(param.ident.clone());
                }
            }
        }
        syn::Type::Reference(reference) => {
            collect_generics_from_type(&reference.elem, generics, result);
        }
        syn::Type::Array(array) => collect_generics_from_type(&array.elem, generics, result),
        syn::Type::Slice(slice) => collect_generics_from_type(&slice.elem, generics, result),
        syn::Type::Paren(paren) => collect_generics_from_type(&paren.elem, generics, result),
        syn::Type::Group(group) => collect_generics_from_type(&group.elem, generics, result),
        syn::Type::Tuple(tuple) => {
            for elem in &tuple.elems {
                collect_generics_from_type(elem, generics, result);
            }
        }
        _ => {}
    }
}

/// Adds `'static` to every type parameter.
pub(crate) fn add_static_bounds(mut generics: syn::Generics) -> syn::Generics {
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!('static));
    }
    generics
}

/// Adds `bound` to the generic parameters listed in `used_generics`.
pub(crate) fn add_trait_bounds(
    mut generics: syn::Generics,
    used_generics: &[Ident],
    bound: &TokenStream,
) -> syn::Generics {
    for param in generics.type_params_mut() {
        if used_generics.iter().any(|g| g == &param.ident) {
            param.bounds.push(parse_quote!(#bound));
        }
    }
    generics
}
