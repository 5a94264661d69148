//! Struct-specific `Structured` derivation.
//!
//! This module turns each logged field into a `FieldDescriptor` expression and
//! a `field(index)` match arm, and collects generic parameters that require
//! trait bounds. Fields marked `#[masked(serde)]` go through `Serialize`
//! instead of `Inspect`.

use proc_macro2::{Literal, TokenStream};
use quote::{quote, quote_spanned};
use syn::{ext::IdentExt, spanned::Spanned, DataStruct, Fields, Ident, Member, Result};

use crate::{
    generics::collect_generics_from_type,
    strategy::{parse_field_options, Strategy},
    types::is_phantom_data,
};

pub(crate) struct StructDeriveOutput {
    pub(crate) descriptors: Vec<TokenStream>,
    pub(crate) field_arms: Vec<TokenStream>,
    pub(crate) used_generics: Vec<Ident>,
    pub(crate) serialized_generics: Vec<Ident>,
}

pub(crate) fn derive_struct(
    data: DataStruct,
    generics: &syn::Generics,
    root: &TokenStream,
) -> Result<StructDeriveOutput> {
    let mut output = StructDeriveOutput {
        descriptors: Vec::new(),
        field_arms: Vec::new(),
        used_generics: Vec::new(),
        serialized_generics: Vec::new(),
    };

    let fields = match data.fields {
        Fields::Named(fields) => fields.named,
        Fields::Unnamed(fields) => fields.unnamed,
        Fields::Unit => return Ok(output),
    };

    for (index, field) in fields.into_iter().enumerate() {
        let options = parse_field_options(&field.attrs)?;
        if options.skip || is_phantom_data(&field.ty) {
            continue;
        }

        let span = field.span();
        let ty = &field.ty;
        let (member, default_name) = match field.ident {
            Some(ident) => {
                let name = ident.unraw().to_string();
                (Member::Named(ident), name)
            }
            None => (Member::Unnamed(index.into()), index.to_string()),
        };
        let name = options
            .display_name()
            .map_or(default_name, str::to_owned);

        let tag = match options.strategy {
            Some(strategy) => {
                let variant = strategy_variant(strategy);
                quote! { ::core::option::Option::Some(#root::MaskStrategy::#variant) }
            }
            None => quote! { ::core::option::Option::None },
        };
        let position = Literal::usize_unsuffixed(index);

        let (kind, shape, bounded) = if options.serde {
            (
                quote_spanned! { span => #root::Kind::Other },
                quote! { #root::Shape::serialized(&self.#member) },
                &mut output.serialized_generics,
            )
        } else {
            (
                quote_spanned! { span => <#ty as #root::Inspect>::kind() },
                quote! { #root::Inspect::shape(&self.#member) },
                &mut output.used_generics,
            )
        };

        output.descriptors.push(quote_spanned! { span =>
            #root::FieldDescriptor::new(#name, #kind, #tag, #position)
        });
        output.field_arms.push(quote! {
            #position => ::core::option::Option::Some(#shape),
        });

        collect_generics_from_type(ty, generics, bounded);
    }

    Ok(output)
}

fn strategy_variant(strategy: Strategy) -> TokenStream {
    match strategy {
        Strategy::None => quote! { None },
        Strategy::Partial => quote! { Partial },
        Strategy::Full => quote! { Full },
    }
}

#[cfg(test)]
mod tests {
    use quote::{quote, ToTokens};
    use syn::{Data, DeriveInput};

    use super::*;

    fn expand(tokens: TokenStream) -> StructDeriveOutput {
        let input: DeriveInput = syn::parse2(tokens).expect("should parse as DeriveInput");
        let Data::Struct(data) = input.data else {
            panic!("expected a struct");
        };
        derive_struct(data, &input.generics, &quote! { ::logmask }).unwrap()
    }

    fn rendered(tokens: &[TokenStream]) -> Vec<String> {
        tokens.iter().map(|t| t.to_token_stream().to_string()).collect()
    }

    #[test]
    fn named_fields_become_descriptors() {
        let output = expand(quote! {
            struct Login {
                #[masked(full)]
                password: String,
                #[serde(rename = "user")]
                username: String,
            }
        });
        let descriptors = rendered(&output.descriptors);
        assert_eq!(descriptors.len(), 2);
        assert!(descriptors[0].contains("\"password\""));
        assert!(descriptors[0].contains("MaskStrategy :: Full"));
        assert!(descriptors[1].contains("\"user\""));
        assert!(descriptors[1].contains(":: core :: option :: Option :: None"));
        assert!(rendered(&output.field_arms)[1].contains("Inspect :: shape (& self . username)"));
    }

    #[test]
    fn serde_fields_go_through_serialize() {
        let output = expand(quote! {
            struct Order<S, T> {
                #[masked(serde)]
                status: S,
                total: T,
            }
        });
        let descriptors = rendered(&output.descriptors);
        assert!(descriptors[0].contains("Kind :: Other"));
        assert!(descriptors[1].contains("< T as :: logmask :: Inspect > :: kind ()"));
        assert!(rendered(&output.field_arms)[0].contains("Shape :: serialized (& self . status)"));

        let names = |idents: &[Ident]| idents.iter().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(names(&output.serialized_generics), ["S"]);
        assert_eq!(names(&output.used_generics), ["T"]);
    }

    #[test]
    fn skipped_and_phantom_fields_keep_their_positions() {
        let output = expand(quote! {
            struct Typed<T> {
                #[masked(skip)]
                internal: String,
                _marker: PhantomData<T>,
                id: String,
            }
        });
        assert_eq!(output.descriptors.len(), 1);
        assert!(rendered(&output.field_arms)[0].starts_with("2 =>"));
        assert!(output.used_generics.is_empty());
    }

    #[test]
    fn tuple_fields_use_positions() {
        let output = expand(quote! {
            struct Pair(#[masked(partial)] String, u32);
        });
        let descriptors = rendered(&output.descriptors);
        assert!(descriptors[0].contains("\"0\""));
        assert!(descriptors[1].contains("\"1\""));
        assert!(rendered(&output.field_arms)[1].contains("self . 1"));
    }

    #[test]
    fn raw_identifiers_are_unraw() {
        let output = expand(quote! {
            struct Event {
                r#type: String,
            }
        });
        assert!(rendered(&output.descriptors)[0].contains("\"type\""));
    }

    #[test]
    fn generic_fields_are_collected() {
        let output = expand(quote! {
            struct Envelope<T, M> {
                payload: Option<T>,
                _meta: PhantomData<M>,
            }
        });
        let used: Vec<_> = output.used_generics.iter().map(ToString::to_string).collect();
        assert_eq!(used, ["T"]);
    }

    #[test]
    fn unit_struct_has_no_fields() {
        let output = expand(quote! { struct Marker; });
        assert!(output.descriptors.is_empty());
        assert!(output.field_arms.is_empty());
    }
}
