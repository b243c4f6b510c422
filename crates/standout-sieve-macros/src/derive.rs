//! Implementation of the `#[derive(Attributes)]` macro.
//!
//! Generates an implementation of `standout_sieve::Attributes` plus one
//! field name constant per exposed field.

use proc_macro2::{Ident, TokenStream, TokenTree};
use quote::{format_ident, quote, ToTokens};
use syn::{parse_quote, spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use crate::attrs::parse_sieve_attrs;

/// Main implementation of the Attributes derive macro.
pub fn attributes_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Attributes can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Attributes can only be derived for structs",
            ))
        }
    };

    let mut field_matches: Vec<TokenStream> = Vec::new();
    let mut field_constants: Vec<TokenStream> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    // Exposed fields whose type uses a type parameter need an AsValue bound
    let type_params: Vec<Ident> = input
        .generics
        .type_params()
        .map(|param| param.ident.clone())
        .collect();
    let mut bounded = input.generics.clone();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let sieve_attrs = parse_sieve_attrs(&field.attrs)?;
        if sieve_attrs.skip {
            continue;
        }

        let attr_name = sieve_attrs
            .rename
            .unwrap_or_else(|| field_name.to_string().trim_start_matches("r#").to_string());

        if seen.contains(&attr_name) {
            return Err(Error::new(
                field.span(),
                format!("duplicate attribute name '{}'", attr_name),
            ));
        }
        seen.push(attr_name.clone());

        if mentions_any(field.ty.to_token_stream(), &type_params) {
            let ty = &field.ty;
            bounded
                .make_where_clause()
                .predicates
                .push(parse_quote!(#ty: ::standout_sieve::AsValue));
        }

        let const_name = format_ident!("{}", to_screaming_snake_case(&attr_name));
        let doc = format!("Filter key for the `{}` attribute.", attr_name);

        field_constants.push(quote! {
            #[doc = #doc]
            pub const #const_name: &'static str = #attr_name;
        });

        field_matches.push(quote! {
            #attr_name => ::core::option::Option::Some(
                ::standout_sieve::AsValue::as_value(&self.#field_name)
            ),
        });
    }

    let (bounded_impl_generics, _, bounded_where_clause) = bounded.split_for_impl();

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#field_constants)*
        }

        impl #bounded_impl_generics ::standout_sieve::Attributes for #struct_name #ty_generics #bounded_where_clause {
            fn attribute(&self, name: &str) -> ::core::option::Option<::standout_sieve::Value<'_>> {
                match name {
                    #(#field_matches)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    };

    Ok(expanded)
}

/// Returns `true` if `tokens` name any of `params`, at any depth.
fn mentions_any(tokens: TokenStream, params: &[Ident]) -> bool {
    tokens.into_iter().any(|tree| match tree {
        TokenTree::Ident(ident) => params.contains(&ident),
        TokenTree::Group(group) => mentions_any(group.stream(), params),
        _ => false,
    })
}

/// Convert a string to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c.is_alphanumeric() {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = true;
        } else {
            // Separators and anything else not valid in an identifier
            result.push('_');
            prev_was_lower = false;
        }
    }

    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }

    result
}
