//! Attribute parsing for the `Attributes` derive macro.
//!
//! Parses the `#[sieve(...)]` field attributes.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Lit, Meta, Result, Token,
};

/// Field-level attributes from `#[sieve(...)]`.
#[derive(Debug, Clone)]
pub struct SieveAttr {
    /// Leave this field out of field resolution.
    pub skip: bool,
    /// Name used in filter keys (default: the field name).
    pub rename: Option<String>,
    /// The span for error reporting.
    pub span: Span,
}

impl Default for SieveAttr {
    fn default() -> Self {
        SieveAttr {
            skip: false,
            rename: None,
            span: Span::call_site(),
        }
    }
}

impl Parse for SieveAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = SieveAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => {
                    attr.skip = true;
                    attr.span = p.span();
                }

                // rename = "custom_name"
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    if let syn::Expr::Lit(syn::ExprLit {
                        lit: Lit::Str(s), ..
                    }) = &nv.value
                    {
                        if s.value().is_empty() {
                            return Err(Error::new(s.span(), "rename must not be empty"));
                        }
                        attr.rename = Some(s.value());
                        attr.span = s.span();
                    } else {
                        return Err(Error::new(
                            nv.value.span(),
                            "rename must be a string literal",
                        ));
                    }
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown sieve attribute. Expected: skip or rename = \"...\"",
                    ));
                }
            }
        }

        if attr.skip && attr.rename.is_some() {
            return Err(Error::new(attr.span, "a skipped field cannot be renamed"));
        }

        Ok(attr)
    }
}

/// Extract `#[sieve(...)]` attributes from a field's attributes.
pub fn parse_sieve_attrs(attrs: &[Attribute]) -> Result<SieveAttr> {
    for attr in attrs {
        if attr.path().is_ident("sieve") {
            return attr.parse_args::<SieveAttr>();
        }
    }
    Ok(SieveAttr::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_sieve(tokens: &str) -> Result<SieveAttr> {
        syn::parse_str::<SieveAttr>(tokens)
    }

    #[test]
    fn test_empty() {
        let attr = parse_sieve("").unwrap();
        assert!(!attr.skip);
        assert_eq!(attr.rename, None);
    }

    #[test]
    fn test_skip() {
        let attr = parse_sieve("skip").unwrap();
        assert!(attr.skip);
    }

    #[test]
    fn test_rename() {
        let attr = parse_sieve(r#"rename = "createdAt""#).unwrap();
        assert_eq!(attr.rename, Some("createdAt".to_string()));
    }

    #[test]
    fn test_rename_requires_string() {
        let err = parse_sieve("rename = 3").unwrap_err();
        assert!(err.to_string().contains("string literal"));
    }

    #[test]
    fn test_empty_rename() {
        assert!(parse_sieve(r#"rename = """#).is_err());
    }

    #[test]
    fn test_skip_with_rename() {
        let err = parse_sieve(r#"skip, rename = "x""#).unwrap_err();
        assert!(err.to_string().contains("cannot be renamed"));
    }

    #[test]
    fn test_unknown() {
        let err = parse_sieve("String").unwrap_err();
        assert!(err.to_string().contains("unknown sieve attribute"));
    }

    #[test]
    fn test_parse_from_field_attrs() {
        let input: syn::DeriveInput = syn::parse_quote! {
            struct Task {
                #[serde(default)]
                #[sieve(rename = "title")]
                name: String,
                done: bool,
            }
        };
        let syn::Data::Struct(data) = input.data else {
            panic!("expected struct");
        };
        let fields: Vec<&syn::Field> = data.fields.iter().collect();
        let attr = parse_sieve_attrs(&fields[0].attrs).unwrap();
        assert_eq!(attr.rename.as_deref(), Some("title"));
        assert!(!parse_sieve_attrs(&fields[1].attrs).unwrap().skip);
    }
}
