use proc_macro::TokenStream;
use quote::{quote, quote_spanned};
use syn::spanned::Spanned;
use syn::{
    Attribute, Data, DeriveInput, Expr, ExprLit, Field, Fields, Lit, LitStr, Type,
    parse_macro_input,
};

/// Options collected from `#[nasctl(...)]` on a single field.
#[derive(Default)]
struct FieldOpts {
    default: Option<Expr>,
}

impl FieldOpts {
    fn parse(field: &Field) -> syn::Result<Self> {
        let mut opts = Self::default();
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("nasctl")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("default") {
                    opts.default = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error("unsupported nasctl field attribute"));
                }
                Ok(())
            })?;
        }
        Ok(opts)
    }
}

/// Derives `Overlay`, `ApplyDefaults` and, with `#[nasctl(try_into = "Target")]`,
/// a validating `TryFrom<Self> for Target`.
#[proc_macro_derive(Overlay, attributes(nasctl))]
pub fn derive_overlay(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.into_compile_error().into(),
    }
}

fn expand(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            input.ident.span(),
            "#[derive(Overlay)] only works on structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new(
            input.ident.span(),
            "#[derive(Overlay)] requires named fields",
        ));
    };

    let mut parsed = Vec::with_capacity(fields.named.len());
    for field in &fields.named {
        let opts = FieldOpts::parse(field)?;
        validate_field(field)?;
        parsed.push((field, opts));
    }

    let struct_name = &input.ident;

    let overlay = parsed.iter().map(|(f, _)| {
        let name = &f.ident;
        quote_spanned! {f.span()=>
            #name: crate::config::Overlay::overlay(self.#name, top.#name)
        }
    });

    let defaults = parsed.iter().map(|(f, opts)| {
        let name = &f.ident;
        match &opts.default {
            Some(expr @ Expr::Lit(ExprLit { lit: Lit::Str(_), .. })) => quote_spanned! {f.span()=>
                #name: self.#name.or_else(|| Some(
                    #expr.parse().expect(concat!("nasctl: invalid default value for field '", stringify!(#name), "'"))
                ))
            },
            Some(expr) => quote_spanned! {f.span()=>
                #name: self.#name.or_else(|| {
                    #[allow(clippy::useless_conversion)]
                    Some((#expr).into())
                })
            },
            None => quote_spanned! {f.span()=> #name: self.#name },
        }
    });

    let try_from = match target_type(&input.attrs)? {
        Some(target) => {
            let mapping = parsed.iter().map(|(f, opts)| convert_field(f, opts));
            quote! {
                impl TryFrom<#struct_name> for #target {
                    type Error = crate::error::NasError;

                    fn try_from(args: #struct_name) -> Result<Self, Self::Error> {
                        let args = <#struct_name as crate::config::ApplyDefaults>::apply_defaults(args);
                        Ok(Self {
                            #(#mapping),*
                        })
                    }
                }
            }
        }
        None => quote! {},
    };

    Ok(quote! {
        #[automatically_derived]
        impl crate::config::Overlay for #struct_name {
            fn overlay(self, top: Self) -> Self {
                Self { #(#overlay),* }
            }
        }

        #[automatically_derived]
        impl crate::config::ApplyDefaults for #struct_name {
            fn apply_defaults(self) -> Self {
                Self { #(#defaults),* }
            }
        }

        #try_from
    })
}

fn convert_field(f: &Field, opts: &FieldOpts) -> proc_macro2::TokenStream {
    let name = &f.ident;

    if !is_option(&f.ty) {
        let flattened = ["command", "clap", "arg", "serde"]
            .iter()
            .any(|key| has_attribute(&f.attrs, key, "flatten"));
        return if flattened {
            quote_spanned! {f.span()=> #name: args.#name.try_into()? }
        } else {
            quote_spanned! {f.span()=> #name: args.#name }
        };
    }

    if opts.default.is_some() {
        quote_spanned! {f.span()=>
            #name: args.#name.expect(concat!("nasctl: default missing for ", stringify!(#name)))
        }
    } else {
        let key = name
            .as_ref()
            .map(|n| n.to_string().replace('_', "-"))
            .unwrap_or_default();
        let msg = format!("missing required configuration field: {}", key);
        quote_spanned! {f.span()=>
            #name: args.#name.ok_or_else(|| crate::config::ConfigError::Validation(#msg.into()))?
        }
    }
}

/// Reads `#[nasctl(try_into = "Path::To::Target")]` from the struct attributes.
fn target_type(attrs: &[Attribute]) -> syn::Result<Option<syn::Path>> {
    let mut target = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("nasctl")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("try_into") {
                let lit: LitStr = meta.value()?.parse()?;
                target = Some(lit.parse::<syn::Path>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported nasctl struct attribute"))
            }
        })?;
    }
    Ok(target)
}

fn validate_field(field: &Field) -> syn::Result<()> {
    let clap_flatten = ["command", "clap", "arg"]
        .iter()
        .any(|k| has_attribute(&field.attrs, k, "flatten"));
    let serde_flatten = has_attribute(&field.attrs, "serde", "flatten");

    if clap_flatten != serde_flatten {
        return Err(syn::Error::new(
            field.span(),
            "nasctl: `flatten` must be set on both clap and serde.",
        ));
    }

    let clap_default = ["clap", "arg"].iter().any(|k| {
        has_attribute(&field.attrs, k, "default_value")
            || has_attribute(&field.attrs, k, "default_value_t")
    });
    if clap_default {
        return Err(syn::Error::new(
            field.span(),
            "nasctl: clap defaults shadow values from the config file.\n\
             Fix: use #[nasctl(default = ...)] instead.",
        ));
    }
    Ok(())
}

fn is_option(ty: &Type) -> bool {
    match ty {
        Type::Path(tp) => tp
            .path
            .segments
            .last()
            .is_some_and(|s| s.ident == "Option"),
        _ => false,
    }
}

fn has_attribute(attrs: &[Attribute], path_ident: &str, nested_ident: &str) -> bool {
    attrs.iter().any(|attr| {
        if !attr.path().is_ident(path_ident) {
            return false;
        }
        let mut found = false;
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(nested_ident) {
                found = true;
            }
            // Skip over `= value` so parsing can continue past it.
            if meta.input.peek(syn::Token![=]) {
                let _: Expr = meta.value()?.parse()?;
            }
            Ok(())
        });
        found
    })
}
