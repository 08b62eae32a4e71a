// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashSet;
use syn::{parse_macro_input, Data, DeriveInput, Expr, ExprLit, ExprUnary, Fields, Lit, LitStr, UnOp};

/// Per-field options from `#[fieldmap(...)]`.
#[derive(Default)]
struct FieldAttrs {
    skip: bool,
    rename: Option<String>,
    read_only: bool,
    write_only: bool,
}

/// A struct field that takes part in mapping.
struct MappedField {
    ident: syn::Ident,
    ty: syn::Type,
    name: String,
    readable: bool,
    writable: bool,
}

/// `#[derive(Mappable)]` macro: generates `TypeInfo`, `Mappable`,
/// `ToDynamicValue` and `FromDynamicValue` for a struct with named fields.
///
/// The struct must implement `Default`; it is the starting point of every
/// mapped target. Field types must implement `TypeInfo` and the dynamic value
/// conversions (primitives, `String`, `Duration`, `Uuid`, `Option`, `Box`,
/// `Vec`, arrays, `DynamicValue` and other derived types all do).
///
/// Attributes:
/// - `#[fieldmap(skip)]`: field is invisible to the mapper
/// - `#[fieldmap(rename = "Name")]`: field is matched under another name
/// - `#[fieldmap(read_only)]`: field is a source only
/// - `#[fieldmap(write_only)]`: field is a target only
///
/// Example:
/// ```ignore
/// use fieldmap::Mappable;
///
/// #[derive(Mappable, Default)]
/// struct Invoice {
///     id: u64,
///     #[fieldmap(rename = "Customer")]
///     customer_name: String,
///     lines: Vec<InvoiceLine>,
///     #[fieldmap(skip)]
///     cached_total: Option<f64>,
/// }
/// ```
#[proc_macro_derive(Mappable, attributes(fieldmap))]
pub fn derive_mappable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_mappable(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// `#[derive(MappableEnum)]` macro: generates `TypeInfo`, `ToDynamicValue`
/// and `FromDynamicValue` for a unit-only enum.
///
/// Integer literal discriminants are kept as variant values; other variants
/// count up from the previous one. The variant with value 0, or the first one
/// when none has it, is the default the mapper falls back to.
///
/// Example:
/// ```ignore
/// use fieldmap::MappableEnum;
///
/// #[derive(MappableEnum, Default)]
/// enum Priority {
///     #[default]
///     Low = 1,
///     High = 10,
///     Urgent,       // 11
/// }
/// ```
#[proc_macro_derive(MappableEnum)]
pub fn derive_mappable_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_enum(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn reject_generics(input: &DeriveInput) -> syn::Result<()> {
    if input.generics.params.is_empty() {
        Ok(())
    } else {
        Err(syn::Error::new_spanned(
            &input.generics,
            "fieldmap derives do not support generic types",
        ))
    }
}

fn parse_field_attrs(field: &syn::Field) -> syn::Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("fieldmap") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                attrs.skip = true;
            } else if meta.path.is_ident("read_only") {
                attrs.read_only = true;
            } else if meta.path.is_ident("write_only") {
                attrs.write_only = true;
            } else if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                attrs.rename = Some(lit.value());
            } else {
                return Err(meta.error("expected `skip`, `rename`, `read_only` or `write_only`"));
            }
            Ok(())
        })?;
    }
    if attrs.read_only && attrs.write_only {
        return Err(syn::Error::new_spanned(
            field,
            "a field cannot be both read_only and write_only",
        ));
    }
    Ok(attrs)
}

fn collect_fields(input: &DeriveInput) -> syn::Result<Vec<MappedField>> {
    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(f) => &f.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Only structs with named fields are supported",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Only structs are supported; use MappableEnum for enums",
            ))
        }
    };

    let mut fields = Vec::new();
    let mut seen = HashSet::new();
    for field in named {
        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "Field must have a name"));
        };
        let attrs = parse_field_attrs(field)?;
        if attrs.skip {
            continue;
        }
        let name = attrs.rename.unwrap_or_else(|| ident.to_string());
        if !seen.insert(name.clone()) {
            return Err(syn::Error::new_spanned(
                field,
                format!("duplicate mapped field name `{name}`"),
            ));
        }
        fields.push(MappedField {
            ident: ident.clone(),
            ty: field.ty.clone(),
            name,
            readable: !attrs.write_only,
            writable: !attrs.read_only,
        });
    }
    Ok(fields)
}

#[allow(clippy::too_many_lines)]
fn expand_mappable(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    reject_generics(input)?;
    let name = &input.ident;
    let fields = collect_fields(input)?;
    let count = fields.len();

    // Descriptor fields, in declaration order
    let field_descs: Vec<_> = fields
        .iter()
        .enumerate()
        .map(|(index, f)| {
            let ty = &f.ty;
            let name_str = &f.name;
            let id = u32::try_from(index).unwrap_or(u32::MAX);
            let access = match (f.readable, f.writable) {
                (true, false) => quote! { .read_only() },
                (false, true) => quote! { .write_only() },
                _ => quote! {},
            };
            quote! {
                ::fieldmap::dynamic::FieldDescriptor::new(
                    #name_str,
                    <#ty as ::fieldmap::reflect::TypeInfo>::field_type(),
                )
                .nullable(<#ty as ::fieldmap::reflect::TypeInfo>::NULLABLE)
                .with_id(#id)
                #access
            }
        })
        .collect();

    let read_arms: Vec<_> = fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.readable)
        .map(|(index, f)| {
            let ident = &f.ident;
            quote! {
                #index => Some(::fieldmap::dynamic::ToDynamicValue::to_dynamic(&self.#ident)),
            }
        })
        .collect();

    let write_arms: Vec<_> = fields
        .iter()
        .enumerate()
        .map(|(index, f)| {
            let ident = &f.ident;
            let ty = &f.ty;
            let name_str = &f.name;
            if f.writable {
                quote! {
                    #index => {
                        self.#ident =
                            <#ty as ::fieldmap::dynamic::FromDynamicValue>::from_dynamic(&value)?;
                        Ok(())
                    }
                }
            } else {
                quote! {
                    #index => Err(::fieldmap::dynamic::DynamicDataError::ReadOnly(
                        #name_str.to_string(),
                    )),
                }
            }
        })
        .collect();

    let to_entries: Vec<_> = fields
        .iter()
        .map(|f| {
            let ident = &f.ident;
            let name_str = &f.name;
            quote! {
                map.insert(
                    #name_str.to_string(),
                    ::fieldmap::dynamic::ToDynamicValue::to_dynamic(&self.#ident),
                );
            }
        })
        .collect();

    let from_entries: Vec<_> = fields
        .iter()
        .map(|f| {
            let ident = &f.ident;
            let ty = &f.ty;
            let name_str = &f.name;
            quote! {
                if let Some(v) = map.get(#name_str) {
                    out.#ident = <#ty as ::fieldmap::dynamic::FromDynamicValue>::from_dynamic(v)?;
                }
            }
        })
        .collect();

    Ok(quote! {
        impl ::fieldmap::reflect::TypeInfo for #name {
            fn type_descriptor() -> ::fieldmap::dynamic::TypeDescriptor {
                ::fieldmap::dynamic::TypeDescriptor::native(
                    ::std::any::type_name::<Self>(),
                    ::fieldmap::dynamic::TypeKind::Struct(vec![
                        #(#field_descs),*
                    ]),
                )
            }

            // Deferred so that self-referential types stay finite.
            fn field_type() -> ::std::sync::Arc<::fieldmap::dynamic::TypeDescriptor> {
                ::std::sync::Arc::new(::fieldmap::dynamic::TypeDescriptor::nested(
                    ::fieldmap::dynamic::TypeRef::deferred(
                        ::std::any::type_name::<Self>(),
                        <Self as ::fieldmap::reflect::TypeInfo>::type_descriptor,
                    ),
                ))
            }
        }

        impl ::fieldmap::reflect::Mappable for #name {
            fn read_field(&self, index: usize) -> Option<::fieldmap::dynamic::DynamicValue> {
                match index {
                    #(#read_arms)*
                    _ => None,
                }
            }

            #[allow(unused_variables)]
            fn write_field(
                &mut self,
                index: usize,
                value: ::fieldmap::dynamic::DynamicValue,
            ) -> ::std::result::Result<(), ::fieldmap::dynamic::DynamicDataError> {
                match index {
                    #(#write_arms)*
                    _ => Err(::fieldmap::dynamic::DynamicDataError::IndexOutOfBounds {
                        index,
                        length: #count,
                    }),
                }
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }

        impl ::fieldmap::dynamic::ToDynamicValue for #name {
            #[allow(unused_mut)]
            fn to_dynamic(&self) -> ::fieldmap::dynamic::DynamicValue {
                let mut map = ::std::collections::HashMap::with_capacity(#count);
                #(#to_entries)*
                ::fieldmap::dynamic::DynamicValue::Struct(map)
            }
        }

        impl ::fieldmap::dynamic::FromDynamicValue for #name {
            #[allow(unused_mut, unused_variables)]
            fn from_dynamic(
                value: &::fieldmap::dynamic::DynamicValue,
            ) -> ::std::result::Result<Self, ::fieldmap::dynamic::DynamicDataError> {
                match value {
                    ::fieldmap::dynamic::DynamicValue::Struct(map) => {
                        let mut out = <Self as ::std::default::Default>::default();
                        #(#from_entries)*
                        Ok(out)
                    }
                    other => Err(::fieldmap::dynamic::DynamicDataError::TypeMismatch {
                        expected: ::std::any::type_name::<Self>().to_string(),
                        got: other.kind_name().to_string(),
                    }),
                }
            }
        }
    })
}

fn expand_enum(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    reject_generics(input)?;
    let name = &input.ident;
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "MappableEnum only supports enums; use Mappable for structs",
        ));
    };
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            input,
            "MappableEnum needs at least one variant",
        ));
    }

    let mut variants = Vec::with_capacity(data.variants.len());
    let mut values = HashSet::new();
    let mut next: i64 = 0;
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "MappableEnum only supports unit variants",
            ));
        }
        let value = match &variant.discriminant {
            Some((_, expr)) => discriminant_value(expr)?,
            None => next,
        };
        if !values.insert(value) {
            return Err(syn::Error::new_spanned(
                variant,
                format!("duplicate variant value {value}"),
            ));
        }
        next = value.wrapping_add(1);
        variants.push((variant.ident.clone(), variant.ident.to_string(), value));
    }

    let descriptor_variants = variants.iter().map(|(_, name_str, value)| {
        quote! { ::fieldmap::dynamic::EnumVariant::new(#name_str, #value) }
    });
    let to_arms = variants.iter().map(|(ident, name_str, value)| {
        quote! {
            Self::#ident => ::fieldmap::dynamic::DynamicValue::Enum(#value, #name_str.to_string()),
        }
    });
    let by_name = variants.iter().map(|(ident, name_str, _)| {
        quote! { #name_str => Ok(Self::#ident), }
    });
    let by_value = variants.iter().map(|(ident, _, value)| {
        quote! { #value => Ok(Self::#ident), }
    });

    Ok(quote! {
        impl ::fieldmap::reflect::TypeInfo for #name {
            fn type_descriptor() -> ::fieldmap::dynamic::TypeDescriptor {
                ::fieldmap::dynamic::TypeDescriptor::native(
                    ::std::any::type_name::<Self>(),
                    ::fieldmap::dynamic::TypeKind::Enum(::fieldmap::dynamic::EnumDescriptor::new(
                        vec![#(#descriptor_variants),*],
                    )),
                )
            }
        }

        impl ::fieldmap::dynamic::ToDynamicValue for #name {
            fn to_dynamic(&self) -> ::fieldmap::dynamic::DynamicValue {
                match self {
                    #(#to_arms)*
                }
            }
        }

        impl ::fieldmap::dynamic::FromDynamicValue for #name {
            fn from_dynamic(
                value: &::fieldmap::dynamic::DynamicValue,
            ) -> ::std::result::Result<Self, ::fieldmap::dynamic::DynamicDataError> {
                let mismatch = || ::fieldmap::dynamic::DynamicDataError::TypeMismatch {
                    expected: ::std::any::type_name::<Self>().to_string(),
                    got: value.to_string(),
                };
                match value {
                    ::fieldmap::dynamic::DynamicValue::Enum(raw, variant) => match variant.as_str() {
                        #(#by_name)*
                        _ => match *raw {
                            #(#by_value)*
                            _ => Err(mismatch()),
                        },
                    },
                    _ => Err(mismatch()),
                }
            }
        }
    })
}

/// Value of an integer literal discriminant, optionally negated.
fn discriminant_value(expr: &Expr) -> syn::Result<i64> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(int), ..
        }) => int.base10_parse::<i64>(),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => discriminant_value(expr).map(i64::wrapping_neg),
        Expr::Group(group) => discriminant_value(&group.expr),
        other => Err(syn::Error::new_spanned(
            other,
            "MappableEnum discriminants must be integer literals",
        )),
    }
}
