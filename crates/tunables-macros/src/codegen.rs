//! Code generation for the derive macro.
//!
//! Generates the `TunableSet` implementation and the entry ID constants
//! from the validated IR.

use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};

use crate::ir::{DefaultValue, Number, TunableFieldIR, TunablesIR, ValueType};

/// Generate all code for the derive macro.
pub fn generate(ir: &TunablesIR) -> TokenStream {
    let const_ids = generate_const_ids(ir);
    let set_impl = generate_set_impl(ir);

    quote! {
        #const_ids
        #set_impl
    }
}

/// Generate an `EntryId` constant for each field.
fn generate_const_ids(ir: &TunablesIR) -> TokenStream {
    let struct_name = &ir.struct_name;
    let (impl_generics, ty_generics, where_clause) = ir.generics.split_for_impl();

    let const_defs: Vec<TokenStream> = ir
        .fields
        .iter()
        .map(|field| {
            let const_name = field.const_name();
            let hash = field.hash_id;
            let doc = format!("Entry ID of `{}`.", field.key());
            quote! {
                #[doc = #doc]
                pub const #const_name: ::tunables::core::EntryId = ::tunables::core::EntryId(#hash);
            }
        })
        .collect();

    quote! {
        #[allow(dead_code)]
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#const_defs)*
        }
    }
}

/// Generate the `TunableSet` trait implementation.
fn generate_set_impl(ir: &TunablesIR) -> TokenStream {
    let struct_name = &ir.struct_name;
    let (impl_generics, ty_generics, where_clause) = ir.generics.split_for_impl();

    let registry = format_ident!("registry");
    let field_inits: Vec<TokenStream> = ir
        .fields
        .iter()
        .map(|field| {
            let field_name = &field.field_name;
            let call = generate_register_call(field, &registry);
            quote! { #field_name: #call? }
        })
        .collect();

    let other_fields = &ir.other_fields;

    quote! {
        impl #impl_generics ::tunables::core::TunableSet for #struct_name #ty_generics #where_clause {
            fn register(
                #registry: &::tunables::core::Registry,
            ) -> ::tunables::core::TunablesResult<Self> {
                ::std::result::Result::Ok(Self {
                    #(#field_inits,)*
                    #(#other_fields: ::std::default::Default::default(),)*
                })
            }
        }
    }
}

/// Generate the registry call for one field.
fn generate_register_call(field: &TunableFieldIR, registry: &syn::Ident) -> TokenStream {
    let variant = format_ident!("{}", field.group_variant);
    let group = quote! { ::tunables::core::Group::#variant };
    let name = &field.name;

    if field.trigger {
        return quote! { #registry.register_trigger(#group, #name) };
    }

    if field.value_type == ValueType::Bool {
        let initial = matches!(field.default, Some(DefaultValue::Bool(true)));
        return quote! { #registry.register_toggle(#group, #name, #initial, true) };
    }

    if field.value_type == ValueType::Str {
        let initial = match &field.default {
            Some(DefaultValue::Str(s)) => s.clone(),
            _ => String::new(),
        };
        return quote! {
            #registry.register(#group, #name, ::std::string::String::from(#initial))
        };
    }

    let initial = field.numeric_default();
    match &field.range {
        Some(range) => {
            let initial = numeric_literal(field.value_type, initial.unwrap_or(range.start));
            let start = numeric_literal(field.value_type, range.start);
            let end = numeric_literal(field.value_type, range.end);
            quote! { #registry.register_bounded(#group, #name, #initial, #start..=#end) }
        }
        None => {
            let initial = numeric_literal(field.value_type, initial.unwrap_or(Number::Int(0)));
            quote! { #registry.register(#group, #name, #initial) }
        }
    }
}

/// A suffixed literal of the field's numeric type.
fn numeric_literal(value_type: ValueType, value: Number) -> Literal {
    match (value_type, value) {
        (ValueType::Int, Number::Int(v)) => Literal::i64_suffixed(v),
        // Float bounds on an integer field are rejected during validation
        (ValueType::Int, Number::Float(v)) => Literal::i64_suffixed(v as i64),
        (ValueType::F32, value) => Literal::f32_suffixed(value.as_f64() as f32),
        (_, value) => Literal::f64_suffixed(value.as_f64()),
    }
}
