//! AST parsing for the derive macro.
//!
//! Transforms `syn::DeriveInput` into [`TunablesIR`].

use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Field, Fields};

use tunables_utils::fnv1a_32;

use crate::ir::{DefaultValue, Number, RangeSpec, TunableFieldIR, TunablesIR, ValueType, GROUPS};

/// Parse a `DeriveInput` into our intermediate representation.
pub fn parse(input: DeriveInput) -> syn::Result<TunablesIR> {
    let data_struct = match &input.data {
        Data::Struct(s) => s,
        Data::Enum(_) => {
            return Err(syn::Error::new_spanned(
                &input,
                "#[derive(Tunables)] only supports structs, not enums",
            ))
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                &input,
                "#[derive(Tunables)] only supports structs, not unions",
            ))
        }
    };

    let fields = match &data_struct.fields {
        Fields::Named(named) => &named.named,
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "#[derive(Tunables)] only supports structs with named fields",
            ))
        }
    };

    let default_group = parse_struct_group(&input)?;

    let mut parsed_fields = Vec::new();
    let mut other_fields = Vec::new();
    for field in fields {
        match parse_field(field, default_group.as_deref())? {
            Some(field_ir) => parsed_fields.push(field_ir),
            None => {
                if let Some(ident) = field.ident.clone() {
                    other_fields.push(ident);
                }
            }
        }
    }

    if parsed_fields.is_empty() {
        return Err(syn::Error::new_spanned(
            &input,
            "#[derive(Tunables)] requires at least one #[tunable] field",
        ));
    }

    Ok(TunablesIR {
        struct_name: input.ident.clone(),
        generics: input.generics.clone(),
        fields: parsed_fields,
        other_fields,
    })
}

/// Parse the optional struct-level `#[tunables(group = "...")]`.
fn parse_struct_group(input: &DeriveInput) -> syn::Result<Option<String>> {
    let mut group = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("tunables") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("group") {
                let value: syn::LitStr = meta.value()?.parse()?;
                group = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unknown attribute. Expected: group"))
            }
        })?;
    }
    Ok(group)
}

/// Parse a single field, returning None if it has no `#[tunable]` attribute.
fn parse_field(field: &Field, default_group: Option<&str>) -> syn::Result<Option<TunableFieldIR>> {
    for attr in &field.attrs {
        if attr.path().is_ident("tunable") {
            return parse_tunable_field(field, attr, default_group).map(Some);
        }
    }

    // A handle without the attribute would never be registered
    if extract_value_type(&field.ty).is_some() {
        return Err(syn::Error::new_spanned(
            field,
            "Tunable field is missing #[tunable(name = \"...\")] attribute",
        ));
    }

    Ok(None)
}

/// Parse a field with `#[tunable(...)]`.
///
/// `#[tunable(name = "Threshold", group = "TRACKING", default = 10, range = 0..=100)]`
/// or `#[tunable(name = "Reset", trigger)]`.
fn parse_tunable_field(
    field: &Field,
    attr: &syn::Attribute,
    default_group: Option<&str>,
) -> syn::Result<TunableFieldIR> {
    let field_name = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new_spanned(field, "Field must have a name"))?;

    let mut name: Option<String> = None;
    let mut group: Option<(String, proc_macro2::Span)> = None;
    let mut default: Option<DefaultValue> = None;
    let mut range: Option<RangeSpec> = None;
    let mut trigger = false;

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            let value: syn::LitStr = meta.value()?.parse()?;
            name = Some(value.value());
            Ok(())
        } else if meta.path.is_ident("group") {
            let value: syn::LitStr = meta.value()?.parse()?;
            group = Some((value.value(), value.span()));
            Ok(())
        } else if meta.path.is_ident("default") {
            let expr: syn::Expr = meta.value()?.parse()?;
            default = Some(parse_default_expr(&expr)?);
            Ok(())
        } else if meta.path.is_ident("range") {
            range = Some(parse_range_spec(&meta)?);
            Ok(())
        } else if meta.path.is_ident("trigger") {
            trigger = true;
            Ok(())
        } else {
            Err(meta.error("unknown attribute. Expected: name, group, default, range, trigger"))
        }
    })?;

    let name = name.ok_or_else(|| {
        syn::Error::new_spanned(
            attr,
            format!(
                "#[tunable] on field `{}` requires a name: #[tunable(name = \"...\")]",
                field_name
            ),
        )
    })?;

    if name.is_empty() || name.contains('/') {
        return Err(syn::Error::new_spanned(
            attr,
            format!("entry name '{}' must be non-empty and cannot contain '/'", name),
        ));
    }

    let (group_key, group_variant) = match group {
        Some((key, span)) => resolve_group(&key).ok_or_else(|| unknown_group(&key, span))?,
        None => match default_group {
            Some(key) => resolve_group(key).ok_or_else(|| unknown_group(key, attr.span()))?,
            None => {
                return Err(syn::Error::new_spanned(
                    attr,
                    format!(
                        "field `{}` has no group. Add `group = \"...\"` here or #[tunables(group = \"...\")] on the struct",
                        field_name
                    ),
                ))
            }
        },
    };

    let value_type = extract_value_type(&field.ty).ok_or_else(|| {
        syn::Error::new_spanned(
            &field.ty,
            "#[tunable] can only be used on Tunable<bool>, Tunable<i64>, Tunable<f32>, Tunable<f64> or Tunable<String> fields",
        )
    })?;

    let hash_id = fnv1a_32(&format!("{}/{}", group_key, name));

    Ok(TunableFieldIR {
        field_name,
        value_type,
        name,
        group_key: group_key.to_string(),
        group_variant,
        default,
        range,
        trigger,
        hash_id,
        span: attr.path().segments[0].ident.span(),
    })
}

/// Look up a group key (case-insensitive).
fn resolve_group(key: &str) -> Option<(&'static str, &'static str)> {
    GROUPS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
        .copied()
}

fn unknown_group(key: &str, span: proc_macro2::Span) -> syn::Error {
    let valid: Vec<&str> = GROUPS.iter().map(|(key, _)| *key).collect();
    syn::Error::new(
        span,
        format!("unknown group '{}'. Valid groups: {}", key, valid.join(", ")),
    )
}

/// Parse a default value expression.
fn parse_default_expr(expr: &syn::Expr) -> syn::Result<DefaultValue> {
    match expr {
        syn::Expr::Lit(lit) => match &lit.lit {
            syn::Lit::Bool(b) => Ok(DefaultValue::Bool(b.value())),
            syn::Lit::Int(i) => Ok(DefaultValue::Int(i.base10_parse()?)),
            syn::Lit::Float(f) => Ok(DefaultValue::Float(f.base10_parse()?)),
            syn::Lit::Str(s) => Ok(DefaultValue::Str(s.value())),
            _ => Err(syn::Error::new_spanned(
                lit,
                "default must be a bool, int, float or string literal",
            )),
        },
        syn::Expr::Unary(unary) if matches!(unary.op, syn::UnOp::Neg(_)) => {
            match parse_default_expr(&unary.expr)? {
                DefaultValue::Int(i) => Ok(DefaultValue::Int(-i)),
                DefaultValue::Float(f) => Ok(DefaultValue::Float(-f)),
                _ => Err(syn::Error::new_spanned(
                    unary,
                    "expected float or int literal after -",
                )),
            }
        }
        _ => Err(syn::Error::new_spanned(
            expr,
            "default must be a literal value (e.g., 0.5, -12, true, \"text\")",
        )),
    }
}

/// Parse a range specification from `range = start..=end`.
fn parse_range_spec(meta: &syn::meta::ParseNestedMeta) -> syn::Result<RangeSpec> {
    let expr: syn::ExprRange = meta.value()?.parse().map_err(|_| {
        syn::Error::new(
            meta.path.span(),
            "range must be an inclusive range expression like `0..=100`",
        )
    })?;

    if !matches!(expr.limits, syn::RangeLimits::Closed(_)) {
        return Err(syn::Error::new_spanned(
            &expr,
            "range must be inclusive (use ..= not ..)",
        ));
    }

    let start = expr
        .start
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(&expr, "range must have a start value"))?;
    let end = expr
        .end
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(&expr, "range must have an end value"))?;

    Ok(RangeSpec {
        start: eval_number(start)?,
        end: eval_number(end)?,
        span: expr.span(),
    })
}

/// Evaluate a numeric literal, possibly negated or parenthesized.
fn eval_number(expr: &syn::Expr) -> syn::Result<Number> {
    match expr {
        syn::Expr::Lit(lit) => match &lit.lit {
            syn::Lit::Int(i) => Ok(Number::Int(i.base10_parse()?)),
            syn::Lit::Float(f) => Ok(Number::Float(f.base10_parse()?)),
            _ => Err(syn::Error::new_spanned(lit, "expected float or integer literal")),
        },
        syn::Expr::Unary(unary) if matches!(unary.op, syn::UnOp::Neg(_)) => {
            match eval_number(&unary.expr)? {
                Number::Int(v) => Ok(Number::Int(-v)),
                Number::Float(v) => Ok(Number::Float(-v)),
            }
        }
        syn::Expr::Paren(paren) => eval_number(&paren.expr),
        _ => Err(syn::Error::new(
            expr.span(),
            "expected numeric literal (e.g., `100`, `-0.5`)",
        )),
    }
}

/// Extract `T` from `Tunable<T>` (any path ending in `Tunable`).
fn extract_value_type(ty: &syn::Type) -> Option<ValueType> {
    let syn::Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Tunable" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(syn::Type::Path(inner)) => {
            let ident = inner.path.segments.last()?.ident.to_string();
            ValueType::from_ident(&ident)
        }
        _ => None,
    }
}
