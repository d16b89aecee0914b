//! Semantic validation for the derive macro.

use std::collections::HashMap;

use crate::ir::{DefaultValue, Number, TunableFieldIR, TunablesIR, ValueType};

/// Validate the IR for semantic correctness.
pub fn validate(ir: &TunablesIR) -> syn::Result<()> {
    check_unique_keys(ir)?;
    check_no_hash_collisions(ir)?;
    for field in &ir.fields {
        validate_field(field)?;
    }
    Ok(())
}

/// Check that no two fields name the same (group, name).
fn check_unique_keys(ir: &TunablesIR) -> syn::Result<()> {
    let mut seen: HashMap<String, &syn::Ident> = HashMap::new();

    for field in &ir.fields {
        let key = field.key();
        if let Some(first_field) = seen.get(&key) {
            return Err(syn::Error::new(
                field.span,
                format!(
                    "Duplicate entry \"{}\": already used by field `{}`",
                    key, first_field
                ),
            ));
        }
        seen.insert(key, &field.field_name);
    }

    Ok(())
}

/// Check that no two entry keys hash to the same ID.
fn check_no_hash_collisions(ir: &TunablesIR) -> syn::Result<()> {
    let mut seen: HashMap<u32, String> = HashMap::new();

    for field in &ir.fields {
        if let Some(first_key) = seen.get(&field.hash_id) {
            return Err(syn::Error::new(
                field.span,
                format!(
                    "Entry ID hash collision: \"{}\" and \"{}\" both hash to 0x{:08x}. \
                     Rename one of these entries to avoid the collision.",
                    field.key(),
                    first_key,
                    field.hash_id
                ),
            ));
        }
        seen.insert(field.hash_id, field.key());
    }

    Ok(())
}

fn validate_field(field: &TunableFieldIR) -> syn::Result<()> {
    validate_trigger(field)?;
    validate_default_type(field)?;
    validate_range(field)?;
    Ok(())
}

/// Triggers are bool buttons resting at `false`.
fn validate_trigger(field: &TunableFieldIR) -> syn::Result<()> {
    if !field.trigger {
        return Ok(());
    }
    if field.value_type != ValueType::Bool {
        return Err(syn::Error::new(
            field.span,
            "`trigger` can only be used on Tunable<bool> fields",
        ));
    }
    if field.default.is_some() || field.range.is_some() {
        return Err(syn::Error::new(
            field.span,
            "`trigger` entries take no default or range",
        ));
    }
    Ok(())
}

/// Check that the default literal fits the field's value type.
fn validate_default_type(field: &TunableFieldIR) -> syn::Result<()> {
    let default = match &field.default {
        Some(default) => default,
        None => return Ok(()),
    };

    let fits = matches!(
        (field.value_type, default),
        (ValueType::Bool, DefaultValue::Bool(_))
            | (ValueType::Int, DefaultValue::Int(_))
            | (ValueType::F32 | ValueType::F64, DefaultValue::Int(_) | DefaultValue::Float(_))
            | (ValueType::Str, DefaultValue::Str(_))
    );

    if !fits {
        return Err(syn::Error::new(
            field.span,
            format!(
                "default {:?} does not fit a {:?} entry",
                default, field.value_type
            ),
        ));
    }
    Ok(())
}

/// Validate range placement, ordering and the default's position.
fn validate_range(field: &TunableFieldIR) -> syn::Result<()> {
    let range = match &field.range {
        Some(range) => range,
        None => return Ok(()),
    };

    if !field.value_type.is_numeric() {
        return Err(syn::Error::new(
            range.span,
            "range can only be used on Tunable<i64>, Tunable<f32> or Tunable<f64> fields",
        ));
    }

    if field.value_type == ValueType::Int {
        return match (range.start, range.end) {
            (Number::Int(start), Number::Int(end)) => {
                let default = match field.default {
                    Some(DefaultValue::Int(v)) => Some(v),
                    _ => None,
                };
                check_bounds(field, range.span, start, end, default)
            }
            _ => Err(syn::Error::new(
                range.span,
                "range of a Tunable<i64> must use integer bounds",
            )),
        };
    }

    let default = field.numeric_default().map(Number::as_f64);
    check_bounds(
        field,
        range.span,
        range.start.as_f64(),
        range.end.as_f64(),
        default,
    )
}

/// Check `start <= end` and that the default, if any, lies in between.
fn check_bounds<T: PartialOrd + std::fmt::Display>(
    field: &TunableFieldIR,
    span: proc_macro2::Span,
    start: T,
    end: T,
    default: Option<T>,
) -> syn::Result<()> {
    if start > end {
        return Err(syn::Error::new(
            span,
            format!(
                "invalid range: start ({}) must not exceed end ({})",
                start, end
            ),
        ));
    }

    match default {
        Some(default) if default < start || default > end => Err(syn::Error::new(
            field.span,
            format!(
                "default value {} is outside range {}..={}",
                default, start, end
            ),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use syn::parse_quote;

    fn check(input: syn::DeriveInput) -> syn::Result<()> {
        validate(&parse(input)?)
    }

    #[test]
    fn test_valid_struct() {
        let result = check(parse_quote! {
            #[tunables(group = "LOOP_CLOSING")]
            struct LoopClosing {
                #[tunable(name = "Min Score", default = 0.05, range = 0.0..=1.0)]
                min_score: Tunable<f64>,
                #[tunable(name = "Candidates", default = 5)]
                candidates: Tunable<i64>,
                #[tunable(name = "Vocabulary", default = "orb.txt")]
                vocabulary: Tunable<String>,
            }
        });
        assert!(result.is_ok());
    }

    #[test]
    fn test_duplicate_entry() {
        let result = check(parse_quote! {
            #[tunables(group = "VISUAL")]
            struct Twice {
                #[tunable(name = "Show")]
                a: Tunable<bool>,
                #[tunable(name = "Show")]
                b: Tunable<bool>,
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_same_name_in_other_group() {
        let result = check(parse_quote! {
            #[tunables(group = "VISUAL")]
            struct Split {
                #[tunable(name = "Enabled")]
                a: Tunable<bool>,
                #[tunable(name = "Enabled", group = "TRACKING")]
                b: Tunable<bool>,
            }
        });
        assert!(result.is_ok());
    }

    #[test]
    fn test_default_outside_range() {
        let result = check(parse_quote! {
            #[tunables(group = "TRACKING")]
            struct Outside {
                #[tunable(name = "Threshold", default = 500, range = 0..=100)]
                threshold: Tunable<i64>,
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_large_int_bounds_compare_exactly() {
        // Both values round to the same f64
        let result = check(parse_quote! {
            #[tunables(group = "TRACKING")]
            struct Large {
                #[tunable(name = "Seed", default = 9007199254740993, range = 0..=9007199254740992)]
                seed: Tunable<i64>,
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_float_bounds_on_int() {
        let result = check(parse_quote! {
            #[tunables(group = "TRACKING")]
            struct FloatBounds {
                #[tunable(name = "Threshold", range = 0.0..=1.0)]
                threshold: Tunable<i64>,
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_range_on_bool() {
        let result = check(parse_quote! {
            #[tunables(group = "VISUAL")]
            struct BoolRange {
                #[tunable(name = "Show", range = 0..=1)]
                show: Tunable<bool>,
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_default_type_mismatch() {
        let result = check(parse_quote! {
            #[tunables(group = "TRACKING")]
            struct Mismatch {
                #[tunable(name = "Threshold", default = 0.5)]
                threshold: Tunable<i64>,
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_trigger_with_default() {
        let result = check(parse_quote! {
            #[tunables(group = "GENERAL")]
            struct Button {
                #[tunable(name = "Reset", trigger, default = true)]
                reset: Tunable<bool>,
            }
        });
        assert!(result.is_err());
    }
}
