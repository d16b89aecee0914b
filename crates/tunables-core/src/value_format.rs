//! Value formatting and parsing.
//!
//! Text fields on a control surface round-trip every value type through a
//! string. [`format`] produces the seed text for a field and [`parse`] turns
//! user input back into a [`Value`] of the entry's kind.
//!
//! # Example
//!
//! ```
//! use tunables_core::value::{Value, ValueKind};
//! use tunables_core::value_format::{format, parse};
//!
//! assert_eq!(format(&Value::F32(0.5)), "0.5");
//! assert_eq!(parse(ValueKind::Int, " 42 "), Some(Value::Int(42)));
//! assert_eq!(parse(ValueKind::Bool, "on"), Some(Value::Bool(true)));
//! assert_eq!(parse(ValueKind::F64, "fast"), None);
//! ```

use crate::value::{Value, ValueKind};

/// Format a value for display in a text field.
///
/// Floats use Rust's shortest round-trip representation, so parsing the
/// result yields the same value.
pub fn format(value: &Value) -> String {
    match value {
        Value::Bool(b) => {
            if *b {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        Value::Int(i) => i.to_string(),
        Value::F32(x) => x.to_string(),
        Value::F64(x) => x.to_string(),
        Value::Str(s) => s.clone(),
    }
}

/// Parse text into a value of `kind`.
///
/// Returns `None` if the text cannot be parsed. Surrounding whitespace is
/// ignored for every kind except strings, and non-finite floats are rejected
/// because they cannot be compared or clamped.
pub fn parse(kind: ValueKind, s: &str) -> Option<Value> {
    if kind == ValueKind::Str {
        return Some(Value::Str(s.to_string()));
    }

    let s = s.trim();

    match kind {
        ValueKind::Bool => match s.to_lowercase().as_str() {
            "on" | "true" | "yes" | "1" | "enabled" => Some(Value::Bool(true)),
            "off" | "false" | "no" | "0" | "disabled" => Some(Value::Bool(false)),
            _ => None,
        },

        ValueKind::Int => s.parse::<i64>().ok().map(Value::Int),

        ValueKind::F32 => s
            .parse::<f32>()
            .ok()
            .filter(|x| x.is_finite())
            .map(Value::F32),

        ValueKind::F64 => s
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .map(Value::F64),

        ValueKind::Str => Some(Value::Str(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float_round_trips() {
        let text = format(&Value::F32(0.1));
        assert_eq!(parse(ValueKind::F32, &text), Some(Value::F32(0.1)));
    }

    #[test]
    fn test_parse_bool_aliases() {
        assert_eq!(parse(ValueKind::Bool, "Yes"), Some(Value::Bool(true)));
        assert_eq!(parse(ValueKind::Bool, "disabled"), Some(Value::Bool(false)));
        assert_eq!(parse(ValueKind::Bool, "maybe"), None);
    }

    #[test]
    fn test_parse_int_rejects_fraction() {
        assert_eq!(parse(ValueKind::Int, "+7"), Some(Value::Int(7)));
        assert_eq!(parse(ValueKind::Int, "7.5"), None);
        assert_eq!(parse(ValueKind::Int, ""), None);
    }

    #[test]
    fn test_parse_rejects_non_finite() {
        assert_eq!(parse(ValueKind::F64, "NaN"), None);
        assert_eq!(parse(ValueKind::F32, "inf"), None);
    }

    #[test]
    fn test_parse_string_keeps_whitespace() {
        assert_eq!(
            parse(ValueKind::Str, "  padded "),
            Some(Value::Str("  padded ".to_string()))
        );
    }
}
