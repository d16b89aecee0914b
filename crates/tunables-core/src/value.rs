//! Entry values.
//!
//! The registry stores heterogeneous entries uniformly as a [`Value`] sum
//! type over a closed set of scalars. Typed access goes through the
//! [`ValueType`] trait, implemented for exactly those scalars.

use std::fmt;

/// Tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    F32,
    F64,
    Str,
}

impl ValueKind {
    /// Returns true for kinds that can carry a `[min, max]` range.
    pub const fn is_numeric(self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::F32 | ValueKind::F64)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::F32 => "f32",
            ValueKind::F64 => "f64",
            ValueKind::Str => "string",
        };
        f.write_str(name)
    }
}

/// A type-erased entry value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    F32(f32),
    F64(f64),
    Str(String),
}

impl Value {
    /// Get the tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::F32(_) => ValueKind::F32,
            Value::F64(_) => ValueKind::F64,
            Value::Str(_) => ValueKind::Str,
        }
    }

    /// Numeric view of the value, if it has one.
    ///
    /// Booleans map to 0.0 / 1.0 so that toggles can be shown on numeric
    /// widgets.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Some(*i as f64),
            Value::F32(x) => Some(*x as f64),
            Value::F64(x) => Some(*x),
            Value::Str(_) => None,
        }
    }

    /// Build a value of `kind` from a plain number.
    ///
    /// Integers are rounded (saturating at the `i64` bounds), booleans are
    /// true above 0.5, strings get the formatted number.
    pub fn from_f64(kind: ValueKind, plain: f64) -> Value {
        match kind {
            ValueKind::Bool => Value::Bool(plain > 0.5),
            ValueKind::Int => Value::Int(plain.round() as i64),
            ValueKind::F32 => Value::F32(plain as f32),
            ValueKind::F64 => Value::F64(plain),
            ValueKind::Str => Value::Str(plain.to_string()),
        }
    }

    /// Returns false for NaN and infinite floats.
    pub fn is_finite(&self) -> bool {
        match self {
            Value::F32(x) => x.is_finite(),
            Value::F64(x) => x.is_finite(),
            _ => true,
        }
    }

    /// Clamp a numeric value into `[min, max]`.
    ///
    /// NaN clamps to `min`. Values whose kind differs from the bounds, and
    /// non-numeric values, are returned unchanged.
    pub fn clamped(self, min: &Value, max: &Value) -> Value {
        match (self, min, max) {
            (Value::Int(v), Value::Int(lo), Value::Int(hi)) => Value::Int(v.clamp(*lo, *hi)),
            (Value::F32(v), Value::F32(lo), Value::F32(_)) if v.is_nan() => Value::F32(*lo),
            (Value::F32(v), Value::F32(lo), Value::F32(hi)) => Value::F32(v.clamp(*lo, *hi)),
            (Value::F64(v), Value::F64(lo), Value::F64(_)) if v.is_nan() => Value::F64(*lo),
            (Value::F64(v), Value::F64(lo), Value::F64(hi)) => Value::F64(v.clamp(*lo, *hi)),
            (other, _, _) => other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::value_format::format(self))
    }
}

/// Scalar types that can be stored in an entry.
///
/// Implemented for `bool`, `i64`, `f32`, `f64` and `String`.
pub trait ValueType: Clone + Send + Sync + 'static {
    /// Tag stored for this type.
    const KIND: ValueKind;

    /// Wrap into a [`Value`].
    fn into_value(self) -> Value;

    /// Strict extraction: `None` unless `value` carries exactly this type.
    fn from_value(value: &Value) -> Option<Self>;

    /// Total extraction used by typed handles.
    ///
    /// Handles are only created for entries of the matching kind, so this
    /// is exact in practice; on a foreign tag it converts as best it can.
    fn coerce(value: &Value) -> Self;
}

/// Numeric scalars that can back a MinMax entry.
pub trait Numeric: ValueType + Copy + PartialOrd {}

impl ValueType for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn coerce(value: &Value) -> Self {
        match value {
            Value::Str(s) => crate::value_format::parse(ValueKind::Bool, s)
                .and_then(|v| Self::from_value(&v))
                .unwrap_or(false),
            other => other.as_f64().is_some_and(|x| x > 0.5),
        }
    }
}

impl ValueType for i64 {
    const KIND: ValueKind = ValueKind::Int;

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn coerce(value: &Value) -> Self {
        match value {
            Value::Int(i) => *i,
            Value::Str(s) => s.trim().parse().unwrap_or(0),
            other => other.as_f64().map_or(0, |x| x.round() as i64),
        }
    }
}

impl ValueType for f32 {
    const KIND: ValueKind = ValueKind::F32;

    fn into_value(self) -> Value {
        Value::F32(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::F32(x) => Some(*x),
            _ => None,
        }
    }

    fn coerce(value: &Value) -> Self {
        match value {
            Value::Str(s) => s.trim().parse().unwrap_or(0.0),
            other => other.as_f64().map_or(0.0, |x| x as f32),
        }
    }
}

impl ValueType for f64 {
    const KIND: ValueKind = ValueKind::F64;

    fn into_value(self) -> Value {
        Value::F64(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::F64(x) => Some(*x),
            _ => None,
        }
    }

    fn coerce(value: &Value) -> Self {
        match value {
            Value::Str(s) => s.trim().parse().unwrap_or(0.0),
            other => other.as_f64().unwrap_or(0.0),
        }
    }
}

impl ValueType for String {
    const KIND: ValueKind = ValueKind::Str;

    fn into_value(self) -> Value {
        Value::Str(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn coerce(value: &Value) -> Self {
        match value {
            Value::Str(s) => s.clone(),
            other => crate::value_format::format(other),
        }
    }
}

impl Numeric for i64 {}
impl Numeric for f32 {}
impl Numeric for f64 {}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::F32(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}
