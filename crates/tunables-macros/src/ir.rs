//! Intermediate representation for the derive macro.
//!
//! A parsed `#[derive(Tunables)]` struct, after AST parsing but before code
//! generation.

use proc_macro2::Span;

/// Group keys and the `Group` variants they name.
pub const GROUPS: [(&str, &str); 8] = [
    ("GENERAL", "General"),
    ("VISUAL", "Visual"),
    ("EXTRACTOR", "Extractor"),
    ("TRACKING", "Tracking"),
    ("INITIALIZATION", "Initialization"),
    ("RELOCALIZATION", "Relocalization"),
    ("LOCAL_MAPPING", "LocalMapping"),
    ("LOOP_CLOSING", "LoopClosing"),
];

/// Intermediate representation of a tunables struct.
pub struct TunablesIR {
    /// The struct name (e.g., `TrackingTunables`)
    pub struct_name: syn::Ident,
    /// Generic parameters, if any
    pub generics: syn::Generics,
    /// All entry fields, in declaration order
    pub fields: Vec<TunableFieldIR>,
    /// Fields without `#[tunable]`, filled with `Default::default()`
    pub other_fields: Vec<syn::Ident>,
}

/// One `Tunable<T>` field.
pub struct TunableFieldIR {
    /// Field name (e.g., `threshold`)
    pub field_name: syn::Ident,
    /// Stored value type
    pub value_type: ValueType,
    /// Entry name from `name = "..."`
    pub name: String,
    /// Group key (upper case, e.g. `TRACKING`)
    pub group_key: String,
    /// Group variant ident (e.g. `Tracking`)
    pub group_variant: &'static str,
    pub default: Option<DefaultValue>,
    pub range: Option<RangeSpec>,
    /// Momentary button instead of a checkbox
    pub trigger: bool,
    /// FNV-1a hash of `"<GROUP>/<name>"`
    pub hash_id: u32,
    /// Span for error reporting
    pub span: Span,
}

/// Scalar type inside `Tunable<...>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Int,
    F32,
    F64,
    Str,
}

impl ValueType {
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "bool" => Some(ValueType::Bool),
            "i64" => Some(ValueType::Int),
            "f32" => Some(ValueType::F32),
            "f64" => Some(ValueType::F64),
            "String" => Some(ValueType::Str),
            _ => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Int | ValueType::F32 | ValueType::F64)
    }
}

/// Literal from `default = ...`.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Numeric literal, kept exact for integers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

/// Bounds from `range = start..=end`.
#[derive(Debug, Clone, Copy)]
pub struct RangeSpec {
    pub start: Number,
    pub end: Number,
    pub span: Span,
}

impl TunableFieldIR {
    /// Numeric default, if one was given.
    pub fn numeric_default(&self) -> Option<Number> {
        match self.default {
            Some(DefaultValue::Int(v)) => Some(Number::Int(v)),
            Some(DefaultValue::Float(v)) => Some(Number::Float(v)),
            _ => None,
        }
    }

    /// Identifier of the generated ID constant.
    ///
    /// E.g., `threshold` -> `THRESHOLD_ID`
    pub fn const_name(&self) -> syn::Ident {
        let name = self.field_name.to_string().to_uppercase();
        syn::Ident::new(&format!("{}_ID", name), self.span)
    }

    /// The `"<GROUP>/<name>"` key.
    pub fn key(&self) -> String {
        format!("{}/{}", self.group_key, self.name)
    }
}
