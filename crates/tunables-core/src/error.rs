//! Error types for the tunables registry.
//!
//! None of these errors is fatal to the pipeline. Registration and lookup
//! errors are returned to the call site; conversion failures during a sync
//! tick are logged and the entry keeps its last-known-good value.

use std::fmt;

use crate::group::Group;
use crate::value::ValueKind;

/// Errors that can occur when registering, looking up or editing entries.
#[derive(Debug, Clone, PartialEq)]
pub enum TunablesError {
    /// No live entry with this (group, name).
    NotFound { group: Group, name: String },

    /// A live entry with this (group, name) already exists.
    ///
    /// The registry keeps the first entry; the new registration is rejected.
    DuplicateName { group: Group, name: String },

    /// The requested type does not match the entry's stored value type.
    TypeMismatch {
        name: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// Text could not be converted to the entry's value type.
    ConversionFailure {
        name: String,
        kind: ValueKind,
        text: String,
    },

    /// A bounded entry was registered with `min > max` or a non-finite bound.
    InvalidRange { group: Group, name: String },
}

impl fmt::Display for TunablesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { group, name } => write!(f, "No entry '{}' in group {}", name, group),
            Self::DuplicateName { group, name } => {
                write!(f, "Entry '{}' already registered in group {}", name, group)
            }
            Self::TypeMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "Type mismatch for '{}': requested {}, stored {}",
                name, expected, found
            ),
            Self::ConversionFailure { name, kind, text } => {
                write!(f, "Cannot convert '{}' to {} for '{}'", text, kind, name)
            }
            Self::InvalidRange { group, name } => {
                write!(f, "Invalid range for '{}' in group {}", name, group)
            }
        }
    }
}

impl std::error::Error for TunablesError {}

/// Result type for registry operations.
pub type TunablesResult<T> = Result<T, TunablesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_not_found() {
        let err = TunablesError::NotFound {
            group: Group::Tracking,
            name: "Threshold".to_string(),
        };
        assert_eq!(err.to_string(), "No entry 'Threshold' in group TRACKING");
    }

    #[test]
    fn test_display_type_mismatch() {
        let err = TunablesError::TypeMismatch {
            name: "Pause".to_string(),
            expected: ValueKind::F64,
            found: ValueKind::Bool,
        };
        assert_eq!(
            err.to_string(),
            "Type mismatch for 'Pause': requested f64, stored bool"
        );
    }
}
