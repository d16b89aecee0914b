//! Entry metadata types.
//!
//! This module provides types for describing entry metadata:
//! - [`Category`] - Widget shape and update semantics (bounded, toggle, text)
//! - [`EntryInfo`] - Complete entry description (id, group, name, category)

use crate::entry::EntryId;
use crate::group::Group;
use crate::value::Value;

/// Widget shape and value-update semantics of an entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Category {
    /// Bounded numeric value. `min` and `max` are inclusive and carry the
    /// same kind as the entry's value.
    MinMax { min: Value, max: Value },

    /// Boolean switch.
    ///
    /// `persistent = true` is a checkbox that holds its state;
    /// `persistent = false` is a momentary button whose presses are
    /// delivered as change notifications.
    Toggle { persistent: bool },

    /// Free text, round-tripped through the value's string form.
    TextInput,
}

impl Category {
    /// Get the inclusive bounds of a MinMax entry.
    pub fn bounds(&self) -> Option<(&Value, &Value)> {
        match self {
            Category::MinMax { min, max } => Some((min, max)),
            _ => None,
        }
    }

    /// Returns true for momentary buttons.
    pub fn is_momentary(&self) -> bool {
        matches!(self, Category::Toggle { persistent: false })
    }

    /// Apply the category's constraint to a value (clamping for MinMax).
    pub fn constrain(&self, value: Value) -> Value {
        match self {
            Category::MinMax { min, max } => value.clamped(min, max),
            _ => value,
        }
    }
}

/// Metadata describing a single entry.
#[derive(Debug, Clone)]
pub struct EntryInfo {
    /// Stable hashed identifier of `"<GROUP>/<name>"`.
    pub id: EntryId,
    /// Registration sequence number; defines registration order.
    pub seq: u64,
    /// Namespace of the entry.
    pub group: Group,
    /// Display name, unique among live entries of the group.
    pub name: String,
    /// Widget shape and update semantics.
    pub category: Category,
}

impl EntryInfo {
    /// Create entry info, deriving the ID from group and name.
    pub fn new(seq: u64, group: Group, name: impl Into<String>, category: Category) -> Self {
        let name = name.into();
        Self {
            id: EntryId::of(group, &name),
            seq,
            group,
            name,
            category,
        }
    }

    /// The `"<GROUP>/<name>"` key used by the registry index.
    pub fn key(&self) -> String {
        entry_key(self.group, &self.name)
    }
}

/// Build the `"<GROUP>/<name>"` key for a (group, name) pair.
pub fn entry_key(group: Group, name: &str) -> String {
    format!("{}/{}", group.key(), name)
}
