//! Control surface abstraction.
//!
//! The rendering side owns the widgets. This crate only sees them through
//! [`ProxyWidget`]: something that can be read and written once per frame.
//! A [`ControlSurface`] creates those proxies when a panel is materialized.
//!
//! ```text
//! Category                 WidgetShape          WidgetValue
//! ───────────────────────  ───────────────────  ──────────────
//! MinMax { min, max }      Slider { min, max }  Number(f64)
//! Toggle { persistent }    Checkbox             Flag(bool)
//! Toggle { !persistent }   Button               Flag(bool)
//! TextInput                TextField            Text(String)
//! ```

use std::fmt;

use crate::category::Category;
use crate::entry::{Entry, EntryId};
use crate::group::Group;
use crate::value::Value;
use crate::value_format;

/// Value held by a proxy widget.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetValue {
    /// Slider position.
    Number(f64),
    /// Checkbox or button state.
    Flag(bool),
    /// Text field contents.
    Text(String),
}

impl WidgetValue {
    /// Widget value showing `value` in a widget for `category`.
    pub fn for_entry(category: &Category, value: &Value) -> Self {
        match category {
            Category::MinMax { .. } => WidgetValue::Number(value.as_f64().unwrap_or(0.0)),
            Category::Toggle { .. } => {
                WidgetValue::Flag(value.as_f64().is_some_and(|x| x > 0.5))
            }
            Category::TextInput => WidgetValue::Text(value_format::format(value)),
        }
    }
}

impl fmt::Display for WidgetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetValue::Number(x) => write!(f, "{}", x),
            WidgetValue::Flag(b) => write!(f, "{}", b),
            WidgetValue::Text(s) => f.write_str(s),
        }
    }
}

/// Kind of widget to create.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetShape {
    /// Bounded slider, inclusive range.
    Slider { min: f64, max: f64 },
    /// Persistent checkbox.
    Checkbox,
    /// Momentary button; reads `true` while pressed.
    Button,
    /// Free-text field.
    TextField,
}

impl WidgetShape {
    /// Widget shape for an entry category.
    pub fn for_category(category: &Category) -> Self {
        match category {
            Category::MinMax { min, max } => WidgetShape::Slider {
                min: min.as_f64().unwrap_or(0.0),
                max: max.as_f64().unwrap_or(0.0),
            },
            Category::Toggle { persistent: true } => WidgetShape::Checkbox,
            Category::Toggle { persistent: false } => WidgetShape::Button,
            Category::TextInput => WidgetShape::TextField,
        }
    }
}

/// Everything a surface needs to create a widget for an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetDescriptor {
    pub group: Group,
    pub name: String,
    pub id: EntryId,
    pub shape: WidgetShape,
    /// Seed value.
    pub initial: WidgetValue,
}

impl WidgetDescriptor {
    /// Describe the widget for an entry, seeded with its current value.
    pub fn for_entry(entry: &Entry) -> Self {
        let category = entry.category();
        Self {
            group: entry.group(),
            name: entry.name().to_string(),
            id: entry.id(),
            shape: WidgetShape::for_category(category),
            initial: WidgetValue::for_entry(category, &entry.value()),
        }
    }
}

/// A live-editable widget owned by the rendering side.
///
/// `get` returns whatever the user last left in the widget; `set` overwrites
/// it. Both are called from the control-surface thread only.
pub trait ProxyWidget: Send {
    /// Read the widget's current value.
    fn get(&self) -> WidgetValue;

    /// Overwrite the widget's value.
    fn set(&mut self, value: WidgetValue);
}

/// Rendering collaborator that creates widgets inside named panels.
pub trait ControlSurface {
    /// Create a widget in `panel`, seeded from `descriptor`.
    fn create_widget(&mut self, panel: &str, descriptor: &WidgetDescriptor)
        -> Box<dyn ProxyWidget>;
}
