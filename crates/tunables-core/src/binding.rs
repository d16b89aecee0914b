//! Entry to widget binding.
//!
//! A [`Binding`] pairs one entry with the proxy widget showing it and runs
//! the per-tick reconciliation between the two. Pipeline writes always win:
//!
//! 1. `PendingPipelineWrite`: push the stored value to the widget, mark clean.
//! 2. Otherwise, if the widget differs from the stored value: pull it
//!    (clamped for MinMax) and mark `PendingSurfaceWrite`.
//! 3. Otherwise nothing happens.
//!
//! The entry lock is held across all three steps, so a pipeline `set()`
//! racing with the tick lands either before step 1 (and is pushed) or after
//! the tick (and is pushed next time). It is never overwritten by a stale
//! widget value.
//!
//! # Momentary Buttons
//!
//! A button rests at the entry's stored value. Any deviation is a press: the
//! entry is marked `PendingSurfaceWrite` without changing its value and the
//! button is released again in the same tick.

use std::sync::Arc;

use crate::entry::{ChangeMarker, Entry};
use crate::error::TunablesError;
use crate::surface::{ProxyWidget, WidgetValue};
use crate::value::{Value, ValueKind};
use crate::value_format;

/// Outcome of reconciling one binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The stored value was written to the widget.
    Pushed,
    /// The widget value was taken into the entry.
    Pulled,
    /// The widget held text that does not convert; the entry is unchanged.
    Skipped,
    /// Both sides already agree.
    Idle,
}

/// One entry bound to one proxy widget.
pub struct Binding {
    entry: Arc<Entry>,
    widget: Box<dyn ProxyWidget>,
    last_rejected: Option<String>,
    dedup_warnings: bool,
}

impl Binding {
    /// Bind `entry` to `widget`.
    pub fn new(entry: Arc<Entry>, widget: Box<dyn ProxyWidget>, dedup_warnings: bool) -> Self {
        Self {
            entry,
            widget,
            last_rejected: None,
            dedup_warnings,
        }
    }

    /// The bound entry.
    pub fn entry(&self) -> &Arc<Entry> {
        &self.entry
    }

    /// Run one reconciliation step.
    pub fn reconcile(&mut self) -> Reconciled {
        let entry = Arc::clone(&self.entry);
        let mut state = entry.lock_state();
        let category = entry.category();

        if state.marker == ChangeMarker::PendingPipelineWrite {
            self.widget.set(WidgetValue::for_entry(category, &state.value));
            state.marker = ChangeMarker::Clean;
            return Reconciled::Pushed;
        }

        let raw = self.widget.get();

        if category.is_momentary() {
            let rest = WidgetValue::for_entry(category, &state.value);
            if raw == rest {
                return Reconciled::Idle;
            }
            self.widget.set(rest);
            state.marker = ChangeMarker::PendingSurfaceWrite;
            return Reconciled::Pulled;
        }

        let candidate = match widget_to_value(&raw, state.value.kind()) {
            Some(value) => value,
            None => {
                self.reject(&raw, &state.value);
                return Reconciled::Skipped;
            }
        };
        self.last_rejected = None;

        let constrained = category.constrain(candidate.clone());
        if constrained != candidate {
            // Snap the widget into range so the next tick is idle
            self.widget.set(WidgetValue::for_entry(category, &constrained));
        }

        if constrained == state.value {
            return Reconciled::Idle;
        }

        state.value = constrained;
        state.marker = ChangeMarker::PendingSurfaceWrite;
        Reconciled::Pulled
    }

    fn reject(&mut self, raw: &WidgetValue, kept: &Value) {
        let text = raw.to_string();
        if self.dedup_warnings && self.last_rejected.as_deref() == Some(text.as_str()) {
            return;
        }

        let err = TunablesError::ConversionFailure {
            name: self.entry.name().to_string(),
            kind: kept.kind(),
            text: text.clone(),
        };
        log::warn!("{} in group {}, keeping {}", err, self.entry.group(), kept);
        self.last_rejected = Some(text);
    }
}

/// Convert a widget value into a value of `kind`.
///
/// Returns `None` for text that does not parse and for non-finite numbers.
pub fn widget_to_value(raw: &WidgetValue, kind: ValueKind) -> Option<Value> {
    match raw {
        WidgetValue::Number(x) if !x.is_finite() => None,
        WidgetValue::Number(x) => Some(Value::from_f64(kind, *x)),
        WidgetValue::Flag(b) if kind == ValueKind::Str => {
            Some(Value::Str(value_format::format(&Value::Bool(*b))))
        }
        WidgetValue::Flag(b) => Some(Value::from_f64(kind, if *b { 1.0 } else { 0.0 })),
        WidgetValue::Text(s) => value_format::parse(kind, s),
    }
}
