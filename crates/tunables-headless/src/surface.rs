//! In-memory control surface.
//!
//! [`HeadlessSurface`] keeps every widget value in a shared cell. The sync
//! engine reads and writes the cells through [`HeadlessWidget`]; anything
//! else (a test, a scripted driver, another thread) uses a [`WidgetHandle`]
//! to play the part of the user.
//!
//! ```ignore
//! let mut surface = HeadlessSurface::new();
//! engine.create_entries(&mut surface, "Tracking", Group::Tracking);
//!
//! let threshold = surface.widget("Tracking", "Threshold").unwrap();
//! threshold.set(WidgetValue::Number(42.0));
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tunables_core::{ControlSurface, ProxyWidget, WidgetDescriptor, WidgetValue};

type Cell = Arc<Mutex<WidgetValue>>;

fn lock(cell: &Cell) -> MutexGuard<'_, WidgetValue> {
    cell.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct WidgetRecord {
    panel: String,
    descriptor: WidgetDescriptor,
    cell: Cell,
}

/// Control surface without rendering.
///
/// Clones share the same widgets.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    widgets: Arc<Mutex<Vec<WidgetRecord>>>,
}

impl HeadlessSurface {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a handle on the widget `name` in `panel`.
    pub fn widget(&self, panel: &str, name: &str) -> Option<WidgetHandle> {
        self.records()
            .iter()
            .find(|record| record.panel == panel && record.descriptor.name == name)
            .map(WidgetHandle::from_record)
    }

    /// Handles for every widget of `panel`, in creation order.
    pub fn panel(&self, panel: &str) -> Vec<WidgetHandle> {
        self.records()
            .iter()
            .filter(|record| record.panel == panel)
            .map(WidgetHandle::from_record)
            .collect()
    }

    /// Names of all panels, in order of first use.
    pub fn panels(&self) -> Vec<String> {
        let mut panels: Vec<String> = Vec::new();
        for record in self.records().iter() {
            if !panels.contains(&record.panel) {
                panels.push(record.panel.clone());
            }
        }
        panels
    }

    /// Total number of widgets created.
    pub fn widget_count(&self) -> usize {
        self.records().len()
    }

    fn records(&self) -> MutexGuard<'_, Vec<WidgetRecord>> {
        self.widgets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ControlSurface for HeadlessSurface {
    fn create_widget(
        &mut self,
        panel: &str,
        descriptor: &WidgetDescriptor,
    ) -> Box<dyn ProxyWidget> {
        let cell = Arc::new(Mutex::new(descriptor.initial.clone()));
        log::debug!(
            "Panel '{}': {:?} widget '{}' = {}",
            panel,
            descriptor.shape,
            descriptor.name,
            descriptor.initial
        );
        self.records().push(WidgetRecord {
            panel: panel.to_string(),
            descriptor: descriptor.clone(),
            cell: Arc::clone(&cell),
        });
        Box::new(HeadlessWidget { cell })
    }
}

/// Proxy widget handed to the sync engine.
#[derive(Debug)]
pub struct HeadlessWidget {
    cell: Cell,
}

impl ProxyWidget for HeadlessWidget {
    fn get(&self) -> WidgetValue {
        lock(&self.cell).clone()
    }

    fn set(&mut self, value: WidgetValue) {
        *lock(&self.cell) = value;
    }
}

/// User-side access to one headless widget.
#[derive(Debug, Clone)]
pub struct WidgetHandle {
    panel: String,
    descriptor: WidgetDescriptor,
    cell: Cell,
}

impl WidgetHandle {
    fn from_record(record: &WidgetRecord) -> Self {
        Self {
            panel: record.panel.clone(),
            descriptor: record.descriptor.clone(),
            cell: Arc::clone(&record.cell),
        }
    }

    /// Panel holding the widget.
    pub fn panel(&self) -> &str {
        &self.panel
    }

    /// Descriptor the widget was created from.
    pub fn descriptor(&self) -> &WidgetDescriptor {
        &self.descriptor
    }

    /// Current widget value.
    pub fn get(&self) -> WidgetValue {
        lock(&self.cell).clone()
    }

    /// Overwrite the widget value, as a user edit would.
    pub fn set(&self, value: WidgetValue) {
        *lock(&self.cell) = value;
    }

    /// Type into a text field.
    pub fn type_text(&self, text: &str) {
        self.set(WidgetValue::Text(text.to_string()));
    }

    /// Press a button or tick a checkbox.
    pub fn press(&self) {
        self.set(WidgetValue::Flag(true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tunables_core::{Group, Registry, SyncEngine, WidgetShape};

    #[test]
    fn test_widgets_are_seeded() {
        let registry = Arc::new(Registry::new());
        registry
            .register_bounded(Group::Tracking, "Threshold", 10i64, 0..=100)
            .unwrap();
        registry.register(Group::Extractor, "Scale Factor", 1.2f32).unwrap();

        let mut surface = HeadlessSurface::new();
        let mut engine = SyncEngine::new(Arc::clone(&registry));
        engine.create_entries(&mut surface, "Tracking", Group::Tracking);
        engine.create_entries(&mut surface, "Extractor", Group::Extractor);

        let threshold = surface.widget("Tracking", "Threshold").unwrap();
        assert_eq!(threshold.get(), WidgetValue::Number(10.0));
        assert_eq!(
            threshold.descriptor().shape,
            WidgetShape::Slider {
                min: 0.0,
                max: 100.0
            }
        );

        let scale = surface.widget("Extractor", "Scale Factor").unwrap();
        assert_eq!(scale.get(), WidgetValue::Text("1.2".to_string()));
        assert_eq!(surface.panels(), vec!["Tracking", "Extractor"]);
        assert!(surface.widget("Tracking", "Scale Factor").is_none());
    }

    #[test]
    fn test_handle_edit_reaches_entry() {
        let registry = Arc::new(Registry::new());
        let culling = registry.register(Group::LocalMapping, "Culling", true).unwrap();

        let mut surface = HeadlessSurface::new();
        let mut engine = SyncEngine::new(Arc::clone(&registry));
        engine.create_entries(&mut surface, "Local Mapping", Group::LocalMapping);

        surface
            .widget("Local Mapping", "Culling")
            .unwrap()
            .set(WidgetValue::Flag(false));
        engine.sync();

        assert!(!culling.get());
        assert!(culling.check_and_reset_if_changed());
    }

    #[test]
    fn test_clones_share_widgets() {
        let registry = Arc::new(Registry::new());
        registry.register(Group::Visual, "Show Points", true).unwrap();

        let mut surface = HeadlessSurface::new();
        let observer = surface.clone();
        let mut engine = SyncEngine::new(Arc::clone(&registry));
        engine.create_entries(&mut surface, "Visual", Group::Visual);

        assert_eq!(observer.widget_count(), 1);
        assert_eq!(observer.panel("Visual").len(), 1);
    }
}
