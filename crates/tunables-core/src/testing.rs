//! In-memory widgets for unit tests.

use std::sync::{Arc, Mutex};

use crate::surface::{ControlSurface, ProxyWidget, WidgetDescriptor, WidgetValue};

/// Widget whose value is shared with the test.
pub(crate) struct SharedWidget(pub(crate) Arc<Mutex<WidgetValue>>);

impl SharedWidget {
    pub(crate) fn new(initial: WidgetValue) -> (Self, Arc<Mutex<WidgetValue>>) {
        let cell = Arc::new(Mutex::new(initial));
        (Self(Arc::clone(&cell)), cell)
    }
}

impl ProxyWidget for SharedWidget {
    fn get(&self) -> WidgetValue {
        self.0.lock().unwrap().clone()
    }

    fn set(&mut self, value: WidgetValue) {
        *self.0.lock().unwrap() = value;
    }
}

/// Records every created widget so tests can poke and read them by name.
#[derive(Default)]
pub(crate) struct MemorySurface {
    pub(crate) created: Vec<(String, WidgetDescriptor, Arc<Mutex<WidgetValue>>)>,
}

impl MemorySurface {
    pub(crate) fn cell(&self, name: &str) -> Arc<Mutex<WidgetValue>> {
        self.created
            .iter()
            .rev()
            .find(|(_, descriptor, _)| descriptor.name == name)
            .map(|(_, _, cell)| Arc::clone(cell))
            .unwrap()
    }

    pub(crate) fn poke(&self, name: &str, value: WidgetValue) {
        *self.cell(name).lock().unwrap() = value;
    }

    pub(crate) fn read(&self, name: &str) -> WidgetValue {
        self.cell(name).lock().unwrap().clone()
    }
}

impl ControlSurface for MemorySurface {
    fn create_widget(
        &mut self,
        panel: &str,
        descriptor: &WidgetDescriptor,
    ) -> Box<dyn ProxyWidget> {
        let (widget, cell) = SharedWidget::new(descriptor.initial.clone());
        self.created
            .push((panel.to_string(), descriptor.clone(), cell));
        Box::new(widget)
    }
}
