//! Per-frame reconciliation between entries and widgets.
//!
//! The [`SyncEngine`] lives on the control-surface thread. Panels are
//! materialized once with [`SyncEngine::create_entries`]; after that the
//! surface calls [`SyncEngine::sync`] once per frame.
//!
//! ```ignore
//! let mut engine = SyncEngine::new(Arc::clone(&registry));
//! for group in Group::ALL {
//!     engine.create_entries(&mut surface, group.key(), group);
//! }
//!
//! loop {
//!     let report = engine.sync();
//!     // render ...
//! }
//! ```
//!
//! Bindings are kept in registration order, so a tick visits entries in the
//! order they were registered regardless of which panel shows them.

use std::collections::HashSet;
use std::sync::Arc;

use tunables_utils::FnvBuildHasher;

use crate::binding::{Binding, Reconciled};
use crate::config::TuningConfig;
use crate::group::Group;
use crate::registry::Registry;
use crate::surface::{ControlSurface, WidgetDescriptor};

/// Counts of what one sync tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Pipeline writes shown on widgets.
    pub pushed: usize,
    /// Widget edits taken into entries.
    pub pulled: usize,
    /// Widgets holding text that does not convert.
    pub skipped: usize,
    /// Bindings dropped because their entry was retired.
    pub released: usize,
}

impl SyncReport {
    /// Returns true if the tick changed nothing on either side.
    pub fn is_idle(&self) -> bool {
        self.pushed == 0 && self.pulled == 0 && self.released == 0
    }
}

/// Owns the bindings of one control surface.
pub struct SyncEngine {
    registry: Arc<Registry>,
    config: TuningConfig,
    /// Sorted by entry sequence number.
    bindings: Vec<Binding>,
    /// Sequence numbers of bound entries.
    bound: HashSet<u64, FnvBuildHasher>,
}

impl SyncEngine {
    /// Create an engine with the default configuration.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_config(registry, TuningConfig::new())
    }

    /// Create an engine with an explicit configuration.
    pub fn with_config(registry: Arc<Registry>, config: TuningConfig) -> Self {
        Self {
            registry,
            config,
            bindings: Vec::new(),
            bound: HashSet::default(),
        }
    }

    /// The registry this engine reconciles.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Number of live bindings.
    pub fn bound_count(&self) -> usize {
        self.bindings.len()
    }

    /// Materialize a panel: create a widget for every live entry of `group`
    /// that is not bound yet.
    ///
    /// Calling this again for the same panel only picks up entries
    /// registered since. Returns the number of widgets created.
    pub fn create_entries(
        &mut self,
        surface: &mut dyn ControlSurface,
        panel: &str,
        group: Group,
    ) -> usize {
        let mut created = 0;

        for entry in self.registry.for_each(group) {
            if self.bound.contains(&entry.seq()) {
                log::debug!(
                    "Panel '{}': {} '{}' is already bound, skipping",
                    panel,
                    group,
                    entry.name()
                );
                continue;
            }

            let descriptor = WidgetDescriptor::for_entry(&entry);
            let widget = surface.create_widget(panel, &descriptor);
            let seq = entry.seq();
            let binding = Binding::new(entry, widget, self.config.dedup_conversion_warnings);

            let position = self
                .bindings
                .partition_point(|bound| bound.entry().seq() < seq);
            self.bindings.insert(position, binding);
            self.bound.insert(seq);
            created += 1;
        }

        log::debug!(
            "Panel '{}': bound {} widget(s) for group {}",
            panel,
            created,
            group
        );
        created
    }

    /// Run one reconciliation tick over every binding.
    ///
    /// Bindings whose entry was retired are released first. If any widget
    /// edit was pulled, the registry's change signal is notified.
    pub fn sync(&mut self) -> SyncReport {
        let mut report = SyncReport::default();

        let bound = &mut self.bound;
        self.bindings.retain(|binding| {
            let entry = binding.entry();
            if !entry.is_retired() {
                return true;
            }
            log::debug!("Releasing binding of retired {} '{}'", entry.group(), entry.name());
            bound.remove(&entry.seq());
            report.released += 1;
            false
        });

        for binding in &mut self.bindings {
            match binding.reconcile() {
                Reconciled::Pushed => report.pushed += 1,
                Reconciled::Pulled => report.pulled += 1,
                Reconciled::Skipped => report.skipped += 1,
                Reconciled::Idle => {}
            }
        }

        if report.pulled > 0 {
            self.registry.signal().notify();
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::ChangeMarker;
    use crate::surface::WidgetValue;
    use crate::testing::MemorySurface;
    use std::thread;

    fn setup() -> (Arc<Registry>, SyncEngine, MemorySurface) {
        let registry = Arc::new(Registry::new());
        let engine = SyncEngine::new(Arc::clone(&registry));
        (registry, engine, MemorySurface::default())
    }

    #[test]
    fn test_pipeline_origin_round_trip() {
        let (registry, mut engine, mut surface) = setup();
        let features = registry.register(Group::Extractor, "Features", 1000i64).unwrap();
        engine.create_entries(&mut surface, "Extractor", Group::Extractor);

        features.set(1500);
        let report = engine.sync();

        assert_eq!(report.pushed, 1);
        assert_eq!(surface.read("Features"), WidgetValue::Text("1500".to_string()));
        assert!(!features.check_and_reset_if_changed());
    }

    #[test]
    fn test_surface_origin_round_trip() {
        let (registry, mut engine, mut surface) = setup();
        let scale = registry.register(Group::Extractor, "Scale Factor", 1.2f64).unwrap();
        engine.create_entries(&mut surface, "Extractor", Group::Extractor);

        surface.poke("Scale Factor", WidgetValue::Text("1.5".to_string()));
        assert_eq!(engine.sync().pulled, 1);

        assert_eq!(scale.get(), 1.5);
        assert!(scale.check_and_reset_if_changed());
        assert!(!scale.check_and_reset_if_changed());

        engine.sync();
        assert!(!scale.check_and_reset_if_changed());
    }

    #[test]
    fn test_idempotent_sync() {
        let (registry, mut engine, mut surface) = setup();
        registry.register(Group::Visual, "Show Points", true).unwrap();
        registry
            .register_bounded(Group::Tracking, "Threshold", 10i64, 0..=100)
            .unwrap();
        engine.create_entries(&mut surface, "Visual", Group::Visual);
        engine.create_entries(&mut surface, "Tracking", Group::Tracking);

        for _ in 0..5 {
            assert!(engine.sync().is_idle());
        }
        for entry in &registry.all() {
            assert_eq!(entry.marker(), ChangeMarker::Clean);
        }
    }

    #[test]
    fn test_non_finite_pipeline_write_is_not_pushed() {
        let (registry, mut engine, mut surface) = setup();
        let ratio = registry
            .register_bounded(Group::Initialization, "Ratio", 0.5f64, 0.0..=1.0)
            .unwrap();
        engine.create_entries(&mut surface, "Initialization", Group::Initialization);

        ratio.set(f64::NAN);
        for _ in 0..3 {
            let report = engine.sync();
            assert!(report.is_idle());
            assert_eq!(report.skipped, 0);
        }
        assert_eq!(surface.read("Ratio"), WidgetValue::Number(0.5));
        assert_eq!(ratio.get(), 0.5);
    }

    #[test]
    fn test_min_max_clamping() {
        let (registry, mut engine, mut surface) = setup();
        let threshold = registry
            .register_bounded(Group::Tracking, "Threshold", 10i64, 0..=100)
            .unwrap();
        engine.create_entries(&mut surface, "Tracking", Group::Tracking);

        surface.poke("Threshold", WidgetValue::Number(500.0));
        engine.sync();

        assert_eq!(threshold.get(), 100);
        assert!(threshold.check_and_reset_if_changed());
        // The widget was snapped, so the next tick has nothing to do
        assert!(engine.sync().is_idle());
        assert!(!threshold.check_and_reset_if_changed());
    }

    #[test]
    fn test_surface_edits_coalesce() {
        let (registry, mut engine, mut surface) = setup();
        let ratio = registry
            .register_bounded(Group::Initialization, "Ratio", 0.5f64, 0.0..=1.0)
            .unwrap();
        engine.create_entries(&mut surface, "Initialization", Group::Initialization);

        surface.poke("Ratio", WidgetValue::Number(0.6));
        engine.sync();
        surface.poke("Ratio", WidgetValue::Number(0.7));
        engine.sync();

        assert!(ratio.check_and_reset_if_changed());
        assert_eq!(ratio.get(), 0.7);
        assert!(!ratio.check_and_reset_if_changed());
    }

    #[test]
    fn test_pull_notifies_signal() {
        let (registry, mut engine, mut surface) = setup();
        registry.register(Group::Visual, "Show Points", true).unwrap();
        engine.create_entries(&mut surface, "Visual", Group::Visual);

        let generation = registry.signal().generation();
        engine.sync();
        assert_eq!(registry.signal().generation(), generation);

        surface.poke("Show Points", WidgetValue::Flag(false));
        engine.sync();
        assert!(registry.signal().generation() > generation);
    }

    #[test]
    fn test_entry_bound_once() {
        let (registry, mut engine, mut surface) = setup();
        registry.register(Group::Visual, "Show Points", true).unwrap();

        assert_eq!(engine.create_entries(&mut surface, "Visual", Group::Visual), 1);
        assert_eq!(engine.create_entries(&mut surface, "Visual", Group::Visual), 0);
        assert_eq!(engine.create_entries(&mut surface, "Other", Group::Visual), 0);
        assert_eq!(engine.bound_count(), 1);
        assert_eq!(surface.created.len(), 1);
    }

    #[test]
    fn test_late_registration_needs_materialization() {
        let (registry, mut engine, mut surface) = setup();
        registry.register(Group::LoopClosing, "Min Score", 0.05f64).unwrap();
        engine.create_entries(&mut surface, "Loop Closing", Group::LoopClosing);
        engine.sync();

        let late = registry.register(Group::LoopClosing, "Max Candidates", 5i64).unwrap();
        late.set(7);
        engine.sync();
        assert_eq!(late.entry().marker(), ChangeMarker::PendingPipelineWrite);

        assert_eq!(engine.create_entries(&mut surface, "Loop Closing", Group::LoopClosing), 1);
        assert_eq!(engine.sync().pushed, 1);
        assert_eq!(surface.read("Max Candidates"), WidgetValue::Text("7".to_string()));
    }

    #[test]
    fn test_bindings_follow_registration_order() {
        let (registry, mut engine, mut surface) = setup();
        registry.register(Group::Tracking, "First", 1i64).unwrap();
        registry.register(Group::Visual, "Second", true).unwrap();
        registry.register(Group::Tracking, "Third", 3i64).unwrap();

        engine.create_entries(&mut surface, "Visual", Group::Visual);
        engine.create_entries(&mut surface, "Tracking", Group::Tracking);

        let names: Vec<_> = engine
            .bindings
            .iter()
            .map(|binding| binding.entry().name().to_string())
            .collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_retired_binding_is_released() {
        let (registry, mut engine, mut surface) = setup();
        registry.register(Group::LocalMapping, "Culling", true).unwrap();
        engine.create_entries(&mut surface, "Local Mapping", Group::LocalMapping);

        registry.retire(Group::LocalMapping, "Culling").unwrap();
        let report = engine.sync();

        assert_eq!(report.released, 1);
        assert_eq!(engine.bound_count(), 0);
        assert_eq!(engine.sync(), SyncReport::default());
    }

    #[test]
    fn test_malformed_text_reported_as_skipped() {
        let (registry, mut engine, mut surface) = setup();
        let features = registry.register(Group::Extractor, "Features", 1000i64).unwrap();
        engine.create_entries(&mut surface, "Extractor", Group::Extractor);

        surface.poke("Features", WidgetValue::Text("lots".to_string()));
        let report = engine.sync();

        assert_eq!(report.skipped, 1);
        assert_eq!(features.get(), 1000);
        assert!(!features.check_and_reset_if_changed());
    }

    #[test]
    fn test_concurrent_pipeline_writes_are_never_lost() {
        let (registry, mut engine, mut surface) = setup();
        let counter = registry
            .register_bounded(Group::Tracking, "Counter", 0i64, 0..=10_000)
            .unwrap();
        engine.create_entries(&mut surface, "Tracking", Group::Tracking);

        let writer = counter.clone();
        let handle = thread::spawn(move || {
            for i in 1..=2_000 {
                writer.set(i);
            }
        });

        let mut pulled = 0;
        while !handle.is_finished() {
            pulled += engine.sync().pulled;
        }
        handle.join().unwrap();
        pulled += engine.sync().pulled;

        assert_eq!(pulled, 0);
        assert_eq!(counter.get(), 2_000);
        assert_eq!(surface.read("Counter"), WidgetValue::Number(2_000.0));
        assert!(!counter.check_and_reset_if_changed());
    }
}
