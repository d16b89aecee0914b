//! # Tunables
//!
//! Live-editable parameters for a long-running pipeline.
//!
//! A pipeline thread registers typed entries and reads them at its own
//! cadence. A control-surface thread shows those entries as widgets and
//! reconciles them once per frame; pipeline writes always win over a
//! concurrent widget edit. A small playback handshake lets the surface
//! pause, single-step, stop and finish the pipeline.
//!
//! ## Architecture
//!
//! ```text
//! pipeline thread ──► Registry (entries) ◄── SyncEngine ──► ControlSurface widgets
//!        │                                        │
//!        └─────────── FrameGate / PlaybackController ──────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tunables::prelude::*;
//!
//! let registry = Arc::new(Registry::new());
//! let gate = FrameGate::register(&registry)?;
//! let threshold = registry.register_bounded(Group::Tracking, "Threshold", 10i64, 0..=100)?;
//!
//! let mut surface = HeadlessSurface::new();
//! let mut engine = SyncEngine::new(Arc::clone(&registry));
//! for group in Group::ALL {
//!     engine.create_entries(&mut surface, group.key(), group);
//! }
//!
//! let playback = Arc::new(PlaybackController::with_signal(Arc::clone(registry.signal())));
//! let surface_thread = SurfaceLoop::new(engine, Arc::clone(&playback)).spawn()?;
//!
//! while gate.admit(&playback) != Admission::Finish {
//!     if threshold.check_and_reset_if_changed() {
//!         // apply threshold.get()
//!     }
//! }
//! ```

// Re-export sub-crates
pub use tunables_core as core;
#[cfg(feature = "headless")]
pub use tunables_headless as headless;

// Re-export derive macro
#[cfg(feature = "derive")]
pub use tunables_macros::Tunables;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use tunables::prelude::*;
/// ```
pub mod prelude {
    pub use tunables_core::{
        // Registry and entries
        Category, ChangeMarker, Entry, EntryId, Group, GroupEntries, Registry, Tunable,
        // Values
        Numeric, Value, ValueKind, ValueType,
        // Surface binding
        ControlSurface, ProxyWidget, SyncEngine, SyncReport, WidgetDescriptor, WidgetShape,
        WidgetValue,
        // Playback
        Admission, ChangeSignal, FrameGate, PlaybackController,
        // Declarative registration
        TunableSet,
        // Configuration and errors
        TunablesError, TunablesResult, TuningConfig,
    };

    #[cfg(feature = "derive")]
    pub use tunables_macros::Tunables;

    #[cfg(feature = "headless")]
    pub use tunables_headless::{HeadlessSurface, SurfaceHandle, SurfaceLoop, SurfaceStats, WidgetHandle};
}
