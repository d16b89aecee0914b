//! # tunables-core
//!
//! Live-editable tunables for a long-running pipeline.
//!
//! A pipeline thread reads and writes typed entries at its own cadence while
//! a control-surface thread reconciles those entries against proxy widgets
//! once per frame. A small playback handshake lets the surface pause, step,
//! stop and finish the pipeline cooperatively.
//!
//! This crate only depends on `log` and the internal utilities crate. It
//! never installs a logger and never renders anything: widgets are supplied
//! by a [`ControlSurface`] implementation.
//!
//! ## Main Types
//!
//! - [`Registry`] - Group-namespaced collection of entries (single source of truth)
//! - [`Entry`] / [`Tunable`] - Type-erased entry and its typed handle
//! - [`SyncEngine`] - Per-frame reconciliation between entries and widgets
//! - [`PlaybackController`] - Stop / release / finish handshake
//! - [`FrameGate`] - Pause, single-step and fast-forward for the pipeline
//! - [`TunableSet`] - Structs of handles that register themselves
//!
//! ## Threading
//!
//! ```text
//! pipeline thread                      control-surface thread
//! ───────────────                      ──────────────────────
//! Tunable::get / set                   SyncEngine::sync()
//! Tunable::check_and_reset_if_changed      └─ Binding::reconcile (per entry)
//! FrameGate::admit ◄── ChangeSignal ───────┘
//! FrameGate::admit (stop / wait)       PlaybackController::request_*
//! PlaybackController::set_finish       PlaybackController::release
//! ```

pub mod binding;
pub mod category;
pub mod config;
pub mod entry;
pub mod error;
pub mod gate;
pub mod group;
pub mod playback;
pub mod registry;
pub mod set;
pub mod signal;
pub mod surface;
pub mod sync;
#[cfg(test)]
mod testing;
pub mod value;
pub mod value_format;

// Re-exports for convenience
pub use category::{Category, EntryInfo};
pub use config::TuningConfig;
pub use entry::{ChangeMarker, Entry, EntryId, Tunable};
pub use error::{TunablesError, TunablesResult};
pub use gate::{Admission, FrameGate};
pub use group::Group;
pub use playback::PlaybackController;
pub use registry::{EntryIter, GroupEntries, Registry};
pub use set::TunableSet;
pub use signal::ChangeSignal;
pub use surface::{ControlSurface, ProxyWidget, WidgetDescriptor, WidgetShape, WidgetValue};
pub use sync::{SyncEngine, SyncReport};
pub use value::{Numeric, Value, ValueKind, ValueType};
