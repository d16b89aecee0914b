//! Entries and typed handles.
//!
//! An [`Entry`] is one named, typed value cell plus metadata and a change
//! marker. Entries are shared behind `Arc` and never move, so handles stay
//! valid for the lifetime of the process even if the entry is retired.
//!
//! # Change Marker
//!
//! Each entry carries a three-state [`ChangeMarker`] instead of two
//! independent flags:
//!
//! ```text
//!                 set() (pipeline)
//!   Clean ─────────────────────────────► PendingPipelineWrite
//!     ▲  ▲                                     │
//!     │  └──────── sync(): push to widget ─────┘
//!     │
//!     │  check_and_reset_if_changed() == true
//!     │
//!   PendingSurfaceWrite ◄──── sync(): pull from widget (only from Clean
//!                              or PendingSurfaceWrite)
//! ```
//!
//! Only one side can be pending at a time, so "changed by pipeline" and
//! "changed by surface" can never both be set.
//!
//! # Locking
//!
//! The value and the marker live behind a single mutex. The sync engine
//! holds that mutex for the whole reconciliation step of an entry, which is
//! what makes the pipeline-first priority rule hold under concurrency.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tunables_utils::fnv1a_32;

use crate::category::{entry_key, Category, EntryInfo};
use crate::error::{TunablesError, TunablesResult};
use crate::group::Group;
use crate::value::{Value, ValueType};
use crate::value_format;

/// Stable entry identifier (FNV-1a of `"<GROUP>/<name>"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(pub u32);

impl EntryId {
    /// Compute the ID for a (group, name) pair.
    pub fn of(group: Group, name: &str) -> Self {
        Self(fnv1a_32(&entry_key(group, name)))
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Which side last changed an entry without the other side having seen it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeMarker {
    /// Both sides agree.
    #[default]
    Clean,
    /// The pipeline wrote a value the surface has not displayed yet.
    PendingPipelineWrite,
    /// The surface wrote a value the pipeline has not been notified of yet.
    PendingSurfaceWrite,
}

/// Mutable part of an entry, guarded by the entry mutex.
#[derive(Debug)]
pub(crate) struct EntryState {
    pub(crate) value: Value,
    pub(crate) marker: ChangeMarker,
}

/// A named, typed value cell.
#[derive(Debug)]
pub struct Entry {
    info: EntryInfo,
    state: Mutex<EntryState>,
    retired: AtomicBool,
}

impl Entry {
    /// Create an entry. The initial value is constrained by the category.
    pub(crate) fn new(info: EntryInfo, initial: Value) -> Self {
        let value = info.category.constrain(initial);
        Self {
            info,
            state: Mutex::new(EntryState {
                value,
                marker: ChangeMarker::Clean,
            }),
            retired: AtomicBool::new(false),
        }
    }

    /// Get the entry metadata.
    pub fn info(&self) -> &EntryInfo {
        &self.info
    }

    /// Get the stable entry ID.
    pub fn id(&self) -> EntryId {
        self.info.id
    }

    /// Get the entry's group.
    pub fn group(&self) -> Group {
        self.info.group
    }

    /// Get the entry's name.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Get the entry's category.
    pub fn category(&self) -> &Category {
        &self.info.category
    }

    /// Registration sequence number.
    pub fn seq(&self) -> u64 {
        self.info.seq
    }

    /// Current value (type-erased).
    pub fn value(&self) -> Value {
        self.lock_state().value.clone()
    }

    /// Current value formatted for display.
    pub fn display(&self) -> String {
        value_format::format(&self.lock_state().value)
    }

    /// Current change marker.
    pub fn marker(&self) -> ChangeMarker {
        self.lock_state().marker
    }

    /// Set the value from the pipeline side (type-erased).
    ///
    /// Fails with [`TunablesError::TypeMismatch`] if `value` has a different
    /// kind than the stored value.
    pub fn set_value(&self, value: Value) -> TunablesResult<()> {
        let mut state = self.lock_state();
        let found = state.value.kind();
        if value.kind() != found {
            return Err(TunablesError::TypeMismatch {
                name: self.info.name.clone(),
                expected: value.kind(),
                found,
            });
        }
        self.write_from_pipeline(&mut state, value);
        Ok(())
    }

    /// Report and clear a pending surface-origin change.
    ///
    /// Edge-triggered and coalescing: several surface edits between two
    /// polls produce one `true`, and the current value is the latest edit.
    /// A pending pipeline write is left untouched.
    pub fn check_and_reset_if_changed(&self) -> bool {
        let mut state = self.lock_state();
        if state.marker == ChangeMarker::PendingSurfaceWrite {
            state.marker = ChangeMarker::Clean;
            true
        } else {
            false
        }
    }

    /// Returns true once the entry has been retired from the registry.
    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }

    pub(crate) fn retire(&self) {
        self.retired.store(true, Ordering::Release);
    }

    /// Store a value of the right kind from the pipeline side.
    pub(crate) fn store_from_pipeline(&self, value: Value) {
        let mut state = self.lock_state();
        self.write_from_pipeline(&mut state, value);
    }

    /// Swap in `replacement` if `take` accepts the current value.
    ///
    /// Read and write happen under one lock, so a surface edit pulled in
    /// between cannot be overwritten unseen. Returns the previous value when
    /// it was replaced.
    pub(crate) fn replace_from_pipeline(
        &self,
        replacement: Value,
        take: impl FnOnce(&Value) -> bool,
    ) -> Option<Value> {
        let mut state = self.lock_state();
        if !take(&state.value) {
            return None;
        }
        let previous = state.value.clone();
        self.write_from_pipeline(&mut state, replacement);
        Some(previous)
    }

    /// Non-finite floats are dropped so the stored value stays displayable
    /// and inside its range.
    fn write_from_pipeline(&self, state: &mut EntryState, value: Value) {
        if !value.is_finite() {
            log::warn!(
                "Ignoring non-finite value for '{}' in group {}, keeping {}",
                self.info.name,
                self.info.group,
                state.value
            );
            return;
        }
        state.value = self.info.category.constrain(value);
        state.marker = ChangeMarker::PendingPipelineWrite;
    }

    /// Lock the value and marker.
    ///
    /// No code path panics while holding this lock, so a poisoned lock still
    /// holds a consistent state and is recovered.
    pub(crate) fn lock_state(&self) -> MutexGuard<'_, EntryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Typed handle to an entry.
///
/// Returned by [`Registry`](crate::Registry) registration and lookup.
/// Cloning is cheap (one `Arc` clone) and every clone refers to the same
/// entry.
///
/// # Example
///
/// ```ignore
/// let threshold = registry.register_bounded(Group::Tracking, "Threshold", 10i64, 0..=100)?;
///
/// // pipeline thread
/// if threshold.check_and_reset_if_changed() {
///     tracker.set_threshold(threshold.get());
/// }
/// ```
pub struct Tunable<T: ValueType> {
    entry: Arc<Entry>,
    _type: PhantomData<fn() -> T>,
}

impl<T: ValueType> Tunable<T> {
    /// Wrap an entry whose kind has been checked against `T`.
    pub(crate) fn new(entry: Arc<Entry>) -> Self {
        Self {
            entry,
            _type: PhantomData,
        }
    }

    /// Get the current value.
    #[inline]
    pub fn get(&self) -> T {
        T::coerce(&self.entry.lock_state().value)
    }

    /// Set the value from the pipeline side.
    ///
    /// MinMax entries are clamped to their range. NaN and infinite floats
    /// are ignored with a warning. The surface picks the new value up on its
    /// next sync tick.
    #[inline]
    pub fn set(&self, value: T) {
        self.entry.store_from_pipeline(value.into_value());
    }

    /// Replace the value if `take` accepts the current one, returning the
    /// previous value.
    ///
    /// Atomic with respect to sync ticks: a widget edit is either returned
    /// here or applied after the replacement.
    pub fn replace_if(&self, value: T, take: impl FnOnce(&T) -> bool) -> Option<T> {
        self.entry
            .replace_from_pipeline(value.into_value(), |current| take(&T::coerce(current)))
            .map(|previous| T::coerce(&previous))
    }

    /// Report and clear a pending surface-origin change.
    ///
    /// See [`Entry::check_and_reset_if_changed`].
    #[inline]
    pub fn check_and_reset_if_changed(&self) -> bool {
        self.entry.check_and_reset_if_changed()
    }

    /// Get the underlying entry.
    pub fn entry(&self) -> &Arc<Entry> {
        &self.entry
    }

    /// Get the entry's name.
    pub fn name(&self) -> &str {
        self.entry.name()
    }

    /// Get the entry's group.
    pub fn group(&self) -> Group {
        self.entry.group()
    }
}

impl<T: ValueType> Clone for Tunable<T> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.entry))
    }
}

impl<T: ValueType> fmt::Debug for Tunable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tunable")
            .field("id", &self.entry.id())
            .field("name", &self.entry.name())
            .field("kind", &T::KIND)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded_entry() -> Arc<Entry> {
        let info = EntryInfo::new(
            0,
            Group::Tracking,
            "Threshold",
            Category::MinMax {
                min: Value::Int(0),
                max: Value::Int(100),
            },
        );
        Arc::new(Entry::new(info, Value::Int(10)))
    }

    #[test]
    fn test_new_entry_is_clean() {
        let entry = bounded_entry();
        assert_eq!(entry.value(), Value::Int(10));
        assert_eq!(entry.marker(), ChangeMarker::Clean);
        assert!(!entry.is_retired());
    }

    #[test]
    fn test_initial_value_is_clamped() {
        let info = EntryInfo::new(
            0,
            Group::Tracking,
            "Threshold",
            Category::MinMax {
                min: Value::Int(0),
                max: Value::Int(100),
            },
        );
        let entry = Entry::new(info, Value::Int(250));
        assert_eq!(entry.value(), Value::Int(100));
    }

    #[test]
    fn test_set_clamps_and_marks_pipeline() {
        let tunable: Tunable<i64> = Tunable::new(bounded_entry());
        tunable.set(-5);
        assert_eq!(tunable.get(), 0);
        assert_eq!(tunable.entry().marker(), ChangeMarker::PendingPipelineWrite);
        // A pipeline write is never reported back as a surface change
        assert!(!tunable.check_and_reset_if_changed());
        assert_eq!(tunable.entry().marker(), ChangeMarker::PendingPipelineWrite);
    }

    #[test]
    fn test_non_finite_write_keeps_value() {
        let info = EntryInfo::new(
            0,
            Group::Initialization,
            "Ratio",
            Category::MinMax {
                min: Value::F64(0.0),
                max: Value::F64(1.0),
            },
        );
        let ratio: Tunable<f64> = Tunable::new(Arc::new(Entry::new(info, Value::F64(0.5))));

        ratio.set(f64::NAN);
        assert_eq!(ratio.get(), 0.5);
        assert_eq!(ratio.entry().marker(), ChangeMarker::Clean);

        ratio.set(f64::NEG_INFINITY);
        assert_eq!(ratio.get(), 0.5);
        assert!(ratio.entry().set_value(Value::F64(f64::NAN)).is_ok());
        assert_eq!(ratio.get(), 0.5);

        ratio.set(0.75);
        assert_eq!(ratio.get(), 0.75);
        assert_eq!(ratio.entry().marker(), ChangeMarker::PendingPipelineWrite);
    }

    #[test]
    fn test_replace_if_swaps_under_one_lock() {
        let tunable: Tunable<i64> = Tunable::new(bounded_entry());
        {
            let mut state = tunable.entry().lock_state();
            state.value = Value::Int(25);
            state.marker = ChangeMarker::PendingSurfaceWrite;
        }

        assert_eq!(tunable.replace_if(0, |count| *count == 0), None);
        assert_eq!(tunable.entry().marker(), ChangeMarker::PendingSurfaceWrite);

        assert_eq!(tunable.replace_if(0, |count| *count != 0), Some(25));
        assert_eq!(tunable.get(), 0);
        assert_eq!(tunable.entry().marker(), ChangeMarker::PendingPipelineWrite);
    }

    #[test]
    fn test_check_and_reset_is_edge_triggered() {
        let entry = bounded_entry();
        {
            let mut state = entry.lock_state();
            state.value = Value::Int(42);
            state.marker = ChangeMarker::PendingSurfaceWrite;
        }
        assert!(entry.check_and_reset_if_changed());
        assert!(!entry.check_and_reset_if_changed());
        assert_eq!(entry.marker(), ChangeMarker::Clean);
    }

    #[test]
    fn test_set_value_type_mismatch() {
        let entry = bounded_entry();
        let err = entry.set_value(Value::F64(1.0)).unwrap_err();
        assert_eq!(
            err,
            TunablesError::TypeMismatch {
                name: "Threshold".to_string(),
                expected: crate::value::ValueKind::F64,
                found: crate::value::ValueKind::Int,
            }
        );
        assert_eq!(entry.value(), Value::Int(10));
    }

    #[test]
    fn test_entry_id_display() {
        let id = EntryId(0x00ab_cdef);
        assert_eq!(id.to_string(), "00abcdef");
    }
}
