//! Group-namespaced entry registry.
//!
//! The [`Registry`] is the single source of truth for current entry values.
//! It is constructed explicitly at start-up and handed to every module that
//! registers or reads entries, typically as `Arc<Registry>`:
//!
//! ```ignore
//! let registry = Arc::new(Registry::new());
//!
//! // Deterministic registration order: playback entries first, then modules
//! let gate = FrameGate::register(&registry)?;
//! let threshold = registry.register_bounded(Group::Tracking, "Threshold", 10i64, 0..=100)?;
//! let features = registry.register(Group::Extractor, "Features", 1000i64)?;
//! ```
//!
//! # Duplicate Names
//!
//! Registering a (group, name) that is already live is rejected with
//! [`TunablesError::DuplicateName`]. The first entry and every handle to it
//! stay valid; a warning is logged.
//!
//! # Retirement
//!
//! Entries are never physically removed while the registry is alive. A
//! module that shuts down early calls [`Registry::retire`], which tombstones
//! the entry: it disappears from lookups, snapshots and sync ticks, but the
//! allocation stays valid for any binding or handle still referring to it.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tunables_utils::FnvBuildHasher;

use crate::category::{entry_key, Category, EntryInfo};
use crate::entry::{Entry, Tunable};
use crate::error::{TunablesError, TunablesResult};
use crate::group::Group;
use crate::signal::ChangeSignal;
use crate::value::{Numeric, Value, ValueKind, ValueType};

#[derive(Debug, Default)]
struct RegistryInner {
    /// Every entry ever registered, in registration order. Append-only.
    entries: Vec<Arc<Entry>>,
    /// Live entries by `"<GROUP>/<name>"`, pointing into `entries`.
    index: HashMap<String, usize, FnvBuildHasher>,
}

/// Process-wide collection of entries.
#[derive(Debug, Default)]
pub struct Registry {
    inner: RwLock<RegistryInner>,
    signal: Arc<ChangeSignal>,
}

impl Registry {
    /// Create an empty registry with its own change signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change signal bumped whenever the surface changes an entry.
    ///
    /// Share it with [`PlaybackController::with_signal`](crate::PlaybackController::with_signal)
    /// so that a single wait covers both entry edits and playback requests.
    pub fn signal(&self) -> &Arc<ChangeSignal> {
        &self.signal
    }

    // === Registration ===

    /// Register an unbounded entry.
    ///
    /// `bool` entries become persistent toggles; every other type becomes a
    /// text input.
    pub fn register<T: ValueType>(
        &self,
        group: Group,
        name: impl Into<String>,
        initial: T,
    ) -> TunablesResult<Tunable<T>> {
        let category = if T::KIND == ValueKind::Bool {
            Category::Toggle { persistent: true }
        } else {
            Category::TextInput
        };
        self.insert(group, name.into(), category, initial.into_value())
            .map(Tunable::new)
    }

    /// Register a bounded numeric entry with an inclusive range.
    ///
    /// The initial value is clamped into the range. Fails with
    /// [`TunablesError::InvalidRange`] if `min > max` or a bound or the
    /// initial value is NaN.
    pub fn register_bounded<T: Numeric>(
        &self,
        group: Group,
        name: impl Into<String>,
        initial: T,
        range: RangeInclusive<T>,
    ) -> TunablesResult<Tunable<T>> {
        let name = name.into();
        let (min, max) = range.into_inner();

        let ordered = matches!(min.partial_cmp(&max), Some(Ordering::Less | Ordering::Equal));
        let comparable = initial.partial_cmp(&min).is_some();
        if !ordered || !comparable {
            log::warn!("Rejecting entry '{}' in group {}: invalid range", name, group);
            return Err(TunablesError::InvalidRange { group, name });
        }

        let category = Category::MinMax {
            min: min.into_value(),
            max: max.into_value(),
        };
        self.insert(group, name, category, initial.into_value())
            .map(Tunable::new)
    }

    /// Register a boolean toggle.
    ///
    /// `persistent = false` creates a momentary button, see
    /// [`register_trigger`](Self::register_trigger).
    pub fn register_toggle(
        &self,
        group: Group,
        name: impl Into<String>,
        initial: bool,
        persistent: bool,
    ) -> TunablesResult<Tunable<bool>> {
        self.insert(
            group,
            name.into(),
            Category::Toggle { persistent },
            Value::Bool(initial),
        )
        .map(Tunable::new)
    }

    /// Register a momentary button resting at `false`.
    ///
    /// Presses are reported through
    /// [`Tunable::check_and_reset_if_changed`]; the stored value does not
    /// change.
    pub fn register_trigger(
        &self,
        group: Group,
        name: impl Into<String>,
    ) -> TunablesResult<Tunable<bool>> {
        self.register_toggle(group, name, false, false)
    }

    fn insert(
        &self,
        group: Group,
        name: String,
        category: Category,
        initial: Value,
    ) -> TunablesResult<Arc<Entry>> {
        let key = entry_key(group, &name);
        let mut inner = self.write();

        if inner.index.contains_key(&key) {
            log::warn!(
                "Entry '{}' already registered in group {}, keeping the first registration",
                name,
                group
            );
            return Err(TunablesError::DuplicateName { group, name });
        }

        let position = inner.entries.len();
        let info = EntryInfo::new(position as u64, group, name, category);
        let entry = Arc::new(Entry::new(info, initial));

        log::debug!(
            "Registered {} '{}' [{}] = {}",
            group,
            entry.name(),
            entry.id(),
            entry.display()
        );

        inner.entries.push(Arc::clone(&entry));
        inner.index.insert(key, position);
        Ok(entry)
    }

    // === Lookup ===

    /// Look up a live entry with a typed handle.
    ///
    /// Fails with [`TunablesError::NotFound`] if no live entry exists and
    /// with [`TunablesError::TypeMismatch`] if `T` is not the stored type.
    pub fn lookup<T: ValueType>(&self, group: Group, name: &str) -> TunablesResult<Tunable<T>> {
        let entry = self.entry(group, name)?;
        let found = entry.value().kind();
        if found != T::KIND {
            log::warn!(
                "Lookup of {} '{}' as {} but it stores {}",
                group,
                name,
                T::KIND,
                found
            );
            return Err(TunablesError::TypeMismatch {
                name: name.to_string(),
                expected: T::KIND,
                found,
            });
        }
        Ok(Tunable::new(entry))
    }

    /// Look up a live entry without fixing its type.
    pub fn entry(&self, group: Group, name: &str) -> TunablesResult<Arc<Entry>> {
        let inner = self.read();
        inner
            .index
            .get(&entry_key(group, name))
            .and_then(|&position| inner.entries.get(position))
            .map(Arc::clone)
            .ok_or_else(|| TunablesError::NotFound {
                group,
                name: name.to_string(),
            })
    }

    /// Live entries of `group`, in registration order.
    ///
    /// The view is lazy: each iteration takes its own snapshot when it
    /// starts. Entries registered or retired during an iteration do not
    /// change it; the next iteration sees them.
    pub fn for_each(&self, group: Group) -> GroupEntries<'_> {
        GroupEntries {
            registry: self,
            group: Some(group),
        }
    }

    /// Every live entry, in registration order. Lazy like [`for_each`](Self::for_each).
    pub fn all(&self) -> GroupEntries<'_> {
        GroupEntries {
            registry: self,
            group: None,
        }
    }

    fn snapshot(&self, group: Option<Group>) -> Vec<Arc<Entry>> {
        let inner = self.read();
        inner
            .entries
            .iter()
            .filter(|entry| !entry.is_retired())
            .filter(|entry| group.map_or(true, |group| entry.group() == group))
            .map(Arc::clone)
            .collect()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.read().index.len()
    }

    /// Returns true if there are no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // === Retirement ===

    /// Tombstone a live entry.
    ///
    /// The entry is removed from the index, so its name can be registered
    /// again; the old allocation lives until the registry is dropped.
    pub fn retire(&self, group: Group, name: &str) -> TunablesResult<()> {
        let entry = {
            let mut inner = self.write();
            let position = inner
                .index
                .remove(&entry_key(group, name))
                .ok_or_else(|| TunablesError::NotFound {
                    group,
                    name: name.to_string(),
                })?;
            let entry = Arc::clone(&inner.entries[position]);
            // Tombstoned before the name can be taken again
            entry.retire();
            entry
        };

        log::debug!("Retired {} '{}' [{}]", group, name, entry.id());
        self.signal.notify();
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Lazy view over the live entries of one group (or all groups).
///
/// Returned by [`Registry::for_each`] and [`Registry::all`].
#[derive(Debug, Clone, Copy)]
pub struct GroupEntries<'a> {
    registry: &'a Registry,
    group: Option<Group>,
}

impl GroupEntries<'_> {
    /// Snapshot the matching entries now and iterate them.
    pub fn iter(&self) -> EntryIter {
        EntryIter {
            entries: self.registry.snapshot(self.group).into_iter(),
        }
    }

    /// Number of matching live entries right now.
    pub fn len(&self) -> usize {
        self.iter().len()
    }

    /// Returns true if no live entry matches right now.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IntoIterator for &GroupEntries<'_> {
    type Item = Arc<Entry>;
    type IntoIter = EntryIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for GroupEntries<'_> {
    type Item = Arc<Entry>;
    type IntoIter = EntryIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One pass over a snapshot taken when the pass started.
#[derive(Debug)]
pub struct EntryIter {
    entries: std::vec::IntoIter<Arc<Entry>>,
}

impl Iterator for EntryIter {
    type Item = Arc<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for EntryIter {}
