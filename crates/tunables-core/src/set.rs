//! Groups of entries registered together.
//!
//! A module that owns several tunables usually keeps their handles in one
//! struct. [`TunableSet`] is the registration entry point for such structs;
//! it is normally derived:
//!
//! ```ignore
//! use tunables::prelude::*;
//!
//! #[derive(Tunables)]
//! #[tunables(group = "TRACKING")]
//! pub struct TrackingTunables {
//!     #[tunable(name = "Threshold", default = 10, range = 0..=100)]
//!     pub threshold: Tunable<i64>,
//!
//!     #[tunable(name = "Features", default = 1000, group = "EXTRACTOR")]
//!     pub features: Tunable<i64>,
//!
//!     #[tunable(name = "Reset", trigger)]
//!     pub reset: Tunable<bool>,
//! }
//!
//! let tracking = TrackingTunables::register(&registry)?;
//! ```
//!
//! Fields are registered in declaration order.

use crate::error::TunablesResult;
use crate::gate::FrameGate;
use crate::registry::Registry;

/// A struct of entry handles that registers itself.
pub trait TunableSet: Sized {
    /// Register every entry of the set and return the handles.
    ///
    /// Stops at the first failing registration; entries registered before
    /// the failure stay in the registry.
    fn register(registry: &Registry) -> TunablesResult<Self>;
}

impl TunableSet for FrameGate {
    fn register(registry: &Registry) -> TunablesResult<Self> {
        FrameGate::register(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Tunable;
    use crate::group::Group;

    struct Mapping {
        culling: Tunable<bool>,
        min_score: Tunable<f64>,
    }

    impl TunableSet for Mapping {
        fn register(registry: &Registry) -> TunablesResult<Self> {
            Ok(Self {
                culling: registry.register(Group::LocalMapping, "Culling", true)?,
                min_score: registry.register_bounded(
                    Group::LocalMapping,
                    "Min Score",
                    0.5,
                    0.0..=1.0,
                )?,
            })
        }
    }

    fn register_set<S: TunableSet>(registry: &Registry) -> TunablesResult<S> {
        S::register(registry)
    }

    #[test]
    fn test_register_set() {
        let registry = Registry::new();
        let mapping: Mapping = register_set(&registry).unwrap();
        assert!(mapping.culling.get());
        assert_eq!(mapping.min_score.get(), 0.5);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_second_registration_fails() {
        let registry = Registry::new();
        register_set::<FrameGate>(&registry).unwrap();
        assert!(register_set::<FrameGate>(&registry).is_err());
    }
}
