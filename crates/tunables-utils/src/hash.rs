//! Hash functions for stable ID generation.
//!
//! Entry IDs are derived from the `"<GROUP>/<name>"` key so that the same
//! tunable has the same ID in every run, which keeps diagnostics comparable
//! across sessions.

use std::hash::{BuildHasherDefault, Hasher};

const FNV_OFFSET: u32 = 2166136261;
const FNV_PRIME: u32 = 16777619;

/// Compute FNV-1a 32-bit hash of a string.
///
/// # Properties
///
/// - **Deterministic**: Same input always produces the same output
/// - **Const-friendly**: Can be evaluated at compile time
/// - **32-bit output**: collisions are possible, so IDs are for display and
///   lookup acceleration only, never for identity
///
/// # Examples
///
/// ```
/// use tunables_utils::fnv1a_32;
///
/// let id = fnv1a_32("TRACKING/Threshold");
///
/// const PAUSE_ID: u32 = fnv1a_32("GENERAL/Pause");
/// ```
#[inline]
pub const fn fnv1a_32(s: &str) -> u32 {
    let bytes = s.as_bytes();
    let mut hash = FNV_OFFSET;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// Streaming FNV-1a hasher.
///
/// Produces the same value as [`fnv1a_32`] when fed the same bytes through
/// [`Hasher::write`]. Keys in the registry index are short strings, where
/// FNV beats SipHash and DoS resistance is irrelevant.
#[derive(Debug, Clone, Copy)]
pub struct FnvHasher(u32);

impl Default for FnvHasher {
    fn default() -> Self {
        Self(FNV_OFFSET)
    }
}

impl Hasher for FnvHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.0 as u64
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 ^= byte as u32;
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }
}

/// `BuildHasher` for `HashMap<K, V, FnvBuildHasher>`.
pub type FnvBuildHasher = BuildHasherDefault<FnvHasher>;
