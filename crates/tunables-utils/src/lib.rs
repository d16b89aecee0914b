//! Internal utilities for the tunables workspace.
//!
//! This crate provides low-level utilities shared by `tunables-core` and the
//! surface adapters. All utilities have zero external dependencies.
//!
//! # Contents
//!
//! - [`fnv1a_32`] - FNV-1a hash used for stable entry IDs
//! - [`FnvHasher`] / [`FnvBuildHasher`] - FNV-1a as a `std::hash::Hasher`
//!   for the registry index

pub mod hash;

pub use hash::{fnv1a_32, FnvBuildHasher, FnvHasher};
