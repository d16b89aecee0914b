//! Derive macros for tunables.
//!
//! This crate provides `#[derive(Tunables)]`, which implements
//! `TunableSet` for a struct of `Tunable<T>` handles.
//!
//! # Example
//!
//! ```ignore
//! use tunables::prelude::*;
//!
//! #[derive(Tunables)]
//! #[tunables(group = "EXTRACTOR")]
//! pub struct ExtractorTunables {
//!     #[tunable(name = "Features", default = 1000)]
//!     pub features: Tunable<i64>,
//!
//!     #[tunable(name = "Scale Factor", default = 1.2, range = 1.0..=2.0)]
//!     pub scale: Tunable<f32>,
//! }
//!
//! let extractor = ExtractorTunables::register(&registry)?;
//! ```
//!
//! Generated code refers to `::tunables::core`, so the macro is used through
//! the `tunables` crate.

use proc_macro::TokenStream;

mod codegen;
mod ir;
mod parse;
mod validate;

/// Derive macro for implementing `TunableSet`.
///
/// This macro generates:
/// - `TunableSet::register`, registering every field in declaration order
/// - An `EntryId` constant per field (e.g. `THRESHOLD_ID`)
/// - Compile-time checks for duplicate entries and ID hash collisions
///
/// # Attributes
///
/// - `#[tunables(group = "...")]` - Optional on the struct. Default group for
///   every field.
///
/// - `#[tunable(name = "...", group = "...", default = ..., range = a..=b, trigger)]` -
///   Required on every `Tunable<T>` field. `name` is required; `group` is
///   required unless the struct sets one. `bool` fields become checkboxes,
///   or momentary buttons with `trigger`. Numeric fields with `range` become
///   bounded sliders; the others become text fields.
///
/// Fields without `#[tunable]` are filled with `Default::default()`.
#[proc_macro_derive(Tunables, attributes(tunables, tunable))]
pub fn derive_tunables(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);

    match derive_tunables_impl(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_tunables_impl(input: syn::DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let ir = parse::parse(input)?;
    validate::validate(&ir)?;
    Ok(codegen::generate(&ir))
}
