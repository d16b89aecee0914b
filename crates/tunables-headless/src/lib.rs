//! # tunables-headless
//!
//! A control surface without rendering, for tests, scripted drivers and
//! servers.
//!
//! - [`HeadlessSurface`] - Widgets as shared in-memory cells
//! - [`WidgetHandle`] - User-side access to one widget, from any thread
//! - [`SurfaceLoop`] - The per-frame sync / finish cycle on its own thread

pub mod surface;
pub mod surface_loop;

pub use surface::{HeadlessSurface, HeadlessWidget, WidgetHandle};
pub use surface_loop::{SurfaceHandle, SurfaceLoop, SurfaceStats};
