//! Pause, single-step and fast-forward for the pipeline thread.
//!
//! The gate is built from three ordinary GENERAL entries, so the surface
//! shows and edits them like any other entry:
//!
//! | Entry          | Category               | Initial |
//! |----------------|------------------------|---------|
//! | `Pause`        | persistent toggle      | `false` |
//! | `Next frame`   | momentary button       | `false` |
//! | `Fast forward` | text input (`i64`)     | `0`     |
//!
//! The pipeline calls [`FrameGate::admit`] before every frame. Besides the
//! pause gate, `admit` is where the pipeline acknowledges a stop requested
//! by the surface and waits for the release:
//!
//! ```ignore
//! let gate = FrameGate::register(&registry)?;
//! let playback = PlaybackController::with_signal(Arc::clone(registry.signal()));
//!
//! for frame in frames {
//!     match gate.admit(&playback) {
//!         Admission::Finish => break,
//!         Admission::Run | Admission::Step => track(frame),
//!     }
//! }
//! playback.set_finish();
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::config::TuningConfig;
use crate::entry::Tunable;
use crate::error::TunablesResult;
use crate::group::Group;
use crate::playback::PlaybackController;
use crate::registry::Registry;
use crate::signal::ChangeSignal;

/// Name of the pause toggle.
pub const PAUSE: &str = "Pause";
/// Name of the single-step button.
pub const NEXT_FRAME: &str = "Next frame";
/// Name of the fast-forward field.
pub const FAST_FORWARD: &str = "Fast forward";

/// Why [`FrameGate::admit`] let the pipeline continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Not paused; process the next frame.
    Run,
    /// Paused, but a single step was requested; process exactly one frame.
    Step,
    /// Finish was requested; stop processing.
    Finish,
}

/// Pause / step / fast-forward gate for the pipeline thread.
#[derive(Debug, Clone)]
pub struct FrameGate {
    pause: Tunable<bool>,
    step: Tunable<bool>,
    fast_forward: Tunable<i64>,
    signal: Arc<ChangeSignal>,
    pause_poll: Duration,
}

impl FrameGate {
    /// Register the gate entries with the default configuration.
    pub fn register(registry: &Registry) -> TunablesResult<Self> {
        Self::register_with_config(registry, &TuningConfig::new())
    }

    /// Register the gate entries.
    pub fn register_with_config(registry: &Registry, config: &TuningConfig) -> TunablesResult<Self> {
        Ok(Self {
            pause: registry.register_toggle(Group::General, PAUSE, false, true)?,
            step: registry.register_trigger(Group::General, NEXT_FRAME)?,
            fast_forward: registry.register(Group::General, FAST_FORWARD, 0i64)?,
            signal: Arc::clone(registry.signal()),
            pause_poll: config.pause_poll,
        })
    }

    /// The pause toggle.
    pub fn pause(&self) -> &Tunable<bool> {
        &self.pause
    }

    /// The single-step button.
    pub fn step(&self) -> &Tunable<bool> {
        &self.step
    }

    /// The fast-forward field.
    pub fn fast_forward(&self) -> &Tunable<i64> {
        &self.fast_forward
    }

    /// Returns true while paused.
    pub fn is_paused(&self) -> bool {
        self.pause.get()
    }

    /// Wait until the pipeline may process its next frame.
    ///
    /// A pending stop request is acknowledged with
    /// [`PlaybackController::stop`] and the call blocks until the surface
    /// releases it. Then, when not paused, returns [`Admission::Run`]. While
    /// paused, blocks until a step is requested ([`Admission::Step`], pause
    /// stays on) or pause is cleared ([`Admission::Run`]). Finish ends every
    /// wait with [`Admission::Finish`]. A step pressed while running is
    /// consumed so it cannot leak into a later pause.
    pub fn admit(&self, playback: &PlaybackController) -> Admission {
        let mut waiting = false;

        loop {
            let seen = self.signal.generation();

            if playback.check_finish() {
                return Admission::Finish;
            }

            if playback.stop() {
                log::debug!("Pipeline stopped");
                if !playback.wait_while_stopped() {
                    return Admission::Finish;
                }
                log::debug!("Pipeline released");
                continue;
            }

            // Drained so that toggling pause never shows up as a stale edge
            self.pause.check_and_reset_if_changed();
            let stepped = self.step.check_and_reset_if_changed();

            if !self.pause.get() {
                if waiting {
                    log::debug!("Resumed");
                }
                return Admission::Run;
            }
            if stepped {
                log::debug!("Single step");
                return Admission::Step;
            }

            if !waiting {
                log::debug!("Paused");
                waiting = true;
            }
            self.signal.wait_for_change(seen, self.pause_poll);
        }
    }

    /// Take a pending fast-forward request.
    ///
    /// Returns the requested frame count and resets the field to 0. Zero and
    /// negative counts yield `None`; a negative count is also reset. Reading
    /// and resetting is one step, so an edit pulled by a concurrent sync is
    /// either returned here or kept for the next call.
    pub fn take_fast_forward(&self) -> Option<u32> {
        let count = self.fast_forward.replace_if(0, |count| *count != 0)?;

        if count < 0 {
            log::warn!("Ignoring negative fast forward count {}", count);
            return None;
        }
        Some(u32::try_from(count).unwrap_or(u32::MAX))
    }
}
