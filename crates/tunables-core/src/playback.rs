//! Stop / release / finish handshake between the pipeline and the surface.
//!
//! The controller has two independent axes, each behind its own mutex:
//!
//! - **stop**: `stop_requested`, `stopped`. The surface asks the pipeline
//!   to stop with [`PlaybackController::request_stop`]; the pipeline
//!   acknowledges with [`PlaybackController::stop`] and waits until the
//!   surface calls [`PlaybackController::release`].
//! - **finish**: `finish_requested`, `finished`. Monotonic. Once requested,
//!   finish dominates any pending stop.
//!
//! When both locks are needed they are taken in the order stop, then finish.
//!
//! | Thread   | Calls                                            |
//! |----------|--------------------------------------------------|
//! | pipeline | `stop`, `wait_while_stopped`, `check_finish`, `set_finish` |
//! | surface  | `request_stop`, `release`, `request_finish`      |
//!
//! ```ignore
//! // pipeline thread, before every frame
//! if playback.stop() && !playback.wait_while_stopped() {
//!     break; // finish requested while stopped
//! }
//! if playback.check_finish() {
//!     break;
//! }
//! // after the loop
//! playback.set_finish();
//! ```
//!
//! [`FrameGate::admit`](crate::FrameGate::admit) runs this stop check for
//! the pipeline. Every state change notifies the shared [`ChangeSignal`],
//! which is what wakes `admit` and
//! [`PlaybackController::wait_while_stopped`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::config::TuningConfig;
use crate::signal::ChangeSignal;

#[derive(Debug, Default)]
struct StopState {
    stop_requested: bool,
    stopped: bool,
}

#[derive(Debug, Default)]
struct FinishState {
    finish_requested: bool,
    finished: bool,
}

/// Playback state machine shared by the pipeline and surface threads.
#[derive(Debug)]
pub struct PlaybackController {
    stop: Mutex<StopState>,
    finish: Mutex<FinishState>,
    signal: Arc<ChangeSignal>,
    stopped_poll: Duration,
}

impl PlaybackController {
    /// Create a running controller with its own change signal.
    pub fn new() -> Self {
        Self::with_signal(Arc::new(ChangeSignal::new()))
    }

    /// Create a running controller that notifies `signal` on every change.
    ///
    /// Pass [`Registry::signal`](crate::Registry::signal) here so that the
    /// pause gate wakes on both entry edits and playback requests.
    pub fn with_signal(signal: Arc<ChangeSignal>) -> Self {
        Self {
            stop: Mutex::new(StopState::default()),
            finish: Mutex::new(FinishState::default()),
            signal,
            stopped_poll: TuningConfig::new().stopped_poll,
        }
    }

    /// Apply timing settings.
    pub fn with_config(mut self, config: &TuningConfig) -> Self {
        self.stopped_poll = config.stopped_poll;
        self
    }

    /// The change signal notified by this controller.
    pub fn signal(&self) -> &Arc<ChangeSignal> {
        &self.signal
    }

    // === Stop axis ===

    /// Ask the pipeline to stop. Called by the surface.
    ///
    /// No-op if the pipeline is already stopped or finish was requested.
    pub fn request_stop(&self) {
        {
            let mut stop = self.lock_stop();
            if stop.stopped || self.lock_finish().finish_requested {
                return;
            }
            stop.stop_requested = true;
        }
        log::debug!("Stop requested");
        self.signal.notify();
    }

    /// Acknowledge a pending stop request. Called by the pipeline.
    ///
    /// Returns true and enters the stopped state if a stop was requested
    /// and finish was not. Returns false otherwise.
    pub fn stop(&self) -> bool {
        {
            let mut stop = self.lock_stop();
            let finish = self.lock_finish();

            if finish.finish_requested || !stop.stop_requested {
                return false;
            }
            stop.stopped = true;
            stop.stop_requested = false;
        }
        log::debug!("Stopped");
        self.signal.notify();
        true
    }

    /// Returns true while stopped.
    pub fn is_stopped(&self) -> bool {
        self.lock_stop().stopped
    }

    /// Leave the stopped state. Called by the surface.
    pub fn release(&self) {
        self.lock_stop().stopped = false;
        log::debug!("Released");
        self.signal.notify();
    }

    /// Block the pipeline while stopped.
    ///
    /// Returns true once released, false if finish was requested first.
    pub fn wait_while_stopped(&self) -> bool {
        loop {
            let seen = self.signal.generation();
            if self.check_finish() {
                return false;
            }
            if !self.is_stopped() {
                return true;
            }
            self.signal.wait_for_change(seen, self.stopped_poll);
        }
    }

    // === Finish axis ===

    /// Ask both threads to finish. Cannot be undone.
    pub fn request_finish(&self) {
        self.lock_finish().finish_requested = true;
        log::debug!("Finish requested");
        self.signal.notify();
    }

    /// Returns true once finish was requested.
    pub fn check_finish(&self) -> bool {
        self.lock_finish().finish_requested
    }

    /// Mark the pipeline as finished.
    pub fn set_finish(&self) {
        self.lock_finish().finished = true;
        log::debug!("Finished");
        self.signal.notify();
    }

    /// Returns true once the pipeline has finished.
    pub fn is_finished(&self) -> bool {
        self.lock_finish().finished
    }

    fn lock_stop(&self) -> MutexGuard<'_, StopState> {
        self.stop.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_finish(&self) -> MutexGuard<'_, FinishState> {
        self.finish.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}
