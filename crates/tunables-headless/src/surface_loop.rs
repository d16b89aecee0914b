//! Control-surface thread.
//!
//! [`SurfaceLoop`] runs the per-frame cycle of a control surface on its own
//! thread, minus the rendering:
//!
//! ```text
//! loop {
//!     sync()
//!     if check_finish() -> break
//!     wait for the next frame (woken early by any change)
//! }
//! sync()
//! ```
//!
//! The loop never blocks on the pipeline. It keeps syncing while the
//! pipeline is paused or stopped, so stop and release are issued from the
//! user side ([`PlaybackController::request_stop`],
//! [`PlaybackController::release`]) while the pipeline acknowledges the stop
//! in `FrameGate::admit` and marks itself finished with
//! [`PlaybackController::set_finish`].

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tunables_core::{PlaybackController, SyncEngine, SyncReport, TuningConfig};

/// Totals over the lifetime of a surface loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    /// Sync ticks run.
    pub frames: u64,
    /// Pipeline writes shown on widgets.
    pub pushed: u64,
    /// Widget edits taken into entries.
    pub pulled: u64,
    /// Ticks skipped for malformed text, summed over entries.
    pub skipped: u64,
    /// Bindings released after retirement.
    pub released: u64,
}

impl SurfaceStats {
    fn absorb(&mut self, report: SyncReport) {
        self.frames += 1;
        self.pushed += report.pushed as u64;
        self.pulled += report.pulled as u64;
        self.skipped += report.skipped as u64;
        self.released += report.released as u64;
    }
}

/// Builder for the control-surface thread.
pub struct SurfaceLoop {
    engine: SyncEngine,
    playback: Arc<PlaybackController>,
    frame_interval: Duration,
}

impl SurfaceLoop {
    /// Prepare a loop over an engine whose panels are already materialized.
    pub fn new(engine: SyncEngine, playback: Arc<PlaybackController>) -> Self {
        Self {
            engine,
            playback,
            frame_interval: TuningConfig::new().frame_interval,
        }
    }

    /// Apply timing settings.
    pub fn with_config(mut self, config: &TuningConfig) -> Self {
        self.frame_interval = config.frame_interval;
        self
    }

    /// Start the loop on a new thread.
    pub fn spawn(self) -> io::Result<SurfaceHandle> {
        let playback = Arc::clone(&self.playback);
        let thread = thread::Builder::new()
            .name("tunables-surface".to_string())
            .spawn(move || self.run())?;
        Ok(SurfaceHandle { playback, thread })
    }

    /// Run the loop on the current thread until finish is requested.
    pub fn run(mut self) -> SurfaceStats {
        let mut stats = SurfaceStats::default();
        log::debug!(
            "Surface loop started with {} binding(s)",
            self.engine.bound_count()
        );

        loop {
            let started = Instant::now();
            stats.absorb(self.engine.sync());

            if self.playback.check_finish() {
                break;
            }

            let seen = self.playback.signal().generation();
            if let Some(remaining) = self.frame_interval.checked_sub(started.elapsed()) {
                self.playback.signal().wait_for_change(seen, remaining);
            }
        }

        // Flush pipeline writes made right before finish
        stats.absorb(self.engine.sync());
        log::debug!("Surface loop finished after {} frame(s)", stats.frames);
        stats
    }
}

/// Handle to a running surface loop.
#[derive(Debug)]
pub struct SurfaceHandle {
    playback: Arc<PlaybackController>,
    thread: JoinHandle<SurfaceStats>,
}

impl SurfaceHandle {
    /// The playback controller driving the loop.
    pub fn playback(&self) -> &Arc<PlaybackController> {
        &self.playback
    }

    /// Returns true once the loop thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Request finish and wait for the loop to exit.
    pub fn finish(self) -> thread::Result<SurfaceStats> {
        self.playback.request_finish();
        self.thread.join()
    }

    /// Wait for the loop to exit without requesting finish.
    pub fn join(self) -> thread::Result<SurfaceStats> {
        self.thread.join()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeadlessSurface;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tunables_core::{Admission, FrameGate, Group, Registry, WidgetValue};

    const FAST: TuningConfig = TuningConfig::new()
        .with_frame_interval_ms(2)
        .with_stopped_poll_ms(1);

    fn wait_until(condition: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "condition not reached in time");
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn start(registry: &Arc<Registry>, groups: &[Group]) -> (HeadlessSurface, SurfaceHandle) {
        let mut surface = HeadlessSurface::new();
        let mut engine = SyncEngine::with_config(Arc::clone(registry), FAST);
        for &group in groups {
            engine.create_entries(&mut surface, group.key(), group);
        }

        let playback = Arc::new(
            PlaybackController::with_signal(Arc::clone(registry.signal())).with_config(&FAST),
        );
        let handle = SurfaceLoop::new(engine, playback)
            .with_config(&FAST)
            .spawn()
            .unwrap();
        (surface, handle)
    }

    /// Pipeline thread admitting frames through the gate until finish.
    fn run_pipeline(
        gate: FrameGate,
        playback: Arc<PlaybackController>,
        frames: Arc<AtomicU64>,
    ) -> JoinHandle<()> {
        thread::spawn(move || {
            while gate.admit(&playback) != Admission::Finish {
                frames.fetch_add(1, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(1));
            }
            playback.set_finish();
        })
    }

    #[test]
    fn test_edits_flow_both_ways() {
        let registry = Arc::new(Registry::new());
        let threshold = registry
            .register_bounded(Group::Tracking, "Threshold", 10i64, 0..=100)
            .unwrap();
        let (surface, handle) = start(&registry, &[Group::Tracking]);
        let widget = surface.widget("TRACKING", "Threshold").unwrap();

        threshold.set(20);
        wait_until(|| widget.get() == WidgetValue::Number(20.0));
        assert!(!threshold.check_and_reset_if_changed());

        widget.set(WidgetValue::Number(500.0));
        wait_until(|| threshold.check_and_reset_if_changed());
        assert_eq!(threshold.get(), 100);

        let stats = handle.finish().unwrap();
        assert!(stats.frames > 0);
        assert!(stats.pulled >= 1);
    }

    #[test]
    fn test_sync_continues_while_pipeline_stopped() {
        let registry = Arc::new(Registry::new());
        let gate = FrameGate::register_with_config(&registry, &FAST).unwrap();
        let threshold = registry
            .register_bounded(Group::Tracking, "Threshold", 10i64, 0..=100)
            .unwrap();
        let (surface, handle) = start(&registry, &[Group::General, Group::Tracking]);
        let playback = Arc::clone(handle.playback());

        let frames = Arc::new(AtomicU64::new(0));
        let pipeline = run_pipeline(gate, Arc::clone(&playback), Arc::clone(&frames));
        wait_until(|| frames.load(Ordering::SeqCst) > 0);

        // User side
        playback.request_stop();
        wait_until(|| playback.is_stopped());
        let held = frames.load(Ordering::SeqCst);

        surface
            .widget("TRACKING", "Threshold")
            .unwrap()
            .set(WidgetValue::Number(42.0));
        wait_until(|| threshold.check_and_reset_if_changed());
        assert_eq!(threshold.get(), 42);
        assert_eq!(frames.load(Ordering::SeqCst), held);
        assert!(!handle.is_finished());

        playback.release();
        wait_until(|| frames.load(Ordering::SeqCst) > held);
        assert!(!playback.is_stopped());

        handle.finish().unwrap();
        pipeline.join().unwrap();
        assert!(playback.is_finished());
    }

    #[test]
    fn test_finish_while_pipeline_stopped() {
        let registry = Arc::new(Registry::new());
        let gate = FrameGate::register_with_config(&registry, &FAST).unwrap();
        let (_surface, handle) = start(&registry, &[Group::General]);
        let playback = Arc::clone(handle.playback());

        let frames = Arc::new(AtomicU64::new(0));
        playback.request_stop();
        let pipeline = run_pipeline(gate, Arc::clone(&playback), Arc::clone(&frames));
        wait_until(|| playback.is_stopped());

        handle.finish().unwrap();
        pipeline.join().unwrap();
        assert_eq!(frames.load(Ordering::SeqCst), 0);
        assert!(playback.is_finished());
    }

    #[test]
    fn test_surface_leaves_finished_to_pipeline() {
        let registry = Arc::new(Registry::new());
        let (_surface, handle) = start(&registry, &[Group::General]);
        let playback = Arc::clone(handle.playback());

        handle.finish().unwrap();
        assert!(playback.check_finish());
        assert!(!playback.is_finished());
    }
}
