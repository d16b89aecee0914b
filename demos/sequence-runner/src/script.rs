//! Scripted user: edits headless widgets from its own thread.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tunables::prelude::*;

/// One user action.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    /// Type text into a field.
    Type {
        panel: &'static str,
        name: &'static str,
        text: String,
    },
    /// Press a button or tick a checkbox.
    Press {
        panel: &'static str,
        name: &'static str,
    },
    /// Untick a checkbox.
    Release {
        panel: &'static str,
        name: &'static str,
    },
    /// Wait until the pipeline has processed this many frames.
    WaitForFrame(u64),
    /// Wait until the pipeline processes a frame after the last press.
    WaitForAdvance,
    /// Do nothing for a number of ticks.
    Idle(u32),
    /// Ask the pipeline to stop and wait until it has.
    StopPipeline,
    /// Let a stopped pipeline continue.
    ReleasePipeline,
}

pub struct Script {
    surface: HeadlessSurface,
    playback: Arc<PlaybackController>,
    frame: Arc<AtomicU64>,
    tick: Duration,
    steps: Vec<ScriptStep>,
}

impl Script {
    pub fn new(
        surface: HeadlessSurface,
        playback: Arc<PlaybackController>,
        frame: Arc<AtomicU64>,
    ) -> Self {
        Self {
            surface,
            playback,
            frame,
            tick: Duration::from_millis(33),
            steps: Vec::new(),
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_steps(mut self, steps: Vec<ScriptStep>) -> Self {
        self.steps = steps;
        self
    }

    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("script".to_string())
            .spawn(move || self.run())
    }

    fn run(self) {
        let mut mark = self.frame.load(Ordering::SeqCst);

        for step in &self.steps {
            if self.playback.check_finish() {
                return;
            }
            log::debug!("Script: {:?}", step);

            match step {
                ScriptStep::Type { panel, name, text } => {
                    if let Some(widget) = self.widget(panel, name) {
                        widget.type_text(text);
                    }
                }
                ScriptStep::Press { panel, name } => {
                    mark = self.frame.load(Ordering::SeqCst);
                    if let Some(widget) = self.widget(panel, name) {
                        widget.press();
                    }
                }
                ScriptStep::Release { panel, name } => {
                    if let Some(widget) = self.widget(panel, name) {
                        widget.set(WidgetValue::Flag(false));
                    }
                }
                ScriptStep::WaitForFrame(target) => {
                    if !self.wait_for(|frame| frame >= *target) {
                        return;
                    }
                }
                ScriptStep::WaitForAdvance => {
                    if !self.wait_for(|frame| frame > mark) {
                        return;
                    }
                }
                ScriptStep::Idle(ticks) => thread::sleep(self.tick * *ticks),
                ScriptStep::StopPipeline => {
                    if !self.stop_pipeline() {
                        return;
                    }
                }
                ScriptStep::ReleasePipeline => {
                    self.playback.release();
                    log::info!("Pipeline released");
                }
            }
        }
    }

    fn widget(&self, panel: &str, name: &str) -> Option<WidgetHandle> {
        let widget = self.surface.widget(panel, name);
        if widget.is_none() {
            log::warn!("Script: no widget '{}' in panel '{}'", name, panel);
        }
        widget
    }

    /// Returns false if finish was requested first.
    fn stop_pipeline(&self) -> bool {
        log::info!("Stopping pipeline");
        self.playback.request_stop();
        loop {
            let seen = self.playback.signal().generation();
            if self.playback.is_stopped() {
                return true;
            }
            if self.playback.check_finish() {
                return false;
            }
            self.playback.signal().wait_for_change(seen, self.tick);
        }
    }

    /// Returns false if finish was requested first.
    fn wait_for(&self, reached: impl Fn(u64) -> bool) -> bool {
        while !reached(self.frame.load(Ordering::SeqCst)) {
            if self.playback.check_finish() {
                return false;
            }
            thread::sleep(self.tick);
        }
        true
    }
}
