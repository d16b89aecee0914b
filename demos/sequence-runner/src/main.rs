//! Runs a simulated frame pipeline against a headless control surface.
//!
//! Usage: sequence-runner [frames] [--frame-ms N] [--threshold N]
//!        [--fast-forward N] [--pause-at N] [--steps N] [--stop-at N]
//!
//! The pipeline thread is `main`. The surface loop runs on its own thread,
//! and a scripted user edits widgets through handles on a third.

mod script;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tunables::core::gate::{FAST_FORWARD, NEXT_FRAME, PAUSE};
use tunables::prelude::*;

use crate::script::{Script, ScriptStep};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match Options::parse(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&options) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Usage: sequence-runner [frames] [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --frame-ms N       Simulated time per frame (default 20)");
    eprintln!("  --threshold N      Type a new tracking threshold at start");
    eprintln!("  --fast-forward N   Request fast forward over N frames at start");
    eprintln!("  --pause-at N       Pause once frame N is reached");
    eprintln!("  --steps N          Single steps to take while paused (default 2)");
    eprintln!("  --stop-at N        Stop the pipeline at frame N, then release it");
    eprintln!();
    eprintln!("Set RUST_LOG=debug to see every sync and playback transition.");
}

#[derive(Debug, Clone, PartialEq)]
struct Options {
    frames: u64,
    frame_ms: u64,
    threshold: Option<i64>,
    fast_forward: Option<u32>,
    pause_at: Option<u64>,
    steps: u32,
    stop_at: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            frames: 60,
            frame_ms: 20,
            threshold: None,
            fast_forward: None,
            pause_at: None,
            steps: 2,
            stop_at: None,
        }
    }
}

impl Options {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut options = Self::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .ok_or_else(|| format!("Missing value for {}", flag))
                    .and_then(|v| v.parse::<i64>().map_err(|e| format!("{}: {}", flag, e)))
            };

            match arg.as_str() {
                "--frame-ms" => options.frame_ms = non_negative(value(arg.as_str())?, arg)?,
                "--threshold" => options.threshold = Some(value(arg.as_str())?),
                "--fast-forward" => {
                    let count = non_negative(value(arg.as_str())?, arg)?;
                    options.fast_forward = Some(u32::try_from(count).unwrap_or(u32::MAX));
                }
                "--pause-at" => options.pause_at = Some(non_negative(value(arg.as_str())?, arg)?),
                "--steps" => {
                    let steps = non_negative(value(arg.as_str())?, arg)?;
                    options.steps = u32::try_from(steps).unwrap_or(u32::MAX);
                }
                "--stop-at" => options.stop_at = Some(non_negative(value(arg.as_str())?, arg)?),
                other if !other.starts_with("--") => {
                    options.frames = other
                        .parse()
                        .map_err(|e| format!("Invalid frame count '{}': {}", other, e))?;
                }
                other => return Err(format!("Unknown option {}", other)),
            }
        }

        Ok(options)
    }
}

fn non_negative(value: i64, flag: &str) -> Result<u64, String> {
    u64::try_from(value).map_err(|_| format!("{} must not be negative", flag))
}

/// Entries a tracking module would register.
#[derive(Tunables)]
#[tunables(group = "TRACKING")]
struct Tracker {
    #[tunable(name = "Threshold", default = 10, range = 0..=100)]
    threshold: Tunable<i64>,

    #[tunable(name = "Features", group = "EXTRACTOR", default = 1000)]
    features: Tunable<i64>,

    #[tunable(name = "Scale Factor", group = "EXTRACTOR", default = 1.2)]
    scale: Tunable<f32>,

    #[tunable(name = "Tracked Points", group = "VISUAL")]
    tracked: Tunable<i64>,
}

impl Tracker {
    fn apply_edits(&self) {
        if self.threshold.check_and_reset_if_changed() {
            log::info!("Threshold now {}", self.threshold.get());
        }
        if self.features.check_and_reset_if_changed() {
            log::info!("Extracting {} features per frame", self.features.get());
        }
        if self.scale.check_and_reset_if_changed() {
            log::info!("Scale factor now {}", self.scale.get());
        }
    }

    fn track(&self, frame: u64) {
        // Fewer points survive a higher threshold
        let survivors = self.features.get() * (100 - self.threshold.get()) / 100;
        self.tracked.set(survivors - (frame as i64 % 7));
    }
}

fn run(options: &Options) -> Result<(), String> {
    let config = TuningConfig::new().with_frame_interval_ms(options.frame_ms.clamp(1, 33));

    // Registration order: playback entries first, then modules
    let registry = Arc::new(Registry::new());
    let gate = FrameGate::register_with_config(&registry, &config).map_err(|e| e.to_string())?;
    let tracker = Tracker::register(&registry).map_err(|e| e.to_string())?;

    let mut surface = HeadlessSurface::new();
    let mut engine = SyncEngine::with_config(Arc::clone(&registry), config);
    for group in Group::ALL {
        engine.create_entries(&mut surface, group.key(), group);
    }

    let playback = Arc::new(
        PlaybackController::with_signal(Arc::clone(registry.signal())).with_config(&config),
    );
    let surface_thread = SurfaceLoop::new(engine, Arc::clone(&playback))
        .with_config(&config)
        .spawn()
        .map_err(|e| format!("Failed to start surface loop: {}", e))?;

    let frame = Arc::new(AtomicU64::new(0));
    let script = Script::new(surface, Arc::clone(&playback), Arc::clone(&frame))
        .with_tick(config.frame_interval)
        .with_steps(script_steps(options))
        .spawn()
        .map_err(|e| format!("Failed to start script: {}", e))?;

    let frame_time = Duration::from_millis(options.frame_ms);
    let mut forward = 0u32;

    for index in 0..options.frames {
        if let Some(count) = gate.take_fast_forward() {
            log::info!("Fast forwarding by {} frames", count);
            forward = count;
        }

        match gate.admit(&playback) {
            Admission::Finish => break,
            Admission::Step => log::info!("Stepped to frame {}", index),
            Admission::Run => {}
        }

        tracker.apply_edits();
        tracker.track(index);
        frame.store(index + 1, Ordering::SeqCst);

        if forward > 0 {
            forward -= 1;
            if forward == 0 {
                log::info!("Fast forwarding done");
            }
        } else {
            thread::sleep(frame_time);
        }
    }

    playback.set_finish();
    log::info!("Pipeline done after {} frame(s)", frame.load(Ordering::SeqCst));
    let stats = surface_thread
        .finish()
        .map_err(|_| "Surface thread panicked".to_string())?;
    script.join().map_err(|_| "Script thread panicked".to_string())?;

    println!(
        "frames: {}  surface ticks: {}  pushed: {}  pulled: {}  skipped: {}",
        frame.load(Ordering::SeqCst),
        stats.frames,
        stats.pushed,
        stats.pulled,
        stats.skipped
    );
    println!(
        "final threshold: {}  tracked points: {}",
        tracker.threshold.get(),
        tracker.tracked.get()
    );
    Ok(())
}

fn script_steps(options: &Options) -> Vec<ScriptStep> {
    let mut steps = Vec::new();
    if let Some(threshold) = options.threshold {
        steps.push(ScriptStep::Type {
            panel: Group::Tracking.key(),
            name: "Threshold",
            text: threshold.to_string(),
        });
    }
    if let Some(count) = options.fast_forward {
        steps.push(ScriptStep::Type {
            panel: Group::General.key(),
            name: FAST_FORWARD,
            text: count.to_string(),
        });
    }
    if let Some(at) = options.pause_at {
        steps.push(ScriptStep::WaitForFrame(at));
        steps.push(ScriptStep::Press {
            panel: Group::General.key(),
            name: PAUSE,
        });
        for _ in 0..options.steps {
            steps.push(ScriptStep::Idle(3));
            steps.push(ScriptStep::Press {
                panel: Group::General.key(),
                name: NEXT_FRAME,
            });
            steps.push(ScriptStep::WaitForAdvance);
        }
        steps.push(ScriptStep::Release {
            panel: Group::General.key(),
            name: PAUSE,
        });
    }
    if let Some(at) = options.stop_at {
        // Stopped around a map reset, then released
        steps.push(ScriptStep::WaitForFrame(at));
        steps.push(ScriptStep::StopPipeline);
        steps.push(ScriptStep::Idle(3));
        steps.push(ScriptStep::ReleasePipeline);
    }
    steps
}
