//! Timing and diagnostics configuration.
//!
//! # Example
//!
//! ```ignore
//! use tunables_core::TuningConfig;
//!
//! pub static CONFIG: TuningConfig = TuningConfig::new()
//!     .with_frame_interval_ms(16)
//!     .with_pause_poll_ms(5);
//! ```

use std::time::Duration;

/// Timing and diagnostics settings shared by the gate, the playback
/// controller and the surface loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuningConfig {
    /// Upper bound on one wait of the pause gate.
    pub pause_poll: Duration,

    /// Upper bound on one wait while the pipeline is stopped.
    pub stopped_poll: Duration,

    /// Target interval between two sync ticks of the surface loop.
    pub frame_interval: Duration,

    /// Log a text conversion failure only once per distinct input.
    pub dedup_conversion_warnings: bool,
}

impl TuningConfig {
    /// Create a configuration with default values.
    pub const fn new() -> Self {
        Self {
            pause_poll: Duration::from_millis(10),
            stopped_poll: Duration::from_millis(3),
            frame_interval: Duration::from_millis(33),
            dedup_conversion_warnings: true,
        }
    }

    /// Set the pause gate wait bound.
    pub const fn with_pause_poll_ms(mut self, ms: u64) -> Self {
        self.pause_poll = Duration::from_millis(ms);
        self
    }

    /// Set the stopped wait bound.
    pub const fn with_stopped_poll_ms(mut self, ms: u64) -> Self {
        self.stopped_poll = Duration::from_millis(ms);
        self
    }

    /// Set the surface frame interval.
    pub const fn with_frame_interval_ms(mut self, ms: u64) -> Self {
        self.frame_interval = Duration::from_millis(ms);
        self
    }

    /// Log every conversion failure, even repeated ones.
    pub const fn with_repeated_warnings(mut self) -> Self {
        self.dedup_conversion_warnings = false;
        self
    }
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TuningConfig::default();
        assert_eq!(config.pause_poll, Duration::from_millis(10));
        assert_eq!(config.stopped_poll, Duration::from_millis(3));
        assert_eq!(config.frame_interval, Duration::from_millis(33));
        assert!(config.dedup_conversion_warnings);
    }

    #[test]
    fn test_const_builder() {
        const CONFIG: TuningConfig = TuningConfig::new()
            .with_frame_interval_ms(16)
            .with_stopped_poll_ms(1)
            .with_repeated_warnings();
        assert_eq!(CONFIG.frame_interval, Duration::from_millis(16));
        assert_eq!(CONFIG.stopped_poll, Duration::from_millis(1));
        assert_eq!(CONFIG.pause_poll, Duration::from_millis(10));
        assert!(!CONFIG.dedup_conversion_warnings);
    }
}
