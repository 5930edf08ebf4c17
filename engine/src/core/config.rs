use std::time::Duration;

use log::LevelFilter;

use crate::{core::time::SIXTY_FPS, update::registry::DEFAULT_CAPACITY};

/// Settings for the frame loop, the registry and logging.
///
/// ```rust,ignore
/// let config = Config::default()
///     .with_fixed_time_step(ONE_FPS / 50)
///     .with_max_fixed_steps(4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Fixed step length in nano seconds.
    pub fixed_time_step: u64,
    /// Longest frame delta fed to the clock. Longer frames are clamped.
    pub max_frame_delta: Duration,
    /// Upper bound of fixed steps run in a single frame.
    pub max_fixed_steps: u32,
    /// Sleep between frames of a looped runner. `None` runs flat out.
    pub frame_pacing: Option<Duration>,
    /// Slots reserved per phase when the registry is created.
    pub phase_capacity: usize,
    pub log_level: LevelFilter,
}

impl Config {
    pub fn with_fixed_time_step(mut self, nanos: u64) -> Self {
        self.fixed_time_step = nanos;
        self
    }

    pub fn with_max_frame_delta(mut self, delta: Duration) -> Self {
        self.max_frame_delta = delta;
        self
    }

    pub fn with_max_fixed_steps(mut self, steps: u32) -> Self {
        self.max_fixed_steps = steps;
        self
    }

    pub fn with_frame_pacing(mut self, pacing: Option<Duration>) -> Self {
        self.frame_pacing = pacing;
        self
    }

    pub fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fixed_time_step: SIXTY_FPS,
            max_frame_delta: Duration::from_millis(250),
            max_fixed_steps: 8,
            frame_pacing: Some(Duration::from_millis(1)),
            phase_capacity: DEFAULT_CAPACITY,
            log_level: LevelFilter::Info,
        }
    }
}
