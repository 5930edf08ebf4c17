use std::time::{Duration, Instant};

pub const SIXTY_FPS: u64 = 16_666_666;
pub const ONE_FPS: u64 = 1_000_000_000;

/// A Time value represents a specific amount of time elapsed within the frame loop for a single
/// frame. Each value captures total elapsed time as well as the delta time since the last frame.
/// New values are intended to be generated from a previous one using `advance()`, with either
/// the wall-clock `elapsed()` or a caller supplied delta. Generally this is invoked once per
/// iteration of the loop.
#[derive(Debug, Copy, Clone)]
pub struct Time {
    // The instant the previous frame was measured
    instant: Instant,
    pub fixed_time_step: u64,
    /// The time delta since the last frame
    pub delta: Duration,
    /// The total elapsed time since the first frame
    pub time: Duration,
    /// The total elapsed time since the first frame but incremented by the fixed time step
    pub fixed_time: Duration,
    /// An accumulator for fixed time step calculations
    accumulator: u64,
}

impl Time {
    /// Construct a new `Time` with delta and time set to `0`. Caller must provide a fixed time
    /// step in nano seconds.
    pub fn new(fixed_time_step: u64) -> Self {
        Self {
            fixed_time_step,
            instant: Instant::now(),
            delta: Duration::ZERO,
            time: Duration::ZERO,
            fixed_time: Duration::ZERO,
            accumulator: 0,
        }
    }

    /// Increment the fixed frame time accumulation
    pub fn increment_fixed(&mut self) {
        self.fixed_time += Duration::from_nanos(self.fixed_time_step);
        self.accumulator -= self.fixed_time_step;
    }

    /// Wall-clock time since this frame was created.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.instant.elapsed()
    }

    /// Create the next frame with an explicit delta, independent of the wall clock.
    pub fn advance(self, delta: Duration) -> Self {
        Self {
            fixed_time_step: self.fixed_time_step,
            instant: Instant::now(),
            delta,
            time: self.time + delta,
            fixed_time: self.fixed_time,
            accumulator: self.accumulator + delta.as_nanos() as u64,
        }
    }

    /// Determine whether this frame has accumulated enough delta for a fixed frame.
    pub fn has_fixed(&self) -> bool {
        self.accumulator >= self.fixed_time_step
    }

    /// Drop any accumulated time that has not been consumed by fixed steps yet.
    pub fn discard_fixed(&mut self) {
        self.accumulator = 0;
    }

    /// Reset the time frame to now with zeroed accumulator. This is useful for situations where
    /// the loop is paused and resumed.
    pub fn reset_now(&mut self) {
        self.instant = Instant::now();
        self.accumulator = 0;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new(SIXTY_FPS)
    }
}
