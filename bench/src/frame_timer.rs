//! Frame timing utilities for measuring frame loop performance.
//!
//! Tracks per-frame durations and derives average, percentile and extreme frame times.

use std::time::{Duration, Instant};

use rusty_update::core::FrameLoop;

/// Statistics collected from frame timing measurements.
#[derive(Debug, Clone)]
pub struct FrameStats {
    /// Total number of frames measured.
    pub frame_count: usize,
    /// Total duration of all frames.
    pub total_duration: Duration,
    pub min_frame_time: Duration,
    pub max_frame_time: Duration,
    /// Sorted frame times for percentile calculations.
    sorted_times: Vec<Duration>,
}

impl FrameStats {
    /// Create new frame stats from a collection of frame times.
    pub fn from_times(mut times: Vec<Duration>) -> Self {
        times.sort();
        Self {
            frame_count: times.len(),
            total_duration: times.iter().sum(),
            min_frame_time: times.first().copied().unwrap_or(Duration::ZERO),
            max_frame_time: times.last().copied().unwrap_or(Duration::ZERO),
            sorted_times: times,
        }
    }

    /// Average frame time.
    pub fn average(&self) -> Duration {
        if self.frame_count == 0 {
            Duration::ZERO
        } else {
            self.total_duration / self.frame_count as u32
        }
    }

    /// Get a specific percentile (0-100).
    pub fn percentile(&self, p: usize) -> Duration {
        if self.sorted_times.is_empty() {
            return Duration::ZERO;
        }
        let p = p.min(100);
        let index = (self.sorted_times.len() * p / 100).min(self.sorted_times.len() - 1);
        self.sorted_times[index]
    }

    pub fn median(&self) -> Duration {
        self.percentile(50)
    }

    /// 99th percentile (worst 1% of frames).
    pub fn p99(&self) -> Duration {
        self.percentile(99)
    }
}

impl std::fmt::Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} frames, avg: {:.3}ms, median: {:.3}ms, p99: {:.3}ms, max: {:.3}ms",
            self.frame_count,
            self.average().as_secs_f64() * 1000.0,
            self.median().as_secs_f64() * 1000.0,
            self.p99().as_secs_f64() * 1000.0,
            self.max_frame_time.as_secs_f64() * 1000.0,
        )
    }
}

/// Timer for measuring individual frames in a loop.
pub struct FrameTimer {
    frame_times: Vec<Duration>,
    frame_start: Option<Instant>,
}

impl FrameTimer {
    /// Create a new frame timer with pre-allocated capacity.
    pub fn new(expected_frames: usize) -> Self {
        Self {
            frame_times: Vec::with_capacity(expected_frames),
            frame_start: None,
        }
    }

    pub fn begin_frame(&mut self) {
        self.frame_start = Some(Instant::now());
    }

    /// Mark the end of a frame and record the duration. Ignored without a matching begin.
    pub fn end_frame(&mut self) {
        if let Some(start) = self.frame_start.take() {
            self.frame_times.push(start.elapsed());
        }
    }

    pub fn stats(self) -> FrameStats {
        FrameStats::from_times(self.frame_times)
    }
}

/// Call `frame_fn` `frame_count` times and time each call.
pub fn measure_frames<F>(frame_count: usize, mut frame_fn: F) -> FrameStats
where
    F: FnMut(usize),
{
    let mut timer = FrameTimer::new(frame_count);
    for frame in 0..frame_count {
        timer.begin_frame();
        frame_fn(frame);
        timer.end_frame();
    }
    timer.stats()
}

/// Step `frame_loop` `frame_count` times with a constant `delta` and time each frame.
pub fn measure_frame_loop(
    frame_loop: &mut FrameLoop,
    frame_count: usize,
    delta: Duration,
) -> FrameStats {
    measure_frames(frame_count, |_| frame_loop.step(delta))
}
