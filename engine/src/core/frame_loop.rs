//! Reference host: a fixed/variable timestep frame loop with per-stage hooks.
//!
//! ```text
//! FrameLoop::step(delta)
//!   ├─► clamp delta to max_frame_delta
//!   ├─► FixedUpdate hooks × accumulated fixed steps (≤ max_fixed_steps)
//!   ├─► PreUpdate hooks
//!   ├─► Update hooks
//!   ├─► PreLateUpdate hooks
//!   └─► PostLateUpdate hooks
//! ```

use std::time::Duration;

use log::{trace, warn};

use crate::core::{
    config::Config,
    host::{Hook, HookId, Host, HostError, Stage},
    time::Time,
};

/// A frame loop that runs attached hooks stage by stage.
///
/// [`tick`](Self::tick) measures the frame delta from the wall clock, [`step`](Self::step)
/// takes it from the caller, which keeps tests and replays deterministic.
pub struct FrameLoop {
    time: Time,
    hooks: [Vec<(HookId, Hook)>; Stage::COUNT],
    max_frame_delta: Duration,
    max_fixed_steps: u32,
    frames: u64,
    fixed_steps: u64,
}

impl FrameLoop {
    pub fn new(config: &Config) -> Self {
        Self {
            time: Time::new(config.fixed_time_step),
            hooks: Default::default(),
            max_frame_delta: config.max_frame_delta,
            max_fixed_steps: config.max_fixed_steps,
            frames: 0,
            fixed_steps: 0,
        }
    }

    /// Run one frame using the wall-clock time elapsed since the previous frame.
    pub fn tick(&mut self) {
        let delta = self.time.elapsed();
        self.step(delta);
    }

    /// Run one frame that advances the clock by `delta`.
    pub fn step(&mut self, delta: Duration) {
        let delta = if delta > self.max_frame_delta {
            warn!(
                "frame delta {:?} exceeds {:?}, clamping",
                delta, self.max_frame_delta
            );
            self.max_frame_delta
        } else {
            delta
        };
        self.time = self.time.advance(delta);

        let mut steps = 0;
        while self.time.has_fixed() {
            if steps == self.max_fixed_steps {
                warn!("dropping fixed step backlog after {steps} steps");
                self.time.discard_fixed();
                break;
            }
            self.time.increment_fixed();
            self.run_stage(Stage::FixedUpdate);
            steps += 1;
        }
        self.fixed_steps += u64::from(steps);

        for stage in Stage::VARIABLE {
            self.run_stage(stage);
        }
        self.frames += 1;
        trace!("frame {} complete ({steps} fixed steps)", self.frames);
    }

    /// Restart the wall clock, dropping any fixed step backlog. Use after the loop was paused.
    pub fn reset_clock(&mut self) {
        self.time.reset_now();
    }

    /// Number of frames run so far.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Number of fixed steps run so far.
    #[inline]
    pub fn fixed_step_count(&self) -> u64 {
        self.fixed_steps
    }

    #[inline]
    pub fn time(&self) -> &Time {
        &self.time
    }

    /// Number of hooks attached to `stage`.
    pub fn hook_count(&self, stage: Stage) -> usize {
        self.hooks[stage.index()].len()
    }

    fn run_stage(&mut self, stage: Stage) {
        for (_, hook) in self.hooks[stage.index()].iter_mut() {
            hook();
        }
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Host for FrameLoop {
    fn attach(&mut self, stage: Stage, hook: Hook) -> Result<HookId, HostError> {
        let id = HookId::next();
        self.hooks[stage.index()].push((id, hook));
        Ok(id)
    }

    fn detach(&mut self, id: HookId) -> bool {
        for hooks in self.hooks.iter_mut() {
            if let Some(index) = hooks.iter().position(|(hook_id, _)| *hook_id == id) {
                hooks.remove(index);
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    const STEP: u64 = 10_000_000;

    fn config() -> Config {
        Config::default()
            .with_fixed_time_step(STEP)
            .with_max_frame_delta(Duration::from_millis(100))
            .with_max_fixed_steps(4)
    }

    fn recording_loop() -> (FrameLoop, Rc<RefCell<Vec<Stage>>>) {
        let mut frame_loop = FrameLoop::new(&config());
        let journal = Rc::new(RefCell::new(Vec::new()));
        for stage in Stage::ALL {
            let journal = Rc::clone(&journal);
            frame_loop
                .attach(stage, Box::new(move || journal.borrow_mut().push(stage)))
                .unwrap();
        }
        (frame_loop, journal)
    }

    #[test]
    fn frame_runs_stages_in_order() {
        // Given
        let (mut frame_loop, journal) = recording_loop();

        // When
        frame_loop.step(Duration::from_nanos(STEP));

        // Then
        assert_eq!(
            *journal.borrow(),
            vec![
                Stage::FixedUpdate,
                Stage::PreUpdate,
                Stage::Update,
                Stage::PreLateUpdate,
                Stage::PostLateUpdate,
            ]
        );
        assert_eq!(frame_loop.frame_count(), 1);
    }

    #[test]
    fn fixed_stage_follows_accumulated_time() {
        // Given
        let (mut frame_loop, journal) = recording_loop();

        // When: half a step, then two and a half steps
        frame_loop.step(Duration::from_nanos(STEP / 2));
        frame_loop.step(Duration::from_nanos(STEP * 5 / 2));

        // Then
        let fixed = journal
            .borrow()
            .iter()
            .filter(|s| **s == Stage::FixedUpdate)
            .count();
        assert_eq!(fixed, 3);
        assert_eq!(frame_loop.fixed_step_count(), 3);
        assert_eq!(frame_loop.frame_count(), 2);
    }

    #[test]
    fn long_frames_are_clamped() {
        let (mut frame_loop, _journal) = recording_loop();

        frame_loop.step(Duration::from_secs(5));

        assert_eq!(frame_loop.time().delta, Duration::from_millis(100));
    }

    #[test]
    fn fixed_backlog_is_bounded() {
        // Given: 100ms of backlog is 10 steps, bounded to 4
        let (mut frame_loop, _journal) = recording_loop();

        // When
        frame_loop.step(Duration::from_millis(100));

        // Then
        assert_eq!(frame_loop.fixed_step_count(), 4);
        assert!(!frame_loop.time().has_fixed());
    }

    #[test]
    fn hooks_run_in_attach_order() {
        let mut frame_loop = FrameLoop::new(&config());
        let journal = Rc::new(RefCell::new(Vec::new()));
        for label in [1, 2, 3] {
            let journal = Rc::clone(&journal);
            frame_loop
                .attach(Stage::Update, Box::new(move || journal.borrow_mut().push(label)))
                .unwrap();
        }

        frame_loop.step(Duration::ZERO);

        assert_eq!(*journal.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn detach_removes_hook() {
        // Given
        let mut frame_loop = FrameLoop::default();
        let first = frame_loop.attach(Stage::Update, Box::new(|| {})).unwrap();
        let second = frame_loop.attach(Stage::PreUpdate, Box::new(|| {})).unwrap();
        assert_ne!(first, second);

        // When
        let removed = frame_loop.detach(first);

        // Then
        assert!(removed);
        assert!(!frame_loop.detach(first));
        assert_eq!(frame_loop.hook_count(Stage::Update), 0);
        assert_eq!(frame_loop.hook_count(Stage::PreUpdate), 1);
    }

    #[test]
    fn tick_uses_wall_clock() {
        let mut frame_loop = FrameLoop::default();
        frame_loop.tick();
        frame_loop.tick();
        assert_eq!(frame_loop.frame_count(), 2);
        assert!(frame_loop.time().delta <= Duration::from_millis(250));
    }
}
