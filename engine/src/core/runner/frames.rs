use std::time::Duration;

use crate::core::{
    frame_loop::FrameLoop,
    runner::{RunResult, Runner},
};

/// Runner that steps `count` frames, each advancing the clock by `delta`.
pub fn frames(count: u64, delta: Duration) -> Runner {
    Box::new(move |frame_loop: &mut FrameLoop| {
        for _ in 0..count {
            frame_loop.step(delta);
        }
        RunResult::Completed
    })
}
