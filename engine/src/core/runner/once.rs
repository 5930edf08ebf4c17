use crate::core::{frame_loop::FrameLoop, runner::RunResult};

/// Run a single wall-clock frame.
pub fn once(frame_loop: &mut FrameLoop) -> RunResult {
    frame_loop.tick();
    RunResult::Completed
}
