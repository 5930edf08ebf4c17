use crate::core::frame_loop::FrameLoop;
mod frames;
mod looped;
mod once;

#[derive(Debug, PartialEq, Eq)]
pub enum RunResult {
    /// The runner ran all the frames it was asked to.
    Completed,
    /// The runner was told to stop.
    Stopped,
}

/// Drives a frame loop until the runner decides to return.
pub type Runner = Box<dyn FnOnce(&mut FrameLoop) -> RunResult>;

pub use frames::frames;
pub use looped::looped;
pub use once::once;
