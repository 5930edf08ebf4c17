use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use log::info;

use crate::core::{
    frame_loop::FrameLoop,
    runner::{RunResult, Runner},
};

/// Runner that ticks on the wall clock until `stop` is set, sleeping `pacing` between frames.
pub fn looped(stop: Arc<AtomicBool>, pacing: Option<Duration>) -> Runner {
    Box::new(move |frame_loop: &mut FrameLoop| {
        frame_loop.reset_clock();
        loop {
            if stop.load(Ordering::Relaxed) {
                info!("Ending frame loop due to stop handle");
                return RunResult::Stopped;
            }
            frame_loop.tick();
            if let Some(pacing) = pacing {
                std::thread::sleep(pacing);
            }
        }
    })
}
