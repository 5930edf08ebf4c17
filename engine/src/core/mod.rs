pub mod config;
pub mod frame_loop;
pub mod host;
pub mod log;
pub mod runner;
mod state;
pub mod time;

pub use config::Config;
pub use frame_loop::FrameLoop;
pub use host::{Host, HostError, Stage};
pub use state::State;
pub use time::Time;
