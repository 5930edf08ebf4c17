//! Log capture for the frame loop.
//!
//! The crate logs through the `log` facade. [`ChannelLogger`] is a `log::Log` backend that
//! forwards records over a channel so the thread owning the output can drain them at its own
//! pace.

mod channel;

pub use channel::{ChannelLogger, LogMessage};
