//! Phase labels for the frame loop.
//!
//! A [`Phase`] names a point in the per-frame execution order at which a batch of
//! subscribed callbacks runs. The set is closed:
//!
//! ```text
//! variable-rate frame
//!   ├── EarlyUpdate
//!   ├── NormalUpdate
//!   │     └── EverySecondFrame   (derived, every 2nd NormalUpdate)
//!   ├── LateUpdate
//!   └── PostLateUpdate
//!
//! fixed-rate step (independent cadence)
//!   └── FixedUpdate
//! ```

use std::fmt;

/// A named stage of the frame loop that callbacks subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Runs first in a frame, before any other update work.
    EarlyUpdate,
    /// The regular per-frame update.
    NormalUpdate,
    /// Runs after all normal updates of the frame.
    LateUpdate,
    /// Runs last, right before the next frame starts.
    PostLateUpdate,
    /// Runs on the host's fixed-step cadence.
    FixedUpdate,
    /// Derived from `NormalUpdate`: runs once every second frame.
    EverySecondFrame,
}

impl Phase {
    /// Number of distinct phases.
    pub const COUNT: usize = 6;

    /// Every phase, in declaration order.
    pub const ALL: [Phase; Phase::COUNT] = [
        Phase::EarlyUpdate,
        Phase::NormalUpdate,
        Phase::LateUpdate,
        Phase::PostLateUpdate,
        Phase::FixedUpdate,
        Phase::EverySecondFrame,
    ];

    /// Dense index of this phase, suitable for array storage.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Human-readable name, used for logging.
    pub const fn name(self) -> &'static str {
        match self {
            Phase::EarlyUpdate => "EarlyUpdate",
            Phase::NormalUpdate => "NormalUpdate",
            Phase::LateUpdate => "LateUpdate",
            Phase::PostLateUpdate => "PostLateUpdate",
            Phase::FixedUpdate => "FixedUpdate",
            Phase::EverySecondFrame => "EverySecondFrame",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
