//! The host side of the frame loop.
//!
//! A host owns the frame clock and exposes one hook list per [`Stage`]. Each frame it runs the
//! hooks of every variable-rate stage once, in stage order, and the fixed stage once per fixed
//! step. The update [`Driver`](crate::update::Driver) attaches itself to these stages.

use std::{
    error::Error,
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

/// A stage of the host's frame, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Fixed-step stage, run zero or more times at the start of a frame.
    FixedUpdate,
    PreUpdate,
    Update,
    /// Stage in which regular late-update work runs.
    PreLateUpdate,
    PostLateUpdate,
}

impl Stage {
    pub const COUNT: usize = 5;

    /// All stages, in the order a frame runs them.
    pub const ALL: [Stage; Stage::COUNT] = [
        Stage::FixedUpdate,
        Stage::PreUpdate,
        Stage::Update,
        Stage::PreLateUpdate,
        Stage::PostLateUpdate,
    ];

    /// The variable-rate stages, in the order a frame runs them.
    pub const VARIABLE: [Stage; 4] = [
        Stage::PreUpdate,
        Stage::Update,
        Stage::PreLateUpdate,
        Stage::PostLateUpdate,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

static NEXT_HOOK_ID: AtomicU64 = AtomicU64::new(0);

/// Opaque handle of an attached hook, used to detach it again.
///
/// Ids are unique across all hosts of the process, so a host never mistakes another host's
/// hook for one of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

impl HookId {
    /// Allocate a fresh id.
    #[inline]
    pub fn next() -> Self {
        Self(NEXT_HOOK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A function run by the host at a stage.
pub type Hook = Box<dyn FnMut()>;

/// A frame loop that accepts per-stage hooks.
pub trait Host {
    /// Attach `hook` to `stage`. Hooks of a stage run in attach order.
    fn attach(&mut self, stage: Stage, hook: Hook) -> Result<HookId, HostError>;

    /// Detach a previously attached hook. Returns `false` if the id is unknown.
    fn detach(&mut self, id: HookId) -> bool;
}

/// Errors raised while wiring into a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostError {
    /// The host does not provide the requested stage.
    StageUnavailable(Stage),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HostError::StageUnavailable(stage) => {
                write!(f, "host does not provide the {stage:?} stage")
            }
        }
    }
}

impl Error for HostError {}
