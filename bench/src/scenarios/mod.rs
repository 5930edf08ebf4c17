//! Frame loop scenario benchmarks.
//!
//! These scenarios simulate many independent components subscribing per-frame work.
//!
//! # Scenarios
//!
//! - **Registry**: every subscriber goes through the update registry, one host hook per stage
//! - **Host hooks**: every subscriber attaches its own host hook, the per-object baseline

pub mod subscribers;

pub use subscribers::{Dispatch, SubscriberConfig, SubscriberScenario};

/// Common trait for benchmark scenarios.
pub trait Scenario {
    /// Human-readable name of the scenario.
    fn name(&self) -> &'static str;

    /// Brief description of what this scenario tests.
    fn description(&self) -> &'static str;

    /// Number of subscribers in this scenario.
    fn subscriber_count(&self) -> usize;

    /// Set up the scenario (create subscribers, wire the frame loop).
    fn setup(&mut self);

    /// Run one frame of the scenario.
    fn update(&mut self);

    /// Clean up the scenario.
    fn teardown(&mut self);
}
