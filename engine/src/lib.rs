//! Per-frame callback dispatch.
//!
//! Components subscribe plain callbacks to the phases of a frame loop through
//! [`update::Registry`]; an [`update::Driver`] attached to a [`core::Host`] dispatches each phase
//! once per frame, in registration order.
//!
//! - [`update`]: phases, callbacks, the registry and the driver.
//! - [`core`]: the host side: configuration, a reference frame loop, runners and logging.

pub mod core;
pub mod update;
