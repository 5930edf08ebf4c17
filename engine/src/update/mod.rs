//! Phase-based update callbacks.
//!
//! This module provides the [`Registry`] for subscribing callbacks to named phases of the frame
//! loop, and the [`Driver`] that dispatches those phases from a host's frame stages.
//!
//! # Architecture
//!
//! ```text
//! Host frame ─► Driver hook ─► Registry::dispatch(phase) ─► callbacks in add order
//!
//! Registry
//!   ├── EarlyUpdate      ─► [start_jobs, ...]
//!   ├── NormalUpdate     ─► [move_player, animate, ...]
//!   ├── LateUpdate       ─► [follow_camera, ...]
//!   ├── PostLateUpdate   ─► [finish_jobs, ...]
//!   ├── FixedUpdate      ─► [integrate_bodies, ...]
//!   └── EverySecondFrame ─► [refresh_minimap, ...]
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use rusty_update::update::{Callback, Driver, Phase, Registry};
//!
//! let registry = Rc::new(Registry::new());
//! let driver = Rc::new(Driver::new(Rc::clone(&registry)));
//!
//! // On enable
//! let update = Callback::new(|| log::info!("update"));
//! registry.add(Phase::NormalUpdate, &update);
//!
//! driver.tick();
//!
//! // On disable: every add needs a matching remove
//! registry.remove(Phase::NormalUpdate, &update);
//! ```

mod callback;
mod divider;
pub mod driver;
mod phase;
pub mod registry;

pub use callback::{Callback, Runnable};
pub use divider::RateDivider;
pub use driver::Driver;
pub use phase::Phase;
pub use registry::{Action, Diagnostic, Registry};
