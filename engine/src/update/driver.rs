//! Binds registry dispatch to a host's frame stages.
//!
//! The [`Driver`] turns host stages into phase dispatches:
//!
//! | Host stage       | Phase dispatched                                  |
//! |------------------|---------------------------------------------------|
//! | `PreUpdate`      | `EarlyUpdate`                                     |
//! | `Update`         | `NormalUpdate`, then `EverySecondFrame` when due  |
//! | `PreLateUpdate`  | `LateUpdate`                                      |
//! | `PostLateUpdate` | `PostLateUpdate`                                  |
//! | `FixedUpdate`    | `FixedUpdate`                                     |
//!
//! # Usage
//!
//! ```rust,ignore
//! let registry = Rc::new(Registry::new());
//! let driver = Rc::new(Driver::new(Rc::clone(&registry)));
//! let mut frame_loop = FrameLoop::new(&Config::default());
//!
//! driver.setup(&mut frame_loop)?;
//! registry.add(Phase::NormalUpdate, &Callback::new(|| log::info!("update")));
//!
//! loop {
//!     frame_loop.tick();
//! }
//! ```

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use log::{info, warn};

use crate::{
    core::{
        State,
        host::{Hook, HookId, Host, HostError, Stage},
    },
    update::{Phase, RateDivider, Registry},
};

/// Period of the `EverySecondFrame` phase, in `NormalUpdate` ticks.
pub const EVERY_SECOND_FRAME_PERIOD: u32 = 2;

/// Dispatches registry phases from host stage hooks.
///
/// Setup is idempotent: only the first [`setup`](Self::setup) attaches hooks, later calls are
/// no-ops until [`teardown`](Self::teardown). The `on_*` entry points may also be called
/// directly by a host that does not implement [`Host`].
pub struct Driver {
    registry: Rc<Registry>,
    divider: Cell<RateDivider>,
    state: Cell<State>,
    hooks: RefCell<Vec<HookId>>,
}

impl Driver {
    pub fn new(registry: Rc<Registry>) -> Self {
        Self {
            registry,
            divider: Cell::new(RateDivider::new(EVERY_SECOND_FRAME_PERIOD)),
            state: Cell::new(State::Uninitialized),
            hooks: RefCell::new(Vec::new()),
        }
    }

    /// Attach the driver to every stage of `host`.
    ///
    /// Does nothing when already set up. If the host rejects a stage, hooks attached so far are
    /// detached again, the driver stays uninitialized and the error is returned.
    pub fn setup<H: Host + ?Sized>(self: &Rc<Self>, host: &mut H) -> Result<(), HostError> {
        if self.state.get().is_ready() {
            return Ok(());
        }

        let mut attached = Vec::with_capacity(Stage::COUNT);
        for stage in Stage::ALL {
            match host.attach(stage, self.hook(stage)) {
                Ok(id) => attached.push(id),
                Err(error) => {
                    for id in attached {
                        host.detach(id);
                    }
                    return Err(error);
                }
            }
        }

        self.reset_counter();
        *self.hooks.borrow_mut() = attached;
        self.state.set(State::Ready);
        info!("Update driver initialized");
        Ok(())
    }

    /// Detach from `host` and return to the uninitialized state. Registered callbacks are kept.
    ///
    /// Returns `false` when `host` does not hold the driver's hooks. Hooks the host does not
    /// know stay recorded and the driver stays ready, so tearing down against the wrong host
    /// never leads to a second set of hooks on the next [`setup`](Self::setup).
    pub fn teardown<H: Host + ?Sized>(&self, host: &mut H) -> bool {
        if !self.state.get().is_ready() {
            return true;
        }

        let mut hooks = self.hooks.borrow_mut();
        hooks.retain(|id| !host.detach(*id));
        if !hooks.is_empty() {
            warn!(
                "Update driver teardown left {} hooks attached to another host",
                hooks.len()
            );
            return false;
        }

        self.reset_counter();
        self.state.set(State::Uninitialized);
        info!("Update driver torn down");
        true
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state.get()
    }

    #[inline]
    pub fn registry(&self) -> &Rc<Registry> {
        &self.registry
    }

    /// `NormalUpdate` ticks counted towards the next `EverySecondFrame`.
    #[inline]
    pub fn frame_counter(&self) -> u32 {
        self.divider.get().count()
    }

    pub fn on_early_update(&self) {
        self.registry.dispatch(Phase::EarlyUpdate);
    }

    /// Dispatch `NormalUpdate`, then `EverySecondFrame` on every second call.
    pub fn on_normal_update(&self) {
        self.registry.dispatch(Phase::NormalUpdate);

        let mut divider = self.divider.get();
        let fire = divider.tick();
        self.divider.set(divider);
        if fire {
            self.registry.dispatch(Phase::EverySecondFrame);
        }
    }

    pub fn on_late_update(&self) {
        self.registry.dispatch(Phase::LateUpdate);
    }

    pub fn on_post_late_update(&self) {
        self.registry.dispatch(Phase::PostLateUpdate);
    }

    pub fn on_fixed_update(&self) {
        self.registry.dispatch(Phase::FixedUpdate);
    }

    /// Run the variable-rate entry points of one frame in order, without a host.
    pub fn tick(&self) {
        self.on_early_update();
        self.on_normal_update();
        self.on_late_update();
        self.on_post_late_update();
    }

    fn reset_counter(&self) {
        let mut divider = self.divider.get();
        divider.reset();
        self.divider.set(divider);
    }

    fn hook(self: &Rc<Self>, stage: Stage) -> Hook {
        let driver: Weak<Self> = Rc::downgrade(self);
        let entry: fn(&Driver) = match stage {
            Stage::FixedUpdate => Driver::on_fixed_update,
            Stage::PreUpdate => Driver::on_early_update,
            Stage::Update => Driver::on_normal_update,
            Stage::PreLateUpdate => Driver::on_late_update,
            Stage::PostLateUpdate => Driver::on_post_late_update,
        };
        Box::new(move || {
            if let Some(driver) = driver.upgrade() {
                entry(&driver);
            }
        })
    }
}
