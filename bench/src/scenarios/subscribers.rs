//! Subscriber benchmark scenario.
//!
//! Simulates a scene of components, each subscribing a small unit of work to one phase:
//! - Phases are picked at random, weighted towards `NormalUpdate`
//! - A number of subscribers are disabled and re-enabled every frame (churn)
//!
//! This scenario tests:
//! - Dispatch overhead across all phases of a frame
//! - Subscribe/unsubscribe cost under churn
//! - Registry dispatch against one host hook per subscriber

use std::{cell::Cell, hint::black_box, rc::Rc, time::Duration};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rusty_update::{
    core::{Config, FrameLoop, Host, Stage, host::HookId},
    update::{Callback, Driver, Phase, Registry},
};

use crate::scenarios::Scenario;

/// How subscribers are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Through the update registry and driver.
    Registry,
    /// One host hook per subscriber.
    HostHooks,
}

/// Configuration for the subscriber benchmark.
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub subscriber_count: usize,
    /// Subscribers disabled and re-enabled each frame.
    pub churn_per_frame: usize,
    /// Simulated delta time per frame.
    pub frame_delta: Duration,
    /// Random seed for reproducibility.
    pub seed: u64,
    pub dispatch: Dispatch,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            subscriber_count: 10_000,
            churn_per_frame: 16,
            frame_delta: Duration::from_micros(16_667), // 60 FPS
            seed: 12345,
            dispatch: Dispatch::Registry,
        }
    }
}

struct Subscriber {
    phase: Phase,
    callback: Callback,
    hook: Option<HookId>,
}

pub struct SubscriberScenario {
    config: SubscriberConfig,
    rng: ChaCha8Rng,
    frame_loop: FrameLoop,
    registry: Rc<Registry>,
    driver: Rc<Driver>,
    subscribers: Vec<Subscriber>,
    /// Units of work run so far, summed across subscribers.
    work: Rc<Cell<u64>>,
}

impl SubscriberScenario {
    pub fn with_config(config: SubscriberConfig) -> Self {
        let registry = Rc::new(Registry::with_capacity(config.subscriber_count));
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            frame_loop: FrameLoop::new(&Config::default()),
            driver: Rc::new(Driver::new(Rc::clone(&registry))),
            registry,
            subscribers: Vec::with_capacity(config.subscriber_count),
            work: Rc::new(Cell::new(0)),
            config,
        }
    }

    /// Total units of work run by subscribers.
    pub fn work_done(&self) -> u64 {
        self.work.get()
    }

    fn random_phase(&mut self) -> Phase {
        match self.rng.gen_range(0..10) {
            0 => Phase::EarlyUpdate,
            1..=5 => Phase::NormalUpdate,
            6 => Phase::LateUpdate,
            7 => Phase::PostLateUpdate,
            8 => Phase::FixedUpdate,
            _ => Phase::EverySecondFrame,
        }
    }

    fn enable(&mut self, index: usize) {
        let subscriber = &mut self.subscribers[index];
        match self.config.dispatch {
            Dispatch::Registry => self.registry.add(subscriber.phase, &subscriber.callback),
            Dispatch::HostHooks => {
                let callback = subscriber.callback.clone();
                let stage = stage_for(subscriber.phase);
                subscriber.hook = self
                    .frame_loop
                    .attach(stage, Box::new(move || callback.invoke()))
                    .ok();
            }
        }
    }

    fn disable(&mut self, index: usize) {
        let subscriber = &mut self.subscribers[index];
        match self.config.dispatch {
            Dispatch::Registry => self.registry.remove(subscriber.phase, &subscriber.callback),
            Dispatch::HostHooks => {
                if let Some(hook) = subscriber.hook.take() {
                    self.frame_loop.detach(hook);
                }
            }
        }
    }
}

/// Host stage a per-subscriber hook attaches to. Every-second-frame work runs in `Update` and
/// skips odd frames itself.
fn stage_for(phase: Phase) -> Stage {
    match phase {
        Phase::EarlyUpdate => Stage::PreUpdate,
        Phase::NormalUpdate | Phase::EverySecondFrame => Stage::Update,
        Phase::LateUpdate => Stage::PreLateUpdate,
        Phase::PostLateUpdate => Stage::PostLateUpdate,
        Phase::FixedUpdate => Stage::FixedUpdate,
    }
}

impl Scenario for SubscriberScenario {
    fn name(&self) -> &'static str {
        match self.config.dispatch {
            Dispatch::Registry => "subscribers/registry",
            Dispatch::HostHooks => "subscribers/host_hooks",
        }
    }

    fn description(&self) -> &'static str {
        "Many components with per-frame work, dispatched by phase with subscription churn"
    }

    fn subscriber_count(&self) -> usize {
        self.config.subscriber_count
    }

    fn setup(&mut self) {
        if self.config.dispatch == Dispatch::Registry {
            self.driver
                .setup(&mut self.frame_loop)
                .expect("frame loop provides every stage");
        }

        for index in 0..self.config.subscriber_count {
            let phase = self.random_phase();
            let work = Rc::clone(&self.work);
            let callback = if phase == Phase::EverySecondFrame
                && self.config.dispatch == Dispatch::HostHooks
            {
                let parity = Cell::new(false);
                Callback::new(move || {
                    parity.set(!parity.get());
                    if !parity.get() {
                        work.set(black_box(work.get() + 1));
                    }
                })
            } else {
                Callback::new(move || work.set(black_box(work.get() + 1)))
            };
            self.subscribers.push(Subscriber {
                phase,
                callback,
                hook: None,
            });
            self.enable(index);
        }
    }

    fn update(&mut self) {
        let churn = if self.subscribers.is_empty() {
            0
        } else {
            self.config.churn_per_frame
        };
        for _ in 0..churn {
            let index = self.rng.gen_range(0..self.subscribers.len());
            self.disable(index);
            self.enable(index);
        }
        self.frame_loop.step(self.config.frame_delta);
    }

    fn teardown(&mut self) {
        for index in 0..self.subscribers.len() {
            self.disable(index);
        }
        self.subscribers.clear();
        self.driver.teardown(&mut self.frame_loop);
    }
}
