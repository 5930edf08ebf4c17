use std::{cell::Cell, env, error::Error, rc::Rc, time::Duration};

use crossbeam::channel::Receiver;
use log::{debug, info};
use rusty_update::{
    core::{
        Config, FrameLoop,
        log::{ChannelLogger, LogMessage},
        runner,
    },
    update::{Callback, Driver, Phase, Registry},
};

const DEFAULT_FRAMES: u64 = 120;
const FRAME_DELTA: Duration = Duration::from_micros(16_667);

/// A component that subscribes to every phase while enabled and counts what it receives.
struct Probe {
    name: &'static str,
    hits: Rc<[Cell<u64>; Phase::COUNT]>,
    callbacks: Vec<(Phase, Callback)>,
}

impl Probe {
    fn new(name: &'static str) -> Self {
        let hits: Rc<[Cell<u64>; Phase::COUNT]> = Rc::new(Default::default());
        let callbacks = Phase::ALL
            .into_iter()
            .map(|phase| {
                let hits = Rc::clone(&hits);
                let callback = Callback::new(move || {
                    let slot = &hits[phase.index()];
                    slot.set(slot.get() + 1);
                    debug!("{name}: {phase}");
                });
                (phase, callback)
            })
            .collect();
        Self {
            name,
            hits,
            callbacks,
        }
    }

    fn enable(&self, registry: &Registry) {
        for (phase, callback) in &self.callbacks {
            registry.add(*phase, callback);
        }
    }

    fn disable(&self, registry: &Registry) {
        for (phase, callback) in &self.callbacks {
            registry.remove(*phase, callback);
        }
    }

    fn report(&self) {
        for phase in Phase::ALL {
            info!("{}: {phase} ran {} times", self.name, self.hits[phase.index()].get());
        }
    }
}

fn drain(receiver: &Receiver<LogMessage>) {
    for message in receiver.try_iter() {
        println!("{:<5} [{}] {}", message.level, message.target, message.message);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let frames = match env::args().nth(1) {
        Some(arg) => arg.parse::<u64>()?,
        None => DEFAULT_FRAMES,
    };

    let config = Config::default();
    let (logger, log_recv) = ChannelLogger::with_receiver();
    logger.with_level(config.log_level).install()?;

    let mut frame_loop = FrameLoop::new(&config);
    let registry = Rc::new(Registry::with_capacity(config.phase_capacity));
    let driver = Rc::new(Driver::new(Rc::clone(&registry)));
    driver.setup(&mut frame_loop)?;

    let always = Probe::new("always");
    let transient = Probe::new("transient");
    always.enable(&registry);
    transient.enable(&registry);

    runner::frames(frames / 2, FRAME_DELTA)(&mut frame_loop);
    transient.disable(&registry);
    runner::frames(frames - frames / 2, FRAME_DELTA)(&mut frame_loop);

    info!(
        "Ran {} frames with {} fixed steps",
        frame_loop.frame_count(),
        frame_loop.fixed_step_count()
    );
    always.report();
    transient.report();

    always.disable(&registry);
    driver.teardown(&mut frame_loop);
    drain(&log_recv);
    Ok(())
}
