use std::sync::mpsc::{SyncSender, TrySendError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use log::{error, info, trace, warn};

use crate::error::Anomaly;
use crate::instruction::decode;
use crate::state::{lock, Clock, State};

/// Something that happened inside a running machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started { cycle_limit: Option<u64> },
    Halted { cycles: u64 },
    /// An instruction at `pc` was skipped.
    Anomaly { pc: u16, anomaly: Anomaly },
}

pub(crate) type Subscribers = Vec<SyncSender<Event>>;

/// What the cycle, timer and watchdog loops share.
///
/// `state` is only written by whoever is running cycles; `clock` is written by every loop.
/// When both are needed `state` is always locked first.
pub(crate) struct Shared {
    pub state: Mutex<State>,
    pub clock: Mutex<Clock>,
    subscribers: Mutex<Subscribers>,
}

impl Shared {
    pub fn new(state: State) -> Self {
        Shared {
            state: Mutex::new(state),
            clock: Mutex::new(Clock::default()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.clock).running
    }

    pub fn subscribe(&self, subscriber: SyncSender<Event>) {
        self.subscribers().push(subscriber);
    }

    pub fn subscribers(&self) -> MutexGuard<'_, Subscribers> {
        lock(&self.subscribers)
    }

    /// Fetches, decodes and executes the instruction at the pc, then counts the cycle.
    pub fn cycle(&self) {
        let mut state = lock(&self.state);
        let pc = state.pc;
        let op = state.fetch();
        state.pc = pc.wrapping_add(2);
        trace!(
            "{:04X} v{:02X?} i{:04X} pc{:04X}",
            op,
            state.v,
            state.i,
            pc
        );
        let outcome = decode(op).execute(&mut state, &self.clock);
        drop(state);

        lock(&self.clock).cycles += 1;

        if let Err(anomaly) = outcome {
            self.emit(Event::Anomaly { pc, anomaly });
        }
    }

    pub fn emit(&self, event: Event) {
        deliver(&mut self.subscribers(), event);
    }
}

/// Logs `event` and offers it to every subscriber.
///
/// A subscriber with a full queue misses the event. One whose receiver is gone is removed.
pub(crate) fn deliver(subscribers: &mut Subscribers, event: Event) {
    match &event {
        Event::Started { cycle_limit: Some(limit) } => {
            info!("started, halting after {} cycles", limit)
        }
        Event::Started { cycle_limit: None } => info!("started"),
        Event::Halted { cycles } => info!("halted after {} cycles", cycles),
        Event::Anomaly {
            pc,
            anomaly: anomaly @ Anomaly::UnknownOpcode(_),
        } => warn!("{:#05X}: {}", pc, anomaly),
        Event::Anomaly { pc, anomaly } => error!("{:#05X}: {}", pc, anomaly),
    }
    subscribers.retain(|subscriber| match subscriber.try_send(event.clone()) {
        Ok(()) | Err(TrySendError::Full(_)) => true,
        Err(TrySendError::Disconnected(_)) => false,
    });
}

/// Runs cycles at `period` intervals until the machine stops.
///
/// The time a cycle took is subtracted from the sleep that follows it; a slow cycle is not made
/// up for later.
pub(crate) fn run_cpu(shared: Arc<Shared>, period: Duration) {
    while shared.is_running() {
        let started = Instant::now();
        shared.cycle();
        let elapsed = started.elapsed();
        if period > elapsed {
            thread::sleep(period - elapsed);
        }
    }
    let cycles = lock(&shared.clock).cycles;
    shared.emit(Event::Halted { cycles });
}

/// Counts the delay and sound timers down once per `period` until the machine stops.
pub(crate) fn run_timers(shared: Arc<Shared>, period: Duration) {
    loop {
        {
            let mut clock = lock(&shared.clock);
            if !clock.running {
                break;
            }
            clock.tick();
        }
        thread::sleep(period);
    }
}

/// Stops the machine once more than `limit` cycles have run.
pub(crate) fn run_watchdog(shared: Arc<Shared>, limit: u64, period: Duration) {
    loop {
        {
            let mut clock = lock(&shared.clock);
            if !clock.running {
                break;
            }
            if clock.cycles > limit {
                info!("cycle limit of {} reached", limit);
                clock.running = false;
                break;
            }
        }
        thread::sleep(period);
    }
}
