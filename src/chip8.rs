use std::io::{self, Read};
use std::ops::Range;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use log::{debug, error, info};

use crate::config::Config;
use crate::constants::{EVENT_CAPACITY, KEY_COUNT, REGISTER_COUNT};
use crate::driver::{deliver, run_cpu, run_timers, run_watchdog, Event, Shared};
use crate::error::{Error, Result};
use crate::state::{lock, Clock, FrameBuffer, State};

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Instructions run on a background thread at `Config::instruction_hz` while a second thread
/// counts the timers down at `Config::timer_hz`. Every method takes `&self`, so a display or
/// input thread can hold the machine behind an `Arc` while it runs.
///
/// Is interfaced with by the outside world via methods to:
/// - load roms
/// - start, stop and reset execution, or advance a stopped machine by a single cycle
/// - press and release keys
/// - inspect registers, memory and timers
/// - inspect its frame buffer for rendering by some display
/// - subscribe to lifecycle and anomaly events
pub struct Chip8 {
    config: Config,
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

/// A consistent copy of the whole machine taken under both locks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub state: State,
    pub clock: Clock,
}

impl Chip8 {
    pub fn new() -> Self {
        Chip8::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Chip8 {
            config,
            shared: Arc::new(Shared::new(State::new(config.origin))),
            workers: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> Config {
        self.config
    }

    /// Copies `rom` into memory at `origin`, leaving the pc where it is.
    ///
    /// Nothing is written if the rom does not fit between `origin` and the end of memory.
    pub fn load(&self, rom: &[u8], origin: u16) -> Result<()> {
        lock(&self.shared.state).load(rom, origin)?;
        info!("loaded {} byte rom at {:#05X}", rom.len(), origin);
        Ok(())
    }

    /// Copies `rom` into memory at the configured origin.
    pub fn load_rom(&self, rom: &[u8]) -> Result<()> {
        self.load(rom, self.config.origin)
    }

    /// Reads a rom to its end and loads it at `origin`.
    pub fn load_reader(&self, reader: &mut dyn Read, origin: u16) -> Result<()> {
        let mut rom = Vec::new();
        reader.read_to_end(&mut rom)?;
        self.load(&rom, origin)
    }

    /// Stops execution and restores the power-on state.
    ///
    /// Registers, memory, the stack, the frame buffer, keys, timers and the cycle count are all
    /// cleared; the sprite sheet is rewritten and the pc returns to the configured origin.
    pub fn reset(&self) {
        self.stop();
        *lock(&self.shared.state) = State::new(self.config.origin);
        *lock(&self.shared.clock) = Clock::default();
        info!("reset");
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the keypad index, 0x0..=0xF
    /// * `pressed` whether the key is now held down
    pub fn set_key(&self, key: u8, pressed: bool) -> Result<()> {
        lock(&self.shared.state).set_key(key, pressed)?;
        debug!("key {:X} {}", key, if pressed { "down" } else { "up" });
        Ok(())
    }

    /// Starts the cycle and timer loops.
    ///
    /// With a `cycle_limit` a watchdog stops the machine once more than that many cycles have
    /// run. Loops left behind by an earlier halt are joined first.
    ///
    /// `Event::Started` is sent once the cycle loop exists, and that loop always ends with
    /// `Event::Halted`, even when a later thread fails to spawn.
    pub fn start(&self, cycle_limit: Option<u64>) -> Result<()> {
        self.start_with(cycle_limit, spawn_named)
    }

    fn start_with(&self, cycle_limit: Option<u64>, spawn: Spawn) -> Result<()> {
        let mut workers = lock(&self.workers);
        if self.shared.is_running() {
            return Err(Error::AlreadyRunning);
        }
        join_all(&mut workers);

        lock(&self.shared.clock).running = true;

        // Events from the new cycle loop queue up behind `Started` while this is held.
        let mut subscribers = self.shared.subscribers();
        let spawned = self.spawn_loops(cycle_limit, &mut workers, spawn);
        if !workers.is_empty() {
            deliver(&mut subscribers, Event::Started { cycle_limit });
        }
        drop(subscribers);

        if let Err(err) = spawned {
            error!("failed to start: {}", err);
            lock(&self.shared.clock).running = false;
            join_all(&mut workers);
            return Err(err.into());
        }
        Ok(())
    }

    fn spawn_loops(
        &self,
        cycle_limit: Option<u64>,
        workers: &mut Vec<JoinHandle<()>>,
        spawn: Spawn,
    ) -> io::Result<()> {
        let instruction_period = self.config.instruction_period();
        let timer_period = self.config.timer_period();

        let shared = self.shared.clone();
        workers.push(spawn(
            "chip8-cpu",
            Box::new(move || run_cpu(shared, instruction_period)),
        )?);

        let shared = self.shared.clone();
        workers.push(spawn(
            "chip8-timers",
            Box::new(move || run_timers(shared, timer_period)),
        )?);

        if let Some(limit) = cycle_limit {
            let shared = self.shared.clone();
            workers.push(spawn(
                "chip8-watchdog",
                Box::new(move || run_watchdog(shared, limit, instruction_period)),
            )?);
        }
        Ok(())
    }

    /// Asks every loop to finish and waits until they have.
    ///
    /// Stopping a machine that isn't running does nothing.
    pub fn stop(&self) {
        lock(&self.shared.clock).running = false;
        join_all(&mut lock(&self.workers));
    }

    /// Blocks until the machine halts by itself.
    ///
    /// Only returns without a call to `stop` from another thread when the machine was started
    /// with a cycle limit.
    pub fn wait(&self) {
        join_all(&mut lock(&self.workers));
    }

    /// Runs a single cycle on a stopped machine.
    pub fn step(&self) -> Result<()> {
        if self.shared.is_running() {
            return Err(Error::AlreadyRunning);
        }
        self.shared.cycle();
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    pub fn frame_buffer(&self) -> FrameBuffer {
        lock(&self.shared.state).frame_buffer
    }

    /// Returns the FrameBuffer if it changed since the last call.
    pub fn take_frame(&self) -> Option<FrameBuffer> {
        let mut state = lock(&self.shared.state);
        if state.draw_flag {
            state.draw_flag = false;
            Some(state.frame_buffer)
        } else {
            None
        }
    }

    pub fn registers(&self) -> [u8; REGISTER_COUNT] {
        lock(&self.shared.state).v
    }

    pub fn pc(&self) -> u16 {
        lock(&self.shared.state).pc
    }

    pub fn index(&self) -> u16 {
        lock(&self.shared.state).i
    }

    /// Live return addresses, oldest first.
    pub fn stack(&self) -> Vec<u16> {
        lock(&self.shared.state).stack_entries().to_vec()
    }

    pub fn stack_depth(&self) -> usize {
        usize::from(lock(&self.shared.state).sp)
    }

    /// Copies out `range` of memory, or `None` if it reaches past the end.
    pub fn memory(&self, range: Range<usize>) -> Option<Vec<u8>> {
        lock(&self.shared.state).memory.get(range).map(<[u8]>::to_vec)
    }

    pub fn pressed_keys(&self) -> [bool; KEY_COUNT] {
        lock(&self.shared.state).pressed_keys
    }

    pub fn delay_timer(&self) -> u8 {
        lock(&self.shared.clock).delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        lock(&self.shared.clock).sound_timer
    }

    /// Cycles completed since power-on or the last reset.
    pub fn cycles(&self) -> u64 {
        lock(&self.shared.clock).cycles
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = lock(&self.shared.state);
        let clock = lock(&self.shared.clock);
        Snapshot {
            state: state.clone(),
            clock: *clock,
        }
    }

    /// Returns a channel that receives every event from now on.
    ///
    /// At most `EVENT_CAPACITY` events wait unread; anything emitted while the channel is full
    /// is dropped for this receiver.
    pub fn subscribe(&self) -> Receiver<Event> {
        let (tx, rx) = mpsc::sync_channel(EVENT_CAPACITY);
        self.shared.subscribe(tx);
        rx
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Chip8::new()
    }
}

impl Drop for Chip8 {
    fn drop(&mut self) {
        self.stop();
    }
}

type Spawn = fn(&str, Box<dyn FnOnce() + Send>) -> io::Result<JoinHandle<()>>;

fn spawn_named(name: &str, body: Box<dyn FnOnce() + Send>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name(name.to_owned()).spawn(body)
}

fn join_all(workers: &mut Vec<JoinHandle<()>>) {
    for worker in workers.drain(..) {
        let name = worker.thread().name().unwrap_or("worker").to_owned();
        if worker.join().is_err() {
            error!("{} thread panicked", name);
        }
    }
}
