use std::time::Duration;

use crate::constants::{DEFAULT_INSTRUCTION_HZ, DEFAULT_ORIGIN, DEFAULT_TIMER_HZ};

/// # Config
/// Runtime tuning for a `Chip8`.
///
/// - `instruction_hz` how many cycles the cycle loop aims to run per second
/// - `timer_hz` how many times per second the delay and sound timers tick
/// - `origin` where `load_rom` places a ROM and where `reset` points the pc
///
/// Rates of zero are treated as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub instruction_hz: u32,
    pub timer_hz: u32,
    pub origin: u16,
}

impl Config {
    pub fn with_instruction_hz(self, instruction_hz: u32) -> Self {
        Config {
            instruction_hz,
            ..self
        }
    }

    pub fn with_timer_hz(self, timer_hz: u32) -> Self {
        Config { timer_hz, ..self }
    }

    pub fn with_origin(self, origin: u16) -> Self {
        Config { origin, ..self }
    }

    /// Time budget for a single cycle.
    pub fn instruction_period(&self) -> Duration {
        period(self.instruction_hz)
    }

    /// Time between two timer ticks.
    pub fn timer_period(&self) -> Duration {
        period(self.timer_hz)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            instruction_hz: DEFAULT_INSTRUCTION_HZ,
            timer_hz: DEFAULT_TIMER_HZ,
            origin: DEFAULT_ORIGIN,
        }
    }
}

fn period(hz: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(hz.max(1)))
}
