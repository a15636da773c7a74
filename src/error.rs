use thiserror::Error;

/// Failures reported to callers of the `Chip8` API.
#[derive(Debug, Error)]
pub enum Error {
    #[error("ROM is too large ({size} bytes), {capacity} bytes are available from the origin")]
    RomTooLarge { size: usize, capacity: usize },

    #[error("load origin {0:#06X} lies outside memory")]
    OriginOutOfRange(u16),

    #[error("key {0:#X} is not on the keypad (0x0..=0xF)")]
    KeyOutOfRange(u8),

    #[error("machine is already running")]
    AlreadyRunning,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Recoverable conditions hit while executing an instruction.
///
/// None of these stop the machine; the offending instruction becomes a no-op.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Anomaly {
    #[error("unknown opcode {0:#06X}")]
    UnknownOpcode(u16),

    #[error("stack overflow saving return address {0:#05X}")]
    StackOverflow(u16),

    #[error("stack underflow on return")]
    StackUnderflow,
}
