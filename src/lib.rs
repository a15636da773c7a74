pub use chip8::{Chip8, Snapshot};
pub use config::Config;
pub use driver::Event;
pub use error::{Anomaly, Error, Result};
pub use instruction::{decode, Instruction};
pub use opcode::Opcode;
pub use state::{Clock, FrameBuffer, State};

mod chip8;
mod config;
pub mod constants;
mod driver;
mod error;
mod instruction;
mod opcode;
mod state;
