use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::constants::{
    ADDRESS_MASK, DEFAULT_ORIGIN, DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_ORIGIN, KEY_COUNT,
    MEMORY_SIZE, REGISTER_COUNT, SPRITE_SHEET, STACK_DEPTH,
};
use crate::error::{Anomaly, Error, Result};
use crate::opcode::Opcode;

/// The FrameBuffer is indexed as [y][x]; every pixel is either 0 or 1.
pub type FrameBuffer = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// Everything the cycle loop owns.
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) doubles as the carry, borrow and collision flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Stack
/// - up to 16 return addresses, `sp` of which are live
///
/// ## Memory
/// - 4096 bytes of addressable memory
///     - 0x000..0x050 hold the sprite sheet
///     - ROMs are loaded from the origin (0x200 by default)
/// - 32x64 frame buffer plus a flag marking it as changed since last read
///
/// ## Input
/// - the pressed status of keys 0..F
///
/// The timers live in `Clock` since the timer loop writes them too.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub stack: [u16; STACK_DEPTH],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub pressed_keys: [bool; KEY_COUNT],
}

impl State {
    /// Power-on state with the pc at `origin` and the sprite sheet in place.
    pub fn new(origin: u16) -> Self {
        let mut memory = [0; MEMORY_SIZE];
        let font = usize::from(FONT_ORIGIN);
        memory[font..font + SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: origin,
            sp: 0,
            stack: [0; STACK_DEPTH],
            memory,
            frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            draw_flag: false,
            pressed_keys: [false; KEY_COUNT],
        }
    }

    /// Copies `rom` into memory starting at `origin`.
    ///
    /// Either the whole ROM is written or memory is left as it was.
    pub fn load(&mut self, rom: &[u8], origin: u16) -> Result<()> {
        let start = usize::from(origin);
        if start >= MEMORY_SIZE {
            return Err(Error::OriginOutOfRange(origin));
        }
        let capacity = MEMORY_SIZE - start;
        if rom.len() > capacity {
            return Err(Error::RomTooLarge {
                size: rom.len(),
                capacity,
            });
        }
        self.memory[start..start + rom.len()].copy_from_slice(rom);
        Ok(())
    }

    /// Sets the pressed status of `key`.
    pub fn set_key(&mut self, key: u8, pressed: bool) -> Result<()> {
        let slot = self
            .pressed_keys
            .get_mut(usize::from(key))
            .ok_or(Error::KeyOutOfRange(key))?;
        *slot = pressed;
        Ok(())
    }

    pub fn is_pressed(&self, key: u8) -> bool {
        self.pressed_keys[usize::from(key & 0xF)]
    }

    /// Lowest numbered key currently held down.
    pub fn first_pressed(&self) -> Option<u8> {
        self.pressed_keys
            .iter()
            .position(|&pressed| pressed)
            .map(|key| key as u8)
    }

    pub fn read(&self, addr: u16) -> u8 {
        self.memory[usize::from(addr & ADDRESS_MASK)]
    }

    pub fn write(&mut self, addr: u16, byte: u8) {
        self.memory[usize::from(addr & ADDRESS_MASK)] = byte;
    }

    /// Gets the opcode currently pointed at by the pc.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    pub fn fetch(&self) -> u16 {
        u16::from_bytes(self.read(self.pc), self.read(self.pc.wrapping_add(1)))
    }

    pub fn push(&mut self, addr: u16) -> std::result::Result<(), Anomaly> {
        let slot = self
            .stack
            .get_mut(usize::from(self.sp))
            .ok_or(Anomaly::StackOverflow(addr))?;
        *slot = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> std::result::Result<u16, Anomaly> {
        self.sp = self.sp.checked_sub(1).ok_or(Anomaly::StackUnderflow)?;
        Ok(self.stack[usize::from(self.sp)])
    }

    /// Live return addresses, oldest first.
    pub fn stack_entries(&self) -> &[u16] {
        &self.stack[..usize::from(self.sp)]
    }
}

impl Default for State {
    fn default() -> Self {
        State::new(DEFAULT_ORIGIN)
    }
}

/// The fields shared between the cycle, timer and watchdog loops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Clock {
    pub running: bool,
    pub cycles: u64,
    pub delay_timer: u8,
    pub sound_timer: u8,
}

impl Clock {
    /// Counts both timers down by one, stopping at zero.
    pub fn tick(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}

/// Locks `mutex`, carrying on with the inner value if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
