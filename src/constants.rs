/// Bytes of addressable memory.
pub const MEMORY_SIZE: usize = 4096;

/// Addresses wrap within the 12-bit address space.
pub const ADDRESS_MASK: u16 = 0x0FFF;

/// Horizontal resolution of the frame buffer in pixels.
pub const DISPLAY_WIDTH: usize = 64;

/// Vertical resolution of the frame buffer in pixels.
pub const DISPLAY_HEIGHT: usize = 32;

/// Number of general purpose registers (V0..VF).
pub const REGISTER_COUNT: usize = 16;

/// Number of keys on the hexadecimal keypad.
pub const KEY_COUNT: usize = 16;

/// Maximum number of return addresses the stack can hold.
pub const STACK_DEPTH: usize = 16;

/// Where ROMs are loaded and execution begins unless configured otherwise.
pub const DEFAULT_ORIGIN: u16 = 0x200;

/// Unread events a subscriber can hold before further events are dropped for it.
pub const EVENT_CAPACITY: usize = 256;

/// Where the sprite sheet lives in memory.
pub const FONT_ORIGIN: u16 = 0x000;

/// Height in bytes of each glyph in the sprite sheet.
pub const GLYPH_HEIGHT: u16 = 5;

/// Default instruction rate of the cycle loop.
pub const DEFAULT_INSTRUCTION_HZ: u32 = 500;

/// Default rate at which the delay and sound timers count down.
pub const DEFAULT_TIMER_HZ: u32 = 60;

/// # Sprite sheet
/// Glyphs for the hexadecimal digits 0..F, each 4 pixels wide and 5 tall.
///
/// Only the high nibble of each byte is drawn, e.g. `0`:
/// ```text
/// 0xF0  ####
/// 0x90  #  #
/// 0x90  #  #
/// 0x90  #  #
/// 0xF0  ####
/// ```
pub const SPRITE_SHEET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
