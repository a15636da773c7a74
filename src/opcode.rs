/// # Opcodes
///
/// Chip-8 opcodes are 16 bits each, stored big-endian. Their behavior is cased on some combination of:
/// - `(n, _, _, _)` broad categorization; applies to all opcodes
/// - `(_, _, _, n)` specific behavior within a category
/// - `(_, _, n, n)` more specific behavior within a category
/// - `(_, n, n, n)` some fixed function that doesn't require variables (e.g. CLS; clear screen)
///
/// Nibbles not used to determine the operation often (but not always) carry important data.
/// - `[_nnn]` a 12-bit address
/// - `[__kk]` an immediate byte assigned to and/or compared with Vx
/// - `[_x__]` the register Vx, or the top of the register range V0..=Vx
/// - `[__y_]` the register Vy
/// - `[___n]` a sprite height
pub trait Opcode {
    /// Joins two consecutive memory bytes into an opcode.
    fn from_bytes(high: u8, low: u8) -> Self;

    /// Returns the Opcode's component nibbles, most significant first.
    fn nibbles(&self) -> (u8, u8, u8, u8);

    /// Index of the register named by the second nibble.
    fn x(&self) -> usize;

    /// Index of the register named by the third nibble.
    fn y(&self) -> usize;

    /// The fourth nibble.
    fn n(&self) -> u8;

    /// The least significant byte.
    fn kk(&self) -> u8;

    /// Everything but the most significant nibble.
    fn nnn(&self) -> u16;
}

impl Opcode for u16 {
    fn from_bytes(high: u8, low: u8) -> Self {
        u16::from_be_bytes([high, low])
    }

    fn nibbles(&self) -> (u8, u8, u8, u8) {
        let [high, low] = self.to_be_bytes();
        (high >> 4, high & 0xF, low >> 4, low & 0xF)
    }

    fn x(&self) -> usize {
        usize::from((self >> 8) & 0xF)
    }

    fn y(&self) -> usize {
        usize::from((self >> 4) & 0xF)
    }

    fn n(&self) -> u8 {
        (self & 0xF) as u8
    }

    fn kk(&self) -> u8 {
        (self & 0xFF) as u8
    }

    fn nnn(&self) -> u16 {
        self & 0x0FFF
    }
}
