use std::sync::Mutex;

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_ORIGIN, GLYPH_HEIGHT};
use crate::error::Anomaly;
use crate::opcode::Opcode;
use crate::state::{lock, Clock, State};

/// Index of a register in V0..VF.
pub type Reg = usize;

const VF: Reg = 0xF;

/// A decoded opcode.
///
/// Every opcode of the base instruction set has its own variant carrying the operands it uses;
/// anything else decodes to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0: clear the frame buffer
    Cls,
    /// 00EE: PC = STACK.pop()
    Ret,
    /// 0nnn: machine code routine, ignored
    Sys(u16),
    /// 1nnn: PC = nnn
    Jump(u16),
    /// 2nnn: STACK.push(PC); PC = nnn
    Call(u16),
    /// 3xkk: if Vx == kk then skip
    SkipEqByte(Reg, u8),
    /// 4xkk: if Vx != kk then skip
    SkipNeByte(Reg, u8),
    /// 5xy0: if Vx == Vy then skip
    SkipEqReg(Reg, Reg),
    /// 6xkk: Vx = kk
    LoadByte(Reg, u8),
    /// 7xkk: Vx += kk, no carry
    AddByte(Reg, u8),
    /// 8xy0: Vx = Vy
    Move(Reg, Reg),
    /// 8xy1: Vx |= Vy
    Or(Reg, Reg),
    /// 8xy2: Vx &= Vy
    And(Reg, Reg),
    /// 8xy3: Vx ^= Vy
    Xor(Reg, Reg),
    /// 8xy4: Vx += Vy; VF = carry
    AddReg(Reg, Reg),
    /// 8xy5: Vx -= Vy; VF = Vx > Vy
    Sub(Reg, Reg),
    /// 8xy6: Vx >>= 1; VF = shifted out bit
    Shr(Reg),
    /// 8xy7: Vx = Vy - Vx; VF = Vy > Vx
    SubN(Reg, Reg),
    /// 8xyE: Vx <<= 1; VF = shifted out bit
    Shl(Reg),
    /// 9xy0: if Vx != Vy then skip
    SkipNeReg(Reg, Reg),
    /// Annn: I = nnn
    LoadI(u16),
    /// Bnnn: PC = V0 + nnn
    JumpV0(u16),
    /// Cxkk: Vx = random & kk
    Rand(Reg, u8),
    /// Dxyn: draw an n byte sprite from I at (Vx, Vy)
    Draw(Reg, Reg, u8),
    /// Ex9E: if key Vx is pressed then skip
    SkipPressed(Reg),
    /// ExA1: if key Vx is not pressed then skip
    SkipNotPressed(Reg),
    /// Fx07: Vx = DT
    LoadDelay(Reg),
    /// Fx0A: Vx = next pressed key
    WaitKey(Reg),
    /// Fx15: DT = Vx
    SetDelay(Reg),
    /// Fx18: ST = Vx
    SetSound(Reg),
    /// Fx1E: I += Vx
    AddI(Reg),
    /// Fx29: I = address of the glyph for Vx
    LoadGlyph(Reg),
    /// Fx33: mem[I..I+3] = bcd(Vx)
    Bcd(Reg),
    /// Fx55: mem[I..=I+x] = V0..=Vx
    Store(Reg),
    /// Fx65: V0..=Vx = mem[I..=I+x]
    Restore(Reg),
    Unknown(u16),
}

use Instruction::*;

/// Selects the Instruction for a given opcode.
pub fn decode(op: u16) -> Instruction {
    let (x, y) = (op.x(), op.y());
    match op.nibbles() {
        (0x0, 0x0, 0xE, 0x0) => Cls,
        (0x0, 0x0, 0xE, 0xE) => Ret,
        (0x0, ..) => Sys(op.nnn()),
        (0x1, ..) => Jump(op.nnn()),
        (0x2, ..) => Call(op.nnn()),
        (0x3, ..) => SkipEqByte(x, op.kk()),
        (0x4, ..) => SkipNeByte(x, op.kk()),
        (0x5, .., 0x0) => SkipEqReg(x, y),
        (0x6, ..) => LoadByte(x, op.kk()),
        (0x7, ..) => AddByte(x, op.kk()),
        (0x8, .., 0x0) => Move(x, y),
        (0x8, .., 0x1) => Or(x, y),
        (0x8, .., 0x2) => And(x, y),
        (0x8, .., 0x3) => Xor(x, y),
        (0x8, .., 0x4) => AddReg(x, y),
        (0x8, .., 0x5) => Sub(x, y),
        (0x8, .., 0x6) => Shr(x),
        (0x8, .., 0x7) => SubN(x, y),
        (0x8, .., 0xE) => Shl(x),
        (0x9, .., 0x0) => SkipNeReg(x, y),
        (0xA, ..) => LoadI(op.nnn()),
        (0xB, ..) => JumpV0(op.nnn()),
        (0xC, ..) => Rand(x, op.kk()),
        (0xD, ..) => Draw(x, y, op.n()),
        (0xE, _, 0x9, 0xE) => SkipPressed(x),
        (0xE, _, 0xA, 0x1) => SkipNotPressed(x),
        (0xF, _, 0x0, 0x7) => LoadDelay(x),
        (0xF, _, 0x0, 0xA) => WaitKey(x),
        (0xF, _, 0x1, 0x5) => SetDelay(x),
        (0xF, _, 0x1, 0x8) => SetSound(x),
        (0xF, _, 0x1, 0xE) => AddI(x),
        (0xF, _, 0x2, 0x9) => LoadGlyph(x),
        (0xF, _, 0x3, 0x3) => Bcd(x),
        (0xF, _, 0x5, 0x5) => Store(x),
        (0xF, _, 0x6, 0x5) => Restore(x),
        _ => Unknown(op),
    }
}

impl Instruction {
    /// Applies the instruction to `state`.
    ///
    /// The pc is expected to already point past this instruction. `clock` is only locked by the
    /// instructions touching the delay or sound timer.
    ///
    /// An `Anomaly` means the instruction was skipped; `state` is unchanged in that case.
    pub fn execute(self, state: &mut State, clock: &Mutex<Clock>) -> Result<(), Anomaly> {
        match self {
            Cls => {
                state.frame_buffer = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
                state.draw_flag = true;
            }
            Ret => state.pc = state.pop()?,
            Sys(_) => {}
            Jump(addr) => state.pc = addr,
            Call(addr) => {
                state.push(state.pc)?;
                state.pc = addr;
            }
            SkipEqByte(x, kk) => skip_if(state, |s| s.v[x] == kk),
            SkipNeByte(x, kk) => skip_if(state, |s| s.v[x] != kk),
            SkipEqReg(x, y) => skip_if(state, |s| s.v[x] == s.v[y]),
            LoadByte(x, kk) => state.v[x] = kk,
            AddByte(x, kk) => state.v[x] = state.v[x].wrapping_add(kk),
            Move(x, y) => state.v[x] = state.v[y],
            Or(x, y) => state.v[x] |= state.v[y],
            And(x, y) => state.v[x] &= state.v[y],
            Xor(x, y) => state.v[x] ^= state.v[y],
            AddReg(x, y) => {
                let (sum, carry) = state.v[x].overflowing_add(state.v[y]);
                set_with_flag(state, x, sum, carry);
            }
            Sub(x, y) => {
                let (vx, vy) = (state.v[x], state.v[y]);
                set_with_flag(state, x, vx.wrapping_sub(vy), vx > vy);
            }
            Shr(x) => {
                let vx = state.v[x];
                set_with_flag(state, x, vx >> 1, vx & 0x1 == 1);
            }
            SubN(x, y) => {
                let (vx, vy) = (state.v[x], state.v[y]);
                set_with_flag(state, x, vy.wrapping_sub(vx), vy > vx);
            }
            Shl(x) => {
                let vx = state.v[x];
                set_with_flag(state, x, vx << 1, vx & 0x80 != 0);
            }
            SkipNeReg(x, y) => skip_if(state, |s| s.v[x] != s.v[y]),
            LoadI(addr) => state.i = addr,
            JumpV0(addr) => state.pc = u16::from(state.v[0x0]) + addr,
            Rand(x, kk) => state.v[x] = rand::random::<u8>() & kk,
            Draw(x, y, n) => draw(state, x, y, n),
            SkipPressed(x) => skip_if(state, |s| s.is_pressed(s.v[x])),
            SkipNotPressed(x) => skip_if(state, |s| !s.is_pressed(s.v[x])),
            LoadDelay(x) => state.v[x] = lock(clock).delay_timer,
            // Polls rather than blocks: with no key held the pc is rewound so this runs again
            // next cycle.
            WaitKey(x) => match state.first_pressed() {
                Some(key) => state.v[x] = key,
                None => state.pc = state.pc.wrapping_sub(2),
            },
            SetDelay(x) => lock(clock).delay_timer = state.v[x],
            SetSound(x) => lock(clock).sound_timer = state.v[x],
            AddI(x) => state.i = state.i.wrapping_add(u16::from(state.v[x])),
            LoadGlyph(x) => state.i = FONT_ORIGIN + u16::from(state.v[x]) * GLYPH_HEIGHT,
            Bcd(x) => {
                let vx = state.v[x];
                let digits = [vx / 100, vx / 10 % 10, vx % 10];
                for (offset, digit) in (0..).zip(digits.iter()) {
                    state.write(state.i.wrapping_add(offset), *digit);
                }
            }
            Store(x) => {
                for (offset, reg) in (0..).zip(0..=x) {
                    state.write(state.i.wrapping_add(offset), state.v[reg]);
                }
            }
            Restore(x) => {
                for (offset, reg) in (0..).zip(0..=x) {
                    state.v[reg] = state.read(state.i.wrapping_add(offset));
                }
            }
            Unknown(op) => return Err(Anomaly::UnknownOpcode(op)),
        }
        Ok(())
    }
}

fn skip_if(state: &mut State, condition: impl FnOnce(&State) -> bool) {
    if condition(state) {
        state.pc = state.pc.wrapping_add(2);
    }
}

/// VF is written last so the flag wins when x is VF itself.
fn set_with_flag(state: &mut State, x: Reg, value: u8, flag: bool) {
    state.v[x] = value;
    state.v[VF] = u8::from(flag);
}

/// XORs the sprite at mem[I..I+n] onto the FrameBuffer at (Vx, Vy), wrapping at the edges.
/// VF ends up 1 if any lit pixel was switched off.
fn draw(state: &mut State, x: Reg, y: Reg, n: u8) {
    let left = usize::from(state.v[x]);
    let top = usize::from(state.v[y]);
    state.v[VF] = 0;

    for row in 0..n {
        let sprite = state.read(state.i.wrapping_add(u16::from(row)));
        let py = (top + usize::from(row)) % DISPLAY_HEIGHT;
        for bit in 0..8 {
            if (sprite >> (7 - bit)) & 1 == 0 {
                continue;
            }
            let px = (left + bit) % DISPLAY_WIDTH;
            let pixel = &mut state.frame_buffer[py][px];
            if *pixel == 1 {
                state.v[VF] = 1;
            }
            *pixel ^= 1;
        }
    }
    state.draw_flag = true;
}
