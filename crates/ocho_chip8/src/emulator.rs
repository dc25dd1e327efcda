use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::instruction::{Instruction, Opcode};
use crate::{
    Chip8Error, FONTSET, FONTSET_SIZE, FONT_GLYPH_BYTES, MAX_ROM_SIZE, NUM_KEYS, NUM_REGS,
    RAM_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH, STACK_SIZE, START_ADDRESS,
};

/// Outcome of a single `step()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// One instruction was fetched and executed.
    Executed,
    /// An FX0A is pending; the PC did not advance. The host should keep
    /// polling input and calling `step()`.
    WaitingForKey,
    /// A previous step failed and the engine is parked. Nothing was
    /// executed; call `resume()` to try again.
    Halted,
}

/// Behavioural switches for the points where CHIP-8 dialects disagree.
///
/// The defaults shift `VX` in place (8XY6/8XYE) and increment `I` by `X+1`
/// on FX55/FX65. Set `shift_reads_vy` for COSMAC-VIP shifts, clear
/// `increment_index` for SCHIP load/store.
#[derive(Debug, Clone, Copy)]
pub struct Quirks {
    pub shift_reads_vy: bool,
    pub increment_index: bool,
}

impl Default for Quirks {
    fn default() -> Self {
        Quirks {
            shift_reads_vy: false,
            increment_index: true,
        }
    }
}

/// Snapshot of the keypad taken while an FX0A wait is pending, used to
/// detect a not-pressed -> pressed transition.
struct KeyWait {
    seen: [bool; NUM_KEYS],
}

pub struct Emulator {
    /// program counter
    pc: u16,
    ram: [u8; RAM_SIZE],
    /// display
    screen: [bool; SCREEN_WIDTH * SCREEN_HEIGHT],
    /// V registers
    v_reg: [u8; NUM_REGS],
    /// index register, logically 12-bit
    i_reg: u16,
    stack_pointer: u16,
    stack: [u16; STACK_SIZE],
    keys: [bool; NUM_KEYS],
    delay_timer: u8,
    sound_timer: u8,
    /// display changed since the host last looked
    redraw: bool,
    halted: bool,
    key_wait: Option<KeyWait>,
    pub quirks: Quirks,
    rng: StdRng,
}

impl Default for Emulator {
    fn default() -> Self {
        let mut new_emu = Self {
            pc: START_ADDRESS,
            ram: [0; RAM_SIZE],
            screen: [false; SCREEN_WIDTH * SCREEN_HEIGHT],
            v_reg: [0; NUM_REGS],
            i_reg: 0,
            stack_pointer: 0,
            stack: [0; STACK_SIZE],
            keys: [false; NUM_KEYS],
            delay_timer: 0,
            sound_timer: 0,
            redraw: true,
            halted: false,
            key_wait: None,
            quirks: Quirks::default(),
            rng: StdRng::from_entropy(),
        };
        new_emu.ram[..FONTSET_SIZE].copy_from_slice(&FONTSET);
        new_emu
    }
}

impl Emulator {
    /// An emulator whose CXNN sequence is reproducible. Used by tests; also
    /// handy for replaying a recorded session.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::default()
        }
    }

    pub fn reset(&mut self) {
        self.pc = START_ADDRESS;
        self.ram = [0; RAM_SIZE];
        self.screen = [false; SCREEN_WIDTH * SCREEN_HEIGHT];
        self.v_reg = [0; NUM_REGS];
        self.i_reg = 0;
        self.stack_pointer = 0;
        self.stack = [0; STACK_SIZE];
        self.keys = [false; NUM_KEYS];
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.redraw = true;
        self.halted = false;
        self.key_wait = None;
        self.ram[..FONTSET_SIZE].copy_from_slice(&FONTSET);
    }

    /// Copy a ROM image into RAM at 0x200. Rejects images that would run
    /// past the end of the 4 KiB address space; nothing is copied on error.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(Chip8Error::RomTooLarge { size: rom.len() });
        }
        let start = START_ADDRESS as usize;
        self.ram[start..start + rom.len()].copy_from_slice(rom);
        Ok(())
    }

    /// Fetch, decode, and execute one instruction.
    ///
    /// On error the PC is restored to the faulting instruction and the
    /// engine halts; further calls return `StepStatus::Halted` without
    /// touching any state until `resume()` is called.
    pub fn step(&mut self) -> Result<StepStatus, Chip8Error> {
        if self.halted {
            return Ok(StepStatus::Halted);
        }
        let pc = self.pc;
        let opcode = self.fetch_opcode();
        let result = match Instruction::from_opcode(opcode).decode() {
            Some(op) => self.execute(op),
            None => Err(Chip8Error::UnknownOpcode { opcode, pc }),
        };
        result.map_err(|err| {
            self.pc = pc;
            self.halted = true;
            err
        })
    }

    /// Clear the halted state after a reported error.
    pub fn resume(&mut self) {
        self.halted = false;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Apply `ticks` whole 1/60 s periods to both timers, flooring at 0.
    pub fn tick_timers(&mut self, ticks: u32) {
        let ticks = ticks.min(u8::MAX as u32) as u8;
        self.delay_timer = self.delay_timer.saturating_sub(ticks);
        self.sound_timer = self.sound_timer.saturating_sub(ticks);
    }

    /// True while the sound timer runs; the audio sink keys its tone off
    /// this.
    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    pub fn display(&self) -> &[bool; SCREEN_WIDTH * SCREEN_HEIGHT] {
        &self.screen
    }

    /// Report and clear the dirty flag for the display buffer.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    pub fn set_key(&mut self, idx: usize, pressed: bool) {
        assert!(idx < NUM_KEYS, "invalid key index: {}", idx);
        self.keys[idx] = pressed;
    }

    fn fetch_opcode(&mut self) -> u16 {
        let hi = self.read_ram(self.pc) as u16;
        let lo = self.read_ram(self.pc.wrapping_add(1)) as u16;
        self.pc = self.pc.wrapping_add(2);
        hi << 8 | lo
    }

    // RAM accesses mask to 12 bits so a ROM can point I or PC anywhere
    // without indexing outside the array.
    fn read_ram(&self, addr: u16) -> u8 {
        self.ram[(addr & 0x0FFF) as usize]
    }

    fn write_ram(&mut self, addr: u16, value: u8) {
        self.ram[(addr & 0x0FFF) as usize] = value;
    }

    fn push(&mut self, val: u16) -> Result<(), Chip8Error> {
        if self.stack_pointer as usize == STACK_SIZE {
            return Err(Chip8Error::StackOverflow {
                pc: self.pc.wrapping_sub(2),
            });
        }
        self.stack[self.stack_pointer as usize] = val;
        self.stack_pointer += 1;
        Ok(())
    }

    fn pop(&mut self) -> Result<u16, Chip8Error> {
        if self.stack_pointer == 0 {
            return Err(Chip8Error::StackUnderflow {
                pc: self.pc.wrapping_sub(2),
            });
        }
        self.stack_pointer -= 1;
        Ok(self.stack[self.stack_pointer as usize])
    }

    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    fn key_down(&self, value: u8) -> bool {
        let key = value as usize;
        key < NUM_KEYS && self.keys[key]
    }

    fn execute(&mut self, op: Opcode) -> Result<StepStatus, Chip8Error> {
        match op {
            Opcode::ClearScreen => {
                self.screen = [false; SCREEN_WIDTH * SCREEN_HEIGHT];
                self.redraw = true;
            }
            Opcode::Return => self.pc = self.pop()?,
            Opcode::Jump { nnn } => self.pc = nnn,
            Opcode::Call { nnn } => {
                self.push(self.pc)?;
                self.pc = nnn;
            }
            Opcode::SkipEqImm { x, nn } => self.skip_if(self.v_reg[x] == nn),
            Opcode::SkipNeImm { x, nn } => self.skip_if(self.v_reg[x] != nn),
            Opcode::SkipEqReg { x, y } => self.skip_if(self.v_reg[x] == self.v_reg[y]),
            Opcode::SkipNeReg { x, y } => self.skip_if(self.v_reg[x] != self.v_reg[y]),
            Opcode::LoadImm { x, nn } => self.v_reg[x] = nn,
            Opcode::AddImm { x, nn } => self.v_reg[x] = self.v_reg[x].wrapping_add(nn),
            Opcode::Move { x, y } => self.v_reg[x] = self.v_reg[y],
            Opcode::Or { x, y } => self.v_reg[x] |= self.v_reg[y],
            Opcode::And { x, y } => self.v_reg[x] &= self.v_reg[y],
            Opcode::Xor { x, y } => self.v_reg[x] ^= self.v_reg[y],
            Opcode::Add { x, y } => {
                let (val, carry) = self.v_reg[x].overflowing_add(self.v_reg[y]);
                self.v_reg[x] = val;
                self.v_reg[0xF] = carry as u8;
            }
            Opcode::Sub { x, y } => {
                let (val, borrow) = self.v_reg[x].overflowing_sub(self.v_reg[y]);
                self.v_reg[x] = val;
                self.v_reg[0xF] = !borrow as u8;
            }
            Opcode::SubReversed { x, y } => {
                let (val, borrow) = self.v_reg[y].overflowing_sub(self.v_reg[x]);
                self.v_reg[x] = val;
                self.v_reg[0xF] = !borrow as u8;
            }
            Opcode::ShiftRight { x, y } => {
                let src = if self.quirks.shift_reads_vy { y } else { x };
                let val = self.v_reg[src];
                self.v_reg[x] = val >> 1;
                self.v_reg[0xF] = val & 0x1;
            }
            Opcode::ShiftLeft { x, y } => {
                let src = if self.quirks.shift_reads_vy { y } else { x };
                let val = self.v_reg[src];
                self.v_reg[x] = val << 1;
                self.v_reg[0xF] = (val & 0x80) >> 7;
            }
            Opcode::LoadIndex { nnn } => self.i_reg = nnn,
            Opcode::JumpOffset { nnn } => self.pc = nnn.wrapping_add(self.v_reg[0] as u16),
            Opcode::Random { x, nn } => self.v_reg[x] = self.rng.gen::<u8>() & nn,
            Opcode::Draw { x, y, n } => self.draw_sprite(x, y, n),
            Opcode::SkipKeyPressed { x } => self.skip_if(self.key_down(self.v_reg[x])),
            Opcode::SkipKeyReleased { x } => self.skip_if(!self.key_down(self.v_reg[x])),
            Opcode::ReadDelay { x } => self.v_reg[x] = self.delay_timer,
            Opcode::WaitKey { x } => return Ok(self.wait_key(x)),
            Opcode::SetDelay { x } => self.delay_timer = self.v_reg[x],
            Opcode::SetSound { x } => self.sound_timer = self.v_reg[x],
            Opcode::AddIndex { x } => {
                self.i_reg = self.i_reg.wrapping_add(self.v_reg[x] as u16);
            }
            Opcode::LoadGlyph { x } => {
                self.i_reg = self.v_reg[x] as u16 * FONT_GLYPH_BYTES;
            }
            Opcode::StoreBcd { x } => {
                let val = self.v_reg[x];
                self.write_ram(self.i_reg, val / 100);
                self.write_ram(self.i_reg.wrapping_add(1), (val / 10) % 10);
                self.write_ram(self.i_reg.wrapping_add(2), val % 10);
            }
            Opcode::StoreRegisters { x } => {
                for offset in 0..=x {
                    self.write_ram(self.i_reg.wrapping_add(offset as u16), self.v_reg[offset]);
                }
                if self.quirks.increment_index {
                    self.i_reg = self.i_reg.wrapping_add(x as u16 + 1);
                }
            }
            Opcode::LoadRegisters { x } => {
                for offset in 0..=x {
                    self.v_reg[offset] = self.read_ram(self.i_reg.wrapping_add(offset as u16));
                }
                if self.quirks.increment_index {
                    self.i_reg = self.i_reg.wrapping_add(x as u16 + 1);
                }
            }
        }
        Ok(StepStatus::Executed)
    }

    /// DXYN. The start position wraps (mod 64/32); the sprite itself clips
    /// at the right and bottom edges rather than wrapping. VF reports
    /// whether any lit pixel was turned off.
    fn draw_sprite(&mut self, x: usize, y: usize, n: u8) {
        let x0 = self.v_reg[x] as usize % SCREEN_WIDTH;
        let y0 = self.v_reg[y] as usize % SCREEN_HEIGHT;
        self.v_reg[0xF] = 0;
        for row in 0..n as usize {
            let py = y0 + row;
            if py >= SCREEN_HEIGHT {
                break;
            }
            let bits = self.read_ram(self.i_reg.wrapping_add(row as u16));
            for col in 0..8 {
                let px = x0 + col;
                if px >= SCREEN_WIDTH {
                    break;
                }
                if bits & (0x80 >> col) == 0 {
                    continue;
                }
                let idx = py * SCREEN_WIDTH + px;
                if self.screen[idx] {
                    self.v_reg[0xF] = 1;
                }
                self.screen[idx] = !self.screen[idx];
            }
        }
        self.redraw = true;
    }

    /// FX0A. The wait is satisfied only by a key that goes down after the
    /// wait began, so a key already held never answers it. While waiting
    /// the PC stays on the FX0A and the host keeps control between
    /// attempts.
    fn wait_key(&mut self, x: usize) -> StepStatus {
        let newly_pressed = match &self.key_wait {
            Some(wait) => (0..NUM_KEYS).find(|&k| self.keys[k] && !wait.seen[k]),
            None => None,
        };
        match newly_pressed {
            Some(key) => {
                self.v_reg[x] = key as u8;
                self.key_wait = None;
                StepStatus::Executed
            }
            None => {
                self.key_wait = Some(KeyWait { seen: self.keys });
                self.pc = self.pc.wrapping_sub(2);
                StepStatus::WaitingForKey
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_program(program: &[u8]) -> Emulator {
        let mut emu = Emulator::with_seed(0x5EED);
        emu.load_rom(program).expect("test program fits in RAM");
        emu
    }

    fn step_ok(emu: &mut Emulator) -> StepStatus {
        emu.step().expect("step failed")
    }

    #[test]
    fn plain_instruction_advances_pc_by_two() {
        let mut emu = with_program(&[0x6A, 0x42]); // V_A = 0x42
        assert_eq!(step_ok(&mut emu), StepStatus::Executed);
        assert_eq!(emu.pc, 0x202);
        assert_eq!(emu.v_reg[0xA], 0x42);
    }

    #[test]
    fn delay_timer_round_trips_through_registers() {
        // V1 = 5; delay = V1; V2 = delay
        let mut emu = with_program(&[0x61, 0x05, 0xF1, 0x15, 0xF2, 0x07]);
        for _ in 0..3 {
            step_ok(&mut emu);
        }
        assert_eq!(emu.v_reg[2], 5);
    }

    #[test]
    fn call_then_return_resumes_after_call() {
        // 0x200: call 0x204   0x204: ret
        let mut emu = with_program(&[0x22, 0x04, 0x00, 0x00, 0x00, 0xEE]);
        step_ok(&mut emu);
        assert_eq!(emu.pc, 0x204);
        assert_eq!(emu.stack_pointer, 1);
        step_ok(&mut emu);
        assert_eq!(emu.pc, 0x202);
        assert_eq!(emu.stack_pointer, 0);
    }

    #[test]
    fn add_reports_carry_in_vf() {
        let mut emu = with_program(&[0x80, 0x14, 0x80, 0x14]);
        emu.v_reg[0] = 0xFF;
        emu.v_reg[1] = 0x01;
        step_ok(&mut emu);
        assert_eq!(emu.v_reg[0], 0x00);
        assert_eq!(emu.v_reg[0xF], 1);

        emu.v_reg[0] = 0x01;
        step_ok(&mut emu);
        assert_eq!(emu.v_reg[0], 0x02);
        assert_eq!(emu.v_reg[0xF], 0);
    }

    #[test]
    fn add_to_self_uses_pre_overwrite_value() {
        let mut emu = with_program(&[0x83, 0x34]); // V3 += V3
        emu.v_reg[3] = 0x90;
        step_ok(&mut emu);
        assert_eq!(emu.v_reg[3], 0x20);
        assert_eq!(emu.v_reg[0xF], 1);
    }

    #[test]
    fn sub_sets_vf_when_no_borrow() {
        let mut emu = with_program(&[0x80, 0x15, 0x82, 0x35]);
        emu.v_reg[0] = 0x05;
        emu.v_reg[1] = 0x03;
        step_ok(&mut emu);
        assert_eq!(emu.v_reg[0], 0x02);
        assert_eq!(emu.v_reg[0xF], 1);

        emu.v_reg[2] = 0x03;
        emu.v_reg[3] = 0x05;
        step_ok(&mut emu);
        assert_eq!(emu.v_reg[2], 0xFE);
        assert_eq!(emu.v_reg[0xF], 0);
    }

    #[test]
    fn sub_reversed_swaps_operands() {
        let mut emu = with_program(&[0x80, 0x17]); // V0 = V1 - V0
        emu.v_reg[0] = 0x03;
        emu.v_reg[1] = 0x05;
        step_ok(&mut emu);
        assert_eq!(emu.v_reg[0], 0x02);
        assert_eq!(emu.v_reg[0xF], 1);
    }

    #[test]
    fn shift_right_reads_vx_by_default() {
        let mut emu = with_program(&[0x80, 0x16]);
        emu.v_reg[0] = 0x05;
        emu.v_reg[1] = 0xFF;
        step_ok(&mut emu);
        assert_eq!(emu.v_reg[0], 0x02);
        assert_eq!(emu.v_reg[0xF], 1);
    }

    #[test]
    fn shift_quirk_reads_vy() {
        let mut emu = with_program(&[0x80, 0x1E]);
        emu.quirks.shift_reads_vy = true;
        emu.v_reg[0] = 0xFF;
        emu.v_reg[1] = 0x81;
        step_ok(&mut emu);
        assert_eq!(emu.v_reg[0], 0x02);
        assert_eq!(emu.v_reg[0xF], 1);
    }

    #[test]
    fn draw_twice_erases_and_reports_collision() {
        // I points at the font glyph for 0; draw it twice at (0, 0).
        let mut emu = with_program(&[0xD0, 0x15, 0xD0, 0x15]);
        step_ok(&mut emu);
        assert_eq!(emu.v_reg[0xF], 0);
        assert!(emu.screen.iter().any(|&px| px));
        assert!(emu.take_redraw());

        step_ok(&mut emu);
        assert_eq!(emu.v_reg[0xF], 1);
        assert!(emu.screen.iter().all(|&px| !px));
    }

    #[test]
    fn draw_clips_at_screen_edges() {
        let mut emu = with_program(&[0xD0, 0x15]);
        emu.v_reg[0] = 60;
        emu.v_reg[1] = 30;
        step_ok(&mut emu);
        // Only the first two glyph rows fit: 0xF0 (4 pixels) and 0x90
        // (2 pixels). Nothing wraps to column 0 or row 0.
        let lit = emu.screen.iter().filter(|&&px| px).count();
        assert_eq!(lit, 6);
        assert!(!emu.screen[30 * SCREEN_WIDTH]);
        assert!(!emu.screen[60]);
    }

    #[test]
    fn draw_start_position_wraps() {
        let mut emu = with_program(&[0xD0, 0x11]);
        emu.v_reg[0] = 64; // mod 64 == 0
        emu.v_reg[1] = 32; // mod 32 == 0
        step_ok(&mut emu);
        assert!(emu.screen[0]);
    }

    #[test]
    fn bcd_splits_decimal_digits() {
        let mut emu = with_program(&[0xF5, 0x33]);
        emu.v_reg[5] = 156;
        emu.i_reg = 0x300;
        step_ok(&mut emu);
        assert_eq!(emu.ram[0x300], 1);
        assert_eq!(emu.ram[0x301], 5);
        assert_eq!(emu.ram[0x302], 6);
    }

    #[test]
    fn store_load_registers_increment_index() {
        let mut emu = with_program(&[0xF2, 0x55, 0xA4, 0x00, 0xF2, 0x65]);
        emu.v_reg[0] = 0xDE;
        emu.v_reg[1] = 0xAD;
        emu.v_reg[2] = 0x99;
        emu.i_reg = 0x400;
        step_ok(&mut emu);
        assert_eq!(&emu.ram[0x400..0x403], &[0xDE, 0xAD, 0x99]);
        assert_eq!(emu.i_reg, 0x403);

        emu.v_reg[..3].fill(0);
        step_ok(&mut emu); // I = 0x400
        step_ok(&mut emu); // load V0..V2
        assert_eq!(&emu.v_reg[..3], &[0xDE, 0xAD, 0x99]);
        assert_eq!(emu.i_reg, 0x403);
    }

    #[test]
    fn index_increment_quirk_can_be_disabled() {
        let mut emu = with_program(&[0xF1, 0x55]);
        emu.quirks.increment_index = false;
        emu.i_reg = 0x400;
        step_ok(&mut emu);
        assert_eq!(emu.i_reg, 0x400);
    }

    #[test]
    fn glyph_address_is_five_bytes_per_digit() {
        let mut emu = with_program(&[0xF0, 0x29]);
        emu.v_reg[0] = 0xA;
        step_ok(&mut emu);
        assert_eq!(emu.i_reg, 50);
    }

    #[test]
    fn add_index_wraps_at_16_bits() {
        let mut emu = with_program(&[0xF0, 0x1E]);
        emu.i_reg = 0xFFFF;
        emu.v_reg[0] = 2;
        step_ok(&mut emu);
        assert_eq!(emu.i_reg, 1);
    }

    #[test]
    fn jump_offset_adds_v0() {
        let mut emu = with_program(&[0xB2, 0x10]);
        emu.v_reg[0] = 4;
        step_ok(&mut emu);
        assert_eq!(emu.pc, 0x214);
    }

    #[test]
    fn skip_instructions_take_both_branches() {
        // V0 == 7 skips; then V0 != 7 does not.
        let mut emu = with_program(&[0x30, 0x07, 0x00, 0x00, 0x40, 0x07]);
        emu.v_reg[0] = 7;
        step_ok(&mut emu);
        assert_eq!(emu.pc, 0x204);
        step_ok(&mut emu);
        assert_eq!(emu.pc, 0x206);
    }

    #[test]
    fn key_skips_check_the_keypad() {
        let mut emu = with_program(&[0xE0, 0x9E, 0xE0, 0xA1]);
        emu.v_reg[0] = 0x4;
        emu.set_key(0x4, true);
        step_ok(&mut emu);
        assert_eq!(emu.pc, 0x204); // EX9E skipped
        step_ok(&mut emu);
        assert_eq!(emu.pc, 0x206); // EXA1 did not
    }

    #[test]
    fn rom_at_size_limit_loads_and_one_past_fails() {
        let mut emu = Emulator::default();
        assert!(emu.load_rom(&vec![0; MAX_ROM_SIZE]).is_ok());
        match emu.load_rom(&vec![0; MAX_ROM_SIZE + 1]) {
            Err(Chip8Error::RomTooLarge { size }) => assert_eq!(size, MAX_ROM_SIZE + 1),
            other => panic!("expected RomTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn return_on_empty_stack_halts_without_moving_pc() {
        let mut emu = with_program(&[0x00, 0xEE]);
        match emu.step() {
            Err(Chip8Error::StackUnderflow { pc }) => assert_eq!(pc, 0x200),
            other => panic!("expected StackUnderflow, got {:?}", other),
        }
        assert_eq!(emu.pc, 0x200);
        assert!(emu.is_halted());
        // Halted engine refuses to run until resumed.
        assert_eq!(step_ok(&mut emu), StepStatus::Halted);
        emu.resume();
        assert!(!emu.is_halted());
    }

    #[test]
    fn seventeenth_nested_call_overflows() {
        // 0x200 calls itself; each step pushes one return address.
        let mut emu = with_program(&[0x22, 0x00]);
        for _ in 0..STACK_SIZE {
            step_ok(&mut emu);
        }
        match emu.step() {
            Err(Chip8Error::StackOverflow { pc }) => assert_eq!(pc, 0x200),
            other => panic!("expected StackOverflow, got {:?}", other),
        }
    }

    #[test]
    fn unknown_opcode_reports_and_halts() {
        let mut emu = with_program(&[0x01, 0x23]);
        match emu.step() {
            Err(Chip8Error::UnknownOpcode { opcode, pc }) => {
                assert_eq!(opcode, 0x0123);
                assert_eq!(pc, 0x200);
            }
            other => panic!("expected UnknownOpcode, got {:?}", other),
        }
        assert_eq!(emu.pc, 0x200);
        assert!(emu.is_halted());
    }

    #[test]
    fn wait_key_ignores_keys_already_held() {
        let mut emu = with_program(&[0xF3, 0x0A]);
        emu.set_key(0x7, true);
        assert_eq!(step_ok(&mut emu), StepStatus::WaitingForKey);
        assert_eq!(emu.pc, 0x200);
        // Still held: no progress.
        assert_eq!(step_ok(&mut emu), StepStatus::WaitingForKey);
        // A fresh press answers the wait.
        emu.set_key(0x7, false);
        assert_eq!(step_ok(&mut emu), StepStatus::WaitingForKey);
        emu.set_key(0x4, true);
        assert_eq!(step_ok(&mut emu), StepStatus::Executed);
        assert_eq!(emu.v_reg[3], 0x4);
        assert_eq!(emu.pc, 0x202);
    }

    #[test]
    fn wait_key_sees_release_and_repress() {
        let mut emu = with_program(&[0xF0, 0x0A]);
        emu.set_key(0x2, true);
        assert_eq!(step_ok(&mut emu), StepStatus::WaitingForKey);
        emu.set_key(0x2, false);
        assert_eq!(step_ok(&mut emu), StepStatus::WaitingForKey);
        emu.set_key(0x2, true);
        assert_eq!(step_ok(&mut emu), StepStatus::Executed);
        assert_eq!(emu.v_reg[0], 0x2);
    }

    #[test]
    fn random_is_masked_and_reproducible() {
        let mut a = with_program(&[0xC0, 0x0F, 0xC1, 0x00]);
        let mut b = with_program(&[0xC0, 0x0F, 0xC1, 0x00]);
        step_ok(&mut a);
        step_ok(&mut b);
        assert_eq!(a.v_reg[0], b.v_reg[0]);
        assert!(a.v_reg[0] <= 0x0F);
        step_ok(&mut a);
        assert_eq!(a.v_reg[1], 0);
    }

    #[test]
    fn timers_floor_at_zero() {
        let mut emu = Emulator::default();
        emu.delay_timer = 3;
        emu.sound_timer = 1;
        assert!(emu.sound_active());
        emu.tick_timers(2);
        assert_eq!(emu.delay_timer, 1);
        assert!(!emu.sound_active());
        emu.tick_timers(500);
        assert_eq!(emu.delay_timer, 0);
        assert_eq!(emu.sound_timer, 0);
    }

    #[test]
    fn reset_reinstalls_font_and_clears_state() {
        let mut emu = with_program(&[0x6A, 0x42]);
        step_ok(&mut emu);
        emu.reset();
        assert_eq!(emu.pc, START_ADDRESS);
        assert_eq!(emu.v_reg, [0; NUM_REGS]);
        assert_eq!(&emu.ram[..FONTSET_SIZE], &FONTSET);
        assert_eq!(emu.ram[START_ADDRESS as usize], 0);
    }
}
