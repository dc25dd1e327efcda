mod app;
mod emulator;
mod error;
mod instruction;
mod timer;

pub use app::EmulatorApp;
pub use emulator::{Emulator, Quirks, StepStatus};
pub use error::Chip8Error;
pub use instruction::{Instruction, Opcode};
pub use timer::TimerClock;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;
pub const SCREEN_SCALE: u32 = 10;

pub const RAM_SIZE: usize = 4096;
pub const NUM_REGS: usize = 16;
pub const NUM_KEYS: usize = 16;
pub const STACK_SIZE: usize = 16;
/// CHIP-8 ROMs are loaded at 0x200; everything below is interpreter space.
pub const START_ADDRESS: u16 = 0x200;
pub const MAX_ROM_SIZE: usize = RAM_SIZE - START_ADDRESS as usize;

/// Both timers tick down at 60 Hz, independent of instruction rate.
pub const TIMER_HZ: u32 = 60;

pub const FONT_GLYPH_BYTES: u16 = 5;
pub const FONTSET_SIZE: usize = 80;
/// Hex digit glyphs 0-F, 8x5 pixels each, installed at address 0x000.
pub const FONTSET: [u8; FONTSET_SIZE] = [
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
