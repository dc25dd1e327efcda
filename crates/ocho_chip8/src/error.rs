use std::error::Error;
use std::fmt;
use std::io;

use crate::MAX_ROM_SIZE;

/// Everything that can go wrong while loading or running a ROM.
///
/// The load-time variants are fatal before any instruction executes; the
/// execution variants leave the engine halted with its state intact so the
/// host can report them.
#[derive(Debug)]
pub enum Chip8Error {
    RomTooLarge { size: usize },
    RomUnreadable(io::Error),
    StackOverflow { pc: u16 },
    StackUnderflow { pc: u16 },
    UnknownOpcode { opcode: u16, pc: u16 },
}

impl fmt::Display for Chip8Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chip8Error::RomTooLarge { size } => {
                write!(f, "ROM is {size} bytes, maximum is {MAX_ROM_SIZE}")
            }
            Chip8Error::RomUnreadable(err) => write!(f, "could not read ROM: {err}"),
            Chip8Error::StackOverflow { pc } => {
                write!(f, "call stack overflow at 0x{pc:04X}")
            }
            Chip8Error::StackUnderflow { pc } => {
                write!(f, "return with empty stack at 0x{pc:04X}")
            }
            Chip8Error::UnknownOpcode { opcode, pc } => {
                write!(f, "unknown opcode 0x{opcode:04X} at 0x{pc:04X}")
            }
        }
    }
}

impl Error for Chip8Error {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Chip8Error::RomUnreadable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Chip8Error {
    fn from(err: io::Error) -> Self {
        Chip8Error::RomUnreadable(err)
    }
}
