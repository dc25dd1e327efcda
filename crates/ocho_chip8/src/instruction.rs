/// Field extraction for a fetched 16-bit opcode.
///
/// `nnn`/`nn`/`n` are the 12/8/4-bit immediates, `x`/`y` the two register
/// indices. Built fresh on every fetch and discarded after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: u16,
    pub nnn: u16,
    pub nn: u8,
    pub n: u8,
    pub x: usize,
    pub y: usize,
}

impl Instruction {
    pub fn from_opcode(opcode: u16) -> Self {
        Instruction {
            opcode,
            nnn: opcode & 0x0FFF,
            nn: (opcode & 0x00FF) as u8,
            n: (opcode & 0x000F) as u8,
            x: ((opcode >> 8) & 0x0F) as usize,
            y: ((opcode >> 4) & 0x0F) as usize,
        }
    }

    /// Decode into the instruction set, or `None` for anything outside it.
    ///
    /// `0NNN` (machine-code routine on the original COSMAC VIP) is
    /// deliberately not part of the set: we never execute RAM as host code.
    pub fn decode(self) -> Option<Opcode> {
        let Instruction { nnn, nn, .. } = self;
        let op = match (self.opcode >> 12, self.x, self.y, self.n) {
            (0x0, 0x0, 0xE, 0x0) => Opcode::ClearScreen,
            (0x0, 0x0, 0xE, 0xE) => Opcode::Return,
            (0x1, _, _, _) => Opcode::Jump { nnn },
            (0x2, _, _, _) => Opcode::Call { nnn },
            (0x3, x, _, _) => Opcode::SkipEqImm { x, nn },
            (0x4, x, _, _) => Opcode::SkipNeImm { x, nn },
            (0x5, x, y, 0x0) => Opcode::SkipEqReg { x, y },
            (0x6, x, _, _) => Opcode::LoadImm { x, nn },
            (0x7, x, _, _) => Opcode::AddImm { x, nn },
            (0x8, x, y, 0x0) => Opcode::Move { x, y },
            (0x8, x, y, 0x1) => Opcode::Or { x, y },
            (0x8, x, y, 0x2) => Opcode::And { x, y },
            (0x8, x, y, 0x3) => Opcode::Xor { x, y },
            (0x8, x, y, 0x4) => Opcode::Add { x, y },
            (0x8, x, y, 0x5) => Opcode::Sub { x, y },
            (0x8, x, y, 0x6) => Opcode::ShiftRight { x, y },
            (0x8, x, y, 0x7) => Opcode::SubReversed { x, y },
            (0x8, x, y, 0xE) => Opcode::ShiftLeft { x, y },
            (0x9, x, y, 0x0) => Opcode::SkipNeReg { x, y },
            (0xA, _, _, _) => Opcode::LoadIndex { nnn },
            (0xB, _, _, _) => Opcode::JumpOffset { nnn },
            (0xC, x, _, _) => Opcode::Random { x, nn },
            (0xD, x, y, n) => Opcode::Draw { x, y, n },
            (0xE, x, 0x9, 0xE) => Opcode::SkipKeyPressed { x },
            (0xE, x, 0xA, 0x1) => Opcode::SkipKeyReleased { x },
            (0xF, x, 0x0, 0x7) => Opcode::ReadDelay { x },
            (0xF, x, 0x0, 0xA) => Opcode::WaitKey { x },
            (0xF, x, 0x1, 0x5) => Opcode::SetDelay { x },
            (0xF, x, 0x1, 0x8) => Opcode::SetSound { x },
            (0xF, x, 0x1, 0xE) => Opcode::AddIndex { x },
            (0xF, x, 0x2, 0x9) => Opcode::LoadGlyph { x },
            (0xF, x, 0x3, 0x3) => Opcode::StoreBcd { x },
            (0xF, x, 0x5, 0x5) => Opcode::StoreRegisters { x },
            (0xF, x, 0x6, 0x5) => Opcode::LoadRegisters { x },
            _ => return None,
        };
        Some(op)
    }
}

/// One decoded CHIP-8 instruction.
///
/// Matching on this enum is exhaustive, so every execute arm does exactly
/// one thing and unknown patterns are rejected at decode time instead of
/// falling through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1NNN
    Jump { nnn: u16 },
    /// 2NNN
    Call { nnn: u16 },
    /// 3XNN
    SkipEqImm { x: usize, nn: u8 },
    /// 4XNN
    SkipNeImm { x: usize, nn: u8 },
    /// 5XY0
    SkipEqReg { x: usize, y: usize },
    /// 6XNN
    LoadImm { x: usize, nn: u8 },
    /// 7XNN
    AddImm { x: usize, nn: u8 },
    /// 8XY0
    Move { x: usize, y: usize },
    /// 8XY1
    Or { x: usize, y: usize },
    /// 8XY2
    And { x: usize, y: usize },
    /// 8XY3
    Xor { x: usize, y: usize },
    /// 8XY4
    Add { x: usize, y: usize },
    /// 8XY5
    Sub { x: usize, y: usize },
    /// 8XY6
    ShiftRight { x: usize, y: usize },
    /// 8XY7
    SubReversed { x: usize, y: usize },
    /// 8XYE
    ShiftLeft { x: usize, y: usize },
    /// 9XY0
    SkipNeReg { x: usize, y: usize },
    /// ANNN
    LoadIndex { nnn: u16 },
    /// BNNN
    JumpOffset { nnn: u16 },
    /// CXNN
    Random { x: usize, nn: u8 },
    /// DXYN
    Draw { x: usize, y: usize, n: u8 },
    /// EX9E
    SkipKeyPressed { x: usize },
    /// EXA1
    SkipKeyReleased { x: usize },
    /// FX07
    ReadDelay { x: usize },
    /// FX0A
    WaitKey { x: usize },
    /// FX15
    SetDelay { x: usize },
    /// FX18
    SetSound { x: usize },
    /// FX1E
    AddIndex { x: usize },
    /// FX29
    LoadGlyph { x: usize },
    /// FX33
    StoreBcd { x: usize },
    /// FX55
    StoreRegisters { x: usize },
    /// FX65
    LoadRegisters { x: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(op: u16) -> Option<Opcode> {
        Instruction::from_opcode(op).decode()
    }

    #[test]
    fn field_extraction() {
        let inst = Instruction::from_opcode(0xD7A5);
        assert_eq!(inst.nnn, 0x7A5);
        assert_eq!(inst.nn, 0xA5);
        assert_eq!(inst.n, 0x5);
        assert_eq!(inst.x, 0x7);
        assert_eq!(inst.y, 0xA);
    }

    #[test]
    fn decodes_every_family() {
        assert_eq!(decode(0x00E0), Some(Opcode::ClearScreen));
        assert_eq!(decode(0x00EE), Some(Opcode::Return));
        assert_eq!(decode(0x1ABC), Some(Opcode::Jump { nnn: 0xABC }));
        assert_eq!(decode(0x2ABC), Some(Opcode::Call { nnn: 0xABC }));
        assert_eq!(decode(0x3A42), Some(Opcode::SkipEqImm { x: 0xA, nn: 0x42 }));
        assert_eq!(decode(0x8AB4), Some(Opcode::Add { x: 0xA, y: 0xB }));
        assert_eq!(decode(0x8AB6), Some(Opcode::ShiftRight { x: 0xA, y: 0xB }));
        assert_eq!(decode(0xD125), Some(Opcode::Draw { x: 1, y: 2, n: 5 }));
        assert_eq!(decode(0xE29E), Some(Opcode::SkipKeyPressed { x: 2 }));
        assert_eq!(decode(0xF30A), Some(Opcode::WaitKey { x: 3 }));
        assert_eq!(decode(0xF465), Some(Opcode::LoadRegisters { x: 4 }));
    }

    #[test]
    fn rejects_unknown_patterns() {
        // Machine-code routine calls, including the all-zero word.
        assert_eq!(decode(0x0000), None);
        assert_eq!(decode(0x0123), None);
        // Gaps inside the secondary-dispatch families.
        assert_eq!(decode(0x5AB1), None);
        assert_eq!(decode(0x8AB8), None);
        assert_eq!(decode(0x9AB2), None);
        assert_eq!(decode(0xE2A2), None);
        assert_eq!(decode(0xF3FF), None);
    }
}
