//! Static name tables for registers and opcodes.

pub const REGISTERS: [&str; 16] = [
    "pc", "sp", "sr", "cg", "r4", "r5", "r6", "r7", "r8", "r9", "r10", "r11", "r12", "r13",
    "r14", "r15",
];

pub const PC: u8 = 0;
pub const SP: u8 = 1;
pub const SR: u8 = 2;
pub const CG: u8 = 3;

/// Jump conditions, indexed by bits 12..10.
pub const JUMPS: [&str; 8] = ["jnz", "jz", "jnc", "jc", "jn", "jge", "jl", "jmp"];
pub const JMP: u8 = 7;

/// Single-operand opcodes, indexed by bits 9..7.
pub const ONE_OP: [&str; 8] = ["rrc", "swpb", "rra", "sxt", "push", "call", "reti", "invalid"];
pub const CALL: u8 = 5;
pub const RETI: u8 = 6;
pub const ONE_OP_INVALID: u8 = 7;

/// Double-operand opcodes 4..=15; the top nibble minus 4 indexes this table.
pub const TWO_OP: [&str; 12] = [
    "mov", "add", "addc", "subc", "sub", "cmp", "dadd", "bit", "bic", "bis", "xor", "and",
];
pub const MOV: u8 = 4;

pub fn register_name(reg: u8) -> &'static str {
    REGISTERS[(reg & 0xf) as usize]
}

pub fn two_op_mnemonic(opcode: u8) -> Option<&'static str> {
    opcode.checked_sub(4).and_then(|i| TWO_OP.get(i as usize)).copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Jump,
    OneOperand,
    TwoOperand,
}

impl Format {
    /// Jump first, then single-operand; everything else is double-operand.
    pub fn classify(word: u16) -> Self {
        if word & 0xe000 == 0x2000 {
            Format::Jump
        } else if word & 0xfc00 == 0x1000 {
            Format::OneOperand
        } else {
            Format::TwoOperand
        }
    }
}
