//! Operand addressing, including the constant generator.
//!
//! Registers `sr` and `cg` double as literal sources: depending on the
//! addressing mode they stand for one of `#0 #1 #2 #4 #8 #-1` instead of a
//! register or memory reference. `sr` in indexed mode is absolute addressing
//! (`&W`) and `pc` in autoincrement mode is an immediate (`#W`).

use crate::instructions::{register_name, CG, PC, SR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Direct,
    Indexed,
    Indirect,
    IndirectInc,
}

impl Mode {
    pub fn from_bits(bits: u16) -> Self {
        match bits & 0x3 {
            0 => Mode::Direct,
            1 => Mode::Indexed,
            2 => Mode::Indirect,
            _ => Mode::IndirectInc,
        }
    }
}

/// How an operand's text is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Reg(u8),
    Indexed { reg: u8, offset: u16 },
    Indirect(u8),
    IndirectInc(u8),
    Immediate(u16),
    Absolute(u16),
    Constant(i8),
}

impl Operand {
    /// Whether an extension word backs this operand.
    pub fn extra_word(&self) -> bool {
        matches!(self, Operand::Indexed { .. } | Operand::Immediate(_) | Operand::Absolute(_))
    }

    pub fn render(&self) -> String {
        match *self {
            Operand::Reg(r) => register_name(r).to_string(),
            Operand::Indexed { reg, offset } => format!("{offset:#x}({})", register_name(reg)),
            Operand::Indirect(r) => format!("@{}", register_name(r)),
            Operand::IndirectInc(r) => format!("@{}+", register_name(r)),
            Operand::Immediate(w) => format!("#{w:#x}"),
            Operand::Absolute(w) => format!("&{w:#x}"),
            Operand::Constant(c) => format!("#{c}"),
        }
    }
}

/// Whether (mode, reg) needs an extension word. Total over all 64 pairs.
pub fn needs_extra(mode: Mode, reg: u8) -> bool {
    match (reg & 0xf, mode) {
        (CG, _) => false,
        (SR, Mode::Indexed) => true,
        (SR, _) => false,
        (PC, Mode::IndirectInc) => true,
        (_, Mode::Indexed) => true,
        _ => false,
    }
}

/// Resolves an operand. `fetch` is called exactly once when an extension word
/// is required and never otherwise; `None` from it (data ran out) is
/// propagated.
pub fn resolve<F>(mode: Mode, reg: u8, fetch: F) -> Option<Operand>
where
    F: FnOnce() -> Option<u16>,
{
    let reg = reg & 0xf;
    if !needs_extra(mode, reg) {
        return Some(match (reg, mode) {
            (CG, Mode::Direct) => Operand::Constant(0),
            (CG, Mode::Indexed) => Operand::Constant(1),
            (CG, Mode::Indirect) => Operand::Constant(2),
            (CG, Mode::IndirectInc) => Operand::Constant(-1),
            (SR, Mode::Indirect) => Operand::Constant(4),
            (SR, Mode::IndirectInc) => Operand::Constant(8),
            (r, Mode::Direct) => Operand::Reg(r),
            (r, Mode::Indirect) => Operand::Indirect(r),
            (r, _) => Operand::IndirectInc(r),
        });
    }
    let w = fetch()?;
    Some(match (reg, mode) {
        (SR, _) => Operand::Absolute(w),
        (PC, Mode::IndirectInc) => Operand::Immediate(w),
        (r, _) => Operand::Indexed { reg: r, offset: w },
    })
}
