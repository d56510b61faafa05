use tracing::trace;

use crate::addressing::{resolve, Mode, Operand};
use crate::decoder::{DecodeError, Decoder, Flow, Instruction};
use crate::instructions::{
    two_op_mnemonic, Format, CALL, JMP, JUMPS, MOV, ONE_OP, ONE_OP_INVALID, PC, RETI, SP,
};
use crate::memory::WordSource;

/// `mov @sp+, pc`
pub const RET: u16 = 0x4130;

/// MSP430 decoder for the three base encoding families.
#[derive(Debug, Default, Clone, Copy)]
pub struct Msp430Decoder;

impl Msp430Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for Msp430Decoder {
    fn decode<S: WordSource>(
        &self,
        address: u32,
        word: u16,
        src: &mut S,
    ) -> Result<Instruction, DecodeError> {
        match Format::classify(word) {
            Format::Jump => Ok(jump(address, word)),
            Format::OneOperand => one_operand(address, word, src),
            Format::TwoOperand => two_operand(address, word, src),
        }
    }
}

/// Sign-extends the 10-bit word displacement of a jump.
pub fn jump_displacement(word: u16) -> i16 {
    ((word & 0x3ff) << 6) as i16 >> 6
}

pub fn jump_target(address: u32, disp: i16) -> u32 {
    address.wrapping_add(2).wrapping_add_signed(2 * disp as i32)
}

// 001c ccdd dddd dddd
fn jump(address: u32, word: u16) -> Instruction {
    let cond = ((word >> 10) & 0x7) as u8;
    let target = jump_target(address, jump_displacement(word));
    Instruction {
        address,
        mnemonic: JUMPS[cond as usize],
        byte_mode: false,
        operands: vec![format!("{target:#x}")],
        words: vec![word],
        flow: Flow::Jump { target, conditional: cond != JMP },
    }
}

// Pulls an operand, recording any extension word it consumes. The word must
// sit right after the ones already taken; across a gap it is left unread.
fn operand<S: WordSource>(
    address: u32,
    mode: Mode,
    reg: u8,
    src: &mut S,
    words: &mut Vec<u16>,
) -> Result<Operand, DecodeError> {
    let op = resolve(mode, reg, || {
        let want = address.wrapping_add(2 * words.len() as u32);
        if src.position() != Some(want) {
            return None;
        }
        let (_, w) = src.next_word()?;
        words.push(w);
        Some(w)
    });
    op.ok_or_else(|| DecodeError::Truncated { address, words: words.clone() })
}

// 0001 00oo obaa rrrr
fn one_operand<S: WordSource>(
    address: u32,
    word: u16,
    src: &mut S,
) -> Result<Instruction, DecodeError> {
    let opcode = ((word >> 7) & 0x7) as u8;
    let byte_mode = word & 0x40 != 0;
    let mode = Mode::from_bits(word >> 4);
    let reg = (word & 0xf) as u8;
    let mut words = vec![word];

    if opcode == ONE_OP_INVALID {
        return Ok(Instruction {
            address,
            mnemonic: ONE_OP[opcode as usize],
            byte_mode: false,
            operands: Vec::new(),
            words,
            flow: Flow::Sequential,
        });
    }

    let op = operand(address, mode, reg, src, &mut words)?;
    let (operands, flow) = match (opcode, op) {
        (RETI, _) => (Vec::new(), Flow::Return),
        (CALL, Operand::Immediate(w)) => (vec![op.render()], Flow::Call { target: w as u32 }),
        _ => (vec![op.render()], Flow::Sequential),
    };
    Ok(Instruction {
        address,
        mnemonic: ONE_OP[opcode as usize],
        byte_mode,
        operands,
        words,
        flow,
    })
}

// oooo ssss abaa dddd
fn two_operand<S: WordSource>(
    address: u32,
    word: u16,
    src: &mut S,
) -> Result<Instruction, DecodeError> {
    let raw = (word >> 12) as u8;
    let Some(mnemonic) = two_op_mnemonic(raw) else {
        trace!(address, raw, "invalid double-operand opcode");
        return Err(DecodeError::InvalidOpcode { raw });
    };
    let sreg = ((word >> 8) & 0xf) as u8;
    let dmode = if word & 0x80 != 0 { Mode::Indexed } else { Mode::Direct };
    let byte_mode = word & 0x40 != 0;
    let smode = Mode::from_bits(word >> 4);
    let dreg = (word & 0xf) as u8;

    if word == RET {
        return Ok(Instruction {
            address,
            mnemonic: "ret",
            byte_mode: false,
            operands: Vec::new(),
            words: vec![word],
            flow: Flow::Return,
        });
    }

    let mut words = vec![word];
    let s = operand(address, smode, sreg, src, &mut words)?;
    let d = operand(address, dmode, dreg, src, &mut words)?;

    let (mnemonic, operands, flow) = match (raw, s, d) {
        (MOV, Operand::IndirectInc(SP), _) => ("pop", vec![d.render()], Flow::Sequential),
        (MOV, Operand::Immediate(w), Operand::Reg(PC)) if !byte_mode => {
            ("br", vec![s.render()], Flow::Branch { target: w as u32 })
        }
        _ => (mnemonic, vec![s.render(), d.render()], Flow::Sequential),
    };
    Ok(Instruction { address, mnemonic, byte_mode, operands, words, flow })
}
