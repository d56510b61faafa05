use serde::Serialize;

use crate::memory::WordSource;

/// Where control goes after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Flow {
    Sequential,
    Jump { target: u32, conditional: bool },
    /// `br #W`
    Branch { target: u32 },
    /// `call #W`
    Call { target: u32 },
    Return,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub address: u32,
    pub mnemonic: &'static str,
    pub byte_mode: bool,
    pub operands: Vec<String>,
    /// Opcode word followed by any extension words.
    pub words: Vec<u16>,
    pub flow: Flow,
}

impl Instruction {
    pub fn extra_words(&self) -> usize {
        self.words.len() - 1
    }

    pub fn branch_target(&self) -> Option<u32> {
        match self.flow {
            Flow::Jump { target, .. } | Flow::Branch { target } | Flow::Call { target } => {
                Some(target)
            }
            Flow::Sequential | Flow::Return => None,
        }
    }

    /// Offset just past the last word of this instruction.
    pub fn end(&self) -> u32 {
        self.address.wrapping_add(2 * self.words.len() as u32)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid double-operand opcode {raw:#x}")]
    InvalidOpcode { raw: u8 },
    #[error("instruction at {address:#x} runs past the end of the data")]
    Truncated { address: u32, words: Vec<u16> },
}

pub trait Decoder {
    /// Decodes `word` found at `address`, pulling extension words from `src`.
    fn decode<S: WordSource>(
        &self,
        address: u32,
        word: u16,
        src: &mut S,
    ) -> Result<Instruction, DecodeError>;
}
