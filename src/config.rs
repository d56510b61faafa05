use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
/// Which control transfers the disassembler follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow: u8 {
const SELF_JMP = 1 << 0; // `jmp` whose target is itself
const JMP = 1 << 1;      // every `jmp`
const BRANCH = 1 << 2;   // `br #imm`
const CALL = 1 << 3;     // `call #imm`; fall-through still decoded
}
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Offset must be aligned on a 2 byte boundary (got {offset:#x})")]
    Misaligned { offset: u32 },
    #[error("bad config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisasmConfig {
    /// Offset to start at; the first word in the dump when unset.
    pub start: Option<u32>,
    pub follow: Follow,
}

impl Default for DisasmConfig {
    fn default() -> Self {
        Self {
            start: None,
            follow: Follow::SELF_JMP | Follow::BRANCH,
        }
    }
}

impl DisasmConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.start {
            Some(offset) if offset % 2 != 0 => Err(ConfigError::Misaligned { offset }),
            _ => Ok(()),
        }
    }
}
