pub mod addressing;
pub mod config;
pub mod decoder;
pub mod disasm;
pub mod follow;
pub mod hexdump;
pub mod instructions;
pub mod memory;

pub mod isa {
    pub mod msp430; // base MSP430 (non-X) encodings
}

pub use config::{ConfigError, DisasmConfig, Follow};
pub use decoder::{DecodeError, Decoder, Flow, Instruction};
pub use follow::{disassemble, Line, Listing};
pub use memory::{StoreError, WordSource, WordStore};
