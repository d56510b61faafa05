//! Linear decode with branch following.
//!
//! Decoding runs sequentially from the start offset. An unconditional
//! transfer the config asks to follow ends the current run and decoding
//! resumes at its target; followed calls queue their target and the run goes
//! on. Every decoded offset is marked in a bit set, so a target (or a
//! fall-through) that reaches already decoded code stops instead of looping.

use std::collections::VecDeque;

use bitvec::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{ConfigError, DisasmConfig, Follow};
use crate::decoder::{DecodeError, Decoder, Flow, Instruction};
use crate::isa::msp430::Msp430Decoder;
use crate::memory::{WordSource, WordStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Line {
    Insn(Instruction),
    /// Double-operand word with opcode field 0..=3.
    Invalid { address: u32, word: u16 },
    /// Words of an instruction cut short by the end of a record.
    Data { address: u32, words: Vec<u16> },
    /// Decoding jumped to a region not contiguous with the previous line.
    Separator { target: u32 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub lines: Vec<Line>,
    /// Targets decoding continued at, in order.
    pub followed: Vec<u32>,
    /// Targets outside every record.
    pub unresolved: Vec<u32>,
}

impl Listing {
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.lines.iter().filter_map(|l| match l {
            Line::Insn(i) => Some(i),
            _ => None,
        })
    }
}

struct Walker<'a> {
    store: &'a mut WordStore,
    dec: Msp430Decoder,
    follow: Follow,
    /// Bit per word from `base` upwards.
    visited: BitVec,
    base: u32,
    pending: VecDeque<u32>,
    last_end: Option<u32>,
    out: Listing,
}

impl Walker<'_> {
    fn slot(&self, address: u32) -> Option<usize> {
        address.checked_sub(self.base).map(|d| (d / 2) as usize)
    }

    fn mark(&mut self, address: u32) -> bool {
        let Some(i) = self.slot(address) else { return true };
        if i >= self.visited.len() {
            self.visited.resize(i + 1, false);
        }
        !self.visited.replace(i, true)
    }

    fn is_visited(&self, address: u32) -> bool {
        self.slot(address)
            .and_then(|i| self.visited.get(i).map(|b| *b))
            .unwrap_or(false)
    }

    /// Decodes until the data runs out, a followed transfer, or known code.
    fn run(&mut self, mut first: Option<(u32, u16)>) {
        loop {
            let Some((address, word)) = first.take().or_else(|| self.store.next_word()) else {
                return;
            };
            if !self.mark(address) {
                debug!(address, "reached decoded code");
                return;
            }
            match self.dec.decode(address, word, &mut *self.store) {
                Ok(insn) => {
                    for k in 1..insn.words.len() {
                        self.mark(address.wrapping_add(2 * k as u32));
                    }
                    self.last_end = Some(insn.end());
                    let redirect = self.redirect(&insn);
                    self.out.lines.push(Line::Insn(insn));
                    if redirect {
                        return;
                    }
                }
                Err(DecodeError::InvalidOpcode { .. }) => {
                    self.last_end = Some(address.wrapping_add(2));
                    self.out.lines.push(Line::Invalid { address, word });
                }
                Err(DecodeError::Truncated { address, words }) => {
                    for k in 1..words.len() {
                        self.mark(address.wrapping_add(2 * k as u32));
                    }
                    self.last_end = Some(address.wrapping_add(2 * words.len() as u32));
                    self.out.lines.push(Line::Data { address, words });
                }
            }
        }
    }

    /// Queues the target of `insn` if it is followed; true when the
    /// sequential run must stop there.
    fn redirect(&mut self, insn: &Instruction) -> bool {
        match insn.flow {
            Flow::Jump { target, conditional: false }
                if self.follow.contains(Follow::JMP)
                    || (self.follow.contains(Follow::SELF_JMP) && target == insn.address) =>
            {
                self.pending.push_front(target);
                true
            }
            Flow::Branch { target } if self.follow.contains(Follow::BRANCH) => {
                self.pending.push_front(target);
                true
            }
            Flow::Call { target } if self.follow.contains(Follow::CALL) => {
                self.pending.push_back(target);
                false
            }
            _ => false,
        }
    }

    fn drain(&mut self) {
        while let Some(target) = self.pending.pop_front() {
            if self.is_visited(target) {
                debug!(offset = target, "target already decoded");
                continue;
            }
            let word = match self.store.seek(target) {
                Ok(word) => word,
                Err(e) => {
                    warn!(offset = target, "cannot follow: {e}");
                    self.out.unresolved.push(target);
                    continue;
                }
            };
            debug!(offset = target, "following");
            if self.last_end != Some(target) {
                self.out.lines.push(Line::Separator { target });
            }
            self.out.followed.push(target);
            self.run(Some((target, word)));
        }
    }
}

/// Disassembles `store` according to `cfg`.
pub fn disassemble(store: &mut WordStore, cfg: &DisasmConfig) -> Result<Listing, ConfigError> {
    cfg.validate()?;
    if let Some(start) = cfg.start {
        store.start_at(start);
    }
    let base = store.base();
    let words = (store.end().saturating_sub(base) / 2) as usize;
    let mut w = Walker {
        store,
        dec: Msp430Decoder::new(),
        follow: cfg.follow,
        visited: bitvec![0; words],
        base,
        pending: VecDeque::new(),
        last_end: None,
        out: Listing::default(),
    };
    w.run(None);
    w.drain();
    Ok(w.out)
}
