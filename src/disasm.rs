use crate::decoder::Instruction;
use crate::follow::{Line, Listing};
use crate::hexdump::dump_word;

pub const SEPARATOR: &str = "...";

pub fn fmt_instruction(i: &Instruction) -> String {
    let suffix = if i.byte_mode { ".b" } else { "" };
    if i.operands.is_empty() {
        format!("{}{}", i.mnemonic, suffix)
    } else {
        format!("{}{} {}", i.mnemonic, suffix, i.operands.join(", "))
    }
}

/// Words as they appear in the dump, space separated.
pub fn fmt_raw(words: &[u16]) -> String {
    words.iter().map(|&w| dump_word(w)).collect::<Vec<_>>().join(" ")
}

pub fn fmt_line(line: &Line) -> String {
    match line {
        Line::Insn(i) => format!("{:#x}:\t{}\t{}", i.address, fmt_raw(&i.words), fmt_instruction(i)),
        Line::Invalid { address, word } => format!("{address:#x}:\t{}\tinvalid", dump_word(*word)),
        Line::Data { address, words } => {
            let vals = words.iter().map(|w| format!("{w:#06x}")).collect::<Vec<_>>();
            format!("{address:#x}:\t{}\t.word {}", fmt_raw(words), vals.join(", "))
        }
        Line::Separator { .. } => SEPARATOR.to_string(),
    }
}

pub fn fmt_listing(l: &Listing) -> String {
    let mut out = String::new();
    for line in &l.lines {
        out.push_str(&fmt_line(line));
        out.push('\n');
    }
    out
}
