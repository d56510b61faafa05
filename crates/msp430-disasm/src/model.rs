use anyhow::{Context, Result};
use std::path::Path;

use msp430_rs::WordStore;

/// Reads a hex dump file into a word store.
pub fn load_dump(path: &Path) -> Result<WordStore> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let store = WordStore::from_dump(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(store)
}

/// Start offsets are hexadecimal, with or without a `0x` prefix.
pub fn parse_offset(s: &str) -> Result<u32> {
    let s = s.trim();
    let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u32::from_str_radix(hex, 16).with_context(|| format!("bad offset {s:?}"))
}

/// Plain hex text (two characters per byte) to bytes; whitespace is ignored.
pub fn hex_to_bytes(text: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = text.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    anyhow::ensure!(digits.len() % 2 == 0, "odd number of hex digits ({})", digits.len());
    digits
        .chunks(2)
        .map(|pair| {
            let s = std::str::from_utf8(pair)?;
            u8::from_str_radix(s, 16).with_context(|| format!("bad hex byte {s:?}"))
        })
        .collect()
}
