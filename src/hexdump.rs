//! Parsing of textual hex-dump records.
//!
//! Each line has the shape `<hex-offset>:<payload>`. The payload is a run of
//! whitespace separated hex groups, four characters per word, where every word
//! is shown low byte first (`3041` is the word `0x4130`). A payload that starts
//! with `*` marks an elided record. Anything after the first token that is not
//! pure hex (an ASCII column, say) is ignored.

use serde::Serialize;

/// Payload marker for records whose contents were folded away by the dumper.
pub const ELIDED_MARKER: char = '*';

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: missing ':' between offset and payload")]
    MissingColon { line: usize },
    #[error("line {line}: bad offset {text:?}")]
    BadOffset { line: usize, text: String },
    #[error("line {line}: offset {offset:#x} is not 2-byte aligned")]
    OddOffset { line: usize, offset: u32 },
    #[error("line {line}: hex group {text:?} does not hold whole words")]
    PartialWord { line: usize, text: String },
    #[error("line {line}: record at {offset:#x} overlaps or precedes the previous record (ends at {prev_end:#x})")]
    OutOfOrder { line: usize, offset: u32, prev_end: u32 },
    #[error("line {line}: record at {offset:#x} runs past the end of the address space")]
    Overflow { line: usize, offset: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HexRecord {
    pub start: u32,
    pub words: Vec<u16>,
    pub elided: bool,
}

impl HexRecord {
    /// One past the last covered offset; an elided record ends where it starts.
    pub fn end(&self) -> u32 {
        // parse_record rejects records whose end does not fit
        self.start.saturating_add(2 * self.words.len() as u32)
    }

    pub fn covers(&self, offset: u32) -> bool {
        !self.elided && offset >= self.start && offset < self.end()
    }
}

/// Un-swaps a 4 character dump group into its numeric word.
pub fn parse_word(group: &str) -> Option<u16> {
    if group.len() != 4 || !group.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let lo = u8::from_str_radix(&group[0..2], 16).ok()?;
    let hi = u8::from_str_radix(&group[2..4], 16).ok()?;
    Some(u16::from_le_bytes([lo, hi]))
}

/// Renders a word the way the dump shows it (low byte first).
pub fn dump_word(word: u16) -> String {
    let [lo, hi] = word.to_le_bytes();
    format!("{lo:02x}{hi:02x}")
}

/// Parses a single line; `line` is the 1-based number used in errors.
/// Blank lines yield `Ok(None)`.
pub fn parse_record(text: &str, line: usize) -> Result<Option<HexRecord>, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let (off, payload) = text
        .split_once(':')
        .ok_or(ParseError::MissingColon { line })?;
    let off = off.trim();
    let hex = off
        .strip_prefix("0x")
        .or_else(|| off.strip_prefix("0X"))
        .unwrap_or(off);
    let start = u32::from_str_radix(hex, 16).map_err(|_| ParseError::BadOffset {
        line,
        text: off.to_string(),
    })?;
    if start % 2 != 0 {
        return Err(ParseError::OddOffset { line, offset: start });
    }

    let payload = payload.trim_start();
    if payload.starts_with(ELIDED_MARKER) {
        return Ok(Some(HexRecord { start, words: Vec::new(), elided: true }));
    }

    let mut words = Vec::new();
    for tok in payload.split_whitespace() {
        if !tok.bytes().all(|b| b.is_ascii_hexdigit()) {
            break;
        }
        if tok.len() % 4 != 0 {
            return Err(ParseError::PartialWord { line, text: tok.to_string() });
        }
        // every 4-char chunk of an all-hex token parses
        words.extend((0..tok.len()).step_by(4).filter_map(|i| parse_word(&tok[i..i + 4])));
    }
    u32::try_from(words.len())
        .ok()
        .and_then(|n| n.checked_mul(2))
        .and_then(|len| start.checked_add(len))
        .ok_or(ParseError::Overflow { line, offset: start })?;
    Ok(Some(HexRecord { start, words, elided: false }))
}

/// Parses a whole dump, checking that records ascend and never overlap.
pub fn parse_records<'a, I>(lines: I) -> Result<Vec<HexRecord>, ParseError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out: Vec<HexRecord> = Vec::new();
    let mut prev_end = 0u32;
    for (idx, text) in lines.into_iter().enumerate() {
        let line = idx + 1;
        let Some(rec) = parse_record(text, line)? else { continue };
        if !out.is_empty() && rec.start < prev_end {
            return Err(ParseError::OutOfOrder { line, offset: rec.start, prev_end });
        }
        prev_end = rec.end();
        out.push(rec);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::WordStore;

    #[test]
    fn words_are_unswapped() {
        assert_eq!(parse_word("3041"), Some(0x4130));
        assert_eq!(parse_word("0412"), Some(0x1204));
        assert_eq!(parse_word("04x2"), None);
        assert_eq!(dump_word(0x4130), "3041");
    }

    #[test]
    fn record_with_spaces_and_ascii_column() {
        let rec = parse_record("1000: 0412 1056 3041 2453  ..V0A$S", 1).unwrap().unwrap();
        assert_eq!(rec.start, 0x1000);
        assert_eq!(rec.words, vec![0x1204, 0x5610, 0x4130, 0x5324]);
        assert_eq!(rec.end(), 0x1008);
        assert!(!rec.elided);
    }

    #[test]
    fn packed_payload_splits_into_words() {
        let rec = parse_record("0x4400:31400044", 1).unwrap().unwrap();
        assert_eq!(rec.words, vec![0x4031, 0x4400]);
    }

    #[test]
    fn elided_record() {
        let rec = parse_record("1010:*", 3).unwrap().unwrap();
        assert!(rec.elided);
        assert!(rec.words.is_empty());
        assert!(!rec.covers(0x1010));
    }

    #[test]
    fn bad_lines() {
        assert_eq!(parse_record("   ", 1), Ok(None));
        assert_eq!(parse_record("1000 0412", 2), Err(ParseError::MissingColon { line: 2 }));
        assert!(matches!(parse_record("zz: 0412", 1), Err(ParseError::BadOffset { .. })));
        assert_eq!(
            parse_record("1001: 0412", 4),
            Err(ParseError::OddOffset { line: 4, offset: 0x1001 })
        );
        assert!(matches!(parse_record("1000: 04121", 1), Err(ParseError::PartialWord { .. })));
    }

    #[test]
    fn record_past_address_space_rejected() {
        assert_eq!(
            parse_record("fffffffc: 0412 3041", 1),
            Err(ParseError::Overflow { line: 1, offset: 0xffff_fffc })
        );
        let rec = parse_record("fffffffc: 0412", 1).unwrap().unwrap();
        assert_eq!(rec.end(), 0xffff_fffe);
        assert!(WordStore::from_dump("fffffffc: 0412 3041\n").is_err());
    }

    #[test]
    fn overlapping_records_rejected() {
        let err = parse_records(["1000: 0412 1056", "1002: 3041"]).unwrap_err();
        assert_eq!(err, ParseError::OutOfOrder { line: 2, offset: 0x1002, prev_end: 0x1004 });
        assert!(parse_records(["1000: 0412", "", "1010:*", "1020: 3041"]).is_ok());
    }
}
