use crate::hexdump::{parse_records, HexRecord, ParseError};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("offset {offset:#x} is not covered by any record")]
    Uncovered { offset: u32 },
}

/// Sequential/random access to 16-bit words keyed by offset.
pub trait WordSource {
    /// Next word in scan order with its offset. `None` once exhausted.
    fn next_word(&mut self) -> Option<(u32, u16)>;
    /// Offset the next `next_word` call will return, if any.
    fn position(&self) -> Option<u32>;
    /// Repositions so the next `next_word` yields the word after `offset`,
    /// and returns the word at `offset`.
    fn seek(&mut self, offset: u32) -> Result<u16, StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    rec: usize,
    idx: usize,
}

/// Words of a hex dump, ordered by offset.
#[derive(Debug, Clone)]
pub struct WordStore {
    records: Vec<HexRecord>,
    cursor: Cursor,
}

impl WordStore {
    /// `records` must ascend and not overlap; `parse_records` checks this.
    pub fn new(records: Vec<HexRecord>) -> Self {
        Self { records, cursor: Cursor { rec: 0, idx: 0 } }
    }

    pub fn from_dump(text: &str) -> Result<Self, ParseError> {
        Ok(Self::new(parse_records(text.lines())?))
    }

    pub fn records(&self) -> &[HexRecord] {
        &self.records
    }

    /// Total number of words held, elided records excluded.
    pub fn len(&self) -> usize {
        self.records.iter().map(|r| r.words.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One past the highest covered offset.
    pub fn end(&self) -> u32 {
        self.records.iter().filter(|r| !r.elided).map(HexRecord::end).max().unwrap_or(0)
    }

    /// Lowest covered offset.
    pub fn base(&self) -> u32 {
        self.records.iter().filter(|r| !r.elided).map(|r| r.start).min().unwrap_or(0)
    }

    /// Moves the cursor to the first word at or after `offset`.
    pub fn start_at(&mut self, offset: u32) {
        let rec = self.records.partition_point(|r| r.end() <= offset);
        let idx = match self.records.get(rec) {
            Some(r) if offset > r.start => ((offset - r.start) / 2) as usize,
            _ => 0,
        };
        self.cursor = Cursor { rec, idx };
    }

    /// Index of the non-elided record covering `offset`.
    fn find(&self, offset: u32) -> Option<usize> {
        // elided records hold no words, so they end where they start
        let i = self.records.partition_point(|r| r.end() <= offset);
        self.records.get(i).filter(|r| r.covers(offset)).map(|_| i)
    }

    // Skip past exhausted and elided records.
    fn settle(&self, cur: &mut Cursor) {
        while let Some(r) = self.records.get(cur.rec) {
            if cur.idx < r.words.len() {
                break;
            }
            cur.rec += 1;
            cur.idx = 0;
        }
    }
}

impl WordSource for WordStore {
    fn next_word(&mut self) -> Option<(u32, u16)> {
        let mut cur = self.cursor;
        self.settle(&mut cur);
        let r = self.records.get(cur.rec)?;
        let out = (r.start + 2 * cur.idx as u32, r.words[cur.idx]);
        cur.idx += 1;
        self.cursor = cur;
        Some(out)
    }

    fn position(&self) -> Option<u32> {
        let mut cur = self.cursor;
        self.settle(&mut cur);
        self.records.get(cur.rec).map(|r| r.start + 2 * cur.idx as u32)
    }

    fn seek(&mut self, offset: u32) -> Result<u16, StoreError> {
        if offset % 2 != 0 {
            return Err(StoreError::Uncovered { offset });
        }
        let rec = self.find(offset).ok_or(StoreError::Uncovered { offset })?;
        let idx = ((offset - self.records[rec].start) / 2) as usize;
        self.cursor = Cursor { rec, idx: idx + 1 };
        Ok(self.records[rec].words[idx])
    }
}
