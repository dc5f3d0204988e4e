//! Line/column mapping for byte offsets.

use serde::{Deserialize, Serialize};

/// A 0-based line/character position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Position { line, character }
    }
}

/// Byte offsets of every line start in a source text.
#[derive(Clone, Debug, Default)]
pub struct LineMap {
    line_starts: Vec<u32>,
    text_len: u32,
}

impl LineMap {
    pub fn build(source: &str) -> Self {
        let mut line_starts = Vec::with_capacity(source.len() / 32 + 1);
        line_starts.push(0);
        line_starts.extend(memchr::memchr_iter(b'\n', source.as_bytes()).map(|i| i as u32 + 1));
        LineMap {
            line_starts,
            text_len: source.len() as u32,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Offsets past the end of the text clamp to the last position.
    pub fn position_of(&self, offset: u32) -> Position {
        let offset = offset.min(self.text_len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        Position::new(line as u32, offset - self.line_starts[line])
    }

    pub fn offset_of(&self, position: Position) -> Option<u32> {
        let start = *self.line_starts.get(position.line as usize)?;
        let offset = start + position.character;
        (offset <= self.text_len).then_some(offset)
    }
}
