//! Byte offset to line/column lookup.

use std::ops::Range;

/// Line start offsets of one source text.
///
/// ```
/// use pyl_diagnostic::LineIndex;
///
/// let source = "x = 1\ny = 2\n";
/// let index = LineIndex::new(source);
/// assert_eq!(index.line_col(source, 6), (2, 1));
/// ```
#[derive(Clone, Debug, Default)]
pub struct LineIndex {
    /// `starts[i]` is the byte offset where line `i + 1` begins.
    starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut starts = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineIndex { starts }
    }

    /// 1-based line containing `offset`.
    pub fn line(&self, offset: u32) -> u32 {
        let idx = match self.starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        u32::try_from(idx).unwrap_or(u32::MAX - 1) + 1
    }

    /// 1-based (line, column); the column counts characters.
    pub fn line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line(offset);
        let start = self.line_range(source, line).start;
        let end = (offset as usize).clamp(start, source.len());
        let column = source.get(start..end).map_or(0, |text| text.chars().count());
        (line, u32::try_from(column).unwrap_or(u32::MAX - 1) + 1)
    }

    /// Byte range of a 1-based line, without its line terminator.
    pub fn line_range(&self, source: &str, line: u32) -> Range<usize> {
        let idx = line.saturating_sub(1) as usize;
        let start = self.starts.get(idx).map_or(source.len(), |&s| s as usize).min(source.len());
        let end = self
            .starts
            .get(idx + 1)
            .map_or(source.len(), |&s| (s as usize).saturating_sub(1))
            .max(start);
        let text = &source[start..end];
        start..start + text.trim_end_matches('\r').len()
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}
