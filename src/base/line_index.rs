//! Conversion between byte offsets and UTF-16 positions.

use text_size::TextSize;

use super::Position;

/// Index for converting between byte offsets and LSP positions.
///
/// Only line starts are stored; column conversion scans the line with a
/// UTF-8 decoder, so the source text must be passed back in on every query.
/// Lines end at `\n`, which also covers `\r\n` line endings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the start of each line
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    /// Build a line index from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];

        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::from((offset + 1) as u32));
            }
        }

        Self { line_starts }
    }

    /// Convert a position to a byte offset, clamping out-of-range lines and
    /// columns to the nearest valid offset.
    pub fn offset(&self, text: &str, position: Position) -> TextSize {
        let Some(&line_start) = self.line_starts.get(position.line as usize) else {
            return TextSize::of(text);
        };
        let line = self.line_content(text, position.line as usize);
        line_start + TextSize::from(utf16_to_byte(line, position.character) as u32)
    }

    /// Convert a byte offset to a position.
    ///
    /// Offsets past the end clamp to the end of the text; offsets inside a
    /// multi-byte character snap back to its first byte.
    pub fn position(&self, text: &str, offset: TextSize) -> Position {
        let mut offset = usize::from(offset).min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        let offset = TextSize::from(offset as u32);

        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = usize::from(self.line_starts[line]);
        let character = byte_to_utf16(&text[line_start..usize::from(offset)]);

        Position::new(line as u32, character)
    }

    /// The text of a line without its `\n` terminator.
    pub fn line_text<'t>(&self, text: &'t str, line: u32) -> Option<&'t str> {
        if (line as usize) < self.line_starts.len() {
            Some(self.line_content(text, line as usize))
        } else {
            None
        }
    }

    fn line_content<'t>(&self, text: &'t str, line: usize) -> &'t str {
        let start = usize::from(self.line_starts[line]);
        let end = match self.line_starts.get(line + 1) {
            Some(next) => usize::from(*next) - 1,
            None => text.len(),
        };
        &text[start..end]
    }

    /// Get the number of lines.
    pub fn len(&self) -> usize {
        self.line_starts.len()
    }

    /// Always false: even empty text has one line.
    pub fn is_empty(&self) -> bool {
        self.line_starts.is_empty()
    }
}

/// Byte length of the prefix of `line` spanning `utf16` code units.
///
/// A column that lands inside a surrogate pair, or past the end of the
/// line, is clamped down to the last full character.
pub fn utf16_to_byte(line: &str, utf16: u32) -> usize {
    let mut units = 0u32;
    for (byte, c) in line.char_indices() {
        let next = units + c.len_utf16() as u32;
        if next > utf16 {
            return byte;
        }
        units = next;
    }
    line.len()
}

/// Number of UTF-16 code units needed to encode `text`.
pub fn byte_to_utf16(text: &str) -> u32 {
    text.chars().map(|c| c.len_utf16() as u32).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_line_index_multi_line() {
        let text = "hello\nworld\n!";
        let index = LineIndex::new(text);

        assert_eq!(index.len(), 3);
        assert_eq!(index.position(text, TextSize::from(0)), Position::new(0, 0));
        assert_eq!(index.position(text, TextSize::from(5)), Position::new(0, 5));
        assert_eq!(index.position(text, TextSize::from(6)), Position::new(1, 0));
        assert_eq!(index.position(text, TextSize::from(12)), Position::new(2, 0));
    }

    #[test]
    fn test_offset_counts_utf16_units() {
        // 'é' is one UTF-16 unit and two bytes, '😀' is two units and four bytes
        let text = "é😀x";
        let index = LineIndex::new(text);

        assert_eq!(index.offset(text, Position::new(0, 1)), TextSize::from(2));
        assert_eq!(index.offset(text, Position::new(0, 3)), TextSize::from(6));
        assert_eq!(index.position(text, TextSize::from(6)), Position::new(0, 3));
    }

    #[test]
    fn test_offset_inside_surrogate_pair_clamps_down() {
        let text = "😀x";
        let index = LineIndex::new(text);
        assert_eq!(index.offset(text, Position::new(0, 1)), TextSize::from(0));
    }

    #[rstest]
    #[case(Position::new(0, 99), 5)]
    #[case(Position::new(7, 0), 11)]
    #[case(Position::new(1, 99), 11)]
    fn test_out_of_range_positions_clamp(#[case] position: Position, #[case] expected: u32) {
        let text = "hello\nworld";
        let index = LineIndex::new(text);
        assert_eq!(index.offset(text, position), TextSize::from(expected));
    }

    #[test]
    fn test_crlf_lines() {
        let text = "ab\r\ncd";
        let index = LineIndex::new(text);

        assert_eq!(index.len(), 2);
        assert_eq!(index.line_text(text, 0), Some("ab\r"));
        assert_eq!(index.offset(text, Position::new(1, 1)), TextSize::from(5));
        assert_eq!(index.position(text, TextSize::from(5)), Position::new(1, 1));
    }

    #[test]
    fn test_round_trip_every_boundary() {
        let text = "fn void main() {\r\n  String s = \"ü😀\";\n}\n";
        let index = LineIndex::new(text);
        for (offset, _) in text.char_indices() {
            let offset = TextSize::from(offset as u32);
            let position = index.position(text, offset);
            assert_eq!(index.offset(text, position), offset, "at {position:?}");
        }
    }
}
