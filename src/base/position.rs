//! Positions and ranges in LSP coordinates.
//!
//! A [`Position`] is a zero-based line plus a character offset counted in
//! UTF-16 code units, exactly as the Language Server Protocol defines it.
//! Conversion to byte offsets lives in [`LineIndex`](super::LineIndex).

use std::fmt;

use serde::{Deserialize, Serialize};

/// A line and UTF-16 column position in source text.
///
/// Both line and character are 0-indexed. Ordering is line-major.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
pub struct Position {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column, in UTF-16 code units
    pub character: u32,
}

impl Position {
    /// Create a new position.
    #[inline]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }

    /// The position one character to the left, saturating at column 0.
    #[inline]
    pub const fn prev_character(self) -> Self {
        Self {
            line: self.line,
            character: self.character.saturating_sub(1),
        }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.character + 1)
    }
}

/// A half-open span between two positions.
///
/// Serialized compactly as `[[startLine, startChar], [endLine, endChar]]`,
/// which keeps the stdlib cache small.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[[u32; 2]; 2]", into = "[[u32; 2]; 2]")]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[inline]
    pub const fn new(start_line: u32, start_char: u32, end_line: u32, end_char: u32) -> Self {
        Self {
            start: Position::new(start_line, start_char),
            end: Position::new(end_line, end_char),
        }
    }

    #[inline]
    pub const fn from_positions(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Whether `position` lies within the range, both ends included.
    ///
    /// The end is inclusive so that a cursor placed right after an
    /// identifier still selects it.
    pub fn has_position(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    /// Whether the range starts after `position`.
    pub fn is_before_position(&self, position: Position) -> bool {
        self.start > position
    }

    /// Whether the range ends before `position`.
    pub fn is_after_position(&self, position: Position) -> bool {
        self.end < position
    }

    /// Whether this range ends later than `other`.
    pub fn ends_after(&self, other: &Range) -> bool {
        self.end > other.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Debug for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}-{:?}", self.start, self.end)
    }
}

impl From<[[u32; 2]; 2]> for Range {
    fn from(compact: [[u32; 2]; 2]) -> Self {
        Range::new(compact[0][0], compact[0][1], compact[1][0], compact[1][1])
    }
}

impl From<Range> for [[u32; 2]; 2] {
    fn from(range: Range) -> Self {
        [
            [range.start.line, range.start.character],
            [range.end.line, range.end.character],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display_is_one_indexed() {
        assert_eq!(format!("{}", Position::new(0, 0)), "1:1");
        assert_eq!(format!("{}", Position::new(5, 10)), "6:11");
    }

    #[test]
    fn test_position_ordering_is_line_major() {
        assert!(Position::new(1, 0) > Position::new(0, 99));
        assert!(Position::new(2, 3) < Position::new(2, 4));
    }

    #[test]
    fn test_range_has_position_single_line() {
        let range = Range::new(3, 4, 3, 9);
        assert!(range.has_position(Position::new(3, 4)));
        assert!(range.has_position(Position::new(3, 9)));
        assert!(!range.has_position(Position::new(3, 10)));
        assert!(!range.has_position(Position::new(2, 5)));
    }

    #[test]
    fn test_range_has_position_multi_line() {
        let range = Range::new(1, 10, 4, 1);
        assert!(range.has_position(Position::new(2, 0)));
        assert!(range.has_position(Position::new(1, 10)));
        assert!(!range.has_position(Position::new(1, 2)));
        assert!(!range.has_position(Position::new(4, 2)));
    }

    #[test]
    fn test_range_compact_json() {
        let range = Range::new(1, 2, 3, 4);
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, "[[1,2],[3,4]]");
        let back: Range = serde_json::from_str(&json).unwrap();
        assert_eq!(back, range);
    }
}
