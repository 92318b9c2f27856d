use std::fmt;

use crate::delta::PositionDelta;

/// A position in line/character coordinates.
///
/// Characters are counted in Unicode scalar values, matching the rope buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
	/// Zero-based line index.
	pub line: u32,
	/// Zero-based character offset in the line.
	pub character: u32,
}

impl Position {
	/// Creates a new position.
	pub const fn new(line: u32, character: u32) -> Self {
		Self { line, character }
	}

	/// Returns the position moved by `delta`, saturating at zero.
	pub fn translate(self, delta: PositionDelta) -> Self {
		Self {
			line: offset(self.line, delta.line),
			character: offset(self.character, delta.character),
		}
	}

	/// Returns the position reached after writing `text` starting here.
	///
	/// Continuation lines start at `indent` characters, which is where a host
	/// that re-indents inserted snippets places them.
	pub fn advance(self, text: &str, indent: u32) -> Self {
		let (lines, last) = text_extent(text);
		if lines == 0 {
			Self::new(self.line, self.character + last)
		} else {
			Self::new(self.line + lines, indent + last)
		}
	}
}

impl fmt::Display for Position {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.line, self.character)
	}
}

/// A half-open range between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
	/// Start position (inclusive).
	pub start: Position,
	/// End position (exclusive).
	pub end: Position,
}

impl TextRange {
	/// Creates a new range.
	pub const fn new(start: Position, end: Position) -> Self {
		Self { start, end }
	}

	/// Creates a zero-length range at a position.
	pub const fn point(pos: Position) -> Self {
		Self { start: pos, end: pos }
	}

	/// Shorthand for a range from raw coordinates.
	pub const fn from_coords(start_line: u32, start_character: u32, end_line: u32, end_character: u32) -> Self {
		Self::new(Position::new(start_line, start_character), Position::new(end_line, end_character))
	}

	/// Returns true if the range has zero length.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	/// Returns true if `other` lies entirely within this range, edges included.
	pub fn contains_range(&self, other: &TextRange) -> bool {
		self.start <= other.start && other.end <= self.end
	}

	/// Returns true if `pos` lies within this range, edges included.
	pub fn contains(&self, pos: Position) -> bool {
		self.start <= pos && pos <= self.end
	}
}

impl fmt::Display for TextRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({})..({})", self.start, self.end)
	}
}

/// Returns the number of line breaks in `text` and the character length of its last line.
pub fn text_extent(text: &str) -> (u32, u32) {
	let mut lines = 0u32;
	let mut last = 0u32;
	for ch in text.chars() {
		if ch == '\n' {
			lines += 1;
			last = 0;
		} else {
			last += 1;
		}
	}
	(lines, last)
}

fn offset(value: u32, delta: i64) -> u32 {
	(i64::from(value) + delta).clamp(0, i64::from(u32::MAX)) as u32
}
