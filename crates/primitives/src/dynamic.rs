use crate::delta::{Growth, translate_range};
use crate::edit::TextEdit;
use crate::position::{Position, TextRange};

/// A range that follows the text it covers as the buffer is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DynamicRange {
	range: TextRange,
}

impl DynamicRange {
	/// Creates a tracked range.
	pub fn new(start: Position, end: Position) -> Self {
		Self {
			range: TextRange::new(start, end.max(start)),
		}
	}

	/// Creates a tracked zero-width range.
	pub fn point(pos: Position) -> Self {
		Self::new(pos, pos)
	}

	/// Current extent.
	#[inline]
	pub fn range(&self) -> TextRange {
		self.range
	}

	/// Current start.
	#[inline]
	pub fn start(&self) -> Position {
		self.range.start
	}

	/// Current end.
	#[inline]
	pub fn end(&self) -> Position {
		self.range.end
	}

	/// Moves the range through one batch of edits, each with its own growth policy.
	pub fn update<'a>(&mut self, edits: impl IntoIterator<Item = (&'a TextEdit, Growth)>) {
		self.range = translate_range(self.range, edits);
	}

	/// Returns true if `other` lies within the tracked range, edges included.
	pub fn contains(&self, other: &TextRange) -> bool {
		self.range.contains_range(other)
	}
}

impl From<TextRange> for DynamicRange {
	fn from(range: TextRange) -> Self {
		Self::new(range.start, range.end)
	}
}
