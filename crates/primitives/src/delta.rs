//! Position arithmetic for ranges that move under buffer edits.
//!
//! Every edit in a batch is measured against the range as it was before the
//! batch. The per-edit deltas are summed and applied once, which is valid as
//! long as the batch is non-overlapping and sorted by position.

use crate::edit::TextEdit;
use crate::position::{Position, TextRange, text_extent};

/// A signed line/character displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionDelta {
	/// Lines to move down (negative moves up).
	pub line: i64,
	/// Characters to move right (negative moves left).
	pub character: i64,
}

impl PositionDelta {
	/// Creates a delta.
	pub const fn new(line: i64, character: i64) -> Self {
		Self { line, character }
	}

	/// Returns true if the delta moves nothing.
	pub fn is_zero(&self) -> bool {
		self.line == 0 && self.character == 0
	}
}

impl std::ops::AddAssign for PositionDelta {
	fn add_assign(&mut self, rhs: Self) {
		self.line += rhs.line;
		self.character += rhs.character;
	}
}

/// How a range edge treats an edit whose replaced span ends exactly on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
	/// The range absorbs text written at either boundary.
	Grow,
	/// Neither edge moves past text written at the boundary.
	FixLeft,
	/// Both edges slide past text written at the boundary.
	FixRight,
}

impl Growth {
	fn start_moves(self) -> bool {
		self == Growth::FixRight
	}

	fn end_moves(self) -> bool {
		self != Growth::FixLeft
	}
}

/// Net displacement of the replaced span's end position.
///
/// Line component is the change in line count; the character component is the
/// change of the end column, so it only applies to positions on the end line.
pub fn edit_delta(edit: &TextEdit) -> PositionDelta {
	let (start, end) = (edit.range.start, edit.range.end);
	let (lines, last) = text_extent(&edit.text);
	let new_end_character = if lines == 0 { start.character + last } else { last };
	PositionDelta {
		line: i64::from(lines) - (i64::from(end.line) - i64::from(start.line)),
		character: i64::from(new_end_character) - i64::from(end.character),
	}
}

/// Computes how the start and end of `range` move in response to `edit`.
pub fn range_delta(range: TextRange, edit: &TextEdit, growth: Growth) -> (PositionDelta, PositionDelta) {
	let net = edit_delta(edit);
	(
		edge_delta(range.start, edit, net, growth.start_moves()),
		edge_delta(range.end, edit, net, growth.end_moves()),
	)
}

/// Sums the deltas of a whole batch against the pre-batch `range`.
pub fn batch_delta<'a>(range: TextRange, edits: impl IntoIterator<Item = (&'a TextEdit, Growth)>) -> (PositionDelta, PositionDelta) {
	let mut start = PositionDelta::default();
	let mut end = PositionDelta::default();
	for (edit, growth) in edits {
		let (ds, de) = range_delta(range, edit, growth);
		start += ds;
		end += de;
	}
	(start, end)
}

/// Applies a batch to `range`, keeping `start <= end`.
pub fn translate_range<'a>(range: TextRange, edits: impl IntoIterator<Item = (&'a TextEdit, Growth)>) -> TextRange {
	let (ds, de) = batch_delta(range, edits);
	let start = range.start.translate(ds);
	let end = range.end.translate(de).max(start);
	TextRange::new(start, end)
}

fn edge_delta(pos: Position, edit: &TextEdit, net: PositionDelta, moves: bool) -> PositionDelta {
	let (start, end) = (edit.range.start, edit.range.end);
	if pos > end || (pos == end && moves) {
		let character = if pos.line == end.line { net.character } else { 0 };
		return PositionDelta::new(net.line, character);
	}
	if pos > start {
		// Inside the replaced span, or pinned at its end: collapse onto the start.
		return PositionDelta::new(
			i64::from(start.line) - i64::from(pos.line),
			i64::from(start.character) - i64::from(pos.character),
		);
	}
	PositionDelta::default()
}
