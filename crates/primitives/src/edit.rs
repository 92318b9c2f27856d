use crate::position::TextRange;

/// A single replace-range edit as reported by (or sent to) a host buffer.
///
/// `range` is expressed in the coordinates of the document before the batch
/// the edit belongs to was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
	/// The range in the document that was replaced.
	pub range: TextRange,
	/// The text that replaced the range.
	pub text: String,
}

impl TextEdit {
	/// Creates a replace edit.
	pub fn new(range: TextRange, text: impl Into<String>) -> Self {
		Self { range, text: text.into() }
	}

	/// Creates a pure insertion at `range.start`.
	pub fn insert(at: crate::Position, text: impl Into<String>) -> Self {
		Self::new(TextRange::point(at), text)
	}

	/// Creates a deletion of `range`.
	pub fn delete(range: TextRange) -> Self {
		Self::new(range, String::new())
	}
}

/// Sorts a batch by the end of each replaced span, keeping report order for ties.
pub fn sort_by_end(edits: &mut [TextEdit]) {
	edits.sort_by_key(|edit| edit.range.end);
}
