use hsnip_primitives::{TextBuffer, TextRange};

/// Read access to the host document.
pub trait Document {
	/// Text in `range`, or `None` when the range lies outside the document.
	fn text(&self, range: TextRange) -> Option<String>;

	/// Leading whitespace of `line`; empty for lines past the end.
	fn line_indent(&self, line: u32) -> String;
}

impl Document for TextBuffer {
	fn text(&self, range: TextRange) -> Option<String> {
		self.slice(range).ok()
	}

	fn line_indent(&self, line: u32) -> String {
		TextBuffer::line_indent(self, line)
	}
}
