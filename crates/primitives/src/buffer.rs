//! Rope-backed text buffer addressed by line/character positions.

use ropey::{Rope, RopeSlice};
use thiserror::Error;

use crate::edit::TextEdit;
use crate::position::{Position, TextRange};

/// Errors raised when a position or batch does not fit the buffer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
	#[error("line {line} is past the end of the buffer ({len_lines} lines)")]
	LineOutOfBounds { line: u32, len_lines: usize },
	#[error("edits overlap at {0}")]
	Overlapping(Position),
}

/// A mutable text document.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
	text: Rope,
}

impl TextBuffer {
	/// Creates a buffer holding `text`.
	pub fn new(text: &str) -> Self {
		Self { text: Rope::from_str(text) }
	}

	/// Returns the underlying rope.
	pub fn rope(&self) -> &Rope {
		&self.text
	}

	/// Number of lines, including the empty line after a trailing newline.
	pub fn len_lines(&self) -> usize {
		self.text.len_lines()
	}

	/// Text of `line` without its line break.
	pub fn line(&self, line: u32) -> Option<String> {
		let idx = line as usize;
		if idx >= self.text.len_lines() {
			return None;
		}
		Some(trim_line_break(self.text.line(idx)).to_string())
	}

	/// Leading whitespace of `line`.
	pub fn line_indent(&self, line: u32) -> String {
		self.line(line)
			.map(|text| text.chars().take_while(|ch| *ch == ' ' || *ch == '\t').collect())
			.unwrap_or_default()
	}

	/// Converts a position to a char index.
	///
	/// Characters past the end of the line clamp to the line end.
	pub fn to_char(&self, pos: Position) -> Result<usize, BufferError> {
		let line = pos.line as usize;
		if line >= self.text.len_lines() {
			return Err(BufferError::LineOutOfBounds {
				line: pos.line,
				len_lines: self.text.len_lines(),
			});
		}
		let line_start = self.text.line_to_char(line);
		let line_len = trim_line_break(self.text.line(line)).len_chars();
		Ok(line_start + (pos.character as usize).min(line_len))
	}

	/// Converts a char index to a position.
	pub fn to_position(&self, char_idx: usize) -> Position {
		let char_idx = char_idx.min(self.text.len_chars());
		let line = self.text.char_to_line(char_idx);
		let character = char_idx - self.text.line_to_char(line);
		Position::new(line as u32, character as u32)
	}

	/// Text covered by `range`.
	pub fn slice(&self, range: TextRange) -> Result<String, BufferError> {
		let start = self.to_char(range.start)?;
		let end = self.to_char(range.end)?.max(start);
		Ok(self.text.slice(start..end).to_string())
	}

	/// Applies a batch of edits expressed in pre-batch coordinates.
	pub fn apply(&mut self, edits: &[TextEdit]) -> Result<(), BufferError> {
		let mut resolved = edits
			.iter()
			.map(|edit| {
				let start = self.to_char(edit.range.start)?;
				let end = self.to_char(edit.range.end)?.max(start);
				Ok((start, end, edit))
			})
			.collect::<Result<Vec<_>, BufferError>>()?;
		resolved.sort_by_key(|(start, end, _)| (*start, *end));
		if let Some(pair) = resolved.windows(2).find(|pair| pair[1].0 < pair[0].1) {
			return Err(BufferError::Overlapping(pair[1].2.range.start));
		}

		for (start, end, edit) in resolved.into_iter().rev() {
			self.text.remove(start..end);
			self.text.insert(start, &edit.text);
		}
		Ok(())
	}
}

impl std::fmt::Display for TextBuffer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for chunk in self.text.chunks() {
			f.write_str(chunk)?;
		}
		Ok(())
	}
}

fn trim_line_break(line: RopeSlice<'_>) -> RopeSlice<'_> {
	let mut len = line.len_chars();
	if len > 0 && line.char(len - 1) == '\n' {
		len -= 1;
		if len > 0 && line.char(len - 1) == '\r' {
			len -= 1;
		}
	}
	line.slice(..len)
}
