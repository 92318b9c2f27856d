//! One live expansion of a compiled template.
//!
//! An [`Instance`] tracks every placeholder and code block it inserted as a
//! [`DynamicRange`]. Each edit batch reported by the host moves those ranges;
//! when the selected placeholder's text changed, the generator runs again and
//! the blocks whose output differs are patched with corrective edits.
//!
//! Corrective edits come back to the instance as the next batch (the host
//! must deliver it before any other batch). That echo is recognised by the
//! `block_changed` flag together with a content comparison, and never causes
//! another regeneration.

use std::collections::BTreeSet;
use std::sync::Arc;

use hsnip_primitives::edit::sort_by_end;
use hsnip_primitives::{DynamicRange, Growth, Position, TextEdit, TextRange};
use hsnip_template::marker::{Piece, escape_dollars, pieces};
use hsnip_template::{CompiledTemplate, GeneratorInput, GeneratorOutput, Segment};
use smallvec::SmallVec;

use crate::diagnostic::Diagnostic;
use crate::document::Document;

/// What the host knows at expansion time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionRequest {
	/// Where the expansion is inserted. The trigger text is replaced by the host.
	pub position: Position,
	/// Match groups captured by the trigger.
	pub match_groups: Vec<String>,
	/// Text substituted for `${VISUAL}`.
	pub selected_text: String,
	pub workspace_id: String,
	pub file_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
	Placeholder(u32),
	/// Index into the generator's block outputs.
	Block(usize),
}

/// A tracked region of the expansion.
#[derive(Debug, Clone)]
pub struct Part {
	kind: PartKind,
	range: DynamicRange,
	content: String,
	pending: SmallVec<[(usize, Growth); 2]>,
}

impl Part {
	fn new(kind: PartKind, start: Position, end: Position, content: String) -> Self {
		Self {
			kind,
			range: DynamicRange::new(start, end),
			content,
			pending: SmallVec::new(),
		}
	}

	pub fn kind(&self) -> PartKind {
		self.kind
	}

	pub fn range(&self) -> TextRange {
		self.range.range()
	}

	/// Last known text: the placeholder's text when it was last read back, or
	/// the raw output last produced for a block.
	pub fn content(&self) -> &str {
		&self.content
	}

	fn flush(&mut self, edits: &[TextEdit]) {
		if self.pending.is_empty() {
			return;
		}
		self.range.update(self.pending.iter().map(|&(i, growth)| (&edits[i], growth)));
		self.pending.clear();
	}
}

/// Result of [`Instance::expand`].
#[derive(Debug)]
pub struct Expansion {
	pub instance: Instance,
	pub diagnostic: Option<Diagnostic>,
}

/// Result of [`Instance::update`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
	/// Corrective edits for the host to apply, in current document coordinates.
	pub edits: Vec<TextEdit>,
	/// Set when the generator ran for this batch.
	pub regenerated: bool,
	pub diagnostic: Option<Diagnostic>,
}

/// A live expansion.
#[derive(Debug)]
pub struct Instance {
	template: Arc<CompiledTemplate>,
	match_groups: Vec<String>,
	workspace_id: String,
	file_id: String,
	range: DynamicRange,
	parts: Vec<Part>,
	placeholder_ids: Vec<u32>,
	active: Option<usize>,
	block_changed: bool,
	snippet_text: String,
}

impl Instance {
	/// Runs the generator once with empty placeholder texts and lays out the result at `request.position`.
	///
	/// A failing generator yields an inert instance with no parts and empty
	/// snippet text, plus a diagnostic.
	pub fn expand(template: Arc<CompiledTemplate>, request: ExpansionRequest, document: &impl Document) -> Expansion {
		let input = GeneratorInput {
			workspace_id: request.workspace_id.clone(),
			file_id: request.file_id.clone(),
			..GeneratorInput::empty(template.placeholder_count, request.match_groups.clone())
		};
		let (output, diagnostic) = match template.generator.invoke(&input) {
			Ok(output) => (output, None),
			Err(e) => (GeneratorOutput::default(), Some(Diagnostic::warn(template.name(), e))),
		};

		let indent = document.line_indent(request.position.line).chars().count() as u32;
		let visual = escape_dollars(&request.selected_text);
		let mut cursor = request.position;
		let mut snippet_text = String::new();
		let mut parts = Vec::new();
		let mut seen = BTreeSet::new();

		for segment in &output.segments {
			match segment {
				Segment::Block(index) => {
					let Some(raw) = output.blocks.get(*index) else {
						continue;
					};
					let end = cursor.advance(raw, indent);
					parts.push(Part::new(PartKind::Block(*index), cursor, end, raw.clone()));
					snippet_text.push_str(&escape_dollars(raw));
					cursor = end;
				}
				Segment::Text(text) => {
					let text = text.replace("${VISUAL}", &visual);
					for piece in pieces(&text) {
						match piece {
							Piece::Text(run) => cursor = cursor.advance(run, indent),
							Piece::Dollar => cursor = cursor.advance("$", indent),
							Piece::Marker(id) => {
								if seen.insert(id) {
									parts.push(Part::new(PartKind::Placeholder(id), cursor, cursor, String::new()));
								}
							}
						}
					}
					snippet_text.push_str(&text);
				}
			}
		}

		let placeholder_ids = tabstop_order(&seen);
		tracing::debug!(
			template = template.name(),
			parts = parts.len(),
			placeholders = ?placeholder_ids,
			"expanded template"
		);

		let instance = Self {
			match_groups: request.match_groups,
			workspace_id: request.workspace_id,
			file_id: request.file_id,
			range: DynamicRange::new(request.position, cursor),
			parts,
			placeholder_ids,
			active: Some(0),
			block_changed: false,
			snippet_text,
			template,
		};
		Expansion { instance, diagnostic }
	}

	pub fn template(&self) -> &Arc<CompiledTemplate> {
		&self.template
	}

	/// Text for the host's snippet insertion: markers intact, dollars in block output escaped.
	pub fn snippet_text(&self) -> &str {
		&self.snippet_text
	}

	/// Range covering the whole expansion.
	pub fn range(&self) -> TextRange {
		self.range.range()
	}

	pub fn parts(&self) -> &[Part] {
		&self.parts
	}

	/// Placeholder ids in navigation order: ascending, with 0 last even when the body has no `$0`.
	pub fn placeholder_ids(&self) -> &[u32] {
		&self.placeholder_ids
	}

	pub fn selected_placeholder(&self) -> Option<u32> {
		self.active.and_then(|i| self.placeholder_ids.get(i).copied())
	}

	/// Current range of placeholder `id`.
	pub fn placeholder_range(&self, id: u32) -> Option<TextRange> {
		self.parts
			.iter()
			.find(|part| part.kind == PartKind::Placeholder(id))
			.map(Part::range)
	}

	/// Whether a corrective edit has been issued and its echo not yet seen.
	pub fn block_changed(&self) -> bool {
		self.block_changed
	}

	/// An instance without parts has nothing to keep in sync.
	pub fn is_inert(&self) -> bool {
		self.parts.is_empty()
	}

	/// Whether `position` lies within the expansion.
	pub fn contains(&self, position: Position) -> bool {
		self.range.range().contains(position)
	}

	/// Moves to the next tabstop. Returns `false` when the session should end:
	/// past the last tabstop, or on the final cursor stop `$0`.
	pub fn next_placeholder(&mut self) -> bool {
		self.active = self.active.map(|i| i + 1).filter(|&i| i < self.placeholder_ids.len());
		self.selected_placeholder().is_some_and(|id| id != 0)
	}

	/// Moves to the previous tabstop. Returns `false` when moving before the first one.
	pub fn prev_placeholder(&mut self) -> bool {
		self.active = self.active.and_then(|i| i.checked_sub(1));
		self.selected_placeholder().is_some_and(|id| id != 0)
	}

	/// Processes one edit batch reported by the host.
	///
	/// `edits` use pre-batch coordinates; `document` must already reflect them.
	pub fn update(&mut self, edits: &[TextEdit], document: &impl Document) -> UpdateOutcome {
		let mut edits = edits.to_vec();
		sort_by_end(&mut edits);

		let selected = self.selected_placeholder();
		let mut changed: SmallVec<[usize; 2]> = SmallVec::new();
		let mut cursor = 0;

		for (i, edit) in edits.iter().enumerate() {
			while cursor < self.parts.len() && self.parts[cursor].range.end() < edit.range.end {
				cursor += 1;
			}
			if cursor >= self.parts.len() {
				break;
			}

			while let Some(part) = self.parts.get_mut(cursor)
				&& part.range.contains(&edit.range)
			{
				cursor += 1;
				let absorbs = match part.kind {
					PartKind::Placeholder(id) => Some(id) == selected && !self.block_changed,
					PartKind::Block(_) => self.block_changed && part.content == edit.text,
				};
				if absorbs {
					part.pending.push((i, Growth::Grow));
					if let PartKind::Placeholder(_) = part.kind {
						changed.push(cursor - 1);
					}
					break;
				}
				part.pending.push((i, Growth::FixLeft));
			}

			for part in &mut self.parts[cursor..] {
				part.pending.push((i, Growth::FixRight));
			}
		}

		self.range.update(edits.iter().map(|edit| (edit, Growth::Grow)));
		for part in &mut self.parts {
			part.flush(&edits);
		}
		self.block_changed = false;

		if changed.is_empty() {
			return UpdateOutcome::default();
		}
		for &index in &changed {
			let part = &mut self.parts[index];
			part.content = document.text(part.range.range()).unwrap_or_default();
		}
		self.regenerate()
	}

	fn regenerate(&mut self) -> UpdateOutcome {
		let input = GeneratorInput {
			placeholder_texts: self.placeholder_texts(),
			match_groups: self.match_groups.clone(),
			workspace_id: self.workspace_id.clone(),
			file_id: self.file_id.clone(),
		};
		let blocks = match self.template.generator.invoke(&input) {
			Ok(output) => output.blocks,
			Err(e) => {
				return UpdateOutcome {
					regenerated: true,
					diagnostic: Some(Diagnostic::warn(self.template.name(), e)),
					..UpdateOutcome::default()
				};
			}
		};

		let mut edits = Vec::new();
		for part in &mut self.parts {
			let PartKind::Block(index) = part.kind else {
				continue;
			};
			let Some(output) = blocks.get(index) else {
				continue;
			};
			if *output != part.content {
				edits.push(TextEdit::new(part.range.range(), output.clone()));
				part.content = output.clone();
			}
		}
		self.block_changed = !edits.is_empty();
		tracing::trace!(edits = edits.len(), "regenerated blocks");
		UpdateOutcome {
			edits,
			regenerated: true,
			diagnostic: None,
		}
	}

	/// Contents of the placeholder parts in document order, padded with empty
	/// strings to the template's marker count.
	fn placeholder_texts(&self) -> Vec<String> {
		let mut texts: Vec<String> = self
			.parts
			.iter()
			.filter(|part| matches!(part.kind, PartKind::Placeholder(_)))
			.map(|part| part.content.clone())
			.collect();
		if texts.len() < self.template.placeholder_count {
			texts.resize(self.template.placeholder_count, String::new());
		}
		texts
	}

	/// Logs every part's range at trace level.
	pub fn debug_log(&self) {
		for (i, part) in self.parts.iter().enumerate() {
			tracing::trace!(index = i, kind = ?part.kind, range = %part.range.range(), content = %part.content, "instance part");
		}
	}
}

/// Ascending author ids followed by the final stop `0`, which is always present.
fn tabstop_order(ids: &BTreeSet<u32>) -> Vec<u32> {
	let mut order: Vec<u32> = ids.iter().copied().filter(|id| *id > 0).collect();
	order.push(0);
	order
}

#[cfg(test)]
mod tests;
