//! A reference host around [`TextBuffer`].
//!
//! [`BufferHost`] does what an editor integration does: it inserts snippet
//! text, reports every edit batch to the active instance, and applies the
//! corrective edits the instance returns, forwarding each echo batch back
//! until the instance is quiescent.

use std::sync::Arc;

use hsnip_primitives::{BufferError, Position, TextBuffer, TextEdit, TextRange};
use hsnip_template::CompiledTemplate;
use hsnip_template::marker;

use crate::diagnostic::Diagnostic;
use crate::instance::{ExpansionRequest, Instance};

/// Upper bound on echo rounds for one user batch.
const MAX_ECHO_ROUNDS: usize = 8;

/// Renders snippet text the way a host's snippet insertion shows it: markers
/// removed, escaped dollars restored, continuation lines prefixed with `indent`.
pub fn render_snippet(snippet_text: &str, indent: &str) -> String {
	marker::render(snippet_text).replace('\n', &format!("\n{indent}"))
}

/// Buffer plus at most one live instance.
#[derive(Debug, Default)]
pub struct BufferHost {
	buffer: TextBuffer,
	instance: Option<Instance>,
	corrective_edits: usize,
	regenerations: usize,
	diagnostics: Vec<Diagnostic>,
}

impl BufferHost {
	pub fn new(text: &str) -> Self {
		Self {
			buffer: TextBuffer::new(text),
			..Self::default()
		}
	}

	pub fn buffer(&self) -> &TextBuffer {
		&self.buffer
	}

	pub fn text(&self) -> String {
		self.buffer.to_string()
	}

	pub fn instance(&self) -> Option<&Instance> {
		self.instance.as_ref()
	}

	/// Corrective edits applied so far.
	pub fn corrective_edit_count(&self) -> usize {
		self.corrective_edits
	}

	/// Generator runs triggered by edits so far.
	pub fn regeneration_count(&self) -> usize {
		self.regenerations
	}

	pub fn diagnostics(&self) -> &[Diagnostic] {
		&self.diagnostics
	}

	/// Replaces `trigger` with an expansion of `template`, starting a new instance.
	///
	/// `request.position` is overwritten with the start of `trigger`.
	pub fn expand(&mut self, template: Arc<CompiledTemplate>, trigger: TextRange, mut request: ExpansionRequest) -> Result<(), BufferError> {
		request.position = trigger.start;
		let indent = self.buffer.line_indent(trigger.start.line);
		let expansion = Instance::expand(template, request, &self.buffer);
		self.diagnostics.extend(expansion.diagnostic);

		let text = render_snippet(expansion.instance.snippet_text(), &indent);
		self.buffer.apply(&[TextEdit::new(trigger, text)])?;
		self.instance = Some(expansion.instance);
		Ok(())
	}

	/// Applies a user edit batch and settles the active instance.
	pub fn edit(&mut self, edits: &[TextEdit]) -> Result<(), BufferError> {
		self.buffer.apply(edits)?;
		let Some(instance) = self.instance.as_mut() else {
			return Ok(());
		};

		let mut outcome = instance.update(edits, &self.buffer);
		for _ in 0..MAX_ECHO_ROUNDS {
			self.regenerations += usize::from(outcome.regenerated);
			self.diagnostics.extend(outcome.diagnostic.take());
			if outcome.edits.is_empty() {
				return Ok(());
			}
			self.buffer.apply(&outcome.edits)?;
			self.corrective_edits += outcome.edits.len();
			outcome = instance.update(&outcome.edits, &self.buffer);
		}
		tracing::warn!(rounds = MAX_ECHO_ROUNDS, "instance did not settle");
		Ok(())
	}

	/// Types `text` at the start of the selected placeholder's range end.
	pub fn type_text(&mut self, text: &str) -> Result<bool, BufferError> {
		let Some(at) = self.selected_range().map(|range| range.end) else {
			return Ok(false);
		};
		self.edit(&[TextEdit::insert(at, text)])?;
		Ok(true)
	}

	/// Replaces the selected placeholder's text.
	pub fn replace_selected(&mut self, text: &str) -> Result<bool, BufferError> {
		let Some(range) = self.selected_range() else {
			return Ok(false);
		};
		self.edit(&[TextEdit::new(range, text)])?;
		Ok(true)
	}

	/// Range of the selected placeholder.
	pub fn selected_range(&self) -> Option<TextRange> {
		let instance = self.instance.as_ref()?;
		instance.placeholder_range(instance.selected_placeholder()?)
	}

	/// Moves to the next tabstop; ends the session when the instance says so.
	pub fn next_placeholder(&mut self) -> bool {
		self.navigate(Instance::next_placeholder)
	}

	pub fn prev_placeholder(&mut self) -> bool {
		self.navigate(Instance::prev_placeholder)
	}

	fn navigate(&mut self, step: fn(&mut Instance) -> bool) -> bool {
		let Some(instance) = self.instance.as_mut() else {
			return false;
		};
		let more = step(instance);
		if instance.selected_placeholder().is_none() {
			self.instance = None;
		}
		more
	}

	/// Drops the instance when `position` has left it.
	pub fn leave_if_outside(&mut self, position: Position) {
		if self.instance.as_ref().is_some_and(|instance| !instance.contains(position)) {
			self.instance = None;
		}
	}
}
