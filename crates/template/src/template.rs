use std::sync::Arc;

use fancy_regex::{Captures, Regex};

use crate::evaluator::{ScopeFilter, ScopeInfo};
use crate::flags::TemplateFlags;
use crate::generator::Generator;

/// What makes a template eligible for expansion.
#[derive(Debug, Clone)]
pub enum Trigger {
	Literal(String),
	Pattern(Pattern),
}

impl Trigger {
	/// The trigger text, or the pattern as the author wrote it.
	pub fn label(&self) -> &str {
		match self {
			Trigger::Literal(text) => text,
			Trigger::Pattern(pattern) => pattern.source(),
		}
	}
}

/// A pattern trigger, anchored at the end of the context and compiled multi-line.
#[derive(Debug, Clone)]
pub struct Pattern {
	pub(crate) source: String,
	pub(crate) regex: Regex,
}

impl Pattern {
	pub fn source(&self) -> &str {
		&self.source
	}

	/// The first match ending exactly at the end of `text`.
	///
	/// Every start offset is tried in turn, so a match that overlaps an
	/// earlier one is still found. A match that exceeds the backtracking
	/// limit counts as no match.
	pub fn captures_at_end<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
		let mut from = 0;
		while from <= text.len() {
			let captures = match self.regex.captures_from_pos(text, from) {
				Ok(captures) => captures?,
				Err(e) => {
					tracing::debug!(pattern = %self.source, error = %e, "pattern match aborted");
					return None;
				}
			};
			let whole = captures.get(0)?;
			if whole.end() == text.len() {
				return Some(captures);
			}
			from = whole.start() + text[whole.start()..].chars().next().map_or(1, char::len_utf8);
		}
		None
	}
}

/// An immutable compiled template, shared by every instance expanded from it.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
	pub trigger: Trigger,
	/// Empty when the header has none.
	pub description: String,
	pub flags: TemplateFlags,
	pub priority: i32,
	/// Upper bound on the number of placeholder markers in the body.
	pub placeholder_count: usize,
	pub context_filter: Option<Arc<dyn ScopeFilter>>,
	pub generator: Generator,
	/// 1-based line of the header in its source file.
	pub line: u32,
}

impl CompiledTemplate {
	/// Name used in diagnostics: the description if any, else the trigger.
	pub fn name(&self) -> &str {
		if self.description.is_empty() { self.trigger.label() } else { &self.description }
	}

	/// Whether the context filter admits `scope`. A failing filter rejects.
	pub fn accepts(&self, scope: &ScopeInfo) -> bool {
		let Some(filter) = &self.context_filter else {
			return true;
		};
		match filter.matches(scope) {
			Ok(accepted) => accepted,
			Err(e) => {
				tracing::warn!(template = self.name(), error = %e, "context filter failed");
				false
			}
		}
	}
}
