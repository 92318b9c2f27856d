//! Trigger matching at the cursor.
//!
//! The matching context is the run of non-whitespace characters before the
//! cursor. Literal triggers compare against it according to their
//! [`MatchMode`]; pattern triggers run against the line (or several lines of
//! lookback for multi-line templates) and must match up to the cursor.

use std::sync::Arc;

use hsnip_primitives::{Position, TextRange};
use hsnip_template::{CompiledTemplate, MatchMode, ScopeInfo, TemplateFlags, Trigger};

use crate::document::Document;

/// Where and in which scope to look for triggers.
#[derive(Debug, Clone, Copy)]
pub struct MatchRequest<'a> {
	pub position: Position,
	pub scope: &'a ScopeInfo,
	/// Lines of lookback for multi-line pattern triggers.
	pub multiline_context: u32,
}

/// A template that can expand at the cursor.
#[derive(Debug, Clone)]
pub struct Candidate {
	pub template: Arc<CompiledTemplate>,
	/// The literal trigger, or the text a pattern matched.
	pub label: String,
	/// Text the expansion replaces; always ends at the cursor.
	pub range: TextRange,
	/// Group 0 is the whole match; empty for literal triggers.
	pub match_groups: Vec<String>,
	/// Whether the trigger matched fully rather than as a prefix.
	pub complete: bool,
}

#[derive(Debug, Clone)]
pub enum MatchOutcome {
	/// An automatic template matched fully and should expand right away.
	Automatic(Candidate),
	/// Completion candidates in template order.
	Candidates(Vec<Candidate>),
}

impl MatchOutcome {
	pub fn candidates(&self) -> &[Candidate] {
		match self {
			MatchOutcome::Automatic(candidate) => std::slice::from_ref(candidate),
			MatchOutcome::Candidates(candidates) => candidates,
		}
	}
}

/// Text around the cursor that literal triggers are compared with.
struct Context {
	position: Position,
	line: String,
	/// Non-whitespace run before the cursor.
	context: String,
	/// Trailing word characters, or the context when there are none.
	word: String,
	/// Whether only whitespace precedes the context on its line.
	line_start: bool,
}

impl Context {
	fn new(line: String, position: Position) -> Self {
		let context = trailing(&line, |c| !c.is_whitespace());
		let before = &line[..line.len() - context.len()];
		let word = match trailing(&line, is_word_char) {
			"" => context,
			word => word,
		};
		Self {
			position,
			context: context.to_string(),
			word: word.to_string(),
			line_start: before.chars().all(char::is_whitespace),
			line,
		}
	}

	/// Range of the `len` characters before the cursor.
	fn range_before(&self, len: usize) -> TextRange {
		let start = self.position.character.saturating_sub(len as u32);
		TextRange::new(Position::new(self.position.line, start), self.position)
	}

	/// Returns `(complete, matched prefix)` for a literal trigger.
	fn literal<'a>(&'a self, trigger: &'a str, mode: MatchMode) -> (bool, Option<&'a str>) {
		let context = self.context.as_str();
		match mode {
			MatchMode::InWord => {
				let complete = context.ends_with(trigger);
				(complete, longest_suffix_prefix(context, trigger))
			}
			MatchMode::WordBoundary => {
				let word = self.word.as_str();
				(word == trigger, trigger.starts_with(word).then_some(word))
			}
			MatchMode::LineStart => (
				context.ends_with(trigger) && self.line_start,
				(trigger.starts_with(context) && self.line_start).then_some(context),
			),
			MatchMode::Exact => (context == trigger, trigger.starts_with(context).then_some(context)),
		}
	}
}

/// Finds the templates that can expand at `request.position`.
///
/// Templates are tried in order; the first automatic template that matches
/// fully wins outright. Otherwise every full or prefix match is returned.
pub fn match_templates(document: &impl Document, templates: &[Arc<CompiledTemplate>], request: &MatchRequest<'_>) -> MatchOutcome {
	let position = request.position;
	let line = document
		.text(TextRange::new(Position::new(position.line, 0), position))
		.unwrap_or_default();
	let ctx = Context::new(line, position);
	let mut lookback: Option<(u32, String)> = None;
	let mut candidates = Vec::new();

	for template in templates {
		if !template.accepts(request.scope) {
			continue;
		}

		let candidate = match &template.trigger {
			Trigger::Literal(trigger) => {
				let (complete, prefix) = ctx.literal(trigger, template.flags.match_mode());
				let range = match prefix {
					Some(prefix) if !prefix.is_empty() => ctx.range_before(prefix.chars().count()),
					_ if complete => ctx.range_before(trigger.chars().count()),
					_ => continue,
				};
				Candidate {
					template: Arc::clone(template),
					label: trigger.clone(),
					range,
					match_groups: Vec::new(),
					complete,
				}
			}
			Trigger::Pattern(pattern) => {
				let (first_line, text) = if template.flags.contains(TemplateFlags::MULTILINE) {
					let (first_line, text) = lookback.get_or_insert_with(|| {
						let first_line = position.line.saturating_sub(request.multiline_context);
						let text = document
							.text(TextRange::new(Position::new(first_line, 0), position))
							.unwrap_or_default()
							.replace('\r', "");
						(first_line, text)
					});
					(*first_line, text.as_str())
				} else {
					(position.line, ctx.line.as_str())
				};

				let Some(captures) = pattern.captures_at_end(text) else {
					continue;
				};
				let Some(whole) = captures.get(0) else {
					continue;
				};
				let before = &text[..whole.start()];
				let start_line = first_line + before.matches('\n').count() as u32;
				let start_character = before.rsplit('\n').next().unwrap_or_default().chars().count() as u32;
				Candidate {
					template: Arc::clone(template),
					label: whole.as_str().to_string(),
					range: TextRange::new(Position::new(start_line, start_character), position),
					match_groups: captures
						.iter()
						.map(|group| group.map_or_else(String::new, |g| g.as_str().to_string()))
						.collect(),
					complete: true,
				}
			}
		};

		if candidate.complete && template.flags.contains(TemplateFlags::AUTOMATIC) {
			tracing::debug!(template = template.name(), range = %candidate.range, "automatic trigger");
			return MatchOutcome::Automatic(candidate);
		}
		candidates.push(candidate);
	}

	MatchOutcome::Candidates(candidates)
}

fn is_word_char(c: char) -> bool {
	c.is_alphanumeric() || c == '_'
}

/// Longest suffix of `line` whose characters all satisfy `pred`.
fn trailing(line: &str, pred: impl Fn(char) -> bool) -> &str {
	let start = line
		.char_indices()
		.rev()
		.take_while(|&(_, c)| pred(c))
		.last()
		.map_or(line.len(), |(i, _)| i);
	&line[start..]
}

/// Longest prefix of `trigger` that `context` ends with.
fn longest_suffix_prefix<'a>(context: &str, trigger: &'a str) -> Option<&'a str> {
	trigger
		.char_indices()
		.map(|(i, c)| &trigger[..i + c.len_utf8()])
		.rev()
		.find(|prefix| context.ends_with(prefix))
}
