use std::sync::Arc;

use hsnip_primitives::{Position, TextBuffer, TextEdit, TextRange};
use hsnip_template::{CompiledTemplate, compile};
use pretty_assertions::assert_eq;

use super::*;
use crate::host::render_snippet;

fn template(source: &str) -> Arc<CompiledTemplate> {
	let file = compile(source);
	assert!(file.errors.is_empty(), "{:?}", file.errors);
	Arc::clone(&file.templates[0])
}

/// Expands `source`'s first template into `text` at `at`, the way a host would.
fn expand_at(text: &str, at: Position, source: &str, request: ExpansionRequest) -> (TextBuffer, Expansion) {
	let mut buffer = TextBuffer::new(text);
	let indent = buffer.line_indent(at.line);
	let expansion = Instance::expand(template(source), ExpansionRequest { position: at, ..request }, &buffer);
	let rendered = render_snippet(expansion.instance.snippet_text(), &indent);
	buffer.apply(&[TextEdit::insert(at, rendered)]).unwrap();
	(buffer, expansion)
}

fn edit(buffer: &mut TextBuffer, instance: &mut Instance, edits: &[TextEdit]) -> UpdateOutcome {
	buffer.apply(edits).unwrap();
	instance.update(edits, buffer)
}

const DOUBLE: &str = "snippet dbl\n$1 => ``rv = String(Number(t[0])*2)``\nendsnippet\n";

#[test]
fn expansion_lays_out_parts() {
	let (buffer, Expansion { instance, diagnostic }) = expand_at("", Position::default(), DOUBLE, ExpansionRequest::default());
	assert!(diagnostic.is_none());
	assert_eq!(buffer.to_string(), " => 0");
	assert_eq!(instance.snippet_text(), "$1 => 0");

	let parts: Vec<_> = instance.parts().iter().map(|p| (p.kind(), p.range(), p.content().to_string())).collect();
	assert_eq!(
		parts,
		vec![
			(PartKind::Placeholder(1), TextRange::from_coords(0, 0, 0, 0), String::new()),
			(PartKind::Block(0), TextRange::from_coords(0, 4, 0, 5), "0".to_string()),
		]
	);
	assert_eq!(instance.range(), TextRange::from_coords(0, 0, 0, 5));
	assert_eq!(instance.selected_placeholder(), Some(1));
}

#[test]
fn typing_regenerates_once_and_absorbs_the_echo() {
	let (mut buffer, Expansion { mut instance, .. }) = expand_at("", Position::default(), DOUBLE, ExpansionRequest::default());

	let outcome = edit(&mut buffer, &mut instance, &[TextEdit::insert(Position::new(0, 0), "21")]);
	assert!(outcome.regenerated);
	assert_eq!(outcome.edits, vec![TextEdit::new(TextRange::from_coords(0, 6, 0, 7), "42")]);
	assert!(instance.block_changed());

	let echo = edit(&mut buffer, &mut instance, &outcome.edits);
	assert_eq!(echo, UpdateOutcome::default());
	assert!(!instance.block_changed());
	assert_eq!(buffer.to_string(), "21 => 42");
	assert_eq!(instance.parts()[1].range(), TextRange::from_coords(0, 6, 0, 8));
	assert_eq!(instance.placeholder_range(1), Some(TextRange::from_coords(0, 0, 0, 2)));
}

#[test]
fn identical_output_needs_no_corrective_edit() {
	let (mut buffer, Expansion { mut instance, .. }) = expand_at("", Position::default(), DOUBLE, ExpansionRequest::default());
	let first = edit(&mut buffer, &mut instance, &[TextEdit::insert(Position::new(0, 0), "21")]);
	edit(&mut buffer, &mut instance, &first.edits);

	let again = edit(&mut buffer, &mut instance, &[TextEdit::new(TextRange::from_coords(0, 0, 0, 2), "21")]);
	assert!(again.regenerated);
	assert!(again.edits.is_empty());
	assert!(!instance.block_changed());
}

#[test]
fn tabstops_are_ascending_with_final_stop_last() {
	let (_, Expansion { mut instance, .. }) = expand_at("", Position::default(), "snippet t\n$3 $1 $0\nendsnippet", ExpansionRequest::default());
	assert_eq!(instance.placeholder_ids(), &[1, 3, 0]);
	assert_eq!(instance.selected_placeholder(), Some(1));

	assert!(instance.next_placeholder());
	assert_eq!(instance.selected_placeholder(), Some(3));
	assert!(!instance.next_placeholder());
	assert_eq!(instance.selected_placeholder(), Some(0));
	assert!(instance.prev_placeholder());
	assert_eq!(instance.selected_placeholder(), Some(3));

	assert!(!instance.next_placeholder());
	assert!(!instance.next_placeholder());
	assert_eq!(instance.selected_placeholder(), None);
}

#[test]
fn mirrored_placeholder_is_tracked_once() {
	let (_, Expansion { instance, .. }) = expand_at("", Position::default(), "snippet m\n$1 and $1\nendsnippet", ExpansionRequest::default());
	assert_eq!(instance.parts().len(), 1);
	assert_eq!(instance.placeholder_range(1), Some(TextRange::from_coords(0, 0, 0, 0)));
}

#[test]
fn continuation_lines_follow_the_indent() {
	let (buffer, Expansion { instance, .. }) = expand_at(
		"    x",
		Position::new(0, 4),
		"snippet blk\n{\n\t$1\n}``rv = '$'``\nendsnippet",
		ExpansionRequest::default(),
	);
	assert_eq!(buffer.to_string(), "    {\n    \t\n    }$x");
	assert_eq!(instance.placeholder_range(1), Some(TextRange::from_coords(1, 5, 1, 5)));
	assert_eq!(instance.parts()[1].range(), TextRange::from_coords(2, 5, 2, 6));
	assert_eq!(instance.snippet_text(), "{\n\t$1\n}\\$");
}

#[test]
fn visual_text_is_escaped_into_the_snippet() {
	let request = ExpansionRequest {
		selected_text: "a$b".to_string(),
		..ExpansionRequest::default()
	};
	let (buffer, Expansion { instance, .. }) = expand_at("", Position::default(), "snippet v\n<${VISUAL}>$0\nendsnippet", request);
	assert_eq!(instance.snippet_text(), "<a\\$b>$0");
	assert_eq!(buffer.to_string(), "<a$b>");
	assert_eq!(instance.placeholder_range(0), Some(TextRange::from_coords(0, 5, 0, 5)));
}

#[test]
fn match_groups_reach_the_generator() {
	let request = ExpansionRequest {
		match_groups: vec!["12x".to_string(), "12".to_string()],
		..ExpansionRequest::default()
	};
	let (buffer, Expansion { instance, .. }) = expand_at("", Position::default(), "snippet `(\\d+)x`\n``rv = m[1]``!\nendsnippet", request);
	assert_eq!(buffer.to_string(), "12!");
	assert_eq!(instance.parts()[0].content(), "12");
}

#[test]
fn failing_generator_leaves_an_inert_instance() {
	let (buffer, Expansion { instance, diagnostic }) =
		expand_at("", Position::default(), "snippet bad\n$1 ``rv = nope()``\nendsnippet", ExpansionRequest::default());
	let diagnostic = diagnostic.unwrap();
	assert_eq!(diagnostic.template, "bad");
	assert!(diagnostic.message.contains("nope is not defined"), "{diagnostic}");
	assert!(instance.is_inert());
	assert_eq!(instance.snippet_text(), "");
	assert_eq!(buffer.to_string(), "");
}

#[test]
fn regeneration_failure_keeps_previous_output() {
	let source = "snippet s\n$1 ``rv = t[0] == 'boom' ? nope() : t[0]``\nendsnippet";
	let (mut buffer, Expansion { mut instance, .. }) = expand_at("", Position::default(), source, ExpansionRequest::default());

	let outcome = edit(&mut buffer, &mut instance, &[TextEdit::insert(Position::new(0, 0), "boom")]);
	assert!(outcome.regenerated);
	assert!(outcome.edits.is_empty());
	assert!(outcome.diagnostic.is_some());
	assert!(!instance.block_changed());
	assert_eq!(instance.parts()[1].content(), "");
	assert_eq!(instance.parts()[1].range(), TextRange::from_coords(0, 5, 0, 5));
}

#[test]
fn unselected_placeholder_does_not_grow() {
	let source = "snippet two\n$1 $2 ``rv = t[1]``\nendsnippet";
	let (mut buffer, Expansion { mut instance, .. }) = expand_at("", Position::default(), source, ExpansionRequest::default());
	assert_eq!(instance.selected_placeholder(), Some(1));

	let outcome = edit(&mut buffer, &mut instance, &[TextEdit::insert(Position::new(0, 1), "zz")]);
	assert!(!outcome.regenerated);
	assert_eq!(instance.placeholder_range(2), Some(TextRange::from_coords(0, 1, 0, 1)));
	assert_eq!(instance.parts()[2].range(), TextRange::from_coords(0, 4, 0, 4));
}

#[test]
fn placeholder_texts_follow_document_order() {
	let source = "snippet rev\n$2 $1 ``rv = t.length + ':' + t[0]``\nendsnippet";
	let (mut buffer, Expansion { mut instance, .. }) = expand_at("", Position::default(), source, ExpansionRequest::default());
	assert_eq!(instance.parts()[2].content(), "2:");
	assert!(instance.next_placeholder());
	assert_eq!(instance.selected_placeholder(), Some(2));

	let outcome = edit(&mut buffer, &mut instance, &[TextEdit::insert(Position::new(0, 0), "A")]);
	assert_eq!(outcome.edits, vec![TextEdit::new(TextRange::from_coords(0, 3, 0, 5), "2:A")]);
	assert_eq!(instance.placeholder_range(1), Some(TextRange::from_coords(0, 2, 0, 2)));
}

#[test]
fn final_stop_is_synthesized_without_a_marker() {
	let (_, Expansion { mut instance, .. }) = expand_at("", Position::default(), "snippet one\n$1 x\nendsnippet", ExpansionRequest::default());
	assert_eq!(instance.placeholder_ids(), &[1, 0]);
	assert!(!instance.next_placeholder());
	assert_eq!(instance.selected_placeholder(), Some(0));
	assert_eq!(instance.placeholder_range(0), None);

	let (_, Expansion { instance, .. }) = expand_at("", Position::default(), "snippet plain\nplain\nendsnippet", ExpansionRequest::default());
	assert_eq!(instance.placeholder_ids(), &[0]);
	assert_eq!(instance.selected_placeholder(), Some(0));
}

#[test]
fn oversized_block_output_is_contained() {
	let source = "snippet p\n``rv = 'ab'.padStart(1e20)``\nendsnippet";
	let (buffer, Expansion { instance, diagnostic }) = expand_at("", Position::default(), source, ExpansionRequest::default());
	assert!(diagnostic.is_some_and(|d| d.template == "p"));
	assert!(instance.is_inert());
	assert_eq!(buffer.to_string(), "");
}

#[test]
fn edits_around_the_expansion_shift_or_ignore_it() {
	let (mut buffer, Expansion { mut instance, .. }) = expand_at("pre ", Position::new(0, 4), DOUBLE, ExpansionRequest::default());
	assert_eq!(instance.parts()[1].range(), TextRange::from_coords(0, 8, 0, 9));

	let after = edit(&mut buffer, &mut instance, &[TextEdit::insert(Position::new(0, 9), "\ntail")]);
	assert_eq!(after, UpdateOutcome::default());
	assert_eq!(instance.parts()[1].range(), TextRange::from_coords(0, 8, 0, 9));

	let before = edit(&mut buffer, &mut instance, &[TextEdit::insert(Position::new(0, 0), "head\n")]);
	assert!(!before.regenerated);
	assert_eq!(buffer.to_string(), "head\npre  => 0\ntail");
	assert_eq!(instance.placeholder_range(1), Some(TextRange::from_coords(1, 4, 1, 4)));
	assert_eq!(instance.parts()[1].range(), TextRange::from_coords(1, 8, 1, 9));
	assert!(instance.contains(Position::new(1, 6)));
	assert!(!instance.contains(Position::new(0, 2)));
}
