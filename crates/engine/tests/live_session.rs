//! End-to-end sessions: match a trigger, expand it, then type into it.

use std::sync::Arc;

use hsnip_engine::{BufferHost, ExpansionRequest, Library, MatchOutcome, MatchRequest, match_templates};
use hsnip_primitives::Position;
use hsnip_template::{CompiledTemplate, ScopeInfo};
use pretty_assertions::assert_eq;

const SOURCE: &str = r#"
snippet dbl "double" A
$1 => ``rv = String(Number(t[0]) * 2)``
endsnippet

snippet up "shout"
$1 ``rv = t[0].toUpperCase()`` ``rv = t[0].length``
endsnippet

snippet frac "fraction" i
\frac{$1}{$2}$0
endsnippet

snippet `(\d+)x` "times two" A
``rv = Number(m[1]) * 2``
endsnippet

snippet boom "broken"
``rv = nope()``
endsnippet

snippet blk "block"
{
	$1
}
endsnippet
"#;

fn library() -> Library {
	let mut library = Library::new();
	library.add_source("all", SOURCE);
	assert!(library.errors().is_empty(), "{:?}", library.errors());
	library
}

/// Types `trigger` into a fresh buffer, matches at the end, and expands the first candidate.
fn expand(prefix: &str, trigger: &str) -> BufferHost {
	let text = format!("{prefix}{trigger}");
	let mut host = BufferHost::new(&text);
	let templates = library().templates_for("rust");
	let last = text.lines().last().unwrap_or_default();
	let position = Position::new(text.lines().count().saturating_sub(1) as u32, last.chars().count() as u32);
	let scope = ScopeInfo::default();
	let request = MatchRequest {
		position,
		scope: &scope,
		multiline_context: 20,
	};

	let outcome = match_templates(host.buffer(), &templates, &request);
	let candidate = match outcome {
		MatchOutcome::Automatic(candidate) => candidate,
		MatchOutcome::Candidates(candidates) => candidates.into_iter().next().expect("no candidate"),
	};
	let template: Arc<CompiledTemplate> = candidate.template;
	host.expand(
		template,
		candidate.range,
		ExpansionRequest {
			match_groups: candidate.match_groups,
			..ExpansionRequest::default()
		},
	)
	.unwrap();
	host
}

#[test]
fn typing_issues_one_corrective_edit_per_keystroke() {
	let mut host = expand("", "dbl");
	assert_eq!(host.text(), " => 0");

	assert!(host.type_text("2").unwrap());
	assert!(host.type_text("1").unwrap());
	assert_eq!(host.text(), "21 => 42");
	assert_eq!(host.corrective_edit_count(), 2);
	assert_eq!(host.regeneration_count(), 2);
	assert!(!host.instance().unwrap().block_changed());
}

#[test]
fn unchanged_output_issues_no_edit() {
	let mut host = expand("", "dbl");
	host.type_text("21").unwrap();
	assert_eq!(host.corrective_edit_count(), 1);

	assert!(host.replace_selected("21").unwrap());
	assert_eq!(host.text(), "21 => 42");
	assert_eq!(host.corrective_edit_count(), 1);
	assert_eq!(host.regeneration_count(), 2);
}

#[test]
fn several_blocks_are_patched_in_one_batch() {
	let mut host = expand("", "up");
	assert_eq!(host.text(), "  0");

	host.type_text("a").unwrap();
	host.type_text("b").unwrap();
	assert_eq!(host.text(), "ab AB 2");
	assert_eq!(host.corrective_edit_count(), 4);
	assert_eq!(host.regeneration_count(), 2);
}

#[test]
fn tabstops_walk_in_order() {
	let mut host = expand("x = ", "frac");
	assert_eq!(host.text(), "x = \\frac{}{}");

	host.type_text("a").unwrap();
	assert!(host.next_placeholder());
	host.type_text("b").unwrap();
	assert_eq!(host.text(), "x = \\frac{a}{b}");

	assert!(!host.next_placeholder());
	assert_eq!(host.instance().and_then(|i| i.selected_placeholder()), Some(0));
	assert!(!host.next_placeholder());
	assert!(host.instance().is_none());
}

#[test]
fn pattern_groups_feed_the_expansion() {
	let host = expand("let n = ", "12x");
	assert_eq!(host.text(), "let n = 24");
	assert_eq!(host.instance().unwrap().placeholder_ids(), &[0]);
}

#[test]
fn failing_template_inserts_nothing() {
	let host = expand("a ", "boom");
	assert_eq!(host.text(), "a ");
	let [diagnostic] = host.diagnostics() else {
		panic!("expected one diagnostic");
	};
	assert_eq!(diagnostic.template, "broken");
}

#[test]
fn indented_expansion_tracks_inner_lines() {
	let mut host = expand("    ", "blk");
	assert_eq!(host.text(), "    {\n    \t\n    }");

	host.type_text("x").unwrap();
	assert_eq!(host.text(), "    {\n    \tx\n    }");
	let instance = host.instance().unwrap();
	assert_eq!(instance.placeholder_range(1).map(|r| (r.start, r.end)), Some((Position::new(1, 5), Position::new(1, 6))));
	assert!(host.diagnostics().is_empty());
}

#[test]
fn leaving_the_expansion_ends_the_session() {
	let mut host = expand("", "dbl");
	host.leave_if_outside(Position::new(0, 2));
	assert!(host.instance().is_some());
	host.leave_if_outside(Position::new(3, 0));
	assert!(host.instance().is_none());
}
