//! Placeholder markers (`$n`, `${n}`) and dollar escaping in literal text.
//!
//! A `\$` pair is an escaped dollar and never starts a marker. Counting,
//! position tracking and rendering all go through [`pieces`] so they agree on
//! what is a marker.

use std::sync::LazyLock;

use regex::Regex;

static MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\\$|\$\{(\d+)\}|\$(\d+)").expect("marker pattern is valid"));

/// One lexical piece of literal template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
	/// Plain text without markers or escapes.
	Text(&'a str),
	/// An escaped `\$`, shown as a single `$`.
	Dollar,
	/// A placeholder marker with its id.
	Marker(u32),
}

/// Splits literal text into plain runs, escaped dollars and markers.
pub fn pieces(text: &str) -> Vec<Piece<'_>> {
	let mut out = Vec::new();
	let mut last = 0;
	for caps in MARKER.captures_iter(text) {
		let Some(whole) = caps.get(0) else {
			continue;
		};
		let piece = match caps.get(1).or_else(|| caps.get(2)) {
			Some(id) => match id.as_str().parse::<u32>() {
				Ok(id) => Piece::Marker(id),
				Err(_) => continue,
			},
			None => Piece::Dollar,
		};
		if whole.start() > last {
			out.push(Piece::Text(&text[last..whole.start()]));
		}
		out.push(piece);
		last = whole.end();
	}
	if last < text.len() {
		out.push(Piece::Text(&text[last..]));
	}
	out
}

/// Number of markers in `text`, counting repeats.
pub fn count_markers(text: &str) -> usize {
	pieces(text).iter().filter(|piece| matches!(piece, Piece::Marker(_))).count()
}

/// Escapes every `$` so computed text cannot introduce markers.
pub fn escape_dollars(text: &str) -> String {
	text.replace('$', "\\$")
}

/// Text as the host shows it: markers removed and escaped dollars restored.
pub fn render(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for piece in pieces(text) {
		match piece {
			Piece::Text(s) => out.push_str(s),
			Piece::Dollar => out.push('$'),
			Piece::Marker(_) => {}
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn splits_markers_and_escapes() {
		assert_eq!(
			pieces(r"a $1 b ${22}\$3 c"),
			vec![
				Piece::Text("a "),
				Piece::Marker(1),
				Piece::Text(" b "),
				Piece::Marker(22),
				Piece::Dollar,
				Piece::Text("3 c"),
			]
		);
	}

	#[test]
	fn escaped_dollar_is_not_counted() {
		assert_eq!(count_markers(r"$1 \$2 ${3} $0 $1"), 4);
		assert_eq!(count_markers("${VISUAL} $ $x"), 0);
	}

	#[test]
	fn escape_then_render_restores_text() {
		let text = "cost: $5 and ${x}";
		assert_eq!(render(&escape_dollars(text)), text);
		assert_eq!(count_markers(&escape_dollars(text)), 0);
	}

	#[test]
	fn render_drops_markers() {
		assert_eq!(render("foo $1 bar ${2}$0"), "foo  bar ");
	}

	#[test]
	fn oversized_ids_stay_text() {
		assert_eq!(pieces("$99999999999"), vec![Piece::Text("$99999999999")]);
	}
}
