//! Template bodies: literal text interleaved with ``` `` ```-delimited code spans.

use crate::generator::Node;
use crate::marker::count_markers;

const DELIMITER_LEN: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct Body {
	pub nodes: Vec<Node>,
	pub spans: Vec<String>,
	pub placeholder_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BodyError {
	/// Input ended before `endsnippet`.
	UnterminatedBody,
	/// Input ended, or `endsnippet` appeared, inside a code span.
	UnterminatedCode,
}

pub(super) fn is_terminator(line: &str) -> bool {
	line.trim_end() == "endsnippet"
}

/// Parses body lines up to and including the terminator.
pub(super) fn parse_body<'a>(mut lines: impl Iterator<Item = &'a str>) -> Result<Body, BodyError> {
	let mut body = Body::default();
	let mut code: Option<Vec<&'a str>> = None;
	let mut remainder: Option<&'a str> = None;

	loop {
		let (line, fresh) = match remainder.take() {
			Some(rest) => (rest, false),
			None => match lines.next() {
				Some(line) => (line, true),
				None if code.is_some() => return Err(BodyError::UnterminatedCode),
				None => return Err(BodyError::UnterminatedBody),
			},
		};

		if let Some(code_lines) = code.as_mut() {
			if fresh && is_terminator(line) {
				return Err(BodyError::UnterminatedCode);
			}
			match find_delimiter(line) {
				None => code_lines.push(line.trim()),
				Some(at) => {
					code_lines.push(line[..at].trim());
					body.nodes.push(Node::Block(body.spans.len()));
					body.spans.push(code_lines.join("\n"));
					code = None;
					remainder = Some(&line[at + DELIMITER_LEN..]);
				}
			}
			continue;
		}

		if fresh && is_terminator(line) {
			break;
		}
		match find_delimiter(line) {
			None => {
				body.placeholder_count += count_markers(line);
				push_text(&mut body.nodes, line);
				push_text(&mut body.nodes, "\n");
			}
			Some(at) => {
				body.placeholder_count += count_markers(&line[..at]);
				push_text(&mut body.nodes, &line[..at]);
				code = Some(Vec::new());
				remainder = Some(&line[at + DELIMITER_LEN..]);
			}
		}
	}

	if let Some(Node::Text(last)) = body.nodes.last_mut()
		&& last.ends_with('\n')
	{
		last.pop();
		if last.is_empty() {
			body.nodes.pop();
		}
	}
	Ok(body)
}

/// Byte offset of the first run of exactly two backticks.
fn find_delimiter(line: &str) -> Option<usize> {
	let bytes = line.as_bytes();
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] != b'`' {
			i += 1;
			continue;
		}
		let start = i;
		while i < bytes.len() && bytes[i] == b'`' {
			i += 1;
		}
		if i - start == DELIMITER_LEN {
			return Some(start);
		}
	}
	None
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
	if text.is_empty() {
		return;
	}
	match nodes.last_mut() {
		Some(Node::Text(last)) => last.push_str(text),
		_ => nodes.push(Node::Text(text.to_string())),
	}
}
