//! `.hsnips` file compiler.
//!
//! A file is read line by line. Top-level lines are comments (`#`), preamble
//! sections (`global` .. `endglobal`), directives for the next template
//! (`priority`, `context`) or snippet headers followed by a body. Anything
//! else at top level is ignored.
//!
//! All preamble sections are joined and compiled once, after the whole file
//! has been read, so templates declared before a `global` section see it too.

mod body;
mod header;

use std::sync::Arc;

use body::{BodyError, is_terminator, parse_body};
use header::{Header, TriggerSource, compile_pattern, is_header, parse_header};

use crate::error::CompileError;
use crate::evaluator::BlockEvaluator;
use crate::generator::Generator;
use crate::template::{CompiledTemplate, Trigger};

/// Result of compiling one file: every template that compiled, and an error
/// for every entry that did not.
#[derive(Debug, Default)]
pub struct CompiledFile {
	pub templates: Vec<Arc<CompiledTemplate>>,
	pub errors: Vec<CompileError>,
}

struct Entry {
	line: u32,
	header: Header,
	body: body::Body,
	priority: i32,
	context: Option<String>,
}

#[derive(Default)]
struct ParsedFile {
	entries: Vec<Entry>,
	preamble: Vec<String>,
	preamble_line: u32,
	errors: Vec<CompileError>,
}

/// Compiles `source` with `evaluator` handling code spans and context filters.
pub fn compile_with<E: BlockEvaluator>(source: &str, evaluator: &E) -> CompiledFile {
	let ParsedFile {
		entries,
		preamble,
		preamble_line,
		mut errors,
	} = parse_file(source);

	let preamble = evaluator.compile_preamble(&preamble.join("\n")).or_else(|e| {
		errors.push(CompileError::Preamble {
			line: preamble_line,
			message: e.to_string(),
		});
		evaluator.compile_preamble("")
	});
	let preamble = match preamble {
		Ok(preamble) => preamble,
		Err(e) => {
			errors.extend(entries.iter().map(|entry| CompileError::Evaluator {
				line: entry.line,
				trigger: entry.header.label().to_string(),
				message: e.to_string(),
			}));
			errors.sort_by_key(CompileError::line);
			return CompiledFile { templates: Vec::new(), errors };
		}
	};

	let mut templates = Vec::with_capacity(entries.len());
	for entry in entries {
		match compile_entry(entry, evaluator, &preamble) {
			Ok(template) => templates.push(Arc::new(template)),
			Err(e) => errors.push(e),
		}
	}
	errors.sort_by_key(CompileError::line);

	tracing::debug!(templates = templates.len(), errors = errors.len(), "compiled template file");
	CompiledFile { templates, errors }
}

/// Compiles `source` with the built-in script evaluator.
#[cfg(feature = "script")]
pub fn compile(source: &str) -> CompiledFile {
	compile_with(source, &crate::script::ScriptEvaluator)
}

fn compile_entry<E: BlockEvaluator>(entry: Entry, evaluator: &E, preamble: &E::Preamble) -> Result<CompiledTemplate, CompileError> {
	let Entry {
		line,
		header,
		body,
		priority,
		context,
	} = entry;
	let evaluator_error = |message: String| CompileError::Evaluator {
		line,
		trigger: header.label().to_string(),
		message,
	};

	let trigger = match &header.trigger {
		TriggerSource::Literal(text) => Trigger::Literal(text.clone()),
		TriggerSource::Pattern(pattern) => Trigger::Pattern(compile_pattern(pattern).map_err(|e| CompileError::Pattern {
			line,
			pattern: pattern.clone(),
			message: e.to_string(),
		})?),
	};

	let context_filter = context
		.map(|expr| evaluator.compile_filter(preamble, &expr))
		.transpose()
		.map_err(|e| evaluator_error(format!("context filter: {e}")))?;

	let program = evaluator
		.compile_blocks(preamble, &body.spans)
		.map_err(|e| evaluator_error(e.to_string()))?;

	Ok(CompiledTemplate {
		trigger,
		description: header.description,
		flags: header.flags,
		priority,
		placeholder_count: body.placeholder_count,
		context_filter,
		generator: Generator::new(body.nodes, body.spans.len(), program),
		line,
	})
}

fn parse_file(source: &str) -> ParsedFile {
	let mut parsed = ParsedFile::default();
	let mut priority = 0;
	let mut context: Option<String> = None;
	let mut lines = source.lines().zip(1u32..);

	while let Some((line, number)) = lines.next() {
		if line.starts_with('#') {
			continue;
		}

		if line.trim_end() == "global" {
			if parsed.preamble_line == 0 {
				parsed.preamble_line = number;
			}
			let mut closed = false;
			for (line, _) in lines.by_ref() {
				if line.trim_end() == "endglobal" {
					closed = true;
					break;
				}
				parsed.preamble.push(line.to_string());
			}
			if !closed {
				parsed.errors.push(CompileError::Preamble {
					line: number,
					message: "missing `endglobal`".to_string(),
				});
			}
		} else if let Some(rest) = line.strip_prefix("priority ") {
			priority = rest.trim().parse().unwrap_or(0);
		} else if let Some(rest) = line.strip_prefix("context ") {
			context = Some(rest.trim().to_string()).filter(|expr| !expr.is_empty());
		} else if is_header(line) {
			let priority = std::mem::take(&mut priority);
			let context = context.take();

			let Some(header) = parse_header(line) else {
				parsed.errors.push(CompileError::Header {
					line: number,
					header: line.trim_end().to_string(),
				});
				for (line, _) in lines.by_ref() {
					if is_terminator(line) {
						break;
					}
				}
				continue;
			};

			match parse_body(lines.by_ref().map(|(line, _)| line)) {
				Ok(body) => parsed.entries.push(Entry {
					line: number,
					header,
					body,
					priority,
					context,
				}),
				Err(kind) => {
					let trigger = header.label().to_string();
					parsed.errors.push(match kind {
						BodyError::UnterminatedBody => CompileError::UnterminatedBody { line: number, trigger },
						BodyError::UnterminatedCode => CompileError::UnterminatedCode { line: number, trigger },
					});
				}
			}
		}
	}
	parsed
}
