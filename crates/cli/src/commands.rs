//! Subcommand implementations. Each writes its report to `out`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use hsnip_engine::{BufferHost, ExpansionRequest, Library, MatchOutcome, MatchRequest, match_templates};
use hsnip_primitives::{Position, text_extent};
use hsnip_template::{ScopeInfo, compile};

/// Compiles `files`, or every template file in `dir` when `files` is empty.
/// Returns whether any error was found.
pub fn check(dir: &Path, files: &[PathBuf], out: &mut impl Write) -> Result<bool> {
	let mut templates = 0;
	let mut errors = 0;

	if files.is_empty() {
		let library = Library::load(dir)?;
		for error in library.errors() {
			writeln!(out, "{}:{}: {}", error.path.display(), error.error.line(), error.error)?;
		}
		templates = library.len();
		errors = library.errors().len();
	} else {
		for path in files {
			let source = std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
			let file = compile(&source);
			for error in &file.errors {
				writeln!(out, "{}:{}: {}", path.display(), error.line(), error)?;
			}
			templates += file.templates.len();
			errors += file.errors.len();
		}
	}

	writeln!(out, "{templates} templates, {errors} errors")?;
	Ok(errors > 0)
}

/// Lists templates as `language priority flags trigger description`, tab separated.
pub fn list(dir: &Path, language: Option<&str>, out: &mut impl Write) -> Result<()> {
	let library = Library::load(dir)?;
	let groups: Vec<(String, Vec<_>)> = match language {
		Some(language) => vec![(language.to_string(), library.templates_for(language))],
		None => library
			.languages()
			.map(|language| (language.to_string(), library.templates(language).to_vec()))
			.collect(),
	};

	for (language, templates) in groups {
		for template in templates {
			writeln!(
				out,
				"{language}\t{}\t{}\t{}\t{}",
				template.priority,
				template.flags.letters(),
				template.trigger.label(),
				template.description
			)?;
		}
	}
	Ok(())
}

/// What to feed an expansion.
#[derive(Debug, Default)]
pub struct ExpandArgs<'a> {
	pub language: &'a str,
	pub text: &'a str,
	pub fills: &'a [String],
	pub selection: &'a str,
	pub scopes: &'a [String],
	pub multiline_context: u32,
}

/// Expands the template triggered at the end of `args.text`, types each fill
/// into successive tabstops, and writes the resulting text.
pub fn expand(dir: &Path, args: &ExpandArgs<'_>, out: &mut impl Write) -> Result<()> {
	let library = Library::load(dir)?;
	let templates = library.templates_for(args.language);

	let mut host = BufferHost::new(args.text);
	let (line, character) = text_extent(args.text);
	let scope = ScopeInfo::new(args.scopes.iter().cloned());
	let request = MatchRequest {
		position: Position::new(line, character),
		scope: &scope,
		multiline_context: args.multiline_context,
	};

	let candidate = match match_templates(host.buffer(), &templates, &request) {
		MatchOutcome::Automatic(candidate) => candidate,
		MatchOutcome::Candidates(candidates) => match candidates.into_iter().find(|candidate| candidate.complete) {
			Some(candidate) => candidate,
			None => bail!("no {} template matches the end of {:?}", args.language, args.text),
		},
	};
	tracing::debug!(template = candidate.template.name(), range = %candidate.range, "expanding");

	host.expand(
		candidate.template,
		candidate.range,
		ExpansionRequest {
			match_groups: candidate.match_groups,
			selected_text: args.selection.to_string(),
			..ExpansionRequest::default()
		},
	)?;

	for fill in args.fills {
		if !host.replace_selected(fill)? {
			tracing::warn!(%fill, "no tabstop left to fill");
			break;
		}
		host.next_placeholder();
	}

	for diagnostic in host.diagnostics() {
		eprintln!("warning: {diagnostic}");
	}
	writeln!(out, "{}", host.text())?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::fs;

	use super::*;

	const TEMPLATES: &str = "\
snippet dbl \"double\" A
$1 => ``rv = String(Number(t[0]) * 2)``
endsnippet

priority 3
snippet pair
($1, $2)$0
endsnippet
";

	fn library_dir() -> tempfile::TempDir {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("all.hsnips"), TEMPLATES).unwrap();
		fs::write(dir.path().join("rust.hsnips"), "snippet fn \"function\" b\nfn $1() {}\nendsnippet\n").unwrap();
		dir
	}

	fn output(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
		let mut out = Vec::new();
		f(&mut out).unwrap();
		String::from_utf8(out).unwrap()
	}

	#[test]
	fn check_reports_errors_with_locations() {
		let dir = library_dir();
		let bad = dir.path().join("bad.hsnips");
		fs::write(&bad, "snippet ok\nx\nendsnippet\nsnippet open\n``x\nendsnippet\n").unwrap();

		let mut out = Vec::new();
		assert!(check(dir.path(), &[bad.clone()], &mut out).unwrap());
		let report = String::from_utf8(out).unwrap();
		assert!(report.starts_with(&format!("{}:4: ", bad.display())), "{report}");
		assert!(report.ends_with("1 templates, 1 errors\n"), "{report}");

		fs::remove_file(&bad).unwrap();
		let mut out = Vec::new();
		assert!(!check(dir.path(), &[], &mut out).unwrap());
		assert_eq!(String::from_utf8(out).unwrap(), "3 templates, 0 errors\n");
	}

	#[test]
	fn list_orders_by_priority() {
		let dir = library_dir();
		let listed = output(|out| list(dir.path(), Some("rust"), out));
		assert_eq!(listed, "rust\t3\t\tpair\t\nrust\t0\tb\tfn\tfunction\nrust\t0\tA\tdbl\tdouble\n");

		let all = output(|out| list(dir.path(), None, out));
		assert_eq!(all.lines().count(), 3);
		assert!(all.lines().last().unwrap().starts_with("rust\t"));
	}

	#[test]
	fn expand_fills_tabstops() {
		let dir = library_dir();
		let fills = ["1".to_string(), "2".to_string()];
		let args = ExpandArgs {
			language: "rust",
			text: "let p = pair",
			fills: &fills,
			..ExpandArgs::default()
		};
		assert_eq!(output(|out| expand(dir.path(), &args, out)), "let p = (1, 2)\n");

		let fills = ["21".to_string()];
		let args = ExpandArgs {
			language: "python",
			text: "dbl",
			fills: &fills,
			..ExpandArgs::default()
		};
		assert_eq!(output(|out| expand(dir.path(), &args, out)), "21 => 42\n");
	}

	#[test]
	fn expand_without_match_fails() {
		let dir = library_dir();
		let args = ExpandArgs {
			language: "rust",
			text: "nothing here",
			..ExpandArgs::default()
		};
		let mut out = Vec::new();
		assert!(expand(dir.path(), &args, &mut out).is_err());
	}
}
