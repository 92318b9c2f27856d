//! Template files grouped by language.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hsnip_template::{CompileError, CompiledTemplate, compile};

use crate::error::LibraryError;

/// Extension of template files.
pub const EXTENSION: &str = "hsnips";

/// Language whose templates apply everywhere.
pub const GLOBAL_LANGUAGE: &str = "all";

/// A compile error together with the file it came from.
#[derive(Debug)]
pub struct FileError {
	pub path: PathBuf,
	pub error: CompileError,
}

/// Every template known to the engine, keyed by language.
#[derive(Debug, Default)]
pub struct Library {
	templates: BTreeMap<String, Vec<Arc<CompiledTemplate>>>,
	errors: Vec<FileError>,
}

impl Library {
	pub fn new() -> Self {
		Self::default()
	}

	/// Loads every `*.hsnips` file in `dir`; the file stem names the language.
	///
	/// A missing directory yields an empty library. Compile errors are
	/// collected, not returned.
	pub fn load(dir: &Path) -> Result<Self, LibraryError> {
		let mut library = Self::new();
		if !dir.is_dir() {
			tracing::debug!(path = %dir.display(), "template directory missing");
			return Ok(library);
		}

		let read_dir = |error| LibraryError::ReadDir {
			path: dir.to_path_buf(),
			error,
		};
		let mut paths = Vec::new();
		for entry in fs::read_dir(dir).map_err(read_dir)? {
			let path = entry.map_err(read_dir)?.path();
			if path.extension().is_some_and(|ext| ext == EXTENSION) {
				paths.push(path);
			}
		}
		paths.sort();

		for path in paths {
			let Some(language) = path.file_stem().and_then(|stem| stem.to_str()).map(str::to_string) else {
				continue;
			};
			let source = fs::read_to_string(&path).map_err(|error| LibraryError::ReadFile { path: path.clone(), error })?;
			library.add_file(&language, &source, path);
		}

		tracing::debug!(
			path = %dir.display(),
			languages = library.templates.len(),
			errors = library.errors.len(),
			"loaded template library"
		);
		Ok(library)
	}

	/// Compiles `source` and adds its templates under `language`.
	pub fn add_source(&mut self, language: &str, source: &str) {
		self.add_file(language, source, PathBuf::from(format!("{language}.{EXTENSION}")));
	}

	fn add_file(&mut self, language: &str, source: &str, path: PathBuf) {
		let file = compile(source);
		for error in file.errors {
			tracing::warn!(path = %path.display(), %error, "template compile error");
			self.errors.push(FileError { path: path.clone(), error });
		}
		self.templates.entry(language.to_string()).or_default().extend(file.templates);
	}

	/// Templates declared for `language` itself, in file order.
	pub fn templates(&self, language: &str) -> &[Arc<CompiledTemplate>] {
		self.templates.get(language).map(Vec::as_slice).unwrap_or_default()
	}

	/// Templates for `language` followed by the global ones, highest priority
	/// first. Equal priorities keep file order.
	pub fn templates_for(&self, language: &str) -> Vec<Arc<CompiledTemplate>> {
		let global: &[Arc<CompiledTemplate>] = if language == GLOBAL_LANGUAGE { &[] } else { self.templates(GLOBAL_LANGUAGE) };
		let mut templates: Vec<_> = self.templates(language).iter().chain(global).cloned().collect();
		templates.sort_by_key(|template| std::cmp::Reverse(template.priority));
		templates
	}

	pub fn languages(&self) -> impl Iterator<Item = &str> {
		self.templates.keys().map(String::as_str)
	}

	/// Compile errors from every loaded file.
	pub fn errors(&self) -> &[FileError] {
		&self.errors
	}

	pub fn len(&self) -> usize {
		self.templates.values().map(Vec::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
