use std::path::PathBuf;

use thiserror::Error;

/// Errors loading a template library.
#[derive(Debug, Error)]
pub enum LibraryError {
	#[error("cannot read template directory {path}: {error}")]
	ReadDir { path: PathBuf, error: std::io::Error },
	#[error("cannot read template file {path}: {error}")]
	ReadFile { path: PathBuf, error: std::io::Error },
}
