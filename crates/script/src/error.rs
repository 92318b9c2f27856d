use thiserror::Error;

/// Errors raised while parsing or running a script.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScriptError {
	/// The source does not parse.
	#[error("parse error at {line}:{column}: {message}")]
	Parse {
		/// 1-based line.
		line: u32,
		/// 1-based column, in characters.
		column: u32,
		message: String,
	},
	/// Evaluation failed.
	#[error("{0}")]
	Runtime(String),
}

impl ScriptError {
	pub(crate) fn runtime(message: impl Into<String>) -> Self {
		Self::Runtime(message.into())
	}
}

/// Result type for script operations.
pub type Result<T> = std::result::Result<T, ScriptError>;
