use thiserror::Error;

/// A template that could not be compiled.
///
/// Errors are confined to one entry of a file: the compiler skips the entry
/// and keeps going, so a file yields both templates and errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompileError {
	#[error("line {line}: malformed snippet header `{header}`")]
	Header { line: u32, header: String },
	#[error("line {line}: invalid trigger pattern `{pattern}`: {message}")]
	Pattern { line: u32, pattern: String, message: String },
	#[error("line {line}: snippet `{trigger}` has no closing `endsnippet`")]
	UnterminatedBody { line: u32, trigger: String },
	#[error("line {line}: snippet `{trigger}` has an unclosed code span")]
	UnterminatedCode { line: u32, trigger: String },
	#[error("line {line}: snippet `{trigger}`: {message}")]
	Evaluator { line: u32, trigger: String, message: String },
	#[error("line {line}: global section: {message}")]
	Preamble { line: u32, message: String },
}

impl CompileError {
	/// 1-based line of the header (or `global` keyword) the error belongs to.
	pub fn line(&self) -> u32 {
		match self {
			Self::Header { line, .. }
			| Self::Pattern { line, .. }
			| Self::UnterminatedBody { line, .. }
			| Self::UnterminatedCode { line, .. }
			| Self::Evaluator { line, .. }
			| Self::Preamble { line, .. } => *line,
		}
	}
}

/// Failure reported by a [`BlockEvaluator`](crate::BlockEvaluator) or one of its products.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct EvaluatorError(pub String);

impl EvaluatorError {
	pub fn new(message: impl Into<String>) -> Self {
		Self(message.into())
	}
}

/// A generator invocation that failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EvalError {
	#[error("code block failed: {0}")]
	Block(#[from] EvaluatorError),
	#[error("expected {expected} block outputs, got {actual}")]
	BlockCount { expected: usize, actual: usize },
}
