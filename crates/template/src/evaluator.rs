//! The boundary between the compiler and whatever runs author code.

use std::fmt;
use std::sync::Arc;

use crate::error::EvaluatorError;
use crate::generator::GeneratorInput;

/// Scope description handed to context filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeInfo {
	/// Innermost scope last, e.g. `["source.rust", "comment.line"]`.
	pub scopes: Vec<String>,
}

impl ScopeInfo {
	pub fn new<I, S>(scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			scopes: scopes.into_iter().map(Into::into).collect(),
		}
	}
}

/// All code spans of one template, compiled together with the file preamble.
pub trait BlockProgram: fmt::Debug + Send + Sync {
	/// Runs every span in order and returns one output per span.
	fn run(&self, input: &GeneratorInput) -> Result<Vec<String>, EvaluatorError>;
}

/// A compiled `context` directive.
pub trait ScopeFilter: fmt::Debug + Send + Sync {
	fn matches(&self, scope: &ScopeInfo) -> Result<bool, EvaluatorError>;
}

/// Compiles author code: file preambles, code spans and context expressions.
///
/// The compiler treats code as opaque text and only talks to this trait, so
/// the language behind code spans can be swapped per host.
pub trait BlockEvaluator {
	/// Compiled form of a file's `global` sections.
	type Preamble;

	fn compile_preamble(&self, source: &str) -> Result<Self::Preamble, EvaluatorError>;

	fn compile_blocks(&self, preamble: &Self::Preamble, spans: &[String]) -> Result<Arc<dyn BlockProgram>, EvaluatorError>;

	fn compile_filter(&self, preamble: &Self::Preamble, expr: &str) -> Result<Arc<dyn ScopeFilter>, EvaluatorError>;
}
