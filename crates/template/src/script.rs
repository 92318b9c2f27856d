//! Block evaluator backed by the `hsnip-script` sandbox.
//!
//! Each invocation gets a fresh interpreter: the preamble runs first, then
//! every code span in order. Spans share variables within one invocation and
//! `rv` is reset to an empty string before each span. A top-level `return`
//! sets the span's value directly.

use std::collections::BTreeMap;
use std::sync::Arc;

use hsnip_script::{Interpreter, Program, ScriptError, Value, parse_expression, parse_program};

use crate::error::EvaluatorError;
use crate::evaluator::{BlockEvaluator, BlockProgram, ScopeFilter, ScopeInfo};
use crate::generator::GeneratorInput;

impl From<ScriptError> for EvaluatorError {
	fn from(e: ScriptError) -> Self {
		Self(e.to_string())
	}
}

/// The default [`BlockEvaluator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptEvaluator;

impl BlockEvaluator for ScriptEvaluator {
	type Preamble = Arc<Program>;

	fn compile_preamble(&self, source: &str) -> Result<Self::Preamble, EvaluatorError> {
		Ok(Arc::new(parse_program(source)?))
	}

	fn compile_blocks(&self, preamble: &Self::Preamble, spans: &[String]) -> Result<Arc<dyn BlockProgram>, EvaluatorError> {
		let spans = spans
			.iter()
			.enumerate()
			.map(|(i, span)| parse_program(span).map_err(|e| EvaluatorError(format!("code block {i}: {e}"))))
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Arc::new(ScriptBlocks {
			preamble: Arc::clone(preamble),
			spans,
		}))
	}

	fn compile_filter(&self, preamble: &Self::Preamble, expr: &str) -> Result<Arc<dyn ScopeFilter>, EvaluatorError> {
		Ok(Arc::new(ScriptFilter {
			preamble: Arc::clone(preamble),
			expr: parse_expression(expr)?,
		}))
	}
}

#[derive(Debug)]
struct ScriptBlocks {
	preamble: Arc<Program>,
	spans: Vec<Program>,
}

impl BlockProgram for ScriptBlocks {
	fn run(&self, input: &GeneratorInput) -> Result<Vec<String>, EvaluatorError> {
		let mut interp = Interpreter::new();
		interp.set_global("t", Value::strings(input.placeholder_texts.iter().cloned()));
		interp.set_global("m", Value::strings(input.match_groups.iter().cloned()));
		interp.set_global("w", Value::Str(input.workspace_id.clone()));
		interp.set_global("path", Value::Str(input.file_id.clone()));
		interp.run(&self.preamble)?;

		let mut outputs = Vec::with_capacity(self.spans.len());
		for span in &self.spans {
			interp.set_global("rv", Value::Str(String::new()));
			let value = match interp.run(span)? {
				Some(value) => value,
				None => interp.global("rv").cloned().unwrap_or(Value::Null),
			};
			outputs.push(value.to_string());
		}
		Ok(outputs)
	}
}

#[derive(Debug)]
struct ScriptFilter {
	preamble: Arc<Program>,
	expr: hsnip_script::Expr,
}

impl ScopeFilter for ScriptFilter {
	fn matches(&self, scope: &ScopeInfo) -> Result<bool, EvaluatorError> {
		let mut interp = Interpreter::new();
		interp.run(&self.preamble)?;
		let context = BTreeMap::from([("scopes".to_string(), Value::strings(scope.scopes.iter().cloned()))]);
		interp.set_global("context", Value::Map(context));
		Ok(interp.eval(&self.expr)?.truthy())
	}
}
