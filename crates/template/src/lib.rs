//! Compiler for `.hsnips` template files.
//!
//! [`compile_with`] turns a file into [`CompiledTemplate`]s. Each template
//! carries a [`Generator`], a pure function from placeholder texts and match
//! groups to literal [`Segment`]s and computed block outputs. Author code is
//! opaque to the compiler and handled by a [`BlockEvaluator`]; with the
//! default `script` feature, [`compile`] uses the bundled sandbox.

mod compile;
mod error;
mod evaluator;
mod flags;
mod generator;
pub mod marker;
#[cfg(feature = "script")]
mod script;
mod template;

#[cfg(feature = "script")]
pub use compile::compile;
pub use compile::{CompiledFile, compile_with};
pub use error::{CompileError, EvalError, EvaluatorError};
pub use evaluator::{BlockEvaluator, BlockProgram, ScopeFilter, ScopeInfo};
pub use flags::{MatchMode, TemplateFlags};
pub use generator::{Generator, GeneratorInput, GeneratorOutput, Node, Segment};
#[cfg(feature = "script")]
pub use script::ScriptEvaluator;
pub use template::{CompiledTemplate, Pattern, Trigger};
