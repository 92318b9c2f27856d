//! A small sandboxed scripting language for template code spans.
//!
//! Programs are parsed once and interpreted against an [`Interpreter`] whose
//! globals carry the values a template exposes. Execution is bounded by
//! [`interp::MAX_CALL_DEPTH`] and [`interp::MAX_STEPS`]; there is no access to
//! the filesystem, the network or the host process.

mod ast;
mod builtins;
mod error;
pub mod interp;
mod lexer;
mod parser;
mod value;

pub use ast::{Expr, FunctionDecl, Program, Stmt};
pub use builtins::Builtin;
pub use error::{Result, ScriptError};
pub use interp::Interpreter;
pub use parser::{parse_expression, parse_program};
pub use value::Value;
