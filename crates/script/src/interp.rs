//! Tree-walking interpreter.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::ast::{AssignOp, BinaryOp, Expr, FunctionDecl, Literal, Program, Stmt, UnaryOp};
use crate::builtins::{self, install_globals};
use crate::error::{Result, ScriptError};
use crate::value::Value;

/// Maximum nesting of user function calls.
pub const MAX_CALL_DEPTH: usize = 64;
/// Evaluation steps allowed per interpreter.
pub const MAX_STEPS: u64 = 1_000_000;

enum Flow {
	Normal,
	Return(Value),
}

/// Evaluation state for one run of one or more programs.
///
/// Globals persist across [`Interpreter::run`] calls on the same interpreter,
/// which is how a preamble shares helpers with the code that follows it.
pub struct Interpreter {
	globals: FxHashMap<String, Value>,
	locals: Vec<FxHashMap<String, Value>>,
	depth: usize,
	steps: u64,
}

impl Default for Interpreter {
	fn default() -> Self {
		Self::new()
	}
}

impl Interpreter {
	/// Creates an interpreter with the builtin globals installed.
	pub fn new() -> Self {
		let mut globals = FxHashMap::default();
		install_globals(&mut globals);
		Self {
			globals,
			locals: Vec::new(),
			depth: 0,
			steps: 0,
		}
	}

	/// Defines or replaces a global.
	pub fn set_global(&mut self, name: impl Into<String>, value: Value) {
		self.globals.insert(name.into(), value);
	}

	/// Reads a global.
	pub fn global(&self, name: &str) -> Option<&Value> {
		self.globals.get(name)
	}

	/// Runs a program's top-level statements.
	///
	/// Returns the value of a top-level `return`, if one executed.
	pub fn run(&mut self, program: &Program) -> Result<Option<Value>> {
		tracing::trace!(stmts = program.stmts.len(), steps = self.steps, "script.run");
		for decl in program.functions() {
			self.globals.insert(decl.name.clone(), Value::Function(Arc::clone(decl)));
		}
		match self.exec_all(&program.stmts)? {
			Flow::Return(value) => Ok(Some(value)),
			Flow::Normal => Ok(None),
		}
	}

	/// Evaluates a single expression against the current globals.
	pub fn eval(&mut self, expr: &Expr) -> Result<Value> {
		self.tick()?;
		match expr {
			Expr::Literal(literal) => Ok(match literal {
				Literal::Null => Value::Null,
				Literal::Bool(b) => Value::Bool(*b),
				Literal::Number(n) => Value::Number(*n),
				Literal::Str(s) => Value::Str(s.clone()),
			}),
			Expr::List(items) => Ok(Value::List(self.eval_all(items)?)),
			Expr::Ident(name) => self.lookup(name),
			Expr::Member(recv, name) => {
				let recv = self.eval(recv)?;
				builtins::property(&recv, name)
			}
			Expr::Index(recv, index) => {
				let recv = self.eval(recv)?;
				let index = self.eval(index)?;
				builtins::index(&recv, &index)
			}
			Expr::Call(callee, args) => {
				if let Expr::Member(recv, name) = callee.as_ref() {
					let recv = self.eval(recv)?;
					let args = self.eval_all(args)?;
					if let Value::Map(map) = &recv {
						let function = map.get(name).cloned().unwrap_or(Value::Null);
						return self.call(&function, args, name);
					}
					return builtins::call_method(&recv, name, &args);
				}
				let function = self.eval(callee)?;
				let args = self.eval_all(args)?;
				let name = match callee.as_ref() {
					Expr::Ident(name) => name.as_str(),
					_ => "expression",
				};
				self.call(&function, args, name)
			}
			Expr::Unary(op, operand) => {
				let value = self.eval(operand)?;
				Ok(match op {
					UnaryOp::Neg => Value::Number(-value.to_number()),
					UnaryOp::Plus => Value::Number(value.to_number()),
					UnaryOp::Not => Value::Bool(!value.truthy()),
				})
			}
			Expr::Binary(BinaryOp::And, lhs, rhs) => {
				let lhs = self.eval(lhs)?;
				if lhs.truthy() { self.eval(rhs) } else { Ok(lhs) }
			}
			Expr::Binary(BinaryOp::Or, lhs, rhs) => {
				let lhs = self.eval(lhs)?;
				if lhs.truthy() { Ok(lhs) } else { self.eval(rhs) }
			}
			Expr::Binary(op, lhs, rhs) => {
				let lhs = self.eval(lhs)?;
				let rhs = self.eval(rhs)?;
				binary(*op, &lhs, &rhs)
			}
			Expr::Ternary(cond, then, otherwise) => {
				if self.eval(cond)?.truthy() {
					self.eval(then)
				} else {
					self.eval(otherwise)
				}
			}
		}
	}

	fn tick(&mut self) -> Result<()> {
		self.steps += 1;
		if self.steps > MAX_STEPS {
			return Err(ScriptError::runtime("evaluation step budget exhausted"));
		}
		Ok(())
	}

	fn eval_all(&mut self, exprs: &[Expr]) -> Result<Vec<Value>> {
		exprs.iter().map(|expr| self.eval(expr)).collect()
	}

	fn exec_all(&mut self, stmts: &[Stmt]) -> Result<Flow> {
		for stmt in stmts {
			if let Flow::Return(value) = self.exec(stmt)? {
				return Ok(Flow::Return(value));
			}
		}
		Ok(Flow::Normal)
	}

	fn exec_scoped(&mut self, stmts: &[Stmt]) -> Result<Flow> {
		self.locals.push(FxHashMap::default());
		let flow = self.exec_all(stmts);
		self.locals.pop();
		flow
	}

	fn exec(&mut self, stmt: &Stmt) -> Result<Flow> {
		self.tick()?;
		match stmt {
			Stmt::Let(name, init) => {
				let value = match init {
					Some(expr) => self.eval(expr)?,
					None => Value::Null,
				};
				self.declare(name, value);
			}
			Stmt::Assign(name, op, expr) => {
				let value = self.eval(expr)?;
				let value = match op {
					AssignOp::Set => value,
					AssignOp::Add => binary(BinaryOp::Add, &self.lookup(name)?, &value)?,
					AssignOp::Sub => binary(BinaryOp::Sub, &self.lookup(name)?, &value)?,
					AssignOp::Mul => binary(BinaryOp::Mul, &self.lookup(name)?, &value)?,
				};
				self.assign(name, value);
			}
			Stmt::If(cond, then, otherwise) => {
				let branch = if self.eval(cond)?.truthy() { then } else { otherwise };
				return self.exec_scoped(branch);
			}
			Stmt::Function(decl) => self.declare(&decl.name, Value::Function(Arc::clone(decl))),
			Stmt::Return(value) => {
				let value = match value {
					Some(expr) => self.eval(expr)?,
					None => Value::Null,
				};
				return Ok(Flow::Return(value));
			}
			Stmt::Expr(expr) => {
				self.eval(expr)?;
			}
		}
		Ok(Flow::Normal)
	}

	fn call(&mut self, function: &Value, args: Vec<Value>, name: &str) -> Result<Value> {
		match function {
			Value::Builtin(builtin) => builtin.call(&args),
			Value::Function(decl) => self.call_function(decl, args),
			_ => Err(ScriptError::runtime(format!("{name} is not a function"))),
		}
	}

	fn call_function(&mut self, decl: &FunctionDecl, args: Vec<Value>) -> Result<Value> {
		if self.depth >= MAX_CALL_DEPTH {
			return Err(ScriptError::runtime(format!("call depth limit exceeded in {}", decl.name)));
		}
		let mut frame = FxHashMap::default();
		let mut args = args.into_iter();
		for param in &decl.params {
			frame.insert(param.clone(), args.next().unwrap_or(Value::Null));
		}

		let saved = std::mem::replace(&mut self.locals, vec![frame]);
		self.depth += 1;
		let flow = self.exec_all(&decl.body);
		self.depth -= 1;
		self.locals = saved;

		Ok(match flow? {
			Flow::Return(value) => value,
			Flow::Normal => Value::Null,
		})
	}

	fn lookup(&self, name: &str) -> Result<Value> {
		self.locals
			.iter()
			.rev()
			.find_map(|scope| scope.get(name))
			.or_else(|| self.globals.get(name))
			.cloned()
			.ok_or_else(|| ScriptError::runtime(format!("{name} is not defined")))
	}

	fn declare(&mut self, name: &str, value: Value) {
		match self.locals.last_mut() {
			Some(scope) => scope.insert(name.to_string(), value),
			None => self.globals.insert(name.to_string(), value),
		};
	}

	fn assign(&mut self, name: &str, value: Value) {
		if let Some(scope) = self.locals.iter_mut().rev().find(|scope| scope.contains_key(name)) {
			scope.insert(name.to_string(), value);
		} else {
			self.globals.insert(name.to_string(), value);
		}
	}
}

fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value> {
	Ok(match op {
		BinaryOp::Add => match (lhs, rhs) {
			(Value::Number(a), Value::Number(b)) => Value::Number(a + b),
			(a, b) if is_textual(a) || is_textual(b) => {
				let (a, b) = (a.to_string(), b.to_string());
				builtins::check_len(a.len() + b.len())?;
				Value::Str(a + &b)
			}
			(a, b) => Value::Number(a.to_number() + b.to_number()),
		},
		BinaryOp::Sub => Value::Number(lhs.to_number() - rhs.to_number()),
		BinaryOp::Mul => Value::Number(lhs.to_number() * rhs.to_number()),
		BinaryOp::Div => Value::Number(lhs.to_number() / rhs.to_number()),
		BinaryOp::Rem => Value::Number(lhs.to_number() % rhs.to_number()),
		BinaryOp::Equal => Value::Bool(lhs.strict_eq(rhs)),
		BinaryOp::NotEqual => Value::Bool(!lhs.strict_eq(rhs)),
		BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
			let ordering = match (lhs, rhs) {
				(Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
				(a, b) => a.to_number().partial_cmp(&b.to_number()),
			};
			Value::Bool(ordering.is_some_and(|ordering| match op {
				BinaryOp::Less => ordering.is_lt(),
				BinaryOp::LessEqual => ordering.is_le(),
				BinaryOp::Greater => ordering.is_gt(),
				_ => ordering.is_ge(),
			}))
		}
		BinaryOp::And | BinaryOp::Or => unreachable!("short-circuit operators are evaluated lazily"),
	})
}

fn is_textual(value: &Value) -> bool {
	matches!(value, Value::Str(_) | Value::List(_) | Value::Map(_) | Value::Function(_) | Value::Builtin(_))
}

#[cfg(test)]
mod tests;
