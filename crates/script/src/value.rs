//! Runtime values and their conversions.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::ast::FunctionDecl;
use crate::builtins::Builtin;

/// A script value.
#[derive(Debug, Clone)]
pub enum Value {
	Null,
	Bool(bool),
	Number(f64),
	Str(String),
	List(Vec<Value>),
	Map(BTreeMap<String, Value>),
	Function(Arc<FunctionDecl>),
	Builtin(Builtin),
}

impl Value {
	/// Builds a list of strings.
	pub fn strings<I, S>(items: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Value::List(items.into_iter().map(|s| Value::Str(s.into())).collect())
	}

	/// Truthiness used by conditions and logical operators.
	pub fn truthy(&self) -> bool {
		match self {
			Value::Null => false,
			Value::Bool(b) => *b,
			Value::Number(n) => *n != 0.0 && !n.is_nan(),
			Value::Str(s) => !s.is_empty(),
			Value::List(_) | Value::Map(_) | Value::Function(_) | Value::Builtin(_) => true,
		}
	}

	/// Numeric conversion: empty and blank strings are zero, unparsable text is NaN.
	pub fn to_number(&self) -> f64 {
		match self {
			Value::Null => 0.0,
			Value::Bool(b) => f64::from(u8::from(*b)),
			Value::Number(n) => *n,
			Value::Str(s) => parse_number(s),
			Value::List(_) => parse_number(&self.to_string()),
			Value::Map(_) | Value::Function(_) | Value::Builtin(_) => f64::NAN,
		}
	}

	/// Name of the value's type, for error messages.
	pub fn type_name(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "boolean",
			Value::Number(_) => "number",
			Value::Str(_) => "string",
			Value::List(_) => "list",
			Value::Map(_) => "object",
			Value::Function(_) | Value::Builtin(_) => "function",
		}
	}

	/// Strict equality: same type and same contents.
	pub fn strict_eq(&self, other: &Value) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Number(a), Value::Number(b)) => a == b,
			(Value::Str(a), Value::Str(b)) => a == b,
			(Value::List(a), Value::List(b)) => a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.strict_eq(y)),
			(Value::Map(a), Value::Map(b)) => a.len() == b.len() && a.iter().zip(b).all(|((ka, va), (kb, vb))| ka == kb && va.strict_eq(vb)),
			(Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
			(Value::Builtin(a), Value::Builtin(b)) => a == b,
			_ => false,
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => f.write_str("null"),
			Value::Bool(b) => write!(f, "{b}"),
			Value::Number(n) => f.write_str(&format_number(*n)),
			Value::Str(s) => f.write_str(s),
			Value::List(items) => {
				for (i, item) in items.iter().enumerate() {
					if i > 0 {
						f.write_str(",")?;
					}
					if !matches!(item, Value::Null) {
						write!(f, "{item}")?;
					}
				}
				Ok(())
			}
			Value::Map(_) => f.write_str("[object Object]"),
			Value::Function(decl) => write!(f, "function {}", decl.name),
			Value::Builtin(builtin) => write!(f, "function {}", builtin.name()),
		}
	}
}

/// Formats a number the way string conversion shows it: integral values drop the fraction.
pub fn format_number(n: f64) -> String {
	if n.is_nan() {
		"NaN".into()
	} else if n.is_infinite() {
		if n > 0.0 { "Infinity".into() } else { "-Infinity".into() }
	} else if n == n.trunc() && n.abs() < 1e21 {
		format!("{}", n as i128)
	} else {
		format!("{n}")
	}
}

/// Parses numeric text: surrounding whitespace is ignored, blank text is zero.
pub fn parse_number(text: &str) -> f64 {
	let text = text.trim();
	if text.is_empty() {
		return 0.0;
	}
	match text {
		"Infinity" | "+Infinity" => return f64::INFINITY,
		"-Infinity" => return f64::NEG_INFINITY,
		_ => {}
	}
	if !text.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) {
		return f64::NAN;
	}
	text.parse::<f64>().unwrap_or(f64::NAN)
}

/// Parses a leading integer, ignoring whatever follows it.
pub fn parse_int(text: &str) -> f64 {
	let text = text.trim_start();
	let (sign, digits) = match text.strip_prefix('-') {
		Some(rest) => (-1.0, rest),
		None => (1.0, text.strip_prefix('+').unwrap_or(text)),
	};
	let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
	if end == 0 {
		return f64::NAN;
	}
	digits[..end].parse::<f64>().map(|n| sign * n).unwrap_or(f64::NAN)
}
