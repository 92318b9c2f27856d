//! Global functions and methods available to scripts.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::error::{Result, ScriptError};
use crate::value::{Value, parse_int};

/// Longest string, in bytes, a script may build.
pub const MAX_STRING_LEN: usize = 1 << 20;

/// Fails when a string of `len` bytes would exceed [`MAX_STRING_LEN`].
pub fn check_len(len: usize) -> Result<()> {
	if len > MAX_STRING_LEN {
		return Err(ScriptError::runtime(format!("string of {len} bytes exceeds the {MAX_STRING_LEN} byte limit")));
	}
	Ok(())
}

/// A native function exposed to scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
	String,
	Number,
	Boolean,
	ParseInt,
	Len,
	Floor,
	Ceil,
	Round,
	Abs,
	Min,
	Max,
	Pow,
	Sqrt,
}

impl Builtin {
	pub fn name(self) -> &'static str {
		match self {
			Builtin::String => "String",
			Builtin::Number => "Number",
			Builtin::Boolean => "Boolean",
			Builtin::ParseInt => "parseInt",
			Builtin::Len => "len",
			Builtin::Floor => "floor",
			Builtin::Ceil => "ceil",
			Builtin::Round => "round",
			Builtin::Abs => "abs",
			Builtin::Min => "min",
			Builtin::Max => "max",
			Builtin::Pow => "pow",
			Builtin::Sqrt => "sqrt",
		}
	}

	pub fn call(self, args: &[Value]) -> Result<Value> {
		let first = args.first().cloned().unwrap_or(Value::Null);
		let num = |i: usize| args.get(i).map_or(f64::NAN, Value::to_number);
		Ok(match self {
			Builtin::String => Value::Str(if args.is_empty() { String::new() } else { first.to_string() }),
			Builtin::Number => Value::Number(if args.is_empty() { 0.0 } else { first.to_number() }),
			Builtin::Boolean => Value::Bool(first.truthy()),
			Builtin::ParseInt => Value::Number(parse_int(&first.to_string())),
			Builtin::Len => Value::Number(match &first {
				Value::Str(s) => s.chars().count() as f64,
				Value::List(items) => items.len() as f64,
				Value::Map(map) => map.len() as f64,
				other => return Err(ScriptError::runtime(format!("len() of {}", other.type_name()))),
			}),
			Builtin::Floor => Value::Number(num(0).floor()),
			Builtin::Ceil => Value::Number(num(0).ceil()),
			Builtin::Round => Value::Number((num(0) + 0.5).floor()),
			Builtin::Abs => Value::Number(num(0).abs()),
			Builtin::Sqrt => Value::Number(num(0).sqrt()),
			Builtin::Pow => Value::Number(num(0).powf(num(1))),
			Builtin::Min => Value::Number(args.iter().map(Value::to_number).fold(f64::INFINITY, f64::min)),
			Builtin::Max => Value::Number(args.iter().map(Value::to_number).fold(f64::NEG_INFINITY, f64::max)),
		})
	}
}

/// Installs the global functions into `scope`.
pub fn install_globals(scope: &mut FxHashMap<String, Value>) {
	for builtin in [Builtin::String, Builtin::Number, Builtin::Boolean, Builtin::ParseInt, Builtin::Len] {
		scope.insert(builtin.name().to_string(), Value::Builtin(builtin));
	}
	let math: BTreeMap<String, Value> = [
		Builtin::Floor,
		Builtin::Ceil,
		Builtin::Round,
		Builtin::Abs,
		Builtin::Min,
		Builtin::Max,
		Builtin::Pow,
		Builtin::Sqrt,
	]
	.into_iter()
	.map(|builtin| (builtin.name().to_string(), Value::Builtin(builtin)))
	.collect();
	scope.insert("Math".to_string(), Value::Map(math));
}

/// Reads `recv.name` for non-call member access.
pub fn property(recv: &Value, name: &str) -> Result<Value> {
	match (recv, name) {
		(Value::Str(s), "length") => Ok(Value::Number(s.chars().count() as f64)),
		(Value::List(items), "length") => Ok(Value::Number(items.len() as f64)),
		(Value::Map(map), key) => Ok(map.get(key).cloned().unwrap_or(Value::Null)),
		(Value::Null, _) => Err(ScriptError::runtime(format!("cannot read property '{name}' of null"))),
		_ => Ok(Value::Null),
	}
}

/// Reads `recv[index]`.
pub fn index(recv: &Value, index: &Value) -> Result<Value> {
	match recv {
		Value::List(items) => Ok(position(index, items.len()).and_then(|i| items.get(i).cloned()).unwrap_or(Value::Null)),
		Value::Str(s) => Ok(position(index, usize::MAX)
			.and_then(|i| s.chars().nth(i))
			.map(|c| Value::Str(c.to_string()))
			.unwrap_or(Value::Null)),
		Value::Map(_) => property(recv, &index.to_string()),
		Value::Null => Err(ScriptError::runtime(format!("cannot read index {index} of null"))),
		_ => Ok(Value::Null),
	}
}

/// Calls `recv.name(args)` on strings and lists.
pub fn call_method(recv: &Value, name: &str, args: &[Value]) -> Result<Value> {
	match recv {
		Value::Str(s) => string_method(s, name, args),
		Value::List(items) => list_method(items, name, args),
		other => Err(ScriptError::runtime(format!("{} has no method '{name}'", other.type_name()))),
	}
}

fn arg_str(args: &[Value], i: usize) -> String {
	args.get(i).map(Value::to_string).unwrap_or_default()
}

fn string_method(s: &str, name: &str, args: &[Value]) -> Result<Value> {
	let chars: Vec<char> = s.chars().collect();
	Ok(match name {
		"toUpperCase" => Value::Str(s.to_uppercase()),
		"toLowerCase" => Value::Str(s.to_lowercase()),
		"trim" => Value::Str(s.trim().to_string()),
		"trimStart" => Value::Str(s.trim_start().to_string()),
		"trimEnd" => Value::Str(s.trim_end().to_string()),
		"startsWith" => Value::Bool(s.starts_with(&arg_str(args, 0))),
		"endsWith" => Value::Bool(s.ends_with(&arg_str(args, 0))),
		"includes" => Value::Bool(s.contains(&arg_str(args, 0))),
		"indexOf" => Value::Number(match s.find(&arg_str(args, 0)) {
			Some(byte) => s[..byte].chars().count() as f64,
			None => -1.0,
		}),
		"repeat" => {
			let count = args.first().map_or(0.0, Value::to_number);
			if !(0.0..=10_000.0).contains(&count) {
				return Err(ScriptError::runtime(format!("invalid repeat count {count}")));
			}
			check_len(s.len().saturating_mul(count as usize))?;
			Value::Str(s.repeat(count as usize))
		}
		"replace" => Value::Str(s.replacen(&arg_str(args, 0), &arg_str(args, 1), 1)),
		"replaceAll" => {
			let (from, to) = (arg_str(args, 0), arg_str(args, 1));
			let hits = s.matches(from.as_str()).count();
			check_len((s.len() - hits * from.len()).saturating_add(hits.saturating_mul(to.len())))?;
			Value::Str(s.replace(&from, &to))
		}
		"split" => match args.first() {
			None => Value::List(vec![Value::Str(s.to_string())]),
			Some(sep) => {
				let sep = sep.to_string();
				if sep.is_empty() {
					Value::List(chars.iter().map(|c| Value::Str(c.to_string())).collect())
				} else {
					Value::strings(s.split(sep.as_str()))
				}
			}
		},
		"slice" | "substring" => {
			let (start, end) = slice_bounds(chars.len(), args);
			Value::Str(chars[start..end].iter().collect())
		}
		"charAt" => Value::Str(
			position(args.first().unwrap_or(&Value::Number(0.0)), chars.len())
				.and_then(|i| chars.get(i))
				.map(|c| c.to_string())
				.unwrap_or_default(),
		),
		"padStart" | "padEnd" => {
			let width = args.first().map_or(0.0, Value::to_number).max(0.0);
			if width > MAX_STRING_LEN as f64 {
				return Err(ScriptError::runtime(format!("invalid pad width {width}")));
			}
			let fill = if args.len() > 1 { arg_str(args, 1) } else { " ".to_string() };
			let missing = (width as usize).saturating_sub(chars.len());
			check_len(s.len() + missing * fill.chars().map(char::len_utf8).max().unwrap_or(0))?;
			let pad: String = fill.chars().cycle().take(if fill.is_empty() { 0 } else { missing }).collect();
			Value::Str(if name == "padStart" { format!("{pad}{s}") } else { format!("{s}{pad}") })
		}
		"toString" => Value::Str(s.to_string()),
		_ => return Err(ScriptError::runtime(format!("string has no method '{name}'"))),
	})
}

fn list_method(items: &[Value], name: &str, args: &[Value]) -> Result<Value> {
	Ok(match name {
		"join" => {
			let sep = if args.is_empty() { ",".to_string() } else { arg_str(args, 0) };
			let parts: Vec<String> = items
				.iter()
				.map(|item| if matches!(item, Value::Null) { String::new() } else { item.to_string() })
				.collect();
			check_len(parts.iter().map(String::len).sum::<usize>() + sep.len() * parts.len().saturating_sub(1))?;
			Value::Str(parts.join(&sep))
		}
		"includes" => Value::Bool(args.first().is_some_and(|needle| items.iter().any(|item| item.strict_eq(needle)))),
		"indexOf" => Value::Number(
			args.first()
				.and_then(|needle| items.iter().position(|item| item.strict_eq(needle)))
				.map_or(-1.0, |i| i as f64),
		),
		"slice" => {
			let (start, end) = slice_bounds(items.len(), args);
			Value::List(items[start..end].to_vec())
		}
		"reverse" => Value::List(items.iter().rev().cloned().collect()),
		"concat" => {
			let mut out = items.to_vec();
			for arg in args {
				match arg {
					Value::List(more) => out.extend(more.iter().cloned()),
					other => out.push(other.clone()),
				}
			}
			Value::List(out)
		}
		"toString" => Value::Str(Value::List(items.to_vec()).to_string()),
		_ => return Err(ScriptError::runtime(format!("list has no method '{name}'"))),
	})
}

/// Non-negative integer index, or `None` when out of range or fractional.
fn position(index: &Value, len: usize) -> Option<usize> {
	let n = index.to_number();
	if n < 0.0 || n.fract() != 0.0 || n.is_nan() || n >= len as f64 {
		return None;
	}
	Some(n as usize)
}

/// Resolves `slice(start, end)` arguments, with negative values counting from the end.
fn slice_bounds(len: usize, args: &[Value]) -> (usize, usize) {
	let resolve = |value: Option<&Value>, default: usize| -> usize {
		let Some(value) = value else {
			return default;
		};
		let n = value.to_number();
		if n.is_nan() {
			return 0;
		}
		let n = n.trunc();
		if n < 0.0 {
			len.saturating_sub((-n) as usize)
		} else {
			(n as usize).min(len)
		}
	};
	let start = resolve(args.first(), 0);
	let end = resolve(args.get(1), len);
	(start, end.max(start))
}
