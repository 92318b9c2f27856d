use pretty_assertions::assert_eq;

use super::*;
use crate::parser::parse_program;

fn run_with(source: &str, t: &[&str]) -> Interpreter {
	let mut interp = Interpreter::new();
	interp.set_global("t", Value::strings(t.iter().copied()));
	interp.set_global("rv", Value::Str(String::new()));
	let program = parse_program(source).unwrap();
	interp.run(&program).unwrap();
	interp
}

fn rv(source: &str, t: &[&str]) -> String {
	run_with(source, t).global("rv").map(Value::to_string).unwrap_or_default()
}

#[test]
fn doubles_numeric_placeholder() {
	assert_eq!(rv("rv = String(Number(t[0])*2)", &["21"]), "42");
	assert_eq!(rv("rv = String(Number(t[0])*2)", &[""]), "0");
	assert_eq!(rv("rv = String(Number(t[0])*2)", &["x"]), "NaN");
}

#[test]
fn plus_concatenates_when_either_side_is_text() {
	assert_eq!(rv("rv = 1 + 2 + 'a'", &[]), "3a");
	assert_eq!(rv("rv = 'a' + 1 + 2", &[]), "a12");
	assert_eq!(rv("rv = t[0] + t[1]", &["x", "y"]), "xy");
}

#[test]
fn logical_operators_return_operands() {
	assert_eq!(rv("rv = t[0] || 'default'", &[""]), "default");
	assert_eq!(rv("rv = t[0] && 'yes'", &["z"]), "yes");
	assert_eq!(rv("rv = t[0] && 'yes'", &[""]), "");
}

#[test]
fn functions_are_hoisted_and_scoped() {
	let source = "
		rv = twice(t[0])
		function twice(s) {
			let out = s + s
			return out
		}
	";
	let interp = run_with(source, &["ab"]);
	assert_eq!(interp.global("rv").map(Value::to_string), Some("abab".into()));
	assert!(interp.global("out").is_none());
}

#[test]
fn assignment_to_undeclared_name_creates_global() {
	let source = "
		function note() { seen = 'yes' }
		note()
		rv = seen
	";
	assert_eq!(rv(source, &[]), "yes");
}

#[test]
fn block_locals_do_not_leak() {
	let source = "
		if (t[0] == 'a') {
			let inner = 1
			rv = 'matched'
		} else {
			rv = 'other'
		}
	";
	let interp = run_with(source, &["a"]);
	assert_eq!(interp.global("rv").map(Value::to_string), Some("matched".into()));
	assert!(interp.global("inner").is_none());
}

#[test]
fn top_level_return_is_reported() {
	let mut interp = Interpreter::new();
	let program = parse_program("return 'x'.toUpperCase()\nrv = 'unreached'").unwrap();
	let value = interp.run(&program).unwrap();
	assert_eq!(value.map(|v| v.to_string()), Some("X".into()));
	assert!(interp.global("rv").is_none());
}

#[test]
fn compound_assignment() {
	assert_eq!(rv("let n = 2\nn *= 5\nn -= 1\nrv = ''\nrv += n", &[]), "9");
}

#[test]
fn string_comparison_is_lexicographic() {
	assert_eq!(rv("rv = String('b' > 'a') + String('10' < '9')", &[]), "truetrue");
	assert_eq!(rv("rv = String(10 < 9)", &[]), "false");
}

#[test]
fn unbounded_recursion_is_an_error() {
	let mut interp = Interpreter::new();
	let program = parse_program("function f(n) { return f(n + 1) }\nf(0)").unwrap();
	let err = interp.run(&program).unwrap_err();
	assert!(err.to_string().contains("call depth"), "{err}");
}

#[test]
fn step_budget_is_enforced() {
	let mut interp = Interpreter::new();
	// Each level fans out twice, far beyond the step budget well before the depth limit.
	let program = parse_program("function f(n) { if (n > 40) { return 0 } return f(n + 1) + f(n + 1) }\nf(0)").unwrap();
	let err = interp.run(&program).unwrap_err();
	assert!(err.to_string().contains("budget"), "{err}");
}

#[test]
fn doubling_a_string_hits_the_length_limit() {
	let mut interp = Interpreter::new();
	let program = parse_program("function grow(s, n) { if (n < 1) { return s } return grow(s + s, n - 1) }\nrv = grow('ab', 60)").unwrap();
	let err = interp.run(&program).unwrap_err();
	assert!(err.to_string().contains("byte limit"), "{err}");

	let mut interp = Interpreter::new();
	let program = parse_program("s = 'ab'.padStart(1e20)").unwrap();
	assert!(matches!(interp.run(&program), Err(ScriptError::Runtime(_))));
}

#[test]
fn undefined_names_are_reference_errors() {
	let mut interp = Interpreter::new();
	let program = parse_program("rv = missing + 1").unwrap();
	assert!(interp.run(&program).unwrap_err().to_string().contains("missing is not defined"));
}

#[test]
fn calling_a_non_function_fails() {
	let mut interp = Interpreter::new();
	let program = parse_program("let x = 3\nx()").unwrap();
	assert!(interp.run(&program).unwrap_err().to_string().contains("x is not a function"));
}

#[test]
fn math_members_are_callable() {
	assert_eq!(rv("rv = Math.max(1, Number(t[0]), 3)", &["7"]), "7");
	assert_eq!(rv("rv = Math.floor(7 / 2)", &[]), "3");
}
