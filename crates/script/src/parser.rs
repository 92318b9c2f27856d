//! Statement parser with Pratt parsing for expressions.

use std::sync::Arc;

use crate::ast::{AssignOp, BinaryOp, Expr, FunctionDecl, Literal, Program, Stmt, UnaryOp};
use crate::error::{Result, ScriptError};
use crate::lexer::{Token, TokenKind, tokenize};

const POSTFIX_BP: u8 = 20;
const PREFIX_BP: u8 = 15;
const TERNARY_BP: u8 = 2;

/// Parses a sequence of statements.
pub fn parse_program(source: &str) -> Result<Program> {
	let mut parser = Parser::new(tokenize(source)?);
	let stmts = parser.statements(&TokenKind::Eof)?;
	Ok(Program { stmts })
}

/// Parses a single expression; trailing separators are allowed.
pub fn parse_expression(source: &str) -> Result<Expr> {
	let mut parser = Parser::new(tokenize(source)?);
	parser.skip_separators();
	let expr = parser.expr(0)?;
	parser.skip_separators();
	parser.expect(&TokenKind::Eof, "end of expression")?;
	Ok(expr)
}

struct Parser {
	tokens: Vec<Token>,
	pos: usize,
	/// Depth of open parentheses/brackets; newlines are insignificant inside them.
	nesting: usize,
}

impl Parser {
	fn new(tokens: Vec<Token>) -> Self {
		Self { tokens, pos: 0, nesting: 0 }
	}

	fn current(&mut self) -> &Token {
		if self.nesting > 0 {
			while self.tokens[self.pos].kind == TokenKind::Newline {
				self.pos += 1;
			}
		}
		&self.tokens[self.pos]
	}

	fn peek(&mut self) -> TokenKind {
		self.current().kind.clone()
	}

	fn check(&mut self, kind: &TokenKind) -> bool {
		&self.current().kind == kind
	}

	fn advance(&mut self) -> Token {
		let token = self.current().clone();
		if token.kind != TokenKind::Eof {
			self.pos += 1;
		}
		token
	}

	fn eat(&mut self, kind: &TokenKind) -> bool {
		if self.check(kind) {
			self.advance();
			true
		} else {
			false
		}
	}

	fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<Token> {
		if self.check(kind) {
			Ok(self.advance())
		} else {
			Err(self.error(format!("expected {what}")))
		}
	}

	fn error(&mut self, message: impl Into<String>) -> ScriptError {
		let token = self.current();
		ScriptError::Parse {
			line: token.line,
			column: token.column,
			message: message.into(),
		}
	}

	fn skip_separators(&mut self) {
		while matches!(self.peek(), TokenKind::Newline | TokenKind::Semicolon) {
			self.advance();
		}
	}

	fn skip_newlines(&mut self) {
		while self.check(&TokenKind::Newline) {
			self.advance();
		}
	}

	fn statements(&mut self, end: &TokenKind) -> Result<Vec<Stmt>> {
		let mut stmts = Vec::new();
		loop {
			self.skip_separators();
			if self.check(end) || self.check(&TokenKind::Eof) {
				return Ok(stmts);
			}
			stmts.push(self.statement()?);
			if self.pos > 0 && self.tokens[self.pos - 1].kind == TokenKind::RightBrace {
				continue;
			}
			match self.peek() {
				TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof => {}
				ref kind if kind == end => {}
				_ => return Err(self.error("expected end of statement")),
			}
		}
	}

	fn block(&mut self) -> Result<Vec<Stmt>> {
		self.expect(&TokenKind::LeftBrace, "'{'")?;
		let stmts = self.statements(&TokenKind::RightBrace)?;
		self.expect(&TokenKind::RightBrace, "'}'")?;
		Ok(stmts)
	}

	fn branch(&mut self) -> Result<Vec<Stmt>> {
		self.skip_newlines();
		if self.check(&TokenKind::LeftBrace) {
			self.block()
		} else {
			Ok(vec![self.statement()?])
		}
	}

	fn statement(&mut self) -> Result<Stmt> {
		match self.peek() {
			TokenKind::Let => {
				self.advance();
				let name = self.ident("variable name")?;
				let init = if self.eat(&TokenKind::Assign) { Some(self.expr(0)?) } else { None };
				Ok(Stmt::Let(name, init))
			}
			TokenKind::If => {
				self.advance();
				self.expect(&TokenKind::LeftParen, "'(' after 'if'")?;
				self.nesting += 1;
				let cond = self.expr(0)?;
				self.nesting -= 1;
				self.expect(&TokenKind::RightParen, "')'")?;
				let then = self.branch()?;

				let save = self.pos;
				self.skip_separators();
				let otherwise = if self.eat(&TokenKind::Else) {
					self.branch()?
				} else {
					self.pos = save;
					Vec::new()
				};
				Ok(Stmt::If(cond, then, otherwise))
			}
			TokenKind::Function => {
				self.advance();
				let name = self.ident("function name")?;
				self.expect(&TokenKind::LeftParen, "'('")?;
				self.nesting += 1;
				let mut params = Vec::new();
				while !self.check(&TokenKind::RightParen) {
					params.push(self.ident("parameter name")?);
					if !self.eat(&TokenKind::Comma) {
						break;
					}
				}
				self.nesting -= 1;
				self.expect(&TokenKind::RightParen, "')'")?;
				self.skip_newlines();
				let body = self.block()?;
				Ok(Stmt::Function(Arc::new(FunctionDecl { name, params, body })))
			}
			TokenKind::Return => {
				self.advance();
				let value = match self.peek() {
					TokenKind::Newline | TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof => None,
					_ => Some(self.expr(0)?),
				};
				Ok(Stmt::Return(value))
			}
			TokenKind::Ident(name) => {
				let op = match self.tokens.get(self.pos + 1).map(|t| &t.kind) {
					Some(TokenKind::Assign) => Some(AssignOp::Set),
					Some(TokenKind::PlusAssign) => Some(AssignOp::Add),
					Some(TokenKind::MinusAssign) => Some(AssignOp::Sub),
					Some(TokenKind::StarAssign) => Some(AssignOp::Mul),
					_ => None,
				};
				match op {
					Some(op) => {
						self.advance();
						self.advance();
						Ok(Stmt::Assign(name, op, self.expr(0)?))
					}
					None => Ok(Stmt::Expr(self.expr(0)?)),
				}
			}
			_ => Ok(Stmt::Expr(self.expr(0)?)),
		}
	}

	fn ident(&mut self, what: &str) -> Result<String> {
		match self.peek() {
			TokenKind::Ident(name) => {
				self.advance();
				Ok(name)
			}
			_ => Err(self.error(format!("expected {what}"))),
		}
	}

	fn expr(&mut self, min_bp: u8) -> Result<Expr> {
		let mut lhs = self.prefix()?;

		loop {
			match self.peek() {
				TokenKind::LeftParen if POSTFIX_BP >= min_bp => {
					self.advance();
					let args = self.list(&TokenKind::RightParen, "')'")?;
					lhs = Expr::Call(Box::new(lhs), args);
				}
				TokenKind::LeftBracket if POSTFIX_BP >= min_bp => {
					self.advance();
					self.nesting += 1;
					let index = self.expr(0)?;
					self.nesting -= 1;
					self.expect(&TokenKind::RightBracket, "']'")?;
					lhs = Expr::Index(Box::new(lhs), Box::new(index));
				}
				TokenKind::Dot if POSTFIX_BP >= min_bp => {
					self.advance();
					let name = self.ident("property name after '.'")?;
					lhs = Expr::Member(Box::new(lhs), name);
				}
				TokenKind::Question if TERNARY_BP >= min_bp => {
					self.advance();
					self.nesting += 1;
					let then = self.expr(0)?;
					self.expect(&TokenKind::Colon, "':' in conditional expression")?;
					self.nesting -= 1;
					let otherwise = self.expr(TERNARY_BP)?;
					lhs = Expr::Ternary(Box::new(lhs), Box::new(then), Box::new(otherwise));
				}
				kind => {
					let Some(op) = binary_op(&kind) else {
						break;
					};
					let (l_bp, r_bp) = op.binding_power();
					if l_bp < min_bp {
						break;
					}
					self.advance();
					let rhs = self.expr(r_bp)?;
					lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
				}
			}
		}

		Ok(lhs)
	}

	fn prefix(&mut self) -> Result<Expr> {
		let token = self.advance();
		match token.kind {
			TokenKind::Number(n) => Ok(Expr::Literal(Literal::Number(n))),
			TokenKind::Str(s) => Ok(Expr::Literal(Literal::Str(s))),
			TokenKind::True => Ok(Expr::Literal(Literal::Bool(true))),
			TokenKind::False => Ok(Expr::Literal(Literal::Bool(false))),
			TokenKind::Null => Ok(Expr::Literal(Literal::Null)),
			TokenKind::Ident(name) => Ok(Expr::Ident(name)),
			TokenKind::LeftParen => {
				self.nesting += 1;
				let inner = self.expr(0)?;
				self.nesting -= 1;
				self.expect(&TokenKind::RightParen, "')'")?;
				Ok(inner)
			}
			TokenKind::LeftBracket => Ok(Expr::List(self.list(&TokenKind::RightBracket, "']'")?)),
			TokenKind::Minus => Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.expr(PREFIX_BP)?))),
			TokenKind::Plus => Ok(Expr::Unary(UnaryOp::Plus, Box::new(self.expr(PREFIX_BP)?))),
			TokenKind::Bang => Ok(Expr::Unary(UnaryOp::Not, Box::new(self.expr(PREFIX_BP)?))),
			_ => Err(ScriptError::Parse {
				line: token.line,
				column: token.column,
				message: "expected expression".into(),
			}),
		}
	}

	/// Comma-separated expressions up to `close`; the opening token is already consumed.
	fn list(&mut self, close: &TokenKind, what: &str) -> Result<Vec<Expr>> {
		self.nesting += 1;
		let mut items = Vec::new();
		while !self.check(close) {
			items.push(self.expr(0)?);
			if !self.eat(&TokenKind::Comma) {
				break;
			}
		}
		self.nesting -= 1;
		self.expect(close, what)?;
		Ok(items)
	}
}

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
	Some(match kind {
		TokenKind::OrOr => BinaryOp::Or,
		TokenKind::AndAnd => BinaryOp::And,
		TokenKind::Equal => BinaryOp::Equal,
		TokenKind::NotEqual => BinaryOp::NotEqual,
		TokenKind::Less => BinaryOp::Less,
		TokenKind::LessEqual => BinaryOp::LessEqual,
		TokenKind::Greater => BinaryOp::Greater,
		TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
		TokenKind::Plus => BinaryOp::Add,
		TokenKind::Minus => BinaryOp::Sub,
		TokenKind::Star => BinaryOp::Mul,
		TokenKind::Slash => BinaryOp::Div,
		TokenKind::Percent => BinaryOp::Rem,
		_ => return None,
	})
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn num(n: f64) -> Expr {
		Expr::Literal(Literal::Number(n))
	}

	fn ident(name: &str) -> Expr {
		Expr::Ident(name.into())
	}

	#[test]
	fn multiplication_binds_tighter_than_addition() {
		let expr = parse_expression("1 + 2 * 3").unwrap();
		assert_eq!(
			expr,
			Expr::Binary(
				BinaryOp::Add,
				Box::new(num(1.0)),
				Box::new(Expr::Binary(BinaryOp::Mul, Box::new(num(2.0)), Box::new(num(3.0))))
			)
		);
	}

	#[test]
	fn postfix_chains_apply_left_to_right() {
		let expr = parse_expression("m[1].toUpperCase()").unwrap();
		assert_eq!(
			expr,
			Expr::Call(
				Box::new(Expr::Member(
					Box::new(Expr::Index(Box::new(ident("m")), Box::new(num(1.0)))),
					"toUpperCase".into()
				)),
				vec![]
			)
		);
	}

	#[test]
	fn ternary_is_right_associative() {
		let expr = parse_expression("a ? b : c ? d : e").unwrap();
		let Expr::Ternary(_, _, otherwise) = expr else {
			panic!("expected ternary");
		};
		assert!(matches!(*otherwise, Expr::Ternary(..)));
	}

	#[test]
	fn newlines_separate_statements_but_not_arguments() {
		let program = parse_program("rv = join(\n  a,\n  b\n)\nrv += 'x'").unwrap();
		assert_eq!(program.stmts.len(), 2);
		assert!(matches!(program.stmts[1], Stmt::Assign(ref name, AssignOp::Add, _) if name == "rv"));
	}

	#[test]
	fn parses_functions_and_if_else() {
		let source = "function twice(x) {\n  return x * 2\n}\nif (t[0] == '') { rv = 'none' }\nelse rv = twice(Number(t[0]))";
		let program = parse_program(source).unwrap();
		assert_eq!(program.functions().count(), 1);
		let Stmt::If(_, then, otherwise) = &program.stmts[1] else {
			panic!("expected if statement");
		};
		assert_eq!(then.len(), 1);
		assert_eq!(otherwise.len(), 1);
	}

	#[test]
	fn rejects_two_expressions_on_one_line() {
		let err = parse_program("a b").unwrap_err();
		assert_eq!(
			err,
			ScriptError::Parse {
				line: 1,
				column: 3,
				message: "expected end of statement".into()
			}
		);
	}

	#[test]
	fn expression_parse_rejects_trailing_tokens() {
		assert!(parse_expression("a )").is_err());
	}
}
