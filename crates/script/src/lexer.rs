//! Tokenizer for the script language.

use crate::error::{Result, ScriptError};

/// Kinds of tokens produced by [`tokenize`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
	Number(f64),
	Str(String),
	Ident(String),

	Let,
	If,
	Else,
	Function,
	Return,
	True,
	False,
	Null,

	LeftParen,
	RightParen,
	LeftBracket,
	RightBracket,
	LeftBrace,
	RightBrace,
	Comma,
	Dot,
	Semicolon,
	Newline,
	Question,
	Colon,

	Plus,
	Minus,
	Star,
	Slash,
	Percent,
	Bang,
	Assign,
	PlusAssign,
	MinusAssign,
	StarAssign,
	Equal,
	NotEqual,
	Less,
	LessEqual,
	Greater,
	GreaterEqual,
	AndAnd,
	OrOr,

	Eof,
}

/// A token with its 1-based source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
	pub kind: TokenKind,
	pub line: u32,
	pub column: u32,
}

/// Character cursor that tracks line and column.
struct Cursor<'src> {
	rest: std::iter::Peekable<std::str::Chars<'src>>,
	line: u32,
	column: u32,
}

impl<'src> Cursor<'src> {
	fn new(source: &'src str) -> Self {
		Self {
			rest: source.chars().peekable(),
			line: 1,
			column: 1,
		}
	}

	fn peek(&mut self) -> Option<char> {
		self.rest.peek().copied()
	}

	fn advance(&mut self) -> Option<char> {
		let ch = self.rest.next()?;
		if ch == '\n' {
			self.line += 1;
			self.column = 1;
		} else {
			self.column += 1;
		}
		Some(ch)
	}

	fn eat(&mut self, expected: char) -> bool {
		if self.peek() == Some(expected) {
			self.advance();
			true
		} else {
			false
		}
	}

	fn error(&self, message: impl Into<String>) -> ScriptError {
		ScriptError::Parse {
			line: self.line,
			column: self.column,
			message: message.into(),
		}
	}
}

/// Splits `source` into tokens, ending with [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
	let mut cursor = Cursor::new(source);
	let mut tokens = Vec::new();

	loop {
		skip_trivia(&mut cursor)?;
		let (line, column) = (cursor.line, cursor.column);
		let Some(ch) = cursor.advance() else {
			tokens.push(Token {
				kind: TokenKind::Eof,
				line,
				column,
			});
			return Ok(tokens);
		};

		let kind = match ch {
			'\n' => TokenKind::Newline,
			'(' => TokenKind::LeftParen,
			')' => TokenKind::RightParen,
			'[' => TokenKind::LeftBracket,
			']' => TokenKind::RightBracket,
			'{' => TokenKind::LeftBrace,
			'}' => TokenKind::RightBrace,
			',' => TokenKind::Comma,
			';' => TokenKind::Semicolon,
			'?' => TokenKind::Question,
			':' => TokenKind::Colon,
			'%' => TokenKind::Percent,
			'.' if cursor.peek().is_some_and(|c| c.is_ascii_digit()) => number(&mut cursor, ch)?,
			'.' => TokenKind::Dot,
			'+' if cursor.eat('=') => TokenKind::PlusAssign,
			'+' => TokenKind::Plus,
			'-' if cursor.eat('=') => TokenKind::MinusAssign,
			'-' => TokenKind::Minus,
			'*' if cursor.eat('=') => TokenKind::StarAssign,
			'*' => TokenKind::Star,
			'/' => TokenKind::Slash,
			'!' if cursor.eat('=') => {
				cursor.eat('=');
				TokenKind::NotEqual
			}
			'!' => TokenKind::Bang,
			'=' if cursor.eat('=') => {
				cursor.eat('=');
				TokenKind::Equal
			}
			'=' => TokenKind::Assign,
			'<' if cursor.eat('=') => TokenKind::LessEqual,
			'<' => TokenKind::Less,
			'>' if cursor.eat('=') => TokenKind::GreaterEqual,
			'>' => TokenKind::Greater,
			'&' if cursor.eat('&') => TokenKind::AndAnd,
			'|' if cursor.eat('|') => TokenKind::OrOr,
			'"' | '\'' | '`' => string(&mut cursor, ch)?,
			c if c.is_ascii_digit() => number(&mut cursor, c)?,
			c if is_ident_start(c) => ident(&mut cursor, c),
			other => return Err(ScriptError::Parse {
				line,
				column,
				message: format!("unexpected character '{other}'"),
			}),
		};
		tokens.push(Token { kind, line, column });
	}
}

fn skip_trivia(cursor: &mut Cursor<'_>) -> Result<()> {
	loop {
		match cursor.peek() {
			Some(' ' | '\t' | '\r') => {
				cursor.advance();
			}
			Some('/') => {
				let mut ahead = cursor.rest.clone();
				ahead.next();
				match ahead.next() {
					Some('/') => {
						while cursor.peek().is_some_and(|c| c != '\n') {
							cursor.advance();
						}
					}
					Some('*') => {
						cursor.advance();
						cursor.advance();
						loop {
							match cursor.advance() {
								Some('*') if cursor.eat('/') => break,
								Some(_) => {}
								None => return Err(cursor.error("unterminated block comment")),
							}
						}
					}
					_ => return Ok(()),
				}
			}
			_ => return Ok(()),
		}
	}
}

fn number(cursor: &mut Cursor<'_>, first: char) -> Result<TokenKind> {
	let mut text = String::from(first);
	while let Some(c) = cursor.peek() {
		if c.is_ascii_digit() || c == '.' || c == '_' {
			cursor.advance();
			if c != '_' {
				text.push(c);
			}
		} else if (c == 'e' || c == 'E') && !text.contains(['e', 'E']) {
			cursor.advance();
			text.push(c);
			if let Some(sign @ ('+' | '-')) = cursor.peek() {
				cursor.advance();
				text.push(sign);
			}
		} else {
			break;
		}
	}
	text.parse::<f64>()
		.map(TokenKind::Number)
		.map_err(|_| cursor.error(format!("invalid number literal '{text}'")))
}

fn string(cursor: &mut Cursor<'_>, quote: char) -> Result<TokenKind> {
	let mut text = String::new();
	loop {
		match cursor.advance() {
			None => return Err(cursor.error("unterminated string literal")),
			Some('\n') if quote != '`' => return Err(cursor.error("unterminated string literal")),
			Some(c) if c == quote => return Ok(TokenKind::Str(text)),
			Some('\\') => {
				let escaped = cursor.advance().ok_or_else(|| cursor.error("unterminated string literal"))?;
				text.push(match escaped {
					'n' => '\n',
					't' => '\t',
					'r' => '\r',
					'0' => '\0',
					other => other,
				});
			}
			Some(c) => text.push(c),
		}
	}
}

fn ident(cursor: &mut Cursor<'_>, first: char) -> TokenKind {
	let mut text = String::from(first);
	while let Some(c) = cursor.peek() {
		if is_ident_continue(c) {
			cursor.advance();
			text.push(c);
		} else {
			break;
		}
	}
	match text.as_str() {
		"let" | "const" | "var" => TokenKind::Let,
		"if" => TokenKind::If,
		"else" => TokenKind::Else,
		"function" => TokenKind::Function,
		"return" => TokenKind::Return,
		"true" => TokenKind::True,
		"false" => TokenKind::False,
		"null" | "undefined" => TokenKind::Null,
		_ => TokenKind::Ident(text),
	}
}

fn is_ident_start(c: char) -> bool {
	c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
	c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
	use super::*;

	fn kinds(source: &str) -> Vec<TokenKind> {
		tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
	}

	#[test]
	fn tokenizes_assignment_with_call() {
		assert_eq!(
			kinds("rv = String(t[0])"),
			vec![
				TokenKind::Ident("rv".into()),
				TokenKind::Assign,
				TokenKind::Ident("String".into()),
				TokenKind::LeftParen,
				TokenKind::Ident("t".into()),
				TokenKind::LeftBracket,
				TokenKind::Number(0.0),
				TokenKind::RightBracket,
				TokenKind::RightParen,
				TokenKind::Eof,
			]
		);
	}

	#[test]
	fn strict_and_loose_equality_share_a_token() {
		assert_eq!(kinds("a === b"), kinds("a == b"));
		assert_eq!(kinds("a !== b"), kinds("a != b"));
	}

	#[test]
	fn string_escapes_are_decoded() {
		assert_eq!(kinds(r#"'it\'s\n'"#)[0], TokenKind::Str("it's\n".into()));
	}

	#[test]
	fn comments_are_skipped_but_newlines_kept() {
		assert_eq!(
			kinds("a // note\n/* block */ b"),
			vec![
				TokenKind::Ident("a".into()),
				TokenKind::Newline,
				TokenKind::Ident("b".into()),
				TokenKind::Eof
			]
		);
	}

	#[test]
	fn reports_location_of_bad_character() {
		let err = tokenize("a\n  #").unwrap_err();
		assert_eq!(
			err,
			ScriptError::Parse {
				line: 2,
				column: 3,
				message: "unexpected character '#'".into()
			}
		);
	}
}
