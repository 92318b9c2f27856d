//! Syntax tree for the script language.

use std::sync::Arc;

/// Binary operators, loosest binding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
	Or,
	And,
	Equal,
	NotEqual,
	Less,
	LessEqual,
	Greater,
	GreaterEqual,
	Add,
	Sub,
	Mul,
	Div,
	Rem,
}

impl BinaryOp {
	/// Left and right binding power for the Pratt parser.
	pub fn binding_power(self) -> (u8, u8) {
		match self {
			BinaryOp::Or => (3, 4),
			BinaryOp::And => (5, 6),
			BinaryOp::Equal | BinaryOp::NotEqual => (7, 8),
			BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => (9, 10),
			BinaryOp::Add | BinaryOp::Sub => (11, 12),
			BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => (13, 14),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
	Neg,
	Plus,
	Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
	Set,
	Add,
	Sub,
	Mul,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
	Null,
	Bool(bool),
	Number(f64),
	Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
	Literal(Literal),
	List(Vec<Expr>),
	Ident(String),
	Member(Box<Expr>, String),
	Index(Box<Expr>, Box<Expr>),
	Call(Box<Expr>, Vec<Expr>),
	Unary(UnaryOp, Box<Expr>),
	Binary(BinaryOp, Box<Expr>, Box<Expr>),
	Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
}

/// A named function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
	pub name: String,
	pub params: Vec<String>,
	pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
	Let(String, Option<Expr>),
	Assign(String, AssignOp, Expr),
	If(Expr, Vec<Stmt>, Vec<Stmt>),
	Function(Arc<FunctionDecl>),
	Return(Option<Expr>),
	Expr(Expr),
}

/// A parsed script: a list of top-level statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
	pub stmts: Vec<Stmt>,
}

impl Program {
	/// Top-level function declarations, which are visible before they appear.
	pub fn functions(&self) -> impl Iterator<Item = &Arc<FunctionDecl>> {
		self.stmts.iter().filter_map(|stmt| match stmt {
			Stmt::Function(decl) => Some(decl),
			_ => None,
		})
	}
}
