//! The pure function a template body compiles to.

use std::sync::Arc;

use crate::error::EvalError;
use crate::evaluator::BlockProgram;

/// Arguments of one generator call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorInput {
	/// Placeholder texts, `placeholder_texts[id - 1]` for id `id`.
	pub placeholder_texts: Vec<String>,
	/// Match groups captured by the trigger, group 0 first.
	pub match_groups: Vec<String>,
	pub workspace_id: String,
	pub file_id: String,
}

impl GeneratorInput {
	/// Input with `count` empty placeholder texts.
	pub fn empty(count: usize, match_groups: Vec<String>) -> Self {
		Self {
			placeholder_texts: vec![String::new(); count],
			match_groups,
			..Self::default()
		}
	}
}

/// A piece of generator output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
	/// Literal text, possibly containing placeholder markers.
	Text(String),
	/// Output of the code span with this index.
	Block(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorOutput {
	pub segments: Vec<Segment>,
	/// One raw string per code span, in appearance order.
	pub blocks: Vec<String>,
}

/// Body node of the compiled intermediate form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
	Text(String),
	Block(usize),
}

/// Interprets a template body: literal nodes are copied and code spans run
/// through the compiled [`BlockProgram`].
#[derive(Debug, Clone)]
pub struct Generator {
	nodes: Arc<[Node]>,
	block_count: usize,
	program: Arc<dyn BlockProgram>,
}

impl Generator {
	pub fn new(nodes: Vec<Node>, block_count: usize, program: Arc<dyn BlockProgram>) -> Self {
		Self {
			nodes: nodes.into(),
			block_count,
			program,
		}
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn block_count(&self) -> usize {
		self.block_count
	}

	/// Produces segments and block outputs. Either everything succeeds or nothing is returned.
	pub fn invoke(&self, input: &GeneratorInput) -> Result<GeneratorOutput, EvalError> {
		let blocks = self.program.run(input)?;
		if blocks.len() != self.block_count {
			return Err(EvalError::BlockCount {
				expected: self.block_count,
				actual: blocks.len(),
			});
		}
		let segments = self
			.nodes
			.iter()
			.map(|node| match node {
				Node::Text(text) => Segment::Text(text.clone()),
				Node::Block(index) => Segment::Block(*index),
			})
			.collect();
		Ok(GeneratorOutput { segments, blocks })
	}
}
