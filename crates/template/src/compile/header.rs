use std::sync::LazyLock;

use regex::Regex;

use crate::flags::TemplateFlags;
use crate::template::Pattern;

static HEADER: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#"^snippet\s+(?:`([^`]+)`|(\S+))(?:\s+"([^"]*)")?(?:\s+([AMiwbm]+))?\s*$"#).expect("header pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum TriggerSource {
	Literal(String),
	Pattern(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Header {
	pub trigger: TriggerSource,
	pub description: String,
	pub flags: TemplateFlags,
}

impl Header {
	pub fn label(&self) -> &str {
		match &self.trigger {
			TriggerSource::Literal(text) | TriggerSource::Pattern(text) => text,
		}
	}
}

/// Whether `line` starts with the `snippet` keyword, well-formed or not.
pub(super) fn is_header(line: &str) -> bool {
	line.strip_prefix("snippet")
		.is_some_and(|rest| rest.trim_end().is_empty() || rest.starts_with(char::is_whitespace))
}

pub(super) fn parse_header(line: &str) -> Option<Header> {
	let caps = HEADER.captures(line.trim_end())?;
	let trigger = match (caps.get(1), caps.get(2)) {
		(Some(pattern), _) => TriggerSource::Pattern(pattern.as_str().to_string()),
		(None, Some(literal)) => TriggerSource::Literal(literal.as_str().to_string()),
		(None, None) => return None,
	};
	Some(Header {
		trigger,
		description: caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
		flags: caps.get(4).map(|m| TemplateFlags::from_letters(m.as_str())).unwrap_or_default(),
	})
}

/// Compiles a pattern trigger, anchoring it at the end of the context.
pub(super) fn compile_pattern(source: &str) -> Result<Pattern, fancy_regex::Error> {
	let anchored = if ends_with_anchor(source) {
		format!("(?m){source}")
	} else {
		format!("(?m)(?:{source})$")
	};
	Ok(Pattern {
		source: source.to_string(),
		regex: fancy_regex::Regex::new(&anchored)?,
	})
}

/// A trailing `$` that is not itself escaped.
fn ends_with_anchor(source: &str) -> bool {
	let Some(rest) = source.strip_suffix('$') else {
		return false;
	};
	rest.chars().rev().take_while(|&c| c == '\\').count() % 2 == 0
}
