bitflags::bitflags! {
	/// Options from the trailing letters of a snippet header.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct TemplateFlags: u8 {
		/// `A`: expand as soon as the trigger matches.
		const AUTOMATIC = 1 << 0;
		/// `M`: pattern triggers see several preceding lines.
		const MULTILINE = 1 << 1;
		/// `i`: the trigger may end in the middle of a word.
		const IN_WORD = 1 << 2;
		/// `w`: the trigger must be a whole word.
		const WORD_BOUNDARY = 1 << 3;
		/// `b`: the trigger must be the first thing on its line.
		const LINE_START = 1 << 4;
		/// `m`: math-mode template. Carried for hosts only.
		const MATH = 1 << 5;
	}
}

/// How a literal trigger is compared against the text before the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
	Exact,
	InWord,
	WordBoundary,
	LineStart,
}

const LETTERS: [(char, TemplateFlags); 6] = [
	('A', TemplateFlags::AUTOMATIC),
	('M', TemplateFlags::MULTILINE),
	('i', TemplateFlags::IN_WORD),
	('w', TemplateFlags::WORD_BOUNDARY),
	('b', TemplateFlags::LINE_START),
	('m', TemplateFlags::MATH),
];

impl TemplateFlags {
	/// Parses header flag letters. Letters outside `AMiwbm` are ignored.
	pub fn from_letters(letters: &str) -> Self {
		letters
			.chars()
			.filter_map(|c| LETTERS.iter().find(|(letter, _)| *letter == c))
			.fold(Self::empty(), |flags, (_, flag)| flags | *flag)
	}

	/// The header letters for these flags, in canonical order.
	pub fn letters(self) -> String {
		LETTERS.iter().filter(|(_, flag)| self.contains(*flag)).map(|(letter, _)| letter).collect()
	}

	/// The effective literal match mode. In-word wins over word boundary, which wins over line start.
	pub fn match_mode(self) -> MatchMode {
		if self.contains(Self::IN_WORD) {
			MatchMode::InWord
		} else if self.contains(Self::WORD_BOUNDARY) {
			MatchMode::WordBoundary
		} else if self.contains(Self::LINE_START) {
			MatchMode::LineStart
		} else {
			MatchMode::Exact
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn letters_map_to_flags() {
		let flags = TemplateFlags::from_letters("Aiw");
		assert!(flags.contains(TemplateFlags::AUTOMATIC | TemplateFlags::IN_WORD | TemplateFlags::WORD_BOUNDARY));
		assert!(!flags.contains(TemplateFlags::MATH));
		assert_eq!(flags.match_mode(), MatchMode::InWord);
	}

	#[test]
	fn no_mode_letters_means_exact() {
		assert_eq!(TemplateFlags::from_letters("AMm").match_mode(), MatchMode::Exact);
		assert_eq!(TemplateFlags::from_letters("bw").match_mode(), MatchMode::WordBoundary);
	}

	#[test]
	fn letters_are_canonical() {
		assert_eq!(TemplateFlags::from_letters("wAmx").letters(), "Awm");
		assert_eq!(TemplateFlags::empty().letters(), "");
	}
}
