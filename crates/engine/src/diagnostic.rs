use std::fmt;

/// A contained failure, reported once to the user as a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
	/// Name of the template that failed.
	pub template: String,
	pub message: String,
}

impl Diagnostic {
	/// Creates a diagnostic and logs it.
	pub fn warn(template: &str, message: impl fmt::Display) -> Self {
		let message = message.to_string();
		tracing::warn!(template, %message, "template failed");
		Self {
			template: template.to_string(),
			message,
		}
	}
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "template `{}` failed: {}", self.template, self.message)
	}
}
