//! Configuration for hsnip.
//!
//! Configuration is a small TOML file:
//!
//! ```toml
//! # Lines of lookback for `M` pattern triggers.
//! multiline_context = 20
//! # Directory holding `*.hsnips` files. Relative paths resolve against the
//! # directory of the config file.
//! snippet_dir = "snippets"
//! ```
//!
//! # Configuration Files
//!
//! hsnip looks for configuration in these locations (in order):
//!
//! 1. The file named by `$HSNIP_CONFIG`
//! 2. `$XDG_CONFIG_HOME/hsnip/hsnip.toml` (or the platform config directory)
//!
//! The first file that exists wins. Without one, defaults apply and
//! templates are read from `<config dir>/hsnip/snippets`.

pub mod error;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub use error::{ConfigError, Result};
use serde::Deserialize;

/// Default number of preceding lines visible to multi-line pattern triggers.
pub const DEFAULT_MULTILINE_CONTEXT: usize = 20;

/// Parsed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Lookback window, in lines, for `M` pattern triggers.
	pub multiline_context: usize,
	/// Directory holding `*.hsnips` files.
	pub snippet_dir: Option<PathBuf>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			multiline_context: DEFAULT_MULTILINE_CONTEXT,
			snippet_dir: None,
		}
	}
}

impl Config {
	/// Parse a TOML string into a [`Config`].
	pub fn parse(input: &str) -> Result<Self> {
		Ok(toml::from_str(input)?)
	}

	/// Load configuration from a file. A relative `snippet_dir` is resolved
	/// against the file's directory.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
			path: path.to_path_buf(),
			error: e,
		})?;
		let mut config = Self::parse(&content)?;
		if let Some(dir) = &config.snippet_dir
			&& dir.is_relative()
			&& let Some(parent) = path.parent()
		{
			config.snippet_dir = Some(parent.join(dir));
		}
		Ok(config)
	}

	/// Loads the first configuration file found on [`config_search_paths`],
	/// or the defaults when there is none.
	pub fn discover() -> Result<Self> {
		match config_search_paths().into_iter().find(|path| path.is_file()) {
			Some(path) => {
				tracing::debug!(path = %path.display(), "loading config");
				Self::load(path)
			}
			None => {
				tracing::debug!("no config file found, using defaults");
				Ok(Self::default())
			}
		}
	}

	/// The configured template directory, or the default one.
	pub fn snippet_dir(&self) -> Option<PathBuf> {
		self.snippet_dir.clone().or_else(default_snippet_dir)
	}
}

/// Returns candidate config files. Order: `HSNIP_CONFIG` env, user config dir.
pub fn config_search_paths() -> Vec<PathBuf> {
	search_paths(std::env::var_os("HSNIP_CONFIG"), config_dir())
}

/// Default template directory: `<config dir>/hsnip/snippets`.
pub fn default_snippet_dir() -> Option<PathBuf> {
	config_dir().map(|dir| dir.join("hsnip").join("snippets"))
}

fn search_paths(explicit: Option<OsString>, config_dir: Option<PathBuf>) -> Vec<PathBuf> {
	let mut paths = Vec::new();
	if let Some(explicit) = explicit.filter(|path| !path.is_empty()) {
		paths.push(PathBuf::from(explicit));
	}
	if let Some(dir) = config_dir {
		paths.push(dir.join("hsnip").join("hsnip.toml"));
	}
	paths
}

fn config_dir() -> Option<PathBuf> {
	std::env::var_os("XDG_CONFIG_HOME")
		.filter(|dir| !dir.is_empty())
		.map(PathBuf::from)
		.or_else(dirs::config_dir)
}

#[cfg(test)]
mod tests {
	use std::fs;

	use super::*;

	#[test]
	fn empty_input_gives_defaults() {
		assert_eq!(Config::parse("").unwrap(), Config::default());
		assert_eq!(Config::default().multiline_context, 20);
	}

	#[test]
	fn parses_fields() {
		let config = Config::parse("multiline_context = 5\nsnippet_dir = \"/tmp/snips\"\n").unwrap();
		assert_eq!(config.multiline_context, 5);
		assert_eq!(config.snippet_dir(), Some(PathBuf::from("/tmp/snips")));
	}

	#[test]
	fn unknown_keys_are_rejected() {
		assert!(matches!(Config::parse("lookback = 3"), Err(ConfigError::Toml(_))));
	}

	#[test]
	fn relative_snippet_dir_resolves_against_config_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("hsnip.toml");
		fs::write(&path, "snippet_dir = \"snips\"\n").unwrap();

		let config = Config::load(&path).unwrap();
		assert_eq!(config.snippet_dir, Some(dir.path().join("snips")));
	}

	#[test]
	fn missing_file_is_an_io_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
		assert!(matches!(err, ConfigError::Io { .. }));
	}

	#[test]
	fn explicit_path_comes_first() {
		let paths = search_paths(Some("/etc/hsnip.toml".into()), Some(PathBuf::from("/home/u/.config")));
		assert_eq!(paths, vec![PathBuf::from("/etc/hsnip.toml"), PathBuf::from("/home/u/.config/hsnip/hsnip.toml")]);
		assert_eq!(search_paths(Some(OsString::new()), None), Vec::<PathBuf>::new());
	}
}
