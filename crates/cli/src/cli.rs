//! CLI schema for the hsnip binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "hsnip")]
#[command(about = "Compile, list and try out live snippet templates")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Configuration file (defaults to $HSNIP_CONFIG, then the user config dir)
	#[arg(short, long, value_name = "PATH", global = true)]
	pub config: Option<PathBuf>,

	/// Template directory, overriding the configured one
	#[arg(short, long, value_name = "DIR", global = true)]
	pub dir: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Compile template files and report every error
	Check {
		/// Files to check (defaults to every file in the template directory)
		files: Vec<PathBuf>,
	},
	/// List templates, highest priority first
	List {
		/// Only templates that apply to this language
		language: Option<String>,
	},
	/// Expand the template triggered at the end of TEXT and print the result
	Expand {
		/// Language whose templates are eligible
		language: String,

		/// Text before the cursor, ending with the trigger
		text: String,

		/// Text typed into each tabstop, in navigation order
		#[arg(short, long = "fill", value_name = "TEXT")]
		fills: Vec<String>,

		/// Text substituted for ${VISUAL}
		#[arg(short, long, value_name = "TEXT", default_value = "")]
		selection: String,

		/// Scope names visible to context filters (comma-separated)
		#[arg(long, value_delimiter = ',')]
		scopes: Vec<String>,
	},
}
