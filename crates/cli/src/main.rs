//! hsnip command line tool.
//!
//! Checks template files for errors, lists the templates that apply to a
//! language, and runs one expansion against a line of text.

mod cli;
mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use commands::ExpandArgs;
use hsnip_config::Config;

fn main() -> Result<ExitCode> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let config = match &cli.config {
		Some(path) => Config::load(path)?,
		None => Config::discover()?,
	};
	let dir: PathBuf = cli
		.dir
		.or_else(|| config.snippet_dir())
		.context("no template directory configured; pass --dir")?;
	tracing::debug!(dir = %dir.display(), "template directory");

	let mut out = std::io::stdout().lock();
	match cli.command {
		Command::Check { files } => {
			if commands::check(&dir, &files, &mut out)? {
				return Ok(ExitCode::FAILURE);
			}
		}
		Command::List { language } => commands::list(&dir, language.as_deref(), &mut out)?,
		Command::Expand {
			language,
			text,
			fills,
			selection,
			scopes,
		} => {
			let args = ExpandArgs {
				language: &language,
				text: &text,
				fills: &fills,
				selection: &selection,
				scopes: &scopes,
				multiline_context: u32::try_from(config.multiline_context).unwrap_or(u32::MAX),
			};
			commands::expand(&dir, &args, &mut out)?;
		}
	}
	Ok(ExitCode::SUCCESS)
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("hsnip=debug,hsnip_engine=debug,hsnip_template=debug,warn")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}
