//! django-codegen CLI library
//!
//! Argument parsing, terminal prompts and diff previews around the
//! [`django_codegen`] engine. The binary is a thin wrapper over [`run`].

#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod preview;
pub mod prompt;

use anyhow::{Context, Result};
use console::style;
use django_codegen::GeneratorConfig;
use tracing::debug;

pub use cli::{Cli, Command, ModelArgs};
pub use error::{exit_code, CliError};

/// Run a parsed command line and return the process exit code
///
/// Errors are printed to stderr here; the caller only exits.
#[must_use]
pub fn run(cli: &Cli) -> i32 {
    match dispatch(cli) {
        Ok(code) => code,
        Err(err) => {
            report(&err);
            exit_code(&err)
        }
    }
}

fn dispatch(cli: &Cli) -> Result<i32> {
    match &cli.command {
        Command::Kinds => {
            commands::kinds::execute();
            Ok(0)
        }
        Command::Config => {
            let config = load_config(cli)?;
            print!("{}", config.to_toml().context("failed to render configuration")?);
            Ok(0)
        }
        Command::Model(args) => {
            let config = load_config(cli)?;
            commands::model::execute(args, &cli.project, &config)
        }
    }
}

fn load_config(cli: &Cli) -> Result<GeneratorConfig, CliError> {
    let config = GeneratorConfig::load(&cli.project).map_err(|err| CliError::Config {
        project: cli.project.clone(),
        message: format!("{err:#}"),
    })?;
    debug!(app = %config.app, project = %cli.project.display(), "configuration loaded");
    Ok(config)
}

fn report(err: &anyhow::Error) {
    if matches!(err.downcast_ref::<CliError>(), Some(CliError::Cancelled)) {
        eprintln!("{}", style(err).yellow());
        return;
    }

    let message = err.to_string();
    eprintln!("{} {message}", style("error:").red().bold());
    for cause in err.chain().skip(1) {
        let cause = cause.to_string();
        if !message.contains(&cause) {
            eprintln!("  {} {cause}", style("caused by:").dim());
        }
    }
}
