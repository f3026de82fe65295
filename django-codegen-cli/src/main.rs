//! django-codegen command-line tool

use std::process::ExitCode;

use clap::Parser;
use django_codegen::observability;
use django_codegen_cli::{run, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = observability::init(cli.verbose, cli.log_format()) {
        eprintln!("warning: logging disabled: {err:#}");
    }

    let code = run(&cli);
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
