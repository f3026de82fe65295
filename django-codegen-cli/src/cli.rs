//! Command-line arguments

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use django_codegen::observability::LogFormat;
use django_codegen::scaffold::ArtifactKind;

/// Generate Django models, admin registrations and URL routes
#[derive(Debug, Parser)]
#[command(name = "django-codegen")]
#[command(version)]
#[command(about = "Generate Django models, admin registrations and URL routes", long_about = None)]
pub struct Cli {
    /// Django project root
    #[arg(long, global = true, default_value = ".", value_name = "DIR")]
    pub project: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Log output format selected on the command line
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        if self.log_json {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a model or add fields to an existing one
    ///
    /// Examples:
    ///   django-codegen model Blog title:ShortText content:LongText:optional-on-save
    ///   django-codegen model Author user:OneToOne:to=auth.User --artifact routes
    ///   django-codegen model Blog
    Model(ModelArgs),

    /// List field kinds and the modifiers they accept
    Kinds,

    /// Print the effective configuration as TOML
    Config,
}

/// Arguments of `django-codegen model`
#[derive(Debug, Args)]
pub struct ModelArgs {
    /// Model name (`PascalCase`, e.g. `Blog`); asked for when omitted
    pub name: Option<String>,

    /// Field tokens; asked for interactively when none are given
    #[arg(value_name = "NAME:KIND[:MODIFIER]")]
    pub fields: Vec<String>,

    /// Django application to generate into
    #[arg(long)]
    pub app: Option<String>,

    /// Base class of the model (e.g. `core.models.TimeStamped`)
    #[arg(long, value_name = "TYPE")]
    pub base: Option<String>,

    /// Default ordering field, `-` prefix for descending (repeatable)
    #[arg(short, long, value_name = "FIELD", allow_hyphen_values = true)]
    pub ordering: Vec<String>,

    /// Artifact to generate: definition, registration or routes (repeatable)
    #[arg(short, long = "artifact", value_name = "ARTIFACT")]
    pub artifacts: Vec<ArtifactKind>,

    /// Show the changes without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Write without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Skip the configured formatter
    #[arg(long)]
    pub no_format: bool,
}
