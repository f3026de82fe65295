//! `django-codegen model`
//!
//! Builds the entity from the command line, or asks for it interactively
//! when no field tokens are given, then previews and applies the plan.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use django_codegen::error::SpecificationError;
use django_codegen::generator::{CommandFormatter, DiskStore, Formatter, Generator, NoopFormatter};
use django_codegen::scaffold::{EntityBuilder, EntityModel};
use django_codegen::session::{self, Outcome, PromptIo, Session};
use django_codegen::GeneratorConfig;
use tracing::debug;

use crate::cli::ModelArgs;
use crate::error::CliError;
use crate::preview;
use crate::prompt::{self, DialoguerPrompts};

/// Generate the requested artifacts for one model
///
/// Returns the exit code of the run.
///
/// # Errors
///
/// Returns an error if the model specification is invalid, the user
/// cancels, or the terminal fails.
pub fn execute(args: &ModelArgs, project: &Path, config: &GeneratorConfig) -> Result<i32> {
    let config = effective_config(args, config);
    let entity = if needs_prompting(args) {
        if !console::user_attended_stderr() {
            return Err(CliError::NotInteractive {
                what: if args.name.is_none() { "a model name" } else { "at least one field" },
            }
            .into());
        }
        prompt_entity(args, &config, &mut DialoguerPrompts::new())?
    } else {
        entity_from_args(args, &config)?
    };

    println!(
        "\n{} {}",
        style("Generating").cyan().bold(),
        style(entity.name()).green().bold()
    );

    let formatter: Box<dyn Formatter> = match CommandFormatter::from_settings(&config.formatter) {
        Some(formatter) if !args.no_format => Box::new(formatter),
        _ => Box::new(NoopFormatter),
    };
    let generator = Generator::new(&config, DiskStore::new(project), formatter)?;
    let kinds = config.artifacts_or_default(&args.artifacts);
    let plan = generator.plan(&entity, &kinds)?;

    println!();
    print!("{}", preview::render_plan(&plan));

    if args.dry_run {
        return Ok(plan.failure_class().map_or(0, |class| class.exit_code()));
    }

    if plan.has_changes() && !args.yes {
        let confirmed = prompt::confirm_changes().context("failed to read confirmation")?;
        if !confirmed {
            return Err(CliError::Cancelled.into());
        }
    }

    let summary = generator.apply(plan);
    println!("\n{}", style("Summary").cyan().bold());
    print!("{}", preview::render_summary(&summary));

    Ok(summary.exit_code())
}

fn effective_config(args: &ModelArgs, config: &GeneratorConfig) -> GeneratorConfig {
    let mut config = config.clone();
    if let Some(app) = &args.app {
        config.app.clone_from(app);
    }
    config
}

/// Interactive mode when the name or every field token is missing
const fn needs_prompting(args: &ModelArgs) -> bool {
    args.name.is_none() || args.fields.is_empty()
}

/// Entity from the name and field tokens on the command line
///
/// # Errors
///
/// Returns the first invalid name or token.
pub fn entity_from_args(args: &ModelArgs, config: &GeneratorConfig) -> Result<EntityModel, SpecificationError> {
    let name = args
        .name
        .as_deref()
        .ok_or(SpecificationError::MissingAnswer { expected: "a model name" })?;

    let mut builder = EntityBuilder::new(name, config)?.with_ordering(args.ordering.clone());
    if let Some(base) = &args.base {
        builder = builder.with_base_type(base.clone());
    }
    for token in &args.fields {
        builder.add_token(token)?;
    }
    builder.build()
}

/// Entity from an interactive session
///
/// # Errors
///
/// Returns [`CliError::Cancelled`] if the user aborts, or an error if the
/// given name is invalid or the terminal fails.
pub fn prompt_entity(args: &ModelArgs, config: &GeneratorConfig, io: &mut impl PromptIo) -> Result<EntityModel> {
    let session = match &args.name {
        Some(name) => Session::for_entity(name, config)?,
        None => Session::new(config),
    }
    .with_base_type(args.base.clone())
    .with_ordering(args.ordering.clone());

    debug!(name = ?args.name, "starting interactive session");
    match session::run(session, io).context("interactive prompt failed")? {
        Outcome::Built(entity) => Ok(entity),
        Outcome::Cancelled => Err(CliError::Cancelled.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::exit_code;
    use django_codegen::session::{Reply, ScriptedPrompts};

    fn args(name: Option<&str>, fields: &[&str]) -> ModelArgs {
        ModelArgs {
            name: name.map(str::to_string),
            fields: fields.iter().map(|f| (*f).to_string()).collect(),
            app: Some("blog".to_string()),
            base: None,
            ordering: Vec::new(),
            artifacts: Vec::new(),
            dry_run: false,
            yes: true,
            no_format: true,
        }
    }

    fn text(value: &str) -> Reply {
        Reply::Text(value.to_string())
    }

    #[test]
    fn test_entity_from_args() {
        let mut args = args(Some("Blog"), &["title:ShortText"]);
        args.ordering = vec!["-title".to_string()];
        args.base = Some("core.models.TimeStamped".to_string());

        let entity = entity_from_args(&args, &GeneratorConfig::default()).unwrap();
        assert_eq!(entity.name(), "Blog");
        assert_eq!(entity.fields().len(), 1);
        assert_eq!(entity.ordering(), ["-title".to_string()]);
        assert_eq!(entity.base_type(), Some("core.models.TimeStamped"));
    }

    #[test]
    fn test_invalid_token_is_a_specification_error() {
        let err = entity_from_args(&args(Some("Blog"), &["title:UnknownKind"]), &GeneratorConfig::default())
            .unwrap_err();
        assert_eq!(exit_code(&err.into()), 2);
    }

    #[test]
    fn test_prompting_is_needed_without_fields() {
        assert!(needs_prompting(&args(None, &[])));
        assert!(needs_prompting(&args(Some("Blog"), &[])));
        assert!(!needs_prompting(&args(Some("Blog"), &["title:ShortText"])));
    }

    #[test]
    fn test_app_override() {
        let config = effective_config(&args(None, &[]), &GeneratorConfig::default());
        assert_eq!(config.app, "blog");

        let mut no_app = args(None, &[]);
        no_app.app = None;
        assert_eq!(effective_config(&no_app, &GeneratorConfig::default()).app, "core");
    }

    #[test]
    fn test_prompt_entity_from_name_prompt() {
        let mut io = ScriptedPrompts::new([
            text("Blog"),
            text("title"),
            text("0"),
            text(""),
            text("content:LongText:optional-on-save"),
            Reply::Done,
        ]);
        let entity = prompt_entity(&args(None, &[]), &GeneratorConfig::default(), &mut io).unwrap();

        assert_eq!(entity.name(), "Blog");
        let names: Vec<&str> = entity.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["title", "content"]);
        assert!(io.errors.is_empty());
    }

    #[test]
    fn test_prompt_entity_abort_is_cancellation() {
        let mut io = ScriptedPrompts::new([text("title"), Reply::Abort]);
        let err = prompt_entity(&args(Some("Blog"), &[]), &GeneratorConfig::default(), &mut io).unwrap_err();
        assert_eq!(exit_code(&err), 130);
    }

    #[test]
    fn test_prompt_entity_rejects_bad_name_up_front() {
        let mut io = ScriptedPrompts::new([]);
        let err = prompt_entity(&args(Some("1Blog"), &[]), &GeneratorConfig::default(), &mut io).unwrap_err();
        assert_eq!(exit_code(&err), 2);
        assert!(io.prompts.is_empty());
    }

    #[test]
    fn test_execute_writes_files() {
        let project = tempfile::tempdir().unwrap();
        let code = execute(
            &args(Some("Blog"), &["title:ShortText"]),
            project.path(),
            &GeneratorConfig::default(),
        )
        .unwrap();

        assert_eq!(code, 0);
        let models = std::fs::read_to_string(project.path().join("blog/models.py")).unwrap();
        assert!(models.contains("title = models.CharField(max_length=250)"));
        assert!(project.path().join("blog/admin.py").exists());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let project = tempfile::tempdir().unwrap();
        let mut args = args(Some("Blog"), &["title:ShortText"]);
        args.dry_run = true;
        args.yes = false;

        let code = execute(&args, project.path(), &GeneratorConfig::default()).unwrap();
        assert_eq!(code, 0);
        assert!(!project.path().join("blog").exists());
    }
}
