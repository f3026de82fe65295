//! Source formatting collaborator

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{bail, Context};

use crate::config::FormatterSettings;

/// Language of a generated source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Python module
    Python,
}

/// Canonicalizes whitespace and style of a generated source
pub trait Formatter {
    /// Format `text`
    ///
    /// # Errors
    ///
    /// Returns an error if the formatter rejects the source or cannot run.
    fn format(&self, text: &str, kind: SourceKind) -> anyhow::Result<String>;
}

impl<F: Formatter + ?Sized> Formatter for Box<F> {
    fn format(&self, text: &str, kind: SourceKind) -> anyhow::Result<String> {
        (**self).format(text, kind)
    }
}

/// Leaves sources untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFormatter;

impl Formatter for NoopFormatter {
    fn format(&self, text: &str, _kind: SourceKind) -> anyhow::Result<String> {
        Ok(text.to_string())
    }
}

/// Pipes sources through an external program such as `black -q -`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    /// Formatter running `program` with `args`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Formatter from configuration, `None` if no command is configured
    #[must_use]
    pub fn from_settings(settings: &FormatterSettings) -> Option<Self> {
        let (program, args) = settings.command.as_deref()?.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }
}

impl Formatter for CommandFormatter {
    fn format(&self, text: &str, _kind: SourceKind) -> anyhow::Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to start formatter '{}'", self.program))?;

        let mut stdin = child.stdin.take().context("formatter stdin unavailable")?;
        let input = text.to_string();
        let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child
            .wait_with_output()
            .with_context(|| format!("formatter '{}' did not finish", self.program))?;
        writer
            .join()
            .map_err(|_| anyhow::anyhow!("formatter input thread panicked"))?
            .with_context(|| format!("failed to send source to '{}'", self.program))?;

        if !output.status.success() {
            bail!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        String::from_utf8(output.stdout).context("formatter produced invalid UTF-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_formatter() {
        assert_eq!(
            NoopFormatter.format("x  =  1\n", SourceKind::Python).unwrap(),
            "x  =  1\n"
        );
    }

    #[test]
    fn test_from_settings() {
        assert_eq!(CommandFormatter::from_settings(&FormatterSettings::default()), None);
        assert_eq!(
            CommandFormatter::from_settings(&FormatterSettings {
                command: Some(Vec::new())
            }),
            None
        );

        let settings = FormatterSettings {
            command: Some(vec!["black".to_string(), "-q".to_string(), "-".to_string()]),
        };
        assert_eq!(
            CommandFormatter::from_settings(&settings),
            Some(CommandFormatter::new("black", vec!["-q".to_string(), "-".to_string()]))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_command_formatter_pipes_through_program() {
        let cat = CommandFormatter::new("cat", Vec::new());
        assert_eq!(cat.format("x = 1\n", SourceKind::Python).unwrap(), "x = 1\n");

        let upper = CommandFormatter::new("tr", vec!["a-z".to_string(), "A-Z".to_string()]);
        assert_eq!(upper.format("x = 1\n", SourceKind::Python).unwrap(), "X = 1\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_formatter_failure() {
        let failing = CommandFormatter::new("false", Vec::new());
        assert!(failing.format("x = 1\n", SourceKind::Python).is_err());

        let missing = CommandFormatter::new("definitely-not-a-formatter-binary", Vec::new());
        let err = missing.format("x = 1\n", SourceKind::Python).unwrap_err();
        assert!(err.to_string().contains("failed to start formatter"));
    }
}
