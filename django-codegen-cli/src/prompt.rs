//! Terminal prompts for the interactive session

use std::fmt::Write as _;
use std::io;

use console::{style, Term};
use dialoguer::{Confirm, Input};
use django_codegen::error::SpecificationError;
use django_codegen::scaffold::{django_class, FieldKind, ModifierName};
use django_codegen::session::{Expectation, Prompt, PromptIo, Reply};

/// Asks session prompts on the terminal
#[derive(Debug, Clone)]
pub struct DialoguerPrompts {
    term: Term,
}

impl DialoguerPrompts {
    /// Prompts on stderr, leaving stdout for the preview
    #[must_use]
    pub fn new() -> Self {
        Self { term: Term::stderr() }
    }
}

impl Default for DialoguerPrompts {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptIo for DialoguerPrompts {
    fn ask(&mut self, prompt: &Prompt, error: Option<&SpecificationError>) -> io::Result<Reply> {
        if let Some(error) = error {
            self.term
                .write_line(&format!("{} {error}", style("✗").red().bold()))?;
        }
        if let Some(hint) = hint(&prompt.expectation) {
            self.term.write_str(&hint)?;
        }

        let answer = Input::<String>::new()
            .with_prompt(&prompt.message)
            .allow_empty(true)
            .interact_text_on(&self.term);

        match answer {
            Ok(text) => Ok(Reply::Text(text)),
            Err(dialoguer::Error::IO(err))
                if matches!(err.kind(), io::ErrorKind::Interrupted | io::ErrorKind::UnexpectedEof) =>
            {
                Ok(Reply::Abort)
            }
            Err(dialoguer::Error::IO(err)) => Err(err),
        }
    }
}

/// Ask whether the previewed changes should be written
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn confirm_changes() -> io::Result<bool> {
    Confirm::new()
        .with_prompt("Is this what you want?")
        .default(true)
        .interact_on(&Term::stderr())
        .map_err(|dialoguer::Error::IO(err)| err)
}

/// Extra lines shown above a prompt
fn hint(expectation: &Expectation) -> Option<String> {
    match expectation {
        Expectation::FieldKind { choices } => Some(kind_menu(choices)),
        Expectation::Modifiers { allowed, required, .. } if !allowed.is_empty() => {
            Some(modifier_hint(allowed, required))
        }
        _ => None,
    }
}

/// Numbered list of kinds, answered by index or name
#[must_use]
pub fn kind_menu(choices: &[FieldKind]) -> String {
    let mut out = format!("{}\n", style("Pick one:").bold());
    for (index, kind) in choices.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}  {:<20} {}",
            index,
            kind.token(),
            style(django_class(*kind)).dim()
        );
    }
    out
}

fn modifier_hint(allowed: &[ModifierName], required: &[ModifierName]) -> String {
    let tokens: Vec<String> = allowed
        .iter()
        .map(|m| {
            let mut token = m.token().to_string();
            if m.takes_value() {
                token.push_str("=...");
            }
            if required.contains(m) {
                token.push_str(" (required)");
            }
            token
        })
        .collect();
    format!("{} {}\n", style("Accepted:").bold(), tokens.join(", "))
}
