//! Interactive entity construction
//!
//! A [`Session`] is a state machine that builds an [`EntityModel`] one answer
//! at a time. It never touches a terminal itself: [`run`] drives it through
//! any [`PromptIo`], so the same rules apply to a dialoguer prompt in the CLI
//! and to a scripted conversation in tests.
//!
//! ```text
//! AwaitingEntityName ──name──▶ AwaitingFieldNameOrDone ◀──────────────┐
//!                                │      │                            │
//!                              Done   name ──▶ AwaitingFieldKind     │
//!                                │                  │ kind           │
//!                                ▼                  ▼                │
//!                              Built         AwaitingModifiers ──────┘
//! ```
//!
//! `Abort` from any prompting state leads to `Cancelled`. A rejected answer
//! leaves the state and every accepted field as they were.

use std::collections::VecDeque;
use std::io;

use tracing::debug;

use crate::config::GeneratorConfig;
use crate::error::SpecificationError;
use crate::scaffold::field_type::validate_field_name;
use crate::scaffold::{EntityBuilder, EntityModel, FieldKind, ModifierName};

/// Where the conversation stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// Waiting for the entity name
    AwaitingEntityName,
    /// Waiting for a field name, a full field token, or `Done`
    AwaitingFieldNameOrDone,
    /// Waiting for the kind of `field`
    AwaitingFieldKind {
        /// Field being declared
        field: String,
    },
    /// Waiting for the modifiers of `field`
    AwaitingModifiers {
        /// Field being declared
        field: String,
        /// Its kind
        kind: FieldKind,
    },
    /// The entity is complete
    Built,
    /// The user gave up; nothing is produced
    Cancelled,
}

/// What kind of answer a prompt expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// An entity name
    EntityName,
    /// A field name, a `name:Kind[:modifier]*` token, or nothing to finish
    FieldNameOrDone,
    /// A kind token or its index in `choices`
    FieldKind {
        /// Kinds in the order they are numbered
        choices: Vec<FieldKind>,
    },
    /// Modifier tokens separated by spaces or colons, possibly none
    Modifiers {
        /// Kind of the field
        kind: FieldKind,
        /// Modifiers the kind accepts
        allowed: Vec<ModifierName>,
        /// Modifiers the kind cannot do without
        required: Vec<ModifierName>,
    },
}

/// One question for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Text shown to the user
    pub message: String,
    /// Machine-readable form of the question
    pub expectation: Expectation,
}

/// One answer from the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Free text
    Text(String),
    /// Finish the current list
    Done,
    /// Give up
    Abort,
}

/// How a finished session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The entity was built
    Built(EntityModel),
    /// The user aborted
    Cancelled,
}

/// Terminal or scripted I/O for a session
pub trait PromptIo {
    /// Ask `prompt`, showing `error` if the previous answer was rejected
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying terminal fails.
    fn ask(&mut self, prompt: &Prompt, error: Option<&SpecificationError>) -> io::Result<Reply>;
}

/// Interactive builder of one entity
#[derive(Debug, Clone)]
pub struct Session {
    config: GeneratorConfig,
    state: State,
    builder: Option<EntityBuilder>,
    entity: Option<EntityModel>,
    base_type: Option<String>,
    ordering: Vec<String>,
}

impl Session {
    /// Start from the entity name prompt
    #[must_use]
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            config: config.clone(),
            state: State::AwaitingEntityName,
            builder: None,
            entity: None,
            base_type: None,
            ordering: Vec::new(),
        }
    }

    /// Start with the entity already named, at the field prompt
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a valid entity name.
    pub fn for_entity(name: &str, config: &GeneratorConfig) -> Result<Self, SpecificationError> {
        let builder = EntityBuilder::new(name, config)?;
        Ok(Self::from_builder(builder, config))
    }

    /// Continue filling a builder, at the field prompt
    #[must_use]
    pub fn from_builder(builder: EntityBuilder, config: &GeneratorConfig) -> Self {
        Self {
            config: config.clone(),
            state: State::AwaitingFieldNameOrDone,
            builder: Some(builder),
            entity: None,
            base_type: None,
            ordering: Vec::new(),
        }
    }

    /// Base type applied once the entity is named
    #[must_use]
    pub fn with_base_type(mut self, base: Option<String>) -> Self {
        if let Some(base) = &base {
            self.builder = self.builder.take().map(|b| b.with_base_type(base.clone()));
        }
        self.base_type = base;
        self
    }

    /// Ordering applied once the entity is named
    #[must_use]
    pub fn with_ordering(mut self, ordering: Vec<String>) -> Self {
        self.builder = self.builder.take().map(|b| b.with_ordering(ordering.clone()));
        self.ordering = ordering;
        self
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &State {
        &self.state
    }

    /// Builder holding the accepted fields, once the entity is named
    #[must_use]
    pub const fn builder(&self) -> Option<&EntityBuilder> {
        self.builder.as_ref()
    }

    /// Whether no more prompts will be issued
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.state, State::Built | State::Cancelled)
    }

    /// The question for the current state, `None` once finished
    #[must_use]
    pub fn prompt(&self) -> Option<Prompt> {
        let (message, expectation) = match &self.state {
            State::AwaitingEntityName => (
                "What is the name of the model?".to_string(),
                Expectation::EntityName,
            ),
            State::AwaitingFieldNameOrDone => (
                "Field name (empty to finish)".to_string(),
                Expectation::FieldNameOrDone,
            ),
            State::AwaitingFieldKind { field } => (
                format!("Pick a kind for '{field}'"),
                Expectation::FieldKind {
                    choices: FieldKind::ALL.to_vec(),
                },
            ),
            State::AwaitingModifiers { field, kind } => (
                format!("Modifiers for '{field}' ({kind}), empty for none"),
                Expectation::Modifiers {
                    kind: *kind,
                    allowed: kind.allowed_modifiers(),
                    required: kind.required_modifiers().to_vec(),
                },
            ),
            State::Built | State::Cancelled => return None,
        };
        Some(Prompt {
            message,
            expectation,
        })
    }

    /// Feed one answer
    ///
    /// Answers given after the session finished are ignored.
    ///
    /// # Errors
    ///
    /// Returns the validation failure when the answer is rejected; the state
    /// is left unchanged in that case.
    pub fn answer(&mut self, reply: Reply) -> Result<(), SpecificationError> {
        if self.is_finished() {
            return Ok(());
        }
        if reply == Reply::Abort {
            debug!("interactive session cancelled");
            self.builder = None;
            self.state = State::Cancelled;
            return Ok(());
        }

        let next = match (self.state.clone(), reply) {
            (State::AwaitingEntityName, Reply::Text(name)) => self.accept_entity_name(name.trim())?,
            (State::AwaitingEntityName, _) => {
                return Err(SpecificationError::MissingAnswer {
                    expected: "a model name",
                })
            }
            (State::AwaitingFieldNameOrDone, Reply::Text(text)) if !text.trim().is_empty() => {
                self.accept_field(text.trim())?
            }
            (State::AwaitingFieldNameOrDone, _) => self.finish()?,
            (State::AwaitingFieldKind { field }, Reply::Text(choice)) => {
                let kind = parse_kind_choice(&field, choice.trim())?;
                State::AwaitingModifiers { field, kind }
            }
            (State::AwaitingFieldKind { .. }, _) => {
                return Err(SpecificationError::MissingAnswer {
                    expected: "a field kind",
                })
            }
            (State::AwaitingModifiers { field, kind }, reply) => {
                let modifiers = match reply {
                    Reply::Text(text) => text,
                    _ => String::new(),
                };
                let token = field_token(&field, kind, &modifiers);
                self.builder_mut()?.add_token(&token)?;
                debug!(token = %token, "field accepted");
                State::AwaitingFieldNameOrDone
            }
            (State::Built | State::Cancelled, _) => return Ok(()),
        };

        self.state = next;
        Ok(())
    }

    /// Consume the session
    #[must_use]
    pub fn into_outcome(self) -> Option<Outcome> {
        match self.state {
            State::Built => self.entity.map(Outcome::Built),
            State::Cancelled => Some(Outcome::Cancelled),
            _ => None,
        }
    }

    fn accept_entity_name(&mut self, name: &str) -> Result<State, SpecificationError> {
        let mut builder = EntityBuilder::new(name, &self.config)?;
        if let Some(base) = &self.base_type {
            builder = builder.with_base_type(base.clone());
        }
        builder = builder.with_ordering(self.ordering.clone());
        self.builder = Some(builder);
        Ok(State::AwaitingFieldNameOrDone)
    }

    fn accept_field(&mut self, text: &str) -> Result<State, SpecificationError> {
        let builder = self.builder_mut()?;
        if text.contains(':') {
            builder.add_token(text)?;
            debug!(token = %text, "field accepted");
            return Ok(State::AwaitingFieldNameOrDone);
        }

        validate_field_name(text).map_err(|source| SpecificationError::field(text, source))?;
        if builder.fields().iter().any(|f| f.name() == text) {
            return Err(SpecificationError::DuplicateField {
                name: text.to_string(),
            });
        }
        Ok(State::AwaitingFieldKind {
            field: text.to_string(),
        })
    }

    fn finish(&mut self) -> Result<State, SpecificationError> {
        let entity = self.builder_mut()?.build()?;
        debug!(entity = entity.name(), fields = entity.fields().len(), "entity built");
        self.entity = Some(entity);
        Ok(State::Built)
    }

    fn builder_mut(&mut self) -> Result<&mut EntityBuilder, SpecificationError> {
        self.builder
            .as_mut()
            .ok_or(SpecificationError::MissingAnswer {
                expected: "a model name",
            })
    }
}

/// A kind token, or the index of a kind in [`FieldKind::ALL`]
fn parse_kind_choice(field: &str, choice: &str) -> Result<FieldKind, SpecificationError> {
    let by_index = choice
        .parse::<usize>()
        .ok()
        .and_then(|index| FieldKind::ALL.get(index).copied());
    by_index
        .or_else(|| FieldKind::from_token(choice))
        .ok_or_else(|| {
            SpecificationError::field(
                format!("{field}:{choice}"),
                crate::error::FieldError::UnknownKind {
                    kind: choice.to_string(),
                    position: field.len() + 1,
                },
            )
        })
}

/// `field:Kind[:modifier]*` from modifiers separated by spaces or colons
fn field_token(field: &str, kind: FieldKind, modifiers: &str) -> String {
    let mut token = format!("{field}:{}", kind.token());
    for modifier in modifiers
        .split(|c: char| c == ':' || c.is_whitespace())
        .filter(|m| !m.is_empty())
    {
        token.push(':');
        token.push_str(modifier);
    }
    token
}

/// Drive `session` with `io` until it finishes
///
/// # Errors
///
/// Returns an error only if `io` fails; validation failures are shown to the
/// user through the next prompt instead.
pub fn run(mut session: Session, io: &mut impl PromptIo) -> io::Result<Outcome> {
    let mut rejected: Option<SpecificationError> = None;
    while let Some(prompt) = session.prompt() {
        let reply = io.ask(&prompt, rejected.as_ref())?;
        rejected = session.answer(reply).err();
    }
    session
        .into_outcome()
        .ok_or_else(|| io::Error::other("interactive session ended without an outcome"))
}

/// Replays a fixed list of replies
///
/// Every prompt and every error it was shown are recorded, which makes it
/// suitable for testing conversations end to end.
#[derive(Debug, Default)]
pub struct ScriptedPrompts {
    replies: VecDeque<Reply>,
    /// Prompts asked so far
    pub prompts: Vec<Prompt>,
    /// Rejections shown so far, rendered
    pub errors: Vec<String>,
}

impl ScriptedPrompts {
    /// Script answering with `replies` in order
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl PromptIo for ScriptedPrompts {
    fn ask(&mut self, prompt: &Prompt, error: Option<&SpecificationError>) -> io::Result<Reply> {
        self.prompts.push(prompt.clone());
        if let Some(error) = error {
            self.errors.push(error.to_string());
        }
        self.replies.pop_front().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no scripted reply for '{}'", prompt.message),
            )
        })
    }
}
