//! Error types and failure classes
//!
//! Every failure the engine reports belongs to one [`ErrorClass`], which the
//! CLI maps onto a process exit code so calling tooling can branch on the
//! kind of failure.

use std::path::PathBuf;

use thiserror::Error;

use crate::scaffold::{Container, FieldKind};

/// Broad failure class, one exit code each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorClass {
    /// Template rendering or other internal failure
    Internal,
    /// Invalid input: tokens, names, empty entity
    Specification,
    /// Target file structure not recognized or container not found
    Anchor,
    /// Existing declaration differs from the generated one
    Conflict,
    /// Reading, writing, formatting or configuration failure
    Io,
}

impl ErrorClass {
    /// Process exit code for this class
    ///
    /// Anchor and conflict failures share a code: both mean "the merge was
    /// refused".
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Internal => 1,
            Self::Specification => 2,
            Self::Anchor | Self::Conflict => 3,
            Self::Io => 4,
        }
    }
}

/// Errors produced while parsing a single field token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Token does not have at least a name and a kind segment
    #[error("malformed field token '{token}': expected name:kind[:modifier]*")]
    MalformedToken {
        /// The offending token
        token: String,
    },

    /// Field name is not an identifier
    #[error("invalid field name '{name}': must start with a letter or underscore and contain only letters, digits and underscores")]
    InvalidName {
        /// The offending name
        name: String,
    },

    /// Field name is an identifier Django or Python will not accept
    #[error("field name '{name}' is not allowed: {reason}")]
    ReservedFieldName {
        /// The offending name
        name: String,
        /// Why the name is rejected
        reason: &'static str,
    },

    /// Kind segment does not name a known field kind
    #[error("unknown field kind '{kind}' at position {position}")]
    UnknownKind {
        /// The kind segment as written
        kind: String,
        /// Byte offset of the kind segment within the token
        position: usize,
    },

    /// Modifier is not part of the vocabulary
    #[error("unknown modifier '{modifier}' for {kind}")]
    UnknownModifier {
        /// The modifier as written
        modifier: String,
        /// Kind of the field being parsed
        kind: FieldKind,
    },

    /// Modifier exists but is not valid for this kind
    #[error("modifier '{modifier}' cannot be used with {kind}")]
    IncompatibleModifier {
        /// The modifier name
        modifier: String,
        /// Kind of the field being parsed
        kind: FieldKind,
    },

    /// Value modifier written without a value
    #[error("modifier '{modifier}' requires a value (e.g. {modifier}=...)")]
    MissingModifierValue {
        /// The modifier name
        modifier: String,
    },

    /// Modifier value rejected
    #[error("invalid value '{value}' for modifier '{modifier}': {reason}")]
    InvalidModifierValue {
        /// The modifier name
        modifier: String,
        /// The value as written
        value: String,
        /// Why the value is rejected
        reason: String,
    },

    /// Same modifier given twice in one token
    #[error("modifier '{modifier}' is given more than once")]
    DuplicateModifier {
        /// The modifier name
        modifier: String,
    },

    /// Kind needs a modifier that is absent
    #[error("{kind} requires the '{modifier}' modifier")]
    MissingRequiredModifier {
        /// The missing modifier
        modifier: &'static str,
        /// Kind of the field being parsed
        kind: FieldKind,
    },
}

/// Invalid entity specification, detected before any file is touched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecificationError {
    /// A field token failed to parse
    #[error("invalid field '{token}': {source}")]
    Field {
        /// The token as given
        token: String,
        /// Underlying grammar error
        #[source]
        source: FieldError,
    },

    /// Entity name is not an identifier
    #[error("invalid entity name '{name}': must start with a letter or underscore and contain only letters, digits and underscores")]
    InvalidEntityName {
        /// The offending name
        name: String,
    },

    /// Entity name collides with a generated or reserved name
    #[error("entity name '{name}' is reserved: {reason}")]
    ReservedName {
        /// The offending name
        name: String,
        /// Why the name is reserved
        reason: &'static str,
    },

    /// Field name already used in this entity
    #[error("field '{name}' is already declared")]
    DuplicateField {
        /// The duplicated name
        name: String,
    },

    /// No fields and empty entities are not allowed
    #[error("entity '{name}' has no fields; add at least one field")]
    EmptyEntity {
        /// Entity name
        name: String,
    },

    /// Ordering refers to a field the entity does not declare
    #[error("ordering field '{field}' is not declared on '{entity}'")]
    UnknownOrderingField {
        /// Entity name
        entity: String,
        /// The ordering entry as given
        field: String,
    },

    /// Ordering entry is not a field name with an optional `-`
    #[error("invalid ordering entry '{entry}': expected a field name, optionally prefixed with '-'")]
    InvalidOrdering {
        /// The entry as given
        entry: String,
    },

    /// Base type is not a dotted identifier path
    #[error("invalid base type '{base}': expected a name such as models.Model or core.models.TimeStamped")]
    InvalidBaseType {
        /// The base type as given
        base: String,
    },

    /// An interactive prompt was answered without a value
    #[error("{expected} is required")]
    MissingAnswer {
        /// What the prompt asked for
        expected: &'static str,
    },
}

impl SpecificationError {
    /// Wrap a grammar error together with the token it came from
    #[must_use]
    pub fn field(token: impl Into<String>, source: FieldError) -> Self {
        Self::Field {
            token: token.into(),
            source,
        }
    }
}

/// Errors produced by the structural merge engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// Existing source could not be parsed into a tree
    #[error("existing source is not structurally recognizable (line {line}): {message}")]
    Unparseable {
        /// 1-based line of the problem
        line: usize,
        /// Parser message
        message: String,
    },

    /// The fragment's container does not exist
    #[error("cannot place '{fragment}': no {container} found")]
    AnchorNotFound {
        /// Container that was looked for
        container: Container,
        /// Name of the fragment being merged
        fragment: String,
    },

    /// More than one declaration matches the container
    #[error("cannot place '{fragment}': {count} declarations match {container}")]
    AmbiguousAnchor {
        /// Container that was looked for
        container: Container,
        /// Name of the fragment being merged
        fragment: String,
        /// Number of matches
        count: usize,
    },

    /// The container exists but cannot take new declarations
    #[error("{container} cannot receive new declarations: {reason}")]
    UnsupportedContainer {
        /// Container that was found
        container: Container,
        /// Why it cannot be extended
        reason: &'static str,
    },

    /// A declaration with the same name but different content exists
    #[error("'{name}' already exists in {container} with different content")]
    ConflictingDeclaration {
        /// Declaration name
        name: String,
        /// Container holding it
        container: Container,
    },

    /// The merged text failed re-parsing or lost the declaration
    #[error("merged source failed verification: {message}")]
    Verification {
        /// What went wrong
        message: String,
    },
}

impl MergeError {
    /// Failure class of this error
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::ConflictingDeclaration { .. } => ErrorClass::Conflict,
            _ => ErrorClass::Anchor,
        }
    }
}

/// Failure of one artifact during generation
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Merge into the existing file was refused
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// Existing file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Target path
        path: PathBuf,
        /// I/O error
        #[source]
        source: std::io::Error,
    },

    /// Generated file could not be written
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Target path
        path: PathBuf,
        /// I/O error
        #[source]
        source: std::io::Error,
    },

    /// External formatter failed
    #[error("formatter failed for {}: {message}", path.display())]
    Format {
        /// Target path
        path: PathBuf,
        /// Formatter message
        message: String,
    },

    /// Output path template could not be rendered
    #[error("failed to resolve output path: {0}")]
    Path(#[source] minijinja::Error),

    /// New-file template could not be rendered
    #[error("failed to render new file: {0}")]
    Template(#[source] minijinja::Error),
}

impl ArtifactError {
    /// Failure class of this error
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Merge(err) => err.class(),
            Self::Read { .. } | Self::Write { .. } | Self::Format { .. } => ErrorClass::Io,
            Self::Path(_) | Self::Template(_) => ErrorClass::Internal,
        }
    }
}

/// Errors that stop a whole generation run
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Invalid entity specification
    #[error(transparent)]
    Specification(#[from] SpecificationError),

    /// Fragment templates failed to render
    #[error("failed to render templates: {0}")]
    Template(#[from] minijinja::Error),
}

impl GenerateError {
    /// Failure class of this error
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Specification(_) => ErrorClass::Specification,
            Self::Template(_) => ErrorClass::Internal,
        }
    }
}
