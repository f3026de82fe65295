//! Field kinds, modifiers and the field token parser
//!
//! This module provides the closed type system for field definitions. A field
//! token has the form `name:Kind[:modifier]*`; kinds are matched exactly and
//! case-sensitively, and every modifier is checked against a compatibility
//! table so that an unsupported combination is an error at parse time rather
//! than surprising output later.
//!
//! # Field Kinds
//!
//! | Token                  | Django field                |
//! |------------------------|-----------------------------|
//! | `ShortText`            | `CharField`                 |
//! | `LongText`             | `TextField`                 |
//! | `Integer`              | `IntegerField`              |
//! | `BigInteger`           | `BigIntegerField`           |
//! | `PositiveInteger`      | `PositiveIntegerField`      |
//! | `Float`                | `FloatField`                |
//! | `Decimal`              | `DecimalField`              |
//! | `Boolean`              | `BooleanField`              |
//! | `Date`                 | `DateField`                 |
//! | `DateTime`             | `DateTimeField`             |
//! | `Time`                 | `TimeField`                 |
//! | `Duration`             | `DurationField`             |
//! | `Email`                | `EmailField`                |
//! | `Slug`                 | `SlugField`                 |
//! | `Url`                  | `URLField`                  |
//! | `Uuid`                 | `UUIDField`                 |
//! | `Json`                 | `JSONField`                 |
//! | `File`                 | `FileField`                 |
//! | `Image`                | `ImageField`                |
//! | `FilePath`             | `FilePathField`             |
//! | `Binary`               | `BinaryField`               |
//! | `SmallInteger`         | `SmallIntegerField`         |
//! | `PositiveSmallInteger` | `PositiveSmallIntegerField` |
//! | `SmallAuto`            | `SmallAutoField`            |
//! | `IpAddress`            | `GenericIPAddressField`     |
//! | `ForeignKey`           | `ForeignKey`                |
//! | `OneToOne`             | `OneToOneField`             |
//! | `ManyToMany`           | `ManyToManyField`           |
//!
//! # Modifiers
//!
//! - `optional-on-save` - may be left blank in forms (`blank=True`)
//! - `optional-in-storage` - nullable column (`null=True`)
//! - `unique`, `indexed`
//! - `default=<value>` - text, numeric and boolean kinds
//! - `max-length=<n>` - bounded text kinds
//! - `max-digits=<n>`, `decimal-places=<n>` - `Decimal`
//! - `auto-now`, `auto-now-add` - date and time kinds
//! - `to=<Model>` - required on relation kinds
//! - `on-delete=<policy>` - `ForeignKey` and `OneToOne`
//! - `upload-to=<path>` - `File` and `Image`
//!
//! # Examples
//!
//! ```text
//! title:ShortText                               → CharField(max_length=250)
//! content:LongText:optional-on-save             → TextField(blank=True)
//! views:PositiveInteger:default=0               → PositiveIntegerField(default=0)
//! author:ForeignKey:to=Author:on-delete=protect → ForeignKey("Author", on_delete=models.PROTECT)
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::FieldError;

/// Field kind enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKind {
    /// Bounded text
    ShortText,
    /// Unbounded text
    LongText,
    /// 32-bit integer
    Integer,
    /// 64-bit integer
    BigInteger,
    /// Non-negative integer
    PositiveInteger,
    /// Floating point number
    Float,
    /// Fixed precision decimal
    Decimal,
    /// Boolean
    Boolean,
    /// Date without time
    Date,
    /// Date and time
    DateTime,
    /// Time of day
    Time,
    /// Time span
    Duration,
    /// Email address
    Email,
    /// URL slug
    Slug,
    /// URL
    Url,
    /// UUID
    Uuid,
    /// JSON document
    Json,
    /// Uploaded file
    File,
    /// Uploaded image
    Image,
    /// Path of a file on the server
    FilePath,
    /// Raw bytes
    Binary,
    /// 16-bit integer
    SmallInteger,
    /// Non-negative 16-bit integer
    PositiveSmallInteger,
    /// Auto-incrementing 16-bit primary key
    SmallAuto,
    /// IPv4 or IPv6 address
    IpAddress,
    /// Many-to-one reference to another model
    ForeignKey,
    /// One-to-one reference to another model
    OneToOne,
    /// Many-to-many reference to another model
    ManyToMany,
}

impl FieldKind {
    /// Every kind, in the order shown to users
    pub const ALL: [Self; 28] = [
        Self::ShortText,
        Self::LongText,
        Self::Integer,
        Self::BigInteger,
        Self::PositiveInteger,
        Self::Float,
        Self::Decimal,
        Self::Boolean,
        Self::Date,
        Self::DateTime,
        Self::Time,
        Self::Duration,
        Self::Email,
        Self::Slug,
        Self::Url,
        Self::Uuid,
        Self::Json,
        Self::File,
        Self::Image,
        Self::FilePath,
        Self::Binary,
        Self::SmallInteger,
        Self::PositiveSmallInteger,
        Self::SmallAuto,
        Self::IpAddress,
        Self::ForeignKey,
        Self::OneToOne,
        Self::ManyToMany,
    ];

    /// Token used in field specifications
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::ShortText => "ShortText",
            Self::LongText => "LongText",
            Self::Integer => "Integer",
            Self::BigInteger => "BigInteger",
            Self::PositiveInteger => "PositiveInteger",
            Self::Float => "Float",
            Self::Decimal => "Decimal",
            Self::Boolean => "Boolean",
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Time => "Time",
            Self::Duration => "Duration",
            Self::Email => "Email",
            Self::Slug => "Slug",
            Self::Url => "Url",
            Self::Uuid => "Uuid",
            Self::Json => "Json",
            Self::File => "File",
            Self::Image => "Image",
            Self::FilePath => "FilePath",
            Self::Binary => "Binary",
            Self::SmallInteger => "SmallInteger",
            Self::PositiveSmallInteger => "PositiveSmallInteger",
            Self::SmallAuto => "SmallAuto",
            Self::IpAddress => "IpAddress",
            Self::ForeignKey => "ForeignKey",
            Self::OneToOne => "OneToOne",
            Self::ManyToMany => "ManyToMany",
        }
    }

    /// Look up a kind by its exact token
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.token() == token)
    }

    /// Whether this kind references another model
    #[must_use]
    pub const fn is_relation(self) -> bool {
        matches!(self, Self::ForeignKey | Self::OneToOne | Self::ManyToMany)
    }

    /// Whether values of this kind are strings
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(
            self,
            Self::ShortText
                | Self::LongText
                | Self::Email
                | Self::Slug
                | Self::Url
                | Self::FilePath
                | Self::IpAddress
        )
    }

    /// Whether values of this kind are numbers
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Integer
                | Self::BigInteger
                | Self::PositiveInteger
                | Self::SmallInteger
                | Self::PositiveSmallInteger
                | Self::Float
                | Self::Decimal
        )
    }

    /// Compatibility table: whether `modifier` may be used with this kind
    #[must_use]
    pub const fn accepts(self, modifier: ModifierName) -> bool {
        match modifier {
            ModifierName::OptionalOnSave => true,
            ModifierName::OptionalInStorage => !matches!(self, Self::ManyToMany | Self::SmallAuto),
            ModifierName::Unique | ModifierName::Indexed => !matches!(self, Self::ManyToMany),
            ModifierName::Default => {
                self.is_text() || self.is_numeric() || matches!(self, Self::Boolean)
            }
            ModifierName::MaxLength => {
                matches!(
                    self,
                    Self::ShortText
                        | Self::Email
                        | Self::Slug
                        | Self::Url
                        | Self::File
                        | Self::Image
                        | Self::FilePath
                        | Self::Binary
                )
            }
            ModifierName::MaxDigits | ModifierName::DecimalPlaces => matches!(self, Self::Decimal),
            ModifierName::AutoNow | ModifierName::AutoNowAdd => {
                matches!(self, Self::Date | Self::DateTime | Self::Time)
            }
            ModifierName::To => self.is_relation(),
            ModifierName::OnDelete => matches!(self, Self::ForeignKey | Self::OneToOne),
            ModifierName::UploadTo => matches!(self, Self::File | Self::Image),
        }
    }

    /// Modifiers accepted by this kind, in canonical order
    #[must_use]
    pub fn allowed_modifiers(self) -> Vec<ModifierName> {
        ModifierName::ALL
            .into_iter()
            .filter(|modifier| self.accepts(*modifier))
            .collect()
    }

    /// Modifiers that must be present for this kind
    #[must_use]
    pub const fn required_modifiers(self) -> &'static [ModifierName] {
        if self.is_relation() {
            &[ModifierName::To]
        } else {
            &[]
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Modifier vocabulary without values
///
/// Declaration order is the canonical option order used when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModifierName {
    /// `to=<Model>`
    To,
    /// `on-delete=<policy>`
    OnDelete,
    /// `max-length=<n>`
    MaxLength,
    /// `max-digits=<n>`
    MaxDigits,
    /// `decimal-places=<n>`
    DecimalPlaces,
    /// `upload-to=<path>`
    UploadTo,
    /// `auto-now`
    AutoNow,
    /// `auto-now-add`
    AutoNowAdd,
    /// `default=<value>`
    Default,
    /// `unique`
    Unique,
    /// `indexed`
    Indexed,
    /// `optional-on-save`
    OptionalOnSave,
    /// `optional-in-storage`
    OptionalInStorage,
}

impl ModifierName {
    /// Every modifier, in canonical order
    pub const ALL: [Self; 13] = [
        Self::To,
        Self::OnDelete,
        Self::MaxLength,
        Self::MaxDigits,
        Self::DecimalPlaces,
        Self::UploadTo,
        Self::AutoNow,
        Self::AutoNowAdd,
        Self::Default,
        Self::Unique,
        Self::Indexed,
        Self::OptionalOnSave,
        Self::OptionalInStorage,
    ];

    /// Token used in field specifications
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::To => "to",
            Self::OnDelete => "on-delete",
            Self::MaxLength => "max-length",
            Self::MaxDigits => "max-digits",
            Self::DecimalPlaces => "decimal-places",
            Self::UploadTo => "upload-to",
            Self::AutoNow => "auto-now",
            Self::AutoNowAdd => "auto-now-add",
            Self::Default => "default",
            Self::Unique => "unique",
            Self::Indexed => "indexed",
            Self::OptionalOnSave => "optional-on-save",
            Self::OptionalInStorage => "optional-in-storage",
        }
    }

    /// Look up a modifier by its exact token
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.token() == token)
    }

    /// Whether the modifier is written as `name=value`
    #[must_use]
    pub const fn takes_value(self) -> bool {
        matches!(
            self,
            Self::To
                | Self::OnDelete
                | Self::MaxLength
                | Self::MaxDigits
                | Self::DecimalPlaces
                | Self::UploadTo
                | Self::Default
        )
    }
}

impl fmt::Display for ModifierName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Deletion policy of a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OnDelete {
    /// Delete dependents
    Cascade,
    /// Refuse deletion
    Protect,
    /// Refuse deletion unless cascaded elsewhere
    Restrict,
    /// Null the reference
    SetNull,
    /// Reset the reference to its default
    SetDefault,
    /// Leave the reference dangling
    DoNothing,
}

impl OnDelete {
    const ALL: [Self; 6] = [
        Self::Cascade,
        Self::Protect,
        Self::Restrict,
        Self::SetNull,
        Self::SetDefault,
        Self::DoNothing,
    ];

    /// Token used in field specifications
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Cascade => "cascade",
            Self::Protect => "protect",
            Self::Restrict => "restrict",
            Self::SetNull => "set-null",
            Self::SetDefault => "set-default",
            Self::DoNothing => "do-nothing",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|policy| policy.token() == token)
    }
}

/// Default value of a field, already validated against its kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefaultValue {
    /// Integer literal
    Integer(i64),
    /// Floating point literal, as written
    Float(String),
    /// Decimal literal, as written
    Decimal(String),
    /// Boolean literal
    Boolean(bool),
    /// String literal, unescaped
    Text(String),
}

/// One modifier with its value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// Referenced model
    To(String),
    /// Deletion policy
    OnDelete(OnDelete),
    /// Maximum length
    MaxLength(u32),
    /// Total digits of a decimal
    MaxDigits(u32),
    /// Digits after the decimal point
    DecimalPlaces(u32),
    /// Upload directory
    UploadTo(String),
    /// Set on every save
    AutoNow,
    /// Set on creation
    AutoNowAdd,
    /// Default value
    Default(DefaultValue),
    /// Unique constraint
    Unique,
    /// Database index
    Indexed,
    /// Blank allowed in forms
    OptionalOnSave,
    /// Null allowed in storage
    OptionalInStorage,
}

impl Modifier {
    /// Name of this modifier
    #[must_use]
    pub const fn name(&self) -> ModifierName {
        match self {
            Self::To(_) => ModifierName::To,
            Self::OnDelete(_) => ModifierName::OnDelete,
            Self::MaxLength(_) => ModifierName::MaxLength,
            Self::MaxDigits(_) => ModifierName::MaxDigits,
            Self::DecimalPlaces(_) => ModifierName::DecimalPlaces,
            Self::UploadTo(_) => ModifierName::UploadTo,
            Self::AutoNow => ModifierName::AutoNow,
            Self::AutoNowAdd => ModifierName::AutoNowAdd,
            Self::Default(_) => ModifierName::Default,
            Self::Unique => ModifierName::Unique,
            Self::Indexed => ModifierName::Indexed,
            Self::OptionalOnSave => ModifierName::OptionalOnSave,
            Self::OptionalInStorage => ModifierName::OptionalInStorage,
        }
    }

    /// Parse one modifier segment for a field of `kind`
    fn parse(segment: &str, kind: FieldKind) -> Result<Self, FieldError> {
        let (token, value) = match segment.split_once('=') {
            Some((token, value)) => (token, Some(value)),
            None => (segment, None),
        };

        let name = ModifierName::from_token(token).ok_or_else(|| FieldError::UnknownModifier {
            modifier: token.to_string(),
            kind,
        })?;

        if !kind.accepts(name) {
            return Err(FieldError::IncompatibleModifier {
                modifier: token.to_string(),
                kind,
            });
        }

        let value = match (name.takes_value(), value) {
            (false, None) => None,
            (false, Some(value)) => {
                return Err(invalid_value(name, value, "this modifier takes no value"));
            }
            (true, None | Some("")) => {
                return Err(FieldError::MissingModifierValue {
                    modifier: token.to_string(),
                });
            }
            (true, Some(value)) => Some(value),
        };

        let modifier = match (name, value) {
            (ModifierName::To, Some(model)) => {
                if !is_dotted_identifier(model) {
                    return Err(invalid_value(
                        name,
                        model,
                        "expected a model name such as Author or auth.User",
                    ));
                }
                Self::To(model.to_string())
            }
            (ModifierName::OnDelete, Some(policy)) => {
                Self::OnDelete(OnDelete::from_token(policy).ok_or_else(|| {
                    invalid_value(
                        name,
                        policy,
                        "expected one of cascade, protect, restrict, set-null, set-default, do-nothing",
                    )
                })?)
            }
            (ModifierName::MaxLength, Some(n)) => Self::MaxLength(parse_count(name, n, 1)?),
            (ModifierName::MaxDigits, Some(n)) => Self::MaxDigits(parse_count(name, n, 1)?),
            (ModifierName::DecimalPlaces, Some(n)) => Self::DecimalPlaces(parse_count(name, n, 0)?),
            (ModifierName::UploadTo, Some(path)) => Self::UploadTo(path.to_string()),
            (ModifierName::Default, Some(value)) => Self::Default(parse_default(kind, value)?),
            (ModifierName::AutoNow, _) => Self::AutoNow,
            (ModifierName::AutoNowAdd, _) => Self::AutoNowAdd,
            (ModifierName::Unique, _) => Self::Unique,
            (ModifierName::Indexed, _) => Self::Indexed,
            (ModifierName::OptionalOnSave, _) => Self::OptionalOnSave,
            (ModifierName::OptionalInStorage, _) => Self::OptionalInStorage,
            (_, None) => {
                return Err(FieldError::MissingModifierValue {
                    modifier: token.to_string(),
                });
            }
        };

        Ok(modifier)
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match self {
            Self::To(model) => write!(f, "{name}={model}"),
            Self::OnDelete(policy) => write!(f, "{name}={}", policy.token()),
            Self::MaxLength(n) | Self::MaxDigits(n) | Self::DecimalPlaces(n) => {
                write!(f, "{name}={n}")
            }
            Self::UploadTo(path) => write!(f, "{name}={path}"),
            Self::Default(value) => match value {
                DefaultValue::Integer(n) => write!(f, "{name}={n}"),
                DefaultValue::Float(text) | DefaultValue::Decimal(text) | DefaultValue::Text(text) => {
                    write!(f, "{name}={text}")
                }
                DefaultValue::Boolean(b) => write!(f, "{name}={b}"),
            },
            _ => f.write_str(name.token()),
        }
    }
}

/// One declared attribute of an entity, parsed from `name:Kind[:modifier]*`
///
/// Descriptors are immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    modifiers: Vec<Modifier>,
}

impl FieldDescriptor {
    /// Parse a field descriptor from a token
    ///
    /// Format: `name:Kind[:modifier]*`
    ///
    /// A value may contain `:`; the value ends only where the text after a
    /// `:` starts a known modifier, so `default=10:30:unique` is the default
    /// `10:30` followed by `unique`.
    ///
    /// # Examples
    ///
    /// ```
    /// use django_codegen::scaffold::{FieldDescriptor, FieldKind, Modifier};
    ///
    /// let field = FieldDescriptor::parse("title:ShortText").unwrap();
    /// assert_eq!(field.name(), "title");
    /// assert_eq!(field.kind(), FieldKind::ShortText);
    ///
    /// let field = FieldDescriptor::parse("content:LongText:optional-on-save").unwrap();
    /// assert_eq!(field.modifiers(), &[Modifier::OptionalOnSave]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The token has fewer than 2 segments or an empty name or kind
    /// - The field name is not an identifier or is reserved
    /// - The kind is unknown
    /// - A modifier is unknown, incompatible with the kind, repeated, or has
    ///   an invalid value
    /// - A relation kind lacks its `to=` modifier
    pub fn parse(token: &str) -> Result<Self, FieldError> {
        let mut parts = token.splitn(3, ':');
        let (Some(name), Some(kind_segment)) = (parts.next(), parts.next()) else {
            return Err(FieldError::MalformedToken {
                token: token.to_string(),
            });
        };
        let modifier_segments = parts.next().map(split_modifiers).unwrap_or_default();

        if name.is_empty() || kind_segment.is_empty() {
            return Err(FieldError::MalformedToken {
                token: token.to_string(),
            });
        }

        validate_field_name(name)?;

        let kind = FieldKind::from_token(kind_segment).ok_or_else(|| FieldError::UnknownKind {
            kind: kind_segment.to_string(),
            position: name.len() + 1,
        })?;

        let mut modifiers: Vec<Modifier> = Vec::with_capacity(modifier_segments.len());
        for segment in modifier_segments {
            let modifier = Modifier::parse(segment, kind)?;
            if modifiers.iter().any(|m| m.name() == modifier.name()) {
                return Err(FieldError::DuplicateModifier {
                    modifier: modifier.name().token().to_string(),
                });
            }
            modifiers.push(modifier);
        }

        let descriptor = Self {
            name: name.to_string(),
            kind,
            modifiers,
        };
        descriptor.check_requirements()?;
        Ok(descriptor)
    }

    /// Check modifiers that depend on each other
    fn check_requirements(&self) -> Result<(), FieldError> {
        for required in self.kind.required_modifiers() {
            if !self.has(*required) {
                return Err(FieldError::MissingRequiredModifier {
                    modifier: required.token(),
                    kind: self.kind,
                });
            }
        }

        let set_null = self
            .modifiers
            .iter()
            .any(|m| matches!(m, Modifier::OnDelete(OnDelete::SetNull)));
        if set_null && !self.has(ModifierName::OptionalInStorage) {
            return Err(invalid_value(
                ModifierName::OnDelete,
                OnDelete::SetNull.token(),
                "set-null requires optional-in-storage on the same field",
            ));
        }

        Ok(())
    }

    /// Field name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field kind
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Modifiers in the order they were written
    #[must_use]
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Whether a modifier is present
    #[must_use]
    pub fn has(&self, name: ModifierName) -> bool {
        self.modifiers.iter().any(|m| m.name() == name)
    }

    /// Modifiers sorted into canonical option order
    #[must_use]
    pub fn canonical_modifiers(&self) -> Vec<&Modifier> {
        let mut sorted: Vec<&Modifier> = self.modifiers.iter().collect();
        sorted.sort_by_key(|m| m.name());
        sorted
    }
}

impl FromStr for FieldDescriptor {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.kind)?;
        for modifier in &self.modifiers {
            write!(f, ":{modifier}")?;
        }
        Ok(())
    }
}

/// Modifier segments after the kind
///
/// A piece that does not start a known modifier continues the value of the
/// segment before it.
fn split_modifiers(rest: &str) -> Vec<&str> {
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    let mut offset = 0;
    for piece in rest.split(':') {
        let end = offset + piece.len();
        let head = piece.split_once('=').map_or(piece, |(name, _)| name);
        let in_value = ranges
            .last()
            .is_some_and(|&(start, stop)| rest[start..stop].contains('='));
        match ranges.last_mut() {
            Some(last) if in_value && ModifierName::from_token(head).is_none() => last.1 = end,
            _ => ranges.push((offset, end)),
        }
        offset = end + 1;
    }
    ranges.into_iter().map(|(start, stop)| &rest[start..stop]).collect()
}

/// Python keywords, which can never be field or entity names
pub(crate) const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Whether `name` is `[A-Za-z_][A-Za-z0-9_]*`
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether `path` is one or more identifiers joined by dots
#[must_use]
pub fn is_dotted_identifier(path: &str) -> bool {
    path.split('.').all(is_identifier)
}

/// Validate a field name against the identifier rule and Django's own rules
///
/// # Errors
///
/// Returns [`FieldError::InvalidName`] or [`FieldError::ReservedFieldName`].
pub fn validate_field_name(name: &str) -> Result<(), FieldError> {
    if !is_identifier(name) {
        return Err(FieldError::InvalidName {
            name: name.to_string(),
        });
    }

    let reason = if PYTHON_KEYWORDS.contains(&name) {
        Some("it is a Python keyword")
    } else if name == "pk" {
        Some("'pk' is reserved by Django for the primary key")
    } else if name.contains("__") {
        Some("Django field names cannot contain '__'")
    } else if name.ends_with('_') {
        Some("Django field names cannot end with an underscore")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(FieldError::ReservedFieldName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn invalid_value(name: ModifierName, value: &str, reason: &str) -> FieldError {
    FieldError::InvalidModifierValue {
        modifier: name.token().to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_count(name: ModifierName, value: &str, min: u32) -> Result<u32, FieldError> {
    match value.parse::<u32>() {
        Ok(n) if n >= min => Ok(n),
        _ => Err(invalid_value(
            name,
            value,
            if min == 0 {
                "expected a non-negative integer"
            } else {
                "expected a positive integer"
            },
        )),
    }
}

fn parse_default(kind: FieldKind, value: &str) -> Result<DefaultValue, FieldError> {
    let name = ModifierName::Default;
    match kind {
        FieldKind::Integer | FieldKind::BigInteger => value
            .parse::<i64>()
            .map(DefaultValue::Integer)
            .map_err(|_| invalid_value(name, value, "expected an integer")),
        FieldKind::PositiveInteger => match value.parse::<i64>() {
            Ok(n) if n >= 0 => Ok(DefaultValue::Integer(n)),
            _ => Err(invalid_value(name, value, "expected a non-negative integer")),
        },
        FieldKind::SmallInteger => value
            .parse::<i16>()
            .map(|n| DefaultValue::Integer(n.into()))
            .map_err(|_| invalid_value(name, value, "expected an integer between -32768 and 32767")),
        FieldKind::PositiveSmallInteger => match value.parse::<i16>() {
            Ok(n) if n >= 0 => Ok(DefaultValue::Integer(n.into())),
            _ => Err(invalid_value(name, value, "expected an integer between 0 and 32767")),
        },
        FieldKind::Float => match value.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(DefaultValue::Float(value.to_string())),
            _ => Err(invalid_value(name, value, "expected a finite number")),
        },
        FieldKind::Decimal => {
            if is_decimal_literal(value) {
                Ok(DefaultValue::Decimal(value.to_string()))
            } else {
                Err(invalid_value(name, value, "expected a decimal such as 9.99"))
            }
        }
        FieldKind::Boolean => {
            if value.eq_ignore_ascii_case("true") {
                Ok(DefaultValue::Boolean(true))
            } else if value.eq_ignore_ascii_case("false") {
                Ok(DefaultValue::Boolean(false))
            } else {
                Err(invalid_value(name, value, "expected true or false"))
            }
        }
        _ => Ok(DefaultValue::Text(value.to_string())),
    }
}

fn is_decimal_literal(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, "0"));
    !whole.is_empty()
        && !fraction.is_empty()
        && whole.chars().all(|c| c.is_ascii_digit())
        && fraction.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_short_text() {
        let field = FieldDescriptor::parse("title:ShortText").unwrap();
        assert_eq!(field.name(), "title");
        assert_eq!(field.kind(), FieldKind::ShortText);
        assert!(field.modifiers().is_empty());
    }

    #[test]
    fn test_parse_modifiers_in_written_order() {
        let field =
            FieldDescriptor::parse("content:LongText:optional-on-save:optional-in-storage").unwrap();
        assert_eq!(
            field.modifiers(),
            &[Modifier::OptionalOnSave, Modifier::OptionalInStorage]
        );
    }

    #[test]
    fn test_parse_value_modifiers() {
        let field = FieldDescriptor::parse("slug:Slug:max-length=80:unique").unwrap();
        assert_eq!(field.modifiers(), &[Modifier::MaxLength(80), Modifier::Unique]);

        let field = FieldDescriptor::parse("price:Decimal:max-digits=8:decimal-places=0").unwrap();
        assert_eq!(
            field.modifiers(),
            &[Modifier::MaxDigits(8), Modifier::DecimalPlaces(0)]
        );
    }

    #[test]
    fn test_parse_defaults_per_kind() {
        let cases = vec![
            ("views:PositiveInteger:default=0", DefaultValue::Integer(0)),
            ("offset:Integer:default=-5", DefaultValue::Integer(-5)),
            ("ratio:Float:default=0.5", DefaultValue::Float("0.5".to_string())),
            ("price:Decimal:default=9.99", DefaultValue::Decimal("9.99".to_string())),
            ("published:Boolean:default=False", DefaultValue::Boolean(false)),
            ("status:ShortText:default=draft", DefaultValue::Text("draft".to_string())),
        ];

        for (token, expected) in cases {
            let field = FieldDescriptor::parse(token).unwrap();
            assert_eq!(field.modifiers(), &[Modifier::Default(expected)], "{token}");
        }
    }

    #[test]
    fn test_values_may_contain_colons() {
        let field = FieldDescriptor::parse("opens:ShortText:default=10:30:unique").unwrap();
        assert_eq!(
            field.modifiers(),
            &[
                Modifier::Default(DefaultValue::Text("10:30".to_string())),
                Modifier::Unique
            ]
        );
        assert_eq!(field.to_string(), "opens:ShortText:default=10:30:unique");

        let field = FieldDescriptor::parse("scan:File:upload-to=c:/scans:optional-on-save").unwrap();
        assert_eq!(
            field.modifiers(),
            &[Modifier::UploadTo("c:/scans".to_string()), Modifier::OptionalOnSave]
        );

        let err = FieldDescriptor::parse("title:ShortText:unique:bogus").unwrap_err();
        assert!(matches!(err, FieldError::UnknownModifier { .. }));
    }

    #[test]
    fn test_parse_relation() {
        let field = FieldDescriptor::parse("author:ForeignKey:to=Author:on-delete=protect").unwrap();
        assert_eq!(field.kind(), FieldKind::ForeignKey);
        assert_eq!(
            field.modifiers(),
            &[
                Modifier::To("Author".to_string()),
                Modifier::OnDelete(OnDelete::Protect)
            ]
        );

        let field = FieldDescriptor::parse("owner:OneToOne:to=auth.User").unwrap();
        assert_eq!(field.modifiers(), &[Modifier::To("auth.User".to_string())]);
    }

    #[test]
    fn test_relation_requires_target() {
        let err = FieldDescriptor::parse("author:ForeignKey").unwrap_err();
        assert_eq!(
            err,
            FieldError::MissingRequiredModifier {
                modifier: "to",
                kind: FieldKind::ForeignKey
            }
        );
    }

    #[test]
    fn test_set_null_requires_nullable_column() {
        let err = FieldDescriptor::parse("author:ForeignKey:to=Author:on-delete=set-null").unwrap_err();
        assert!(matches!(err, FieldError::InvalidModifierValue { .. }));

        assert!(FieldDescriptor::parse(
            "author:ForeignKey:to=Author:on-delete=set-null:optional-in-storage"
        )
        .is_ok());
    }

    #[test]
    fn test_parse_malformed() {
        for token in ["invalid", "", ":ShortText", "title:"] {
            assert!(
                matches!(
                    FieldDescriptor::parse(token),
                    Err(FieldError::MalformedToken { .. })
                ),
                "{token}"
            );
        }
    }

    #[test]
    fn test_parse_invalid_field_name() {
        assert!(matches!(
            FieldDescriptor::parse("123invalid:ShortText"),
            Err(FieldError::InvalidName { .. })
        ));
        assert!(matches!(
            FieldDescriptor::parse("invalid-name:ShortText"),
            Err(FieldError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_parse_reserved_field_names() {
        for token in ["class:ShortText", "pk:Integer", "a__b:Integer", "trailing_:Integer"] {
            assert!(
                matches!(
                    FieldDescriptor::parse(token),
                    Err(FieldError::ReservedFieldName { .. })
                ),
                "{token}"
            );
        }
    }

    #[test]
    fn test_unknown_kind_reports_position() {
        let err = FieldDescriptor::parse("title:UnknownKind").unwrap_err();
        assert_eq!(
            err,
            FieldError::UnknownKind {
                kind: "UnknownKind".to_string(),
                position: 6
            }
        );
    }

    #[test]
    fn test_kind_match_is_case_sensitive() {
        assert!(matches!(
            FieldDescriptor::parse("title:shorttext"),
            Err(FieldError::UnknownKind { .. })
        ));
    }

    #[test]
    fn test_unknown_modifier() {
        let err = FieldDescriptor::parse("title:ShortText:sparkly").unwrap_err();
        assert_eq!(
            err,
            FieldError::UnknownModifier {
                modifier: "sparkly".to_string(),
                kind: FieldKind::ShortText
            }
        );
    }

    #[test]
    fn test_incompatible_modifier() {
        let err = FieldDescriptor::parse("published:Boolean:max-length=5").unwrap_err();
        assert_eq!(
            err,
            FieldError::IncompatibleModifier {
                modifier: "max-length".to_string(),
                kind: FieldKind::Boolean
            }
        );

        let err = FieldDescriptor::parse("tags:ManyToMany:to=Tag:optional-in-storage").unwrap_err();
        assert!(matches!(err, FieldError::IncompatibleModifier { .. }));
    }

    #[test]
    fn test_modifier_value_errors() {
        assert!(matches!(
            FieldDescriptor::parse("title:ShortText:max-length"),
            Err(FieldError::MissingModifierValue { .. })
        ));
        assert!(matches!(
            FieldDescriptor::parse("title:ShortText:max-length=0"),
            Err(FieldError::InvalidModifierValue { .. })
        ));
        assert!(matches!(
            FieldDescriptor::parse("title:ShortText:unique=yes"),
            Err(FieldError::InvalidModifierValue { .. })
        ));
        assert!(matches!(
            FieldDescriptor::parse("count:Integer:default=many"),
            Err(FieldError::InvalidModifierValue { .. })
        ));
        assert!(matches!(
            FieldDescriptor::parse("views:PositiveInteger:default=-1"),
            Err(FieldError::InvalidModifierValue { .. })
        ));
        assert!(matches!(
            FieldDescriptor::parse("ratio:Float:default=inf"),
            Err(FieldError::InvalidModifierValue { .. })
        ));
    }

    #[test]
    fn test_duplicate_modifier() {
        let err = FieldDescriptor::parse("title:ShortText:unique:unique").unwrap_err();
        assert_eq!(
            err,
            FieldError::DuplicateModifier {
                modifier: "unique".to_string()
            }
        );
    }

    #[test]
    fn test_every_kind_has_a_minimal_valid_token() {
        for kind in FieldKind::ALL {
            let token = if kind.is_relation() {
                format!("field:{kind}:to=Other")
            } else {
                format!("field:{kind}")
            };
            assert!(FieldDescriptor::parse(&token).is_ok(), "{token}");
        }
    }

    #[test]
    fn test_compatibility_table_matches_parser() {
        for kind in FieldKind::ALL {
            for modifier in ModifierName::ALL {
                if kind.accepts(modifier) {
                    continue;
                }
                let segment = if modifier.takes_value() {
                    format!("{modifier}=1")
                } else {
                    modifier.token().to_string()
                };
                let token = format!("field:{kind}:{segment}");
                assert!(
                    matches!(
                        FieldDescriptor::parse(&token),
                        Err(FieldError::IncompatibleModifier { .. })
                    ),
                    "{token}"
                );
            }
        }
    }

    #[test]
    fn test_display_round_trips() {
        let token = "author:ForeignKey:to=Author:on-delete=set-null:optional-in-storage";
        let field = FieldDescriptor::parse(token).unwrap();
        assert_eq!(field.to_string(), token);
        assert_eq!(token.parse::<FieldDescriptor>().unwrap(), field);
    }

    #[test]
    fn test_canonical_modifier_order() {
        let field = FieldDescriptor::parse("email:Email:unique:max-length=120").unwrap();
        let names: Vec<ModifierName> = field.canonical_modifiers().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec![ModifierName::MaxLength, ModifierName::Unique]);
    }
}
