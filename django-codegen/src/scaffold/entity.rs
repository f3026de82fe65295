//! Entity model and its builder
//!
//! An [`EntityBuilder`] collects fields one at a time, rejecting problems as
//! soon as they are introduced, and produces an immutable [`EntityModel`].

use tracing::warn;

use super::field_type::{is_dotted_identifier, is_identifier, FieldDescriptor, FieldKind, PYTHON_KEYWORDS};
use super::helpers::TemplateHelpers;
use crate::config::GeneratorConfig;
use crate::error::SpecificationError;

/// Names that collide with Django or with generated declarations
const RESERVED_ENTITY_NAMES: &[&str] = &["Meta", "Model"];

/// Suffix of the generated registration class
const REGISTRATION_SUFFIX: &str = "Admin";

/// Columns every model has without declaring them
const IMPLICIT_ORDERING_FIELDS: &[&str] = &["id", "pk"];

/// Complete, validated description of one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityModel {
    name: String,
    fields: Vec<FieldDescriptor>,
    base_type: Option<String>,
    ordering: Vec<String>,
}

impl EntityModel {
    /// Entity name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Base type, if one was given or configured
    #[must_use]
    pub fn base_type(&self) -> Option<&str> {
        self.base_type.as_deref()
    }

    /// `Meta.ordering` entries
    #[must_use]
    pub fn ordering(&self) -> &[String] {
        &self.ordering
    }

    /// Check that every ordering entry names a field of the model
    ///
    /// `existing` holds the names the model already declares in its source
    /// file; fields of this entity and `id`/`pk` are always known.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError::UnknownOrderingField`] for the first
    /// entry that names nothing.
    pub fn check_ordering(&self, existing: &[String]) -> Result<(), SpecificationError> {
        for entry in &self.ordering {
            let field = ordering_field(entry);
            let known = IMPLICIT_ORDERING_FIELDS.contains(&field)
                || self.fields.iter().any(|f| f.name() == field)
                || existing.iter().any(|name| name == field);
            if !known {
                return Err(SpecificationError::UnknownOrderingField {
                    entity: self.name.clone(),
                    field: entry.clone(),
                });
            }
        }
        Ok(())
    }

    /// Fields usable in an admin `list_display`
    pub fn listable_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(|field| field.kind() != FieldKind::ManyToMany)
    }
}

/// Incremental builder for [`EntityModel`]
///
/// # Examples
///
/// ```
/// use django_codegen::config::GeneratorConfig;
/// use django_codegen::scaffold::EntityBuilder;
///
/// let config = GeneratorConfig::default();
/// let mut builder = EntityBuilder::new("Blog", &config).unwrap();
/// builder.add_token("title:ShortText").unwrap();
/// assert!(builder.add_token("title:LongText").is_err());
///
/// let entity = builder.build().unwrap();
/// assert_eq!(entity.fields().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
    base_type: Option<String>,
    ordering: Vec<String>,
    allow_empty: bool,
}

impl EntityBuilder {
    /// Start a builder for the entity `name`
    ///
    /// The configured default base type is used unless
    /// [`with_base_type`](Self::with_base_type) overrides it.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not an identifier or is reserved.
    pub fn new(name: impl Into<String>, config: &GeneratorConfig) -> Result<Self, SpecificationError> {
        let name = name.into();
        validate_entity_name(&name)?;

        if !TemplateHelpers::is_pascal_case(&name) {
            warn!(entity = %name, "entity name is not PascalCase");
        }

        Ok(Self {
            name,
            fields: Vec::new(),
            base_type: config.default_base_type.clone(),
            ordering: Vec::new(),
            allow_empty: config.allow_empty_entity,
        })
    }

    /// Override the base type
    #[must_use]
    pub fn with_base_type(mut self, base: impl Into<String>) -> Self {
        self.base_type = Some(base.into());
        self
    }

    /// Set `Meta.ordering`; entries may start with `-`
    #[must_use]
    pub fn with_ordering(mut self, ordering: Vec<String>) -> Self {
        self.ordering = ordering;
        self
    }

    /// Entity name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields accepted so far
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Add a parsed field
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError::DuplicateField`] if a field with the same
    /// name was already added.
    pub fn add_field(&mut self, field: FieldDescriptor) -> Result<(), SpecificationError> {
        if self.fields.iter().any(|f| f.name() == field.name()) {
            return Err(SpecificationError::DuplicateField {
                name: field.name().to_string(),
            });
        }
        self.fields.push(field);
        Ok(())
    }

    /// Parse a field token and add it
    ///
    /// # Errors
    ///
    /// Returns an error if the token does not parse or the name is taken.
    pub fn add_token(&mut self, token: &str) -> Result<&FieldDescriptor, SpecificationError> {
        let field =
            FieldDescriptor::parse(token).map_err(|source| SpecificationError::field(token, source))?;
        self.add_field(field)?;
        Ok(&self.fields[self.fields.len() - 1])
    }

    /// Check everything [`build`](Self::build) checks, without building
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn validate(&self) -> Result<(), SpecificationError> {
        if self.fields.is_empty() && !self.allow_empty {
            return Err(SpecificationError::EmptyEntity {
                name: self.name.clone(),
            });
        }

        if let Some(base) = &self.base_type {
            if !is_dotted_identifier(base) {
                return Err(SpecificationError::InvalidBaseType { base: base.clone() });
            }
        }

        for entry in &self.ordering {
            if !is_identifier(ordering_field(entry)) {
                return Err(SpecificationError::InvalidOrdering {
                    entry: entry.clone(),
                });
            }
        }

        Ok(())
    }

    /// Produce the entity model
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No fields were added and empty entities are not allowed
    /// - The base type is not a dotted identifier path
    /// - An ordering entry is not a field name with an optional `-`
    ///
    /// Ordering entries may name fields the model already has on disk;
    /// [`EntityModel::check_ordering`] resolves them once those are known.
    pub fn build(&self) -> Result<EntityModel, SpecificationError> {
        self.validate()?;
        Ok(EntityModel {
            name: self.name.clone(),
            fields: self.fields.clone(),
            base_type: self.base_type.clone(),
            ordering: self.ordering.clone(),
        })
    }
}

/// Field named by an ordering entry
fn ordering_field(entry: &str) -> &str {
    entry.strip_prefix('-').unwrap_or(entry)
}

/// Validate an entity name
///
/// # Errors
///
/// Returns [`SpecificationError::InvalidEntityName`] or
/// [`SpecificationError::ReservedName`].
pub fn validate_entity_name(name: &str) -> Result<(), SpecificationError> {
    if !is_identifier(name) {
        return Err(SpecificationError::InvalidEntityName {
            name: name.to_string(),
        });
    }

    let reason = if PYTHON_KEYWORDS.contains(&name) {
        Some("it is a Python keyword")
    } else if RESERVED_ENTITY_NAMES.contains(&name) {
        Some("it collides with a Django name")
    } else if name.ends_with(REGISTRATION_SUFFIX) {
        Some("names ending in 'Admin' collide with generated registration classes")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(SpecificationError::ReservedName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
