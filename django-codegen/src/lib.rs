//! Code generation engine for Django projects
//!
//! Turns a compact field specification such as
//! `Blog title:ShortText content:LongText:optional-on-save` into Django
//! sources (a model definition, an admin registration and URL routes) and
//! merges newly generated declarations into files that already exist without
//! disturbing what is already there.
//!
//! # Pipeline
//!
//! 1. [`scaffold::FieldDescriptor::parse`] validates one field token.
//! 2. [`scaffold::EntityBuilder`] assembles an [`scaffold::EntityModel`],
//!    either from tokens or through an interactive [`session::Session`].
//! 3. [`scaffold::TemplateEmitter`] renders the model into
//!    [`scaffold::ArtifactFragment`]s.
//! 4. [`merge::MergeEngine`] splices fragments into existing sources.
//! 5. [`generator::Generator`] decides per artifact whether to create or
//!    merge, formats the result and writes it.
//!
//! # Example
//!
//! ```rust
//! use django_codegen::config::GeneratorConfig;
//! use django_codegen::generator::{Generator, MemoryStore, NoopFormatter};
//! use django_codegen::scaffold::{ArtifactKind, EntityBuilder};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = GeneratorConfig::default();
//! let mut builder = EntityBuilder::new("Blog", &config)?;
//! builder.add_token("title:ShortText")?;
//! let entity = builder.build()?;
//!
//! let generator = Generator::new(&config, MemoryStore::new(), NoopFormatter)?;
//! let summary = generator.generate(&entity, &[ArtifactKind::Definition])?;
//! assert!(summary.is_success());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod generator;
pub mod merge;
pub mod observability;
pub mod scaffold;
pub mod session;

pub use config::GeneratorConfig;
pub use error::{ErrorClass, FieldError, GenerateError, MergeError, SpecificationError};
pub use generator::{Generator, Summary};
pub use scaffold::{ArtifactFragment, ArtifactKind, EntityBuilder, EntityModel, FieldDescriptor, FieldKind};
