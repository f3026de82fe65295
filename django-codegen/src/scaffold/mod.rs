//! Entity description, field grammar and template emission
//!
//! This module turns a field specification into an [`EntityModel`] and
//! renders that model into [`ArtifactFragment`]s for the Django definition,
//! registration and routes artifacts.

pub mod emitter;
pub mod entity;
pub mod field_type;
pub mod fragment;
pub mod helpers;
pub mod templates;

pub use emitter::{django_class, render_declaration, TemplateEmitter};
pub use entity::{EntityBuilder, EntityModel};
pub use field_type::{DefaultValue, FieldDescriptor, FieldKind, Modifier, ModifierName, OnDelete};
pub use fragment::{ArtifactFragment, ArtifactKind, Container, FragmentTag, Role};
pub use helpers::TemplateHelpers;
