//! Template emitter
//!
//! Renders an [`EntityModel`] into [`ArtifactFragment`]s. Each artifact
//! yields its imports first, then its container declaration, then one member
//! fragment per field or route so the merge engine can add members to a
//! container that already exists.
//!
//! [`render_declaration`] is the only place where field kinds and modifiers
//! become Django syntax.

use minijinja::{AutoEscape, Environment};
use serde_json::json;

use super::entity::EntityModel;
use super::field_type::{DefaultValue, FieldDescriptor, FieldKind, Modifier, ModifierName, OnDelete};
use super::fragment::{ArtifactFragment, ArtifactKind, Container, FragmentTag, Role};
use super::helpers::TemplateHelpers;
use super::templates::{self, names};
use crate::config::GeneratorConfig;

/// Base type used when neither the entity nor the configuration names one
pub const FALLBACK_BASE_TYPE: &str = "models.Model";

const ADMIN_BASE: &str = "admin.ModelAdmin";
const URL_TABLE_NAME: &str = "urlpatterns";
const LIST_DISPLAY_NAME: &str = "list_display";
const DEFAULT_MAX_LENGTH: u32 = 250;
const DEFAULT_MAX_DIGITS: u32 = 10;
const DEFAULT_DECIMAL_PLACES: u32 = 2;

/// Renders entities into fragments and new files
pub struct TemplateEmitter {
    env: Environment<'static>,
    default_base: Option<String>,
}

impl TemplateEmitter {
    /// Create an emitter with the built-in templates
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in template fails to compile.
    pub fn new(config: &GeneratorConfig) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_template(names::MODEL, templates::MODEL)?;
        env.add_template(names::META, templates::META)?;
        env.add_template(names::ORDERING, templates::ORDERING)?;
        env.add_template(names::ADMIN, templates::ADMIN)?;
        env.add_template(names::LIST_DISPLAY, templates::LIST_DISPLAY)?;
        env.add_template(names::URL_TABLE, templates::URL_TABLE)?;
        env.add_template(names::URL_ENTRY, templates::URL_ENTRY)?;
        env.add_template(names::NEW_FILE, templates::NEW_FILE)?;

        Ok(Self {
            env,
            default_base: config.default_base_type.clone(),
        })
    }

    /// Render fragments for each requested artifact, in request order
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn emit(
        &self,
        entity: &EntityModel,
        kinds: &[ArtifactKind],
    ) -> Result<Vec<ArtifactFragment>, minijinja::Error> {
        let mut fragments = Vec::new();
        let mut seen = Vec::with_capacity(kinds.len());
        for kind in kinds {
            if seen.contains(kind) {
                continue;
            }
            seen.push(*kind);
            fragments.extend(self.emit_artifact(entity, *kind)?);
        }
        Ok(fragments)
    }

    /// Render the fragments of one artifact
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn emit_artifact(
        &self,
        entity: &EntityModel,
        kind: ArtifactKind,
    ) -> Result<Vec<ArtifactFragment>, minijinja::Error> {
        match kind {
            ArtifactKind::Definition => self.definition(entity),
            ArtifactKind::Registration => self.registration(entity),
            ArtifactKind::Routes => self.routes(entity),
        }
    }

    /// Render a complete file for `kind` from its fragments
    ///
    /// Import lines from the same module are combined; nested containers and
    /// member fragments are skipped because the module-level declarations
    /// already include them.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn new_file(
        &self,
        kind: ArtifactKind,
        fragments: &[ArtifactFragment],
    ) -> Result<String, minijinja::Error> {
        let mut modules: Vec<(&str, Vec<&str>)> = Vec::new();
        let mut blocks = Vec::new();

        for fragment in fragments.iter().filter(|f| f.artifact() == kind) {
            match fragment.role() {
                Role::Import => {
                    let Some((module, name)) = split_import(fragment.text()) else {
                        blocks.push(fragment.text());
                        continue;
                    };
                    match modules.iter_mut().find(|(m, _)| *m == module) {
                        Some((_, bound)) if !bound.contains(&name) => bound.push(name),
                        Some(_) => {}
                        None => modules.push((module, vec![name])),
                    }
                }
                Role::Container if *fragment.container() == Container::Module => {
                    blocks.push(fragment.text());
                }
                Role::Container | Role::Member => {}
            }
        }

        let imports: Vec<String> = modules
            .iter()
            .map(|(module, bound)| format!("from {module} import {}", bound.join(", ")))
            .collect();

        self.env
            .get_template(names::NEW_FILE)?
            .render(json!({ "imports": imports, "blocks": blocks }))
    }

    fn render(&self, name: &str, ctx: serde_json::Value) -> Result<String, minijinja::Error> {
        let text = self.env.get_template(name)?.render(ctx)?;
        Ok(text.trim_end().to_string())
    }

    fn definition(&self, entity: &EntityModel) -> Result<Vec<ArtifactFragment>, minijinja::Error> {
        let kind = ArtifactKind::Definition;
        let mut fragments = vec![import(kind, "django.db", "models")];

        let base = entity
            .base_type()
            .or(self.default_base.as_deref())
            .unwrap_or(FALLBACK_BASE_TYPE);
        let base_name = match base.rsplit_once('.') {
            Some(("models", _)) | None => base,
            Some((module, class)) => {
                fragments.push(import(kind, module, class));
                class
            }
        };

        let needs_decimal = entity
            .fields()
            .iter()
            .any(|f| f.modifiers().iter().any(|m| matches!(m, Modifier::Default(DefaultValue::Decimal(_)))));
        if needs_decimal {
            fragments.push(import(kind, "decimal", "Decimal"));
        }

        let declarations: Vec<String> = entity.fields().iter().map(render_declaration).collect();
        let ordering = if entity.ordering().is_empty() {
            None
        } else {
            Some(self.render(names::ORDERING, json!({ "ordering": entity.ordering() }))?)
        };
        let meta = self.render(
            names::META,
            json!({
                "verbose_name": TemplateHelpers::verbose_name(entity.name()),
                "verbose_name_plural": TemplateHelpers::verbose_name_plural(entity.name()),
                "ordering": ordering,
            }),
        )?;
        let text = self.render(
            names::MODEL,
            json!({
                "name": entity.name(),
                "base": base_name,
                "meta": meta.lines().collect::<Vec<_>>(),
                "fields": declarations,
            }),
        )?;
        fragments.push(ArtifactFragment::new(
            kind,
            FragmentTag::EntityDefinition,
            entity.name(),
            Container::Module,
            text,
        ));

        let body = Container::ClassBody(entity.name().to_string());
        // an existing model gains `Meta` and its ordering when it lacks them
        if let Some(ordering) = ordering {
            fragments.push(ArtifactFragment::new(
                kind,
                FragmentTag::MetaClass,
                "Meta",
                body.clone(),
                meta,
            ));
            fragments.push(ArtifactFragment::new(
                kind,
                FragmentTag::MetaOption,
                "ordering",
                Container::ClassBody(format!("{}.Meta", entity.name())),
                ordering,
            ));
        }
        for (field, declaration) in entity.fields().iter().zip(declarations) {
            fragments.push(ArtifactFragment::new(
                kind,
                FragmentTag::FieldDeclaration,
                field.name(),
                body.clone(),
                declaration,
            ));
        }

        Ok(fragments)
    }

    fn registration(&self, entity: &EntityModel) -> Result<Vec<ArtifactFragment>, minijinja::Error> {
        let kind = ArtifactKind::Registration;
        let admin_class = TemplateHelpers::admin_class(entity.name());
        let list_display: Vec<&str> = entity.listable_fields().map(FieldDescriptor::name).collect();

        let columns = if list_display.is_empty() {
            None
        } else {
            Some(self.render(names::LIST_DISPLAY, json!({ "fields": list_display }))?)
        };
        let text = self.render(
            names::ADMIN,
            json!({
                "name": entity.name(),
                "admin_class": admin_class,
                "admin_base": ADMIN_BASE,
                "body": columns.as_deref().unwrap_or("pass"),
            }),
        )?;

        let mut fragments = vec![
            import(kind, "django.contrib", "admin"),
            import(kind, ".models", entity.name()),
            ArtifactFragment::new(
                kind,
                FragmentTag::RegistrationStub,
                admin_class.clone(),
                Container::Module,
                text,
            ),
        ];
        if let Some(columns) = columns {
            fragments.push(ArtifactFragment::new(
                kind,
                FragmentTag::ListDisplay,
                LIST_DISPLAY_NAME,
                Container::ClassBody(admin_class.clone()),
                columns,
            ));
            let list = Container::List(format!("{admin_class}.{LIST_DISPLAY_NAME}"));
            for field in list_display {
                fragments.push(ArtifactFragment::new(
                    kind,
                    FragmentTag::ListDisplayEntry,
                    field,
                    list.clone(),
                    format!("\"{field}\""),
                ));
            }
        }

        Ok(fragments)
    }

    fn routes(&self, entity: &EntityModel) -> Result<Vec<ArtifactFragment>, minijinja::Error> {
        let kind = ArtifactKind::Routes;
        let prefix = TemplateHelpers::route_prefix(entity.name());

        let mut entries = Vec::with_capacity(2);
        for (view, action, path) in [
            ("ListView", "list", prefix.clone()),
            ("DetailView", "detail", format!("{prefix}<int:pk>/")),
        ] {
            let route_name = TemplateHelpers::route_name(entity.name(), action);
            let text = self.render(
                names::URL_ENTRY,
                json!({
                    "path": path,
                    "view": view,
                    "model": entity.name(),
                    "route_name": route_name,
                }),
            )?;
            entries.push((route_name, text));
        }

        let routes: Vec<&String> = entries.iter().map(|(_, text)| text).collect();
        let table = self.render(names::URL_TABLE, json!({ "routes": routes }))?;

        let mut fragments = vec![
            import(kind, "django.urls", "path"),
            import(kind, "django.views.generic", "DetailView"),
            import(kind, "django.views.generic", "ListView"),
            import(kind, ".models", entity.name()),
            ArtifactFragment::new(
                kind,
                FragmentTag::RouteTable,
                URL_TABLE_NAME,
                Container::Module,
                table,
            ),
        ];
        let list = Container::List(URL_TABLE_NAME.to_string());
        for (route_name, text) in entries {
            fragments.push(ArtifactFragment::new(
                kind,
                FragmentTag::RouteEntry,
                route_name,
                list.clone(),
                text,
            ));
        }

        Ok(fragments)
    }
}

fn import(artifact: ArtifactKind, module: &str, name: &str) -> ArtifactFragment {
    ArtifactFragment::new(
        artifact,
        FragmentTag::Import,
        name,
        Container::Module,
        format!("from {module} import {name}"),
    )
}

fn split_import(text: &str) -> Option<(&str, &str)> {
    text.strip_prefix("from ")?.split_once(" import ")
}

/// Django model field class for a kind
#[must_use]
pub const fn django_class(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::ShortText => "CharField",
        FieldKind::LongText => "TextField",
        FieldKind::Integer => "IntegerField",
        FieldKind::BigInteger => "BigIntegerField",
        FieldKind::PositiveInteger => "PositiveIntegerField",
        FieldKind::Float => "FloatField",
        FieldKind::Decimal => "DecimalField",
        FieldKind::Boolean => "BooleanField",
        FieldKind::Date => "DateField",
        FieldKind::DateTime => "DateTimeField",
        FieldKind::Time => "TimeField",
        FieldKind::Duration => "DurationField",
        FieldKind::Email => "EmailField",
        FieldKind::Slug => "SlugField",
        FieldKind::Url => "URLField",
        FieldKind::Uuid => "UUIDField",
        FieldKind::Json => "JSONField",
        FieldKind::File => "FileField",
        FieldKind::Image => "ImageField",
        FieldKind::FilePath => "FilePathField",
        FieldKind::Binary => "BinaryField",
        FieldKind::SmallInteger => "SmallIntegerField",
        FieldKind::PositiveSmallInteger => "PositiveSmallIntegerField",
        FieldKind::SmallAuto => "SmallAutoField",
        FieldKind::IpAddress => "GenericIPAddressField",
        FieldKind::ForeignKey => "ForeignKey",
        FieldKind::OneToOne => "OneToOneField",
        FieldKind::ManyToMany => "ManyToManyField",
    }
}

/// Option a kind renders when the modifier is absent
fn implied_option(kind: FieldKind, name: ModifierName) -> Option<String> {
    match (kind, name) {
        (FieldKind::ShortText, ModifierName::MaxLength) => {
            Some(format!("max_length={DEFAULT_MAX_LENGTH}"))
        }
        (FieldKind::Decimal, ModifierName::MaxDigits) => {
            Some(format!("max_digits={DEFAULT_MAX_DIGITS}"))
        }
        (FieldKind::Decimal, ModifierName::DecimalPlaces) => {
            Some(format!("decimal_places={DEFAULT_DECIMAL_PLACES}"))
        }
        (FieldKind::ForeignKey | FieldKind::OneToOne, ModifierName::OnDelete) => {
            Some(render_option(&Modifier::OnDelete(OnDelete::Cascade)))
        }
        _ => None,
    }
}

fn render_option(modifier: &Modifier) -> String {
    match modifier {
        Modifier::To(model) => python_string(model),
        Modifier::OnDelete(policy) => {
            let constant = match policy {
                OnDelete::Cascade => "CASCADE",
                OnDelete::Protect => "PROTECT",
                OnDelete::Restrict => "RESTRICT",
                OnDelete::SetNull => "SET_NULL",
                OnDelete::SetDefault => "SET_DEFAULT",
                OnDelete::DoNothing => "DO_NOTHING",
            };
            format!("on_delete=models.{constant}")
        }
        Modifier::MaxLength(n) => format!("max_length={n}"),
        Modifier::MaxDigits(n) => format!("max_digits={n}"),
        Modifier::DecimalPlaces(n) => format!("decimal_places={n}"),
        Modifier::UploadTo(path) => format!("upload_to={}", python_string(path)),
        Modifier::AutoNow => "auto_now=True".to_string(),
        Modifier::AutoNowAdd => "auto_now_add=True".to_string(),
        Modifier::Default(value) => {
            let literal = match value {
                DefaultValue::Integer(n) => n.to_string(),
                DefaultValue::Float(text) => text.clone(),
                DefaultValue::Decimal(text) => format!("Decimal({})", python_string(text)),
                DefaultValue::Boolean(true) => "True".to_string(),
                DefaultValue::Boolean(false) => "False".to_string(),
                DefaultValue::Text(text) => python_string(text),
            };
            format!("default={literal}")
        }
        Modifier::Unique => "unique=True".to_string(),
        Modifier::Indexed => "db_index=True".to_string(),
        Modifier::OptionalOnSave => "blank=True".to_string(),
        Modifier::OptionalInStorage => "null=True".to_string(),
    }
}

/// Render one field as a class-body assignment
///
/// Options always appear in canonical order regardless of the order the
/// modifiers were written in.
///
/// # Examples
///
/// ```
/// use django_codegen::scaffold::{render_declaration, FieldDescriptor};
///
/// let field = FieldDescriptor::parse("content:LongText:optional-in-storage:optional-on-save").unwrap();
/// assert_eq!(
///     render_declaration(&field),
///     "content = models.TextField(blank=True, null=True)"
/// );
/// ```
#[must_use]
pub fn render_declaration(field: &FieldDescriptor) -> String {
    let kind = field.kind();
    let mut options = Vec::new();
    // Django rejects an auto field that is not the primary key
    if kind == FieldKind::SmallAuto {
        options.push("primary_key=True".to_string());
    }

    for name in ModifierName::ALL {
        let given = field.modifiers().iter().find(|m| m.name() == name);
        match given {
            Some(modifier) => options.push(render_option(modifier)),
            None => options.extend(implied_option(kind, name)),
        }
    }

    format!(
        "{} = models.{}({})",
        field.name(),
        django_class(kind),
        options.join(", ")
    )
}

/// Double-quoted Python string literal
fn python_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
