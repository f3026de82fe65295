//! Generation orchestrator
//!
//! For each requested artifact the [`Generator`] resolves the output path,
//! then either renders a new file or merges the artifact's fragments into
//! the existing one, formats the result and writes it. Work is split in two
//! phases:
//!
//! - [`Generator::plan`] computes every outcome in memory without writing
//! - [`Generator::apply`] writes the planned changes and reports a [`Summary`]
//!
//! Artifacts that resolve to the same path are planned one after the other
//! against a staged copy, so later artifacts see the earlier ones' changes.
//! A failing artifact never prevents the others from being written.

pub mod format;
pub mod store;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use minijinja::{context, Environment};
use tracing::{debug, info, warn};

pub use format::{CommandFormatter, Formatter, NoopFormatter, SourceKind};
pub use store::{DiskStore, FileStore, MemoryStore};

use crate::config::GeneratorConfig;
use crate::error::{ArtifactError, ErrorClass, GenerateError};
use crate::merge::{Change, MergeEngine};
use crate::scaffold::{ArtifactFragment, ArtifactKind, EntityModel, TemplateEmitter, TemplateHelpers};

/// What will happen to one artifact
#[derive(Debug)]
pub enum PlannedOutcome {
    /// The file does not exist and will be created
    Create,
    /// The file exists and will be rewritten with merged content
    Update,
    /// The file already contains every generated declaration
    Unchanged,
    /// The artifact cannot be generated; its file is left alone
    Failed(ArtifactError),
}

impl PlannedOutcome {
    /// Whether applying the plan writes this artifact
    #[must_use]
    pub const fn writes(&self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

/// Planned result for one artifact
#[derive(Debug)]
pub struct PlannedArtifact {
    /// Artifact
    pub kind: ArtifactKind,
    /// Output path relative to the project root, if it could be resolved
    pub path: Option<PathBuf>,
    /// Content before generation, `None` for a new file
    pub before: Option<String>,
    /// Content to write, for [`PlannedOutcome::Create`] and [`PlannedOutcome::Update`]
    pub after: Option<String>,
    /// Planned outcome
    pub outcome: PlannedOutcome,
}

/// Outcomes of every requested artifact, computed without writing
#[derive(Debug)]
pub struct Plan {
    entity: String,
    artifacts: Vec<PlannedArtifact>,
}

impl Plan {
    /// Entity the plan was made for
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Planned artifacts in request order
    #[must_use]
    pub fn artifacts(&self) -> &[PlannedArtifact] {
        &self.artifacts
    }

    /// Whether applying the plan would write anything
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.artifacts.iter().any(|a| a.outcome.writes())
    }

    /// Class of the first artifact that cannot be generated
    #[must_use]
    pub fn failure_class(&self) -> Option<ErrorClass> {
        self.artifacts.iter().find_map(|a| match &a.outcome {
            PlannedOutcome::Failed(err) => Some(err.class()),
            _ => None,
        })
    }
}

/// Final status of one artifact
#[derive(Debug)]
pub enum Status {
    /// New file written
    Created,
    /// Existing file rewritten
    Updated,
    /// Nothing to do
    Unchanged,
    /// Not generated; the file was left untouched
    Failed(ArtifactError),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Updated => f.write_str("updated"),
            Self::Unchanged => f.write_str("unchanged"),
            Self::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

/// Result for one artifact
#[derive(Debug)]
pub struct Report {
    /// Artifact
    pub kind: ArtifactKind,
    /// Output path, if it could be resolved
    pub path: Option<PathBuf>,
    /// What happened
    pub status: Status,
}

/// Results of a generation run
#[derive(Debug)]
pub struct Summary {
    entity: String,
    reports: Vec<Report>,
}

impl Summary {
    /// Entity the artifacts were generated for
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// One report per artifact, in request order
    #[must_use]
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// Report for `kind`
    #[must_use]
    pub fn report(&self, kind: ArtifactKind) -> Option<&Report> {
        self.reports.iter().find(|r| r.kind == kind)
    }

    /// Failed artifacts and their errors
    pub fn failures(&self) -> impl Iterator<Item = (ArtifactKind, &ArtifactError)> {
        self.reports.iter().filter_map(|r| match &r.status {
            Status::Failed(err) => Some((r.kind, err)),
            _ => None,
        })
    }

    /// Whether every artifact succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Class of the first failure
    #[must_use]
    pub fn failure_class(&self) -> Option<ErrorClass> {
        self.failures().next().map(|(_, err)| err.class())
    }

    /// Process exit code: 0, or the code of the first failure
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.failure_class().map_or(0, ErrorClass::exit_code)
    }
}

/// Creates or updates the artifacts of an entity
pub struct Generator<S, F> {
    config: GeneratorConfig,
    emitter: TemplateEmitter,
    merge: MergeEngine,
    paths: Environment<'static>,
    store: S,
    formatter: F,
}

impl<S: FileStore, F: Formatter> Generator<S, F> {
    /// Create a generator writing through `store`
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in template fails to compile.
    pub fn new(config: &GeneratorConfig, store: S, formatter: F) -> Result<Self, GenerateError> {
        let mut paths = Environment::new();
        paths.set_auto_escape_callback(|_| minijinja::AutoEscape::None);

        Ok(Self {
            config: config.clone(),
            emitter: TemplateEmitter::new(config)?,
            merge: MergeEngine::python(),
            paths,
            store,
            formatter,
        })
    }

    /// File store
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Output path of `kind` for `entity`, relative to the project root
    ///
    /// # Errors
    ///
    /// Returns an error if the configured path template fails to render.
    pub fn output_path(&self, entity: &EntityModel, kind: ArtifactKind) -> Result<PathBuf, ArtifactError> {
        let rendered = self
            .paths
            .render_str(
                self.config.output_layout.template(kind),
                context! {
                    app => &self.config.app,
                    entity => entity.name(),
                    entity_snake => TemplateHelpers::to_snake_case(entity.name()),
                },
            )
            .map_err(ArtifactError::Path)?;
        Ok(PathBuf::from(rendered.trim()))
    }

    /// Compute the outcome of every artifact without writing
    ///
    /// Requested kinds are de-duplicated, keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns an error if an ordering entry names a field that neither the
    /// entity nor its existing definition declares, or if the fragment
    /// templates fail to render. Every other per-artifact problem is
    /// recorded in the plan instead.
    pub fn plan(&self, entity: &EntityModel, kinds: &[ArtifactKind]) -> Result<Plan, GenerateError> {
        if kinds.contains(&ArtifactKind::Definition) {
            entity.check_ordering(&self.declared_fields(entity))?;
        }
        let fragments = self.emitter.emit(entity, kinds)?;
        let mut staged: BTreeMap<PathBuf, String> = BTreeMap::new();
        let mut artifacts = Vec::with_capacity(kinds.len());
        let mut seen = Vec::with_capacity(kinds.len());

        for &kind in kinds {
            if seen.contains(&kind) {
                continue;
            }
            seen.push(kind);

            let own: Vec<ArtifactFragment> = fragments
                .iter()
                .filter(|f| f.artifact() == kind)
                .cloned()
                .collect();
            let planned = self.plan_artifact(entity, kind, &own, &mut staged);
            debug!(artifact = %kind, outcome = ?planned.outcome, "artifact planned");
            artifacts.push(planned);
        }

        Ok(Plan {
            entity: entity.name().to_string(),
            artifacts,
        })
    }

    /// Names the model already declares in its definition file
    ///
    /// A file that cannot be read or parsed counts as empty; the definition
    /// artifact reports that failure itself.
    fn declared_fields(&self, entity: &EntityModel) -> Vec<String> {
        if entity.ordering().is_empty() {
            return Vec::new();
        }
        let Ok(path) = self.output_path(entity, ArtifactKind::Definition) else {
            return Vec::new();
        };
        match self.store.read_if_exists(&path) {
            Ok(Some(text)) => self.merge.class_members(&text, entity.name()).unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn plan_artifact(
        &self,
        entity: &EntityModel,
        kind: ArtifactKind,
        fragments: &[ArtifactFragment],
        staged: &mut BTreeMap<PathBuf, String>,
    ) -> PlannedArtifact {
        let mut planned = PlannedArtifact {
            kind,
            path: None,
            before: None,
            after: None,
            outcome: PlannedOutcome::Unchanged,
        };

        let path = match self.output_path(entity, kind) {
            Ok(path) => path,
            Err(err) => {
                planned.outcome = PlannedOutcome::Failed(err);
                return planned;
            }
        };
        planned.path = Some(path.clone());

        let current = match staged.get(&path) {
            Some(text) => Some(text.clone()),
            None => match self.store.read_if_exists(&path) {
                Ok(text) => text,
                Err(source) => {
                    planned.outcome = PlannedOutcome::Failed(ArtifactError::Read { path, source });
                    return planned;
                }
            },
        };

        let result = match &current {
            None => self.create(kind, fragments, &path),
            Some(existing) => self.update(existing, fragments, &path),
        };
        planned.before = current;

        match result {
            Ok(Some(text)) => {
                planned.outcome = if planned.before.is_some() {
                    PlannedOutcome::Update
                } else {
                    PlannedOutcome::Create
                };
                staged.insert(path, text.clone());
                planned.after = Some(text);
            }
            Ok(None) => planned.outcome = PlannedOutcome::Unchanged,
            Err(err) => planned.outcome = PlannedOutcome::Failed(err),
        }
        planned
    }

    fn create(
        &self,
        kind: ArtifactKind,
        fragments: &[ArtifactFragment],
        path: &Path,
    ) -> Result<Option<String>, ArtifactError> {
        let text = self
            .emitter
            .new_file(kind, fragments)
            .map_err(ArtifactError::Template)?;
        self.format(&text, path).map(Some)
    }

    /// Merge every fragment in order; `None` when nothing changed
    fn update(
        &self,
        existing: &str,
        fragments: &[ArtifactFragment],
        path: &Path,
    ) -> Result<Option<String>, ArtifactError> {
        let mut text = existing.to_string();
        let mut changed = false;
        for fragment in fragments {
            let merged = self.merge.merge(&text, fragment)?;
            if merged.change == Change::Inserted {
                changed = true;
                text = merged.text;
            }
        }

        if changed {
            self.format(&text, path).map(Some)
        } else {
            Ok(None)
        }
    }

    fn format(&self, text: &str, path: &Path) -> Result<String, ArtifactError> {
        self.formatter
            .format(text, SourceKind::Python)
            .map_err(|err| ArtifactError::Format {
                path: path.to_path_buf(),
                message: format!("{err:#}"),
            })
    }

    /// Write the planned changes
    #[must_use]
    pub fn apply(&self, plan: Plan) -> Summary {
        let mut reports = Vec::with_capacity(plan.artifacts.len());

        for artifact in plan.artifacts {
            let status = match (artifact.outcome, &artifact.path, artifact.after) {
                (outcome @ (PlannedOutcome::Create | PlannedOutcome::Update), Some(path), Some(text)) => {
                    match self.store.write(path, &text) {
                        Ok(()) if matches!(outcome, PlannedOutcome::Create) => Status::Created,
                        Ok(()) => Status::Updated,
                        Err(source) => Status::Failed(ArtifactError::Write {
                            path: path.clone(),
                            source,
                        }),
                    }
                }
                (PlannedOutcome::Failed(err), _, _) => Status::Failed(err),
                _ => Status::Unchanged,
            };

            let shown = artifact
                .path
                .as_deref()
                .map_or_else(|| "?".to_string(), |p| p.display().to_string());
            match &status {
                Status::Failed(err) => {
                    warn!(artifact = %artifact.kind, path = %shown, error = %err, "artifact failed");
                }
                status => info!(artifact = %artifact.kind, path = %shown, "{status}"),
            }

            reports.push(Report {
                kind: artifact.kind,
                path: artifact.path,
                status,
            });
        }

        Summary {
            entity: plan.entity,
            reports,
        }
    }

    /// Plan and apply in one step
    ///
    /// # Errors
    ///
    /// Same as [`plan`](Self::plan).
    pub fn generate(&self, entity: &EntityModel, kinds: &[ArtifactKind]) -> Result<Summary, GenerateError> {
        let plan = self.plan(entity, kinds)?;
        Ok(self.apply(plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputLayout;
    use crate::error::MergeError;
    use crate::scaffold::EntityBuilder;

    fn blog() -> EntityModel {
        let mut builder = EntityBuilder::new("Blog", &GeneratorConfig::default()).unwrap();
        builder.add_token("title:ShortText").unwrap();
        builder.add_token("content:LongText:optional-on-save").unwrap();
        builder.build().unwrap()
    }

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            app: "blog".to_string(),
            ..GeneratorConfig::default()
        }
    }

    fn generator(store: MemoryStore) -> Generator<MemoryStore, NoopFormatter> {
        Generator::new(&config(), store, NoopFormatter).unwrap()
    }

    struct UpperFormatter;

    impl Formatter for UpperFormatter {
        fn format(&self, text: &str, _kind: SourceKind) -> anyhow::Result<String> {
            Ok(format!("# formatted\n{text}"))
        }
    }

    struct BrokenFormatter;

    impl Formatter for BrokenFormatter {
        fn format(&self, _text: &str, _kind: SourceKind) -> anyhow::Result<String> {
            anyhow::bail!("cannot parse")
        }
    }

    #[test]
    fn test_output_paths() {
        let generator = generator(MemoryStore::new());
        assert_eq!(
            generator.output_path(&blog(), ArtifactKind::Definition).unwrap(),
            PathBuf::from("blog/models.py")
        );

        let custom = GeneratorConfig {
            output_layout: OutputLayout {
                routes: "{{ app }}/urls/{{ entity_snake }}.py".to_string(),
                ..OutputLayout::default()
            },
            ..config()
        };
        let generator = Generator::new(&custom, MemoryStore::new(), NoopFormatter).unwrap();
        let mut builder = EntityBuilder::new("UserProfile", &custom).unwrap();
        builder.add_token("bio:LongText").unwrap();
        assert_eq!(
            generator
                .output_path(&builder.build().unwrap(), ArtifactKind::Routes)
                .unwrap(),
            PathBuf::from("blog/urls/user_profile.py")
        );
    }

    #[test]
    fn test_bad_path_template_fails_only_that_artifact() {
        let broken = GeneratorConfig {
            output_layout: OutputLayout {
                registration: "{{ app }/admin.py".to_string(),
                ..OutputLayout::default()
            },
            ..config()
        };
        let store = MemoryStore::new();
        let generator = Generator::new(&broken, store.clone(), NoopFormatter).unwrap();
        let summary = generator
            .generate(&blog(), &[ArtifactKind::Definition, ArtifactKind::Registration])
            .unwrap();

        assert!(matches!(
            summary.report(ArtifactKind::Definition).unwrap().status,
            Status::Created
        ));
        assert!(matches!(
            summary.report(ArtifactKind::Registration).unwrap().status,
            Status::Failed(ArtifactError::Path(_))
        ));
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(store.paths(), vec![PathBuf::from("blog/models.py")]);
    }

    #[test]
    fn test_create_then_unchanged() {
        let store = MemoryStore::new();
        let generator = generator(store.clone());
        let kinds = [ArtifactKind::Definition, ArtifactKind::Registration, ArtifactKind::Routes];

        let first = generator.generate(&blog(), &kinds).unwrap();
        assert!(first.is_success());
        assert!(first.reports().iter().all(|r| matches!(r.status, Status::Created)));
        let written = store.get("blog/models.py").unwrap();

        let second = generator.generate(&blog(), &kinds).unwrap();
        assert!(second.reports().iter().all(|r| matches!(r.status, Status::Unchanged)));
        assert_eq!(store.get("blog/models.py").unwrap(), written);
    }

    #[test]
    fn test_plan_does_not_write() {
        let store = MemoryStore::new();
        let generator = generator(store.clone());
        let plan = generator.plan(&blog(), &[ArtifactKind::Definition]).unwrap();

        assert!(plan.has_changes());
        assert_eq!(plan.entity(), "Blog");
        assert!(matches!(plan.artifacts()[0].outcome, PlannedOutcome::Create));
        assert!(plan.artifacts()[0].after.as_deref().unwrap().contains("class Blog(models.Model):"));
        assert!(store.paths().is_empty());
    }

    #[test]
    fn test_update_merges_new_fields() {
        let existing = "from django.db import models\n\n\nclass Blog(models.Model):\n    title = models.CharField(max_length=250)\n";
        let store = MemoryStore::with_files([("blog/models.py", existing)]);
        let summary = generator(store.clone())
            .generate(&blog(), &[ArtifactKind::Definition])
            .unwrap();

        assert!(matches!(summary.reports()[0].status, Status::Updated));
        assert_eq!(
            store.get("blog/models.py").unwrap(),
            format!("{existing}    content = models.TextField(blank=True)\n")
        );
    }

    #[test]
    fn test_conflict_leaves_file_untouched() {
        let existing = "from django.db import models\n\n\nclass Blog(models.Model):\n    title = models.TextField()\n";
        let store = MemoryStore::with_files([("blog/models.py", existing)]);
        let summary = generator(store.clone())
            .generate(&blog(), &[ArtifactKind::Definition, ArtifactKind::Registration])
            .unwrap();

        assert!(!summary.is_success());
        assert!(matches!(
            summary.report(ArtifactKind::Definition).unwrap().status,
            Status::Failed(ArtifactError::Merge(MergeError::ConflictingDeclaration { .. }))
        ));
        assert!(matches!(
            summary.report(ArtifactKind::Registration).unwrap().status,
            Status::Created
        ));
        assert_eq!(summary.exit_code(), 3);
        assert_eq!(store.get("blog/models.py").unwrap(), existing);
    }

    #[test]
    fn test_non_literal_route_table_is_not_appended() {
        let existing = "from django.urls import path\n\nurlpatterns = make_patterns()\n";
        let store = MemoryStore::with_files([("blog/urls.py", existing)]);
        let summary = generator(store.clone())
            .generate(&blog(), &[ArtifactKind::Routes])
            .unwrap();

        assert!(matches!(
            summary.reports()[0].status,
            Status::Failed(ArtifactError::Merge(MergeError::UnsupportedContainer { .. }))
        ));
        assert_eq!(store.get("blog/urls.py").unwrap(), existing);
    }

    #[test]
    fn test_shared_path_artifacts_are_staged() {
        let shared = GeneratorConfig {
            output_layout: OutputLayout {
                definition: "{{ app }}/generated.py".to_string(),
                registration: "{{ app }}/generated.py".to_string(),
                routes: "{{ app }}/urls.py".to_string(),
            },
            ..config()
        };
        let store = MemoryStore::new();
        let generator = Generator::new(&shared, store.clone(), NoopFormatter).unwrap();
        let summary = generator
            .generate(&blog(), &[ArtifactKind::Definition, ArtifactKind::Registration])
            .unwrap();

        assert!(matches!(summary.reports()[0].status, Status::Created));
        assert!(matches!(summary.reports()[1].status, Status::Updated));
        let text = store.get("blog/generated.py").unwrap();
        assert!(text.contains("class Blog(models.Model):"));
        assert!(text.contains("class BlogAdmin(admin.ModelAdmin):"));
        assert!(!text.contains("from .models import Blog"));
    }

    #[test]
    fn test_rerun_adds_ordering_and_columns() {
        let store = MemoryStore::new();
        let generator = generator(store.clone());
        let kinds = [ArtifactKind::Definition, ArtifactKind::Registration];
        let mut first = EntityBuilder::new("Blog", &config()).unwrap();
        first.add_token("title:ShortText").unwrap();
        generator.generate(&first.build().unwrap(), &kinds).unwrap();

        let mut second = EntityBuilder::new("Blog", &config())
            .unwrap()
            .with_ordering(vec!["-title".to_string()]);
        second.add_token("summary:LongText").unwrap();
        let summary = generator.generate(&second.build().unwrap(), &kinds).unwrap();

        assert!(summary.reports().iter().all(|r| matches!(r.status, Status::Updated)));
        let models = store.get("blog/models.py").unwrap();
        assert!(models.contains(
            "        verbose_name_plural = \"blogs\"\n        ordering = [\"-title\"]\n"
        ));
        assert!(models.ends_with("    summary = models.TextField()\n"));
        assert!(store
            .get("blog/admin.py")
            .unwrap()
            .contains("    list_display = [\"title\", \"summary\"]\n"));
    }

    #[test]
    fn test_changed_ordering_is_a_conflict() {
        let store = MemoryStore::new();
        let generator = generator(store.clone());
        let mut first = EntityBuilder::new("Blog", &config())
            .unwrap()
            .with_ordering(vec!["title".to_string()]);
        first.add_token("title:ShortText").unwrap();
        generator.generate(&first.build().unwrap(), &[ArtifactKind::Definition]).unwrap();
        let written = store.get("blog/models.py").unwrap();

        let mut second = EntityBuilder::new("Blog", &config())
            .unwrap()
            .with_ordering(vec!["-title".to_string()]);
        second.add_token("title:ShortText").unwrap();
        let summary = generator
            .generate(&second.build().unwrap(), &[ArtifactKind::Definition])
            .unwrap();

        assert!(matches!(
            summary.reports()[0].status,
            Status::Failed(ArtifactError::Merge(MergeError::ConflictingDeclaration { .. }))
        ));
        assert_eq!(store.get("blog/models.py").unwrap(), written);
    }

    #[test]
    fn test_ordering_resolved_against_existing_model() {
        let existing = "from django.db import models\n\n\nclass Blog(models.Model):\n    title = models.CharField(max_length=250)\n";
        let store = MemoryStore::with_files([("blog/models.py", existing)]);
        let generator = generator(store.clone());

        let mut known = EntityBuilder::new("Blog", &config())
            .unwrap()
            .with_ordering(vec!["-title".to_string()]);
        known.add_token("summary:LongText").unwrap();
        let plan = generator.plan(&known.build().unwrap(), &[ArtifactKind::Definition]).unwrap();
        assert!(matches!(plan.artifacts()[0].outcome, PlannedOutcome::Update));

        let mut unknown = EntityBuilder::new("Blog", &config())
            .unwrap()
            .with_ordering(vec!["-published".to_string()]);
        unknown.add_token("summary:LongText").unwrap();
        let err = generator
            .plan(&unknown.build().unwrap(), &[ArtifactKind::Definition])
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::Specification);
        assert!(err.to_string().contains("'-published'"));
        assert_eq!(store.get("blog/models.py").unwrap(), existing);
    }

    #[test]
    fn test_formatter_runs_only_on_change() {
        let store = MemoryStore::new();
        let generator = Generator::new(&config(), store.clone(), UpperFormatter).unwrap();
        generator.generate(&blog(), &[ArtifactKind::Definition]).unwrap();
        let formatted = store.get("blog/models.py").unwrap();
        assert!(formatted.starts_with("# formatted\n"));

        let again = generator.generate(&blog(), &[ArtifactKind::Definition]).unwrap();
        assert!(matches!(again.reports()[0].status, Status::Unchanged));
        assert_eq!(store.get("blog/models.py").unwrap(), formatted);
    }

    #[test]
    fn test_formatter_failure_is_io_class() {
        let store = MemoryStore::new();
        let generator = Generator::new(&config(), store.clone(), BrokenFormatter).unwrap();
        let summary = generator.generate(&blog(), &[ArtifactKind::Definition]).unwrap();

        assert_eq!(summary.failure_class(), Some(ErrorClass::Io));
        assert_eq!(summary.exit_code(), 4);
        assert!(store.paths().is_empty());
    }

    #[test]
    fn test_duplicate_kinds_planned_once() {
        let generator = generator(MemoryStore::new());
        let plan = generator
            .plan(&blog(), &[ArtifactKind::Routes, ArtifactKind::Routes])
            .unwrap();
        assert_eq!(plan.artifacts().len(), 1);
    }
}
