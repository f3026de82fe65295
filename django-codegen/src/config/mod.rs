//! Generator configuration
//!
//! Configuration is layered with figment, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. `~/.config/django-codegen/config.toml` (user config)
//! 3. `<project>/codegen.toml` (project config)
//! 4. Environment variables (`DJANGO_CODEGEN_` prefix, `__` for nesting)
//!
//! The resulting [`GeneratorConfig`] is passed explicitly to every engine
//! component; nothing in the engine reads process-wide state.
//!
//! # Example Configuration
//!
//! ```toml
//! # codegen.toml
//! app = "blog"
//! default_base_type = "core.models.TimeStamped"
//! default_artifacts = ["definition", "registration", "routes"]
//!
//! [output_layout]
//! routes = "{{ app }}/urls/{{ entity_snake }}.py"
//!
//! [formatter]
//! command = ["black", "-q", "-"]
//! ```

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::scaffold::ArtifactKind;

/// Project configuration file name
pub const PROJECT_CONFIG: &str = "codegen.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "DJANGO_CODEGEN_";

/// Output path templates per artifact
///
/// Each entry is a minijinja template rendered with `app`, `entity` and
/// `entity_snake`, relative to the project directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputLayout {
    /// Model definitions
    pub definition: String,

    /// Admin registrations
    pub registration: String,

    /// URL routes
    pub routes: String,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self {
            definition: "{{ app }}/models.py".to_string(),
            registration: "{{ app }}/admin.py".to_string(),
            routes: "{{ app }}/urls.py".to_string(),
        }
    }
}

impl OutputLayout {
    /// Path template for `kind`
    #[must_use]
    pub fn template(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::Definition => &self.definition,
            ArtifactKind::Registration => &self.registration,
            ArtifactKind::Routes => &self.routes,
        }
    }
}

/// External formatter settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterSettings {
    /// Program and arguments; source is piped through stdin/stdout
    pub command: Option<Vec<String>>,
}

/// Complete generator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Base type used when an entity names none (`models.Model` if unset)
    pub default_base_type: Option<String>,

    /// Django application the artifacts belong to
    pub app: String,

    /// Where each artifact is written
    pub output_layout: OutputLayout,

    /// Artifacts generated when none are requested
    pub default_artifacts: Vec<ArtifactKind>,

    /// Accept entities without fields
    pub allow_empty_entity: bool,

    /// External formatter
    pub formatter: FormatterSettings,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            default_base_type: None,
            app: "core".to_string(),
            output_layout: OutputLayout::default(),
            default_artifacts: vec![ArtifactKind::Definition, ArtifactKind::Registration],
            allow_empty_entity: false,
            formatter: FormatterSettings::default(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration for the project rooted at `project_dir`
    ///
    /// Missing files are skipped; only the layers that exist contribute.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file cannot be parsed or a value
    /// has the wrong type.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use django_codegen::config::GeneratorConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = GeneratorConfig::load(".")?;
    /// println!("generating into app {}", config.app);
    /// # Ok(())
    /// # }
    /// ```
    pub fn load(project_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                figment = figment.merge(Toml::file(&user_config));
            }
        }

        let project_config = project_dir.as_ref().join(PROJECT_CONFIG);
        if project_config.exists() {
            figment = figment.merge(Toml::file(&project_config));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        Ok(figment.extract()?)
    }

    /// Load configuration from one file, ignoring the user config
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value has the
    /// wrong type. A missing file yields the defaults.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true))
            .extract()?;

        Ok(config)
    }

    /// `~/.config/django-codegen/config.toml`, if a config directory exists
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("django-codegen").join("config.toml"))
    }

    /// Render as a `codegen.toml` document
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be represented in TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Artifacts to generate when the caller asks for none
    #[must_use]
    pub fn artifacts_or_default(&self, requested: &[ArtifactKind]) -> Vec<ArtifactKind> {
        if requested.is_empty() {
            self.default_artifacts.clone()
        } else {
            requested.to_vec()
        }
    }
}
