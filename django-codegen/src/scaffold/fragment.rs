//! Generated fragments and the containers they are merged into

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One generated output unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// Model class (`models.py`)
    Definition,
    /// Admin registration (`admin.py`)
    Registration,
    /// URL routes (`urls.py`)
    Routes,
}

impl ArtifactKind {
    /// Every artifact kind, in generation order
    pub const ALL: [Self; 3] = [Self::Definition, Self::Registration, Self::Routes];

    /// Name used on the command line and in configuration
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Definition => "definition",
            Self::Registration => "registration",
            Self::Routes => "routes",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.token() == s)
            .ok_or_else(|| format!("unknown artifact '{s}' (expected definition, registration or routes)"))
    }
}

/// Semantic tag of a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentTag {
    /// `from x import Name`
    Import,
    /// Model class with its fields
    EntityDefinition,
    /// One field assignment inside the model class
    FieldDeclaration,
    /// `class Meta:` inside the model class
    MetaClass,
    /// One option assignment inside `Meta`, such as `ordering`
    MetaOption,
    /// Admin class with its decorator
    RegistrationStub,
    /// `list_display = [...]` inside the admin class
    ListDisplay,
    /// One field name inside `list_display`
    ListDisplayEntry,
    /// `urlpatterns = [...]` with its entries
    RouteTable,
    /// One `path(...)` entry inside `urlpatterns`
    RouteEntry,
}

/// How the merge engine treats a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Binds one name at module level, placed after the last import
    Import,
    /// Whole declaration; satisfied by an existing declaration with the same header
    Container,
    /// Single declaration inside an existing container
    Member,
}

impl FragmentTag {
    /// Merge role of fragments with this tag
    #[must_use]
    pub const fn role(self) -> Role {
        match self {
            Self::Import => Role::Import,
            Self::EntityDefinition
            | Self::MetaClass
            | Self::RegistrationStub
            | Self::ListDisplay
            | Self::RouteTable => Role::Container,
            Self::FieldDeclaration | Self::MetaOption | Self::ListDisplayEntry | Self::RouteEntry => {
                Role::Member
            }
        }
    }
}

/// Logical location a fragment belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Container {
    /// Top level of the file
    Module,
    /// Body of the named class; `Outer.Inner` names a nested class
    ClassBody(String),
    /// Literal list assigned to the named variable; `Class.name` names a
    /// class attribute
    List(String),
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module => f.write_str("module"),
            Self::ClassBody(name) => write!(f, "class body of '{name}'"),
            Self::List(name) => write!(f, "list '{name}'"),
        }
    }
}

/// A named, self-contained piece of generated source
///
/// `text` is unindented; the merge engine indents it for its container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFragment {
    artifact: ArtifactKind,
    tag: FragmentTag,
    name: String,
    container: Container,
    text: String,
}

impl ArtifactFragment {
    /// Create a fragment
    #[must_use]
    pub fn new(
        artifact: ArtifactKind,
        tag: FragmentTag,
        name: impl Into<String>,
        container: Container,
        text: impl Into<String>,
    ) -> Self {
        Self {
            artifact,
            tag,
            name: name.into(),
            container,
            text: text.into(),
        }
    }

    /// Artifact this fragment belongs to
    #[must_use]
    pub const fn artifact(&self) -> ArtifactKind {
        self.artifact
    }

    /// Semantic tag
    #[must_use]
    pub const fn tag(&self) -> FragmentTag {
        self.tag
    }

    /// Merge role, derived from the tag
    #[must_use]
    pub const fn role(&self) -> Role {
        self.tag.role()
    }

    /// Declaration identity within the container
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Container the fragment is merged into
    #[must_use]
    pub const fn container(&self) -> &Container {
        &self.container
    }

    /// Source text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_display() {
        assert_eq!(Container::Module.to_string(), "module");
        assert_eq!(
            Container::ClassBody("Blog".to_string()).to_string(),
            "class body of 'Blog'"
        );
        assert_eq!(
            Container::List("urlpatterns".to_string()).to_string(),
            "list 'urlpatterns'"
        );
    }

    #[test]
    fn test_artifact_kind_tokens() {
        for kind in ArtifactKind::ALL {
            assert_eq!(kind.token().parse::<ArtifactKind>().unwrap(), kind);
        }
        assert!("models".parse::<ArtifactKind>().is_err());
    }

    #[test]
    fn test_roles() {
        assert_eq!(FragmentTag::Import.role(), Role::Import);
        assert_eq!(FragmentTag::RouteTable.role(), Role::Container);
        assert_eq!(FragmentTag::FieldDeclaration.role(), Role::Member);
        assert_eq!(FragmentTag::MetaClass.role(), Role::Container);
        assert_eq!(FragmentTag::ListDisplayEntry.role(), Role::Member);
    }
}
