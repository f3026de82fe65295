//! Structural merge engine
//!
//! Merges one [`ArtifactFragment`] into existing source text. The text is
//! parsed into a [`SourceTree`] by a [`SourceAdapter`], the fragment's
//! container is located by exact name, and the fragment is either found to
//! be present already, rejected as a conflict, or spliced in. Every byte
//! outside the inserted text is kept as it was.
//!
//! Nothing here is specific to one language: parsing, comparison and
//! placement rules come from the adapter ([`python::PythonAdapter`] for
//! Django projects).
//!
//! # Example
//!
//! ```
//! use django_codegen::merge::{Change, MergeEngine};
//! use django_codegen::scaffold::{ArtifactFragment, ArtifactKind, Container, FragmentTag};
//!
//! let existing = "class Blog(models.Model):\n    title = models.CharField(max_length=250)\n";
//! let fragment = ArtifactFragment::new(
//!     ArtifactKind::Definition,
//!     FragmentTag::FieldDeclaration,
//!     "summary",
//!     Container::ClassBody("Blog".to_string()),
//!     "summary = models.TextField()",
//! );
//!
//! let merged = MergeEngine::python().merge(existing, &fragment).unwrap();
//! assert_eq!(merged.change, Change::Inserted);
//! assert!(merged.text.ends_with("    summary = models.TextField()\n"));
//! ```

pub mod python;
pub mod tree;

use tracing::debug;

pub use python::PythonAdapter;
pub use tree::{Binding, Block, Edit, ListItem, ListLiteral, Node, NodeKind, SourceTree};

use crate::error::MergeError;
use crate::scaffold::{ArtifactFragment, Container, Role};

/// Where an adapter should place new text
#[derive(Debug, Clone, Copy)]
pub enum Target<'t> {
    /// After the last module-level import
    AfterImports,
    /// End of the module
    ModuleEnd,
    /// End of the body of this class
    ClassBodyEnd(&'t Node),
    /// After the last element of this assignment's list literal
    ListEnd(&'t Node),
}

/// Language-specific parsing, comparison and placement
pub trait SourceAdapter {
    /// Parse a whole file
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Unparseable`] if the text is not recognizable.
    fn parse(&self, source: &str) -> Result<SourceTree, MergeError>;

    /// Canonical form of a declaration for equality checks
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Unparseable`] if the text cannot be tokenized.
    fn normalize(&self, text: &str) -> Result<String, MergeError>;

    /// Edits that place `text` at `target`
    fn insertion(&self, tree: &SourceTree, target: Target<'_>, text: &str) -> Vec<Edit>;
}

/// Whether a merge changed the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// The fragment was spliced in
    Inserted,
    /// An equal declaration already existed
    Unchanged,
}

/// Result of a successful merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    /// Full text after the merge
    pub text: String,
    /// What happened
    pub change: Change,
}

enum Step {
    Present,
    Insert(Vec<Edit>),
}

/// Merges fragments into existing sources
#[derive(Debug, Clone, Default)]
pub struct MergeEngine<A = PythonAdapter> {
    adapter: A,
}

impl MergeEngine<PythonAdapter> {
    /// Engine for Python sources
    #[must_use]
    pub const fn python() -> Self {
        Self {
            adapter: PythonAdapter,
        }
    }
}

impl<A: SourceAdapter> MergeEngine<A> {
    /// Engine using `adapter`
    pub const fn new(adapter: A) -> Self {
        Self { adapter }
    }

    /// Merge `fragment` into `existing`
    ///
    /// On error the caller keeps `existing`; nothing is partially applied.
    ///
    /// # Errors
    ///
    /// - [`MergeError::Unparseable`] if `existing` is not recognizable
    /// - [`MergeError::AnchorNotFound`] / [`MergeError::AmbiguousAnchor`] if the
    ///   container is missing or not unique
    /// - [`MergeError::UnsupportedContainer`] if the container cannot be extended
    /// - [`MergeError::ConflictingDeclaration`] if the name is taken by
    ///   different content
    /// - [`MergeError::Verification`] if the merged text does not re-parse
    ///   with the declaration in place
    pub fn merge(&self, existing: &str, fragment: &ArtifactFragment) -> Result<Merged, MergeError> {
        let tree = self.adapter.parse(existing)?;
        debug!(
            fragment = fragment.name(),
            container = %fragment.container(),
            nodes = tree.nodes().len(),
            "merging fragment"
        );

        match self.step(&tree, fragment)? {
            Step::Present => {
                debug!(fragment = fragment.name(), "declaration already present");
                Ok(Merged {
                    text: existing.to_string(),
                    change: Change::Unchanged,
                })
            }
            Step::Insert(edits) => {
                let text = tree.apply(edits);
                self.verify(&text, fragment)?;
                debug!(fragment = fragment.name(), "fragment inserted");
                Ok(Merged {
                    text,
                    change: Change::Inserted,
                })
            }
        }
    }

    /// Names declared directly in the body of the module-level class `class`
    ///
    /// Empty when the class does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Unparseable`] if `source` is not recognizable.
    pub fn class_members(&self, source: &str, class: &str) -> Result<Vec<String>, MergeError> {
        let tree = self.adapter.parse(source)?;
        Ok(tree
            .declarations(class)
            .filter(|node| node.kind == NodeKind::Class)
            .flat_map(Self::children)
            .filter_map(|node| node.name.clone())
            .collect())
    }

    fn step(&self, tree: &SourceTree, fragment: &ArtifactFragment) -> Result<Step, MergeError> {
        match (fragment.role(), fragment.container()) {
            (Role::Import, _) => self.import_step(tree, fragment),
            (Role::Container, _) | (Role::Member, Container::Module) => {
                self.container_step(tree, fragment)
            }
            (Role::Member, Container::ClassBody(class)) => {
                self.class_member_step(tree, fragment, class)
            }
            (Role::Member, Container::List(list)) => self.list_member_step(tree, fragment, list),
        }
    }

    /// The single declaration a fragment's text consists of
    fn fragment_node(&self, fragment: &ArtifactFragment) -> Result<Node, MergeError> {
        let mut nodes = self
            .adapter
            .parse(fragment.text())
            .map_err(|err| MergeError::Verification {
                message: format!("generated '{}' does not parse: {err}", fragment.name()),
            })?
            .nodes()
            .to_vec();
        match nodes.len() {
            1 => Ok(nodes.remove(0)),
            n => Err(MergeError::Verification {
                message: format!(
                    "generated '{}' holds {n} declarations instead of one",
                    fragment.name()
                ),
            }),
        }
    }

    fn import_step(&self, tree: &SourceTree, fragment: &ArtifactFragment) -> Result<Step, MergeError> {
        let node = self.fragment_node(fragment)?;
        let mut missing = false;

        for binding in &node.bindings {
            // the module defines the name itself
            if tree.declarations(&binding.name).next().is_some() {
                debug!(name = %binding.name, "import skipped, declared in the module");
                continue;
            }
            let existing: Vec<&Binding> = tree.imports(&binding.name).collect();
            if existing.iter().any(|b| b.canonical == binding.canonical) {
                continue;
            }
            if !existing.is_empty() {
                return Err(MergeError::ConflictingDeclaration {
                    name: binding.name.clone(),
                    container: Container::Module,
                });
            }
            missing = true;
        }

        if missing {
            Ok(Step::Insert(self.adapter.insertion(
                tree,
                Target::AfterImports,
                fragment.text(),
            )))
        } else {
            Ok(Step::Present)
        }
    }

    /// Whole declaration at module level or inside a class body
    fn container_step(&self, tree: &SourceTree, fragment: &ArtifactFragment) -> Result<Step, MergeError> {
        let (siblings, target) = match fragment.container() {
            Container::Module => (tree.nodes(), Target::ModuleEnd),
            Container::ClassBody(path) => {
                let class = Self::class_anchor(tree, fragment, path)?;
                (Self::children(class), Target::ClassBodyEnd(class))
            }
            Container::List(_) => {
                return Err(MergeError::UnsupportedContainer {
                    container: fragment.container().clone(),
                    reason: "list elements cannot hold declarations",
                })
            }
        };

        let existing: Vec<&Node> = siblings
            .iter()
            .filter(|n| n.kind != NodeKind::Import && n.is_named(fragment.name()))
            .collect();
        let found = match existing.as_slice() {
            [] => {
                return Ok(Step::Insert(self.adapter.insertion(
                    tree,
                    target,
                    fragment.text(),
                )))
            }
            [one] => *one,
            many => {
                return Err(MergeError::AmbiguousAnchor {
                    container: fragment.container().clone(),
                    fragment: fragment.name().to_string(),
                    count: many.len(),
                })
            }
        };

        let node = self.fragment_node(fragment)?;
        let same_header = found.kind == node.kind
            && self.adapter.normalize(tree.text(found.header.clone()))?
                == self.adapter.normalize(&fragment.text()[node.header.clone()])?;
        if same_header {
            Ok(Step::Present)
        } else {
            Err(MergeError::ConflictingDeclaration {
                name: fragment.name().to_string(),
                container: fragment.container().clone(),
            })
        }
    }

    fn children(class: &Node) -> &[Node] {
        class.body.as_ref().map_or(&[][..], |body| body.children.as_slice())
    }

    /// Unique node at a dotted `path` with the right shape
    ///
    /// `Blog.Meta` is the class `Meta` directly inside the module-level
    /// class `Blog`.
    fn anchor<'t>(
        tree: &'t SourceTree,
        fragment: &ArtifactFragment,
        path: &str,
        accept: &dyn Fn(&Node) -> bool,
    ) -> Result<&'t Node, MergeError> {
        let (siblings, name) = match path.rsplit_once('.') {
            Some((outer, name)) => (Self::children(Self::class_anchor(tree, fragment, outer)?), name),
            None => (tree.nodes(), path),
        };
        let candidates: Vec<&'t Node> = siblings
            .iter()
            .filter(|n| n.kind != NodeKind::Import && n.is_named(name) && accept(n))
            .collect();
        match candidates.as_slice() {
            [one] => Ok(*one),
            [] => Err(MergeError::AnchorNotFound {
                container: fragment.container().clone(),
                fragment: fragment.name().to_string(),
            }),
            many => Err(MergeError::AmbiguousAnchor {
                container: fragment.container().clone(),
                fragment: fragment.name().to_string(),
                count: many.len(),
            }),
        }
    }

    /// Class at `path` whose body can be extended
    fn class_anchor<'t>(
        tree: &'t SourceTree,
        fragment: &ArtifactFragment,
        path: &str,
    ) -> Result<&'t Node, MergeError> {
        let node = Self::anchor(tree, fragment, path, &|n: &Node| n.kind == NodeKind::Class)?;
        if node.body.as_ref().is_some_and(|body| body.inline) {
            return Err(MergeError::UnsupportedContainer {
                container: fragment.container().clone(),
                reason: "the class body is written on its header line",
            });
        }
        Ok(node)
    }

    /// Compare a member against existing declarations of the same name
    fn compare_member<'s>(
        &self,
        fragment: &ArtifactFragment,
        existing: impl Iterator<Item = &'s str>,
    ) -> Result<Option<Step>, MergeError> {
        let wanted = self.adapter.normalize(fragment.text())?;
        let mut seen = false;
        for text in existing {
            if self.adapter.normalize(text)? == wanted {
                return Ok(Some(Step::Present));
            }
            seen = true;
        }
        if seen {
            return Err(MergeError::ConflictingDeclaration {
                name: fragment.name().to_string(),
                container: fragment.container().clone(),
            });
        }
        Ok(None)
    }

    fn class_member_step(
        &self,
        tree: &SourceTree,
        fragment: &ArtifactFragment,
        class: &str,
    ) -> Result<Step, MergeError> {
        let node = Self::class_anchor(tree, fragment, class)?;

        let same_name = Self::children(node)
            .iter()
            .filter(|child| child.is_named(fragment.name()))
            .map(|child| tree.text(child.span.clone()));
        if let Some(step) = self.compare_member(fragment, same_name)? {
            return Ok(step);
        }

        Ok(Step::Insert(self.adapter.insertion(
            tree,
            Target::ClassBodyEnd(node),
            fragment.text(),
        )))
    }

    fn list_member_step(
        &self,
        tree: &SourceTree,
        fragment: &ArtifactFragment,
        list_name: &str,
    ) -> Result<Step, MergeError> {
        let node = Self::anchor(tree, fragment, list_name, &|_: &Node| true)?;
        let Some(list) = node.list.as_ref().filter(|_| node.kind == NodeKind::Assignment) else {
            return Err(MergeError::UnsupportedContainer {
                container: fragment.container().clone(),
                reason: "it is not assigned a list literal",
            });
        };

        let same_name = list
            .items
            .iter()
            .filter(|item| item.name.as_deref() == Some(fragment.name()))
            .map(|item| tree.text(item.span.clone()));
        if let Some(step) = self.compare_member(fragment, same_name)? {
            return Ok(step);
        }

        Ok(Step::Insert(self.adapter.insertion(
            tree,
            Target::ListEnd(node),
            fragment.text(),
        )))
    }

    /// Re-parse the merged text and check the declaration is where it belongs
    fn verify(&self, text: &str, fragment: &ArtifactFragment) -> Result<(), MergeError> {
        let tree = self.adapter.parse(text).map_err(|err| MergeError::Verification {
            message: format!("merged text does not parse: {err}"),
        })?;
        match self.step(&tree, fragment) {
            Ok(Step::Present) => Ok(()),
            Ok(Step::Insert(_)) => Err(MergeError::Verification {
                message: format!(
                    "'{}' is missing from {} after merging",
                    fragment.name(),
                    fragment.container()
                ),
            }),
            Err(err) => Err(MergeError::Verification {
                message: err.to_string(),
            }),
        }
    }
}
