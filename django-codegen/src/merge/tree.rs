//! Anchor-addressable source tree
//!
//! A [`SourceTree`] keeps the original text next to the structure parsed
//! from it. Nodes only carry byte ranges, so re-serializing an unedited
//! tree is the identity and edits are splices into the original text.

use std::ops::Range;

/// Declaration category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `import` or `from ... import`
    Import,
    /// Class definition
    Class,
    /// Function definition
    Function,
    /// `name = value` or `name: T = value`
    Assignment,
    /// Any other simple statement
    Statement,
    /// Any other compound statement (`if`, `for`, `try`, ...)
    Compound,
}

/// One name bound by an import statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Name visible in the module
    pub name: String,
    /// The import reduced to this one name, e.g. `from .models import Blog`
    pub canonical: String,
}

/// Indented body of a compound statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Indentation width of the body
    pub indent: usize,
    /// Indentation of the body as written
    pub indent_text: String,
    /// Statements of the body
    pub children: Vec<Node>,
    /// Offset just past the last line of the body, trailing comments included
    pub end: usize,
    /// Body written on the header line (`class A: pass`)
    pub inline: bool,
}

/// One element of a list literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// Byte range of the element, without the separating comma
    pub span: Range<usize>,
    /// Value of a `name="..."` keyword argument, or of a bare string element
    pub name: Option<String>,
}

/// Literal list on the right of an assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLiteral {
    /// Offset of `[`
    pub open: usize,
    /// Offset of `]`
    pub close: usize,
    /// Elements in order
    pub items: Vec<ListItem>,
    /// Whether the last element is followed by a comma
    pub trailing_comma: bool,
}

/// One declaration or statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Category
    pub kind: NodeKind,
    /// Declared name, when the statement declares one
    pub name: Option<String>,
    /// Full extent from the start of the first line (decorators included)
    /// to just past the last line
    pub span: Range<usize>,
    /// Significant text of the header: `class A(B):`, `x =`, or the statement
    pub header: Range<usize>,
    /// Indentation width of the statement
    pub indent: usize,
    /// 1-based line of the statement (decorators excluded)
    pub line: usize,
    /// Body of a compound statement
    pub body: Option<Block>,
    /// List literal of an assignment
    pub list: Option<ListLiteral>,
    /// Names bound by an import
    pub bindings: Vec<Binding>,
}

impl Node {
    /// Whether the node declares `name`
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

/// A replacement of a byte range of the original text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Range to replace; empty for an insertion
    pub range: Range<usize>,
    /// Replacement text
    pub text: String,
}

impl Edit {
    /// Insert `text` at `at`
    #[must_use]
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            range: at..at,
            text: text.into(),
        }
    }

    /// Replace `range` with `text`
    #[must_use]
    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }
}

/// Parsed structure of one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTree {
    source: String,
    nodes: Vec<Node>,
}

impl SourceTree {
    /// Wrap parsed nodes together with their source
    #[must_use]
    pub const fn new(source: String, nodes: Vec<Node>) -> Self {
        Self { source, nodes }
    }

    /// Original text
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Module-level nodes
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Text of a byte range
    #[must_use]
    pub fn text(&self, range: Range<usize>) -> &str {
        &self.source[range]
    }

    /// Re-serialize without edits
    #[must_use]
    pub fn to_source(&self) -> String {
        self.source.clone()
    }

    /// Module-level nodes named `name`, imports excluded
    pub fn declarations<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes
            .iter()
            .filter(move |node| node.kind != NodeKind::Import && node.is_named(name))
    }

    /// Module-level import bindings named `name`
    pub fn imports<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Binding> + 'a {
        self.nodes
            .iter()
            .filter(|node| node.kind == NodeKind::Import)
            .flat_map(|node| node.bindings.iter())
            .filter(move |binding| binding.name == name)
    }

    /// Apply non-overlapping edits to the original text
    ///
    /// Insertions at the same offset keep the order they were given in.
    #[must_use]
    pub fn apply(&self, edits: Vec<Edit>) -> String {
        let mut ordered: Vec<(usize, Edit)> = edits.into_iter().enumerate().collect();
        ordered.sort_by(|(ia, a), (ib, b)| {
            b.range
                .start
                .cmp(&a.range.start)
                .then(b.range.end.cmp(&a.range.end))
                .then(ib.cmp(ia))
        });
        let mut out = self.source.clone();
        for (_, edit) in ordered {
            out.replace_range(edit.range, &edit.text);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_edits_in_any_order() {
        let tree = SourceTree::new("abcdef".to_string(), Vec::new());
        let text = tree.apply(vec![
            Edit::insert(1, "X"),
            Edit::replace(3..5, "YY"),
            Edit::insert(6, "Z"),
        ]);
        assert_eq!(text, "aXbcYYfZ");
        assert_eq!(tree.to_source(), "abcdef");
    }

    #[test]
    fn test_insertions_at_same_offset_keep_order() {
        let tree = SourceTree::new("ab".to_string(), Vec::new());
        assert_eq!(
            tree.apply(vec![Edit::insert(1, "1"), Edit::insert(1, "2")]),
            "a12b"
        );
    }
}
