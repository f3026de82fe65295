//! Python source adapter
//!
//! Parsing goes through [`lexer`] and [`parser`]; this module adds the
//! Python-specific parts of merging: how declarations compare and where new
//! text goes so the result keeps PEP 8 layout.

pub mod lexer;
pub mod parser;

use lexer::{leading_whitespace, LexError, TokenKind};

use super::tree::{Edit, Node, NodeKind, SourceTree};
use super::{SourceAdapter, Target};
use crate::error::MergeError;

/// Extra indentation of list elements relative to the assignment
const LIST_INDENT: &str = "    ";

/// Adapter for Python sources
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonAdapter;

impl SourceAdapter for PythonAdapter {
    fn parse(&self, source: &str) -> Result<SourceTree, MergeError> {
        parser::parse(source).map_err(unparseable)
    }

    /// Significant tokens joined by single spaces
    ///
    /// Comments and layout disappear, simple single-quoted strings become
    /// double-quoted and a comma right before a closing bracket is dropped.
    fn normalize(&self, text: &str) -> Result<String, MergeError> {
        let tokens = lexer::tokens(text).map_err(unparseable)?;
        let mut out = Vec::with_capacity(tokens.len());

        for (index, token) in tokens.iter().enumerate() {
            let piece = &text[token.span.clone()];
            let before_close = tokens
                .get(index + 1)
                .is_some_and(|next| matches!(&text[next.span.clone()], ")" | "]" | "}"));
            if piece == "," && before_close {
                continue;
            }
            if token.kind == TokenKind::String {
                out.push(canonical_string(piece));
            } else {
                out.push(piece.to_string());
            }
        }

        Ok(out.join(" "))
    }

    fn insertion(&self, tree: &SourceTree, target: Target<'_>, text: &str) -> Vec<Edit> {
        let nl = newline_style(tree.source());
        let text = text.replace('\n', nl);
        match target {
            Target::AfterImports => after_imports(tree, &text, nl),
            Target::ModuleEnd => vec![module_end(tree.source(), &text, nl, 2)],
            Target::ClassBodyEnd(node) => class_body_end(tree, node, &text, nl),
            Target::ListEnd(node) => list_end(tree, node, &text, nl),
        }
    }
}

fn unparseable(err: LexError) -> MergeError {
    MergeError::Unparseable {
        line: err.line,
        message: err.message,
    }
}

fn canonical_string(literal: &str) -> String {
    if literal.starts_with('\'') && !literal.starts_with("'''") && literal.len() >= 2 {
        let inner = &literal[1..literal.len() - 1];
        if !inner.contains('"') && !inner.contains('\\') {
            return format!("\"{inner}\"");
        }
    }
    literal.to_string()
}

fn newline_style(source: &str) -> &'static str {
    if source.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Newline to add before inserting at `at` so the insertion starts a line
fn line_break_before<'n>(source: &str, at: usize, nl: &'n str) -> &'n str {
    if at == 0 || source[..at].ends_with('\n') {
        ""
    } else {
        nl
    }
}

fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Append a declaration at the end of the module after `blank_lines` empty lines
fn module_end(source: &str, text: &str, nl: &str, blank_lines: usize) -> Edit {
    if source.trim().is_empty() {
        let prefix = line_break_before(source, source.len(), nl);
        return Edit::insert(source.len(), format!("{prefix}{text}{nl}"));
    }

    let content = source.trim_end_matches(['\n', '\r']);
    let newlines = source[content.len()..].matches('\n').count();
    let missing = (blank_lines + 1).saturating_sub(newlines);
    Edit::insert(source.len(), format!("{}{text}{nl}", nl.repeat(missing)))
}

fn is_docstring(tree: &SourceTree, node: &Node) -> bool {
    node.kind == NodeKind::Statement
        && tree
            .text(node.header.clone())
            .trim_start_matches(|c: char| c.is_ascii_alphabetic())
            .starts_with(['"', '\''])
        && lexer::tokens(tree.text(node.header.clone())).is_ok_and(|tokens| tokens.len() == 1)
}

fn after_imports(tree: &SourceTree, text: &str, nl: &str) -> Vec<Edit> {
    let source = tree.source();
    let nodes = tree.nodes();

    if let Some(last) = nodes.iter().rev().find(|n| n.kind == NodeKind::Import) {
        let at = last.span.end;
        let prefix = line_break_before(source, at, nl);
        return vec![Edit::insert(at, format!("{prefix}{text}{nl}"))];
    }

    match nodes.first() {
        Some(first) if is_docstring(tree, first) => {
            let at = first.span.end;
            let prefix = line_break_before(source, at, nl);
            vec![Edit::insert(at, format!("{prefix}{nl}{text}{nl}"))]
        }
        Some(first) => {
            let gap = if matches!(first.kind, NodeKind::Class | NodeKind::Function) {
                3
            } else {
                2
            };
            vec![Edit::insert(first.span.start, format!("{text}{}", nl.repeat(gap)))]
        }
        None => vec![module_end(source, text, nl, 0)],
    }
}

fn class_body_end(tree: &SourceTree, node: &Node, text: &str, nl: &str) -> Vec<Edit> {
    let Some(body) = &node.body else {
        return Vec::new();
    };
    let source = tree.source();
    let indented: Vec<String> = text
        .split(nl)
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{line}", body.indent_text)
            }
        })
        .collect();

    let prefix = line_break_before(source, body.end, nl);
    vec![Edit::insert(body.end, format!("{prefix}{}{nl}", indented.join(nl)))]
}

fn list_end(tree: &SourceTree, node: &Node, text: &str, nl: &str) -> Vec<Edit> {
    let Some(list) = &node.list else {
        return Vec::new();
    };
    let source = tree.source();
    let base = leading_whitespace(source, node.span.start);
    let interior = &source[list.open + 1..list.close];

    let Some(last) = list.items.last() else {
        if interior.trim().is_empty() {
            return vec![Edit::replace(
                list.open + 1..list.close,
                format!("{nl}{base}{LIST_INDENT}{text},{nl}{base}"),
            )];
        }
        // only comments inside, so `]` starts its own line
        return vec![Edit::insert(
            line_start(source, list.close),
            format!("{base}{LIST_INDENT}{text},{nl}"),
        )];
    };

    if !interior.contains('\n') {
        let addition = if list.trailing_comma {
            format!(" {text},")
        } else {
            format!(", {text}")
        };
        return vec![Edit::insert(list.close, addition)];
    }

    let last_line = line_start(source, last.span.start);
    let item_indent = if source[last_line..last.span.start].trim().is_empty() {
        source[last_line..last.span.start].to_string()
    } else {
        format!("{base}{LIST_INDENT}")
    };

    let mut edits = Vec::with_capacity(2);
    if !list.trailing_comma {
        edits.push(Edit::insert(last.span.end, ","));
    }
    match source[last.span.end..].find('\n').map(|i| last.span.end + i) {
        Some(newline) if newline < list.close => {
            edits.push(Edit::insert(newline + 1, format!("{item_indent}{text},{nl}")));
        }
        _ => edits.push(Edit::insert(
            list.close,
            format!("{nl}{item_indent}{text},{nl}{base}"),
        )),
    }
    edits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(text: &str) -> String {
        PythonAdapter.normalize(text).unwrap()
    }

    fn insert(source: &str, text: &str, target: fn(&SourceTree) -> Target<'_>) -> String {
        let tree = PythonAdapter.parse(source).unwrap();
        let edits = PythonAdapter.insertion(&tree, target(&tree), text);
        tree.apply(edits)
    }

    const fn module_end_of(_: &SourceTree) -> Target<'_> {
        Target::ModuleEnd
    }

    const fn imports_of(_: &SourceTree) -> Target<'_> {
        Target::AfterImports
    }

    fn first_class(tree: &SourceTree) -> Target<'_> {
        Target::ClassBodyEnd(&tree.nodes()[0])
    }

    fn first_list(tree: &SourceTree) -> Target<'_> {
        Target::ListEnd(&tree.nodes()[0])
    }

    #[test]
    fn test_normalize_ignores_layout_comments_and_quotes() {
        assert_eq!(
            normalize("title = models.CharField(max_length=250)"),
            normalize("title  =  models.CharField(\n    max_length=250,  # short\n)")
        );
        assert_eq!(normalize("x = 'a'"), normalize("x = \"a\""));
        assert_ne!(normalize("x = 'a'"), normalize("x = 'b'"));
        assert_ne!(
            normalize("title = models.CharField(max_length=250)"),
            normalize("title = models.CharField(max_length=100)")
        );
    }

    #[test]
    fn test_module_end_blank_lines() {
        let target = module_end_of;
        assert_eq!(insert("x = 1\n", "y = 2", target), "x = 1\n\n\ny = 2\n");
        assert_eq!(insert("x = 1", "y = 2", target), "x = 1\n\n\ny = 2\n");
        assert_eq!(insert("x = 1\n\n\n", "y = 2", target), "x = 1\n\n\ny = 2\n");
        assert_eq!(insert("", "y = 2", target), "y = 2\n");
    }

    #[test]
    fn test_after_imports() {
        let target = imports_of;
        assert_eq!(
            insert("import os\nimport sys\n\nx = 1\n", "import json", target),
            "import os\nimport sys\nimport json\n\nx = 1\n"
        );
        assert_eq!(
            insert("\"\"\"Doc.\"\"\"\nx = 1\n", "import json", target),
            "\"\"\"Doc.\"\"\"\n\nimport json\nx = 1\n"
        );
        assert_eq!(
            insert("class A:\n    pass\n", "import json", target),
            "import json\n\n\nclass A:\n    pass\n"
        );
        assert_eq!(insert("# header\n", "import json", target), "# header\nimport json\n");
    }

    #[test]
    fn test_class_body_end_reindents() {
        let source = "class A:\n\tx = 1\n\t# keep\n\n\ny = 2\n";
        let out = insert(source, "z = 3", first_class);
        assert_eq!(out, "class A:\n\tx = 1\n\t# keep\n\tz = 3\n\n\ny = 2\n");
    }

    #[test]
    fn test_list_end_variants() {
        let list = first_list;
        assert_eq!(insert("l = []\n", "c", list), "l = [\n    c,\n]\n");
        assert_eq!(insert("l = [a, b]\n", "c", list), "l = [a, b, c]\n");
        assert_eq!(insert("l = [a, b,]\n", "c", list), "l = [a, b, c,]\n");
        assert_eq!(
            insert("l = [\n    a,\n    b  # last\n]\n", "c", list),
            "l = [\n    a,\n    b,  # last\n    c,\n]\n"
        );
        assert_eq!(
            insert("l = [\n  a,\n  b]\n", "c", list),
            "l = [\n  a,\n  b,\n  c,\n]\n"
        );
        assert_eq!(
            insert("l = [\n    # nothing yet\n]\n", "c", list),
            "l = [\n    # nothing yet\n    c,\n]\n"
        );
    }

    #[test]
    fn test_crlf_preserved() {
        let out = insert("class A:\r\n    x = 1\r\n", "y = 2", first_class);
        assert_eq!(out, "class A:\r\n    x = 1\r\n    y = 2\r\n");
    }
}
