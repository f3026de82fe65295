//! Python statement parser
//!
//! Builds a [`SourceTree`] from logical lines. Only the structure needed to
//! address declarations is recovered: blocks from indentation, names of
//! classes, functions and assignments, import bindings and literal lists.
//! Expressions are left as token ranges.

use super::lexer::{leading_whitespace, lex, CommentLine, LexError, LogicalLine, Token, TokenKind};
use crate::merge::tree::{Binding, Block, ListItem, ListLiteral, Node, NodeKind, SourceTree};

const COMPOUND_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "for", "while", "try", "except", "finally", "with",
];
const SOFT_COMPOUND_KEYWORDS: &[&str] = &["match", "case"];
const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Parse a whole source into a tree
///
/// # Errors
///
/// Returns the 1-based line and a message when the text is not
/// structurally valid Python.
pub fn parse(source: &str) -> Result<SourceTree, LexError> {
    let lexed = lex(source)?;
    let mut parser = Parser {
        src: source,
        lines: &lexed.lines,
        comments: &lexed.comments,
        pos: 0,
    };

    let nodes = match parser.lines.first() {
        Some(first) if first.indent > 0 => return Err(error(first.line, "unexpected indent")),
        Some(_) => parser.block(0)?,
        None => Vec::new(),
    };
    if let Some(line) = parser.lines.get(parser.pos) {
        return Err(error(line.line, "unindent does not match any outer indentation level"));
    }

    Ok(SourceTree::new(source.to_string(), nodes))
}

fn error(line: usize, message: &str) -> LexError {
    LexError {
        line,
        message: message.to_string(),
    }
}

struct Parser<'a> {
    src: &'a str,
    lines: &'a [LogicalLine],
    comments: &'a [CommentLine],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn text(&self, token: &Token) -> &'a str {
        &self.src[token.span.clone()]
    }

    fn is(&self, token: Option<&Token>, text: &str) -> bool {
        token.is_some_and(|t| self.text(t) == text)
    }

    /// Statements at exactly `indent`, stopping at the first dedent
    fn block(&mut self, indent: usize) -> Result<Vec<Node>, LexError> {
        let lines = self.lines;
        let mut nodes = Vec::new();
        while let Some(line) = lines.get(self.pos) {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(error(line.line, "unexpected indent"));
            }
            nodes.push(self.statement()?);
        }
        Ok(nodes)
    }

    fn statement(&mut self) -> Result<Node, LexError> {
        let lines = self.lines;
        let first = &lines[self.pos];
        let span_start = first.start;

        while self.is(lines[self.pos].tokens.first(), "@") {
            self.pos += 1;
            match lines.get(self.pos) {
                Some(next) if next.indent == first.indent => {}
                _ => {
                    return Err(error(
                        first.line,
                        "decorator is not followed by a class or function",
                    ))
                }
            }
        }

        let line = &lines[self.pos];
        self.pos += 1;
        let tokens = &line.tokens;
        let head = self.text(&tokens[0]);

        let (kind, name) = match head {
            "class" => (NodeKind::Class, self.declared_name(line, 1)?),
            "def" => (NodeKind::Function, self.declared_name(line, 1)?),
            "async" if self.is(tokens.get(1), "def") => {
                (NodeKind::Function, self.declared_name(line, 2)?)
            }
            "import" | "from" => (NodeKind::Import, None),
            _ if self.is_compound(line) => (NodeKind::Compound, None),
            _ => match self.assignment_value(line) {
                Some(_) => (NodeKind::Assignment, Some(head.to_string())),
                None => (NodeKind::Statement, None),
            },
        };

        if span_start != line.start && !matches!(kind, NodeKind::Class | NodeKind::Function) {
            return Err(error(line.line, "decorator is not followed by a class or function"));
        }

        let mut node = Node {
            kind,
            name,
            span: span_start..line.end,
            header: tokens[0].span.start..tokens[tokens.len() - 1].span.end,
            indent: line.indent,
            line: line.line,
            body: None,
            list: None,
            bindings: Vec::new(),
        };

        match kind {
            NodeKind::Class | NodeKind::Function | NodeKind::Compound => {
                let colon = self.header_colon(line)?;
                node.header.end = tokens[colon].span.end;
                let body = if colon + 1 < tokens.len() {
                    Block {
                        indent: line.indent,
                        indent_text: String::new(),
                        children: Vec::new(),
                        end: line.end,
                        inline: true,
                    }
                } else {
                    self.body(line)?
                };
                node.span.end = body.end;
                node.body = Some(body);
            }
            NodeKind::Assignment => {
                if let Some(value) = self.assignment_value(line) {
                    node.header.end = tokens[value - 1].span.end;
                    node.list = self.list_literal(&tokens[value..]);
                }
            }
            NodeKind::Import => node.bindings = self.bindings(tokens),
            NodeKind::Statement => {}
        }

        Ok(node)
    }

    fn declared_name(&self, line: &LogicalLine, index: usize) -> Result<Option<String>, LexError> {
        match line.tokens.get(index) {
            Some(token) if token.kind == TokenKind::Name => Ok(Some(self.text(token).to_string())),
            _ => Err(error(line.line, "expected a name")),
        }
    }

    fn is_compound(&self, line: &LogicalLine) -> bool {
        let head = self.text(&line.tokens[0]);
        if COMPOUND_KEYWORDS.contains(&head) {
            return true;
        }
        if head == "async" {
            return self.is(line.tokens.get(1), "for") || self.is(line.tokens.get(1), "with");
        }
        SOFT_COMPOUND_KEYWORDS.contains(&head)
            && line.tokens.len() > 2
            && self.is(line.tokens.last(), ":")
    }

    /// Index of the colon ending a compound header
    fn header_colon(&self, line: &LogicalLine) -> Result<usize, LexError> {
        let mut depth = 0usize;
        for (index, token) in line.tokens.iter().enumerate() {
            match self.text(token) {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth = depth.saturating_sub(1),
                ":" if depth == 0 => return Ok(index),
                _ => {}
            }
        }
        Err(error(line.line, "expected ':'"))
    }

    /// Indented body following a header that ends with a colon
    fn body(&mut self, header: &LogicalLine) -> Result<Block, LexError> {
        let lines = self.lines;
        let indent = match lines.get(self.pos) {
            Some(next) if next.indent > header.indent => next.indent,
            _ => {
                return Err(error(
                    header.line,
                    "expected an indented block after this line",
                ))
            }
        };
        let indent_text = leading_whitespace(self.src, lines[self.pos].start).to_string();
        let children = self.block(indent)?;

        let start = children.last().map_or(header.end, |child| child.span.end);
        let limit = lines.get(self.pos).map_or(usize::MAX, |line| line.start);
        let mut end = start;
        for comment in self.comments.iter().filter(|c| c.start >= start && c.start < limit) {
            if comment.indent < indent {
                break;
            }
            end = comment.end;
        }

        Ok(Block {
            indent,
            indent_text,
            children,
            end,
            inline: false,
        })
    }

    /// Index of the first value token of `name = value` or `name: T = value`
    fn assignment_value(&self, line: &LogicalLine) -> Option<usize> {
        let tokens = &line.tokens;
        let head = tokens.first()?;
        if head.kind != TokenKind::Name || KEYWORDS.contains(&self.text(head)) {
            return None;
        }
        match tokens.get(1).map(|t| self.text(t)) {
            Some("=") => Some(2),
            Some(":") => {
                let mut depth = 0usize;
                for (index, token) in tokens.iter().enumerate().skip(2) {
                    match self.text(token) {
                        "(" | "[" | "{" => depth += 1,
                        ")" | "]" | "}" => depth = depth.saturating_sub(1),
                        "=" if depth == 0 => return Some(index + 1),
                        _ => {}
                    }
                }
                None
            }
            _ => None,
        }
    }

    /// List literal spanning exactly `value`
    fn list_literal(&self, value: &[Token]) -> Option<ListLiteral> {
        let (open, rest) = value.split_first()?;
        let (close, inner) = rest.split_last()?;
        if self.text(open) != "[" || self.text(close) != "]" {
            return None;
        }

        let mut items = Vec::new();
        let mut trailing_comma = false;
        let mut depth = 0usize;
        let mut item_start: Option<usize> = None;

        for (index, token) in inner.iter().enumerate() {
            let text = self.text(token);
            match text {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => {
                    // the closing `]` of the literal must be the last token
                    if depth == 0 {
                        return None;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            if depth == 0 && text == "," {
                let start = item_start.take()?;
                items.push(self.list_item(&inner[start..index]));
                trailing_comma = true;
            } else if item_start.is_none() {
                item_start = Some(index);
                trailing_comma = false;
            }
        }
        if let Some(start) = item_start {
            items.push(self.list_item(&inner[start..]));
            trailing_comma = false;
        }

        Some(ListLiteral {
            open: open.span.start,
            close: close.span.start,
            items,
            trailing_comma,
        })
    }

    fn list_item(&self, tokens: &[Token]) -> ListItem {
        let span = tokens[0].span.start..tokens[tokens.len() - 1].span.end;
        if let [literal] = tokens {
            if literal.kind == TokenKind::String {
                let name = Some(unquote(self.text(literal)).to_string());
                return ListItem { span, name };
            }
        }
        let mut depth = 0usize;
        let mut name = None;
        for (index, token) in tokens.iter().enumerate() {
            match self.text(token) {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth = depth.saturating_sub(1),
                "name" if depth == 1 => {
                    let is_kwarg = self.is(tokens.get(index + 1), "=");
                    if let (true, Some(value)) = (is_kwarg, tokens.get(index + 2)) {
                        if value.kind == TokenKind::String {
                            name = Some(unquote(self.text(value)).to_string());
                        }
                    }
                }
                _ => {}
            }
        }
        ListItem { span, name }
    }

    fn bindings(&self, tokens: &[Token]) -> Vec<Binding> {
        let words: Vec<&str> = tokens.iter().map(|t| self.text(t)).collect();
        match words.first() {
            Some(&"from") => {
                let Some(import_at) = words.iter().position(|w| *w == "import") else {
                    return Vec::new();
                };
                let module = words[1..import_at].concat();
                split_names(&words[import_at + 1..])
                    .into_iter()
                    .map(|(path, alias)| Binding {
                        name: alias.unwrap_or(path.as_str()).to_string(),
                        canonical: match alias {
                            Some(alias) => format!("from {module} import {path} as {alias}"),
                            None => format!("from {module} import {path}"),
                        },
                    })
                    .collect()
            }
            Some(&"import") => split_names(&words[1..])
                .into_iter()
                .map(|(path, alias)| Binding {
                    name: alias.map_or_else(
                        || path.split('.').next().unwrap_or(path.as_str()).to_string(),
                        str::to_string,
                    ),
                    canonical: match alias {
                        Some(alias) => format!("import {path} as {alias}"),
                        None => format!("import {path}"),
                    },
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Split `a.b as c, d` into dotted paths with optional aliases
fn split_names<'w>(words: &[&'w str]) -> Vec<(String, Option<&'w str>)> {
    let mut out = Vec::new();
    let mut path = String::new();
    let mut alias = None;
    let mut expect_alias = false;

    for word in words {
        match *word {
            "(" | ")" => {}
            "," => {
                if !path.is_empty() {
                    out.push((std::mem::take(&mut path), alias.take()));
                }
            }
            "as" => expect_alias = true,
            _ if expect_alias => {
                alias = Some(*word);
                expect_alias = false;
            }
            _ => path.push_str(word),
        }
    }
    if !path.is_empty() {
        out.push((path, alias));
    }
    out
}

/// Contents of a string literal without prefix and quotes
pub fn unquote(literal: &str) -> &str {
    let body = literal.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(inner) = body
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tree: &SourceTree) -> Vec<(NodeKind, Option<&str>)> {
        tree.nodes()
            .iter()
            .map(|n| (n.kind, n.name.as_deref()))
            .collect()
    }

    #[test]
    fn test_module_level_declarations() {
        let src = "\"\"\"Models.\"\"\"\nfrom django.db import models\n\n\n@decorate\nclass Blog(models.Model):\n    title = models.CharField(max_length=250)\n\n\ndef helper():\n    return 1\n\nCOUNT: int = 3\nprint(COUNT)\n";
        let tree = parse(src).unwrap();
        assert_eq!(
            names(&tree),
            vec![
                (NodeKind::Statement, None),
                (NodeKind::Import, None),
                (NodeKind::Class, Some("Blog")),
                (NodeKind::Function, Some("helper")),
                (NodeKind::Assignment, Some("COUNT")),
                (NodeKind::Statement, None),
            ]
        );

        let blog = &tree.nodes()[2];
        assert!(tree.text(blog.span.clone()).starts_with("@decorate\nclass Blog"));
        assert_eq!(tree.text(blog.header.clone()), "class Blog(models.Model):");
        let body = blog.body.as_ref().unwrap();
        assert_eq!(body.indent, 4);
        assert_eq!(body.indent_text, "    ");
        assert_eq!(body.children[0].name.as_deref(), Some("title"));
        assert_eq!(tree.text(tree.nodes()[4].header.clone()), "COUNT: int =");
    }

    #[test]
    fn test_block_end_includes_trailing_comments() {
        let src = "class A:\n    x = 1\n    # trailing\n\n# module comment\ny = 2\n";
        let tree = parse(src).unwrap();
        let body = tree.nodes()[0].body.as_ref().unwrap();
        assert_eq!(&src[..body.end], "class A:\n    x = 1\n    # trailing\n");
        assert_eq!(tree.nodes()[0].span.end, body.end);
    }

    #[test]
    fn test_nested_blocks() {
        let src = "class A:\n    class Meta:\n        ordering = []\n\n    def f(self):\n        if x:\n            pass\n        return 1\n    y = 2\n";
        let tree = parse(src).unwrap();
        let body = tree.nodes()[0].body.as_ref().unwrap();
        let kinds: Vec<NodeKind> = body.children.iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NodeKind::Class, NodeKind::Function, NodeKind::Assignment]);
        assert_eq!(body.end, src.len());
    }

    #[test]
    fn test_inline_suite() {
        let tree = parse("class A: pass\n").unwrap();
        assert!(tree.nodes()[0].body.as_ref().unwrap().inline);
    }

    #[test]
    fn test_import_bindings() {
        let src = "import os.path, json as j\nfrom .models import (Post,\n    Blog as B)\nfrom . import views\n";
        let tree = parse(src).unwrap();
        let bindings: Vec<(&str, &str)> = tree
            .nodes()
            .iter()
            .flat_map(|n| n.bindings.iter())
            .map(|b| (b.name.as_str(), b.canonical.as_str()))
            .collect();
        assert_eq!(
            bindings,
            vec![
                ("os", "import os.path"),
                ("j", "import json as j"),
                ("Post", "from .models import Post"),
                ("B", "from .models import Blog as B"),
                ("views", "from . import views"),
            ]
        );
    }

    #[test]
    fn test_list_literal_items() {
        let src = "urlpatterns = [\n    path(\"\", index, name='home'),\n    path(\"a/\", include(\"a.urls\")),\n]\n";
        let tree = parse(src).unwrap();
        let list = tree.nodes()[0].list.as_ref().unwrap();
        assert_eq!(list.items.len(), 2);
        assert!(list.trailing_comma);
        assert_eq!(list.items[0].name.as_deref(), Some("home"));
        assert_eq!(list.items[1].name, None);
        assert_eq!(&src[list.items[1].span.clone()], "path(\"a/\", include(\"a.urls\"))");
        assert_eq!(&src[list.close..=list.close], "]");
    }

    #[test]
    fn test_string_items_named_by_value() {
        let src = "class BlogAdmin(admin.ModelAdmin):\n    list_display = [\"title\", 'slug', f(\"x\")]\n";
        let tree = parse(src).unwrap();
        let body = tree.nodes()[0].body.as_ref().unwrap();
        let list = body.children[0].list.as_ref().unwrap();
        let names: Vec<Option<&str>> = list.items.iter().map(|i| i.name.as_deref()).collect();
        assert_eq!(names, [Some("title"), Some("slug"), None]);
    }

    #[test]
    fn test_non_literal_lists() {
        let tree = parse("urlpatterns = [a] + extra\nb = []\n").unwrap();
        assert!(tree.nodes()[0].list.is_none());
        let empty = tree.nodes()[1].list.as_ref().unwrap();
        assert!(empty.items.is_empty());
        assert!(!empty.trailing_comma);
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(parse("  x = 1\n").unwrap_err().message, "unexpected indent");
        assert_eq!(parse("x = 1\n    y = 2\n").unwrap_err().line, 2);
        assert_eq!(parse("class A:\nx = 1\n").unwrap_err().line, 1);
        assert!(parse("if x:\n        a = 1\n    b = 2\n").is_err());
        assert!(parse("@decorate\nx = 1\n").is_err());
        assert!(parse("class A\n    x = 1\n").is_err());
    }

    #[test]
    fn test_soft_keywords_as_names() {
        let tree = parse("match = 1\ncase(x)\n").unwrap();
        assert_eq!(tree.nodes()[0].kind, NodeKind::Assignment);
        assert_eq!(tree.nodes()[1].kind, NodeKind::Statement);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"blog-list\""), "blog-list");
        assert_eq!(unquote("'x'"), "x");
        assert_eq!(unquote("r'''raw'''"), "raw");
    }
}
