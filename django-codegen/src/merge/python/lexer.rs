//! Python tokenizer
//!
//! Splits source into logical lines of significant tokens. Strings (with
//! prefixes, triple quotes and escapes), comments, bracket nesting and
//! backslash continuations are handled so that anything inside them never
//! looks like structure. Comment-only lines are reported separately so the
//! parser can attach them to the block they sit in.

use std::ops::Range;

/// Token category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword
    Name,
    /// Numeric literal
    Number,
    /// String literal including prefix and quotes
    String,
    /// Operator or delimiter
    Op,
}

/// One significant token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Category
    pub kind: TokenKind,
    /// Byte range in the source
    pub span: Range<usize>,
}

/// One logical line: a statement or a compound statement header
#[derive(Debug, Clone)]
pub struct LogicalLine {
    /// Offset of the first byte of the physical line the statement starts on
    pub start: usize,
    /// Indentation width (tabs advance to the next multiple of 8)
    pub indent: usize,
    /// Significant tokens, comments excluded
    pub tokens: Vec<Token>,
    /// Offset just past the terminating newline, or the source length
    pub end: usize,
    /// 1-based line number of `start`
    pub line: usize,
}

/// A line holding nothing but a comment
#[derive(Debug, Clone)]
pub struct CommentLine {
    /// Offset of the first byte of the line
    pub start: usize,
    /// Indentation width of the `#`
    pub indent: usize,
    /// Offset just past the newline, or the source length
    pub end: usize,
}

/// Result of tokenizing a whole source
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    /// Logical lines in source order
    pub lines: Vec<LogicalLine>,
    /// Comment-only lines in source order
    pub comments: Vec<CommentLine>,
}

/// Tokenizer failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// 1-based line number
    pub line: usize,
    /// What went wrong
    pub message: String,
}

const THREE_CHAR_OPS: &[&[u8]] = &[b"**=", b"//=", b">>=", b"<<=", b"..."];
const TWO_CHAR_OPS: &[&[u8]] = &[
    b"==", b"!=", b"<=", b">=", b"->", b"+=", b"-=", b"*=", b"/=", b"%=", b"&=", b"|=", b"^=",
    b"@=", b"**", b"//", b"<<", b">>", b":=",
];
const ONE_CHAR_OPS: &[u8] = b"+-*/%@&|^~<>=.,:;!";
const STRING_PREFIXES: &[&str] = &["r", "u", "b", "f", "br", "rb", "fr", "rf"];

/// Width of the leading whitespace of `text`
#[must_use]
pub fn indent_width(text: &str) -> usize {
    let mut width = 0;
    for b in text.bytes() {
        match b {
            b' ' => width += 1,
            b'\t' => width = (width / 8 + 1) * 8,
            0x0c => width = 0,
            _ => break,
        }
    }
    width
}

/// Leading whitespace of the line starting at `start`
#[must_use]
pub fn leading_whitespace(source: &str, start: usize) -> &str {
    let rest = &source[start..];
    let len = rest
        .bytes()
        .take_while(|b| matches!(b, b' ' | b'\t' | 0x0c))
        .count();
    &rest[..len]
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    line_start: usize,
    brackets: Vec<(u8, usize)>,
    current: Option<LogicalLine>,
    out: Lexed,
}

/// Tokenize a whole source
///
/// # Errors
///
/// Returns an error for unterminated strings, unbalanced brackets, stray
/// characters and misplaced line continuations.
pub fn lex(source: &str) -> Result<Lexed, LexError> {
    let mut lexer = Lexer {
        src: source,
        bytes: source.as_bytes(),
        pos: 0,
        line: 1,
        line_start: 0,
        brackets: Vec::new(),
        current: None,
        out: Lexed::default(),
    };
    lexer.run()?;
    Ok(lexer.out)
}

/// Significant tokens of a text, ignoring line structure
///
/// # Errors
///
/// Same as [`lex`].
pub fn tokens(source: &str) -> Result<Vec<Token>, LexError> {
    Ok(lex(source)?
        .lines
        .into_iter()
        .flat_map(|line| line.tokens)
        .collect())
}

impl Lexer<'_> {
    fn run(&mut self) -> Result<(), LexError> {
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            match b {
                b' ' | b'\t' | 0x0c => self.pos += 1,
                b'\n' | b'\r' => self.newline(),
                b'\\' => self.continuation()?,
                b'#' => self.comment(),
                b'"' | b'\'' => self.string(self.pos)?,
                b'0'..=b'9' => self.number(),
                b'.' if self.peek(1).is_some_and(|c| c.is_ascii_digit()) => self.number(),
                b'(' | b'[' | b'{' => {
                    self.brackets.push((b, self.line));
                    self.push(TokenKind::Op, self.pos, self.pos + 1);
                }
                b')' | b']' | b'}' => self.close_bracket(b)?,
                _ if is_name_start(b) => self.name()?,
                _ => self.operator()?,
            }
        }

        if let Some((open, line)) = self.brackets.last() {
            return Err(LexError {
                line: *line,
                message: format!("'{}' was never closed", char::from(*open)),
            });
        }
        self.finish_line(self.bytes.len());
        Ok(())
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn error(&self, message: impl Into<String>) -> LexError {
        LexError {
            line: self.line,
            message: message.into(),
        }
    }

    fn newline_len(&self, at: usize) -> usize {
        match (self.bytes.get(at), self.bytes.get(at + 1)) {
            (Some(b'\r'), Some(b'\n')) => 2,
            (Some(b'\r' | b'\n'), _) => 1,
            _ => 0,
        }
    }

    fn newline(&mut self) {
        let end = self.pos + self.newline_len(self.pos);
        if self.brackets.is_empty() {
            self.finish_line(end);
        }
        self.pos = end;
        self.line += 1;
        self.line_start = end;
    }

    fn continuation(&mut self) -> Result<(), LexError> {
        let len = self.newline_len(self.pos + 1);
        if len == 0 {
            return Err(self.error("unexpected character after line continuation"));
        }
        self.pos += 1 + len;
        self.line += 1;
        self.line_start = self.pos;
        Ok(())
    }

    fn comment(&mut self) {
        let rest = &self.bytes[self.pos..];
        let len = rest
            .iter()
            .position(|b| matches!(b, b'\n' | b'\r'))
            .unwrap_or(rest.len());
        let eol = self.pos + len;

        if self.current.is_none() && self.brackets.is_empty() {
            self.out.comments.push(CommentLine {
                start: self.line_start,
                indent: indent_width(&self.src[self.line_start..self.pos]),
                end: eol + self.newline_len(eol),
            });
        }
        self.pos = eol;
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        let line = self.current.get_or_insert_with(|| LogicalLine {
            start: self.line_start,
            indent: indent_width(&self.src[self.line_start..start]),
            tokens: Vec::new(),
            end,
            line: self.line,
        });
        line.tokens.push(Token {
            kind,
            span: start..end,
        });
        self.pos = end;
    }

    fn finish_line(&mut self, end: usize) {
        if let Some(mut line) = self.current.take() {
            line.end = end;
            self.out.lines.push(line);
        }
    }

    fn close_bracket(&mut self, close: u8) -> Result<(), LexError> {
        let expected = match close {
            b')' => b'(',
            b']' => b'[',
            _ => b'{',
        };
        match self.brackets.pop() {
            Some((open, _)) if open == expected => {
                self.push(TokenKind::Op, self.pos, self.pos + 1);
                Ok(())
            }
            _ => Err(self.error(format!("unmatched '{}'", char::from(close)))),
        }
    }

    fn name(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let mut end = start;
        while end < self.bytes.len() && is_name_continue(self.bytes[end]) {
            end += 1;
        }

        let word = &self.src[start..end];
        let quote_follows = matches!(self.bytes.get(end), Some(b'"' | b'\''));
        if quote_follows && STRING_PREFIXES.contains(&word.to_ascii_lowercase().as_str()) {
            self.pos = end;
            return self.string(start);
        }

        self.push(TokenKind::Name, start, end);
        Ok(())
    }

    fn number(&mut self) {
        let start = self.pos;
        let mut end = start;
        while end < self.bytes.len() {
            let b = self.bytes[end];
            let exponent_sign = matches!(b, b'+' | b'-')
                && matches!(self.bytes[end - 1], b'e' | b'E')
                && !self.src[start..end].starts_with("0x")
                && !self.src[start..end].starts_with("0X");
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || exponent_sign {
                end += 1;
            } else {
                break;
            }
        }
        self.push(TokenKind::Number, start, end);
    }

    /// String literal whose opening quote is at `self.pos`; `start` includes any prefix
    fn string(&mut self, start: usize) -> Result<(), LexError> {
        let quote = self.bytes[self.pos];
        let open_line = self.line;
        let triple = self.peek(1) == Some(quote) && self.peek(2) == Some(quote);
        let mut i = self.pos + if triple { 3 } else { 1 };

        loop {
            let Some(&b) = self.bytes.get(i) else {
                return Err(LexError {
                    line: open_line,
                    message: "unterminated string literal".to_string(),
                });
            };
            match b {
                b'\\' => {
                    let len = self.newline_len(i + 1);
                    if len > 0 {
                        self.line += 1;
                        self.line_start = i + 1 + len;
                        i += 1 + len;
                    } else {
                        i += 2;
                    }
                }
                b'\n' | b'\r' if triple => {
                    let len = self.newline_len(i);
                    self.line += 1;
                    self.line_start = i + len;
                    i += len;
                }
                b'\n' | b'\r' => {
                    return Err(LexError {
                        line: open_line,
                        message: "unterminated string literal".to_string(),
                    });
                }
                _ if b == quote => {
                    if !triple {
                        i += 1;
                        break;
                    }
                    if self.bytes.get(i + 1) == Some(&quote) && self.bytes.get(i + 2) == Some(&quote) {
                        i += 3;
                        break;
                    }
                    i += 1;
                }
                _ => i += 1,
            }
        }

        // the logical line starts where the string starts, not where it ends
        if self.current.is_none() {
            self.current = Some(LogicalLine {
                start: self.line_start_of(start),
                indent: indent_width(&self.src[self.line_start_of(start)..start]),
                tokens: Vec::new(),
                end: i,
                line: open_line,
            });
        }
        self.push(TokenKind::String, start, i);
        Ok(())
    }

    fn line_start_of(&self, offset: usize) -> usize {
        self.src[..offset]
            .rfind(['\n', '\r'])
            .map_or(0, |nl| nl + 1)
    }

    fn operator(&mut self) -> Result<(), LexError> {
        let rest = &self.bytes[self.pos..];
        let len = if THREE_CHAR_OPS.iter().any(|op| rest.starts_with(op)) {
            3
        } else if TWO_CHAR_OPS.iter().any(|op| rest.starts_with(op)) {
            2
        } else if ONE_CHAR_OPS.contains(&rest[0]) {
            1
        } else {
            return Err(self.error(format!(
                "unexpected character '{}'",
                self.src[self.pos..].chars().next().unwrap_or('?')
            )));
        };
        self.push(TokenKind::Op, self.pos, self.pos + len);
        Ok(())
    }
}

const fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

const fn is_name_continue(b: u8) -> bool {
    is_name_start(b) || b.is_ascii_digit()
}
