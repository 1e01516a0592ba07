//! Token types for the TeX scanner.
//!
//! TeX math is tokenized much more finely than a programming language:
//! every letter is its own token (`ab` means `a·b`), control words like
//! `\det` and `\alpha` become [`TokenKind::Command`], and single
//! punctuation characters become [`TokenKind::Symbol`]. Whether a command
//! names a function, a constant, an operator or a Greek variable is decided
//! by the parser.

use std::fmt;

// ---------------------------------------------------------------------------
// Source location
// ---------------------------------------------------------------------------

/// A byte-offset span in the source markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A zero-length span at the given position.
    #[must_use]
    pub const fn at(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// A lexical token produced by the scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// The kind and payload of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A non-negative decimal literal; `-` is always a separate token.
    Number(f64),
    /// A single ASCII letter.
    Letter(char),
    /// A control word without its backslash (`det`, `alpha`, `cdot`).
    ///
    /// `\operatorname{name}` is folded into `Command(name)`, and the escaped
    /// braces `\{`, `\}` become `Command("{")`, `Command("}")`.
    Command(String),
    /// Any other single character: operators, delimiters, `&`, `_`, `^`.
    Symbol(char),
    /// The `\\` row separator.
    RowSep,
    /// Body of a `\text{...}` group.
    Text(String),
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Returns `true` if this is the symbol `c`.
    #[must_use]
    pub fn is_symbol(&self, c: char) -> bool {
        matches!(self, Self::Symbol(s) if *s == c)
    }

    /// Returns `true` if this is the command `name`.
    #[must_use]
    pub fn is_command(&self, name: &str) -> bool {
        matches!(self, Self::Command(s) if s == name)
    }

    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Letter(c) | Self::Symbol(c) => write!(f, "`{c}`"),
            Self::Command(name) => write!(f, "`\\{name}`"),
            Self::RowSep => write!(f, "`\\\\`"),
            Self::Text(_) => write!(f, "text"),
            Self::Eof => write!(f, "end of input"),
        }
    }
}
