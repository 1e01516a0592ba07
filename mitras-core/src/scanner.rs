//! Lexical scanner for TeX math markup.
//!
//! # Token production rules
//!
//! | Input                      | Token produced                  |
//! |----------------------------|---------------------------------|
//! | `12`, `3.5`, `.5`          | `Number(value)`                 |
//! | `x`                        | `Letter('x')`                   |
//! | `\det`, `\alpha`           | `Command("det")`, `Command("alpha")` |
//! | `\operatorname{inv}`       | `Command("inv")`                |
//! | `\{`, `\}`                 | `Command("{")`, `Command("}")`  |
//! | `\\`                       | `RowSep`                        |
//! | `\text{abc}`               | `Text("abc")`                   |
//! | `+`, `(`, `&`, `^`, ...    | `Symbol(c)`                     |
//! | `\left`, `\right`          | Skipped (the delimiter follows) |
//! | `\ `, `\,`, `\;`, `\quad`  | Skipped                         |
//! | end of input               | `Eof`                           |

use crate::error::{ErrorKind, MathError, MathResult};
use crate::token::{Span, Token, TokenKind};

/// Control words that only produce horizontal space.
const SPACING_COMMANDS: &[&str] = &["quad", "qquad", "space", "thinspace", "enspace"];

/// Single-character control symbols that only produce horizontal space.
const SPACING_SYMBOLS: &[char] = &[' ', ',', ';', ':', '!', '>'];

/// Characters passed through as [`TokenKind::Symbol`].
const SYMBOLS: &str = "+-*/^_()[]{}|&,=!'<>";

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Lexical scanner over one expression.
pub struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    #[must_use]
    pub const fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Scan the next token.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidCharacter`] for characters outside the
    /// markup alphabet and [`ErrorKind::UnbalancedDelimiter`] for an
    /// unterminated brace argument.
    pub fn next_token(&mut self) -> MathResult<Token> {
        loop {
            self.skip_whitespace();
            let start = self.pos;
            let Some(c) = self.peek() else {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    span: Span::at(start),
                });
            };

            if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit()))
            {
                return Ok(self.scan_number(start));
            }
            if c.is_ascii_alphabetic() {
                self.bump();
                return Ok(self.token(TokenKind::Letter(c), start));
            }
            if c == '\\' {
                self.bump();
                if let Some(kind) = self.scan_control(start)? {
                    return Ok(self.token(kind, start));
                }
                continue;
            }
            if SYMBOLS.contains(c) {
                self.bump();
                return Ok(self.token(TokenKind::Symbol(c), start));
            }
            // Characters a math editor may emit as-is
            let unicode = match c {
                '·' | '⋅' => Some("cdot"),
                '×' => Some("times"),
                'π' => Some("pi"),
                _ => None,
            };
            self.bump();
            return match unicode {
                Some(name) => Ok(self.token(TokenKind::Command(name.to_owned()), start)),
                None => Err(MathError::new(
                    ErrorKind::InvalidCharacter,
                    format!("invalid character {c:?}"),
                )
                .with_span(Span::new(start, self.pos))),
            };
        }
    }

    /// Scan all remaining tokens, ending with `Eof`.
    ///
    /// # Errors
    ///
    /// Propagates the first error from [`Scanner::next_token`].
    pub fn scan_all(&mut self) -> MathResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let is_eof = tok.kind.is_eof();
            tokens.push(tok);
            if is_eof {
                return Ok(tokens);
            }
        }
    }

    // -- internal helpers --

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    const fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            span: Span::new(start, self.pos),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn scan_number(&mut self, start: usize) -> Token {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        // Only ASCII digits and at most one '.' were consumed
        let value = self.src[start..self.pos].parse::<f64>().unwrap_or(0.0);
        self.token(TokenKind::Number(value), start)
    }

    /// Scan what follows a backslash. `None` means the control sequence
    /// produced no token.
    fn scan_control(&mut self, start: usize) -> MathResult<Option<TokenKind>> {
        let Some(c) = self.peek() else {
            return Err(MathError::new(ErrorKind::UnexpectedToken, "trailing backslash")
                .with_span(Span::new(start, self.pos)));
        };

        if !c.is_ascii_alphabetic() {
            self.bump();
            return match c {
                '\\' => Ok(Some(TokenKind::RowSep)),
                '{' | '}' => Ok(Some(TokenKind::Command(c.to_string()))),
                '|' => Ok(Some(TokenKind::Symbol('|'))),
                c if SPACING_SYMBOLS.contains(&c) => Ok(None),
                _ => Err(MathError::new(
                    ErrorKind::UnknownCommand,
                    format!("unknown control symbol \\{c}"),
                )
                .with_span(Span::new(start, self.pos))),
            };
        }

        let name_start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.bump();
        }
        let name = &self.src[name_start..self.pos];
        match name {
            "left" | "right" => {
                // `\left.` is an invisible delimiter
                self.skip_whitespace();
                if self.peek() == Some('.') {
                    self.bump();
                }
                Ok(None)
            }
            "operatorname" | "mathrm" => {
                let body = self.scan_braced(start)?;
                Ok(Some(TokenKind::Command(body.trim().to_owned())))
            }
            "text" | "textrm" => {
                let body = self.scan_braced(start)?;
                Ok(Some(TokenKind::Text(body)))
            }
            _ if SPACING_COMMANDS.contains(&name) => Ok(None),
            _ => Ok(Some(TokenKind::Command(name.to_owned()))),
        }
    }

    /// Read a `{...}` argument verbatim, honoring nested braces.
    fn scan_braced(&mut self, start: usize) -> MathResult<String> {
        self.skip_whitespace();
        if self.peek() != Some('{') {
            return Err(MathError::new(ErrorKind::MissingToken, "expected `{`")
                .with_span(Span::new(start, self.pos)));
        }
        self.bump();
        let body_start = self.pos;
        let mut depth = 1usize;
        while let Some(c) = self.bump() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(self.src[body_start..self.pos - 1].to_owned());
                    }
                }
                _ => {}
            }
        }
        Err(MathError::new(ErrorKind::UnbalancedDelimiter, "unterminated `{`")
            .with_span(Span::new(start, self.pos)))
    }
}

/// Tokenize a whole expression.
///
/// # Errors
///
/// See [`Scanner::next_token`].
pub fn tokenize(src: &str) -> MathResult<Vec<Token>> {
    Scanner::new(src).scan_all()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
