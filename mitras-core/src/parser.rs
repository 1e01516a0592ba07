//! Recursive-descent parser from TeX markup to [`Node`] trees.
//!
//! Precedence, loosest first:
//!
//! | Level      | Forms                                             |
//! |------------|---------------------------------------------------|
//! | statement  | `name = expr` (top level only), `expr`            |
//! | additive   | `+`, `-`                                          |
//! | product    | `*`, `\cdot`, `\times`, `/`, `\div`, juxtaposition |
//! | sign       | prefix `-`, `+`                                   |
//! | postfix    | `^`, `!`                                          |
//! | primary    | literals, names, groups, `\frac`, `\sqrt`, calls, matrices |

use crate::ast::{BinaryOp, Node, UnaryOp};
use crate::error::{ErrorKind, MathError, MathResult};
use crate::scanner::tokenize;
use crate::token::{Span, Token, TokenKind};

/// Control words parsed as function applications.
pub const FUNCTIONS: &[&str] = &[
    "sin", "cos", "tan", "csc", "sec", "cot", "arcsin", "arccos", "arctan", "sinh", "cosh",
    "tanh", "log", "ln", "exp", "det", "max", "min", "norm", "inv", "proj", "comp", "cross",
    "dot", "transpose", "trace", "eigenvalues", "eigenvectors", "abs", "sqrt", "nthroot",
];

/// Greek letters usable as variable names. `\pi` is the constant.
const GREEK: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "varepsilon", "zeta", "eta", "theta",
    "vartheta", "iota", "kappa", "lambda", "mu", "nu", "xi", "rho", "sigma", "tau", "upsilon",
    "phi", "varphi", "chi", "psi", "omega", "Gamma", "Delta", "Theta", "Lambda", "Xi", "Pi",
    "Sigma", "Phi", "Psi", "Omega",
];

/// Matrix environments; all produce the same literal.
const MATRIX_ENVS: &[&str] = &["bmatrix", "pmatrix", "matrix", "Bmatrix"];

/// Parse one expression.
///
/// # Errors
///
/// Returns a parse-kind [`MathError`] for malformed markup.
pub fn parse(src: &str) -> MathResult<Node> {
    let tokens = tokenize(src)?;
    let mut parser = Parser {
        src,
        tokens,
        pos: 0,
        abs_depth: 0,
    };
    parser.statement()
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    /// Open `|` bars; inside one a bar closes instead of multiplying.
    abs_depth: usize,
}

impl Parser<'_> {
    // -- token access --

    fn peek(&self) -> &TokenKind {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .or_else(|| self.tokens.last())
            .map_or(&TokenKind::Eof, |t| &t.kind)
    }

    fn span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or_else(Span::default, |t| t.span)
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if !kind.is_eof() {
            self.pos += 1;
        }
        kind
    }

    fn eat_symbol(&mut self, c: char) -> bool {
        if self.peek().is_symbol(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_command(&mut self, name: &str) -> bool {
        if self.peek().is_command(name) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, kind: ErrorKind, message: impl Into<String>) -> MathError {
        MathError::new(kind, message).with_span(self.span())
    }

    fn expect_symbol(&mut self, c: char) -> MathResult<()> {
        if self.eat_symbol(c) {
            Ok(())
        } else {
            let kind = if self.peek().is_eof() {
                ErrorKind::UnbalancedDelimiter
            } else {
                ErrorKind::MissingToken
            };
            Err(self.error(kind, format!("expected `{c}`, found {}", self.peek())))
        }
    }

    // -- grammar --

    fn statement(&mut self) -> MathResult<Node> {
        let start = self.pos;
        let node = match self.name()? {
            Some(name) if self.eat_symbol('=') => Node::Assign {
                name,
                value: Box::new(self.expr()?),
            },
            _ => {
                self.pos = start;
                self.expr()?
            }
        };
        if self.peek().is_eof() {
            Ok(node)
        } else {
            Err(self.error(
                ErrorKind::UnexpectedToken,
                format!("unexpected {}", self.peek()),
            ))
        }
    }

    fn expr(&mut self) -> MathResult<Node> {
        let mut lhs = self.product()?;
        loop {
            let op = if self.eat_symbol('+') {
                BinaryOp::Add
            } else if self.eat_symbol('-') {
                BinaryOp::Sub
            } else {
                return Ok(lhs);
            };
            let rhs = self.product()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn product(&mut self) -> MathResult<Node> {
        let mut lhs = self.sign()?;
        loop {
            let op = if self.eat_symbol('*') || self.eat_command("cdot") || self.eat_command("ast") {
                BinaryOp::Mul
            } else if self.eat_command("times") {
                BinaryOp::Cross
            } else if self.eat_symbol('/') || self.eat_command("div") {
                BinaryOp::Div
            } else if self.starts_primary() {
                BinaryOp::Mul
            } else {
                return Ok(lhs);
            };
            let rhs = self.sign()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn sign(&mut self) -> MathResult<Node> {
        if self.eat_symbol('-') {
            let operand = self.sign()?;
            return Ok(Node::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            });
        }
        if self.eat_symbol('+') {
            return self.sign();
        }
        self.postfix()
    }

    fn postfix(&mut self) -> MathResult<Node> {
        let mut node = self.primary()?;
        loop {
            if self.eat_symbol('^') {
                let exponent = self.argument()?;
                node = if matches!(&exponent, Node::Symbol(s) if s == "T") {
                    call("transpose", vec![node])
                } else {
                    binary(BinaryOp::Pow, node, exponent)
                };
            } else if self.eat_symbol('!') {
                node = Node::Unary {
                    op: UnaryOp::Factorial,
                    operand: Box::new(node),
                };
            } else {
                return Ok(node);
            }
        }
    }

    /// A `{...}` group or a single primary, as taken by `^`, `\frac`, `\sqrt`.
    fn argument(&mut self) -> MathResult<Node> {
        if self.eat_symbol('{') {
            let inner = self.expr()?;
            self.expect_symbol('}')?;
            Ok(inner)
        } else {
            self.primary()
        }
    }

    /// Whether the next token can begin an implicit factor.
    fn starts_primary(&self) -> bool {
        match self.peek() {
            TokenKind::Number(_) | TokenKind::Letter(_) | TokenKind::Symbol('(' | '[' | '{') => {
                true
            }
            TokenKind::Symbol('|') => self.abs_depth == 0,
            TokenKind::Command(name) => {
                name == "{"
                    || name == "pi"
                    || name == "frac"
                    || name == "begin"
                    || FUNCTIONS.contains(&name.as_str())
                    || GREEK.contains(&name.as_str())
            }
            _ => false,
        }
    }

    fn primary(&mut self) -> MathResult<Node> {
        if let Some(name) = self.name()? {
            return Ok(Node::Symbol(name));
        }
        let span = self.span();
        match self.advance() {
            TokenKind::Number(n) => Ok(Node::Number(n)),
            TokenKind::Text(text) => Ok(Node::Text(text)),
            TokenKind::Symbol('(') => self.group(')'),
            TokenKind::Symbol('[') => self.group(']'),
            TokenKind::Symbol('{') => {
                let inner = self.expr()?;
                self.expect_symbol('}')?;
                Ok(inner)
            }
            TokenKind::Symbol('|') => {
                self.abs_depth += 1;
                let inner = self.expr();
                self.abs_depth -= 1;
                let inner = inner?;
                self.expect_symbol('|')?;
                Ok(call("abs", vec![inner]))
            }
            TokenKind::Command(name) => self.command(&name, span),
            TokenKind::Eof => Err(MathError::new(
                ErrorKind::UnexpectedToken,
                "unexpected end of input",
            )
            .with_span(span)),
            other => Err(MathError::new(ErrorKind::UnexpectedToken, format!("unexpected {other}"))
                .with_span(span)),
        }
    }

    fn group(&mut self, close: char) -> MathResult<Node> {
        let saved = self.abs_depth;
        self.abs_depth = 0;
        let inner = self.expr();
        self.abs_depth = saved;
        let inner = inner?;
        self.expect_symbol(close)?;
        Ok(Node::Group(Box::new(inner)))
    }

    fn command(&mut self, name: &str, span: Span) -> MathResult<Node> {
        match name {
            "pi" => Ok(Node::Symbol("pi".to_owned())),
            "{" => {
                let inner = self.expr()?;
                if !self.eat_command("}") {
                    return Err(self.error(ErrorKind::UnbalancedDelimiter, "expected `\\}`"));
                }
                Ok(Node::Group(Box::new(inner)))
            }
            "frac" => {
                let num = self.argument()?;
                let den = self.argument()?;
                Ok(binary(BinaryOp::Div, num, den))
            }
            "sqrt" => {
                let index = if self.eat_symbol('[') {
                    let index = self.expr()?;
                    self.expect_symbol(']')?;
                    Some(index)
                } else {
                    None
                };
                let radicand = self.argument()?;
                Ok(match index {
                    Some(index) => call("nthroot", vec![radicand, index]),
                    None => call("sqrt", vec![radicand]),
                })
            }
            "begin" => self.matrix(span),
            _ if FUNCTIONS.contains(&name) => {
                let args = self.call_args()?;
                Ok(call(name, args))
            }
            _ => Err(MathError::new(
                ErrorKind::UnknownCommand,
                format!("unknown command \\{name}"),
            )
            .with_span(span)),
        }
    }

    /// `(a, b, ...)` or a single implicit factor (`\sin x`, `\det A`).
    fn call_args(&mut self) -> MathResult<Vec<Node>> {
        if !self.eat_symbol('(') {
            return Ok(vec![self.postfix()?]);
        }
        let saved = self.abs_depth;
        self.abs_depth = 0;
        let args = self.comma_list();
        self.abs_depth = saved;
        let args = args?;
        self.expect_symbol(')')?;
        Ok(args)
    }

    fn comma_list(&mut self) -> MathResult<Vec<Node>> {
        let mut args = vec![self.expr()?];
        while self.eat_symbol(',') {
            args.push(self.expr()?);
        }
        Ok(args)
    }

    /// Body of `\begin{env} ... \end{env}`; `\begin` is already consumed.
    fn matrix(&mut self, span: Span) -> MathResult<Node> {
        let env = self.env_name()?;
        if !MATRIX_ENVS.contains(&env.as_str()) {
            return Err(MathError::new(
                ErrorKind::UnknownCommand,
                format!("unsupported environment {env}"),
            )
            .with_span(span));
        }
        let saved = self.abs_depth;
        self.abs_depth = 0;
        let rows = self.matrix_rows();
        self.abs_depth = saved;
        let rows = rows?;

        let end = self.env_name()?;
        if end != env {
            return Err(self.error(
                ErrorKind::UnbalancedDelimiter,
                format!("\\begin{{{env}}} closed by \\end{{{end}}}"),
            ));
        }
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(MathError::new(ErrorKind::InvalidMatrix, "empty matrix").with_span(span));
        }
        if rows.iter().any(|row| row.len() != width) {
            return Err(
                MathError::new(ErrorKind::InvalidMatrix, "rows differ in length").with_span(span)
            );
        }
        Ok(Node::Matrix(rows))
    }

    fn matrix_rows(&mut self) -> MathResult<Vec<Vec<Node>>> {
        let mut rows = Vec::new();
        loop {
            // Trailing `\\` before `\end`
            if self.eat_command("end") {
                return Ok(rows);
            }
            let mut row = vec![self.expr()?];
            while self.eat_symbol('&') {
                row.push(self.expr()?);
            }
            rows.push(row);
            if matches!(self.peek(), TokenKind::RowSep) {
                self.pos += 1;
            } else if self.eat_command("end") {
                return Ok(rows);
            } else {
                return Err(self.error(
                    ErrorKind::UnbalancedDelimiter,
                    format!("expected `&`, `\\\\` or `\\end`, found {}", self.peek()),
                ));
            }
        }
    }

    /// `{letters}` after `\begin` or `\end`.
    fn env_name(&mut self) -> MathResult<String> {
        self.expect_symbol('{')?;
        let mut name = String::new();
        while let TokenKind::Letter(c) = self.peek() {
            name.push(*c);
            self.pos += 1;
        }
        self.expect_symbol('}')?;
        Ok(name)
    }

    /// A variable name: a letter or Greek command with an optional
    /// subscript. Leaves the position untouched when there is none.
    fn name(&mut self) -> MathResult<Option<String>> {
        let base = match self.peek() {
            TokenKind::Letter(c) => c.to_string(),
            TokenKind::Command(name) if GREEK.contains(&name.as_str()) => name.clone(),
            _ => return Ok(None),
        };
        self.pos += 1;
        if !self.eat_symbol('_') {
            return Ok(Some(base));
        }
        let subscript = if self.eat_symbol('{') {
            let start = self.span().start;
            while !self.peek().is_symbol('}') {
                if self.peek().is_eof() {
                    return Err(self.error(ErrorKind::UnbalancedDelimiter, "unterminated subscript"));
                }
                self.pos += 1;
            }
            let end = self.span().start;
            self.pos += 1;
            self.src[start..end].trim().to_owned()
        } else {
            let span = self.span();
            match self.advance() {
                TokenKind::Letter(_) | TokenKind::Number(_) => {
                    self.src[span.start..span.end].to_owned()
                }
                other => {
                    return Err(MathError::new(
                        ErrorKind::UnexpectedToken,
                        format!("invalid subscript {other}"),
                    )
                    .with_span(span));
                }
            }
        };
        if subscript.is_empty() {
            return Err(self.error(ErrorKind::MissingToken, "empty subscript"));
        }
        Ok(Some(format!("{base}_{subscript}")))
    }
}

fn binary(op: BinaryOp, lhs: Node, rhs: Node) -> Node {
    Node::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

fn call(name: &str, args: Vec<Node>) -> Node {
    Node::Call {
        name: name.to_owned(),
        args,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
