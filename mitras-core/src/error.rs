//! Error types for the expression scanner, parser and evaluator.
//!
//! None of these ever reach the user as a failure: the analyzer turns them
//! into a blank analysis. They still carry enough detail to be logged.

use std::fmt;

use crate::token::Span;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// An error produced while reading or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Source location, if available.
    pub span: Option<Span>,
}

impl MathError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
        }
    }

    /// Attach a source span.
    #[must_use]
    pub const fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Whether the markup itself was malformed (as opposed to failing to
    /// evaluate).
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        self.kind.is_parse()
    }
}

impl fmt::Display for MathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(span) = self.span {
            write!(f, "[{}..{}] ", span.start, span.end)?;
        }
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for MathError {}

// ---------------------------------------------------------------------------
// Error kinds
// ---------------------------------------------------------------------------

/// Categories of errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // -- Scan and parse errors --
    /// Character that cannot start any token.
    InvalidCharacter,
    /// Token not valid at this position.
    UnexpectedToken,
    /// Expected token is missing.
    MissingToken,
    /// Unbalanced brackets, braces or `\begin`/`\end`.
    UnbalancedDelimiter,
    /// Unrecognized control word.
    UnknownCommand,
    /// Matrix rows of different lengths, or an empty matrix.
    InvalidMatrix,

    // -- Evaluation errors --
    /// Variable not bound in scope.
    UndefinedVariable,
    /// Call to a function the kernel does not provide.
    UnknownFunction,
    /// Operand of the wrong kind for an operation.
    TypeError,
    /// Shapes do not agree (e.g. adding a 2-vector to a 3-vector).
    DimensionMismatch,
    /// Matrix is not invertible.
    Singular,
    /// Argument outside the function's domain.
    DomainError,
    /// Wrong number of arguments.
    ArityMismatch,
    /// Valid but unsupported input (e.g. complex eigenvalues).
    Unsupported,
}

impl ErrorKind {
    /// Whether this kind belongs to the parse phase.
    #[must_use]
    pub const fn is_parse(self) -> bool {
        matches!(
            self,
            Self::InvalidCharacter
                | Self::UnexpectedToken
                | Self::MissingToken
                | Self::UnbalancedDelimiter
                | Self::UnknownCommand
                | Self::InvalidMatrix
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCharacter => write!(f, "invalid character"),
            Self::UnexpectedToken => write!(f, "unexpected token"),
            Self::MissingToken => write!(f, "missing token"),
            Self::UnbalancedDelimiter => write!(f, "unbalanced delimiter"),
            Self::UnknownCommand => write!(f, "unknown command"),
            Self::InvalidMatrix => write!(f, "invalid matrix"),
            Self::UndefinedVariable => write!(f, "undefined variable"),
            Self::UnknownFunction => write!(f, "unknown function"),
            Self::TypeError => write!(f, "type error"),
            Self::DimensionMismatch => write!(f, "dimension mismatch"),
            Self::Singular => write!(f, "singular matrix"),
            Self::DomainError => write!(f, "domain error"),
            Self::ArityMismatch => write!(f, "wrong number of arguments"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Convenience type alias for results using [`MathError`].
pub type MathResult<T> = Result<T, MathError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
