use std::fmt;

/// Errors returned by graphics helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// A color string was not of the form `#rrggbb`.
    InvalidColor(String),
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidColor(s) => write!(f, "invalid color \"{s}\": expected #rrggbb"),
        }
    }
}

impl std::error::Error for GraphicsError {}
