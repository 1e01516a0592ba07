//! Evaluated values and their classification.

use std::fmt;
use std::sync::Arc;

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;

/// Result of evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Complex(Complex64),
    /// One-dimensional; one-column matrix literals land here.
    Vector(DVector<f64>),
    /// Two-dimensional.
    Matrix(DMatrix<f64>),
    Text(Arc<str>),
}

/// Classification of a result by shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultKind {
    ScalarNumber,
    ScalarComplex,
    Vector,
    Matrix,
    #[default]
    Unknown,
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ScalarNumber => "number",
            Self::ScalarComplex => "complex",
            Self::Vector => "vector",
            Self::Matrix => "matrix",
            Self::Unknown => "unknown",
        })
    }
}

impl Value {
    /// Wrap a matrix, demoting a single column to a vector.
    #[must_use]
    pub fn from_matrix(m: DMatrix<f64>) -> Self {
        if m.ncols() == 1 {
            Self::Vector(m.column(0).into_owned())
        } else {
            Self::Matrix(m)
        }
    }

    /// Wrap a complex number, demoting it to a real when the imaginary part
    /// is exactly zero.
    #[must_use]
    pub fn from_complex(z: Complex64) -> Self {
        if z.im == 0.0 {
            Self::Number(z.re)
        } else {
            Self::Complex(z)
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ResultKind {
        match self {
            Self::Number(_) => ResultKind::ScalarNumber,
            Self::Complex(_) => ResultKind::ScalarComplex,
            Self::Vector(_) => ResultKind::Vector,
            Self::Matrix(_) => ResultKind::Matrix,
            Self::Text(_) => ResultKind::Unknown,
        }
    }

    /// Short type name for error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Complex(_) => "complex number",
            Self::Vector(_) => "vector",
            Self::Matrix(_) => "matrix",
            Self::Text(_) => "text",
        }
    }

    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Zero every real component smaller than machine epsilon.
    ///
    /// Chained linear algebra leaves residue like `1e-17` where the exact
    /// answer is 0. Complex numbers are cleaned per component and become
    /// real when the imaginary part vanishes.
    #[must_use]
    pub fn clean_rounding(self) -> Self {
        match self {
            Self::Number(x) => Self::Number(clean(x)),
            Self::Complex(z) => Self::from_complex(Complex64::new(clean(z.re), clean(z.im))),
            Self::Vector(v) => Self::Vector(v.map(clean)),
            Self::Matrix(m) => Self::Matrix(m.map(clean)),
            Self::Text(_) => self,
        }
    }
}

fn clean(x: f64) -> f64 {
    if x.abs() < f64::EPSILON { 0.0 } else { x }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Number(x)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn single_column_is_vector() {
        let v = Value::from_matrix(DMatrix::from_row_slice(2, 1, &[1.0, 2.0]));
        assert_eq!(v.kind(), ResultKind::Vector);
        let m = Value::from_matrix(DMatrix::from_row_slice(1, 2, &[1.0, 2.0]));
        assert_eq!(m.kind(), ResultKind::Matrix);
    }

    #[test]
    fn text_is_unknown() {
        assert_eq!(Value::Text("hi".into()).kind(), ResultKind::Unknown);
    }

    #[test]
    fn cleans_vector_components() {
        let v = Value::Vector(DVector::from_vec(vec![1e-17, -2.0, -3e-20]));
        match v.clean_rounding() {
            Value::Vector(v) => {
                assert_eq!(v[0], 0.0);
                assert_eq!(v[1], -2.0);
                assert_eq!(v[2], 0.0);
            }
            other => panic!("expected vector, got {other:?}"),
        }
    }

    #[test]
    fn complex_noise_demotes_to_real() {
        let z = Value::Complex(Complex64::new(2.0, 1e-18)).clean_rounding();
        assert_eq!(z, Value::Number(2.0));
        let z = Value::Complex(Complex64::new(1e-18, 3.0)).clean_rounding();
        assert_eq!(z, Value::Complex(Complex64::new(0.0, 3.0)));
    }

    #[test]
    fn epsilon_itself_survives() {
        assert_eq!(
            Value::Number(f64::EPSILON).clean_rounding(),
            Value::Number(f64::EPSILON)
        );
    }
}
