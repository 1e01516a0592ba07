//! Operator dispatch.
//!
//! Scalars broadcast over vectors and matrices; everything else must agree
//! in shape. Complex numbers only combine with scalars.

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;

use crate::error::{ErrorKind, MathError, MathResult};
use crate::value::Value;

use super::functions::{cross_product, inverse};

/// Largest integer `n` for which `n!` is finite.
const MAX_FACTORIAL: f64 = 170.0;

fn type_error(op: &str, a: &Value, b: &Value) -> MathError {
    MathError::new(
        ErrorKind::TypeError,
        format!("cannot apply {op} to {} and {}", a.type_name(), b.type_name()),
    )
}

fn shape_error(op: &str, a: (usize, usize), b: (usize, usize)) -> MathError {
    MathError::new(
        ErrorKind::DimensionMismatch,
        format!("cannot apply {op} to {}×{} and {}×{}", a.0, a.1, b.0, b.1),
    )
}

/// Promote a real or complex scalar.
const fn as_complex(v: &Value) -> Option<Complex64> {
    match v {
        Value::Number(x) => Some(Complex64::new(*x, 0.0)),
        Value::Complex(z) => Some(*z),
        _ => None,
    }
}

/// Integer value of `y`, if it is one and fits an `i32`.
#[expect(
    clippy::cast_possible_truncation,
    reason = "range is checked before the cast"
)]
fn as_integer(y: f64) -> Option<i32> {
    (y.fract() == 0.0 && y.abs() <= f64::from(i32::MAX)).then(|| y as i32)
}

// ---------------------------------------------------------------------------
// Unary
// ---------------------------------------------------------------------------

pub(super) fn neg(x: Value) -> MathResult<Value> {
    match x {
        Value::Number(x) => Ok(Value::Number(-x)),
        Value::Complex(z) => Ok(Value::Complex(-z)),
        Value::Vector(v) => Ok(Value::Vector(-v)),
        Value::Matrix(m) => Ok(Value::Matrix(-m)),
        Value::Text(_) => Err(MathError::new(ErrorKind::TypeError, "cannot negate text")),
    }
}

pub(super) fn factorial(x: &Value) -> MathResult<Value> {
    match x {
        Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 => {
            if *n > MAX_FACTORIAL {
                return Ok(Value::Number(f64::INFINITY));
            }
            let mut product = 1.0;
            let mut k = 2.0;
            while k <= *n {
                product *= k;
                k += 1.0;
            }
            Ok(Value::Number(product))
        }
        Value::Number(n) => Err(MathError::new(
            ErrorKind::DomainError,
            format!("factorial of {n} is undefined"),
        )),
        other => Err(MathError::new(
            ErrorKind::TypeError,
            format!("factorial of {}", other.type_name()),
        )),
    }
}

// ---------------------------------------------------------------------------
// Additive
// ---------------------------------------------------------------------------

pub(super) fn add(a: Value, b: Value) -> MathResult<Value> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Ok(Value::Number(x + y)),
        (Value::Number(x), Value::Vector(v)) | (Value::Vector(v), Value::Number(x)) => {
            Ok(Value::Vector(v.add_scalar(x)))
        }
        (Value::Number(x), Value::Matrix(m)) | (Value::Matrix(m), Value::Number(x)) => {
            Ok(Value::Matrix(m.add_scalar(x)))
        }
        (Value::Vector(u), Value::Vector(v)) => {
            if u.len() == v.len() {
                Ok(Value::Vector(u + v))
            } else {
                Err(shape_error("+", (u.len(), 1), (v.len(), 1)))
            }
        }
        (Value::Matrix(m), Value::Matrix(n)) => {
            if m.shape() == n.shape() {
                Ok(Value::Matrix(m + n))
            } else {
                Err(shape_error("+", m.shape(), n.shape()))
            }
        }
        (a, b) => match (as_complex(&a), as_complex(&b)) {
            (Some(x), Some(y)) => Ok(Value::Complex(x + y)),
            _ => Err(type_error("+", &a, &b)),
        },
    }
}

pub(super) fn sub(a: Value, b: Value) -> MathResult<Value> {
    if a.is_text() || b.is_text() {
        return Err(type_error("-", &a, &b));
    }
    add(a, neg(b)?)
}

// ---------------------------------------------------------------------------
// Multiplicative
// ---------------------------------------------------------------------------

pub(super) fn mul(a: Value, b: Value) -> MathResult<Value> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Ok(Value::Number(x * y)),
        (Value::Number(x), Value::Vector(v)) | (Value::Vector(v), Value::Number(x)) => {
            Ok(Value::Vector(v * x))
        }
        (Value::Number(x), Value::Matrix(m)) | (Value::Matrix(m), Value::Number(x)) => {
            Ok(Value::Matrix(m * x))
        }
        (Value::Matrix(m), Value::Matrix(n)) => {
            if m.ncols() == n.nrows() {
                Ok(Value::from_matrix(m * n))
            } else {
                Err(shape_error("*", m.shape(), n.shape()))
            }
        }
        (Value::Matrix(m), Value::Vector(v)) => {
            if m.ncols() == v.len() {
                Ok(Value::Vector(m * v))
            } else {
                Err(shape_error("*", m.shape(), (v.len(), 1)))
            }
        }
        (Value::Vector(v), Value::Matrix(m)) => {
            if v.len() == m.nrows() {
                Ok(Value::Vector(m.transpose() * v))
            } else {
                Err(shape_error("*", (1, v.len()), m.shape()))
            }
        }
        (Value::Vector(u), Value::Vector(v)) => {
            if u.len() == v.len() {
                Ok(Value::Number(u.dot(&v)))
            } else {
                Err(shape_error("*", (1, u.len()), (v.len(), 1)))
            }
        }
        (a, b) => match (as_complex(&a), as_complex(&b)) {
            (Some(x), Some(y)) => Ok(Value::Complex(x * y)),
            _ => Err(type_error("*", &a, &b)),
        },
    }
}

/// `\times`: the cross product for two vectors, a product otherwise.
pub(super) fn cross(a: Value, b: Value) -> MathResult<Value> {
    match (&a, &b) {
        (Value::Vector(u), Value::Vector(v)) => Ok(Value::Vector(cross_product(u, v)?)),
        _ => mul(a, b),
    }
}

pub(super) fn div(a: Value, b: Value) -> MathResult<Value> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Ok(Value::Number(x / y)),
        (Value::Vector(v), Value::Number(y)) => Ok(Value::Vector(v / y)),
        (Value::Matrix(m), Value::Number(y)) => Ok(Value::Matrix(m / y)),
        (a @ (Value::Number(_) | Value::Vector(_) | Value::Matrix(_)), Value::Matrix(m)) => {
            mul(a, Value::Matrix(inverse(&m)?))
        }
        (a, b) => match (as_complex(&a), as_complex(&b)) {
            (Some(x), Some(y)) => Ok(Value::Complex(x / y)),
            _ => Err(type_error("/", &a, &b)),
        },
    }
}

// ---------------------------------------------------------------------------
// Power
// ---------------------------------------------------------------------------

pub(super) fn pow(a: Value, b: Value) -> MathResult<Value> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if x < 0.0 && y.fract() != 0.0 {
                Ok(Value::Complex(Complex64::new(x, 0.0).powf(y)))
            } else {
                Ok(Value::Number(x.powf(y)))
            }
        }
        (Value::Complex(z), Value::Number(y)) => Ok(Value::Complex(
            as_integer(y).map_or_else(|| z.powf(y), |n| z.powi(n)),
        )),
        (Value::Matrix(m), Value::Number(y)) => {
            let Some(n) = as_integer(y) else {
                return Err(MathError::new(
                    ErrorKind::DomainError,
                    format!("matrix power {y} is not an integer"),
                ));
            };
            Ok(Value::Matrix(matrix_power(m, n)?))
        }
        (a, b) => match (as_complex(&a), as_complex(&b)) {
            (Some(x), Some(y)) => Ok(Value::Complex(x.powc(y))),
            _ => Err(type_error("^", &a, &b)),
        },
    }
}

/// Repeated squaring; negative powers go through the inverse.
fn matrix_power(m: DMatrix<f64>, n: i32) -> MathResult<DMatrix<f64>> {
    if !m.is_square() {
        return Err(MathError::new(
            ErrorKind::DimensionMismatch,
            format!("power of non-square {}×{} matrix", m.nrows(), m.ncols()),
        ));
    }
    let mut base = if n < 0 { inverse(&m)? } else { m };
    let mut result = DMatrix::identity(base.nrows(), base.ncols());
    let mut e = n.unsigned_abs();
    while e > 0 {
        if e & 1 == 1 {
            result = &result * &base;
        }
        base = &base * &base;
        e >>= 1;
    }
    Ok(result)
}

/// Euclidean dot product of two equal-length vectors.
pub(super) fn dot(u: &DVector<f64>, v: &DVector<f64>) -> MathResult<f64> {
    if u.len() == v.len() {
        Ok(u.dot(v))
    } else {
        Err(shape_error("dot", (u.len(), 1), (v.len(), 1)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn vec2(x: f64, y: f64) -> Value {
        Value::Vector(DVector::from_vec(vec![x, y]))
    }

    fn mat2(a: f64, b: f64, c: f64, d: f64) -> Value {
        Value::Matrix(DMatrix::from_row_slice(2, 2, &[a, b, c, d]))
    }

    #[test]
    fn scalar_broadcast() {
        assert_eq!(mul(Value::Number(2.0), vec2(1.0, 2.0)).unwrap(), vec2(2.0, 4.0));
        assert_eq!(add(vec2(1.0, 2.0), Value::Number(1.0)).unwrap(), vec2(2.0, 3.0));
    }

    #[test]
    fn shape_mismatch() {
        let three = Value::Vector(DVector::from_vec(vec![1.0, 2.0, 3.0]));
        let err = add(vec2(1.0, 2.0), three).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DimensionMismatch);
    }

    #[test]
    fn matrix_product_and_power() {
        let rot = mat2(0.0, -1.0, 1.0, 0.0);
        assert_eq!(
            mul(rot.clone(), rot.clone()).unwrap(),
            mat2(-1.0, 0.0, 0.0, -1.0)
        );
        assert_eq!(pow(rot.clone(), Value::Number(4.0)).unwrap(), mat2(1.0, 0.0, 0.0, 1.0));
        assert_eq!(pow(rot, Value::Number(0.0)).unwrap(), mat2(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn matrix_inverse_power() {
        let m = mat2(2.0, 0.0, 0.0, 4.0);
        assert_eq!(pow(m, Value::Number(-1.0)).unwrap(), mat2(0.5, 0.0, 0.0, 0.25));
        let singular = mat2(1.0, 2.0, 2.0, 4.0);
        let err = pow(singular, Value::Number(-1.0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Singular);
    }

    #[test]
    fn negative_base_fractional_power_is_complex() {
        match pow(Value::Number(-4.0), Value::Number(0.5)).unwrap() {
            Value::Complex(z) => {
                assert!(z.re.abs() < 1e-12);
                assert!((z.im - 2.0).abs() < 1e-12);
            }
            other => panic!("expected complex, got {other:?}"),
        }
    }

    #[test]
    fn complex_only_with_scalars() {
        let i = Value::Complex(Complex64::new(0.0, 1.0));
        assert!(mul(i.clone(), Value::Number(2.0)).is_ok());
        assert_eq!(mul(i, vec2(1.0, 1.0)).unwrap_err().kind, ErrorKind::TypeError);
    }

    #[test]
    fn cross_of_planar_vectors() {
        let v = cross(vec2(1.0, 0.0), vec2(0.0, 1.0)).unwrap();
        assert_eq!(v, Value::Vector(DVector::from_vec(vec![0.0, 0.0, 1.0])));
    }

    #[test]
    fn factorial_domain() {
        assert_eq!(factorial(&Value::Number(5.0)).unwrap(), Value::Number(120.0));
        assert_eq!(factorial(&Value::Number(0.0)).unwrap(), Value::Number(1.0));
        assert_eq!(
            factorial(&Value::Number(1.5)).unwrap_err().kind,
            ErrorKind::DomainError
        );
    }
}
