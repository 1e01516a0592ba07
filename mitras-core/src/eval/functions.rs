//! Built-in functions: elementary functions on scalars and the linear
//! algebra set (`det`, `inv`, `norm`, `cross`, `proj`, eigen-decomposition).

use std::f64::consts::LN_10;

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;

use crate::error::{ErrorKind, MathError, MathResult};
use crate::value::Value;

use super::operators::dot;

/// Relative tolerance for treating an eigenvalue as real.
const EIGEN_IMAG_TOLERANCE: f64 = 1e-9;
/// Relative tolerance for merging repeated eigenvalues.
const EIGEN_CLUSTER_TOLERANCE: f64 = 1e-6;
/// Relative tolerance for a singular value to count as zero.
const NULL_SPACE_TOLERANCE: f64 = 1e-7;

/// Apply the built-in function `name`.
///
/// # Errors
///
/// [`ErrorKind::UnknownFunction`] for names outside the catalogue,
/// [`ErrorKind::ArityMismatch`] for the wrong argument count, and the
/// function's own type, shape and domain errors.
pub fn call_function(name: &str, args: Vec<Value>) -> MathResult<Value> {
    match name {
        "sin" | "cos" | "tan" | "csc" | "sec" | "cot" | "arcsin" | "arccos" | "arctan" | "sinh"
        | "cosh" | "tanh" | "exp" | "ln" | "log" | "sqrt" => elementary(name, one(name, args)?),
        "abs" | "norm" => norm(&one(name, args)?),
        "det" => det(one(name, args)?),
        "inv" => inv(one(name, args)?),
        "transpose" => Ok(transpose(one(name, args)?)),
        "trace" => trace(one(name, args)?),
        "eigenvalues" => {
            let m = square_matrix(name, one(name, args)?)?;
            Ok(Value::Vector(DVector::from_vec(real_eigenvalues(&m)?)))
        }
        "eigenvectors" => {
            let m = square_matrix(name, one(name, args)?)?;
            eigenvectors(&m)
        }
        "cross" => {
            let (u, v) = two_vectors(name, args)?;
            Ok(Value::Vector(cross_product(&u, &v)?))
        }
        "dot" => {
            let (u, v) = two_vectors(name, args)?;
            Ok(Value::Number(dot(&u, &v)?))
        }
        "proj" => {
            let (a, b) = two_vectors(name, args)?;
            let bb = dot(&b, &b)?;
            if bb == 0.0 {
                return Err(MathError::new(ErrorKind::DomainError, "projection onto zero vector"));
            }
            let scale = dot(&a, &b)? / bb;
            Ok(Value::Vector(b * scale))
        }
        "comp" => {
            let (a, b) = two_vectors(name, args)?;
            let length = b.norm();
            if length == 0.0 {
                return Err(MathError::new(ErrorKind::DomainError, "component along zero vector"));
            }
            Ok(Value::Number(dot(&a, &b)? / length))
        }
        "nthroot" => {
            let [x, n] = scalars::<2>(name, args)?;
            nth_root(x, n)
        }
        "max" | "min" => extremum(name, args),
        _ => Err(MathError::new(
            ErrorKind::UnknownFunction,
            format!("unknown function {name}"),
        )),
    }
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

fn arity(name: &str, expected: usize, found: usize) -> MathError {
    MathError::new(
        ErrorKind::ArityMismatch,
        format!("{name} takes {expected} argument(s), found {found}"),
    )
}

fn one(name: &str, args: Vec<Value>) -> MathResult<Value> {
    let found = args.len();
    let mut args = args.into_iter();
    match (args.next(), args.next()) {
        (Some(x), None) => Ok(x),
        _ => Err(arity(name, 1, found)),
    }
}

fn two_vectors(name: &str, args: Vec<Value>) -> MathResult<(DVector<f64>, DVector<f64>)> {
    let found = args.len();
    let mut args = args.into_iter();
    match (args.next(), args.next(), args.next()) {
        (Some(Value::Vector(u)), Some(Value::Vector(v)), None) => Ok((u, v)),
        (Some(a), Some(b), None) => Err(MathError::new(
            ErrorKind::TypeError,
            format!("{name} expects two vectors, found {} and {}", a.type_name(), b.type_name()),
        )),
        _ => Err(arity(name, 2, found)),
    }
}

fn scalars<const N: usize>(name: &str, args: Vec<Value>) -> MathResult<[f64; N]> {
    if args.len() != N {
        return Err(arity(name, N, args.len()));
    }
    let mut out = [0.0; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        match arg {
            Value::Number(x) => *slot = x,
            other => {
                return Err(MathError::new(
                    ErrorKind::TypeError,
                    format!("{name} expects numbers, found {}", other.type_name()),
                ));
            }
        }
    }
    Ok(out)
}

fn square_matrix(name: &str, x: Value) -> MathResult<DMatrix<f64>> {
    match x {
        Value::Matrix(m) if m.is_square() => Ok(m),
        Value::Matrix(m) => Err(MathError::new(
            ErrorKind::DimensionMismatch,
            format!("{name} of non-square {}×{} matrix", m.nrows(), m.ncols()),
        )),
        other => Err(MathError::new(
            ErrorKind::TypeError,
            format!("{name} expects a square matrix, found {}", other.type_name()),
        )),
    }
}

// ---------------------------------------------------------------------------
// Elementary functions
// ---------------------------------------------------------------------------

fn elementary(name: &str, x: Value) -> MathResult<Value> {
    match x {
        Value::Number(r) => Ok(real_elementary(name, r)),
        Value::Complex(z) => Ok(Value::Complex(complex_elementary(name, z))),
        other => Err(MathError::new(
            ErrorKind::TypeError,
            format!("{name} of {}", other.type_name()),
        )),
    }
}

/// Real input, falling back to the complex branch outside the real domain.
fn real_elementary(name: &str, r: f64) -> Value {
    let complex = || Value::Complex(complex_elementary(name, Complex64::new(r, 0.0)));
    match name {
        "sin" => Value::Number(r.sin()),
        "cos" => Value::Number(r.cos()),
        "tan" => Value::Number(r.tan()),
        "csc" => Value::Number(r.sin().recip()),
        "sec" => Value::Number(r.cos().recip()),
        "cot" => Value::Number(r.tan().recip()),
        "arcsin" if r.abs() <= 1.0 => Value::Number(r.asin()),
        "arccos" if r.abs() <= 1.0 => Value::Number(r.acos()),
        "arctan" => Value::Number(r.atan()),
        "sinh" => Value::Number(r.sinh()),
        "cosh" => Value::Number(r.cosh()),
        "tanh" => Value::Number(r.tanh()),
        "exp" => Value::Number(r.exp()),
        "ln" if r >= 0.0 => Value::Number(r.ln()),
        "log" if r >= 0.0 => Value::Number(r.log10()),
        "sqrt" if r >= 0.0 => Value::Number(r.sqrt()),
        _ => complex(),
    }
}

fn complex_elementary(name: &str, z: Complex64) -> Complex64 {
    let one = Complex64::new(1.0, 0.0);
    match name {
        "sin" => z.sin(),
        "cos" => z.cos(),
        "tan" => z.tan(),
        "csc" => one / z.sin(),
        "sec" => one / z.cos(),
        "cot" => one / z.tan(),
        "arcsin" => z.asin(),
        "arccos" => z.acos(),
        "arctan" => z.atan(),
        "sinh" => z.sinh(),
        "cosh" => z.cosh(),
        "tanh" => z.tanh(),
        "exp" => z.exp(),
        "ln" => z.ln(),
        "log" => z.ln() / LN_10,
        _ => z.sqrt(),
    }
}

fn nth_root(x: f64, n: f64) -> MathResult<Value> {
    if n == 0.0 {
        return Err(MathError::new(ErrorKind::DomainError, "zeroth root"));
    }
    if x >= 0.0 {
        return Ok(Value::Number(x.powf(n.recip())));
    }
    let odd = n.fract() == 0.0 && n.rem_euclid(2.0) == 1.0;
    if odd {
        Ok(Value::Number(-(-x).powf(n.recip())))
    } else {
        Err(MathError::new(
            ErrorKind::DomainError,
            format!("root {n} of negative number"),
        ))
    }
}

fn extremum(name: &str, args: Vec<Value>) -> MathResult<Value> {
    let mut values = Vec::new();
    for arg in args {
        match arg {
            Value::Number(x) => values.push(x),
            Value::Vector(v) => values.extend(v.iter().copied()),
            other => {
                return Err(MathError::new(
                    ErrorKind::TypeError,
                    format!("{name} of {}", other.type_name()),
                ));
            }
        }
    }
    let pick = if name == "max" { f64::max } else { f64::min };
    values
        .into_iter()
        .reduce(pick)
        .map(Value::Number)
        .ok_or_else(|| arity(name, 1, 0))
}

// ---------------------------------------------------------------------------
// Linear algebra
// ---------------------------------------------------------------------------

fn norm(x: &Value) -> MathResult<Value> {
    match x {
        Value::Number(r) => Ok(Value::Number(r.abs())),
        Value::Complex(z) => Ok(Value::Number(z.norm())),
        Value::Vector(v) => Ok(Value::Number(v.norm())),
        Value::Matrix(m) => Ok(Value::Number(m.norm())),
        Value::Text(_) => Err(MathError::new(ErrorKind::TypeError, "norm of text")),
    }
}

fn det(x: Value) -> MathResult<Value> {
    match x {
        Value::Number(r) => Ok(Value::Number(r)),
        other => Ok(Value::Number(square_matrix("det", other)?.determinant())),
    }
}

/// Inverse of a square matrix.
pub(super) fn inverse(m: &DMatrix<f64>) -> MathResult<DMatrix<f64>> {
    if !m.is_square() {
        return Err(MathError::new(
            ErrorKind::DimensionMismatch,
            format!("inverse of non-square {}×{} matrix", m.nrows(), m.ncols()),
        ));
    }
    m.clone()
        .try_inverse()
        .ok_or_else(|| MathError::new(ErrorKind::Singular, "matrix is not invertible"))
}

fn inv(x: Value) -> MathResult<Value> {
    match x {
        Value::Number(r) if r == 0.0 => {
            Err(MathError::new(ErrorKind::Singular, "inverse of zero"))
        }
        Value::Number(r) => Ok(Value::Number(r.recip())),
        Value::Matrix(m) => Ok(Value::Matrix(inverse(&m)?)),
        other => Err(MathError::new(
            ErrorKind::TypeError,
            format!("inverse of {}", other.type_name()),
        )),
    }
}

fn transpose(x: Value) -> Value {
    match x {
        Value::Matrix(m) => Value::from_matrix(m.transpose()),
        Value::Vector(v) => Value::Matrix(DMatrix::from_row_slice(1, v.len(), v.as_slice())),
        scalar => scalar,
    }
}

fn trace(x: Value) -> MathResult<Value> {
    match x {
        Value::Number(r) => Ok(Value::Number(r)),
        other => Ok(Value::Number(square_matrix("trace", other)?.trace())),
    }
}

/// Cross product of two 3-vectors; planar vectors get `z = 0`.
pub(super) fn cross_product(u: &DVector<f64>, v: &DVector<f64>) -> MathResult<DVector<f64>> {
    let lift = |w: &DVector<f64>| match w.len() {
        2 => Some([w[0], w[1], 0.0]),
        3 => Some([w[0], w[1], w[2]]),
        _ => None,
    };
    let (Some(a), Some(b)) = (lift(u), lift(v)) else {
        return Err(MathError::new(
            ErrorKind::DimensionMismatch,
            format!("cross product of {}- and {}-vectors", u.len(), v.len()),
        ));
    };
    Ok(DVector::from_vec(vec![
        a[1].mul_add(b[2], -a[2] * b[1]),
        a[2].mul_add(b[0], -a[0] * b[2]),
        a[0].mul_add(b[1], -a[1] * b[0]),
    ]))
}

// ---------------------------------------------------------------------------
// Eigen-decomposition
// ---------------------------------------------------------------------------

/// Real eigenvalues in ascending order.
///
/// # Errors
///
/// [`ErrorKind::Unsupported`] when any eigenvalue is complex and
/// [`ErrorKind::DomainError`] for non-finite entries.
pub fn real_eigenvalues(m: &DMatrix<f64>) -> MathResult<Vec<f64>> {
    if !m.iter().all(|x| x.is_finite()) {
        return Err(MathError::new(ErrorKind::DomainError, "matrix has non-finite entries"));
    }
    let scale = m.amax().max(1.0);
    let mut values = Vec::with_capacity(m.nrows());
    for z in m.complex_eigenvalues().iter() {
        if z.im.abs() > EIGEN_IMAG_TOLERANCE * scale {
            return Err(MathError::new(
                ErrorKind::Unsupported,
                "matrix has complex eigenvalues",
            ));
        }
        values.push(z.re);
    }
    values.sort_by(f64::total_cmp);
    Ok(values)
}

/// Eigenvectors as matrix columns, ordered like [`real_eigenvalues`].
///
/// Repeated eigenvalues contribute as many columns as their eigenspace has
/// dimensions, so a defective matrix yields fewer columns than rows.
fn eigenvectors(m: &DMatrix<f64>) -> MathResult<Value> {
    let values = real_eigenvalues(m)?;
    let n = m.nrows();
    let mut columns = Vec::with_capacity(n);
    let mut i = 0;
    while i < values.len() {
        let tolerance = EIGEN_CLUSTER_TOLERANCE * values[i].abs().max(1.0);
        let cluster = values[i..]
            .iter()
            .take_while(|&&v| v - values[i] <= tolerance)
            .count();
        #[expect(clippy::cast_precision_loss, reason = "cluster size is at most n")]
        let lambda = values[i..i + cluster].iter().sum::<f64>() / cluster as f64;
        let shifted = m - DMatrix::identity(n, n) * lambda;
        columns.extend(null_space(shifted, cluster));
        i += cluster;
    }
    if columns.is_empty() {
        return Err(MathError::new(ErrorKind::DomainError, "no eigenvectors found"));
    }
    Ok(Value::from_matrix(DMatrix::from_columns(&columns)))
}

/// Up to `limit` right singular vectors for near-zero singular values,
/// always at least the smallest one.
fn null_space(a: DMatrix<f64>, limit: usize) -> Vec<DVector<f64>> {
    let svd = a.svd(false, true);
    let Some(v_t) = svd.v_t else {
        return Vec::new();
    };
    let sigma = svd.singular_values;
    let tolerance = NULL_SPACE_TOLERANCE * sigma.max().max(1.0);
    let mut order: Vec<usize> = (0..sigma.len()).collect();
    order.sort_by(|&i, &j| sigma[i].total_cmp(&sigma[j]));
    order
        .into_iter()
        .enumerate()
        .take_while(|&(k, i)| k == 0 || sigma[i] <= tolerance)
        .take(limit)
        .map(|(_, i)| unit_leading(v_t.row(i).transpose()))
        .collect()
}

/// Scale so the largest-magnitude component (first one on ties) is 1.
fn unit_leading(v: DVector<f64>) -> DVector<f64> {
    let largest = v.amax();
    if largest == 0.0 {
        return v;
    }
    let pivot = v
        .iter()
        .copied()
        .find(|x| x.abs() >= largest * (1.0 - 1e-12))
        .unwrap_or(largest);
    v / pivot
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
