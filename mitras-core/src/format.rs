//! TeX rendering of evaluated values.

use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::value::Value;

/// Significant digits shown for every number.
const SIGNIFICANT_DIGITS: i32 = 6;
/// Digits after the point in `m\cdot10^{k}` mantissas.
const MANTISSA_DECIMALS: usize = 5;
/// Plain decimal notation is used for magnitudes in `[LOWER, UPPER)`.
const PLAIN_LOWER: f64 = 1e-3;
const PLAIN_UPPER: f64 = 1e5;

/// Separator between the items of an eigenvalue or eigenvector list.
pub const LIST_SEPARATOR: &str = r",\space ";

/// TeX for a value. Text values have no rendering and give an empty
/// string.
#[must_use]
pub fn to_tex(value: &Value) -> String {
    match value {
        Value::Number(x) => number(*x),
        Value::Complex(z) => complex(*z),
        Value::Vector(v) => column(v.iter().copied()),
        Value::Matrix(m) => matrix(m),
        Value::Text(_) => String::new(),
    }
}

/// Entries of a vector as a comma-separated list of scalars.
///
/// Anything other than a vector renders as [`to_tex`] would.
#[must_use]
pub fn scalar_list(value: &Value) -> String {
    match value {
        Value::Vector(v) => join(v.iter().map(|x| number(*x))),
        other => to_tex(other),
    }
}

/// Columns of a matrix as a comma-separated list of column vectors.
///
/// A lone vector is a one-item list.
#[must_use]
pub fn column_list(value: &Value) -> String {
    match value {
        Value::Matrix(m) => join(m.column_iter().map(|c| column(c.iter().copied()))),
        other => to_tex(other),
    }
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(LIST_SEPARATOR)
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

/// Format a real number with six significant digits.
///
/// ```
/// use mitras_core::format::number;
///
/// assert_eq!(number(2.5), "2.5");
/// assert_eq!(number(1.0 / 3.0), "0.333333");
/// assert_eq!(number(123_456.0), r"1.23456\cdot10^{5}");
/// assert_eq!(number(-0.0), "0");
/// ```
#[must_use]
pub fn number(x: f64) -> String {
    if x.is_nan() {
        return r"\text{NaN}".to_owned();
    }
    if x.is_infinite() {
        return if x > 0.0 { r"\infty" } else { r"-\infty" }.to_owned();
    }
    let magnitude = x.abs();
    if magnitude == 0.0 {
        return "0".to_owned();
    }
    if (PLAIN_LOWER..PLAIN_UPPER).contains(&magnitude) {
        let text = plain(x);
        // Rounding may carry into the next decade
        if !text.trim_start_matches('-').starts_with("100000") {
            return text;
        }
    }
    scientific(x)
}

fn plain(x: f64) -> String {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "decade of a magnitude in [1e-3, 1e5) lies in -3..=4"
    )]
    let decade = x.abs().log10().floor() as i32;
    let decimals = usize::try_from(SIGNIFICANT_DIGITS - 1 - decade).unwrap_or(0);
    let text = trim_zeros(format!("{x:.decimals$}"));
    if text == "-0" { "0".to_owned() } else { text }
}

fn scientific(x: f64) -> String {
    let text = format!("{x:.MANTISSA_DECIMALS$e}");
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return text;
    };
    let mantissa = trim_zeros(mantissa.to_owned());
    if mantissa == "1" {
        format!("10^{{{exponent}}}")
    } else if mantissa == "-1" {
        format!("-10^{{{exponent}}}")
    } else {
        format!(r"{mantissa}\cdot10^{{{exponent}}}")
    }
}

fn trim_zeros(text: String) -> String {
    if !text.contains('.') {
        return text;
    }
    text.trim_end_matches('0').trim_end_matches('.').to_owned()
}

fn complex(z: Complex64) -> String {
    let imaginary = match number(z.im.abs()).as_str() {
        "1" => "i".to_owned(),
        digits => format!("{digits}i"),
    };
    match (z.re == 0.0, z.im < 0.0) {
        (true, false) => imaginary,
        (true, true) => format!("-{imaginary}"),
        (false, false) => format!("{}+{imaginary}", number(z.re)),
        (false, true) => format!("{}-{imaginary}", number(z.re)),
    }
}

// ---------------------------------------------------------------------------
// Arrays
// ---------------------------------------------------------------------------

fn column(entries: impl Iterator<Item = f64>) -> String {
    let body = entries.map(number).collect::<Vec<_>>().join(r"\\");
    format!(r"\begin{{bmatrix}}{body}\end{{bmatrix}}")
}

fn matrix(m: &DMatrix<f64>) -> String {
    let body = m
        .row_iter()
        .map(|row| row.iter().map(|x| number(*x)).collect::<Vec<_>>().join("&"))
        .collect::<Vec<_>>()
        .join(r"\\");
    format!(r"\begin{{bmatrix}}{body}\end{{bmatrix}}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use nalgebra::DVector;

    use super::*;

    #[test]
    fn plain_numbers() {
        assert_eq!(number(5.0), "5");
        assert_eq!(number(-12.25), "-12.25");
        assert_eq!(number(0.001), "0.001");
        assert_eq!(number(99_999.0), "99999");
        assert_eq!(number(2.0_f64.sqrt()), "1.41421");
    }

    #[test]
    fn exponent_form() {
        assert_eq!(number(100_000.0), "10^{5}");
        assert_eq!(number(0.000_25), r"2.5\cdot10^{-4}");
        assert_eq!(number(-3e-7), r"-3\cdot10^{-7}");
        // Rounds up into the next decade
        assert_eq!(number(99_999.96), "10^{5}");
    }

    #[test]
    fn negative_zero() {
        assert_eq!(number(-0.0), "0");
        assert_eq!(to_tex(&Value::Number(-0.0)), "0");
    }

    #[test]
    fn complex_numbers() {
        assert_eq!(to_tex(&Value::Complex(Complex64::new(1.0, 2.0))), "1+2i");
        assert_eq!(to_tex(&Value::Complex(Complex64::new(1.0, -2.0))), "1-2i");
        assert_eq!(to_tex(&Value::Complex(Complex64::new(0.0, 1.0))), "i");
        assert_eq!(to_tex(&Value::Complex(Complex64::new(0.0, -0.5))), "-0.5i");
    }

    #[test]
    fn vectors_and_matrices() {
        let v = Value::Vector(DVector::from_vec(vec![1.0, 0.0]));
        assert_eq!(to_tex(&v), r"\begin{bmatrix}1\\0\end{bmatrix}");
        let m = Value::Matrix(DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]));
        assert_eq!(to_tex(&m), r"\begin{bmatrix}1&2\\3&4\end{bmatrix}");
    }

    #[test]
    fn lists() {
        let values = Value::Vector(DVector::from_vec(vec![1.0, 3.0]));
        assert_eq!(scalar_list(&values), r"1,\space 3");
        let vectors = Value::Matrix(DMatrix::from_row_slice(2, 2, &[1.0, 1.0, -1.0, 1.0]));
        assert_eq!(
            column_list(&vectors),
            r"\begin{bmatrix}1\\-1\end{bmatrix},\space \begin{bmatrix}1\\1\end{bmatrix}"
        );
    }

    #[test]
    fn text_has_no_rendering() {
        assert_eq!(to_tex(&Value::Text("hi".into())), "");
    }
}
