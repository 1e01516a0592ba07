//! Tree-walking evaluator.
//!
//! The numeric kernel is `nalgebra` for vectors and matrices and
//! `num-complex` for complex scalars. Evaluation never touches the scope it
//! is given; binding the value of an assignment is left to the caller.

mod functions;
mod operators;

use std::f64::consts::{E, PI};

use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::ast::{BinaryOp, Node, UnaryOp};
use crate::error::{ErrorKind, MathError, MathResult};
use crate::scope::Scope;
use crate::value::Value;

pub use functions::{call_function, real_eigenvalues};

/// Evaluate `node` against `scope`.
///
/// An assignment evaluates to its right-hand side.
///
/// # Errors
///
/// Returns an evaluation-kind [`MathError`] for unbound names, shape and
/// type mismatches, and domain errors.
pub fn evaluate(node: &Node, scope: &Scope) -> MathResult<Value> {
    match node {
        Node::Number(n) => Ok(Value::Number(*n)),
        Node::Symbol(name) => lookup(name, scope),
        Node::Text(text) => Ok(Value::Text(text.as_str().into())),
        Node::Group(inner) | Node::Assign { value: inner, .. } => evaluate(inner, scope),
        Node::Unary { op, operand } => {
            let x = evaluate(operand, scope)?;
            match op {
                UnaryOp::Neg => operators::neg(x),
                UnaryOp::Factorial => operators::factorial(&x),
            }
        }
        Node::Binary { op, lhs, rhs } => {
            let a = evaluate(lhs, scope)?;
            let b = evaluate(rhs, scope)?;
            match op {
                BinaryOp::Add => operators::add(a, b),
                BinaryOp::Sub => operators::sub(a, b),
                BinaryOp::Mul => operators::mul(a, b),
                BinaryOp::Cross => operators::cross(a, b),
                BinaryOp::Div => operators::div(a, b),
                BinaryOp::Pow => operators::pow(a, b),
            }
        }
        Node::Call { name, args } => {
            let args = args
                .iter()
                .map(|arg| evaluate(arg, scope))
                .collect::<MathResult<Vec<_>>>()?;
            call_function(name, args)
        }
        Node::Matrix(rows) => matrix_literal(rows, scope),
    }
}

/// Scope first, so a user may rebind `e` or `i`.
fn lookup(name: &str, scope: &Scope) -> MathResult<Value> {
    if let Some(value) = scope.get(name) {
        return Ok(value.clone());
    }
    match name {
        "pi" => Ok(Value::Number(PI)),
        "e" => Ok(Value::Number(E)),
        "i" => Ok(Value::Complex(Complex64::new(0.0, 1.0))),
        _ => Err(MathError::new(
            ErrorKind::UndefinedVariable,
            format!("undefined variable {name}"),
        )),
    }
}

fn matrix_literal(rows: &[Vec<Node>], scope: &Scope) -> MathResult<Value> {
    let ncols = rows.first().map_or(0, Vec::len);
    let mut entries = Vec::with_capacity(rows.len() * ncols);
    for cell in rows.iter().flatten() {
        match evaluate(cell, scope)? {
            Value::Number(x) => entries.push(x),
            other => {
                return Err(MathError::new(
                    ErrorKind::TypeError,
                    format!("matrix entries must be real numbers, found {}", other.type_name()),
                ));
            }
        }
    }
    Ok(Value::from_matrix(DMatrix::from_row_slice(
        rows.len(),
        ncols,
        &entries,
    )))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
