//! Expression analysis: parse, evaluate, classify, format.
//!
//! [`analyze`] is pure in `(source, scope)`. Failures never escape: a parse
//! error yields a blank [`Analysis`], an evaluation error keeps only the
//! structural facts read off the tree, and both leave the scope untouched.

use crate::ast::Node;
use crate::error::MathResult;
use crate::eval::evaluate;
use crate::format::{column_list, scalar_list, to_tex};
use crate::parser::parse;
use crate::scope::Scope;
use crate::value::{ResultKind, Value};

/// What the analyzer learned about one expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    /// TeX of the cleaned value; empty when nothing was evaluated.
    pub evaluated_tex: String,
    /// Cleaned value, or `None` on failure or a textual result.
    pub value: Option<Value>,
    pub kind: ResultKind,
    /// Name of the function that decides how the result is drawn, or empty.
    pub primary_function: String,
    /// Arguments of the primary function, evaluated against the incoming
    /// scope.
    pub primary_args: Vec<Value>,
    pub is_assignment: bool,
}

impl Analysis {
    /// Whether evaluation produced a value.
    #[must_use]
    pub const fn is_evaluated(&self) -> bool {
        self.value.is_some()
    }
}

/// Analyze `source` against `scope`, returning the analysis and the scope
/// the next expression sees.
#[must_use]
pub fn analyze(source: &str, scope: &Scope) -> (Analysis, Scope) {
    let tree = match parse(source) {
        Ok(tree) => tree,
        Err(err) => {
            log::debug!("parse failed for {source:?}: {err}");
            return (Analysis::default(), scope.clone());
        }
    };

    let is_assignment = tree.is_assignment();
    let (primary_function, primary_nodes) = match tree.primary_function() {
        Some(Node::Call { name, args }) => (name.clone(), args.as_slice()),
        _ => (String::new(), &[][..]),
    };

    let raw = match evaluate(&tree, scope) {
        Ok(value) => value,
        Err(err) => {
            log::debug!("evaluation failed for {source:?}: {err}");
            let analysis = Analysis {
                primary_function,
                is_assignment,
                ..Analysis::default()
            };
            return (analysis, scope.clone());
        }
    };

    let next_scope = match &tree {
        Node::Assign { name, .. } => scope.with(name, raw.clone()),
        _ => scope.clone(),
    };

    let value = raw.clean_rounding();
    if value.is_text() {
        log::debug!("discarding textual result of {source:?}");
        return (Analysis::default(), next_scope);
    }

    let primary_args = match evaluate_args(primary_nodes, scope) {
        Ok(args) => args,
        Err(err) => {
            log::debug!("arguments of {primary_function} failed: {err}");
            Vec::new()
        }
    };

    let evaluated_tex = match primary_function.as_str() {
        "eigenvalues" => scalar_list(&value),
        "eigenvectors" => column_list(&value),
        _ => to_tex(&value),
    };

    let analysis = Analysis {
        evaluated_tex,
        kind: value.kind(),
        value: Some(value),
        primary_function,
        primary_args,
        is_assignment,
    };
    (analysis, next_scope)
}

fn evaluate_args(nodes: &[Node], scope: &Scope) -> MathResult<Vec<Value>> {
    nodes
        .iter()
        .map(|node| evaluate(node, scope).map(Value::clean_rounding))
        .collect()
}
