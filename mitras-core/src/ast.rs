//! Expression tree.
//!
//! One variant per node kind. Only [`Node::Call`] counts as a function
//! application when looking for the primary function; operators, matrix
//! literals and groups never do.

use std::fmt;

/// Prefix and postfix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Factorial,
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    /// `*`, `\cdot` and juxtaposition.
    Mul,
    /// `\times`: the cross product on 3-vectors, a product otherwise.
    Cross,
    Div,
    Pow,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Cross => "\\times",
            Self::Div => "/",
            Self::Pow => "^",
        })
    }
}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number(f64),
    /// A variable or a named constant (`\pi`, `e`, `i`).
    Symbol(String),
    Text(String),
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    /// A function application.
    Call {
        name: String,
        args: Vec<Node>,
    },
    /// Matrix literal in row-major order.
    Matrix(Vec<Vec<Node>>),
    /// Parenthesised sub-expression.
    Group(Box<Node>),
    /// Top-level `name = value`.
    Assign {
        name: String,
        value: Box<Node>,
    },
}

impl Node {
    /// Direct children, left to right.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        match self {
            Self::Number(_) | Self::Symbol(_) | Self::Text(_) => Vec::new(),
            Self::Unary { operand, .. } => vec![operand.as_ref()],
            Self::Binary { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.as_ref()],
            Self::Call { args, .. } => args.iter().collect(),
            Self::Matrix(rows) => rows.iter().flatten().collect(),
            Self::Group(inner) => vec![inner.as_ref()],
            Self::Assign { value, .. } => vec![value.as_ref()],
        }
    }

    /// The function application that decides how a result is drawn.
    ///
    /// A call node is its own primary function. Otherwise the search
    /// descends into the last child only: a childless non-call node ends the
    /// search with nothing, even when an earlier sibling holds a call. So
    /// `2\det(A)` reports `det` while `\det(A) \cdot 2` reports none.
    #[must_use]
    pub fn primary_function(&self) -> Option<&Self> {
        if matches!(self, Self::Call { .. }) {
            return Some(self);
        }
        self.children()
            .last()
            .and_then(|child| child.primary_function())
    }

    /// Whether the top-level form binds a variable.
    #[must_use]
    pub const fn is_assignment(&self) -> bool {
        matches!(self, Self::Assign { .. })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Node {
        Node::Number(n)
    }

    fn call(name: &str, args: Vec<Node>) -> Node {
        Node::Call {
            name: name.to_owned(),
            args,
        }
    }

    fn mul(lhs: Node, rhs: Node) -> Node {
        Node::Binary {
            op: BinaryOp::Mul,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    fn name_of(node: Option<&Node>) -> Option<&str> {
        match node {
            Some(Node::Call { name, .. }) => Some(name),
            _ => None,
        }
    }

    #[test]
    fn call_is_its_own_primary() {
        let tree = call("det", vec![Node::Symbol("A".into())]);
        assert_eq!(name_of(tree.primary_function()), Some("det"));
    }

    #[test]
    fn search_follows_last_child() {
        let tree = mul(num(2.0), call("det", vec![Node::Symbol("A".into())]));
        assert_eq!(name_of(tree.primary_function()), Some("det"));
    }

    #[test]
    fn leaf_last_child_aborts() {
        let tree = mul(call("det", vec![Node::Symbol("A".into())]), num(2.0));
        assert_eq!(name_of(tree.primary_function()), None);
    }

    #[test]
    fn outermost_call_wins() {
        let tree = call("inv", vec![call("transpose", vec![num(1.0)])]);
        assert_eq!(name_of(tree.primary_function()), Some("inv"));
    }

    #[test]
    fn assignment_exposes_value() {
        let tree = Node::Assign {
            name: "v".into(),
            value: Box::new(Node::Group(Box::new(call("eigenvectors", vec![])))),
        };
        assert!(tree.is_assignment());
        assert_eq!(name_of(tree.primary_function()), Some("eigenvectors"));
    }
}
