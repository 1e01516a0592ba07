//! Expression engine for the `mitras` graphing calculator.
//!
//! TeX markup goes through [`scanner`] and [`parser`] into an [`ast::Node`],
//! is evaluated by [`eval`] against a [`scope::Scope`], and is classified and
//! formatted by [`analyze`]. [`expr::ExprList`] owns the ordered records and
//! [`scene::Scene`] draws them, including [`animation`] frames.

pub mod analyze;
pub mod animation;
pub mod ast;
pub mod error;
pub mod eval;
pub mod expr;
pub mod format;
pub mod parser;
pub mod scanner;
pub mod scene;
pub mod scope;
pub mod token;
pub mod value;
