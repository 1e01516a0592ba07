//! Drawing model for the `mitras` graphing calculator.
//!
//! Everything here works in pixel space on an abstract [`surface::Surface`]:
//! the adaptive coordinate grid, vector arrows, transformed grids,
//! determinant parallelograms and eigenvector rays.

pub mod canvas;
pub mod error;
pub mod grid;
pub mod primitives;
pub mod surface;
pub mod types;
pub mod viewport;
