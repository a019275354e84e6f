//! Errors raised while building labeled values.
//!
//! These are structural failures (the value cannot exist), as opposed to
//! schema issues, which are collected and reported by the checker.

use crate::Dtype;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    #[error("Data has {ndim} dimension(s) but {given} dimension name(s) were given: {dims:?}")]
    DimensionCountMismatch {
        ndim: usize,
        given: usize,
        dims: Vec<String>,
    },

    #[error("Dimension '{0}' appears more than once")]
    DuplicateDimension(String),

    #[error("Conflicting sizes for dimension '{dim}': {existing} vs {new}")]
    SizeConflict {
        dim: String,
        existing: usize,
        new: usize,
    },

    #[error("Coordinate '{coord}' has dimensions {coord_dims:?} which are not a subset of {dims:?}")]
    CoordinateDimensions {
        coord: String,
        coord_dims: Vec<String>,
        dims: Vec<String>,
    },

    #[error("Cannot cast {from} to {to}")]
    UnsupportedCast { from: Dtype, to: Dtype },

    #[error("Value {value} cannot be stored as {dtype}")]
    InvalidValue { value: String, dtype: Dtype },

    #[error("Shape {shape:?} does not hold {len} value(s)")]
    ShapeMismatch { shape: Vec<usize>, len: usize },

    #[error("Invalid value document: {0}")]
    InvalidDocument(String),
}

pub type Result<T> = std::result::Result<T, ValueError>;
