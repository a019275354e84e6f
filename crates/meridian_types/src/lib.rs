//! Labeled array values for Meridian.
//!
//! The value model the schema engine validates and constructs:
//!
//! - [`Dtype`]: element types, serialized as NumPy type strings
//! - [`AttrValue`] / [`Attrs`]: free-form attribute metadata
//! - [`ArrayData`]: typed n-dimensional storage, eager or lazy
//! - [`DataArray`]: data plus dimension names, coordinates and attributes
//! - [`Dataset`]: data variables over shared coordinates
//!
//! All value types round-trip through JSON with `serde`.

pub mod array;
pub mod attrs;
pub mod dataset;
pub mod dtype;
pub mod error;
pub mod paths;

pub use array::{ArrayData, DataArray};
pub use attrs::{attrs, AttrValue, Attrs};
pub use dataset::Dataset;
pub use dtype::{Dtype, DtypeKind};
pub use error::ValueError;
pub use num_complex::Complex64;
