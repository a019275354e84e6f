//! Typed n-dimensional storage and labeled arrays.
//!
//! [`ArrayData`] pairs an `ndarray` buffer with a [`Dtype`]. Values are stored
//! widened per kind (all signed integers as `i64`, all floats as `f64`, ...)
//! while the dtype records the declared element type. A lazy variant carries
//! only dtype and shape so deferred arrays can be validated without
//! materialising them.
//!
//! [`DataArray`] attaches dimension names, coordinates and attributes.

use crate::attrs::{AttrValue, Attrs};
use crate::error::{Result, ValueError};
use crate::{Dtype, DtypeKind};
use ndarray::{ArrayD, IxDyn};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
enum Storage {
    Bool(ArrayD<bool>),
    Int(ArrayD<i64>),
    UInt(ArrayD<u64>),
    Float(ArrayD<f64>),
    Complex(ArrayD<Complex64>),
    Str(ArrayD<String>),
    Lazy(Vec<usize>),
}

/// Element storage of a labeled array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ArrayDataDoc", into = "ArrayDataDoc")]
pub struct ArrayData {
    dtype: Dtype,
    storage: Storage,
}

impl ArrayData {
    /// Array of `shape` filled with the zero value of `dtype`.
    pub fn zeros(dtype: Dtype, shape: &[usize]) -> Self {
        let dim = IxDyn(shape);
        let storage = match dtype.kind() {
            DtypeKind::Bool => Storage::Bool(ArrayD::from_elem(dim, false)),
            DtypeKind::SignedInt => Storage::Int(ArrayD::zeros(dim)),
            DtypeKind::UnsignedInt => Storage::UInt(ArrayD::zeros(dim)),
            DtypeKind::Float => Storage::Float(ArrayD::zeros(dim)),
            DtypeKind::Complex => Storage::Complex(ArrayD::from_elem(dim, Complex64::new(0.0, 0.0))),
            DtypeKind::Str => Storage::Str(ArrayD::from_elem(dim, String::new())),
        };
        Self { dtype, storage }
    }

    /// Array of `shape` filled with one.
    pub fn ones(dtype: Dtype, shape: &[usize]) -> Self {
        let dim = IxDyn(shape);
        let storage = match dtype.kind() {
            DtypeKind::Bool => Storage::Bool(ArrayD::from_elem(dim, true)),
            DtypeKind::SignedInt => Storage::Int(ArrayD::ones(dim)),
            DtypeKind::UnsignedInt => Storage::UInt(ArrayD::ones(dim)),
            DtypeKind::Float => Storage::Float(ArrayD::ones(dim)),
            DtypeKind::Complex => Storage::Complex(ArrayD::from_elem(dim, Complex64::new(1.0, 0.0))),
            DtypeKind::Str => Storage::Str(ArrayD::from_elem(dim, "1".to_string())),
        };
        Self { dtype, storage }
    }

    /// One-dimensional `0..n` as `dtype`. Only numeric dtypes are supported.
    pub fn arange(n: usize, dtype: Dtype) -> Result<Self> {
        let dim = IxDyn(&[n]);
        let storage = match dtype.kind() {
            DtypeKind::SignedInt => {
                Storage::Int(ArrayD::from_shape_fn(dim, |idx| idx[0] as i64))
            }
            DtypeKind::UnsignedInt => {
                Storage::UInt(ArrayD::from_shape_fn(dim, |idx| idx[0] as u64))
            }
            DtypeKind::Float => Storage::Float(ArrayD::from_shape_fn(dim, |idx| idx[0] as f64)),
            DtypeKind::Complex => Storage::Complex(ArrayD::from_shape_fn(dim, |idx| {
                Complex64::new(idx[0] as f64, 0.0)
            })),
            DtypeKind::Bool | DtypeKind::Str => {
                return Err(ValueError::UnsupportedCast {
                    from: Dtype::Int64,
                    to: dtype,
                })
            }
        };
        Ok(Self { dtype, storage })
    }

    /// Deferred array: dtype and shape only, no values.
    pub fn lazy(dtype: Dtype, shape: &[usize]) -> Self {
        Self {
            dtype,
            storage: Storage::Lazy(shape.to_vec()),
        }
    }

    pub fn from_f64(values: Vec<f64>) -> Self {
        let len = values.len();
        Self {
            dtype: Dtype::Float64,
            storage: Storage::Float(vec_to_array(values, len)),
        }
    }

    pub fn from_i64(values: Vec<i64>) -> Self {
        let len = values.len();
        Self {
            dtype: Dtype::Int64,
            storage: Storage::Int(vec_to_array(values, len)),
        }
    }

    pub fn from_complex(values: Vec<Complex64>) -> Self {
        let len = values.len();
        Self {
            dtype: Dtype::Complex128,
            storage: Storage::Complex(vec_to_array(values, len)),
        }
    }

    pub fn from_bools(values: Vec<bool>) -> Self {
        let len = values.len();
        Self {
            dtype: Dtype::Bool,
            storage: Storage::Bool(vec_to_array(values, len)),
        }
    }

    pub fn from_strings<S: Into<String>>(values: Vec<S>) -> Self {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        let len = values.len();
        Self {
            dtype: Dtype::Str,
            storage: Storage::Str(vec_to_array(values, len)),
        }
    }

    /// One-dimensional array of `dtype` from loosely typed scalar values.
    ///
    /// Complex elements may be given as `[re, im]` lists.
    pub fn from_values(values: &[AttrValue], dtype: Dtype) -> Result<Self> {
        let len = values.len();
        let invalid = |value: &AttrValue| ValueError::InvalidValue {
            value: value.to_string(),
            dtype,
        };
        let storage = match dtype.kind() {
            DtypeKind::Bool => Storage::Bool(vec_to_array(
                values
                    .iter()
                    .map(|v| v.as_bool().ok_or_else(|| invalid(v)))
                    .collect::<Result<Vec<_>>>()?,
                len,
            )),
            DtypeKind::SignedInt => Storage::Int(vec_to_array(
                values
                    .iter()
                    .map(|v| {
                        integer_value(v)
                            .filter(|i| int_in_range(*i, dtype))
                            .ok_or_else(|| invalid(v))
                    })
                    .collect::<Result<Vec<_>>>()?,
                len,
            )),
            DtypeKind::UnsignedInt => Storage::UInt(vec_to_array(
                values
                    .iter()
                    .map(|v| {
                        unsigned_value(v)
                            .filter(|u| uint_in_range(*u, dtype))
                            .ok_or_else(|| invalid(v))
                    })
                    .collect::<Result<Vec<_>>>()?,
                len,
            )),
            DtypeKind::Float => Storage::Float(vec_to_array(
                values
                    .iter()
                    .map(|v| float_value(v).ok_or_else(|| invalid(v)))
                    .collect::<Result<Vec<_>>>()?,
                len,
            )),
            DtypeKind::Complex => Storage::Complex(vec_to_array(
                values
                    .iter()
                    .map(|v| complex_value(v).ok_or_else(|| invalid(v)))
                    .collect::<Result<Vec<_>>>()?,
                len,
            )),
            DtypeKind::Str => Storage::Str(vec_to_array(
                values
                    .iter()
                    .map(|v| v.as_str().map(str::to_string).ok_or_else(|| invalid(v)))
                    .collect::<Result<Vec<_>>>()?,
                len,
            )),
        };
        Ok(Self { dtype, storage })
    }

    /// Reinterpret the values in C order under a new shape.
    pub fn reshape(self, shape: &[usize]) -> Result<Self> {
        let len = self.len();
        let expected: usize = shape.iter().product();
        if expected != len {
            return Err(ValueError::ShapeMismatch {
                shape: shape.to_vec(),
                len,
            });
        }
        let dim = IxDyn(shape);
        let mismatch = |_| ValueError::ShapeMismatch {
            shape: shape.to_vec(),
            len,
        };
        let storage = match self.storage {
            Storage::Bool(a) => Storage::Bool(ArrayD::from_shape_vec(dim, a.iter().cloned().collect()).map_err(mismatch)?),
            Storage::Int(a) => Storage::Int(ArrayD::from_shape_vec(dim, a.iter().cloned().collect()).map_err(mismatch)?),
            Storage::UInt(a) => Storage::UInt(ArrayD::from_shape_vec(dim, a.iter().cloned().collect()).map_err(mismatch)?),
            Storage::Float(a) => Storage::Float(ArrayD::from_shape_vec(dim, a.iter().cloned().collect()).map_err(mismatch)?),
            Storage::Complex(a) => Storage::Complex(ArrayD::from_shape_vec(dim, a.iter().cloned().collect()).map_err(mismatch)?),
            Storage::Str(a) => Storage::Str(ArrayD::from_shape_vec(dim, a.iter().cloned().collect()).map_err(mismatch)?),
            Storage::Lazy(_) => Storage::Lazy(shape.to_vec()),
        };
        Ok(Self {
            dtype: self.dtype,
            storage,
        })
    }

    /// Convert to `dtype` under safe casting rules.
    pub fn cast(&self, dtype: Dtype) -> Result<Self> {
        if self.dtype == dtype {
            return Ok(self.clone());
        }
        if !self.dtype.can_cast_safely(dtype) {
            return Err(ValueError::UnsupportedCast {
                from: self.dtype,
                to: dtype,
            });
        }
        let storage = match (&self.storage, dtype.kind()) {
            (Storage::Lazy(shape), _) => Storage::Lazy(shape.clone()),
            (Storage::Bool(a), DtypeKind::SignedInt) => Storage::Int(a.mapv(|v| v as i64)),
            (Storage::Bool(a), DtypeKind::UnsignedInt) => Storage::UInt(a.mapv(|v| v as u64)),
            (Storage::Bool(a), DtypeKind::Float) => Storage::Float(a.mapv(|v| u8::from(v) as f64)),
            (Storage::Bool(a), DtypeKind::Complex) => {
                Storage::Complex(a.mapv(|v| Complex64::new(u8::from(v) as f64, 0.0)))
            }
            (Storage::Int(a), DtypeKind::SignedInt) => Storage::Int(a.clone()),
            (Storage::Int(a), DtypeKind::Float) => Storage::Float(a.mapv(|v| v as f64)),
            (Storage::Int(a), DtypeKind::Complex) => {
                Storage::Complex(a.mapv(|v| Complex64::new(v as f64, 0.0)))
            }
            (Storage::UInt(a), DtypeKind::UnsignedInt) => Storage::UInt(a.clone()),
            // Safe casts only widen, so no source value exceeds i64::MAX.
            (Storage::UInt(a), DtypeKind::SignedInt) => Storage::Int(a.mapv(|v| v as i64)),
            (Storage::UInt(a), DtypeKind::Float) => Storage::Float(a.mapv(|v| v as f64)),
            (Storage::UInt(a), DtypeKind::Complex) => {
                Storage::Complex(a.mapv(|v| Complex64::new(v as f64, 0.0)))
            }
            (Storage::Float(a), DtypeKind::Float) => Storage::Float(a.clone()),
            (Storage::Float(a), DtypeKind::Complex) => {
                Storage::Complex(a.mapv(|v| Complex64::new(v, 0.0)))
            }
            (Storage::Complex(a), DtypeKind::Complex) => Storage::Complex(a.clone()),
            _ => {
                return Err(ValueError::UnsupportedCast {
                    from: self.dtype,
                    to: dtype,
                })
            }
        };
        Ok(Self { dtype, storage })
    }

    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        match &self.storage {
            Storage::Bool(a) => a.shape(),
            Storage::Int(a) => a.shape(),
            Storage::UInt(a) => a.shape(),
            Storage::Float(a) => a.shape(),
            Storage::Complex(a) => a.shape(),
            Storage::Str(a) => a.shape(),
            Storage::Lazy(shape) => shape,
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self.storage, Storage::Lazy(_))
    }

    pub fn as_f64(&self) -> Option<&ArrayD<f64>> {
        match &self.storage {
            Storage::Float(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<&ArrayD<i64>> {
        match &self.storage {
            Storage::Int(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<&ArrayD<Complex64>> {
        match &self.storage {
            Storage::Complex(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&ArrayD<String>> {
        match &self.storage {
            Storage::Str(a) => Some(a),
            _ => None,
        }
    }

    /// Flattened values in C order as JSON, `None` for lazy arrays.
    fn json_values(&self) -> Option<Vec<serde_json::Value>> {
        use serde_json::Value;
        let float = |v: f64| serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number);
        let values = match &self.storage {
            Storage::Bool(a) => a.iter().map(|v| Value::Bool(*v)).collect(),
            Storage::Int(a) => a.iter().map(|v| Value::from(*v)).collect(),
            Storage::UInt(a) => a.iter().map(|v| Value::from(*v)).collect(),
            Storage::Float(a) => a.iter().map(|v| float(*v)).collect(),
            Storage::Complex(a) => a
                .iter()
                .map(|v| Value::Array(vec![float(v.re), float(v.im)]))
                .collect(),
            Storage::Str(a) => a.iter().map(|v| Value::String(v.clone())).collect(),
            Storage::Lazy(_) => return None,
        };
        Some(values)
    }
}

fn vec_to_array<T>(values: Vec<T>, len: usize) -> ArrayD<T> {
    debug_assert_eq!(values.len(), len);
    ndarray::Array1::from(values).into_dyn()
}

fn integer_value(value: &AttrValue) -> Option<i64> {
    match value {
        AttrValue::Int(v) => Some(*v),
        AttrValue::Bool(v) => Some(i64::from(*v)),
        AttrValue::Float(v) if is_integral(*v) && *v >= I64_LOWER && *v < I64_UPPER => {
            Some(*v as i64)
        }
        _ => None,
    }
}

fn unsigned_value(value: &AttrValue) -> Option<u64> {
    match value {
        AttrValue::Int(v) => u64::try_from(*v).ok(),
        AttrValue::Bool(v) => Some(u64::from(*v)),
        AttrValue::Float(v) if is_integral(*v) && *v >= 0.0 && *v < U64_UPPER => Some(*v as u64),
        _ => None,
    }
}

/// -2^63, 2^63 and 2^64 are exact in f64.
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;
const U64_UPPER: f64 = 18_446_744_073_709_551_616.0;

fn is_integral(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0
}

fn float_value(value: &AttrValue) -> Option<f64> {
    match value {
        AttrValue::Bool(v) => Some(u8::from(*v) as f64),
        other => other.as_f64(),
    }
}

fn complex_value(value: &AttrValue) -> Option<Complex64> {
    match value {
        AttrValue::List(parts) if parts.len() == 2 => {
            Some(Complex64::new(parts[0].as_f64()?, parts[1].as_f64()?))
        }
        other => float_value(other).map(|re| Complex64::new(re, 0.0)),
    }
}

fn int_in_range(value: i64, dtype: Dtype) -> bool {
    match dtype {
        Dtype::Int8 => i8::try_from(value).is_ok(),
        Dtype::Int16 => i16::try_from(value).is_ok(),
        Dtype::Int32 => i32::try_from(value).is_ok(),
        _ => true,
    }
}

fn uint_in_range(value: u64, dtype: Dtype) -> bool {
    match dtype {
        Dtype::UInt8 => u8::try_from(value).is_ok(),
        Dtype::UInt16 => u16::try_from(value).is_ok(),
        Dtype::UInt32 => u32::try_from(value).is_ok(),
        _ => true,
    }
}

/// JSON document form of [`ArrayData`].
///
/// `values` holds the flattened elements in C order; omitting it describes a
/// lazy array, which then requires `shape`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArrayDataDoc {
    dtype: Dtype,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shape: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Vec<serde_json::Value>>,
}

impl From<ArrayData> for ArrayDataDoc {
    fn from(data: ArrayData) -> Self {
        Self {
            dtype: data.dtype,
            shape: Some(data.shape().to_vec()),
            values: data.json_values(),
        }
    }
}

impl TryFrom<ArrayDataDoc> for ArrayData {
    type Error = ValueError;

    fn try_from(doc: ArrayDataDoc) -> Result<Self> {
        let Some(values) = doc.values else {
            let shape = doc.shape.ok_or_else(|| {
                ValueError::InvalidDocument("lazy array requires 'shape'".to_string())
            })?;
            return Ok(ArrayData::lazy(doc.dtype, &shape));
        };
        if doc.dtype.kind() == DtypeKind::UnsignedInt {
            let flat = unsigned_from_json(&values, doc.dtype)?;
            return match doc.shape {
                Some(shape) => flat.reshape(&shape),
                None => Ok(flat),
            };
        }
        let scalars = values
            .into_iter()
            .map(|value| match value {
                // Non-finite floats are written as null.
                serde_json::Value::Null => Ok(AttrValue::Float(f64::NAN)),
                other => serde_json::from_value::<AttrValue>(other)
                    .map_err(|e| ValueError::InvalidDocument(e.to_string())),
            })
            .collect::<Result<Vec<_>>>()?;
        let flat = ArrayData::from_values(&scalars, doc.dtype)?;
        match doc.shape {
            Some(shape) => flat.reshape(&shape),
            None => Ok(flat),
        }
    }
}

/// Unsigned elements read straight from JSON so the full u64 range survives.
fn unsigned_from_json(values: &[serde_json::Value], dtype: Dtype) -> Result<ArrayData> {
    let unsigned = values
        .iter()
        .map(|value| {
            value
                .as_u64()
                .or_else(|| {
                    serde_json::from_value::<AttrValue>(value.clone())
                        .ok()
                        .as_ref()
                        .and_then(unsigned_value)
                })
                .filter(|u| uint_in_range(*u, dtype))
                .ok_or_else(|| ValueError::InvalidValue {
                    value: value.to_string(),
                    dtype,
                })
        })
        .collect::<Result<Vec<_>>>()?;
    let len = unsigned.len();
    Ok(ArrayData {
        dtype,
        storage: Storage::UInt(vec_to_array(unsigned, len)),
    })
}

/// A labeled n-dimensional array: data, dimension names, coordinates and
/// attributes.
///
/// Coordinates are themselves `DataArray`s whose dimensions are a subset of
/// the array's dimensions with matching sizes. They carry no coordinates of
/// their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DataArrayDoc", into = "DataArrayDoc")]
pub struct DataArray {
    name: Option<String>,
    dims: Vec<String>,
    data: ArrayData,
    coords: BTreeMap<String, DataArray>,
    attrs: Attrs,
}

impl DataArray {
    /// Label `data` with one dimension name per axis.
    pub fn new<S, I>(data: ArrayData, dims: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let dims: Vec<String> = dims.into_iter().map(Into::into).collect();
        if dims.len() != data.ndim() {
            return Err(ValueError::DimensionCountMismatch {
                ndim: data.ndim(),
                given: dims.len(),
                dims,
            });
        }
        for (idx, dim) in dims.iter().enumerate() {
            if dims[..idx].contains(dim) {
                return Err(ValueError::DuplicateDimension(dim.clone()));
            }
        }
        Ok(Self {
            name: None,
            dims,
            data,
            coords: BTreeMap::new(),
            attrs: Attrs::new(),
        })
    }

    /// Build from a list of `(dimension, values)` pairs, one per axis in
    /// order. Each pair becomes a dimension coordinate.
    pub fn from_coords<S: Into<String>>(
        data: ArrayData,
        coords: Vec<(S, ArrayData)>,
    ) -> Result<Self> {
        let coords: Vec<(String, ArrayData)> =
            coords.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let dims: Vec<String> = coords.iter().map(|(dim, _)| dim.clone()).collect();
        let mut array = Self::new(data, dims)?;
        for (dim, values) in coords {
            let coord = DataArray::new(values, [dim.clone()])?;
            array.insert_coord(dim, coord)?;
        }
        Ok(array)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_coord(mut self, name: impl Into<String>, coord: DataArray) -> Result<Self> {
        self.insert_coord(name, coord)?;
        Ok(self)
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Merge `attrs` into the existing attributes, replacing equal keys.
    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs.extend(attrs);
        self
    }

    /// Attach or replace a coordinate.
    pub fn insert_coord(&mut self, name: impl Into<String>, mut coord: DataArray) -> Result<()> {
        let name = name.into();
        for (dim, size) in coord.dims.iter().zip(coord.shape()) {
            match self.size_of(dim) {
                Some(existing) if existing == *size => {}
                Some(existing) => {
                    return Err(ValueError::SizeConflict {
                        dim: dim.clone(),
                        existing,
                        new: *size,
                    })
                }
                None => {
                    return Err(ValueError::CoordinateDimensions {
                        coord: name,
                        coord_dims: coord.dims.clone(),
                        dims: self.dims.clone(),
                    })
                }
            }
        }
        coord.coords.clear();
        coord.name = Some(name.clone());
        self.coords.insert(name, coord);
        Ok(())
    }

    pub fn remove_coord(&mut self, name: &str) -> Option<DataArray> {
        self.coords.remove(name)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn dtype(&self) -> Dtype {
        self.data.dtype()
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn size_of(&self, dim: &str) -> Option<usize> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .map(|idx| self.shape()[idx])
    }

    /// Dimension sizes keyed by name.
    pub fn sizes(&self) -> BTreeMap<String, usize> {
        self.dims
            .iter()
            .cloned()
            .zip(self.shape().iter().copied())
            .collect()
    }

    pub fn coords(&self) -> &BTreeMap<String, DataArray> {
        &self.coords
    }

    pub fn coord(&self, name: &str) -> Option<&DataArray> {
        self.coords.get(name)
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }

    /// Split into data, dims, coordinates and attributes.
    pub fn into_parts(self) -> (ArrayData, Vec<String>, BTreeMap<String, DataArray>, Attrs) {
        (self.data, self.dims, self.coords, self.attrs)
    }

    pub(crate) fn clear_coords(&mut self) -> BTreeMap<String, DataArray> {
        std::mem::take(&mut self.coords)
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DataArrayDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    dims: Vec<String>,
    data: ArrayData,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    coords: BTreeMap<String, DataArray>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attrs: Attrs,
}

impl From<DataArray> for DataArrayDoc {
    fn from(array: DataArray) -> Self {
        Self {
            name: array.name,
            dims: array.dims,
            data: array.data,
            coords: array.coords,
            attrs: array.attrs,
        }
    }
}

impl TryFrom<DataArrayDoc> for DataArray {
    type Error = ValueError;

    fn try_from(doc: DataArrayDoc) -> Result<Self> {
        let mut array = DataArray::new(doc.data, doc.dims)?;
        array.name = doc.name;
        array.attrs = doc.attrs;
        for (name, coord) in doc.coords {
            array.insert_coord(name, coord)?;
        }
        Ok(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_and_shape() {
        let data = ArrayData::zeros(Dtype::Complex128, &[10]);
        assert_eq!(data.dtype(), Dtype::Complex128);
        assert_eq!(data.shape(), &[10]);
        assert_eq!(data.len(), 10);
        assert!(!data.is_lazy());

        let scalar = ArrayData::zeros(Dtype::Complex128, &[]);
        assert_eq!(scalar.ndim(), 0);
        assert_eq!(scalar.len(), 1);
    }

    #[test]
    fn test_from_values_converts_to_dtype() {
        let values: Vec<AttrValue> = (0..4).map(AttrValue::from).collect();
        let data = ArrayData::from_values(&values, Dtype::Complex128).unwrap();
        assert_eq!(data.dtype(), Dtype::Complex128);
        assert_eq!(data.as_complex().unwrap()[[3]], Complex64::new(3.0, 0.0));

        let err = ArrayData::from_values(&[AttrValue::from("x")], Dtype::Float64).unwrap_err();
        assert!(matches!(err, ValueError::InvalidValue { .. }));

        let err = ArrayData::from_values(&[AttrValue::from(300)], Dtype::Int8).unwrap_err();
        assert!(matches!(err, ValueError::InvalidValue { .. }));
    }

    #[test]
    fn test_cast_rules() {
        let ints = ArrayData::from_i64(vec![1, 2, 3]);
        let floats = ints.cast(Dtype::Float64).unwrap();
        assert_eq!(floats.as_f64().unwrap()[[2]], 3.0);

        let err = floats.cast(Dtype::Int64).unwrap_err();
        assert_eq!(
            err,
            ValueError::UnsupportedCast {
                from: Dtype::Float64,
                to: Dtype::Int64
            }
        );

        let lazy = ArrayData::lazy(Dtype::Float32, &[4]).cast(Dtype::Complex64).unwrap();
        assert!(lazy.is_lazy());
        assert_eq!(lazy.dtype(), Dtype::Complex64);
    }

    #[test]
    fn test_reshape() {
        let data = ArrayData::arange(6, Dtype::Float64).unwrap().reshape(&[2, 3]).unwrap();
        assert_eq!(data.shape(), &[2, 3]);
        assert_eq!(data.as_f64().unwrap()[[1, 0]], 3.0);
        assert!(ArrayData::arange(6, Dtype::Float64).unwrap().reshape(&[4]).is_err());
    }

    #[test]
    fn test_data_array_coordinates() {
        let array = DataArray::from_coords(
            ArrayData::zeros(Dtype::Complex128, &[10]),
            vec![("coord", ArrayData::arange(10, Dtype::Float64).unwrap())],
        )
        .unwrap()
        .with_attr("attr1", "str");

        assert_eq!(array.dims(), &["coord".to_string()]);
        assert_eq!(array.coord("coord").unwrap().dtype(), Dtype::Float64);
        assert_eq!(array.attrs()["attr1"], AttrValue::from("str"));
        assert_eq!(array.sizes()["coord"], 10);
    }

    #[test]
    fn test_coordinate_must_fit_dimensions() {
        let array = DataArray::new(ArrayData::zeros(Dtype::Float64, &[10]), ["coord"]).unwrap();

        let wrong_size =
            DataArray::new(ArrayData::arange(5, Dtype::Float64).unwrap(), ["coord"]).unwrap();
        let err = array.clone().with_coord("coord", wrong_size).unwrap_err();
        assert!(matches!(err, ValueError::SizeConflict { .. }));

        let foreign =
            DataArray::new(ArrayData::arange(5, Dtype::Float64).unwrap(), ["other"]).unwrap();
        let err = array.with_coord("other", foreign).unwrap_err();
        assert!(matches!(err, ValueError::CoordinateDimensions { .. }));
    }

    #[test]
    fn test_dimension_validation() {
        let err = DataArray::new(ArrayData::zeros(Dtype::Float64, &[2, 2]), ["a"]).unwrap_err();
        assert!(matches!(err, ValueError::DimensionCountMismatch { .. }));
        let err =
            DataArray::new(ArrayData::zeros(Dtype::Float64, &[2, 2]), ["a", "a"]).unwrap_err();
        assert_eq!(err, ValueError::DuplicateDimension("a".to_string()));
    }

    #[test]
    fn test_json_document() {
        let json = r#"{
            "dims": ["coord"],
            "data": {"dtype": "<c16", "values": [[0, 1], [2, 0]]},
            "coords": {"coord": {"dims": ["coord"], "data": {"dtype": "<f8", "values": [0, 1]}}},
            "attrs": {"attr1": "str"}
        }"#;
        let array: DataArray = serde_json::from_str(json).unwrap();
        assert_eq!(array.dtype(), Dtype::Complex128);
        assert_eq!(array.data().as_complex().unwrap()[[0]], Complex64::new(0.0, 1.0));
        assert_eq!(array.coord("coord").unwrap().dtype(), Dtype::Float64);

        let lazy: ArrayData =
            serde_json::from_str(r#"{"dtype": "<f4", "shape": [25]}"#).unwrap();
        assert!(lazy.is_lazy());
        assert_eq!(lazy.shape(), &[25]);

        let again: DataArray =
            serde_json::from_str(&serde_json::to_string(&array).unwrap()).unwrap();
        assert_eq!(again, array);
    }
}
