//! Schema-Aware Constructors
//!
//! Builders that assemble labeled values in the shape a schema describes.
//! Fields can be given positionally (schema order), by name, in bulk, or by
//! starting from an existing value and overriding parts of it:
//!
//! ```
//! use meridian_schema::construct::ArrayBuilder;
//! use meridian_schema::metamodel::{ArraySchema, ArraySchemaRef, AttrSchemaRef, AttrType};
//! use meridian_types::{ArrayData, Dtype};
//! use std::sync::Arc;
//!
//! let coord = ArraySchema::simple(vec![vec!["time".into()]], vec![Dtype::Float64]);
//! let schema = ArraySchema {
//!     coordinates: vec![ArraySchemaRef::new("time", Arc::new(coord))],
//!     attributes: vec![AttrSchemaRef::required("units", AttrType::Str).with_default("Jy")],
//!     ..ArraySchema::simple(vec![vec!["time".into()]], vec![Dtype::Complex128])
//! };
//!
//! let array = ArrayBuilder::new(&schema)
//!     .arg(ArrayData::zeros(Dtype::Complex128, &[4]))
//!     .build()?;
//! assert_eq!(array.dims(), &["time".to_string()]);
//! assert_eq!(array.coord("time").unwrap().shape(), &[4]);
//! assert_eq!(array.attrs()["units"].as_str(), Some("Jy"));
//! # Ok::<(), meridian_schema::construct::ConstructError>(())
//! ```
//!
//! Omitted attributes with defaults receive them. Index coordinates (a
//! single ordering `[name]` with a numeric dtype) are generated as `0..n`
//! when the dimension is present. Constructed values are not checked; pass
//! them to [`crate::check`] for that.

use crate::metamodel::{ArraySchema, DatasetSchema, DictSchema};
use meridian_types::{ArrayData, AttrValue, Attrs, DataArray, Dataset, Dtype, ValueError};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Errors raised while constructing a value.
#[derive(Debug, Error)]
pub enum ConstructError {
    #[error("Too many positional arguments: {given} given, at most {max} accepted")]
    TooManyArguments { given: usize, max: usize },

    #[error("Argument for '{field}' must be {expected}")]
    ArgumentType {
        field: String,
        expected: &'static str,
    },

    #[error("Argument '{0}' given more than once")]
    DuplicateArgument(String),

    #[error("No data given")]
    MissingData,

    #[error("Cannot infer dimensions of '{field}': {ndim}-dimensional data matches none of {orderings:?}")]
    DimensionsUnresolved {
        field: String,
        ndim: usize,
        orderings: Vec<Vec<String>>,
    },

    #[error("Unknown field '{field}' for {schema}")]
    UnknownField { schema: String, field: String },

    #[error(transparent)]
    Value(#[from] ValueError),
}

pub type Result<T> = std::result::Result<T, ConstructError>;

/// Data for an array, coordinate or data variable.
#[derive(Debug, Clone, PartialEq)]
pub enum DataInput {
    /// Unlabeled storage; dimensions come from the input or the schema
    Array(ArrayData),
    /// An existing labeled array, taken with its coordinates and attributes
    Labeled(DataArray),
    /// Plain values, converted to the schema's first dtype
    List(Vec<AttrValue>),
}

impl From<ArrayData> for DataInput {
    fn from(data: ArrayData) -> Self {
        DataInput::Array(data)
    }
}

impl From<DataArray> for DataInput {
    fn from(array: DataArray) -> Self {
        DataInput::Labeled(array)
    }
}

/// Data plus optional dimension names and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInput {
    pub dims: Option<Vec<String>>,
    pub data: DataInput,
    pub attrs: Attrs,
}

impl VariableInput {
    pub fn new(data: impl Into<DataInput>) -> Self {
        Self {
            dims: None,
            data: data.into(),
            attrs: Attrs::new(),
        }
    }

    /// Variable from plain values.
    pub fn list<V: Into<AttrValue>>(values: Vec<V>) -> Self {
        Self::new(DataInput::List(values.into_iter().map(Into::into).collect()))
    }

    pub fn with_dims(mut self, dims: &[&str]) -> Self {
        self.dims = Some(dims.iter().map(|d| d.to_string()).collect());
        self
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs.extend(attrs);
        self
    }
}

impl From<ArrayData> for VariableInput {
    fn from(data: ArrayData) -> Self {
        Self::new(data)
    }
}

impl From<DataArray> for VariableInput {
    fn from(array: DataArray) -> Self {
        Self::new(array)
    }
}

impl From<DataInput> for VariableInput {
    fn from(data: DataInput) -> Self {
        Self::new(data)
    }
}

/// A positional or named constructor argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Variable(VariableInput),
    Attr(AttrValue),
}

impl Arg {
    fn into_variable(self, field: &str) -> Result<VariableInput> {
        match self {
            Arg::Variable(input) => Ok(input),
            Arg::Attr(AttrValue::List(values)) => Ok(VariableInput::new(DataInput::List(values))),
            Arg::Attr(_) => Err(ConstructError::ArgumentType {
                field: field.to_string(),
                expected: "array data",
            }),
        }
    }

    fn into_attr(self, field: &str) -> Result<AttrValue> {
        match self {
            Arg::Attr(value) => Ok(value),
            Arg::Variable(VariableInput {
                dims: None,
                data: DataInput::List(values),
                attrs,
            }) if attrs.is_empty() => Ok(AttrValue::List(values)),
            Arg::Variable(_) => Err(ConstructError::ArgumentType {
                field: field.to_string(),
                expected: "an attribute value",
            }),
        }
    }
}

impl From<VariableInput> for Arg {
    fn from(input: VariableInput) -> Self {
        Arg::Variable(input)
    }
}

impl From<ArrayData> for Arg {
    fn from(data: ArrayData) -> Self {
        Arg::Variable(data.into())
    }
}

impl From<DataArray> for Arg {
    fn from(array: DataArray) -> Self {
        Arg::Variable(array.into())
    }
}

impl From<AttrValue> for Arg {
    fn from(value: AttrValue) -> Self {
        Arg::Attr(value)
    }
}

macro_rules! attr_arg_from {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Arg {
            fn from(value: $ty) -> Self {
                Arg::Attr(value.into())
            }
        })*
    };
}

attr_arg_from!(&str, String, i64, i32, f64, bool, Attrs);

impl<T: Into<AttrValue>> From<Vec<T>> for Arg {
    fn from(values: Vec<T>) -> Self {
        Arg::Attr(values.into())
    }
}

/// Builder for a [`DataArray`] following an [`ArraySchema`].
///
/// Positional order is data, then coordinates, then attributes, each in
/// schema order.
#[derive(Debug, Clone)]
pub struct ArrayBuilder<'s> {
    schema: &'s ArraySchema,
    data: Vec<VariableInput>,
    dims: Option<Vec<String>>,
    positional: Vec<Arg>,
    named: Vec<(String, Arg)>,
    coords: Vec<(String, VariableInput)>,
    attrs: Vec<(String, AttrValue)>,
    name: Option<String>,
}

impl<'s> ArrayBuilder<'s> {
    pub fn new(schema: &'s ArraySchema) -> Self {
        Self {
            schema,
            data: Vec::new(),
            dims: None,
            positional: Vec::new(),
            named: Vec::new(),
            coords: Vec::new(),
            attrs: Vec::new(),
            name: None,
        }
    }

    /// Start from an existing array. Coordinates given later replace its
    /// coordinates, attributes are merged over its attributes.
    pub fn from_array(schema: &'s ArraySchema, array: DataArray) -> Self {
        Self::new(schema).data(array)
    }

    pub fn data(mut self, data: impl Into<VariableInput>) -> Self {
        self.data.push(data.into());
        self
    }

    /// Dimension names of the data.
    pub fn dims(mut self, dims: &[&str]) -> Self {
        self.dims = Some(dims.iter().map(|d| d.to_string()).collect());
        self
    }

    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.positional.push(arg.into());
        self
    }

    /// Set a coordinate or attribute declared by the schema.
    pub fn field(mut self, name: impl Into<String>, arg: impl Into<Arg>) -> Self {
        self.named.push((name.into(), arg.into()));
        self
    }

    /// Set coordinates, declared or not.
    pub fn coords<I, K, V>(mut self, coords: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<VariableInput>,
    {
        self.coords
            .extend(coords.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set attributes, declared or not.
    pub fn attrs(mut self, attrs: Attrs) -> Self {
        self.attrs.extend(attrs);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn build(self) -> Result<DataArray> {
        let schema = self.schema;
        let mut data = self.data;
        let mut coords = Unique::default();
        let mut attrs = Unique::default();
        for (name, input) in self.coords {
            coords.insert(name, input)?;
        }
        for (name, value) in self.attrs {
            attrs.insert(name, value)?;
        }

        let max = 1 + schema.coordinates.len() + schema.attributes.len();
        if self.positional.len() > max {
            return Err(ConstructError::TooManyArguments {
                given: self.positional.len(),
                max,
            });
        }
        for (idx, arg) in self.positional.into_iter().enumerate() {
            if idx == 0 {
                data.push(arg.into_variable("data")?);
            } else if let Some(coord) = schema.coordinates.get(idx - 1) {
                coords.insert(coord.name.clone(), arg.into_variable(&coord.name)?)?;
            } else {
                let attr = &schema.attributes[idx - 1 - schema.coordinates.len()];
                attrs.insert(attr.name.clone(), arg.into_attr(&attr.name)?)?;
            }
        }
        for (name, arg) in self.named {
            if name == "data" {
                data.push(arg.into_variable("data")?);
            } else if schema.coordinate(&name).is_some() {
                let input = arg.into_variable(&name)?;
                coords.insert(name, input)?;
            } else if schema.attribute(&name).is_some() {
                let value = arg.into_attr(&name)?;
                attrs.insert(name, value)?;
            } else {
                return Err(unknown_field(schema.schema_name.as_deref(), name));
            }
        }

        if data.len() > 1 {
            return Err(ConstructError::DuplicateArgument("data".to_string()));
        }
        let mut input = data.pop().ok_or(ConstructError::MissingData)?;
        if input.dims.is_none() {
            input.dims = self.dims;
        }
        let mut array = to_data_array("data", input, Some(schema))?;

        for (name, input) in coords.into_inner() {
            let coord_schema = schema.coordinate(&name).map(|c| c.schema.as_ref());
            let coord = to_data_array(&name, input, coord_schema)?;
            array.insert_coord(name, coord)?;
        }
        for coord in &schema.coordinates {
            if array.coord(&coord.name).is_some() || !coord.is_index_for(&coord.name) {
                continue;
            }
            if let (Some(size), Some(dtype)) = (array.size_of(&coord.name), coord.dtypes.first()) {
                let values = DataArray::new(ArrayData::arange(size, *dtype)?, [coord.name.clone()])?;
                array.insert_coord(coord.name.clone(), values)?;
            }
        }

        let mut array = array.with_attrs(attrs.into_inner());
        apply_defaults(array.attrs_mut(), &schema.attributes);
        if let Some(name) = self.name {
            array = array.with_name(name);
        }
        debug!(
            schema = schema.schema_name.as_deref().unwrap_or("<inline>"),
            dims = ?array.dims(),
            "constructed array"
        );
        Ok(array)
    }
}

/// Builder for a [`Dataset`] following a [`DatasetSchema`].
///
/// Positional order is data variables, then coordinates, then attributes,
/// each in schema order.
#[derive(Debug, Clone)]
pub struct DatasetBuilder<'s> {
    schema: &'s DatasetSchema,
    base: Option<Dataset>,
    positional: Vec<Arg>,
    named: Vec<(String, Arg)>,
    coords: Vec<(String, VariableInput)>,
    data_vars: Vec<(String, VariableInput)>,
    attrs: Vec<(String, AttrValue)>,
}

impl<'s> DatasetBuilder<'s> {
    pub fn new(schema: &'s DatasetSchema) -> Self {
        Self {
            schema,
            base: None,
            positional: Vec::new(),
            named: Vec::new(),
            coords: Vec::new(),
            data_vars: Vec::new(),
            attrs: Vec::new(),
        }
    }

    /// Start from an existing dataset. Members given later replace members
    /// of the same name, attributes are merged over its attributes.
    pub fn from_dataset(schema: &'s DatasetSchema, dataset: Dataset) -> Self {
        Self {
            base: Some(dataset),
            ..Self::new(schema)
        }
    }

    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.positional.push(arg.into());
        self
    }

    /// Set a coordinate, data variable or attribute declared by the schema.
    pub fn field(mut self, name: impl Into<String>, arg: impl Into<Arg>) -> Self {
        self.named.push((name.into(), arg.into()));
        self
    }

    pub fn coords<I, K, V>(mut self, coords: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<VariableInput>,
    {
        self.coords
            .extend(coords.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn data_vars<I, K, V>(mut self, data_vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<VariableInput>,
    {
        self.data_vars
            .extend(data_vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn attrs(mut self, attrs: Attrs) -> Self {
        self.attrs.extend(attrs);
        self
    }

    pub fn build(self) -> Result<Dataset> {
        let schema = self.schema;
        let mut coords = Unique::default();
        let mut data_vars = Unique::default();
        let mut attrs = Unique::default();
        for (name, input) in self.coords {
            coords.insert(name, input)?;
        }
        for (name, input) in self.data_vars {
            data_vars.insert(name, input)?;
        }
        for (name, value) in self.attrs {
            attrs.insert(name, value)?;
        }

        let n_vars = schema.data_vars.len();
        let n_coords = schema.coordinates.len();
        let max = n_vars + n_coords + schema.attributes.len();
        if self.positional.len() > max {
            return Err(ConstructError::TooManyArguments {
                given: self.positional.len(),
                max,
            });
        }
        for (idx, arg) in self.positional.into_iter().enumerate() {
            if let Some(var) = schema.data_vars.get(idx) {
                data_vars.insert(var.name.clone(), arg.into_variable(&var.name)?)?;
            } else if let Some(coord) = schema.coordinates.get(idx - n_vars) {
                coords.insert(coord.name.clone(), arg.into_variable(&coord.name)?)?;
            } else {
                let attr = &schema.attributes[idx - n_vars - n_coords];
                attrs.insert(attr.name.clone(), arg.into_attr(&attr.name)?)?;
            }
        }
        for (name, arg) in self.named {
            if schema.data_var(&name).is_some() {
                let input = arg.into_variable(&name)?;
                data_vars.insert(name, input)?;
            } else if schema.coordinate(&name).is_some() {
                let input = arg.into_variable(&name)?;
                coords.insert(name, input)?;
            } else if schema.attribute(&name).is_some() {
                let value = arg.into_attr(&name)?;
                attrs.insert(name, value)?;
            } else {
                return Err(unknown_field(schema.schema_name.as_deref(), name));
            }
        }

        let mut dataset = self.base.unwrap_or_default();
        for (name, input) in coords.into_inner() {
            let coord_schema = schema.coordinate(&name).map(|c| c.schema.as_ref());
            let coord = to_data_array(&name, input, coord_schema)?;
            dataset.insert_coord(name, coord)?;
        }
        for (name, input) in data_vars.into_inner() {
            let var_schema = schema.data_var(&name).map(|v| v.schema.as_ref());
            let var = to_data_array(&name, input, var_schema)?;
            dataset.insert_data_var(name, var)?;
        }
        let sizes = dataset.sizes();
        for coord in &schema.coordinates {
            if dataset.coord(&coord.name).is_some() || !coord.is_index_for(&coord.name) {
                continue;
            }
            if let (Some(size), Some(dtype)) = (sizes.get(&coord.name), coord.dtypes.first()) {
                let values =
                    DataArray::new(ArrayData::arange(*size, *dtype)?, [coord.name.clone()])?;
                dataset.insert_coord(coord.name.clone(), values)?;
            }
        }

        let mut dataset = dataset.with_attrs(attrs.into_inner());
        apply_defaults(dataset.attrs_mut(), &schema.attributes);
        debug!(
            schema = schema.schema_name.as_deref().unwrap_or("<inline>"),
            data_vars = dataset.data_vars().len(),
            "constructed dataset"
        );
        Ok(dataset)
    }
}

/// Builder for an attribute dictionary following a [`DictSchema`].
#[derive(Debug, Clone)]
pub struct DictBuilder<'s> {
    schema: &'s DictSchema,
    positional: Vec<Arg>,
    named: Vec<(String, Arg)>,
}

impl<'s> DictBuilder<'s> {
    pub fn new(schema: &'s DictSchema) -> Self {
        Self {
            schema,
            positional: Vec::new(),
            named: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.positional.push(arg.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, arg: impl Into<Arg>) -> Self {
        self.named.push((name.into(), arg.into()));
        self
    }

    pub fn build(self) -> Result<Attrs> {
        let schema = self.schema;
        let mut values = Unique::default();

        if self.positional.len() > schema.attributes.len() {
            return Err(ConstructError::TooManyArguments {
                given: self.positional.len(),
                max: schema.attributes.len(),
            });
        }
        for (arg, attr) in self.positional.into_iter().zip(&schema.attributes) {
            values.insert(attr.name.clone(), arg.into_attr(&attr.name)?)?;
        }
        for (name, arg) in self.named {
            if schema.attribute(&name).is_none() {
                return Err(unknown_field(schema.schema_name.as_deref(), name));
            }
            let value = arg.into_attr(&name)?;
            values.insert(name, value)?;
        }

        let mut dict = values.into_inner();
        apply_defaults(&mut dict, &schema.attributes);
        Ok(dict)
    }
}

impl ArraySchema {
    /// Constructor for values of this schema.
    pub fn builder(&self) -> ArrayBuilder<'_> {
        ArrayBuilder::new(self)
    }
}

impl DatasetSchema {
    pub fn builder(&self) -> DatasetBuilder<'_> {
        DatasetBuilder::new(self)
    }
}

impl DictSchema {
    pub fn builder(&self) -> DictBuilder<'_> {
        DictBuilder::new(self)
    }
}

/// Map that rejects a second value for the same key.
struct Unique<V>(BTreeMap<String, V>);

impl<V> Default for Unique<V> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<V> Unique<V> {
    fn insert(&mut self, key: String, value: V) -> Result<()> {
        if self.0.contains_key(&key) {
            return Err(ConstructError::DuplicateArgument(key));
        }
        self.0.insert(key, value);
        Ok(())
    }

    fn into_inner(self) -> BTreeMap<String, V> {
        self.0
    }
}

fn unknown_field(schema_name: Option<&str>, field: String) -> ConstructError {
    ConstructError::UnknownField {
        schema: schema_name.unwrap_or("inline schema").to_string(),
        field,
    }
}

fn apply_defaults(attrs: &mut Attrs, declared: &[crate::metamodel::AttrSchemaRef]) {
    for attr in declared {
        if let Some(default) = &attr.default {
            attrs
                .entry(attr.name.clone())
                .or_insert_with(|| default.clone());
        }
    }
}

/// Turn an input into a labeled array, using `schema` to pick dimensions
/// and list dtypes.
fn to_data_array(field: &str, input: VariableInput, schema: Option<&ArraySchema>) -> Result<DataArray> {
    let VariableInput { dims, data, attrs } = input;
    let array = match data {
        DataInput::Labeled(array) => match dims {
            Some(dims) if dims.as_slice() != array.dims() => {
                let (data, _, _, old_attrs) = array.into_parts();
                DataArray::new(data, dims)?.with_attrs(old_attrs)
            }
            _ => array,
        },
        DataInput::Array(data) => {
            let dims = resolve_dims(field, dims, data.ndim(), schema)?;
            DataArray::new(data, dims)?
        }
        DataInput::List(values) => {
            let dtype = schema
                .and_then(|s| s.dtypes.first().copied())
                .unwrap_or_else(|| infer_dtype(&values));
            let data = ArrayData::from_values(&values, dtype)?;
            let dims = resolve_dims(field, dims, data.ndim(), schema)?;
            DataArray::new(data, dims)?
        }
    };
    Ok(array.with_attrs(attrs))
}

fn resolve_dims(
    field: &str,
    given: Option<Vec<String>>,
    ndim: usize,
    schema: Option<&ArraySchema>,
) -> Result<Vec<String>> {
    if let Some(dims) = given {
        return Ok(dims);
    }
    match schema {
        Some(schema) => schema
            .dims_for_rank(ndim)
            .map(<[String]>::to_vec)
            .ok_or_else(|| ConstructError::DimensionsUnresolved {
                field: field.to_string(),
                ndim,
                orderings: schema.dimensions.clone(),
            }),
        // Undeclared one-dimensional members index their own dimension.
        None if ndim == 1 => Ok(vec![field.to_string()]),
        None => Err(ConstructError::DimensionsUnresolved {
            field: field.to_string(),
            ndim,
            orderings: Vec::new(),
        }),
    }
}

/// Narrowest dtype holding every value of an undeclared list.
fn infer_dtype(values: &[AttrValue]) -> Dtype {
    if values.iter().all(|v| matches!(v, AttrValue::Bool(_))) && !values.is_empty() {
        Dtype::Bool
    } else if values.iter().all(|v| matches!(v, AttrValue::Int(_))) {
        Dtype::Int64
    } else if values
        .iter()
        .all(|v| matches!(v, AttrValue::Int(_) | AttrValue::Float(_)))
    {
        Dtype::Float64
    } else if values.iter().any(|v| matches!(v, AttrValue::List(_))) {
        Dtype::Complex128
    } else {
        Dtype::Str
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metamodel::{ArraySchemaRef, AttrSchemaRef, AttrType};
    use meridian_types::attrs;
    use std::sync::Arc;

    fn dims(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn schema() -> ArraySchema {
        ArraySchema {
            schema_name: Some("TestArray".to_string()),
            dimensions: vec![dims(&["coord"])],
            dtypes: vec![Dtype::Complex128],
            coordinates: vec![ArraySchemaRef::new(
                "coord",
                Arc::new(ArraySchema::simple(vec![dims(&["coord"])], vec![Dtype::Float64])),
            )],
            attributes: vec![
                AttrSchemaRef::required("attr1", AttrType::Str),
                AttrSchemaRef::required("attr2", AttrType::Int).with_default(123),
                AttrSchemaRef::optional("attr3", AttrType::Int),
            ],
            class_docstring: None,
            data_docstring: None,
        }
    }

    fn zeros() -> ArrayData {
        ArrayData::zeros(Dtype::Complex128, &[10])
    }

    #[test]
    fn test_positional_arguments() {
        let schema = schema();
        let array = schema
            .builder()
            .arg(zeros())
            .arg(ArrayData::arange(10, Dtype::Float64).unwrap())
            .arg("str")
            .build()
            .unwrap();
        assert_eq!(array.dims(), &dims(&["coord"]));
        assert_eq!(array.attrs()["attr1"], AttrValue::from("str"));
        assert_eq!(array.attrs()["attr2"], AttrValue::from(123));
        assert!(!array.attrs().contains_key("attr3"));
    }

    #[test]
    fn test_too_many_positional_arguments() {
        let schema = schema();
        let mut builder = schema.builder();
        for _ in 0..6 {
            builder = builder.arg(1);
        }
        assert!(matches!(
            builder.build().unwrap_err(),
            ConstructError::TooManyArguments { given: 6, max: 5 }
        ));
    }

    #[test]
    fn test_positional_type_mismatch() {
        let schema = schema();
        let err = schema.builder().arg(zeros()).arg("not data").build().unwrap_err();
        assert!(matches!(err, ConstructError::ArgumentType { ref field, .. } if field == "coord"));
    }

    #[test]
    fn test_duplicate_arguments() {
        let schema = schema();
        let err = schema
            .builder()
            .arg(zeros())
            .field("attr1", "a")
            .attrs(attrs([("attr1", "b")]))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConstructError::DuplicateArgument(ref f) if f == "attr1"));

        let err = schema.builder().arg(zeros()).data(zeros()).build().unwrap_err();
        assert!(matches!(err, ConstructError::DuplicateArgument(ref f) if f == "data"));
    }

    #[test]
    fn test_missing_data_and_unknown_field() {
        let schema = schema();
        assert!(matches!(
            schema.builder().field("attr1", "a").build().unwrap_err(),
            ConstructError::MissingData
        ));
        assert!(matches!(
            schema.builder().arg(zeros()).field("attr9", 1).build().unwrap_err(),
            ConstructError::UnknownField { .. }
        ));
    }

    #[test]
    fn test_auto_index_coordinate() {
        let schema = schema();
        let array = schema.builder().data(zeros()).field("attr1", "s").build().unwrap();
        let coord = array.coord("coord").unwrap();
        assert_eq!(coord.dtype(), Dtype::Float64);
        assert_eq!(coord.data().as_f64().unwrap()[[9]], 9.0);
    }

    #[test]
    fn test_list_inputs_take_schema_dtype() {
        let schema = schema();
        let array = schema
            .builder()
            .data(VariableInput::list(vec![0; 10]))
            .field(
                "coord",
                VariableInput::list((0..10).collect::<Vec<i64>>())
                    .with_dims(&["coord"])
                    .with_attrs(attrs([("asd", "foo")])),
            )
            .field("attr1", "str")
            .build()
            .unwrap();
        assert_eq!(array.dtype(), Dtype::Complex128);
        let coord = array.coord("coord").unwrap();
        assert_eq!(coord.dtype(), Dtype::Float64);
        assert_eq!(coord.attrs()["asd"], AttrValue::from("foo"));
    }

    #[test]
    fn test_override_existing_array() {
        let schema = schema();
        let base = DataArray::from_coords(
            zeros(),
            vec![("coord", ArrayData::arange(10, Dtype::Float64).unwrap())],
        )
        .unwrap()
        .with_attrs(attrs([
            ("attr1", AttrValue::from("str")),
            ("attr2", AttrValue::from(1234)),
            ("attr3", AttrValue::from(345)),
        ]));
        let shifted = ArrayData::from_f64((1..=10).map(f64::from).collect());
        let array = ArrayBuilder::from_array(&schema, base)
            .coords([("coord", shifted)])
            .attrs(attrs([
                ("attr1", AttrValue::from("strstr")),
                ("attr2", AttrValue::from(12345)),
            ]))
            .build()
            .unwrap();
        assert_eq!(array.coord("coord").unwrap().data().as_f64().unwrap()[[0]], 1.0);
        assert_eq!(array.attrs()["attr1"], AttrValue::from("strstr"));
        assert_eq!(array.attrs()["attr2"], AttrValue::from(12345));
        assert_eq!(array.attrs()["attr3"], AttrValue::from(345));
    }

    #[test]
    fn test_unresolved_dimensions() {
        let schema = schema();
        let err = schema
            .builder()
            .data(ArrayData::zeros(Dtype::Complex128, &[2, 2]))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConstructError::DimensionsUnresolved { ndim: 2, .. }));
    }

    #[test]
    fn test_dict_builder() {
        let schema = DictSchema {
            schema_name: Some("TestDict".to_string()),
            class_docstring: None,
            attributes: vec![
                AttrSchemaRef::required("attr1", AttrType::Str),
                AttrSchemaRef::required("attr2", AttrType::Int).with_default(123),
                AttrSchemaRef::optional("attr3", AttrType::Int),
            ],
        };
        let dict = schema.builder().field("attr1", "asd").build().unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict["attr2"], AttrValue::from(123));

        let dict = schema.builder().arg("asd").arg(234).arg(345).build().unwrap();
        assert_eq!(dict["attr3"], AttrValue::from(345));

        let err = schema.builder().field("nope", 1).build().unwrap_err();
        assert!(matches!(err, ConstructError::UnknownField { .. }));
    }
}
