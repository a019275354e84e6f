//! Schema Metamodel
//!
//! Structural contracts for labeled arrays, datasets and attribute
//! dictionaries. Schemas are produced by [`crate::derive`], consumed by
//! [`crate::check`] and [`crate::construct`], and exchanged as JSON through
//! [`crate::export`].
//!
//! Referenced schemas are shared: an [`ArraySchemaRef`] holds an
//! `Arc<ArraySchema>`, so a coordinate schema reused across several datasets
//! exists once in memory.

use meridian_types::{AttrValue, Dtype};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

/// Schema of a single labeled array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArraySchema {
    /// Name of the defining class, `None` for inline coordinate declarations
    #[serde(default)]
    pub schema_name: Option<String>,

    /// Accepted dimension orderings; an array must match one exactly
    pub dimensions: Vec<Vec<String>>,

    /// Accepted element types
    pub dtypes: Vec<Dtype>,

    /// Declared coordinates
    #[serde(default)]
    pub coordinates: Vec<ArraySchemaRef>,

    /// Declared attributes
    #[serde(default)]
    pub attributes: Vec<AttrSchemaRef>,

    #[serde(default)]
    pub class_docstring: Option<String>,

    #[serde(default)]
    pub data_docstring: Option<String>,
}

impl ArraySchema {
    /// Inline schema for a plain coordinate or data variable.
    pub fn simple(dimensions: Vec<Vec<String>>, dtypes: Vec<Dtype>) -> Self {
        Self {
            schema_name: None,
            dimensions,
            dtypes,
            coordinates: Vec::new(),
            attributes: Vec::new(),
            class_docstring: None,
            data_docstring: None,
        }
    }

    /// Every dimension name used by any accepted ordering.
    pub fn dimension_names(&self) -> BTreeSet<&str> {
        self.dimensions
            .iter()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Whether `dims` equals one of the accepted orderings.
    pub fn accepts_dims(&self, dims: &[String]) -> bool {
        self.dimensions.iter().any(|ordering| ordering == dims)
    }

    /// Whether `dtype` is one of the accepted element types.
    pub fn accepts_dtype(&self, dtype: Dtype) -> bool {
        self.dtypes.iter().any(|d| d.matches(&dtype))
    }

    /// First accepted ordering with `ndim` dimensions.
    pub fn dims_for_rank(&self, ndim: usize) -> Option<&[String]> {
        self.dimensions
            .iter()
            .find(|ordering| ordering.len() == ndim)
            .map(Vec::as_slice)
    }

    pub fn coordinate(&self, name: &str) -> Option<&ArraySchemaRef> {
        self.coordinates.iter().find(|c| c.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrSchemaRef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Whether this schema describes an index coordinate for `name`: a single
    /// ordering `[name]` with a numeric element type.
    pub fn is_index_for(&self, name: &str) -> bool {
        matches!(self.dimensions.as_slice(), [ordering] if ordering.len() == 1 && ordering[0] == name)
            && self.dtypes.first().is_some_and(Dtype::is_numeric)
    }
}

/// Schema of a dictionary of typed attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictSchema {
    #[serde(default)]
    pub schema_name: Option<String>,

    #[serde(default)]
    pub class_docstring: Option<String>,

    #[serde(default)]
    pub attributes: Vec<AttrSchemaRef>,
}

impl DictSchema {
    pub fn attribute(&self, name: &str) -> Option<&AttrSchemaRef> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Schema of a dataset: coordinates and data variables over shared
/// dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSchema {
    #[serde(default)]
    pub schema_name: Option<String>,

    /// Acceptable dimension combinations, compared as sets
    pub dimensions: Vec<Vec<String>>,

    #[serde(default)]
    pub coordinates: Vec<ArraySchemaRef>,

    #[serde(default)]
    pub data_vars: Vec<ArraySchemaRef>,

    #[serde(default)]
    pub attributes: Vec<AttrSchemaRef>,

    #[serde(default)]
    pub class_docstring: Option<String>,
}

impl DatasetSchema {
    pub fn coordinate(&self, name: &str) -> Option<&ArraySchemaRef> {
        self.coordinates.iter().find(|c| c.name == name)
    }

    pub fn data_var(&self, name: &str) -> Option<&ArraySchemaRef> {
        self.data_vars.iter().find(|v| v.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrSchemaRef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Whether the set of `dims` equals one accepted combination.
    pub fn accepts_dims<S: AsRef<str>>(&self, dims: &[S]) -> bool {
        let found: BTreeSet<&str> = dims.iter().map(AsRef::as_ref).collect();
        self.dimensions.iter().any(|combination| {
            combination.iter().map(String::as_str).collect::<BTreeSet<_>>() == found
        })
    }
}

/// Use of an array schema under a name, with per-use overrides.
///
/// The schema body is flattened into the same JSON object as the reference
/// fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArraySchemaRef {
    /// Coordinate or data variable name
    pub name: String,

    #[serde(flatten)]
    pub schema: Arc<ArraySchema>,

    #[serde(default)]
    pub optional: bool,

    #[serde(default)]
    pub default: Option<AttrValue>,

    #[serde(default)]
    pub docstring: Option<String>,
}

impl ArraySchemaRef {
    pub fn new(name: impl Into<String>, schema: Arc<ArraySchema>) -> Self {
        Self {
            name: name.into(),
            schema,
            optional: false,
            default: None,
            docstring: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }
}

impl Deref for ArraySchemaRef {
    type Target = ArraySchema;

    fn deref(&self) -> &ArraySchema {
        &self.schema
    }
}

/// Declaration of one attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttrSchemaRef {
    pub name: String,

    #[serde(rename = "type")]
    pub attr_type: AttrType,

    #[serde(default)]
    pub optional: bool,

    /// Value applied by constructors when the attribute is omitted
    #[serde(default)]
    pub default: Option<AttrValue>,

    #[serde(default)]
    pub docstring: Option<String>,

    /// Allowed values, if restricted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<Vec<AttrValue>>,
}

impl AttrSchemaRef {
    /// Create a required attribute declaration
    pub fn required(name: impl Into<String>, attr_type: AttrType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            optional: false,
            default: None,
            docstring: None,
            literal: None,
        }
    }

    /// Create an optional attribute declaration
    pub fn optional(name: impl Into<String>, attr_type: AttrType) -> Self {
        Self {
            optional: true,
            ..Self::required(name, attr_type)
        }
    }

    pub fn with_default(mut self, default: impl Into<AttrValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    pub fn with_literal(mut self, values: Vec<AttrValue>) -> Self {
        self.literal = Some(values);
        self
    }
}

/// Type of an attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrType {
    Str,
    Int,
    /// Floating point; integers are accepted
    Float,
    Bool,
    /// Untyped dictionary
    Dict,
    List(Box<AttrType>),
    /// Dictionary following a nested schema
    DictSchema(Arc<DictSchema>),
}

impl AttrType {
    /// Shallow type test: nested dictionary schemas and list elements are
    /// checked by the checker, this only looks at the outer value.
    pub fn accepts(&self, value: &AttrValue) -> bool {
        match (self, value) {
            (AttrType::Str, AttrValue::Str(_)) => true,
            (AttrType::Int, AttrValue::Int(_)) => true,
            (AttrType::Float, AttrValue::Float(_) | AttrValue::Int(_)) => true,
            (AttrType::Bool, AttrValue::Bool(_)) => true,
            (AttrType::Dict | AttrType::DictSchema(_), AttrValue::Dict(_)) => true,
            (AttrType::List(inner), AttrValue::List(items)) => {
                items.iter().all(|item| inner.accepts(item))
            }
            _ => false,
        }
    }

    /// Whether the type can be written as a plain type string.
    fn is_simple(&self) -> bool {
        match self {
            AttrType::DictSchema(_) => false,
            AttrType::List(inner) => inner.is_simple(),
            _ => true,
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrType::Str => write!(f, "str"),
            AttrType::Int => write!(f, "int"),
            AttrType::Float => write!(f, "float"),
            AttrType::Bool => write!(f, "bool"),
            AttrType::Dict => write!(f, "dict"),
            AttrType::List(inner) => write!(f, "list[{}]", inner),
            AttrType::DictSchema(schema) => {
                write!(f, "{}", schema.schema_name.as_deref().unwrap_or("dict"))
            }
        }
    }
}

impl FromStr for AttrType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(inner) = trimmed
            .strip_prefix("list[")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            return Ok(AttrType::List(Box::new(inner.parse()?)));
        }
        match trimmed {
            "str" => Ok(AttrType::Str),
            "int" => Ok(AttrType::Int),
            "float" => Ok(AttrType::Float),
            "bool" => Ok(AttrType::Bool),
            "dict" => Ok(AttrType::Dict),
            other => Err(format!(
                "Invalid attribute type: '{}'. Expected one of: str, int, float, bool, dict, list[T]",
                other
            )),
        }
    }
}

/// JSON form of [`AttrType`]: a type string where possible, otherwise an
/// object.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AttrTypeRepr {
    Name(String),
    List { list: Box<AttrType> },
    Dict(Arc<DictSchema>),
}

impl Serialize for AttrType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let repr = match self {
            simple if simple.is_simple() => AttrTypeRepr::Name(simple.to_string()),
            AttrType::List(inner) => AttrTypeRepr::List {
                list: inner.clone(),
            },
            AttrType::DictSchema(schema) => AttrTypeRepr::Dict(schema.clone()),
            other => AttrTypeRepr::Name(other.to_string()),
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AttrType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match AttrTypeRepr::deserialize(deserializer)? {
            AttrTypeRepr::Name(name) => name.parse().map_err(serde::de::Error::custom),
            AttrTypeRepr::List { list } => Ok(AttrType::List(list)),
            AttrTypeRepr::Dict(schema) => Ok(AttrType::DictSchema(schema)),
        }
    }
}
