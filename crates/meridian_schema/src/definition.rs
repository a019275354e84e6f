//! Annotated Class Definitions
//!
//! A definition is the annotated description a schema is derived from: a
//! named class of some [`ClassKind`] with ordered, role-tagged fields.
//! Definitions are plain data. They are built in code with the constructors
//! below or loaded from a TOML file:
//!
//! ```toml
//! [[class]]
//! name = "Visibility"
//! kind = "array"
//! docstring = "Complex visibilities"
//!
//! [[class.field]]
//! name = "data"
//! role = "data"
//! dims = [["time", "baseline"]]
//! dtypes = ["complex64", "complex128"]
//!
//! [[class.field]]
//! name = "units"
//! role = "attr"
//! type = "str"
//! default = "Jy"
//! ```

use crate::derive::DerivationError;
use meridian_types::{AttrValue, Dtype};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// What a class describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Array,
    Dataset,
    Dict,
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassKind::Array => write!(f, "array"),
            ClassKind::Dataset => write!(f, "dataset"),
            ClassKind::Dict => write!(f, "dict"),
        }
    }
}

/// An annotated class definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub kind: ClassKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldDef>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            docstring: None,
            fields: Vec::new(),
        }
    }

    pub fn array(name: impl Into<String>) -> Self {
        Self::new(name, ClassKind::Array)
    }

    pub fn dataset(name: impl Into<String>) -> Self {
        Self::new(name, ClassKind::Dataset)
    }

    pub fn dict(name: impl Into<String>) -> Self {
        Self::new(name, ClassKind::Dict)
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    /// Append a field
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

/// One annotated field of a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,

    #[serde(flatten)]
    pub annotation: Annotation,

    #[serde(default)]
    pub optional: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<AttrValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

/// The role annotation of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Annotation {
    /// The array's own data (array classes) or an inline data variable
    /// (dataset classes)
    Data {
        #[serde(deserialize_with = "orderings")]
        dims: Vec<Vec<String>>,
        dtypes: Vec<Dtype>,
    },
    /// An inline coordinate
    Coord {
        #[serde(deserialize_with = "orderings")]
        dims: Vec<Vec<String>>,
        dtypes: Vec<Dtype>,
    },
    /// A data variable following another array class
    DataOf { schema: String },
    /// A coordinate following another array class
    CoordOf { schema: String },
    /// An attribute
    Attr {
        #[serde(rename = "type")]
        attr_type: AttrTypeDef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        literal: Option<Vec<AttrValue>>,
    },
    /// A dictionary entry
    Value {
        #[serde(rename = "type")]
        attr_type: AttrTypeDef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        literal: Option<Vec<AttrValue>>,
    },
}

impl Annotation {
    pub fn role(&self) -> &'static str {
        match self {
            Annotation::Data { .. } => "data",
            Annotation::Coord { .. } => "coord",
            Annotation::DataOf { .. } => "data_of",
            Annotation::CoordOf { .. } => "coord_of",
            Annotation::Attr { .. } => "attr",
            Annotation::Value { .. } => "value",
        }
    }
}

/// Dimensions may be written as one ordering (`["a", "b"]`) or several
/// (`[["a", "b"], ["a"]]`).
fn orderings<'de, D>(deserializer: D) -> Result<Vec<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Dims {
        Many(Vec<Vec<String>>),
        One(Vec<String>),
    }

    Ok(match Dims::deserialize(deserializer)? {
        Dims::Many(many) => many,
        Dims::One(one) => vec![one],
    })
}

impl FieldDef {
    fn with_annotation(name: impl Into<String>, annotation: Annotation) -> Self {
        Self {
            name: name.into(),
            annotation,
            optional: false,
            default: None,
            docstring: None,
        }
    }

    /// Data field with a single dimension ordering
    pub fn data(name: impl Into<String>, dims: &[&str], dtypes: &[Dtype]) -> Self {
        Self::with_annotation(
            name,
            Annotation::Data {
                dims: vec![to_strings(dims)],
                dtypes: dtypes.to_vec(),
            },
        )
    }

    /// Inline coordinate with a single dimension ordering
    pub fn coord(name: impl Into<String>, dims: &[&str], dtypes: &[Dtype]) -> Self {
        Self::with_annotation(
            name,
            Annotation::Coord {
                dims: vec![to_strings(dims)],
                dtypes: dtypes.to_vec(),
            },
        )
    }

    pub fn data_of(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self::with_annotation(
            name,
            Annotation::DataOf {
                schema: schema.into(),
            },
        )
    }

    pub fn coord_of(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self::with_annotation(
            name,
            Annotation::CoordOf {
                schema: schema.into(),
            },
        )
    }

    pub fn attr(name: impl Into<String>, attr_type: AttrTypeDef) -> Self {
        Self::with_annotation(
            name,
            Annotation::Attr {
                attr_type,
                literal: None,
            },
        )
    }

    pub fn value(name: impl Into<String>, attr_type: AttrTypeDef) -> Self {
        Self::with_annotation(
            name,
            Annotation::Value {
                attr_type,
                literal: None,
            },
        )
    }

    /// Accept another dimension ordering (data and coordinate fields only).
    pub fn or_dims(mut self, dims: &[&str]) -> Self {
        if let Annotation::Data { dims: orderings, .. } | Annotation::Coord { dims: orderings, .. } =
            &mut self.annotation
        {
            orderings.push(to_strings(dims));
        }
        self
    }

    /// Restrict the accepted values (attribute and value fields only).
    pub fn with_literal(mut self, values: Vec<AttrValue>) -> Self {
        if let Annotation::Attr { literal, .. } | Annotation::Value { literal, .. } =
            &mut self.annotation
        {
            *literal = Some(values);
        }
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<AttrValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Attribute type as written in a definition. Unlike
/// [`crate::metamodel::AttrType`] it may name another class, which is
/// resolved to a dictionary schema during derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrTypeDef {
    Str,
    Int,
    Float,
    Bool,
    Dict,
    List(Box<AttrTypeDef>),
    /// Name of a dict class
    Class(String),
}

impl fmt::Display for AttrTypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrTypeDef::Str => write!(f, "str"),
            AttrTypeDef::Int => write!(f, "int"),
            AttrTypeDef::Float => write!(f, "float"),
            AttrTypeDef::Bool => write!(f, "bool"),
            AttrTypeDef::Dict => write!(f, "dict"),
            AttrTypeDef::List(inner) => write!(f, "list[{}]", inner),
            AttrTypeDef::Class(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for AttrTypeDef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(inner) = trimmed
            .strip_prefix("list[")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            return Ok(AttrTypeDef::List(Box::new(inner.parse()?)));
        }
        let parsed = match trimmed {
            "str" => AttrTypeDef::Str,
            "int" => AttrTypeDef::Int,
            "float" => AttrTypeDef::Float,
            "bool" => AttrTypeDef::Bool,
            "dict" => AttrTypeDef::Dict,
            name if is_identifier(name) => AttrTypeDef::Class(name.to_string()),
            other => return Err(format!("Invalid attribute type: '{}'", other)),
        };
        Ok(parsed)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

impl Serialize for AttrTypeDef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AttrTypeDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Top-level layout of a definitions file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefinitionFile {
    #[serde(default, rename = "class")]
    pub classes: Vec<ClassDef>,
}

impl DefinitionFile {
    pub fn from_toml_str(content: &str) -> Result<Self, DerivationError> {
        toml::from_str(content).map_err(|e| DerivationError::Parse(e.to_string()))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, DerivationError> {
        let content = std::fs::read_to_string(path).map_err(|source| DerivationError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// Normalise a class docstring: drop leading and trailing blank lines and
/// remove the indentation shared by all lines after the first.
pub fn clean_docstring(raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw.lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        if idx == 0 {
            cleaned.push(line.trim().to_string());
        } else {
            let stripped = line.get(indent..).unwrap_or_else(|| line.trim_start());
            cleaned.push(stripped.trim_end().to_string());
        }
    }
    while cleaned.first().is_some_and(|l| l.is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|l| l.is_empty()) {
        cleaned.pop();
    }
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_docstring() {
        let raw = "\n    Docstring of array schema\n\n    Multiple lines!\n    ";
        assert_eq!(
            clean_docstring(raw).unwrap(),
            "Docstring of array schema\n\nMultiple lines!"
        );
        assert_eq!(clean_docstring("One line").unwrap(), "One line");
        assert_eq!(
            clean_docstring("First\n      indented\n    less").unwrap(),
            "First\n  indented\nless"
        );
        assert!(clean_docstring("  \n  ").is_none());
    }

    #[test]
    fn test_attr_type_def_parse() {
        assert_eq!("str".parse::<AttrTypeDef>().unwrap(), AttrTypeDef::Str);
        assert_eq!(
            "list[Frame]".parse::<AttrTypeDef>().unwrap(),
            AttrTypeDef::List(Box::new(AttrTypeDef::Class("Frame".to_string())))
        );
        assert!("list[".parse::<AttrTypeDef>().is_err());
        assert!("9lives".parse::<AttrTypeDef>().is_err());
    }

    #[test]
    fn test_parse_toml_definitions() {
        let toml = r#"
[[class]]
name = "Coord"
kind = "array"
docstring = "Coordinate"

[[class.field]]
name = "data"
role = "data"
dims = ["coord"]
dtypes = ["float64"]

[[class.field]]
name = "units"
role = "attr"
type = "list[str]"
default = ["s"]

[[class]]
name = "Main"
kind = "dataset"

[[class.field]]
name = "coord"
role = "coord_of"
schema = "Coord"

[[class.field]]
name = "var"
role = "data"
dims = [["coord"], []]
dtypes = ["<c16"]
optional = true
"#;
        let file = DefinitionFile::from_toml_str(toml).unwrap();
        assert_eq!(file.classes.len(), 2);

        let coord = &file.classes[0];
        assert_eq!(coord.kind, ClassKind::Array);
        assert_eq!(
            coord.fields[0].annotation,
            Annotation::Data {
                dims: vec![vec!["coord".to_string()]],
                dtypes: vec![Dtype::Float64],
            }
        );
        assert_eq!(coord.fields[1].default, Some(AttrValue::from(vec!["s"])));

        let main = &file.classes[1];
        assert_eq!(main.fields[0].annotation.role(), "coord_of");
        assert!(main.fields[1].optional);
        match &main.fields[1].annotation {
            Annotation::Data { dims, .. } => assert_eq!(dims.len(), 2),
            other => panic!("unexpected annotation {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = DefinitionFile::from_toml_str("[[class]]\nname = 1").unwrap_err();
        assert!(matches!(err, DerivationError::Parse(_)));
    }

    #[test]
    fn test_builder_api() {
        let class = ClassDef::array("Vis")
            .with_docstring("Visibilities")
            .field(
                FieldDef::data("data", &["time", "baseline"], &[Dtype::Complex64])
                    .or_dims(&["time"]),
            )
            .field(
                FieldDef::attr("type", AttrTypeDef::Str)
                    .with_literal(vec![AttrValue::from("visibility")]),
            );
        assert_eq!(class.fields.len(), 2);
        match &class.fields[0].annotation {
            Annotation::Data { dims, .. } => assert_eq!(dims.len(), 2),
            other => panic!("unexpected annotation {:?}", other),
        }
    }
}
