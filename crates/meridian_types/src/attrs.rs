//! Attribute values attached to arrays, datasets and dictionaries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute mapping, ordered by key for stable output.
pub type Attrs = BTreeMap<String, AttrValue>;

/// A single attribute value.
///
/// Serialized untagged so attribute maps read as plain JSON objects. Variant
/// order matters for deserialization: integers are tried before floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<AttrValue>),
    Dict(BTreeMap<String, AttrValue>),
}

impl AttrValue {
    /// Name of the value's type as used in attribute schemas.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Bool(_) => "bool",
            AttrValue::Int(_) => "int",
            AttrValue::Float(_) => "float",
            AttrValue::Str(_) => "str",
            AttrValue::List(_) => "list",
            AttrValue::Dict(_) => "dict",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view of the value; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<String, AttrValue>> {
        match self {
            AttrValue::Dict(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(v) => write!(f, "{}", v),
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Str(v) => write!(f, "'{}'", v),
            AttrValue::List(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            AttrValue::Dict(map) => {
                write!(f, "{{")?;
                for (idx, (key, value)) in map.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "'{}': {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(value as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl<T: Into<AttrValue>> From<Vec<T>> for AttrValue {
    fn from(values: Vec<T>) -> Self {
        AttrValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, AttrValue>> for AttrValue {
    fn from(map: BTreeMap<String, AttrValue>) -> Self {
        AttrValue::Dict(map)
    }
}

/// Build an [`Attrs`] map from `(key, value)` pairs.
///
/// ```
/// use meridian_types::{attrs, AttrValue};
///
/// let a = attrs([("attr1", AttrValue::from("str")), ("attr2", AttrValue::from(123))]);
/// assert_eq!(a.len(), 2);
/// ```
pub fn attrs<K, V, I>(pairs: I) -> Attrs
where
    K: Into<String>,
    V: Into<AttrValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_json_prefers_int() {
        let value: AttrValue = serde_json::from_str("123").unwrap();
        assert_eq!(value, AttrValue::Int(123));
        let value: AttrValue = serde_json::from_str("1.5").unwrap();
        assert_eq!(value, AttrValue::Float(1.5));
        let value: AttrValue = serde_json::from_str("true").unwrap();
        assert_eq!(value, AttrValue::Bool(true));
    }

    #[test]
    fn test_nested_values() {
        let value: AttrValue =
            serde_json::from_str(r#"{"units": ["s"], "frame": {"type": "fk5"}}"#).unwrap();
        let dict = value.as_dict().unwrap();
        assert_eq!(dict["units"].as_list().unwrap()[0], AttrValue::from("s"));
        assert_eq!(value.type_name(), "dict");
    }

    #[test]
    fn test_display() {
        let value = AttrValue::from(vec!["a", "b"]);
        assert_eq!(value.to_string(), "['a', 'b']");
    }
}
