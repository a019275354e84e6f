//! Element data types for labeled arrays.
//!
//! [`Dtype`] is the single source of truth for array element types across the
//! workspace. Schemas list the dtypes they accept, values carry exactly one.
//!
//! # Wire format
//!
//! Dtypes serialize as NumPy array-interface type strings (`"<f8"`, `"<c16"`,
//! `"|b1"`, ...) so exported schemas stay readable by NumPy-based tooling.
//! Parsing is lenient and also accepts the common names (`float64`,
//! `complex`, `int`, `str`, ...).

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Canonical element type of an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dtype {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    /// Complex number made of two 32-bit floats
    Complex64,
    /// Complex number made of two 64-bit floats
    Complex128,
    /// Unicode string of any length
    Str,
}

/// Broad category of a dtype, used for promotion rules and string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DtypeKind {
    Bool,
    SignedInt,
    UnsignedInt,
    Float,
    Complex,
    Str,
}

impl Dtype {
    /// All supported dtypes, in promotion order.
    pub fn all() -> Vec<Dtype> {
        vec![
            Dtype::Bool,
            Dtype::Int8,
            Dtype::Int16,
            Dtype::Int32,
            Dtype::Int64,
            Dtype::UInt8,
            Dtype::UInt16,
            Dtype::UInt32,
            Dtype::UInt64,
            Dtype::Float32,
            Dtype::Float64,
            Dtype::Complex64,
            Dtype::Complex128,
            Dtype::Str,
        ]
    }

    pub fn kind(&self) -> DtypeKind {
        match self {
            Dtype::Bool => DtypeKind::Bool,
            Dtype::Int8 | Dtype::Int16 | Dtype::Int32 | Dtype::Int64 => DtypeKind::SignedInt,
            Dtype::UInt8 | Dtype::UInt16 | Dtype::UInt32 | Dtype::UInt64 => {
                DtypeKind::UnsignedInt
            }
            Dtype::Float32 | Dtype::Float64 => DtypeKind::Float,
            Dtype::Complex64 | Dtype::Complex128 => DtypeKind::Complex,
            Dtype::Str => DtypeKind::Str,
        }
    }

    /// Size of one element in bytes. Strings report 0 (variable width).
    pub fn itemsize(&self) -> usize {
        match self {
            Dtype::Bool | Dtype::Int8 | Dtype::UInt8 => 1,
            Dtype::Int16 | Dtype::UInt16 => 2,
            Dtype::Int32 | Dtype::UInt32 | Dtype::Float32 => 4,
            Dtype::Int64 | Dtype::UInt64 | Dtype::Float64 | Dtype::Complex64 => 8,
            Dtype::Complex128 => 16,
            Dtype::Str => 0,
        }
    }

    /// NumPy array-interface type string, e.g. `"<f8"`.
    pub fn typestr(&self) -> &'static str {
        match self {
            Dtype::Bool => "|b1",
            Dtype::Int8 => "|i1",
            Dtype::Int16 => "<i2",
            Dtype::Int32 => "<i4",
            Dtype::Int64 => "<i8",
            Dtype::UInt8 => "|u1",
            Dtype::UInt16 => "<u2",
            Dtype::UInt32 => "<u4",
            Dtype::UInt64 => "<u8",
            Dtype::Float32 => "<f4",
            Dtype::Float64 => "<f8",
            Dtype::Complex64 => "<c8",
            Dtype::Complex128 => "<c16",
            Dtype::Str => "<U",
        }
    }

    /// Human-readable name, e.g. `"float64"`.
    pub fn name(&self) -> &'static str {
        match self {
            Dtype::Bool => "bool",
            Dtype::Int8 => "int8",
            Dtype::Int16 => "int16",
            Dtype::Int32 => "int32",
            Dtype::Int64 => "int64",
            Dtype::UInt8 => "uint8",
            Dtype::UInt16 => "uint16",
            Dtype::UInt32 => "uint32",
            Dtype::UInt64 => "uint64",
            Dtype::Float32 => "float32",
            Dtype::Float64 => "float64",
            Dtype::Complex64 => "complex64",
            Dtype::Complex128 => "complex128",
            Dtype::Str => "str",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Dtype::Str | Dtype::Bool)
    }

    /// Whether two dtypes are interchangeable for schema matching.
    ///
    /// Strings compare by kind only since their width is not part of the type.
    pub fn matches(&self, other: &Dtype) -> bool {
        match (self.kind(), other.kind()) {
            (DtypeKind::Str, DtypeKind::Str) => true,
            _ => self == other,
        }
    }

    /// Whether every value of `self` is representable in `target`.
    pub fn can_cast_safely(&self, target: Dtype) -> bool {
        use DtypeKind as K;
        if *self == target {
            return true;
        }
        match (self.kind(), target.kind()) {
            (K::Str, _) | (_, K::Str) => false,
            (_, K::Bool) => false,
            (K::Bool, _) => true,
            (K::SignedInt, K::SignedInt) | (K::UnsignedInt, K::UnsignedInt) => {
                self.itemsize() <= target.itemsize()
            }
            (K::UnsignedInt, K::SignedInt) => self.itemsize() < target.itemsize(),
            (K::SignedInt, K::UnsignedInt) => false,
            (K::SignedInt | K::UnsignedInt, K::Float) => {
                self.itemsize() < target.itemsize() || target == Dtype::Float64
            }
            (K::SignedInt | K::UnsignedInt, K::Complex) => true,
            (K::Float, K::Float) => self.itemsize() <= target.itemsize(),
            (K::Float, K::Complex) => self.itemsize() * 2 <= target.itemsize(),
            (K::Complex, K::Complex) => self.itemsize() <= target.itemsize(),
            (K::Float | K::Complex, K::SignedInt | K::UnsignedInt) => false,
            (K::Complex, K::Float) => false,
        }
    }
}

impl Serialize for Dtype {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.typestr())
    }
}

impl<'de> Deserialize<'de> for Dtype {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Dtype::from_str(&raw).map_err(de::Error::custom)
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Dtype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("dtype is empty".to_string());
        }
        if let Some(dtype) = parse_typestr(trimmed) {
            return Ok(dtype);
        }

        let dtype = match trimmed.to_lowercase().as_str() {
            "bool" | "boolean" | "bool_" => Dtype::Bool,
            "int8" | "byte" => Dtype::Int8,
            "int16" | "short" => Dtype::Int16,
            "int32" | "intc" => Dtype::Int32,
            "int64" | "int" | "integer" | "long" => Dtype::Int64,
            "uint8" | "ubyte" => Dtype::UInt8,
            "uint16" | "ushort" => Dtype::UInt16,
            "uint32" | "uintc" => Dtype::UInt32,
            "uint64" | "uint" => Dtype::UInt64,
            "float32" | "single" => Dtype::Float32,
            "float64" | "float" | "double" => Dtype::Float64,
            "complex64" | "csingle" => Dtype::Complex64,
            "complex128" | "complex" | "cdouble" => Dtype::Complex128,
            "str" | "string" | "unicode" | "utf8" | "str_" => Dtype::Str,
            _ => {
                return Err(format!(
                    "Invalid dtype: '{}'. Expected a NumPy type string (e.g. '<f8') or one of: {}",
                    trimmed,
                    Dtype::all()
                        .iter()
                        .map(|d| d.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            }
        };
        Ok(dtype)
    }
}

/// Parse a NumPy array-interface string such as `"<f8"` or `"|b1"`.
///
/// Byte order markers are accepted but ignored; string types accept any width
/// (`"<U"`, `"<U12"`).
fn parse_typestr(raw: &str) -> Option<Dtype> {
    let body = raw.strip_prefix(['<', '>', '|', '=']).unwrap_or(raw);
    let mut chars = body.chars();
    let code = chars.next()?;
    let width = chars.as_str();
    if code == 'U' {
        return (width.is_empty() || width.parse::<usize>().is_ok()).then_some(Dtype::Str);
    }
    // Bare names like "float" fall through to the alias table.
    let width: usize = width.parse().ok()?;
    let dtype = match (code, width) {
        ('b', 1) => Dtype::Bool,
        ('i', 1) => Dtype::Int8,
        ('i', 2) => Dtype::Int16,
        ('i', 4) => Dtype::Int32,
        ('i', 8) => Dtype::Int64,
        ('u', 1) => Dtype::UInt8,
        ('u', 2) => Dtype::UInt16,
        ('u', 4) => Dtype::UInt32,
        ('u', 8) => Dtype::UInt64,
        ('f', 4) => Dtype::Float32,
        ('f', 8) => Dtype::Float64,
        ('c', 8) => Dtype::Complex64,
        ('c', 16) => Dtype::Complex128,
        _ => return None,
    };
    Some(dtype)
}
