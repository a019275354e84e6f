//! Schema export and import.
//!
//! Schemas are exchanged as pretty-printed JSON tagged with `"$class"`.
//! Referenced schemas are written inline, so an exported document is
//! self-contained and imports without a registry.

use crate::definition::ClassKind;
use crate::metamodel::{ArraySchema, DatasetSchema, DictSchema};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Any of the three schema kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$class")]
pub enum Schema {
    #[serde(rename = "ArraySchema")]
    Array(ArraySchema),
    #[serde(rename = "DatasetSchema")]
    Dataset(DatasetSchema),
    #[serde(rename = "DictSchema")]
    Dict(DictSchema),
}

impl Schema {
    pub fn name(&self) -> Option<&str> {
        match self {
            Schema::Array(s) => s.schema_name.as_deref(),
            Schema::Dataset(s) => s.schema_name.as_deref(),
            Schema::Dict(s) => s.schema_name.as_deref(),
        }
    }

    pub fn kind(&self) -> ClassKind {
        match self {
            Schema::Array(_) => ClassKind::Array,
            Schema::Dataset(_) => ClassKind::Dataset,
            Schema::Dict(_) => ClassKind::Dict,
        }
    }

    pub fn docstring(&self) -> Option<&str> {
        match self {
            Schema::Array(s) => s.class_docstring.as_deref(),
            Schema::Dataset(s) => s.class_docstring.as_deref(),
            Schema::Dict(s) => s.class_docstring.as_deref(),
        }
    }

    pub fn as_array(&self) -> Option<&ArraySchema> {
        match self {
            Schema::Array(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_dataset(&self) -> Option<&DatasetSchema> {
        match self {
            Schema::Dataset(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&DictSchema> {
        match self {
            Schema::Dict(s) => Some(s),
            _ => None,
        }
    }

    /// SHA-256 of the compact JSON form, hex encoded.
    ///
    /// Equal schemas hash equally; any change to a field, docstring or
    /// referenced schema changes the digest.
    pub fn content_hash(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}

impl From<ArraySchema> for Schema {
    fn from(schema: ArraySchema) -> Self {
        Schema::Array(schema)
    }
}

impl From<DatasetSchema> for Schema {
    fn from(schema: DatasetSchema) -> Self {
        Schema::Dataset(schema)
    }
}

impl From<DictSchema> for Schema {
    fn from(schema: DictSchema) -> Self {
        Schema::Dict(schema)
    }
}

pub fn export_schema_json(schema: &Schema) -> Result<String> {
    Ok(serde_json::to_string_pretty(schema)?)
}

pub fn import_schema_json(json: &str) -> Result<Schema> {
    Ok(serde_json::from_str(json)?)
}

pub fn export_schema_json_file(schema: &Schema, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = export_schema_json(schema)?;
    std::fs::write(path, json).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        schema = schema.name().unwrap_or("<inline>"),
        path = %path.display(),
        "exported schema"
    );
    Ok(())
}

pub fn import_schema_json_file(path: impl AsRef<Path>) -> Result<Schema> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let schema = import_schema_json(&json)?;
    info!(
        schema = schema.name().unwrap_or("<inline>"),
        path = %path.display(),
        "imported schema"
    );
    Ok(schema)
}
