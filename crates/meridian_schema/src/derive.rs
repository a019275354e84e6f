//! Schema Derivation
//!
//! Turns annotated [`ClassDef`]s into metamodel schemas. The
//! [`SchemaRegistry`] is the indirection table from class name to
//! definition; references (`data_of`, `coord_of`, attribute types naming a
//! dict class) are resolved through it.
//!
//! Within one derivation every referenced class is derived once and shared
//! by `Arc`. Reference cycles are rejected. Malformed definitions fail here,
//! never later at check time.

use crate::check::attr_value_issues;
use crate::definition::{
    clean_docstring, Annotation, AttrTypeDef, ClassDef, ClassKind, DefinitionFile, FieldDef,
};
use crate::export::Schema;
use crate::metamodel::{
    ArraySchema, ArraySchemaRef, AttrSchemaRef, AttrType, DatasetSchema, DictSchema,
};
use meridian_types::{AttrValue, Dtype};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors raised while deriving schemas from definitions.
#[derive(Debug, Error)]
pub enum DerivationError {
    #[error("Unknown class '{0}'")]
    UnknownClass(String),

    #[error("Class '{0}' is defined more than once")]
    DuplicateClass(String),

    #[error("Class '{class}' field '{field}' refers to unknown class '{target}'")]
    UnresolvedReference {
        class: String,
        field: String,
        target: String,
    },

    #[error("Class '{class}' field '{field}' refers to {found} class '{target}', expected a {expected} class")]
    WrongReferenceKind {
        class: String,
        field: String,
        target: String,
        expected: ClassKind,
        found: ClassKind,
    },

    #[error("Class '{class}' is a {found} class, expected a {expected} class")]
    WrongClassKind {
        class: String,
        expected: ClassKind,
        found: ClassKind,
    },

    #[error("Cyclic reference: {}", .chain.join(" -> "))]
    CyclicReference { chain: Vec<String> },

    #[error("Array class '{0}' has no data field")]
    MissingDataField(String),

    #[error("Array class '{class}' has more than one data field: {fields:?}")]
    MultipleDataFields { class: String, fields: Vec<String> },

    #[error("Field '{field}' of {kind} class '{class}' has role '{role}', which {kind} classes do not allow")]
    InvalidField {
        class: String,
        field: String,
        kind: ClassKind,
        role: &'static str,
    },

    #[error("Class '{class}' declares field '{field}' more than once")]
    DuplicateField { class: String, field: String },

    #[error("Class '{class}' field '{field}' declares no dimension ordering")]
    EmptyDimensions { class: String, field: String },

    #[error("Class '{class}' field '{field}' declares no dtype")]
    EmptyDtypes { class: String, field: String },

    #[error("Class '{class}' coordinate '{field}' uses dimensions {dims:?} outside the array dimensions {array_dims:?}")]
    ConflictingDimensions {
        class: String,
        field: String,
        dims: Vec<String>,
        array_dims: Vec<String>,
    },

    #[error("Class '{class}' data variable '{field}' uses dimension '{dim}' which is not a declared coordinate")]
    UndeclaredDimension {
        class: String,
        field: String,
        dim: String,
    },

    #[error("Class '{class}' field '{field}' default {default} does not match type {expected}")]
    InvalidDefault {
        class: String,
        field: String,
        default: String,
        expected: String,
    },

    #[error("Invalid definitions: {0}")]
    Parse(String),

    #[error("Failed to read definitions from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DerivationError>;

/// Class definitions indexed by name, in registration order.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    classes: Vec<ClassDef>,
    index: HashMap<String, usize>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of definitions.
    pub fn from_classes(classes: impl IntoIterator<Item = ClassDef>) -> Result<Self> {
        let mut registry = Self::new();
        for class in classes {
            registry.register(class)?;
        }
        Ok(registry)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::from_classes(DefinitionFile::from_toml_str(content)?.classes)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        Self::from_classes(DefinitionFile::from_toml_file(path)?.classes)
    }

    pub fn register(&mut self, class: ClassDef) -> Result<()> {
        if self.index.contains_key(&class.name) {
            return Err(DerivationError::DuplicateClass(class.name));
        }
        self.index.insert(class.name.clone(), self.classes.len());
        self.classes.push(class);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ClassDef> {
        self.index.get(name).map(|idx| &self.classes[*idx])
    }

    pub fn classes(&self) -> &[ClassDef] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn derive_array_schema(&self, name: &str) -> Result<ArraySchema> {
        let schema = Deriver::new(self).array(name, None)?;
        Ok(Arc::try_unwrap(schema).unwrap_or_else(|shared| (*shared).clone()))
    }

    pub fn derive_dataset_schema(&self, name: &str) -> Result<DatasetSchema> {
        Deriver::new(self).dataset(name)
    }

    pub fn derive_dict_schema(&self, name: &str) -> Result<DictSchema> {
        let schema = Deriver::new(self).dict(name, None)?;
        Ok(Arc::try_unwrap(schema).unwrap_or_else(|shared| (*shared).clone()))
    }

    /// Derive the schema of any class, dispatching on its kind.
    pub fn derive(&self, name: &str) -> Result<Schema> {
        Deriver::new(self).any(name)
    }

    /// Derive every registered class, in registration order. Referenced
    /// classes are shared between the results.
    pub fn derive_all(&self) -> Result<Vec<Schema>> {
        let mut deriver = Deriver::new(self);
        self.classes
            .iter()
            .map(|class| deriver.any(&class.name))
            .collect()
    }
}

/// Derive the array schema of `name`.
pub fn derive_array_schema(registry: &SchemaRegistry, name: &str) -> Result<ArraySchema> {
    registry.derive_array_schema(name)
}

/// Derive the dataset schema of `name`.
pub fn derive_dataset_schema(registry: &SchemaRegistry, name: &str) -> Result<DatasetSchema> {
    registry.derive_dataset_schema(name)
}

/// Derive the dict schema of `name`.
pub fn derive_dict_schema(registry: &SchemaRegistry, name: &str) -> Result<DictSchema> {
    registry.derive_dict_schema(name)
}

/// Which field referenced the class being derived, for error reporting.
type Referrer<'a> = Option<(&'a str, &'a str)>;

/// One derivation pass: caches derived classes and tracks the classes in
/// progress for cycle detection.
struct Deriver<'r> {
    registry: &'r SchemaRegistry,
    arrays: HashMap<String, Arc<ArraySchema>>,
    dicts: HashMap<String, Arc<DictSchema>>,
    in_progress: Vec<String>,
}

impl<'r> Deriver<'r> {
    fn new(registry: &'r SchemaRegistry) -> Self {
        Self {
            registry,
            arrays: HashMap::new(),
            dicts: HashMap::new(),
            in_progress: Vec::new(),
        }
    }

    fn any(&mut self, name: &str) -> Result<Schema> {
        let class = self.lookup(name, None)?;
        Ok(match class.kind {
            ClassKind::Array => Schema::Array(self.array(name, None)?.as_ref().clone()),
            ClassKind::Dict => Schema::Dict(self.dict(name, None)?.as_ref().clone()),
            ClassKind::Dataset => Schema::Dataset(self.dataset(name)?),
        })
    }

    fn lookup(&self, name: &str, referrer: Referrer<'_>) -> Result<&'r ClassDef> {
        self.registry.get(name).ok_or_else(|| match referrer {
            Some((class, field)) => DerivationError::UnresolvedReference {
                class: class.to_string(),
                field: field.to_string(),
                target: name.to_string(),
            },
            None => DerivationError::UnknownClass(name.to_string()),
        })
    }

    fn lookup_kind(
        &self,
        name: &str,
        expected: ClassKind,
        referrer: Referrer<'_>,
    ) -> Result<&'r ClassDef> {
        let class = self.lookup(name, referrer)?;
        if class.kind != expected {
            return Err(match referrer {
                Some((from, field)) => DerivationError::WrongReferenceKind {
                    class: from.to_string(),
                    field: field.to_string(),
                    target: name.to_string(),
                    expected,
                    found: class.kind,
                },
                None => DerivationError::WrongClassKind {
                    class: name.to_string(),
                    expected,
                    found: class.kind,
                },
            });
        }
        Ok(class)
    }

    fn enter(&mut self, name: &str) -> Result<()> {
        if let Some(start) = self.in_progress.iter().position(|n| n == name) {
            let mut chain = self.in_progress[start..].to_vec();
            chain.push(name.to_string());
            return Err(DerivationError::CyclicReference { chain });
        }
        self.in_progress.push(name.to_string());
        Ok(())
    }

    fn leave(&mut self) {
        self.in_progress.pop();
    }

    fn array(&mut self, name: &str, referrer: Referrer<'_>) -> Result<Arc<ArraySchema>> {
        if let Some(schema) = self.arrays.get(name) {
            return Ok(schema.clone());
        }
        let class = self.lookup_kind(name, ClassKind::Array, referrer)?;
        self.enter(name)?;
        let derived = self.array_body(class);
        self.leave();
        let schema = Arc::new(derived?);
        self.arrays.insert(name.to_string(), schema.clone());
        debug!(
            class = name,
            coordinates = schema.coordinates.len(),
            attributes = schema.attributes.len(),
            "derived array schema"
        );
        Ok(schema)
    }

    fn array_body(&mut self, class: &'r ClassDef) -> Result<ArraySchema> {
        check_unique_fields(class)?;

        let data_fields: Vec<(&FieldDef, &Vec<Vec<String>>, &Vec<Dtype>)> = class
            .fields
            .iter()
            .filter_map(|f| match &f.annotation {
                Annotation::Data { dims, dtypes } => Some((f, dims, dtypes)),
                _ => None,
            })
            .collect();
        let (data_field, dimensions, dtypes) = match data_fields.as_slice() {
            [] => return Err(DerivationError::MissingDataField(class.name.clone())),
            [(field, dims, dtypes)] => {
                check_dims_and_dtypes(class, field, dims, dtypes)?;
                (*field, (*dims).clone(), (*dtypes).clone())
            }
            many => {
                return Err(DerivationError::MultipleDataFields {
                    class: class.name.clone(),
                    fields: many.iter().map(|(f, _, _)| f.name.clone()).collect(),
                })
            }
        };
        let array_dims: Vec<String> = {
            let mut seen = Vec::new();
            for dim in dimensions.iter().flatten() {
                if !seen.contains(dim) {
                    seen.push(dim.clone());
                }
            }
            seen
        };

        let mut coordinates = Vec::new();
        let mut attributes = Vec::new();
        for field in &class.fields {
            match &field.annotation {
                Annotation::Data { .. } => {}
                Annotation::Coord { .. } | Annotation::CoordOf { .. } => {
                    let coord = self.array_ref(class, field)?;
                    for ordering in &coord.dimensions {
                        if ordering.iter().any(|d| !array_dims.contains(d)) {
                            return Err(DerivationError::ConflictingDimensions {
                                class: class.name.clone(),
                                field: field.name.clone(),
                                dims: ordering.clone(),
                                array_dims: array_dims.clone(),
                            });
                        }
                    }
                    coordinates.push(coord);
                }
                Annotation::Attr { attr_type, literal } => {
                    attributes.push(self.attr_ref(class, field, attr_type, literal)?);
                }
                other => return Err(invalid_field(class, field, other)),
            }
        }

        Ok(ArraySchema {
            schema_name: Some(class.name.clone()),
            dimensions,
            dtypes,
            coordinates,
            attributes,
            class_docstring: class.docstring.as_deref().and_then(clean_docstring),
            data_docstring: data_field.docstring.as_deref().and_then(clean_docstring),
        })
    }

    fn dataset(&mut self, name: &str) -> Result<DatasetSchema> {
        let class = self.lookup_kind(name, ClassKind::Dataset, None)?;
        self.enter(name)?;
        let derived = self.dataset_body(class);
        self.leave();
        let schema = derived?;
        debug!(
            class = name,
            coordinates = schema.coordinates.len(),
            data_vars = schema.data_vars.len(),
            combinations = schema.dimensions.len(),
            "derived dataset schema"
        );
        Ok(schema)
    }

    fn dataset_body(&mut self, class: &'r ClassDef) -> Result<DatasetSchema> {
        check_unique_fields(class)?;

        let mut coordinates = Vec::new();
        let mut data_vars = Vec::new();
        let mut attributes = Vec::new();
        for field in &class.fields {
            match &field.annotation {
                Annotation::Coord { .. } | Annotation::CoordOf { .. } => {
                    coordinates.push(self.array_ref(class, field)?);
                }
                Annotation::Data { .. } | Annotation::DataOf { .. } => {
                    data_vars.push((field, self.array_ref(class, field)?));
                }
                Annotation::Attr { attr_type, literal } => {
                    attributes.push(self.attr_ref(class, field, attr_type, literal)?);
                }
                other => return Err(invalid_field(class, field, other)),
            }
        }

        let coord_names: HashSet<&str> = coordinates.iter().map(|c| c.name.as_str()).collect();
        for (field, var) in &data_vars {
            if let Some(dim) = var
                .dimension_names()
                .into_iter()
                .find(|dim| !coord_names.contains(dim))
            {
                return Err(DerivationError::UndeclaredDimension {
                    class: class.name.clone(),
                    field: field.name.clone(),
                    dim: dim.to_string(),
                });
            }
        }
        let data_vars: Vec<ArraySchemaRef> = data_vars.into_iter().map(|(_, var)| var).collect();

        Ok(DatasetSchema {
            schema_name: Some(class.name.clone()),
            dimensions: dataset_dimensions(&coordinates, &data_vars),
            coordinates,
            data_vars,
            attributes,
            class_docstring: class.docstring.as_deref().and_then(clean_docstring),
        })
    }

    fn dict(&mut self, name: &str, referrer: Referrer<'_>) -> Result<Arc<DictSchema>> {
        if let Some(schema) = self.dicts.get(name) {
            return Ok(schema.clone());
        }
        let class = self.lookup_kind(name, ClassKind::Dict, referrer)?;
        self.enter(name)?;
        let derived = self.dict_body(class);
        self.leave();
        let schema = Arc::new(derived?);
        self.dicts.insert(name.to_string(), schema.clone());
        debug!(class = name, attributes = schema.attributes.len(), "derived dict schema");
        Ok(schema)
    }

    fn dict_body(&mut self, class: &'r ClassDef) -> Result<DictSchema> {
        check_unique_fields(class)?;

        let mut attributes = Vec::new();
        for field in &class.fields {
            match &field.annotation {
                Annotation::Value { attr_type, literal } | Annotation::Attr { attr_type, literal } => {
                    attributes.push(self.attr_ref(class, field, attr_type, literal)?);
                }
                other => return Err(invalid_field(class, field, other)),
            }
        }

        Ok(DictSchema {
            schema_name: Some(class.name.clone()),
            class_docstring: class.docstring.as_deref().and_then(clean_docstring),
            attributes,
        })
    }

    /// Reference to an inline or class-defined array schema.
    fn array_ref(&mut self, class: &'r ClassDef, field: &'r FieldDef) -> Result<ArraySchemaRef> {
        let schema = match &field.annotation {
            Annotation::Data { dims, dtypes } | Annotation::Coord { dims, dtypes } => {
                check_dims_and_dtypes(class, field, dims, dtypes)?;
                Arc::new(ArraySchema::simple(dims.clone(), dtypes.clone()))
            }
            Annotation::DataOf { schema } | Annotation::CoordOf { schema } => {
                self.array(schema, Some((&class.name, &field.name)))?
            }
            other => return Err(invalid_field(class, field, other)),
        };
        Ok(ArraySchemaRef {
            name: field.name.clone(),
            schema,
            optional: field.optional,
            default: field.default.clone(),
            docstring: field.docstring.as_deref().and_then(clean_docstring),
        })
    }

    fn attr_ref(
        &mut self,
        class: &'r ClassDef,
        field: &'r FieldDef,
        attr_type: &AttrTypeDef,
        literal: &Option<Vec<AttrValue>>,
    ) -> Result<AttrSchemaRef> {
        let resolved = self.attr_type(class, field, attr_type)?;
        if let Some(default) = &field.default {
            if attr_value_issues(default, &resolved, literal.as_deref()).has_errors() {
                return Err(DerivationError::InvalidDefault {
                    class: class.name.clone(),
                    field: field.name.clone(),
                    default: default.to_string(),
                    expected: resolved.to_string(),
                });
            }
        }
        Ok(AttrSchemaRef {
            name: field.name.clone(),
            attr_type: resolved,
            optional: field.optional,
            default: field.default.clone(),
            docstring: field.docstring.as_deref().and_then(clean_docstring),
            literal: literal.clone(),
        })
    }

    fn attr_type(
        &mut self,
        class: &'r ClassDef,
        field: &'r FieldDef,
        def: &AttrTypeDef,
    ) -> Result<AttrType> {
        Ok(match def {
            AttrTypeDef::Str => AttrType::Str,
            AttrTypeDef::Int => AttrType::Int,
            AttrTypeDef::Float => AttrType::Float,
            AttrTypeDef::Bool => AttrType::Bool,
            AttrTypeDef::Dict => AttrType::Dict,
            AttrTypeDef::List(inner) => AttrType::List(Box::new(self.attr_type(class, field, inner)?)),
            AttrTypeDef::Class(target) => {
                AttrType::DictSchema(self.dict(target, Some((&class.name, &field.name)))?)
            }
        })
    }
}

fn check_unique_fields(class: &ClassDef) -> Result<()> {
    let mut seen = HashSet::new();
    for field in &class.fields {
        if !seen.insert(field.name.as_str()) {
            return Err(DerivationError::DuplicateField {
                class: class.name.clone(),
                field: field.name.clone(),
            });
        }
    }
    Ok(())
}

fn check_dims_and_dtypes(
    class: &ClassDef,
    field: &FieldDef,
    dims: &[Vec<String>],
    dtypes: &[Dtype],
) -> Result<()> {
    if dims.is_empty() {
        return Err(DerivationError::EmptyDimensions {
            class: class.name.clone(),
            field: field.name.clone(),
        });
    }
    if dtypes.is_empty() {
        return Err(DerivationError::EmptyDtypes {
            class: class.name.clone(),
            field: field.name.clone(),
        });
    }
    Ok(())
}

fn invalid_field(class: &ClassDef, field: &FieldDef, annotation: &Annotation) -> DerivationError {
    DerivationError::InvalidField {
        class: class.name.clone(),
        field: field.name.clone(),
        kind: class.kind,
        role: annotation.role(),
    }
}

/// Acceptable dimension combinations of a dataset.
///
/// The first ordering of every required member forms the base combination.
/// Each ordering of each optional member, added to the base, forms another.
/// Combinations equal as sets are kept once, in order of first appearance.
pub fn dataset_dimensions(
    coordinates: &[ArraySchemaRef],
    data_vars: &[ArraySchemaRef],
) -> Vec<Vec<String>> {
    let members = || coordinates.iter().chain(data_vars.iter());

    let mut base: Vec<String> = Vec::new();
    for member in members().filter(|m| !m.optional) {
        if let Some(first) = member.dimensions.first() {
            extend_unique(&mut base, first);
        }
    }

    let mut combinations = vec![base.clone()];
    for member in members().filter(|m| m.optional) {
        for ordering in &member.dimensions {
            let mut combination = base.clone();
            extend_unique(&mut combination, ordering);
            let as_set = |dims: &[String]| dims.iter().cloned().collect::<BTreeSet<_>>();
            let key = as_set(&combination);
            if !combinations.iter().any(|existing| as_set(existing) == key) {
                combinations.push(combination);
            }
        }
    }
    combinations
}

fn extend_unique(target: &mut Vec<String>, dims: &[String]) {
    for dim in dims {
        if !target.contains(dim) {
            target.push(dim.clone());
        }
    }
}
