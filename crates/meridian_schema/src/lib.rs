//! Schema Derivation and Validation
//!
//! # Lifecycle
//!
//! 1. **Definition**: Classes are declared in TOML with annotated fields
//!    (data, coordinates, attributes, references to other classes)
//! 2. **Derivation**: A [`SchemaRegistry`] resolves references and produces
//!    [`ArraySchema`], [`DatasetSchema`] and [`DictSchema`] values once
//! 3. **Construction**: Builders assemble values in the described shape,
//!    filling defaults and index coordinates
//! 4. **Checking**: Values are compared against a schema and every
//!    discrepancy is collected in [`SchemaIssues`]. Nothing is thrown until
//!    the caller asks for it with [`SchemaIssues::expect`]
//! 5. **Exchange**: Schemas travel as JSON tagged with `"$class"`
//!
//! # Modules
//!
//! - [`metamodel`]: Schema types
//! - [`definition`]: Class definitions and their TOML form
//! - [`derive`]: Definition to schema resolution
//! - [`check`]: Issue reports for arrays, datasets and dicts
//! - [`construct`]: Schema-aware builders
//! - [`export`]: JSON export and import

pub mod check;
pub mod construct;
pub mod definition;
pub mod derive;
pub mod export;
pub mod metamodel;

pub use check::{
    check_array, check_array_with, check_dataset, check_dataset_with, check_dict,
    check_dict_with, CheckOptions, IssueKind, PathSegment, SchemaError, SchemaIssue,
    SchemaIssues, Severity,
};
pub use construct::{
    Arg, ArrayBuilder, ConstructError, DataInput, DatasetBuilder, DictBuilder, VariableInput,
};
pub use definition::{Annotation, AttrTypeDef, ClassDef, ClassKind, DefinitionFile, FieldDef};
pub use derive::{
    derive_array_schema, derive_dataset_schema, derive_dict_schema, DerivationError,
    SchemaRegistry,
};
pub use export::{
    export_schema_json, export_schema_json_file, import_schema_json, import_schema_json_file,
    ExportError, Schema,
};
pub use metamodel::{ArraySchema, ArraySchemaRef, AttrSchemaRef, AttrType, DatasetSchema, DictSchema};
