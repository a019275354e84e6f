#![allow(dead_code)]

use meridian_schema::{
    ArraySchema, ArraySchemaRef, AttrSchemaRef, AttrType, AttrTypeDef, ClassDef, DatasetSchema,
    DictSchema, FieldDef, SchemaRegistry,
};
use meridian_types::{attrs, ArrayData, AttrValue, Attrs, DataArray, Dataset, Dtype};
use std::sync::Arc;

pub const TEST_ARRAY: &str = "TestArray";
pub const TEST_DICT: &str = "TestDict";
pub const TEST_DATASET_COORD: &str = "TestDatasetCoord";
pub const TEST_DATASET: &str = "TestDataset";

/// The same classes as [`definitions`], in TOML.
pub const TEST_DEFINITIONS_TOML: &str = r#"
[[class]]
name = "TestArray"
kind = "array"
docstring = """
    Docstring of array schema

    Multiple lines!
    """

[[class.field]]
name = "data"
role = "data"
dims = ["coord"]
dtypes = ["complex128"]
docstring = "Docstring of data"

[[class.field]]
name = "coord"
role = "coord"
dims = ["coord"]
dtypes = ["float64"]
docstring = "Docstring of coordinate"

[[class.field]]
name = "attr1"
role = "attr"
type = "str"
docstring = "Required attribute"

[[class.field]]
name = "attr2"
role = "attr"
type = "int"
default = 123
docstring = "Required attribute with default"

[[class.field]]
name = "attr3"
role = "attr"
type = "int"
optional = true
docstring = "Optional attribute with default"

[[class]]
name = "TestDict"
kind = "dict"
docstring = """
    Docstring of dict schema

    Multiple lines!
    """

[[class.field]]
name = "attr1"
role = "value"
type = "str"
docstring = "Required attribute"

[[class.field]]
name = "attr2"
role = "value"
type = "int"
default = 123
docstring = "Required attribute with default"

[[class.field]]
name = "attr3"
role = "value"
type = "int"
optional = true
docstring = "Optional attribute with default"

[[class]]
name = "TestDatasetCoord"
kind = "array"
docstring = "Docstring of array schema for coordinate"

[[class.field]]
name = "data"
role = "data"
dims = ["coord"]
dtypes = ["float64"]
docstring = "Docstring of coordinate data"

[[class.field]]
name = "attr1"
role = "attr"
type = "str"
docstring = "Required attribute"

[[class.field]]
name = "attr2"
role = "attr"
type = "int"
default = 123
docstring = "Required attribute with default"

[[class.field]]
name = "attr3"
role = "attr"
type = "int"
optional = true
docstring = "Optional attribute with default"

[[class]]
name = "TestDataset"
kind = "dataset"
docstring = """
    Docstring of dataset schema

    Again multiple lines!
    """

[[class.field]]
name = "coord"
role = "coord_of"
schema = "TestDatasetCoord"
docstring = "Docstring of coordinate"

[[class.field]]
name = "coord2"
role = "coord"
dims = ["coord2"]
dtypes = ["int64"]
optional = true
docstring = "Docstring of second coordinate"

[[class.field]]
name = "data_var"
role = "data_of"
schema = "TestArray"
docstring = "Docstring of external data variable"

[[class.field]]
name = "data_var_simple"
role = "data"
dims = ["coord2"]
dtypes = ["float32"]
optional = true
docstring = "Docstring of simple optional data variable"

[[class.field]]
name = "attr1"
role = "attr"
type = "str"
docstring = "Required attribute"

[[class.field]]
name = "attr2"
role = "attr"
type = "int"
default = 123
docstring = "Required attribute with default"

[[class.field]]
name = "attr3"
role = "attr"
type = "int"
optional = true
docstring = "Optional attribute with default"
"#;

fn test_attrs(value_role: bool) -> Vec<FieldDef> {
    let field = |name: &str, ty| {
        if value_role {
            FieldDef::value(name, ty)
        } else {
            FieldDef::attr(name, ty)
        }
    };
    vec![
        field("attr1", AttrTypeDef::Str).with_docstring("Required attribute"),
        field("attr2", AttrTypeDef::Int)
            .with_default(123)
            .with_docstring("Required attribute with default"),
        field("attr3", AttrTypeDef::Int)
            .optional()
            .with_docstring("Optional attribute with default"),
    ]
}

fn with_fields(mut class: ClassDef, fields: Vec<FieldDef>) -> ClassDef {
    class.fields.extend(fields);
    class
}

/// Array, dict, dataset-coordinate and dataset classes used across tests
/// and benchmarks.
pub fn definitions() -> Vec<ClassDef> {
    let array = with_fields(
        ClassDef::array(TEST_ARRAY)
            .with_docstring("\n    Docstring of array schema\n\n    Multiple lines!\n    ")
            .field(
                FieldDef::data("data", &["coord"], &[Dtype::Complex128])
                    .with_docstring("Docstring of data"),
            )
            .field(
                FieldDef::coord("coord", &["coord"], &[Dtype::Float64])
                    .with_docstring("Docstring of coordinate"),
            ),
        test_attrs(false),
    );

    let dict = with_fields(
        ClassDef::dict(TEST_DICT)
            .with_docstring("\n    Docstring of dict schema\n\n    Multiple lines!\n    "),
        test_attrs(true),
    );

    let coord = with_fields(
        ClassDef::array(TEST_DATASET_COORD)
            .with_docstring("Docstring of array schema for coordinate")
            .field(
                FieldDef::data("data", &["coord"], &[Dtype::Float64])
                    .with_docstring("Docstring of coordinate data"),
            ),
        test_attrs(false),
    );

    let dataset = with_fields(
        ClassDef::dataset(TEST_DATASET)
            .with_docstring("\n    Docstring of dataset schema\n\n    Again multiple lines!\n    ")
            .field(
                FieldDef::coord_of("coord", TEST_DATASET_COORD)
                    .with_docstring("Docstring of coordinate"),
            )
            .field(
                FieldDef::coord("coord2", &["coord2"], &[Dtype::Int64])
                    .optional()
                    .with_docstring("Docstring of second coordinate"),
            )
            .field(
                FieldDef::data_of("data_var", TEST_ARRAY)
                    .with_docstring("Docstring of external data variable"),
            )
            .field(
                FieldDef::data("data_var_simple", &["coord2"], &[Dtype::Float32])
                    .optional()
                    .with_docstring("Docstring of simple optional data variable"),
            ),
        test_attrs(false),
    );

    vec![array, dict, coord, dataset]
}

pub fn registry() -> SchemaRegistry {
    SchemaRegistry::from_classes(definitions()).expect("test definitions register")
}

pub fn array_schema() -> ArraySchema {
    registry()
        .derive_array_schema(TEST_ARRAY)
        .expect("derive test array schema")
}

pub fn dict_schema() -> DictSchema {
    registry()
        .derive_dict_schema(TEST_DICT)
        .expect("derive test dict schema")
}

pub fn dataset_schema() -> DatasetSchema {
    registry()
        .derive_dataset_schema(TEST_DATASET)
        .expect("derive test dataset schema")
}

fn expected_attributes() -> Vec<AttrSchemaRef> {
    vec![
        AttrSchemaRef::required("attr1", AttrType::Str).with_docstring("Required attribute"),
        AttrSchemaRef::required("attr2", AttrType::Int)
            .with_default(123)
            .with_docstring("Required attribute with default"),
        AttrSchemaRef::optional("attr3", AttrType::Int)
            .with_docstring("Optional attribute with default"),
    ]
}

fn dims(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// The schema [`array_schema`] must derive, written out by hand.
pub fn expected_array_schema() -> ArraySchema {
    ArraySchema {
        schema_name: Some(TEST_ARRAY.to_string()),
        dimensions: vec![dims(&["coord"])],
        dtypes: vec![Dtype::Complex128],
        coordinates: vec![ArraySchemaRef::new(
            "coord",
            Arc::new(ArraySchema::simple(vec![dims(&["coord"])], vec![Dtype::Float64])),
        )
        .with_docstring("Docstring of coordinate")],
        attributes: expected_attributes(),
        class_docstring: Some("Docstring of array schema\n\nMultiple lines!".to_string()),
        data_docstring: Some("Docstring of data".to_string()),
    }
}

pub fn expected_dict_schema() -> DictSchema {
    DictSchema {
        schema_name: Some(TEST_DICT.to_string()),
        class_docstring: Some("Docstring of dict schema\n\nMultiple lines!".to_string()),
        attributes: expected_attributes(),
    }
}

pub fn expected_dataset_schema() -> DatasetSchema {
    let coord = ArraySchema {
        schema_name: Some(TEST_DATASET_COORD.to_string()),
        dimensions: vec![dims(&["coord"])],
        dtypes: vec![Dtype::Float64],
        coordinates: Vec::new(),
        attributes: expected_attributes(),
        class_docstring: Some("Docstring of array schema for coordinate".to_string()),
        data_docstring: Some("Docstring of coordinate data".to_string()),
    };
    DatasetSchema {
        schema_name: Some(TEST_DATASET.to_string()),
        dimensions: vec![dims(&["coord"]), dims(&["coord", "coord2"])],
        coordinates: vec![
            ArraySchemaRef::new("coord", Arc::new(coord)).with_docstring("Docstring of coordinate"),
            ArraySchemaRef::new(
                "coord2",
                Arc::new(ArraySchema::simple(vec![dims(&["coord2"])], vec![Dtype::Int64])),
            )
            .optional()
            .with_docstring("Docstring of second coordinate"),
        ],
        data_vars: vec![
            ArraySchemaRef::new("data_var", Arc::new(expected_array_schema()))
                .with_docstring("Docstring of external data variable"),
            ArraySchemaRef::new(
                "data_var_simple",
                Arc::new(ArraySchema::simple(vec![dims(&["coord2"])], vec![Dtype::Float32])),
            )
            .optional()
            .with_docstring("Docstring of simple optional data variable"),
        ],
        attributes: expected_attributes(),
        class_docstring: Some("Docstring of dataset schema\n\nAgain multiple lines!".to_string()),
    }
}

/// `{attr1: "str", attr2: 123, attr3: 345}`
pub fn full_attrs() -> Attrs {
    attrs([
        ("attr1", AttrValue::from("str")),
        ("attr2", AttrValue::from(123)),
        ("attr3", AttrValue::from(345)),
    ])
}

/// Ten complex zeros over `coord`, float coordinate `0..10`, all attributes.
pub fn test_array() -> DataArray {
    DataArray::from_coords(
        ArrayData::zeros(Dtype::Complex128, &[10]),
        vec![("coord", float_range(10))],
    )
    .expect("build test array")
    .with_attrs(full_attrs())
}

/// Like [`test_array`], with lazily evaluated data.
pub fn test_array_lazy() -> DataArray {
    DataArray::from_coords(
        ArrayData::lazy(Dtype::Complex128, &[10]),
        vec![("coord", float_range(10))],
    )
    .expect("build lazy test array")
    .with_attrs(full_attrs())
}

pub fn test_dict() -> Attrs {
    full_attrs()
}

/// Dataset with the required coordinate and data variable, all attributes.
pub fn test_dataset() -> Dataset {
    let coord = DataArray::new(float_range(10), ["coord"])
        .expect("build dataset coordinate")
        .with_attrs(full_attrs());
    let data_var = DataArray::new(ArrayData::zeros(Dtype::Complex128, &[10]), ["coord"])
        .expect("build data variable")
        .with_attrs(full_attrs());
    Dataset::new()
        .with_coord("coord", coord)
        .and_then(|ds| ds.with_data_var("data_var", data_var))
        .expect("build test dataset")
        .with_attrs(full_attrs())
}

/// [`test_dataset`] plus the optional `coord2` and `data_var_simple`.
pub fn test_dataset_with_optionals() -> Dataset {
    let coord2 = DataArray::new(int_range(25), ["coord2"]).expect("build coord2");
    let simple = DataArray::new(ArrayData::zeros(Dtype::Float32, &[25]), ["coord2"])
        .expect("build optional data variable");
    test_dataset()
        .with_coord("coord2", coord2)
        .and_then(|ds| ds.with_data_var("data_var_simple", simple))
        .expect("add optional members")
}

pub fn float_range(n: usize) -> ArrayData {
    ArrayData::arange(n, Dtype::Float64).expect("float range")
}

pub fn int_range(n: usize) -> ArrayData {
    ArrayData::arange(n, Dtype::Int64).expect("int range")
}
