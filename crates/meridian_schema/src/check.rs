//! Schema Checking
//!
//! Checks labeled values against schemas and reports every discrepancy as a
//! [`SchemaIssue`]. Checking never fails: the caller decides what is fatal
//! by calling [`SchemaIssues::expect`], so many candidates can be checked
//! before anything is escalated.
//!
//! Undeclared members (coordinates, data variables, attributes) are
//! [`Severity::Advisory`] by default and [`Severity::Error`] with
//! [`CheckOptions::strict`].

use crate::metamodel::{ArraySchema, AttrSchemaRef, AttrType, DatasetSchema, DictSchema};
use meridian_types::{AttrValue, Attrs, DataArray, Dataset, Dtype};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// One step in the location of an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSegment {
    Coords(String),
    DataVars(String),
    Attrs(String),
    /// Element of a list attribute
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Coords(name) => write!(f, "coords.{}", name),
            PathSegment::DataVars(name) => write!(f, "data_vars.{}", name),
            PathSegment::Attrs(name) => write!(f, "attrs.{}", name),
            PathSegment::Index(idx) => write!(f, "[{}]", idx),
        }
    }
}

/// Types of schema issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingCoordinate,
    MissingDataVariable,
    MissingAttribute,
    UnexpectedCoordinate,
    UnexpectedDataVariable,
    UnexpectedAttribute,
    DtypeMismatch,
    DimensionMismatch,
    AttributeTypeMismatch,
    LiteralMismatch,
}

impl IssueKind {
    /// Whether the issue reports an undeclared member.
    pub fn is_unexpected(&self) -> bool {
        matches!(
            self,
            IssueKind::UnexpectedCoordinate
                | IssueKind::UnexpectedDataVariable
                | IssueKind::UnexpectedAttribute
        )
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::MissingCoordinate => write!(f, "Missing coordinate"),
            IssueKind::MissingDataVariable => write!(f, "Missing data variable"),
            IssueKind::MissingAttribute => write!(f, "Missing attribute"),
            IssueKind::UnexpectedCoordinate => write!(f, "Unexpected coordinate"),
            IssueKind::UnexpectedDataVariable => write!(f, "Unexpected data variable"),
            IssueKind::UnexpectedAttribute => write!(f, "Unexpected attribute"),
            IssueKind::DtypeMismatch => write!(f, "Dtype mismatch"),
            IssueKind::DimensionMismatch => write!(f, "Dimension mismatch"),
            IssueKind::AttributeTypeMismatch => write!(f, "Attribute type mismatch"),
            IssueKind::LiteralMismatch => write!(f, "Literal mismatch"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Advisory,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Advisory => write!(f, "advisory"),
        }
    }
}

/// A single discrepancy between a value and its schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaIssue {
    /// Location, outermost first; empty for the checked value itself
    pub path: Vec<PathSegment>,

    pub kind: IssueKind,

    pub severity: Severity,

    pub message: String,

    /// What was found, if anything
    pub found: Option<String>,

    /// What would have been accepted
    pub expected: Vec<String>,
}

impl SchemaIssue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            kind,
            severity: Severity::Error,
            message: message.into(),
            found: None,
            expected: Vec::new(),
        }
    }

    pub fn with_found(mut self, found: impl Into<String>) -> Self {
        self.found = Some(found.into());
        self
    }

    pub fn with_expected<I, S>(mut self, expected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected = expected.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Dotted location, e.g. `coords.coord.attrs.attr1`.
    pub fn path_string(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            if !out.is_empty() && !matches!(segment, PathSegment::Index(_)) {
                out.push('.');
            }
            out.push_str(&segment.to_string());
        }
        out
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path_string();
        if path.is_empty() {
            write!(f, "[{}] {}: {}", self.severity, self.kind, self.message)?;
        } else {
            write!(f, "[{}] {} at {}: {}", self.severity, self.kind, path, self.message)?;
        }
        if let Some(found) = &self.found {
            write!(f, " (found {}", found)?;
            if !self.expected.is_empty() {
                write!(f, ", expected {}", self.expected.join(" or "))?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Collected result of a check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaIssues {
    issues: Vec<SchemaIssue>,
}

impl SchemaIssues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: SchemaIssue) {
        self.issues.push(issue);
    }

    /// Append all issues of `other`.
    pub fn merge(&mut self, other: SchemaIssues) {
        self.issues.extend(other.issues);
    }

    /// Re-root every issue under `segment`.
    pub fn at(mut self, segment: PathSegment) -> Self {
        for issue in &mut self.issues {
            issue.path.insert(0, segment.clone());
        }
        self
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SchemaIssue> {
        self.issues.iter()
    }

    pub fn as_slice(&self) -> &[SchemaIssue] {
        &self.issues
    }

    pub fn errors(&self) -> impl Iterator<Item = &SchemaIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn advisories(&self) -> impl Iterator<Item = &SchemaIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Advisory)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Escalate: fail if any error-severity issue was collected. Advisory
    /// issues are returned to the caller on success.
    pub fn expect(self) -> Result<SchemaIssues, SchemaError> {
        if self.has_errors() {
            Err(SchemaError { issues: self })
        } else {
            Ok(self)
        }
    }
}

impl fmt::Display for SchemaIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return write!(f, "No schema issues");
        }
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

impl IntoIterator for SchemaIssues {
    type Item = SchemaIssue;
    type IntoIter = std::vec::IntoIter<SchemaIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

impl<'a> IntoIterator for &'a SchemaIssues {
    type Item = &'a SchemaIssue;
    type IntoIter = std::slice::Iter<'a, SchemaIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}

impl FromIterator<SchemaIssue> for SchemaIssues {
    fn from_iter<T: IntoIterator<Item = SchemaIssue>>(iter: T) -> Self {
        Self {
            issues: iter.into_iter().collect(),
        }
    }
}

impl std::ops::AddAssign for SchemaIssues {
    fn add_assign(&mut self, other: SchemaIssues) {
        self.merge(other);
    }
}

/// Escalated check failure.
#[derive(Debug, Error)]
#[error("{} schema error(s):\n{}", .issues.errors().count(), .issues)]
pub struct SchemaError {
    pub issues: SchemaIssues,
}

/// Check behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOptions {
    /// Report undeclared members as errors instead of advisories
    #[serde(default)]
    pub strict: bool,
}

impl CheckOptions {
    pub fn strict() -> Self {
        Self { strict: true }
    }

    fn extra_severity(&self) -> Severity {
        if self.strict {
            Severity::Error
        } else {
            Severity::Advisory
        }
    }
}

/// Which undeclared members an array check reports.
#[derive(Debug, Clone, Copy)]
struct Extras<'a> {
    coords: bool,
    attrs: bool,
    /// Undeclared attributes on coordinates
    coord_attrs: bool,
    /// Enclosing dataset; its required coordinates are reported missing
    /// there, not again on each data variable
    dataset: Option<&'a DatasetSchema>,
}

impl Extras<'static> {
    const ALL: Extras<'static> = Extras {
        coords: true,
        attrs: true,
        coord_attrs: true,
        dataset: None,
    };

    /// A data variable inside a dataset sees the dataset coordinates; their
    /// extras are reported once at dataset level.
    const DATA_VAR: Extras<'static> = Extras {
        coords: false,
        attrs: true,
        coord_attrs: false,
        dataset: None,
    };
}

impl Extras<'_> {
    fn within<'d>(self, dataset: &'d DatasetSchema) -> Extras<'d> {
        Extras {
            coords: self.coords,
            attrs: self.attrs,
            coord_attrs: self.coord_attrs,
            dataset: Some(dataset),
        }
    }

    fn reported_by_dataset(&self, coord: &str) -> bool {
        self.dataset
            .and_then(|dataset| dataset.coordinate(coord))
            .is_some_and(|declared| !declared.optional)
    }
}

pub fn check_array(array: &DataArray, schema: &ArraySchema) -> SchemaIssues {
    check_array_with(array, schema, CheckOptions::default())
}

/// Check a labeled array: dimensions, dtype, coordinates and attributes.
pub fn check_array_with(
    array: &DataArray,
    schema: &ArraySchema,
    options: CheckOptions,
) -> SchemaIssues {
    let issues = Checker { options }.array(array, schema, Extras::ALL);
    debug!(
        schema = schema.schema_name.as_deref().unwrap_or("<inline>"),
        issues = issues.len(),
        "checked array"
    );
    issues
}

pub fn check_dataset(dataset: &Dataset, schema: &DatasetSchema) -> SchemaIssues {
    check_dataset_with(dataset, schema, CheckOptions::default())
}

/// Check a dataset: dimension combination, coordinates, data variables and
/// attributes.
pub fn check_dataset_with(
    dataset: &Dataset,
    schema: &DatasetSchema,
    options: CheckOptions,
) -> SchemaIssues {
    let issues = Checker { options }.dataset(dataset, schema);
    debug!(
        schema = schema.schema_name.as_deref().unwrap_or("<inline>"),
        issues = issues.len(),
        "checked dataset"
    );
    issues
}

pub fn check_dict(dict: &Attrs, schema: &DictSchema) -> SchemaIssues {
    check_dict_with(dict, schema, CheckOptions::default())
}

/// Check a dictionary of attribute values.
pub fn check_dict_with(dict: &Attrs, schema: &DictSchema, options: CheckOptions) -> SchemaIssues {
    let issues = Checker { options }.attributes(dict, &schema.attributes, true);
    debug!(
        schema = schema.schema_name.as_deref().unwrap_or("<inline>"),
        issues = issues.len(),
        "checked dict"
    );
    issues
}

/// Issues for a single attribute value, as the checker would report them.
pub(crate) fn attr_value_issues(
    value: &AttrValue,
    attr_type: &AttrType,
    literal: Option<&[AttrValue]>,
) -> SchemaIssues {
    Checker {
        options: CheckOptions::default(),
    }
    .attr_value(value, attr_type, literal)
}

struct Checker {
    options: CheckOptions,
}

impl Checker {
    fn unexpected(&self, kind: IssueKind, segment: PathSegment, name: &str) -> SchemaIssue {
        let what = match kind {
            IssueKind::UnexpectedCoordinate => "coordinate",
            IssueKind::UnexpectedDataVariable => "data variable",
            _ => "attribute",
        };
        SchemaIssue::new(kind, format!("Unexpected {} '{}'", what, name))
            .with_path(vec![segment])
            .with_found(name)
            .with_severity(self.options.extra_severity())
    }

    fn array(&self, array: &DataArray, schema: &ArraySchema, extras: Extras<'_>) -> SchemaIssues {
        let mut issues = SchemaIssues::new();

        if !schema.accepts_dims(array.dims()) {
            issues.push(
                SchemaIssue::new(
                    IssueKind::DimensionMismatch,
                    format!(
                        "Dimensions {:?} match none of the accepted orderings",
                        array.dims()
                    ),
                )
                .with_found(format!("{:?}", array.dims()))
                .with_expected(schema.dimensions.iter().map(|d| format!("{:?}", d))),
            );
        }

        issues.merge(self.dtype(array.dtype(), &schema.dtypes));

        let coord_extras = Extras {
            coords: true,
            attrs: extras.coord_attrs,
            coord_attrs: extras.coord_attrs,
            dataset: None,
        };
        for coord_schema in &schema.coordinates {
            match array.coord(&coord_schema.name) {
                Some(coord) => issues.merge(
                    self.array(coord, coord_schema, coord_extras)
                        .at(PathSegment::Coords(coord_schema.name.clone())),
                ),
                None if !coord_schema.optional
                    && !extras.reported_by_dataset(&coord_schema.name) => issues.push(
                    SchemaIssue::new(
                        IssueKind::MissingCoordinate,
                        format!("Required coordinate '{}' is missing", coord_schema.name),
                    )
                    .with_path(vec![PathSegment::Coords(coord_schema.name.clone())])
                    .with_expected([coord_schema.name.clone()]),
                ),
                None => {}
            }
        }
        if extras.coords {
            for name in array.coords().keys() {
                if schema.coordinate(name).is_none() {
                    issues.push(self.unexpected(
                        IssueKind::UnexpectedCoordinate,
                        PathSegment::Coords(name.clone()),
                        name,
                    ));
                }
            }
        }

        issues.merge(self.attributes(array.attrs(), &schema.attributes, extras.attrs));
        issues
    }

    fn dtype(&self, dtype: Dtype, accepted: &[Dtype]) -> SchemaIssues {
        let mut issues = SchemaIssues::new();
        if !accepted.iter().any(|d| d.matches(&dtype)) {
            issues.push(
                SchemaIssue::new(
                    IssueKind::DtypeMismatch,
                    format!("Dtype {} is not accepted", dtype),
                )
                .with_found(dtype.name())
                .with_expected(accepted.iter().map(|d| d.name())),
            );
        }
        issues
    }

    fn dataset(&self, dataset: &Dataset, schema: &DatasetSchema) -> SchemaIssues {
        let mut issues = SchemaIssues::new();

        let dims = dataset.dims();
        if !schema.accepts_dims(&dims) {
            issues.push(
                SchemaIssue::new(
                    IssueKind::DimensionMismatch,
                    format!("Dataset dimensions {:?} match no accepted combination", dims),
                )
                .with_found(format!("{:?}", dims))
                .with_expected(schema.dimensions.iter().map(|d| format!("{:?}", d))),
            );
        }

        for coord_schema in &schema.coordinates {
            match dataset.coord(&coord_schema.name) {
                Some(coord) => issues.merge(
                    self.array(coord, coord_schema, Extras::ALL)
                        .at(PathSegment::Coords(coord_schema.name.clone())),
                ),
                None if !coord_schema.optional => issues.push(
                    SchemaIssue::new(
                        IssueKind::MissingCoordinate,
                        format!("Required coordinate '{}' is missing", coord_schema.name),
                    )
                    .with_path(vec![PathSegment::Coords(coord_schema.name.clone())])
                    .with_expected([coord_schema.name.clone()]),
                ),
                None => {}
            }
        }
        for name in dataset.coords().keys() {
            if schema.coordinate(name).is_none() {
                issues.push(self.unexpected(
                    IssueKind::UnexpectedCoordinate,
                    PathSegment::Coords(name.clone()),
                    name,
                ));
            }
        }

        for var_schema in &schema.data_vars {
            match dataset.variable(&var_schema.name) {
                Some(var) => issues.merge(
                    self.array(&var, var_schema, Extras::DATA_VAR.within(schema))
                        .at(PathSegment::DataVars(var_schema.name.clone())),
                ),
                None if !var_schema.optional => issues.push(
                    SchemaIssue::new(
                        IssueKind::MissingDataVariable,
                        format!("Required data variable '{}' is missing", var_schema.name),
                    )
                    .with_path(vec![PathSegment::DataVars(var_schema.name.clone())])
                    .with_expected([var_schema.name.clone()]),
                ),
                None => {}
            }
        }
        for name in dataset.data_vars().keys() {
            if schema.data_var(name).is_none() {
                issues.push(self.unexpected(
                    IssueKind::UnexpectedDataVariable,
                    PathSegment::DataVars(name.clone()),
                    name,
                ));
            }
        }

        issues.merge(self.attributes(dataset.attrs(), &schema.attributes, true));
        issues
    }

    fn attributes(
        &self,
        attrs: &BTreeMap<String, AttrValue>,
        declared: &[AttrSchemaRef],
        report_extras: bool,
    ) -> SchemaIssues {
        let mut issues = SchemaIssues::new();

        for attr in declared {
            match attrs.get(&attr.name) {
                Some(value) => issues.merge(
                    self.attr_value(value, &attr.attr_type, attr.literal.as_deref())
                        .at(PathSegment::Attrs(attr.name.clone())),
                ),
                None if !attr.optional => {
                    let message = match &attr.default {
                        Some(default) => format!(
                            "Required attribute '{}' is missing; its default {} was not applied",
                            attr.name, default
                        ),
                        None => format!("Required attribute '{}' is missing", attr.name),
                    };
                    issues.push(
                        SchemaIssue::new(IssueKind::MissingAttribute, message)
                            .with_path(vec![PathSegment::Attrs(attr.name.clone())])
                            .with_expected([attr.name.clone()]),
                    );
                }
                None => {}
            }
        }

        if report_extras {
            for name in attrs.keys() {
                if !declared.iter().any(|a| &a.name == name) {
                    issues.push(self.unexpected(
                        IssueKind::UnexpectedAttribute,
                        PathSegment::Attrs(name.clone()),
                        name,
                    ));
                }
            }
        }
        issues
    }

    fn attr_value(
        &self,
        value: &AttrValue,
        attr_type: &AttrType,
        literal: Option<&[AttrValue]>,
    ) -> SchemaIssues {
        let mut issues = SchemaIssues::new();

        match (attr_type, value) {
            (AttrType::List(inner), AttrValue::List(items)) => {
                for (idx, item) in items.iter().enumerate() {
                    issues.merge(self.attr_value(item, inner, None).at(PathSegment::Index(idx)));
                }
            }
            (AttrType::DictSchema(schema), AttrValue::Dict(map)) => {
                issues.merge(self.attributes(map, &schema.attributes, true));
            }
            _ if attr_type.accepts(value) => {}
            _ => {
                issues.push(
                    SchemaIssue::new(
                        IssueKind::AttributeTypeMismatch,
                        format!("Expected {}, found {} {}", attr_type, value.type_name(), value),
                    )
                    .with_found(value.type_name())
                    .with_expected([attr_type.to_string()]),
                );
                return issues;
            }
        }

        if let Some(allowed) = literal {
            if !allowed.contains(value) {
                issues.push(
                    SchemaIssue::new(
                        IssueKind::LiteralMismatch,
                        format!("Value {} is not one of the allowed values", value),
                    )
                    .with_found(value.to_string())
                    .with_expected(allowed.iter().map(|v| v.to_string())),
                );
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metamodel::ArraySchemaRef;
    use meridian_types::{attrs, ArrayData};
    use std::sync::Arc;

    fn dims(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn array_schema() -> ArraySchema {
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

    fn valid_array() -> DataArray {
        DataArray::from_coords(
            ArrayData::zeros(Dtype::Complex128, &[10]),
            vec![("coord", ArrayData::arange(10, Dtype::Float64).unwrap())],
        )
        .unwrap()
        .with_attrs(attrs([
            ("attr1", AttrValue::from("str")),
            ("attr2", AttrValue::from(123)),
            ("attr3", AttrValue::from(345)),
        ]))
    }

    #[test]
    fn test_valid_array_has_no_issues() {
        let issues = check_array(&valid_array(), &array_schema());
        assert!(issues.is_empty(), "{}", issues);
        assert!(issues.expect().is_ok());
    }

    #[test]
    fn test_missing_default_attr_mentions_default() {
        let mut array = valid_array();
        array.attrs_mut().remove("attr2");
        let issues = check_array(&array, &array_schema());
        assert_eq!(issues.len(), 1);
        let issue = &issues.as_slice()[0];
        assert_eq!(issue.kind, IssueKind::MissingAttribute);
        assert!(issue.message.contains("default 123 was not applied"));
    }

    #[test]
    fn test_dtype_and_dims_mismatch() {
        let array = DataArray::new(ArrayData::zeros(Dtype::Float32, &[10]), ["other"]).unwrap()
            .with_attr("attr1", "str")
            .with_attr("attr2", 1);
        let issues = check_array(&array, &array_schema());
        let kinds: Vec<IssueKind> = issues.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                IssueKind::DimensionMismatch,
                IssueKind::DtypeMismatch,
                IssueKind::MissingCoordinate
            ]
        );
        let dtype_issue = &issues.as_slice()[1];
        assert_eq!(dtype_issue.found.as_deref(), Some("float32"));
        assert_eq!(dtype_issue.expected, vec!["complex128".to_string()]);
    }

    #[test]
    fn test_coordinate_issues_are_nested() {
        let array = DataArray::from_coords(
            ArrayData::zeros(Dtype::Complex128, &[3]),
            vec![("coord", ArrayData::from_i64(vec![0, 1, 2]))],
        )
        .unwrap()
        .with_attrs(attrs([("attr1", "s")]))
        .with_attr("attr2", 5);
        let issues = check_array(&array, &array_schema());
        assert_eq!(issues.len(), 1);
        let issue = &issues.as_slice()[0];
        assert_eq!(issue.kind, IssueKind::DtypeMismatch);
        assert_eq!(issue.path_string(), "coords.coord");
    }

    #[test]
    fn test_extras_are_advisory_unless_strict() {
        let array = valid_array().with_attr("attr4", "asd");
        let issues = check_array(&array, &array_schema());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues.as_slice()[0].kind, IssueKind::UnexpectedAttribute);
        assert_eq!(issues.as_slice()[0].severity, Severity::Advisory);
        assert!(issues.expect().is_ok());

        let strict = check_array_with(&array, &array_schema(), CheckOptions::strict());
        let err = strict.expect().unwrap_err();
        assert!(err.to_string().contains("attr4"));
    }

    #[test]
    fn test_attribute_types() {
        let schema = DictSchema {
            schema_name: None,
            class_docstring: None,
            attributes: vec![
                AttrSchemaRef::required("f", AttrType::Float),
                AttrSchemaRef::required("i", AttrType::Int),
                AttrSchemaRef::required("l", AttrType::List(Box::new(AttrType::Str))),
                AttrSchemaRef::required("kind", AttrType::Str)
                    .with_literal(vec![AttrValue::from("a"), AttrValue::from("b")]),
            ],
        };
        let dict = attrs([
            ("f", AttrValue::from(1)),
            ("i", AttrValue::from(1.5)),
            ("l", AttrValue::List(vec![AttrValue::from("x"), AttrValue::from(2)])),
            ("kind", AttrValue::from("c")),
        ]);
        let issues = check_dict(&dict, &schema);
        let summary: Vec<(IssueKind, String)> = issues
            .iter()
            .map(|i| (i.kind, i.path_string()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (IssueKind::AttributeTypeMismatch, "attrs.i".to_string()),
                (IssueKind::AttributeTypeMismatch, "attrs.l[1]".to_string()),
                (IssueKind::LiteralMismatch, "attrs.kind".to_string()),
            ]
        );
        let type_issue = &issues.as_slice()[0];
        assert_eq!(type_issue.found.as_deref(), Some("float"));
        assert_eq!(type_issue.expected, vec!["int".to_string()]);
    }

    #[test]
    fn test_nested_dict_schema() {
        let frame = Arc::new(DictSchema {
            schema_name: Some("Frame".to_string()),
            class_docstring: None,
            attributes: vec![AttrSchemaRef::required("type", AttrType::Str)],
        });
        let schema = DictSchema {
            schema_name: None,
            class_docstring: None,
            attributes: vec![AttrSchemaRef::required("frame", AttrType::DictSchema(frame))],
        };
        let dict = attrs([(
            "frame",
            AttrValue::Dict(attrs([("units", AttrValue::from("rad"))])),
        )]);
        let issues = check_dict(&dict, &schema);
        let paths: Vec<String> = issues.iter().map(|i| i.path_string()).collect();
        assert_eq!(paths, vec!["attrs.frame.attrs.type", "attrs.frame.attrs.units"]);
        assert_eq!(issues.as_slice()[0].kind, IssueKind::MissingAttribute);
        assert_eq!(issues.as_slice()[1].kind, IssueKind::UnexpectedAttribute);
    }

    #[test]
    fn test_issue_display() {
        let issue = SchemaIssue::new(IssueKind::DtypeMismatch, "Dtype float32 is not accepted")
            .with_found("float32")
            .with_expected(["complex64", "complex128"]);
        let issues: SchemaIssues = vec![issue].into_iter().collect();
        let issues = issues.at(PathSegment::Coords("time".to_string()));
        let text = issues.to_string();
        assert!(text.contains("at coords.time"));
        assert!(text.contains("expected complex64 or complex128"));
    }

    #[test]
    fn test_issues_serialize_as_list() {
        let mut issues = SchemaIssues::new();
        issues.push(SchemaIssue::new(IssueKind::MissingAttribute, "missing"));
        let json = serde_json::to_value(&issues).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["kind"], "missing_attribute");
        assert_eq!(json[0]["severity"], "error");
    }
}
