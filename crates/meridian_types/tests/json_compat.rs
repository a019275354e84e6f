//! JSON Compatibility Tests
//!
//! Value documents are exchanged with NumPy/xarray tooling, so the dtype
//! strings and document layout must stay stable.

use meridian_types::*;

/// Verify every dtype serializes to its NumPy array-interface string
/// These strings MUST remain stable for exported documents
#[test]
fn test_dtype_typestr_compatibility() {
    let typestrs = [
        (Dtype::Bool, "|b1"),
        (Dtype::Int8, "|i1"),
        (Dtype::Int16, "<i2"),
        (Dtype::Int32, "<i4"),
        (Dtype::Int64, "<i8"),
        (Dtype::UInt8, "|u1"),
        (Dtype::UInt16, "<u2"),
        (Dtype::UInt32, "<u4"),
        (Dtype::UInt64, "<u8"),
        (Dtype::Float32, "<f4"),
        (Dtype::Float64, "<f8"),
        (Dtype::Complex64, "<c8"),
        (Dtype::Complex128, "<c16"),
        (Dtype::Str, "<U"),
    ];

    for (dtype, expected) in typestrs {
        assert_eq!(
            serde_json::to_value(dtype).unwrap(),
            serde_json::Value::String(expected.to_string()),
            "Dtype {:?} should serialize as {}",
            dtype,
            expected
        );
    }
}

/// Verify big-endian and fixed-width string type strings are accepted
#[test]
fn test_foreign_typestrs_parse() {
    let parsed: Vec<Dtype> = serde_json::from_str(r#"[">f8", "=i4", "<U32", "|b1"]"#).unwrap();
    assert_eq!(
        parsed,
        vec![Dtype::Float64, Dtype::Int32, Dtype::Str, Dtype::Bool]
    );
}

/// Verify the labeled array document layout
#[test]
fn test_data_array_document_layout() {
    let array = DataArray::from_coords(
        ArrayData::from_f64(vec![1.0, 2.0]),
        vec![("time", ArrayData::from_i64(vec![10, 20]))],
    )
    .unwrap()
    .with_attr("units", "Jy");

    let json = serde_json::to_value(&array).unwrap();
    assert_eq!(json["dims"], serde_json::json!(["time"]));
    assert_eq!(json["data"]["dtype"], "<f8");
    assert_eq!(json["data"]["shape"], serde_json::json!([2]));
    assert_eq!(json["data"]["values"], serde_json::json!([1.0, 2.0]));
    assert_eq!(json["coords"]["time"]["data"]["dtype"], "<i8");
    assert_eq!(json["attrs"]["units"], "Jy");
}

/// Verify complex values are written as [re, im] pairs
#[test]
fn test_complex_values_layout() {
    let data = ArrayData::from_complex(vec![Complex64::new(1.5, -2.0)]);
    let json = serde_json::to_value(&data).unwrap();
    assert_eq!(json["values"], serde_json::json!([[1.5, -2.0]]));
}

/// Verify a lazy array carries shape but no values
#[test]
fn test_lazy_array_document() {
    let data = ArrayData::lazy(Dtype::Complex64, &[100, 4]);
    let json = serde_json::to_value(&data).unwrap();
    assert!(json.get("values").is_none());
    assert_eq!(json["shape"], serde_json::json!([100, 4]));

    let err = serde_json::from_str::<ArrayData>(r#"{"dtype": "<c8"}"#).unwrap_err();
    assert!(err.to_string().contains("shape"));
}

/// Verify dataset documents reject inconsistent dimension sizes
#[test]
fn test_dataset_document_size_conflict() {
    let json = r#"{
        "coords": {"time": {"dims": ["time"], "data": {"dtype": "<f8", "values": [0, 1, 2]}}},
        "data_vars": {"vis": {"dims": ["time"], "data": {"dtype": "<c16", "shape": [4]}}}
    }"#;
    let err = serde_json::from_str::<Dataset>(json).unwrap_err();
    assert!(err.to_string().contains("time"), "unexpected error: {}", err);
}

/// Verify uint64 values above i64::MAX survive a document round trip
#[test]
fn test_uint64_document_round_trip() {
    let json = serde_json::json!({
        "dims": ["x"],
        "data": {"dtype": "<u8", "values": [u64::MAX, 0, 3]}
    });
    let array: DataArray = serde_json::from_value(json).unwrap();
    assert_eq!(array.dtype(), Dtype::UInt64);

    let written = serde_json::to_value(&array).unwrap();
    assert_eq!(
        written["data"]["values"],
        serde_json::json!([u64::MAX, 0, 3])
    );
}

/// Verify out-of-range integers are rejected instead of saturating
#[test]
fn test_integer_overflow_rejected() {
    let err = serde_json::from_str::<ArrayData>(r#"{"dtype": "|i1", "values": [1e30]}"#)
        .unwrap_err();
    assert!(err.to_string().contains("cannot be stored"), "unexpected error: {}", err);

    let err = serde_json::from_str::<ArrayData>(r#"{"dtype": "<i8", "values": [18446744073709551615]}"#)
        .unwrap_err();
    assert!(err.to_string().contains("cannot be stored"), "unexpected error: {}", err);

    let err = serde_json::from_str::<ArrayData>(r#"{"dtype": "|u1", "values": [256]}"#).unwrap_err();
    assert!(err.to_string().contains("cannot be stored"), "unexpected error: {}", err);

    let err = ArrayData::from_values(&[AttrValue::Float(1e30)], Dtype::UInt64).unwrap_err();
    assert!(matches!(err, ValueError::InvalidValue { dtype: Dtype::UInt64, .. }));
}
