use rowkv_codec::{KEY_HEADER_LEN, RecordDecoder, RecordEncoder, TUPLE_NAMESPACE};
use rowkv_result::Error;
use rowkv_types::{ColumnDescriptor, ColumnType, Schema, Tuple, Value};

/* --------------------------- Shared helpers ---------------------------- */

fn col(ty: ColumnType, is_key: bool, index: usize) -> ColumnDescriptor {
    ColumnDescriptor::new(ty, is_key, true, index)
}

/// The six-column harness schema: keys at physical indices 0, 4, 5.
fn harness_schema() -> Schema {
    Schema::new(
        1,
        1,
        vec![
            col(ColumnType::Bool, true, 0),
            col(ColumnType::Int32, false, 1),
            col(ColumnType::Float32, false, 2),
            col(ColumnType::Int64, false, 3),
            col(ColumnType::Float64, true, 4),
            col(ColumnType::String, true, 5),
        ],
    )
    .unwrap()
}

fn sample_tuple() -> Tuple {
    vec![
        Value::Bool(false),
        Value::Int32(1),
        Value::Float32(1.23),
        Value::Int64(100),
        Value::Float64(23.4545),
        Value::from("fdf45nrthn"),
    ]
}

/* ------------------------------ Tests ---------------------------------- */

#[test]
fn roundtrip_full_tuple() {
    let schema = harness_schema();
    let encoder = RecordEncoder::new(&schema);
    let decoder = RecordDecoder::new(&schema);

    let tuple = sample_tuple();
    let (key, value) = encoder.encode(&tuple).unwrap();
    assert_eq!(key[0], TUPLE_NAMESPACE);
    assert_eq!(decoder.decode(&key, &value).unwrap(), tuple);
}

#[test]
fn roundtrip_all_nulls() {
    let schema = harness_schema();
    let encoder = RecordEncoder::new(&schema);
    let decoder = RecordDecoder::new(&schema);

    let tuple: Tuple = vec![Value::Null; 6];
    let (key, value) = encoder.encode(&tuple).unwrap();
    assert_eq!(decoder.decode(&key, &value).unwrap(), tuple);
    // All key columns null: header + one marker per key column + tail.
    assert_eq!(key.len(), KEY_HEADER_LEN + 3 + 1);
}

#[test]
fn roundtrip_mixed_nulls() {
    let schema = harness_schema();
    let encoder = RecordEncoder::new(&schema);
    let decoder = RecordDecoder::new(&schema);

    let tuple = vec![
        Value::Bool(true),
        Value::Null,
        Value::Float32(3.23),
        Value::Null,
        Value::Null,
        Value::from(""),
    ];
    let (key, value) = encoder.encode(&tuple).unwrap();
    assert_eq!(decoder.decode(&key, &value).unwrap(), tuple);
}

#[test]
fn encoding_is_deterministic() {
    let schema = harness_schema();
    let encoder = RecordEncoder::new(&schema);
    let tuple = sample_tuple();
    assert_eq!(encoder.encode(&tuple).unwrap(), encoder.encode(&tuple).unwrap());
}

#[test]
fn key_order_follows_tuple_order() {
    let schema = harness_schema();
    let encoder = RecordEncoder::new(&schema);

    // Key columns in physical order are (bool, float64, string). Rows are
    // listed in ascending lexicographic order of those columns, nulls first.
    let rows: Vec<Tuple> = vec![
        vec![
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Null,
        ],
        vec![
            Value::Bool(false),
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Null,
            Value::from("b"),
        ],
        vec![
            Value::Bool(false),
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Float64(-1.5),
            Value::from("a"),
        ],
        vec![
            Value::Bool(false),
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Float64(2.0),
            Value::from("a"),
        ],
        vec![
            Value::Bool(false),
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Float64(2.0),
            Value::from("aa"),
        ],
        vec![
            Value::Bool(true),
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Float64(-100.0),
            Value::from(""),
        ],
    ];

    let keys: Vec<Vec<u8>> = rows
        .iter()
        .map(|t| encoder.encode(t).unwrap().0)
        .collect();
    for w in keys.windows(2) {
        assert!(w[0] < w[1], "keys out of order");
    }
}

#[test]
fn schema_permutation_yields_equal_tuples() {
    // Same logical columns, different physical layout: logical order is
    // (string, float64, int64, float32, int32, bool) and physical indices
    // run 0..6 in logical order.
    let permuted = Schema::new(
        1,
        1,
        vec![
            col(ColumnType::String, true, 0),
            col(ColumnType::Float64, true, 1),
            col(ColumnType::Int64, false, 2),
            col(ColumnType::Float32, false, 3),
            col(ColumnType::Int32, false, 4),
            col(ColumnType::Bool, true, 5),
        ],
    )
    .unwrap();

    let tuple = vec![
        Value::from("sssfdf45nrthn"),
        Value::Float64(3443.5656),
        Value::Int64(200),
        Value::Float32(2.23),
        Value::Int32(2),
        Value::Bool(true),
    ];

    let encoder = RecordEncoder::new(&permuted);
    let decoder = RecordDecoder::new(&permuted);
    let (key, value) = encoder.encode(&tuple).unwrap();
    assert_eq!(decoder.decode(&key, &value).unwrap(), tuple);
}

#[test]
fn rows_share_the_table_prefix() {
    let schema = harness_schema();
    let encoder = RecordEncoder::new(&schema);
    let prefix = encoder.key_prefix();

    let (k1, _) = encoder.encode(&sample_tuple()).unwrap();
    let (k2, _) = encoder.encode(&vec![Value::Null; 6]).unwrap();
    assert!(k1.starts_with(&prefix));
    assert!(k2.starts_with(&prefix));
}

#[test]
fn arity_mismatch_is_schema_mismatch() {
    let schema = harness_schema();
    let encoder = RecordEncoder::new(&schema);
    let err = encoder.encode(&vec![Value::Null; 5]).unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch(_)));
}

#[test]
fn null_in_non_nullable_column_is_schema_mismatch() {
    let schema = Schema::new(
        1,
        1,
        vec![ColumnDescriptor::new(ColumnType::Int64, true, false, 0)],
    )
    .unwrap();
    let encoder = RecordEncoder::new(&schema);
    let err = encoder.encode(&vec![Value::Null]).unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch(_)));
}

#[test]
fn wrong_dynamic_tag_is_type_mismatch() {
    let schema = harness_schema();
    let encoder = RecordEncoder::new(&schema);
    let mut tuple = sample_tuple();
    tuple[1] = Value::Int64(1);
    let err = encoder.encode(&tuple).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)));
}

#[test]
fn corrupt_rows_fail_to_decode() {
    let schema = harness_schema();
    let encoder = RecordEncoder::new(&schema);
    let decoder = RecordDecoder::new(&schema);
    let (key, value) = encoder.encode(&sample_tuple()).unwrap();

    // Truncated key.
    assert!(matches!(
        decoder.decode(&key[..key.len() - 2], &value),
        Err(Error::Decode(_))
    ));
    // Wrong namespace byte.
    let mut bad = key.clone();
    bad[0] = b'x';
    assert!(matches!(decoder.decode(&bad, &value), Err(Error::Decode(_))));
    // Truncated value payload.
    assert!(matches!(
        decoder.decode(&key, &value[..value.len() - 1]),
        Err(Error::Decode(_))
    ));
    // Trailing garbage on the value.
    let mut long = value.clone();
    long.push(0);
    assert!(matches!(decoder.decode(&key, &long), Err(Error::Decode(_))));
}

#[test]
fn foreign_table_or_version_is_rejected() {
    let schema = harness_schema();
    let other_table = Schema::new(2, 1, schema.columns().to_vec()).unwrap();
    let other_version = Schema::new(1, 2, schema.columns().to_vec()).unwrap();

    let (key, value) = RecordEncoder::new(&schema).encode(&sample_tuple()).unwrap();
    assert!(matches!(
        RecordDecoder::new(&other_table).decode(&key, &value),
        Err(Error::Decode(_))
    ));
    assert!(matches!(
        RecordDecoder::new(&other_version).decode(&key, &value),
        Err(Error::Decode(_))
    ));
}

#[test]
fn decode_key_only_leaves_value_columns_null() {
    let schema = harness_schema();
    let encoder = RecordEncoder::new(&schema);
    let decoder = RecordDecoder::new(&schema);

    let tuple = sample_tuple();
    let (key, _) = encoder.encode(&tuple).unwrap();
    let decoded = decoder.decode_key_only(&key).unwrap();
    assert_eq!(decoded[0], tuple[0]);
    assert_eq!(decoded[4], tuple[4]);
    assert_eq!(decoded[5], tuple[5]);
    assert_eq!(decoded[1], Value::Null);
    assert_eq!(decoded[2], Value::Null);
    assert_eq!(decoded[3], Value::Null);
}
