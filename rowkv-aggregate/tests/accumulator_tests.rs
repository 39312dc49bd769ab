use rowkv_aggregate::{Accumulator, AccumulatorSet};
use rowkv_plan::{AggregationType, PreparedAggregation};
use rowkv_result::Error;
use rowkv_types::{ColumnType, Value};

fn acc(oper: AggregationType, input: Option<ColumnType>, output: ColumnType) -> Accumulator {
    Accumulator::new(oper, input, output).unwrap()
}

#[test]
fn singleton_inputs_yield_trivial_results() {
    let mut count = acc(AggregationType::Count, Some(ColumnType::Int32), ColumnType::Int64);
    count.update(&Value::Int32(7)).unwrap();
    assert_eq!(count.finalize().unwrap(), Value::Int64(1));

    let mut sum = acc(AggregationType::Sum, Some(ColumnType::Int32), ColumnType::Int64);
    sum.update(&Value::Int32(7)).unwrap();
    assert_eq!(sum.finalize().unwrap(), Value::Int64(7));

    let mut max = acc(AggregationType::Max, Some(ColumnType::Int32), ColumnType::Int32);
    max.update(&Value::Int32(7)).unwrap();
    assert_eq!(max.finalize().unwrap(), Value::Int32(7));

    let mut min = acc(AggregationType::Min, Some(ColumnType::Int32), ColumnType::Int32);
    min.update(&Value::Int32(7)).unwrap();
    assert_eq!(min.finalize().unwrap(), Value::Int32(7));

    // COUNT_WITH_NULL counts a null singleton too.
    let mut cwn = acc(
        AggregationType::CountWithNull,
        Some(ColumnType::Int32),
        ColumnType::Int64,
    );
    cwn.update(&Value::Null).unwrap();
    assert_eq!(cwn.finalize().unwrap(), Value::Int64(1));
}

#[test]
fn nulls_do_not_perturb_sum_max_min() {
    let mut sum = acc(AggregationType::Sum, Some(ColumnType::Int64), ColumnType::Int64);
    sum.update(&Value::Int64(10)).unwrap();
    let before = sum.finalize().unwrap();
    sum.update(&Value::Null).unwrap();
    assert_eq!(sum.finalize().unwrap(), before);

    let mut max = acc(AggregationType::Max, Some(ColumnType::Float64), ColumnType::Float64);
    max.update(&Value::Float64(2.5)).unwrap();
    max.update(&Value::Null).unwrap();
    assert_eq!(max.finalize().unwrap(), Value::Float64(2.5));
}

#[test]
fn all_null_groups_follow_operator_semantics() {
    let inputs = [Value::Null, Value::Null, Value::Null];

    let mut sum = acc(AggregationType::Sum, Some(ColumnType::Int64), ColumnType::Int64);
    let mut sum0 = acc(AggregationType::Sum0, Some(ColumnType::Int64), ColumnType::Int64);
    let mut count = acc(AggregationType::Count, Some(ColumnType::Int64), ColumnType::Int64);
    let mut cwn = acc(
        AggregationType::CountWithNull,
        Some(ColumnType::Int64),
        ColumnType::Int64,
    );
    let mut max = acc(AggregationType::Max, Some(ColumnType::Int64), ColumnType::Int64);
    for cell in &inputs {
        sum.update(cell).unwrap();
        sum0.update(cell).unwrap();
        count.update(cell).unwrap();
        cwn.update(cell).unwrap();
        max.update(cell).unwrap();
    }
    assert_eq!(sum.finalize().unwrap(), Value::Null);
    assert_eq!(sum0.finalize().unwrap(), Value::Int64(0));
    assert_eq!(count.finalize().unwrap(), Value::Int64(0));
    assert_eq!(cwn.finalize().unwrap(), Value::Int64(3));
    assert_eq!(max.finalize().unwrap(), Value::Null);
}

#[test]
fn sum_promotes_narrow_inputs() {
    let mut sum = acc(AggregationType::Sum, Some(ColumnType::Bool), ColumnType::Int64);
    sum.update(&Value::Bool(true)).unwrap();
    sum.update(&Value::Bool(false)).unwrap();
    sum.update(&Value::Bool(true)).unwrap();
    assert_eq!(sum.finalize().unwrap(), Value::Int64(2));

    let mut sum = acc(AggregationType::Sum, Some(ColumnType::Float32), ColumnType::Float64);
    sum.update(&Value::Float32(0.5)).unwrap();
    sum.update(&Value::Float32(0.25)).unwrap();
    assert_eq!(sum.finalize().unwrap(), Value::Float64(0.75));
}

#[test]
fn integer_sum_overflow_surfaces_at_finalize() {
    let mut sum = acc(AggregationType::Sum, Some(ColumnType::Int64), ColumnType::Int64);
    sum.update(&Value::Int64(i64::MAX)).unwrap();
    sum.update(&Value::Int64(1)).unwrap();
    assert!(matches!(sum.finalize(), Err(Error::Overflow(_))));
}

#[test]
fn float_sum_overflow_is_infinity_not_error() {
    let mut sum = acc(AggregationType::Sum, Some(ColumnType::Float64), ColumnType::Float64);
    sum.update(&Value::Float64(f64::MAX)).unwrap();
    sum.update(&Value::Float64(f64::MAX)).unwrap();
    assert_eq!(sum.finalize().unwrap(), Value::Float64(f64::INFINITY));
}

#[test]
fn extremes_order_strings_bytewise() {
    let mut max = acc(AggregationType::Max, Some(ColumnType::String), ColumnType::String);
    let mut min = acc(AggregationType::Min, Some(ColumnType::String), ColumnType::String);
    for s in ["pear", "apple", "zucchini", "fig"] {
        max.update(&Value::from(s)).unwrap();
        min.update(&Value::from(s)).unwrap();
    }
    assert_eq!(max.finalize().unwrap(), Value::from("zucchini"));
    assert_eq!(min.finalize().unwrap(), Value::from("apple"));
}

#[test]
fn sum_rejects_string_input_type() {
    assert!(matches!(
        Accumulator::new(
            AggregationType::Sum,
            Some(ColumnType::String),
            ColumnType::Int64
        ),
        Err(Error::TypeMismatch(_))
    ));
}

#[test]
fn sentinel_slots_see_virtual_nulls() {
    let aggs = vec![
        PreparedAggregation {
            oper: AggregationType::CountWithNull,
            input: None,
            input_type: None,
            output_type: ColumnType::Int64,
        },
        PreparedAggregation {
            oper: AggregationType::Count,
            input: None,
            input_type: None,
            output_type: ColumnType::Int64,
        },
        PreparedAggregation {
            oper: AggregationType::Sum,
            input: None,
            input_type: None,
            output_type: ColumnType::Int64,
        },
    ];
    let mut set = AccumulatorSet::new(&aggs).unwrap();
    for _ in 0..8 {
        set.update(&[Value::Int32(1)]).unwrap();
    }
    let mut out = Vec::new();
    set.finalize_into(&mut out).unwrap();
    // COUNT_WITH_NULL counts the virtual nulls, COUNT ignores them, SUM
    // never sees a value.
    assert_eq!(out, vec![Value::Int64(8), Value::Int64(0), Value::Null]);
}

#[test]
fn accumulator_set_routes_projected_columns() {
    let aggs = vec![
        PreparedAggregation {
            oper: AggregationType::Count,
            input: Some(0),
            input_type: Some(ColumnType::Int32),
            output_type: ColumnType::Int64,
        },
        PreparedAggregation {
            oper: AggregationType::Sum,
            input: Some(1),
            input_type: Some(ColumnType::Int64),
            output_type: ColumnType::Int64,
        },
    ];
    let mut set = AccumulatorSet::new(&aggs).unwrap();
    set.update(&[Value::Int32(1), Value::Int64(10)]).unwrap();
    set.update(&[Value::Null, Value::Int64(20)]).unwrap();
    set.update(&[Value::Int32(3), Value::Null]).unwrap();

    let mut out = Vec::new();
    set.finalize_into(&mut out).unwrap();
    assert_eq!(out, vec![Value::Int64(2), Value::Int64(30)]);
}
