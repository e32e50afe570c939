// Round-trip laws: encoding a native value and decoding the text must
// reproduce the original dims and data (up to the documented vector
// orientation loss).
use matjson::api::{
    CellArray, DecodeOptions, EncodeOptions, LogicalArray, NumArray, StructArray, StructValue,
    Value, decode, encode,
};

fn roundtrip(value: &Value) -> Value {
    let text = encode(value, &EncodeOptions::new());
    decode(&text, &DecodeOptions::new()).expect("roundtrip decode")
}

fn num_array(extents: Vec<usize>) -> Value {
    let numel: usize = extents.iter().product();
    let data = (0..numel).map(|index| index as f64).collect();
    Value::NumArray(NumArray::new(extents, data).unwrap())
}

#[test]
fn column_vectors_roundtrip_exactly() {
    let value = Value::NumArray(NumArray::column(vec![1.0, 2.5, -3.0]));
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn row_vectors_come_back_as_columns() {
    let row = Value::NumArray(NumArray::new(vec![1, 3], vec![1.0, 2.0, 3.0]).unwrap());
    let expected = Value::NumArray(NumArray::column(vec![1.0, 2.0, 3.0]));
    assert_eq!(roundtrip(&row), expected);
}

#[test]
fn matrices_roundtrip_exactly() {
    let value = num_array(vec![2, 3]);
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn three_dimensional_arrays_roundtrip_exactly() {
    let value = num_array(vec![2, 3, 2]);
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn interior_singleton_axes_roundtrip_exactly() {
    let value = num_array(vec![2, 1, 2]);
    assert_eq!(roundtrip(&value), value);
    let value = num_array(vec![2, 1, 4, 3]);
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn leading_singleton_axes_roundtrip_exactly() {
    let value = num_array(vec![1, 2, 3]);
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn empty_arrays_roundtrip() {
    let value = Value::NumArray(NumArray::empty());
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn logical_matrices_roundtrip_exactly() {
    let value = Value::LogicalArray(
        LogicalArray::new(vec![2, 2], vec![true, false, false, true]).unwrap(),
    );
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn nan_elements_survive_a_default_roundtrip() {
    // NaN becomes null on encode and null becomes NaN inside a numeric
    // array on decode, so the cycle is closed.
    let value = Value::NumArray(NumArray::column(vec![1.0, f64::NAN, 3.0]));
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn scalar_structs_roundtrip() {
    let mut record = StructValue::new();
    record.insert("name".to_string(), Value::from("mat"));
    record.insert("count".to_string(), Value::Num(3.0));
    record.insert(
        "flags".to_string(),
        Value::LogicalArray(LogicalArray::column(vec![true, false])),
    );
    let value = Value::Struct(record);
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn struct_arrays_roundtrip() {
    let array = StructArray::new(
        vec![2, 1],
        vec![
            ("a".to_string(), vec![Value::Num(1.0), Value::Num(3.0)]),
            ("b".to_string(), vec![Value::Num(2.0), Value::Num(4.0)]),
        ],
    )
    .unwrap();
    let value = Value::StructArray(array);
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn mixed_cells_roundtrip() {
    let value = Value::Cell(CellArray::column(vec![
        Value::Num(1.0),
        Value::from("two"),
        Value::LogicalArray(LogicalArray::column(vec![true, false])),
    ]));
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn nested_cells_roundtrip() {
    let inner = CellArray::column(vec![Value::from("foo"), Value::from("bar")]);
    let value = Value::Cell(CellArray::column(vec![
        Value::from("foo"),
        Value::Cell(inner),
    ]));
    assert_eq!(roundtrip(&value), value);
}
