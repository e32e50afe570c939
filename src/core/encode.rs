//! Purpose: Render native values as JSON writer events.
//! Exports: `EncodeOptions`, `encode`.
//! Role: Shape-preserving encoder; nests JSON arrays so a decode of the
//! Role: output reproduces the original dimensions.
//! Invariants: Arrays emit in column-major element order; the recursion is
//! Invariants: parameterized by the immutable original dims plus a nesting
//! Invariants: level, never by hidden state.
//! Invariants: Cells and struct arrays flatten (their shape is not nested);
//! Invariants: vectors flatten to a single JSON array.
//! Invariants: Encoding a well-formed value cannot fail.

use crate::core::value::{Dims, StructArray, Value};
use crate::json::write::JsonWriter;

#[derive(Clone, Debug)]
pub struct EncodeOptions {
    convert_nonfinite: bool,
    pretty: bool,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self {
            convert_nonfinite: true,
            pretty: false,
        }
    }

    /// When enabled (the default), NaN and the infinities encode as `null`;
    /// otherwise they encode as the non-standard literal tokens.
    pub fn with_convert_nonfinite(mut self, enabled: bool) -> Self {
        self.convert_nonfinite = enabled;
        self
    }

    pub fn with_pretty(mut self, enabled: bool) -> Self {
        self.pretty = enabled;
        self
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

pub fn encode(value: &Value, options: &EncodeOptions) -> String {
    let mut writer = JsonWriter::new(options.pretty);
    encode_value(&mut writer, value, options.convert_nonfinite);
    writer.finish()
}

fn encode_value(writer: &mut JsonWriter, value: &Value, convert_nonfinite: bool) {
    match value {
        Value::Num(num) => encode_number(writer, *num, convert_nonfinite),
        Value::Logical(flag) => writer.bool(*flag),
        Value::Str(text) => writer.string(text),
        Value::NumArray(array) => {
            // A 1x1 array is indistinguishable from a scalar.
            if array.dims().numel() == 1 {
                encode_number(writer, array.data()[0], convert_nonfinite);
            } else {
                let emit =
                    &mut |writer: &mut JsonWriter, value| encode_number(writer, value, convert_nonfinite);
                encode_nd(writer, array.data(), array.dims(), array.dims(), 0, emit);
            }
        }
        Value::LogicalArray(array) => {
            if array.dims().numel() == 1 {
                writer.bool(array.data()[0]);
            } else {
                let emit = &mut |writer: &mut JsonWriter, value| writer.bool(value);
                encode_nd(writer, array.data(), array.dims(), array.dims(), 0, emit);
            }
        }
        Value::Cell(cell) => {
            writer.start_array();
            for element in cell.data() {
                encode_value(writer, element, convert_nonfinite);
            }
            writer.end_array();
        }
        Value::Struct(record) => {
            writer.start_object();
            for (name, value) in record.fields() {
                writer.key(name);
                encode_value(writer, value, convert_nonfinite);
            }
            writer.end_object();
        }
        Value::StructArray(array) => encode_struct_array(writer, array, convert_nonfinite),
    }
}

// Integral doubles in [-999999, 999999] are written as integer literals;
// larger magnitudes fall through to floating-point text.
fn encode_number(writer: &mut JsonWriter, value: f64, convert_nonfinite: bool) {
    if (value.floor() - value).abs() < f64::EPSILON && (-999999.0..=999999.0).contains(&value) {
        writer.int(value as i64);
    } else if convert_nonfinite && !value.is_finite() {
        writer.null();
    } else {
        writer.double(value);
    }
}

fn encode_struct_array(writer: &mut JsonWriter, array: &StructArray, convert_nonfinite: bool) {
    let numel = array.numel();
    if numel == 1 {
        encode_struct_element(writer, array, 0, convert_nonfinite);
        return;
    }
    writer.start_array();
    for index in 0..numel {
        encode_struct_element(writer, array, index, convert_nonfinite);
    }
    writer.end_array();
}

fn encode_struct_element(
    writer: &mut JsonWriter,
    array: &StructArray,
    index: usize,
    convert_nonfinite: bool,
) {
    writer.start_object();
    for (name, values) in array.fields() {
        writer.key(name);
        encode_value(writer, &values[index], convert_nonfinite);
    }
    writer.end_object();
}

// Recursive shape decomposition. `dims` tracks the current sub-array,
// `original` stays fixed so interior singleton axes of the source shape keep
// their bracket pair even after splits have reduced the data.
fn encode_nd<T: Copy>(
    writer: &mut JsonWriter,
    data: &[T],
    dims: &Dims,
    original: &Dims,
    level: usize,
    emit: &mut dyn FnMut(&mut JsonWriter, T),
) {
    if data.is_empty() {
        writer.start_array();
        writer.end_array();
        return;
    }

    if dims.is_vector() {
        writer.start_array();
        for &value in data {
            emit(writer, value);
        }
        writer.end_array();
        return;
    }

    let ndims = dims.ndims();

    // A single non-singleton axis at rank >= 3: flatten, but at inner levels
    // keep one bracket pair per remaining dimension so the rank survives a
    // decode. At level 0 the value is treated as a plain vector.
    if dims.num_ones() == ndims - 1 {
        let wraps = if level == 0 {
            0
        } else {
            ndims.saturating_sub(level + 1)
        };
        for _ in 0..wraps {
            writer.start_array();
        }
        writer.start_array();
        for &value in data {
            emit(writer, value);
        }
        writer.end_array();
        for _ in 0..wraps {
            writer.end_array();
        }
        return;
    }

    // An explicit singleton axis of the source shape would otherwise vanish;
    // wrap the remainder once to preserve it.
    if level < original.ndims() && original.get(level) == 1 {
        writer.start_array();
        encode_nd(writer, data, dims, original, level + 1, emit);
        writer.end_array();
        return;
    }

    // Split along the first non-singleton axis of the current dims. All
    // earlier axes are 1, so that axis has column-major stride 1 and
    // sub-array s is the strided slice s, s+count, s+2*count, ...
    let axis = dims
        .as_slice()
        .iter()
        .position(|&extent| extent != 1)
        .unwrap_or(0);
    let count = dims.get(axis);
    let mut sub_extents = dims.as_slice().to_vec();
    sub_extents[axis] = 1;
    let sub_dims = Dims::new(sub_extents);

    writer.start_array();
    for start in 0..count {
        let sub: Vec<T> = data.iter().copied().skip(start).step_by(count).collect();
        encode_nd(writer, &sub, &sub_dims, original, level + 1, emit);
    }
    writer.end_array();
}

#[cfg(test)]
mod tests {
    use super::{EncodeOptions, encode};
    use crate::core::value::{
        CellArray, LogicalArray, NumArray, StructArray, StructValue, Value,
    };

    fn compact(value: &Value) -> String {
        encode(value, &EncodeOptions::new())
    }

    #[test]
    fn scalars_follow_the_integer_range_rule() {
        assert_eq!(compact(&Value::Num(5.0)), "5");
        assert_eq!(compact(&Value::Num(5.5)), "5.5");
        assert_eq!(compact(&Value::Num(-999999.0)), "-999999");
        assert_eq!(compact(&Value::Num(999999.5)), "999999.5");
        assert_eq!(compact(&Value::Num(1000000.0)), "1000000");
        assert_eq!(compact(&Value::Logical(true)), "true");
        assert_eq!(compact(&Value::Str("hi".to_string())), "\"hi\"");
    }

    #[test]
    fn nonfinite_scalars_respect_the_convert_option() {
        assert_eq!(compact(&Value::Num(f64::NAN)), "null");
        assert_eq!(compact(&Value::Num(f64::INFINITY)), "null");
        let keep = EncodeOptions::new().with_convert_nonfinite(false);
        assert_eq!(encode(&Value::Num(f64::NAN), &keep), "NaN");
        assert_eq!(encode(&Value::Num(f64::INFINITY), &keep), "Infinity");
        assert_eq!(encode(&Value::Num(f64::NEG_INFINITY), &keep), "-Infinity");
    }

    #[test]
    fn one_by_one_arrays_encode_as_scalars() {
        let array = NumArray::new(vec![1, 1], vec![5.0]).unwrap();
        assert_eq!(compact(&Value::NumArray(array)), "5");
        let logical = LogicalArray::new(vec![1, 1], vec![true]).unwrap();
        assert_eq!(compact(&Value::LogicalArray(logical)), "true");
    }

    #[test]
    fn vectors_flatten_to_one_array() {
        let column = NumArray::column(vec![1.0, 2.0, 3.0]);
        assert_eq!(compact(&Value::NumArray(column)), "[1,2,3]");
        let row = NumArray::new(vec![1, 3], vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(compact(&Value::NumArray(row)), "[1,2,3]");
    }

    #[test]
    fn empty_arrays_encode_as_empty_json_arrays() {
        assert_eq!(compact(&Value::NumArray(NumArray::empty())), "[]");
    }

    #[test]
    fn matrices_nest_rows() {
        let matrix = NumArray::new(vec![2, 2], vec![1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_eq!(compact(&Value::NumArray(matrix)), "[[1,2],[3,4]]");
    }

    #[test]
    fn nan_inside_a_matrix_becomes_null_by_default() {
        let matrix = NumArray::new(vec![2, 2], vec![1.0, 3.0, f64::NAN, 4.0]).unwrap();
        assert_eq!(compact(&Value::NumArray(matrix)), "[[1,null],[3,4]]");
        let keep = EncodeOptions::new().with_convert_nonfinite(false);
        assert_eq!(
            encode(
                &Value::NumArray(
                    NumArray::new(vec![2, 2], vec![1.0, 3.0, f64::NAN, 4.0]).unwrap()
                ),
                &keep
            ),
            "[[1,NaN],[3,4]]"
        );
    }

    #[test]
    fn three_dimensional_arrays_nest_three_levels() {
        let array = NumArray::new(
            vec![2, 2, 2],
            vec![1.0, 5.0, 3.0, 7.0, 2.0, 6.0, 4.0, 8.0],
        )
        .unwrap();
        assert_eq!(
            compact(&Value::NumArray(array)),
            "[[[1,2],[3,4]],[[5,6],[7,8]]]"
        );
    }

    #[test]
    fn interior_singleton_axes_keep_their_brackets() {
        let array = NumArray::new(vec![2, 1, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(compact(&Value::NumArray(array)), "[[[1,3]],[[2,4]]]");
    }

    #[test]
    fn leading_singleton_axes_wrap_once() {
        let array = NumArray::new(vec![1, 2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(compact(&Value::NumArray(array)), "[[[1,3,5],[2,4,6]]]");
    }

    #[test]
    fn trailing_vector_shapes_flatten_at_the_top_level() {
        let array = NumArray::new(vec![1, 1, 6], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(compact(&Value::NumArray(array)), "[1,2,3,4,5,6]");
    }

    #[test]
    fn logical_matrices_nest_like_numeric_ones() {
        let array = LogicalArray::new(vec![2, 2], vec![true, false, false, true]).unwrap();
        assert_eq!(
            compact(&Value::LogicalArray(array)),
            "[[true,false],[false,true]]"
        );
    }

    #[test]
    fn cells_flatten_in_column_major_order() {
        let cell = CellArray::new(
            vec![2, 2],
            vec![
                Value::from(1.0),
                Value::from(2.0),
                Value::from("x"),
                Value::from(true),
            ],
        )
        .unwrap();
        assert_eq!(compact(&Value::Cell(cell)), "[1,2,\"x\",true]");
    }

    #[test]
    fn cells_encode_elements_independently() {
        let inner = CellArray::column(vec![Value::from("foo"), Value::from("bar")]);
        let cell = CellArray::column(vec![
            Value::from("foo"),
            Value::from("bar"),
            Value::Cell(inner),
        ]);
        assert_eq!(
            compact(&Value::Cell(cell)),
            "[\"foo\",\"bar\",[\"foo\",\"bar\"]]"
        );
    }

    #[test]
    fn structs_encode_fields_in_order() {
        let mut record = StructValue::new();
        record.insert("a".to_string(), Value::Num(f64::INFINITY));
        record.insert("b".to_string(), Value::NumArray(NumArray::empty()));
        record.insert("c".to_string(), Value::Struct(StructValue::new()));
        assert_eq!(
            compact(&Value::Struct(record)),
            "{\"a\":null,\"b\":[],\"c\":{}}"
        );
    }

    #[test]
    fn struct_arrays_encode_as_arrays_of_objects() {
        let array = StructArray::new(
            vec![2, 1],
            vec![
                ("a".to_string(), vec![Value::Num(1.0), Value::Num(3.0)]),
                ("b".to_string(), vec![Value::Num(2.0), Value::Num(4.0)]),
            ],
        )
        .unwrap();
        assert_eq!(
            compact(&Value::StructArray(array)),
            "[{\"a\":1,\"b\":2},{\"a\":3,\"b\":4}]"
        );
    }

    #[test]
    fn single_element_struct_arrays_encode_as_one_object() {
        let array = StructArray::new(
            vec![1, 1],
            vec![("a".to_string(), vec![Value::Num(1.0)])],
        )
        .unwrap();
        assert_eq!(compact(&Value::StructArray(array)), "{\"a\":1}");
    }

    #[test]
    fn empty_struct_arrays_encode_as_empty_json_arrays() {
        let array = StructArray::new(vec![0, 0], Vec::new()).unwrap();
        assert_eq!(compact(&Value::StructArray(array)), "[]");
    }

    #[test]
    fn pretty_mode_indents_by_two_spaces() {
        let array = LogicalArray::column(vec![true, false]);
        let pretty = EncodeOptions::new().with_pretty(true);
        assert_eq!(
            encode(&Value::LogicalArray(array), &pretty),
            "[\n  true,\n  false\n]"
        );
    }
}
