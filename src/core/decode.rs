//! Purpose: Turn parsed JSON values into native values.
//! Exports: `DecodeOptions`, `decode`.
//! Role: Classifier plus decoder; picks one container strategy per JSON
//! Role: array by inspecting element kinds one level deep, then recurses.
//! Invariants: Numeric arrays absorb `null` elements as NaN; every other
//! Invariants: heterogeneity falls back to a cell array, never to an error.
//! Invariants: Object keys decode in insertion order; duplicate or colliding
//! Invariants: keys overwrite the value while keeping the first position.
//! Invariants: Options are validated before any parsing or decoding starts.

use crate::core::error::{Error, ErrorKind};
use crate::core::name::{NameOptions, ReplacementStyle, make_valid_name};
use crate::core::value::{
    CellArray, Dims, LogicalArray, NumArray, StructArray, StructValue, Value,
};
use crate::json;
use crate::json::value::{Kind, Value as JsonValue};

#[derive(Clone, Debug)]
pub struct DecodeOptions {
    sanitize_names: bool,
    names: NameOptions,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self {
            sanitize_names: true,
            names: NameOptions::default(),
        }
    }

    pub fn with_sanitize_names(mut self, enabled: bool) -> Self {
        self.sanitize_names = enabled;
        self
    }

    pub fn with_style(mut self, style: ReplacementStyle) -> Self {
        self.names = self.names.with_style(style);
        self
    }

    /// Fails with an Option error when the prefix is not a valid,
    /// non-reserved identifier; nothing is decoded with a bad prefix.
    pub fn with_prefix(mut self, prefix: &str) -> Result<Self, Error> {
        self.names = NameOptions::new(self.names.style(), prefix)?;
        Ok(self)
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

pub fn decode(text: &str, options: &DecodeOptions) -> Result<Value, Error> {
    let root = json::parse::parse(text)?;
    decode_value(&root, options)
}

fn decode_value(value: &JsonValue, options: &DecodeOptions) -> Result<Value, Error> {
    match value {
        JsonValue::Bool(flag) => Ok(Value::Logical(*flag)),
        JsonValue::Number(num) => Ok(Value::Num(*num)),
        JsonValue::String(text) => Ok(Value::Str(text.clone())),
        // Standalone null has no native counterpart; it becomes the empty
        // numeric array, like `null` inside a non-numeric array.
        JsonValue::Null => Ok(Value::NumArray(NumArray::empty())),
        JsonValue::Object(members) => Ok(Value::Struct(decode_object(members, options)?)),
        JsonValue::Array(items) => decode_array(items, options),
    }
}

fn decode_object(
    members: &[(String, JsonValue)],
    options: &DecodeOptions,
) -> Result<StructValue, Error> {
    let mut record = StructValue::new();
    for (key, value) in members {
        let name = if options.sanitize_names {
            make_valid_name(key, &options.names)
        } else {
            key.clone()
        };
        record.insert(name, decode_value(value, options)?);
    }
    Ok(record)
}

fn decode_array(items: &[JsonValue], options: &DecodeOptions) -> Result<Value, Error> {
    if items.is_empty() {
        return Ok(Value::NumArray(NumArray::empty()));
    }

    let first_kind = items[0].kind();
    let mut all_numeric = true;
    let mut same_kind = true;
    for item in items {
        let kind = item.kind();
        if all_numeric && !matches!(kind, Kind::Number | Kind::Null) {
            all_numeric = false;
        }
        if same_kind && kind != first_kind {
            same_kind = false;
        }
    }

    if all_numeric {
        return decode_numeric_array(items);
    }

    if same_kind && first_kind != Kind::String {
        return match first_kind {
            Kind::Bool => decode_boolean_array(items),
            Kind::Object => decode_object_array(items, options),
            Kind::Array => decode_array_of_arrays(items, options),
            _ => Err(logic_gap()),
        };
    }

    Ok(Value::Cell(decode_mixed_array(items, options)?))
}

fn decode_numeric_array(items: &[JsonValue]) -> Result<Value, Error> {
    let mut data = Vec::with_capacity(items.len());
    for item in items {
        match item {
            JsonValue::Null => data.push(f64::NAN),
            JsonValue::Number(num) => data.push(*num),
            _ => return Err(logic_gap()),
        }
    }
    Ok(Value::NumArray(NumArray::column(data)))
}

fn decode_boolean_array(items: &[JsonValue]) -> Result<Value, Error> {
    let mut data = Vec::with_capacity(items.len());
    for item in items {
        match item {
            JsonValue::Bool(flag) => data.push(*flag),
            _ => return Err(logic_gap()),
        }
    }
    Ok(Value::LogicalArray(LogicalArray::column(data)))
}

fn decode_mixed_array(items: &[JsonValue], options: &DecodeOptions) -> Result<CellArray, Error> {
    let mut data = Vec::with_capacity(items.len());
    for item in items {
        data.push(decode_value(item, options)?);
    }
    Ok(CellArray::column(data))
}

// Arrays of objects merge into one struct array when every object decodes to
// the same ordered field set; otherwise the result is a cell of records.
fn decode_object_array(items: &[JsonValue], options: &DecodeOptions) -> Result<Value, Error> {
    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match item {
            JsonValue::Object(members) => records.push(decode_object(members, options)?),
            _ => return Err(logic_gap()),
        }
    }

    let same_field_names = records
        .iter()
        .skip(1)
        .all(|record| record.field_names().eq(records[0].field_names()));
    if !same_field_names {
        let cells = records.into_iter().map(Value::Struct).collect();
        return Ok(Value::Cell(CellArray::column(cells)));
    }

    let count = records.len();
    let names: Vec<String> = records[0].field_names().map(str::to_string).collect();
    let mut columns: Vec<(String, Vec<Value>)> = names
        .into_iter()
        .map(|name| (name, Vec::with_capacity(count)))
        .collect();
    for record in records {
        for (idx, (_, value)) in record.into_fields().into_iter().enumerate() {
            columns[idx].1.push(value);
        }
    }
    Ok(Value::StructArray(StructArray::new(vec![count, 1], columns)?))
}

// Reference characteristics an array element must share for the merge in
// `decode_array_of_arrays`: dims, logical-ness, and the struct field set
// (None for plain arrays). Cells never merge.
fn array_profile(value: &Value) -> Option<(&Dims, bool, Option<Vec<&str>>)> {
    match value {
        Value::NumArray(array) => Some((array.dims(), false, None)),
        Value::LogicalArray(array) => Some((array.dims(), true, None)),
        Value::StructArray(array) => Some((array.dims(), false, Some(array.field_names().collect()))),
        _ => None,
    }
}

fn decode_array_of_arrays(items: &[JsonValue], options: &DecodeOptions) -> Result<Value, Error> {
    let mut elements = Vec::with_capacity(items.len());
    for item in items {
        elements.push(decode_value(item, options)?);
    }

    let reference = array_profile(&elements[0]).map(|(dims, logical, fields)| {
        let fields: Option<Vec<String>> =
            fields.map(|names| names.iter().map(|name| name.to_string()).collect());
        (dims.clone(), logical, fields)
    });
    let Some((ref_dims, ref_logical, ref_fields)) = reference else {
        return Ok(Value::Cell(CellArray::column(elements)));
    };
    let homogeneous = elements.iter().all(|element| match array_profile(element) {
        Some((dims, logical, fields)) => {
            let fields_equal = match (&fields, &ref_fields) {
                (None, None) => true,
                (Some(a), Some(b)) => {
                    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| *x == y.as_str())
                }
                _ => false,
            };
            *dims == ref_dims && !dims.has_zero() && logical == ref_logical && fields_equal
        }
        None => false,
    });
    if !homogeneous {
        return Ok(Value::Cell(CellArray::column(elements)));
    }
    let count = elements.len();
    let sub_numel = ref_dims.numel();
    let total = count * sub_numel;
    let mut extents = vec![count];
    extents.extend_from_slice(ref_dims.as_slice());

    // The outer index varies fastest: combined[k + i*count] = element[k][i].
    if let Some(names) = ref_fields {
        let subs = collect_refs(&elements, |value| match value {
            Value::StructArray(array) => Some(array),
            _ => None,
        })?;
        let columns = names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let values = (0..total)
                    .map(|p| subs[p % count].fields()[idx].1[p / count].clone())
                    .collect();
                (name, values)
            })
            .collect();
        Ok(Value::StructArray(StructArray::new(extents, columns)?))
    } else if ref_logical {
        let subs = collect_refs(&elements, |value| match value {
            Value::LogicalArray(array) => Some(array),
            _ => None,
        })?;
        let data = (0..total).map(|p| subs[p % count].data()[p / count]).collect();
        Ok(Value::LogicalArray(LogicalArray::new(extents, data)?))
    } else {
        let subs = collect_refs(&elements, |value| match value {
            Value::NumArray(array) => Some(array),
            _ => None,
        })?;
        let data = (0..total).map(|p| subs[p % count].data()[p / count]).collect();
        Ok(Value::NumArray(NumArray::new(extents, data)?))
    }
}

fn collect_refs<'a, T>(
    elements: &'a [Value],
    select: impl Fn(&'a Value) -> Option<&'a T>,
) -> Result<Vec<&'a T>, Error> {
    elements
        .iter()
        .map(|element| select(element).ok_or_else(logic_gap))
        .collect()
}

fn logic_gap() -> Error {
    Error::new(ErrorKind::Unsupported).with_message("unidentified type")
}
