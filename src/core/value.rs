//! Purpose: Define the native value model the codec maps JSON onto.
//! Exports: `Value`, `Dims`, `NumArray`, `LogicalArray`, `CellArray`,
//! Exports: `StructValue`, `StructArray`.
//! Role: Owned, tree-shaped data; arrays are flat column-major buffers plus
//! Role: an explicit dimension vector, independent of any host array type.
//! Invariants: `Dims` always has at least 2 entries and no trailing singleton
//! Invariants: dimensions beyond rank 2; flat data length equals the dims
//! Invariants: product; struct-array fields all share that length.
//! Invariants: Field order is first-insertion order and is preserved.

use std::fmt;

use crate::core::error::{Error, ErrorKind};

/// Array dimensions. Construction normalizes the raw extent list: it is
/// padded to at least two entries and trailing extents equal to 1 are
/// chopped down to rank 2, so `(4)` becomes `(4, 1)` and `(2, 2, 1)`
/// becomes `(2, 2)`, while interior singletons like `(2, 1, 3)` survive.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dims(Vec<usize>);

impl Dims {
    pub fn new(mut extents: Vec<usize>) -> Self {
        while extents.len() < 2 {
            extents.push(1);
        }
        while extents.len() > 2 && extents.last() == Some(&1) {
            extents.pop();
        }
        Self(extents)
    }

    /// The canonical shape of a decoded JSON vector: `n` rows, one column.
    pub fn column(len: usize) -> Self {
        Self(vec![len, 1])
    }

    pub fn empty() -> Self {
        Self(vec![0, 0])
    }

    pub fn ndims(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, axis: usize) -> usize {
        self.0[axis]
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn numel(&self) -> usize {
        self.0.iter().product()
    }

    pub fn is_vector(&self) -> bool {
        self.0.len() == 2 && (self.0[0] == 1 || self.0[1] == 1)
    }

    pub fn num_ones(&self) -> usize {
        self.0.iter().filter(|&&extent| extent == 1).count()
    }

    pub fn has_zero(&self) -> bool {
        self.0.contains(&0)
    }

    /// Column-major strides: axis 0 is contiguous, axis k steps by the
    /// product of all earlier extents.
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = Vec::with_capacity(self.0.len());
        let mut acc = 1usize;
        for &extent in &self.0 {
            strides.push(acc);
            acc = acc.saturating_mul(extent.max(1));
        }
        strides
    }

    /// Flat offset of a multi-index: `i0 + i1*d0 + i2*d0*d1 + ...`.
    pub fn offset_of(&self, index: &[usize]) -> usize {
        index
            .iter()
            .zip(self.strides())
            .map(|(&i, stride)| i * stride)
            .sum()
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, extent) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, "x")?;
            }
            write!(f, "{extent}")?;
        }
        Ok(())
    }
}

fn check_len(dims: &Dims, len: usize, what: &str) -> Result<(), Error> {
    if dims.numel() != len {
        return Err(Error::new(ErrorKind::Shape).with_message(format!(
            "{what} data length {len} does not match dims {dims}"
        )));
    }
    Ok(())
}

#[derive(Clone, Debug)]
pub struct NumArray {
    dims: Dims,
    data: Vec<f64>,
}

impl NumArray {
    pub fn new(extents: Vec<usize>, data: Vec<f64>) -> Result<Self, Error> {
        let dims = Dims::new(extents);
        check_len(&dims, data.len(), "numeric array")?;
        Ok(Self { dims, data })
    }

    pub fn column(data: Vec<f64>) -> Self {
        let dims = Dims::column(data.len());
        Self { dims, data }
    }

    pub fn empty() -> Self {
        Self {
            dims: Dims::empty(),
            data: Vec::new(),
        }
    }

    pub fn dims(&self) -> &Dims {
        &self.dims
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

// NaN-aware equality: elements compare by bit pattern so arrays holding NaN
// still compare equal to themselves.
impl PartialEq for NumArray {
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims
            && self.data.len() == other.data.len()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogicalArray {
    dims: Dims,
    data: Vec<bool>,
}

impl LogicalArray {
    pub fn new(extents: Vec<usize>, data: Vec<bool>) -> Result<Self, Error> {
        let dims = Dims::new(extents);
        check_len(&dims, data.len(), "logical array")?;
        Ok(Self { dims, data })
    }

    pub fn column(data: Vec<bool>) -> Self {
        let dims = Dims::column(data.len());
        Self { dims, data }
    }

    pub fn dims(&self) -> &Dims {
        &self.dims
    }

    pub fn data(&self) -> &[bool] {
        &self.data
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CellArray {
    dims: Dims,
    data: Vec<Value>,
}

impl CellArray {
    pub fn new(extents: Vec<usize>, data: Vec<Value>) -> Result<Self, Error> {
        let dims = Dims::new(extents);
        check_len(&dims, data.len(), "cell array")?;
        Ok(Self { dims, data })
    }

    pub fn column(data: Vec<Value>) -> Self {
        let dims = Dims::column(data.len());
        Self { dims, data }
    }

    pub fn dims(&self) -> &Dims {
        &self.dims
    }

    pub fn data(&self) -> &[Value] {
        &self.data
    }
}

/// Scalar record with ordered fields. Inserting an existing field overwrites
/// its value but keeps its original position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StructValue {
    fields: Vec<(String, Value)>,
}

impl StructValue {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn insert(&mut self, name: String, value: Value) {
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<(String, Value)> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Record array: every element carries the same ordered field set; each
/// field holds one flat column-major sequence of per-element values.
#[derive(Clone, Debug, PartialEq)]
pub struct StructArray {
    dims: Dims,
    fields: Vec<(String, Vec<Value>)>,
}

impl StructArray {
    pub fn new(extents: Vec<usize>, fields: Vec<(String, Vec<Value>)>) -> Result<Self, Error> {
        let dims = Dims::new(extents);
        for (name, values) in &fields {
            if values.len() != dims.numel() {
                return Err(Error::new(ErrorKind::Shape).with_message(format!(
                    "struct array field '{name}' has {} values for dims {dims}",
                    values.len()
                )));
            }
        }
        Ok(Self { dims, fields })
    }

    pub fn dims(&self) -> &Dims {
        &self.dims
    }

    pub fn numel(&self) -> usize {
        self.dims.numel()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn fields(&self) -> &[(String, Vec<Value>)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&[Value]> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, values)| values.as_slice())
    }
}

#[derive(Clone, Debug)]
pub enum Value {
    Num(f64),
    Logical(bool),
    Str(String),
    NumArray(NumArray),
    LogicalArray(LogicalArray),
    Cell(CellArray),
    Struct(StructValue),
    StructArray(StructArray),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Num(_) => "num",
            Value::Logical(_) => "logical",
            Value::Str(_) => "string",
            Value::NumArray(_) => "num-array",
            Value::LogicalArray(_) => "logical-array",
            Value::Cell(_) => "cell",
            Value::Struct(_) => "struct",
            Value::StructArray(_) => "struct-array",
        }
    }

    pub fn dims(&self) -> Option<&Dims> {
        match self {
            Value::NumArray(array) => Some(array.dims()),
            Value::LogicalArray(array) => Some(array.dims()),
            Value::Cell(cell) => Some(cell.dims()),
            Value::StructArray(array) => Some(array.dims()),
            _ => None,
        }
    }
}

// Manual so scalar floats compare like NumArray elements (by bit pattern).
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Num(a), Value::Num(b)) => a.to_bits() == b.to_bits(),
            (Value::Logical(a), Value::Logical(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::NumArray(a), Value::NumArray(b)) => a == b,
            (Value::LogicalArray(a), Value::LogicalArray(b)) => a == b,
            (Value::Cell(a), Value::Cell(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::StructArray(a), Value::StructArray(b)) => a == b,
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Num(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Logical(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}
