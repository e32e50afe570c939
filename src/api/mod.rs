//! Purpose: Define the stable public Rust API boundary for matjson.
//! Exports: Codec entry points, option builders, the value model, errors.
//! Role: Public, additive-only surface; callers should not reach into
//! Role: `core` module paths directly.
//! Invariants: `decode` and `encode` are pure: same input and options,
//! Invariants: same output, no I/O.

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::decode::{DecodeOptions, decode};
pub use crate::core::encode::{EncodeOptions, encode};
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::name::{NameOptions, ReplacementStyle, make_valid_name};
pub use crate::core::value::{
    CellArray, Dims, LogicalArray, NumArray, StructArray, StructValue, Value,
};
