//! Traits for extracting Rust values from `Value`
//!
//! Member implementations receive `&[Value]`; `arg::<T>(args, i)` pulls the
//! i-th argument out with a `TypeMismatch` on the wrong runtime type.
//!
//! ```ignore
//! .method("Add", [TypeDesc::I32, TypeDesc::I32], TypeDesc::I32, |_, args| {
//!     let a: i32 = arg(args, 0)?;
//!     let b: i32 = arg(args, 1)?;
//!     Ok((a + b).into())
//! })
//! ```

use crate::error::{ProxyError, ProxyResult};
use crate::object::{ArrayRef, HandlerRef, ObjectRef};
use crate::value::Value;

/// Convert from `Value` to a Rust type.
pub trait FromValue: Sized {
    /// Convert, returning `TypeMismatch` if the runtime type doesn't fit
    fn from_value(value: &Value) -> ProxyResult<Self>;
}

fn mismatch<T>(expected: &str, value: &Value) -> ProxyResult<T> {
    Err(ProxyError::type_mismatch(expected, value.type_name()))
}

impl FromValue for Value {
    fn from_value(value: &Value) -> ProxyResult<Self> {
        Ok(value.clone())
    }
}

impl FromValue for () {
    fn from_value(value: &Value) -> ProxyResult<Self> {
        match value {
            Value::Unit => Ok(()),
            other => mismatch("void", other),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> ProxyResult<Self> {
        value.as_bool().map_or_else(|| mismatch("bool", value), Ok)
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> ProxyResult<Self> {
        value.as_i32().map_or_else(|| mismatch("i32", value), Ok)
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> ProxyResult<Self> {
        value.as_i64().map_or_else(|| mismatch("i64", value), Ok)
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> ProxyResult<Self> {
        value.as_f64().map_or_else(|| mismatch("f64", value), Ok)
    }
}

impl FromValue for char {
    fn from_value(value: &Value) -> ProxyResult<Self> {
        value.as_char().map_or_else(|| mismatch("char", value), Ok)
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> ProxyResult<Self> {
        match value.as_str() {
            Some(s) => Ok(s.to_string()),
            None => mismatch("string", value),
        }
    }
}

impl FromValue for ArrayRef {
    fn from_value(value: &Value) -> ProxyResult<Self> {
        value.as_array().cloned().map_or_else(|| mismatch("array", value), Ok)
    }
}

impl FromValue for ObjectRef {
    fn from_value(value: &Value) -> ProxyResult<Self> {
        value.as_object().cloned().map_or_else(|| mismatch("object", value), Ok)
    }
}

impl FromValue for HandlerRef {
    fn from_value(value: &Value) -> ProxyResult<Self> {
        value
            .as_handler()
            .cloned()
            .map_or_else(|| mismatch("handler", value), Ok)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> ProxyResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Extract argument `index` as `T`
pub fn arg<T: FromValue>(args: &[Value], index: usize) -> ProxyResult<T> {
    match args.get(index) {
        Some(value) => T::from_value(value),
        None => Err(ProxyError::InvalidArguments(format!(
            "missing argument {}",
            index
        ))),
    }
}
