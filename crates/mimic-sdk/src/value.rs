//! Dynamic value passed across every forwarding boundary
//!
//! Primitives are stored inline; arrays, objects and handlers are shared
//! references whose equality is identity.
//!
//! `Value::Unit` is the *void sentinel*: members declared to return `void`
//! produce it, and it is distinct from every real value including `Null`.

use std::fmt;
use std::sync::Arc;

use crate::object::{ArrayRef, HandlerRef, ObjectRef};
use crate::types::TypeDesc;

/// Dynamically typed value
#[derive(Clone, Default)]
pub enum Value {
    /// Null reference
    #[default]
    Null,
    /// No value (result of a `void` member)
    Unit,
    /// Boolean
    Bool(bool),
    /// 32-bit integer
    I32(i32),
    /// 64-bit integer
    I64(i64),
    /// 64-bit float
    F64(f64),
    /// Unicode scalar
    Char(char),
    /// Immutable shared string
    Str(Arc<str>),
    /// Native array
    Array(ArrayRef),
    /// Described object instance
    Object(ObjectRef),
    /// Event handler
    Handler(HandlerRef),
}

impl Value {
    /// Create a string value
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::Str(Arc::from(s.as_ref()))
    }

    /// Check if this is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this is the void sentinel
    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit)
    }

    /// Get as boolean if this is a bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i32 if this is an i32
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as i64, widening an i32
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I32(i) => Some(*i as i64),
            Value::I64(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64, widening integers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::I32(i) => Some(*i as f64),
            Value::I64(i) => Some(*i as f64),
            Value::F64(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as char if this is a char
    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// Borrow the string contents if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the array reference if this is an array
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get the object reference if this is an object
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Get the handler if this is a handler
    pub fn as_handler(&self) -> Option<&HandlerRef> {
        match self {
            Value::Handler(h) => Some(h),
            _ => None,
        }
    }

    /// Runtime semantic type
    pub fn type_desc(&self) -> TypeDesc {
        match self {
            Value::Null => TypeDesc::Null,
            Value::Unit => TypeDesc::Void,
            Value::Bool(_) => TypeDesc::Bool,
            Value::I32(_) => TypeDesc::I32,
            Value::I64(_) => TypeDesc::I64,
            Value::F64(_) => TypeDesc::F64,
            Value::Char(_) => TypeDesc::Char,
            Value::Str(_) => TypeDesc::Str,
            Value::Array(a) => a.type_desc(),
            Value::Object(o) => TypeDesc::Named(o.descriptor().name().to_string()),
            Value::Handler(_) => TypeDesc::Handler,
        }
    }

    /// Runtime type name, as used in error messages
    pub fn type_name(&self) -> String {
        self.type_desc().to_string()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Handler(a), Value::Handler(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Value::Null"),
            Value::Unit => write!(f, "Value::Unit"),
            Value::Bool(b) => write!(f, "Value::Bool({})", b),
            Value::I32(i) => write!(f, "Value::I32({})", i),
            Value::I64(i) => write!(f, "Value::I64({})", i),
            Value::F64(x) => write!(f, "Value::F64({})", x),
            Value::Char(c) => write!(f, "Value::Char({:?})", c),
            Value::Str(s) => write!(f, "Value::Str({:?})", s),
            Value::Array(a) => write!(f, "Value::Array({:?})", a),
            Value::Object(o) => write!(f, "Value::Object({:?})", o),
            Value::Handler(h) => write!(f, "Value::Handler({:?})", h),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::I32(i) => write!(f, "{}", i),
            Value::I64(i) => write!(f, "{}", i),
            Value::F64(x) => write!(f, "{}", x),
            Value::Char(c) => write!(f, "{}", c),
            Value::Str(s) => write!(f, "{}", s),
            Value::Array(a) => write!(f, "{}", a.type_desc()),
            Value::Object(o) => write!(f, "{}", o.descriptor().name()),
            Value::Handler(_) => write!(f, "handler"),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::I32(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::I64(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::F64(x)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<ArrayRef> for Value {
    fn from(a: ArrayRef) -> Self {
        Value::Array(a)
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

impl From<HandlerRef> for Value {
    fn from(h: HandlerRef) -> Self {
        Value::Handler(h)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}
