//! Semantic types used in member signatures
//!
//! A `TypeDesc` is what a parameter, return value, property or event handler
//! is declared as. Two members have the same signature iff their kinds,
//! names and parameter `TypeDesc` sequences are equal.
//!
//! ## Assignability
//!
//! | parameter      | accepts                                      |
//! |----------------|----------------------------------------------|
//! | `Any`          | every runtime type except `Void`             |
//! | `I64`          | `I32`, `I64`                                 |
//! | `F64`          | `I32`, `I64`, `F64`                          |
//! | reference type | itself and `Null`                            |
//! | `T[]` (rank r) | `U[]` of rank r when `T` is `Any` or `T == U` |

use std::fmt;

use crate::error::{ProxyError, ProxyResult};
use crate::value::Value;

/// Declared or runtime type of a value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeDesc {
    /// Any value (`object`)
    Any,
    /// No value; only valid as a return type
    Void,
    /// Runtime type of a null argument
    Null,
    /// Boolean
    Bool,
    /// 32-bit integer
    I32,
    /// 64-bit integer
    I64,
    /// 64-bit float
    F64,
    /// Unicode scalar
    Char,
    /// String
    Str,
    /// Native array of the given element type and rank
    Array {
        /// Element type
        element: Box<TypeDesc>,
        /// Number of dimensions (at least 1)
        rank: usize,
    },
    /// Event handler (delegate)
    Handler,
    /// Class or interface, by name
    Named(String),
}

impl TypeDesc {
    /// One-dimensional array of `element`
    pub fn array(element: TypeDesc) -> Self {
        Self::array_of_rank(element, 1)
    }

    /// Array of `element` with `rank` dimensions
    pub fn array_of_rank(element: TypeDesc, rank: usize) -> Self {
        TypeDesc::Array {
            element: Box::new(element),
            rank: rank.max(1),
        }
    }

    /// Class or interface type by name
    pub fn named(name: impl Into<String>) -> Self {
        TypeDesc::Named(name.into())
    }

    /// Whether `Null` is a valid value of this type
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            TypeDesc::Any
                | TypeDesc::Null
                | TypeDesc::Str
                | TypeDesc::Array { .. }
                | TypeDesc::Handler
                | TypeDesc::Named(_)
        )
    }

    /// Default value for storage of this type (zero, `false` or `Null`)
    pub fn default_value(&self) -> Value {
        match self {
            TypeDesc::Bool => Value::Bool(false),
            TypeDesc::I32 => Value::I32(0),
            TypeDesc::I64 => Value::I64(0),
            TypeDesc::F64 => Value::F64(0.0),
            TypeDesc::Char => Value::Char('\0'),
            TypeDesc::Void => Value::Unit,
            _ => Value::Null,
        }
    }

    /// Whether an argument of runtime type `actual` may be passed to a
    /// parameter declared as `self`
    pub fn accepts(&self, actual: &TypeDesc) -> bool {
        if self == actual {
            return *self != TypeDesc::Void;
        }
        match (self, actual) {
            (TypeDesc::Any, other) => *other != TypeDesc::Void,
            (TypeDesc::I64, TypeDesc::I32) => true,
            (TypeDesc::F64, TypeDesc::I32 | TypeDesc::I64) => true,
            (param, TypeDesc::Null) => param.is_reference(),
            (
                TypeDesc::Array { element, rank },
                TypeDesc::Array {
                    element: actual_element,
                    rank: actual_rank,
                },
            ) => rank == actual_rank && (**element == TypeDesc::Any || element == actual_element),
            _ => false,
        }
    }

    /// Convert `value` to this type, widening numbers where allowed.
    ///
    /// `Void` swallows any value and yields `Value::Unit`.
    pub fn coerce(&self, value: Value) -> ProxyResult<Value> {
        match (self, value) {
            (TypeDesc::Void, _) => Ok(Value::Unit),
            (TypeDesc::Any, value) => Ok(value),
            (TypeDesc::I64, Value::I32(i)) => Ok(Value::I64(i as i64)),
            (TypeDesc::F64, Value::I32(i)) => Ok(Value::F64(i as f64)),
            (TypeDesc::F64, Value::I64(i)) => Ok(Value::F64(i as f64)),
            (TypeDesc::Named(name), Value::Object(object)) => {
                if object.descriptor().is_assignable_to(name) {
                    Ok(Value::Object(object))
                } else {
                    Err(ProxyError::type_mismatch(name, object.descriptor().name()))
                }
            }
            (declared, value) => {
                let actual = value.type_desc();
                if declared.accepts(&actual) {
                    Ok(value)
                } else {
                    Err(ProxyError::type_mismatch(declared, actual))
                }
            }
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Any => write!(f, "object"),
            TypeDesc::Void => write!(f, "void"),
            TypeDesc::Null => write!(f, "null"),
            TypeDesc::Bool => write!(f, "bool"),
            TypeDesc::I32 => write!(f, "i32"),
            TypeDesc::I64 => write!(f, "i64"),
            TypeDesc::F64 => write!(f, "f64"),
            TypeDesc::Char => write!(f, "char"),
            TypeDesc::Str => write!(f, "string"),
            TypeDesc::Array { element, rank } => {
                write!(f, "{}[{}]", element, ",".repeat(rank.saturating_sub(1)))
            }
            TypeDesc::Handler => write!(f, "handler"),
            TypeDesc::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Render a parameter list as `(a, b, c)`
pub fn format_params(params: &[TypeDesc]) -> String {
    let rendered: Vec<String> = params.iter().map(|p| p.to_string()).collect();
    format!("({})", rendered.join(", "))
}
