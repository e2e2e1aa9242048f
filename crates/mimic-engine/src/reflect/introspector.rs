//! Mapping values to their type descriptors

use mimic_sdk::{ProxyError, ProxyResult, TypeRef, Value};

use super::builtins;

/// Maps any value to the descriptor its members are resolved against
pub trait TypeIntrospector: Send + Sync {
    /// Descriptor of `value`; `InvalidArguments` for `Null` and `Unit`
    fn type_of(&self, value: &Value) -> ProxyResult<TypeRef>;
}

/// Default introspector: objects carry their own descriptor, every other
/// value gets a builtin one
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeIntrospector;

impl TypeIntrospector for RuntimeIntrospector {
    fn type_of(&self, value: &Value) -> ProxyResult<TypeRef> {
        match value {
            Value::Null | Value::Unit => Err(ProxyError::InvalidArguments(format!(
                "cannot introspect {}",
                value.type_name()
            ))),
            Value::Object(object) => Ok(object.descriptor().clone()),
            other => builtins::builtin_type(&other.type_desc()),
        }
    }
}

/// Descriptor of `value` under the default introspector
pub fn type_of(value: &Value) -> ProxyResult<TypeRef> {
    RuntimeIntrospector.type_of(value)
}
