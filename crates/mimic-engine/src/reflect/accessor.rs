//! Bound accessors: one resolved member tied to one receiver
//!
//! The first invocation compiles a dispatch thunk (arity check, per-parameter
//! coercion, invoker call, void mapping) and stores it in a `OnceCell`;
//! later invocations reuse it.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mimic_sdk::{
    EventDef, HandlerRef, Invoker, MemberDef, PropertyDef, ProxyError, ProxyResult, Value,
};
use once_cell::sync::OnceCell;
use tracing::trace;

use super::binder::BindingFlags;

type Thunk = Box<dyn Fn(&[Value]) -> ProxyResult<Value> + Send + Sync>;

/// Compiled, reusable binding between one member and one receiver
pub struct BoundAccessor {
    member: Arc<MemberDef>,
    invoker: Invoker,
    receiver: Value,
    thunk: OnceCell<Thunk>,
    compilations: AtomicUsize,
}

impl BoundAccessor {
    /// Bind `member` to `receiver`.
    ///
    /// A missing or unimplemented member is `InvalidBinding`; a `Null` or
    /// `Unit` receiver is `InvalidArguments`.
    pub fn new(member: Option<Arc<MemberDef>>, receiver: Value) -> ProxyResult<Self> {
        let member = member
            .ok_or_else(|| ProxyError::InvalidBinding("no member to bind".to_string()))?;
        let invoker = member.invoker().cloned().ok_or_else(|| {
            ProxyError::InvalidBinding(format!("{} has no implementation", member.signature()))
        })?;
        if receiver.is_null() || receiver.is_unit() {
            return Err(ProxyError::InvalidArguments(format!(
                "cannot bind {} to {}",
                member.signature(),
                receiver.type_name()
            )));
        }
        Ok(Self {
            member,
            invoker,
            receiver,
            thunk: OnceCell::new(),
            compilations: AtomicUsize::new(0),
        })
    }

    /// Bound member
    pub fn member(&self) -> &Arc<MemberDef> {
        &self.member
    }

    /// Bound receiver
    pub fn receiver(&self) -> &Value {
        &self.receiver
    }

    /// Check if the thunk has been compiled
    pub fn is_compiled(&self) -> bool {
        self.thunk.get().is_some()
    }

    /// Number of times the thunk was compiled (at most one)
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }

    /// Invoke the member. Setters take the value after the index arguments.
    pub fn invoke(&self, args: &[Value]) -> ProxyResult<Value> {
        let thunk = self.thunk.get_or_init(|| self.compile());
        thunk(args)
    }

    fn compile(&self) -> Thunk {
        self.compilations.fetch_add(1, Ordering::Relaxed);
        trace!(member = %self.member.signature(), "compiling thunk");

        let member = self.member.clone();
        let invoker = self.invoker.clone();
        let receiver = self.receiver.clone();
        Box::new(move |args| {
            if args.len() != member.params.len() {
                return Err(ProxyError::ArityMismatch {
                    member: member.signature().to_string(),
                    expected: member.params.len(),
                    got: args.len(),
                });
            }
            let coerced = member
                .params
                .iter()
                .zip(args)
                .map(|(param, arg)| param.coerce(arg.clone()))
                .collect::<ProxyResult<Vec<_>>>()?;
            let result = invoker(&receiver, &coerced)?;
            if member.returns_void() {
                Ok(Value::Unit)
            } else {
                Ok(result)
            }
        })
    }
}

impl fmt::Debug for BoundAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundAccessor")
            .field("member", &self.member.signature().to_string())
            .field("receiver", &self.receiver)
            .field("compiled", &self.is_compiled())
            .finish()
    }
}

// ============================================================================
// BoundProperty
// ============================================================================

/// Getter and setter of one property or indexer overload, bound to a receiver
#[derive(Debug)]
pub struct BoundProperty {
    name: String,
    getter: Option<BoundAccessor>,
    setter: Option<BoundAccessor>,
}

impl BoundProperty {
    /// Bind the accessors of `property` visible under `flags`
    pub fn bind(
        property: &PropertyDef,
        receiver: &Value,
        flags: BindingFlags,
    ) -> ProxyResult<Self> {
        let visible = |accessor: &Option<Arc<MemberDef>>| {
            accessor
                .as_ref()
                .filter(|a| flags.admits(a.visibility))
                .cloned()
        };
        Self::from_accessors(
            &property.name,
            visible(&property.getter),
            visible(&property.setter),
            receiver,
        )
    }

    /// Bind explicit accessors; either may be absent
    pub fn from_accessors(
        name: &str,
        getter: Option<Arc<MemberDef>>,
        setter: Option<Arc<MemberDef>>,
        receiver: &Value,
    ) -> ProxyResult<Self> {
        let getter = getter
            .map(|g| BoundAccessor::new(Some(g), receiver.clone()))
            .transpose()?;
        let setter = setter
            .map(|s| BoundAccessor::new(Some(s), receiver.clone()))
            .transpose()?;
        Ok(Self {
            name: name.to_string(),
            getter,
            setter,
        })
    }

    /// Property name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if a getter is bound
    pub fn can_read(&self) -> bool {
        self.getter.is_some()
    }

    /// Check if a setter is bound
    pub fn can_write(&self) -> bool {
        self.setter.is_some()
    }

    /// Read the value; `NotReadable` without a getter
    pub fn get(&self, index_args: &[Value]) -> ProxyResult<Value> {
        match &self.getter {
            Some(getter) => getter.invoke(index_args),
            None => Err(ProxyError::NotReadable {
                member: self.name.clone(),
            }),
        }
    }

    /// Write the value; `NotWritable` without a setter
    pub fn set(&self, index_args: &[Value], value: Value) -> ProxyResult<()> {
        let setter = self.setter.as_ref().ok_or_else(|| ProxyError::NotWritable {
            member: self.name.clone(),
        })?;
        let mut args = Vec::with_capacity(index_args.len() + 1);
        args.extend_from_slice(index_args);
        args.push(value);
        setter.invoke(&args)?;
        Ok(())
    }
}

// ============================================================================
// BoundEvent
// ============================================================================

/// Add and remove accessors of one event, bound to a receiver
#[derive(Debug)]
pub struct BoundEvent {
    name: String,
    add: BoundAccessor,
    remove: BoundAccessor,
}

impl BoundEvent {
    /// Bind both accessors of `event`
    pub fn bind(event: &EventDef, receiver: &Value) -> ProxyResult<Self> {
        Self::from_accessors(
            &event.name,
            event.add.clone(),
            event.remove.clone(),
            receiver,
        )
    }

    /// Bind explicit accessors
    pub fn from_accessors(
        name: &str,
        add: Arc<MemberDef>,
        remove: Arc<MemberDef>,
        receiver: &Value,
    ) -> ProxyResult<Self> {
        Ok(Self {
            name: name.to_string(),
            add: BoundAccessor::new(Some(add), receiver.clone())?,
            remove: BoundAccessor::new(Some(remove), receiver.clone())?,
        })
    }

    /// Event name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subscribe `handler`
    pub fn add(&self, handler: &HandlerRef) -> ProxyResult<()> {
        self.add.invoke(&[Value::Handler(handler.clone())])?;
        Ok(())
    }

    /// Unsubscribe `handler`
    pub fn remove(&self, handler: &HandlerRef) -> ProxyResult<()> {
        self.remove.invoke(&[Value::Handler(handler.clone())])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_sdk::{arg, InterfaceBuilder, ObjectRef, TypeBuilder, TypeDesc, TypeRef};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Counter {
        value: Mutex<i64>,
    }

    fn counter_type() -> TypeRef {
        TypeBuilder::<Counter>::class("Counter")
            .method("Add", [TypeDesc::I64], TypeDesc::I64, |c, args| {
                let mut value = c.value.lock();
                *value += arg::<i64>(args, 0)?;
                Ok(Value::I64(*value))
            })
            .method("Reset", [], TypeDesc::Void, |c, _| {
                *c.value.lock() = 0;
                Ok(Value::I32(-1))
            })
            .readonly_property("Value", TypeDesc::I64, |c| Ok(Value::I64(*c.value.lock())))
            .build()
            .unwrap()
    }

    fn counter() -> (TypeRef, Value) {
        let ty = counter_type();
        let value = Value::Object(ObjectRef::new(&ty, Counter::default()).unwrap());
        (ty, value)
    }

    #[test]
    fn test_invoke_coerces_arguments() {
        let (ty, value) = counter();
        let add = BoundAccessor::new(Some(ty.methods()[0].clone()), value).unwrap();
        assert_eq!(add.invoke(&[Value::I32(2)]).unwrap(), Value::I64(2));
        assert_eq!(add.invoke(&[Value::I64(3)]).unwrap(), Value::I64(5));
    }

    #[test]
    fn test_thunk_compiles_once() {
        let (ty, value) = counter();
        let add = BoundAccessor::new(Some(ty.methods()[0].clone()), value).unwrap();
        assert!(!add.is_compiled());
        add.invoke(&[Value::I32(1)]).unwrap();
        add.invoke(&[Value::I32(1)]).unwrap();
        assert!(add.is_compiled());
        assert_eq!(add.compilations(), 1);
    }

    #[test]
    fn test_void_returns_unit() {
        let (ty, value) = counter();
        let reset = BoundAccessor::new(Some(ty.methods()[1].clone()), value).unwrap();
        assert_eq!(reset.invoke(&[]).unwrap(), Value::Unit);
    }

    #[test]
    fn test_arity_mismatch() {
        let (ty, value) = counter();
        let add = BoundAccessor::new(Some(ty.methods()[0].clone()), value).unwrap();
        assert!(matches!(
            add.invoke(&[]),
            Err(ProxyError::ArityMismatch { expected: 1, got: 0, .. })
        ));
    }

    #[test]
    fn test_invalid_bindings() {
        let (ty, value) = counter();
        assert!(matches!(
            BoundAccessor::new(None, value.clone()),
            Err(ProxyError::InvalidBinding(_))
        ));
        assert!(matches!(
            BoundAccessor::new(Some(ty.methods()[0].clone()), Value::Null),
            Err(ProxyError::InvalidArguments(_))
        ));

        let iface = InterfaceBuilder::new("IAdd")
            .method("Add", [TypeDesc::I64], TypeDesc::I64)
            .build()
            .unwrap();
        assert!(matches!(
            BoundAccessor::new(Some(iface.methods()[0].clone()), value),
            Err(ProxyError::InvalidBinding(_))
        ));
    }

    #[test]
    fn test_read_only_property() {
        let (ty, value) = counter();
        let property =
            BoundProperty::bind(&ty.properties()[0], &value, BindingFlags::PUBLIC).unwrap();
        assert_eq!(property.get(&[]).unwrap(), Value::I64(0));
        assert_eq!(
            property.set(&[], Value::I64(4)).unwrap_err(),
            ProxyError::NotWritable {
                member: "Value".to_string()
            }
        );
        assert_eq!(property.get(&[]).unwrap(), Value::I64(0));
    }
}
