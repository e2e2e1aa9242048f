//! Adapter synthesis
//!
//! An adapter type is built once per interface: the interface contract plus
//! a slot plan with name lookups for methods, properties and events. It is
//! cached by interface identity for the lifetime of its synthesizer and
//! never mutated after build.
//!
//! An adapter instance binds every slot of its adapter type against one
//! wrapped value and forwards each call through those bindings. Members the
//! interface does not declare are unreachable through the adapter, even when
//! the wrapped value has them.
//!
//! ```rust,ignore
//! let adapter = AdapterSynthesizer::global().adapt(&i_dummy, value)?;
//! let n: i32 = adapter.invoke_as("GetInt", &[Value::I32(12)])?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mimic_sdk::{
    format_params, FromValue, HandlerRef, MemberDef, PropertyDef, ProxyError, ProxyResult,
    TypeDescriptor, TypeRef, Value,
};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::debug;

use super::accessor::{BoundAccessor, BoundEvent, BoundProperty};
use super::artifacts::AdapterManifest;
use super::binder::{arg_types, select, BindingFlags, MemberBinder};
use super::index::IndexAccessor;
use super::introspector::type_of;
use super::matcher::{InterfaceContract, StructuralMatcher};
use crate::defaults::ADAPTER_NAME_SUFFIX;

// ============================================================================
// AdapterType
// ============================================================================

/// Synthesized adapter type for one interface
#[derive(Debug)]
pub struct AdapterType {
    name: String,
    contract: InterfaceContract,
    method_slots: FxHashMap<String, Vec<usize>>,
    property_slots: FxHashMap<String, usize>,
    event_slots: FxHashMap<String, usize>,
}

impl AdapterType {
    fn build(interface: &TypeRef) -> ProxyResult<Self> {
        let contract = InterfaceContract::of(interface)?;

        let mut method_slots: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        for (slot, method) in contract.methods().iter().enumerate() {
            method_slots.entry(method.name.clone()).or_default().push(slot);
        }
        let property_slots = contract
            .properties()
            .iter()
            .enumerate()
            .map(|(slot, p)| (p.name.clone(), slot))
            .collect();
        let event_slots = contract
            .events()
            .iter()
            .enumerate()
            .map(|(slot, e)| (e.name.clone(), slot))
            .collect();

        Ok(Self {
            name: format!("{}{}", interface.name(), ADAPTER_NAME_SUFFIX),
            contract,
            method_slots,
            property_slots,
            event_slots,
        })
    }

    /// Adapter type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Implemented interface
    pub fn interface(&self) -> &TypeRef {
        self.contract.interface()
    }

    /// Contract the slots were planned from
    pub fn contract(&self) -> &InterfaceContract {
        &self.contract
    }

    /// Number of forwarding slots
    pub fn slot_count(&self) -> usize {
        self.contract.methods().len()
            + self.contract.properties().len()
            + self.contract.indexers().len()
            + self.contract.events().len()
    }

    fn not_found(&self, member: impl Into<String>) -> ProxyError {
        ProxyError::member_not_found(self.interface().name(), member)
    }
}

// ============================================================================
// AdapterInstance
// ============================================================================

/// Adapter bound to one wrapped value
pub struct AdapterInstance {
    adapter_type: Arc<AdapterType>,
    target: Value,
    methods: Vec<BoundAccessor>,
    properties: Vec<BoundProperty>,
    events: Vec<BoundEvent>,
    indexer: Option<IndexAccessor>,
}

impl AdapterInstance {
    /// Bind every slot against `target_type` using exact contract signatures
    fn bind(
        adapter_type: Arc<AdapterType>,
        target: Value,
        target_type: &TypeRef,
    ) -> ProxyResult<Self> {
        let contract = adapter_type.contract();
        let exact = |declared: &MemberDef| {
            MemberBinder::resolve_exact(target_type, &declared.signature(), BindingFlags::ALL)
        };

        let methods = contract
            .methods()
            .iter()
            .map(|m| BoundAccessor::new(exact(m.as_ref()), target.clone()))
            .collect::<ProxyResult<Vec<_>>>()?;

        let properties = contract
            .properties()
            .iter()
            .map(|p| {
                BoundProperty::from_accessors(
                    &p.name,
                    p.getter.as_deref().and_then(exact),
                    p.setter.as_deref().and_then(exact),
                    &target,
                )
            })
            .collect::<ProxyResult<Vec<_>>>()?;

        let events = contract
            .events()
            .iter()
            .map(|e| {
                let missing = || ProxyError::InvalidBinding(format!("event {}", e.name));
                BoundEvent::from_accessors(
                    &e.name,
                    exact(e.add.as_ref()).ok_or_else(missing)?,
                    exact(e.remove.as_ref()).ok_or_else(missing)?,
                    &target,
                )
            })
            .collect::<ProxyResult<Vec<_>>>()?;

        let indexer = if contract.indexers().is_empty() {
            None
        } else {
            Some(IndexAccessor::for_contract(
                target.clone(),
                target_type.clone(),
                contract.indexers().to_vec(),
            ))
        };

        Ok(Self {
            adapter_type,
            target,
            methods,
            properties,
            events,
            indexer,
        })
    }

    /// Adapter type of this instance
    pub fn adapter_type(&self) -> &Arc<AdapterType> {
        &self.adapter_type
    }

    /// Implemented interface
    pub fn interface(&self) -> &TypeRef {
        self.adapter_type.interface()
    }

    /// Wrapped value
    pub fn target(&self) -> &Value {
        &self.target
    }

    /// Invoke a contract method.
    ///
    /// Arguments are coerced to the declared parameter types and the result
    /// to the declared return type (`void` yields `Value::Unit`).
    pub fn invoke(&self, name: &str, args: &[Value]) -> ProxyResult<Value> {
        let adapter_type = &self.adapter_type;
        let slots = adapter_type
            .method_slots
            .get(name)
            .ok_or_else(|| adapter_type.not_found(name))?;
        let declared = adapter_type.contract.methods();
        let slot = *select(
            adapter_type.interface().name(),
            name,
            slots,
            |slot| declared[*slot].params.as_slice(),
            args,
        )?;

        let member = &declared[slot];
        let marshalled = member
            .params
            .iter()
            .zip(args)
            .map(|(param, arg)| param.coerce(arg.clone()))
            .collect::<ProxyResult<Vec<_>>>()?;
        let result = self.methods[slot].invoke(&marshalled)?;
        member.return_type.coerce(result)
    }

    /// Invoke a contract method and convert the result
    pub fn invoke_as<R: FromValue>(&self, name: &str, args: &[Value]) -> ProxyResult<R> {
        R::from_value(&self.invoke(name, args)?)
    }

    /// Read a contract property
    pub fn get(&self, name: &str) -> ProxyResult<Value> {
        let (declared, bound) = self.property(name)?;
        if !declared.can_read() {
            return Err(ProxyError::NotReadable {
                member: name.to_string(),
            });
        }
        declared.property_type.coerce(bound.get(&[])?)
    }

    /// Write a contract property
    pub fn set(&self, name: &str, value: Value) -> ProxyResult<()> {
        let (declared, bound) = self.property(name)?;
        if !declared.can_write() {
            return Err(ProxyError::NotWritable {
                member: name.to_string(),
            });
        }
        bound.set(&[], declared.property_type.coerce(value)?)
    }

    /// Read through a contract indexer
    pub fn get_index(&self, indexes: &[Value]) -> ProxyResult<Value> {
        self.indexer(indexes)?.get(indexes)
    }

    /// Write through a contract indexer
    pub fn set_index(&self, indexes: &[Value], value: Value) -> ProxyResult<()> {
        self.indexer(indexes)?.set(indexes, value)
    }

    /// Subscribe to a contract event
    pub fn add_handler(&self, event: &str, handler: &HandlerRef) -> ProxyResult<()> {
        self.event(event)?.add(handler)
    }

    /// Unsubscribe from a contract event
    pub fn remove_handler(&self, event: &str, handler: &HandlerRef) -> ProxyResult<()> {
        self.event(event)?.remove(handler)
    }

    fn property(&self, name: &str) -> ProxyResult<(&PropertyDef, &BoundProperty)> {
        let slot = *self
            .adapter_type
            .property_slots
            .get(name)
            .ok_or_else(|| self.adapter_type.not_found(name))?;
        let declared = self.adapter_type.contract.properties()[slot].as_ref();
        Ok((declared, &self.properties[slot]))
    }

    fn indexer(&self, indexes: &[Value]) -> ProxyResult<&IndexAccessor> {
        self.indexer.as_ref().ok_or_else(|| {
            let types = arg_types(indexes);
            self.adapter_type
                .not_found(format!("Item{}", format_params(&types)))
        })
    }

    fn event(&self, name: &str) -> ProxyResult<&BoundEvent> {
        let slot = *self
            .adapter_type
            .event_slots
            .get(name)
            .ok_or_else(|| self.adapter_type.not_found(name))?;
        Ok(&self.events[slot])
    }
}

impl fmt::Debug for AdapterInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterInstance")
            .field("adapter_type", &self.adapter_type.name())
            .field("target", &self.target)
            .finish()
    }
}

// ============================================================================
// AdapterSynthesizer
// ============================================================================

static GLOBAL: Lazy<AdapterSynthesizer> = Lazy::new(AdapterSynthesizer::new);

/// Builds adapter types once per interface and instantiates them
#[derive(Default)]
pub struct AdapterSynthesizer {
    adapters: Mutex<FxHashMap<usize, Arc<AdapterType>>>,
}

impl AdapterSynthesizer {
    /// Create an isolated synthesizer with an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide synthesizer
    pub fn global() -> &'static AdapterSynthesizer {
        &GLOBAL
    }

    /// Get the cached adapter type for `interface`, building it on first
    /// request
    pub fn get_or_build(&self, interface: &TypeRef) -> ProxyResult<Arc<AdapterType>> {
        let mut adapters = self.adapters.lock();
        if let Some(adapter_type) = adapters.get(&interface.id()) {
            return Ok(adapter_type.clone());
        }

        let adapter_type = Arc::new(AdapterType::build(interface)?);
        debug!(
            adapter = adapter_type.name(),
            interface = interface.name(),
            slots = adapter_type.slot_count(),
            "synthesized adapter type"
        );
        adapters.insert(interface.id(), adapter_type.clone());
        Ok(adapter_type)
    }

    /// Number of adapter types built so far
    pub fn synthesis_count(&self) -> usize {
        self.adapters.lock().len()
    }

    /// Every adapter type built so far, ordered by name
    pub fn adapter_types(&self) -> Vec<Arc<AdapterType>> {
        let mut types: Vec<_> = self.adapters.lock().values().cloned().collect();
        types.sort_by(|a, b| a.name().cmp(b.name()));
        types
    }

    /// Bind `adapter_type` to `target`.
    ///
    /// Fails with `StructuralMismatch` before any slot is bound if the
    /// target's type does not satisfy the interface.
    pub fn instantiate(
        &self,
        adapter_type: &Arc<AdapterType>,
        target: Value,
    ) -> ProxyResult<AdapterInstance> {
        let target_type = type_of(&target)?;
        self.instantiate_as(adapter_type, target, &target_type)
    }

    /// Like `instantiate`, with the target's descriptor already known
    pub fn instantiate_as(
        &self,
        adapter_type: &Arc<AdapterType>,
        target: Value,
        target_type: &TypeRef,
    ) -> ProxyResult<AdapterInstance> {
        StructuralMatcher::check(target_type, adapter_type.contract())?;
        AdapterInstance::bind(adapter_type.clone(), target, target_type)
    }

    /// Adapt `target` to `interface`
    pub fn adapt(&self, interface: &TypeRef, target: Value) -> ProxyResult<AdapterInstance> {
        let target_type = type_of(&target)?;
        self.adapt_as(interface, target, &target_type)
    }

    /// Like `adapt`, with the target's descriptor already known.
    ///
    /// A mismatching target never causes an adapter type to be built.
    pub fn adapt_as(
        &self,
        interface: &TypeRef,
        target: Value,
        target_type: &TypeRef,
    ) -> ProxyResult<AdapterInstance> {
        let cached = self.adapters.lock().get(&interface.id()).cloned();
        if let Some(adapter_type) = cached {
            return self.instantiate_as(&adapter_type, target, target_type);
        }

        StructuralMatcher::check(target_type, &InterfaceContract::of(interface)?)?;
        let adapter_type = self.get_or_build(interface)?;
        AdapterInstance::bind(adapter_type, target, target_type)
    }

    /// Check if `candidate` structurally satisfies `interface`
    pub fn can_adapt(&self, candidate: &TypeDescriptor, interface: &TypeRef) -> bool {
        StructuralMatcher::satisfies_type(candidate, interface)
    }

    /// Describe every adapter type built so far
    pub fn manifest(&self) -> AdapterManifest {
        AdapterManifest::from_types(&self.adapter_types())
    }

    /// Save the manifest as JSON; a directory path gets the default file name
    pub fn save_manifest(&self, path: impl AsRef<Path>) -> ProxyResult<PathBuf> {
        self.manifest().save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_sdk::{arg, Access, InterfaceBuilder, ObjectRef, TypeBuilder, TypeDesc};
    use parking_lot::Mutex as PlMutex;

    struct Greeter {
        greeting: PlMutex<String>,
    }

    fn greeter_type() -> TypeRef {
        TypeBuilder::<Greeter>::class("Greeter")
            .method("Greet", [TypeDesc::Str], TypeDesc::Str, |g, args| {
                let name: String = arg(args, 0)?;
                Ok(format!("{}, {}", g.greeting.lock(), name).into())
            })
            .method("Shout", [], TypeDesc::Str, |g, _| {
                Ok(g.greeting.lock().to_uppercase().into())
            })
            .property(
                "Greeting",
                TypeDesc::Str,
                |g| Ok(g.greeting.lock().clone().into()),
                |g, v| {
                    *g.greeting.lock() = arg(&[v], 0)?;
                    Ok(())
                },
            )
            .build()
            .unwrap()
    }

    fn greeter() -> Value {
        let greeter = Greeter {
            greeting: PlMutex::new("Hello".to_string()),
        };
        ObjectRef::new(&greeter_type(), greeter).unwrap().into()
    }

    fn i_greeter() -> TypeRef {
        InterfaceBuilder::new("IGreeter")
            .method("Greet", [TypeDesc::Str], TypeDesc::Str)
            .property("Greeting", TypeDesc::Str, Access::Read)
            .build()
            .unwrap()
    }

    #[test]
    fn test_adapter_forwards() {
        let synthesizer = AdapterSynthesizer::new();
        let adapter = synthesizer.adapt(&i_greeter(), greeter()).unwrap();
        assert_eq!(
            adapter.invoke("Greet", &[Value::from("Ada")]).unwrap(),
            Value::from("Hello, Ada")
        );
        assert_eq!(adapter.get("Greeting").unwrap(), Value::from("Hello"));
        assert_eq!(adapter.adapter_type().name(), "IGreeterAdapter");
    }

    #[test]
    fn test_members_outside_contract_unreachable() {
        let synthesizer = AdapterSynthesizer::new();
        let adapter = synthesizer.adapt(&i_greeter(), greeter()).unwrap();
        assert!(matches!(
            adapter.invoke("Shout", &[]),
            Err(ProxyError::MemberNotFound { .. })
        ));
        assert!(matches!(
            adapter.get_index(&[Value::I32(0)]),
            Err(ProxyError::MemberNotFound { .. })
        ));
    }

    #[test]
    fn test_undeclared_direction_rejected() {
        let synthesizer = AdapterSynthesizer::new();
        let adapter = synthesizer.adapt(&i_greeter(), greeter()).unwrap();
        assert_eq!(
            adapter.set("Greeting", Value::from("Hi")).unwrap_err(),
            ProxyError::NotWritable {
                member: "Greeting".to_string()
            }
        );
        assert_eq!(adapter.get("Greeting").unwrap(), Value::from("Hello"));
    }

    #[test]
    fn test_one_synthesis_per_interface() {
        let synthesizer = AdapterSynthesizer::new();
        let iface = i_greeter();
        for _ in 0..5 {
            synthesizer.adapt(&iface, greeter()).unwrap();
        }
        assert_eq!(synthesizer.synthesis_count(), 1);
        let a = synthesizer.get_or_build(&iface).unwrap();
        let b = synthesizer.get_or_build(&iface).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_mismatch_builds_nothing() {
        let synthesizer = AdapterSynthesizer::new();
        let result = synthesizer.adapt(&i_greeter(), Value::from("text"));
        assert!(matches!(result, Err(ProxyError::StructuralMismatch { .. })));
        assert_eq!(synthesizer.synthesis_count(), 0);
    }

    #[test]
    fn test_cached_type_still_checks() {
        let synthesizer = AdapterSynthesizer::new();
        let adapter_type = synthesizer.get_or_build(&i_greeter()).unwrap();
        assert!(matches!(
            synthesizer.instantiate(&adapter_type, Value::I32(3)),
            Err(ProxyError::StructuralMismatch { .. })
        ));
    }

    #[test]
    fn test_non_interface_rejected() {
        let synthesizer = AdapterSynthesizer::new();
        assert!(matches!(
            synthesizer.get_or_build(&greeter_type()),
            Err(ProxyError::InvalidArguments(_))
        ));
    }
}
