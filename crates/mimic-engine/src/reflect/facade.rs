//! Late-bound facade over an arbitrary value
//!
//! Every operation resolves against the wrapped value's own type. Member
//! resolutions are memoized per call shape (member name plus argument
//! types) for the lifetime of the facade.
//!
//! ```rust,ignore
//! let facade = DynamicFacade::new(instance)?;
//! facade.invoke_member("GetInt", &[Value::I32(12)])?;
//! facade.set_index(&[Value::I32(1), Value::I32(2)], Value::I32(3))?;
//!
//! match facade.convert_to(&i_dummy)? {
//!     Conversion::Identity(value) => { /* nominal */ }
//!     Conversion::Adapter(adapter) => { /* structural */ }
//! }
//! ```

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use mimic_sdk::{
    HandlerRef, MemberKind, MemberSignature, ProxyError, ProxyResult, TypeRef, Value,
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::accessor::{BoundAccessor, BoundEvent, BoundProperty};
use super::adapter::{AdapterInstance, AdapterSynthesizer};
use super::binder::{arg_types, MemberBinder};
use super::index::IndexAccessor;
use super::introspector::{RuntimeIntrospector, TypeIntrospector};
use crate::config::ProxyConfig;
use crate::ffi::ModuleSource;

/// Result of `DynamicFacade::convert_to`
#[derive(Debug)]
pub enum Conversion {
    /// The value already is the target type (own type, ancestor, declared
    /// interface or `object`)
    Identity(Value),
    /// The value structurally satisfies the target interface
    Adapter(AdapterInstance),
}

impl Conversion {
    /// Check if no adapter was needed
    pub fn is_identity(&self) -> bool {
        matches!(self, Conversion::Identity(_))
    }

    /// The adapter, if one was built
    pub fn into_adapter(self) -> Option<AdapterInstance> {
        match self {
            Conversion::Adapter(adapter) => Some(adapter),
            Conversion::Identity(_) => None,
        }
    }

    /// The converted value, or the adapter's target
    pub fn value(&self) -> &Value {
        match self {
            Conversion::Identity(value) => value,
            Conversion::Adapter(adapter) => adapter.target(),
        }
    }
}

/// Handle returned by `DynamicFacade::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Property-changed observer; receives the member name
pub type ChangeObserver = Arc<dyn Fn(&str) + Send + Sync>;

/// Late-bound wrapper around one value
pub struct DynamicFacade {
    target: Value,
    target_type: TypeRef,
    config: ProxyConfig,
    methods: RwLock<FxHashMap<MemberSignature, Arc<BoundAccessor>>>,
    properties: RwLock<FxHashMap<String, Arc<BoundProperty>>>,
    events: RwLock<FxHashMap<String, Arc<BoundEvent>>>,
    indexer: IndexAccessor,
    observers: RwLock<Vec<(SubscriptionId, ChangeObserver)>>,
    next_subscription: AtomicU64,
}

impl DynamicFacade {
    /// Wrap `value` with the default configuration
    pub fn new(value: impl Into<Value>) -> ProxyResult<Self> {
        Self::with_config(value, ProxyConfig::default())
    }

    /// Wrap `value` with a custom configuration
    pub fn with_config(value: impl Into<Value>, config: ProxyConfig) -> ProxyResult<Self> {
        Self::with_introspector(value, config, &RuntimeIntrospector)
    }

    /// Wrap `value`, resolving its type with `introspector`.
    ///
    /// `Null` and `Unit` are rejected with `InvalidArguments`.
    pub fn with_introspector(
        value: impl Into<Value>,
        config: ProxyConfig,
        introspector: &dyn TypeIntrospector,
    ) -> ProxyResult<Self> {
        let target = value.into();
        let target_type = introspector.type_of(&target)?;
        let indexer = IndexAccessor::new(
            target.clone(),
            target_type.clone(),
            config.member_flags,
            config.out_of_range,
        );
        Ok(Self {
            target,
            target_type,
            config,
            methods: RwLock::new(FxHashMap::default()),
            properties: RwLock::new(FxHashMap::default()),
            events: RwLock::new(FxHashMap::default()),
            indexer,
            observers: RwLock::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        })
    }

    /// Load the module at `path` through `source` and wrap a new instance
    /// of `type_name`
    pub fn from_module(
        source: &dyn ModuleSource,
        path: impl AsRef<Path>,
        type_name: &str,
        args: &[Value],
    ) -> ProxyResult<Self> {
        let module = source.load(path.as_ref())?;
        Self::new(module.instantiate(type_name, args)?)
    }

    /// Wrapped value
    pub fn target(&self) -> &Value {
        &self.target
    }

    /// Descriptor of the wrapped value
    pub fn target_type(&self) -> &TypeRef {
        &self.target_type
    }

    /// Active configuration
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Unwrap into the target value
    pub fn into_target(self) -> Value {
        self.target
    }

    // ------------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------------

    /// Read a property
    pub fn get_member(&self, name: &str) -> ProxyResult<Value> {
        self.property(name)?.get(&[])
    }

    /// Write a property, then notify observers with `name`
    pub fn set_member(&self, name: &str, value: Value) -> ProxyResult<()> {
        self.property(name)?.set(&[], value)?;
        if self.config.notify_changes {
            self.notify(name);
        }
        Ok(())
    }

    /// Invoke a method resolved from the argument types
    pub fn invoke_member(&self, name: &str, args: &[Value]) -> ProxyResult<Value> {
        let shape = MemberSignature {
            kind: MemberKind::Method,
            name: name.to_string(),
            params: arg_types(args),
        };
        let cached = self.methods.read().get(&shape).cloned();
        let accessor = match cached {
            Some(accessor) => accessor,
            None => {
                let member = MemberBinder::resolve_method(
                    &self.target_type,
                    name,
                    args,
                    self.config.member_flags,
                )?;
                let accessor = Arc::new(BoundAccessor::new(Some(member), self.target.clone())?);
                self.methods
                    .write()
                    .entry(shape)
                    .or_insert(accessor)
                    .clone()
            }
        };
        accessor.invoke(args)
    }

    /// Read an indexer or native array element
    pub fn get_index(&self, indexes: &[Value]) -> ProxyResult<Value> {
        self.indexer.get(indexes)
    }

    /// Write an indexer or native array element
    pub fn set_index(&self, indexes: &[Value], value: Value) -> ProxyResult<()> {
        self.indexer.set(indexes, value)
    }

    /// Subscribe `handler` to an event of the wrapped value
    pub fn add_handler(&self, event: &str, handler: &HandlerRef) -> ProxyResult<()> {
        self.event(event)?.add(handler)
    }

    /// Unsubscribe `handler` from an event of the wrapped value
    pub fn remove_handler(&self, event: &str, handler: &HandlerRef) -> ProxyResult<()> {
        self.event(event)?.remove(handler)
    }

    fn property(&self, name: &str) -> ProxyResult<Arc<BoundProperty>> {
        if let Some(bound) = self.properties.read().get(name) {
            return Ok(bound.clone());
        }
        let flags = self.config.member_flags;
        let property = MemberBinder::resolve_property(&self.target_type, name, &[], flags)?;
        let bound = Arc::new(BoundProperty::bind(&property, &self.target, flags)?);
        Ok(self
            .properties
            .write()
            .entry(name.to_string())
            .or_insert(bound)
            .clone())
    }

    fn event(&self, name: &str) -> ProxyResult<Arc<BoundEvent>> {
        if let Some(bound) = self.events.read().get(name) {
            return Ok(bound.clone());
        }
        let event = MemberBinder::resolve_event(&self.target_type, name, self.config.member_flags)?;
        let bound = Arc::new(BoundEvent::bind(&event, &self.target)?);
        Ok(self
            .events
            .write()
            .entry(name.to_string())
            .or_insert(bound)
            .clone())
    }

    // ------------------------------------------------------------------------
    // Change notification
    // ------------------------------------------------------------------------

    /// Register an observer called with the member name after each
    /// successful `set_member`
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.observers.write().push((id, Arc::new(observer)));
        id
    }

    /// Remove an observer; returns false if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    fn notify(&self, name: &str) {
        let observers: Vec<ChangeObserver> =
            self.observers.read().iter().map(|(_, o)| o.clone()).collect();
        for observer in observers {
            observer(name);
        }
    }

    // ------------------------------------------------------------------------
    // Conversion
    // ------------------------------------------------------------------------

    /// Convert the wrapped value to `target`.
    ///
    /// Nominal targets convert by identity. An interface the value satisfies
    /// only structurally yields an adapter from the global synthesizer; an
    /// unsatisfied interface is `StructuralMismatch` and any other target
    /// `IncompatibleConversion`.
    pub fn convert_to(&self, target: &TypeRef) -> ProxyResult<Conversion> {
        self.convert_with(AdapterSynthesizer::global(), target)
    }

    /// Like `convert_to`, building adapters with `synthesizer`
    pub fn convert_with(
        &self,
        synthesizer: &AdapterSynthesizer,
        target: &TypeRef,
    ) -> ProxyResult<Conversion> {
        if self.target_type.is_assignable_to(target.name()) {
            return Ok(Conversion::Identity(self.target.clone()));
        }
        if target.is_interface() {
            let adapter = synthesizer.adapt_as(target, self.target.clone(), &self.target_type)?;
            return Ok(Conversion::Adapter(adapter));
        }
        Err(ProxyError::IncompatibleConversion {
            from: self.target_type.name().to_string(),
            to: target.name().to_string(),
        })
    }
}

impl From<DynamicFacade> for Value {
    fn from(facade: DynamicFacade) -> Self {
        facade.into_target()
    }
}

impl From<&DynamicFacade> for Value {
    fn from(facade: &DynamicFacade) -> Self {
        facade.target.clone()
    }
}

impl PartialEq for DynamicFacade {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
    }
}

impl PartialEq<Value> for DynamicFacade {
    fn eq(&self, other: &Value) -> bool {
        self.target == *other
    }
}

impl fmt::Display for DynamicFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.target, f)
    }
}

impl fmt::Debug for DynamicFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicFacade")
            .field("target", &self.target)
            .field("config", &self.config)
            .finish()
    }
}
