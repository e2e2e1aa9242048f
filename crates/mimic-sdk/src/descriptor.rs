//! Type descriptors and their member tables
//!
//! A `TypeDescriptor` is the runtime-discoverable shape of a type: its
//! methods, properties (indexers are properties named `Item` with index
//! parameters) and events. Every accessor is a `MemberDef` whose signature
//! is `(kind, name, parameter types)`. On concrete types each accessor
//! carries an `Invoker`, the erased closure that reaches the host value.
//!
//! ## Builders
//!
//! - `DescriptorBuilder`: raw builder, invokers receive the receiver `&Value`
//! - `TypeBuilder<T>`: typed builder for host structs, invokers receive `&T`
//! - `InterfaceBuilder`: contracts, no invokers
//!
//! ```rust,ignore
//! let counter = TypeBuilder::<Counter>::class("Counter")
//!     .method("Next", [], TypeDesc::I32, |c, _| Ok(c.next().into()))
//!     .build()?;
//! let value = ObjectRef::new(&counter, Counter::default())?;
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::error::{ProxyError, ProxyResult};
use crate::object::HandlerRef;
use crate::types::{format_params, TypeDesc};
use crate::value::Value;

/// Shared type descriptor
pub type TypeRef = Arc<TypeDescriptor>;

/// Erased member implementation: `(receiver, arguments) -> result`
pub type Invoker = Arc<dyn Fn(&Value, &[Value]) -> ProxyResult<Value> + Send + Sync>;

/// Indexer property name
pub const INDEXER_NAME: &str = "Item";

/// Name every type is assignable to
pub const OBJECT_TYPE_NAME: &str = "object";

static NEXT_TYPE_ID: AtomicUsize = AtomicUsize::new(1);

// ============================================================================
// Member model
// ============================================================================

/// Type kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Concrete host type
    Class,
    /// Contract without implementations
    Interface,
    /// Native array
    Array,
    /// Builtin scalar or string
    Primitive,
}

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Visible to late binding
    Public,
    /// Reachable by adapters only
    NonPublic,
}

/// Accessor kind, the first component of a member signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemberKind {
    /// Plain method
    Method,
    /// Property getter
    PropertyGet,
    /// Property setter
    PropertySet,
    /// Indexer getter
    IndexerGet,
    /// Indexer setter
    IndexerSet,
    /// Event subscription
    EventAdd,
    /// Event unsubscription
    EventRemove,
}

impl MemberKind {
    /// Short label used in signatures and manifests
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberKind::Method => "method",
            MemberKind::PropertyGet => "get",
            MemberKind::PropertySet => "set",
            MemberKind::IndexerGet => "index-get",
            MemberKind::IndexerSet => "index-set",
            MemberKind::EventAdd => "add",
            MemberKind::EventRemove => "remove",
        }
    }
}

/// Identity of a member for matching: kind, name and parameter types
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberSignature {
    /// Accessor kind
    pub kind: MemberKind,
    /// Member name (`Item` for indexers)
    pub name: String,
    /// Parameter types (setters end with the value type)
    pub params: Vec<TypeDesc>,
}

impl fmt::Display for MemberSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}{}",
            self.kind.as_str(),
            self.name,
            format_params(&self.params)
        )
    }
}

/// One method or accessor
#[derive(Clone)]
pub struct MemberDef {
    /// Accessor kind
    pub kind: MemberKind,
    /// Member name
    pub name: String,
    /// Parameter types
    pub params: Vec<TypeDesc>,
    /// Declared return type
    pub return_type: TypeDesc,
    /// Visibility
    pub visibility: Visibility,
    invoker: Option<Invoker>,
}

impl MemberDef {
    /// Create an unimplemented, public member
    pub fn new(
        kind: MemberKind,
        name: impl Into<String>,
        params: Vec<TypeDesc>,
        return_type: TypeDesc,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            params,
            return_type,
            visibility: Visibility::Public,
            invoker: None,
        }
    }

    /// Attach the implementation
    pub fn with_invoker(mut self, invoker: Invoker) -> Self {
        self.invoker = Some(invoker);
        self
    }

    /// Set visibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Implementation, if any
    pub fn invoker(&self) -> Option<&Invoker> {
        self.invoker.as_ref()
    }

    /// Check if this member carries an implementation
    pub fn is_implemented(&self) -> bool {
        self.invoker.is_some()
    }

    /// Check if this member returns no value
    pub fn returns_void(&self) -> bool {
        self.return_type == TypeDesc::Void
    }

    /// Matching identity
    pub fn signature(&self) -> MemberSignature {
        MemberSignature {
            kind: self.kind,
            name: self.name.clone(),
            params: self.params.clone(),
        }
    }
}

impl fmt::Debug for MemberDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDef")
            .field("signature", &self.signature().to_string())
            .field("return_type", &self.return_type)
            .field("visibility", &self.visibility)
            .field("implemented", &self.is_implemented())
            .finish()
    }
}

/// Property or indexer with optional accessors
#[derive(Debug, Clone)]
pub struct PropertyDef {
    /// Property name (`Item` for indexers)
    pub name: String,
    /// Value type
    pub property_type: TypeDesc,
    /// Index parameter types (empty for plain properties)
    pub index_params: Vec<TypeDesc>,
    /// Getter accessor
    pub getter: Option<Arc<MemberDef>>,
    /// Setter accessor
    pub setter: Option<Arc<MemberDef>>,
}

impl PropertyDef {
    /// Plain property without accessors
    pub fn new(name: impl Into<String>, property_type: TypeDesc) -> Self {
        Self {
            name: name.into(),
            property_type,
            index_params: Vec::new(),
            getter: None,
            setter: None,
        }
    }

    /// Indexer without accessors
    pub fn indexer(index_params: Vec<TypeDesc>, property_type: TypeDesc) -> Self {
        Self {
            name: INDEXER_NAME.to_string(),
            property_type,
            index_params,
            getter: None,
            setter: None,
        }
    }

    /// Add the getter: parameters are the index parameters
    pub fn with_getter(mut self, invoker: Option<Invoker>, visibility: Visibility) -> Self {
        let kind = if self.is_indexer() {
            MemberKind::IndexerGet
        } else {
            MemberKind::PropertyGet
        };
        let mut def = MemberDef::new(
            kind,
            self.name.clone(),
            self.index_params.clone(),
            self.property_type.clone(),
        )
        .with_visibility(visibility);
        def.invoker = invoker;
        self.getter = Some(Arc::new(def));
        self
    }

    /// Add the setter: parameters are the index parameters then the value
    pub fn with_setter(mut self, invoker: Option<Invoker>, visibility: Visibility) -> Self {
        let kind = if self.is_indexer() {
            MemberKind::IndexerSet
        } else {
            MemberKind::PropertySet
        };
        let mut params = self.index_params.clone();
        params.push(self.property_type.clone());
        let mut def = MemberDef::new(kind, self.name.clone(), params, TypeDesc::Void)
            .with_visibility(visibility);
        def.invoker = invoker;
        self.setter = Some(Arc::new(def));
        self
    }

    /// Check if this property takes index parameters
    pub fn is_indexer(&self) -> bool {
        !self.index_params.is_empty()
    }

    /// Check if a getter exists
    pub fn can_read(&self) -> bool {
        self.getter.is_some()
    }

    /// Check if a setter exists
    pub fn can_write(&self) -> bool {
        self.setter.is_some()
    }

    /// Getter and setter, whichever exist
    pub fn accessors(&self) -> impl Iterator<Item = &Arc<MemberDef>> {
        self.getter.iter().chain(self.setter.iter())
    }

    /// Check if any accessor is public
    pub fn is_public(&self) -> bool {
        self.accessors().any(|a| a.visibility == Visibility::Public)
    }
}

/// Event with add/remove accessors
#[derive(Debug, Clone)]
pub struct EventDef {
    /// Event name
    pub name: String,
    /// Handler type
    pub handler_type: TypeDesc,
    /// Subscription accessor
    pub add: Arc<MemberDef>,
    /// Unsubscription accessor
    pub remove: Arc<MemberDef>,
}

impl EventDef {
    /// Create an event; accessors take one parameter of `handler_type`
    pub fn new(
        name: impl Into<String>,
        handler_type: TypeDesc,
        add: Option<Invoker>,
        remove: Option<Invoker>,
        visibility: Visibility,
    ) -> Self {
        let name = name.into();
        let accessor = |kind, invoker: Option<Invoker>| {
            let mut def = MemberDef::new(
                kind,
                name.clone(),
                vec![handler_type.clone()],
                TypeDesc::Void,
            )
            .with_visibility(visibility);
            def.invoker = invoker;
            Arc::new(def)
        };
        let add = accessor(MemberKind::EventAdd, add);
        let remove = accessor(MemberKind::EventRemove, remove);
        Self {
            name,
            handler_type,
            add,
            remove,
        }
    }

    /// Check if the accessors are public
    pub fn is_public(&self) -> bool {
        self.add.visibility == Visibility::Public
    }
}

// ============================================================================
// TypeDescriptor
// ============================================================================

/// Runtime-discoverable type: name, ancestry and member table
#[derive(Debug)]
pub struct TypeDescriptor {
    id: usize,
    name: String,
    kind: TypeKind,
    parent: Option<TypeRef>,
    interfaces: Vec<String>,
    methods: Vec<Arc<MemberDef>>,
    properties: Vec<Arc<PropertyDef>>,
    events: Vec<Arc<EventDef>>,
    payload_type: Option<TypeId>,
}

impl TypeDescriptor {
    /// Process-unique identity
    pub fn id(&self) -> usize {
        self.id
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type kind
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Check if this is an interface
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Nominal parent type
    pub fn parent(&self) -> Option<&TypeRef> {
        self.parent.as_ref()
    }

    /// Nominally declared interface names
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// Methods, all visibilities
    pub fn methods(&self) -> &[Arc<MemberDef>] {
        &self.methods
    }

    /// Properties and indexers, all visibilities
    pub fn properties(&self) -> &[Arc<PropertyDef>] {
        &self.properties
    }

    /// Events, all visibilities
    pub fn events(&self) -> &[Arc<EventDef>] {
        &self.events
    }

    /// Indexer overloads
    pub fn indexers(&self) -> impl Iterator<Item = &Arc<PropertyDef>> {
        self.properties.iter().filter(|p| p.is_indexer())
    }

    /// Host payload type instances must carry, if restricted
    pub fn payload_type(&self) -> Option<TypeId> {
        self.payload_type
    }

    /// Parent chain, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = &TypeRef> {
        std::iter::successors(self.parent.as_ref(), |t| t.parent.as_ref())
    }

    /// Nominal assignability: same name, an ancestor, a declared interface
    /// of this type or an ancestor, or `object`
    pub fn is_assignable_to(&self, name: &str) -> bool {
        if name == OBJECT_TYPE_NAME
            || self.name == name
            || self.interfaces.iter().any(|i| i == name)
        {
            return true;
        }
        self.ancestors()
            .any(|t| t.name == name || t.interfaces.iter().any(|i| i == name))
    }

    /// Every accessor of every member, all visibilities
    pub fn accessors(&self) -> impl Iterator<Item = &Arc<MemberDef>> {
        self.methods
            .iter()
            .chain(self.properties.iter().flat_map(|p| p.accessors()))
            .chain(self.events.iter().flat_map(|e| [&e.add, &e.remove]))
    }
}

// ============================================================================
// DescriptorBuilder
// ============================================================================

/// Raw descriptor builder; invokers receive the receiver `&Value`
pub struct DescriptorBuilder {
    name: String,
    kind: TypeKind,
    parent: Option<TypeRef>,
    interfaces: Vec<String>,
    methods: Vec<MemberDef>,
    properties: Vec<PropertyDef>,
    events: Vec<EventDef>,
    payload_type: Option<TypeId>,
}

impl DescriptorBuilder {
    /// Start a descriptor of the given kind
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
            payload_type: None,
        }
    }

    /// Set the nominal parent
    pub fn extends(mut self, parent: &TypeRef) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Declare a nominally implemented interface
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Restrict instances to payloads of type `T`
    pub fn payload<T: Any>(mut self) -> Self {
        self.payload_type = Some(TypeId::of::<T>());
        self
    }

    /// Add a method
    pub fn method(mut self, def: MemberDef) -> Self {
        self.methods.push(def);
        self
    }

    /// Add a property or indexer
    pub fn property(mut self, def: PropertyDef) -> Self {
        self.properties.push(def);
        self
    }

    /// Add an event
    pub fn event(mut self, def: EventDef) -> Self {
        self.events.push(def);
        self
    }

    /// Finish the descriptor.
    ///
    /// Fails with `InvalidArguments` if two accessors share a signature.
    pub fn build(self) -> ProxyResult<TypeRef> {
        let descriptor = TypeDescriptor {
            id: NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed),
            name: self.name,
            kind: self.kind,
            parent: self.parent,
            interfaces: self.interfaces,
            methods: self.methods.into_iter().map(Arc::new).collect(),
            properties: self.properties.into_iter().map(Arc::new).collect(),
            events: self.events.into_iter().map(Arc::new).collect(),
            payload_type: self.payload_type,
        };

        let mut seen = FxHashSet::default();
        for accessor in descriptor.accessors() {
            let signature = accessor.signature();
            if !seen.insert(signature.clone()) {
                return Err(ProxyError::InvalidArguments(format!(
                    "duplicate member {} on {}",
                    signature, descriptor.name
                )));
            }
        }

        Ok(Arc::new(descriptor))
    }
}

// ============================================================================
// TypeBuilder
// ============================================================================

/// Borrow the receiver's payload as `T`
fn receiver<T: Any>(value: &Value) -> ProxyResult<&T> {
    value
        .as_object()
        .and_then(|o| o.downcast_ref::<T>())
        .ok_or_else(|| ProxyError::type_mismatch(std::any::type_name::<T>(), value.type_name()))
}

/// Typed builder for host structs.
///
/// Every closure receives `&T`; the payload uses interior mutability for
/// writable state.
pub struct TypeBuilder<T> {
    inner: DescriptorBuilder,
    visibility: Visibility,
    _payload: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> TypeBuilder<T> {
    /// Start a class descriptor for payload `T`
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            inner: DescriptorBuilder::new(name, TypeKind::Class).payload::<T>(),
            visibility: Visibility::Public,
            _payload: PhantomData,
        }
    }

    /// Set the nominal parent
    pub fn extends(mut self, parent: &TypeRef) -> Self {
        self.inner = self.inner.extends(parent);
        self
    }

    /// Declare a nominally implemented interface
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.inner = self.inner.implements(interface);
        self
    }

    /// Mark the next member non-public
    pub fn non_public(mut self) -> Self {
        self.visibility = Visibility::NonPublic;
        self
    }

    fn take_visibility(&mut self) -> Visibility {
        std::mem::replace(&mut self.visibility, Visibility::Public)
    }

    /// Add a method
    pub fn method<F>(
        mut self,
        name: impl Into<String>,
        params: impl IntoIterator<Item = TypeDesc>,
        returns: TypeDesc,
        f: F,
    ) -> Self
    where
        F: Fn(&T, &[Value]) -> ProxyResult<Value> + Send + Sync + 'static,
    {
        let invoker: Invoker = Arc::new(move |this, args| f(receiver::<T>(this)?, args));
        let def = MemberDef::new(
            MemberKind::Method,
            name,
            params.into_iter().collect(),
            returns,
        )
        .with_visibility(self.take_visibility())
        .with_invoker(invoker);
        self.inner = self.inner.method(def);
        self
    }

    /// Add a read-write property
    pub fn property<G, S>(mut self, name: impl Into<String>, ty: TypeDesc, get: G, set: S) -> Self
    where
        G: Fn(&T) -> ProxyResult<Value> + Send + Sync + 'static,
        S: Fn(&T, Value) -> ProxyResult<()> + Send + Sync + 'static,
    {
        let visibility = self.take_visibility();
        let def = PropertyDef::new(name, ty)
            .with_getter(Some(getter_invoker(get)), visibility)
            .with_setter(Some(setter_invoker(set)), visibility);
        self.inner = self.inner.property(def);
        self
    }

    /// Add a read-only property
    pub fn readonly_property<G>(mut self, name: impl Into<String>, ty: TypeDesc, get: G) -> Self
    where
        G: Fn(&T) -> ProxyResult<Value> + Send + Sync + 'static,
    {
        let visibility = self.take_visibility();
        let def = PropertyDef::new(name, ty).with_getter(Some(getter_invoker(get)), visibility);
        self.inner = self.inner.property(def);
        self
    }

    /// Add a write-only property
    pub fn writeonly_property<S>(mut self, name: impl Into<String>, ty: TypeDesc, set: S) -> Self
    where
        S: Fn(&T, Value) -> ProxyResult<()> + Send + Sync + 'static,
    {
        let visibility = self.take_visibility();
        let def = PropertyDef::new(name, ty).with_setter(Some(setter_invoker(set)), visibility);
        self.inner = self.inner.property(def);
        self
    }

    /// Add a read-write indexer
    pub fn indexer<G, S>(
        mut self,
        index_params: impl IntoIterator<Item = TypeDesc>,
        ty: TypeDesc,
        get: G,
        set: S,
    ) -> Self
    where
        G: Fn(&T, &[Value]) -> ProxyResult<Value> + Send + Sync + 'static,
        S: Fn(&T, &[Value], Value) -> ProxyResult<()> + Send + Sync + 'static,
    {
        let visibility = self.take_visibility();
        let get: Invoker = Arc::new(move |this, args| get(receiver::<T>(this)?, args));
        let set: Invoker = Arc::new(move |this, args| {
            let (value, indexes) = split_value(args)?;
            set(receiver::<T>(this)?, indexes, value.clone())?;
            Ok(Value::Unit)
        });
        let def = PropertyDef::indexer(index_params.into_iter().collect(), ty)
            .with_getter(Some(get), visibility)
            .with_setter(Some(set), visibility);
        self.inner = self.inner.property(def);
        self
    }

    /// Add a read-only indexer
    pub fn readonly_indexer<G>(
        mut self,
        index_params: impl IntoIterator<Item = TypeDesc>,
        ty: TypeDesc,
        get: G,
    ) -> Self
    where
        G: Fn(&T, &[Value]) -> ProxyResult<Value> + Send + Sync + 'static,
    {
        let visibility = self.take_visibility();
        let get: Invoker = Arc::new(move |this, args| get(receiver::<T>(this)?, args));
        let def = PropertyDef::indexer(index_params.into_iter().collect(), ty)
            .with_getter(Some(get), visibility);
        self.inner = self.inner.property(def);
        self
    }

    /// Add an event; `add` and `remove` receive the handler
    pub fn event<A, R>(mut self, name: impl Into<String>, add: A, remove: R) -> Self
    where
        A: Fn(&T, HandlerRef) -> ProxyResult<()> + Send + Sync + 'static,
        R: Fn(&T, HandlerRef) -> ProxyResult<()> + Send + Sync + 'static,
    {
        let visibility = self.take_visibility();
        let def = EventDef::new(
            name,
            TypeDesc::Handler,
            Some(handler_invoker(add)),
            Some(handler_invoker(remove)),
            visibility,
        );
        self.inner = self.inner.event(def);
        self
    }

    /// Finish the descriptor
    pub fn build(self) -> ProxyResult<TypeRef> {
        self.inner.build()
    }
}

fn getter_invoker<T, G>(get: G) -> Invoker
where
    T: Any,
    G: Fn(&T) -> ProxyResult<Value> + Send + Sync + 'static,
{
    Arc::new(move |this, _| get(receiver::<T>(this)?))
}

fn setter_invoker<T, S>(set: S) -> Invoker
where
    T: Any,
    S: Fn(&T, Value) -> ProxyResult<()> + Send + Sync + 'static,
{
    Arc::new(move |this, args| {
        let (value, _) = split_value(args)?;
        set(receiver::<T>(this)?, value.clone())?;
        Ok(Value::Unit)
    })
}

fn handler_invoker<T, F>(f: F) -> Invoker
where
    T: Any,
    F: Fn(&T, HandlerRef) -> ProxyResult<()> + Send + Sync + 'static,
{
    Arc::new(move |this, args| {
        let handler = match args.first() {
            Some(Value::Handler(h)) => h.clone(),
            Some(other) => return Err(ProxyError::type_mismatch("handler", other.type_name())),
            None => return Err(ProxyError::InvalidArguments("missing handler".to_string())),
        };
        f(receiver::<T>(this)?, handler)?;
        Ok(Value::Unit)
    })
}

/// Split setter arguments into the trailing value and the index arguments
fn split_value(args: &[Value]) -> ProxyResult<(&Value, &[Value])> {
    args.split_last()
        .ok_or_else(|| ProxyError::InvalidArguments("missing value argument".to_string()))
}

// ============================================================================
// InterfaceBuilder
// ============================================================================

/// Declared accessors of an interface property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Getter only
    Read,
    /// Setter only
    Write,
    /// Getter and setter
    ReadWrite,
}

impl Access {
    /// Check if a getter is declared
    pub fn can_read(self) -> bool {
        matches!(self, Access::Read | Access::ReadWrite)
    }

    /// Check if a setter is declared
    pub fn can_write(self) -> bool {
        matches!(self, Access::Write | Access::ReadWrite)
    }
}

/// Builder for interface contracts
pub struct InterfaceBuilder {
    inner: DescriptorBuilder,
}

impl InterfaceBuilder {
    /// Start an interface
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: DescriptorBuilder::new(name, TypeKind::Interface),
        }
    }

    /// Require a method
    pub fn method(
        mut self,
        name: impl Into<String>,
        params: impl IntoIterator<Item = TypeDesc>,
        returns: TypeDesc,
    ) -> Self {
        let def = MemberDef::new(
            MemberKind::Method,
            name,
            params.into_iter().collect(),
            returns,
        );
        self.inner = self.inner.method(def);
        self
    }

    /// Require a property
    pub fn property(mut self, name: impl Into<String>, ty: TypeDesc, access: Access) -> Self {
        let def = with_access(PropertyDef::new(name, ty), access);
        self.inner = self.inner.property(def);
        self
    }

    /// Require an indexer
    pub fn indexer(
        mut self,
        index_params: impl IntoIterator<Item = TypeDesc>,
        ty: TypeDesc,
        access: Access,
    ) -> Self {
        let def = with_access(
            PropertyDef::indexer(index_params.into_iter().collect(), ty),
            access,
        );
        self.inner = self.inner.property(def);
        self
    }

    /// Require an event
    pub fn event(mut self, name: impl Into<String>) -> Self {
        let def = EventDef::new(name, TypeDesc::Handler, None, None, Visibility::Public);
        self.inner = self.inner.event(def);
        self
    }

    /// Finish the interface
    pub fn build(self) -> ProxyResult<TypeRef> {
        self.inner.build()
    }
}

fn with_access(mut def: PropertyDef, access: Access) -> PropertyDef {
    if access.can_read() {
        def = def.with_getter(None, Visibility::Public);
    }
    if access.can_write() {
        def = def.with_setter(None, Visibility::Public);
    }
    def
}
