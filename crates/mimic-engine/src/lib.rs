//! Mimic Engine
//!
//! Late-bound member access and structural interface adaptation over
//! described host types:
//! - **Facade**: get/set/invoke/index/events resolved at call time
//!   (`DynamicFacade`)
//! - **Adapters**: a value that structurally satisfies an interface is
//!   wrapped in a synthesized adapter (`AdapterSynthesizer`)
//! - **Modules**: described types loaded from shared libraries (`ffi`)
//!
//! # Example
//!
//! ```rust,ignore
//! use mimic_engine::{Conversion, DynamicFacade, Value};
//!
//! let facade = DynamicFacade::new(instance)?;
//! let n = facade.invoke_member("GetInt", &[Value::I32(12)])?;
//!
//! if let Conversion::Adapter(adapter) = facade.convert_to(&i_dummy)? {
//!     adapter.invoke("GetStringValue", &[Value::I32(1), Value::I32(2)])?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![allow(clippy::new_without_default)]

pub mod config;
pub mod defaults;
pub mod ffi;
pub mod reflect;

pub use config::{OutOfRangePolicy, ProxyConfig};
pub use ffi::{DylibSource, Library, LoadError, ModuleSource, StaticSource};
pub use reflect::{
    load_manifest, type_of, AdapterInstance, AdapterManifest, AdapterSynthesizer, AdapterType,
    BindingFlags, BoundAccessor, BoundEvent, BoundProperty, Conversion, DynamicFacade,
    IndexAccessor, InterfaceContract, MemberBinder, RuntimeIntrospector, StructuralMatcher,
    SubscriptionId, TypeIntrospector,
};

pub use mimic_sdk::{
    arg, Access, ArrayRef, FromValue, HandlerRef, InterfaceBuilder, ObjectRef, ProxyError,
    ProxyResult, TypeBuilder, TypeDesc, TypeModule, TypeRef, Value,
};
