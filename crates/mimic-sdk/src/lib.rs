//! Mimic SDK - types for describing host types to the mimic engine
//!
//! Rust has no runtime reflection, so every type that should be reachable
//! through a facade or an adapter is described once: its methods,
//! properties, indexers and events, each backed by an erased closure.
//!
//! # Example
//!
//! ```ignore
//! use mimic_sdk::{arg, ObjectRef, TypeBuilder, TypeDesc, Value};
//!
//! struct Dummy;
//!
//! let dummy = TypeBuilder::<Dummy>::class("DummyClass")
//!     .method("GetInt", [TypeDesc::I32], TypeDesc::I32, |_, args| {
//!         Ok(Value::I32(arg(args, 0)?))
//!     })
//!     .build()?;
//! let instance = ObjectRef::new(&dummy, Dummy)?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod convert;
pub mod descriptor;
pub mod error;
pub mod module;
pub mod object;
pub mod types;
pub mod value;

pub use convert::{arg, FromValue};
pub use descriptor::{
    Access, DescriptorBuilder, EventDef, InterfaceBuilder, Invoker, MemberDef, MemberKind,
    MemberSignature, PropertyDef, TypeBuilder, TypeDescriptor, TypeKind, TypeRef, Visibility,
    INDEXER_NAME, OBJECT_TYPE_NAME,
};
pub use error::{ProxyError, ProxyResult};
pub use module::{Constructor, TypeModule, MODULE_INIT_SYMBOL};
pub use object::{ArrayRef, HandlerFn, HandlerRef, ObjectRef};
pub use types::{format_params, TypeDesc};
pub use value::Value;
