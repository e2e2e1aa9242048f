//! Late binding over type descriptors
//!
//! This module provides:
//! - Type introspection of runtime values (`introspector`, `builtins`)
//! - Member resolution and bound accessors (`binder`, `accessor`, `index`)
//! - Structural interface checks and adapter synthesis (`matcher`,
//!   `adapter`, `artifacts`)
//! - The late-bound facade (`facade`)

pub mod accessor;
pub mod adapter;
pub mod artifacts;
pub mod binder;
pub mod builtins;
pub mod facade;
pub mod index;
pub mod introspector;
pub mod matcher;

pub use accessor::{BoundAccessor, BoundEvent, BoundProperty};
pub use adapter::{AdapterInstance, AdapterSynthesizer, AdapterType};
pub use artifacts::{load_manifest, AdapterEntry, AdapterManifest, ArtifactError, SlotEntry};
pub use binder::{BindingFlags, MemberBinder};
pub use facade::{ChangeObserver, Conversion, DynamicFacade, SubscriptionId};
pub use index::IndexAccessor;
pub use introspector::{type_of, RuntimeIntrospector, TypeIntrospector};
pub use matcher::{InterfaceContract, StructuralMatcher};
