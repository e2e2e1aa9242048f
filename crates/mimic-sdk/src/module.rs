//! Type modules: named collections of constructible types
//!
//! A module is what a loader hands back for a path. Dynamic libraries export
//! `mimic_module_init`, returning a boxed `TypeModule`:
//!
//! ```ignore
//! #[no_mangle]
//! pub extern "C" fn mimic_module_init() -> *mut TypeModule {
//!     let mut module = TypeModule::new("shapes", "1.0.0");
//!     module.register_type(&circle_type, |args| { ... });
//!     Box::into_raw(Box::new(module))
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::TypeRef;
use crate::error::{ProxyError, ProxyResult};
use crate::value::Value;

/// Exported module entry point symbol
pub const MODULE_INIT_SYMBOL: &str = "mimic_module_init";

/// Constructor: builds an instance from constructor arguments
pub type Constructor = Arc<dyn Fn(&[Value]) -> ProxyResult<Value> + Send + Sync>;

struct TypeEntry {
    descriptor: TypeRef,
    constructor: Constructor,
}

/// Module of named, constructible types
pub struct TypeModule {
    name: String,
    version: String,
    types: HashMap<String, TypeEntry>,
}

impl TypeModule {
    /// Create an empty module.
    ///
    /// # Arguments
    /// * `name` - Module name
    /// * `version` - Semantic version (e.g., "1.0.0")
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        TypeModule {
            name: name.into(),
            version: version.into(),
            types: HashMap::new(),
        }
    }

    /// Register a type under its descriptor name
    pub fn register_type<F>(&mut self, descriptor: &TypeRef, constructor: F)
    where
        F: Fn(&[Value]) -> ProxyResult<Value> + Send + Sync + 'static,
    {
        self.types.insert(
            descriptor.name().to_string(),
            TypeEntry {
                descriptor: descriptor.clone(),
                constructor: Arc::new(constructor),
            },
        );
    }

    /// Get module name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get module version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get a type descriptor by name
    pub fn get_type(&self, name: &str) -> Option<&TypeRef> {
        self.types.get(name).map(|e| &e.descriptor)
    }

    /// Get all type names
    pub fn type_names(&self) -> Vec<&str> {
        self.types.keys().map(|s| s.as_str()).collect()
    }

    /// Construct an instance of `type_name`.
    ///
    /// Fails with `TypeNotFound` if the module has no such type.
    pub fn instantiate(&self, type_name: &str, args: &[Value]) -> ProxyResult<Value> {
        let entry = self
            .types
            .get(type_name)
            .ok_or_else(|| ProxyError::TypeNotFound {
                type_name: type_name.to_string(),
                module: self.name.clone(),
            })?;
        (entry.constructor)(args)
    }
}

impl std::fmt::Debug for TypeModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeModule")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("types", &self.type_names())
            .finish()
    }
}
