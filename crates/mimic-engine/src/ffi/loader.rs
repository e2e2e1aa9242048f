//! Type module loading
//!
//! A type module is a shared library (.so, .dylib) exporting
//! `mimic_module_init`, which returns a boxed `TypeModule`. A library that
//! yields a module is never unloaded: the module's invokers, and every
//! descriptor and facade built from them, point into library code.

#[cfg(unix)]
use std::ffi::{CStr, CString};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mimic_sdk::{ProxyError, TypeModule, MODULE_INIT_SYMBOL};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading a type module
#[derive(Debug, Error)]
pub enum LoadError {
    /// Library file not found or could not be loaded
    #[error("Library not found: {path}")]
    NotFound {
        /// Path that was attempted
        path: String,
    },

    /// Symbol not found in library
    #[error("Symbol not found: {symbol} in {library}")]
    SymbolNotFound {
        /// Symbol name that was not found
        symbol: String,
        /// Library path
        library: String,
    },

    /// Module initialization failed
    #[error("Invalid module initialization: {0}")]
    InvalidInit(String),

    /// Platform-specific error
    #[error("Platform error: {0}")]
    PlatformError(String),

    /// Invalid path encoding
    #[error("Invalid UTF-8 in path: {0}")]
    InvalidPath(String),
}

impl From<LoadError> for ProxyError {
    fn from(err: LoadError) -> Self {
        ProxyError::Load(err.to_string())
    }
}

/// Loaded shared library
pub struct Library {
    handle: LibraryHandle,
    path: String,
}

impl Library {
    /// Open a shared library with `dlopen(RTLD_NOW | RTLD_LOCAL)`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path_ref = path.as_ref();
        let path_str = path_ref
            .to_str()
            .ok_or_else(|| LoadError::InvalidPath(format!("{:?}", path_ref)))?;

        let handle = LibraryHandle::load(path_str)?;

        Ok(Library {
            handle,
            path: path_str.to_string(),
        })
    }

    /// Look up a symbol.
    ///
    /// # Safety
    ///
    /// `T` must match the symbol's real type, and the library must stay
    /// loaded while the result is used.
    pub unsafe fn get<T>(&self, symbol: &str) -> Result<T, LoadError> {
        self.handle.symbol(symbol, &self.path)
    }

    /// Call the library's `mimic_module_init` and take ownership of the
    /// returned module. On success the library is kept resident.
    pub fn load_module(self) -> Result<Arc<TypeModule>, LoadError> {
        type InitFn = extern "C" fn() -> *mut TypeModule;

        let init: InitFn = unsafe { self.get(MODULE_INIT_SYMBOL)? };
        let module_ptr = init();
        if module_ptr.is_null() {
            return Err(LoadError::InvalidInit(format!(
                "{} returned null",
                MODULE_INIT_SYMBOL
            )));
        }

        // The init function hands over a Box::into_raw pointer
        let module = unsafe { Box::from_raw(module_ptr) };
        debug!(
            library = %self.path,
            module = module.name(),
            types = module.type_names().len(),
            "loaded type module"
        );
        self.keep_resident();
        Ok(Arc::new(*module))
    }

    /// Keep the library mapped for the rest of the process
    pub fn keep_resident(self) {
        std::mem::forget(self.handle);
    }

    /// Path the library was loaded from
    pub fn path(&self) -> &str {
        &self.path
    }
}

// ============================================================================
// Module sources
// ============================================================================

/// Where type modules come from
pub trait ModuleSource: Send + Sync {
    /// Load (or look up) the module at `path`
    fn load(&self, path: &Path) -> Result<Arc<TypeModule>, LoadError>;
}

/// Loads modules from shared libraries, once per path
#[derive(Default)]
pub struct DylibSource {
    loaded: Mutex<FxHashMap<PathBuf, Arc<TypeModule>>>,
}

impl DylibSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of libraries loaded through this source
    pub fn library_count(&self) -> usize {
        self.loaded.lock().len()
    }
}

impl ModuleSource for DylibSource {
    fn load(&self, path: &Path) -> Result<Arc<TypeModule>, LoadError> {
        let mut loaded = self.loaded.lock();
        if let Some(module) = loaded.get(path) {
            return Ok(module.clone());
        }
        let module = Library::open(path)?.load_module()?;
        loaded.insert(path.to_path_buf(), module.clone());
        Ok(module)
    }
}

/// In-process modules registered under a path
#[derive(Default)]
pub struct StaticSource {
    modules: RwLock<FxHashMap<PathBuf, Arc<TypeModule>>>,
}

impl StaticSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `module` under `path`, replacing any previous one
    pub fn register(&self, path: impl Into<PathBuf>, module: TypeModule) -> Arc<TypeModule> {
        let module = Arc::new(module);
        self.modules.write().insert(path.into(), module.clone());
        module
    }
}

impl ModuleSource for StaticSource {
    fn load(&self, path: &Path) -> Result<Arc<TypeModule>, LoadError> {
        self.modules
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                path: path.display().to_string(),
            })
    }
}

#[cfg(unix)]
type LibraryHandle = UnixLibrary;

#[cfg(not(unix))]
type LibraryHandle = UnsupportedLibrary;

#[cfg(unix)]
struct UnixLibrary {
    handle: *mut std::ffi::c_void,
}

#[cfg(unix)]
fn dl_error() -> Option<String> {
    let err_ptr = unsafe { libc::dlerror() };
    if err_ptr.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(err_ptr) }.to_string_lossy().into_owned())
    }
}

#[cfg(unix)]
impl UnixLibrary {
    fn load(path: &str) -> Result<Self, LoadError> {
        let c_path = CString::new(path)
            .map_err(|e| LoadError::PlatformError(format!("Invalid path: {}", e)))?;

        let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
        if handle.is_null() {
            let error = dl_error().unwrap_or_else(|| "unknown dlopen error".to_string());
            return Err(LoadError::NotFound {
                path: format!("{}: {}", path, error),
            });
        }
        Ok(UnixLibrary { handle })
    }

    unsafe fn symbol<T>(&self, name: &str, lib_path: &str) -> Result<T, LoadError> {
        let c_name = CString::new(name)
            .map_err(|e| LoadError::PlatformError(format!("Invalid symbol name: {}", e)))?;

        // Clear stale state so a null symbol can be told apart from a failure
        dl_error();
        let symbol = libc::dlsym(self.handle, c_name.as_ptr());
        let library = match dl_error() {
            Some(error) => format!("{}: {}", lib_path, error),
            None if symbol.is_null() => lib_path.to_string(),
            None => return Ok(std::mem::transmute_copy(&symbol)),
        };
        Err(LoadError::SymbolNotFound {
            symbol: name.to_string(),
            library,
        })
    }
}

#[cfg(unix)]
impl Drop for UnixLibrary {
    fn drop(&mut self) {
        unsafe {
            libc::dlclose(self.handle);
        }
    }
}

#[cfg(unix)]
unsafe impl Send for UnixLibrary {}
#[cfg(unix)]
unsafe impl Sync for UnixLibrary {}

#[cfg(not(unix))]
struct UnsupportedLibrary;

#[cfg(not(unix))]
impl UnsupportedLibrary {
    fn load(path: &str) -> Result<Self, LoadError> {
        Err(LoadError::PlatformError(format!(
            "shared library modules are not supported on this platform: {}",
            path
        )))
    }

    unsafe fn symbol<T>(&self, name: &str, lib_path: &str) -> Result<T, LoadError> {
        Err(LoadError::SymbolNotFound {
            symbol: name.to_string(),
            library: lib_path.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_not_found() {
        let result = Library::open("/nonexistent/libmodule.so");
        assert!(matches!(result, Err(LoadError::NotFound { .. })));
    }

    #[test]
    fn test_dylib_source_missing_library() {
        let source = DylibSource::new();
        let err = source.load(Path::new("/nonexistent/libmodule.so"));
        assert!(matches!(err, Err(LoadError::NotFound { .. })));
        assert_eq!(source.library_count(), 0);
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn test_resident_library_outlives_handle() {
        let library = Library::open("libm.so.6").unwrap();
        let cos: extern "C" fn(f64) -> f64 = unsafe { library.get("cos").unwrap() };
        library.keep_resident();
        assert_eq!(cos(0.0), 1.0);
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn test_library_without_init_symbol() {
        let library = Library::open("libm.so.6").unwrap();
        assert!(matches!(
            library.load_module(),
            Err(LoadError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn test_static_source_lookup() {
        let source = StaticSource::new();
        let registered = source.register("mem://core", TypeModule::new("core", "1.0.0"));
        let loaded = source.load(Path::new("mem://core")).unwrap();
        assert!(Arc::ptr_eq(&registered, &loaded));
        assert!(source.load(Path::new("mem://other")).is_err());
    }

    #[test]
    fn test_load_error_converts() {
        let err: ProxyError = LoadError::InvalidInit("null".to_string()).into();
        assert!(matches!(err, ProxyError::Load(_)));
    }
}
