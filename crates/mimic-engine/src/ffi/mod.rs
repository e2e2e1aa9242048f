//! Type module loading
//!
//! This module provides:
//! - Shared library loading (Library)
//! - Module sources: shared libraries (DylibSource) and in-process
//!   registrations (StaticSource)

pub mod loader;

pub use loader::{DylibSource, Library, LoadError, ModuleSource, StaticSource};
pub use mimic_sdk::{Constructor, TypeModule, MODULE_INIT_SYMBOL};
