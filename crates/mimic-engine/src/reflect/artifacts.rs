//! Adapter manifests
//!
//! A manifest describes every adapter type a synthesizer has built: its
//! name, interface and forwarding slots. It is written as pretty JSON for
//! inspection; nothing is ever re-executed from it.
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "adapters": [
//!     {
//!       "name": "IDummyInterfaceAdapter",
//!       "interface": "IDummyInterface",
//!       "slots": [
//!         { "kind": "method", "name": "GetInt", "params": ["i32"], "return_type": "i32" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mimic_sdk::{PropertyDef, ProxyError, ProxyResult, TypeDesc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::adapter::AdapterType;
use crate::defaults::{MANIFEST_FILE_NAME, MANIFEST_FORMAT_VERSION};

/// Errors writing or reading a manifest
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// File system failure
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// Malformed manifest
    #[error("Invalid manifest: {0}")]
    Json(#[from] serde_json::Error),

    /// Manifest written by an incompatible version
    #[error("Unsupported manifest version {0}")]
    UnsupportedVersion(u32),
}

impl From<ArtifactError> for ProxyError {
    fn from(err: ArtifactError) -> Self {
        ProxyError::Artifact(err.to_string())
    }
}

/// Kind of a forwarding slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    /// Method
    Method,
    /// Plain property
    Property,
    /// Indexer
    Indexer,
    /// Event
    Event,
}

/// Declared accessors of a property slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotAccess {
    /// Getter only
    Read,
    /// Setter only
    Write,
    /// Getter and setter
    ReadWrite,
}

/// One forwarding slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEntry {
    /// Slot kind
    pub kind: SlotKind,
    /// Member name
    pub name: String,
    /// Parameter types (index parameters for indexers, handler for events)
    pub params: Vec<String>,
    /// Return or value type
    pub return_type: String,
    /// Declared accessors, for properties and indexers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<SlotAccess>,
}

/// One adapter type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterEntry {
    /// Adapter type name
    pub name: String,
    /// Implemented interface
    pub interface: String,
    /// Forwarding slots: methods, properties, indexers, events
    pub slots: Vec<SlotEntry>,
}

/// Description of synthesized adapter types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterManifest {
    /// Manifest format version
    pub format_version: u32,
    /// Adapter types, ordered by name
    pub adapters: Vec<AdapterEntry>,
}

fn rendered(types: &[TypeDesc]) -> Vec<String> {
    types.iter().map(|t| t.to_string()).collect()
}

fn property_slot(kind: SlotKind, property: &PropertyDef) -> SlotEntry {
    let access = match (property.can_read(), property.can_write()) {
        (true, true) => Some(SlotAccess::ReadWrite),
        (true, false) => Some(SlotAccess::Read),
        (false, true) => Some(SlotAccess::Write),
        (false, false) => None,
    };
    SlotEntry {
        kind,
        name: property.name.clone(),
        params: rendered(&property.index_params),
        return_type: property.property_type.to_string(),
        access,
    }
}

impl AdapterEntry {
    /// Describe one adapter type
    pub fn from_type(adapter_type: &AdapterType) -> Self {
        let contract = adapter_type.contract();
        let methods = contract.methods().iter().map(|m| SlotEntry {
            kind: SlotKind::Method,
            name: m.name.clone(),
            params: rendered(&m.params),
            return_type: m.return_type.to_string(),
            access: None,
        });
        let properties = contract
            .properties()
            .iter()
            .map(|p| property_slot(SlotKind::Property, p));
        let indexers = contract
            .indexers()
            .iter()
            .map(|p| property_slot(SlotKind::Indexer, p));
        let events = contract.events().iter().map(|e| SlotEntry {
            kind: SlotKind::Event,
            name: e.name.clone(),
            params: vec![e.handler_type.to_string()],
            return_type: TypeDesc::Void.to_string(),
            access: None,
        });

        AdapterEntry {
            name: adapter_type.name().to_string(),
            interface: adapter_type.interface().name().to_string(),
            slots: methods.chain(properties).chain(indexers).chain(events).collect(),
        }
    }
}

impl AdapterManifest {
    /// Describe the given adapter types
    pub fn from_types(types: &[Arc<AdapterType>]) -> Self {
        AdapterManifest {
            format_version: MANIFEST_FORMAT_VERSION,
            adapters: types.iter().map(|t| AdapterEntry::from_type(t)).collect(),
        }
    }

    /// Find an adapter entry by interface name
    pub fn adapter_for(&self, interface: &str) -> Option<&AdapterEntry> {
        self.adapters.iter().find(|a| a.interface == interface)
    }

    /// Write as pretty JSON. A directory path gets the default file name.
    /// Returns the written file path.
    pub fn save(&self, path: impl AsRef<Path>) -> ProxyResult<PathBuf> {
        let path = resolve_path(path.as_ref());
        let json = serde_json::to_string_pretty(self).map_err(ArtifactError::from)?;
        fs::write(&path, json).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), adapters = self.adapters.len(), "saved adapter manifest");
        Ok(path)
    }

    /// Read a manifest written by `save`
    pub fn load(path: impl AsRef<Path>) -> ProxyResult<Self> {
        let path = resolve_path(path.as_ref());
        let json = fs::read_to_string(&path).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let manifest: AdapterManifest =
            serde_json::from_str(&json).map_err(ArtifactError::from)?;
        if manifest.format_version != MANIFEST_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion(manifest.format_version).into());
        }
        Ok(manifest)
    }
}

/// Read a manifest from `path`
pub fn load_manifest(path: impl AsRef<Path>) -> ProxyResult<AdapterManifest> {
    AdapterManifest::load(path)
}

fn resolve_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(MANIFEST_FILE_NAME)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::adapter::AdapterSynthesizer;
    use mimic_sdk::{Access, InterfaceBuilder};

    fn synthesizer_with_adapter() -> AdapterSynthesizer {
        let iface = InterfaceBuilder::new("IStore")
            .method("Clear", [], TypeDesc::Void)
            .property("Count", TypeDesc::I32, Access::Read)
            .indexer([TypeDesc::Str], TypeDesc::Any, Access::ReadWrite)
            .event("Changed")
            .build()
            .unwrap();
        let synthesizer = AdapterSynthesizer::new();
        synthesizer.get_or_build(&iface).unwrap();
        synthesizer
    }

    #[test]
    fn test_manifest_lists_slots() {
        let manifest = synthesizer_with_adapter().manifest();
        let entry = manifest.adapter_for("IStore").unwrap();
        assert_eq!(entry.name, "IStoreAdapter");
        let kinds: Vec<SlotKind> = entry.slots.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SlotKind::Method,
                SlotKind::Property,
                SlotKind::Indexer,
                SlotKind::Event
            ]
        );
        assert_eq!(entry.slots[1].access, Some(SlotAccess::Read));
        assert_eq!(entry.slots[2].params, vec!["string".to_string()]);
    }

    #[test]
    fn test_save_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let synthesizer = synthesizer_with_adapter();
        let path = synthesizer.save_manifest(dir.path()).unwrap();
        assert_eq!(path, dir.path().join(MANIFEST_FILE_NAME));
        assert_eq!(load_manifest(&path).unwrap(), synthesizer.manifest());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_manifest(&path), Err(ProxyError::Artifact(_))));
        assert!(matches!(
            load_manifest(dir.path().join("missing.json")),
            Err(ProxyError::Artifact(_))
        ));
    }

    #[test]
    fn test_load_rejects_other_versions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.json");
        fs::write(&path, r#"{ "format_version": 99, "adapters": [] }"#).unwrap();
        assert!(matches!(load_manifest(&path), Err(ProxyError::Artifact(_))));
    }
}
