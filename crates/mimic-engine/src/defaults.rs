//! Default constants for proxy configuration.

/// Whether facades notify observers after a successful property set.
pub const DEFAULT_NOTIFY_CHANGES: bool = true;

/// Suffix appended to the interface name to form an adapter type name.
pub const ADAPTER_NAME_SUFFIX: &str = "Adapter";

/// File name used when saving the adapter manifest into a directory.
pub const MANIFEST_FILE_NAME: &str = "mimic-adapters.json";

/// Adapter manifest format version.
pub const MANIFEST_FORMAT_VERSION: u32 = 1;
