//! Facade configuration

use crate::defaults::DEFAULT_NOTIFY_CHANGES;
use crate::reflect::BindingFlags;

/// Behavior of an out-of-range native array read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutOfRangePolicy {
    /// Read yields `Value::Null`
    #[default]
    ReturnNull,
    /// Read fails with `IndexOutOfRange`
    Error,
}

/// Configuration for a `DynamicFacade`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Visibility admitted by late binding (default: public only)
    pub member_flags: BindingFlags,
    /// Out-of-range native array reads (default: `ReturnNull`)
    pub out_of_range: OutOfRangePolicy,
    /// Notify observers after `set_member` (default: true)
    pub notify_changes: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        ProxyConfig {
            member_flags: BindingFlags::PUBLIC,
            out_of_range: OutOfRangePolicy::ReturnNull,
            notify_changes: DEFAULT_NOTIFY_CHANGES,
        }
    }
}

impl ProxyConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Out-of-range reads fail instead of yielding `Null`
    pub fn strict() -> Self {
        Self {
            out_of_range: OutOfRangePolicy::Error,
            ..Self::default()
        }
    }

    /// Late binding also reaches non-public members
    pub fn unrestricted() -> Self {
        Self {
            member_flags: BindingFlags::ALL,
            ..Self::default()
        }
    }

    /// Set the binding visibility
    pub fn with_member_flags(mut self, flags: BindingFlags) -> Self {
        self.member_flags = flags;
        self
    }

    /// Enable or disable change notification
    pub fn with_notify_changes(mut self, notify: bool) -> Self {
        self.notify_changes = notify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let default = ProxyConfig::default();
        assert_eq!(default.member_flags, BindingFlags::PUBLIC);
        assert_eq!(default.out_of_range, OutOfRangePolicy::ReturnNull);
        assert!(default.notify_changes);

        assert_eq!(ProxyConfig::strict().out_of_range, OutOfRangePolicy::Error);
        assert_eq!(ProxyConfig::unrestricted().member_flags, BindingFlags::ALL);
        assert!(!ProxyConfig::new().with_notify_changes(false).notify_changes);
    }
}
