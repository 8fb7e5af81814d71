//! Name registry used to resolve indirection keys to concrete principals.

use std::collections::HashMap;
use std::sync::RwLock;

/// Maps a well-known key (e.g. `singleTenantAdminUserName`) to a name.
pub trait NameLookup: Send + Sync {
    fn lookup_name(&self, key: &str) -> Option<String>;
}

/// In-memory [`NameLookup`].
#[derive(Debug, Default)]
pub struct NameRegistry {
    names: RwLock<HashMap<String, String>>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: impl Into<String>, name: impl Into<String>) -> Self {
        self.register(key, name);
        self
    }

    /// Register (or replace) the name behind `key`.
    pub fn register(&self, key: impl Into<String>, name: impl Into<String>) {
        self.names
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.into(), name.into());
    }

    pub fn unregister(&self, key: &str) -> Option<String> {
        self.names
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(key)
    }
}

impl NameLookup for NameRegistry {
    fn lookup_name(&self, key: &str) -> Option<String> {
        self.names
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}
