//! Write-once registries.
//!
//! Process-wide tables (registered endpoints, for instance) are filled while
//! the application is assembled and never change afterwards. A
//! [`RegistryBuilder`] accepts entries; [`RegistryBuilder::freeze`] turns it
//! into a read-only [`Registry`] that can be shared across threads without
//! locking.

use indexmap::IndexMap;
use thiserror::Error;

/// Errors raised while populating a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// An entry with the same key was already registered.
    #[error("`{key}` is already registered in {registry}")]
    Duplicate {
        /// Registry name.
        registry: String,
        /// Offending key.
        key: String,
    },
}

/// Mutable registry used during application setup.
#[derive(Debug)]
pub struct RegistryBuilder<T> {
    name: String,
    entries: IndexMap<String, T>,
}

impl<T> RegistryBuilder<T> {
    /// An empty registry with a diagnostic name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: IndexMap::new(),
        }
    }

    /// Registers an entry. Keys must be unique.
    pub fn register(&mut self, key: impl Into<String>, value: T) -> Result<(), RegistryError> {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return Err(RegistryError::Duplicate {
                registry: self.name.clone(),
                key,
            });
        }
        self.entries.insert(key, value);
        Ok(())
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freezes the registry. No further writes are possible.
    #[must_use]
    pub fn freeze(self) -> Registry<T> {
        Registry {
            name: self.name,
            entries: self.entries,
        }
    }
}

/// Read-only registry, in registration order.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    name: String,
    entries: IndexMap<String, T>,
}

impl<T> Registry<T> {
    /// Registry name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up an entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    /// Iterates entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
