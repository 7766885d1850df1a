//! The key-value store a script runs against.
//!
//! [`Store`] is the capability the dispatcher consumes. Anything implementing
//! it can back a script run; [`MemoryStore`] is the implementation shipped
//! with the crate.

use crate::error::ErrorCode;
use std::collections::BTreeMap;

/// Namespaced key-value operations.
///
/// Keys are unique within a namespace only. Errors are returned as
/// [`ErrorCode`] and passed through to the script runner unchanged, so
/// implementations decide which codes they produce.
pub trait Store {
    /// Create an empty namespace.
    fn create_namespace(&mut self, namespace: &str) -> Result<(), ErrorCode>;

    /// Remove a namespace together with all of its keys.
    fn erase_namespace(&mut self, namespace: &str) -> Result<(), ErrorCode>;

    /// Insert a new key.
    fn insert(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), ErrorCode>;

    /// Look up the value stored under `key`.
    fn get(&self, namespace: &str, key: &str) -> Result<String, ErrorCode>;

    /// Replace the value of an existing key.
    fn update(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), ErrorCode>;

    /// Remove a key.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), ErrorCode>;

    /// Names of all namespaces.
    fn namespaces(&self) -> Vec<String>;

    /// All `(key, value)` pairs of a namespace.
    fn entries(&self, namespace: &str) -> Result<Vec<(String, String)>, ErrorCode>;
}

/// In-memory [`Store`] built on ordered maps.
///
/// Listing operations return namespaces and keys in lexicographic order.
/// `insert` creates the namespace on first use; every other key operation
/// requires the namespace to exist. Dropping the store releases everything.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    namespaces: BTreeMap<String, BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every namespace and key.
    pub fn clear(&mut self) {
        self.namespaces.clear();
    }

    fn namespace(&self, namespace: &str) -> Result<&BTreeMap<String, String>, ErrorCode> {
        self.namespaces
            .get(namespace)
            .ok_or_else(|| ErrorCode::namespace_not_found(namespace))
    }

    fn namespace_mut(
        &mut self,
        namespace: &str,
    ) -> Result<&mut BTreeMap<String, String>, ErrorCode> {
        self.namespaces
            .get_mut(namespace)
            .ok_or_else(|| ErrorCode::namespace_not_found(namespace))
    }
}

impl Store for MemoryStore {
    fn create_namespace(&mut self, namespace: &str) -> Result<(), ErrorCode> {
        if self.namespaces.contains_key(namespace) {
            return Err(ErrorCode::NamespaceExists {
                namespace: namespace.to_string(),
            });
        }
        self.namespaces
            .insert(namespace.to_string(), BTreeMap::new());
        Ok(())
    }

    fn erase_namespace(&mut self, namespace: &str) -> Result<(), ErrorCode> {
        self.namespaces
            .remove(namespace)
            .map(|_| ())
            .ok_or_else(|| ErrorCode::namespace_not_found(namespace))
    }

    fn insert(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), ErrorCode> {
        let entries = self.namespaces.entry(namespace.to_string()).or_default();
        if entries.contains_key(key) {
            return Err(ErrorCode::KeyExists {
                namespace: namespace.to_string(),
                key: key.to_string(),
            });
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, namespace: &str, key: &str) -> Result<String, ErrorCode> {
        self.namespace(namespace)?
            .get(key)
            .cloned()
            .ok_or_else(|| ErrorCode::key_not_found(namespace, key))
    }

    fn update(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), ErrorCode> {
        let slot = self
            .namespace_mut(namespace)?
            .get_mut(key)
            .ok_or_else(|| ErrorCode::key_not_found(namespace, key))?;
        *slot = value.to_string();
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), ErrorCode> {
        self.namespace_mut(namespace)?
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| ErrorCode::key_not_found(namespace, key))
    }

    fn namespaces(&self) -> Vec<String> {
        self.namespaces.keys().cloned().collect()
    }

    fn entries(&self, namespace: &str) -> Result<Vec<(String, String)>, ErrorCode> {
        Ok(self
            .namespace(namespace)?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
