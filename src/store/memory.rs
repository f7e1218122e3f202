//! In-memory store.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{LocalStore, StoreError, validate_name};

/// Process-local store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<(String, String), String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys across all namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn slot(namespace: &str, key: &str) -> Result<(String, String), StoreError> {
    Ok((
        validate_name(namespace)?.to_string(),
        validate_name(key)?.to_string(),
    ))
}

#[async_trait::async_trait]
impl LocalStore for MemoryStore {
    async fn get_item(&self, namespace: &str, key: &str) -> Result<Option<String>, StoreError> {
        let slot = slot(namespace, key)?;
        Ok(self.items.read().unwrap().get(&slot).cloned())
    }

    async fn set_item(&self, namespace: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let slot = slot(namespace, key)?;
        self.items.write().unwrap().insert(slot, value.to_string());
        Ok(())
    }

    async fn remove_item(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
        let slot = slot(namespace, key)?;
        self.items.write().unwrap().remove(&slot);
        Ok(())
    }
}
