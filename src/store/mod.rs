//! Per-visitor key/value storage.
//!
//! Each visitor gets a namespace holding string values under string keys,
//! the server-side counterpart of the browser's local storage. The chat
//! widget keeps its whole history under one fixed key.
//!
//! # Implementations
//!
//! - [`FileStore`]: one JSON document per key under `<root>/<namespace>/`
//! - [`MemoryStore`]: process-local map, used by tests

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by store implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid namespace or key: {0:?}")]
    InvalidName(String),
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Key/value storage scoped by namespace.
#[async_trait::async_trait]
pub trait LocalStore: Send + Sync + std::fmt::Debug {
    /// Read `key` in `namespace`; `None` when absent.
    async fn get_item(&self, namespace: &str, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    async fn set_item(&self, namespace: &str, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`; deleting a missing key is not an error.
    async fn remove_item(&self, namespace: &str, key: &str) -> Result<(), StoreError>;
}

/// Namespaces and keys become path segments, so only a conservative
/// alphabet is accepted.
pub(crate) fn validate_name(name: &str) -> Result<&str, StoreError> {
    let ok = !name.is_empty()
        && name.len() <= 128
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(name)
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("slashtech_chat_history").is_ok());
        assert!(validate_name("3f1c2d9e-8f4b-4d0e-9c1e-7a2b5c6d7e8f").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("../etc").is_err());
        assert!(validate_name("a/b").is_err());
    }
}
