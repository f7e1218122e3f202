//! Filesystem-backed store.

use std::path::PathBuf;

use super::{LocalStore, StoreError, validate_name};

/// Stores each key as `<root>/<namespace>/<key>.json`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader never sees a half-written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, namespace: &str, key: &str) -> Result<PathBuf, StoreError> {
        Ok(self
            .root
            .join(validate_name(namespace)?)
            .join(format!("{}.json", validate_name(key)?)))
    }
}

#[async_trait::async_trait]
impl LocalStore for FileStore {
    async fn get_item(&self, namespace: &str, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(namespace, key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, namespace: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(namespace, key)?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let tmp = path.with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove_item(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(namespace, key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert_eq!(store.get_item("visitor-1", "history").await.unwrap(), None);

        store.set_item("visitor-1", "history", "[1]").await.unwrap();
        store.set_item("visitor-1", "history", "[1,2]").await.unwrap();
        assert_eq!(
            store.get_item("visitor-1", "history").await.unwrap().as_deref(),
            Some("[1,2]")
        );
        assert!(dir.path().join("visitor-1").join("history.json").exists());

        store.remove_item("visitor-1", "history").await.unwrap();
        assert_eq!(store.get_item("visitor-1", "history").await.unwrap(), None);
        // Removing twice is fine.
        store.remove_item("visitor-1", "history").await.unwrap();
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.set_item("a", "k", "one").await.unwrap();
        assert_eq!(store.get_item("b", "k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let err = store.set_item("..", "k", "x").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidName(_)));
    }
}
