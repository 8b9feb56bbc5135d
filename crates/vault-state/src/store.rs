//! KeyData stores - the replicas reconciliation runs between

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use vault_core::{Replica, UpdateResult, ValVer, VaultResult};

/// A replica of the vault that can be listed and written.
///
/// `keys` fails when the replica cannot be read at all. `set` never fails in
/// the `Result` sense: every outcome, including transport trouble, comes back
/// as an `UpdateResult`.
#[async_trait]
pub trait KeyData: Send + Sync {
    /// Full contents of the replica
    async fn keys(&self) -> VaultResult<Replica>;

    /// Replace `key` with `value` at `version`
    async fn set(&self, key: &str, value: &str, version: u64) -> UpdateResult;
}

#[async_trait]
impl<T: KeyData + ?Sized> KeyData for Arc<T> {
    async fn keys(&self) -> VaultResult<Replica> {
        (**self).keys().await
    }

    async fn set(&self, key: &str, value: &str, version: u64) -> UpdateResult {
        (**self).set(key, value, version).await
    }
}

/// In-memory replica
#[derive(Debug, Default)]
pub struct MemoryKeyData {
    entries: RwLock<Replica>,
}

impl MemoryKeyData {
    pub fn new() -> Self {
        MemoryKeyData::default()
    }

    pub fn from_replica(entries: Replica) -> Self {
        MemoryKeyData {
            entries: RwLock::new(entries),
        }
    }

    pub fn get(&self, key: &str) -> Option<ValVer> {
        self.entries.read().get(key).cloned()
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> Replica {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl FromIterator<(String, ValVer)> for MemoryKeyData {
    fn from_iter<I: IntoIterator<Item = (String, ValVer)>>(iter: I) -> Self {
        MemoryKeyData::from_replica(iter.into_iter().collect())
    }
}

#[async_trait]
impl KeyData for MemoryKeyData {
    async fn keys(&self) -> VaultResult<Replica> {
        Ok(self.snapshot())
    }

    async fn set(&self, key: &str, value: &str, version: u64) -> UpdateResult {
        self.entries
            .write()
            .insert(key.to_string(), ValVer::new(value, version));
        UpdateResult::success(key, version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_set_and_keys() {
        let store = MemoryKeyData::new();
        assert!(store.is_empty());

        let result = store.set("a", "x", 1).await;
        assert_eq!(result, UpdateResult::success("a", 1));

        let keys = store.keys().await.unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys["a"], ValVer::new("x", 1));
    }

    #[tokio::test]
    async fn test_memory_set_replaces_value_and_version() {
        let store: MemoryKeyData = [("a".to_string(), ValVer::new("x", 1))]
            .into_iter()
            .collect();

        store.set("a", "y", 4).await;
        assert_eq!(store.get("a"), Some(ValVer::new("y", 4)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_shared_store_through_arc() {
        let store = Arc::new(MemoryKeyData::new());
        let shared: Arc<dyn KeyData> = store.clone();

        shared.set("k", "v", 0).await;
        assert_eq!(store.get("k"), Some(ValVer::new("v", 0)));
    }
}
