//! In-memory record repository.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RecordRepository, StoreResult};
use crate::record::Record;

// == Memory Repository ==
/// Volatile repository backed by an ordered map.
///
/// Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    rows: RwLock<BTreeMap<String, Record>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored rows, expired ones included.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl RecordRepository for MemoryRepository {
    async fn upsert(&self, record: &Record) -> StoreResult<()> {
        self.rows
            .write()
            .await
            .insert(record.key.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Record>> {
        Ok(self.rows.read().await.get(key).cloned())
    }

    async fn scan_all(&self) -> StoreResult<Vec<Record>> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn bulk_delete(&self, keys: &[String]) -> StoreResult<usize> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut rows = self.rows.write().await;
        let removed = keys
            .iter()
            .filter(|key| rows.remove(key.as_str()).is_some())
            .count();
        Ok(removed)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[tokio::test]
    async fn test_upsert_replaces_existing_row() {
        let repo = MemoryRepository::new();

        repo.upsert(&Record::permanent("a", "v1")).await.unwrap();
        repo.upsert(&Record::permanent("a", "v2")).await.unwrap();

        assert_eq!(repo.len().await, 1);
        assert_eq!(repo.get("a").await.unwrap().unwrap().value, "v2");
    }

    #[tokio::test]
    async fn test_get_absent_key() {
        let repo = MemoryRepository::new();
        assert!(repo.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scan_all_in_key_order() {
        let repo = MemoryRepository::new();

        for key in ["c", "a", "b"] {
            repo.upsert(&Record::permanent(key, "v")).await.unwrap();
        }

        let keys: Vec<String> = repo
            .scan_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_scan_all_includes_expired_rows() {
        let repo = MemoryRepository::new();
        let mut expired = Record::permanent("old", "v");
        expired.expire_at = Some(chrono::Utc::now() - TimeDelta::seconds(1));

        repo.upsert(&expired).await.unwrap();

        assert_eq!(repo.scan_all().await.unwrap(), vec![expired]);
    }

    #[tokio::test]
    async fn test_bulk_delete_is_idempotent() {
        let repo = MemoryRepository::new();
        repo.upsert(&Record::permanent("a", "v")).await.unwrap();
        repo.upsert(&Record::permanent("b", "v")).await.unwrap();

        let keys = vec!["a".to_string(), "missing".to_string()];
        assert_eq!(repo.bulk_delete(&keys).await.unwrap(), 1);
        assert_eq!(repo.bulk_delete(&keys).await.unwrap(), 0);

        // Unrelated key untouched
        assert!(repo.get("b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_bulk_delete_empty_set() {
        let repo = MemoryRepository::new();
        repo.upsert(&Record::permanent("a", "v")).await.unwrap();

        assert_eq!(repo.bulk_delete(&[]).await.unwrap(), 0);
        assert!(!repo.is_empty().await);
    }
}
