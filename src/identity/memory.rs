//! In-memory identity store.

use crate::error::{KeywayError, Result};
use crate::identity::{Identity, IdentityStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory identity store backed by a `RwLock<HashMap>`.
///
/// Suitable for tests and single-process deployments. The uniqueness
/// constraint on email is enforced by check-and-insert under a single write
/// lock, which makes `insert` the serialization point the enrollment flow
/// relies on.
#[derive(Default)]
pub struct InMemoryIdentityStore {
    records: RwLock<HashMap<String, Identity>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find(&self, email: &str) -> Result<Option<Identity>> {
        let records = self
            .records
            .read()
            .map_err(|_| KeywayError::store_unavailable("identity store lock poisoned"))?;
        Ok(records.get(&Identity::storage_key(email)).cloned())
    }

    async fn insert(&self, identity: Identity) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| KeywayError::store_unavailable("identity store lock poisoned"))?;

        let key = Identity::storage_key(&identity.email);
        if records.contains_key(&key) {
            return Err(KeywayError::DuplicateIdentity);
        }
        records.insert(key, identity);
        Ok(())
    }

    async fn mark_verified(&self, email: &str) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| KeywayError::store_unavailable("identity store lock poisoned"))?;

        let record = records
            .get_mut(&Identity::storage_key(email))
            .ok_or(KeywayError::UnknownIdentity)?;
        record.verified = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = InMemoryIdentityStore::new();
        store
            .insert(Identity::new("user@example.com", "JBSWY3DPEHPK3PXP"))
            .await
            .unwrap();

        let found = store.find("user@example.com").await.unwrap().unwrap();
        assert_eq!(found.email, "user@example.com");
        assert!(!found.verified);
    }

    #[tokio::test]
    async fn test_find_is_case_insensitive() {
        let store = InMemoryIdentityStore::new();
        store
            .insert(Identity::new("User@Example.com", "JBSWY3DPEHPK3PXP"))
            .await
            .unwrap();

        let found = store.find("  user@EXAMPLE.com ").await.unwrap().unwrap();
        // Display value keeps the original case
        assert_eq!(found.email, "User@Example.com");
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = InMemoryIdentityStore::new();
        store
            .insert(Identity::new("user@example.com", "JBSWY3DPEHPK3PXP"))
            .await
            .unwrap();

        let err = store
            .insert(Identity::new("USER@example.com", "OTHERSECRET234567"))
            .await
            .unwrap_err();
        assert!(matches!(err, KeywayError::DuplicateIdentity));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_mark_verified() {
        let store = InMemoryIdentityStore::new();
        store
            .insert(Identity::new("user@example.com", "JBSWY3DPEHPK3PXP"))
            .await
            .unwrap();

        store.mark_verified("user@example.com").await.unwrap();
        let found = store.find("user@example.com").await.unwrap().unwrap();
        assert!(found.verified);
    }

    #[tokio::test]
    async fn test_mark_verified_unknown_identity() {
        let store = InMemoryIdentityStore::new();
        let err = store.mark_verified("nobody@example.com").await.unwrap_err();
        assert!(matches!(err, KeywayError::UnknownIdentity));
    }
}
