//! services/api/src/adapters/memory.rs
//!
//! An in-process `DraftRepository` used when no database is configured, and
//! by the router tests.

use async_trait::async_trait;
use ignite_core::ports::{DraftRepository, PortResult};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryRepository {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl DraftRepository for InMemoryRepository {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> PortResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> PortResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_overwrites_and_delete_is_idempotent() {
        let repo = InMemoryRepository::new();
        repo.put("salesPageInputs_u_offer1", "{}").await.unwrap();
        repo.put("salesPageInputs_u_offer1", "{\"a\":1}").await.unwrap();
        assert_eq!(
            repo.get("salesPageInputs_u_offer1").await.unwrap().as_deref(),
            Some("{\"a\":1}")
        );

        repo.delete("salesPageInputs_u_offer1").await.unwrap();
        repo.delete("salesPageInputs_u_offer1").await.unwrap();
        assert_eq!(repo.len().await, 0);
    }
}
