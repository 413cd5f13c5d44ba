//! Durable key-value store trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

/// Key-value persistence that survives process restarts.
///
/// Values are whole JSON documents; there are no partial writes.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write several keys in one durable step.
    async fn set_many(&self, entries: Vec<(String, Value)>) -> Result<(), StoreError>;

    /// Write a single key.
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.set_many(vec![(key.to_string(), value)]).await
    }

    /// Remove keys; absent keys are ignored.
    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError>;

    /// All keys currently stored.
    async fn keys(&self) -> Result<Vec<String>, StoreError>;
}
