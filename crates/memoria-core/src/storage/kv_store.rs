//! Key-value store trait.
//!
//! Defines the interface for the ordered, durable store underneath the
//! repositories. Implementations live in memoria-infra.

use memoria_types::error::StoreError;

/// Trait for an ordered key-value store.
///
/// Stores arbitrary JSON values under string keys and supports forward
/// iteration over a key prefix in ascending lexicographic order -- the
/// property the chat recency index is built on. Keys used by this system are
/// ASCII. Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait KvStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<serde_json::Value>, StoreError>> + Send;

    /// Set a value for a key (upsert).
    fn put(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Delete a key. No-op if the key does not exist.
    fn delete(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// All entries whose key starts with `prefix`, in ascending key order.
    fn scan_prefix(
        &self,
        prefix: &str,
    ) -> impl std::future::Future<Output = Result<Vec<(String, serde_json::Value)>, StoreError>> + Send;
}
