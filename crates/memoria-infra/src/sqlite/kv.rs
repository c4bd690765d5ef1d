//! SQLite key-value store implementation.
//!
//! Implements `KvStore` from `memoria-core` using sqlx with split read/write
//! pools. Values are stored as JSON text in a single `kv_store` table whose
//! primary key gives the ordered iteration the recency index relies on.

use chrono::Utc;
use sqlx::Row;

use memoria_core::storage::kv_store::KvStore;
use memoria_types::error::StoreError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `KvStore`.
#[derive(Clone)]
pub struct SqliteKvStore {
    pool: DatabasePool,
}

impl SqliteKvStore {
    /// Create a new KV store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Smallest key strictly greater than every key starting with `prefix`, or
/// None when no bound exists. Byte-increment of the last non-0xFF byte;
/// correct for the ASCII prefixes this system uses.
///
/// A computed bound instead of LIKE because `chat_index:` contains `_`,
/// which LIKE treats as a wildcard.
fn scan_upper_bound(prefix: &str) -> Option<String> {
    let mut bytes = prefix.as_bytes().to_vec();
    while let Some(last) = bytes.pop() {
        if last < u8::MAX {
            bytes.push(last + 1);
            return String::from_utf8(bytes).ok();
        }
    }
    None
}

impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let value_str: String = row
                    .try_get("value")
                    .map_err(|e| StoreError::Query(e.to_string()))?;
                let value: serde_json::Value = serde_json::from_str(&value_str)
                    .map_err(|e| StoreError::Codec(format!("invalid JSON value: {e}")))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        let value_str = serde_json::to_string(value)
            .map_err(|e| StoreError::Codec(format!("failed to serialize value: {e}")))?;

        sqlx::query(
            r#"INSERT INTO kv_store (key, value, created_at, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(&value_str)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, serde_json::Value)>, StoreError> {
        let rows = match scan_upper_bound(prefix) {
            Some(upper) => {
                sqlx::query("SELECT key, value FROM kv_store WHERE key >= ? AND key < ? ORDER BY key")
                    .bind(prefix)
                    .bind(upper)
                    .fetch_all(&self.pool.reader)
                    .await
            }
            None => {
                sqlx::query("SELECT key, value FROM kv_store WHERE key >= ? ORDER BY key")
                    .bind(prefix)
                    .fetch_all(&self.pool.reader)
                    .await
            }
        }
        .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            let key: String = row
                .try_get("key")
                .map_err(|e| StoreError::Query(e.to_string()))?;
            let value_str: String = row
                .try_get("value")
                .map_err(|e| StoreError::Query(e.to_string()))?;
            let value: serde_json::Value = serde_json::from_str(&value_str)
                .map_err(|e| StoreError::Codec(format!("invalid JSON value: {e}")))?;
            entries.push((key, value));
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoria_core::chat::repository::ChatRepository;
    use memoria_core::migration::importer::MigrationImporter;
    use memoria_core::profile::repository::ProfileRepository;
    use memoria_types::chat::{Chat, Message, MessageRole};
    use memoria_types::migration::{LegacyConversation, LegacyMessage, MigrationOutcome};
    use serde_json::json;

    async fn test_store() -> SqliteKvStore {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        SqliteKvStore::new(DatabasePool::new(&url).await.unwrap())
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = test_store().await;

        let value = json!({"id": "chat-1", "title": "First"});
        store.put("chat:chat-1", &value).await.unwrap();

        let got = store.get("chat:chat-1").await.unwrap();
        assert_eq!(got, Some(value));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = test_store().await;
        assert!(store.get("chat:missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_upserts() {
        let store = test_store().await;

        store.put("counter", &json!(1)).await.unwrap();
        store.put("counter", &json!(2)).await.unwrap();

        assert_eq!(store.get("counter").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let store = test_store().await;
        store.delete("nope").await.unwrap();

        store.put("temp", &json!("v")).await.unwrap();
        store.delete("temp").await.unwrap();
        assert!(store.get("temp").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scan_prefix_ordered_and_namespace_bounded() {
        let store = test_store().await;

        store.put("chat:b", &json!("b")).await.unwrap();
        store.put("chat:a", &json!("a")).await.unwrap();
        // Same leading bytes, different namespace: must not leak into chat:.
        store.put("chat_index:0000000000001:a", &json!("idx")).await.unwrap();
        store.put("profile:default", &json!("p")).await.unwrap();

        let rows = store.scan_prefix("chat:").await.unwrap();
        let keys: Vec<&str> = rows.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["chat:a", "chat:b"]);

        let rows = store.scan_prefix("chat_index:").await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_scan_empty_prefix_returns_everything_ordered() {
        let store = test_store().await;
        store.put("b", &json!(2)).await.unwrap();
        store.put("a", &json!(1)).await.unwrap();

        let rows = store.scan_prefix("").await.unwrap();
        let keys: Vec<&str> = rows.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_scan_upper_bound() {
        assert_eq!(scan_upper_bound("chat:").as_deref(), Some("chat;"));
        assert_eq!(scan_upper_bound("chat_index:").as_deref(), Some("chat_index;"));
        assert_eq!(scan_upper_bound(""), None);
    }

    // End-to-end: the core repositories over the durable store.

    #[tokio::test]
    async fn test_chat_repository_over_sqlite() {
        let store = test_store().await;
        let chats = ChatRepository::new(store);

        chats.create(Chat::new("chat-1", "New chat", 1_000)).await.unwrap();
        let updated = chats
            .append_messages(
                "chat-1",
                vec![Message {
                    id: "m1".to_string(),
                    role: MessageRole::User,
                    content: "Help me plan a dinner party".to_string(),
                    ts: 1_001,
                }],
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Help me plan a dinner party");

        let summaries = chats.list().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].title, "Help me plan a dinner party");

        assert!(chats.delete("chat-1").await.unwrap());
        assert!(chats.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_migration_importer_over_sqlite() {
        let store = test_store().await;
        let chats = ChatRepository::new(store.clone());
        let profiles = ProfileRepository::new(store.clone());
        let importer = MigrationImporter::new(chats.clone(), profiles);

        let input = vec![LegacyConversation {
            id: "legacy-1".to_string(),
            title: "Old chat".to_string(),
            created_at: 1_000,
            messages: vec![LegacyMessage {
                id: "m1".to_string(),
                role: MessageRole::User,
                content: "hola".to_string(),
            }],
        }];

        let outcome = importer.import(&input).await.unwrap();
        assert_eq!(outcome, MigrationOutcome::Migrated { imported: 1 });

        let outcome = importer.import(&input).await.unwrap();
        assert_eq!(outcome, MigrationOutcome::AlreadyMigrated);

        let stored = chats.get("legacy-1").await.unwrap().unwrap();
        assert_eq!(stored.messages[0].ts, 1_000);
    }
}
