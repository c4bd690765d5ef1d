//! Chat repository: primary table plus derived recency index.
//!
//! Two disjoint key namespaces back every chat. The primary record lives at
//! `chat:{id}`; its summary projection lives at
//! `chat_index:{INVERT(updated_at)}:{id}`, where the inverted fixed-width
//! timestamp makes an ascending key scan come back in descending recency
//! order, ties broken by ascending id. The repository is the sole writer of
//! both namespaces and upholds the invariant that each existing chat has
//! exactly one index entry, keyed by its current `updated_at`.
//!
//! The index rewrite on upsert is delete-then-write across two keys and is not
//! atomic; a failure between the two writes can leave a transient stale row
//! that self-heals on the next upsert of that id.

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use memoria_types::chat::{Chat, ChatSummary, Message, MessageRole};
use memoria_types::error::StoreError;

use crate::chat::title::generate_chat_title;
use crate::storage::kv_store::KvStore;

/// Primary table namespace.
const CHAT_PREFIX: &str = "chat:";

/// Recency index namespace.
const INDEX_PREFIX: &str = "chat_index:";

/// Largest 13-digit epoch-millis value; keeps inverted keys fixed-width for
/// timestamps through the year 2286.
const TS_CEILING: i64 = 9_999_999_999_999;

fn chat_key(id: &str) -> String {
    format!("{CHAT_PREFIX}{id}")
}

fn invert_ts(updated_at: i64) -> String {
    format!("{:013}", TS_CEILING.saturating_sub(updated_at))
}

fn index_key(updated_at: i64, id: &str) -> String {
    format!("{INDEX_PREFIX}{}:{id}", invert_ts(updated_at))
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn encode<T: Serialize>(value: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Codec(e.to_string()))
}

/// Repository for chat records and their recency index.
#[derive(Debug, Clone)]
pub struct ChatRepository<S: KvStore> {
    store: S,
}

impl<S: KvStore> ChatRepository<S> {
    /// Create a new repository over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Look up a chat by id. Absence is a valid result, not an error.
    pub async fn get(&self, id: &str) -> Result<Option<Chat>, StoreError> {
        match self.store.get(&chat_key(id)).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StoreError::Codec(e.to_string())),
            None => Ok(None),
        }
    }

    /// Write a chat and its index entry, replacing any previous index entry
    /// keyed by the chat's old `updated_at`.
    ///
    /// Failure to remove the stale index entry is tolerated: the new index
    /// write still happens, and the next upsert of this id removes the
    /// leftover row.
    pub async fn upsert(&self, chat: Chat) -> Result<Chat, StoreError> {
        if let Some(existing) = self.get(&chat.id).await? {
            let stale = index_key(existing.updated_at, &existing.id);
            if let Err(err) = self.store.delete(&stale).await {
                warn!(chat_id = %chat.id, error = %err, "failed to remove stale index entry");
            }
        }

        self.store.put(&chat_key(&chat.id), &encode(&chat)?).await?;
        self.store
            .put(&index_key(chat.updated_at, &chat.id), &encode(&chat.to_summary())?)
            .await?;
        Ok(chat)
    }

    /// Store a new chat. Callers are expected to pass fresh ids, but an id
    /// collision is handled as an upsert rather than rejected.
    pub async fn create(&self, chat: Chat) -> Result<Chat, StoreError> {
        self.upsert(chat).await
    }

    /// Append messages to an existing chat, bumping `updated_at`.
    ///
    /// If the chat has no user message yet and the batch carries one with
    /// non-blank content, the chat is retitled from the first such message.
    /// Returns None if the chat does not exist.
    pub async fn append_messages(
        &self,
        chat_id: &str,
        messages: Vec<Message>,
    ) -> Result<Option<Chat>, StoreError> {
        let Some(mut chat) = self.get(chat_id).await? else {
            return Ok(None);
        };

        let had_user_messages = chat.messages.iter().any(|m| m.role == MessageRole::User);
        let first_incoming_user = messages
            .iter()
            .find(|m| m.role == MessageRole::User && !m.content.trim().is_empty());
        if !had_user_messages {
            if let Some(first_user) = first_incoming_user {
                chat.title = generate_chat_title(&first_user.content);
            }
        }

        chat.updated_at = now_millis();
        chat.messages.extend(messages);
        self.upsert(chat).await.map(Some)
    }

    /// Replace a chat's message sequence wholesale, bumping `updated_at`.
    /// The title is left untouched. Returns None if the chat does not exist.
    pub async fn set_messages(
        &self,
        chat_id: &str,
        messages: Vec<Message>,
    ) -> Result<Option<Chat>, StoreError> {
        let Some(mut chat) = self.get(chat_id).await? else {
            return Ok(None);
        };

        chat.updated_at = now_millis();
        chat.messages = messages;
        self.upsert(chat).await.map(Some)
    }

    /// Delete a chat and its index entry. Returns false if the id is absent.
    ///
    /// Index removal is best-effort for the same reason as in `upsert`.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let Some(existing) = self.get(id).await? else {
            return Ok(false);
        };

        self.store.delete(&chat_key(id)).await?;
        if let Err(err) = self.store.delete(&index_key(existing.updated_at, &existing.id)).await {
            warn!(chat_id = %id, error = %err, "failed to remove index entry of deleted chat");
        }
        Ok(true)
    }

    /// List chat summaries, most recently updated first, ties broken by
    /// ascending id. Scans only the index namespace.
    pub async fn list(&self) -> Result<Vec<ChatSummary>, StoreError> {
        let rows = self.store.scan_prefix(INDEX_PREFIX).await?;
        rows.into_iter()
            .map(|(_, value)| {
                serde_json::from_value(value).map_err(|e| StoreError::Codec(e.to_string()))
            })
            .collect()
    }
}
