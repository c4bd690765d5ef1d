//! Legacy conversation importer.
//!
//! Seeds the chat store from an external export at most once. Three outcomes,
//! checked in order: the flag is already set; the store already holds chats
//! (which also latches the flag, permanently closing the window); or the
//! conversations are written and the flag is set afterwards. A crash mid-loop
//! leaves the flag unset, so a retry re-imports: at-least-once, not
//! exactly-once.

use chrono::Utc;
use tracing::info;

use memoria_types::chat::{Chat, Message};
use memoria_types::error::StoreError;
use memoria_types::migration::{LegacyConversation, MigrationOutcome};

use crate::chat::repository::ChatRepository;
use crate::profile::repository::ProfileRepository;
use crate::storage::kv_store::KvStore;

/// Composes the chat and profile repositories into the one-shot import.
#[derive(Debug, Clone)]
pub struct MigrationImporter<S: KvStore> {
    chats: ChatRepository<S>,
    profiles: ProfileRepository<S>,
}

impl<S: KvStore> MigrationImporter<S> {
    /// Create an importer over the two repositories.
    pub fn new(chats: ChatRepository<S>, profiles: ProfileRepository<S>) -> Self {
        Self { chats, profiles }
    }

    /// Run the import. Idempotent across the lifetime of the store.
    pub async fn import(
        &self,
        conversations: &[LegacyConversation],
    ) -> Result<MigrationOutcome, StoreError> {
        if self.profiles.is_migration_done().await {
            info!("migration already done, skipping");
            return Ok(MigrationOutcome::AlreadyMigrated);
        }

        if !self.chats.list().await?.is_empty() {
            // Existing chats mean the import already happened or is moot;
            // latch the flag so the question is never asked again.
            self.profiles.mark_migration_done().await?;
            info!("chat store not empty, closing migration window");
            return Ok(MigrationOutcome::StoreNotEmpty);
        }

        for conv in conversations {
            self.chats.upsert(legacy_to_chat(conv)).await?;
        }
        self.profiles.mark_migration_done().await?;

        info!(imported = conversations.len(), "legacy conversations imported");
        Ok(MigrationOutcome::Migrated {
            imported: conversations.len(),
        })
    }
}

/// Build a chat from a legacy conversation.
///
/// Legacy messages carry no timestamps; they are re-stamped to
/// `created_at + index`, which is strictly increasing and collision-free
/// within the chat.
fn legacy_to_chat(conv: &LegacyConversation) -> Chat {
    Chat {
        id: conv.id.clone(),
        title: conv.title.clone(),
        created_at: conv.created_at,
        updated_at: Utc::now().timestamp_millis(),
        messages: conv
            .messages
            .iter()
            .enumerate()
            .map(|(index, m)| Message {
                id: m.id.clone(),
                role: m.role,
                content: m.content.clone(),
                ts: conv.created_at + index as i64,
            })
            .collect(),
    }
}
