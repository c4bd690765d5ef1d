//! Legacy import input and outcome types.
//!
//! Legacy conversations come from an external export with no per-message
//! timestamps; the importer re-timestamps them deterministically.

use serde::{Deserialize, Serialize};

use crate::chat::MessageRole;

/// A message from the legacy export. Carries no timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
}

/// A conversation from the legacy export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyConversation {
    pub id: String,
    pub title: String,
    pub created_at: i64,
    pub messages: Vec<LegacyMessage>,
}

/// Outcome of a migration attempt, evaluated in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// The flag was already set; nothing was written.
    AlreadyMigrated,
    /// The chat store already held data; only the flag was written.
    StoreNotEmpty,
    /// Conversations were imported and the flag was set.
    Migrated { imported: usize },
}

impl MigrationOutcome {
    /// Number of conversations written by this attempt.
    pub fn imported(&self) -> usize {
        match self {
            MigrationOutcome::Migrated { imported } => *imported,
            _ => 0,
        }
    }
}
