//! Profile repository.
//!
//! Owns two well-known keys: the profile singleton and the migration flag.
//! The profile is lazily created on first read; the flag is a one-way latch
//! whose read failures are always reported as "not done".

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use memoria_types::error::StoreError;
use memoria_types::profile::{MigrationFlag, PROFILE_USER_ID, Profile};

use crate::storage::kv_store::KvStore;

/// Well-known key of the profile singleton.
const PROFILE_KEY: &str = "profile:default";

/// Well-known key of the migration flag.
const MIGRATION_KEY: &str = "meta:migration:v1";

fn encode<T: Serialize>(value: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Codec(e.to_string()))
}

/// Repository for the profile singleton and the migration flag.
#[derive(Debug, Clone)]
pub struct ProfileRepository<S: KvStore> {
    store: S,
}

impl<S: KvStore> ProfileRepository<S> {
    /// Create a new repository over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the profile, lazily creating and persisting the default on first
    /// access. A stored record that fails to decode or does not carry the
    /// singleton identity is treated as absent and reinitialized.
    pub async fn get_profile(&self) -> Result<Profile, StoreError> {
        if let Some(value) = self.store.get(PROFILE_KEY).await? {
            match serde_json::from_value::<Profile>(value) {
                Ok(profile) if profile.user_id == PROFILE_USER_ID => return Ok(profile),
                Ok(profile) => {
                    warn!(user_id = %profile.user_id, "stored profile has foreign identity, reinitializing");
                }
                Err(err) => {
                    warn!(error = %err, "stored profile failed to decode, reinitializing");
                }
            }
        }

        let profile = Profile::default_profile();
        self.store.put(PROFILE_KEY, &encode(&profile)?).await?;
        info!("initialized default profile");
        Ok(profile)
    }

    /// Replace traits and facts wholesale and persist the result.
    pub async fn update_profile(
        &self,
        traits: Vec<String>,
        facts: Vec<String>,
    ) -> Result<Profile, StoreError> {
        let profile = Profile {
            user_id: PROFILE_USER_ID.to_string(),
            traits,
            facts,
            updated_at: Utc::now().timestamp_millis(),
        };
        self.store.put(PROFILE_KEY, &encode(&profile)?).await?;
        Ok(profile)
    }

    /// Whether the legacy import already ran. An absent or unreadable flag is
    /// "not done" -- never an error.
    pub async fn is_migration_done(&self) -> bool {
        match self.store.get(MIGRATION_KEY).await {
            Ok(Some(value)) => serde_json::from_value::<MigrationFlag>(value)
                .map(|flag| flag.done)
                .unwrap_or(false),
            Ok(None) => false,
            Err(err) => {
                warn!(error = %err, "migration flag unreadable, treating as not done");
                false
            }
        }
    }

    /// Latch the migration flag. Repeat calls overwrite the same truth value.
    pub async fn mark_migration_done(&self) -> Result<(), StoreError> {
        let flag = MigrationFlag {
            done: true,
            updated_at: Utc::now().timestamp_millis(),
        };
        self.store.put(MIGRATION_KEY, &encode(&flag)?).await
    }
}
