//! User profile and migration flag singletons.
//!
//! Exactly one profile exists per store, under the fixed id "default". The
//! migration flag is a one-way latch: once `done` is true it is never reset by
//! normal operation.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Fixed identity of the profile singleton.
pub const PROFILE_USER_ID: &str = "default";

/// The single user profile.
///
/// `traits` describe how the assistant should behave, `facts` what it should
/// remember about the user. Both are replaced wholesale on update, never
/// merged. `updated_at` is epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    pub traits: Vec<String>,
    pub facts: Vec<String>,
    pub updated_at: i64,
}

impl Profile {
    /// The profile lazily persisted on first read: empty traits and facts.
    pub fn default_profile() -> Self {
        Self {
            user_id: PROFILE_USER_ID.to_string(),
            traits: Vec::new(),
            facts: Vec::new(),
            updated_at: Utc::now().timestamp_millis(),
        }
    }
}

/// One-way latch recording that the legacy import ran to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationFlag {
    pub done: bool,
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_identity() {
        let profile = Profile::default_profile();
        assert_eq!(profile.user_id, PROFILE_USER_ID);
        assert!(profile.traits.is_empty());
        assert!(profile.facts.is_empty());
        assert!(profile.updated_at > 0);
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let profile = Profile::default_profile();
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"userId\":\"default\""));
        assert!(json.contains("\"updatedAt\""));
    }

    #[test]
    fn test_migration_flag_roundtrip() {
        let flag = MigrationFlag {
            done: true,
            updated_at: 1_700_000_000_000,
        };
        let json = serde_json::to_string(&flag).unwrap();
        let parsed: MigrationFlag = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, flag);
    }
}
