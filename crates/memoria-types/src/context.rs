//! Prompt context types.

use serde::{Deserialize, Serialize};

use crate::chat::MessageRole;

/// A role-tagged message in an assembled prompt context.
///
/// Carries no id or timestamp: context is derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMessage {
    pub role: MessageRole,
    pub content: String,
}
