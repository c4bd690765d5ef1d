//! Prompt context assembly.
//!
//! Derives the ordered message sequence sent to the LLM from a profile and a
//! chat record. Pure function: no storage access, no side effects.

use memoria_types::chat::{Chat, MessageRole};
use memoria_types::context::ContextMessage;
use memoria_types::profile::Profile;

/// Build the prompt context for a chat.
///
/// Order: one synthesized system message carrying the profile (omitted when
/// the profile is empty), then every stored message verbatim -- including
/// empty-content assistant placeholders -- then the optional new user message
/// when supplied and non-empty.
pub fn build_context(
    profile: &Profile,
    chat: &Chat,
    new_user_message: Option<&str>,
) -> Vec<ContextMessage> {
    let mut messages = Vec::with_capacity(chat.messages.len() + 2);

    let mut system_lines = Vec::new();
    if !profile.traits.is_empty() {
        system_lines.push(format!("Traits: {}", profile.traits.join(", ")));
    }
    if !profile.facts.is_empty() {
        system_lines.push(format!("Facts: {}", profile.facts.join(", ")));
    }
    if !system_lines.is_empty() {
        messages.push(ContextMessage {
            role: MessageRole::System,
            content: system_lines.join("\n"),
        });
    }

    for msg in &chat.messages {
        messages.push(ContextMessage {
            role: msg.role,
            content: msg.content.clone(),
        });
    }

    if let Some(content) = new_user_message.filter(|c| !c.is_empty()) {
        messages.push(ContextMessage {
            role: MessageRole::User,
            content: content.to_string(),
        });
    }

    messages
}
