//! Chat title generation.
//!
//! `generate_chat_title` derives a short title from the first user message of
//! a conversation. Deterministic and side-effect-free: markdown noise is
//! stripped, the first sentence is kept, and anything past 60 characters is
//! cut back to a word boundary.

/// Title used when the message content reduces to nothing.
const FALLBACK_TITLE: &str = "general conversation";

/// Maximum title length in characters.
const MAX_TITLE_CHARS: usize = 60;

/// A truncated title is only cut back to a space past this position.
const MIN_SPACE_POS: usize = 20;

/// Markdown punctuation blanked out before extracting the title.
const MARKDOWN_PUNCTUATION: [char; 10] = ['#', '>', '*', '_', '`', '~', '[', ']', '(', ')'];

/// Derive a chat title from a message's content.
pub fn generate_chat_title(content: &str) -> String {
    let without_fences = strip_code_fences(content);
    let cleaned: String = without_fences
        .chars()
        .map(|c| if MARKDOWN_PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect();
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.is_empty() {
        return FALLBACK_TITLE.to_string();
    }

    let first_chunk = cleaned
        .split(['.', '!', '?', '\n'])
        .next()
        .unwrap_or_default()
        .trim();
    let first_chunk = if first_chunk.is_empty() {
        cleaned.as_str()
    } else {
        first_chunk
    };

    let chars: Vec<char> = first_chunk.chars().collect();
    if chars.len() <= MAX_TITLE_CHARS {
        return first_chunk.to_string();
    }

    let shortened = &chars[..MAX_TITLE_CHARS];
    match shortened.iter().rposition(|c| *c == ' ') {
        Some(pos) if pos > MIN_SPACE_POS => {
            format!("{}...", shortened[..pos].iter().collect::<String>())
        }
        _ => format!("{}...", shortened.iter().collect::<String>()),
    }
}

/// Remove closed ``` fences and their contents. An unclosed fence is left
/// alone, matching the non-greedy behavior of the legacy implementation.
fn strip_code_fences(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(start) = rest.find("```") {
        let Some(end) = rest[start + 3..].find("```") else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push(' ');
        rest = &rest[start + 3 + end + 3..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_content_kept_verbatim() {
        let title = generate_chat_title("Please help me plan a trip to Japan for two weeks");
        assert_eq!(title, "Please help me plan a trip to Japan for two weeks");
    }

    #[test]
    fn test_long_sentence_cut_at_last_space_with_ellipsis() {
        let title = generate_chat_title(
            "Please help me plan a two week trip to Japan visiting Tokyo, Kyoto and Osaka",
        );
        assert_eq!(title, "Please help me plan a two week trip to Japan visiting...");
        assert!(title.chars().count() <= MAX_TITLE_CHARS + 3);
    }

    #[test]
    fn test_stops_at_first_sentence_terminator() {
        assert_eq!(generate_chat_title("Plan my trip. Also book hotels"), "Plan my trip");
        assert_eq!(generate_chat_title("Can you help?"), "Can you help");
    }

    #[test]
    fn test_whitespace_only_falls_back() {
        assert_eq!(generate_chat_title("   \n\t  "), FALLBACK_TITLE);
    }

    #[test]
    fn test_markdown_punctuation_only_falls_back() {
        assert_eq!(generate_chat_title("### > * _ [] () ~~"), FALLBACK_TITLE);
    }

    #[test]
    fn test_code_fence_contents_stripped() {
        let title = generate_chat_title("```rust\nfn main() {}\n``` explain this snippet");
        assert_eq!(title, "explain this snippet");
    }

    #[test]
    fn test_unclosed_fence_text_survives() {
        assert_eq!(generate_chat_title("```rust code here"), "rust code here");
    }

    #[test]
    fn test_markdown_emphasis_stripped() {
        assert_eq!(
            generate_chat_title("**Refactor** the `parser` module"),
            "Refactor the parser module"
        );
    }

    #[test]
    fn test_unbroken_text_hard_truncated() {
        let content = "a".repeat(70);
        let title = generate_chat_title(&content);
        assert_eq!(title, format!("{}...", "a".repeat(60)));
    }

    #[test]
    fn test_deterministic() {
        let content = "Help me *write* a resignation letter. Politely.";
        assert_eq!(generate_chat_title(content), generate_chat_title(content));
    }
}
