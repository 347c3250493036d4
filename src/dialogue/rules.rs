//! Keyword tables and the vagueness test shared by the selector and engine.
//!
//! All matching is lower-case substring matching, so short keywords such as
//! `ot` also fire inside longer words.

/// Messages with fewer words than this are vague.
pub const MIN_FOCUSED_WORDS: usize = 5;

/// Filler words that make any message vague.
pub const VAGUE_WORDS: &[&str] = &["stuff", "things", "etc", "idk", "whatever", "maybe"];

/// Auto-selector tables, checked in this order.
pub const FINANCE_TOPICS: &[&str] = &["budget", "cost", "margin", "ot", "finance"];
pub const CLINICAL_TOPICS: &[&str] = &["patient", "safety", "clinical", "icu", "ratio"];
pub const OPERATIONS_TOPICS: &[&str] = &["schedule", "shift", "staff", "overtime", "union", "ops"];

/// Engine routing tables: which words unlock each persona's canned fact.
pub const FINANCE_TRIGGERS: &[&str] = &["budget", "cost", "ot", "margin"];
pub const CLINICAL_TRIGGERS: &[&str] = &["ratio", "safety", "error", "icu"];
pub const OPERATIONS_TRIGGERS: &[&str] = &["schedule", "shift", "union", "overtime"];

/// Fixed reply once a persona has run out of patience.
pub const REFUSAL: &str =
    "I need a focused, specific question to continue (e.g., ask about a numeric limit or policy).";

/// True if the lower-cased message contains any of `keywords`.
pub fn mentions_any(message_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| message_lower.contains(k))
}

/// Too short, or padded with filler.
pub fn is_vague(message: &str) -> bool {
    if message.split_whitespace().count() < MIN_FOCUSED_WORDS {
        return true;
    }
    mentions_any(&message.to_lowercase(), VAGUE_WORDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_messages_are_vague() {
        assert!(is_vague(""));
        assert!(is_vague("   "));
        assert!(is_vague("budget?"));
        assert!(is_vague("what is the budget"));
        assert!(!is_vague("what is the surge budget"));
    }

    #[test]
    fn test_filler_words_are_vague() {
        assert!(is_vague("tell me about the staffing things please"));
        assert!(is_vague("IDK what to ask you about here"));
        assert!(is_vague("Maybe we could discuss the ICU ratio"));
    }

    #[test]
    fn test_filler_matches_inside_words() {
        // "fetch" contains "etc"
        assert!(is_vague("can you fetch the quarterly budget figures"));
    }

    #[test]
    fn test_mentions_any_substring() {
        assert!(mentions_any("is there a cap on ot spend", FINANCE_TRIGGERS));
        assert!(mentions_any("nothing here", FINANCE_TRIGGERS));
        assert!(!mentions_any("hello there", CLINICAL_TRIGGERS));
    }
}
