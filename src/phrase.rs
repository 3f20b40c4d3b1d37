//! Heuristics for pulling a target language and a phrase out of a chat line.
//!
//! Simple pattern matches over a handful of phrasings
//! ("What is the French for 'open the door'?", "Translate 'hello' to German").
//! Only three languages are recognised; anything else falls through to the
//! "couldn't understand" reply in the conversation flow.

use once_cell::sync::Lazy;
use regex::Regex;

static LANGUAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(french|german|spanish)\b").expect("valid language regex"));

static FOR_OF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:for|of)\b").expect("valid for/of regex"));

static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"['"](.+?)['"]"#).expect("valid quote regex"));

/// First supported language named in `text`, lower-cased.
pub fn detect_language(text: &str) -> Option<String> {
    LANGUAGE
        .find(text)
        .map(|m| m.as_str().to_lowercase())
}

/// The phrase the user wants translated.
///
/// A quoted phrase after "for"/"of" wins, then any quoted phrase, then the
/// whole trimmed input.
pub fn extract_phrase(text: &str) -> String {
    for token in FOR_OF.find_iter(text) {
        if let Some(quoted) = first_quoted(&text[token.end()..]) {
            return quoted;
        }
    }
    first_quoted(text).unwrap_or_else(|| text.trim().to_string())
}

fn first_quoted(text: &str) -> Option<String> {
    QUOTED
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_after_for() {
        assert_eq!(
            extract_phrase("What is the French for 'open the door'?"),
            "open the door"
        );
        assert_eq!(
            extract_phrase("Give me the Spanish of \"good morning\""),
            "good morning"
        );
    }

    #[test]
    fn test_apostrophe_before_for_does_not_leak() {
        assert_eq!(extract_phrase("What's the German for 'thank you'?"), "thank you");
    }

    #[test]
    fn test_quoted_without_for() {
        assert_eq!(extract_phrase("Translate 'hello'"), "hello");
        assert_eq!(extract_phrase("\"cat\" in French please"), "cat");
    }

    #[test]
    fn test_plain_input_is_trimmed() {
        assert_eq!(extract_phrase("  hello world  "), "hello world");
        assert_eq!(extract_phrase("What is French for hello"), "What is French for hello");
    }

    #[test]
    fn test_detect_language_case_insensitive() {
        assert_eq!(detect_language("What is French for hello").as_deref(), Some("french"));
        assert_eq!(detect_language("in GERMAN please").as_deref(), Some("german"));
        assert_eq!(detect_language("spanish or french?").as_deref(), Some("spanish"));
    }

    #[test]
    fn test_detect_language_unknown() {
        assert_eq!(detect_language("What is Italian for hello"), None);
        assert_eq!(detect_language("Frenchman"), None);
    }
}
