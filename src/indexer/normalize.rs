//! Ingredient text normalization.
//!
//! The same routine runs over every corpus row at fit time and over every
//! incoming query, so the two sides always meet in the same vector space.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::corpus::ingredients;

/// English stop words dropped during normalization.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "and", "any", "are", "because",
    "been", "before", "being", "below", "between", "both", "but", "can", "did", "does", "doing",
    "down", "during", "each", "few", "for", "from", "further", "had", "has", "have", "having",
    "her", "here", "hers", "herself", "him", "himself", "his", "how", "into", "its", "itself",
    "just", "more", "most", "myself", "nor", "not", "now", "off", "once", "only", "other", "our",
    "ours", "ourselves", "out", "over", "own", "same", "she", "should", "some", "such", "than",
    "that", "the", "their", "theirs", "them", "themselves", "then", "there", "these", "they",
    "this", "those", "through", "too", "under", "until", "very", "was", "were", "what", "when",
    "where", "which", "while", "who", "whom", "why", "will", "with", "you", "your", "yours",
    "yourself", "yourselves",
];

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Normalize raw ingredient text into a filtered token string.
///
/// List-literal input is flattened first (malformed literals fall back to the
/// raw string); the text is lowercased and split into alphanumeric runs, and
/// tokens that are not purely alphabetic, are stop words, or are shorter than
/// three characters are dropped. Deterministic: the same input always yields
/// the same output.
pub fn normalize(text: &str) -> String {
    let flattened = if ingredients::looks_like_list(text) {
        match ingredients::parse_list_literal(text) {
            Ok(items) => items.join(" "),
            Err(_) => text.to_string(),
        }
    } else {
        text.to_string()
    };

    let lowered = flattened.to_lowercase();

    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| {
            token.len() > 2
                && token.chars().all(|c| c.is_alphabetic())
                && !STOP_WORD_SET.contains(token)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_drops_stop_words() {
        assert_eq!(
            normalize("Chicken WITH the Potatoes"),
            "chicken potatoes"
        );
    }

    #[test]
    fn test_drops_short_and_non_alphabetic_tokens() {
        // "2" is numeric, "oz" is too short, "b12" is not purely alphabetic
        assert_eq!(normalize("2 oz b12 chicken"), "chicken");
    }

    #[test]
    fn test_flattens_list_literals() {
        assert_eq!(
            normalize("['1 cup flour', '2 large eggs']"),
            "cup flour large eggs"
        );
    }

    #[test]
    fn test_malformed_list_falls_back_to_literal_text() {
        // Unparseable bracket text is normalized as the raw string
        assert_eq!(normalize("[broken chicken list"), "broken chicken list");
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("a an 12 !!"), "");
    }

    #[test]
    fn test_determinism() {
        let input = "['Fresh basil', 'Olive oil', '3 cloves garlic']";
        assert_eq!(normalize(input), normalize(input));
    }
}
