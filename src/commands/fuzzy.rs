//! Fuzzy command matching
//!
//! Compares a cleaned command against the input with Sørensen-Dice
//! bigram similarity. Scoring is case-sensitive and ignores whitespace.

/// Characters removed from a command before fuzzy comparison
const SPECIAL_CHARS: &[char] = &[
    '&', '/', '\\', '#', ',', '+', '(', ')', '!', '$', '~', '%', '.', '\'', '"', ':', '*', '?',
    '<', '>', '{', '}',
];

/// Remove special characters and collapse repeated spaces
#[must_use]
pub fn strip_specials(command: &str) -> String {
    let mut cleaned = String::with_capacity(command.len());
    for c in command.chars().filter(|c| !SPECIAL_CHARS.contains(c)) {
        if c == ' ' && cleaned.ends_with(' ') {
            continue;
        }
        cleaned.push(c);
    }
    cleaned.trim().to_string()
}

/// Bigram similarity between two strings (0.0 - 1.0)
#[must_use]
pub fn similarity(command: &str, input: &str) -> f64 {
    strsim::sorensen_dice(command, input)
}

/// Fuzzy test for one subcommand
///
/// Returns the similarity when it reaches `threshold`.
#[must_use]
pub fn score(cleaned_command: &str, input: &str, threshold: f64) -> Option<f64> {
    let similarity = similarity(cleaned_command, input);
    tracing::trace!(command = cleaned_command, input, similarity, "fuzzy score");
    (similarity >= threshold).then_some(similarity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_specials() {
        assert_eq!(strip_specials("I'd like to order *"), "Id like to order");
        assert_eq!(strip_specials("(please) open :door?"), "please open door");
        assert_eq!(strip_specials("  a  &  b  "), "a b");
        assert_eq!(strip_specials("{hello}, <world>!"), "hello world");
    }

    #[test]
    fn test_similarity_bounds() {
        assert!((similarity("hello", "hello") - 1.0).abs() < f64::EPSILON);
        assert!(similarity("hello", "xyz").abs() < f64::EPSILON);
        assert!((similarity("", "") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_similarity_is_case_sensitive() {
        assert!(similarity("Hello", "hello") < 1.0);
    }

    #[test]
    fn test_similarity_ignores_whitespace() {
        assert!((similarity("turn on", "turnon") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_phrase_scores_high() {
        let cleaned = strip_specials("I'd like to order a large pizza");
        let score = similarity(&cleaned, "order a large pizza");

        assert!(score < 1.0);
        assert!(score > 0.75, "score was {score}");
    }

    #[test]
    fn test_score_threshold() {
        assert!(
            score("turn on the light", "turn on the light", 0.8)
                .is_some_and(|s| (s - 1.0).abs() < f64::EPSILON)
        );
        assert!(score("turn on the lights", "turn on the light", 0.8).is_some());
        assert!(score("turn off the radio", "turn on the light", 0.8).is_none());
    }
}
