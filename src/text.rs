//! Lexical affect scoring
//!
//! Rule-based valence and dominance over discrete text turns from the
//! transcript collaborator. Tokens are matched against small fixed
//! lexicons; short utterances are dampened by dividing the polarity count
//! by the ceiling of the square root of the token count rather than the
//! raw length.

use crate::fusion::clamp;
use crate::types::TextAffect;

const POSITIVE: &[&str] = &[
    "good", "great", "love", "happy", "calm", "glad", "okay", "progress", "win", "proud",
    "thanks", "grateful",
];

const NEGATIVE: &[&str] = &[
    "bad", "sad", "angry", "anxious", "stress", "worry", "tired", "stuck", "fail", "sorry",
    "fear",
];

// Single-token modals only: the tokenizer splits on whitespace, so
// multiword phrases can never appear in the token stream.
const MODAL: &[&str] = &["should", "must", "might", "could", "can't", "won't"];

const FIRST_PERSON: &[&str] = &["i", "i'm", "i've", "i'd", "me", "my", "mine"];

/// Lowercase word tokens. Anything outside `[a-z0-9']` separates tokens,
/// so punctuation and non-Latin text drop out.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '\'' {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Score one text turn.
///
/// valence = clamp(-1, 1, (pos - neg) / ceil(sqrt(tokens)))
/// dominance = clamp(-1, 1, firstPersonRatio - modalRatio)
pub fn analyze_turn(text: &str) -> TextAffect {
    let tokens = tokenize(text);
    let mut pos = 0i32;
    let mut neg = 0i32;
    let mut modal = 0i32;
    let mut first = 0i32;

    for token in &tokens {
        let token = token.as_str();
        if POSITIVE.contains(&token) {
            pos += 1;
        }
        if NEGATIVE.contains(&token) {
            neg += 1;
        }
        if MODAL.contains(&token) {
            modal += 1;
        }
        if FIRST_PERSON.contains(&token) {
            first += 1;
        }
    }

    let total = tokens.len().max(1) as f64;
    let damping = total.sqrt().ceil();
    let valence = clamp((pos - neg) as f64 / damping, -1.0, 1.0);

    let first_ratio = first as f64 / total;
    let modal_ratio = modal as f64 / total;
    let dominance = clamp(first_ratio - modal_ratio, -1.0, 1.0);

    TextAffect {
        valence,
        dominance,
        token_count: tokens.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tokenize_strips_punctuation() {
        assert_eq!(
            tokenize("I'm happy, really!"),
            vec!["i'm", "happy", "really"]
        );
    }

    #[test]
    fn test_tokenize_drops_non_latin() {
        assert_eq!(tokenize("good 좋아요 day"), vec!["good", "day"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("...").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_single_positive_word_maxes_valence() {
        // 1 token: (1 - 0) / ceil(sqrt(1)) = 1.0
        let affect = analyze_turn("great");
        assert_eq!(affect.valence, 1.0);
        assert_eq!(affect.token_count, 1);
    }

    #[test]
    fn test_sqrt_damping_on_longer_turns() {
        // 5 tokens, one positive: 1 / ceil(sqrt(5)) = 1/3
        let affect = analyze_turn("today was a great day");
        assert!((affect.valence - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_mixed_polarity_cancels() {
        let affect = analyze_turn("good bad");
        assert_eq!(affect.valence, 0.0);
    }

    #[test]
    fn test_negative_turn() {
        let affect = analyze_turn("sad tired anxious");
        // (0 - 3) / ceil(sqrt(3)) = -3/2, clamped to -1
        assert_eq!(affect.valence, -1.0);
    }

    #[test]
    fn test_first_person_raises_dominance() {
        // Tokens: i did my work -> first person 2/4, modal 0
        let affect = analyze_turn("I did my work");
        assert!((affect.dominance - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_modals_lower_dominance() {
        // Tokens: should must -> modal 2/2, first 0
        let affect = analyze_turn("should must");
        assert_eq!(affect.dominance, -1.0);
    }

    #[test]
    fn test_contracted_modal_matches() {
        let affect = analyze_turn("can't");
        assert_eq!(affect.dominance, -1.0);
    }

    #[test]
    fn test_empty_turn_is_neutral() {
        let affect = analyze_turn("");
        assert_eq!(affect.valence, 0.0);
        assert_eq!(affect.dominance, 0.0);
        assert_eq!(affect.token_count, 0);
    }
}
