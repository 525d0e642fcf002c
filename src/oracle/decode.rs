//! Decoding of oracle answers
//!
//! Models like to wrap JSON in markdown fences. Known fence markers are
//! stripped before decoding into the expected shape.

use serde::de::DeserializeOwned;

use crate::types::{Result, TeamUpError};

const FENCE_MARKERS: [&str; 3] = ["```json", "```JSON", "```"];

/// Longest excerpt of a bad answer carried in a parse error
const EXCERPT_LEN: usize = 160;

/// Remove code-fence markers and surrounding whitespace
pub fn strip_fences(raw: &str) -> String {
    let mut text = raw.to_string();
    for marker in FENCE_MARKERS {
        text = text.replace(marker, "");
    }
    text.trim().to_string()
}

/// Decode an oracle answer into `T`
pub fn decode_json<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let cleaned = strip_fences(raw);
    serde_json::from_str(&cleaned).map_err(|e| {
        TeamUpError::Parse(format!("{} in answer '{}'", e, excerpt(&cleaned)))
    })
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_LEN {
        return text.to_string();
    }
    let cut: String = text.chars().take(EXCERPT_LEN).collect();
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Answer {
        score: u32,
    }

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_fences("```json\n{\"score\": 1}\n```"), "{\"score\": 1}");
        assert_eq!(strip_fences("```\n{}\n```\n"), "{}");
        assert_eq!(strip_fences("  {}  "), "{}");
    }

    #[test]
    fn test_decode_fenced_answer() {
        let answer: Answer = decode_json("```json\n{\"score\": 85}\n```").unwrap();
        assert_eq!(answer, Answer { score: 85 });
    }

    #[test]
    fn test_prose_is_a_parse_error() {
        let err = decode_json::<Answer>("Sure! The score is 85.").unwrap_err();
        assert!(matches!(err, TeamUpError::Parse(_)));
    }

    #[test]
    fn test_long_answers_are_truncated_in_errors() {
        let junk = "x".repeat(1000);
        match decode_json::<Answer>(&junk).unwrap_err() {
            TeamUpError::Parse(msg) => assert!(msg.len() < 400),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
