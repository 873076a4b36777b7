//! Scores a speech-recognition transcript against the expected word.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const PASS_THRESHOLD: f64 = 0.8;

/// Longest `expected` or `transcript` accepted, in characters.
pub const MAX_INPUT_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
pub struct PronunciationRequest {
    pub expected: String,
    pub transcript: String,
}

impl PronunciationRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.expected.trim().is_empty() {
            return Err(AppError::InvalidInput("expected is required".to_string()));
        }
        if self.expected.chars().count() > MAX_INPUT_CHARS
            || self.transcript.chars().count() > MAX_INPUT_CHARS
        {
            return Err(AppError::InvalidInput(format!(
                "expected and transcript must be at most {} characters",
                MAX_INPUT_CHARS
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PronunciationScore {
    pub expected: String,
    pub transcript: String,
    pub similarity: f64,
    pub passed: bool,
}

pub fn score(expected: &str, transcript: &str) -> PronunciationScore {
    let want = normalize(expected);
    let heard = normalize(transcript);

    let similarity = similarity(&want, &heard);
    let token_match = !want.is_empty() && heard.split(' ').any(|token| token == want);

    PronunciationScore {
        expected: expected.to_string(),
        transcript: transcript.to_string(),
        similarity: (similarity * 1000.0).round() / 1000.0,
        passed: token_match || (!want.is_empty() && similarity >= PASS_THRESHOLD),
    }
}

/// Lowercase letters and digits separated by single spaces.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / longest as f64
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_passes() {
        let result = score("Serene", "serene.");
        assert_eq!(result.similarity, 1.0);
        assert!(result.passed);
    }

    #[test]
    fn test_word_inside_longer_transcript_passes() {
        let result = score("candid", "I said candid");
        assert!(result.passed);
        assert!(result.similarity < PASS_THRESHOLD);
    }

    #[test]
    fn test_close_recognition_passes() {
        // one substitution out of nine letters
        let result = score("ephemeral", "ephemerel");
        assert!(result.similarity >= PASS_THRESHOLD);
        assert!(result.passed);
    }

    #[test]
    fn test_different_word_fails() {
        let result = score("frugal", "fragile");
        assert!(!result.passed);
    }

    #[test]
    fn test_empty_transcript_fails() {
        assert!(!score("frugal", "").passed);
        assert!(!score("", "").passed);
    }

    #[test]
    fn test_validate_limits_input() {
        let req = |expected: &str, transcript: String| PronunciationRequest {
            expected: expected.to_string(),
            transcript,
        };
        assert!(req("serene", "serene".to_string()).validate().is_ok());
        assert!(req("serene", "a".repeat(MAX_INPUT_CHARS)).validate().is_ok());
        assert!(matches!(
            req("serene", "ab".repeat(10_000)).validate(),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            req(&"ab".repeat(MAX_INPUT_CHARS), String::new()).validate(),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            req("  ", "x".to_string()).validate(),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_levenshtein() {
        let d = |a: &str, b: &str| {
            levenshtein(
                &a.chars().collect::<Vec<_>>(),
                &b.chars().collect::<Vec<_>>(),
            )
        };
        assert_eq!(d("kitten", "sitting"), 3);
        assert_eq!(d("", "abc"), 3);
        assert_eq!(d("same", "same"), 0);
    }
}
