//! Local quiz generator used when the AI path is unavailable.

use rand::seq::SliceRandom;
use rand::Rng;

use super::{QuizQuestion, QuizType, QuizWord};

const OPTIONS_PER_QUESTION: usize = 4;

/// Definitions used to pad multiple-choice options when the word list is short.
const FILLER_DEFINITIONS: &[&str] = &[
    "a feeling of great happiness",
    "to move quickly on foot",
    "a large natural body of water",
    "difficult to understand or explain",
    "a building where people live",
    "to speak in a very quiet voice",
    "having a lot of money",
    "a small piece of paper",
];

pub fn generate_fallback<R: Rng + ?Sized>(
    words: &[QuizWord],
    quiz_type: QuizType,
    count: usize,
    rng: &mut R,
) -> Vec<QuizQuestion> {
    let mut picked: Vec<&QuizWord> = words.iter().collect();
    picked.shuffle(rng);
    picked.truncate(count.min(words.len()));

    picked
        .into_iter()
        .map(|word| match quiz_type {
            QuizType::MultipleChoice => match word.meaning.as_deref() {
                Some(meaning) => meaning_question(word, meaning, words, rng),
                None => spelling_question(word, rng),
            },
            QuizType::FillBlank => fill_blank_question(word),
            QuizType::Pronunciation => pronunciation_question(word),
        })
        .collect()
}

fn meaning_question<R: Rng + ?Sized>(
    word: &QuizWord,
    meaning: &str,
    all: &[QuizWord],
    rng: &mut R,
) -> QuizQuestion {
    let mut options = vec![meaning.to_string()];

    let mut others: Vec<&str> = all
        .iter()
        .filter(|other| !other.word.eq_ignore_ascii_case(&word.word))
        .filter_map(|other| other.meaning.as_deref())
        .collect();
    others.shuffle(rng);
    for candidate in others {
        if options.len() >= OPTIONS_PER_QUESTION {
            break;
        }
        push_unique(&mut options, candidate);
    }

    let mut fillers: Vec<&str> = FILLER_DEFINITIONS.to_vec();
    fillers.shuffle(rng);
    for candidate in fillers {
        if options.len() >= OPTIONS_PER_QUESTION {
            break;
        }
        push_unique(&mut options, candidate);
    }

    options.shuffle(rng);

    QuizQuestion {
        kind: QuizType::MultipleChoice,
        word: Some(word.word.clone()),
        question: format!("What does \"{}\" mean?", word.word),
        options,
        correct_answer: meaning.to_string(),
        explanation: Some(format!("\"{}\" means: {}", word.word, meaning)),
        hint: word.word_type.clone(),
        ipa: word.ipa.clone(),
    }
}

fn spelling_question<R: Rng + ?Sized>(word: &QuizWord, rng: &mut R) -> QuizQuestion {
    let mut options = vec![word.word.clone()];
    for variant in misspellings(&word.word) {
        if options.len() >= OPTIONS_PER_QUESTION {
            break;
        }
        push_unique(&mut options, &variant);
    }
    options.shuffle(rng);

    QuizQuestion {
        kind: QuizType::MultipleChoice,
        word: Some(word.word.clone()),
        question: "Which spelling is correct?".to_string(),
        options,
        correct_answer: word.word.clone(),
        explanation: None,
        hint: word.ipa.clone(),
        ipa: word.ipa.clone(),
    }
}

fn fill_blank_question(word: &QuizWord) -> QuizQuestion {
    let question = match (word.meaning.as_deref(), word.ipa.as_deref()) {
        (Some(meaning), _) => format!("Fill in the blank: ______ means \"{}\".", meaning),
        (None, Some(ipa)) => format!("Fill in the blank: the word pronounced {} is ______.", ipa),
        (None, None) => format!(
            "Fill in the blank: ______ ({} letters).",
            word.word.chars().count()
        ),
    };

    QuizQuestion {
        kind: QuizType::FillBlank,
        word: Some(word.word.clone()),
        question,
        options: Vec::new(),
        correct_answer: word.word.clone(),
        explanation: word.meaning.clone(),
        hint: Some(letter_hint(&word.word)),
        ipa: word.ipa.clone(),
    }
}

fn pronunciation_question(word: &QuizWord) -> QuizQuestion {
    QuizQuestion {
        kind: QuizType::Pronunciation,
        word: Some(word.word.clone()),
        question: format!("Pronounce: {}", word.word),
        options: Vec::new(),
        correct_answer: word.word.clone(),
        explanation: None,
        hint: word.meaning.clone(),
        ipa: word.ipa.clone(),
    }
}

/// First letter followed by one underscore per remaining letter: `s _ _ _ _ _`.
pub fn letter_hint(word: &str) -> String {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut hint = first.to_string();
    for c in chars {
        hint.push(' ');
        hint.push(if c.is_whitespace() { ' ' } else { '_' });
    }
    hint
}

/// Deterministic misspellings of `word`, none equal to it.
pub fn misspellings(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let n = chars.len();
    let mut variants = Vec::new();

    if n >= 3 {
        let mut swapped = chars.clone();
        swapped.swap(1, 2);
        variants.push(swapped.iter().collect::<String>());
    }

    if let Some(pos) = chars.iter().position(|c| is_vowel(*c)) {
        let mut replaced = chars.clone();
        replaced[pos] = next_vowel(chars[pos]);
        variants.push(replaced.iter().collect());
    }

    if n >= 1 {
        let mid = n / 2;
        let mut doubled = chars.clone();
        doubled.insert(mid, chars[mid.min(n - 1)]);
        variants.push(doubled.iter().collect());
    }

    if n >= 4 {
        let mut dropped = chars.clone();
        dropped.remove(n / 2);
        variants.push(dropped.iter().collect());
    }

    let mut unique: Vec<String> = Vec::new();
    for v in variants {
        if v != word && !unique.contains(&v) {
            unique.push(v);
        }
    }
    unique
}

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

fn next_vowel(c: char) -> char {
    let next = match c.to_ascii_lowercase() {
        'a' => 'e',
        'e' => 'i',
        'i' => 'o',
        'o' => 'u',
        _ => 'a',
    };
    if c.is_uppercase() {
        next.to_ascii_uppercase()
    } else {
        next
    }
}

fn push_unique(options: &mut Vec<String>, candidate: &str) {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return;
    }
    if !options.iter().any(|o| o.eq_ignore_ascii_case(candidate)) {
        options.push(candidate.to_string());
    }
}
