//! Extracts quiz questions from an LLM's free-text reply.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::{QuizQuestion, QuizType};

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```([A-Za-z]*)\s*(.*?)```").unwrap());

#[derive(Error, Debug)]
pub enum QuizParseError {
    #[error("no JSON found in model reply")]
    NoJson,

    #[error("malformed JSON in model reply: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("model reply contained no usable questions")]
    NoValidQuestions,
}

/// One question as the model wrote it. Synonymous keys are separate
/// fields so a reply carrying several of them still deserializes.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    sentence: Option<String>,
    #[serde(default)]
    options: Option<Vec<Value>>,
    #[serde(default)]
    choices: Option<Vec<Value>>,
    #[serde(default)]
    correct_answer: Option<Value>,
    #[serde(default, rename = "correctAnswer")]
    correct_answer_camel: Option<Value>,
    #[serde(default)]
    answer: Option<Value>,
    #[serde(default)]
    word: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    hint: Option<String>,
    #[serde(default)]
    ipa: Option<String>,
}

/// JSON-looking spans of `text`, most likely first: fenced blocks tagged
/// `json`, then other fenced blocks, then the whole reply. Each span is
/// trimmed to its outermost brackets.
fn json_candidates(text: &str) -> Vec<&str> {
    let mut tagged = Vec::new();
    let mut untagged = Vec::new();
    for caps in FENCED_BLOCK.captures_iter(text) {
        let (Some(tag), Some(body)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if let Some(span) = bracket_span(body.as_str()) {
            if tag.as_str().eq_ignore_ascii_case("json") {
                tagged.push(span);
            } else {
                untagged.push(span);
            }
        }
    }
    tagged.extend(untagged);
    if let Some(span) = bracket_span(text) {
        tagged.push(span);
    }
    tagged
}

fn bracket_span(text: &str) -> Option<&str> {
    let start = text.find(['[', '{'])?;
    let end = text.rfind([']', '}'])?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Returns the most likely JSON span of `text`.
pub fn extract_json_block(text: &str) -> Option<&str> {
    json_candidates(text).into_iter().next()
}

pub fn parse_quiz_response(
    text: &str,
    quiz_type: QuizType,
    count: usize,
) -> Result<Vec<QuizQuestion>, QuizParseError> {
    let mut first_error = None;
    let mut parsed = None;
    for candidate in json_candidates(text) {
        match serde_json::from_str::<Value>(candidate) {
            Ok(value) => {
                parsed = Some(value);
                break;
            }
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    let value = match (parsed, first_error) {
        (Some(value), _) => value,
        (None, Some(e)) => return Err(QuizParseError::Malformed(e)),
        (None, None) => return Err(QuizParseError::NoJson),
    };

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(QuizParseError::NoValidQuestions),
            None => vec![Value::Object(map)],
        },
        _ => return Err(QuizParseError::NoJson),
    };

    let questions: Vec<QuizQuestion> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawQuestion>(item) {
            Ok(raw) => Some(raw),
            Err(e) => {
                tracing::debug!("Skipping unreadable quiz item: {}", e);
                None
            }
        })
        .filter_map(|raw| into_question(raw, quiz_type))
        .take(count)
        .collect();

    if questions.is_empty() {
        return Err(QuizParseError::NoValidQuestions);
    }
    Ok(questions)
}

fn into_question(raw: RawQuestion, quiz_type: QuizType) -> Option<QuizQuestion> {
    let question = non_empty(raw.question)
        .or_else(|| non_empty(raw.prompt))
        .or_else(|| non_empty(raw.sentence))?;

    let mut options: Vec<String> = Vec::new();
    for option in raw.options.or(raw.choices).unwrap_or_default() {
        if let Some(text) = value_text(&option) {
            if !options.iter().any(|o| o.eq_ignore_ascii_case(&text)) {
                options.push(text);
            }
        }
    }

    let answer = raw
        .correct_answer
        .or(raw.correct_answer_camel)
        .or(raw.answer)?;
    let answer = match answer {
        Value::Number(n) => options.get(usize::try_from(n.as_u64()?).ok()?)?.clone(),
        other => value_text(&other)?,
    };
    let answer = resolve_letter_answer(&answer, &options).unwrap_or(answer);

    let correct_answer = if quiz_type == QuizType::MultipleChoice {
        if options.len() < 2 {
            return None;
        }
        options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(&answer))?
            .clone()
    } else {
        answer
    };

    let word = non_empty(raw.word).or_else(|| match quiz_type {
        QuizType::MultipleChoice => None,
        _ => Some(correct_answer.clone()),
    });

    Some(QuizQuestion {
        kind: quiz_type,
        word,
        question,
        options,
        correct_answer,
        explanation: non_empty(raw.explanation),
        hint: non_empty(raw.hint),
        ipa: non_empty(raw.ipa),
    })
}

/// Maps a bare option letter ("B") to the option text when the letter
/// itself is not one of the options.
fn resolve_letter_answer(answer: &str, options: &[String]) -> Option<String> {
    let mut chars = answer.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() || !letter.is_ascii_uppercase() {
        return None;
    }
    if options.iter().any(|o| o.eq_ignore_ascii_case(answer)) {
        return None;
    }
    let index = (letter as u8 - b'A') as usize;
    options.get(index).cloned()
}

fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
