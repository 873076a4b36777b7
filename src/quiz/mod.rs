//! Quiz generation: an LLM-backed path with a local fallback.

pub mod fallback;
pub mod parse;
pub mod prompt;

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, AppResult};
use crate::gemini::{LanguageModel, LlmError};
use crate::leveling::Difficulty;

pub use fallback::generate_fallback;
pub use parse::{parse_quiz_response, QuizParseError};
pub use prompt::build_quiz_prompt;

pub const DEFAULT_QUESTION_COUNT: usize = 10;
pub const MAX_QUESTION_COUNT: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizType {
    #[default]
    MultipleChoice,
    FillBlank,
    Pronunciation,
}

impl QuizType {
    pub fn label(&self) -> &'static str {
        match self {
            QuizType::MultipleChoice => "multiple-choice",
            QuizType::FillBlank => "fill-in-the-blank",
            QuizType::Pronunciation => "pronunciation",
        }
    }
}

/// A word to quiz on. Accepts either `"word"` or a full object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "QuizWordInput")]
pub struct QuizWord {
    pub word: String,
    pub meaning: Option<String>,
    pub ipa: Option<String>,
    #[serde(rename = "type")]
    pub word_type: Option<String>,
}

impl QuizWord {
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            meaning: None,
            ipa: None,
            word_type: None,
        }
    }

    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = Some(meaning.into());
        self
    }

    pub fn with_ipa(mut self, ipa: impl Into<String>) -> Self {
        self.ipa = Some(ipa.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuizWordInput {
    Plain(String),
    Detailed(DetailedWord),
}

#[derive(Deserialize)]
struct DetailedWord {
    word: String,
    #[serde(default)]
    meaning: Option<String>,
    #[serde(default)]
    ipa: Option<String>,
    #[serde(default, rename = "type")]
    word_type: Option<String>,
}

impl From<QuizWordInput> for QuizWord {
    fn from(input: QuizWordInput) -> Self {
        match input {
            QuizWordInput::Plain(word) => QuizWord::new(word),
            QuizWordInput::Detailed(d) => QuizWord {
                word: d.word,
                meaning: d.meaning,
                ipa: d.ipa,
                word_type: d.word_type,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizRequest {
    pub words: Vec<QuizWord>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_count", deserialize_with = "clamped_count")]
    pub count: usize,
    #[serde(default, alias = "quizType", alias = "type")]
    pub quiz_type: QuizType,
}

fn default_count() -> usize {
    DEFAULT_QUESTION_COUNT
}

/// Accepts any integer and clamps it to `1..=MAX_QUESTION_COUNT`.
fn clamped_count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let count = i64::deserialize(deserializer)?;
    Ok(count.clamp(1, MAX_QUESTION_COUNT as i64) as usize)
}

impl QuizRequest {
    /// Trims and de-duplicates words, drops blanks, and clamps `count`.
    pub fn normalized(self) -> AppResult<Self> {
        let mut seen = HashSet::new();
        let words: Vec<QuizWord> = self
            .words
            .into_iter()
            .filter_map(|w| {
                let word = w.word.trim().to_string();
                if word.is_empty() || !seen.insert(word.to_lowercase()) {
                    return None;
                }
                Some(QuizWord {
                    word,
                    meaning: clean(w.meaning),
                    ipa: clean(w.ipa),
                    word_type: clean(w.word_type),
                })
            })
            .collect();

        if words.is_empty() {
            return Err(AppError::InvalidInput(
                "words must contain at least one word".to_string(),
            ));
        }

        Ok(Self {
            words,
            count: self.count.clamp(1, MAX_QUESTION_COUNT),
            ..self
        })
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    #[serde(rename = "type")]
    pub kind: QuizType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    pub question: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipa: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizSource {
    Ai,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    AiUnavailable,
    NoCredits,
    QuotaExceeded,
    AiError,
    InvalidAiResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedQuiz {
    pub quiz_type: QuizType,
    pub difficulty: Difficulty,
    pub source: QuizSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
    pub questions: Vec<QuizQuestion>,
}

/// Builds quizzes from the model when allowed, otherwise locally.
#[derive(Clone)]
pub struct QuizEngine {
    model: Option<Arc<dyn LanguageModel>>,
}

impl QuizEngine {
    pub fn new(model: Option<Arc<dyn LanguageModel>>) -> Self {
        Self { model }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// `request` must already be [`QuizRequest::normalized`].
    pub async fn build(&self, request: &QuizRequest, ai_allowed: bool) -> GeneratedQuiz {
        let model = match (&self.model, ai_allowed) {
            (None, _) => return self.fallback(request, FallbackReason::AiUnavailable),
            (Some(_), false) => return self.fallback(request, FallbackReason::NoCredits),
            (Some(model), true) => model,
        };

        let prompt = build_quiz_prompt(
            &request.words,
            request.quiz_type,
            request.difficulty,
            request.count,
        );

        match model.generate_text(&prompt).await {
            Ok(reply) => match parse_quiz_response(&reply, request.quiz_type, request.count) {
                Ok(questions) => GeneratedQuiz {
                    quiz_type: request.quiz_type,
                    difficulty: request.difficulty,
                    source: QuizSource::Ai,
                    fallback_reason: None,
                    questions,
                },
                Err(e) => {
                    tracing::warn!("Discarding AI quiz response: {}", e);
                    self.fallback(request, FallbackReason::InvalidAiResponse)
                }
            },
            Err(LlmError::QuotaExceeded(msg)) => {
                tracing::warn!("AI quota exceeded, using fallback quiz: {}", msg);
                self.fallback(request, FallbackReason::QuotaExceeded)
            }
            Err(e) => {
                tracing::error!("AI quiz generation failed: {}", e);
                self.fallback(request, FallbackReason::AiError)
            }
        }
    }

    fn fallback(&self, request: &QuizRequest, reason: FallbackReason) -> GeneratedQuiz {
        let mut rng = rand::rng();
        let questions =
            generate_fallback(&request.words, request.quiz_type, request.count, &mut rng);
        GeneratedQuiz {
            quiz_type: request.quiz_type,
            difficulty: request.difficulty,
            source: QuizSource::Fallback,
            fallback_reason: Some(reason),
            questions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behavior {
        Reply(&'static str),
        Quota,
        Fail,
    }

    struct StubModel {
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl StubModel {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for StubModel {
        async fn generate_text(&self, _prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Reply(text) => Ok(text.to_string()),
                Behavior::Quota => Err(LlmError::QuotaExceeded("limit".into())),
                Behavior::Fail => Err(LlmError::EmptyResponse),
            }
        }
    }

    fn request() -> QuizRequest {
        QuizRequest {
            words: vec![
                QuizWord::new("serene").with_meaning("calm and peaceful"),
                QuizWord::new("candid").with_meaning("truthful and straightforward"),
                QuizWord::new("frugal").with_meaning("economical with money"),
            ],
            difficulty: Difficulty::Medium,
            count: 3,
            quiz_type: QuizType::MultipleChoice,
        }
    }

    const AI_REPLY: &str = r#"```json
[{"word":"serene","question":"What does \"serene\" mean?","options":["calm and peaceful","angry","loud","fast"],"correct_answer":"calm and peaceful"}]
```"#;

    #[tokio::test]
    async fn test_ai_reply_is_used() {
        let model = StubModel::new(Behavior::Reply(AI_REPLY));
        let engine = QuizEngine::new(Some(model.clone()));
        let quiz = engine.build(&request(), true).await;
        assert_eq!(quiz.source, QuizSource::Ai);
        assert_eq!(quiz.fallback_reason, None);
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_quota_error_falls_back() {
        let engine = QuizEngine::new(Some(StubModel::new(Behavior::Quota)));
        let quiz = engine.build(&request(), true).await;
        assert_eq!(quiz.source, QuizSource::Fallback);
        assert_eq!(quiz.fallback_reason, Some(FallbackReason::QuotaExceeded));
        assert_eq!(quiz.questions.len(), 3);
    }

    #[tokio::test]
    async fn test_model_failure_falls_back() {
        let engine = QuizEngine::new(Some(StubModel::new(Behavior::Fail)));
        let quiz = engine.build(&request(), true).await;
        assert_eq!(quiz.fallback_reason, Some(FallbackReason::AiError));
    }

    #[tokio::test]
    async fn test_garbage_reply_falls_back() {
        let engine = QuizEngine::new(Some(StubModel::new(Behavior::Reply(
            "Sorry, I cannot help with that.",
        ))));
        let quiz = engine.build(&request(), true).await;
        assert_eq!(quiz.fallback_reason, Some(FallbackReason::InvalidAiResponse));
        assert!(!quiz.questions.is_empty());
    }

    #[tokio::test]
    async fn test_model_not_called_without_credits() {
        let model = StubModel::new(Behavior::Reply(AI_REPLY));
        let engine = QuizEngine::new(Some(model.clone()));
        let quiz = engine.build(&request(), false).await;
        assert_eq!(quiz.fallback_reason, Some(FallbackReason::NoCredits));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_model_configured() {
        let engine = QuizEngine::new(None);
        assert!(!engine.has_model());
        let quiz = engine.build(&request(), true).await;
        assert_eq!(quiz.fallback_reason, Some(FallbackReason::AiUnavailable));
    }

    #[test]
    fn test_request_accepts_plain_and_detailed_words() {
        let req: QuizRequest = serde_json::from_str(
            r#"{"words":["apple",{"word":"serene","meaning":"calm","type":"adjective"}],"quizType":"fill_blank"}"#,
        )
        .unwrap();
        assert_eq!(req.words[0], QuizWord::new("apple"));
        assert_eq!(req.words[1].meaning.as_deref(), Some("calm"));
        assert_eq!(req.words[1].word_type.as_deref(), Some("adjective"));
        assert_eq!(req.quiz_type, QuizType::FillBlank);
        assert_eq!(req.count, DEFAULT_QUESTION_COUNT);
        assert_eq!(req.difficulty, Difficulty::Medium);
    }

    #[test]
    fn test_normalized_dedupes_and_clamps() {
        let req: QuizRequest = serde_json::from_str(
            r#"{"words":[" Apple ","apple","", {"word":"pear","meaning":"  "}],"count":99}"#,
        )
        .unwrap();
        let req = req.normalized().unwrap();
        let words: Vec<&str> = req.words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["Apple", "pear"]);
        assert_eq!(req.words[1].meaning, None);
        assert_eq!(req.count, MAX_QUESTION_COUNT);
    }

    #[test]
    fn test_normalized_rejects_empty_word_list() {
        let req: QuizRequest = serde_json::from_str(r#"{"words":["  "]}"#).unwrap();
        assert!(matches!(req.normalized(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_negative_and_huge_counts_are_clamped() {
        let req: QuizRequest = serde_json::from_str(r#"{"words":["a"],"count":-3}"#).unwrap();
        assert_eq!(req.count, 1);
        let req: QuizRequest =
            serde_json::from_str(r#"{"words":["a"],"count":9223372036854775807}"#).unwrap();
        assert_eq!(req.count, MAX_QUESTION_COUNT);
    }

    #[test]
    fn test_zero_count_is_clamped_up() {
        let req: QuizRequest = serde_json::from_str(r#"{"words":["a"],"count":0}"#).unwrap();
        assert_eq!(req.normalized().unwrap().count, 1);
    }
}
