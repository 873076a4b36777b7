use std::fmt::Write as _;

use super::{QuizType, QuizWord};
use crate::leveling::Difficulty;

fn difficulty_guidance(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => {
            "Use short, everyday sentences and make the wrong options clearly different from the answer."
        }
        Difficulty::Medium => {
            "Use natural sentences of moderate length and make the wrong options plausible."
        }
        Difficulty::Hard => {
            "Use advanced, nuanced sentences and make the wrong options close in meaning or form to the answer."
        }
    }
}

fn type_rules(quiz_type: QuizType) -> &'static str {
    match quiz_type {
        QuizType::MultipleChoice => {
            "Each question asks for the meaning or correct usage of one word. Give exactly four options. \
             correct_answer must be copied exactly from options."
        }
        QuizType::FillBlank => {
            "Each question is an English sentence with the target word replaced by ______. \
             correct_answer is the missing word in the form that fits the sentence. \
             hint gives the first letter of the answer."
        }
        QuizType::Pronunciation => {
            "Each question asks the learner to say the target word aloud. \
             Include the IPA transcription in ipa, and put the word itself in correct_answer."
        }
    }
}

fn response_shape(quiz_type: QuizType) -> &'static str {
    match quiz_type {
        QuizType::MultipleChoice => {
            r#"{"word": "...", "question": "...", "options": ["...", "...", "...", "..."], "correct_answer": "...", "explanation": "..."}"#
        }
        QuizType::FillBlank => {
            r#"{"word": "...", "question": "... ______ ...", "correct_answer": "...", "hint": "...", "explanation": "..."}"#
        }
        QuizType::Pronunciation => {
            r#"{"word": "...", "question": "...", "ipa": "...", "correct_answer": "...", "hint": "..."}"#
        }
    }
}

/// Builds the single instruction sent to the model.
pub fn build_quiz_prompt(
    words: &[QuizWord],
    quiz_type: QuizType,
    difficulty: Difficulty,
    count: usize,
) -> String {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "You are an English vocabulary tutor writing a quiz for a language learner."
    );
    let _ = writeln!(
        prompt,
        "\nCreate exactly {} {} questions at {} difficulty. {}",
        count,
        quiz_type.label(),
        difficulty.as_str(),
        difficulty_guidance(difficulty)
    );
    let _ = writeln!(prompt, "\n{}", type_rules(quiz_type));

    let _ = writeln!(
        prompt,
        "\nUse these words, one question per word. Reuse words only if there are fewer words than questions:"
    );
    for word in words {
        let _ = write!(prompt, "- {}", word.word);
        if let Some(word_type) = &word.word_type {
            let _ = write!(prompt, " ({})", word_type);
        }
        if let Some(ipa) = &word.ipa {
            let _ = write!(prompt, " {}", ipa);
        }
        if let Some(meaning) = &word.meaning {
            let _ = write!(prompt, ": {}", meaning);
        }
        prompt.push('\n');
    }

    let _ = writeln!(
        prompt,
        "\nRespond with only a JSON array, without markdown or commentary. Each element must have this shape:\n{}",
        response_shape(quiz_type)
    );

    prompt
}
