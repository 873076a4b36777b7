use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Row of `vocabularies`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct VocabularyModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub word: String,
    pub ipa: Option<String>,
    pub meaning: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub word_type: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocabularyStatus {
    Learning,
    Review,
    Mastered,
}

impl VocabularyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VocabularyStatus::Learning => "learning",
            VocabularyStatus::Review => "review",
            VocabularyStatus::Mastered => "mastered",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "learning" => Some(VocabularyStatus::Learning),
            "review" => Some(VocabularyStatus::Review),
            "mastered" => Some(VocabularyStatus::Mastered),
            _ => None,
        }
    }
}

/// Change to the mastered counters caused by a status transition.
pub fn mastered_delta(from: VocabularyStatus, to: VocabularyStatus) -> i32 {
    match (from == VocabularyStatus::Mastered, to == VocabularyStatus::Mastered) {
        (false, true) => 1,
        (true, false) => -1,
        _ => 0,
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveVocabularyRequest {
    pub word: String,
    pub meaning: String,
    #[serde(default)]
    pub ipa: Option<String>,
    #[serde(default, rename = "type")]
    pub word_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVocabularyRequest {
    pub status: VocabularyStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListVocabulariesQuery {
    #[serde(default)]
    pub status: Option<VocabularyStatus>,
}
