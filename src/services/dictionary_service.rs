use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::http_client::HttpClient;

/// Entry as returned by the Free Dictionary API.
#[derive(Debug, Deserialize)]
struct ApiEntry {
    word: String,
    #[serde(default)]
    phonetic: Option<String>,
    #[serde(default)]
    phonetics: Vec<ApiPhonetic>,
    #[serde(default)]
    meanings: Vec<ApiMeaning>,
}

#[derive(Debug, Deserialize)]
struct ApiPhonetic {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    audio: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMeaning {
    #[serde(rename = "partOfSpeech", default)]
    part_of_speech: Option<String>,
    #[serde(default)]
    definitions: Vec<ApiDefinition>,
}

#[derive(Debug, Deserialize)]
struct ApiDefinition {
    definition: String,
    #[serde(default)]
    example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DictionaryMeaning {
    #[serde(rename = "type")]
    pub word_type: Option<String>,
    pub definitions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// Lookup result, shaped so `word`/`ipa`/`meaning`/`type` can be saved as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DictionaryEntry {
    pub word: String,
    pub ipa: Option<String>,
    pub audio_url: Option<String>,
    pub meaning: Option<String>,
    #[serde(rename = "type")]
    pub word_type: Option<String>,
    pub meanings: Vec<DictionaryMeaning>,
}

pub struct DictionaryService {
    http: HttpClient,
    base_url: String,
}

impl DictionaryService {
    pub fn new(http: HttpClient, base_url: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn lookup(&self, word: &str) -> AppResult<DictionaryEntry> {
        let word = word.trim();
        if word.is_empty() {
            return Err(AppError::InvalidInput("word is required".to_string()));
        }

        let url = format!("{}/{}", self.base_url, urlencoding::encode(&word.to_lowercase()));
        let response = self.http.get(&url).await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(AppError::NotFound(format!("No definition found for '{}'", word)))
            }
            status if !status.is_success() => {
                return Err(AppError::Upstream(format!(
                    "Dictionary lookup failed with status {}",
                    status
                )))
            }
            _ => {}
        }

        let entries: Vec<ApiEntry> = response.json().await?;
        entries
            .into_iter()
            .next()
            .map(to_entry)
            .ok_or_else(|| AppError::NotFound(format!("No definition found for '{}'", word)))
    }
}

fn to_entry(entry: ApiEntry) -> DictionaryEntry {
    let ipa = entry
        .phonetic
        .filter(|p| !p.trim().is_empty())
        .or_else(|| {
            entry
                .phonetics
                .iter()
                .filter_map(|p| p.text.clone())
                .find(|t| !t.trim().is_empty())
        });
    let audio_url = entry
        .phonetics
        .iter()
        .filter_map(|p| p.audio.clone())
        .find(|a| !a.trim().is_empty());

    let meanings: Vec<DictionaryMeaning> = entry
        .meanings
        .into_iter()
        .filter(|m| !m.definitions.is_empty())
        .map(|m| DictionaryMeaning {
            word_type: m.part_of_speech,
            example: m.definitions.iter().find_map(|d| d.example.clone()),
            definitions: m.definitions.into_iter().map(|d| d.definition).collect(),
        })
        .collect();

    let first = meanings.first();
    DictionaryEntry {
        word: entry.word,
        ipa,
        audio_url,
        meaning: first.and_then(|m| m.definitions.first().cloned()),
        word_type: first.and_then(|m| m.word_type.clone()),
        meanings,
    }
}
