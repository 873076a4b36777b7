use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::{
    mastered_delta, ListVocabulariesQuery, SaveVocabularyRequest, UpdateVocabularyRequest,
    VocabularyModel, VocabularyStatus,
};

const VOCABULARY_COLUMNS: &str = "id, user_id, word, ipa, meaning, type, status, created_at";

pub struct VocabularyService {
    pool: PgPool,
}

impl VocabularyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        query: ListVocabulariesQuery,
    ) -> AppResult<Vec<VocabularyModel>> {
        let models = match query.status {
            Some(status) => {
                let sql = format!(
                    "SELECT {} FROM vocabularies WHERE user_id = $1 AND status = $2 \
                     ORDER BY created_at DESC",
                    VOCABULARY_COLUMNS
                );
                sqlx::query_as::<_, VocabularyModel>(&sql)
                    .bind(user_id)
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM vocabularies WHERE user_id = $1 ORDER BY created_at DESC",
                    VOCABULARY_COLUMNS
                );
                sqlx::query_as::<_, VocabularyModel>(&sql)
                    .bind(user_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(models)
    }

    /// Saves a word for the user and bumps `total_vocabularies`.
    pub async fn save(&self, user_id: Uuid, req: SaveVocabularyRequest) -> AppResult<VocabularyModel> {
        let word = req.word.trim();
        let meaning = req.meaning.trim();
        if word.is_empty() {
            return Err(AppError::InvalidInput("word is required".to_string()));
        }
        if meaning.is_empty() {
            return Err(AppError::InvalidInput("meaning is required".to_string()));
        }
        let ipa = optional(req.ipa);
        let word_type = optional(req.word_type);

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO vocabularies (user_id, word, ipa, meaning, type, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            VOCABULARY_COLUMNS
        );
        let model: VocabularyModel = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(word)
            .bind(ipa)
            .bind(meaning)
            .bind(word_type)
            .bind(VocabularyStatus::Learning.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict(format!("'{}' is already in your word list", word))
                } else {
                    AppError::Database(e)
                }
            })?;

        sqlx::query(
            "UPDATE user_profiles SET total_vocabularies = total_vocabularies + 1, \
             updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("User {} saved word '{}'", user_id, model.word);
        Ok(model)
    }

    /// Moves a word to a new status and keeps the mastered counters in step.
    pub async fn update_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        req: UpdateVocabularyRequest,
    ) -> AppResult<VocabularyModel> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(String,)> = sqlx::query_as(
            "SELECT status FROM vocabularies WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        let (current,) = current.ok_or_else(|| AppError::NotFound("Word not found".to_string()))?;
        let from = VocabularyStatus::parse(&current).unwrap_or(VocabularyStatus::Learning);

        let sql = format!(
            "UPDATE vocabularies SET status = $1 WHERE id = $2 AND user_id = $3 RETURNING {}",
            VOCABULARY_COLUMNS
        );
        let model: VocabularyModel = sqlx::query_as(&sql)
            .bind(req.status.as_str())
            .bind(id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        match mastered_delta(from, req.status) {
            1 => {
                sqlx::query(
                    "UPDATE user_profiles SET mastered_vocabularies = mastered_vocabularies + 1, \
                     weekly_mastered = weekly_mastered + 1, updated_at = NOW() WHERE user_id = $1",
                )
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            }
            -1 => {
                sqlx::query(
                    "UPDATE user_profiles SET mastered_vocabularies = GREATEST(mastered_vocabularies - 1, 0), \
                     updated_at = NOW() WHERE user_id = $1",
                )
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            }
            _ => {}
        }

        tx.commit().await?;
        Ok(model)
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
