use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::fetch_profile;
use crate::error::{AppError, AppResult};
use crate::quiz::{GeneratedQuiz, QuizEngine, QuizRequest, QuizSource};

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    #[serde(flatten)]
    pub quiz: GeneratedQuiz,
    /// Credits left after this request; absent for Pro users.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_credits_remaining: Option<i32>,
}

pub struct QuizService {
    pool: PgPool,
    engine: QuizEngine,
}

impl QuizService {
    pub fn new(pool: PgPool, engine: QuizEngine) -> Self {
        Self { pool, engine }
    }

    /// Non-Pro users reserve a credit before the model is called; the
    /// reservation is refunded when the quiz comes from the fallback.
    pub async fn generate(&self, user_id: Uuid, request: QuizRequest) -> AppResult<QuizResponse> {
        let request = request.normalized()?;

        let profile = fetch_profile(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        let (quiz, ai_credits_remaining) = if profile.is_pro {
            (self.engine.build(&request, true).await, None)
        } else if !self.engine.has_model() {
            (self.engine.build(&request, false).await, Some(profile.ai_credits))
        } else {
            match self.reserve_credit(user_id).await? {
                Some(remaining) => {
                    let quiz = self.engine.build(&request, true).await;
                    let remaining = match settle_reservation(quiz.source) {
                        Reservation::Keep => remaining,
                        Reservation::Refund => self.refund_credit(user_id).await?,
                    };
                    (quiz, Some(remaining))
                }
                None => (self.engine.build(&request, false).await, Some(0)),
            }
        };

        tracing::info!(
            "Quiz for {}: {} {} questions from {:?}{}",
            user_id,
            quiz.questions.len(),
            request.quiz_type.label(),
            quiz.source,
            quiz.fallback_reason
                .map(|r| format!(" ({:?})", r))
                .unwrap_or_default()
        );

        Ok(QuizResponse {
            quiz,
            ai_credits_remaining,
        })
    }

    /// Takes one credit if any is left; `None` when the balance is zero.
    async fn reserve_credit(&self, user_id: Uuid) -> AppResult<Option<i32>> {
        let remaining: Option<i32> = sqlx::query_scalar(
            "UPDATE user_profiles SET ai_credits = ai_credits - 1, updated_at = NOW() \
             WHERE user_id = $1 AND ai_credits > 0 RETURNING ai_credits",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(remaining)
    }

    async fn refund_credit(&self, user_id: Uuid) -> AppResult<i32> {
        let remaining: i32 = sqlx::query_scalar(
            "UPDATE user_profiles SET ai_credits = ai_credits + 1, updated_at = NOW() \
             WHERE user_id = $1 RETURNING ai_credits",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(remaining)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reservation {
    Keep,
    Refund,
}

fn settle_reservation(source: QuizSource) -> Reservation {
    match source {
        QuizSource::Ai => Reservation::Keep,
        QuizSource::Fallback => Reservation::Refund,
    }
}
