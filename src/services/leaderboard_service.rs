use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{LeaderboardEntry, LeaderboardPeriod, LeaderboardQuery, LeaderboardResponse};

pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;
pub const MAX_LEADERBOARD_LIMIT: i64 = 100;

pub struct LeaderboardService {
    pool: PgPool,
}

impl LeaderboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn leaderboard(
        &self,
        user_id: Uuid,
        query: LeaderboardQuery,
    ) -> AppResult<LeaderboardResponse> {
        let limit = clamp_limit(query.limit);
        let ranked = ranked_cte(query.period);

        let entries: Vec<LeaderboardEntry> = sqlx::query_as(&format!(
            "{} SELECT rank, user_id, display_name, avatar_id, level, is_pro, score \
             FROM ranked ORDER BY rank ASC, user_id ASC LIMIT $1",
            ranked
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let me: Option<LeaderboardEntry> = sqlx::query_as(&format!(
            "{} SELECT rank, user_id, display_name, avatar_id, level, is_pro, score \
             FROM ranked WHERE user_id = $1",
            ranked
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(LeaderboardResponse {
            period: query.period,
            entries,
            me,
        })
    }
}

/// Ranks active users by the period's score column.
fn ranked_cte(period: LeaderboardPeriod) -> String {
    let score = period.score_column();
    format!(
        "WITH ranked AS ( \
           SELECT p.user_id, \
                  COALESCE(NULLIF(u.raw_user_meta_data->>'full_name', ''), split_part(u.email, '@', 1)) AS display_name, \
                  p.avatar_id, p.level, p.is_pro, {score} AS score, \
                  RANK() OVER (ORDER BY {score} DESC) AS rank \
           FROM user_profiles p \
           LEFT JOIN auth.users u ON u.id = p.user_id \
           WHERE p.status = 'active' \
         )",
        score = score
    )
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT)
}
