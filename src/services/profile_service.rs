use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{fetch_profile, PROFILE_COLUMNS};
use crate::error::{AppError, AppResult};
use crate::leveling::{award_xp, level_for_xp, level_progress, Difficulty, LevelProgress, MAX_BASE_XP_PER_REQUEST};
use crate::models::UserProfile;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub level_progress: LevelProgress,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        let level_progress = level_progress(profile.xp);
        Self {
            profile,
            level_progress,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AwardXpRequest {
    pub xp: i32,
    #[serde(default = "default_xp_difficulty")]
    pub difficulty: Difficulty,
}

fn default_xp_difficulty() -> Difficulty {
    Difficulty::Easy
}

#[derive(Debug, Serialize)]
pub struct AwardXpResponse {
    pub profile: ProfileResponse,
    pub xp_awarded: i32,
    pub multiplier: f64,
    pub previous_level: i32,
    pub leveled_up: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub avatar_id: Option<String>,
}

pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<ProfileResponse> {
        fetch_profile(&self.pool, user_id)
            .await?
            .map(ProfileResponse::from)
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }

    /// Adds quiz XP scaled by difficulty. The row is locked for the update.
    pub async fn award_xp(&self, user_id: Uuid, req: AwardXpRequest) -> AppResult<AwardXpResponse> {
        validate_base_xp(req.xp)?;
        let xp_awarded = award_xp(req.xp, req.difficulty);

        let mut tx = self.pool.begin().await?;

        let (current_xp, previous_level): (i32, i32) =
            sqlx::query_as("SELECT xp, level FROM user_profiles WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        let new_xp = current_xp.saturating_add(xp_awarded);
        let new_level = level_for_xp(new_xp);

        let sql = format!(
            "UPDATE user_profiles SET xp = $1, level = $2, weekly_xp = weekly_xp + $3, \
             updated_at = NOW() WHERE user_id = $4 RETURNING {}",
            PROFILE_COLUMNS
        );
        let profile: UserProfile = sqlx::query_as(&sql)
            .bind(new_xp)
            .bind(new_level)
            .bind(xp_awarded)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Awarded {} XP to {} ({} x{}), level {} -> {}",
            xp_awarded,
            user_id,
            req.xp,
            req.difficulty.multiplier(),
            previous_level,
            new_level
        );

        Ok(AwardXpResponse {
            profile: profile.into(),
            xp_awarded,
            multiplier: req.difficulty.multiplier(),
            previous_level,
            leveled_up: new_level > previous_level,
        })
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> AppResult<ProfileResponse> {
        let avatar_id = req
            .avatar_id
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());
        if avatar_id.as_ref().is_some_and(|a| a.len() > 64) {
            return Err(AppError::InvalidInput("avatar_id is too long".to_string()));
        }

        let sql = format!(
            "UPDATE user_profiles SET avatar_id = $1, updated_at = NOW() \
             WHERE user_id = $2 RETURNING {}",
            PROFILE_COLUMNS
        );
        let profile: Option<UserProfile> = sqlx::query_as(&sql)
            .bind(avatar_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        profile
            .map(ProfileResponse::from)
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }
}

fn validate_base_xp(xp: i32) -> AppResult<()> {
    if xp < 0 {
        return Err(AppError::InvalidInput("xp must not be negative".to_string()));
    }
    if xp > MAX_BASE_XP_PER_REQUEST {
        return Err(AppError::InvalidInput(format!(
            "xp must be at most {}",
            MAX_BASE_XP_PER_REQUEST
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_base_xp() {
        assert!(validate_base_xp(0).is_ok());
        assert!(validate_base_xp(MAX_BASE_XP_PER_REQUEST).is_ok());
        assert!(matches!(validate_base_xp(-1), Err(AppError::InvalidInput(_))));
        assert!(matches!(
            validate_base_xp(MAX_BASE_XP_PER_REQUEST + 1),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_award_request_defaults_to_easy() {
        let req: AwardXpRequest = serde_json::from_str(r#"{"xp":40}"#).unwrap();
        assert_eq!(req.difficulty, Difficulty::Easy);
        let req: AwardXpRequest = serde_json::from_str(r#"{"xp":40,"difficulty":"hard"}"#).unwrap();
        assert_eq!(award_xp(req.xp, req.difficulty), 80);
    }
}
