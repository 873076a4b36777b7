use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::models::{AccountStatus, Role, UserProfile};

/// Column list matching [`UserProfile`].
pub const PROFILE_COLUMNS: &str = "user_id, xp, level, is_pro, status, role, weekly_xp, \
     weekly_mastered, mastered_vocabularies, total_vocabularies, ai_credits, avatar_id, \
     created_at, updated_at";

/// Role and status of a profile, as needed by the auth middleware.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileAccess {
    pub role: String,
    pub status: String,
}

impl ProfileAccess {
    pub fn is_locked(&self) -> bool {
        AccountStatus::parse(&self.status) == Some(AccountStatus::Locked)
    }

    /// Unknown role strings are treated as a plain user.
    pub fn role(&self) -> Role {
        Role::parse(&self.role).unwrap_or(Role::User)
    }
}

/// Returns the caller's access row, creating the profile on first touch.
pub async fn ensure_profile(pool: &PgPool, user_id: Uuid) -> Result<ProfileAccess, sqlx::Error> {
    let existing: Option<ProfileAccess> =
        sqlx::query_as("SELECT role, status FROM user_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    if let Some(access) = existing {
        return Ok(access);
    }

    sqlx::query("INSERT INTO user_profiles (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(pool)
        .await?;
    tracing::info!("Created profile for user {}", user_id);

    sqlx::query_as("SELECT role, status FROM user_profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

pub async fn fetch_profile<'e, E>(executor: E, user_id: Uuid) -> Result<Option<UserProfile>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!("SELECT {} FROM user_profiles WHERE user_id = $1", PROFILE_COLUMNS);
    sqlx::query_as::<_, UserProfile>(&sql)
        .bind(user_id)
        .fetch_optional(executor)
        .await
}
