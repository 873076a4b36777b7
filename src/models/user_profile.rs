use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Row of `user_profiles`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub xp: i32,
    pub level: i32,
    pub is_pro: bool,
    pub status: String,
    pub role: String,
    pub weekly_xp: i32,
    pub weekly_mastered: i32,
    pub mastered_vocabularies: i32,
    pub total_vocabularies: i32,
    pub ai_credits: i32,
    pub avatar_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Locked,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Locked => "locked",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(AccountStatus::Active),
            "locked" => Some(AccountStatus::Locked),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Admin listing row: a profile plus fields from `auth.users`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminUserRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub profile: UserProfile,
    pub email: Option<String>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            user_id: Uuid::nil(),
            xp: 0,
            level: 1,
            is_pro: false,
            status: "active".to_string(),
            role: "user".to_string(),
            weekly_xp: 0,
            weekly_mastered: 0,
            mastered_vocabularies: 0,
            total_vocabularies: 0,
            ai_credits: 0,
            avatar_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_and_role_parse() {
        assert_eq!(AccountStatus::parse("locked"), Some(AccountStatus::Locked));
        assert_eq!(AccountStatus::parse("banned"), None);
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::Admin.as_str(), "admin");
    }

    #[test]
    fn test_admin_row_serializes_flat() {
        let row = AdminUserRow {
            profile: profile(),
            email: Some("learner@example.com".to_string()),
            last_sign_in_at: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["email"], "learner@example.com");
        assert_eq!(json["ai_credits"], 0);
        assert_eq!(json["role"], "user");
        assert!(json.get("profile").is_none());
    }
}
