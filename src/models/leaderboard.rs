use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardPeriod {
    #[default]
    Weekly,
    AllTime,
}

impl LeaderboardPeriod {
    /// Column the ranking is ordered by.
    pub fn score_column(&self) -> &'static str {
        match self {
            LeaderboardPeriod::Weekly => "p.weekly_xp",
            LeaderboardPeriod::AllTime => "p.xp",
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub avatar_id: Option<String>,
    pub level: i32,
    pub is_pro: bool,
    pub score: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default)]
    pub period: LeaderboardPeriod,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub period: LeaderboardPeriod,
    pub entries: Vec<LeaderboardEntry>,
    pub me: Option<LeaderboardEntry>,
}
