//! XP and level bookkeeping.
//!
//! Quiz completions report a base XP amount that is scaled by the quiz
//! difficulty. Levels follow a quadratic curve: reaching level `n` takes
//! `100 * (n - 1)^2` total XP.

use serde::{Deserialize, Serialize};

/// Largest base XP a single completion may report.
pub const MAX_BASE_XP_PER_REQUEST: i32 = 500;

const XP_PER_LEVEL_UNIT: i64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn multiplier(&self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.5,
            Difficulty::Hard => 2.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// XP credited for a completion worth `base` points at `difficulty`.
pub fn award_xp(base: i32, difficulty: Difficulty) -> i32 {
    (f64::from(base) * difficulty.multiplier()).round() as i32
}

pub fn level_for_xp(xp: i32) -> i32 {
    if xp <= 0 {
        return 1;
    }
    let units = i64::from(xp) / XP_PER_LEVEL_UNIT;
    // integer sqrt, corrected for float rounding at perfect squares
    let mut root = (units as f64).sqrt() as i64;
    while (root + 1) * (root + 1) <= units {
        root += 1;
    }
    while root * root > units {
        root -= 1;
    }
    (root + 1) as i32
}

/// Total XP at which `level` starts.
pub fn xp_for_level(level: i32) -> i32 {
    let steps = i64::from(level.max(1) - 1);
    (steps * steps * XP_PER_LEVEL_UNIT).min(i64::from(i32::MAX)) as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelProgress {
    pub level: i32,
    pub current_level_xp: i32,
    pub next_level_xp: i32,
    pub xp_into_level: i32,
    pub xp_to_next_level: i32,
}

pub fn level_progress(xp: i32) -> LevelProgress {
    let xp = xp.max(0);
    let level = level_for_xp(xp);
    let current_level_xp = xp_for_level(level);
    let next_level_xp = xp_for_level(level + 1);
    LevelProgress {
        level,
        current_level_xp,
        next_level_xp,
        xp_into_level: xp - current_level_xp,
        xp_to_next_level: next_level_xp - xp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_award_xp_applies_multiplier() {
        assert_eq!(award_xp(10, Difficulty::Easy), 10);
        assert_eq!(award_xp(10, Difficulty::Medium), 15);
        assert_eq!(award_xp(10, Difficulty::Hard), 20);
        assert_eq!(award_xp(0, Difficulty::Hard), 0);
    }

    #[test]
    fn test_award_xp_rounds_half_points() {
        assert_eq!(award_xp(7, Difficulty::Medium), 11);
        assert_eq!(award_xp(1, Difficulty::Medium), 2);
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(399), 2);
        assert_eq!(level_for_xp(400), 3);
        assert_eq!(level_for_xp(900), 4);
        assert_eq!(level_for_xp(-5), 1);
    }

    #[test]
    fn test_xp_for_level_inverts_level_for_xp() {
        for level in 1..50 {
            assert_eq!(level_for_xp(xp_for_level(level)), level);
            assert_eq!(level_for_xp(xp_for_level(level + 1) - 1), level);
        }
    }

    #[test]
    fn test_level_progress() {
        let progress = level_progress(250);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.current_level_xp, 100);
        assert_eq!(progress.next_level_xp, 400);
        assert_eq!(progress.xp_into_level, 150);
        assert_eq!(progress.xp_to_next_level, 150);
    }

    #[test]
    fn test_difficulty_deserializes_lowercase() {
        let d: Difficulty = serde_json::from_str("\"hard\"").unwrap();
        assert_eq!(d, Difficulty::Hard);
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }
}
