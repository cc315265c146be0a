//! Row type for the `user_rewards` table and conversions to and from the
//! in-memory [`RewardsState`].

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use shiurim_core::rewards::{DailyActivity, LessonProgress, RewardsState};

/// A row from the `user_rewards` table.
///
/// Scalars map to columns; the collections are JSONB documents matching the
/// serde encoding of the core types.
#[derive(Debug, Clone, FromRow)]
pub struct UserRewardsRow {
    pub user_id: String,
    pub experience: i64,
    pub torah_points: i64,
    pub wisdom_coins: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_date: Option<NaiveDate>,
    pub daily_activities: serde_json::Value,
    pub earned_badges: serde_json::Value,
    pub lesson_progress: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

impl UserRewardsRow {
    /// Rebuild the in-memory state from a stored row.
    ///
    /// The transient UI signals (pending level-up / new badge) are not
    /// persisted; a freshly loaded state has none pending.
    pub fn into_state(self) -> Result<RewardsState, serde_json::Error> {
        let daily_activities: Vec<DailyActivity> = serde_json::from_value(self.daily_activities)?;
        let earned_badges: Vec<String> = serde_json::from_value(self.earned_badges)?;
        let lesson_progress: indexmap::IndexMap<String, LessonProgress> =
            serde_json::from_value(self.lesson_progress)?;

        Ok(RewardsState {
            experience: self.experience.max(0) as u64,
            torah_points: self.torah_points.max(0) as u64,
            wisdom_coins: self.wisdom_coins.max(0) as u64,
            current_streak: self.current_streak.max(0) as u32,
            longest_streak: self.longest_streak.max(0) as u32,
            last_activity_date: self.last_activity_date,
            daily_activities,
            earned_badges,
            lesson_progress,
            pending_level_up: None,
            pending_new_badge: None,
        })
    }
}

/// Column values for an upsert, derived from the in-memory state.
#[derive(Debug, Clone)]
pub struct RewardsWrite {
    pub experience: i64,
    pub torah_points: i64,
    pub wisdom_coins: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_date: Option<NaiveDate>,
    pub daily_activities: serde_json::Value,
    pub earned_badges: serde_json::Value,
    pub lesson_progress: serde_json::Value,
}

impl RewardsWrite {
    pub fn from_state(state: &RewardsState) -> Result<Self, serde_json::Error> {
        Ok(Self {
            experience: state.experience as i64,
            torah_points: state.torah_points as i64,
            wisdom_coins: state.wisdom_coins as i64,
            current_streak: state.current_streak as i32,
            longest_streak: state.longest_streak as i32,
            last_activity_date: state.last_activity_date,
            daily_activities: serde_json::to_value(&state.daily_activities)?,
            earned_badges: serde_json::to_value(&state.earned_badges)?,
            lesson_progress: serde_json::to_value(&state.lesson_progress)?,
        })
    }
}
