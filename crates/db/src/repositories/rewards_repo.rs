//! Repository for the `user_rewards` table.

use sqlx::PgPool;

use crate::models::rewards::{RewardsWrite, UserRewardsRow};

const REWARDS_COLUMNS: &str = "\
    user_id, experience, torah_points, wisdom_coins, current_streak, \
    longest_streak, last_activity_date, daily_activities, earned_badges, \
    lesson_progress, updated_at";

/// Load and store per-user rewards state.
pub struct RewardsRepo;

impl RewardsRepo {
    /// Fetch the stored rewards row for a user, if any.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Option<UserRewardsRow>, sqlx::Error> {
        let query = format!("SELECT {REWARDS_COLUMNS} FROM user_rewards WHERE user_id = $1");
        sqlx::query_as::<_, UserRewardsRow>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or overwrite the stored rewards state for a user.
    ///
    /// The whole row is written on every flush; the engine's transition is
    /// atomic in memory, so the latest state always supersedes the stored
    /// one for this user.
    pub async fn upsert(
        pool: &PgPool,
        user_id: &str,
        write: &RewardsWrite,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_rewards \
                (user_id, experience, torah_points, wisdom_coins, current_streak, \
                 longest_streak, last_activity_date, daily_activities, earned_badges, \
                 lesson_progress, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now()) \
             ON CONFLICT (user_id) DO UPDATE SET \
                experience = EXCLUDED.experience, \
                torah_points = EXCLUDED.torah_points, \
                wisdom_coins = EXCLUDED.wisdom_coins, \
                current_streak = EXCLUDED.current_streak, \
                longest_streak = EXCLUDED.longest_streak, \
                last_activity_date = EXCLUDED.last_activity_date, \
                daily_activities = EXCLUDED.daily_activities, \
                earned_badges = EXCLUDED.earned_badges, \
                lesson_progress = EXCLUDED.lesson_progress, \
                updated_at = now()",
        )
        .bind(user_id)
        .bind(write.experience)
        .bind(write.torah_points)
        .bind(write.wisdom_coins)
        .bind(write.current_streak)
        .bind(write.longest_streak)
        .bind(write.last_activity_date)
        .bind(&write.daily_activities)
        .bind(&write.earned_badges)
        .bind(&write.lesson_progress)
        .execute(pool)
        .await?;
        tracing::debug!(user_id, "Flushed rewards state");
        Ok(())
    }
}
