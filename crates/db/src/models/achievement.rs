use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Unlock condition family of a catalog entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AchievementCategory {
    HabitCreation,
    HabitCompletion,
    Streak,
    Points,
    Special,
}

/// Immutable catalog entry. `id` is a persistence key and must never change
/// once released.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct AchievementDef {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: AchievementCategory,
    /// Habit count, completion count, consecutive days or point total
    /// depending on category. Unused for `Special`, which is driven by a
    /// predicate on the triggering event.
    pub threshold: i64,
    pub icon: &'static str,
}

/// A single earned achievement. One row per (user, achievement), immutable
/// once written.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AchievementGrant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub achievement_id: String,
    pub date_earned: DateTime<Utc>,
}

impl AchievementGrant {
    /// Conditionally create the grant row, returning `None` when the user
    /// already holds the achievement. The existence check and the insert
    /// are one statement, so two racing callers cannot both win.
    pub async fn create_if_absent(
        pool: &SqlitePool,
        user_id: Uuid,
        achievement_id: &str,
        date_earned: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO achievement_grants (id, user_id, achievement_id, date_earned)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT(user_id, achievement_id) DO NOTHING
               RETURNING id, user_id, achievement_id, date_earned"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(achievement_id)
        .bind(date_earned)
        .fetch_optional(pool)
        .await
    }

    pub async fn exists(
        pool: &SqlitePool,
        user_id: Uuid,
        achievement_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM achievement_grants WHERE user_id = $1 AND achievement_id = $2",
        )
        .bind(user_id)
        .bind(achievement_id)
        .fetch_one(pool)
        .await?;

        Ok(count > 0)
    }

    /// Ids of every achievement the user has earned.
    pub async fn unlocked_ids(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<HashSet<String>, sqlx::Error> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT achievement_id FROM achievement_grants WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    pub async fn find_by_user_id(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, user_id, achievement_id, date_earned
               FROM achievement_grants
               WHERE user_id = $1
               ORDER BY date_earned ASC"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
