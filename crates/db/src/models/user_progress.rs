use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

/// Per-user running counters driving achievement evaluation. All counters
/// are non-negative and monotonically non-decreasing except
/// `current_streak`, which may reset to 0.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_habits: i64,
    pub total_completions: i64,
    pub total_points: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const RETURNING: &str = r#"RETURNING id, user_id, total_habits, total_completions,
                 total_points, current_streak, longest_streak, created_at, updated_at"#;

impl UserProgress {
    /// Zero-valued progress for a user with no recorded activity. Not
    /// persisted; the row is created lazily by the first mutating call.
    pub fn zero(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            total_habits: 0,
            total_completions: 0,
            total_points: 0,
            current_streak: 0,
            longest_streak: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub async fn find_by_user_id(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, user_id, total_habits, total_completions,
                      total_points, current_streak, longest_streak, created_at, updated_at
               FROM user_progress
               WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Current progress for a user, zero-valued when nothing has been
    /// recorded yet.
    pub async fn get_or_default(pool: &SqlitePool, user_id: Uuid) -> Result<Self, sqlx::Error> {
        Ok(Self::find_by_user_id(pool, user_id)
            .await?
            .unwrap_or_else(|| Self::zero(user_id)))
    }

    /// Add one to `total_habits`. The increment happens inside the upsert,
    /// so concurrent events for the same user cannot lose updates.
    pub async fn increment_habits(pool: &SqlitePool, user_id: Uuid) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            r#"INSERT INTO user_progress (id, user_id, total_habits)
               VALUES ($1, $2, 1)
               ON CONFLICT(user_id) DO UPDATE SET
                   total_habits = total_habits + 1,
                   updated_at = datetime('now', 'subsec')
               {RETURNING}"#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Add one completion and `points` points.
    pub async fn record_completion(
        pool: &SqlitePool,
        user_id: Uuid,
        points: i64,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            r#"INSERT INTO user_progress (id, user_id, total_completions, total_points)
               VALUES ($1, $2, 1, $3)
               ON CONFLICT(user_id) DO UPDATE SET
                   total_completions = total_completions + 1,
                   total_points = total_points + excluded.total_points,
                   updated_at = datetime('now', 'subsec')
               {RETURNING}"#
        ))
        .bind(id)
        .bind(user_id)
        .bind(points)
        .fetch_one(pool)
        .await
    }

    /// Overwrite `current_streak`, raising `longest_streak` when the new
    /// value tops it. A reset to 0 never lowers `longest_streak`.
    pub async fn set_streak(
        pool: &SqlitePool,
        user_id: Uuid,
        days: i64,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            r#"INSERT INTO user_progress (id, user_id, current_streak, longest_streak)
               VALUES ($1, $2, $3, $3)
               ON CONFLICT(user_id) DO UPDATE SET
                   current_streak = excluded.current_streak,
                   longest_streak = max(longest_streak, excluded.current_streak),
                   updated_at = datetime('now', 'subsec')
               {RETURNING}"#
        ))
        .bind(id)
        .bind(user_id)
        .bind(days)
        .fetch_one(pool)
        .await
    }

    /// Absolute points update. Points never decrease, so a stale or
    /// out-of-order total can only be a no-op.
    pub async fn set_total_points(
        pool: &SqlitePool,
        user_id: Uuid,
        total: i64,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            r#"INSERT INTO user_progress (id, user_id, total_points)
               VALUES ($1, $2, $3)
               ON CONFLICT(user_id) DO UPDATE SET
                   total_points = max(total_points, excluded.total_points),
                   updated_at = datetime('now', 'subsec')
               {RETURNING}"#
        ))
        .bind(id)
        .bind(user_id)
        .bind(total)
        .fetch_one(pool)
        .await
    }
}
