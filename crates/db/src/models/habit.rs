use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

/// Points awarded for a completion when the habit doesn't specify its own.
pub const DEFAULT_POINTS: i64 = 10;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub frequency: String,
    /// Points awarded each day this habit is completed.
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHabit {
    pub title: String,
    pub description: Option<String>,
    pub frequency: Option<String>,
    pub points: Option<i64>,
}

impl CreateHabit {
    pub fn from_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            frequency: None,
            points: None,
        }
    }
}

impl Habit {
    pub async fn create(
        pool: &SqlitePool,
        user_id: Uuid,
        data: &CreateHabit,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        let frequency = data.frequency.as_deref().unwrap_or("daily");
        let points = data.points.unwrap_or(DEFAULT_POINTS);
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO habits (id, user_id, title, description, frequency, points)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, user_id, title, description, frequency, points, created_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(frequency)
        .bind(points)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, user_id, title, description, frequency, points, created_at
               FROM habits
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_user_id(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, user_id, title, description, frequency, points, created_at
               FROM habits
               WHERE user_id = $1
               ORDER BY created_at ASC"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count_by_user_id(pool: &SqlitePool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM habits WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Returns whether a row was actually removed.
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM habits WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
