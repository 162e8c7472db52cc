use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

/// A habit checked off for one calendar day.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct HabitCompletion {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub user_id: Uuid,
    pub completed_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl HabitCompletion {
    /// Record the completion for the day, returning `None` when the habit
    /// was already completed on that date.
    pub async fn create_if_absent(
        pool: &SqlitePool,
        habit_id: Uuid,
        user_id: Uuid,
        completed_on: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO habit_completions (id, habit_id, user_id, completed_on)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT(habit_id, completed_on) DO NOTHING
               RETURNING id, habit_id, user_id, completed_on, created_at"#,
        )
        .bind(id)
        .bind(habit_id)
        .bind(user_id)
        .bind(completed_on)
        .fetch_optional(pool)
        .await
    }

    /// Remove the day's completion (the habit was unchecked). Progress
    /// counters are not touched; they only ever grow.
    pub async fn delete_for_day(
        pool: &SqlitePool,
        habit_id: Uuid,
        completed_on: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM habit_completions WHERE habit_id = $1 AND completed_on = $2")
                .bind(habit_id)
                .bind(completed_on)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists_on(
        pool: &SqlitePool,
        habit_id: Uuid,
        completed_on: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM habit_completions WHERE habit_id = $1 AND completed_on = $2",
        )
        .bind(habit_id)
        .bind(completed_on)
        .fetch_one(pool)
        .await?;
        Ok(count > 0)
    }

    pub async fn count_by_user_id(pool: &SqlitePool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM habit_completions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::habit::{CreateHabit, Habit},
        test_pool,
    };

    async fn make_habit(pool: &SqlitePool, user_id: Uuid) -> Habit {
        Habit::create(pool, user_id, &CreateHabit::from_title("Meditate"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn one_completion_per_day() {
        let pool = test_pool().await;
        let user_id = Uuid::new_v4();
        let habit = make_habit(&pool, user_id).await;
        let day = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();

        let first = HabitCompletion::create_if_absent(&pool, habit.id, user_id, day)
            .await
            .unwrap();
        assert!(first.is_some());

        let second = HabitCompletion::create_if_absent(&pool, habit.id, user_id, day)
            .await
            .unwrap();
        assert!(second.is_none());

        // A different day is a fresh completion.
        let next_day = day.succ_opt().unwrap();
        let third = HabitCompletion::create_if_absent(&pool, habit.id, user_id, next_day)
            .await
            .unwrap();
        assert!(third.is_some());

        assert_eq!(
            HabitCompletion::count_by_user_id(&pool, user_id).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn uncheck_then_recheck() {
        let pool = test_pool().await;
        let user_id = Uuid::new_v4();
        let habit = make_habit(&pool, user_id).await;
        let day = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();

        HabitCompletion::create_if_absent(&pool, habit.id, user_id, day)
            .await
            .unwrap();
        assert!(HabitCompletion::exists_on(&pool, habit.id, day).await.unwrap());

        assert!(HabitCompletion::delete_for_day(&pool, habit.id, day)
            .await
            .unwrap());
        assert!(!HabitCompletion::exists_on(&pool, habit.id, day).await.unwrap());

        // Re-checking the same day works again after the delete.
        let again = HabitCompletion::create_if_absent(&pool, habit.id, user_id, day)
            .await
            .unwrap();
        assert!(again.is_some());
    }

    #[tokio::test]
    async fn deleting_habit_cascades_completions() {
        let pool = test_pool().await;
        let user_id = Uuid::new_v4();
        let habit = make_habit(&pool, user_id).await;
        let day = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();

        HabitCompletion::create_if_absent(&pool, habit.id, user_id, day)
            .await
            .unwrap();
        Habit::delete(&pool, habit.id).await.unwrap();

        assert_eq!(
            HabitCompletion::count_by_user_id(&pool, user_id).await.unwrap(),
            0
        );
    }
}
