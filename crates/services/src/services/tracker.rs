//! Habit bookkeeping: creation, per-day completion toggling, and the
//! activity events those feed into achievement evaluation.

use std::sync::Arc;

use chrono::NaiveDate;
use db::{
    DBService,
    models::{
        completion::HabitCompletion,
        habit::{CreateHabit, Habit},
    },
};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::achievements::{AchievementError, AchievementService, GrantedAchievement};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("achievement error: {0}")]
    Achievement(#[from] AchievementError),
    #[error("habit not found: {0}")]
    HabitNotFound(Uuid),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Outcome of checking off a habit for a given day.
#[derive(Debug)]
pub enum CompletionOutcome {
    /// First completion of this habit for the day: points were awarded and
    /// any newly qualifying achievements granted.
    Recorded {
        points_awarded: i64,
        granted: Vec<GrantedAchievement>,
    },
    /// The habit was already completed on that day; nothing changed.
    AlreadyCompleted,
}

pub struct HabitTrackerService {
    db: DBService,
    achievements: Arc<AchievementService>,
}

impl HabitTrackerService {
    pub fn new(db: DBService, achievements: Arc<AchievementService>) -> Self {
        Self { db, achievements }
    }

    /// Create a habit and report the creation event, returning the habit
    /// together with any achievements it unlocked.
    pub async fn create_habit(
        &self,
        user_id: Uuid,
        data: &CreateHabit,
    ) -> Result<(Habit, Vec<GrantedAchievement>), TrackerError> {
        if data.title.trim().is_empty() {
            return Err(TrackerError::InvalidInput(
                "habit title must not be empty".to_string(),
            ));
        }
        if let Some(points) = data.points {
            if points < 0 {
                return Err(TrackerError::InvalidInput(format!(
                    "habit points must be non-negative, got {points}"
                )));
            }
        }

        let habit = Habit::create(&self.db.pool, user_id, data).await?;
        info!(
            user_id = %user_id,
            habit_id = %habit.id,
            title = %habit.title,
            "habit created"
        );
        let granted = self.achievements.on_habit_created(user_id).await?;
        Ok((habit, granted))
    }

    /// Check off a habit for `date`. The first completion of the day
    /// awards the habit's points and runs achievement evaluation with
    /// `local_hour` (0..=23); a repeat is a no-op.
    pub async fn complete_habit(
        &self,
        habit_id: Uuid,
        date: NaiveDate,
        local_hour: u32,
    ) -> Result<CompletionOutcome, TrackerError> {
        let habit = Habit::find_by_id(&self.db.pool, habit_id)
            .await?
            .ok_or(TrackerError::HabitNotFound(habit_id))?;

        let Some(_completion) =
            HabitCompletion::create_if_absent(&self.db.pool, habit_id, habit.user_id, date).await?
        else {
            debug!(habit_id = %habit_id, date = %date, "already completed on this day");
            return Ok(CompletionOutcome::AlreadyCompleted);
        };

        let granted = self
            .achievements
            .on_habit_completed(habit.user_id, habit.points, local_hour)
            .await?;
        Ok(CompletionOutcome::Recorded {
            points_awarded: habit.points,
            granted,
        })
    }

    /// Uncheck a habit for `date`. The day's completion row is removed so
    /// it can be re-checked, but progress counters only ever grow: earned
    /// points and completion counts stay.
    pub async fn uncomplete_habit(
        &self,
        habit_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, TrackerError> {
        let removed = HabitCompletion::delete_for_day(&self.db.pool, habit_id, date).await?;
        if removed {
            debug!(habit_id = %habit_id, date = %date, "completion removed");
        }
        Ok(removed)
    }

    pub async fn habits_for_user(&self, user_id: Uuid) -> Result<Vec<Habit>, TrackerError> {
        Ok(Habit::find_by_user_id(&self.db.pool, user_id).await?)
    }

    pub async fn is_completed_on(
        &self,
        habit_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, TrackerError> {
        Ok(HabitCompletion::exists_on(&self.db.pool, habit_id, date).await?)
    }

    /// Delete a habit and its completion history. Progress counters and
    /// grants are permanent and stay as they are.
    pub async fn delete_habit(&self, habit_id: Uuid) -> Result<bool, TrackerError> {
        let deleted = Habit::delete(&self.db.pool, habit_id).await?;
        if deleted {
            info!(habit_id = %habit_id, "habit deleted");
        }
        Ok(deleted)
    }
}
