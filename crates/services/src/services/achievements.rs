//! Achievement evaluation and grant recording over the progress store.
//!
//! Every inbound activity event follows the same shape: validate, persist
//! the counter update, evaluate the updated snapshot, then record any new
//! grants. If the counter update fails nothing downstream runs, so
//! counters and grants can't drift apart.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use db::{
    DBService,
    models::{
        achievement::{AchievementDef, AchievementGrant},
        user_progress::UserProgress,
    },
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    catalog,
    evaluator::{self, ActivityEvent},
    notification::GrantNotifier,
};

#[derive(Debug, Error)]
pub enum AchievementError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("unknown achievement: {0}")]
    AchievementNotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Display payload for a freshly earned achievement, handed to the
/// notifier and returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct GrantedAchievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub date_earned: DateTime<Utc>,
}

/// Outcome of a grant attempt. `AlreadyGranted` is the normal idempotent
/// outcome, not an error.
#[derive(Debug, Clone)]
pub enum GrantOutcome {
    Granted(GrantedAchievement),
    AlreadyGranted,
}

/// Catalog entry annotated with earned state, for the achievements screen.
#[derive(Debug, Clone, Serialize)]
pub struct AchievementStatus {
    pub achievement: &'static AchievementDef,
    pub earned: bool,
    pub date_earned: Option<DateTime<Utc>>,
}

pub struct AchievementService {
    db: DBService,
    catalog: &'static [AchievementDef],
    notifier: Arc<dyn GrantNotifier>,
}

impl AchievementService {
    pub fn new(db: DBService, notifier: Arc<dyn GrantNotifier>) -> Self {
        Self {
            db,
            catalog: catalog::all(),
            notifier,
        }
    }

    /// Current progress for a user, zero-valued when nothing has been
    /// recorded yet.
    pub async fn progress(&self, user_id: Uuid) -> Result<UserProgress, AchievementError> {
        Ok(UserProgress::get_or_default(&self.db.pool, user_id).await?)
    }

    pub async fn is_unlocked(
        &self,
        user_id: Uuid,
        achievement_id: &str,
    ) -> Result<bool, AchievementError> {
        Ok(AchievementGrant::exists(&self.db.pool, user_id, achievement_id).await?)
    }

    /// A habit was created; bumps `total_habits` and re-checks the
    /// habit-creation ladder.
    pub async fn on_habit_created(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<GrantedAchievement>, AchievementError> {
        let progress = UserProgress::increment_habits(&self.db.pool, user_id).await?;
        debug!(
            user_id = %user_id,
            total_habits = progress.total_habits,
            "habit created"
        );
        self.evaluate_and_grant(&progress, ActivityEvent::HabitCreated)
            .await
    }

    /// A habit was completed; bumps the completion counter, awards points
    /// and re-checks completions, points and the time-of-day specials.
    /// `completion_hour` is the local hour of day, 0..=23.
    pub async fn on_habit_completed(
        &self,
        user_id: Uuid,
        points_awarded: i64,
        completion_hour: u32,
    ) -> Result<Vec<GrantedAchievement>, AchievementError> {
        if points_awarded < 0 {
            return Err(AchievementError::InvalidInput(format!(
                "points awarded must be non-negative, got {points_awarded}"
            )));
        }
        if completion_hour > 23 {
            return Err(AchievementError::InvalidInput(format!(
                "completion hour must be 0..=23, got {completion_hour}"
            )));
        }
        let progress =
            UserProgress::record_completion(&self.db.pool, user_id, points_awarded).await?;
        debug!(
            user_id = %user_id,
            total_completions = progress.total_completions,
            total_points = progress.total_points,
            hour = completion_hour,
            "habit completed"
        );
        self.evaluate_and_grant(
            &progress,
            ActivityEvent::HabitCompleted {
                hour: completion_hour,
            },
        )
        .await
    }

    /// The user's streak was recomputed. A reset to 0 never revokes
    /// already-granted streak achievements.
    pub async fn on_streak_changed(
        &self,
        user_id: Uuid,
        new_streak: i64,
    ) -> Result<Vec<GrantedAchievement>, AchievementError> {
        if new_streak < 0 {
            return Err(AchievementError::InvalidInput(format!(
                "streak must be non-negative, got {new_streak}"
            )));
        }
        let progress = UserProgress::set_streak(&self.db.pool, user_id, new_streak).await?;
        debug!(
            user_id = %user_id,
            current_streak = progress.current_streak,
            "streak changed"
        );
        self.evaluate_and_grant(&progress, ActivityEvent::StreakChanged)
            .await
    }

    /// The user's absolute point total changed outside the completion
    /// path; re-checks the points ladder.
    pub async fn on_points_changed(
        &self,
        user_id: Uuid,
        new_total: i64,
    ) -> Result<Vec<GrantedAchievement>, AchievementError> {
        if new_total < 0 {
            return Err(AchievementError::InvalidInput(format!(
                "point total must be non-negative, got {new_total}"
            )));
        }
        let progress = UserProgress::set_total_points(&self.db.pool, user_id, new_total).await?;
        debug!(
            user_id = %user_id,
            total_points = progress.total_points,
            "points changed"
        );
        self.evaluate_and_grant(&progress, ActivityEvent::PointsChanged)
            .await
    }

    /// Grant a specific achievement by id. Unknown ids are refused so the
    /// unlocked set stays a subset of the catalog.
    pub async fn grant(
        &self,
        user_id: Uuid,
        achievement_id: &str,
        earned_at: DateTime<Utc>,
    ) -> Result<GrantOutcome, AchievementError> {
        let def = self
            .catalog
            .iter()
            .find(|d| d.id == achievement_id)
            .ok_or_else(|| AchievementError::AchievementNotFound(achievement_id.to_string()))?;
        self.grant_def(user_id, def, earned_at).await
    }

    /// The full catalog annotated with earned state, earned entries first
    /// (catalog order within each group).
    pub async fn achievement_overview(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<AchievementStatus>, AchievementError> {
        let grants = AchievementGrant::find_by_user_id(&self.db.pool, user_id).await?;
        let earned: HashMap<String, DateTime<Utc>> = grants
            .into_iter()
            .map(|g| (g.achievement_id, g.date_earned))
            .collect();

        let mut statuses: Vec<AchievementStatus> = self
            .catalog
            .iter()
            .map(|def| {
                let date_earned = earned.get(def.id).copied();
                AchievementStatus {
                    achievement: def,
                    earned: date_earned.is_some(),
                    date_earned,
                }
            })
            .collect();
        statuses.sort_by_key(|s| !s.earned);
        Ok(statuses)
    }

    async fn evaluate_and_grant(
        &self,
        progress: &UserProgress,
        event: ActivityEvent,
    ) -> Result<Vec<GrantedAchievement>, AchievementError> {
        let unlocked = AchievementGrant::unlocked_ids(&self.db.pool, progress.user_id).await?;
        let qualifying = evaluator::newly_qualified(self.catalog, progress, &unlocked, event);

        let mut granted = Vec::new();
        let now = Utc::now();
        for def in qualifying {
            match self.grant_def(progress.user_id, def, now).await? {
                GrantOutcome::Granted(g) => granted.push(g),
                // Lost the race to a concurrent event for the same user;
                // the other event already surfaced it.
                GrantOutcome::AlreadyGranted => {}
            }
        }
        Ok(granted)
    }

    async fn grant_def(
        &self,
        user_id: Uuid,
        def: &'static AchievementDef,
        earned_at: DateTime<Utc>,
    ) -> Result<GrantOutcome, AchievementError> {
        match AchievementGrant::create_if_absent(&self.db.pool, user_id, def.id, earned_at).await? {
            Some(row) => {
                info!(
                    user_id = %user_id,
                    achievement = def.id,
                    category = %def.category,
                    "achievement granted"
                );
                let granted = GrantedAchievement {
                    id: def.id,
                    title: def.title,
                    description: def.description,
                    icon: def.icon,
                    date_earned: row.date_earned,
                };
                self.notifier.on_achievement_granted(&granted).await;
                Ok(GrantOutcome::Granted(granted))
            }
            None => {
                debug!(
                    user_id = %user_id,
                    achievement = def.id,
                    "achievement already granted"
                );
                Ok(GrantOutcome::AlreadyGranted)
            }
        }
    }
}
