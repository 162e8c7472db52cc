//! Pure unlock evaluation: maps a progress snapshot and an activity event
//! to the not-yet-unlocked achievements that now qualify. No side effects
//! and no locking; safe to run from any task.

use std::{collections::HashSet, ops::RangeInclusive};

use db::models::{
    achievement::{AchievementCategory, AchievementDef},
    user_progress::UserProgress,
};

/// Local hours (inclusive) counting as an early-morning completion.
const EARLY_BIRD_HOURS: RangeInclusive<u32> = 5..=7;
/// Local hours counting as a late-night completion; midnight belongs to
/// the window too.
const NIGHT_OWL_HOURS: RangeInclusive<u32> = 22..=23;

/// An activity event reported by the habit-management side. Each variant
/// re-checks only the categories it can affect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityEvent {
    HabitCreated,
    HabitCompleted { hour: u32 },
    StreakChanged,
    PointsChanged,
}

impl ActivityEvent {
    fn checks(self, category: AchievementCategory) -> bool {
        matches!(
            (self, category),
            (Self::HabitCreated, AchievementCategory::HabitCreation)
                | (Self::HabitCompleted { .. }, AchievementCategory::HabitCompletion)
                | (Self::HabitCompleted { .. }, AchievementCategory::Points)
                | (Self::HabitCompleted { .. }, AchievementCategory::Special)
                | (Self::StreakChanged, AchievementCategory::Streak)
                | (Self::PointsChanged, AchievementCategory::Points)
        )
    }
}

/// The achievements newly qualifying under `event`, in catalog order.
/// Already-unlocked ids are never re-emitted; thresholds are monotonic on
/// monotonic counters, so re-running the full set per event is correct.
pub fn newly_qualified<'a>(
    catalog: &'a [AchievementDef],
    progress: &UserProgress,
    unlocked: &HashSet<String>,
    event: ActivityEvent,
) -> Vec<&'a AchievementDef> {
    catalog
        .iter()
        .filter(|def| event.checks(def.category))
        .filter(|def| !unlocked.contains(def.id))
        .filter(|def| qualifies(def, progress, event))
        .collect()
}

fn qualifies(def: &AchievementDef, progress: &UserProgress, event: ActivityEvent) -> bool {
    match def.category {
        AchievementCategory::HabitCreation => progress.total_habits >= def.threshold,
        AchievementCategory::HabitCompletion => progress.total_completions >= def.threshold,
        AchievementCategory::Streak => progress.current_streak >= def.threshold,
        AchievementCategory::Points => progress.total_points >= def.threshold,
        AchievementCategory::Special => special_qualifies(def.id, event),
    }
}

fn special_qualifies(id: &str, event: ActivityEvent) -> bool {
    let ActivityEvent::HabitCompleted { hour } = event else {
        return false;
    };
    match id {
        "early_bird" => EARLY_BIRD_HOURS.contains(&hour),
        "night_owl" => NIGHT_OWL_HOURS.contains(&hour) || hour == 0,
        // perfect_week is in the catalog but nothing triggers it
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::services::catalog;

    fn progress() -> UserProgress {
        UserProgress::zero(Uuid::new_v4())
    }

    fn ids(defs: &[&AchievementDef]) -> Vec<&'static str> {
        defs.iter().map(|def| def.id).collect()
    }

    #[test]
    fn habit_thresholds_at_five() {
        let mut p = progress();
        p.total_habits = 5;
        let emitted = newly_qualified(
            catalog::all(),
            &p,
            &HashSet::new(),
            ActivityEvent::HabitCreated,
        );
        assert_eq!(ids(&emitted), vec!["first_habit", "five_habits"]);
    }

    #[test]
    fn habit_thresholds_at_ten() {
        let mut p = progress();
        p.total_habits = 10;
        let emitted = newly_qualified(
            catalog::all(),
            &p,
            &HashSet::new(),
            ActivityEvent::HabitCreated,
        );
        assert_eq!(ids(&emitted), vec!["first_habit", "five_habits", "ten_habits"]);
    }

    #[test]
    fn unlocked_ids_are_not_re_emitted() {
        let mut p = progress();
        p.total_habits = 10;
        let unlocked: HashSet<String> =
            ["first_habit", "five_habits"].iter().map(|s| s.to_string()).collect();
        let emitted = newly_qualified(catalog::all(), &p, &unlocked, ActivityEvent::HabitCreated);
        assert_eq!(ids(&emitted), vec!["ten_habits"]);
    }

    #[test]
    fn completion_event_checks_completions_points_and_specials() {
        let mut p = progress();
        p.total_habits = 10; // must NOT leak into a completion event
        p.total_completions = 1;
        p.total_points = 150;
        let emitted = newly_qualified(
            catalog::all(),
            &p,
            &HashSet::new(),
            ActivityEvent::HabitCompleted { hour: 12 },
        );
        assert_eq!(ids(&emitted), vec!["first_completion", "hundred_points"]);
    }

    #[test]
    fn early_bird_window() {
        let mut p = progress();
        p.total_completions = 1;
        for (hour, expected) in [(4, false), (5, true), (6, true), (7, true), (8, false)] {
            let emitted = newly_qualified(
                catalog::all(),
                &p,
                &HashSet::new(),
                ActivityEvent::HabitCompleted { hour },
            );
            assert_eq!(
                emitted.iter().any(|d| d.id == "early_bird"),
                expected,
                "hour {hour}"
            );
        }
    }

    #[test]
    fn night_owl_window_includes_midnight() {
        let mut p = progress();
        p.total_completions = 1;
        for (hour, expected) in [(21, false), (22, true), (23, true), (0, true), (1, false)] {
            let emitted = newly_qualified(
                catalog::all(),
                &p,
                &HashSet::new(),
                ActivityEvent::HabitCompleted { hour },
            );
            assert_eq!(
                emitted.iter().any(|d| d.id == "night_owl"),
                expected,
                "hour {hour}"
            );
        }
    }

    #[test]
    fn midday_completion_grants_no_special() {
        let mut p = progress();
        p.total_completions = 1;
        let emitted = newly_qualified(
            catalog::all(),
            &p,
            &HashSet::new(),
            ActivityEvent::HabitCompleted { hour: 12 },
        );
        assert!(emitted.iter().all(|d| d.id != "early_bird" && d.id != "night_owl"));
    }

    #[test]
    fn streak_event_checks_only_streaks() {
        let mut p = progress();
        p.current_streak = 7;
        p.total_points = 1000; // ignored by a streak event
        let emitted = newly_qualified(
            catalog::all(),
            &p,
            &HashSet::new(),
            ActivityEvent::StreakChanged,
        );
        assert_eq!(ids(&emitted), vec!["streak_3", "streak_7"]);
    }

    #[test]
    fn points_event_checks_only_points() {
        let mut p = progress();
        p.total_points = 500;
        p.total_habits = 10; // ignored by a points event
        let emitted = newly_qualified(
            catalog::all(),
            &p,
            &HashSet::new(),
            ActivityEvent::PointsChanged,
        );
        assert_eq!(ids(&emitted), vec!["hundred_points", "five_hundred_points"]);
    }

    #[test]
    fn perfect_week_is_never_emitted() {
        let mut p = progress();
        p.total_habits = 100;
        p.total_completions = 100;
        p.total_points = 10_000;
        p.current_streak = 100;
        for hour in 0..24 {
            for event in [
                ActivityEvent::HabitCreated,
                ActivityEvent::HabitCompleted { hour },
                ActivityEvent::StreakChanged,
                ActivityEvent::PointsChanged,
            ] {
                let emitted = newly_qualified(catalog::all(), &p, &HashSet::new(), event);
                assert!(emitted.iter().all(|d| d.id != "perfect_week"));
            }
        }
    }
}
