//! The static achievement catalog. Entries are declared by category, then
//! ascending threshold; declaration order is the display and evaluation
//! order. Ids are persistence keys and must never change once released.

use db::models::achievement::{AchievementCategory, AchievementDef};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown achievement id: {0}")]
    NotFound(String),
}

/// Display text used when an id can't be resolved, so lookups never bubble
/// up to the user.
pub const FALLBACK_TITLE: &str = "Achievement";
pub const FALLBACK_DESCRIPTION: &str = "Achievement description";

const CATALOG: &[AchievementDef] = &[
    AchievementDef {
        id: "first_habit",
        title: "First Steps",
        description: "Create your first habit",
        category: AchievementCategory::HabitCreation,
        threshold: 1,
        icon: "🎯",
    },
    AchievementDef {
        id: "five_habits",
        title: "Habit Collector",
        description: "Create 5 different habits",
        category: AchievementCategory::HabitCreation,
        threshold: 5,
        icon: "📝",
    },
    AchievementDef {
        id: "ten_habits",
        title: "Habit Master",
        description: "Create 10 different habits",
        category: AchievementCategory::HabitCreation,
        threshold: 10,
        icon: "💪",
    },
    AchievementDef {
        id: "first_completion",
        title: "First Win",
        description: "Complete any habit for the first time",
        category: AchievementCategory::HabitCompletion,
        threshold: 1,
        icon: "✅",
    },
    AchievementDef {
        id: "ten_completions",
        title: "Ten Victories",
        description: "Complete habits 10 times",
        category: AchievementCategory::HabitCompletion,
        threshold: 10,
        icon: "🔥",
    },
    AchievementDef {
        id: "fifty_completions",
        title: "Half a Hundred",
        description: "Complete habits 50 times",
        category: AchievementCategory::HabitCompletion,
        threshold: 50,
        icon: "⭐",
    },
    AchievementDef {
        id: "streak_3",
        title: "Three-Day Streak",
        description: "Complete habits 3 days in a row",
        category: AchievementCategory::Streak,
        threshold: 3,
        icon: "📅",
    },
    AchievementDef {
        id: "streak_7",
        title: "Week Champion",
        description: "Complete habits 7 days in a row",
        category: AchievementCategory::Streak,
        threshold: 7,
        icon: "🏆",
    },
    AchievementDef {
        id: "streak_30",
        title: "Month of Discipline",
        description: "Complete habits 30 days in a row",
        category: AchievementCategory::Streak,
        threshold: 30,
        icon: "👑",
    },
    AchievementDef {
        id: "hundred_points",
        title: "Hundred Points",
        description: "Earn 100 points",
        category: AchievementCategory::Points,
        threshold: 100,
        icon: "💯",
    },
    AchievementDef {
        id: "five_hundred_points",
        title: "Five Hundred Points",
        description: "Earn 500 points",
        category: AchievementCategory::Points,
        threshold: 500,
        icon: "💰",
    },
    AchievementDef {
        id: "thousand_points",
        title: "Thousand Points",
        description: "Earn 1000 points",
        category: AchievementCategory::Points,
        threshold: 1000,
        icon: "🎖️",
    },
    AchievementDef {
        id: "early_bird",
        title: "Early Bird",
        description: "Complete a habit in the early morning",
        category: AchievementCategory::Special,
        threshold: 1,
        icon: "🌅",
    },
    AchievementDef {
        id: "night_owl",
        title: "Night Owl",
        description: "Complete a habit late at night",
        category: AchievementCategory::Special,
        threshold: 1,
        icon: "🌙",
    },
    // Declared since the first release but no event evaluates it; kept so
    // the achievements screen can keep showing it as locked.
    AchievementDef {
        id: "perfect_week",
        title: "Perfect Week",
        description: "Complete every habit each day of the week",
        category: AchievementCategory::Special,
        threshold: 7,
        icon: "🌟",
    },
];

/// Every achievement the app can grant, in fixed order.
pub fn all() -> &'static [AchievementDef] {
    CATALOG
}

pub fn find_by_id(id: &str) -> Result<&'static AchievementDef, CatalogError> {
    CATALOG
        .iter()
        .find(|def| def.id == id)
        .ok_or_else(|| CatalogError::NotFound(id.to_string()))
}

/// Display title for an id, falling back to a generic placeholder for ids
/// the catalog doesn't know.
pub fn display_title(id: &str) -> &'static str {
    find_by_id(id).map(|def| def.title).unwrap_or(FALLBACK_TITLE)
}

pub fn display_description(id: &str) -> &'static str {
    find_by_id(id)
        .map(|def| def.description)
        .unwrap_or(FALLBACK_DESCRIPTION)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn every_listed_id_resolves() {
        for def in all() {
            let found = find_by_id(def.id).unwrap();
            assert_eq!(found.id, def.id);
        }
    }

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<&str> = all().iter().map(|def| def.id).collect();
        assert_eq!(ids.len(), all().len());
    }

    #[test]
    fn ordered_by_category_then_threshold() {
        for pair in all().windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.category == b.category {
                assert!(
                    a.threshold <= b.threshold,
                    "{} ({}) must not precede {} ({})",
                    a.id,
                    a.threshold,
                    b.id,
                    b.threshold
                );
            }
        }
    }

    #[test]
    fn unknown_id_falls_back_to_placeholders() {
        assert!(matches!(
            find_by_id("golden_unicorn"),
            Err(CatalogError::NotFound(_))
        ));
        assert_eq!(display_title("golden_unicorn"), FALLBACK_TITLE);
        assert_eq!(display_description("golden_unicorn"), FALLBACK_DESCRIPTION);
        assert_eq!(display_title("night_owl"), "Night Owl");
    }
}
