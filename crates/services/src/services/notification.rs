//! Presentation-side seam for surfacing freshly earned achievements.

use async_trait::async_trait;
use tracing::info;

use super::achievements::GrantedAchievement;

/// Called once per newly granted achievement so the surrounding app can
/// show a toast or animation. Delivery is best-effort: implementations
/// handle their own failures and must not assume exactly-once.
#[async_trait]
pub trait GrantNotifier: Send + Sync {
    async fn on_achievement_granted(&self, achievement: &GrantedAchievement);
}

/// Default notifier: records the unlock in the log and nothing else.
pub struct LogNotifier;

#[async_trait]
impl GrantNotifier for LogNotifier {
    async fn on_achievement_granted(&self, achievement: &GrantedAchievement) {
        info!(
            achievement = achievement.id,
            title = achievement.title,
            "achievement unlocked"
        );
    }
}
