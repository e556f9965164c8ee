//! Bonus attempts for watching a rewarded ad.

use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{info, warn};

use crate::ads::{AdProvider, AdResult};
use crate::quota::QuotaProvider;

pub struct RewardGate;

impl RewardGate {
    /// Starts a rewarded view. The quota is only touched when the returned
    /// handle is resolved.
    pub fn request(ads: &mut dyn AdProvider) -> PendingReward {
        info!(target: "reward", loaded = ads.is_loaded(), "Requesting bonus attempt");
        PendingReward { rx: ads.show() }
    }

    /// Shows an ad and credits one attempt if it pays out. Never spends the
    /// credited attempt.
    pub async fn request_bonus_attempt(
        ads: &mut dyn AdProvider,
        quota: &mut dyn QuotaProvider,
    ) -> bool {
        Self::request(ads).resolve(quota).await
    }
}

/// An ad view whose outcome has not been applied yet. Resolving consumes the
/// handle, so an outcome is applied exactly once.
pub struct PendingReward {
    rx: oneshot::Receiver<AdResult>,
}

impl PendingReward {
    /// Applies the outcome if it has arrived; otherwise hands the pending
    /// reward back.
    pub fn try_resolve(mut self, quota: &mut dyn QuotaProvider) -> Result<bool, PendingReward> {
        match self.rx.try_recv() {
            Ok(result) => Ok(apply(result, quota)),
            Err(TryRecvError::Empty) => Err(self),
            Err(TryRecvError::Closed) => Ok(apply(
                AdResult::Failed("ad provider dropped the result".to_string()),
                quota,
            )),
        }
    }

    pub async fn resolve(self, quota: &mut dyn QuotaProvider) -> bool {
        let result = self
            .rx
            .await
            .unwrap_or_else(|_| AdResult::Failed("ad provider dropped the result".to_string()));
        apply(result, quota)
    }
}

fn apply(result: AdResult, quota: &mut dyn QuotaProvider) -> bool {
    if result.is_rewarded() {
        quota.add_attempt();
        info!(target: "reward", "Bonus attempt granted");
        true
    } else {
        warn!(target: "reward", outcome = ?result, "Rewarded ad did not pay out");
        false
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::*;
    use crate::ads::ScriptedAdProvider;
    use crate::clock::FixedClock;
    use crate::quota::{QuotaConfig, QuotaManager};
    use crate::storage::MemoryPreferences;

    fn exhausted_quota() -> QuotaManager {
        let clock = FixedClock::new(Local.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).single().unwrap());
        let mut quota = QuotaManager::new(
            QuotaConfig::default(),
            Box::new(MemoryPreferences::new()),
            Box::new(clock),
        );
        for _ in 0..3 {
            quota.use_attempt();
        }
        quota
    }

    #[tokio::test]
    async fn test_rewarded_view_credits_one_attempt() {
        let mut quota = exhausted_quota();
        let mut ads = ScriptedAdProvider::new([AdResult::Rewarded]);

        assert!(RewardGate::request_bonus_attempt(&mut ads, &mut quota).await);
        assert_eq!(quota.remaining_attempts(), 1);
        assert!(quota.can_start_quiz());
    }

    #[tokio::test]
    async fn test_failed_view_leaves_quota_alone() {
        let mut quota = exhausted_quota();
        let mut ads = ScriptedAdProvider::new([
            AdResult::NotLoaded,
            AdResult::Dismissed,
            AdResult::Failed("network".to_string()),
        ]);

        for _ in 0..3 {
            assert!(!RewardGate::request_bonus_attempt(&mut ads, &mut quota).await);
        }
        assert_eq!(quota.remaining_attempts(), 0);
    }

    #[test]
    fn test_pending_until_released() {
        let mut quota = exhausted_quota();
        let mut ads = ScriptedAdProvider::new([AdResult::Rewarded]);
        ads.hold = true;

        let pending = RewardGate::request(&mut ads);
        let pending = match pending.try_resolve(&mut quota) {
            Err(pending) => pending,
            Ok(_) => panic!("resolved before the ad finished"),
        };
        assert_eq!(quota.remaining_attempts(), 0);

        ads.release();
        assert_eq!(pending.try_resolve(&mut quota).ok(), Some(true));
        assert_eq!(quota.remaining_attempts(), 1);
    }

    #[test]
    fn test_dropped_sender_is_a_failure() {
        let mut quota = exhausted_quota();
        let (tx, rx) = oneshot::channel::<AdResult>();
        drop(tx);

        let pending = PendingReward { rx };
        assert_eq!(pending.try_resolve(&mut quota).ok(), Some(false));
        assert_eq!(quota.remaining_attempts(), 0);
    }
}
