//! Daily attempt quota.
//!
//! The quota refills to `max_attempts` the first time it is touched on a new
//! local calendar day. Crossing midnight is enough; 24 hours need not pass.

use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeDelta, TimeZone};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::storage::PreferenceStore;

/// Control signal: no attempts are left today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaExhausted;

impl std::fmt::Display for QuotaExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no quiz attempts left today")
    }
}

impl std::error::Error for QuotaExhausted {}

pub trait QuotaProvider {
    fn remaining_attempts(&mut self) -> u32;
    fn can_start_quiz(&mut self) -> bool;
    /// Spends one attempt; does nothing at zero.
    fn use_attempt(&mut self);
    /// Credits one attempt. Not capped at the daily maximum.
    fn add_attempt(&mut self);
    /// Time left until the next refill, as `HH:MM`.
    fn time_until_reset(&mut self) -> String;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    pub max_attempts: u32,
    pub remaining_attempts_key: String,
    pub last_reset_date_key: String,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            remaining_attempts_key: "remainingAttempts".to_string(),
            last_reset_date_key: "lastResetDate".to_string(),
        }
    }
}

pub struct QuotaManager {
    config: QuotaConfig,
    store: Box<dyn PreferenceStore>,
    clock: Box<dyn Clock>,
    remaining: u32,
    last_reset: Option<DateTime<Local>>,
}

impl QuotaManager {
    pub fn new(
        config: QuotaConfig,
        store: Box<dyn PreferenceStore>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let stored_remaining = store.get::<u32>(&config.remaining_attempts_key);
        let last_reset = store.get::<DateTime<Local>>(&config.last_reset_date_key);

        let mut manager = Self {
            remaining: stored_remaining.unwrap_or(config.max_attempts),
            config,
            store,
            clock,
            last_reset,
        };

        if stored_remaining.is_none() {
            manager.persist_remaining();
        }
        manager.apply_daily_reset();

        info!(target: "quota", remaining = manager.remaining, "Quota loaded");
        manager
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    pub fn last_reset(&self) -> Option<DateTime<Local>> {
        self.last_reset
    }

    fn apply_daily_reset(&mut self) {
        let now = self.clock.now();
        let due = match self.last_reset {
            Some(last) => last.date_naive() != now.date_naive(),
            None => true,
        };
        if !due {
            return;
        }

        self.remaining = self.config.max_attempts;
        self.last_reset = Some(now);
        self.persist_remaining();
        if let Err(e) = self.store.set(&self.config.last_reset_date_key, &now) {
            warn!(target: "quota", error = %e, "Failed to persist reset date");
        }
        info!(target: "quota", remaining = self.remaining, "Daily quota reset");
    }

    fn persist_remaining(&mut self) {
        if let Err(e) = self
            .store
            .set(&self.config.remaining_attempts_key, &self.remaining)
        {
            warn!(target: "quota", error = %e, "Failed to persist remaining attempts");
        }
    }
}

impl QuotaProvider for QuotaManager {
    fn remaining_attempts(&mut self) -> u32 {
        self.apply_daily_reset();
        self.remaining
    }

    fn can_start_quiz(&mut self) -> bool {
        self.apply_daily_reset();
        self.remaining > 0
    }

    fn use_attempt(&mut self) {
        self.apply_daily_reset();
        if self.remaining == 0 {
            return;
        }
        self.remaining -= 1;
        self.persist_remaining();
        debug!(target: "quota", remaining = self.remaining, "Attempt used");
    }

    fn add_attempt(&mut self) {
        self.apply_daily_reset();
        self.remaining = self.remaining.saturating_add(1);
        self.persist_remaining();
        debug!(target: "quota", remaining = self.remaining, "Attempt credited");
    }

    fn time_until_reset(&mut self) -> String {
        self.apply_daily_reset();
        let now = self.clock.now();
        let reference = self.last_reset.unwrap_or(now);
        format_until_next_day(reference, now)
    }
}

/// Time from `now` to the start of the local day after `reference`'s date,
/// as `HH:MM`.
fn format_until_next_day(reference: DateTime<Local>, now: DateTime<Local>) -> String {
    let next_day_start = reference
        .date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .and_then(|midnight| first_valid_local(midnight, |t| Local.from_local_datetime(t)));

    let Some(next_day_start) = next_day_start else {
        return "00:00".to_string();
    };

    let minutes = (next_day_start - now).num_minutes().max(0);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Earliest real instant at or after local `start`. A DST jump can skip
/// midnight, in which case the day begins at the end of the gap.
fn first_valid_local<T>(
    start: NaiveDateTime,
    resolve: impl Fn(&NaiveDateTime) -> LocalResult<T>,
) -> Option<T> {
    (0..=2).find_map(|hour| resolve(&(start + TimeDelta::hours(hour))).earliest())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, Timelike};

    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryPreferences;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, min, 0).single().unwrap()
    }

    fn manager(store: &MemoryPreferences, clock: &FixedClock) -> QuotaManager {
        QuotaManager::new(
            QuotaConfig::default(),
            Box::new(store.clone()),
            Box::new(clock.clone()),
        )
    }

    #[test]
    fn test_fresh_quota_starts_full() {
        let store = MemoryPreferences::new();
        let clock = FixedClock::new(at(2024, 5, 10, 12, 0));
        let mut quota = manager(&store, &clock);
        assert_eq!(quota.remaining_attempts(), 3);
        assert!(quota.can_start_quiz());
    }

    #[test]
    fn test_use_and_credit_attempts() {
        let store = MemoryPreferences::new();
        let clock = FixedClock::new(at(2024, 5, 10, 12, 0));
        let mut quota = manager(&store, &clock);

        for _ in 0..3 {
            quota.use_attempt();
        }
        assert_eq!(quota.remaining_attempts(), 0);
        assert!(!quota.can_start_quiz());

        quota.use_attempt();
        assert_eq!(quota.remaining_attempts(), 0);

        quota.add_attempt();
        assert_eq!(quota.remaining_attempts(), 1);
        assert!(quota.can_start_quiz());
    }

    #[test]
    fn test_credits_are_not_capped() {
        let store = MemoryPreferences::new();
        let clock = FixedClock::new(at(2024, 5, 10, 12, 0));
        let mut quota = manager(&store, &clock);
        for _ in 0..5 {
            quota.add_attempt();
        }
        assert_eq!(quota.remaining_attempts(), 8);
    }

    #[test]
    fn test_state_survives_restart() {
        let store = MemoryPreferences::new();
        let clock = FixedClock::new(at(2024, 5, 10, 12, 0));
        let mut quota = manager(&store, &clock);
        for _ in 0..3 {
            quota.use_attempt();
        }

        let mut reopened = manager(&store, &clock);
        assert_eq!(reopened.remaining_attempts(), 0);
        assert!(!reopened.can_start_quiz());
    }

    #[test]
    fn test_reset_on_new_calendar_day() {
        let store = MemoryPreferences::new();
        let clock = FixedClock::new(at(2024, 5, 10, 23, 50));
        let mut quota = manager(&store, &clock);
        quota.use_attempt();
        quota.use_attempt();
        quota.add_attempt();
        quota.add_attempt();
        quota.add_attempt();
        assert_eq!(quota.remaining_attempts(), 4);

        // Twenty minutes later, but past midnight.
        clock.advance(Duration::minutes(20));
        assert_eq!(quota.remaining_attempts(), 3);
        assert_eq!(
            quota.last_reset().map(|d| d.date_naive()),
            Some(clock.now().date_naive())
        );
    }

    #[test]
    fn test_reset_from_stale_stored_date() {
        let store = MemoryPreferences::new();
        let yesterday = at(2024, 5, 9, 8, 0);
        {
            let mut prefs: Box<dyn PreferenceStore> = Box::new(store.clone());
            prefs.set("remainingAttempts", &0u32).unwrap();
            prefs.set("lastResetDate", &yesterday).unwrap();
        }

        let clock = FixedClock::new(at(2024, 5, 10, 9, 0));
        let mut quota = manager(&store, &clock);
        assert_eq!(quota.remaining_attempts(), 3);

        let prefs: Box<dyn PreferenceStore> = Box::new(store.clone());
        assert_eq!(prefs.get::<u32>("remainingAttempts"), Some(3));
        let stored = prefs.get::<DateTime<Local>>("lastResetDate").unwrap();
        assert_eq!(stored.date_naive(), clock.now().date_naive());
    }

    #[test]
    fn test_same_day_does_not_reset() {
        let store = MemoryPreferences::new();
        let clock = FixedClock::new(at(2024, 5, 10, 0, 5));
        let mut quota = manager(&store, &clock);
        quota.use_attempt();

        clock.set(at(2024, 5, 10, 23, 55));
        assert_eq!(quota.remaining_attempts(), 2);
    }

    #[test]
    fn test_time_until_reset_format() {
        let store = MemoryPreferences::new();
        let clock = FixedClock::new(at(2024, 5, 10, 21, 15));
        let mut quota = manager(&store, &clock);
        assert_eq!(quota.time_until_reset(), "02:45");

        clock.set(at(2024, 5, 10, 23, 59));
        assert_eq!(quota.time_until_reset(), "00:01");
    }

    #[test]
    fn test_format_clamps_past_deadline() {
        let reference = at(2024, 5, 8, 10, 0);
        let now = at(2024, 5, 10, 10, 0);
        assert_eq!(format_until_next_day(reference, now), "00:00");
    }

    #[test]
    fn test_skipped_midnight_starts_day_after_gap() {
        let midnight = NaiveDate::from_ymd_opt(2024, 9, 8)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        let start = first_valid_local(midnight, |t| {
            if t.hour() == 0 {
                LocalResult::None
            } else {
                LocalResult::Single(*t)
            }
        });
        assert_eq!(start, midnight.with_hour(1));
    }

    #[test]
    fn test_existing_midnight_is_kept() {
        let midnight = NaiveDate::from_ymd_opt(2024, 5, 11)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        let start = first_valid_local(midnight, |t| LocalResult::Single(*t));
        assert_eq!(start, Some(midnight));
    }
}
