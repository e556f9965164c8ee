//! Rewarded ad boundary.
//!
//! A provider reports each `show` through a oneshot channel, so a view
//! resolves at most once. A dropped sender reads as a failed view.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::oneshot;
use tracing::{debug, info};

/// How a rewarded view ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdResult {
    /// The user watched to the end and earned the reward.
    Rewarded,
    /// No unit was ready; a load has been started.
    NotLoaded,
    /// Closed before the reward was earned.
    Dismissed,
    Failed(String),
}

impl AdResult {
    pub fn is_rewarded(&self) -> bool {
        matches!(self, AdResult::Rewarded)
    }
}

pub trait AdProvider {
    fn is_loaded(&self) -> bool;
    /// Starts fetching a unit. Calling it while loaded or loading is a no-op.
    fn load(&mut self);
    /// Presents the loaded unit.
    fn show(&mut self) -> oneshot::Receiver<AdResult>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdConfig {
    pub load_delay_ms: u64,
    pub view_secs: u64,
}

impl Default for AdConfig {
    fn default() -> Self {
        Self {
            load_delay_ms: 500,
            view_secs: 5,
        }
    }
}

/// Stand-in for an ad network: units become ready after `load_delay_ms` and
/// pay out after `view_secs` of viewing. Needs a tokio runtime.
pub struct TimedAdProvider {
    config: AdConfig,
    loaded: Arc<AtomicBool>,
    loading: Arc<AtomicBool>,
}

impl TimedAdProvider {
    pub fn new(config: AdConfig) -> Self {
        Self {
            config,
            loaded: Arc::new(AtomicBool::new(false)),
            loading: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl AdProvider for TimedAdProvider {
    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    fn load(&mut self) {
        if self.is_loaded() || self.loading.swap(true, Ordering::SeqCst) {
            return;
        }

        let loaded = Arc::clone(&self.loaded);
        let loading = Arc::clone(&self.loading);
        let delay = Duration::from_millis(self.config.load_delay_ms);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            loaded.store(true, Ordering::SeqCst);
            loading.store(false, Ordering::SeqCst);
            debug!(target: "ads", "Rewarded unit loaded");
        });
    }

    fn show(&mut self) -> oneshot::Receiver<AdResult> {
        let (tx, rx) = oneshot::channel();

        if !self.loaded.swap(false, Ordering::SeqCst) {
            info!(target: "ads", "No rewarded unit ready; loading");
            self.load();
            let _ = tx.send(AdResult::NotLoaded);
            return rx;
        }

        let view = Duration::from_secs(self.config.view_secs);
        tokio::spawn(async move {
            tokio::time::sleep(view).await;
            let _ = tx.send(AdResult::Rewarded);
        });

        // Preload the next unit while this one plays.
        self.load();
        rx
    }
}

#[cfg(test)]
pub(crate) use scripted::ScriptedAdProvider;

#[cfg(test)]
mod scripted {
    use std::collections::VecDeque;

    use tokio::sync::oneshot;

    use super::{AdProvider, AdResult};

    /// Replays queued outcomes. With `hold` set, results are kept until
    /// `release` so a test can observe the pending state.
    #[derive(Default)]
    pub struct ScriptedAdProvider {
        outcomes: VecDeque<AdResult>,
        held: Vec<(oneshot::Sender<AdResult>, AdResult)>,
        pub hold: bool,
        pub loads: usize,
        pub shows: usize,
    }

    impl ScriptedAdProvider {
        pub fn new(outcomes: impl IntoIterator<Item = AdResult>) -> Self {
            Self {
                outcomes: outcomes.into_iter().collect(),
                ..Self::default()
            }
        }

        pub fn release(&mut self) {
            for (tx, outcome) in self.held.drain(..) {
                let _ = tx.send(outcome);
            }
        }
    }

    impl AdProvider for ScriptedAdProvider {
        fn is_loaded(&self) -> bool {
            matches!(self.outcomes.front(), Some(AdResult::Rewarded))
        }

        fn load(&mut self) {
            self.loads += 1;
        }

        fn show(&mut self) -> oneshot::Receiver<AdResult> {
            self.shows += 1;
            let (tx, rx) = oneshot::channel();
            let outcome = self
                .outcomes
                .pop_front()
                .unwrap_or(AdResult::NotLoaded);
            if self.hold {
                self.held.push((tx, outcome));
            } else {
                let _ = tx.send(outcome);
            }
            rx
        }
    }
}
