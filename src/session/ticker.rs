//! One-second countdown ticks for the active session.
//!
//! At most one task runs at a time. Each task stamps its ticks with a
//! generation number so ticks already queued by a canceled task can be
//! recognized and dropped.
//!
//! Running time that has not yet produced an accepted tick is carried over a
//! pause, so toggling the clock faster than the period still counts down.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

pub struct Ticker {
    tx: mpsc::UnboundedSender<u64>,
    handle: Option<JoinHandle<()>>,
    generation: u64,
    interval: Duration,
    /// Instant the next tick's period is measured from, while running.
    anchor: Option<Instant>,
    /// Running time not yet turned into a tick when the clock last stopped.
    carry: Duration,
}

impl Ticker {
    pub fn new(tx: mpsc::UnboundedSender<u64>) -> Self {
        Self::with_interval(tx, TICK_INTERVAL)
    }

    pub fn with_interval(tx: mpsc::UnboundedSender<u64>, interval: Duration) -> Self {
        Self {
            tx,
            handle: None,
            generation: 0,
            interval,
            anchor: None,
            carry: Duration::ZERO,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// True if a received tick came from the running task.
    pub fn is_current(&self, generation: u64) -> bool {
        self.is_active() && generation == self.generation
    }

    /// Accepts a received tick if it came from the running task. Rejected
    /// ticks leave their time in the carry.
    pub fn accept(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        if let Some(anchor) = self.anchor.as_mut() {
            *anchor += self.interval;
        }
        true
    }

    /// Starts or cancels the task to match whether the clock should run.
    pub fn sync(&mut self, running: bool) {
        match (running, self.is_active()) {
            (true, false) => self.start(),
            (false, true) => self.cancel(),
            _ => {}
        }
    }

    fn start(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        let tx = self.tx.clone();
        let period = self.interval;

        let now = Instant::now();
        let anchor = now.checked_sub(self.carry).unwrap_or(now);
        self.anchor = Some(anchor);
        self.carry = Duration::ZERO;

        self.handle = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(anchor + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                interval.tick().await;
                if tx.send(generation).is_err() {
                    break;
                }
            }
        }));
        debug!(target: "ticker", generation, "Ticker started");
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!(target: "ticker", generation = self.generation, "Ticker canceled");
        }
        if let Some(anchor) = self.anchor.take() {
            self.carry = Instant::now().saturating_duration_since(anchor);
        }
    }

    /// Cancels and forgets any carried time, for a fresh countdown.
    pub fn reset(&mut self) {
        self.cancel();
        self.carry = Duration::ZERO;
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ticks_while_running() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::with_interval(tx, Duration::from_millis(10));
        ticker.sync(true);

        let generation = rx.recv().await.unwrap();
        assert!(ticker.accept(generation));
    }

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::with_interval(tx, Duration::from_millis(10));
        ticker.sync(true);
        ticker.sync(true);
        assert!(ticker.is_current(1));

        ticker.sync(false);
        ticker.sync(false);
        assert!(!ticker.is_active());
    }

    #[tokio::test]
    async fn test_stale_ticks_are_rejected_after_restart() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::with_interval(tx, Duration::from_millis(10));
        ticker.sync(true);
        let first = rx.recv().await.unwrap();

        ticker.sync(false);
        assert!(!ticker.is_current(first));

        ticker.sync(true);
        assert!(!ticker.is_current(first));
        let mut next = rx.recv().await.unwrap();
        while next == first {
            next = rx.recv().await.unwrap();
        }
        assert!(ticker.is_current(next));
    }

    #[tokio::test]
    async fn test_no_ticks_after_cancel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::with_interval(tx, Duration::from_millis(5));
        ticker.sync(true);
        rx.recv().await.unwrap();
        ticker.cancel();

        // Let an aborted task finish unwinding, then drain what it queued.
        tokio::time::sleep(Duration::from_millis(20)).await;
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_rapid_pause_resume_keeps_counting() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::with_interval(tx, Duration::from_millis(50));
        let mut accepted = 0u128;
        let mut running = Duration::ZERO;

        // Every run is shorter than the period.
        for _ in 0..20 {
            let started = Instant::now();
            ticker.sync(true);
            tokio::time::sleep(Duration::from_millis(40)).await;
            while let Ok(generation) = rx.try_recv() {
                if ticker.accept(generation) {
                    accepted += 1;
                }
            }
            ticker.sync(false);
            running += started.elapsed();
        }

        // At least 800 ms of running time at 50 ms per tick.
        assert!(accepted >= 10, "accepted only {} ticks", accepted);
        assert!(
            accepted <= running.as_millis() / 50 + 1,
            "accepted {} ticks in {:?}",
            accepted,
            running
        );
    }

    #[tokio::test]
    async fn test_reset_drops_carried_time() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::with_interval(tx, Duration::from_millis(200));
        ticker.sync(true);
        tokio::time::sleep(Duration::from_millis(150)).await;
        ticker.sync(false);
        assert!(ticker.carry >= Duration::from_millis(100));

        ticker.reset();
        assert_eq!(ticker.carry, Duration::ZERO);
        ticker.sync(true);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());
    }
}
