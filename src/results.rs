//! Quiz result history.

use tracing::{debug, warn};

use crate::models::QuizResult;
use crate::storage::PreferenceStore;

const RESULTS_KEY: &str = "quizResults";

pub trait ResultStorage {
    /// Appends a result. Failures are logged, never returned.
    fn save_result(&mut self, result: &QuizResult);
    /// Every saved result in insertion order; empty if storage is unusable.
    fn fetch_results(&self) -> Vec<QuizResult>;
}

pub struct ResultStore {
    store: Box<dyn PreferenceStore>,
}

impl ResultStore {
    pub fn new(store: Box<dyn PreferenceStore>) -> Self {
        Self { store }
    }
}

impl ResultStorage for ResultStore {
    fn save_result(&mut self, result: &QuizResult) {
        let mut results = self.fetch_results();
        results.push(result.clone());
        match self.store.set(RESULTS_KEY, &results) {
            Ok(()) => debug!(target: "results", id = %result.id, count = results.len(), "Result saved"),
            Err(e) => warn!(target: "results", id = %result.id, error = %e, "Failed to save result"),
        }
    }

    fn fetch_results(&self) -> Vec<QuizResult> {
        self.store.get(RESULTS_KEY).unwrap_or_default()
    }
}

/// Results sorted for display, most recent first.
pub fn newest_first(mut results: Vec<QuizResult>) -> Vec<QuizResult> {
    results.sort_by(|a, b| b.date.cmp(&a.date));
    results
}

/// Aggregate figures over the whole history.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HistorySummary {
    pub count: usize,
    pub average_percentage: f64,
    /// Share of passed attempts, 0..=100.
    pub pass_rate: f64,
    pub average_time_spent: f64,
}

impl HistorySummary {
    pub fn from_results(results: &[QuizResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }

        let count = results.len() as f64;
        let total_percentage: f64 = results.iter().map(QuizResult::percentage).sum();
        let passed = results.iter().filter(|r| r.passed()).count() as f64;
        let total_time: f64 = results.iter().map(|r| f64::from(r.time_spent)).sum();

        Self {
            count: results.len(),
            average_percentage: total_percentage / count,
            pass_rate: passed / count * 100.0,
            average_time_spent: total_time / count,
        }
    }
}
