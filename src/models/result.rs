use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum percentage that counts as a pass.
pub const PASS_THRESHOLD: f64 = 70.0;

/// Outcome of one completed quiz session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: Uuid,
    pub date: DateTime<Local>,
    pub score: u32,
    pub total_questions: u32,
    /// Seconds spent on the quiz.
    pub time_spent: u32,
    /// Seconds allotted to the quiz.
    pub time_limit: u32,
}

impl QuizResult {
    pub fn new(score: u32, total_questions: u32, time_spent: u32, time_limit: u32) -> Self {
        Self::completed_at(Local::now(), score, total_questions, time_spent, time_limit)
    }

    pub fn completed_at(
        date: DateTime<Local>,
        score: u32,
        total_questions: u32,
        time_spent: u32,
        time_limit: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            score,
            total_questions,
            time_spent,
            time_limit,
        }
    }

    /// `score / total * 100`, or 0 for an empty quiz.
    pub fn percentage(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        f64::from(self.score) / f64::from(self.total_questions) * 100.0
    }

    pub fn passed(&self) -> bool {
        self.percentage() >= PASS_THRESHOLD
    }
}
