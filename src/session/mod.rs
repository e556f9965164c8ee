//! The quiz session state machine.
//!
//! A session walks a fixed question sequence:
//!
//! ```text
//! NotStarted -> AnsweredWaiting -> InProgress -> AnsweredWaiting -> ... -> Completed
//! ```
//!
//! `NotStarted` only means the clock has not started yet; the first question
//! is already answerable. Pausing stops the clock without changing the phase.
//! Running out of time completes the session from any phase.

pub mod ticker;

use chrono::Local;
use tracing::{debug, info};

use crate::models::{QuizMode, QuizQuestion, QuizResult};
use crate::quota::{QuotaExhausted, QuotaProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Clock not started.
    NotStarted,
    /// Answering the current question.
    InProgress,
    /// Answer submitted; waiting for the user to continue.
    AnsweredWaiting,
    Completed,
}

/// Shown after a submit.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub explanation: Option<String>,
    pub correct_answers: Vec<String>,
}

/// Final state of a completed session.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizOutcome {
    pub result: QuizResult,
    pub passed: bool,
    /// Completed by the clock rather than by answering every question.
    pub timed_out: bool,
}

pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    mode: QuizMode,
    pool_size: usize,
    time_limit: u32,
    time_remaining: u32,
    index: usize,
    /// Insertion order; the first entry is evicted on overflow.
    selections: Vec<String>,
    correct_count: usize,
    phase: SessionPhase,
    paused: bool,
    feedback: Option<AnswerFeedback>,
    outcome: Option<QuizOutcome>,
}

impl QuizSession {
    pub fn new(
        questions: Vec<QuizQuestion>,
        mode: QuizMode,
        time_limit: u32,
        pool_size: usize,
    ) -> Self {
        info!(target: "session", mode = ?mode, questions = questions.len(), pool_size, time_limit, "Session created");
        Self {
            questions,
            mode,
            pool_size,
            time_limit,
            time_remaining: time_limit,
            index: 0,
            selections: Vec::new(),
            correct_count: 0,
            phase: SessionPhase::NotStarted,
            paused: false,
            feedback: None,
            outcome: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.phase == SessionPhase::Completed {
            return None;
        }
        self.questions.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based position for display.
    pub fn question_number(&self) -> usize {
        (self.index + 1).min(self.questions.len())
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn selections(&self) -> &[String] {
        &self.selections
    }

    pub fn is_selected(&self, option: &str) -> bool {
        self.selections.iter().any(|s| s == option)
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn time_limit(&self) -> u32 {
        self.time_limit
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_completed(&self) -> bool {
        self.phase == SessionPhase::Completed
    }

    pub fn is_clock_running(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::InProgress | SessionPhase::AnsweredWaiting
        ) && !self.paused
    }

    pub fn last_feedback(&self) -> Option<&AnswerFeedback> {
        match self.phase {
            SessionPhase::AnsweredWaiting => self.feedback.as_ref(),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<&QuizOutcome> {
        self.outcome.as_ref()
    }

    fn accepts_selection(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::NotStarted | SessionPhase::InProgress
        )
    }

    /// Selects or deselects `option`. When the selection is already full the
    /// oldest pick is dropped, so the user is never blocked.
    pub fn toggle_option(&mut self, option: &str) {
        if !self.accepts_selection() {
            return;
        }
        let Some(question) = self.questions.get(self.index) else {
            return;
        };
        if !question.has_option(option) {
            return;
        }

        if let Some(pos) = self.selections.iter().position(|s| s == option) {
            self.selections.remove(pos);
            return;
        }

        let required = question.required_answer_count();
        if required == 0 {
            return;
        }
        if self.selections.len() >= required {
            self.selections.remove(0);
        }
        self.selections.push(option.to_string());
    }

    pub fn can_submit(&self) -> bool {
        self.accepts_selection()
            && self
                .questions
                .get(self.index)
                .is_some_and(|q| self.selections.len() == q.required_answer_count())
    }

    /// Scores the current selection. Returns `None` when submitting is not
    /// allowed yet.
    pub fn submit(&mut self) -> Option<AnswerFeedback> {
        if !self.can_submit() {
            return None;
        }
        let question = self.questions.get(self.index)?;

        let correct = question.is_answered_by(&self.selections);
        let feedback = AnswerFeedback {
            correct,
            explanation: question.explanation.clone(),
            correct_answers: question.correct_answers.clone(),
        };

        if correct {
            self.correct_count += 1;
        }
        if self.phase == SessionPhase::NotStarted {
            debug!(target: "session", "Clock started on first submit");
        }
        self.phase = SessionPhase::AnsweredWaiting;
        self.feedback = Some(feedback.clone());

        debug!(target: "session", index = self.index, correct, "Answer submitted");
        Some(feedback)
    }

    /// Moves past an answered question. Returns the result when this
    /// completes the session.
    pub fn advance(&mut self) -> Option<QuizResult> {
        if self.phase != SessionPhase::AnsweredWaiting {
            return None;
        }

        self.selections.clear();
        self.feedback = None;

        if self.index + 1 < self.questions.len() {
            self.index += 1;
            self.phase = SessionPhase::InProgress;
            None
        } else {
            Some(self.complete(false))
        }
    }

    /// One second of wall-clock time. Returns the result when the clock
    /// runs out.
    pub fn tick(&mut self) -> Option<QuizResult> {
        if !self.is_clock_running() {
            return None;
        }

        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            info!(target: "session", index = self.index, "Time is up");
            return Some(self.complete(true));
        }
        None
    }

    /// Starts the clock from `NotStarted`, otherwise pauses or resumes it.
    pub fn toggle_timer(&mut self) {
        match self.phase {
            SessionPhase::NotStarted => {
                if self.questions.is_empty() {
                    return;
                }
                self.phase = SessionPhase::InProgress;
                self.paused = false;
            }
            SessionPhase::InProgress | SessionPhase::AnsweredWaiting => {
                self.paused = !self.paused;
                debug!(target: "session", paused = self.paused, "Timer toggled");
            }
            SessionPhase::Completed => {}
        }
    }

    /// Starts the same questions over, spending one attempt. Leaves the
    /// session untouched when no attempt is left.
    pub fn restart(&mut self, quota: &mut dyn QuotaProvider) -> Result<(), QuotaExhausted> {
        if !quota.can_start_quiz() {
            info!(target: "session", "Restart refused; quota exhausted");
            return Err(QuotaExhausted);
        }
        quota.use_attempt();

        self.index = 0;
        self.selections.clear();
        self.correct_count = 0;
        self.time_remaining = self.time_limit;
        self.phase = SessionPhase::NotStarted;
        self.paused = false;
        self.feedback = None;
        self.outcome = None;

        info!(target: "session", mode = ?self.mode, "Session restarted");
        Ok(())
    }

    fn complete(&mut self, timed_out: bool) -> QuizResult {
        self.phase = SessionPhase::Completed;
        self.paused = false;
        self.selections.clear();
        self.feedback = None;

        let time_spent = self.time_limit.saturating_sub(self.time_remaining);
        let result = QuizResult::completed_at(
            Local::now(),
            u32::try_from(self.correct_count).unwrap_or(u32::MAX),
            u32::try_from(self.questions.len()).unwrap_or(u32::MAX),
            time_spent,
            self.time_limit,
        );
        let passed = result.passed();

        info!(
            target: "session",
            score = result.score,
            total = result.total_questions,
            percentage = result.percentage(),
            passed,
            timed_out,
            time_spent,
            "Session completed"
        );

        self.outcome = Some(QuizOutcome {
            result: result.clone(),
            passed,
            timed_out,
        });
        result
    }
}

/// `MM:SS` for a countdown display.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::clock::FixedClock;
    use crate::models::sample_question;
    use crate::quota::{QuotaConfig, QuotaManager};
    use crate::storage::MemoryPreferences;

    fn session(questions: Vec<QuizQuestion>, time_limit: u32) -> QuizSession {
        let pool = questions.len();
        QuizSession::new(questions, QuizMode::Quick, time_limit, pool)
    }

    fn single_answer_questions(n: usize) -> Vec<QuizQuestion> {
        (0..n)
            .map(|i| sample_question(&format!("q{}", i), &["A", "B", "C", "D"], &["A"]))
            .collect()
    }

    fn quota() -> QuotaManager {
        let clock = FixedClock::new(Local.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).single().unwrap());
        QuotaManager::new(
            QuotaConfig::default(),
            Box::new(MemoryPreferences::new()),
            Box::new(clock),
        )
    }

    fn answer(session: &mut QuizSession, options: &[&str]) -> Option<AnswerFeedback> {
        for option in options {
            session.toggle_option(option);
        }
        session.submit()
    }

    #[test]
    fn test_selection_never_exceeds_required_count() {
        let q = sample_question("q", &["A", "B", "C", "D", "E"], &["A", "C"]);
        let mut s = session(vec![q], 60);

        s.toggle_option("A");
        s.toggle_option("B");
        s.toggle_option("D");
        assert_eq!(s.selections(), &["B".to_string(), "D".to_string()]);

        s.toggle_option("E");
        s.toggle_option("A");
        assert_eq!(s.selections().len(), 2);
        assert_eq!(s.selections(), &["E".to_string(), "A".to_string()]);
    }

    #[test]
    fn test_toggle_deselects_and_ignores_unknown_options() {
        let mut s = session(single_answer_questions(1), 60);
        s.toggle_option("A");
        s.toggle_option("A");
        assert!(s.selections().is_empty());

        s.toggle_option("Z");
        assert!(s.selections().is_empty());
    }

    #[test]
    fn test_submit_requires_full_selection() {
        let q = sample_question("q", &["A", "B", "C"], &["A", "C"]);
        let mut s = session(vec![q], 60);

        s.toggle_option("A");
        assert!(!s.can_submit());
        assert_eq!(s.submit(), None);
        assert_eq!(s.phase(), SessionPhase::NotStarted);

        s.toggle_option("C");
        let feedback = s.submit().unwrap();
        assert!(feedback.correct);
        assert_eq!(s.phase(), SessionPhase::AnsweredWaiting);
        assert_eq!(s.correct_count(), 1);
    }

    #[test]
    fn test_multi_answer_is_exact_match() {
        let questions = vec![
            sample_question("q1", &["A", "B", "C"], &["A", "C"]),
            sample_question("q2", &["A", "B", "C"], &["A", "C"]),
        ];
        let mut s = session(questions, 60);

        assert!(answer(&mut s, &["A", "C"]).unwrap().correct);
        s.advance();
        assert!(!answer(&mut s, &["A", "B"]).unwrap().correct);
        assert_eq!(s.correct_count(), 1);
    }

    #[test]
    fn test_selection_locked_after_submit() {
        let mut s = session(single_answer_questions(2), 60);
        answer(&mut s, &["B"]);
        s.toggle_option("A");
        assert_eq!(s.selections(), &["B".to_string()]);
        assert_eq!(s.submit(), None);
    }

    #[test]
    fn test_first_submit_starts_clock() {
        let mut s = session(single_answer_questions(2), 60);
        assert!(!s.is_clock_running());
        assert_eq!(s.tick(), None);
        assert_eq!(s.time_remaining(), 60);

        answer(&mut s, &["A"]);
        assert!(s.is_clock_running());
        s.tick();
        assert_eq!(s.time_remaining(), 59);
    }

    #[test]
    fn test_advance_clears_selection_and_moves_on() {
        let mut s = session(single_answer_questions(2), 60);
        assert_eq!(s.advance(), None);

        answer(&mut s, &["A"]);
        assert!(s.last_feedback().is_some());
        assert_eq!(s.advance(), None);
        assert_eq!(s.index(), 1);
        assert_eq!(s.phase(), SessionPhase::InProgress);
        assert!(s.selections().is_empty());
        assert!(s.last_feedback().is_none());
    }

    #[test]
    fn test_last_advance_emits_one_result() {
        let mut s = session(single_answer_questions(3), 600);
        answer(&mut s, &["A"]);
        s.advance();
        s.tick();
        s.tick();
        answer(&mut s, &["B"]);
        s.advance();
        answer(&mut s, &["A"]);

        let result = s.advance().unwrap();
        assert_eq!(result.total_questions, 3);
        assert_eq!(result.score, 2);
        assert_eq!(result.time_spent, 2);
        assert_eq!(result.time_limit, 600);
        assert!(s.is_completed());
        assert!(s.current_question().is_none());
        assert!(!s.is_clock_running());

        assert_eq!(s.advance(), None);
        assert_eq!(s.tick(), None);
        let outcome = s.outcome().unwrap();
        assert_eq!(outcome.result.id, result.id);
        assert!(!outcome.timed_out);
        assert!(!outcome.passed);
    }

    #[test]
    fn test_seventy_percent_passes() {
        let mut s = session(single_answer_questions(20), 720);
        for i in 0..20 {
            let pick = if i < 14 { "A" } else { "B" };
            answer(&mut s, &[pick]);
            if let Some(result) = s.advance() {
                assert_eq!(result.percentage(), 70.0);
                assert!(result.passed());
            }
        }
        assert!(s.outcome().unwrap().passed);
    }

    #[test]
    fn test_timeout_mid_question_counts_only_submitted() {
        let mut s = session(single_answer_questions(3), 3);
        answer(&mut s, &["A"]);
        s.advance();
        s.toggle_option("A");

        s.tick();
        s.tick();
        let result = s.tick().unwrap();
        assert!(s.is_completed());
        assert_eq!(result.score, 1);
        assert_eq!(result.total_questions, 3);
        assert_eq!(result.time_spent, 3);
        assert!(s.outcome().unwrap().timed_out);
    }

    #[test]
    fn test_timeout_in_answered_waiting() {
        let mut s = session(single_answer_questions(2), 1);
        answer(&mut s, &["A"]);
        assert_eq!(s.phase(), SessionPhase::AnsweredWaiting);

        let result = s.tick().unwrap();
        assert_eq!(result.score, 1);
        assert_eq!(result.time_spent, 1);
        assert_eq!(s.tick(), None);
    }

    #[test]
    fn test_pause_stops_clock() {
        let mut s = session(single_answer_questions(2), 60);
        s.toggle_timer();
        assert_eq!(s.phase(), SessionPhase::InProgress);
        s.tick();

        s.toggle_timer();
        assert!(s.is_paused());
        s.tick();
        s.tick();
        assert_eq!(s.time_remaining(), 59);

        s.toggle_timer();
        s.toggle_timer();
        s.toggle_timer();
        assert!(!s.is_paused());
        s.tick();
        assert_eq!(s.time_remaining(), 58);
        assert_eq!(s.index(), 0);
    }

    #[test]
    fn test_restart_spends_attempt_and_resets() {
        let mut quota = quota();
        let mut s = session(single_answer_questions(2), 60);
        answer(&mut s, &["A"]);
        s.tick();
        s.advance();

        s.restart(&mut quota).unwrap();
        assert_eq!(quota.remaining_attempts(), 2);
        assert_eq!(s.index(), 0);
        assert_eq!(s.correct_count(), 0);
        assert_eq!(s.time_remaining(), 60);
        assert_eq!(s.phase(), SessionPhase::NotStarted);
        assert!(s.outcome().is_none());
    }

    #[test]
    fn test_restart_without_quota_keeps_state() {
        let mut quota = quota();
        for _ in 0..3 {
            quota.use_attempt();
        }
        let mut s = session(single_answer_questions(2), 60);
        answer(&mut s, &["A"]);
        s.tick();
        s.advance();

        assert_eq!(s.restart(&mut quota), Err(QuotaExhausted));
        assert_eq!(s.index(), 1);
        assert_eq!(s.correct_count(), 1);
        assert_eq!(s.time_remaining(), 59);
        assert_eq!(quota.remaining_attempts(), 0);
    }

    #[test]
    fn test_empty_session() {
        let mut s = session(Vec::new(), 60);
        assert!(s.current_question().is_none());
        assert!(!s.can_submit());
        s.toggle_timer();
        assert!(!s.is_clock_running());
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(2400), "40:00");
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(0), "00:00");
    }
}
