mod mode;
mod question;
mod result;

pub use mode::QuizMode;
pub use question::QuizQuestion;
pub use result::{QuizResult, PASS_THRESHOLD};

#[cfg(test)]
pub(crate) use question::sample_question;

/// Screen the terminal UI is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Landing,
    Quiz,
    Result,
    History,
    /// Out of attempts; offering a rewarded ad.
    AdOffer,
}

impl Default for AppState {
    fn default() -> Self {
        Self::Landing
    }
}
