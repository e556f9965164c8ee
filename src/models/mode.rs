/// Quiz length preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuizMode {
    /// 20 questions in 12 minutes by default.
    Quick,
    /// 65 questions in 40 minutes by default, the length of the real exam.
    Full,
}

impl QuizMode {
    pub fn title(self) -> &'static str {
        match self {
            QuizMode::Quick => "Quick Quiz",
            QuizMode::Full => "Full Quiz",
        }
    }

    pub fn default_question_count(self) -> usize {
        match self {
            QuizMode::Quick => 20,
            QuizMode::Full => 65,
        }
    }

    pub fn default_time_limit_secs(self) -> u32 {
        match self {
            QuizMode::Quick => 12 * 60,
            QuizMode::Full => 40 * 60,
        }
    }
}
