use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A single multiple-choice question from an exam bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub question_text: String,
    /// Display order, stable for a given load.
    pub options: Vec<String>,
    pub correct_answers: Vec<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    pub category: String,
}

impl QuizQuestion {
    /// Number of options the user must pick before submitting.
    pub fn required_answer_count(&self) -> usize {
        self.correct_answer_set().len()
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    pub fn is_correct_answer(&self, option: &str) -> bool {
        self.correct_answers.iter().any(|a| a == option)
    }

    /// Exact set equality; no partial credit.
    pub fn is_answered_by<S: AsRef<str>>(&self, selections: &[S]) -> bool {
        let selected: HashSet<&str> = selections.iter().map(|s| s.as_ref()).collect();
        selected == self.correct_answer_set()
    }

    /// A question is answerable when it has at least one correct answer and
    /// every correct answer is one of its options.
    pub fn is_answerable(&self) -> bool {
        !self.correct_answers.is_empty()
            && self.correct_answers.iter().all(|a| self.has_option(a))
    }

    fn correct_answer_set(&self) -> HashSet<&str> {
        self.correct_answers.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
pub(crate) fn sample_question(id: &str, options: &[&str], correct: &[&str]) -> QuizQuestion {
    QuizQuestion {
        id: id.to_string(),
        question_text: format!("Question {}", id),
        options: options.iter().map(|s| s.to_string()).collect(),
        correct_answers: correct.iter().map(|s| s.to_string()).collect(),
        explanation: Some(format!("Explanation for {}", id)),
        category: "General".to_string(),
    }
}
