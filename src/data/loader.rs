use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{info, warn};

use crate::models::QuizQuestion;

use super::ExamTrack;

/// Why a question bank could not be read.
#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            LoadError::Parse { path, source } => {
                write!(f, "failed to parse {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Parse { source, .. } => Some(source),
        }
    }
}

pub fn bank_path(bank_dir: &Path, bank_id: &str) -> PathBuf {
    bank_dir.join(format!("{}.json", bank_id))
}

/// Reads `<bank_dir>/<bank_id>.json`, keeping file order.
///
/// Records that can never be answered are dropped with a warning.
pub fn try_load_questions<P: AsRef<Path>>(
    bank_dir: P,
    bank_id: &str,
) -> Result<Vec<QuizQuestion>, LoadError> {
    let path = bank_path(bank_dir.as_ref(), bank_id);

    let json_content = fs::read_to_string(&path).map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;

    let questions: Vec<QuizQuestion> =
        serde_json::from_str(&json_content).map_err(|source| LoadError::Parse {
            path: path.clone(),
            source,
        })?;

    let total = questions.len();
    let questions: Vec<QuizQuestion> = questions
        .into_iter()
        .filter(|q| {
            let ok = q.is_answerable();
            if !ok {
                warn!(target: "bank", %bank_id, question_id = %q.id, "Skipping unanswerable question");
            }
            ok
        })
        .collect();

    info!(target: "bank", %bank_id, loaded = questions.len(), skipped = total - questions.len(), "Question bank loaded");
    Ok(questions)
}

/// Non-fatal form of [`try_load_questions`]: a missing or corrupt bank
/// yields an empty list.
pub fn load_questions<P: AsRef<Path>>(bank_dir: P, bank_id: &str) -> Vec<QuizQuestion> {
    try_load_questions(bank_dir, bank_id).unwrap_or_else(|err| {
        warn!(target: "bank", %bank_id, error = %err, "Question bank unavailable; using empty bank");
        Vec::new()
    })
}

/// Every question of one exam track, in source order.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    track: ExamTrack,
    questions: Vec<QuizQuestion>,
}

impl QuestionBank {
    pub fn new(track: ExamTrack, questions: Vec<QuizQuestion>) -> Self {
        Self { track, questions }
    }

    pub fn load<P: AsRef<Path>>(bank_dir: P, track: ExamTrack) -> Self {
        Self::new(track, load_questions(bank_dir, track.bank_id()))
    }

    pub fn track(&self) -> ExamTrack {
        self.track
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Uniform sample of `count` questions without replacement. A bank
    /// smaller than `count` is returned whole, shuffled.
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<QuizQuestion> {
        let mut questions = self.questions.clone();
        questions.shuffle(rng);
        questions.truncate(count);
        questions
    }
}
