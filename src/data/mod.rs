mod loader;

use clap::ValueEnum;

pub use loader::{bank_path, load_questions, try_load_questions, LoadError, QuestionBank};

/// AWS certification tracks with a bundled question bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ExamTrack {
    CloudPractitioner,
    SolutionsArchitectAssociate,
    DeveloperAssociate,
    SysopsAssociate,
}

impl ExamTrack {
    pub const ALL: [ExamTrack; 4] = [
        ExamTrack::CloudPractitioner,
        ExamTrack::SolutionsArchitectAssociate,
        ExamTrack::DeveloperAssociate,
        ExamTrack::SysopsAssociate,
    ];

    /// Resource name of the track's bank, without extension.
    pub fn bank_id(self) -> &'static str {
        match self {
            ExamTrack::CloudPractitioner => "cloud-practitioner-questions",
            ExamTrack::SolutionsArchitectAssociate => "solutions-architect-associate-questions",
            ExamTrack::DeveloperAssociate => "developer-associate-questions",
            ExamTrack::SysopsAssociate => "sysops-associate-questions",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ExamTrack::CloudPractitioner => "AWS Cloud Practitioner",
            ExamTrack::SolutionsArchitectAssociate => "AWS Solutions Architect Associate",
            ExamTrack::DeveloperAssociate => "AWS Developer Associate",
            ExamTrack::SysopsAssociate => "AWS SysOps Administrator Associate",
        }
    }

    /// The following track, wrapping around.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl Default for ExamTrack {
    fn default() -> Self {
        Self::CloudPractitioner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_cycle_wraps() {
        let mut track = ExamTrack::CloudPractitioner;
        for _ in 0..ExamTrack::ALL.len() {
            track = track.next();
        }
        assert_eq!(track, ExamTrack::CloudPractitioner);
        assert_eq!(ExamTrack::SysopsAssociate.next(), ExamTrack::CloudPractitioner);
    }
}
