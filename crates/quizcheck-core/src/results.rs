//! Verdicts and per-submission grading results.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CheckError;

/// The three-way outcome of checking one submission.
///
/// Produced exactly once per (snippet, submission) evaluation. A checker
/// failure is a verdict too — a submission is never left unscored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Incorrect,
    Error(CheckError),
}

impl Verdict {
    pub fn is_correct(&self) -> bool {
        matches!(self, Verdict::Correct)
    }

    pub fn error(&self) -> Option<&CheckError> {
        match self {
            Verdict::Error(e) => Some(e),
            _ => None,
        }
    }
}

/// The graded outcome of a single submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRecord {
    /// Who submitted.
    pub user: String,
    /// The question this answers.
    pub question_id: String,
    /// The verbatim answer text.
    pub submitted: String,
    /// The checker's decision.
    pub verdict: Verdict,
    /// Points awarded (question points if correct, otherwise 0).
    pub points_awarded: u32,
    /// Points the question was worth.
    pub points_possible: u32,
    /// Wall-clock time the check took.
    pub duration_ms: u64,
    /// Grading run this record belongs to.
    pub run_id: Uuid,
}
