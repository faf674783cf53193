//! Core data model for quizzes and submissions.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A free-text question with author-supplied checking logic.
///
/// A question is gradable when it carries a checker snippet, an expected
/// value, or both: with a snippet the sandbox decides, without one the
/// engine falls back to trimmed exact comparison against `expected`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the quiz.
    pub id: String,
    /// The question text shown to the quiz taker.
    pub text: String,
    /// Checker snippet source; treated as untrusted.
    #[serde(default)]
    pub checker: Option<String>,
    /// Expected-answer data, exposed to the snippet as `expected`.
    #[serde(default)]
    pub expected: Option<Value>,
    /// Points awarded for a correct answer.
    #[serde(default = "default_points")]
    pub points: u32,
}

fn default_points() -> u32 {
    1
}

/// A collection of questions graded together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    /// Unique identifier for this quiz.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Description of the quiz.
    #[serde(default)]
    pub description: String,
    /// The questions in this quiz.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Look up a question by id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Total points available across all questions.
    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }
}

/// One submitted answer, as delivered by the grading orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// Who submitted.
    pub user: String,
    /// Which question this answers.
    pub question_id: String,
    /// The verbatim answer text.
    pub answer: String,
}
