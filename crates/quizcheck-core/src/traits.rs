//! The checker trait the grading engine evaluates submissions through.
//!
//! Implemented by `quizcheck-sandbox`; kept here so the engine, reports, and
//! test doubles only depend on the contract, not on the evaluator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::results::Verdict;
use crate::value::Value;

/// One checker evaluation: an untrusted snippet, an untrusted submission,
/// and the question's expected-answer data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    /// Author-written checker source.
    pub snippet: String,
    /// The verbatim submitted answer, bound as `submitted`.
    pub submitted: String,
    /// Expected-answer data, bound as `expected` when present.
    #[serde(default)]
    pub expected: Option<Value>,
}

/// Evaluates checker snippets against submissions.
///
/// The contract is total: every call produces a verdict. Failures inside the
/// checker (parse errors, capability violations, timeouts, internal faults)
/// surface as [`Verdict::Error`], never as an `Err` the orchestrator has to
/// special-case. Implementations must be deterministic: identical requests
/// yield identical verdicts.
#[async_trait]
pub trait AnswerChecker: Send + Sync {
    async fn evaluate(&self, request: &CheckRequest) -> Verdict;
}
