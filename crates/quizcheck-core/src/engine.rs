//! Grading engine.
//!
//! Coordinates checking a batch of submissions against one quiz with bounded
//! parallelism. Every evaluation is independent and stateless, so
//! submissions run fully in parallel up to the configured limit; one faulty
//! snippet or malformed answer never affects another submission.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::error::CheckError;
use crate::model::{Question, Quiz, Submission};
use crate::report::{GradingReport, QuizSummary};
use crate::results::{GradeRecord, Verdict};
use crate::statistics::compute_aggregate_stats;
use crate::traits::{AnswerChecker, CheckRequest};
use crate::value::Value;

/// Configuration for the grading engine.
#[derive(Debug, Clone)]
pub struct GradingEngineConfig {
    /// Maximum concurrent checks.
    pub parallelism: usize,
}

impl Default for GradingEngineConfig {
    fn default() -> Self {
        Self { parallelism: 4 }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_check_start(&self, user: &str, question_id: &str);
    fn on_check_complete(&self, record: &GradeRecord);
    fn on_run_complete(&self, total: usize, correct: usize, errors: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_check_start(&self, _: &str, _: &str) {}
    fn on_check_complete(&self, _: &GradeRecord) {}
    fn on_run_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// The grading engine.
pub struct GradingEngine {
    checker: Arc<dyn AnswerChecker>,
    config: GradingEngineConfig,
}

impl GradingEngine {
    pub fn new(checker: Arc<dyn AnswerChecker>, config: GradingEngineConfig) -> Self {
        Self { checker, config }
    }

    /// Grade all submissions against the quiz.
    pub async fn grade(
        &self,
        quiz: &Quiz,
        submissions: &[Submission],
        progress: &dyn ProgressReporter,
    ) -> Result<GradingReport> {
        let start = Instant::now();
        let run_id = Uuid::new_v4();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));

        let questions: HashMap<&str, &Question> =
            quiz.questions.iter().map(|q| (q.id.as_str(), q)).collect();

        let mut futures = FuturesUnordered::new();

        for submission in submissions {
            progress.on_check_start(&submission.user, &submission.question_id);
            let checker = Arc::clone(&self.checker);
            let semaphore = Arc::clone(&semaphore);
            let question = questions.get(submission.question_id.as_str()).copied().cloned();
            let submission = submission.clone();

            futures.push(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| anyhow::anyhow!("semaphore closed"))?;

                let check_start = Instant::now();
                let (verdict, points_possible) = match &question {
                    Some(q) => (check_submission(checker.as_ref(), q, &submission).await, q.points),
                    None => {
                        tracing::warn!(
                            "submission from '{}' references unknown question '{}'",
                            submission.user,
                            submission.question_id
                        );
                        (
                            Verdict::Error(CheckError::internal(format!(
                                "unknown question: {}",
                                submission.question_id
                            ))),
                            0,
                        )
                    }
                };

                let points_awarded = if verdict.is_correct() { points_possible } else { 0 };

                if let Verdict::Error(e) = &verdict {
                    tracing::warn!(
                        "checker error for {}/{}: {e}",
                        submission.user,
                        submission.question_id
                    );
                }

                Ok::<GradeRecord, anyhow::Error>(GradeRecord {
                    user: submission.user,
                    question_id: submission.question_id,
                    submitted: submission.answer,
                    verdict,
                    points_awarded,
                    points_possible,
                    duration_ms: check_start.elapsed().as_millis() as u64,
                    run_id,
                })
            });
        }

        let total = futures.len();
        let mut records = Vec::with_capacity(total);

        while let Some(result) = futures.next().await {
            let record = result?;
            progress.on_check_complete(&record);
            records.push(record);
        }

        let elapsed = start.elapsed();
        let correct = records.iter().filter(|r| r.verdict.is_correct()).count();
        let errors = records.iter().filter(|r| r.verdict.error().is_some()).count();
        progress.on_run_complete(total, correct, errors, elapsed);

        let aggregate = compute_aggregate_stats(&records);

        Ok(GradingReport {
            id: run_id,
            created_at: chrono::Utc::now(),
            quiz: QuizSummary {
                id: quiz.id.clone(),
                title: quiz.title.clone(),
                question_count: quiz.questions.len(),
            },
            records,
            aggregate,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}

/// Decide the verdict for one submission.
///
/// Questions with a checker snippet go through the sandbox; without one the
/// expected value is compared as trimmed text.
async fn check_submission(
    checker: &dyn AnswerChecker,
    question: &Question,
    submission: &Submission,
) -> Verdict {
    match (&question.checker, &question.expected) {
        (Some(snippet), expected) => {
            checker
                .evaluate(&CheckRequest {
                    snippet: snippet.clone(),
                    submitted: submission.answer.clone(),
                    expected: expected.clone(),
                })
                .await
        }
        (None, Some(expected)) => {
            if exact_match(&submission.answer, expected) {
                Verdict::Correct
            } else {
                Verdict::Incorrect
            }
        }
        (None, None) => Verdict::Error(CheckError::internal(format!(
            "question '{}' has no checker and no expected value",
            question.id
        ))),
    }
}

fn exact_match(submitted: &str, expected: &Value) -> bool {
    match expected {
        Value::Str(s) => submitted.trim() == s.trim(),
        other => submitted.trim() == other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Grades `submitted == expected-as-text` without any snippet machinery.
    struct TextEqualChecker;

    #[async_trait]
    impl AnswerChecker for TextEqualChecker {
        async fn evaluate(&self, request: &CheckRequest) -> Verdict {
            match &request.expected {
                Some(v) => {
                    if request.submitted.trim() == v.to_string() {
                        Verdict::Correct
                    } else {
                        Verdict::Incorrect
                    }
                }
                None => Verdict::Error(CheckError::internal("no expected value")),
            }
        }
    }

    fn demo_quiz() -> Quiz {
        Quiz {
            id: "demo".into(),
            title: "Demo".into(),
            description: String::new(),
            questions: vec![
                Question {
                    id: "q1".into(),
                    text: "?".into(),
                    checker: Some("unused by the test checker".into()),
                    expected: Some(Value::Int(2000)),
                    points: 2,
                },
                Question {
                    id: "q2".into(),
                    text: "?".into(),
                    checker: None,
                    expected: Some(Value::Str("Paris".into())),
                    points: 1,
                },
            ],
        }
    }

    fn submission(user: &str, question: &str, answer: &str) -> Submission {
        Submission {
            user: user.into(),
            question_id: question.into(),
            answer: answer.into(),
        }
    }

    #[tokio::test]
    async fn grades_mixed_questions() {
        let engine = GradingEngine::new(
            Arc::new(TextEqualChecker),
            GradingEngineConfig::default(),
        );
        let quiz = demo_quiz();
        let submissions = vec![
            submission("alice", "q1", " 2000 "),
            submission("alice", "q2", "Paris"),
            submission("bob", "q1", "1500"),
            submission("bob", "q2", "  Paris  "),
        ];

        let report = engine
            .grade(&quiz, &submissions, &NoopReporter)
            .await
            .unwrap();

        assert_eq!(report.records.len(), 4);
        assert_eq!(report.correct_count(), 3);
        let alice = &report.aggregate.per_user["alice"];
        assert_eq!(alice.points_earned, 3);
        let bob = &report.aggregate.per_user["bob"];
        assert_eq!(bob.points_earned, 1);
    }

    #[tokio::test]
    async fn unknown_question_yields_error_record() {
        let engine = GradingEngine::new(
            Arc::new(TextEqualChecker),
            GradingEngineConfig::default(),
        );
        let quiz = demo_quiz();
        let submissions = vec![submission("alice", "nope", "42")];

        let report = engine
            .grade(&quiz, &submissions, &NoopReporter)
            .await
            .unwrap();

        assert_eq!(report.records.len(), 1);
        let err = report.records[0].verdict.error().unwrap();
        assert!(err.message.contains("unknown question"));
        assert_eq!(report.records[0].points_possible, 0);
    }

    #[tokio::test]
    async fn ungradable_question_yields_error_record() {
        let mut quiz = demo_quiz();
        quiz.questions.push(Question {
            id: "q3".into(),
            text: "?".into(),
            checker: None,
            expected: None,
            points: 1,
        });
        let engine = GradingEngine::new(
            Arc::new(TextEqualChecker),
            GradingEngineConfig::default(),
        );

        let report = engine
            .grade(&quiz, &[submission("alice", "q3", "anything")], &NoopReporter)
            .await
            .unwrap();

        assert!(report.records[0].verdict.error().is_some());
    }

    #[tokio::test]
    async fn every_submission_gets_exactly_one_record() {
        let engine = GradingEngine::new(
            Arc::new(TextEqualChecker),
            GradingEngineConfig { parallelism: 2 },
        );
        let quiz = demo_quiz();
        let submissions: Vec<Submission> = (0..25)
            .map(|i| submission(&format!("user{i}"), "q1", "2000"))
            .collect();

        let report = engine
            .grade(&quiz, &submissions, &NoopReporter)
            .await
            .unwrap();

        assert_eq!(report.records.len(), 25);
        assert_eq!(report.correct_count(), 25);
        assert_eq!(report.aggregate.per_user.len(), 25);
    }

    #[test]
    fn exact_match_trims_both_sides() {
        assert!(exact_match("  Paris ", &Value::Str(" Paris".into())));
        assert!(exact_match(" 4 ", &Value::Int(4)));
        assert!(!exact_match("paris", &Value::Str("Paris".into())));
    }
}
