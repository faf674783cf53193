//! Aggregate statistics over grade records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CheckErrorKind;
use crate::results::{GradeRecord, Verdict};

/// Aggregate statistics across a grading run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Per-user statistics.
    pub per_user: HashMap<String, UserStats>,
    /// Per-question statistics.
    pub per_question: HashMap<String, QuestionStats>,
}

/// Final score for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub user: String,
    /// Submissions graded correct.
    pub correct: u32,
    /// Submissions graded in total.
    pub answered: u32,
    /// Points earned.
    pub points_earned: u32,
    /// Points available across the user's submissions.
    pub points_possible: u32,
    /// Correct share as a percentage of answered questions.
    pub percentage: f64,
}

/// How one question fared across all users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionStats {
    pub question_id: String,
    pub attempts: u32,
    pub correct: u32,
    /// Submissions that ended in a checker error rather than a grade.
    pub checker_errors: u32,
    /// Timeout verdicts, tracked separately: these point at the snippet,
    /// not the submission.
    pub timeouts: u32,
    pub correct_rate: f64,
}

/// Compute aggregate statistics from all records of a run.
pub fn compute_aggregate_stats(records: &[GradeRecord]) -> AggregateStats {
    let mut per_user: HashMap<String, UserStats> = HashMap::new();
    for r in records {
        let entry = per_user.entry(r.user.clone()).or_insert_with(|| UserStats {
            user: r.user.clone(),
            correct: 0,
            answered: 0,
            points_earned: 0,
            points_possible: 0,
            percentage: 0.0,
        });
        entry.answered += 1;
        entry.points_possible += r.points_possible;
        if r.verdict.is_correct() {
            entry.correct += 1;
            entry.points_earned += r.points_awarded;
        }
    }
    for stats in per_user.values_mut() {
        if stats.answered > 0 {
            stats.percentage = stats.correct as f64 / stats.answered as f64 * 100.0;
        }
    }

    let mut per_question: HashMap<String, QuestionStats> = HashMap::new();
    for r in records {
        let entry = per_question
            .entry(r.question_id.clone())
            .or_insert_with(|| QuestionStats {
                question_id: r.question_id.clone(),
                attempts: 0,
                correct: 0,
                checker_errors: 0,
                timeouts: 0,
                correct_rate: 0.0,
            });
        entry.attempts += 1;
        match &r.verdict {
            Verdict::Correct => entry.correct += 1,
            Verdict::Incorrect => {}
            Verdict::Error(e) => {
                entry.checker_errors += 1;
                if e.kind == CheckErrorKind::Timeout {
                    entry.timeouts += 1;
                }
            }
        }
    }
    for stats in per_question.values_mut() {
        if stats.attempts > 0 {
            stats.correct_rate = stats.correct as f64 / stats.attempts as f64;
        }
    }

    AggregateStats {
        per_user,
        per_question,
    }
}
