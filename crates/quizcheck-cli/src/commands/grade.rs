//! The `quizcheck grade` command.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use quizcheck_core::engine::{GradingEngine, GradingEngineConfig, ProgressReporter};
use quizcheck_core::model::Submission;
use quizcheck_core::results::{GradeRecord, Verdict};
use quizcheck_report::csv_export::write_csv_report;
use quizcheck_report::html::write_html_report;
use quizcheck_sandbox::SandboxChecker;

use crate::config::load_config_from;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_check_start(&self, user: &str, question_id: &str) {
        tracing::debug!("checking {user} :: {question_id}");
    }

    fn on_check_complete(&self, record: &GradeRecord) {
        let verdict = match &record.verdict {
            Verdict::Correct => "correct".to_string(),
            Verdict::Incorrect => "incorrect".to_string(),
            Verdict::Error(e) => format!("error ({})", e.kind),
        };
        eprintln!(
            "  {} :: {} -> {verdict} ({}ms)",
            record.user, record.question_id, record.duration_ms
        );
    }

    fn on_run_complete(&self, total: usize, correct: usize, errors: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {correct}/{total} correct, {errors} checker error(s) ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    quiz_path: PathBuf,
    submissions_path: PathBuf,
    parallelism: usize,
    output: PathBuf,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

    let config = load_config_from(config_path.as_deref())?;

    let quiz = quizcheck_core::quiz::parse_quiz(&quiz_path)?;
    let warnings = quizcheck_core::quiz::validate_quiz(&quiz);
    for w in &warnings {
        let id = w.question_id.as_deref().unwrap_or("-");
        eprintln!("Warning: [{id}] {}", w.message);
    }

    let submissions = load_submissions(&submissions_path)?;
    anyhow::ensure!(!submissions.is_empty(), "no submissions to grade");

    let checker = SandboxChecker::new()
        .with_timeout(Duration::from_millis(config.timeout_ms))
        .with_fuel(config.fuel);

    let engine = GradingEngine::new(Arc::new(checker), GradingEngineConfig { parallelism });

    eprintln!(
        "Grading {} submission(s) against '{}' ({} questions)\n",
        submissions.len(),
        quiz.title,
        quiz.questions.len()
    );

    let report = engine.grade(&quiz, &submissions, &ConsoleReporter).await?;

    print_summary(&report);

    // Save outputs
    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "csv", "html"]
    } else {
        format.split(',').collect()
    };

    for fmt in &formats {
        match fmt.trim() {
            "json" => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "csv" => {
                let path = output.join(format!("report-{timestamp}.csv"));
                write_csv_report(&report, &path)?;
                eprintln!("CSV report: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("report-{timestamp}.html"));
                write_html_report(&report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            other => {
                eprintln!("Unknown format: {other}");
            }
        }
    }

    Ok(())
}

/// Load submissions from JSON (an array of objects) or CSV
/// (`user,question_id,answer` with a header row), by extension.
fn load_submissions(path: &Path) -> Result<Vec<Submission>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();

    match extension.as_str() {
        "json" => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read submissions: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse submissions JSON: {}", path.display()))
        }
        "csv" => {
            let mut reader = csv::Reader::from_path(path)
                .with_context(|| format!("failed to read submissions: {}", path.display()))?;
            let mut submissions = Vec::new();
            for row in reader.deserialize() {
                let submission: Submission = row.with_context(|| {
                    format!("failed to parse submissions CSV: {}", path.display())
                })?;
                submissions.push(submission);
            }
            Ok(submissions)
        }
        other => anyhow::bail!("unsupported submissions format '.{other}' (use .json or .csv)"),
    }
}

fn print_summary(report: &quizcheck_core::report::GradingReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["User", "Correct", "Answered", "Points", "Score"]);

    let mut users: Vec<_> = report.aggregate.per_user.values().collect();
    users.sort_by(|a, b| a.user.cmp(&b.user));

    for stats in users {
        table.add_row(vec![
            Cell::new(&stats.user),
            Cell::new(stats.correct),
            Cell::new(stats.answered),
            Cell::new(format!(
                "{}/{}",
                stats.points_earned, stats.points_possible
            )),
            Cell::new(format!("{:.1}%", stats.percentage)),
        ]);
    }

    eprintln!("\n{table}");
}
