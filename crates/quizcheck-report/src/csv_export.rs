//! CSV export of grade records.
//!
//! The file is written to a temporary sibling and renamed into place, so a
//! crash mid-write never leaves a truncated results file behind.

use std::path::Path;

use anyhow::{Context, Result};

use quizcheck_core::report::GradingReport;
use quizcheck_core::results::Verdict;

const HEADERS: [&str; 9] = [
    "user",
    "question_id",
    "submitted",
    "verdict",
    "error_kind",
    "error_message",
    "points_awarded",
    "points_possible",
    "duration_ms",
];

/// Render a report's records as CSV.
pub fn records_to_csv(report: &GradingReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;

    for r in &report.records {
        let (verdict, error_kind, error_message) = match &r.verdict {
            Verdict::Correct => ("correct", String::new(), String::new()),
            Verdict::Incorrect => ("incorrect", String::new(), String::new()),
            Verdict::Error(e) => ("error", e.kind.to_string(), e.message.clone()),
        };
        let points_awarded = r.points_awarded.to_string();
        let points_possible = r.points_possible.to_string();
        let duration_ms = r.duration_ms.to_string();
        writer.write_record([
            r.user.as_str(),
            r.question_id.as_str(),
            r.submitted.as_str(),
            verdict,
            error_kind.as_str(),
            error_message.as_str(),
            points_awarded.as_str(),
            points_possible.as_str(),
            duration_ms.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().context("failed to flush CSV writer")?;
    Ok(String::from_utf8(bytes).context("CSV output was not UTF-8")?)
}

/// Write the CSV report atomically.
pub fn write_csv_report(report: &GradingReport, path: &Path) -> Result<()> {
    let content = records_to_csv(report)?;

    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        std::fs::create_dir_all(parent)?;
    }

    // Temp file in the same directory so the rename stays on one filesystem.
    let dir = parent.unwrap_or_else(|| Path::new("."));
    let tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    std::fs::write(tmp.path(), content).context("failed to write CSV data")?;
    tmp.persist(path)
        .with_context(|| format!("failed to move CSV report into {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quizcheck_core::error::CheckError;
    use quizcheck_core::report::QuizSummary;
    use quizcheck_core::results::GradeRecord;
    use quizcheck_core::statistics::compute_aggregate_stats;
    use uuid::Uuid;

    fn make_report() -> GradingReport {
        let records = vec![
            GradeRecord {
                user: "alice".into(),
                question_id: "q1".into(),
                submitted: "2км.".into(),
                verdict: Verdict::Correct,
                points_awarded: 2,
                points_possible: 2,
                duration_ms: 1,
                run_id: Uuid::nil(),
            },
            GradeRecord {
                user: "bob".into(),
                question_id: "q1".into(),
                submitted: "10xyz".into(),
                verdict: Verdict::Error(CheckError::from(
                    quizcheck_core::error::ParseError::new("Неверный формат расстояния: '10xyz'"),
                )),
                points_awarded: 0,
                points_possible: 2,
                duration_ms: 1,
                run_id: Uuid::nil(),
            },
        ];
        let aggregate = compute_aggregate_stats(&records);
        GradingReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            quiz: QuizSummary {
                id: "nav".into(),
                title: "Nav".into(),
                question_count: 1,
            },
            records,
            aggregate,
            duration_ms: 5,
        }
    }

    #[test]
    fn csv_contains_headers_and_rows() {
        let csv = records_to_csv(&make_report()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "user,question_id,submitted,verdict,error_kind,error_message,points_awarded,points_possible,duration_ms"
        );
        assert!(csv.contains("alice,q1,2км.,correct,,,2,2,1"));
        assert!(csv.contains("parse_error"));
        assert!(csv.contains("Неверный формат"));
    }

    #[test]
    fn write_is_atomic_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        std::fs::write(&path, "stale data").unwrap();
        write_csv_report(&make_report(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("user,"));
        assert!(!content.contains("stale"));

        // No temp files left behind.
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("results.csv")]);
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/results.csv");
        write_csv_report(&make_report(), &path).unwrap();
        assert!(path.exists());
    }
}
