//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use std::path::Path;

use quizcheck_core::report::GradingReport;
use quizcheck_core::results::Verdict;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report from a grading report.
pub fn generate_html(report: &GradingReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>quizcheck report — {}</title>\n",
        html_escape(&report.quiz.title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>quizcheck report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Quiz: <strong>{}</strong> | {} questions | {} submissions | {}</p>\n",
        html_escape(&report.quiz.title),
        report.quiz.question_count,
        report.records.len(),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary dashboard
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Scores</h2>\n");

    html.push_str("<table class=\"summary\">\n");
    html.push_str(
        "<thead><tr><th>User</th><th>Correct</th><th>Answered</th><th>Points</th><th>Score</th></tr></thead>\n",
    );
    html.push_str("<tbody>\n");
    let mut users: Vec<_> = report.aggregate.per_user.values().collect();
    users.sort_by(|a, b| a.user.cmp(&b.user));
    for stats in users {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}/{}</td><td>{:.1}%</td></tr>\n",
            html_escape(&stats.user),
            stats.correct,
            stats.answered,
            stats.points_earned,
            stats.points_possible,
            stats.percentage,
        ));
    }
    html.push_str("</tbody></table>\n");

    // SVG bar chart for per-question correct rate
    if !report.aggregate.per_question.is_empty() {
        html.push_str("<h2>Questions</h2>\n");
        html.push_str(&generate_bar_chart(report));
    }

    html.push_str("</section>\n");

    // Per-submission results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Submissions</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">User</th><th onclick=\"sortTable(1)\">Question</th><th onclick=\"sortTable(2)\">Answer</th><th onclick=\"sortTable(3)\">Verdict</th><th onclick=\"sortTable(4)\">Points</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for r in &report.records {
        let (row_class, verdict_text) = match &r.verdict {
            Verdict::Correct => ("pass", "correct".to_string()),
            Verdict::Incorrect => ("fail", "incorrect".to_string()),
            Verdict::Error(e) => ("error", format!("error ({})", e.kind)),
        };

        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}/{}</td></tr>\n",
            row_class,
            html_escape(&r.user),
            html_escape(&r.question_id),
            html_escape(&r.submitted),
            html_escape(&verdict_text),
            r.points_awarded,
            r.points_possible,
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &GradingReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn generate_bar_chart(report: &GradingReport) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 200;

    let mut questions: Vec<(&String, f64)> = report
        .aggregate
        .per_question
        .iter()
        .map(|(id, s)| (id, s.correct_rate))
        .collect();
    questions.sort_by(|a, b| a.0.cmp(b.0));

    let total_height = questions.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (question_id, rate)) in questions.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (*rate * max_width as f64) as usize;

        let color = if *rate >= 0.8 {
            "#22c55e"
        } else if *rate >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(question_id)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.0}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            rate * 100.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --error: #fef3c7; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --error: #78350f; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.error { background: var(--error); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb) : vb.localeCompare(va);
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quizcheck_core::error::CheckError;
    use quizcheck_core::report::QuizSummary;
    use quizcheck_core::results::GradeRecord;
    use quizcheck_core::statistics::compute_aggregate_stats;
    use uuid::Uuid;

    fn make_test_report() -> GradingReport {
        let records = vec![
            GradeRecord {
                user: "alice".into(),
                question_id: "tower-distance".into(),
                submitted: "2km".into(),
                verdict: Verdict::Correct,
                points_awarded: 2,
                points_possible: 2,
                duration_ms: 1,
                run_id: Uuid::nil(),
            },
            GradeRecord {
                user: "bob".into(),
                question_id: "tower-distance".into(),
                submitted: "<script>alert(1)</script>".into(),
                verdict: Verdict::Error(CheckError::internal("checker produced text")),
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
                id: "nav-basics".into(),
                title: "Navigation Basics".into(),
                question_count: 1,
            },
            records,
            aggregate,
            duration_ms: 10,
        }
    }

    #[test]
    fn html_report_contains_required_elements() {
        let report = make_test_report();
        let html = generate_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("alice"));
        assert!(html.contains("tower-distance"));
        assert!(html.contains("Navigation Basics"));
        assert!(html.contains("error (internal)"));
    }

    #[test]
    fn submitted_answers_are_escaped() {
        let report = make_test_report();
        let html = generate_html(&report);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn html_report_write_to_file() {
        let report = make_test_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");

        write_html_report(&report, &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
