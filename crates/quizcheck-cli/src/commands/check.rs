//! The `quizcheck check` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use quizcheck_core::results::Verdict;
use quizcheck_core::traits::{AnswerChecker, CheckRequest};
use quizcheck_core::value::Value;
use quizcheck_sandbox::SandboxChecker;

use crate::config::load_config_from;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    checker_source: Option<String>,
    quiz_path: Option<PathBuf>,
    question_id: Option<String>,
    answer: String,
    expected: Option<String>,
    fail_on_incorrect: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let (snippet, expected) = match (checker_source, quiz_path) {
        (Some(source), None) => (source, expected.map(parse_expected)),
        (None, Some(path)) => {
            let quiz = quizcheck_core::quiz::parse_quiz(&path)?;
            let id = question_id.context("--question is required with --quiz")?;
            let question = quiz
                .question(&id)
                .with_context(|| format!("question '{id}' not found in {}", path.display()))?;
            let snippet = question
                .checker
                .clone()
                .with_context(|| format!("question '{id}' has no checker snippet"))?;
            (snippet, question.expected.clone())
        }
        (Some(_), Some(_)) => anyhow::bail!("pass either --checker or --quiz, not both"),
        (None, None) => anyhow::bail!("pass --checker <snippet> or --quiz <file> --question <id>"),
    };

    let checker = SandboxChecker::new()
        .with_timeout(Duration::from_millis(config.timeout_ms))
        .with_fuel(config.fuel);

    let verdict = checker
        .evaluate(&CheckRequest {
            snippet,
            submitted: answer,
            expected,
        })
        .await;

    match &verdict {
        Verdict::Correct => println!("correct"),
        Verdict::Incorrect => println!("incorrect"),
        Verdict::Error(e) => println!("checker error ({}): {}", e.kind, e.message),
    }

    if fail_on_incorrect {
        match verdict {
            Verdict::Correct => {}
            Verdict::Incorrect => std::process::exit(1),
            Verdict::Error(_) => std::process::exit(2),
        }
    }

    Ok(())
}

/// Expected values given on the command line: integers and booleans become
/// native values, everything else stays text.
fn parse_expected(raw: String) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Int(n);
    }
    match raw.as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::Str(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_values_parse_to_native_types() {
        assert_eq!(parse_expected("2000".into()), Value::Int(2000));
        assert_eq!(parse_expected("true".into()), Value::Bool(true));
        assert_eq!(parse_expected("2km".into()), Value::Str("2km".into()));
        assert_eq!(parse_expected("-5".into()), Value::Int(-5));
    }
}
