//! The `quizcheck parse` command.
//!
//! Runs one value parser over answer text so quiz authors can see the
//! canonical value their checkers will compare against.

use anyhow::Result;

use quizcheck_core::answer;

pub fn execute(kind: String, text: String) -> Result<()> {
    let result = match kind.as_str() {
        "to-int" | "to_int" => answer::to_int(&text),
        "distance" => answer::distance(&text),
        "direction-angle" | "direction_angle" => answer::direction_angle(&text),
        other => {
            anyhow::bail!(
                "unknown parser '{other}' (expected to-int, distance, or direction-angle)"
            );
        }
    };

    match result {
        Ok(value) => {
            println!("{value}");
            Ok(())
        }
        Err(e) => {
            anyhow::bail!("{e}");
        }
    }
}
