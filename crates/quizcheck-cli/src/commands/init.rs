//! The `quizcheck init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quizcheck.toml
    if std::path::Path::new("quizcheck.toml").exists() {
        println!("quizcheck.toml already exists, skipping.");
    } else {
        std::fs::write("quizcheck.toml", SAMPLE_CONFIG)?;
        println!("Created quizcheck.toml");
    }

    // Create example quiz
    std::fs::create_dir_all("quiz-sets")?;
    let example_path = std::path::Path::new("quiz-sets/example.toml");
    if example_path.exists() {
        println!("quiz-sets/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quiz-sets/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit quiz-sets/example.toml with your questions");
    println!("  2. Run: quizcheck validate --quiz quiz-sets/example.toml");
    println!("  3. Run: quizcheck grade --quiz quiz-sets/example.toml --submissions answers.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizcheck configuration

# Wall-clock budget per checker evaluation, in milliseconds.
timeout_ms = 1000

# Step budget per checker evaluation.
fuel = 200000

# Max concurrent checks while grading.
parallelism = 4

# Where grade reports land.
output_dir = "./quizcheck-results"
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
id = "example"
title = "Example Quiz"
description = "A simple example quiz to get started"

[[questions]]
id = "tower-distance"
text = "How far is the water tower? (accepts m/м/km/км)"
checker = "distance(submitted) == distance(expected)"
expected = "2km"
points = 2

[[questions]]
id = "bridge-bearing"
text = "What is the bearing to the bridge? (degrees or degrees-minutes)"
checker = "direction_angle(submitted) == direction_angle(expected)"
expected = "15-30"

[[questions]]
id = "twice-two"
text = "What is 2 + 2?"
checker = "to_int(submitted) == 4"

[[questions]]
id = "capital"
text = "What is the capital of France?"
expected = "Paris"
"#;
