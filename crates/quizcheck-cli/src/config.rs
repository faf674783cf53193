//! CLI configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level quizcheck configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizcheckConfig {
    /// Wall-clock budget per checker evaluation, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Step budget per checker evaluation.
    #[serde(default = "default_fuel")]
    pub fuel: u64,
    /// Max concurrent checks.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_timeout_ms() -> u64 {
    1000
}
fn default_fuel() -> u64 {
    200_000
}
fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizcheck-results")
}

impl Default for QuizcheckConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            fuel: default_fuel(),
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `quizcheck.toml` in the current directory
/// 2. `~/.config/quizcheck/config.toml`
///
/// Environment variable overrides: `QUIZCHECK_TIMEOUT_MS`, `QUIZCHECK_FUEL`,
/// `QUIZCHECK_OUTPUT_DIR`.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizcheckConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizcheck.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizcheckConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizcheckConfig::default(),
    };

    if let Ok(ms) = std::env::var("QUIZCHECK_TIMEOUT_MS") {
        config.timeout_ms = ms
            .parse()
            .with_context(|| format!("invalid QUIZCHECK_TIMEOUT_MS: {ms}"))?;
    }
    if let Ok(fuel) = std::env::var("QUIZCHECK_FUEL") {
        config.fuel = fuel
            .parse()
            .with_context(|| format!("invalid QUIZCHECK_FUEL: {fuel}"))?;
    }
    if let Ok(dir) = std::env::var("QUIZCHECK_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizcheck"))
}
