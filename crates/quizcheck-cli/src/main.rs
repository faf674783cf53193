//! quizcheck CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "quizcheck", version, about = "Free-text quiz answer checker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a batch of submissions against a quiz
    Grade {
        /// Path to the quiz .toml file
        #[arg(long)]
        quiz: PathBuf,

        /// Path to the submissions file (.json or .csv)
        #[arg(long)]
        submissions: PathBuf,

        /// Max concurrent checks
        #[arg(long, default_value = "4")]
        parallelism: usize,

        /// Output directory
        #[arg(long, default_value = "./quizcheck-results")]
        output: PathBuf,

        /// Output format: json, csv, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check a single answer against a checker snippet
    Check {
        /// Checker snippet source (or use --quiz/--question)
        #[arg(long)]
        checker: Option<String>,

        /// Quiz file to take the checker from
        #[arg(long, requires = "question")]
        quiz: Option<PathBuf>,

        /// Question id inside --quiz
        #[arg(long, requires = "quiz")]
        question: Option<String>,

        /// The submitted answer text
        #[arg(long)]
        answer: String,

        /// Expected value bound as `expected` (ignored with --quiz)
        #[arg(long)]
        expected: Option<String>,

        /// Exit with code 1 on incorrect, 2 on checker error
        #[arg(long)]
        fail_on_incorrect: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run a value parser over answer text
    Parse {
        /// Which parser: to-int, distance, direction-angle
        #[arg(long)]
        kind: String,

        /// The answer text to parse
        text: String,
    },

    /// Validate quiz TOML files
    Validate {
        /// Path to quiz file or directory
        #[arg(long)]
        quiz: PathBuf,
    },

    /// Create starter config and example quiz
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizcheck=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            quiz,
            submissions,
            parallelism,
            output,
            format,
            config,
        } => commands::grade::execute(quiz, submissions, parallelism, output, format, config).await,
        Commands::Check {
            checker,
            quiz,
            question,
            answer,
            expected,
            fail_on_incorrect,
            config,
        } => {
            commands::check::execute(
                checker,
                quiz,
                question,
                answer,
                expected,
                fail_on_incorrect,
                config,
            )
            .await
        }
        Commands::Parse { kind, text } => commands::parse::execute(kind, text),
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
