//! quizcheck-sandbox — Sandboxed evaluation of checker snippets.
//!
//! Compiles an author-supplied snippet, statically rejects anything outside
//! the allowed surface, then runs it on a blocking worker under both a step
//! budget and a wall-clock budget. Whatever happens inside, the caller gets
//! exactly one [`Verdict`].

pub mod eval;
pub mod sandbox;

use std::time::Duration;

use async_trait::async_trait;

use quizcheck_core::error::{CheckError, SnippetError};
use quizcheck_core::results::Verdict;
use quizcheck_core::snippet;
use quizcheck_core::traits::{AnswerChecker, CheckRequest};
use quizcheck_core::value::Value;

use crate::eval::Fault;
use crate::sandbox::Sandbox;

/// Default wall-clock budget per evaluation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Default step budget per evaluation. Far beyond any legitimate checker;
/// a snippet that burns through it is looping, not checking.
pub const DEFAULT_FUEL: u64 = 200_000;

/// Checker that evaluates snippets in an allow-list sandbox.
///
/// Holds no cross-request state: every evaluation builds a fresh
/// environment, so concurrent evaluations are fully independent.
pub struct SandboxChecker {
    timeout: Duration,
    fuel: u64,
}

impl SandboxChecker {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            fuel: DEFAULT_FUEL,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_fuel(mut self, fuel: u64) -> Self {
        self.fuel = fuel;
        self
    }

    /// Compile, validate, and run a request on the calling thread.
    ///
    /// The step budget still applies; only the wall-clock budget needs the
    /// async boundary. Exposed for benchmarks and synchronous callers.
    pub fn check_blocking(&self, request: &CheckRequest) -> Verdict {
        let program = match snippet::compile(&request.snippet) {
            Ok(program) => program,
            Err(e) => return Verdict::Error(e.into()),
        };

        // Reject out-of-surface names before execution begins.
        if let Err(e @ SnippetError::UnknownName { .. }) = snippet::validate_program(&program) {
            return Verdict::Error(e.into());
        }

        let mut sandbox = Sandbox::new(&request.submitted, request.expected.clone(), self.fuel);
        match eval::exec_program(&program, &mut sandbox) {
            Ok(Value::Bool(true)) => Verdict::Correct,
            Ok(Value::Bool(false)) => Verdict::Incorrect,
            Ok(other) => Verdict::Error(CheckError::internal(format!(
                "checker produced {}, expected a bool",
                other.type_name()
            ))),
            Err(fault) => Verdict::Error(fault_to_error(fault)),
        }
    }
}

impl Default for SandboxChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnswerChecker for SandboxChecker {
    async fn evaluate(&self, request: &CheckRequest) -> Verdict {
        let checker = SandboxChecker {
            timeout: self.timeout,
            fuel: self.fuel,
        };
        let request = request.clone();
        let work = tokio::task::spawn_blocking(move || checker.check_blocking(&request));

        match tokio::time::timeout(self.timeout, work).await {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(join_error)) => {
                tracing::error!("checker worker failed: {join_error}");
                Verdict::Error(CheckError::internal("checker worker failed"))
            }
            Err(_elapsed) => {
                // The worker keeps running until its step budget is spent,
                // so nothing outlives the call boundary for long.
                Verdict::Error(CheckError::timeout(format!(
                    "checker exceeded the {}ms time budget",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

fn fault_to_error(fault: Fault) -> CheckError {
    match fault {
        Fault::Parse(e) => e.into(),
        Fault::UnknownName(name) => {
            CheckError::capability(format!("name '{name}' is not available to checker code"))
        }
        Fault::Budget => CheckError::timeout("checker exceeded its step budget"),
        Fault::Type(msg) | Fault::Arithmetic(msg) => CheckError::internal(msg),
    }
}
