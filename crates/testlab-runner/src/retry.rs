//! Bounded retry on infrastructure failures.
//!
//! gcloud exits with a reserved code when a test could not run because of a
//! Test Lab infrastructure problem. Only that code is retried, immediately
//! and without backoff. gcloud already retries internally, so the bound is
//! small.

use std::sync::Arc;
use testlab_core::ports::CommandLauncher;
use testlab_core::{ArgumentList, Result};
use tracing::{error, info, warn};

/// When to resubmit a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. At least 1.
    pub max_attempts: u32,
    /// Exit code that marks an infrastructure failure.
    pub transient_exit_code: i32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            transient_exit_code: 20,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, transient_exit_code: i32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            transient_exit_code,
        }
    }

    pub fn is_transient(&self, exit_code: i32) -> bool {
        exit_code == self.transient_exit_code
    }

    /// Whether attempt number `attempt` (1-based) should be followed by another.
    pub fn should_retry(&self, exit_code: i32, attempt: u32) -> bool {
        self.is_transient(exit_code) && attempt < self.max_attempts
    }
}

/// Result of running a command under a [`RetryPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Exit code of the last attempt.
    pub exit_code: i32,
    pub attempts: u32,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs a command, resubmitting it on infrastructure failures.
pub struct RetryingInvoker {
    launcher: Arc<dyn CommandLauncher>,
    policy: RetryPolicy,
}

impl RetryingInvoker {
    pub fn new(launcher: Arc<dyn CommandLauncher>, policy: RetryPolicy) -> Self {
        Self { launcher, policy }
    }

    /// Run `args` until it exits with anything but the transient code, or
    /// attempts run out.
    ///
    /// Launch failures are returned immediately and never retried.
    pub async fn run_with_retry(&self, args: &ArgumentList) -> Result<RunOutcome> {
        let policy = self.policy;
        info!(command = %args.printable(), "Running test command");

        let mut attempt = 1;
        loop {
            let exit_code = self.launcher.launch(args).await?;

            if policy.should_retry(exit_code, attempt) {
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    exit_code,
                    "Infrastructure failure, retrying"
                );
                attempt += 1;
                continue;
            }

            if policy.is_transient(exit_code) {
                error!(attempts = attempt, exit_code, "Infrastructure failure on final attempt");
            } else {
                info!(attempts = attempt, exit_code, "Test command finished");
            }

            return Ok(RunOutcome {
                exit_code,
                attempts: attempt,
            });
        }
    }
}
