//! Command handlers.

use console::style;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use testlab_core::{ConfigResolver, ProcessEnv, ResultsObjectName};
use testlab_runner::{ProcessLauncher, RetryPolicy, TestLabStep};
use tracing::info;

/// Options for the `run` command.
pub struct RunArgs {
    pub debug: bool,
    pub dry_run: bool,
    pub policy: RetryPolicy,
    pub env_file: Option<PathBuf>,
}

/// Run the step and turn its outcome into the process exit code.
pub async fn run(args: RunArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if let Some(path) = &args.env_file {
        dotenvy::from_path(path)?;
        info!(path = %path.display(), "Loaded step inputs from env file");
    }

    let config = ConfigResolver::default()
        .skip_auth(args.debug)
        .resolve(&ProcessEnv)?;

    let step = TestLabStep::new(Arc::new(ProcessLauncher::new()), args.policy);
    let object_name = ResultsObjectName::new();

    if args.dry_run {
        let built = step.plan(&config, &object_name)?;
        println!("{}", built.args);
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = step.run(&config, &object_name).await?;

    if outcome.success() {
        println!(
            "{} Tests finished after {} attempt(s)",
            style("✓").green(),
            outcome.attempts
        );
    } else {
        println!(
            "{} gcloud exited with code {} after {} attempt(s)",
            style("✗").red(),
            outcome.exit_code,
            outcome.attempts
        );
    }
    if let Some(location) = &outcome.results_location {
        println!("  Results: {}", style(location).bold());
    }

    Ok(ExitCode::from(exit_status(outcome.exit_code)))
}

/// Print a fresh results object name.
pub fn object_name() {
    println!("{}", ResultsObjectName::new());
}

/// Map a child exit code onto our own, keeping it non-zero on failure.
pub fn exit_status(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}
