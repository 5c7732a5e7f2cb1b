//! Testlab CLI entrypoint.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod handlers;

use commands::Commands;
use handlers::RunArgs;
use testlab_runner::RetryPolicy;

#[derive(Parser)]
#[command(name = "testlab")]
#[command(author, version, about = "Run Android tests on Firebase Test Lab from CI", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            debug,
            dry_run,
            max_attempts,
            transient_exit_code,
            env_file,
        } => {
            init_tracing(cli.verbose || debug);
            let args = RunArgs {
                debug,
                dry_run,
                policy: RetryPolicy::new(max_attempts, transient_exit_code),
                env_file,
            };
            handlers::run(args).await
        }
        Commands::ObjectName => {
            handlers::object_name();
            Ok(ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            let label = match e.downcast_ref::<testlab_core::Error>() {
                Some(err) if err.is_configuration() => "Configuration error:",
                _ => "Error:",
            };
            eprintln!("{} {}", style(label).red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
