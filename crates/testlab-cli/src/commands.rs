//! CLI command definitions.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the app on Firebase Test Lab using step inputs from the environment
    Run {
        /// Skip gcloud authentication and log the computed and user arguments
        #[arg(long)]
        debug: bool,

        /// Print the gcloud command instead of running it
        #[arg(long)]
        dry_run: bool,

        /// Total attempts when Test Lab reports an infrastructure failure
        #[arg(long, default_value_t = 3)]
        max_attempts: u32,

        /// gcloud exit code that marks an infrastructure failure
        #[arg(long, default_value_t = 20)]
        transient_exit_code: i32,

        /// Load step inputs from a dotenv file before reading the environment
        #[arg(long)]
        env_file: Option<PathBuf>,
    },

    /// Print a fresh results object name
    ObjectName,
}
