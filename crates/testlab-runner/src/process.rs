//! Host process execution.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use testlab_core::ports::CommandLauncher;
use testlab_core::{ArgumentList, Error, Result};
use tokio::process::Command;
use tracing::debug;

/// Launches commands on the host with the parent's stdout and stderr.
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher {
    working_dir: Option<PathBuf>,
}

impl ProcessLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run commands from `dir` instead of the current directory.
    pub fn with_working_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: Some(dir.into()),
        }
    }
}

#[async_trait]
impl CommandLauncher for ProcessLauncher {
    async fn launch(&self, args: &ArgumentList) -> Result<i32> {
        let program = args.program().ok_or_else(|| Error::LaunchFailure {
            program: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        })?;
        let start = std::time::Instant::now();

        let mut command = Command::new(program);
        command
            .args(args.args())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| Error::LaunchFailure {
            program: program.to_string(),
            source,
        })?;
        let status = child.wait().await?;

        // Killed by a signal: no code to report.
        let exit_code = status.code().unwrap_or(-1);
        let elapsed = start.elapsed();

        debug!(program, exit_code, ?elapsed, "Command completed");

        Ok(exit_code)
    }
}
