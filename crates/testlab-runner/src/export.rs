//! Export of the results location to later pipeline steps.

use async_trait::async_trait;
use std::sync::Arc;
use testlab_core::ports::{CommandLauncher, ResultsExporter};
use testlab_core::{ArgumentList, Error, ResultsLocation, Result};
use tracing::info;

/// Output variable holding the `gs://` results location.
pub const GCS_RESULTS_DIR: &str = "GCS_RESULTS_DIR";

/// Stores the results location with `bitrise envman add`.
pub struct EnvmanExporter {
    launcher: Arc<dyn CommandLauncher>,
    program: Vec<String>,
    key: String,
}

impl EnvmanExporter {
    pub fn new(launcher: Arc<dyn CommandLauncher>) -> Self {
        Self {
            launcher,
            program: ["bitrise", "envman", "add"].iter().map(|s| s.to_string()).collect(),
            key: GCS_RESULTS_DIR.to_string(),
        }
    }

    /// Export under `key` instead of [`GCS_RESULTS_DIR`].
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn command(&self, location: &ResultsLocation) -> ArgumentList {
        self.program
            .iter()
            .cloned()
            .chain([
                "--key".to_string(),
                self.key.clone(),
                "--value".to_string(),
                location.to_string(),
            ])
            .collect()
    }
}

#[async_trait]
impl ResultsExporter for EnvmanExporter {
    async fn export(&self, location: &ResultsLocation) -> Result<()> {
        info!(key = %self.key, location = %location, "Exporting results location");

        let export_error = |message: String| Error::Export {
            location: location.to_string(),
            message,
        };
        let exit_code = self
            .launcher
            .launch(&self.command(location))
            .await
            .map_err(|e| export_error(e.to_string()))?;
        if exit_code != 0 {
            return Err(export_error(format!("envman exited with code {}", exit_code)));
        }
        Ok(())
    }
}
