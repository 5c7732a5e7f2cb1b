//! Service account activation through the gcloud CLI.

use async_trait::async_trait;
use std::sync::Arc;
use testlab_core::ports::{Authenticator, CommandLauncher};
use testlab_core::{ArgumentList, Error, InvocationConfig, Result};
use tracing::info;

/// Sets the active project and activates the step's service account.
pub struct GcloudAuthenticator {
    launcher: Arc<dyn CommandLauncher>,
    program: String,
}

impl GcloudAuthenticator {
    pub fn new(launcher: Arc<dyn CommandLauncher>) -> Self {
        Self {
            launcher,
            program: "gcloud".to_string(),
        }
    }

    /// Commands run by [`Authenticator::authenticate`], in order.
    pub fn commands(&self, config: &InvocationConfig) -> Vec<ArgumentList> {
        let key_path = config.key_path.to_string_lossy();
        vec![
            [self.program.as_str(), "config", "set", "project", config.project.as_str()]
                .into_iter()
                .collect(),
            [
                self.program.as_str(),
                "auth",
                "activate-service-account",
                "--key-file",
                &*key_path,
                config.user.as_str(),
            ]
            .into_iter()
            .collect(),
        ]
    }
}

#[async_trait]
impl Authenticator for GcloudAuthenticator {
    async fn authenticate(&self, config: &InvocationConfig) -> Result<()> {
        info!(project = %config.project, user = %config.user, "Activating gcloud service account");

        for command in self.commands(config) {
            let exit_code = self.launcher.launch(&command).await?;
            if exit_code != 0 {
                return Err(Error::Authentication {
                    command: command.printable(),
                    exit_code,
                });
            }
        }
        Ok(())
    }
}
