//! The Test Lab build step.

use crate::export::EnvmanExporter;
use crate::gcloud::GcloudAuthenticator;
use crate::retry::{RetryPolicy, RetryingInvoker};
use std::sync::Arc;
use testlab_core::ports::{Authenticator, CommandLauncher, ResultsExporter};
use testlab_core::{
    BuiltCommand, CommandBuilder, InvocationConfig, Result, ResultsLocation, ResultsObjectName,
};
use tracing::{debug, info, warn};

/// What a step run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Exit code of the last test attempt.
    pub exit_code: i32,
    pub attempts: u32,
    /// Location chosen by the step, when results were not fully user-directed.
    pub results_location: Option<ResultsLocation>,
}

impl StepOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Builds the gcloud command and runs it with authentication, export and retries.
pub struct TestLabStep {
    builder: CommandBuilder,
    authenticator: Arc<dyn Authenticator>,
    exporter: Arc<dyn ResultsExporter>,
    invoker: RetryingInvoker,
}

impl TestLabStep {
    /// Wire the gcloud authenticator, envman exporter and retrying invoker
    /// onto one launcher.
    pub fn new(launcher: Arc<dyn CommandLauncher>, policy: RetryPolicy) -> Self {
        Self {
            builder: CommandBuilder::default(),
            authenticator: Arc::new(GcloudAuthenticator::new(launcher.clone())),
            exporter: Arc::new(EnvmanExporter::new(launcher.clone())),
            invoker: RetryingInvoker::new(launcher, policy),
        }
    }

    pub fn from_parts(
        builder: CommandBuilder,
        authenticator: Arc<dyn Authenticator>,
        exporter: Arc<dyn ResultsExporter>,
        invoker: RetryingInvoker,
    ) -> Self {
        Self {
            builder,
            authenticator,
            exporter,
            invoker,
        }
    }

    /// Build the command without running anything.
    pub fn plan(
        &self,
        config: &InvocationConfig,
        object_name: &ResultsObjectName,
    ) -> Result<BuiltCommand> {
        self.builder.build(config, object_name)
    }

    /// Run the step once.
    ///
    /// Option parsing happens before any process is started, so malformed
    /// options never trigger authentication. A failed export is logged and
    /// does not stop the test run.
    pub async fn run(
        &self,
        config: &InvocationConfig,
        object_name: &ResultsObjectName,
    ) -> Result<StepOutcome> {
        let built = self.plan(config, object_name)?;

        if config.skip_auth {
            debug!("Skipping gcloud authentication");
        } else {
            self.authenticator.authenticate(config).await?;
        }

        if let Some(location) = &built.export {
            if let Err(e) = self.exporter.export(location).await {
                warn!(error = %e, "Failed to export results location");
            }
        } else {
            info!("Results bucket and directory set by user, not exporting");
        }

        let outcome = self.invoker.run_with_retry(&built.args).await?;

        Ok(StepOutcome {
            exit_code: outcome.exit_code,
            attempts: outcome.attempts,
            results_location: built.export,
        })
    }
}
