//! Port traits.
//!
//! These traits define the interfaces between the step logic and the
//! processes it drives.

use crate::command::{ArgumentList, ResultsLocation};
use crate::config::InvocationConfig;
use crate::Result;
use async_trait::async_trait;

/// Runs a command to completion.
#[async_trait]
pub trait CommandLauncher: Send + Sync {
    /// Launch `args` and wait for it to exit.
    ///
    /// Returns the exit code. Fails with [`crate::Error::LaunchFailure`] only
    /// when the process could not be started.
    async fn launch(&self, args: &ArgumentList) -> Result<i32>;
}

/// Activates credentials for the test tool.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, config: &InvocationConfig) -> Result<()>;
}

/// Publishes the results location to later pipeline steps.
#[async_trait]
pub trait ResultsExporter: Send + Sync {
    async fn export(&self, location: &ResultsLocation) -> Result<()>;
}

