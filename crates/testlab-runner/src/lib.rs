//! Execution engine for the Test Lab step.

pub mod export;
pub mod gcloud;
pub mod process;
pub mod retry;
pub mod step;

pub use export::{EnvmanExporter, GCS_RESULTS_DIR};
pub use gcloud::GcloudAuthenticator;
pub use process::ProcessLauncher;
pub use retry::{RetryPolicy, RetryingInvoker, RunOutcome};
pub use step::{StepOutcome, TestLabStep};
