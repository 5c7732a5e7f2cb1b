//! Assembly of the `gcloud firebase test android run` invocation.
//!
//! Computed flags come first, in a fixed order, followed by the user's own
//! tokens verbatim. The test type is always emitted. Every other computed flag
//! is left out whenever the user set the same [`FlagKey`] themselves.

use crate::config::InvocationConfig;
use crate::object_name::ResultsObjectName;
use crate::options::{FlagKey, OverrideSet, printable_command, tokenize};
use crate::Result;
use std::fmt;
use std::ops::Deref;
use tracing::debug;

/// Kind of Test Lab run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestType {
    Robo,
    Instrumentation,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::Robo => "robo",
            TestType::Instrumentation => "instrumentation",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Program, subcommand and flag names used to build the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcloudFlags {
    /// Program name followed by the subcommand path.
    pub prefix: Vec<String>,
    pub test_type: FlagKey,
    pub test: FlagKey,
    pub app: FlagKey,
    pub results_bucket: FlagKey,
    pub results_dir: FlagKey,
}

impl Default for GcloudFlags {
    fn default() -> Self {
        Self {
            prefix: ["gcloud", "firebase", "test", "android", "run"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            test_type: FlagKey::separate("--type"),
            test: FlagKey::separate("--test"),
            app: FlagKey::separate("--app"),
            results_bucket: FlagKey::joined("--results-bucket"),
            results_dir: FlagKey::joined("--results-dir"),
        }
    }
}

/// Full command line, program name first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentList(Vec<String>);

impl ArgumentList {
    pub fn new(args: Vec<String>) -> Self {
        Self(args)
    }

    pub fn program(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Arguments after the program name.
    pub fn args(&self) -> &[String] {
        self.0.get(1..).unwrap_or(&[])
    }

    /// Shell-quoted form for logs.
    pub fn printable(&self) -> String {
        printable_command(&self.0)
    }

}

impl Deref for ArgumentList {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for ArgumentList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for ArgumentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.printable())
    }
}

/// Storage location chosen by the step for a run's results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsLocation {
    pub bucket: String,
    pub object: String,
}

impl fmt::Display for ResultsLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gs://{}/{}", self.bucket, self.object)
    }
}

/// Output of [`CommandBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltCommand {
    pub args: ArgumentList,
    /// User tokens, also present at the end of `args`.
    pub user_args: Vec<String>,
    /// Set when at least one results flag was computed, so the location must be exported.
    pub export: Option<ResultsLocation>,
}

/// Merges computed flags with user options.
#[derive(Debug, Clone, Default)]
pub struct CommandBuilder {
    flags: GcloudFlags,
}

impl CommandBuilder {
    pub fn new(flags: GcloudFlags) -> Self {
        Self { flags }
    }

    /// Build the command for `config`, writing results under `object_name`.
    pub fn build(
        &self,
        config: &InvocationConfig,
        object_name: &ResultsObjectName,
    ) -> Result<BuiltCommand> {
        let flags = &self.flags;
        let user_args = tokenize(&config.options)?;
        let overrides = OverrideSet::from_tokens(&user_args);

        let test_type = match config.test_apk {
            None => TestType::Robo,
            Some(_) => TestType::Instrumentation,
        };
        let mut args = flags.prefix.clone();
        args.extend(flags.test_type.with_value(test_type.as_str()));

        let mut emit = |key: &FlagKey, value: &str| {
            if !overrides.contains(key) {
                args.extend(key.with_value(value));
            }
        };

        if let Some(test_apk) = &config.test_apk {
            emit(&flags.test, &test_apk.to_string_lossy());
        }
        emit(&flags.app, &config.app_apk.to_string_lossy());
        emit(&flags.results_bucket, &config.results_bucket);
        emit(&flags.results_dir, object_name.as_str());

        let export = if !overrides.contains(&flags.results_bucket)
            || !overrides.contains(&flags.results_dir)
        {
            Some(ResultsLocation {
                bucket: config.results_bucket.clone(),
                object: object_name.to_string(),
            })
        } else {
            None
        };

        debug!(
            computed = %printable_command(&args),
            user = %printable_command(&user_args),
            overrides = ?overrides.keys(),
            "Assembled gcloud command"
        );

        args.extend(user_args.iter().cloned());

        Ok(BuiltCommand {
            args: ArgumentList::new(args),
            user_args,
            export,
        })
    }
}
