//! Testlab Core
//!
//! Core types for running Firebase Test Lab from a CI step: configuration
//! resolution, user option parsing, results naming and command assembly.
//! Process execution lives in `testlab-runner`.

pub mod command;
pub mod config;
pub mod error;
pub mod object_name;
pub mod options;
pub mod ports;

pub use command::{ArgumentList, BuiltCommand, CommandBuilder, GcloudFlags, ResultsLocation, TestType};
pub use config::{ConfigResolver, EnvKeys, EnvSource, InvocationConfig, ProcessEnv};
pub use error::{Error, Result};
pub use object_name::ResultsObjectName;
pub use options::{FlagKey, OverrideSet, QuoteError};
