//! Error types for the Test Lab step.

use crate::options::QuoteError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Configuration errors
    #[error("{0} is not defined!")]
    MissingEnv(String),

    #[error("file doesn't exist: '{}'", .0.display())]
    FileNotFound(PathBuf),

    #[error("gcloud key is not valid base64: {0}")]
    CredentialDecode(#[from] base64::DecodeError),

    #[error("gcloud key is not valid JSON: {0}")]
    CredentialParse(#[from] serde_json::Error),

    #[error("{0} not defined in env or gcloud key")]
    MissingIdentity(String),

    #[error("failed to write key file {}: {source}", path.display())]
    KeyFileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Command errors
    #[error("malformed quoting in options: {0}")]
    MalformedQuoting(#[from] QuoteError),

    #[error("failed to launch {program}: {source}")]
    LaunchFailure {
        program: String,
        #[source]
        source: std::io::Error,
    },

    // Collaborator errors
    #[error("authentication command `{command}` exited with code {exit_code}")]
    Authentication { command: String, exit_code: i32 },

    #[error("failed to export {location}: {message}")]
    Export { location: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error happened before any test process was started.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::MissingEnv(_)
                | Error::FileNotFound(_)
                | Error::CredentialDecode(_)
                | Error::CredentialParse(_)
                | Error::MissingIdentity(_)
                | Error::KeyFileWrite { .. }
                | Error::MalformedQuoting(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_step_output() {
        assert_eq!(
            Error::MissingEnv("APP_APK".to_string()).to_string(),
            "APP_APK is not defined!"
        );
        assert_eq!(
            Error::FileNotFound(PathBuf::from("/tmp/nope")).to_string(),
            "file doesn't exist: '/tmp/nope'"
        );
        assert_eq!(
            Error::MissingIdentity("GCLOUD_USER".to_string()).to_string(),
            "GCLOUD_USER not defined in env or gcloud key"
        );
    }

    #[test]
    fn test_quote_errors_are_configuration_errors() {
        let err = Error::from(QuoteError::UnterminatedQuote);
        assert!(err.is_configuration());

        let launch = Error::LaunchFailure {
            program: "gcloud".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(!launch.is_configuration());
    }
}
