//! Step configuration resolved from the environment.

use crate::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Names of the environment variables the step reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvKeys {
    /// Optional, falls back to `client_email` in the key.
    pub user: String,
    /// Optional, falls back to `project_id` in the key.
    pub project: String,
    pub bucket: String,
    pub options: String,
    pub app_apk: String,
    /// Optional. Selects an instrumentation run when set.
    pub test_apk: String,
    /// Base64-encoded service account key.
    pub key: String,
    pub home: String,
}

impl Default for EnvKeys {
    fn default() -> Self {
        Self {
            user: "GCLOUD_USER".to_string(),
            project: "GCLOUD_PROJECT".to_string(),
            bucket: "GCLOUD_BUCKET".to_string(),
            options: "GCLOUD_OPTIONS".to_string(),
            app_apk: "APP_APK".to_string(),
            test_apk: "TEST_APK".to_string(),
            key: "GCLOUD_KEY".to_string(),
            home: "HOME".to_string(),
        }
    }
}

/// Source of environment values.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The current process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Subset of a service account key file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GcloudKeyFile {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub client_email: String,
}

/// Everything needed to build and run one Test Lab invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationConfig {
    pub results_bucket: String,
    /// Raw, shell-quoted user options.
    pub options: String,
    pub user: String,
    pub project: String,
    /// Where the decoded service account key was written.
    pub key_path: PathBuf,
    pub app_apk: PathBuf,
    pub test_apk: Option<PathBuf>,
    /// Skip `gcloud` authentication (debug/test mode).
    pub skip_auth: bool,
}

/// Resolves an [`InvocationConfig`] from an [`EnvSource`].
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    keys: EnvKeys,
    key_file_name: String,
    skip_auth: bool,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new(EnvKeys::default())
    }
}

impl ConfigResolver {
    pub fn new(keys: EnvKeys) -> Self {
        Self {
            keys,
            key_file_name: "gcloudkey.json".to_string(),
            skip_auth: false,
        }
    }

    /// Mark resolved configs as debug runs that skip authentication.
    pub fn skip_auth(mut self, skip: bool) -> Self {
        self.skip_auth = skip;
        self
    }

    /// Read and validate all inputs, persisting the decoded key under the home directory.
    pub fn resolve(&self, env: &dyn EnvSource) -> Result<InvocationConfig> {
        let keys = &self.keys;

        let app_apk = PathBuf::from(required(env, &keys.app_apk)?);
        file_exists(&app_apk)?;

        let test_apk = optional(env, &keys.test_apk).map(PathBuf::from);
        if let Some(path) = &test_apk {
            file_exists(path)?;
        }

        let encoded_key = required(env, &keys.key)?;
        let key = STANDARD.decode(encoded_key.trim_end())?;

        let mut user = optional(env, &keys.user);
        let mut project = optional(env, &keys.project);
        if user.is_none() || project.is_none() {
            let key_file: GcloudKeyFile = serde_json::from_slice(&key)?;
            debug!("Reading missing identity from gcloud key");
            user = user.or_else(|| non_empty(key_file.client_email));
            project = project.or_else(|| non_empty(key_file.project_id));
        }
        let user = user.ok_or_else(|| Error::MissingIdentity(keys.user.clone()))?;
        let project = project.ok_or_else(|| Error::MissingIdentity(keys.project.clone()))?;

        let home = PathBuf::from(required(env, &keys.home)?);
        let key_path = home.join(&self.key_file_name);
        std::fs::write(&key_path, &key).map_err(|source| Error::KeyFileWrite {
            path: key_path.clone(),
            source,
        })?;

        let results_bucket = required(env, &keys.bucket)?;
        let options = optional(env, &keys.options).unwrap_or_default();

        info!(
            project = %project,
            bucket = %results_bucket,
            app_apk = %app_apk.display(),
            instrumentation = test_apk.is_some(),
            "Resolved step configuration"
        );

        Ok(InvocationConfig {
            results_bucket,
            options,
            user,
            project,
            key_path,
            app_apk,
            test_apk,
            skip_auth: self.skip_auth,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

fn optional(env: &dyn EnvSource, key: &str) -> Option<String> {
    env.var(key).and_then(non_empty)
}

fn required(env: &dyn EnvSource, key: &str) -> Result<String> {
    optional(env, key).ok_or_else(|| Error::MissingEnv(key.to_string()))
}

fn file_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::FileNotFound(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const KEY_JSON: &str = r#"{"project_id": "fake-project","client_email": "fake@example.com"}"#;

    struct Fixture {
        dir: TempDir,
        env: HashMap<String, String>,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let app = dir.path().join("app.apk");
            std::fs::write(&app, b"").unwrap();

            let mut env = HashMap::new();
            env.insert("APP_APK".to_string(), app.display().to_string());
            env.insert("GCLOUD_KEY".to_string(), STANDARD.encode(KEY_JSON));
            env.insert("HOME".to_string(), dir.path().display().to_string());
            env.insert("GCLOUD_BUCKET".to_string(), "golang-bucket".to_string());
            Self { dir, env }
        }

        fn set(&mut self, key: &str, value: &str) {
            self.env.insert(key.to_string(), value.to_string());
        }

        fn resolve(&self) -> Result<InvocationConfig> {
            ConfigResolver::default().resolve(&self.env)
        }
    }

    #[test]
    fn test_resolve_reads_identity_from_key() {
        let fixture = Fixture::new();
        let config = fixture.resolve().unwrap();

        assert_eq!(config.user, "fake@example.com");
        assert_eq!(config.project, "fake-project");
        assert_eq!(config.results_bucket, "golang-bucket");
        assert_eq!(config.options, "");
        assert_eq!(config.test_apk, None);
        assert!(!config.skip_auth);

        let debug = ConfigResolver::default().skip_auth(true).resolve(&fixture.env).unwrap();
        assert!(debug.skip_auth);

        let written = std::fs::read_to_string(&config.key_path).unwrap();
        assert_eq!(written, KEY_JSON);
        assert_eq!(config.key_path, fixture.dir.path().join("gcloudkey.json"));
    }

    #[test]
    fn test_env_identity_wins_over_key() {
        let mut fixture = Fixture::new();
        fixture.set("GCLOUD_USER", "ci@example.com");
        fixture.set("GCLOUD_PROJECT", "real-project");
        // Not JSON: never parsed when both identities come from env.
        fixture.set("GCLOUD_KEY", &STANDARD.encode("not json"));

        let config = fixture.resolve().unwrap();
        assert_eq!(config.user, "ci@example.com");
        assert_eq!(config.project, "real-project");
    }

    #[test]
    fn test_missing_required_values() {
        let mut fixture = Fixture::new();
        fixture.env.remove("APP_APK");
        assert_eq!(fixture.resolve().unwrap_err().to_string(), "APP_APK is not defined!");

        let mut fixture = Fixture::new();
        fixture.set("GCLOUD_KEY", "");
        assert_eq!(fixture.resolve().unwrap_err().to_string(), "GCLOUD_KEY is not defined!");

        let mut fixture = Fixture::new();
        fixture.env.remove("GCLOUD_BUCKET");
        assert_eq!(fixture.resolve().unwrap_err().to_string(), "GCLOUD_BUCKET is not defined!");

        let mut fixture = Fixture::new();
        fixture.env.remove("HOME");
        assert_eq!(fixture.resolve().unwrap_err().to_string(), "HOME is not defined!");
    }

    #[test]
    fn test_missing_artifacts() {
        let mut fixture = Fixture::new();
        fixture.set("APP_APK", "/tmp/definitely-not-here.apk");
        assert_eq!(
            fixture.resolve().unwrap_err().to_string(),
            "file doesn't exist: '/tmp/definitely-not-here.apk'"
        );

        let mut fixture = Fixture::new();
        fixture.set("TEST_APK", "/tmp/definitely-not-here-test.apk");
        assert!(matches!(fixture.resolve(), Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_test_apk_selects_instrumentation() {
        let mut fixture = Fixture::new();
        let test_apk = fixture.dir.path().join("test.apk");
        std::fs::write(&test_apk, b"").unwrap();
        fixture.set("TEST_APK", &test_apk.display().to_string());

        let config = fixture.resolve().unwrap();
        assert_eq!(config.test_apk, Some(test_apk));
    }

    #[test]
    fn test_identity_missing_everywhere() {
        let mut fixture = Fixture::new();
        fixture.set("GCLOUD_KEY", "e30K"); // "{}\n"
        assert_eq!(
            fixture.resolve().unwrap_err().to_string(),
            "GCLOUD_USER not defined in env or gcloud key"
        );

        fixture.set("GCLOUD_USER", "1234");
        assert_eq!(
            fixture.resolve().unwrap_err().to_string(),
            "GCLOUD_PROJECT not defined in env or gcloud key"
        );
    }

    #[test]
    fn test_bad_key_encodings() {
        let mut fixture = Fixture::new();
        fixture.set("GCLOUD_KEY", "!!!");
        assert!(matches!(fixture.resolve(), Err(Error::CredentialDecode(_))));

        fixture.set("GCLOUD_KEY", &STANDARD.encode("[1, 2"));
        assert!(matches!(fixture.resolve(), Err(Error::CredentialParse(_))));
    }

    #[test]
    fn test_unwritable_home() {
        let mut fixture = Fixture::new();
        fixture.set("HOME", "/does/not/exist");
        assert!(matches!(fixture.resolve(), Err(Error::KeyFileWrite { .. })));
    }

    #[test]
    fn test_custom_env_keys() {
        let fixture = Fixture::new();
        let mut env: HashMap<String, String> = fixture
            .env
            .iter()
            .map(|(k, v)| (format!("STEP_{}", k), v.clone()))
            .collect();
        env.insert("STEP_GCLOUD_OPTIONS".to_string(), "--timeout 25m".to_string());

        let keys = EnvKeys {
            user: "STEP_GCLOUD_USER".to_string(),
            project: "STEP_GCLOUD_PROJECT".to_string(),
            bucket: "STEP_GCLOUD_BUCKET".to_string(),
            options: "STEP_GCLOUD_OPTIONS".to_string(),
            app_apk: "STEP_APP_APK".to_string(),
            test_apk: "STEP_TEST_APK".to_string(),
            key: "STEP_GCLOUD_KEY".to_string(),
            home: "STEP_HOME".to_string(),
        };
        let config = ConfigResolver::new(keys).resolve(&env).unwrap();
        assert_eq!(config.options, "--timeout 25m");
    }
}
