//! Shared test helpers.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use testlab_core::ports::CommandLauncher;
use testlab_core::{ArgumentList, InvocationConfig, Result};

/// Records every launched command and answers with scripted exit codes.
///
/// Codes are queued per command prefix (e.g. `"gcloud firebase"`); commands
/// with no queued code exit 0.
#[derive(Default)]
pub struct ScriptedLauncher {
    scripts: Mutex<HashMap<String, Vec<i32>>>,
    launched: Mutex<Vec<Vec<String>>>,
}

impl ScriptedLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, prefix: &str, codes: &[i32]) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(prefix.to_string(), codes.iter().rev().copied().collect());
        self
    }

    pub fn launched(&self) -> Vec<Vec<String>> {
        self.launched.lock().unwrap().clone()
    }

    /// First two words of each launched command, e.g. `"gcloud auth"`.
    pub fn launched_heads(&self) -> Vec<String> {
        self.launched()
            .iter()
            .map(|args| args.iter().take(2).cloned().collect::<Vec<_>>().join(" "))
            .collect()
    }
}

#[async_trait]
impl CommandLauncher for ScriptedLauncher {
    async fn launch(&self, args: &ArgumentList) -> Result<i32> {
        self.launched.lock().unwrap().push(args.to_vec());

        let line = args.join(" ");
        let mut scripts = self.scripts.lock().unwrap();
        let code = scripts
            .iter_mut()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .and_then(|(_, codes)| codes.pop())
            .unwrap_or(0);
        Ok(code)
    }
}

pub fn config(test_apk: Option<&str>, options: &str, skip_auth: bool) -> InvocationConfig {
    InvocationConfig {
        results_bucket: "golang-bucket".to_string(),
        options: options.to_string(),
        user: "fake@example.com".to_string(),
        project: "fake-project".to_string(),
        key_path: PathBuf::from("/home/ci/gcloudkey.json"),
        app_apk: PathBuf::from("/tmp/app.apk"),
        test_apk: test_apk.map(PathBuf::from),
        skip_auth,
    }
}
