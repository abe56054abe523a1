//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use hier_config::source::{EnvSource, MapEnv};
use hier_config::{ConfigurationService, ServiceSettings};
use tempfile::TempDir;

/// A throwaway configuration home laid out with default settings.
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    /// Create a home whose primary source holds `primary`.
    pub fn new(primary: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("config/modules")).unwrap();
        let home = TestHome { dir };
        home.write("dspace.cfg", primary);
        home
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    #[allow(dead_code)]
    pub fn config_path(&self, name: &str) -> PathBuf {
        self.dir.path().join("config").join(name)
    }

    /// Write a file relative to the config directory.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.config_path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Rewrite a file and push its mtime forward so the change is visible
    /// regardless of filesystem timestamp granularity.
    #[allow(dead_code)]
    pub fn edit(&self, name: &str, content: &str) {
        let path = self.write(name, content);
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(5))
            .unwrap();
    }

    /// Build a service over this home with an empty environment and
    /// automatic reload off, so only the test triggers reloads.
    #[allow(dead_code)]
    pub fn service(&self) -> ConfigurationService {
        let mut settings = ServiceSettings::default();
        settings.reload.enabled = false;
        self.service_with(settings, MapEnv::new())
    }

    pub fn service_with(
        &self,
        settings: ServiceSettings,
        env: impl EnvSource + 'static,
    ) -> ConfigurationService {
        ConfigurationService::builder()
            .home(self.path())
            .settings(settings)
            .env(env)
            .build()
            .unwrap()
    }
}

/// Settings with a fast poll so reload tests finish quickly.
#[allow(dead_code)]
pub fn fast_reload_settings(interval_ms: u64) -> ServiceSettings {
    let mut settings = ServiceSettings::default();
    settings.reload.poll_interval_ms = interval_ms;
    settings
}

/// An environment the test can change while a service holds a clone.
#[allow(dead_code)]
#[derive(Debug, Clone, Default)]
pub struct SharedEnv {
    vars: Arc<Mutex<HashMap<String, String>>>,
}

#[allow(dead_code)]
impl SharedEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: &str, value: &str) {
        self.vars
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove(&self, name: &str) {
        self.vars.lock().unwrap().remove(name);
    }
}

impl EnvSource for SharedEnv {
    fn vars(&self) -> Vec<(String, String)> {
        let mut vars: Vec<_> = self
            .vars
            .lock()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        vars.sort();
        vars
    }

    fn var(&self, name: &str) -> Option<String> {
        self.vars.lock().unwrap().get(name).cloned()
    }
}
