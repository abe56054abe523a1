//! Home-directory resolution.
//!
//! Candidates are tried in order: explicit argument, the configured
//! environment variable, the built-in default. The first candidate that
//! contains the primary source is accepted.

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::settings::ServiceSettings;
use crate::source::environment::EnvSource;

/// A home is valid when its primary source exists.
pub fn is_valid_home(home: &Path, settings: &ServiceSettings) -> bool {
    home.join(&settings.config_dir)
        .join(&settings.primary_file)
        .is_file()
}

/// Resolve the home directory.
pub fn resolve_home(
    explicit: Option<&Path>,
    settings: &ServiceSettings,
    env: &dyn EnvSource,
) -> Result<PathBuf> {
    let mut tried = Vec::new();

    let candidates = explicit
        .map(Path::to_path_buf)
        .into_iter()
        .chain(
            env.var(&settings.home_env_var)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        )
        .chain(std::iter::once(PathBuf::from(&settings.default_home)));

    for candidate in candidates {
        if is_valid_home(&candidate, settings) {
            tracing::debug!(home = %candidate.display(), "Configuration home resolved");
            return Ok(candidate);
        }
        tracing::debug!(candidate = %candidate.display(), "Rejected configuration home candidate");
        tried.push(candidate);
    }

    Err(ConfigError::HomeNotFound { tried })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::environment::MapEnv;
    use std::fs;

    fn make_home(settings: &ServiceSettings) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join(&settings.config_dir);
        fs::create_dir_all(&config).unwrap();
        fs::write(config.join(&settings.primary_file), "a = 1\n").unwrap();
        dir
    }

    fn settings_without_default() -> ServiceSettings {
        ServiceSettings {
            home_env_var: "TEST_HOME".into(),
            default_home: "/nonexistent/home".into(),
            ..ServiceSettings::default()
        }
    }

    #[test]
    fn test_explicit_home_wins() {
        let settings = settings_without_default();
        let explicit = make_home(&settings);
        let from_env = make_home(&settings);
        let env = MapEnv::new().with("TEST_HOME", from_env.path().to_string_lossy());

        let home = resolve_home(Some(explicit.path()), &settings, &env).unwrap();
        assert_eq!(home, explicit.path());
    }

    #[test]
    fn test_invalid_explicit_falls_back_to_env() {
        let settings = settings_without_default();
        let from_env = make_home(&settings);
        let env = MapEnv::new().with("TEST_HOME", from_env.path().to_string_lossy());

        let home = resolve_home(Some(Path::new("/not/a/home")), &settings, &env).unwrap();
        assert_eq!(home, from_env.path());
    }

    #[test]
    fn test_no_valid_home() {
        let settings = settings_without_default();
        let err = resolve_home(Some(Path::new("/not/a/home")), &settings, &MapEnv::new())
            .unwrap_err();
        match err {
            ConfigError::HomeNotFound { tried } => assert_eq!(tried.len(), 2),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_default_home_used_last() {
        let mut settings = settings_without_default();
        let default = make_home(&settings);
        settings.default_home = default.path().to_string_lossy().into_owned();

        let home = resolve_home(None, &settings, &MapEnv::new()).unwrap();
        assert_eq!(home, default.path());
    }
}
