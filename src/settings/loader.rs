//! Settings loading from disk.

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::settings::schema::ServiceSettings;
use crate::settings::validation::validate_settings;

/// Load and validate service settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<ServiceSettings> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    parse_settings(&content)
}

/// Parse and validate service settings from TOML text.
pub fn parse_settings(content: &str) -> Result<ServiceSettings> {
    let settings: ServiceSettings = toml::from_str(content)?;
    validate_settings(&settings).map_err(ConfigError::Settings)?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::schema::ReloadTrigger;
    use std::io::Write;

    #[test]
    fn test_partial_settings_keep_defaults() {
        let settings = parse_settings(
            r#"
primary_file = "main.cfg"

[reload]
poll_interval_ms = 500
trigger = "events"

[environment]
allow = ["APP_*", "HOSTNAME"]
"#,
        )
        .unwrap();

        assert_eq!(settings.primary_file, "main.cfg");
        assert_eq!(settings.config_dir, "config");
        assert_eq!(settings.reload.poll_interval_ms, 500);
        assert!(settings.reload.enabled);
        assert_eq!(settings.reload.trigger, ReloadTrigger::Events);
        assert_eq!(settings.environment.allow, vec!["APP_*", "HOSTNAME"]);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let err = parse_settings("[reload]\npoll_interval_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Settings(ref errors) if errors.len() == 1));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = parse_settings("primary_file = ").unwrap_err();
        assert!(matches!(err, ConfigError::SettingsFormat(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_home = \"/srv/repo\"").unwrap();

        let settings = load_settings(file.path()).unwrap();
        assert_eq!(settings.default_home, "/srv/repo");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_settings(Path::new("/nonexistent/settings.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
