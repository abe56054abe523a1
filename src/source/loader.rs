//! Source discovery and merging.
//!
//! # Load order (later wins)
//! ```text
//! config/dspace.cfg          primary, required
//!     → its includes, depth first, before its own keys
//! config/modules/*.cfg       sorted by file name, each with its includes
//! config/local.cfg           optional local overrides
//! ```
//! Missing optional files contribute nothing but are still tracked, so
//! creating one later triggers a reload. Each path's modification time is
//! observed before the path is read; an edit racing the read therefore
//! always looks newer at the next check.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{ConfigError, Result};
use crate::reload::stamps::modified;
use crate::settings::ServiceSettings;
use crate::source::parser::parse_source;
use crate::store::Snapshot;

/// File locations derived from a home directory and settings.
#[derive(Debug, Clone)]
pub struct SourceLayout {
    home: PathBuf,
    config_dir: PathBuf,
    primary: PathBuf,
    local: Option<PathBuf>,
    modules_dir: PathBuf,
    module_extension: String,
}

/// The result of reading every file source once.
#[derive(Debug, Default)]
pub struct LoadedSources {
    pub snapshot: Snapshot,
    /// Every path consulted, present or not, with its modification time
    /// as seen just before it was read.
    pub tracked: Vec<(PathBuf, Option<SystemTime>)>,
    /// Module namespaces discovered under the modules directory.
    pub modules: Vec<String>,
}

impl SourceLayout {
    pub fn new(home: impl Into<PathBuf>, settings: &ServiceSettings) -> Self {
        let home = home.into();
        let config_dir = home.join(&settings.config_dir);
        let local = if settings.local_file.trim().is_empty() {
            None
        } else {
            Some(config_dir.join(&settings.local_file))
        };
        Self {
            primary: config_dir.join(&settings.primary_file),
            modules_dir: config_dir.join(&settings.modules_dir),
            module_extension: settings.module_extension.clone(),
            local,
            config_dir,
            home,
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn primary(&self) -> &Path {
        &self.primary
    }

    pub fn modules_dir(&self) -> &Path {
        &self.modules_dir
    }

    /// Read and merge every file source.
    pub fn load(&self) -> Result<LoadedSources> {
        let mut loaded = LoadedSources::default();
        let mut visiting = Vec::new();

        let primary = load_file(&self.primary, true, &mut visiting, &mut loaded.tracked)?;
        loaded.snapshot.merge(primary);

        loaded
            .tracked
            .push((self.modules_dir.clone(), modified(&self.modules_dir)));
        for (module, path) in self.module_files()? {
            let entries = load_file(&path, false, &mut visiting, &mut loaded.tracked)?;
            tracing::debug!(module = %module, properties = entries.len(), "Module source loaded");
            loaded.snapshot.merge(entries);
            loaded.modules.push(module);
        }

        if let Some(local) = &self.local {
            let entries = load_file(local, false, &mut visiting, &mut loaded.tracked)?;
            loaded.snapshot.merge(entries);
        }

        tracing::debug!(
            properties = loaded.snapshot.len(),
            files = loaded.tracked.len(),
            "File sources merged"
        );
        Ok(loaded)
    }

    /// Module files sorted by name, paired with their namespace.
    fn module_files(&self) -> Result<Vec<(String, PathBuf)>> {
        let dir = match fs::read_dir(&self.modules_dir) {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ConfigError::io(&self.modules_dir, e)),
        };

        let mut modules = Vec::new();
        for entry in dir {
            let path = entry.map_err(|e| ConfigError::io(&self.modules_dir, e))?.path();
            let matches_ext = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy() == self.module_extension);
            if !path.is_file() || !matches_ext {
                continue;
            }
            if let Some(stem) = path.file_stem() {
                modules.push((stem.to_string_lossy().into_owned(), path));
            }
        }
        modules.sort();
        Ok(modules)
    }
}

/// Load one file and, first, everything it includes.
fn load_file(
    path: &Path,
    required: bool,
    visiting: &mut Vec<PathBuf>,
    tracked: &mut Vec<(PathBuf, Option<SystemTime>)>,
) -> Result<Snapshot> {
    tracked.push((path.to_path_buf(), modified(path)));

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                return Err(ConfigError::SourceNotFound {
                    path: path.to_path_buf(),
                });
            }
            tracing::debug!(path = %path.display(), "Optional source absent");
            return Ok(Snapshot::new());
        }
        Err(e) => return Err(ConfigError::io(path, e)),
    };

    let identity = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    visiting.push(identity);

    let parsed = parse_source(path, &content)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    let mut merged = Snapshot::new();
    for (line, target) in &parsed.includes {
        let target_path = base.join(target);
        let target_identity =
            fs::canonicalize(&target_path).unwrap_or_else(|_| target_path.clone());
        if visiting.contains(&target_identity) {
            return Err(ConfigError::Parse {
                path: path.to_path_buf(),
                line: *line,
                message: format!("include cycle through '{}'", target),
            });
        }
        tracing::debug!(from = %path.display(), include = %target_path.display(), "Expanding include");
        merged.merge(load_file(&target_path, false, visiting, tracked)?);
    }
    merged.merge(parsed.entries);

    visiting.pop();
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RawEntry;

    struct Home {
        dir: tempfile::TempDir,
        settings: ServiceSettings,
    }

    impl Home {
        fn new(primary: &str) -> Self {
            let home = Home {
                dir: tempfile::tempdir().unwrap(),
                settings: ServiceSettings::default(),
            };
            home.write("dspace.cfg", primary);
            home
        }

        fn write(&self, rel: &str, content: &str) {
            let path = self.dir.path().join("config").join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        fn load(&self) -> Result<LoadedSources> {
            SourceLayout::new(self.dir.path(), &self.settings).load()
        }
    }

    #[test]
    fn test_missing_primary_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceLayout::new(dir.path(), &ServiceSettings::default())
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::SourceNotFound { .. }));
    }

    #[test]
    fn test_direct_key_beats_included_key() {
        let home = Home::new("include = included.cfg\nshared = primary\n");
        home.write("included.cfg", "shared = included\nprop.from.included.file = works\n");

        let loaded = home.load().unwrap();
        assert_eq!(loaded.snapshot.get("shared").unwrap().first(), "primary");
        assert_eq!(
            loaded.snapshot.get("prop.from.included.file").unwrap().first(),
            "works"
        );
        assert!(!loaded.snapshot.contains_key("include"));
    }

    #[test]
    fn test_nested_includes_expand_first() {
        let home = Home::new("include = a.cfg\n");
        home.write("a.cfg", "include = sub/b.cfg\nkey = from-a\n");
        home.write("sub/b.cfg", "key = from-b\nonly.b = yes\n");

        let loaded = home.load().unwrap();
        assert_eq!(loaded.snapshot.get("key").unwrap().first(), "from-a");
        assert_eq!(loaded.snapshot.get("only.b").unwrap().first(), "yes");
    }

    #[test]
    fn test_missing_include_is_absent() {
        let home = Home::new("include = nowhere.cfg\na = 1\n");
        let loaded = home.load().unwrap();
        assert_eq!(loaded.snapshot.len(), 1);
        assert!(loaded
            .tracked
            .iter()
            .any(|(p, seen)| p.ends_with("nowhere.cfg") && seen.is_none()));
    }

    #[test]
    fn test_include_cycle_is_parse_error() {
        let home = Home::new("include = a.cfg\n");
        home.write("a.cfg", "include = dspace.cfg\n");
        assert!(matches!(home.load(), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_modules_and_local_order() {
        let home = Home::new("mail.admin = primary@example.org\noai.enabled = false\n");
        home.write("modules/oai.cfg", "oai.enabled = true\n");
        home.write("modules/authentication-orcid.cfg", "authentication-orcid.can-self-register = true\n");
        home.write("modules/notes.txt", "ignored = yes\n");
        home.write("local.cfg", "mail.admin = local@example.org\n");

        let loaded = home.load().unwrap();
        assert_eq!(loaded.modules, vec!["authentication-orcid", "oai"]);
        assert_eq!(loaded.snapshot.get("oai.enabled").unwrap().first(), "true");
        assert_eq!(
            loaded.snapshot.get("mail.admin").unwrap().first(),
            "local@example.org"
        );
        assert!(!loaded.snapshot.contains_key("ignored"));
    }

    #[test]
    fn test_later_single_replaces_multi() {
        let home = Home::new("list = a\nlist = b\n");
        home.write("local.cfg", "list = c\n");
        let loaded = home.load().unwrap();
        assert_eq!(loaded.snapshot.get("list"), Some(&RawEntry::Single("c".into())));
    }
}
