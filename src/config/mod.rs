//! Settings storage

mod schema;

pub use schema::{SECTION, SettingValue, keys};

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::settings::NamedScript;

/// Stored sections, each an ordered map of key to value
pub type Sections = IndexMap<String, IndexMap<String, SettingValue>>;

/// Failures of the settings store.
///
/// These are not user input problems and are reported through the host's
/// generic error path.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not determine settings path")]
    NoPath,

    #[error("Failed to read settings from {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings from {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize settings")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write settings to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Setting {section}.{key} is {found}, expected {expected}")]
    Type {
        section: String,
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Key/value settings persistence used by the options page
pub trait ConfigStore {
    /// Read a value, `None` if the key has never been stored
    fn get(&self, section: &str, key: &str) -> Result<Option<SettingValue>, StoreError>;

    /// Store a single value
    fn set(&mut self, section: &str, key: &str, value: SettingValue) -> Result<(), StoreError>;

    /// Store several values as one commit
    fn set_all(
        &mut self,
        section: &str,
        values: Vec<(&'static str, SettingValue)>,
    ) -> Result<(), StoreError> {
        for (key, value) in values {
            self.set(section, key, value)?;
        }
        Ok(())
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, StoreError> {
        match self.get(section, key)? {
            None => Ok(default),
            Some(value) => value
                .as_bool()
                .ok_or_else(|| type_error(section, key, "bool", &value)),
        }
    }

    fn get_text(&self, section: &str, key: &str, default: &str) -> Result<String, StoreError> {
        match self.get(section, key)? {
            None => Ok(default.to_string()),
            Some(value) => value
                .as_text()
                .map(str::to_string)
                .ok_or_else(|| type_error(section, key, "text", &value)),
        }
    }

    fn get_scripts(&self, section: &str, key: &str) -> Result<Vec<NamedScript>, StoreError> {
        match self.get(section, key)? {
            None => Ok(Vec::new()),
            Some(value) => value
                .as_scripts()
                .map(<[NamedScript]>::to_vec)
                .ok_or_else(|| type_error(section, key, "scripts", &value)),
        }
    }
}

fn type_error(
    section: &str,
    key: &str,
    expected: &'static str,
    found: &SettingValue,
) -> StoreError {
    StoreError::Type {
        section: section.to_string(),
        key: key.to_string(),
        expected,
        found: found.kind(),
    }
}

/// In-process store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sections: Sections,
    commits: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set`/`set_all` calls that reached the store
    pub fn commits(&self) -> usize {
        self.commits
    }

    pub fn sections(&self) -> &Sections {
        &self.sections
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, section: &str, key: &str) -> Result<Option<SettingValue>, StoreError> {
        Ok(self
            .sections
            .get(section)
            .and_then(|s| s.get(key))
            .cloned())
    }

    fn set(&mut self, section: &str, key: &str, value: SettingValue) -> Result<(), StoreError> {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value);
        self.commits += 1;
        Ok(())
    }

    fn set_all(
        &mut self,
        section: &str,
        values: Vec<(&'static str, SettingValue)>,
    ) -> Result<(), StoreError> {
        let entries = self.sections.entry(section.to_string()).or_default();
        for (key, value) in values {
            entries.insert(key.to_string(), value);
        }
        self.commits += 1;
        Ok(())
    }
}

/// TOML file backed store
#[derive(Debug, Clone)]
pub struct TomlStore {
    path: PathBuf,
    sections: Sections,
}

impl TomlStore {
    /// Open the store at a path or the default location
    pub fn open(path: Option<&Path>) -> Result<Self, StoreError> {
        let path = path
            .map(crate::expand_path)
            .or_else(Self::default_path)
            .ok_or(StoreError::NoPath)?;

        let sections = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| StoreError::Read {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            debug!("No settings file at {}, using defaults", path.display());
            Sections::new()
        };

        Ok(Self { path, sections })
    }

    /// Get the default settings file path
    /// Uses the platform config directory (via dirs::config_dir), falling back to ~/.config
    pub fn default_path() -> Option<PathBuf> {
        let config_base =
            dirs::config_dir().or_else(|| dirs::home_dir().map(|d| d.join(".config")))?;
        Some(config_base.join("filenaming").join("settings.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write every section to disk (with advisory file locking)
    fn flush(&self) -> Result<(), StoreError> {
        let write_error = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }

        let content = toml::to_string_pretty(&self.sections)?;

        // Use a lockfile to prevent concurrent writes
        let lock_path = self.path.with_extension("toml.lock");
        let lock_file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(write_error)?;

        use fs2::FileExt;
        lock_file.lock_exclusive().map_err(write_error)?;

        let result = std::fs::write(&self.path, content).map_err(write_error);

        let _ = lock_file.unlock();

        if result.is_ok() {
            info!("Saved settings to {}", self.path.display());
        }
        result
    }
}

impl ConfigStore for TomlStore {
    fn get(&self, section: &str, key: &str) -> Result<Option<SettingValue>, StoreError> {
        Ok(self
            .sections
            .get(section)
            .and_then(|s| s.get(key))
            .cloned())
    }

    fn set(&mut self, section: &str, key: &str, value: SettingValue) -> Result<(), StoreError> {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value);
        self.flush()
    }

    fn set_all(
        &mut self,
        section: &str,
        values: Vec<(&'static str, SettingValue)>,
    ) -> Result<(), StoreError> {
        let mut staged = self.sections.clone();
        let entries = staged.entry(section.to_string()).or_default();
        for (key, value) in values {
            entries.insert(key.to_string(), value);
        }

        let previous = std::mem::replace(&mut self.sections, staged);
        if let Err(e) = self.flush() {
            self.sections = previous;
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use predicates::prelude::*;

    #[test]
    fn test_memory_store_defaults() {
        let store = MemoryStore::new();
        assert!(store.get_bool(SECTION, keys::DELETE_EMPTY_DIRS, true).unwrap());
        assert_eq!(
            store.get_text(SECTION, keys::MOVE_FILES_TO, "/music").unwrap(),
            "/music"
        );
        assert!(store.get_scripts(SECTION, keys::FILE_NAMING_SCRIPTS).unwrap().is_empty());
    }

    #[test]
    fn test_type_mismatch() {
        let mut store = MemoryStore::new();
        store.set(SECTION, keys::RENAME_FILES, "yes".into()).unwrap();
        let err = store.get_bool(SECTION, keys::RENAME_FILES, false).unwrap_err();
        assert!(matches!(err, StoreError::Type { expected: "bool", found: "text", .. }));
    }

    #[test]
    fn test_memory_store_set_all_is_one_commit() {
        let mut store = MemoryStore::new();
        store
            .set_all(
                SECTION,
                vec![(keys::RENAME_FILES, true.into()), (keys::MOVE_FILES, false.into())],
            )
            .unwrap();
        assert_eq!(store.commits(), 1);
        assert_eq!(store.sections()[SECTION].len(), 2);
    }

    #[test]
    fn test_toml_store_round_trip() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("nested").child("settings.toml");

        let mut store = TomlStore::open(Some(file.path())).unwrap();
        store
            .set_all(
                SECTION,
                vec![
                    (keys::RENAME_FILES, true.into()),
                    (keys::FILE_NAMING_FORMAT, "%artist%/%title%".into()),
                    (
                        keys::FILE_NAMING_SCRIPTS,
                        vec![NamedScript::new("s1", "Simple", "%title%")].into(),
                    ),
                    (keys::SELECTED_FILE_NAMING_SCRIPT_ID, "s1".into()),
                ],
            )
            .unwrap();

        file.assert(predicate::path::exists());
        file.assert(predicate::str::contains("rename_files = true"));

        let reopened = TomlStore::open(Some(file.path())).unwrap();
        assert!(reopened.get_bool(SECTION, keys::RENAME_FILES, false).unwrap());
        assert_eq!(
            reopened.get_text(SECTION, keys::FILE_NAMING_FORMAT, "").unwrap(),
            "%artist%/%title%"
        );
        let scripts = reopened.get_scripts(SECTION, keys::FILE_NAMING_SCRIPTS).unwrap();
        assert_eq!(scripts, vec![NamedScript::new("s1", "Simple", "%title%")]);
    }

    #[test]
    fn test_toml_store_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[setting\nbroken").unwrap();

        let err = TomlStore::open(Some(&path)).unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }
}
