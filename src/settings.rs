//! Renaming settings model

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{ConfigStore, SECTION, SettingValue, StoreError, keys};

/// Naming format used when nothing has been stored yet
pub const DEFAULT_FILE_NAMING_FORMAT: &str = "$if2(%albumartist%,%artist%)/\n\
$if(%albumartist%,%album%/,)\n\
$if($gt(%totaldiscs%,1),%discnumber%-,)\
$if($and(%albumartist%,%tracknumber%),$num(%tracknumber%,2) ,)\
$if(%_multiartist%,%artist% - ,)\
%title%";

/// Glob patterns for additional files moved along with tracks
pub const DEFAULT_ADDITIONAL_FILES_PATTERN: &str = "*.jpg *.png";

/// Host platform facts, read once when a session starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDefaults {
    /// The filesystem already requires Windows-compatible names
    pub requires_windows_compatibility: bool,
    /// Default destination for moved files
    pub music_dir: String,
    /// Default naming format
    pub naming_format: String,
}

impl PlatformDefaults {
    /// Detect defaults for the running platform
    pub fn detect() -> Self {
        let music_dir = dirs::audio_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join("Music")))
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            requires_windows_compatibility: cfg!(target_os = "windows"),
            music_dir,
            naming_format: DEFAULT_FILE_NAMING_FORMAT.to_string(),
        }
    }
}

/// A user-named naming script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedScript {
    pub id: String,
    pub title: String,
    #[serde(rename = "script")]
    pub body: String,
}

impl NamedScript {
    pub fn new(id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
        }
    }
}

/// All file naming options of one options session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamingSettings {
    pub windows_compatibility: bool,
    pub ascii_filenames: bool,
    pub rename_enabled: bool,
    pub naming_format: String,
    pub move_enabled: bool,
    pub move_destination: String,
    pub move_additional_files: bool,
    pub move_additional_files_pattern: String,
    pub delete_empty_dirs: bool,
    /// Order defines selector ordering
    pub naming_scripts: Vec<NamedScript>,
    /// Empty means the inline format is used directly
    pub selected_script_id: String,
}

impl RenamingSettings {
    /// Settings as they are before anything has been stored
    pub fn defaults(platform: &PlatformDefaults) -> Self {
        Self {
            windows_compatibility: true,
            ascii_filenames: false,
            rename_enabled: false,
            naming_format: platform.naming_format.clone(),
            move_enabled: false,
            move_destination: platform.music_dir.clone(),
            move_additional_files: false,
            move_additional_files_pattern: DEFAULT_ADDITIONAL_FILES_PATTERN.to_string(),
            delete_empty_dirs: true,
            naming_scripts: Vec::new(),
            selected_script_id: String::new(),
        }
    }

    /// Read every field from the store, falling back to defaults for missing keys
    pub fn load(store: &impl ConfigStore, platform: &PlatformDefaults) -> Result<Self, StoreError> {
        let d = Self::defaults(platform);

        let mut settings = Self {
            windows_compatibility: store.get_bool(
                SECTION,
                keys::WINDOWS_COMPATIBILITY,
                d.windows_compatibility,
            )?,
            ascii_filenames: store.get_bool(SECTION, keys::ASCII_FILENAMES, d.ascii_filenames)?,
            rename_enabled: store.get_bool(SECTION, keys::RENAME_FILES, d.rename_enabled)?,
            naming_format: store.get_text(SECTION, keys::FILE_NAMING_FORMAT, &d.naming_format)?,
            move_enabled: store.get_bool(SECTION, keys::MOVE_FILES, d.move_enabled)?,
            move_destination: store.get_text(SECTION, keys::MOVE_FILES_TO, &d.move_destination)?,
            move_additional_files: store.get_bool(
                SECTION,
                keys::MOVE_ADDITIONAL_FILES,
                d.move_additional_files,
            )?,
            move_additional_files_pattern: store.get_text(
                SECTION,
                keys::MOVE_ADDITIONAL_FILES_PATTERN,
                &d.move_additional_files_pattern,
            )?,
            delete_empty_dirs: store.get_bool(
                SECTION,
                keys::DELETE_EMPTY_DIRS,
                d.delete_empty_dirs,
            )?,
            naming_scripts: store.get_scripts(SECTION, keys::FILE_NAMING_SCRIPTS)?,
            selected_script_id: store.get_text(
                SECTION,
                keys::SELECTED_FILE_NAMING_SCRIPT_ID,
                &d.selected_script_id,
            )?,
        };

        if platform.requires_windows_compatibility {
            settings.windows_compatibility = true;
        }

        debug!(
            rename = settings.rename_enabled,
            move_files = settings.move_enabled,
            scripts = settings.naming_scripts.len(),
            "Loaded renaming settings"
        );
        Ok(settings)
    }

    /// Every field as a store key/value pair, in persisted order
    pub fn to_values(&self) -> Vec<(&'static str, SettingValue)> {
        vec![
            (keys::WINDOWS_COMPATIBILITY, self.windows_compatibility.into()),
            (keys::ASCII_FILENAMES, self.ascii_filenames.into()),
            (keys::RENAME_FILES, self.rename_enabled.into()),
            (keys::FILE_NAMING_FORMAT, self.naming_format.clone().into()),
            (keys::MOVE_FILES, self.move_enabled.into()),
            (keys::MOVE_FILES_TO, self.move_destination.clone().into()),
            (keys::MOVE_ADDITIONAL_FILES, self.move_additional_files.into()),
            (
                keys::MOVE_ADDITIONAL_FILES_PATTERN,
                self.move_additional_files_pattern.clone().into(),
            ),
            (keys::DELETE_EMPTY_DIRS, self.delete_empty_dirs.into()),
            (keys::FILE_NAMING_SCRIPTS, self.naming_scripts.clone().into()),
            (
                keys::SELECTED_FILE_NAMING_SCRIPT_ID,
                self.selected_script_id.clone().into(),
            ),
        ]
    }

    /// The selected script, `None` when nothing or an unknown id is selected
    pub fn selected_script(&self) -> Option<&NamedScript> {
        if self.selected_script_id.is_empty() {
            return None;
        }
        self.naming_scripts
            .iter()
            .find(|s| s.id == self.selected_script_id)
    }

    /// Index of the selected script in selector order
    pub fn selected_index(&self) -> Option<usize> {
        let id = &self.selected_script()?.id;
        self.naming_scripts.iter().position(|s| &s.id == id)
    }

    /// Whether the naming format matters at all
    pub fn naming_active(&self) -> bool {
        self.rename_enabled || self.move_enabled
    }

    /// Compile the additional files pattern, skipping invalid entries
    pub fn additional_file_patterns(&self) -> Vec<glob::Pattern> {
        self.move_additional_files_pattern
            .split_whitespace()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Ignoring invalid additional files pattern '{}': {}", p, e);
                    None
                }
            })
            .collect()
    }

    /// Whether a file name is picked up as an additional file
    pub fn is_additional_file(&self, filename: &str) -> bool {
        self.move_additional_files
            && self
                .additional_file_patterns()
                .iter()
                .any(|p| p.matches(filename))
    }
}
