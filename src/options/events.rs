//! Edits and notifications handled by the options controller

use thiserror::Error;
use tracing::debug;

use crate::config::keys;
use crate::settings::{NamedScript, RenamingSettings};

/// A single option change made on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEdit {
    RenameFiles(bool),
    MoveFiles(bool),
    AsciiFilenames(bool),
    WindowsCompatibility(bool),
    NamingFormat(String),
    MoveDestination(String),
    MoveAdditionalFiles(bool),
    MoveAdditionalFilesPattern(String),
    DeleteEmptyDirs(bool),
}

/// Notifications from the external script editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEditorEvent {
    /// The editor committed new script text
    Saved(String),
    /// Preview inputs changed inside the editor
    Updated,
    SelectionChanged(String),
    ScriptsChanged(Vec<NamedScript>),
}

/// Problems turning `key value` text into an edit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("Unknown or read-only option '{0}'")]
    UnknownKey(String),

    #[error("Option '{key}' expects true or false, got '{value}'")]
    InvalidBool { key: String, value: String },
}

fn parse_bool(key: &str, value: &str) -> Result<bool, EditError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(EditError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

impl SettingsEdit {
    /// Build an edit from a store key and its text value
    pub fn parse(key: &str, value: &str) -> Result<Self, EditError> {
        let edit = match key {
            keys::RENAME_FILES => SettingsEdit::RenameFiles(parse_bool(key, value)?),
            keys::MOVE_FILES => SettingsEdit::MoveFiles(parse_bool(key, value)?),
            keys::ASCII_FILENAMES => SettingsEdit::AsciiFilenames(parse_bool(key, value)?),
            keys::WINDOWS_COMPATIBILITY => {
                SettingsEdit::WindowsCompatibility(parse_bool(key, value)?)
            }
            keys::FILE_NAMING_FORMAT => SettingsEdit::NamingFormat(value.to_string()),
            keys::MOVE_FILES_TO => SettingsEdit::MoveDestination(value.to_string()),
            keys::MOVE_ADDITIONAL_FILES => {
                SettingsEdit::MoveAdditionalFiles(parse_bool(key, value)?)
            }
            keys::MOVE_ADDITIONAL_FILES_PATTERN => {
                SettingsEdit::MoveAdditionalFilesPattern(value.to_string())
            }
            keys::DELETE_EMPTY_DIRS => SettingsEdit::DeleteEmptyDirs(parse_bool(key, value)?),
            _ => return Err(EditError::UnknownKey(key.to_string())),
        };
        Ok(edit)
    }

    /// Apply to `settings`; returns false if nothing changed
    pub(crate) fn apply_to(self, settings: &mut RenamingSettings, windows_locked: bool) -> bool {
        fn replace<T: PartialEq>(field: &mut T, value: T) -> bool {
            if *field == value {
                false
            } else {
                *field = value;
                true
            }
        }

        match self {
            SettingsEdit::RenameFiles(v) => replace(&mut settings.rename_enabled, v),
            SettingsEdit::MoveFiles(v) => replace(&mut settings.move_enabled, v),
            SettingsEdit::AsciiFilenames(v) => replace(&mut settings.ascii_filenames, v),
            SettingsEdit::WindowsCompatibility(v) => {
                if windows_locked {
                    debug!("Windows compatibility is locked on this platform");
                    false
                } else {
                    replace(&mut settings.windows_compatibility, v)
                }
            }
            SettingsEdit::NamingFormat(v) => replace(&mut settings.naming_format, v),
            SettingsEdit::MoveDestination(v) => replace(&mut settings.move_destination, v),
            SettingsEdit::MoveAdditionalFiles(v) => {
                replace(&mut settings.move_additional_files, v)
            }
            SettingsEdit::MoveAdditionalFilesPattern(v) => {
                replace(&mut settings.move_additional_files_pattern, v)
            }
            SettingsEdit::DeleteEmptyDirs(v) => replace(&mut settings.delete_empty_dirs, v),
        }
    }
}
