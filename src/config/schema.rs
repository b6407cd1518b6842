//! Persisted settings schema

use serde::{Deserialize, Serialize};

use crate::settings::NamedScript;

/// Section holding every file naming option
pub const SECTION: &str = "setting";

/// Store keys, one per persisted field
pub mod keys {
    pub const WINDOWS_COMPATIBILITY: &str = "windows_compatibility";
    pub const ASCII_FILENAMES: &str = "ascii_filenames";
    pub const RENAME_FILES: &str = "rename_files";
    pub const FILE_NAMING_FORMAT: &str = "file_naming_format";
    pub const MOVE_FILES: &str = "move_files";
    pub const MOVE_FILES_TO: &str = "move_files_to";
    pub const MOVE_ADDITIONAL_FILES: &str = "move_additional_files";
    pub const MOVE_ADDITIONAL_FILES_PATTERN: &str = "move_additional_files_pattern";
    pub const DELETE_EMPTY_DIRS: &str = "delete_empty_dirs";
    pub const FILE_NAMING_SCRIPTS: &str = "file_naming_scripts";
    pub const SELECTED_FILE_NAMING_SCRIPT_ID: &str = "selected_file_naming_script_id";

    /// All keys in persisted order
    pub const ALL: &[&str] = &[
        WINDOWS_COMPATIBILITY,
        ASCII_FILENAMES,
        RENAME_FILES,
        FILE_NAMING_FORMAT,
        MOVE_FILES,
        MOVE_FILES_TO,
        MOVE_ADDITIONAL_FILES,
        MOVE_ADDITIONAL_FILES_PATTERN,
        DELETE_EMPTY_DIRS,
        FILE_NAMING_SCRIPTS,
        SELECTED_FILE_NAMING_SCRIPT_ID,
    ];
}

/// A single stored value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Text(String),
    Scripts(Vec<NamedScript>),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SettingValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_scripts(&self) -> Option<&[NamedScript]> {
        match self {
            SettingValue::Scripts(scripts) => Some(scripts),
            _ => None,
        }
    }

    /// Name of the stored type, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "bool",
            SettingValue::Text(_) => "text",
            SettingValue::Scripts(_) => "scripts",
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<Vec<NamedScript>> for SettingValue {
    fn from(value: Vec<NamedScript>) -> Self {
        SettingValue::Scripts(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    type Section = IndexMap<String, SettingValue>;

    #[test]
    fn test_parse_setting_section() {
        let toml = r#"
            rename_files = true
            file_naming_format = "%artist%/%title%"
            file_naming_scripts = []
        "#;

        let section: Section = toml::from_str(toml).unwrap();
        assert_eq!(section["rename_files"], SettingValue::Bool(true));
        assert_eq!(section["file_naming_format"].as_text(), Some("%artist%/%title%"));
        assert_eq!(section["file_naming_scripts"].as_scripts(), Some(&[][..]));
    }

    #[test]
    fn test_parse_named_scripts() {
        let toml = r#"
            [[file_naming_scripts]]
            id = "a1"
            title = "Album"
            script = "%album%/%title%"
        "#;

        let section: Section = toml::from_str(toml).unwrap();
        let scripts = section["file_naming_scripts"].as_scripts().unwrap();
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].id, "a1");
        assert_eq!(scripts[0].body, "%album%/%title%");
    }

    #[test]
    fn test_keys_are_unique() {
        let mut seen = std::collections::HashSet::new();
        assert!(keys::ALL.iter().all(|k| seen.insert(*k)));
        assert_eq!(keys::ALL.len(), 11);
    }
}
