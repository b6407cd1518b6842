//! Filenaming - file naming options for a media tagger
//!
//! Settings model, naming format validation and before/after previews for
//! renaming and moving tagged files. Widgets are left to the host; this crate
//! keeps the options consistent and tells the host what to show.

pub mod config;
pub mod error;
pub mod options;
pub mod preview;
pub mod script;
pub mod settings;
pub mod sync;
pub mod validate;

pub use config::{ConfigStore, MemoryStore, SettingValue, StoreError, TomlStore};
pub use error::{OptionsError, ValidationError, ValidationErrors};
pub use options::{HostNotifier, RenamingOptionsController, ScriptEditorEvent, SettingsEdit};
pub use preview::{PreviewEngine, PreviewOverride, PreviewPair, SampleFile, SampleProvider};
pub use script::{Metadata, ScriptEngine, ScriptError, TaggerScript};
pub use settings::{NamedScript, PlatformDefaults, RenamingSettings};
pub use sync::{ListView, ScriptEditor, SelectionSynchronizer};
pub use validate::FormatValidator;

/// Current version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Expand ~ and environment variables ($VAR, ${VAR}) in a path
pub fn expand_path(path: &std::path::Path) -> std::path::PathBuf {
    let path_str = path.to_string_lossy();

    // First expand ~ prefix
    let expanded = if let Some(stripped) = path_str.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            home.join(stripped).to_string_lossy().to_string()
        } else {
            path_str.to_string()
        }
    } else if path_str == "~" {
        if let Some(home) = dirs::home_dir() {
            home.to_string_lossy().to_string()
        } else {
            path_str.to_string()
        }
    } else {
        path_str.to_string()
    };

    // Then expand $VAR and ${VAR} patterns
    use std::sync::LazyLock;
    static ENV_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
        regex::Regex::new(r"\$\{([^}]+)\}|\$([A-Za-z_][A-Za-z0-9_]*)").expect("invalid env regex")
    });

    let result = ENV_RE.replace_all(&expanded, |caps: &regex::Captures| {
        let var_name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or("");
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    });

    std::path::PathBuf::from(result.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_expand_home() {
        if dirs::home_dir().is_none() {
            return;
        }
        let expanded = expand_path(Path::new("~/Music"));
        assert!(!expanded.to_string_lossy().contains('~'));
        assert!(expanded.ends_with("Music"));
    }

    #[test]
    fn test_unknown_variable_left_alone() {
        let expanded = expand_path(Path::new("/x/$FILENAMING_SURELY_UNSET_VAR/y"));
        assert_eq!(expanded, Path::new("/x/$FILENAMING_SURELY_UNSET_VAR/y"));
    }
}
