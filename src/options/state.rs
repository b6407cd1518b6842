//! Page lifecycle and derived field state

use crate::settings::RenamingSettings;

/// Lifecycle of one options page session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageState {
    /// Nothing loaded, or the session was discarded
    #[default]
    Unloaded,
    /// Settings read from the store, no edits yet
    Loaded,
    /// At least one edit since load or save
    Editing,
    /// Last edits were written to the store
    Saved,
}

impl PageState {
    pub fn is_loaded(&self) -> bool {
        !matches!(self, PageState::Unloaded)
    }
}

/// Which fields are meaningful for the current toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldStates {
    pub move_destination: bool,
    pub move_additional_files: bool,
    pub delete_empty_dirs: bool,
    pub script_editor: bool,
    pub ascii_filenames: bool,
    pub windows_compatibility: bool,
}

impl FieldStates {
    /// Derive enabled state from the settings.
    ///
    /// `windows_locked` is set when the platform forces Windows-compatible names.
    pub fn derive(settings: &RenamingSettings, windows_locked: bool) -> Self {
        let moving = settings.move_enabled;
        let naming = settings.naming_active();

        Self {
            move_destination: moving,
            move_additional_files: moving,
            delete_empty_dirs: moving,
            script_editor: naming,
            ascii_filenames: naming,
            windows_compatibility: naming && !windows_locked,
        }
    }
}
