//! File naming options page controller

mod events;
mod state;

pub use events::{EditError, ScriptEditorEvent, SettingsEdit};
pub use state::{FieldStates, PageState};

use tracing::{debug, info, warn};

use crate::config::{ConfigStore, SECTION};
use crate::error::OptionsError;
use crate::preview::{PreviewEngine, PreviewOverride, PreviewPair, SampleProvider, sanitize};
use crate::script::ScriptEngine;
use crate::settings::{PlatformDefaults, RenamingSettings};
use crate::sync::{ScriptEditor, ScriptSelectionBinding, SelectorModel};
use crate::validate::FormatValidator;

/// Application-wide indicators that mirror the saved toggles
pub trait HostNotifier {
    fn renaming_enabled_changed(&mut self, enabled: bool);

    fn moving_enabled_changed(&mut self, enabled: bool);
}

/// Host without indicators
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl HostNotifier for NoopHost {
    fn renaming_enabled_changed(&mut self, _enabled: bool) {}

    fn moving_enabled_changed(&mut self, _enabled: bool) {}
}

/// Called after every recomputation with the settings and the fresh preview
pub type Subscriber = Box<dyn FnMut(&RenamingSettings, &[PreviewPair])>;

/// Drives one options page session: load, edit, check, save
pub struct RenamingOptionsController<S, E, P> {
    store: S,
    engine: E,
    samples: P,
    platform: PlatformDefaults,
    state: PageState,
    settings: Option<RenamingSettings>,
    /// Settings as read by the last `load()` or `save()`
    loaded: Option<RenamingSettings>,
    fields: FieldStates,
    preview: Vec<PreviewPair>,
    error_text: Option<String>,
    binding: ScriptSelectionBinding,
    subscribers: Vec<Subscriber>,
}

impl<S, E, P> RenamingOptionsController<S, E, P>
where
    S: ConfigStore,
    E: ScriptEngine,
    P: SampleProvider,
{
    pub fn new(store: S, engine: E, samples: P, platform: PlatformDefaults) -> Self {
        Self {
            store,
            engine,
            samples,
            platform,
            state: PageState::default(),
            settings: None,
            loaded: None,
            fields: FieldStates::default(),
            preview: Vec::new(),
            error_text: None,
            binding: ScriptSelectionBinding::default(),
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn settings(&self) -> Option<&RenamingSettings> {
        self.settings.as_ref()
    }

    pub fn fields(&self) -> FieldStates {
        self.fields
    }

    pub fn preview(&self) -> &[PreviewPair] {
        &self.preview
    }

    /// Inline naming format error from the last `test()`
    pub fn error_text(&self) -> Option<&str> {
        self.error_text.as_deref()
    }

    pub fn selector(&self) -> &SelectorModel {
        self.binding.selector()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn samples(&self) -> &P {
        &self.samples
    }

    /// Whether the platform forces Windows-compatible names
    pub fn windows_locked(&self) -> bool {
        self.platform.requires_windows_compatibility
    }

    /// Register a listener for settings and preview changes
    pub fn subscribe(
        &mut self,
        subscriber: impl FnMut(&RenamingSettings, &[PreviewPair]) + 'static,
    ) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Read all options from the store and compute the first preview
    pub fn load(&mut self) -> Result<(), OptionsError> {
        let settings = RenamingSettings::load(&self.store, &self.platform)?;
        self.binding = ScriptSelectionBinding::new(&settings);
        self.loaded = Some(settings.clone());
        self.settings = Some(settings);
        self.state = PageState::Loaded;
        self.error_text = None;
        info!("Loaded file naming options");
        self.recompute();
        Ok(())
    }

    /// Drop unsaved edits
    pub fn discard(&mut self) {
        if !self.state.is_loaded() {
            return;
        }
        if self.state == PageState::Editing {
            debug!("Discarding unsaved file naming options");
        }
        self.settings = None;
        self.loaded = None;
        self.preview.clear();
        self.fields = FieldStates::default();
        self.error_text = None;
        self.state = PageState::Unloaded;
    }

    /// Apply one option change and refresh derived state and preview
    pub fn apply(&mut self, edit: SettingsEdit) -> Result<(), OptionsError> {
        let locked = self.windows_locked();
        let settings = self.settings.as_mut().ok_or(OptionsError::NotLoaded)?;

        if !edit.apply_to(settings, locked) {
            return Ok(());
        }

        self.state = PageState::Editing;
        self.test();
        self.recompute();
        Ok(())
    }

    /// Preview a what-if combination without changing the settings
    pub fn preview_with(
        &self,
        overrides: &PreviewOverride,
    ) -> Result<Vec<PreviewPair>, OptionsError> {
        let settings = self.settings.as_ref().ok_or(OptionsError::NotLoaded)?;
        Ok(PreviewEngine::new(&self.engine).compute_examples(
            settings,
            overrides,
            self.samples.samples(),
        ))
    }

    /// Re-fetch sample files and recompute the preview
    pub fn refresh_samples(&mut self) -> Result<(), OptionsError> {
        self.samples.refresh().map_err(OptionsError::Samples)?;
        self.recompute();
        Ok(())
    }

    /// The user picked a script in the inline selector
    pub fn selector_changed(
        &mut self,
        id: &str,
        editor: Option<&mut dyn ScriptEditor>,
    ) -> Result<bool, OptionsError> {
        let settings = self.settings.as_mut().ok_or(OptionsError::NotLoaded)?;
        let changed = self.binding.selector_changed(settings, id, editor);
        if changed {
            self.state = PageState::Editing;
            self.test();
            self.recompute();
        }
        Ok(changed)
    }

    /// Handle a notification from the script editor.
    ///
    /// Returns the refreshed selector when the local selector must be redrawn.
    pub fn editor_event(
        &mut self,
        event: ScriptEditorEvent,
    ) -> Result<Option<SelectorModel>, OptionsError> {
        let settings = self.settings.as_mut().ok_or(OptionsError::NotLoaded)?;

        let selector = match event {
            ScriptEditorEvent::Saved(text) => {
                settings.naming_format = text;
                self.state = PageState::Editing;
                self.test();
                None
            }
            ScriptEditorEvent::Updated => None,
            ScriptEditorEvent::SelectionChanged(id) => {
                let Some(selector) = self.binding.editor_selection_changed(settings, &id) else {
                    return Ok(None);
                };
                let selector = selector.clone();
                self.state = PageState::Editing;
                self.test();
                Some(selector)
            }
            ScriptEditorEvent::ScriptsChanged(scripts) => {
                let selector = self.binding.editor_scripts_changed(settings, scripts).clone();
                self.state = PageState::Editing;
                Some(selector)
            }
        };

        self.recompute();
        Ok(selector)
    }

    /// Validate everything; all problems are reported together
    pub fn check(&self) -> Result<(), OptionsError> {
        let settings = self.settings.as_ref().ok_or(OptionsError::NotLoaded)?;
        FormatValidator::new(&self.engine).check_all(settings)?;
        Ok(())
    }

    /// Validate the naming format for inline display; never fails
    pub fn test(&mut self) -> Option<&str> {
        self.error_text = self.settings.as_ref().and_then(|settings| {
            FormatValidator::new(&self.engine)
                .validate(&settings.naming_format, settings.rename_enabled)
                .err()
                .map(|e| e.to_string())
        });
        self.error_text.as_deref()
    }

    /// Validate, then write every option in one batch and update the host
    pub fn save(&mut self, host: &mut dyn HostNotifier) -> Result<(), OptionsError> {
        let current = self.settings.as_ref().ok_or(OptionsError::NotLoaded)?;

        let mut saved = current.clone();
        saved.naming_format = saved.naming_format.trim().to_string();
        FormatValidator::new(&self.engine).check_all(&saved)?;
        saved.move_destination = sanitize::normalize_path(&saved.move_destination);

        // Values equivalent to what was read are written back verbatim
        if let Some(loaded) = &self.loaded {
            if loaded.naming_format.trim() == saved.naming_format {
                saved.naming_format = loaded.naming_format.clone();
            }
            if sanitize::normalize_path(&loaded.move_destination) == saved.move_destination {
                saved.move_destination = loaded.move_destination.clone();
            }
        }

        self.store.set_all(SECTION, saved.to_values())?;

        host.renaming_enabled_changed(saved.rename_enabled);
        host.moving_enabled_changed(saved.move_enabled);

        info!(
            rename = saved.rename_enabled,
            move_files = saved.move_enabled,
            "Saved file naming options"
        );
        self.loaded = Some(saved.clone());
        self.settings = Some(saved);
        self.state = PageState::Saved;
        Ok(())
    }

    fn recompute(&mut self) {
        let Some(settings) = self.settings.as_ref() else {
            return;
        };

        self.fields = FieldStates::derive(settings, self.platform.requires_windows_compatibility);
        self.preview = PreviewEngine::new(&self.engine).compute_examples(
            settings,
            &PreviewOverride::from_settings(settings),
            self.samples.samples(),
        );

        let failures = self.preview.iter().filter(|p| p.after.is_err()).count();
        if failures > 0 {
            warn!("{} of {} preview rows failed to render", failures, self.preview.len());
        }

        for subscriber in &mut self.subscribers {
            subscriber(settings, &self.preview);
        }
    }
}
