//! Before/after naming previews

mod samples;
pub mod sanitize;

pub use samples::{
    AUDIO_PATTERNS, BuiltinSamples, DEFAULT_MAX_SAMPLES, DirectorySamples, SampleFile,
    SampleProvider, metadata_from_filename,
};

use tracing::trace;

use crate::error::ValidationError;
use crate::script::ScriptEngine;
use crate::settings::RenamingSettings;

/// One preview row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewPair {
    pub row: usize,
    pub before: String,
    pub after: Result<String, ValidationError>,
}

impl PreviewPair {
    /// Text for the "after" list; errors are shown in place of the name
    pub fn after_text(&self) -> String {
        match &self.after {
            Ok(name) => name.clone(),
            Err(e) => e.to_string(),
        }
    }
}

/// Option values previewed without touching the settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewOverride {
    pub ascii_filenames: Option<bool>,
    pub windows_compatibility: Option<bool>,
    pub rename_enabled: Option<bool>,
    pub move_enabled: Option<bool>,
    pub move_destination: Option<String>,
    pub naming_format: Option<String>,
}

impl PreviewOverride {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Snapshot of the toggles currently shown on the page
    pub fn from_settings(settings: &RenamingSettings) -> Self {
        Self {
            ascii_filenames: Some(settings.ascii_filenames),
            windows_compatibility: Some(settings.windows_compatibility),
            rename_enabled: Some(settings.rename_enabled),
            move_enabled: Some(settings.move_enabled),
            move_destination: Some(sanitize::normalize_path(&settings.move_destination)),
            naming_format: None,
        }
    }
}

/// Settings with overrides applied, borrowed for one computation
struct Effective<'a> {
    ascii_filenames: bool,
    windows_compatibility: bool,
    rename_enabled: bool,
    move_enabled: bool,
    move_destination: &'a str,
    naming_format: &'a str,
}

impl<'a> Effective<'a> {
    fn merge(settings: &'a RenamingSettings, overrides: &'a PreviewOverride) -> Self {
        Self {
            ascii_filenames: overrides.ascii_filenames.unwrap_or(settings.ascii_filenames),
            windows_compatibility: overrides
                .windows_compatibility
                .unwrap_or(settings.windows_compatibility),
            rename_enabled: overrides.rename_enabled.unwrap_or(settings.rename_enabled),
            move_enabled: overrides.move_enabled.unwrap_or(settings.move_enabled),
            move_destination: overrides
                .move_destination
                .as_deref()
                .unwrap_or(&settings.move_destination),
            naming_format: overrides
                .naming_format
                .as_deref()
                .unwrap_or(&settings.naming_format),
        }
    }
}

/// Computes what sample files would be renamed to
pub struct PreviewEngine<E> {
    engine: E,
}

impl<E: ScriptEngine> PreviewEngine<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// One pair per sample, in sample order.
    ///
    /// A failing sample only affects its own row.
    pub fn compute_examples(
        &self,
        settings: &RenamingSettings,
        overrides: &PreviewOverride,
        samples: &[SampleFile],
    ) -> Vec<PreviewPair> {
        let effective = Effective::merge(settings, overrides);
        trace!(samples = samples.len(), "Computing naming preview");

        samples
            .iter()
            .enumerate()
            .map(|(row, sample)| PreviewPair {
                row,
                before: sample.display_name().to_string(),
                after: self.render(&effective, sample),
            })
            .collect()
    }

    fn render(
        &self,
        options: &Effective<'_>,
        sample: &SampleFile,
    ) -> Result<String, ValidationError> {
        let original_name = sample.file_name();
        if !options.rename_enabled && !options.move_enabled {
            return Ok(original_name.to_string());
        }

        let metadata =
            sanitize::path_safe_metadata(&sample.metadata, options.windows_compatibility);
        let evaluated = self
            .engine
            .evaluate(options.naming_format, &metadata)
            .map_err(|e| ValidationError::ScriptSyntax {
                message: e.to_string(),
            })?;

        let mut formatted = sanitize::strip_control(&evaluated);
        if options.ascii_filenames {
            formatted = sanitize::to_ascii(&formatted);
        }
        if options.windows_compatibility {
            formatted = sanitize::windows_compatible(&formatted);
        }

        let (script_dir, script_name) = formatted
            .rsplit_once('/')
            .unwrap_or(("", formatted.as_str()));

        let name = if options.rename_enabled && !script_name.trim().is_empty() {
            match sample.extension() {
                Some(ext) => format!("{script_name}.{ext}"),
                None => script_name.to_string(),
            }
        } else {
            original_name.to_string()
        };

        if options.move_enabled {
            let joined = format!("{}/{}/{}", options.move_destination, script_dir, name);
            Ok(sanitize::normalize_path(&joined))
        } else {
            Ok(name)
        }
    }
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;
    use crate::script::{Metadata, TaggerScript};
    use crate::settings::PlatformDefaults;

    fn settings(format: &str) -> RenamingSettings {
        let mut s = RenamingSettings::defaults(&PlatformDefaults {
            requires_windows_compatibility: false,
            music_dir: "/music".to_string(),
            naming_format: format.to_string(),
        });
        s.windows_compatibility = false;
        s
    }

    fn samples() -> Vec<SampleFile> {
        BuiltinSamples::default().samples().to_vec()
    }

    fn afters(pairs: &[PreviewPair]) -> Vec<String> {
        pairs.iter().map(PreviewPair::after_text).collect()
    }

    fn engine() -> PreviewEngine<TaggerScript> {
        PreviewEngine::new(TaggerScript::new())
    }

    #[test]
    fn test_nothing_enabled_keeps_names() {
        let pairs = engine().compute_examples(
            &settings("%title%"),
            &PreviewOverride::default(),
            &samples(),
        );
        assert_eq!(
            afters(&pairs),
            vec!["track01.mp3", "05 Beach.flac", "Café Liégeois.ogg"]
        );
        assert_eq!(pairs[1].before, "compilation/05 Beach.flac");
    }

    #[test]
    fn test_rename_only_uses_last_component() {
        let mut s = settings("%artist%/%title%");
        s.rename_enabled = true;
        let pairs = engine().compute_examples(&s, &PreviewOverride::default(), &samples());
        assert_eq!(
            afters(&pairs),
            vec!["Morning.mp3", "Beach: Day_Night?.flac", "Café Liégeois.ogg"]
        );
    }

    #[test]
    fn test_move_joins_destination() {
        let mut s = settings("%artist%/%title%");
        s.move_enabled = true;
        s.move_destination = "/music//library/".to_string();
        let pairs = engine().compute_examples(&s, &PreviewOverride::default(), &samples());
        assert_eq!(pairs[0].after_text(), "/music/library/The Example Band/track01.mp3");
    }

    #[test]
    fn test_rename_and_move_with_sanitizing() {
        let mut s = settings("%artist%/%title%");
        s.rename_enabled = true;
        s.move_enabled = true;
        s.ascii_filenames = true;
        s.windows_compatibility = true;
        let pairs = engine().compute_examples(&s, &PreviewOverride::default(), &samples());
        assert_eq!(
            afters(&pairs),
            vec![
                "/music/The Example Band/Morning.mp3",
                "/music/Solo Artist/Beach_ Day_Night_.flac",
                "/music/Emile Deja/Cafe Liegeois.ogg",
            ]
        );
    }

    #[test]
    fn test_overrides_do_not_mutate_settings() {
        let mut s = settings("%title%");
        s.rename_enabled = true;
        let before = s.clone();

        let overrides = PreviewOverride {
            ascii_filenames: Some(true),
            ..Default::default()
        };
        let pairs = engine().compute_examples(&s, &overrides, &samples());
        assert_eq!(pairs[2].after_text(), "Cafe Liegeois.ogg");
        assert_eq!(s, before);

        let pairs = engine().compute_examples(&s, &PreviewOverride::default(), &samples());
        assert_eq!(pairs[2].after_text(), "Café Liégeois.ogg");
    }

    #[test]
    fn test_format_override() {
        let mut s = settings("%title%");
        s.rename_enabled = true;
        let overrides = PreviewOverride {
            naming_format: Some("$upper(%title%)".to_string()),
            ..Default::default()
        };
        let pairs = engine().compute_examples(&s, &overrides, &samples());
        assert_eq!(pairs[0].after_text(), "MORNING.mp3");
    }

    #[test]
    fn test_script_error_is_per_row() {
        struct FailOnSecond;
        impl ScriptEngine for FailOnSecond {
            fn evaluate(
                &self,
                _script: &str,
                md: &Metadata,
            ) -> Result<String, crate::script::ScriptError> {
                match md.get("title").map(String::as_str) {
                    Some("Beach: Day_Night?") => Err(crate::script::ScriptError::new(1, "boom")),
                    Some(title) => Ok(title.to_string()),
                    None => Ok(String::new()),
                }
            }
        }

        let mut s = settings("%title%");
        s.rename_enabled = true;
        let pairs = PreviewEngine::new(FailOnSecond).compute_examples(
            &s,
            &PreviewOverride::default(),
            &samples(),
        );
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].after, Ok("Morning.mp3".to_string()));
        assert!(matches!(pairs[1].after, Err(ValidationError::ScriptSyntax { .. })));
        assert_eq!(pairs[2].after, Ok("Café Liégeois.ogg".to_string()));
    }

    #[test]
    fn test_deterministic_and_paired() {
        let mut s = settings(crate::settings::DEFAULT_FILE_NAMING_FORMAT);
        s.rename_enabled = true;
        s.move_enabled = true;
        let e = engine();
        let first = e.compute_examples(&s, &PreviewOverride::default(), &samples());
        let second = e.compute_examples(&s, &PreviewOverride::default(), &samples());
        assert_eq!(first, second);

        let mut reversed = samples();
        reversed.reverse();
        let flipped = e.compute_examples(&s, &PreviewOverride::default(), &reversed);
        for (i, pair) in flipped.iter().enumerate() {
            assert_eq!(pair.row, i);
            let original = &first[first.len() - 1 - i];
            assert_eq!(pair.before, original.before);
            assert_eq!(pair.after, original.after);
        }
    }

    #[test]
    fn test_default_format_preview() {
        let mut s = settings(crate::settings::DEFAULT_FILE_NAMING_FORMAT);
        s.rename_enabled = true;
        s.move_enabled = true;
        let pairs = engine().compute_examples(&s, &PreviewOverride::default(), &samples());
        assert_eq!(pairs[0].after_text(), "/music/The Example Band/First Light/01 Morning.mp3");
        assert_eq!(
            pairs[1].after_text(),
            "/music/Various Artists/Summer Compilation/2-05 Solo Artist - Beach: Day_Night?.flac"
        );
    }

    #[test]
    fn test_override_snapshot() {
        let mut s = settings("%title%");
        s.move_destination = "/music/./a/".to_string();
        let snapshot = PreviewOverride::from_settings(&s);
        assert_eq!(snapshot.move_destination.as_deref(), Some("/music/a"));
        assert!(!snapshot.is_empty());
        assert!(PreviewOverride::default().is_empty());
    }
}
