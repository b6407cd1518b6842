//! Sample files shown in the naming preview

use glob::{MatchOptions, Pattern};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::script::Metadata;

/// Default number of samples shown in a preview
pub const DEFAULT_MAX_SAMPLES: usize = 10;

/// Audio files picked up when sampling a directory
pub const AUDIO_PATTERNS: &[&str] = &[
    "*.mp3", "*.flac", "*.ogg", "*.opus", "*.m4a", "*.wav", "*.wma", "*.aiff", "*.ape", "*.mpc",
];

/// `NN Artist - Title` with every part but the title optional
static FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<track>\d{1,3})[ ._-]+)?(?:(?P<artist>.+?) - )?(?P<title>.+?)$")
        .expect("invalid sample filename regex")
});

/// A file used only for previewing, never modified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFile {
    /// Path as shown in the "before" list
    pub path: String,
    pub metadata: Metadata,
}

impl SampleFile {
    pub fn new(path: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            path: path.into(),
            metadata,
        }
    }

    /// Name shown in the "before" list
    pub fn display_name(&self) -> &str {
        &self.path
    }

    /// Last path component
    pub fn file_name(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.path)
    }

    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.path).extension().and_then(|e| e.to_str())
    }
}

/// Supplies the bounded, ordered sample set for previews
pub trait SampleProvider {
    fn samples(&self) -> &[SampleFile];

    fn max_samples(&self) -> usize;

    /// Re-fetch the sample set
    fn refresh(&mut self) -> std::io::Result<()>;
}

impl<T: SampleProvider + ?Sized> SampleProvider for Box<T> {
    fn samples(&self) -> &[SampleFile] {
        (**self).samples()
    }

    fn max_samples(&self) -> usize {
        (**self).max_samples()
    }

    fn refresh(&mut self) -> std::io::Result<()> {
        (**self).refresh()
    }
}

fn metadata(pairs: &[(&str, &str)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Fixed example tracks used when no library files are available
#[derive(Debug, Clone)]
pub struct BuiltinSamples {
    samples: Vec<SampleFile>,
    max_samples: usize,
}

impl BuiltinSamples {
    pub fn new(max_samples: usize) -> Self {
        let mut samples = Self::examples();
        samples.truncate(max_samples);
        Self {
            samples,
            max_samples,
        }
    }

    fn examples() -> Vec<SampleFile> {
        vec![
            SampleFile::new(
                "track01.mp3",
                metadata(&[
                    ("albumartist", "The Example Band"),
                    ("artist", "The Example Band"),
                    ("album", "First Light"),
                    ("title", "Morning"),
                    ("tracknumber", "1"),
                    ("totaltracks", "10"),
                    ("discnumber", "1"),
                    ("totaldiscs", "1"),
                    ("date", "2019-04-12"),
                ]),
            ),
            SampleFile::new(
                "compilation/05 Beach.flac",
                metadata(&[
                    ("albumartist", "Various Artists"),
                    ("artist", "Solo Artist"),
                    ("album", "Summer Compilation"),
                    ("title", "Beach: Day/Night?"),
                    ("tracknumber", "5"),
                    ("discnumber", "2"),
                    ("totaldiscs", "2"),
                    ("compilation", "1"),
                    ("_multiartist", "1"),
                ]),
            ),
            SampleFile::new(
                "Café Liégeois.ogg",
                metadata(&[
                    ("artist", "Émile Déjà"),
                    ("title", "Café Liégeois"),
                    ("tracknumber", "2"),
                ]),
            ),
        ]
    }
}

impl Default for BuiltinSamples {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SAMPLES)
    }
}

impl SampleProvider for BuiltinSamples {
    fn samples(&self) -> &[SampleFile] {
        &self.samples
    }

    fn max_samples(&self) -> usize {
        self.max_samples
    }

    fn refresh(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Samples taken from audio files in one directory
#[derive(Debug, Clone)]
pub struct DirectorySamples {
    dir: PathBuf,
    patterns: Vec<Pattern>,
    max_samples: usize,
    samples: Vec<SampleFile>,
}

impl DirectorySamples {
    /// Scan `dir` for audio files
    pub fn new(dir: impl Into<PathBuf>, max_samples: usize) -> std::io::Result<Self> {
        Self::with_patterns(dir, max_samples, AUDIO_PATTERNS)
    }

    pub fn with_patterns(
        dir: impl Into<PathBuf>,
        max_samples: usize,
        patterns: &[&str],
    ) -> std::io::Result<Self> {
        let patterns = patterns
            .iter()
            .filter_map(|p| match Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Ignoring invalid sample pattern '{}': {}", p, e);
                    None
                }
            })
            .collect();

        let mut provider = Self {
            dir: dir.into(),
            patterns,
            max_samples,
            samples: Vec::new(),
        };
        provider.refresh()?;
        Ok(provider)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn matches(&self, filename: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: false,
            ..Default::default()
        };
        self.patterns
            .iter()
            .any(|p| p.matches_with(filename, options))
    }

    fn scan(&self) -> std::io::Result<Vec<SampleFile>> {
        let album = self
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string());

        let mut names: Vec<String> = std::fs::read_dir(&self.dir)?
            .flatten()
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| self.matches(name))
            .collect();

        names.sort();
        names.truncate(self.max_samples);

        Ok(names
            .into_iter()
            .map(|name| {
                let metadata = metadata_from_filename(&name, album.as_deref());
                SampleFile::new(name, metadata)
            })
            .collect())
    }
}

impl SampleProvider for DirectorySamples {
    fn samples(&self) -> &[SampleFile] {
        &self.samples
    }

    fn max_samples(&self) -> usize {
        self.max_samples
    }

    fn refresh(&mut self) -> std::io::Result<()> {
        self.samples = self.scan()?;
        debug!(
            "Sampled {} files from {}",
            self.samples.len(),
            self.dir.display()
        );
        Ok(())
    }
}

/// Guess tags from a file name like `03 Artist - Title.mp3`
pub fn metadata_from_filename(filename: &str, album: Option<&str>) -> Metadata {
    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    let mut md = Metadata::new();
    if let Some(caps) = FILENAME_RE.captures(stem) {
        if let Some(track) = caps.name("track") {
            md.insert("tracknumber".to_string(), track.as_str().to_string());
        }
        if let Some(artist) = caps.name("artist") {
            md.insert("artist".to_string(), artist.as_str().trim().to_string());
        }
        if let Some(title) = caps.name("title") {
            md.insert("title".to_string(), title.as_str().trim().to_string());
        }
    }
    if let Some(album) = album {
        md.insert("album".to_string(), album.to_string());
    }
    md.insert("_filename".to_string(), stem.to_string());
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        md.insert("_extension".to_string(), ext.to_string());
    }
    md
}
