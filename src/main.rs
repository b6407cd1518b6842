//! Filenaming CLI
//!
//! Inspect, validate, preview and edit file naming options.

use anyhow::{Context, Result};
use clap::Parser;
use filenaming::options::{HostNotifier, RenamingOptionsController, SettingsEdit};
use filenaming::preview::{BuiltinSamples, DEFAULT_MAX_SAMPLES, DirectorySamples, SampleProvider};
use filenaming::{PlatformDefaults, PreviewOverride, TaggerScript, TomlStore};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "filenaming")]
#[command(author, version, about = "File naming options for tagged music files")]
struct Cli {
    /// Path to settings file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Show current options (default)
    Show,

    /// Validate the stored options
    Check,

    /// Preview how sample files would be named
    Preview {
        /// Directory to take sample files from (built-in examples otherwise)
        #[arg(short, long)]
        samples: Option<PathBuf>,

        /// Maximum number of samples
        #[arg(short, long, default_value_t = DEFAULT_MAX_SAMPLES)]
        max: usize,

        /// Naming format to try instead of the stored one
        #[arg(short, long)]
        format: Option<String>,

        /// Preview with renaming enabled
        #[arg(long)]
        rename: bool,

        /// Preview with ASCII-only file names
        #[arg(long)]
        ascii: bool,

        /// Preview with Windows-compatible file names
        #[arg(long)]
        windows: bool,

        /// Preview moving files to this directory
        #[arg(long, value_name = "DIR")]
        move_to: Option<String>,
    },

    /// Change an option and save it
    Set {
        /// Option key, e.g. rename_files or file_naming_format
        key: String,
        value: String,
    },

    /// List named naming scripts
    Scripts,

    /// Select a named naming script (empty id clears the selection)
    Select { id: String },
}

/// Reports indicator changes on stdout
struct CliHost;

impl HostNotifier for CliHost {
    fn renaming_enabled_changed(&mut self, enabled: bool) {
        println!("  Renaming: {}", on_off(enabled));
    }

    fn moving_enabled_changed(&mut self, enabled: bool) {
        println!("  Moving:   {}", on_off(enabled));
    }
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

type Controller = RenamingOptionsController<TomlStore, TaggerScript, Box<dyn SampleProvider>>;

fn open(config: Option<&std::path::Path>, samples: Box<dyn SampleProvider>) -> Result<Controller> {
    let store = TomlStore::open(config).context("Failed to open settings")?;
    let mut controller = RenamingOptionsController::new(
        store,
        TaggerScript::new(),
        samples,
        PlatformDefaults::detect(),
    );
    controller.load().context("Failed to load file naming options")?;
    Ok(controller)
}

fn builtin() -> Box<dyn SampleProvider> {
    Box::new(BuiltinSamples::default())
}

fn show(controller: &Controller) {
    let Some(s) = controller.settings() else {
        return;
    };
    println!("Settings: {}", controller.store().path().display());
    println!("  rename_files                   = {}", s.rename_enabled);
    println!("  move_files                     = {}", s.move_enabled);
    println!("  move_files_to                  = {}", s.move_destination);
    println!("  move_additional_files          = {}", s.move_additional_files);
    println!("  move_additional_files_pattern  = {}", s.move_additional_files_pattern);
    println!("  delete_empty_dirs              = {}", s.delete_empty_dirs);
    println!("  ascii_filenames                = {}", s.ascii_filenames);
    let lock = if controller.windows_locked() { " (locked)" } else { "" };
    println!("  windows_compatibility          = {}{}", s.windows_compatibility, lock);
    match s.selected_script() {
        Some(script) => println!(
            "  naming script                  = {} [{}]",
            script.title, script.id
        ),
        None => println!("  naming script                  = (inline format)"),
    }
    println!("  file_naming_format:");
    for line in s.naming_format.lines() {
        println!("    {}", line);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("FILENAMING_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        None | Some(Commands::Show) => {
            let controller = open(config, builtin())?;
            show(&controller);
        }
        Some(Commands::Check) => {
            let controller = open(config, builtin())?;
            match controller.check() {
                Ok(()) => println!("✓ File naming options are valid"),
                Err(e) if e.is_inline() => {
                    for error in e.validation_errors().into_iter().flat_map(|v| v.iter()) {
                        eprintln!("✗ {}", error);
                    }
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Some(Commands::Preview {
            samples,
            max,
            format,
            rename,
            ascii,
            windows,
            move_to,
        }) => {
            let provider: Box<dyn SampleProvider> = match samples {
                Some(dir) => {
                    let dir = filenaming::expand_path(&dir);
                    Box::new(
                        DirectorySamples::new(&dir, max)
                            .with_context(|| format!("Failed to sample {}", dir.display()))?,
                    )
                }
                None => Box::new(BuiltinSamples::new(max)),
            };
            let controller = open(config, provider)?;

            let overrides = PreviewOverride {
                rename_enabled: rename.then_some(true),
                ascii_filenames: ascii.then_some(true),
                windows_compatibility: windows.then_some(true),
                move_enabled: move_to.as_ref().map(|_| true),
                move_destination: move_to,
                naming_format: format,
            };
            let pairs = controller.preview_with(&overrides)?;

            if pairs.is_empty() {
                println!("No sample files");
            }
            for pair in pairs {
                match pair.after {
                    Ok(after) => println!("  {}\n    → {}", pair.before, after),
                    Err(e) => println!("  {}\n    ✗ {}", pair.before, e),
                }
            }
        }
        Some(Commands::Set { key, value }) => {
            let edit = SettingsEdit::parse(&key, &value)?;
            let mut controller = open(config, builtin())?;
            controller.apply(edit)?;
            controller.save(&mut CliHost)?;
            println!("✓ Saved {}", key);
        }
        Some(Commands::Scripts) => {
            let controller = open(config, builtin())?;
            let Some(settings) = controller.settings() else {
                return Ok(());
            };
            if settings.naming_scripts.is_empty() {
                println!("No named scripts");
            }
            let current = controller.selector().current;
            for (i, script) in settings.naming_scripts.iter().enumerate() {
                let marker = if current == Some(i) { "●" } else { " " };
                println!("  {} {} [{}]", marker, script.title, script.id);
            }
        }
        Some(Commands::Select { id }) => {
            let mut controller = open(config, builtin())?;
            if !controller.selector_changed(&id, None)? {
                anyhow::bail!("No change: unknown or already selected script '{}'", id);
            }
            controller.save(&mut CliHost)?;
            let label = if id.is_empty() {
                "(inline format)"
            } else {
                id.as_str()
            };
            println!("✓ Selected {}", label);
        }
    }

    Ok(())
}
