// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::app_config::{Config, LogLevel};
use crate::app_controller::{Controller, RunOptions};
use crate::errors::AppError;
use crate::language_profiles::ModelSize;

mod app_config;
mod app_controller;
mod cue_sheet;
mod errors;
mod file_utils;
mod language_profiles;
mod media_tools;
mod model_manager;
mod recognizer;
mod segment_table;
mod segmenter;
mod timecode;
mod transcript;

/// CLI Wrapper for ModelSize to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliModelSize {
    Small,
    Large,
}

impl From<CliModelSize> for ModelSize {
    fn from(cli_size: CliModelSize) -> Self {
        match cli_size {
            CliModelSize::Small => ModelSize::Small,
            CliModelSize::Large => ModelSize::Large,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for chapterize
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// chapterize - split a monolithic audiobook into chapter files
///
/// Chapter boundaries are detected from a machine transcription of the
/// recording; metadata and cover art are carried over from the source file,
/// with any user supplied values taking precedence on conflict.
#[derive(Parser, Debug)]
#[command(name = "chapterize")]
#[command(version = "0.5.0")]
#[command(about = "Speech-driven audiobook chapter splitter")]
#[command(long_about = "chapterize transcribes a monolithic audiobook, detects chapter \
boundaries from marker phrases, and splits the recording into one tagged file per chapter.

EXAMPLES:
    chapterize book.mp3                          # Chapterize with defaults
    chapterize -l German -m large book.mp3       # German, large model
    chapterize --download-model book.mp3         # Fetch the model first if missing
    chapterize -w book.mp3                       # Also write an editable cue file
    chapterize --cue-path edited.cue book.mp3    # Use a hand-edited cue file
    chapterize --m4b book.mp3                    # One chaptered m4b instead of splits
    chapterize --list-languages                  # Show supported languages
    chapterize completions bash > chapterize.bash

CONFIGURATION:
    Configuration is stored in chapterize.json by default. You can specify a
    different file with --config-path. If the config file doesn't exist, a
    default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the audiobook file
    #[arg(value_name = "AUDIOBOOK_PATH")]
    audiobook: Option<PathBuf>,

    /// Model language to use (code or name, e.g. 'en-us' or 'German')
    #[arg(short, long)]
    language: Option<String>,

    /// Model size class to use when multiple models are available
    #[arg(short, long, value_enum)]
    model_size: Option<CliModelSize>,

    /// Download the model for the selected language if not present
    #[arg(long)]
    download_model: bool,

    /// List supported languages and exit
    #[arg(long)]
    list_languages: bool,

    /// Path to a previously generated transcript file in another directory
    #[arg(long, value_name = "TIMECODES_FILE")]
    timecodes_file: Option<PathBuf>,

    /// Path to cover art file
    #[arg(long, value_name = "COVER_ART_PATH")]
    cover_art: Option<PathBuf>,

    /// Author (saved as the album_artist and artist tags)
    #[arg(short, long)]
    author: Option<String>,

    /// Audiobook title (saved as the album tag)
    #[arg(short, long)]
    title: Option<String>,

    /// Narrator (saved as the composer tag)
    #[arg(short, long)]
    narrator: Option<String>,

    /// Audiobook genre; separate multiple genres with a semicolon
    #[arg(short, long, default_value = "Audiobook")]
    genre: String,

    /// Audiobook release year
    #[arg(short, long)]
    year: Option<String>,

    /// Audiobook comment
    #[arg(short, long)]
    comment: Option<String>,

    /// Book description
    #[arg(short, long)]
    description: Option<String>,

    /// Generate a cue file in the audiobook directory for editing chapter markers
    #[arg(short = 'w', long)]
    write_cue: bool,

    /// Path to a cue file in a non-default location
    #[arg(long, value_name = "CUE_PATH")]
    cue_path: Option<PathBuf>,

    /// Enable experimental detection of soft section headers (preface, foreword, ...)
    #[arg(long)]
    experimental: bool,

    /// Produce a single chaptered m4b container instead of split files
    #[arg(long)]
    m4b: bool,

    /// Configuration file path
    #[arg(long, default_value = "chapterize.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info by default; the level is adjusted once the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "chapterize", &mut std::io::stdout());
        return Ok(());
    }

    if cli.list_languages {
        println!("Supported languages and codes:");
        for (name, code) in language_profiles::supported_languages() {
            println!("  {:<14} {}", name, code);
        }
        return Ok(());
    }

    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }

    Ok(())
}

async fn run(options: CommandLineOptions) -> Result<(), AppError> {
    if let Some(cmd_level) = &options.log_level {
        let level: LogLevel = cmd_level.clone().into();
        log::set_max_level(level_filter(&level));
    }

    let config = load_config(&options).map_err(|e| AppError::Config(format!("{:#}", e)))?;
    config
        .validate()
        .map_err(|e| AppError::Config(format!("{:#}", e)))?;
    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    let audiobook = options
        .audiobook
        .clone()
        .ok_or_else(|| AppError::Config("AUDIOBOOK_PATH is required".to_string()))?;
    if !audiobook.exists() {
        return Err(AppError::Config(format!(
            "audiobook path does not exist: {:?}",
            audiobook
        )));
    }

    // Language comes from the CLI, then the config default
    let requested_language = options
        .language
        .clone()
        .unwrap_or_else(|| config.default_language.clone());
    let language = language_profiles::resolve_language(&requested_language)
        .map_err(|_| AppError::InvalidLanguage(requested_language.clone()))?;

    let model_size = options
        .model_size
        .clone()
        .map(ModelSize::from)
        .unwrap_or(config.default_model_size);

    let write_cue = options.write_cue || config.generate_cue_file;
    let cue_file = resolve_cue_file(&options, &config, &audiobook, write_cue);

    let run_options = RunOptions {
        audiobook,
        language: language.to_string(),
        model_size,
        download_model: options.download_model,
        use_experimental: options.experimental,
        timecodes_file: options.timecodes_file.clone(),
        cue_file,
        write_cue,
        metadata_overrides: collect_metadata_overrides(&options),
        cover_art: options.cover_art.clone(),
        m4b: options.m4b,
    };

    let controller = Controller::with_config(config);
    controller.run(run_options).await
}

/// Load the configuration file, creating a default one when absent
fn load_config(options: &CommandLineOptions) -> Result<Config> {
    let config_path = &options.config_path;
    if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;
        Ok(config)
    } else {
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to: {}", config_path))?;
        Ok(config)
    }
}

/// Resolve which cue file (if any) this run reads or writes.
///
/// Precedence: an explicit --cue-path, then the configured cue_path, then
/// the sidecar next to the audiobook whenever writing was requested or a
/// sidecar already exists.
fn resolve_cue_file(
    options: &CommandLineOptions,
    config: &Config,
    audiobook: &Path,
    write_cue: bool,
) -> Option<PathBuf> {
    if let Some(path) = &options.cue_path {
        info!("Reading cue file from custom path {:?}", path);
        return Some(path.clone());
    }

    if let Some(path) = &config.cue_path {
        if path.exists() {
            info!("Reading cue file from configured path {:?}", path);
            return Some(path.clone());
        }
        warn!("Configured cue file does not exist and will be skipped: {:?}", path);
    }

    let sidecar = audiobook.with_extension("cue");
    if write_cue || sidecar.exists() {
        let verb = if sidecar.exists() { "Reading" } else { "Writing" };
        info!("{} cue file at {:?}", verb, sidecar);
        return Some(sidecar);
    }

    None
}

fn collect_metadata_overrides(options: &CommandLineOptions) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    metadata.insert("genre".to_string(), options.genre.clone());
    if let Some(author) = &options.author {
        metadata.insert("album_artist".to_string(), author.clone());
    }
    if let Some(title) = &options.title {
        metadata.insert("album".to_string(), title.clone());
    }
    if let Some(year) = &options.year {
        metadata.insert("date".to_string(), year.clone());
    }
    if let Some(comment) = &options.comment {
        metadata.insert("comment".to_string(), comment.clone());
    }
    if let Some(description) = &options.description {
        metadata.insert("description".to_string(), description.clone());
    }
    if let Some(narrator) = &options.narrator {
        metadata.insert("composer".to_string(), narrator.clone());
    }
    metadata
}
