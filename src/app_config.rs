use std::default::Default;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::language_profiles::{self, ModelSize};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings. Values here are resolved
/// once at startup and passed explicitly into the controller; nothing reads
/// configuration from ambient global state afterwards.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Default recognizer language (code or friendly name)
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Default recognizer model size class
    #[serde(default)]
    pub default_model_size: ModelSize,

    /// Path to the ffmpeg binary ("ffmpeg" means resolve from PATH)
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// Path to the ffprobe binary ("ffprobe" means resolve from PATH)
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,

    /// Whether a cue file is generated next to the audiobook by default
    #[serde(default)]
    pub generate_cue_file: bool,

    /// Cue file in a non-default location
    #[serde(default)]
    pub cue_path: Option<PathBuf>,

    /// Directory holding downloaded recognizer models; defaults to the
    /// platform data directory when absent
    #[serde(default)]
    pub model_dir: Option<PathBuf>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl Config {
    /// Validate the configuration after loading and CLI overrides.
    ///
    /// An explicit ffmpeg/ffprobe path must exist on disk; the bare command
    /// names are left to PATH resolution at spawn time.
    pub fn validate(&self) -> Result<()> {
        language_profiles::resolve_language(&self.default_language)
            .map_err(|e| anyhow!("default_language: {}", e))?;

        if self.ffmpeg_path.is_empty() {
            return Err(anyhow!("ffmpeg_path must not be empty"));
        }
        if self.ffmpeg_path != default_ffmpeg_path() && !Path::new(&self.ffmpeg_path).exists() {
            return Err(anyhow!("ffmpeg path does not exist: {}", self.ffmpeg_path));
        }
        if self.ffprobe_path != default_ffprobe_path() && !Path::new(&self.ffprobe_path).exists() {
            return Err(anyhow!("ffprobe path does not exist: {}", self.ffprobe_path));
        }

        // A configured cue_path that has gone missing is only a warning at
        // run time (the transcription path still works), so it is not
        // validated here.

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            default_language: default_language(),
            default_model_size: ModelSize::default(),
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            generate_cue_file: false,
            cue_path: None,
            model_dir: None,
            log_level: LogLevel::default(),
        }
    }
}

fn default_language() -> String {
    "en-us".to_string()
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}
