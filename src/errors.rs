/*!
 * Error types for the chapterize application.
 *
 * This module contains custom error types for different parts of the
 * application, using the thiserror crate for ergonomic error definitions.
 * Every fatal error class maps to a distinct process exit code so callers
 * and wrapper scripts can react to failures without scraping log output.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the sexagesimal timecode codec
#[derive(Error, Debug)]
pub enum TimecodeError {
    /// The text does not match the `HH:MM:SS.mmm` pattern
    #[error("malformed timecode: '{0}'")]
    Malformed(String),

    /// Decrementing would move the timecode below `00:00:00.000`
    #[error("cannot decrement timecode '{0}' below zero")]
    Underflow(String),
}

/// Errors produced while deriving chapter segments from a transcript
#[derive(Error, Debug)]
pub enum SegmenterError {
    /// No boundary candidates were found; nothing to split
    #[error("no chapter boundaries were detected in the transcript")]
    EmptySegmentList,

    /// An end-time computation failed
    #[error("timecode error: {0}")]
    Timecode(#[from] TimecodeError),
}

/// Errors produced by the cue sheet (chapter ledger) codec
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Refusing to overwrite an existing cue file
    #[error("cue file already exists: {0}")]
    AlreadyExists(PathBuf),

    /// A required field could not be located while reading
    #[error("missing {field} line for track {track} in cue file")]
    MissingField {
        /// Field name (TITLE, START)
        field: &'static str,
        /// 1-based track number
        track: usize,
    },

    /// A stored timecode failed validation
    #[error("invalid timecode in cue file: {0}")]
    InvalidTimecode(#[from] TimecodeError),

    /// The file parsed but produced no tracks
    #[error("cue file contains no usable tracks: {0}")]
    Empty(PathBuf),

    /// Underlying filesystem failure
    #[error("cue file I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors around recognizer model selection and retrieval
#[derive(Error, Debug)]
pub enum ModelError {
    /// The language has no marker profile and cannot be chapterized
    #[error("language '{0}' is not supported")]
    UnsupportedLanguage(String),

    /// The language/size combination has no catalog entry
    #[error("no {size} model is available for language '{language}'")]
    UnsupportedSize {
        /// Requested language code
        language: String,
        /// Requested size class
        size: String,
    },

    /// The model archive could not be retrieved
    #[error("model download failed: {0}")]
    DownloadFailed(String),

    /// The model file is not on disk and downloading was not requested
    #[error("model '{0}' was not found locally; re-run with --download-model to fetch it")]
    NotFound(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration file or value problem
    #[error("configuration error: {0}")]
    Config(String),

    /// The requested language is unknown or unsupported
    #[error("invalid language: '{0}'")]
    InvalidLanguage(String),

    /// Model selection or retrieval failure
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// The external recognizer failed to produce a transcript
    #[error("transcription failed: {0}")]
    Transcription(String),

    /// A timecode could not be parsed or converted
    #[error("timecode error: {0}")]
    Timecode(#[from] TimecodeError),

    /// An existing cue file could not be parsed
    #[error("failed to read cue file: {0}")]
    LedgerRead(LedgerError),

    /// Segmentation produced no chapters
    #[error("{0}")]
    EmptyTimecodes(SegmenterError),

    /// The input container format is not handled
    #[error("unsupported input format: {0:?} (only .mp3 audiobooks are handled)")]
    UnsupportedFormat(PathBuf),

    /// A cue file could not be written
    #[error("failed to write cue file: {0}")]
    LedgerWrite(LedgerError),

    /// The external transcoder failed outright (not a per-chapter failure)
    #[error("transcoder error: {0}")]
    Transcoder(String),
}

impl AppError {
    /// Stable exit code for each failure class.
    ///
    /// Wrapper scripts match on these; the assignment is part of the CLI
    /// contract and must not be reshuffled between releases.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 1,
            AppError::InvalidLanguage(_) => 2,
            AppError::Model(ModelError::UnsupportedLanguage(_)) => 2,
            AppError::Model(ModelError::UnsupportedSize { .. }) => 3,
            AppError::Model(ModelError::NotFound(_)) => 3,
            AppError::Model(ModelError::DownloadFailed(_)) => 4,
            AppError::Transcription(_) => 5,
            AppError::Timecode(_) => 6,
            AppError::LedgerRead(_) => 7,
            AppError::EmptyTimecodes(_) => 8,
            AppError::UnsupportedFormat(_) => 9,
            AppError::LedgerWrite(_) => 10,
            AppError::Transcoder(_) => 11,
        }
    }
}

impl From<SegmenterError> for AppError {
    fn from(error: SegmenterError) -> Self {
        match error {
            SegmenterError::EmptySegmentList => AppError::EmptyTimecodes(error),
            SegmenterError::Timecode(e) => AppError::Timecode(e),
        }
    }
}
