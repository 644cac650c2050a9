/*!
 * # chapterize
 *
 * A Rust library for splitting monolithic audiobook recordings into one
 * file per chapter using speech-to-text boundary detection.
 *
 * ## Features
 *
 * - Detect chapter boundaries from a word-level transcript using
 *   per-language marker phrases with false-positive suppression
 * - Derive an ordered, non-overlapping, gap-free segment list with
 *   generated chapter titles
 * - Persist the segment list as a hand-editable cue sidecar file and read
 *   it back on later runs, bypassing re-transcription
 * - Carry forward or override descriptive tags and cover artwork
 * - Split losslessly per chapter, or mux a single chaptered m4b container
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `timecode`: sexagesimal timecode codec (text ⇄ milliseconds)
 * - `transcript`: recognizer cue model and subtitle-format parsing
 * - `language_profiles`: marker profiles and the recognizer model catalog
 * - `segmenter`: chapter boundary detection and segment derivation
 * - `cue_sheet`: cue sidecar (chapter ledger) codec
 * - `segment_table`: human-review rendering of the segment list
 * - `media_tools`: external transcoder (ffmpeg/ffprobe) plumbing
 * - `recognizer`: external speech recognizer (whisper.cpp)
 * - `model_manager`: recognizer model lookup and download
 * - `app_config`: configuration management
 * - `app_controller`: pipeline orchestration
 * - `errors`: custom error types and the exit-code taxonomy
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod cue_sheet;
pub mod errors;
pub mod file_utils;
pub mod language_profiles;
pub mod media_tools;
pub mod model_manager;
pub mod recognizer;
pub mod segment_table;
pub mod segmenter;
pub mod timecode;
pub mod transcript;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunOptions};
pub use errors::{AppError, LedgerError, ModelError, SegmenterError, TimecodeError};
pub use language_profiles::{LanguageProfile, ModelSize};
pub use segmenter::ChapterSegment;
pub use transcript::{Transcript, TranscriptCue};
