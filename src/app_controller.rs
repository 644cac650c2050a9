use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use log::{info, warn};

use crate::app_config::Config;
use crate::cue_sheet;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::language_profiles::{self, ModelSize};
use crate::media_tools::MediaToolkit;
use crate::model_manager::{self, ModelManager};
use crate::recognizer::{self, Recognizer};
use crate::segment_table;
use crate::segmenter::{self, ChapterSegment};
use crate::transcript::Transcript;

// @module: Pipeline orchestrator
//
// One run walks a fixed state sequence: metadata, cover art, optional model
// resolve, timecodes (from an existing ledger OR transcription+segmentation,
// never both), optional ledger write, split (or m4b mux), reconciliation.
// Failures abort the run with their class's exit code; files already
// produced are never rolled back.

/// Everything one run needs, resolved up front from CLI and config
#[derive(Debug)]
pub struct RunOptions {
    /// Path to the monolithic audiobook file
    pub audiobook: PathBuf,

    /// Resolved language code (already validated)
    pub language: String,

    /// Recognizer model size class
    pub model_size: ModelSize,

    /// Whether a missing model may be downloaded
    pub download_model: bool,

    /// Enable experimental soft-section-header detection
    pub use_experimental: bool,

    /// Pre-existing transcript artifact in a non-default location
    pub timecodes_file: Option<PathBuf>,

    /// Resolved cue file path; may not exist yet
    pub cue_file: Option<PathBuf>,

    /// Whether a missing cue file should be created after segmentation
    pub write_cue: bool,

    /// User-supplied metadata fields; win over extracted values
    pub metadata_overrides: HashMap<String, String>,

    /// User-supplied cover art path
    pub cover_art: Option<PathBuf>,

    /// Produce a single chaptered m4b instead of split mp3 files
    pub m4b: bool,
}

/// Main application controller for audiobook chapterization
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Transcoder handle
    toolkit: MediaToolkit,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Self {
        let toolkit = MediaToolkit::new(&config.ffmpeg_path, &config.ffprobe_path);
        Controller { config, toolkit }
    }

    /// Run the full chapterization workflow for one audiobook
    pub async fn run(&self, options: RunOptions) -> Result<(), AppError> {
        let start_time = std::time::Instant::now();
        let audiobook = &options.audiobook;

        // Only mp3 sources are handled for now; the splitter relies on
        // ID3-tagged stream copies
        let is_mp3 = audiobook
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("mp3"));
        if !is_mp3 {
            return Err(AppError::UnsupportedFormat(audiobook.clone()));
        }

        // Metadata: extracted fields merged under user-supplied ones
        let mut metadata = self
            .toolkit
            .extract_metadata(audiobook)
            .await
            .map_err(|e| AppError::Transcoder(e.to_string()))?;
        for (key, value) in &options.metadata_overrides {
            metadata.insert(key.clone(), value.clone());
        }
        if !metadata.is_empty() {
            info!("Tag fields for output files: {:?}", sorted_keys(&metadata));
        }

        // Cover art: user path wins, extraction is the fallback
        let cover_art = match &options.cover_art {
            Some(path) if path.exists() => Some(path.clone()),
            Some(path) => {
                warn!("Cover art path does not exist, ignoring: {:?}", path);
                None
            }
            None => self
                .toolkit
                .extract_cover_art(audiobook)
                .await
                .map_err(|e| AppError::Transcoder(e.to_string()))?,
        };

        // Timecodes: an existing ledger wins outright; otherwise transcribe
        // and segment
        let existing_cue = options
            .cue_file
            .as_deref()
            .filter(|path| FileManager::file_exists(path));

        let segments = match existing_cue {
            Some(cue_path) => {
                info!("Reading chapter timecodes from cue file {:?}", cue_path);
                cue_sheet::read(cue_path).map_err(AppError::LedgerRead)?
            }
            None => self.derive_segments(&options).await?,
        };

        // Segment table for human review
        println!("\n{}", segment_table::render(&segments));

        // Persist the ledger when requested and not already present
        match options.cue_file.as_deref() {
            Some(cue_path) if !cue_path.exists() && options.write_cue => {
                let source_name = audiobook
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                cue_sheet::write(&segments, &source_name, cue_path)
                    .map_err(AppError::LedgerWrite)?;
                info!("Cue file created at {:?}", cue_path);
            }
            Some(cue_path) if cue_path.exists() => {
                info!(
                    "An existing cue file was found at {:?}; move, delete, or rename it to generate a new one",
                    cue_path
                );
            }
            _ => {}
        }

        if options.m4b {
            self.mux_m4b(&options, &segments, &metadata, cover_art.as_deref())
                .await?;
        } else {
            self.split_and_reconcile(&options, &segments, &metadata, cover_art.as_deref())
                .await?;
        }

        info!(
            "Finished in {}",
            format_duration(start_time.elapsed())
        );
        Ok(())
    }

    /// Transcribe (or reuse the cached transcript) and segment
    async fn derive_segments(&self, options: &RunOptions) -> Result<Vec<ChapterSegment>, AppError> {
        let profile = language_profiles::profile_for(&options.language)
            .ok_or_else(|| AppError::InvalidLanguage(options.language.clone()))?;

        let transcript = self.obtain_transcript(options).await?;

        // The m4b mux needs a hard end bound on the last chapter
        let final_duration = if options.m4b {
            Some(
                self.toolkit
                    .probe_duration(&options.audiobook)
                    .await
                    .map_err(|e| AppError::Transcoder(e.to_string()))?,
            )
        } else {
            None
        };

        let segments = segmenter::segment(
            &transcript.cues,
            profile,
            options.use_experimental,
            final_duration.as_deref(),
        )?;
        info!("Segmentation found {} chapters", segments.len());
        Ok(segments)
    }

    /// Produce or reuse the transcript artifact for the audiobook
    async fn obtain_transcript(&self, options: &RunOptions) -> Result<Transcript, AppError> {
        let artifact = options
            .timecodes_file
            .clone()
            .unwrap_or_else(|| options.audiobook.with_extension("srt"));

        if FileManager::file_has_content(&artifact) {
            info!("An existing transcript artifact was found: {:?}", artifact);
            return Transcript::read_srt_file(&artifact)
                .map_err(|e| AppError::Transcription(e.to_string()));
        }

        let spec = language_profiles::model_for(&options.language, options.model_size)?;
        let model_dir = model_manager::model_dir_from_config(self.config.model_dir.as_deref())
            .map_err(|e| AppError::Config(e.to_string()))?;
        let manager = ModelManager::new(model_dir);
        let model_path = manager.resolve(&spec, options.download_model).await?;

        info!(
            "Transcribing with the {} model; this takes a while",
            options.model_size
        );
        let recognizer = Recognizer::new(&model_path, spec.recognizer_language)
            .map_err(|e| AppError::Transcription(e.to_string()))?;
        recognizer::transcribe_to_file(&recognizer, &self.toolkit, &options.audiobook, &artifact)
            .map_err(|e| AppError::Transcription(e.to_string()))
    }

    /// Split into per-chapter files and compare produced vs. expected counts
    async fn split_and_reconcile(
        &self,
        options: &RunOptions,
        segments: &[ChapterSegment],
        metadata: &HashMap<String, String>,
        cover_art: Option<&std::path::Path>,
    ) -> Result<(), AppError> {
        let outcome = self
            .toolkit
            .split_chapters(&options.audiobook, segments, metadata, cover_art)
            .await
            .map_err(|e| AppError::Transcoder(e.to_string()))?;

        if outcome.failed > 0 {
            warn!("{} chapter(s) failed to split; see ffmpeg_log.txt", outcome.failed);
        }

        let produced = FileManager::count_sibling_output_files(&options.audiobook, "mp3")
            .unwrap_or(outcome.produced);
        let expected = segments.len();
        if produced >= expected {
            info!("Audiobook split into {} files", produced);
        } else {
            warn!(
                "{} files were generated, which is less than the expected {}",
                produced, expected
            );
        }
        Ok(())
    }

    /// Mux a single chaptered m4b container
    async fn mux_m4b(
        &self,
        options: &RunOptions,
        segments: &[ChapterSegment],
        metadata: &HashMap<String, String>,
        cover_art: Option<&std::path::Path>,
    ) -> Result<(), AppError> {
        // Timecodes read from a ledger leave the final chapter open-ended;
        // container chapters need a hard end bound, so close it with the
        // probed total duration
        let mut segments = segments.to_vec();
        if let Some(last) = segments.last_mut() {
            if last.end.is_none() {
                let duration = self
                    .toolkit
                    .probe_duration(&options.audiobook)
                    .await
                    .map_err(|e| AppError::Transcoder(e.to_string()))?;
                last.end = Some(duration);
            }
        }

        let chapters_path = options.audiobook.with_extension("chapters.txt");
        self.toolkit
            .write_chapter_metadata(&chapters_path, &segments, metadata)
            .map_err(|e| AppError::Transcoder(e.to_string()))?;

        let out_path = self
            .toolkit
            .convert_to_m4b(&options.audiobook, &chapters_path, cover_art)
            .await
            .map_err(|e| AppError::Transcoder(e.to_string()))?;
        info!("Chaptered container written to {:?}", out_path);
        Ok(())
    }
}

fn sorted_keys(map: &HashMap<String, String>) -> Vec<&str> {
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}

fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
