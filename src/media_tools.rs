use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use tokio::process::Command;

use crate::file_utils::FileManager;
use crate::segmenter::ChapterSegment;
use crate::timecode;

// @module: External transcoder (ffmpeg/ffprobe) plumbing
//
// Everything that shells out to the transcoder lives here: metadata and
// cover-art extraction, PCM demux for the recognizer, duration probing, the
// per-chapter split, and the chaptered m4b mux. The toolkit holds the binary
// paths resolved once from configuration.

// Metadata keys carried over from the source file's tag block
const CARRIED_METADATA_KEYS: &[&str] = &["title", "genre", "album_artist", "artist", "album", "date"];

// Recognizer input format: 16kHz mono signed 16-bit little-endian PCM
pub const PCM_SAMPLE_RATE: u32 = 16_000;

/// Tally of the per-chapter split pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitOutcome {
    /// Segments for which the transcoder produced a non-trivial output file
    pub produced: usize,

    /// Segments that failed (logged, never fatal to the batch)
    pub failed: usize,
}

/// Handle to the external transcoder binaries
pub struct MediaToolkit {
    ffmpeg: String,
    ffprobe: String,
}

impl MediaToolkit {
    /// Create a toolkit from resolved binary paths
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        MediaToolkit {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Extract the source file's textual metadata block.
    ///
    /// The transcoder dumps an ffmetadata block to a scratch file which is
    /// parsed for the carried keys and then discarded. Missing or empty
    /// metadata is normal and yields an empty map.
    pub async fn extract_metadata(&self, audiobook: &Path) -> Result<HashMap<String, String>> {
        let scratch = tempfile::Builder::new()
            .prefix("chapterize-meta-")
            .suffix(".txt")
            .tempfile()
            .context("Failed to create metadata scratch file")?;
        let scratch_path = scratch.path().to_path_buf();

        let output = Command::new(&self.ffmpeg)
            .args([
                "-y",
                "-loglevel",
                "quiet",
                "-i",
                audiobook.to_str().unwrap_or_default(),
                "-f",
                "ffmetadata",
                scratch_path.to_str().unwrap_or_default(),
            ])
            .output()
            .await
            .context("Failed to execute ffmpeg for metadata extraction")?;

        let mut metadata = HashMap::new();
        if output.status.success() && FileManager::file_has_content(&scratch_path) {
            let content = FileManager::read_to_string(&scratch_path)?;
            for line in content.lines() {
                if let Some((key, value)) = line.split_once('=') {
                    if CARRIED_METADATA_KEYS.contains(&key) {
                        metadata.insert(key.to_string(), value.to_string());
                    }
                }
            }
            info!("Metadata extraction complete ({} fields)", metadata.len());
        } else {
            warn!("Failed to parse metadata from source file, or none was found");
        }

        Ok(metadata)
    }

    /// Extract embedded cover art to a sibling jpg, if the source has any
    pub async fn extract_cover_art(&self, audiobook: &Path) -> Result<Option<PathBuf>> {
        let cover_path = audiobook.with_extension("jpg");

        let output = Command::new(&self.ffmpeg)
            .args([
                "-y",
                "-loglevel",
                "quiet",
                "-i",
                audiobook.to_str().unwrap_or_default(),
                "-an",
                "-c:v",
                "copy",
                cover_path.to_str().unwrap_or_default(),
            ])
            .output()
            .await
            .context("Failed to execute ffmpeg for cover art extraction")?;

        if output.status.success() && FileManager::file_has_content(&cover_path) {
            info!("Cover art extracted to {:?}", cover_path);
            Ok(Some(cover_path))
        } else {
            warn!("Failed to extract cover art, or none was found");
            Ok(None)
        }
    }

    /// Probe the recording's total duration as a `HH:MM:SS.mmm` timecode
    pub async fn probe_duration(&self, file: &Path) -> Result<String> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-i",
                file.to_str().unwrap_or_default(),
                "-show_entries",
                "format=duration",
                "-sexagesimal",
                "-v",
                "quiet",
                "-of",
                "csv=p=0",
            ])
            .output()
            .await
            .context("Failed to execute ffprobe for duration probe")?;

        if !output.status.success() {
            return Err(anyhow!(
                "ffprobe duration probe failed: {}",
                Self::filter_transcoder_stderr(&String::from_utf8_lossy(&output.stderr))
            ));
        }

        let raw = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if raw.is_empty() {
            return Err(anyhow!("ffprobe produced no duration for {:?}", file));
        }

        normalize_sexagesimal(&raw)
    }

    /// Spawn the PCM demux the recognizer consumes.
    ///
    /// Returns the child with a piped stdout carrying raw s16le samples; the
    /// pipe gives natural backpressure between the transcoder and the
    /// recognizer, no extra buffering policy on top.
    pub fn spawn_pcm_pipe(&self, audiobook: &Path) -> Result<std::process::Child> {
        let sample_rate = PCM_SAMPLE_RATE.to_string();
        std::process::Command::new(&self.ffmpeg)
            .args([
                "-loglevel",
                "quiet",
                "-i",
                audiobook.to_str().unwrap_or_default(),
                "-ar",
                sample_rate.as_str(),
                "-ac",
                "1",
                "-f",
                "s16le",
                "-",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()
            .context("Failed to spawn ffmpeg PCM pipe")
    }

    /// Split the audiobook into one stream-copied file per segment.
    ///
    /// A failing segment is logged and tallied but does not cancel the rest
    /// of the batch; the caller reconciles the final counts. Transcoder
    /// output for each segment is appended to ffmpeg_log.txt alongside the
    /// audiobook.
    pub async fn split_chapters(
        &self,
        audiobook: &Path,
        segments: &[ChapterSegment],
        metadata: &HashMap<String, String>,
        cover_art: Option<&Path>,
    ) -> Result<SplitOutcome> {
        let parent = audiobook.parent().unwrap_or_else(|| Path::new("."));
        let stem = audiobook
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| anyhow!("Audiobook path has no file stem: {:?}", audiobook))?;
        let log_path = parent.join("ffmpeg_log.txt");

        let progress = ProgressBar::new(segments.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} chapters ({eta})")
                .unwrap()
                .progress_chars("#>-"),
        );

        let mut outcome = SplitOutcome {
            produced: 0,
            failed: 0,
        };

        for (i, segment) in segments.iter().enumerate() {
            let track = i + 1;
            let counter = if track < 10 {
                format!("0{}", track)
            } else {
                track.to_string()
            };

            let out_path = if segment.label.is_empty() {
                parent.join(format!("{} - {}.mp3", stem, counter))
            } else {
                parent.join(format!("{} {} - {}.mp3", stem, counter, segment.label))
            };

            let args =
                self.build_split_args(audiobook, segment, metadata, cover_art, track, segments.len(), &out_path);

            debug!("Splitting track {}: {:?}", track, out_path);
            let output = Command::new(&self.ffmpeg)
                .args(&args)
                .output()
                .await
                .with_context(|| format!("Failed to execute ffmpeg for track {}", track))?;

            let log_entry = format!(
                "track {} -> {:?}\n{}",
                track,
                out_path,
                String::from_utf8_lossy(&output.stderr)
            );
            if let Err(e) = FileManager::append_to_log_file(&log_path, &log_entry) {
                warn!("Could not append to split log: {}", e);
            }

            if output.status.success() && FileManager::file_has_content(&out_path) {
                outcome.produced += 1;
            } else {
                outcome.failed += 1;
                warn!(
                    "Chapter split failed for track {}: {}",
                    track,
                    Self::filter_transcoder_stderr(&String::from_utf8_lossy(&output.stderr))
                );
            }

            progress.inc(1);
        }

        progress.finish_and_clear();
        Ok(outcome)
    }

    fn build_split_args(
        &self,
        audiobook: &Path,
        segment: &ChapterSegment,
        metadata: &HashMap<String, String>,
        cover_art: Option<&Path>,
        track: usize,
        total: usize,
        out_path: &Path,
    ) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-y".into(),
            "-hide_banner".into(),
            "-loglevel".into(),
            "info".into(),
            "-ss".into(),
            segment.start.clone(),
        ];
        if let Some(end) = &segment.end {
            args.push("-to".into());
            args.push(end.clone());
        }
        args.push("-i".into());
        args.push(audiobook.to_string_lossy().into_owned());

        if let Some(cover) = cover_art {
            args.push("-i".into());
            args.push(cover.to_string_lossy().into_owned());
            args.push("-id3v2_version".into());
            args.push("3".into());
            args.push("-metadata:s:v".into());
            args.push("comment=Cover (front)".into());
        } else {
            args.push("-id3v2_version".into());
            args.push("3".into());
        }

        // Narrator rides in the composer tag; author doubles as artist
        if let Some(author) = metadata.get("album_artist") {
            args.push("-metadata".into());
            args.push(format!("album_artist={}", author));
            args.push("-metadata".into());
            args.push(format!("artist={}", author));
        }
        for key in ["genre", "album", "date", "comment", "description", "composer"] {
            if let Some(value) = metadata.get(key) {
                args.push("-metadata".into());
                args.push(format!("{}={}", key, value));
            }
        }

        if cover_art.is_some() {
            args.extend(["-map", "0:0", "-map", "1:0", "-c", "copy"].map(String::from));
        } else {
            args.extend(["-c", "copy"].map(String::from));
        }

        args.push("-metadata".into());
        args.push(format!("track={}/{}", track, total));
        args.push("-metadata".into());
        args.push(format!("title={}", segment.label));
        args.push(out_path.to_string_lossy().into_owned());

        args
    }

    /// Write the FFMETADATA chapter block consumed by the m4b mux.
    ///
    /// Chapter start/end values are millisecond counts on a 1/1000 timebase,
    /// so every segment must carry an end time here; the segmenter supplies
    /// the probed total duration as the last segment's hard end bound.
    pub fn write_chapter_metadata(
        &self,
        destination: &Path,
        segments: &[ChapterSegment],
        metadata: &HashMap<String, String>,
    ) -> Result<()> {
        let mut out = std::fs::File::create(destination)
            .with_context(|| format!("Failed to create chapter metadata file: {:?}", destination))?;

        writeln!(out, ";FFMETADATA1")?;
        for key in ["album_artist", "artist", "genre", "album", "date", "comment", "description", "composer"] {
            if let Some(value) = metadata.get(key) {
                writeln!(out, "{}={}", key, value)?;
            }
        }

        for segment in segments {
            let end = segment.end.as_deref().ok_or_else(|| {
                anyhow!(
                    "segment '{}' lacks an end time; container chapters need a hard end bound",
                    segment.label
                )
            })?;
            writeln!(out, "[CHAPTER]")?;
            writeln!(out, "TIMEBASE=1/1000")?;
            writeln!(out, "START={}", timecode::parse(&segment.start)?)?;
            writeln!(out, "END={}", timecode::parse(end)?)?;
            writeln!(out, "title={}", segment.label)?;
        }

        Ok(())
    }

    /// Mux the audiobook into a single chaptered m4b container
    pub async fn convert_to_m4b(
        &self,
        audiobook: &Path,
        chapter_metadata: &Path,
        cover_art: Option<&Path>,
    ) -> Result<PathBuf> {
        let out_path = audiobook.with_extension("m4b");
        let codec = self.detect_aac_encoder().await;

        let mut args: Vec<String> = vec![
            "-y".into(),
            "-hide_banner".into(),
            "-i".into(),
            audiobook.to_string_lossy().into_owned(),
            "-i".into(),
            chapter_metadata.to_string_lossy().into_owned(),
        ];
        if let Some(cover) = cover_art {
            args.push("-i".into());
            args.push(cover.to_string_lossy().into_owned());
        }
        args.extend(["-map_metadata", "1", "-map_chapters", "1", "-map", "0:a"].map(String::from));
        if cover_art.is_some() {
            args.extend(["-map", "2:v", "-c:v", "copy"].map(String::from));
        }
        args.extend(["-c:a", codec, "-b:a", "64k", "-f", "mp4"].map(String::from));
        args.push(out_path.to_string_lossy().into_owned());

        let output = Command::new(&self.ffmpeg)
            .args(&args)
            .output()
            .await
            .context("Failed to execute ffmpeg for m4b conversion")?;

        if !output.status.success() || !FileManager::file_has_content(&out_path) {
            return Err(anyhow!(
                "m4b conversion failed: {}",
                Self::filter_transcoder_stderr(&String::from_utf8_lossy(&output.stderr))
            ));
        }

        Ok(out_path)
    }

    /// Prefer the Fraunhofer AAC encoder when the local ffmpeg build has it
    async fn detect_aac_encoder(&self) -> &'static str {
        let banner = Command::new(&self.ffmpeg)
            .stdin(Stdio::null())
            .output()
            .await
            .map(|o| String::from_utf8_lossy(&o.stderr).into_owned())
            .unwrap_or_default();

        if banner.contains("--enable-libfdk-aac") {
            "libfdk_aac"
        } else {
            "aac"
        }
    }

    /// Filter transcoder stderr to only show meaningful error lines,
    /// stripping the version banner, build configuration, and stream
    /// metadata noise.
    fn filter_transcoder_stderr(stderr: &str) -> String {
        let dominated_prefixes = [
            "ffmpeg version",
            "ffprobe version",
            "  built with",
            "  configuration:",
            "  lib",
            "Input #",
            "  Metadata:",
            "  Duration:",
            "  Chapter",
            "    Chapter",
            "  Stream #",
            "      Metadata:",
            "Output #",
            "Stream mapping:",
            "Press [q]",
        ];

        let meaningful: Vec<&str> = stderr
            .lines()
            .filter(|line| {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    return false;
                }
                !dominated_prefixes.iter().any(|p| line.starts_with(p))
            })
            .collect();

        if meaningful.is_empty() {
            "unknown transcoder error (stderr was empty after filtering)".to_string()
        } else {
            meaningful.join("\n")
        }
    }
}

/// Normalize ffprobe's sexagesimal output (`H:MM:SS.microseconds`) to the
/// canonical two-digit, millisecond timecode form.
pub fn normalize_sexagesimal(raw: &str) -> Result<String> {
    let (clock, fraction) = raw.split_once('.').unwrap_or((raw, "0"));
    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() != 3 {
        return Err(anyhow!("unexpected duration format: '{}'", raw));
    }

    let hours: u64 = parts[0].parse().context("bad hours field")?;
    let minutes: u64 = parts[1].parse().context("bad minutes field")?;
    let seconds: u64 = parts[2].parse().context("bad seconds field")?;
    let millis: u64 = format!("{:0<3}", fraction)
        .chars()
        .take(3)
        .collect::<String>()
        .parse()
        .context("bad fraction field")?;

    let text = format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis);
    // Validate through the codec so a malformed probe fails loudly here
    timecode::parse(&text)?;
    Ok(text)
}
