use std::fmt;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

// @module: Recognizer transcript handling (subtitle-style cues)

// @const: SRT cue timing line
static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}):(\d{2}):(\d{2}),(\d{3}) --> (\d{2}):(\d{2}):(\d{2}),(\d{3})").unwrap()
});

/// One timestamped unit of recognized speech.
///
/// The `timing` field retains the raw cue-header line exactly as the
/// recognizer emitted it; the segmenter extracts chapter start times from
/// that raw text rather than from the parsed millisecond fields.
#[derive(Debug, Clone)]
pub struct TranscriptCue {
    // @field: Sequence number
    pub index: usize,

    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,

    // @field: Raw "HH:MM:SS,mmm --> HH:MM:SS,mmm" line
    pub timing: String,

    // @field: Recognized text
    pub text: String,
}

impl TranscriptCue {
    /// Creates a cue from parsed millisecond timings, synthesizing the raw
    /// timing line in the recognizer's native format.
    pub fn new(index: usize, start_ms: u64, end_ms: u64, text: String) -> Self {
        let timing = format!(
            "{} --> {}",
            Self::format_timestamp(start_ms),
            Self::format_timestamp(end_ms)
        );
        TranscriptCue {
            index,
            start_ms,
            end_ms,
            timing,
            text,
        }
    }

    /// Format a millisecond count in the recognizer's comma-delimited
    /// subtitle format (`HH:MM:SS,mmm`).
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for TranscriptCue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{}", self.timing)?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// An ordered, finite cue sequence read from one recognizer run
#[derive(Debug)]
pub struct Transcript {
    /// File the cues were read from or will be written to
    pub source_file: PathBuf,

    /// Cues ordered by start time
    pub cues: Vec<TranscriptCue>,
}

impl Transcript {
    /// Create an in-memory transcript
    pub fn new(source_file: PathBuf, cues: Vec<TranscriptCue>) -> Self {
        Transcript { source_file, cues }
    }

    /// Parse a subtitle file produced by the recognizer
    pub fn read_srt_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let cues = Self::parse_srt_string(&content)?;
        Ok(Transcript {
            source_file: path.to_path_buf(),
            cues,
        })
    }

    /// Write the cues back out in subtitle format.
    ///
    /// This is the cached transcription artifact: later runs find the file
    /// next to the audiobook and skip re-transcription entirely.
    pub fn write_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path)?;
        for cue in &self.cues {
            write!(file, "{}", cue)?;
        }
        Ok(())
    }

    /// Parse subtitle-format text into cues.
    ///
    /// Tolerant line-oriented state machine: malformed blocks are skipped
    /// with a warning rather than aborting, the surviving cues are sorted by
    /// start time and renumbered.
    pub fn parse_srt_string(content: &str) -> Result<Vec<TranscriptCue>> {
        let mut cues = Vec::new();

        let mut current_index: Option<usize> = None;
        let mut current_timing: Option<(u64, u64, String)> = None;
        let mut current_text = String::new();
        let mut line_count = 0;

        let mut flush =
            |index: &mut Option<usize>, timing: &mut Option<(u64, u64, String)>, text: &mut String| {
                if let (Some(idx), Some((start_ms, end_ms, raw))) = (index.take(), timing.take()) {
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        warn!("Skipping empty transcript cue {}", idx);
                    } else {
                        cues.push(TranscriptCue {
                            index: idx,
                            start_ms,
                            end_ms,
                            timing: raw,
                            text: trimmed.to_string(),
                        });
                    }
                }
                text.clear();
            };

        for line in content.lines() {
            line_count += 1;
            let trimmed = line.trim();

            if trimmed.is_empty() {
                flush(&mut current_index, &mut current_timing, &mut current_text);
                continue;
            }

            if current_index.is_none() && current_text.is_empty() {
                if let Ok(num) = trimmed.parse::<usize>() {
                    current_index = Some(num);
                    continue;
                }
            }

            if current_index.is_some() && current_timing.is_none() {
                if let Some(caps) = TIMING_REGEX.captures(trimmed) {
                    let start_ms = Self::timestamp_fields_to_ms(&caps, 1);
                    let end_ms = Self::timestamp_fields_to_ms(&caps, 5);
                    current_timing = Some((start_ms, end_ms, trimmed.to_string()));
                    continue;
                }
            }

            if current_index.is_some() && current_timing.is_some() {
                if !current_text.is_empty() {
                    current_text.push('\n');
                }
                current_text.push_str(trimmed);
            } else {
                warn!(
                    "Unexpected text at line {} before cue index or timing: {}",
                    line_count, trimmed
                );
            }
        }
        flush(&mut current_index, &mut current_timing, &mut current_text);

        if cues.is_empty() {
            return Err(anyhow!("no valid cues were found in the transcript"));
        }

        cues.sort_by_key(|cue| cue.start_ms);
        for (i, cue) in cues.iter_mut().enumerate() {
            cue.index = i + 1;
        }

        Ok(cues)
    }

    fn timestamp_fields_to_ms(caps: &regex::Captures, start_idx: usize) -> u64 {
        let field = |offset: usize| -> u64 {
            caps.get(start_idx + offset)
                .map_or(0, |m| m.as_str().parse().unwrap_or(0))
        };
        (field(0) * 3600 + field(1) * 60 + field(2)) * 1000 + field(3)
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Transcript")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Cues: {}", self.cues.len())?;
        Ok(())
    }
}
