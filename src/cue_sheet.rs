use std::fs;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::LedgerError;
use crate::segmenter::ChapterSegment;
use crate::timecode;

// @module: Cue sheet codec (the durable chapter ledger sidecar)
//
// The cue file is the hand-editable record of a reviewed segment list. It is
// created at most once per audiobook and only ever read afterwards; fixing a
// bad transcription means editing or deleting the file, never regenerating
// over it.
//
// Layout:
//   FILE "Book.mp3" MP3
//   TRACK 1 AUDIO
//     TITLE "Chapter 01"
//     START 00:00:00.000
//     END   00:12:34.565
//   TRACK 2 AUDIO
//     ...
// The last track carries no END line unless a hard end bound was recorded.

static TITLE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r#"TITLE\t"(.*)""#).unwrap());
static START_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"START\t(.+)").unwrap());
static END_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"END\t+(.+)").unwrap());

/// Write a segment list to a new cue file.
///
/// The destination must not already exist; an existing file is never
/// truncated or modified. On any write failure the partial file is removed
/// so a later run can't mistake it for a reviewed ledger.
pub fn write(
    segments: &[ChapterSegment],
    source_name: &str,
    destination: &Path,
) -> Result<(), LedgerError> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
        .map_err(|e| {
            if e.kind() == ErrorKind::AlreadyExists {
                LedgerError::AlreadyExists(destination.to_path_buf())
            } else {
                LedgerError::Io(e)
            }
        })?;

    match write_body(file, segments, source_name) {
        Ok(()) => Ok(()),
        Err(e) => {
            // Never leave a half-written ledger on disk
            if destination.exists() {
                if let Err(cleanup) = fs::remove_file(destination) {
                    warn!("Failed to remove partial cue file: {}", cleanup);
                }
            }
            Err(LedgerError::Io(e))
        }
    }
}

fn write_body(
    mut file: fs::File,
    segments: &[ChapterSegment],
    source_name: &str,
) -> std::io::Result<()> {
    writeln!(file, "FILE \"{}\" MP3", source_name)?;
    for (i, segment) in segments.iter().enumerate() {
        writeln!(file, "TRACK {} AUDIO", i + 1)?;
        writeln!(file, "  TITLE\t\"{}\"", segment.label)?;
        writeln!(file, "  START\t{}", segment.start)?;
        if i != segments.len() - 1 {
            if let Some(end) = &segment.end {
                writeln!(file, "  END\t\t{}", end)?;
            }
        }
    }
    file.flush()
}

/// Read a segment list back from a cue file.
///
/// Lines between successive TRACK markers form one segment; a segment is
/// complete when the next TRACK line or end-of-file is reached. A missing
/// TITLE or START field, an invalid timecode, or an empty result all fail —
/// downstream splitting cannot proceed from a corrupt ledger.
pub fn read(source: &Path) -> Result<Vec<ChapterSegment>, LedgerError> {
    let content = fs::read_to_string(source)?;

    let mut segments = Vec::new();
    let mut label: Option<String> = None;
    let mut start: Option<String> = None;
    let mut end: Option<String> = None;
    let mut in_track = false;

    let mut lines = content.lines();
    // Header line naming the source media
    let _ = lines.next();

    for line in lines {
        if line.starts_with("TRACK") {
            if in_track {
                segments.push(build_segment(
                    segments.len() + 1,
                    label.take(),
                    start.take(),
                    end.take(),
                )?);
            }
            in_track = true;
            continue;
        }
        if let Some(caps) = TITLE_REGEX.captures(line) {
            label = Some(caps[1].to_string());
        } else if let Some(caps) = START_REGEX.captures(line) {
            start = Some(caps[1].trim().to_string());
        } else if let Some(caps) = END_REGEX.captures(line) {
            end = Some(caps[1].trim().to_string());
        }
    }
    if in_track {
        segments.push(build_segment(
            segments.len() + 1,
            label.take(),
            start.take(),
            end.take(),
        )?);
    }

    if segments.is_empty() {
        return Err(LedgerError::Empty(source.to_path_buf()));
    }

    Ok(segments)
}

fn build_segment(
    track: usize,
    label: Option<String>,
    start: Option<String>,
    end: Option<String>,
) -> Result<ChapterSegment, LedgerError> {
    let label = label.ok_or(LedgerError::MissingField {
        field: "TITLE",
        track,
    })?;
    let start = start.ok_or(LedgerError::MissingField {
        field: "START",
        track,
    })?;

    // Validate every stored timecode up front; a typo in a hand-edited
    // ledger should fail here, not in the splitter
    timecode::parse(&start)?;
    if let Some(end) = &end {
        timecode::parse(end)?;
    }

    Ok(ChapterSegment { start, end, label })
}
