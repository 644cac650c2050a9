use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SegmenterError;
use crate::language_profiles::LanguageProfile;
use crate::timecode;
use crate::transcript::TranscriptCue;

// @module: Chapter boundary detection over recognizer transcripts

// @const: Start timestamp immediately preceding the " -" of the cue arrow
static START_TIME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2}:\d{2}:\d{2},\d+)\s-").unwrap());

/// One chapter's place in the recording.
///
/// Timecodes are carried in `HH:MM:SS.mmm` text form, the same shape the cue
/// sheet stores. An absent `end` means "to end of file" and is only ever
/// legal on the final segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterSegment {
    /// Start timecode
    pub start: String,

    /// End timecode; absent on the final segment unless a hard end bound
    /// was requested
    pub end: Option<String>,

    /// Generated chapter title, possibly empty
    pub label: String,
}

impl ChapterSegment {
    /// Create a segment with no end time
    pub fn open_ended(start: impl Into<String>, label: impl Into<String>) -> Self {
        ChapterSegment {
            start: start.into(),
            end: None,
            label: label.into(),
        }
    }
}

/// Derive an ordered, non-overlapping chapter segment list from a transcript.
///
/// Walks cues pairwise: the lookahead cue's text decides whether a boundary
/// exists, the current cue's raw timing line supplies the start timestamp.
/// Matching is deliberately plain substring containment over the whole line;
/// a long unrelated sentence that happens to contain a marker word is a known
/// false positive, which is what the per-language exclusion lists are for.
pub fn segment(
    cues: &[TranscriptCue],
    profile: &LanguageProfile,
    use_experimental: bool,
    final_duration: Option<&str>,
) -> Result<Vec<ChapterSegment>, SegmenterError> {
    let mut segments: Vec<ChapterSegment> = Vec::new();
    let mut chapter_counter = 1u32;

    for (i, cue) in cues.iter().enumerate() {
        // The last cue has no lookahead and can never open a chapter
        let Some(lookahead) = cues.get(i + 1) else {
            continue;
        };

        if profile
            .excluded_phrases
            .iter()
            .any(|phrase| lookahead.text.contains(phrase))
        {
            continue;
        }

        let marker_hit = profile
            .chapter_markers()
            .iter()
            .any(|marker| lookahead.text.contains(marker));

        let experimental_hit = if use_experimental && !marker_hit {
            profile
                .experimental_markers
                .iter()
                .find(|marker| cue.text.contains(**marker))
                .copied()
        } else {
            None
        };

        if !marker_hit && experimental_hit.is_none() {
            continue;
        }

        // Pull the start time out of the raw cue header, normalizing the
        // recognizer's comma delimiter to the sexagesimal period form
        let start = match START_TIME_REGEX
            .captures(&cue.timing)
            .and_then(|caps| caps.get(1))
        {
            Some(m) => m.as_str().replace(',', "."),
            None => {
                warn!(
                    "A chapter boundary was skipped: no start time matched in cue {}",
                    cue.index
                );
                continue;
            }
        };

        let label = if marker_hit {
            classify_label(&lookahead.text, profile, &mut chapter_counter)
        } else {
            // Experimental markers label themselves
            title_case(experimental_hit.unwrap())
        };

        // The recording begins at time zero by definition
        let start = if segments.is_empty() {
            "00:00:00.000".to_string()
        } else {
            start
        };

        segments.push(ChapterSegment::open_ended(start, label));
    }

    if segments.is_empty() {
        return Err(SegmenterError::EmptySegmentList);
    }

    // Each chapter ends one unit before the next begins so the splitter
    // never duplicates a boundary frame
    let count = segments.len();
    for i in 0..count {
        if i + 1 < count {
            let next_start = segments[i + 1].start.clone();
            segments[i].end = Some(timecode::decrement_one_unit(&next_start)?);
        } else if let Some(duration) = final_duration {
            segments[i].end = Some(duration.to_string());
        }
    }

    Ok(segments)
}

/// Classify a boundary by which marker the lookahead line matched.
///
/// Priority: prologue, then epilogue, then numbered chapter, so a line like
/// "epilogue chapter" labels the closing section rather than minting another
/// chapter number. Unrecognized matches keep an empty label.
fn classify_label(text: &str, profile: &LanguageProfile, chapter_counter: &mut u32) -> String {
    if text.contains(profile.prologue_marker) {
        "Prologue".to_string()
    } else if text.contains(profile.epilogue_marker) {
        "Epilogue".to_string()
    } else if text.contains(profile.chapter_marker) {
        let label = if *chapter_counter < 10 {
            format!("Chapter 0{}", chapter_counter)
        } else {
            format!("Chapter {}", chapter_counter)
        };
        *chapter_counter += 1;
        label
    } else {
        String::new()
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
