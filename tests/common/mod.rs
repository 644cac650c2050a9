/*!
 * Common test utilities shared across the test suite
 */

use chapterize::language_profiles::{self, LanguageProfile};
use chapterize::segmenter::ChapterSegment;
use chapterize::transcript::TranscriptCue;

/// Build a cue with a synthesized timing line
pub fn cue(index: usize, start_ms: u64, end_ms: u64, text: &str) -> TranscriptCue {
    TranscriptCue::new(index, start_ms, end_ms, text.to_string())
}

/// Build a cue whose raw timing line is deliberately corrupt
pub fn cue_with_bad_timing(index: usize, text: &str) -> TranscriptCue {
    TranscriptCue {
        index,
        start_ms: 0,
        end_ms: 0,
        timing: "not a timing line".to_string(),
        text: text.to_string(),
    }
}

/// The English language profile
pub fn english_profile() -> &'static LanguageProfile {
    language_profiles::profile_for("en-us").expect("en-us profile should be registered")
}

/// A small reviewed segment list with an open-ended final chapter
pub fn sample_segments() -> Vec<ChapterSegment> {
    vec![
        ChapterSegment {
            start: "00:00:00.000".to_string(),
            end: Some("00:14:59.999".to_string()),
            label: "Chapter 01".to_string(),
        },
        ChapterSegment {
            start: "00:15:00.000".to_string(),
            end: Some("01:02:03.453".to_string()),
            label: "Chapter 02".to_string(),
        },
        ChapterSegment {
            start: "01:02:03.454".to_string(),
            end: None,
            label: "Epilogue".to_string(),
        },
    ]
}
