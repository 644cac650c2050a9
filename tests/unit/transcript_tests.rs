/*!
 * Tests for transcript cue parsing and the subtitle artifact round trip
 */

use std::fmt::Write as _;

use chapterize::transcript::{Transcript, TranscriptCue};

const SAMPLE_SRT: &str = "\
1
00:00:01,000 --> 00:00:04,000
the story begins quietly

2
00:01:00,000 --> 00:01:03,000
chapter one
";

#[test]
fn test_parse_srt_withValidContent_shouldProduceOrderedCues() {
    let cues = Transcript::parse_srt_string(SAMPLE_SRT).unwrap();

    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].index, 1);
    assert_eq!(cues[0].start_ms, 1_000);
    assert_eq!(cues[0].end_ms, 4_000);
    assert_eq!(cues[0].text, "the story begins quietly");
    assert_eq!(cues[1].start_ms, 60_000);
}

/// The raw timing line survives parsing untouched; the segmenter depends
/// on extracting start times from it
#[test]
fn test_parse_srt_shouldRetainRawTimingLine() {
    let cues = Transcript::parse_srt_string(SAMPLE_SRT).unwrap();
    assert_eq!(cues[0].timing, "00:00:01,000 --> 00:00:04,000");
    assert_eq!(cues[1].timing, "00:01:00,000 --> 00:01:03,000");
}

#[test]
fn test_parse_srt_withOutOfOrderCues_shouldSortAndRenumber() {
    let content = "\
7
00:02:00,000 --> 00:02:05,000
later text

3
00:00:30,000 --> 00:00:35,000
earlier text
";
    let cues = Transcript::parse_srt_string(content).unwrap();
    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].index, 1);
    assert_eq!(cues[0].text, "earlier text");
    assert_eq!(cues[1].index, 2);
    assert_eq!(cues[1].text, "later text");
}

#[test]
fn test_parse_srt_withMalformedBlock_shouldSkipAndContinue() {
    let content = "\
1
this block has no timing line

2
00:00:10,000 --> 00:00:12,000
usable cue
";
    let cues = Transcript::parse_srt_string(content).unwrap();
    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].text, "usable cue");
}

#[test]
fn test_parse_srt_withNoUsableCues_shouldFail() {
    assert!(Transcript::parse_srt_string("").is_err());
    assert!(Transcript::parse_srt_string("just prose, no cues").is_err());
}

#[test]
fn test_cue_display_shouldMatchSubtitleBlockFormat() {
    let cue = TranscriptCue::new(3, 5_000, 10_000, "hello".to_string());
    let mut output = String::new();
    write!(output, "{}", cue).unwrap();

    assert_eq!(output, "3\n00:00:05,000 --> 00:00:10,000\nhello\n\n");
}

#[test]
fn test_write_and_read_srt_shouldRoundTrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.srt");

    let cues = vec![
        TranscriptCue::new(1, 0, 2_000, "first cue".to_string()),
        TranscriptCue::new(2, 2_500, 4_000, "second cue".to_string()),
    ];
    let transcript = Transcript::new(path.clone(), cues);
    transcript.write_srt(&path).unwrap();

    let reread = Transcript::read_srt_file(&path).unwrap();
    assert_eq!(reread.cues.len(), 2);
    assert_eq!(reread.cues[0].text, "first cue");
    assert_eq!(reread.cues[1].start_ms, 2_500);
}
