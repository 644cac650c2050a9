/*!
 * End-to-end tests for the transcript → segments → ledger pipeline.
 *
 * Everything here runs offline: no transcoder, no recognizer. The pieces
 * that shell out are covered by their own contracts; these tests exercise
 * the data path a real run takes once a transcript exists.
 */

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chapterize::app_config::Config;
use chapterize::app_controller::{Controller, RunOptions};
use chapterize::errors::AppError;
use chapterize::language_profiles::ModelSize;
use chapterize::{cue_sheet, segment_table, segmenter};
use chapterize::transcript::Transcript;

use crate::common::english_profile;

const BOOK_TRANSCRIPT: &str = "\
1
00:00:00,000 --> 00:00:04,000
recorded books presents

2
00:00:30,500 --> 00:00:33,000
prologue

3
00:14:59,800 --> 00:15:03,000
chapter one

4
00:58:01,200 --> 00:58:04,000
chapter two

5
01:30:00,000 --> 01:30:02,500
epilogue

6
01:30:10,000 --> 01:30:15,000
the end was only the beginning
";

/// Transcript text to reviewed ledger and back, the way one run flows
#[test]
fn test_pipeline_fromTranscriptToLedger_shouldRoundTrip() {
    let dir = tempfile::tempdir().unwrap();
    let cue_path = dir.path().join("book.cue");

    // Parse the recognizer artifact
    let cues = Transcript::parse_srt_string(BOOK_TRANSCRIPT).unwrap();
    assert_eq!(cues.len(), 6);

    // Derive segments
    let segments = segmenter::segment(&cues, english_profile(), false, None).unwrap();
    assert_eq!(segments.len(), 4);

    assert_eq!(segments[0].label, "Prologue");
    assert_eq!(segments[0].start, "00:00:00.000");

    assert_eq!(segments[1].label, "Chapter 01");
    assert_eq!(segments[1].start, "00:00:30.500");

    assert_eq!(segments[2].label, "Chapter 02");
    assert_eq!(segments[2].start, "00:14:59.800");

    assert_eq!(segments[3].label, "Epilogue");
    assert_eq!(segments[3].start, "00:58:01.200");
    assert_eq!(segments[3].end, None);

    // One-unit gaps between adjacent chapters
    assert_eq!(segments[0].end.as_deref(), Some("00:00:30.499"));
    assert_eq!(segments[1].end.as_deref(), Some("00:14:59.799"));
    assert_eq!(segments[2].end.as_deref(), Some("00:58:01.199"));

    // Persist the ledger and read it back unchanged
    cue_sheet::write(&segments, "book.mp3", &cue_path).unwrap();
    let reread = cue_sheet::read(&cue_path).unwrap();
    assert_eq!(reread, segments);

    // The review table shows every chapter and the EOF sentinel
    let table = segment_table::render(&reread);
    assert!(table.contains("Prologue"));
    assert!(table.contains("Chapter 02"));
    assert!(table.contains("EOF"));
}

/// A second write against the reviewed ledger must be refused
#[test]
fn test_pipeline_rewritingExistingLedger_shouldBeRefused() {
    let dir = tempfile::tempdir().unwrap();
    let cue_path = dir.path().join("book.cue");

    let cues = Transcript::parse_srt_string(BOOK_TRANSCRIPT).unwrap();
    let segments = segmenter::segment(&cues, english_profile(), false, None).unwrap();

    cue_sheet::write(&segments, "book.mp3", &cue_path).unwrap();
    let before = fs::read_to_string(&cue_path).unwrap();

    let second = cue_sheet::write(&segments, "book.mp3", &cue_path);
    assert!(second.is_err());
    assert_eq!(fs::read_to_string(&cue_path).unwrap(), before);
}

/// Hand-editing the ledger is the supported correction workflow; the edited
/// values win on the next read
#[test]
fn test_pipeline_handEditedLedger_shouldBeHonored() {
    let dir = tempfile::tempdir().unwrap();
    let cue_path = dir.path().join("book.cue");

    let cues = Transcript::parse_srt_string(BOOK_TRANSCRIPT).unwrap();
    let segments = segmenter::segment(&cues, english_profile(), false, None).unwrap();
    cue_sheet::write(&segments, "book.mp3", &cue_path).unwrap();

    // A reviewer fixes a mislabeled chapter title by hand
    let edited = fs::read_to_string(&cue_path)
        .unwrap()
        .replace("\"Chapter 02\"", "\"Chapter 02 - The Storm\"");
    fs::write(&cue_path, edited).unwrap();

    let reread = cue_sheet::read(&cue_path).unwrap();
    assert_eq!(reread[2].label, "Chapter 02 - The Storm");
    assert_eq!(reread[2].start, segments[2].start);
}

/// The orchestrator rejects non-mp3 input before touching any collaborator
#[tokio::test]
async fn test_controller_withUnsupportedFormat_shouldExitNine() {
    let dir = tempfile::tempdir().unwrap();
    let book = dir.path().join("book.wav");
    fs::write(&book, "not really audio").unwrap();

    let controller = Controller::with_config(Config::default());
    let options = RunOptions {
        audiobook: book,
        language: "en-us".to_string(),
        model_size: ModelSize::Small,
        download_model: false,
        use_experimental: false,
        timecodes_file: None,
        cue_file: None,
        write_cue: false,
        metadata_overrides: HashMap::new(),
        cover_art: None,
        m4b: false,
    };

    let error = controller.run(options).await.unwrap_err();
    assert!(matches!(error, AppError::UnsupportedFormat(_)));
    assert_eq!(error.exit_code(), 9);
}

/// Sanity check that RunOptions carries paths through untouched
#[test]
fn test_run_options_shouldPreserveResolvedPaths() {
    let options = RunOptions {
        audiobook: PathBuf::from("/books/book.mp3"),
        language: "de".to_string(),
        model_size: ModelSize::Large,
        download_model: true,
        use_experimental: true,
        timecodes_file: Some(PathBuf::from("/tmp/book.srt")),
        cue_file: Some(PathBuf::from("/books/book.cue")),
        write_cue: true,
        metadata_overrides: HashMap::new(),
        cover_art: None,
        m4b: true,
    };

    assert_eq!(options.audiobook, PathBuf::from("/books/book.mp3"));
    assert_eq!(options.cue_file.as_deref(), Some(std::path::Path::new("/books/book.cue")));
    assert_eq!(options.model_size, ModelSize::Large);
}
