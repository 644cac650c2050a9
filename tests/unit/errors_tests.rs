/*!
 * Tests for the error taxonomy and its exit-code mapping
 */

use std::path::PathBuf;

use chapterize::errors::{AppError, LedgerError, ModelError, SegmenterError, TimecodeError};

/// Exit codes are a CLI contract; each failure class keeps its number
#[test]
fn test_exit_codes_shouldStayStablePerFailureClass() {
    let cases: Vec<(AppError, i32)> = vec![
        (AppError::Config("bad".into()), 1),
        (AppError::InvalidLanguage("klingon".into()), 2),
        (
            AppError::Model(ModelError::UnsupportedLanguage("fr".into())),
            2,
        ),
        (
            AppError::Model(ModelError::UnsupportedSize {
                language: "de".into(),
                size: "large".into(),
            }),
            3,
        ),
        (AppError::Model(ModelError::NotFound("ggml-base.en.bin".into())), 3),
        (AppError::Model(ModelError::DownloadFailed("404".into())), 4),
        (AppError::Transcription("no output".into()), 5),
        (
            AppError::Timecode(TimecodeError::Malformed("junk".into())),
            6,
        ),
        (
            AppError::LedgerRead(LedgerError::Empty(PathBuf::from("book.cue"))),
            7,
        ),
        (
            AppError::EmptyTimecodes(SegmenterError::EmptySegmentList),
            8,
        ),
        (AppError::UnsupportedFormat(PathBuf::from("book.wav")), 9),
        (
            AppError::LedgerWrite(LedgerError::AlreadyExists(PathBuf::from("book.cue"))),
            10,
        ),
        (AppError::Transcoder("spawn failed".into()), 11),
    ];

    for (error, expected) in cases {
        assert_eq!(error.exit_code(), expected, "wrong exit code for {error}");
    }
}

/// Segmenter failures split into two classes: empty list vs timecode
#[test]
fn test_segmenter_error_conversion_shouldPreserveClass() {
    let empty: AppError = SegmenterError::EmptySegmentList.into();
    assert_eq!(empty.exit_code(), 8);

    let timecode: AppError =
        SegmenterError::Timecode(TimecodeError::Underflow("00:00:00.000".into())).into();
    assert_eq!(timecode.exit_code(), 6);
}

#[test]
fn test_error_display_shouldNameTheProblem() {
    let error = AppError::InvalidLanguage("klingon".to_string());
    assert!(error.to_string().contains("klingon"));

    let ledger = LedgerError::MissingField {
        field: "START",
        track: 3,
    };
    let text = ledger.to_string();
    assert!(text.contains("START"));
    assert!(text.contains('3'));
}
