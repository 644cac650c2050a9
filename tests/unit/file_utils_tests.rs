/*!
 * Tests for file and directory utilities
 */

use std::fs;

use chapterize::file_utils::FileManager;

#[test]
fn test_file_exists_shouldDistinguishFilesFromDirs() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, "content").unwrap();

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::file_exists(dir.path()));
    assert!(!FileManager::file_exists(dir.path().join("missing.txt")));
}

/// Artifacts at or below the trivial size threshold count as absent
#[test]
fn test_file_has_content_shouldIgnoreTrivialFiles() {
    let dir = tempfile::tempdir().unwrap();

    let empty = dir.path().join("empty.srt");
    fs::write(&empty, "").unwrap();
    assert!(!FileManager::file_has_content(&empty));

    let tiny = dir.path().join("tiny.srt");
    fs::write(&tiny, "0123456789").unwrap();
    assert!(!FileManager::file_has_content(&tiny));

    let real = dir.path().join("real.srt");
    fs::write(&real, "1\n00:00:01,000 --> 00:00:02,000\nhello\n").unwrap();
    assert!(FileManager::file_has_content(&real));

    assert!(!FileManager::file_has_content(dir.path().join("missing")));
}

#[test]
fn test_ensure_dir_shouldCreateNestedDirectories() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b").join("c");

    FileManager::ensure_dir(&nested).unwrap();
    assert!(nested.is_dir());

    // Idempotent on an existing directory
    FileManager::ensure_dir(&nested).unwrap();
}

#[test]
fn test_append_to_log_file_shouldAccumulateTimestampedLines() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("ffmpeg_log.txt");

    FileManager::append_to_log_file(&log, "first entry").unwrap();
    FileManager::append_to_log_file(&log, "second entry").unwrap();

    let content = fs::read_to_string(&log).unwrap();
    assert!(content.contains("first entry"));
    assert!(content.contains("second entry"));
    assert_eq!(content.lines().count(), 2);
    assert!(content.lines().all(|line| line.starts_with('[')));
}

/// Reconciliation counts produced chapter files, never the source itself
#[test]
fn test_count_sibling_output_files_shouldExcludeSource() {
    let dir = tempfile::tempdir().unwrap();
    let book = dir.path().join("Book.mp3");
    fs::write(&book, "source").unwrap();
    fs::write(dir.path().join("Book 01 - Prologue.mp3"), "chapter").unwrap();
    fs::write(dir.path().join("Book 02 - Chapter 01.mp3"), "chapter").unwrap();
    fs::write(dir.path().join("Book.cue"), "not audio").unwrap();

    let count = FileManager::count_sibling_output_files(&book, "mp3").unwrap();
    assert_eq!(count, 2);
}
