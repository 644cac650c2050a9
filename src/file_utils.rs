use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use walkdir::WalkDir;

// @module: File and directory utilities

// Artifacts smaller than this are treated as absent: a failed ffmpeg run can
// leave a zero or near-zero byte file behind
const TRIVIAL_SIZE_BYTES: u64 = 10;

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    /// Whether a file exists and holds more than a trivial number of bytes.
    /// Used for cached artifacts (transcript, cover art, metadata dumps).
    pub fn file_has_content<P: AsRef<Path>>(path: P) -> bool {
        fs::metadata(path.as_ref())
            .map(|m| m.is_file() && m.len() > TRIVIAL_SIZE_BYTES)
            .unwrap_or(false)
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Append content to a log file with timestamp
    pub fn append_to_log_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))?;

        writeln!(file, "[{}] {}", timestamp, content)
            .with_context(|| format!("Failed to write to log file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Count the chapter files produced next to the source audiobook.
    ///
    /// Everything with the same extension in the audiobook's directory counts
    /// except the source file itself; used for the post-split reconciliation
    /// of expected vs. produced file counts.
    pub fn count_sibling_output_files(audiobook: &Path, extension: &str) -> Result<usize> {
        let parent = audiobook.parent().unwrap_or_else(|| Path::new("."));
        let source_stem = audiobook.file_stem().unwrap_or_default();

        let mut count = 0;
        for entry in WalkDir::new(parent).max_depth(1) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let matches_ext = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension));
            if matches_ext && path.file_stem() != Some(source_stem) {
                count += 1;
            }
        }

        Ok(count)
    }
}
