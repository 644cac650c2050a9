use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use crate::errors::ModelError;
use crate::file_utils::FileManager;
use crate::language_profiles::ModelSpec;

// @module: Recognizer model bootstrap
//
// Models live as single GGML files in one flat directory. Lookup is by file
// name; download is a single blocking sequential fetch with a progress bar,
// no retry - a failed or empty download is fatal for the run.

/// Locates and fetches recognizer model files
pub struct ModelManager {
    model_dir: PathBuf,
}

impl ModelManager {
    /// Create a manager over the given model directory
    pub fn new(model_dir: PathBuf) -> Self {
        ModelManager { model_dir }
    }

    /// Platform default model directory
    pub fn default_dir() -> Result<PathBuf> {
        let base = dirs::data_dir().context("Could not determine the platform data directory")?;
        Ok(base.join("chapterize").join("models"))
    }

    /// Path a model would occupy locally, whether or not it exists
    pub fn path_for(&self, spec: &ModelSpec) -> PathBuf {
        self.model_dir.join(spec.file_name)
    }

    /// Find a model on disk, ignoring trivially small leftovers
    pub fn locate(&self, spec: &ModelSpec) -> Option<PathBuf> {
        let path = self.path_for(spec);
        if FileManager::file_has_content(&path) {
            Some(path)
        } else {
            None
        }
    }

    /// Resolve a model to a local path, downloading when allowed.
    pub async fn resolve(&self, spec: &ModelSpec, allow_download: bool) -> Result<PathBuf, ModelError> {
        if let Some(path) = self.locate(spec) {
            info!("Local recognizer model found: {:?}", path);
            return Ok(path);
        }
        if !allow_download {
            return Err(ModelError::NotFound(spec.file_name.to_string()));
        }
        self.download(spec).await
    }

    /// Fetch a model file with a byte-level progress bar.
    ///
    /// The stream is written to a `.part` file first and renamed on success
    /// so an interrupted download never masquerades as a usable model.
    pub async fn download(&self, spec: &ModelSpec) -> Result<PathBuf, ModelError> {
        FileManager::ensure_dir(&self.model_dir)
            .map_err(|e| ModelError::DownloadFailed(e.to_string()))?;
        self.sweep_partials();

        let url = spec.download_url();
        info!("Downloading recognizer model from {}", url);

        let response = reqwest::get(&url)
            .await
            .map_err(|e| ModelError::DownloadFailed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ModelError::DownloadFailed(format!(
                "server responded with {} for {}",
                response.status(),
                url
            )));
        }

        let total_size = response.content_length().unwrap_or(0);
        let progress = ProgressBar::new(total_size);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .unwrap()
                .progress_chars("#>-"),
        );

        let final_path = self.path_for(spec);
        let part_path = final_path.with_extension("bin.part");
        let mut file = fs::File::create(&part_path)
            .map_err(|e| ModelError::DownloadFailed(e.to_string()))?;

        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ModelError::DownloadFailed(e.to_string()))?;
            file.write_all(&chunk)
                .map_err(|e| ModelError::DownloadFailed(e.to_string()))?;
            downloaded += chunk.len() as u64;
            progress.set_position(downloaded);
        }
        progress.finish_and_clear();

        if downloaded == 0 {
            let _ = fs::remove_file(&part_path);
            return Err(ModelError::DownloadFailed(format!(
                "received an empty stream from {}",
                url
            )));
        }

        fs::rename(&part_path, &final_path).map_err(|e| {
            let _ = fs::remove_file(&part_path);
            ModelError::DownloadFailed(e.to_string())
        })?;

        info!("Model downloaded to {:?}", final_path);
        Ok(final_path)
    }

    /// Remove stale partial downloads left by interrupted runs
    pub fn sweep_partials(&self) {
        let Ok(entries) = fs::read_dir(&self.model_dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "part") {
                warn!("Removing stale partial download: {:?}", path);
                let _ = fs::remove_file(&path);
            }
        }
    }
}

/// Expose the model directory used for a config value, falling back to the
/// platform default when none was configured.
pub fn model_dir_from_config(configured: Option<&Path>) -> Result<PathBuf> {
    match configured {
        Some(dir) => Ok(dir.to_path_buf()),
        None => ModelManager::default_dir(),
    }
}
