use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::media_tools::MediaToolkit;
use crate::transcript::{Transcript, TranscriptCue};

// @module: External speech recognizer (whisper.cpp)
//
// The recognizer is a collaborator with a narrow contract: given a model
// handle and a raw PCM stream it returns an ordered, finite cue sequence.
// It runs exactly once per audiobook; the resulting subtitle file is the
// cached artifact later runs read instead.

const BEAM_SIZE: u32 = 5;
const BEAM_PATIENCE: f32 = 1.0;

// whisper.cpp segment timestamps are 10ms ticks
const TICK_MS: u64 = 10;

/// One loaded recognizer model bound to a language
pub struct Recognizer {
    ctx: WhisperContext,
    language: &'static str,
}

impl Recognizer {
    /// Load a model file and bind it to the recognizer language tag
    pub fn new(model_path: &Path, language: &'static str) -> Result<Self> {
        let params = WhisperContextParameters::default();
        let ctx = WhisperContext::new_with_params(
            model_path
                .to_str()
                .ok_or_else(|| anyhow!("model path is not valid UTF-8: {:?}", model_path))?,
            params,
        )
        .context("Failed to load recognizer model")?;

        Ok(Recognizer { ctx, language })
    }

    /// Transcribe the audiobook through the transcoder's PCM pipe.
    ///
    /// The pipe is drained fully before recognition starts; backpressure
    /// between the transcoder and this reader comes from the pipe buffer
    /// itself. There is no timeout and no cancellation beyond process
    /// termination.
    pub fn transcribe(&self, toolkit: &MediaToolkit, audiobook: &Path) -> Result<Vec<TranscriptCue>> {
        let mut child = toolkit.spawn_pcm_pipe(audiobook)?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("PCM pipe had no stdout"))?;

        let samples = read_pcm_samples(stdout)?;

        let status = child.wait().context("Failed to wait for the PCM pipe")?;
        if !status.success() {
            return Err(anyhow!("transcoder PCM demux exited with {}", status));
        }
        if samples.is_empty() {
            return Err(anyhow!("transcoder produced no audio samples"));
        }
        debug!("Decoded {} PCM samples", samples.len());

        self.run_model(&samples)
    }

    fn run_model(&self, samples: &[f32]) -> Result<Vec<TranscriptCue>> {
        let mut params = FullParams::new(SamplingStrategy::BeamSearch {
            beam_size: BEAM_SIZE as std::ffi::c_int,
            patience: BEAM_PATIENCE,
        });
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_token_timestamps(false);
        params.set_language(Some(self.language));

        let mut state = self
            .ctx
            .create_state()
            .context("Failed to create recognizer state")?;
        state
            .full(params, samples)
            .context("Recognizer inference failed")?;

        let num_segments = state.full_n_segments();
        if num_segments < 1 {
            return Err(anyhow!("recognizer produced no output"));
        }

        let mut cues = Vec::with_capacity(num_segments as usize);
        for (i, segment) in state.as_iter().enumerate() {
            // Marker detection is case-sensitive substring matching over
            // lowercase phrases, so the cue text is lowercased here once
            let text = segment.to_str_lossy()?.trim().to_lowercase();
            let start_ms = segment.start_timestamp().max(0) as u64 * TICK_MS;
            let end_ms = segment.end_timestamp().max(0) as u64 * TICK_MS;

            cues.push(TranscriptCue::new(i + 1, start_ms, end_ms, text));
        }

        info!("Recognizer produced {} cues", cues.len());
        Ok(cues)
    }
}

/// Generate the subtitle cue artifact for an audiobook, writing it next to
/// the source file, and return the parsed transcript.
pub fn transcribe_to_file(
    recognizer: &Recognizer,
    toolkit: &MediaToolkit,
    audiobook: &Path,
    destination: &Path,
) -> Result<Transcript> {
    let cues = recognizer.transcribe(toolkit, audiobook)?;
    let transcript = Transcript::new(destination.to_path_buf(), cues);
    transcript
        .write_srt(destination)
        .with_context(|| format!("Failed to write transcript artifact: {:?}", destination))?;
    info!("Transcript artifact written to {:?}", destination);
    Ok(transcript)
}

/// Drain a raw s16le PCM byte stream into normalized f32 samples
fn read_pcm_samples(mut stream: impl Read) -> Result<Vec<f32>> {
    let mut bytes = Vec::new();
    stream
        .read_to_end(&mut bytes)
        .context("Failed to read the PCM stream")?;

    // Drop a trailing odd byte rather than failing the whole run
    let sample_count = bytes.len() / 2;
    let mut ints = Vec::with_capacity(sample_count);
    for pair in bytes.chunks_exact(2) {
        ints.push(i16::from_le_bytes([pair[0], pair[1]]));
    }

    let mut samples = vec![0.0f32; ints.len()];
    whisper_rs::convert_integer_to_float_audio(&ints, &mut samples)
        .context("Failed to convert PCM samples")?;
    Ok(samples)
}
